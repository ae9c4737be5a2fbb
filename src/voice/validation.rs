use super::error::ValidationError;
use super::interface::{CloneOptions, SynthesisParams};
use std::path::Path;

pub const MIN_VOICE_ID_LEN: usize = 8;
pub const MAX_CLONE_FILE_BYTES: u64 = 20 * 1024 * 1024;
pub const CLONE_AUDIO_EXTENSIONS: [&str; 4] = ["wav", "mp3", "m4a", "flac"];

/// Voice ids for clones: at least 8 characters, a letter first, and both
/// letters and digits somewhere. Letters and digits from any script count.
pub fn validate_voice_id(voice_id: &str) -> Result<(), ValidationError> {
    if voice_id.chars().count() < MIN_VOICE_ID_LEN {
        return Err(ValidationError::VoiceIdTooShort {
            min: MIN_VOICE_ID_LEN,
        });
    }
    if !voice_id.chars().next().is_some_and(char::is_alphabetic) {
        return Err(ValidationError::VoiceIdLeadingChar);
    }
    let has_letter = voice_id.chars().any(char::is_alphabetic);
    let has_digit = voice_id.chars().any(char::is_numeric);
    if !(has_letter && has_digit) {
        return Err(ValidationError::VoiceIdCharset);
    }
    Ok(())
}

/// Lower-cased extension of an accepted clone source file.
pub fn clone_audio_extension(file_name: &str) -> Result<String, ValidationError> {
    let ext = Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();
    if CLONE_AUDIO_EXTENSIONS.contains(&ext.as_str()) {
        Ok(ext)
    } else {
        Err(ValidationError::AudioFormat(ext))
    }
}

pub fn validate_clone_file(file_name: &str, size: u64) -> Result<(), ValidationError> {
    clone_audio_extension(file_name)?;
    if size > MAX_CLONE_FILE_BYTES {
        return Err(ValidationError::AudioTooLarge {
            size,
            limit: MAX_CLONE_FILE_BYTES,
        });
    }
    Ok(())
}

fn check_range(name: &'static str, value: f64, min: f64, max: f64) -> Result<(), ValidationError> {
    if value.is_nan() || value < min || value > max {
        return Err(ValidationError::OutOfRange {
            name,
            min,
            max,
            value,
        });
    }
    Ok(())
}

pub fn validate_clone_options(options: &CloneOptions) -> Result<(), ValidationError> {
    check_range("accuracy", options.accuracy as f64, 0.0, 1.0)
}

pub fn validate_synthesis(text: &str, params: &SynthesisParams) -> Result<(), ValidationError> {
    if text.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }
    check_range("speed", params.speed as f64, 0.5, 2.0)?;
    check_range("volume", params.volume as f64, 0.0, 10.0)?;
    check_range("pitch", params.pitch as f64, -12.0, 12.0)?;
    if let Some(ref boost) = params.language_boost {
        if !super::interface::LANGUAGE_BOOSTS.contains(&boost.as_str()) {
            return Err(ValidationError::UnknownOption {
                field: "language boost",
                value: boost.clone(),
            });
        }
    }
    Ok(())
}
