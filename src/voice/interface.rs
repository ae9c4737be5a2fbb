use super::error::ProviderError;
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

// ── Catalog Entries ────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Cloned,
    SystemBuiltin,
    SystemRemote,
}

/// Which remote catalog a cache slot mirrors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceKind {
    Cloned,
    System,
}

impl VoiceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoiceKind::Cloned => "cloned",
            VoiceKind::System => "system",
        }
    }
}

impl fmt::Display for VoiceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One selectable voice, whatever catalog it came from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VoiceCatalogEntry {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub description: Vec<String>,
    #[serde(default)]
    pub created_at: Option<NaiveDateTime>,
    pub source_kind: SourceKind,
}

impl VoiceCatalogEntry {
    pub fn cloned(
        id: impl Into<String>,
        description: Vec<String>,
        created_at: Option<NaiveDateTime>,
    ) -> Self {
        let id = id.into();
        let display_name = description
            .first()
            .filter(|d| !d.is_empty())
            .cloned()
            .unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            description,
            created_at,
            source_kind: SourceKind::Cloned,
        }
    }

    pub fn builtin(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            description: Vec::new(),
            created_at: None,
            source_kind: SourceKind::SystemBuiltin,
        }
    }

    pub fn remote_system(
        id: impl Into<String>,
        name: Option<String>,
        description: Vec<String>,
    ) -> Self {
        let id = id.into();
        let display_name = name.filter(|n| !n.is_empty()).unwrap_or_else(|| id.clone());
        Self {
            id,
            display_name,
            description,
            created_at: None,
            source_kind: SourceKind::SystemRemote,
        }
    }

    /// First description line; the provider returns descriptions as a list.
    pub fn primary_description(&self) -> Option<&str> {
        self.description.first().map(String::as_str)
    }

    /// Option label shown by voice pickers.
    pub fn label(&self) -> String {
        match self.source_kind {
            SourceKind::Cloned => format!(
                "{} ({})",
                self.id,
                self.primary_description()
                    .filter(|d| !d.is_empty())
                    .unwrap_or("Unnamed")
            ),
            SourceKind::SystemBuiltin | SourceKind::SystemRemote => {
                format!("{} ({})", self.id, self.display_name)
            }
        }
    }
}

/// Parse the provider's `created_time`, which arrives as a date or a datetime.
pub fn parse_created_time(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }
    if let Ok(dt) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(dt);
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

// ── Clone Parameters ───────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CloneModel {
    #[serde(rename = "speech-02-hd")]
    Speech02Hd,
    #[serde(rename = "speech-02-turbo")]
    Speech02Turbo,
    #[serde(rename = "speech-01-hd")]
    Speech01Hd,
    #[serde(rename = "speech-01-turbo")]
    Speech01Turbo,
}

impl CloneModel {
    pub const ALL: [CloneModel; 4] = [
        CloneModel::Speech02Hd,
        CloneModel::Speech02Turbo,
        CloneModel::Speech01Hd,
        CloneModel::Speech01Turbo,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CloneModel::Speech02Hd => "speech-02-hd",
            CloneModel::Speech02Turbo => "speech-02-turbo",
            CloneModel::Speech01Hd => "speech-01-hd",
            CloneModel::Speech01Turbo => "speech-01-turbo",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CloneOptions {
    pub need_noise_reduction: bool,
    pub need_volume_normalization: bool,
    /// Text validation accuracy, 0.0..=1.0
    pub accuracy: f32,
    pub model: CloneModel,
    /// Preview text used by the provider to verify the cloned voice
    pub text: Option<String>,
}

impl Default for CloneOptions {
    fn default() -> Self {
        Self {
            need_noise_reduction: false,
            need_volume_normalization: true,
            accuracy: 0.7,
            model: CloneModel::Speech02Hd,
            text: None,
        }
    }
}

// ── Synthesis Parameters ───────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Emotion {
    Happy,
    Sad,
    Angry,
    Fearful,
    Disgusted,
    Surprised,
    Neutral,
}

impl Emotion {
    pub const ALL: [Emotion; 7] = [
        Emotion::Happy,
        Emotion::Sad,
        Emotion::Angry,
        Emotion::Fearful,
        Emotion::Disgusted,
        Emotion::Surprised,
        Emotion::Neutral,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Emotion::Happy => "happy",
            Emotion::Sad => "sad",
            Emotion::Angry => "angry",
            Emotion::Fearful => "fearful",
            Emotion::Disgusted => "disgusted",
            Emotion::Surprised => "surprised",
            Emotion::Neutral => "neutral",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.to_lowercase();
        Self::ALL.into_iter().find(|e| e.as_str() == raw)
    }
}

/// Languages accepted by the provider's `language_boost` field.
pub const LANGUAGE_BOOSTS: [&str; 24] = [
    "Chinese",
    "English",
    "French",
    "German",
    "Spanish",
    "Italian",
    "Japanese",
    "Korean",
    "Russian",
    "Arabic",
    "Portuguese",
    "Turkish",
    "Dutch",
    "Ukrainian",
    "Vietnamese",
    "Indonesian",
    "Thai",
    "Polish",
    "Romanian",
    "Greek",
    "Czech",
    "Finnish",
    "Hindi",
    "auto",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SpeechModel {
    #[serde(rename = "speech-02-hd")]
    Speech02Hd,
    #[serde(rename = "speech-01-turbo")]
    Speech01Turbo,
    #[serde(rename = "speech-01-hd")]
    Speech01Hd,
}

impl SpeechModel {
    pub const ALL: [SpeechModel; 3] = [
        SpeechModel::Speech02Hd,
        SpeechModel::Speech01Turbo,
        SpeechModel::Speech01Hd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechModel::Speech02Hd => "speech-02-hd",
            SpeechModel::Speech01Turbo => "speech-01-turbo",
            SpeechModel::Speech01Hd => "speech-01-hd",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.as_str() == raw)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthesisParams {
    pub speed: f32,
    pub volume: f32,
    pub pitch: i32,
    pub emotion: Option<Emotion>,
    pub language_boost: Option<String>,
    pub model: SpeechModel,
    pub sample_rate: u32,
    pub bitrate: u32,
}

impl Default for SynthesisParams {
    fn default() -> Self {
        Self {
            speed: 1.0,
            volume: 1.0,
            pitch: 0,
            emotion: None,
            language_boost: None,
            model: SpeechModel::Speech02Hd,
            sample_rate: 44_100,
            bitrate: 256_000,
        }
    }
}

// ── Provider Trait ──────────────────────────────────────

/// Remote voice provider. Every call either succeeds or yields a
/// [`ProviderError`]; non-success status codes are already folded into the error.
#[async_trait]
pub trait VoiceProvider: Send + Sync {
    /// Short provider name for logs
    fn id(&self) -> String;

    async fn list_cloned_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError>;

    async fn list_system_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError>;

    async fn delete_voice(&self, voice_id: &str) -> Result<(), ProviderError>;

    /// Upload an audio file for cloning; returns the provider's file id.
    async fn upload_file(&self, path: &Path) -> Result<i64, ProviderError>;

    async fn clone_voice(
        &self,
        file_id: i64,
        voice_id: &str,
        options: &CloneOptions,
    ) -> Result<(), ProviderError>;

    /// Synthesize `text`; returns decoded audio bytes (MP3).
    async fn synthesize(
        &self,
        voice_id: &str,
        text: &str,
        params: &SynthesisParams,
    ) -> Result<Vec<u8>, ProviderError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cloned_label_falls_back_to_unnamed() {
        let v = VoiceCatalogEntry::cloned("voice1234", vec![], None);
        assert_eq!(v.label(), "voice1234 (Unnamed)");
        assert_eq!(v.display_name, "voice1234");

        let v = VoiceCatalogEntry::cloned("voice1234", vec!["narrator".into()], None);
        assert_eq!(v.label(), "voice1234 (narrator)");
    }

    #[test]
    fn remote_system_name_defaults_to_id() {
        let v = VoiceCatalogEntry::remote_system("Wise_Woman", None, vec![]);
        assert_eq!(v.display_name, "Wise_Woman");
        assert_eq!(v.source_kind, SourceKind::SystemRemote);
        assert_eq!(v.label(), "Wise_Woman (Wise_Woman)");
    }

    #[test]
    fn created_time_accepts_dates_and_datetimes() {
        assert!(parse_created_time("2025-03-01").is_some());
        assert!(parse_created_time("2025-03-01 12:30:00").is_some());
        assert!(parse_created_time("2025-03-01T12:30:00Z").is_some());
        assert!(parse_created_time("yesterday").is_none());
        assert!(parse_created_time("").is_none());
    }

    #[test]
    fn options_parse_from_wire_names() {
        assert_eq!(CloneModel::parse("speech-01-turbo"), Some(CloneModel::Speech01Turbo));
        assert_eq!(SpeechModel::parse("speech-02-turbo"), None);
        assert_eq!(Emotion::parse("Happy"), Some(Emotion::Happy));
        assert_eq!(Emotion::parse("bored"), None);
    }
}
