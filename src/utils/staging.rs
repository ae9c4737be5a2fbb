use std::io::Write;
use tempfile::NamedTempFile;

/// Write uploaded bytes to a temp file that keeps the upload's extension,
/// since the provider infers the audio format from the file name.
///
/// The file is removed when the returned handle is dropped.
pub fn stage_upload(file_name: &str, bytes: &[u8]) -> std::io::Result<NamedTempFile> {
    let suffix = std::path::Path::new(file_name)
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| format!(".{}", e))
        .unwrap_or_default();
    let mut file = tempfile::Builder::new()
        .prefix("voice-upload-")
        .suffix(&suffix)
        .tempfile()?;
    file.write_all(bytes)?;
    file.flush()?;
    tracing::debug!("[Staging] {} -> {}", file_name, file.path().display());
    Ok(file)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keeps_extension_and_content() {
        let staged = stage_upload("take 1.WAV", b"RIFF").unwrap();
        let path = staged.path().to_path_buf();
        assert_eq!(path.extension().unwrap(), "WAV");
        assert_eq!(std::fs::read(&path).unwrap(), b"RIFF");

        drop(staged);
        assert!(!path.exists());
    }
}
