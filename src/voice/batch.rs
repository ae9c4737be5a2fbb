use super::error::{Notice, ValidationError};
use super::interface::{CloneOptions, VoiceKind};
use super::manager::VoicePanel;
use super::validation::validate_voice_id;

use serde::Serialize;
use std::io::Read;
use std::path::{Path, PathBuf};

/// One file queued for cloning.
#[derive(Debug, Clone, PartialEq)]
pub struct BatchItem {
    pub path: PathBuf,
    pub file_name: String,
    pub voice_id: String,
    pub preview_text: Option<String>,
}

/// Files to clone in one go, each with its target voice id.
#[derive(Debug, Clone, Default)]
pub struct BatchPlan {
    items: Vec<BatchItem>,
}

impl BatchPlan {
    /// Assign default ids `{base}_{n}` (1-based), with `voice` as the base when none is given.
    pub fn new(files: Vec<PathBuf>, base_id: Option<&str>) -> Self {
        let base = base_id
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or("voice");
        let items = files
            .into_iter()
            .enumerate()
            .map(|(i, path)| BatchItem {
                file_name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                voice_id: format!("{}_{}", base, i + 1),
                preview_text: None,
                path,
            })
            .collect();
        Self { items }
    }

    pub fn items(&self) -> &[BatchItem] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Override ids and preview texts from a CSV manifest
    /// (`filename, voice_id[, preview_text]`, with a header row).
    ///
    /// Returns how many manifest rows matched a queued file.
    pub fn apply_manifest<R: Read>(&mut self, reader: R) -> Result<usize, ValidationError> {
        let mut csv = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers = csv
            .headers()
            .map_err(|e| ValidationError::Manifest(e.to_string()))?;
        if headers.len() < 2 {
            return Err(ValidationError::ManifestColumns);
        }

        let mut matched = 0;
        for record in csv.records() {
            let record = record.map_err(|e| ValidationError::Manifest(e.to_string()))?;
            let Some(file_name) = record.get(0) else {
                continue;
            };
            let Some(item) = self.items.iter_mut().find(|i| i.file_name == file_name) else {
                tracing::debug!("[Batch] Manifest row for unknown file {}", file_name);
                continue;
            };
            matched += 1;
            if let Some(voice_id) = record.get(1).filter(|v| !v.is_empty()) {
                item.voice_id = voice_id.to_string();
            }
            if let Some(text) = record.get(2).map(str::trim).filter(|t| !t.is_empty()) {
                item.preview_text = Some(text.to_string());
            }
        }
        Ok(matched)
    }

    pub fn apply_manifest_file(&mut self, path: &Path) -> Result<usize, ValidationError> {
        let file = std::fs::File::open(path)
            .map_err(|e| ValidationError::Manifest(format!("{}: {}", path.display(), e)))?;
        self.apply_manifest(file)
    }

    /// Check every voice id; all failures are reported together.
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let errors: Vec<ValidationError> = self
            .items
            .iter()
            .enumerate()
            .filter_map(|(index, item)| {
                validate_voice_id(&item.voice_id)
                    .err()
                    .map(|source| ValidationError::BatchItem {
                        index: index + 1,
                        source: Box::new(source),
                    })
            })
            .collect();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Upload and clone every file in order. Nothing is submitted when any id is invalid.
    pub async fn run(
        &self,
        panel: &mut VoicePanel,
        options: &CloneOptions,
    ) -> Result<BatchReport, Vec<ValidationError>> {
        if let Err(errors) = self.validate() {
            for e in &errors {
                panel.notify(Notice::error(e.to_string()));
            }
            return Err(errors);
        }

        let mut report = BatchReport::default();
        for (index, item) in self.items.iter().enumerate() {
            tracing::info!(
                "[Batch] {}/{}: {} -> {}",
                index + 1,
                self.items.len(),
                item.file_name,
                item.voice_id
            );
            let mut item_options = options.clone();
            item_options.text = item.preview_text.clone();

            let outcome = match panel
                .try_upload_and_clone(&item.path, &item.voice_id, &item_options)
                .await
            {
                Ok(file_id) => {
                    panel.notify(Notice::success(format!(
                        "{}: cloned as {}",
                        item.file_name, item.voice_id
                    )));
                    BatchOutcome::succeeded(item, file_id)
                }
                Err(e) => {
                    tracing::warn!("[Batch] {} failed: {}", item.file_name, e);
                    panel.notify(Notice::error(format!("{}: {}", item.file_name, e)));
                    BatchOutcome::failed(item, e.to_string())
                }
            };
            report.push(outcome);
        }

        if report.succeeded > 0 {
            panel.get_voices(VoiceKind::Cloned, true).await;
        }
        panel.notify(Notice::info(format!(
            "Batch finished: {} succeeded, {} failed",
            report.succeeded, report.failed
        )));
        Ok(report)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub file_name: String,
    pub voice_id: String,
    pub file_id: Option<i64>,
    pub error: Option<String>,
}

impl BatchOutcome {
    fn succeeded(item: &BatchItem, file_id: i64) -> Self {
        Self {
            file_name: item.file_name.clone(),
            voice_id: item.voice_id.clone(),
            file_id: Some(file_id),
            error: None,
        }
    }

    fn failed(item: &BatchItem, error: String) -> Self {
        Self {
            file_name: item.file_name.clone(),
            voice_id: item.voice_id.clone(),
            file_id: None,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub succeeded: usize,
    pub failed: usize,
}

impl BatchReport {
    fn push(&mut self, outcome: BatchOutcome) {
        if outcome.is_success() {
            self.succeeded += 1;
        } else {
            self.failed += 1;
        }
        self.outcomes.push(outcome);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan(names: &[&str], base: Option<&str>) -> BatchPlan {
        BatchPlan::new(names.iter().map(PathBuf::from).collect(), base)
    }

    #[test]
    fn default_ids_are_numbered_from_one() {
        let p = plan(&["a.wav", "b.wav"], Some("narrator"));
        let ids: Vec<&str> = p.items().iter().map(|i| i.voice_id.as_str()).collect();
        assert_eq!(ids, ["narrator_1", "narrator_2"]);

        let p = plan(&["a.wav"], Some("  "));
        assert_eq!(p.items()[0].voice_id, "voice_1");
        assert_eq!(p.items()[0].file_name, "a.wav");
    }

    #[test]
    fn manifest_overrides_matching_files() {
        let mut p = plan(&["dir/a.wav", "b.mp3"], Some("narrator"));
        let csv = "filename,voice_id,preview_text\n\
                   b.mp3,hero0001,  Hello there  \n\
                   a.wav,,\n\
                   c.wav,ghost001,boo\n";
        let matched = p.apply_manifest(csv.as_bytes()).unwrap();
        assert_eq!(matched, 2);

        assert_eq!(p.items()[0].voice_id, "narrator_1");
        assert_eq!(p.items()[0].preview_text, None);
        assert_eq!(p.items()[1].voice_id, "hero0001");
        assert_eq!(p.items()[1].preview_text.as_deref(), Some("Hello there"));
    }

    #[test]
    fn manifest_needs_two_columns() {
        let mut p = plan(&["a.wav"], None);
        assert_eq!(
            p.apply_manifest("filename\na.wav\n".as_bytes()),
            Err(ValidationError::ManifestColumns)
        );
    }

    #[test]
    fn validate_collects_every_failure() {
        let mut p = plan(&["a.wav", "b.wav", "c.wav"], Some("narrator"));
        let csv = "filename,voice_id\na.wav,1abcdefg\nc.wav,short1\n";
        p.apply_manifest(csv.as_bytes()).unwrap();

        let errors = p.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(matches!(errors[0], ValidationError::BatchItem { index: 1, .. }));
        assert!(matches!(errors[1], ValidationError::BatchItem { index: 3, .. }));
    }

    #[test]
    fn manifest_file_is_read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("manifest.csv");
        std::fs::write(&manifest, "filename,voice_id\na.wav,speaker01\n").unwrap();

        let mut p = plan(&["a.wav"], None);
        assert_eq!(p.apply_manifest_file(&manifest), Ok(1));
        assert_eq!(p.items()[0].voice_id, "speaker01");
        assert!(p.validate().is_ok());
    }
}
