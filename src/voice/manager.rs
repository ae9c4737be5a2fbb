use super::cache::CacheSlot;
use super::catalog::{merge_system_catalog, BuiltinCatalog};
use super::clock::{MonotonicClock, SessionClock};
use super::config::{ApiConfig, PanelConfig};
use super::error::{ConnectionError, FetchError, Notice, OperationError, ValidationError};
use super::filter::filter;
use super::interface::{
    CloneOptions, SynthesisParams, VoiceCatalogEntry, VoiceKind, VoiceProvider,
};
use super::minimax::MiniMaxClient;
use super::selection::SelectionState;
use super::validation;
use crate::script::ScriptPick;
use crate::utils::{naming, staging};

use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

// ── Connection Context ─────────────────────────────────

/// Credentials plus the provider handle built from them.
#[derive(Clone)]
pub struct ConnectionContext {
    api_key: String,
    group_id: String,
    provider: Arc<dyn VoiceProvider>,
}

impl ConnectionContext {
    pub fn new(
        api_key: impl Into<String>,
        group_id: impl Into<String>,
        provider: Arc<dyn VoiceProvider>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            group_id: group_id.into(),
            provider,
        }
    }

    /// Build a MiniMax client for the credential pair. Nothing is sent to
    /// the provider here.
    pub fn connect(api_key: &str, group_id: &str, api: &ApiConfig) -> Result<Self, ConnectionError> {
        let client = MiniMaxClient::new(api_key, group_id, &api.base_url, api.timeout())?;
        Ok(Self::new(api_key.trim(), group_id.trim(), Arc::new(client)))
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    pub fn provider(&self) -> Arc<dyn VoiceProvider> {
        Arc::clone(&self.provider)
    }
}

impl fmt::Debug for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionContext")
            .field("api_key", &"***")
            .field("group_id", &self.group_id)
            .field("provider", &self.provider.id())
            .finish()
    }
}

// ── Views ──────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PickerSource {
    Cloned,
    System,
}

/// What a voice picker shows after filtering.
#[derive(Debug, Clone, Serialize)]
pub struct PickerView {
    pub source: PickerSource,
    pub query: String,
    pub entries: Vec<VoiceCatalogEntry>,
    /// Index the picker opens on: the pending quick-test voice if visible, else the first entry
    pub preselected: Option<usize>,
}

/// Generated test audio plus the file name offered for download.
#[derive(Debug, Clone)]
pub struct TestAudio {
    pub voice_id: String,
    pub file_name: String,
    pub audio: Vec<u8>,
}

impl TestAudio {
    pub fn save_to(&self, dir: &Path) -> std::io::Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(&self.file_name);
        std::fs::write(&path, &self.audio)?;
        Ok(path)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotStatus {
    pub present: bool,
    pub entries: usize,
    pub age_secs: Option<u64>,
    pub ttl_secs: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PanelStatus {
    pub connected: bool,
    pub group_id: Option<String>,
    pub current_voice: String,
    pub quick_test: Option<String>,
    pub script: Option<ScriptPick>,
    pub cloned: SlotStatus,
    pub system: SlotStatus,
}

// ── VoicePanel ─────────────────────────────────────────

/// Coordinator owning the connection, both voice caches and the selection.
///
/// Presentation code reads through the accessors and writes only through
/// `select`, `quick_test`, `get_voices` and the voice operations. Remote
/// failures are logged and turned into [`Notice`]s, never propagated further.
pub struct VoicePanel {
    config: PanelConfig,
    connection: Option<ConnectionContext>,
    cloned: CacheSlot<VoiceCatalogEntry>,
    system: CacheSlot<VoiceCatalogEntry>,
    builtin: BuiltinCatalog,
    selection: SelectionState,
    clock: Box<dyn SessionClock>,
    notices: Vec<Notice>,
}

impl VoicePanel {
    pub fn new(config: PanelConfig) -> Self {
        Self::with_clock(config, MonotonicClock::new())
    }

    pub fn with_clock(config: PanelConfig, clock: impl SessionClock + 'static) -> Self {
        let ttl = config.cache.ttl();
        Self {
            config,
            connection: None,
            cloned: CacheSlot::new(ttl),
            system: CacheSlot::new(ttl),
            builtin: BuiltinCatalog::minimax(),
            selection: SelectionState::new(),
            clock: Box::new(clock),
            notices: Vec::new(),
        }
    }

    pub fn with_builtin(mut self, builtin: BuiltinCatalog) -> Self {
        self.builtin = builtin;
        self
    }

    /// Session start: connect with whatever credentials the config resolves,
    /// without reporting a failure.
    pub fn from_startup(config: PanelConfig) -> Self {
        let api_key = config.api.resolve_api_key().unwrap_or_default();
        let group_id = config.api.resolve_group_id().unwrap_or_default();
        let mut panel = Self::new(config);
        panel.connect_quietly(&api_key, &group_id);
        panel
    }

    pub fn config(&self) -> &PanelConfig {
        &self.config
    }

    // ── Connection ─────────────────────────────────────

    /// Explicit connect action. On failure the previous context stays in place.
    pub fn connect(&mut self, api_key: &str, group_id: &str) -> Result<(), ConnectionError> {
        match ConnectionContext::connect(api_key, group_id, &self.config.api) {
            Ok(context) => {
                self.attach(context);
                self.notices.push(Notice::success("Connected"));
                Ok(())
            }
            Err(e) => {
                tracing::warn!("[Panel] Connect failed: {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to initialise client: {}", e)));
                Err(e)
            }
        }
    }

    /// Startup connect: failures are only logged.
    pub fn connect_quietly(&mut self, api_key: &str, group_id: &str) -> bool {
        match ConnectionContext::connect(api_key, group_id, &self.config.api) {
            Ok(context) => {
                self.attach(context);
                true
            }
            Err(e) => {
                tracing::debug!("[Panel] Startup connect skipped: {}", e);
                false
            }
        }
    }

    /// Install a connection. Both catalogs belonged to the previous account,
    /// so both slots are cleared.
    pub fn attach(&mut self, context: ConnectionContext) {
        tracing::info!(
            "[Panel] Connected to {} (group {})",
            context.provider.id(),
            context.group_id
        );
        self.connection = Some(context);
        self.cloned.clear();
        self.system.clear();
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection(&self) -> Option<&ConnectionContext> {
        self.connection.as_ref()
    }

    fn provider(&self) -> Option<Arc<dyn VoiceProvider>> {
        self.connection.as_ref().map(ConnectionContext::provider)
    }

    // ── Voice Cache ────────────────────────────────────

    fn slot(&self, kind: VoiceKind) -> &CacheSlot<VoiceCatalogEntry> {
        match kind {
            VoiceKind::Cloned => &self.cloned,
            VoiceKind::System => &self.system,
        }
    }

    fn slot_mut(&mut self, kind: VoiceKind) -> &mut CacheSlot<VoiceCatalogEntry> {
        match kind {
            VoiceKind::Cloned => &mut self.cloned,
            VoiceKind::System => &mut self.system,
        }
    }

    /// Cached voices of `kind`, refetched when stale, missing or forced.
    ///
    /// A successful refetch applies the default selection. A failed one
    /// invalidates the slot, emits an error notice and yields an empty list.
    pub async fn get_voices(
        &mut self,
        kind: VoiceKind,
        force_refresh: bool,
    ) -> Arc<Vec<VoiceCatalogEntry>> {
        if !force_refresh {
            let now = self.clock.now();
            if let Some(entries) = self.slot(kind).fresh(now) {
                tracing::debug!("[Panel] {} voices served from cache", kind);
                return entries;
            }
        }

        match self.refresh(kind).await {
            Ok(entries) => {
                self.apply_default_selection(&entries);
                entries
            }
            Err(e) => {
                tracing::warn!("[Panel] {}", e);
                self.notices
                    .push(Notice::error(format!("Failed to fetch voice list: {}", e)));
                Arc::new(Vec::new())
            }
        }
    }

    /// Fetch `kind` from the provider and replace the slot wholesale.
    /// Does not touch the selection.
    pub async fn refresh(&mut self, kind: VoiceKind) -> Result<Arc<Vec<VoiceCatalogEntry>>, FetchError> {
        let provider = self.provider().ok_or(FetchError::NotConnected)?;
        let result = match kind {
            VoiceKind::Cloned => provider.list_cloned_voices().await,
            VoiceKind::System => provider.list_system_voices().await,
        };
        match result {
            Ok(voices) => {
                let now = self.clock.now();
                tracing::info!("[Panel] Fetched {} {} voices", voices.len(), kind);
                Ok(self.slot_mut(kind).replace(voices, now))
            }
            Err(source) => {
                self.slot_mut(kind).invalidate();
                Err(FetchError::Provider {
                    kind: kind.as_str(),
                    source,
                })
            }
        }
    }

    /// Select the first entry, if any. Applied after every successful refresh.
    pub fn apply_default_selection(&mut self, entries: &[VoiceCatalogEntry]) -> bool {
        match entries.first() {
            Some(first) => {
                self.selection.select(first.id.clone());
                true
            }
            None => false,
        }
    }

    /// Slot contents without any fetch.
    pub fn cached(&self, kind: VoiceKind) -> Option<Arc<Vec<VoiceCatalogEntry>>> {
        self.slot(kind).current()
    }

    /// Built-in system voices followed by whatever the system slot holds.
    pub fn merged_system_catalog(&self) -> Vec<VoiceCatalogEntry> {
        let remote = self.system.current().unwrap_or_default();
        merge_system_catalog(self.builtin.entries(), &remote)
    }

    pub fn builtin(&self) -> &BuiltinCatalog {
        &self.builtin
    }

    // ── Selection ──────────────────────────────────────

    pub fn select(&mut self, voice_id: &str) {
        self.selection.select(voice_id);
    }

    pub fn current(&self) -> &str {
        self.selection.current()
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Shortcut from a list view: select the voice and flag the test page.
    pub fn quick_test(&mut self, voice_id: &str) {
        self.selection.set_quick_test(voice_id);
        self.notices
            .push(Notice::success(format!("Ready to test voice: {}", voice_id)));
    }

    pub fn clear_quick_test(&mut self) {
        self.selection.clear_quick_test();
    }

    pub fn apply_script_pick(&mut self, pick: ScriptPick) {
        self.selection.set_script(pick);
    }

    pub fn clear_script_pick(&mut self) {
        self.selection.clear_script();
    }

    /// Build a picker view and, when a search is active, follow it with the selection.
    pub async fn picker(&mut self, source: PickerSource, query: &str) -> PickerView {
        let entries = match source {
            PickerSource::Cloned => {
                let all = self.get_voices(VoiceKind::Cloned, false).await;
                if all.is_empty() {
                    self.notices.push(Notice::info("No cloned voices available"));
                }
                filter(&all, query)
            }
            PickerSource::System => {
                self.get_voices(VoiceKind::System, false).await;
                filter(&self.merged_system_catalog(), query)
            }
        };

        let quick_index = self
            .selection
            .quick_test()
            .and_then(|id| entries.iter().position(|v| v.id == id));
        let preselected = match quick_index {
            Some(i) => Some(i),
            None if entries.is_empty() => None,
            None => Some(0),
        };

        // A fetch above may have auto-selected the first entry; the selection
        // must end up on whatever the view opens with.
        if quick_index.is_some() || !query.is_empty() {
            match preselected {
                Some(i) => {
                    let id = entries[i].id.clone();
                    self.selection.select(id);
                }
                None => self
                    .notices
                    .push(Notice::warning(format!("No voices match '{}'", query))),
            }
        }

        PickerView {
            source,
            query: query.to_string(),
            entries,
            preselected,
        }
    }

    // ── Notices ────────────────────────────────────────

    pub fn notices(&self) -> &[Notice] {
        &self.notices
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub(crate) fn notify(&mut self, notice: Notice) {
        self.notices.push(notice);
    }

    // ── Voice Operations ───────────────────────────────

    pub async fn try_delete_voice(&self, voice_id: &str) -> Result<(), OperationError> {
        let provider = self.provider().ok_or(OperationError::NotConnected)?;
        provider
            .delete_voice(voice_id)
            .await
            .map_err(|e| OperationError::provider("delete voice", e))
    }

    /// Delete one cloned voice and refresh the cloned catalog on success.
    pub async fn delete_voice(&mut self, voice_id: &str) -> bool {
        let deleted = self.delete_one(voice_id).await;
        if deleted {
            self.get_voices(VoiceKind::Cloned, true).await;
        }
        deleted
    }

    /// Bulk delete; returns how many succeeded. Refreshes once at the end.
    pub async fn delete_voices(&mut self, voice_ids: &[String]) -> usize {
        let mut deleted = 0;
        for voice_id in voice_ids {
            if self.delete_one(voice_id).await {
                deleted += 1;
            }
        }
        if deleted > 0 {
            self.get_voices(VoiceKind::Cloned, true).await;
        }
        self.notices
            .push(Notice::success(format!("Deleted {} voices", deleted)));
        deleted
    }

    async fn delete_one(&mut self, voice_id: &str) -> bool {
        match self.try_delete_voice(voice_id).await {
            Ok(()) => {
                tracing::info!("[Panel] Deleted voice {}", voice_id);
                self.notices
                    .push(Notice::success(format!("Deleted voice: {}", voice_id)));
                true
            }
            Err(e) => {
                tracing::warn!("[Panel] Delete {} failed: {}", voice_id, e);
                self.notices.push(Notice::error(format!(
                    "Failed to delete voice {}: {}",
                    voice_id, e
                )));
                false
            }
        }
    }

    pub async fn try_clone_voice(
        &self,
        file_id: i64,
        voice_id: &str,
        options: &CloneOptions,
    ) -> Result<(), OperationError> {
        let provider = self.provider().ok_or(OperationError::NotConnected)?;
        provider
            .clone_voice(file_id, voice_id, options)
            .await
            .map_err(|e| OperationError::provider("clone voice", e))
    }

    /// Submit a clone job for an uploaded file and refresh the cloned catalog on success.
    pub async fn clone_voice(&mut self, file_id: i64, voice_id: &str, options: &CloneOptions) -> bool {
        if let Err(e) = validation::validate_voice_id(voice_id)
            .and_then(|_| validation::validate_clone_options(options))
        {
            self.report_invalid(e);
            return false;
        }
        let submitted = self.submit_clone(file_id, voice_id, options).await;
        if submitted {
            self.get_voices(VoiceKind::Cloned, true).await;
        }
        submitted
    }

    async fn submit_clone(&mut self, file_id: i64, voice_id: &str, options: &CloneOptions) -> bool {
        match self.try_clone_voice(file_id, voice_id, options).await {
            Ok(()) => {
                tracing::info!("[Panel] Clone submitted: {} (file {})", voice_id, file_id);
                self.notices
                    .push(Notice::success(format!("Cloned voice: {}", voice_id)));
                true
            }
            Err(e) => {
                tracing::warn!("[Panel] Clone {} failed: {}", voice_id, e);
                self.notices.push(Notice::error(format!(
                    "Failed to clone voice {}: {}",
                    voice_id, e
                )));
                false
            }
        }
    }

    pub async fn try_upload(&self, path: &Path) -> Result<i64, OperationError> {
        let provider = self.provider().ok_or(OperationError::NotConnected)?;
        provider
            .upload_file(path)
            .await
            .map_err(|e| OperationError::provider("upload file", e))
    }

    /// Validate, upload and clone without refreshing or selecting.
    /// Used by single and batch submissions alike.
    pub async fn try_upload_and_clone(
        &self,
        path: &Path,
        voice_id: &str,
        options: &CloneOptions,
    ) -> Result<i64, CloneFailure> {
        let size = std::fs::metadata(path)
            .map_err(|e| CloneFailure::Operation(OperationError::Staging(e)))?
            .len();
        let file_name = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        validation::validate_clone_file(file_name, size)?;
        validation::validate_voice_id(voice_id)?;
        validation::validate_clone_options(options)?;

        let file_id = self.try_upload(path).await?;
        tracing::info!("[Panel] Uploaded {} as file {}", path.display(), file_id);
        self.try_clone_voice(file_id, voice_id, options).await?;
        Ok(file_id)
    }

    /// Upload a local audio file and clone it under `voice_id`.
    pub async fn clone_from_file(&mut self, path: &Path, voice_id: &str, options: &CloneOptions) -> bool {
        match self.try_upload_and_clone(path, voice_id, options).await {
            Ok(file_id) => {
                self.notices.push(Notice::success(format!(
                    "Uploaded file {}; clone job submitted for {}",
                    file_id, voice_id
                )));
                self.notices.push(Notice::info(
                    "Cloning can take a few minutes; refresh the voice list to check its status",
                ));
                self.get_voices(VoiceKind::Cloned, true).await;
                true
            }
            Err(CloneFailure::Invalid(e)) => {
                self.report_invalid(e);
                false
            }
            Err(CloneFailure::Operation(e)) => {
                tracing::warn!("[Panel] Clone from {} failed: {}", path.display(), e);
                self.notices
                    .push(Notice::error(format!("Clone failed: {}", e)));
                false
            }
        }
    }

    /// Stage uploaded bytes into a temp file carrying the same extension, then clone.
    pub async fn clone_from_bytes(
        &mut self,
        file_name: &str,
        bytes: &[u8],
        voice_id: &str,
        options: &CloneOptions,
    ) -> bool {
        if let Err(e) = validation::validate_clone_file(file_name, bytes.len() as u64) {
            self.report_invalid(e);
            return false;
        }
        let staged = match staging::stage_upload(file_name, bytes) {
            Ok(staged) => staged,
            Err(e) => {
                self.notices
                    .push(Notice::error(format!("Clone failed: {}", OperationError::Staging(e))));
                return false;
            }
        };
        let path = staged.path().to_path_buf();
        self.clone_from_file(&path, voice_id, options).await
    }

    pub async fn try_synthesize(
        &self,
        voice_id: &str,
        text: &str,
        params: &SynthesisParams,
    ) -> Result<Vec<u8>, OperationError> {
        let provider = self.provider().ok_or(OperationError::NotConnected)?;
        let audio = provider
            .synthesize(voice_id, text, params)
            .await
            .map_err(|e| OperationError::provider("synthesize", e))?;
        if audio.is_empty() {
            return Err(OperationError::EmptyAudio);
        }
        Ok(audio)
    }

    /// Synthesize `text` with the selected voice.
    ///
    /// On success the quick-test flag is cleared and the download name follows
    /// the active script row prefix, if any.
    pub async fn test_voice(&mut self, text: &str, params: &SynthesisParams) -> Option<TestAudio> {
        if let Err(e) = validation::validate_synthesis(text, params) {
            self.report_invalid(e);
            return None;
        }
        let voice_id = self.current().to_string();
        if voice_id.is_empty() {
            self.notices.push(Notice::warning("Select a voice first"));
            return None;
        }

        match self.try_synthesize(&voice_id, text, params).await {
            Ok(audio) => {
                self.selection.clear_quick_test();
                let prefix = self.selection.script().map(|s| s.file_prefix.clone());
                let file_name = naming::download_file_name(prefix.as_deref(), &voice_id, text);
                tracing::info!(
                    "[Panel] Synthesized {} bytes with {}",
                    audio.len(),
                    voice_id
                );
                Some(TestAudio {
                    voice_id,
                    file_name,
                    audio,
                })
            }
            Err(e) => {
                tracing::warn!("[Panel] Synthesis with {} failed: {}", voice_id, e);
                self.notices
                    .push(Notice::error(format!("Failed to generate test audio: {}", e)));
                None
            }
        }
    }

    fn report_invalid(&mut self, e: ValidationError) {
        self.notices.push(Notice::error(e.to_string()));
    }

    // ── Status ─────────────────────────────────────────

    fn slot_status(&self, kind: VoiceKind) -> SlotStatus {
        let slot = self.slot(kind);
        SlotStatus {
            present: slot.is_present(),
            entries: slot.len(),
            age_secs: slot.age(self.clock.now()).map(|a| a.as_secs()),
            ttl_secs: slot.ttl().as_secs(),
        }
    }

    pub fn status(&self) -> PanelStatus {
        PanelStatus {
            connected: self.is_connected(),
            group_id: self.connection.as_ref().map(|c| c.group_id.clone()),
            current_voice: self.current().to_string(),
            quick_test: self.selection.quick_test().map(str::to_string),
            script: self.selection.script().cloned(),
            cloned: self.slot_status(VoiceKind::Cloned),
            system: self.slot_status(VoiceKind::System),
        }
    }
}

/// Why an upload-and-clone did not go through.
#[derive(Debug, thiserror::Error)]
pub enum CloneFailure {
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    #[error(transparent)]
    Operation(#[from] OperationError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::voice::clock::ManualClock;
    use crate::voice::error::{NoticeLevel, ProviderError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    /// In-memory provider counting list calls.
    #[derive(Default)]
    struct FakeProvider {
        cloned: Mutex<Vec<VoiceCatalogEntry>>,
        system: Mutex<Vec<VoiceCatalogEntry>>,
        cloned_fetches: AtomicUsize,
        system_fetches: AtomicUsize,
        fail_lists: AtomicBool,
        audio: Mutex<Vec<u8>>,
        deleted: Mutex<Vec<String>>,
    }

    impl FakeProvider {
        fn with_cloned(ids: &[&str]) -> Arc<Self> {
            let provider = Self::default();
            *provider.cloned.lock().unwrap() = ids
                .iter()
                .map(|id| VoiceCatalogEntry::cloned(*id, vec![], None))
                .collect();
            *provider.audio.lock().unwrap() = vec![0xFF, 0xF3];
            Arc::new(provider)
        }

        fn fetches(&self) -> usize {
            self.cloned_fetches.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl VoiceProvider for FakeProvider {
        fn id(&self) -> String {
            "fake".into()
        }

        async fn list_cloned_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError> {
            self.cloned_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(ProviderError::Transport("offline".into()));
            }
            Ok(self.cloned.lock().unwrap().clone())
        }

        async fn list_system_voices(&self) -> Result<Vec<VoiceCatalogEntry>, ProviderError> {
            self.system_fetches.fetch_add(1, Ordering::SeqCst);
            if self.fail_lists.load(Ordering::SeqCst) {
                return Err(ProviderError::Transport("offline".into()));
            }
            Ok(self.system.lock().unwrap().clone())
        }

        async fn delete_voice(&self, voice_id: &str) -> Result<(), ProviderError> {
            if voice_id.starts_with("missing") {
                return Err(ProviderError::Api {
                    code: 2013,
                    message: "voice not found".into(),
                });
            }
            self.deleted.lock().unwrap().push(voice_id.to_string());
            self.cloned.lock().unwrap().retain(|v| v.id != voice_id);
            Ok(())
        }

        async fn upload_file(&self, _path: &Path) -> Result<i64, ProviderError> {
            Ok(77)
        }

        async fn clone_voice(
            &self,
            _file_id: i64,
            voice_id: &str,
            _options: &CloneOptions,
        ) -> Result<(), ProviderError> {
            self.cloned
                .lock()
                .unwrap()
                .push(VoiceCatalogEntry::cloned(voice_id, vec![], None));
            Ok(())
        }

        async fn synthesize(
            &self,
            _voice_id: &str,
            _text: &str,
            _params: &SynthesisParams,
        ) -> Result<Vec<u8>, ProviderError> {
            Ok(self.audio.lock().unwrap().clone())
        }
    }

    fn panel_with(provider: Arc<FakeProvider>) -> (VoicePanel, ManualClock) {
        let clock = ManualClock::new();
        let mut panel = VoicePanel::with_clock(PanelConfig::default(), clock.clone());
        panel.attach(ConnectionContext::new("key", "group", provider));
        (panel, clock)
    }

    #[tokio::test]
    async fn second_read_within_ttl_is_cached() {
        let provider = FakeProvider::with_cloned(&["v1", "v2"]);
        let (mut panel, clock) = panel_with(provider.clone());

        let first = panel.get_voices(VoiceKind::Cloned, false).await;
        clock.advance(Duration::from_secs(299));
        let second = panel.get_voices(VoiceKind::Cloned, false).await;

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(provider.fetches(), 1);
    }

    #[tokio::test]
    async fn stale_slot_is_refetched() {
        let provider = FakeProvider::with_cloned(&["v1"]);
        let (mut panel, clock) = panel_with(provider.clone());

        panel.get_voices(VoiceKind::Cloned, false).await;
        clock.advance(Duration::from_secs(301));
        panel.get_voices(VoiceKind::Cloned, false).await;
        assert_eq!(provider.fetches(), 2);
    }

    #[tokio::test]
    async fn force_refresh_always_fetches() {
        let provider = FakeProvider::with_cloned(&["v1"]);
        let (mut panel, _clock) = panel_with(provider.clone());

        panel.get_voices(VoiceKind::Cloned, false).await;
        panel.get_voices(VoiceKind::Cloned, true).await;
        panel.get_voices(VoiceKind::Cloned, true).await;
        assert_eq!(provider.fetches(), 3);
    }

    #[tokio::test]
    async fn empty_list_within_ttl_does_not_refetch() {
        let provider = FakeProvider::with_cloned(&[]);
        let (mut panel, clock) = panel_with(provider.clone());

        assert!(panel.get_voices(VoiceKind::Cloned, false).await.is_empty());
        clock.advance(Duration::from_secs(60));
        assert!(panel.get_voices(VoiceKind::Cloned, false).await.is_empty());
        assert_eq!(provider.fetches(), 1);
        assert_eq!(panel.current(), "", "nothing to auto-select");
    }

    #[tokio::test]
    async fn failed_refresh_invalidates_and_retries_next_read() {
        let provider = FakeProvider::with_cloned(&["v1"]);
        let (mut panel, _clock) = panel_with(provider.clone());

        assert_eq!(panel.get_voices(VoiceKind::Cloned, false).await.len(), 1);

        provider.fail_lists.store(true, Ordering::SeqCst);
        assert!(panel.get_voices(VoiceKind::Cloned, true).await.is_empty());
        assert!(panel.cached(VoiceKind::Cloned).is_none());
        let notices = panel.take_notices();
        assert!(notices.iter().any(|n| n.level == NoticeLevel::Error));

        provider.fail_lists.store(false, Ordering::SeqCst);
        let after = panel.get_voices(VoiceKind::Cloned, false).await;
        assert_eq!(after.len(), 1);
        assert_eq!(provider.fetches(), 3);
    }

    #[tokio::test]
    async fn refresh_auto_selects_first_entry() {
        let provider = FakeProvider::with_cloned(&["v1", "v2"]);
        let (mut panel, _clock) = panel_with(provider);

        panel.get_voices(VoiceKind::Cloned, false).await;
        assert_eq!(panel.current(), "v1");

        panel.select("v2");
        panel.get_voices(VoiceKind::Cloned, false).await;
        assert_eq!(panel.current(), "v2", "cache hits leave the selection alone");
    }

    #[tokio::test]
    async fn refresh_alone_does_not_select() {
        let provider = FakeProvider::with_cloned(&["v1"]);
        let (mut panel, _clock) = panel_with(provider);

        let entries = panel.refresh(VoiceKind::Cloned).await.unwrap();
        assert_eq!(panel.current(), "");
        assert!(panel.apply_default_selection(&entries));
        assert_eq!(panel.current(), "v1");
    }

    #[tokio::test]
    async fn not_connected_reports_and_returns_empty() {
        let mut panel = VoicePanel::with_clock(PanelConfig::default(), ManualClock::new());
        assert!(panel.get_voices(VoiceKind::System, false).await.is_empty());
        assert!(matches!(
            panel.refresh(VoiceKind::System).await,
            Err(FetchError::NotConnected)
        ));
        assert_eq!(panel.take_notices().len(), 1);
    }

    #[tokio::test]
    async fn attach_clears_both_slots() {
        let provider = FakeProvider::with_cloned(&["v1"]);
        let (mut panel, _clock) = panel_with(provider.clone());
        panel.get_voices(VoiceKind::Cloned, false).await;
        assert!(panel.cached(VoiceKind::Cloned).is_some());

        panel.attach(ConnectionContext::new("key2", "group2", provider));
        assert!(panel.cached(VoiceKind::Cloned).is_none());
    }

    #[test]
    fn failed_connect_keeps_previous_context() {
        let provider = FakeProvider::with_cloned(&[]);
        let (mut panel, _clock) = panel_with(provider);

        assert!(panel.connect("", "group").is_err());
        assert_eq!(panel.connection().unwrap().group_id(), "group");
        assert_eq!(panel.take_notices()[0].level, NoticeLevel::Error);

        assert!(!panel.connect_quietly("key", ""));
        assert!(panel.take_notices().is_empty());
    }

    #[tokio::test]
    async fn system_picker_merges_builtin_and_remote() {
        let provider = FakeProvider::with_cloned(&[]);
        *provider.system.lock().unwrap() = vec![
            VoiceCatalogEntry::remote_system("B", None, vec![]),
            VoiceCatalogEntry::remote_system("C", None, vec![]),
        ];
        let (panel, _clock) = panel_with(provider);
        let mut panel = panel.with_builtin(BuiltinCatalog::from_pairs([("A", "a"), ("B", "b")]));

        let view = panel.picker(PickerSource::System, "").await;
        let ids: Vec<&str> = view.entries.iter().map(|v| v.id.as_str()).collect();
        assert_eq!(ids, ["A", "B", "B", "C"]);
        assert_eq!(view.preselected, Some(0));
    }

    #[tokio::test]
    async fn searching_picker_follows_results() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002", "beta0003"]);
        let (mut panel, _clock) = panel_with(provider);

        let view = panel.picker(PickerSource::Cloned, "BETA").await;
        assert_eq!(view.entries.len(), 2);
        assert_eq!(panel.current(), "beta0002");

        let view = panel.picker(PickerSource::Cloned, "gamma").await;
        assert!(view.entries.is_empty());
        assert_eq!(view.preselected, None);
        assert_eq!(panel.current(), "beta0002");
        assert!(panel
            .take_notices()
            .iter()
            .any(|n| n.level == NoticeLevel::Warning));
    }

    #[tokio::test]
    async fn quick_test_preselects_in_picker_and_clears_after_synthesis() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002"]);
        let (mut panel, _clock) = panel_with(provider);

        panel.get_voices(VoiceKind::Cloned, false).await;
        panel.quick_test("beta0002");
        let view = panel.picker(PickerSource::Cloned, "").await;
        assert_eq!(view.preselected, Some(1));
        assert_eq!(panel.current(), "beta0002");

        let audio = panel
            .test_voice("hello", &SynthesisParams::default())
            .await
            .unwrap();
        assert_eq!(audio.voice_id, "beta0002");
        assert_eq!(audio.file_name, "beta0002_hello.mp3");
        assert!(panel.selection().quick_test().is_none());
    }

    #[tokio::test]
    async fn quick_test_survives_cold_cache_fetch() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002"]);
        let (mut panel, _clock) = panel_with(provider);

        panel.quick_test("beta0002");
        let view = panel.picker(PickerSource::Cloned, "").await;
        assert_eq!(view.preselected, Some(1));
        assert_eq!(panel.current(), "beta0002");

        let audio = panel
            .test_voice("hi", &SynthesisParams::default())
            .await
            .unwrap();
        assert_eq!(audio.voice_id, "beta0002");
    }

    #[tokio::test]
    async fn quick_test_survives_stale_cache_refetch() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002"]);
        let (mut panel, clock) = panel_with(provider.clone());

        panel.get_voices(VoiceKind::Cloned, false).await;
        clock.advance(Duration::from_secs(301));
        panel.quick_test("beta0002");
        let view = panel.picker(PickerSource::Cloned, "").await;
        assert_eq!(provider.fetches(), 2);
        assert_eq!(view.preselected, Some(1));
        assert_eq!(panel.current(), "beta0002");
    }

    #[tokio::test]
    async fn test_voice_uses_script_prefix() {
        let provider = FakeProvider::with_cloned(&["alpha001"]);
        let (mut panel, _clock) = panel_with(provider);
        panel.select("alpha001");
        panel.apply_script_pick(ScriptPick {
            file_prefix: "0001".into(),
            voice_search: "xiaoming".into(),
            test_text: "line".into(),
        });

        let audio = panel
            .test_voice("line", &SynthesisParams::default())
            .await
            .unwrap();
        assert_eq!(audio.file_name, "0001_alpha001_line.mp3");
    }

    #[tokio::test]
    async fn empty_audio_is_an_error() {
        let provider = FakeProvider::with_cloned(&["alpha001"]);
        provider.audio.lock().unwrap().clear();
        let (mut panel, _clock) = panel_with(provider);
        panel.select("alpha001");

        assert!(panel.test_voice("hi", &SynthesisParams::default()).await.is_none());
        let notices = panel.take_notices();
        assert!(notices[0].message.contains("empty"));
    }

    #[tokio::test]
    async fn test_voice_requires_text_and_selection() {
        let provider = FakeProvider::with_cloned(&[]);
        let (mut panel, _clock) = panel_with(provider);

        assert!(panel.test_voice("  ", &SynthesisParams::default()).await.is_none());
        assert!(panel.test_voice("hi", &SynthesisParams::default()).await.is_none());
        let notices = panel.take_notices();
        assert_eq!(notices.len(), 2);
        assert_eq!(notices[1].level, NoticeLevel::Warning);
    }

    #[tokio::test]
    async fn delete_refreshes_cloned_catalog() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002"]);
        let (mut panel, _clock) = panel_with(provider.clone());
        panel.get_voices(VoiceKind::Cloned, false).await;

        assert!(panel.delete_voice("alpha001").await);
        let cached = panel.cached(VoiceKind::Cloned).unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(panel.current(), "beta0002");
        assert_eq!(provider.fetches(), 2);
    }

    #[tokio::test]
    async fn bulk_delete_counts_successes() {
        let provider = FakeProvider::with_cloned(&["alpha001", "beta0002"]);
        let (mut panel, _clock) = panel_with(provider.clone());

        let ids = vec!["alpha001".to_string(), "missing01".to_string(), "beta0002".to_string()];
        assert_eq!(panel.delete_voices(&ids).await, 2);
        assert_eq!(provider.deleted.lock().unwrap().len(), 2);
        assert_eq!(provider.fetches(), 1, "one refresh for the whole batch");
    }

    #[tokio::test]
    async fn clone_rejects_bad_voice_id_without_calling_provider() {
        let provider = FakeProvider::with_cloned(&[]);
        let (mut panel, _clock) = panel_with(provider.clone());

        assert!(!panel.clone_voice(1, "1234abcd", &CloneOptions::default()).await);
        assert_eq!(provider.fetches(), 0);
        assert!(panel.take_notices()[0].message.contains("start with a letter"));
    }

    #[tokio::test]
    async fn clone_from_bytes_stages_and_refreshes() {
        let provider = FakeProvider::with_cloned(&[]);
        let (mut panel, _clock) = panel_with(provider.clone());

        let ok = panel
            .clone_from_bytes("take.wav", b"RIFF....WAVE", "narrator01", &CloneOptions::default())
            .await;
        assert!(ok);
        assert_eq!(panel.current(), "narrator01");

        let rejected = panel
            .clone_from_bytes("take.ogg", b"OggS", "narrator02", &CloneOptions::default())
            .await;
        assert!(!rejected);
    }

    #[tokio::test]
    async fn status_reports_slot_ages() {
        let provider = FakeProvider::with_cloned(&["alpha001"]);
        let (mut panel, clock) = panel_with(provider);
        panel.get_voices(VoiceKind::Cloned, false).await;
        clock.advance(Duration::from_secs(42));

        let status = panel.status();
        assert!(status.connected);
        assert_eq!(status.cloned.entries, 1);
        assert_eq!(status.cloned.age_secs, Some(42));
        assert!(!status.system.present);
        assert_eq!(status.system.age_secs, None);
    }
}
