use crate::script::ScriptPick;
use serde::Serialize;

/// Session-wide selection shared by every voice picker.
///
/// Only [`super::manager::VoicePanel`] writes to it; last write wins.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SelectionState {
    current_voice_id: String,
    quick_test: Option<String>,
    script: Option<ScriptPick>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn current(&self) -> &str {
        &self.current_voice_id
    }

    pub(crate) fn select(&mut self, voice_id: impl Into<String>) {
        self.current_voice_id = voice_id.into();
    }

    /// Voice id raised by the quick-test shortcut, if still pending.
    pub fn quick_test(&self) -> Option<&str> {
        self.quick_test.as_deref()
    }

    pub(crate) fn set_quick_test(&mut self, voice_id: impl Into<String>) {
        let voice_id = voice_id.into();
        self.current_voice_id = voice_id.clone();
        self.quick_test = Some(voice_id);
    }

    pub(crate) fn clear_quick_test(&mut self) {
        self.quick_test = None;
    }

    pub fn script(&self) -> Option<&ScriptPick> {
        self.script.as_ref()
    }

    pub(crate) fn set_script(&mut self, pick: ScriptPick) {
        self.script = Some(pick);
    }

    pub(crate) fn clear_script(&mut self) {
        self.script = None;
    }
}
