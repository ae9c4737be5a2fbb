pub mod batch;
pub mod cache;
pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod filter;
pub mod interface;
pub mod manager;
pub mod minimax;
pub mod selection;
pub mod validation;

pub use batch::{BatchPlan, BatchReport};
pub use config::{load_config, save_config, PanelConfig};
pub use error::{
    ConnectionError, FetchError, Notice, NoticeLevel, OperationError, PanelError, ProviderError,
    ValidationError,
};
pub use filter::{filter, sort, SortKey};
pub use interface::{
    CloneOptions, SourceKind, SynthesisParams, VoiceCatalogEntry, VoiceKind, VoiceProvider,
};
pub use manager::{ConnectionContext, PickerSource, PickerView, TestAudio, VoicePanel};
pub use minimax::MiniMaxClient;
