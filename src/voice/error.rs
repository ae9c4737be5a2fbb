use serde::Serialize;
use thiserror::Error;

// ── Provider (transport) errors ────────────────────────

/// Failure of a single call against the remote provider.
///
/// A response whose `base_resp.status_code` is non-zero is reported as
/// [`ProviderError::Api`] and handled exactly like a transport failure.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("provider returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("provider error {code}: {message}")]
    Api { code: i64, message: String },
    #[error("unexpected response: {0}")]
    Decode(String),
    #[error("file error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Transport(e.to_string())
    }
}

// ── Error taxonomy ─────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConnectionError {
    #[error("API key and group id are both required")]
    MissingCredentials,
    #[error("could not create provider client: {0}")]
    Client(String),
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("not connected to the provider")]
    NotConnected,
    #[error("failed to fetch {kind} voices: {source}")]
    Provider {
        kind: &'static str,
        #[source]
        source: ProviderError,
    },
}

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("not connected to the provider")]
    NotConnected,
    #[error("{action} failed: {source}")]
    Provider {
        action: &'static str,
        #[source]
        source: ProviderError,
    },
    #[error("synthesized audio is empty")]
    EmptyAudio,
    #[error("could not stage file: {0}")]
    Staging(#[from] std::io::Error),
}

impl OperationError {
    pub fn provider(action: &'static str, source: ProviderError) -> Self {
        OperationError::Provider { action, source }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("voice id must be at least {min} characters")]
    VoiceIdTooShort { min: usize },
    #[error("voice id must start with a letter")]
    VoiceIdLeadingChar,
    #[error("voice id must contain both letters and digits")]
    VoiceIdCharset,
    #[error("unsupported audio format '{0}' (expected wav, mp3, m4a or flac)")]
    AudioFormat(String),
    #[error("audio file is {size} bytes, limit is {limit}")]
    AudioTooLarge { size: u64, limit: u64 },
    #[error("{name} must be within {min}..={max}, got {value}")]
    OutOfRange {
        name: &'static str,
        min: f64,
        max: f64,
        value: f64,
    },
    #[error("test text is empty")]
    EmptyText,
    #[error("unknown {field} '{value}'")]
    UnknownOption { field: &'static str, value: String },
    #[error("timecode must look like HH:MM:SS:FF, got '{0}'")]
    Timecode(String),
    #[error("manifest needs at least a file name and a voice id column")]
    ManifestColumns,
    #[error("manifest could not be read: {0}")]
    Manifest(String),
    #[error("file {index}: {source}")]
    BatchItem {
        index: usize,
        #[source]
        source: Box<ValidationError>,
    },
}

/// Umbrella error for callers that want a single type.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error(transparent)]
    Connection(#[from] ConnectionError),
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error(transparent)]
    Operation(#[from] OperationError),
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// ── Notices ────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// User-visible message produced by the coordinator; drained by the presentation layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn new(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Success, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Info, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(NoticeLevel::Error, message)
    }
}
