//! Terminal front end: one handler per user action.
//!
//! Handlers talk to the [`VoicePanel`] only through its public operations,
//! print results to stdout and drain the panel's notices after every command.

pub mod clone;
pub mod script;
pub mod session;
pub mod synthesize;
pub mod voices;

use crate::script::ScriptTable;
use crate::voice::interface::{CloneModel, CloneOptions, Emotion, SpeechModel};
use crate::voice::{NoticeLevel, SortKey, VoicePanel};

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "voice-panel",
    author,
    version,
    about = "Manage MiniMax voices: browse catalogs, clone, test synthesis"
)]
pub struct Cli {
    /// Panel config file (defaults to the user data directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Flat JSON file whose entries are exported to the environment at startup
    #[arg(long, global = true, default_value = "config.json")]
    pub env_file: PathBuf,

    /// Run a single command; without one an interactive session starts
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// Grammar of one line typed into the interactive session.
#[derive(Parser, Debug)]
#[command(name = "voice-panel", no_binary_name = true, disable_version_flag = true)]
pub struct SessionLine {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Connect with an API key and group id
    Connect(ConnectArgs),
    /// List cloned (default) or system voices
    Voices(VoicesArgs),
    /// Delete one or more cloned voices
    Delete {
        #[arg(required = true)]
        voice_ids: Vec<String>,
    },
    /// Upload an audio file and clone it
    Clone(CloneArgs),
    /// Clone several files at once
    BatchClone(BatchCloneArgs),
    /// Synthesize test audio with the selected voice
    Test(TestArgs),
    /// Browse a script spreadsheet and pick a line to test
    Script(ScriptArgs),
    /// Select a voice and mark it for the next test
    QuickTest { voice_id: String },
    /// Select a voice by id, or by searching a catalog
    Select(SelectArgs),
    /// Show connection, selection and cache state
    Status,
}

#[derive(Args, Debug)]
pub struct ConnectArgs {
    #[arg(long)]
    pub api_key: String,
    #[arg(long)]
    pub group_id: String,
    /// Store the credentials in the panel config
    #[arg(long)]
    pub save: bool,
}

#[derive(Args, Debug, Default)]
pub struct VoicesArgs {
    /// Built-in and remote system voices instead of cloned ones
    #[arg(long)]
    pub system: bool,
    /// Case-insensitive search over id, name and description
    #[arg(long)]
    pub search: Option<String>,
    /// created-desc, created-asc, id-asc, id-desc, description-asc, description-desc
    #[arg(long)]
    pub sort: Option<SortKey>,
    /// Fetch from the provider even if the cache is fresh
    #[arg(long)]
    pub refresh: bool,
}

#[derive(Args, Debug, Default)]
pub struct SelectArgs {
    pub voice_id: Option<String>,
    /// Pick the first voice matching this search
    #[arg(long, conflicts_with = "voice_id")]
    pub search: Option<String>,
    #[arg(long)]
    pub system: bool,
}

#[derive(Args, Debug, Default, Clone)]
pub struct CloneOptionArgs {
    #[arg(long)]
    pub noise_reduction: bool,
    #[arg(long)]
    pub no_volume_normalization: bool,
    /// Text validation accuracy, 0.0 to 1.0
    #[arg(long)]
    pub accuracy: Option<f32>,
    #[arg(long, value_parser = parse_clone_model)]
    pub model: Option<CloneModel>,
}

impl CloneOptionArgs {
    /// Overlay the flags on the configured defaults.
    pub fn apply(&self, base: &CloneOptions) -> CloneOptions {
        let mut options = base.clone();
        if self.noise_reduction {
            options.need_noise_reduction = true;
        }
        if self.no_volume_normalization {
            options.need_volume_normalization = false;
        }
        if let Some(accuracy) = self.accuracy {
            options.accuracy = accuracy;
        }
        if let Some(model) = self.model {
            options.model = model;
        }
        options
    }
}

#[derive(Args, Debug)]
pub struct CloneArgs {
    /// Audio file: wav, mp3, m4a or flac, up to 20 MB
    pub file: PathBuf,
    pub voice_id: String,
    /// Preview text the provider reads back with the new voice
    #[arg(long)]
    pub text: Option<String>,
    #[command(flatten)]
    pub options: CloneOptionArgs,
}

#[derive(Args, Debug)]
pub struct BatchCloneArgs {
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
    /// Ids default to `{base}_1`, `{base}_2`, ...
    #[arg(long)]
    pub base_id: Option<String>,
    /// CSV with columns filename, voice_id[, preview_text]
    #[arg(long)]
    pub manifest: Option<PathBuf>,
    #[command(flatten)]
    pub options: CloneOptionArgs,
}

#[derive(Args, Debug, Default)]
pub struct TestArgs {
    /// Text to speak; defaults to the picked script line
    pub text: Vec<String>,
    /// Voice to use instead of the current selection
    #[arg(long)]
    pub voice: Option<String>,
    #[arg(long)]
    pub speed: Option<f32>,
    #[arg(long)]
    pub volume: Option<f32>,
    #[arg(long, allow_negative_numbers = true)]
    pub pitch: Option<i32>,
    #[arg(long, value_parser = parse_emotion)]
    pub emotion: Option<Emotion>,
    #[arg(long)]
    pub language_boost: Option<String>,
    #[arg(long, value_parser = parse_speech_model)]
    pub model: Option<SpeechModel>,
    /// Output directory (defaults to the configured one)
    #[arg(long)]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug, Default)]
pub struct ScriptArgs {
    /// Spreadsheet to load (xlsx, xls or ods)
    #[arg(long)]
    pub file: Option<PathBuf>,
    #[arg(long)]
    pub search: Option<String>,
    /// Only rows after this timecode (HH:MM:SS:FF)
    #[arg(long)]
    pub after: Option<String>,
    /// Show up to 50 rows instead of 2
    #[arg(long)]
    pub expand: bool,
    /// Use this row (1-based) for the next test
    #[arg(long)]
    pub pick: Option<usize>,
    /// Forget the picked row
    #[arg(long, conflicts_with = "pick")]
    pub clear: bool,
}

fn parse_clone_model(raw: &str) -> Result<CloneModel, String> {
    CloneModel::parse(raw).ok_or_else(|| {
        let names: Vec<&str> = CloneModel::ALL.iter().map(|m| m.as_str()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn parse_speech_model(raw: &str) -> Result<SpeechModel, String> {
    SpeechModel::parse(raw).ok_or_else(|| {
        let names: Vec<&str> = SpeechModel::ALL.iter().map(|m| m.as_str()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

fn parse_emotion(raw: &str) -> Result<Emotion, String> {
    Emotion::parse(raw).ok_or_else(|| {
        let names: Vec<&str> = Emotion::ALL.iter().map(|e| e.as_str()).collect();
        format!("expected one of: {}", names.join(", "))
    })
}

/// State that outlives a single command.
pub struct Session {
    pub panel: VoicePanel,
    pub script: ScriptTable,
    pub config_path: PathBuf,
}

impl Session {
    pub fn new(panel: VoicePanel, config_path: PathBuf) -> Self {
        Self {
            panel,
            script: ScriptTable::default(),
            config_path,
        }
    }
}

pub async fn dispatch(session: &mut Session, command: Command) -> anyhow::Result<()> {
    let result = match command {
        Command::Connect(args) => voices::connect(session, args),
        Command::Voices(args) => voices::list(session, args).await,
        Command::Delete { voice_ids } => voices::delete(session, voice_ids).await,
        Command::Clone(args) => clone::clone(session, args).await,
        Command::BatchClone(args) => clone::batch_clone(session, args).await,
        Command::Test(args) => synthesize::test(session, args).await,
        Command::Script(args) => script::script(session, args).await,
        Command::QuickTest { voice_id } => {
            session.panel.quick_test(&voice_id);
            Ok(())
        }
        Command::Select(args) => voices::select(session, args).await,
        Command::Status => voices::status(session),
    };
    print_notices(&mut session.panel);
    result
}

pub fn print_notices(panel: &mut VoicePanel) {
    for notice in panel.take_notices() {
        match notice.level {
            NoticeLevel::Success => println!("[ok] {}", notice.message),
            NoticeLevel::Info => println!("[info] {}", notice.message),
            NoticeLevel::Warning => eprintln!("[warn] {}", notice.message),
            NoticeLevel::Error => eprintln!("[error] {}", notice.message),
        }
    }
}
