pub mod commands;
pub mod config;
pub mod script;
pub mod utils;
pub mod voice;

use crate::commands::{dispatch, session, Cli, Session};
use crate::voice::VoicePanel;

/// Entry for the `voice-panel` binary: export `config.json` into the
/// environment, load the panel config, connect quietly, then run one command
/// or an interactive session.
pub async fn run(cli: Cli) -> anyhow::Result<()> {
    config::merge_env_file(&cli.env_file);

    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(voice::config::default_config_path);
    let panel_config = voice::load_config(&config_path);
    let panel = VoicePanel::from_startup(panel_config);
    if !panel.is_connected() {
        tracing::info!("[Startup] No credentials found; use `connect` to sign in");
    }

    let mut session = Session::new(panel, config_path);
    match cli.command {
        Some(command) => dispatch(&mut session, command).await,
        None => session::run_interactive(&mut session).await,
    }
}
