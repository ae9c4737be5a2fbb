use clap::Parser;
use minimax_voice_panel_lib::commands::Cli;
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("minimax_voice_panel_lib=info,voice_panel=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    minimax_voice_panel_lib::run(cli).await
}
