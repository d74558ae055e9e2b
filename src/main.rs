mod cli;

use anyhow::Context;
use clap::Parser;
use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use presence_card::{
    CardError, Config, LastSeenCache, PollTransport, PresenceWidget, SocketTransport, SystemClock,
    TerminalSink, Transport, TransportKind,
};

use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("presence_card=info,warn"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    // Handle ConfigSample immediately without loading config
    if let Some(Commands::ConfigSample { output }) = &cli.command {
        let sample = Config::sample();
        let path = output
            .clone()
            .unwrap_or_else(|| std::path::PathBuf::from("./presence-card.sample.yaml"));
        sample.save(&path).context("writing sample config")?;
        println!("sample config written to {:?}", path);
        return Ok(());
    }

    let mut config = match Config::load(&cli.config_path) {
        Ok(config) => config,
        // --user-id alone is enough to run with defaults
        Err(CardError::ConfigNotFound(_)) if cli.user_id.is_some() => {
            Config::with_user(cli.user_id.clone().unwrap_or_default())
        }
        Err(e) => return Err(e).context("loading config"),
    };
    if let Some(user_id) = cli.user_id {
        config.user_id = user_id;
    }
    if let Some(transport) = cli.transport {
        config.transport = transport;
    }

    info!(
        "tracking {} over {:?} transport",
        config.user_id, config.transport
    );

    let (tx, rx) = mpsc::channel(8);

    match config.transport {
        TransportKind::Poll => {
            let mut transport = PollTransport::new(&config.poll, &config.user_id)
                .context("building poll transport")?;
            tokio::spawn(async move {
                if let Err(e) = transport.run(tx).await {
                    error!("poll transport stopped: {}", e);
                }
            });
        }
        TransportKind::Socket => {
            let mut transport = SocketTransport::new(&config.socket, &config.user_id);
            tokio::spawn(async move {
                if let Err(e) = transport.run(tx).await {
                    error!("socket transport stopped: {}", e);
                }
            });
        }
    }

    let widget = PresenceWidget::new(Box::new(TerminalSink::new()), Box::new(SystemClock))
        .with_cache(LastSeenCache::new(&config.cache));
    widget.run(rx).await;

    Ok(())
}
