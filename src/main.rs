use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tokio::net::{TcpListener, TcpStream};

use statebridge::app::console::parse_intent;
use statebridge::app::viewer::{run_viewer, ViewerOptions};
use statebridge::app::OwnerRuntime;
use statebridge::bridge::{stream, BridgeSettings};
use statebridge::cli::{Args, Mode};
use statebridge::config::Config;
use statebridge::logging::init_tracing;
use statebridge::shutdown::ShutdownManager;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
    .context("loading configuration")?;

    let shutdown = Arc::new(ShutdownManager::new());
    {
        let shutdown = Arc::clone(&shutdown);
        tokio::spawn(async move {
            if let Err(error) = shutdown.wait_for_signal().await {
                tracing::warn!(%error, "Failed to install signal handlers");
            }
        });
    }

    match args.command {
        Mode::Owner { listen } => run_owner(&config, listen, shutdown).await,
        Mode::View {
            connect,
            dispatch,
            once,
        } => {
            let dispatch = dispatch
                .iter()
                .map(|raw| parse_intent(raw).with_context(|| format!("invalid --dispatch '{raw}'")))
                .collect::<anyhow::Result<Vec<_>>>()?;
            let socket = TcpStream::connect(&connect)
                .await
                .with_context(|| format!("connecting to owner at {connect}"))?;
            tracing::info!(owner = %connect, "Connected to owner");

            let options = ViewerOptions {
                settings: BridgeSettings::from(&config.bridge),
                bootstrap: config.view.bootstrap,
                dispatch,
                once,
            };
            run_viewer(socket, options, std::io::stdout(), &shutdown).await?;
            Ok(())
        }
    }
}

async fn run_owner(
    config: &Config,
    listen: Option<String>,
    shutdown: Arc<ShutdownManager>,
) -> anyhow::Result<()> {
    let mut runtime = OwnerRuntime::new(config);
    runtime.start(Arc::clone(&shutdown));

    if let Some(addr) = listen {
        let listener = TcpListener::bind(&addr)
            .await
            .with_context(|| format!("binding view listener on {addr}"))?;
        tracing::info!(%addr, "Listening for views");
        tokio::spawn(stream::serve_tcp(listener, runtime.endpoint(), Arc::clone(&shutdown)));
    }

    let console = runtime
        .run_console(BufReader::new(tokio::io::stdin()), &shutdown)
        .await;
    runtime.stop(&shutdown).await;
    console.context("reading console input")?;
    Ok(())
}
