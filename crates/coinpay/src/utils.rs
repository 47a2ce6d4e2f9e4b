use std::{future::Future, io::IsTerminal, sync::Arc};

use coinpay_wallet::{
    BridgeLoader, Environment, Headless, Interactive, SessionEvent, SessionManager, WalletConfig,
    units,
};
use eyre::Result;
use tokio::{sync::broadcast::error::RecvError, task::JoinHandle};

use crate::args::GlobalOpts;

/// Initializes a tracing Subscriber for logging
pub fn subscriber() {
    tracing_subscriber::FmtSubscriber::builder()
        .with_writer(std::io::stderr)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
}

/// Loads a `.env` file from the working directory, if any.
pub fn load_dotenv() {
    if let Err(err) = dotenvy::dotenv()
        && !err.not_found()
    {
        eprintln!("warning: failed to load .env file: {err}");
    }
}

/// Builds the session manager for the current invocation.
///
/// The wallet is only paired when a person is at the terminal: `--headless` or non-terminal
/// stdin yields a manager that never starts a session.
pub fn session_manager(opts: &GlobalOpts) -> Result<SessionManager> {
    let mut config = WalletConfig::load()?;
    if let Some(port) = opts.port {
        config.bridge_port = port;
    }

    let environment: Arc<dyn Environment> = if opts.headless || !std::io::stdin().is_terminal() {
        Arc::new(Headless)
    } else {
        Arc::new(Interactive::new(config.url.clone()))
    };
    let loader = BridgeLoader::new(config.bridge_port).on_listen(|url| {
        eprintln!("Open {url} in a browser with a wallet extension to continue.");
    });

    Ok(SessionManager::new(config, Arc::new(loader), environment))
}

/// Initializes the session and runs `fut` while logging session notifications, then tears the
/// session down.
pub async fn with_session(
    manager: &SessionManager,
    fut: impl Future<Output = Result<()>>,
) -> Result<()> {
    let events = spawn_event_logger(manager);
    let res = async {
        manager.try_initialize().await?;
        fut.await
    }
    .await;
    manager.disconnect().await;
    events.abort();
    res
}

fn spawn_event_logger(manager: &SessionManager) -> JoinHandle<()> {
    let mut events = manager.subscribe();
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(SessionEvent::AccountChanged(Some(account))) => {
                    info!(account = %units::format_address(&account), "wallet account changed");
                }
                Ok(SessionEvent::AccountChanged(None)) => info!("wallet exposes no account"),
                Ok(SessionEvent::ChainChanged(chain_id)) => info!(chain_id, "wallet chain changed"),
                Ok(SessionEvent::Disconnected) => info!("wallet disconnected"),
                Ok(event) => debug!(?event, "wallet session event"),
                Err(RecvError::Lagged(_)) => continue,
                Err(RecvError::Closed) => break,
            }
        }
    })
}
