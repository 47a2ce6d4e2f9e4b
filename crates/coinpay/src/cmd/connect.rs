use clap::Parser;
use coinpay_wallet::{SessionEvent, SessionManager, units};
use eyre::Result;
use tokio::sync::broadcast::error::RecvError;

/// CLI arguments for `coinpay connect`.
#[derive(Clone, Debug, Parser)]
pub struct ConnectArgs {
    /// Keep the session open until Ctrl+C or until the wallet disconnects.
    #[arg(long, short)]
    pub watch: bool,
}

impl ConnectArgs {
    pub async fn run(self, manager: &SessionManager) -> Result<()> {
        let mut events = manager.subscribe();
        let connection = manager.connect().await?;
        println!(
            "Connected {} on chain {}",
            units::format_address(&connection.address),
            connection.chain_id
        );

        if !self.watch {
            return Ok(());
        }

        println!("Watching the wallet session, press Ctrl+C to disconnect.");
        loop {
            tokio::select! {
                _ = tokio::signal::ctrl_c() => break,
                event = events.recv() => match event {
                    Ok(SessionEvent::Disconnected) | Err(RecvError::Closed) => {
                        println!("Wallet disconnected.");
                        break;
                    }
                    Ok(SessionEvent::AccountChanged(Some(account))) => {
                        println!("Account: {}", units::format_address(&account));
                    }
                    Ok(SessionEvent::ChainChanged(chain_id)) => println!("Chain: {chain_id}"),
                    Ok(_) | Err(RecvError::Lagged(_)) => {}
                },
            }
        }
        Ok(())
    }
}
