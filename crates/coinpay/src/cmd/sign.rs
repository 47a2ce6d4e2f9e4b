use clap::Parser;
use coinpay_wallet::SessionManager;
use eyre::Result;

/// CLI arguments for `coinpay sign`.
#[derive(Clone, Debug, Parser)]
pub struct SignArgs {
    /// The message to sign.
    pub message: String,
}

impl SignArgs {
    pub async fn run(self, manager: &SessionManager) -> Result<()> {
        manager.connect().await?;
        let signature = manager.dispatcher().sign_message(&self.message).await?;
        println!("{signature}");
        Ok(())
    }
}
