use clap::Parser;
use coinpay_wallet::WalletConfig;
use eyre::Result;

/// CLI arguments for `coinpay config`.
#[derive(Clone, Debug, Parser)]
pub struct ConfigArgs {
    /// Only check that a wallet session could be started.
    #[arg(long)]
    pub check: bool,
}

impl ConfigArgs {
    pub fn run(self) -> Result<()> {
        let config = WalletConfig::load()?;
        if self.check {
            config.project_id()?;
            println!("Wallet configuration is valid.");
            return Ok(());
        }

        println!("{}", serde_json::to_string_pretty(&config)?);
        if let Err(err) = config.project_id() {
            eprintln!("warning: {err}");
        }
        Ok(())
    }
}
