use alloy_primitives::Address;
use clap::Parser;
use coinpay_wallet::{PaymentForm, SessionManager, units};
use eyre::Result;

/// CLI arguments for `coinpay pay`.
#[derive(Clone, Debug, Parser)]
pub struct PayArgs {
    /// The recipient address.
    #[arg(long, value_name = "ADDRESS")]
    pub to: String,

    /// The amount to send, in ether.
    #[arg(long, value_name = "ETHER")]
    pub amount: String,
}

impl PayArgs {
    pub async fn run(self, manager: &SessionManager) -> Result<()> {
        let form = PaymentForm::new(self.to, self.amount);
        // Reject bad input before asking the user to approve anything.
        form.to_transaction(Address::ZERO)?;

        let connection = manager.connect().await?;
        println!("Paying from {}", units::format_address(&connection.address));

        let receipt = form.submit(&manager.dispatcher()).await?;
        println!("Transaction sent: {}", receipt.tx_hash);
        println!("{}", receipt.explorer_url);
        Ok(())
    }
}
