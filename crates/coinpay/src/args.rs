use clap::{Parser, Subcommand};

use crate::cmd::{config::ConfigArgs, connect::ConnectArgs, pay::PayArgs, sign::SignArgs};

/// Pay with a browser wallet from the command line.
#[derive(Debug, Parser)]
#[command(name = "coinpay", version, next_display_order = None)]
pub struct Coinpay {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub cmd: CoinpaySubcommand,
}

#[derive(Clone, Debug, Default, clap::Args)]
pub struct GlobalOpts {
    /// Never start a wallet session, as in CI or when input is piped.
    #[arg(long, global = true)]
    pub headless: bool,

    /// Port of the local wallet bridge. Defaults to `bridge_port` from the config, `0` for any free port.
    #[arg(long, global = true, value_name = "PORT")]
    pub port: Option<u16>,
}

#[derive(Debug, Subcommand)]
pub enum CoinpaySubcommand {
    /// Connects a wallet and prints the approved account.
    #[command(visible_alias = "c")]
    Connect(ConnectArgs),

    /// Sends an ether payment from the connected wallet.
    #[command(visible_alias = "p")]
    Pay(PayArgs),

    /// Signs a message with the connected wallet (`personal_sign`).
    #[command(visible_alias = "s")]
    Sign(SignArgs),

    /// Prints the resolved configuration.
    Config(ConfigArgs),
}
