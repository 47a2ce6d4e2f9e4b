#[macro_use]
extern crate tracing;

use clap::Parser;
use eyre::Result;

mod args;
mod cmd;
mod handler;
mod utils;

use args::{Coinpay, CoinpaySubcommand};

fn main() -> Result<()> {
    handler::install();
    utils::load_dotenv();
    utils::subscriber();
    let args = Coinpay::parse();
    main_args(args)
}

#[tokio::main]
async fn main_args(args: Coinpay) -> Result<()> {
    let Coinpay { global, cmd } = args;
    match cmd {
        CoinpaySubcommand::Config(cmd) => cmd.run(),
        CoinpaySubcommand::Connect(cmd) => {
            let manager = utils::session_manager(&global)?;
            utils::with_session(&manager, cmd.run(&manager)).await
        }
        CoinpaySubcommand::Pay(cmd) => {
            let manager = utils::session_manager(&global)?;
            utils::with_session(&manager, cmd.run(&manager)).await
        }
        CoinpaySubcommand::Sign(cmd) => {
            let manager = utils::session_manager(&global)?;
            utils::with_session(&manager, cmd.run(&manager)).await
        }
    }
}
