//! Subcommands of the `coinpay` binary.

pub mod config;
pub mod connect;
pub mod pay;
pub mod sign;
