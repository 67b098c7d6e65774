//! `minibank-app`: session-holding service and console front-end over the
//! ledger.

pub mod activity;
pub mod bank;
pub mod config;
pub mod console;
pub mod seed;
pub mod view;

pub use bank::{Bank, BankError};
pub use config::AppConfig;
pub use console::{Console, Step};
pub use view::Dashboard;
