//! `minibank-auth`: credential rules and session bookkeeping.
//!
//! This crate is intentionally decoupled from the ledger and from any
//! front-end: sessions are generic over whatever principal the caller uses.

pub mod credentials;
pub mod session;

pub use credentials::{Credentials, CredentialsError, Password};
pub use session::{SessionError, SessionRegistry};
