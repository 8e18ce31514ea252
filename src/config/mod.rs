use thiserror::Error;

mod database;
mod payment;
mod server;
mod storage;

pub use database::Database;
pub use payment::Payment;
pub use server::Server;
pub use storage::Storage;

#[derive(Debug, Error)]
#[error("Failed to load configuration")]
pub struct ParseError;
