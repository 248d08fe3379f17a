pub mod status;
pub mod transaction;

pub use status::TransactionStatus;
pub use transaction::{TotalPrice, Transaction};
