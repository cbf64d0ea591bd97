pub mod session;
pub mod transfer;

pub use session::{ChatId, Session};
pub use transfer::{TransferError, TransferOutcome, TransferRequest};
