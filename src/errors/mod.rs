pub mod error;

pub use error::{AppError, InsufficientFunds, RecalcSkip};
