pub mod convert;
pub mod format;
pub mod logger;

pub use convert::*;
pub use format::*;
