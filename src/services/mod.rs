pub mod gas;
pub mod speedup;

pub use gas::{FeeEstimateService, RpcGasFeeFeed};
pub use speedup::{RecalcEngine, SpeedUpSession};
