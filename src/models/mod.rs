pub mod domain;

pub use domain::estimates::{FeeEstimateSnapshot, GasFeeState, RawFeeEstimates, TierEstimate};
pub use domain::fee_data::{FeeAmount, FeeDataResult, GasAnalyticsParams, TimeEstimate};
pub use domain::gas::{ExistingTransaction, FeePair, GasEstimateType, GasFeeInput, GasTier};
pub use domain::selection::{EngineState, SelectionState, SpeedUpOptionsOverride};
