pub mod balance_validator;
pub mod estimate_selector;
pub mod fee_math;
pub mod polling;
pub mod presentation;
pub mod recalc_engine;
pub mod session;

pub use estimate_selector::{EstimateSelector, SpeedUpDecision};
pub use polling::PollingLifecycle;
pub use recalc_engine::{RecalcEngine, RecalcOutcome};
pub use session::{
    FeeDataObserver, LoggingObserver, SessionCommand, SessionExit, SpeedUpSession, run_session,
};
