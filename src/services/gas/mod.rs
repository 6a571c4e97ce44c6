pub mod estimate_service;
pub mod gas_fee_feed;
pub mod gas_strategy;

pub use estimate_service::FeeEstimateService;
pub use gas_fee_feed::RpcGasFeeFeed;
