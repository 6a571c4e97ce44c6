pub mod estimates;
pub mod fee_data;
pub mod gas;
pub mod selection;
