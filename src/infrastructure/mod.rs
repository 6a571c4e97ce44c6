pub mod feed;
pub mod provider;
pub mod sources;
