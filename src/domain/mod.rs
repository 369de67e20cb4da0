pub mod account;
pub mod error;
pub mod id;
pub mod limiter;
pub mod money;
pub mod payment;
pub mod provider;
pub mod recorder;
