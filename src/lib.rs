pub mod adapters;
pub mod config;
pub mod domain;
pub mod infra;
pub mod services;

pub use services::dispatcher::PaymentDispatcher;
