//! Portland event ticket aggregation and deal scoring

pub mod cli;
pub mod config;
pub mod providers;
pub mod services;
pub mod types;
