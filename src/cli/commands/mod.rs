//! Command handlers. Each returns `Ok(true)` on success and `Ok(false)` on
//! a graceful failure; `main` maps these to exit codes.

pub mod complete;
pub mod config;
pub mod evaluate;
pub mod monitor;
pub mod process;
pub mod upload;
