//! Library half of the `neurite` binary: config handling and the demo
//! training pipeline, kept out of `main.rs` so integration tests can drive
//! them directly.

pub mod config;
pub mod train;
