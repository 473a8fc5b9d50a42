//! Command implementations.

pub mod config;
pub mod detect;
pub mod samples;
pub mod serve;
