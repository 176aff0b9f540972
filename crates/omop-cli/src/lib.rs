//! Library side of the `omop-etl` command line.

#![deny(unsafe_code)]

pub mod config;
pub mod export;
pub mod input;
pub mod logging;
pub mod pipeline;
pub mod types;
