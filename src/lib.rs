// src/lib.rs

pub mod config;
pub mod core;
pub mod error;
pub mod judgment;
pub mod operator;
pub mod partition;
pub mod persistence;
pub mod run;
pub use crate::core::session::SessionDriver;
