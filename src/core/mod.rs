// src/core/mod.rs

pub mod cluster;
pub mod corpus;
pub mod estimator;
pub mod sampling;
pub mod session;
pub mod types;
