// src/lib.rs — Library root for the resilience engine

pub mod cli;
pub mod core;
pub mod forecast;
pub mod infra;
pub mod scoring;
pub mod sources;
