//! Postgres persistence for the temple catalog and generated trip plans.

pub mod catalog;
pub mod config;
pub mod models;
pub mod pool;
pub mod queries;
