//! Data models for invoice fields and configuration.

pub mod config;
pub mod invoice;
