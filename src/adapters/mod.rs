//! Concrete adapter implementations for ports.

pub mod csv_adapter;
pub mod file_config_adapter;
pub mod ollama_adapter;
#[cfg(feature = "web")]
pub mod web;
