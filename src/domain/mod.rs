//! Core domain types and logic.

pub mod records;
pub mod fund_data;
pub mod analytics;
pub mod function_call;
pub mod call_parser;
pub mod prompt;
pub mod assistant;
pub mod session;
pub mod error;
