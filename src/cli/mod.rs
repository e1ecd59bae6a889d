//! Command-line interface implementation

pub mod commands;
