//! Command-line interface for grview
//!
//! This module contains CLI argument parsing and configuration

pub mod args;

pub use args::{Args, SortArg};
