//! Tasker CLI library.
//!
//! Argument definitions and command handlers for the `tasker` binary.

pub mod cli;
pub mod commands;
