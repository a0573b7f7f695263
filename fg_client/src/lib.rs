//! Internal modules for the gym terminal client.
//!
//! This library provides shell command parsing used by the fg_client
//! binary.

pub mod commands;
