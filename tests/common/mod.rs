//! Common test utilities for hot-reload integration tests.
//!
//! This module provides:
//! - `TestProject`: a throwaway Cargo project with a recorded build manifest
//! - `run_cli`: run the hot-reload binary and capture its output
//! - Recording fakes for the compiler and loader ports

#![allow(dead_code)]

pub mod env;
pub mod fakes;

pub use env::*;
pub use fakes::*;
