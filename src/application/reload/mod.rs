//! Reload Use Case
//!
//! This module implements the live reload loop. It orchestrates:
//! - Change detection (via `notify` plus a poll timer)
//! - Debouncing (100ms default)
//! - The per-file pipeline: diff, synthesize, transform, compile, load
//! - Event reporting and the host's reload callback
//!
//! ## Usage
//!
//! ```ignore
//! let handle = Reloader::new("src/main.rs")
//!     .on_event(|event| println!("{}", event.to_json()))
//!     .start()?;
//! ```

mod detector;
mod event;
mod pipeline;
mod state;
mod use_case;


pub use detector::{Batches, ChangeDetector};
pub use event::{CycleFailure, CycleOutcome, ReloadEvent, Stage, DEBOUNCE_MS};
pub use pipeline::ReloadPipeline;
pub use state::ReloaderState;
pub use use_case::{ReloadHandle, ReloadSession, Reloader};
