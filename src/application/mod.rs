//! Application Layer
//!
//! Use cases that orchestrate the business flow.
//! This layer:
//! - Depends on Domain layer (entities, services, ports)
//! - Does NOT contain business rules (those are in Domain)
//! - Coordinates between Infrastructure and Domain
//!
//! ## Use Cases
//!
//! - `Reloader` - Startup scan, watch loop and the per-file reload pipeline
//!
//! ## Services
//!
//! - `SourceStore` - Latest file contents with an invalidation-aware parse cache

pub mod reload;
pub mod source_store;

pub use reload::{
    CycleFailure, CycleOutcome, ReloadEvent, ReloadHandle, ReloadSession, Reloader, Stage,
    DEBOUNCE_MS,
};
pub use source_store::SourceStore;
