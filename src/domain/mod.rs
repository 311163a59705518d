//! Domain Layer
//!
//! The pure part of the reload pipeline, without I/O dependencies.
//!
//! ## Structure
//!
//! - `entities/` - Code units and parsed files
//! - `value_objects/` - Immutable value types (ScopePath, Generation, BuildCommand, ProjectLayout)
//! - `services/` - Unit extraction, structural diff, patch synthesis, command transformation
//! - `ports/` - Interface definitions for infrastructure (compiler, loader, build manifest)
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the file system or spawns processes
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod ports;
pub mod services;
pub mod value_objects;
