//! Domain Services
//!
//! Pure logic of the reload pipeline. These services have no I/O
//! dependencies and are easily testable.

pub mod command_transformer;
pub mod differ;
pub mod synthesizer;
pub mod units;

pub use command_transformer::{CommandTransformer, TransformRequest};
pub use differ::{BodyDelta, DiffResult, StructuralDiffer, UnitChange};
pub use synthesizer::{symbol_key, Override, PatchRequest, PatchSynthesizer, SynthesizedPatch};
pub use units::parse_file;
