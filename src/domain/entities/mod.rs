//! Domain Entities
//!
//! - `CodeUnit` - A declared function or named type
//! - `ParsedFile` - All code units of one file, plus synthesis facts

mod code_unit;
mod parsed_file;

pub use code_unit::{CodeUnit, UnitKind};
pub use parsed_file::{qualify_modules, ParsedFile};
