//! Reloader state
//!
//! Owned by the watch thread; it is the only writer.

use crate::application::source_store::SourceStore;
use crate::domain::value_objects::GenerationCounter;

#[derive(Debug, Default)]
pub struct ReloaderState {
    pub store: SourceStore,
    pub counter: GenerationCounter,
}

impl ReloaderState {
    pub fn new() -> Self {
        Self::default()
    }
}
