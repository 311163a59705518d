//! Per-file reload cycle
//!
//! `Reading → Diffing → Synthesizing → Transforming → Compiling → Loading`.
//! Each stage either hands its result to the next one or ends the cycle
//! with a [`CycleFailure`] naming the stage.

use std::fs;
use std::path::Path;

use crate::domain::ports::{ArtifactLoader, CommandSource, Compiler};
use crate::domain::services::{
    CommandTransformer, PatchRequest, PatchSynthesizer, StructuralDiffer, TransformRequest,
};
use crate::domain::value_objects::{module_path, BuildCommand, ProjectLayout};
use crate::error::ReloadError;

use super::event::{display, CycleFailure, CycleOutcome, ReloadEvent, Stage};
use super::state::ReloaderState;

type StageResult<T> = Result<T, CycleFailure>;

trait AtStage<T> {
    fn at(self, stage: Stage) -> StageResult<T>;
}

impl<T> AtStage<T> for Result<T, ReloadError> {
    fn at(self, stage: Stage) -> StageResult<T> {
        self.map_err(|error| CycleFailure::new(stage, error))
    }
}

/// The host crate a file belongs to
struct HostCrate {
    command: BuildCommand,
    crate_name: String,
    module_path: Vec<String>,
}

/// Stateless stages plus the ports they drive
pub struct ReloadPipeline {
    layout: ProjectLayout,
    commands: Box<dyn CommandSource>,
    compiler: Box<dyn Compiler>,
    loader: Box<dyn ArtifactLoader>,
    differ: StructuralDiffer,
    synthesizer: PatchSynthesizer,
    transformer: CommandTransformer,
}

impl ReloadPipeline {
    pub fn new(
        layout: ProjectLayout,
        commands: Box<dyn CommandSource>,
        compiler: Box<dyn Compiler>,
        loader: Box<dyn ArtifactLoader>,
    ) -> Self {
        Self {
            layout,
            commands,
            compiler,
            loader,
            differ: StructuralDiffer::new(),
            synthesizer: PatchSynthesizer::new(),
            transformer: CommandTransformer::new(),
        }
    }

    pub fn layout(&self) -> &ProjectLayout {
        &self.layout
    }

    /// Run one cycle for `path`. Intermediate progress goes to `observer`.
    pub fn run(
        &self,
        state: &mut ReloaderState,
        path: &Path,
        observer: &dyn Fn(ReloadEvent),
    ) -> StageResult<CycleOutcome> {
        // Reading
        let content = fs::read_to_string(path)
            .map_err(|source| ReloadError::Read {
                path: path.to_path_buf(),
                source,
            })
            .at(Stage::Reading)?;

        if !state.store.contains(path) {
            state.store.load(path, content);
            return Ok(CycleOutcome::Tracked);
        }

        let host = self.host_crate(path).at(Stage::Reading)?;

        // Diffing
        let old = match state.store.units_of(path) {
            Ok(old) => old,
            Err(_) => {
                // The baseline never parsed; the new content replaces it
                state.store.load(path, content);
                state.store.units_of(path).at(Stage::Diffing)?;
                return Ok(CycleOutcome::Tracked);
            }
        };
        let previous = state.store.content_of(path).unwrap_or_default().to_string();
        if !state.store.update(path, content) {
            return Ok(CycleOutcome::NoChanges);
        }
        let new = match state.store.units_of(path) {
            Ok(new) => new,
            Err(error) => {
                state.store.load(path, previous);
                return Err(CycleFailure::new(Stage::Diffing, error));
            }
        };

        let diff = self.differ.diff(&old.units, &new.units);
        if diff.is_empty() {
            return Ok(CycleOutcome::NoChanges);
        }
        tracing::debug!(path = %path.display(), changes = %diff.summary(), "diffed");

        // Synthesizing
        let generation = state.counter.allocate();
        let patch = self
            .synthesizer
            .synthesize(&PatchRequest {
                diff: &diff,
                old: &old,
                new: &new,
                crate_name: &host.crate_name,
                module_path: &host.module_path,
                generation,
            })
            .at(Stage::Synthesizing)?;

        let patch_source = self.layout.patch_source_path(path, generation);
        fs::create_dir_all(&self.layout.patch_root)
            .and_then(|_| fs::write(&patch_source, &patch.source))
            .map_err(ReloadError::from)
            .at(Stage::Synthesizing)?;
        observer(ReloadEvent::PatchGenerated {
            path: display(path),
            generation,
            patch: display(&patch_source),
            changes: diff.summary(),
            overrides: patch.overrides.len(),
        });

        // Transforming
        let artifact = self.layout.artifact_path(path, generation);
        let command = self.transformer.transform(
            &host.command,
            &TransformRequest {
                patch_source: &patch_source,
                artifact: &artifact,
                crate_name: &host.crate_name,
                generation,
            },
        );
        tracing::trace!(command = %command, "patch compile");

        // Compiling
        observer(ReloadEvent::Compiling {
            path: display(path),
            generation,
        });
        self.compiler.compile(&command).at(Stage::Compiling)?;

        // Loading
        let overrides = self.loader.load(&artifact, generation).at(Stage::Loading)?;
        Ok(CycleOutcome::Loaded {
            generation,
            overrides,
            artifact,
        })
    }

    /// Recorded command, crate name and module path of `path`
    fn host_crate(&self, path: &Path) -> Result<HostCrate, ReloadError> {
        let command = self.commands.find_command(path)?;
        let missing = || ReloadError::ModuleNameMissing {
            path: path.to_path_buf(),
        };
        let crate_name = command.find_value("--crate-name").ok_or_else(missing)?.to_string();
        let inputs = command.source_inputs();
        let crate_root = inputs.first().map(|root| Path::new(*root)).ok_or_else(missing)?;
        let module_path = module_path(crate_root, path).ok_or_else(missing)?;
        Ok(HostCrate {
            command,
            crate_name,
            module_path,
        })
    }
}
