//! Reloader use case
//!
//! Startup (layout, patch-root purge, baseline scan, watcher registration)
//! and the watch loop that feeds every reported file through the pipeline.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crate::config::Config;
use crate::domain::ports::{ArtifactLoader, CommandSource, Compiler};
use crate::error::ReloadResult;
use crate::infrastructure::manifest::ManifestCommandSource;
use crate::infrastructure::project::{discover_layout, find_project_root, purge_patch_root};
use crate::infrastructure::{DylibLoader, ProcessCompiler};

use super::detector::ChangeDetector;
use super::event::{display, CycleOutcome, ReloadEvent};
use super::pipeline::ReloadPipeline;
use super::state::ReloaderState;

type Observer = Box<dyn Fn(&ReloadEvent) + Send>;
type ReloadCallback = Box<dyn Fn() + Send>;

/// Builder for a live reloader
///
/// ```ignore
/// let handle = Reloader::new("src/main.rs")
///     .on_reload(|| println!("patched"))
///     .start()?;
/// // ...
/// handle.stop();
/// ```
pub struct Reloader {
    entry: PathBuf,
    config: Option<Config>,
    compiler: Option<Box<dyn Compiler>>,
    loader: Option<Box<dyn ArtifactLoader>>,
    commands: Option<Box<dyn CommandSource>>,
    observer: Option<Observer>,
    on_reload: Option<ReloadCallback>,
}

impl Reloader {
    /// `entry` is the host's entry source file; its directory is watched
    pub fn new(entry: impl Into<PathBuf>) -> Self {
        Self {
            entry: entry.into(),
            config: None,
            compiler: None,
            loader: None,
            commands: None,
            observer: None,
            on_reload: None,
        }
    }

    /// Use this configuration instead of the project/user/env hierarchy
    pub fn with_config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    pub fn with_compiler(mut self, compiler: impl Compiler + 'static) -> Self {
        self.compiler = Some(Box::new(compiler));
        self
    }

    pub fn with_loader(mut self, loader: impl ArtifactLoader + 'static) -> Self {
        self.loader = Some(Box::new(loader));
        self
    }

    pub fn with_command_source(mut self, commands: impl CommandSource + 'static) -> Self {
        self.commands = Some(Box::new(commands));
        self
    }

    /// Receive every [`ReloadEvent`]
    pub fn on_event<F>(mut self, observer: F) -> Self
    where
        F: Fn(&ReloadEvent) + Send + 'static,
    {
        self.observer = Some(Box::new(observer));
        self
    }

    /// Called after every successful load
    pub fn on_reload<F>(mut self, callback: F) -> Self
    where
        F: Fn() + Send + 'static,
    {
        self.on_reload = Some(Box::new(callback));
        self
    }

    /// Run startup synchronously and return the session without starting
    /// the watch loop
    pub fn prepare(self) -> ReloadResult<ReloadSession> {
        let config = match self.config {
            Some(config) => config,
            None => {
                let root = find_project_root(&self.entry);
                Config::load_or_default(root.as_deref())
            }
        };
        let layout = discover_layout(&self.entry, &config.build)?;
        purge_patch_root(&layout)?;

        let commands = self.commands.unwrap_or_else(|| {
            Box::new(ManifestCommandSource::new(
                layout.manifest_path(&config.build.manifest),
                config.build.tool.clone(),
            ))
        });
        let compiler = self
            .compiler
            .unwrap_or_else(|| Box::new(ProcessCompiler::new().with_timeout(config.build.compile_timeout())));
        let loader = self.loader.unwrap_or_else(|| Box::new(DylibLoader::new()));

        let mut detector = ChangeDetector::new(
            layout.source_root.clone(),
            config.watch.extensions.clone(),
            layout.build_root.clone(),
        );
        let mut state = ReloaderState::new();
        for path in detector.poll() {
            match fs::read_to_string(&path) {
                Ok(content) => state.store.load(&path, content),
                Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file"),
            }
        }
        tracing::info!(
            root = %layout.source_root.display(),
            files = state.store.len(),
            "initial scan complete"
        );

        Ok(ReloadSession {
            pipeline: ReloadPipeline::new(layout, commands, compiler, loader),
            state,
            detector: Some(detector),
            config,
            observer: self.observer,
            on_reload: self.on_reload,
        })
    }

    /// Run startup, then watch on a background thread
    pub fn start(self) -> ReloadResult<ReloadHandle> {
        let mut session = self.prepare()?;
        let running = Arc::new(AtomicBool::new(true));
        let batches = session.watch(Arc::clone(&running))?;

        let thread = std::thread::Builder::new()
            .name("hot-reload".to_string())
            .spawn(move || session.run(batches))?;

        Ok(ReloadHandle {
            running,
            thread: Some(thread),
        })
    }
}

/// A prepared reloader: baseline loaded, not yet watching
pub struct ReloadSession {
    pipeline: ReloadPipeline,
    state: ReloaderState,
    detector: Option<ChangeDetector>,
    config: Config,
    observer: Option<Observer>,
    on_reload: Option<ReloadCallback>,
}

impl ReloadSession {
    pub fn state(&self) -> &ReloaderState {
        &self.state
    }

    pub fn source_root(&self) -> &Path {
        &self.pipeline.layout().source_root
    }

    fn emit(&self, event: ReloadEvent) {
        if let Some(observer) = &self.observer {
            observer(&event);
        }
    }

    /// Register the watcher. Can be called once.
    pub fn watch(&mut self, running: Arc<AtomicBool>) -> ReloadResult<super::detector::Batches> {
        let detector = self.detector.take().ok_or_else(|| {
            std::io::Error::other("reload session is already watching")
        })?;
        let batches = detector.batches(running, self.config.watch.debounce(), self.config.watch.poll_interval())?;
        self.emit(ReloadEvent::WatchStarted {
            root: display(self.source_root()),
            files: self.state.store.len(),
        });
        Ok(batches)
    }

    /// Consume batches until the iterator ends
    pub fn run<I>(mut self, batches: I)
    where
        I: IntoIterator<Item = Vec<PathBuf>>,
    {
        for batch in batches {
            self.handle_batch(&batch);
        }
        self.emit(ReloadEvent::Shutdown);
    }

    /// Run every path of one batch through the pipeline, in order.
    /// Returns the outcome of each path that did not fail.
    pub fn handle_batch(&mut self, batch: &[PathBuf]) -> Vec<CycleOutcome> {
        let mut outcomes = Vec::new();
        for path in batch {
            self.emit(ReloadEvent::FileChanged {
                path: display(path),
            });

            let sink = &self.observer;
            let observer = |event: ReloadEvent| {
                if let Some(observer) = sink {
                    observer(&event);
                }
            };
            let result = self.pipeline.run(&mut self.state, path, &observer);
            match result {
                Ok(outcome) => {
                    self.report(path, &outcome);
                    outcomes.push(outcome);
                }
                Err(failure) => {
                    tracing::debug!(path = %path.display(), stage = %failure.stage, "cycle failed");
                    self.emit(ReloadEvent::failed(path, &failure));
                }
            }
        }
        outcomes
    }

    fn report(&self, path: &Path, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Tracked => self.emit(ReloadEvent::FileTracked {
                path: display(path),
            }),
            CycleOutcome::NoChanges => self.emit(ReloadEvent::NoChanges {
                path: display(path),
            }),
            CycleOutcome::Loaded {
                generation,
                overrides,
                artifact,
            } => {
                self.emit(ReloadEvent::PatchLoaded {
                    path: display(path),
                    generation: *generation,
                    artifact: display(artifact),
                    overrides: *overrides,
                });
                if let Some(callback) = &self.on_reload {
                    callback();
                }
            }
        }
    }
}

/// Handle of a running reloader
pub struct ReloadHandle {
    running: Arc<AtomicBool>,
    thread: Option<JoinHandle<()>>,
}

impl ReloadHandle {
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Flag the running watch loop to stop without waiting for it
    pub fn running_flag(&self) -> Arc<AtomicBool> {
        Arc::clone(&self.running)
    }

    /// Stop watching and join the watch thread
    pub fn stop(mut self) {
        self.shutdown();
    }

    /// Block until the watch loop ends
    pub fn join(mut self) {
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }

    fn shutdown(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

impl Drop for ReloadHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}
