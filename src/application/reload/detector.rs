//! Change Detector
//!
//! Tracks the modification time of every watched file under a root and
//! reports the ones whose time changed. A poll is triggered by a `notify`
//! event (debounced) or by the poll timer.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{channel, Receiver, RecvTimeoutError};
use std::sync::Arc;
use std::time::{Duration, Instant, SystemTime};

use notify::{Event, RecommendedWatcher, RecursiveMode, Watcher};

use crate::error::ReloadResult;
use crate::infrastructure::project::{enumerate_sources, has_extension};

/// How long a blocking wait runs before the running flag is checked again
const TICK: Duration = Duration::from_millis(50);

/// Modification-time tracker for one directory tree
#[derive(Debug)]
pub struct ChangeDetector {
    root: PathBuf,
    extensions: Vec<String>,
    excluded: PathBuf,
    mtimes: HashMap<PathBuf, SystemTime>,
}

impl ChangeDetector {
    /// `excluded` is skipped during enumeration (the build root)
    pub fn new(root: impl Into<PathBuf>, extensions: Vec<String>, excluded: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            extensions,
            excluded: excluded.into(),
            mtimes: HashMap::new(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn tracked(&self) -> usize {
        self.mtimes.len()
    }

    /// Recompute modification times; returns every path whose time differs
    /// from the stored one, including paths seen for the first time.
    /// Vanished paths are dropped without being reported.
    pub fn poll(&mut self) -> Vec<PathBuf> {
        let mut current = HashMap::new();
        let mut changed = Vec::new();

        for path in enumerate_sources(&self.root, &self.extensions, &self.excluded) {
            let Ok(modified) = path.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if self.mtimes.get(&path) != Some(&modified) {
                changed.push(path.clone());
            }
            current.insert(path, modified);
        }

        self.mtimes = current;
        changed
    }

    /// Consume the detector into a blocking iterator of batches.
    ///
    /// The iterator ends once `running` is cleared.
    pub fn batches(
        self,
        running: Arc<AtomicBool>,
        debounce: Duration,
        poll_interval: Duration,
    ) -> ReloadResult<Batches> {
        let (tx, rx) = channel();
        let extensions = self.extensions.clone();
        let excluded = self.excluded.clone();

        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| {
                if let Ok(event) = res {
                    let relevant = event
                        .paths
                        .iter()
                        .any(|p| !p.starts_with(&excluded) && has_extension(p, &extensions));
                    if relevant {
                        let _ = tx.send(());
                    }
                }
            },
            notify::Config::default(),
        )?;
        watcher.watch(&self.root, RecursiveMode::Recursive)?;
        tracing::debug!(root = %self.root.display(), "watcher registered");

        Ok(Batches {
            detector: self,
            events: rx,
            _watcher: watcher,
            running,
            debounce,
            poll_interval,
        })
    }
}

/// Lazy stream of change batches, see [`ChangeDetector::batches`]
pub struct Batches {
    detector: ChangeDetector,
    events: Receiver<()>,
    _watcher: RecommendedWatcher,
    running: Arc<AtomicBool>,
    debounce: Duration,
    poll_interval: Duration,
}

impl Batches {
    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Block until an event arrives, the poll timer fires, or the running
    /// flag is cleared. Returns `false` only in the last case.
    fn wait_for_trigger(&self) -> bool {
        let deadline = Instant::now() + self.poll_interval;
        while self.is_running() {
            match self.events.recv_timeout(TICK) {
                Ok(()) => {
                    self.settle();
                    return true;
                }
                Err(RecvTimeoutError::Timeout) if Instant::now() >= deadline => return true,
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    std::thread::sleep(TICK);
                    if Instant::now() >= deadline {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Swallow the rest of an event burst: wait until no event arrived for
    /// one debounce period
    fn settle(&self) {
        let mut quiet_since = Instant::now();
        while self.is_running() && quiet_since.elapsed() < self.debounce {
            if self.events.recv_timeout(TICK.min(self.debounce)).is_ok() {
                quiet_since = Instant::now();
            }
        }
    }
}

impl Iterator for Batches {
    type Item = Vec<PathBuf>;

    fn next(&mut self) -> Option<Self::Item> {
        while self.wait_for_trigger() {
            let batch = self.detector.poll();
            if !batch.is_empty() {
                tracing::debug!(files = batch.len(), "change batch");
                return Some(batch);
            }
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    fn detector(root: &Path) -> ChangeDetector {
        ChangeDetector::new(root, vec!["rs".to_string()], root.join(".build"))
    }

    fn bump(path: &Path, seconds: u64) {
        let file = fs::File::options().write(true).open(path).unwrap();
        file.set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(seconds))
            .unwrap();
    }

    #[test]
    fn first_poll_reports_everything() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.rs"), "").unwrap();
        fs::write(dir.path().join("b.rs"), "").unwrap();
        fs::write(dir.path().join("c.txt"), "").unwrap();

        let mut detector = detector(dir.path());
        assert_eq!(detector.poll().len(), 2);
        assert!(detector.poll().is_empty());
        assert_eq!(detector.tracked(), 2);
    }

    #[test]
    fn reports_only_files_with_new_mtime() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.rs");
        let b = dir.path().join("b.rs");
        fs::write(&a, "").unwrap();
        fs::write(&b, "").unwrap();
        bump(&a, 1_000);
        bump(&b, 1_000);

        let mut detector = detector(dir.path());
        detector.poll();
        bump(&b, 2_000);

        assert_eq!(detector.poll(), vec![b]);
    }

    #[test]
    fn new_files_are_reported_and_vanished_files_dropped() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.rs");
        fs::write(&a, "").unwrap();

        let mut detector = detector(dir.path());
        detector.poll();

        let b = dir.path().join("b.rs");
        fs::write(&b, "").unwrap();
        fs::remove_file(&a).unwrap();

        assert_eq!(detector.poll(), vec![b]);
        assert_eq!(detector.tracked(), 1);
    }

    #[test]
    fn build_root_is_ignored() {
        let dir = tempdir().unwrap();
        fs::create_dir_all(dir.path().join(".build/patches")).unwrap();
        fs::write(dir.path().join(".build/patches/a.patch_0.rs"), "").unwrap();

        let mut detector = detector(dir.path());
        assert!(detector.poll().is_empty());
    }

    #[test]
    fn batches_end_when_running_is_cleared() {
        let dir = tempdir().unwrap();
        let running = Arc::new(AtomicBool::new(false));
        let mut batches = detector(dir.path())
            .batches(running, Duration::from_millis(10), Duration::from_millis(10))
            .unwrap();
        assert!(batches.next().is_none());
    }

    #[test]
    fn poll_timer_yields_batch_without_events() {
        let dir = tempdir().unwrap();
        let a = dir.path().join("a.rs");
        fs::write(&a, "").unwrap();
        bump(&a, 1_000);

        let mut detector = detector(dir.path());
        detector.poll();
        bump(&a, 2_000);

        let running = Arc::new(AtomicBool::new(true));
        let mut batches = detector
            .batches(running, Duration::from_millis(10), Duration::from_millis(20))
            .unwrap();
        assert_eq!(batches.next(), Some(vec![a]));
    }
}
