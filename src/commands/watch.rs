use std::fs;
use std::path::Path;
use std::sync::atomic::Ordering;

use anyhow::{anyhow, Context, Result};
use hot_reload::config::{Config, Verbosity, PROJECT_CONFIG_FILE};
use hot_reload::domain::ports::ArtifactLoader;
use hot_reload::domain::value_objects::Generation;
use hot_reload::infrastructure::manifest::resolve_build_root;
use hot_reload::infrastructure::project::find_project_root;
use hot_reload::{ReloadError, ReloadEvent, ReloadResult, Reloader};

use crate::ui::output::print_config_warnings;
use crate::ui::terminal::detect_capabilities;
use crate::ui::views::{render_watch_event, render_watch_header};

/// Stands in for the dynamic loader: the CLI process is not the host, so
/// a compiled patch is only checked for existence
struct CheckOnlyLoader;

impl ArtifactLoader for CheckOnlyLoader {
    fn load(&self, artifact: &Path, _generation: Generation) -> ReloadResult<usize> {
        fs::metadata(artifact).map_err(|e| ReloadError::Load {
            path: artifact.to_path_buf(),
            message: e.to_string(),
        })?;
        Ok(0)
    }
}

fn load_config(project_root: &Path) -> Result<Config> {
    let path = project_root.join(PROJECT_CONFIG_FILE);
    if !path.exists() {
        return Ok(Config::load_or_default(Some(project_root)));
    }
    let (config, warnings) = Config::load_with_warnings(&path)?;
    print_config_warnings(&warnings);
    Ok(config.with_env_overrides())
}

fn timestamp() -> String {
    chrono::Local::now().format("%H:%M:%S").to_string()
}

pub fn cmd_watch(entry: &Path, json: bool) -> Result<()> {
    let project_root =
        find_project_root(entry).ok_or_else(|| anyhow!("no Cargo.toml found above {}", entry.display()))?;
    let config = load_config(&project_root)?;
    let json = json || config.output.json;
    let quiet = config.output.verbosity == Verbosity::Quiet;
    let caps = detect_capabilities();

    if !json {
        let manifest = resolve_build_root(&project_root, &config.build).join(&config.build.manifest);
        print!(
            "{}",
            render_watch_header(
                &entry.display().to_string(),
                &manifest.display().to_string(),
                caps.supports_color,
                caps.supports_unicode
            )
        );
    }

    let handle = Reloader::new(entry)
        .with_config(config)
        .with_loader(CheckOnlyLoader)
        .on_event(move |event| {
            if json {
                println!("{}", event.to_json());
                return;
            }
            if quiet && !event.is_failure() {
                return;
            }
            let rendered = render_watch_event(&timestamp(), event, caps.supports_color, caps.supports_unicode);
            match event {
                ReloadEvent::Failed { .. } => eprint!("{rendered}"),
                _ => print!("{rendered}"),
            }
        })
        .start()?;

    let running = handle.running_flag();
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .context("failed to set Ctrl+C handler")?;

    handle.join();
    Ok(())
}
