use hot_reload::domain::entities::{CodeUnit, UnitKind};
use hot_reload::domain::services::{BodyDelta, DiffResult, UnitChange};
use hot_reload::ReloadEvent;

use crate::ui::icon::Icon;

pub fn render_watch_header(root: &str, manifest: &str, supports_color: bool, supports_unicode: bool) -> String {
    format!(
        "{} hot-reload watch\n  Root:     {}\n  Manifest: {}\n  Hint:     Press Ctrl+C to stop\n\n",
        Icon::Watch.colored(supports_color, supports_unicode),
        root,
        manifest
    )
}

pub fn render_watch_event(
    timestamp: &str,
    event: &ReloadEvent,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    let prefix = format!("[{}]", timestamp);
    let icon = |icon: Icon| icon.colored(supports_color, supports_unicode);

    match event {
        ReloadEvent::WatchStarted { root, files } => {
            format!("{} {} Watching {} files in {}\n", prefix, icon(Icon::Watch), files, root)
        }
        ReloadEvent::FileChanged { path } => format!("{} {} Changed: {}\n", prefix, icon(Icon::Arrow), path),
        ReloadEvent::FileTracked { path } => format!("{} {} Tracking: {}\n", prefix, icon(Icon::Arrow), path),
        ReloadEvent::NoChanges { path } => {
            format!("{} {} No code changes in {}\n", prefix, icon(Icon::Success), path)
        }
        ReloadEvent::PatchGenerated {
            generation,
            changes,
            overrides,
            ..
        } => format!(
            "{} {} Patch {} ({}, {} overrides)\n",
            prefix,
            icon(Icon::Patch),
            generation,
            changes,
            overrides
        ),
        ReloadEvent::Compiling { generation, .. } => {
            format!("{} {} Compiling patch {}...\n", prefix, icon(Icon::Progress), generation)
        }
        ReloadEvent::PatchLoaded {
            generation, artifact, ..
        } => format!(
            "{} {} Patch {} ready: {}\n",
            prefix,
            icon(Icon::Success),
            generation,
            artifact
        ),
        ReloadEvent::Failed {
            path, stage, message, ..
        } => format!(
            "{} {} {} failed while {}: {}\n",
            prefix,
            icon(Icon::Error),
            path,
            stage,
            message
        ),
        ReloadEvent::Shutdown => format!("\n{} {} Watch stopped.\n", prefix, icon(Icon::Watch)),
    }
}

fn kind_label(unit: &CodeUnit) -> &'static str {
    match unit.kind {
        UnitKind::Function if unit.is_method() => "method",
        UnitKind::Function => "fn",
        UnitKind::Type => "type",
    }
}

pub fn render_units(units: &[CodeUnit]) -> String {
    let mut out = String::new();
    for unit in units {
        let mut flags = Vec::new();
        if unit.public {
            flags.push("pub");
        }
        if unit.generic {
            flags.push("generic");
        }
        out.push_str(&format!(
            "{:<7} {}{}\n",
            kind_label(unit),
            unit.qualified_name(),
            if flags.is_empty() {
                String::new()
            } else {
                format!("  ({})", flags.join(", "))
            }
        ));
    }
    out
}

pub fn render_diff(
    diff: &DiffResult,
    delta: impl Fn(&CodeUnit, &CodeUnit) -> BodyDelta,
    supports_color: bool,
    supports_unicode: bool,
) -> String {
    if diff.is_empty() {
        return format!("{} No code changes\n", Icon::Success.colored(supports_color, supports_unicode));
    }
    let mut out = format!(
        "{} {}\n",
        Icon::Diff.colored(supports_color, supports_unicode),
        diff.summary()
    );
    for entry in &diff.entries {
        let line = match entry {
            UnitChange::Added { unit } => format!("  + {} {}\n", kind_label(unit), unit.qualified_name()),
            UnitChange::Removed { unit } => format!("  - {} {}\n", kind_label(unit), unit.qualified_name()),
            UnitChange::Changed { old, new } => {
                let delta = delta(old, new);
                format!(
                    "  ~ {} {} (+{} -{} tokens)\n",
                    kind_label(new),
                    new.qualified_name(),
                    delta.inserted,
                    delta.deleted
                )
            }
        };
        out.push_str(&line);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use hot_reload::domain::value_objects::{ScopePath, ScopeSegment};
    use hot_reload::StructuralDiffer;

    #[test]
    fn renders_started_event_with_watch_icon() {
        let event = ReloadEvent::WatchStarted {
            root: "src".to_string(),
            files: 3,
        };
        let rendered = render_watch_event("00:00:00", &event, false, false);
        assert_eq!(rendered, "[00:00:00] [~] Watching 3 files in src\n");
    }

    #[test]
    fn units_are_listed_with_flags() {
        let scope = ScopePath::root().child(ScopeSegment::ty("Counter"));
        let units = vec![
            CodeUnit::function(ScopePath::root(), "greet", "fn greet ()", "{ }"),
            CodeUnit::function(scope, "tick", "fn tick (& self)", "{ }").with_public(false),
        ];
        let rendered = render_units(&units);
        assert!(rendered.contains("fn      greet  (pub)"));
        assert!(rendered.contains("method  Counter::tick\n"));
    }

    #[test]
    fn diff_lists_changes() {
        let old = vec![CodeUnit::function(ScopePath::root(), "foo", "fn foo ()", "{ 1 }")];
        let new = vec![
            CodeUnit::function(ScopePath::root(), "foo", "fn foo ()", "{ 2 }"),
            CodeUnit::function(ScopePath::root(), "bar", "fn bar ()", "{ }"),
        ];
        let differ = StructuralDiffer::new();
        let diff = differ.diff(&old, &new);
        let rendered = render_diff(&diff, |a, b| differ.body_delta(&a.body, &b.body), false, false);
        assert!(rendered.contains("  + fn bar"));
        assert!(rendered.contains("  ~ fn foo (+1 -1 tokens)"));
    }
}
