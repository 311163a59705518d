use std::path::Path;

use anyhow::Result;
use hot_reload::StructuralDiffer;

use crate::ui::terminal::detect_capabilities;
use crate::ui::views::render_diff;

pub fn cmd_diff(old: &Path, new: &Path, json: bool) -> Result<()> {
    let old_units = super::read_units(old)?;
    let new_units = super::read_units(new)?;
    let differ = StructuralDiffer::new();
    let diff = differ.diff(&old_units.units, &new_units.units);

    if json {
        crate::ui::json::emit(serde_json::json!({
            "event": "diff",
            "command": "diff",
            "summary": diff.summary(),
            "entries": diff.entries,
        }))?;
    } else {
        let caps = detect_capabilities();
        print!(
            "{}",
            render_diff(
                &diff,
                |a, b| differ.body_delta(&a.body, &b.body),
                caps.supports_color,
                caps.supports_unicode
            )
        );
    }
    Ok(())
}
