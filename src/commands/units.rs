use std::path::Path;

use anyhow::Result;

use crate::ui::views::render_units;

pub fn cmd_units(file: &Path, json: bool) -> Result<()> {
    let parsed = super::read_units(file)?;

    if json {
        crate::ui::json::emit(serde_json::json!({
            "event": "units",
            "command": "units",
            "file": file.display().to_string(),
            "units": parsed.units,
        }))?;
    } else {
        print!("{}", render_units(&parsed.units));
    }
    Ok(())
}
