use hot_reload::config::ConfigWarning;

use crate::ui::icon::Icon;
use crate::ui::terminal::detect_capabilities;

pub fn print_config_warnings(warnings: &[ConfigWarning]) {
    let caps = detect_capabilities();
    eprint!("{}", render_config_warnings(warnings, caps.supports_color, caps.supports_unicode));
}

pub fn render_config_warnings(warnings: &[ConfigWarning], supports_color: bool, supports_unicode: bool) -> String {
    let icon = Icon::Warning.colored(supports_color, supports_unicode);
    let mut out = String::new();
    for w in warnings {
        match w.line {
            Some(line) => out.push_str(&format!(
                "{} Unknown config key '{}' in {}:{}\n",
                icon,
                w.key,
                w.file.display(),
                line
            )),
            None => out.push_str(&format!("{} Unknown config key '{}' in {}\n", icon, w.key, w.file.display())),
        }

        if let Some(suggestion) = &w.suggestion {
            out.push_str(&format!("   Did you mean '{}'?\n\n", suggestion));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn warnings_carry_warning_icon_and_suggestion() {
        let warnings = vec![ConfigWarning {
            key: "dirr".to_string(),
            file: PathBuf::from("hot-reload.toml"),
            line: Some(3),
            suggestion: Some("dir".to_string()),
        }];

        let rendered = render_config_warnings(&warnings, false, false);
        assert_eq!(
            rendered,
            "[WARN] Unknown config key 'dirr' in hot-reload.toml:3\n   Did you mean 'dir'?\n\n"
        );
    }
}
