//! Logging setup driven by the settings `[logging]` section.

use pipeline_config::LoggingSettings;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing.
///
/// The level and format come from settings; CLI overrides win when
/// given, and `RUST_LOG` beats both.
pub fn setup_logging(settings: &LoggingSettings, level_override: Option<&str>, json_flag: bool) {
    let (level, json) = resolve(settings, level_override, json_flag);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().pretty())
            .init();
    }
}

/// Resolve the effective level and format from settings plus overrides.
fn resolve(
    settings: &LoggingSettings,
    level_override: Option<&str>,
    json_flag: bool,
) -> (String, bool) {
    let level = level_override.unwrap_or(&settings.level).to_string();
    let json = json_flag || settings.format.eq_ignore_ascii_case("json");
    (level, json)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(level: &str, format: &str) -> LoggingSettings {
        LoggingSettings {
            level: level.to_string(),
            format: format.to_string(),
        }
    }

    #[test]
    fn test_settings_level_used_without_override() {
        let (level, json) = resolve(&settings("debug", "pretty"), None, false);
        assert_eq!(level, "debug");
        assert!(!json);
    }

    #[test]
    fn test_cli_override_beats_settings() {
        let (level, _) = resolve(&settings("debug", "pretty"), Some("warn"), false);
        assert_eq!(level, "warn");
    }

    #[test]
    fn test_json_from_settings_or_flag() {
        let (_, json) = resolve(&settings("info", "json"), None, false);
        assert!(json);
        let (_, json) = resolve(&settings("info", "pretty"), None, true);
        assert!(json);
    }
}
