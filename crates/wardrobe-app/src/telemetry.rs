//! Tracing subscriber setup.
//!
//! Environment variables:
//!   LOG_FORMAT  - "json" or "text" (default: "text")
//!   LOG_FILE    - path to log file (optional, enables file logging)
//!   LOG_ANSI    - "true"/"false" override ANSI colors (auto-detected by default)
//!   RUST_LOG    - standard env filter (default: [`DEFAULT_FILTER`])
//!
//! Console output goes to stderr; stdout carries command results.

use std::path::Path;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

pub const DEFAULT_FILTER: &str = "wardrobe_app=info,wardrobe_db=info,wardrobe_core=info";

const DEFAULT_LOG_FILE_NAME: &str = "wardrobe.log";

/// Logging options read from the environment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogSettings {
    pub json: bool,
    pub file: Option<String>,
    pub ansi: Option<bool>,
}

impl LogSettings {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            json: lookup("LOG_FORMAT").is_some_and(|f| f.eq_ignore_ascii_case("json")),
            file: lookup("LOG_FILE").filter(|p| !p.trim().is_empty()),
            ansi: lookup("LOG_ANSI").map(|v| v == "true" || v == "1"),
        }
    }
}

/// Install the global subscriber. Keep the returned guard alive for the
/// life of the process so buffered file output is flushed.
pub fn init(settings: &LogSettings) -> Option<WorkerGuard> {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(env_filter);

    if let Some(ref path) = settings.file {
        let path = Path::new(path);
        let file_dir = path.parent().unwrap_or(Path::new("."));
        let file_name = path
            .file_name()
            .and_then(|f| f.to_str())
            .unwrap_or(DEFAULT_LOG_FILE_NAME);
        let file_appender = tracing_appender::rolling::daily(file_dir, file_name);
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

        if settings.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(non_blocking),
                )
                .init();
        } else {
            // no ANSI in files unless forced
            let layer = tracing_subscriber::fmt::layer()
                .with_writer(non_blocking)
                .with_ansi(settings.ansi.unwrap_or(false));
            registry.with(layer).init();
        }
        Some(guard)
    } else {
        if settings.json {
            registry
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_writer(std::io::stderr),
                )
                .init();
        } else {
            let mut layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
            if let Some(ansi) = settings.ansi {
                layer = layer.with_ansi(ansi);
            }
            registry.with(layer).init();
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_settings_default_to_text_console() {
        let settings = LogSettings::from_lookup(|_| None);
        assert_eq!(
            settings,
            LogSettings {
                json: false,
                file: None,
                ansi: None
            }
        );
    }

    #[test]
    fn test_settings_parse_overrides() {
        let settings = LogSettings::from_lookup(|key| match key {
            "LOG_FORMAT" => Some("JSON".to_string()),
            "LOG_FILE" => Some("/tmp/wardrobe/app.log".to_string()),
            "LOG_ANSI" => Some("1".to_string()),
            _ => None,
        });
        assert!(settings.json);
        assert_eq!(settings.file.as_deref(), Some("/tmp/wardrobe/app.log"));
        assert_eq!(settings.ansi, Some(true));
    }
}
