//! Cross-platform harness paths using the `dirs` crate.
//!
//! Config dir (harness.toml):
//!   Windows: %APPDATA%\eot-compare\
//!   macOS:   ~/Library/Application Support/eot-compare/
//!   Linux:   ~/.config/eot-compare/
//!
//! Data dir (saved reports):
//!   Windows: %LOCALAPPDATA%\eot-compare\
//!   macOS:   ~/Library/Application Support/eot-compare/
//!   Linux:   ~/.local/share/eot-compare/

use std::path::PathBuf;

/// Holds all resolved directory/file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory holding `harness.toml`.
    pub config_dir: PathBuf,
    /// Full path to `harness.toml`.
    pub settings_file: PathBuf,
    /// Default directory for written reports.
    pub reports_dir: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "eot-compare";

    /// Resolves all paths, falling back to the current directory when the
    /// platform provides no standard location.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let data_dir = dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);

        let settings_file = config_dir.join("harness.toml");
        let reports_dir = data_dir.join("reports");

        Self {
            config_dir,
            settings_file,
            reports_dir,
        }
    }
}

impl Default for AppPaths {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_non_empty() {
        let paths = AppPaths::new();
        assert!(paths.config_dir.to_str().is_some_and(|s| !s.is_empty()));
        assert!(paths.reports_dir.ends_with("reports"));
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "harness.toml"));
    }
}
