//! Cross-platform application paths using the `dirs` crate.
//!
//! Layout (config dir):
//!   Windows: %APPDATA%\voice-ledger\
//!   macOS:   ~/Library/Application Support/voice-ledger/
//!   Linux:   ~/.config/voice-ledger/

use std::path::{Path, PathBuf};

/// Holds all resolved application file paths.
#[derive(Debug, Clone)]
pub struct AppPaths {
    /// Directory for `settings.toml` and `key-rotation.json`.
    pub config_dir: PathBuf,
    /// Full path to `settings.toml`.
    pub settings_file: PathBuf,
    /// Full path to the persisted key-rotation record.
    pub rotation_file: PathBuf,
}

impl AppPaths {
    const APP_NAME: &'static str = "voice-ledger";
    const SETTINGS_FILE: &'static str = "settings.toml";
    const ROTATION_FILE: &'static str = "key-rotation.json";

    /// Resolves all paths using the `dirs` crate.
    ///
    /// Falls back to the current directory if the platform cannot provide a
    /// standard path.
    pub fn new() -> Self {
        let config_dir = dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(Self::APP_NAME);
        Self::in_dir(config_dir)
    }

    /// Paths rooted at the directory holding an explicit settings file
    /// (`--config` on the command line).
    pub fn for_settings_file(settings_file: &Path) -> Self {
        let config_dir = settings_file
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        Self {
            rotation_file: config_dir.join(Self::ROTATION_FILE),
            settings_file: settings_file.to_path_buf(),
            config_dir,
        }
    }

    fn in_dir(config_dir: PathBuf) -> Self {
        Self {
            settings_file: config_dir.join(Self::SETTINGS_FILE),
            rotation_file: config_dir.join(Self::ROTATION_FILE),
            config_dir,
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
        assert!(paths
            .settings_file
            .file_name()
            .is_some_and(|n| n == "settings.toml"));
        assert!(paths
            .rotation_file
            .file_name()
            .is_some_and(|n| n == "key-rotation.json"));
    }

    #[test]
    fn rotation_file_sits_next_to_explicit_settings() {
        let paths = AppPaths::for_settings_file(Path::new("/tmp/ledger/custom.toml"));
        assert_eq!(paths.config_dir, PathBuf::from("/tmp/ledger"));
        assert_eq!(paths.rotation_file, PathBuf::from("/tmp/ledger/key-rotation.json"));
        assert_eq!(paths.settings_file, PathBuf::from("/tmp/ledger/custom.toml"));
    }
}
