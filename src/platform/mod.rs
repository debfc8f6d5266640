// Clicktrail platform paths
// Config and export locations for Linux, macOS and Windows.
//
// Uses `cfg(target_os)` to pick the platform branch at compile time.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "clicktrail";

fn home_dir() -> PathBuf {
    env::var("HOME")
        .or_else(|_| env::var("USERPROFILE"))
        .map(PathBuf::from)
        .unwrap_or_else(|_| env::temp_dir())
}

/// Returns the configuration directory for Clicktrail.
///
/// - **Linux**: `$XDG_CONFIG_HOME/clicktrail` or `~/.config/clicktrail`
/// - **macOS**: `~/Library/Application Support/Clicktrail`
/// - **Windows**: `%APPDATA%/Clicktrail`
pub fn get_config_dir() -> PathBuf {
    #[cfg(target_os = "macos")]
    {
        home_dir()
            .join("Library")
            .join("Application Support")
            .join("Clicktrail")
    }
    #[cfg(target_os = "windows")]
    {
        env::var("APPDATA")
            .map(PathBuf::from)
            .unwrap_or_else(|_| home_dir().join("AppData").join("Roaming"))
            .join("Clicktrail")
    }
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        match env::var("XDG_CONFIG_HOME") {
            Ok(xdg) if !xdg.is_empty() => PathBuf::from(xdg).join(APP_DIR),
            _ => home_dir().join(".config").join(APP_DIR),
        }
    }
}

/// Returns the default directory exported PDFs are written to.
///
/// - **Linux**: `$XDG_DOCUMENTS_DIR/clicktrail` or `~/Documents/clicktrail`
/// - **macOS / Windows**: `~/Documents/clicktrail`
pub fn get_export_dir() -> PathBuf {
    #[cfg(not(any(target_os = "macos", target_os = "windows")))]
    {
        if let Ok(docs) = env::var("XDG_DOCUMENTS_DIR") {
            if !docs.is_empty() {
                return PathBuf::from(docs).join(APP_DIR);
            }
        }
    }
    home_dir().join("Documents").join(APP_DIR)
}
