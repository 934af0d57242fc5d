// Platform paths
// Config and data locations resolved through the `dirs` crate, falling back
// to the temp directory when the platform reports none.

use std::env;
use std::path::PathBuf;

const APP_DIR: &str = "tabwarden";

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "TABWARDEN_DATA_DIR";

/// Returns the configuration directory.
///
/// - **Linux**: `$XDG_CONFIG_HOME/tabwarden` or `~/.config/tabwarden`
/// - **macOS**: `~/Library/Application Support/tabwarden`
/// - **Windows**: `%APPDATA%\tabwarden`
pub fn get_config_dir() -> PathBuf {
    dirs::config_dir()
        .unwrap_or_else(env::temp_dir)
        .join(APP_DIR)
}

/// Returns the data directory holding the closed tab database.
///
/// - **Linux**: `$XDG_DATA_HOME/tabwarden` or `~/.local/share/tabwarden`
/// - **macOS**: `~/Library/Application Support/tabwarden`
/// - **Windows**: `%APPDATA%\tabwarden`
pub fn get_data_dir() -> PathBuf {
    dirs::data_dir().unwrap_or_else(env::temp_dir).join(APP_DIR)
}

/// `TABWARDEN_DATA_DIR` if set, otherwise [`get_data_dir`].
pub fn data_dir_from_env() -> PathBuf {
    env::var_os(DATA_DIR_ENV)
        .map(PathBuf::from)
        .unwrap_or_else(get_data_dir)
}
