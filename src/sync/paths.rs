//! Path resolution for the CAMs data directory.
//!
//! Precedence: explicit override, then `CAMS_DATA_DIR`, then the XDG data
//! home (`~/.local/share/cams`).

use std::env;
use std::path::{Path, PathBuf};

/// Environment variable naming the data directory.
pub const DATA_DIR_ENV: &str = "CAMS_DATA_DIR";

const APP_DIR: &str = "cams";

/// Resolve the data directory holding the six data files.
pub fn get_data_dir(override_dir: Option<&Path>) -> PathBuf {
    if let Some(dir) = override_dir {
        return dir.to_path_buf();
    }

    if let Some(dir) = env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
        return PathBuf::from(dir);
    }

    let data_home = env::var_os("XDG_DATA_HOME")
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| {
            env::var_os("HOME")
                .map(PathBuf::from)
                .unwrap_or_default()
                .join(".local/share")
        });

    data_home.join(APP_DIR)
}
