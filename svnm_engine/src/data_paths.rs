//! Locating the engine data directory (`config.toml` and the script tree).

use std::env;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use log::debug;

/// Environment variable that overrides data root detection.
pub const DATA_DIR_ENV: &str = "SVNM_DATA_DIR";

const DEFAULT_ROOT: &str = "svnm_engine/data";

static DATA_ROOT: LazyLock<PathBuf> =
    LazyLock::new(|| choose_data_root(env::var_os(DATA_DIR_ENV), candidate_roots()));

/// Construct a data path relative to the resolved data root.
pub fn data_path(relative: impl AsRef<Path>) -> PathBuf {
    DATA_ROOT.join(relative)
}

pub fn data_root() -> &'static Path {
    &DATA_ROOT
}

/// Likely data directories: under the working directory first, then next to
/// the executable and one level above it.
fn candidate_roots() -> Vec<PathBuf> {
    let mut bases = vec![PathBuf::new()];
    if let Ok(exe_path) = env::current_exe()
        && let Some(dir) = exe_path.parent()
    {
        bases.push(dir.to_path_buf());
        if let Some(parent) = dir.parent() {
            bases.push(parent.to_path_buf());
        }
    }
    bases
        .into_iter()
        .flat_map(|base| [base.join(DEFAULT_ROOT), base.join("data")])
        .collect()
}

/// A non-empty override wins; otherwise the first existing candidate, or the
/// workspace default when none exists.
fn choose_data_root(override_dir: Option<OsString>, candidates: Vec<PathBuf>) -> PathBuf {
    if let Some(dir) = override_dir.filter(|dir| !dir.is_empty()) {
        debug!("data root taken from {DATA_DIR_ENV}");
        return PathBuf::from(dir);
    }
    candidates
        .into_iter()
        .find(|candidate| candidate.is_dir())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ROOT))
}
