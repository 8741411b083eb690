//! Loader utilities for building the narrative graph from `.svnm` files.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use log::{debug, info};
use svnm_data::{Svnm, collect_lints};
use svnm_script::{parse_svnm, script_files};

use crate::config::EngineConfig;
use crate::timing::measure_time;

/// Load, merge, and lint every script under the configured states directory.
///
/// # Errors
/// Fails on unreadable files, parse errors, duplicate state ids, or lint findings.
pub fn load_narrative(config: &EngineConfig) -> Result<Svnm> {
    let root = config.states_dir();
    info!("loading narrative from '{}'", root.display());
    let svnm = measure_time("loading svnm", || load_svnm_all(&root))?;
    measure_time("linting svnm", || validate_svnm(&svnm))?;
    info!("{} states loaded", svnm.len());
    Ok(svnm)
}

/// Recursively load and merge every `.svnm` file under `root`, in file-name order.
///
/// # Errors
/// Fails on the first unreadable file, parse error, or duplicate state id.
pub fn load_svnm_all(root: &Path) -> Result<Svnm> {
    let files = script_files(root).with_context(|| format!("while walking '{}'", root.display()))?;
    let mut svnm = Svnm::new();
    for path in &files {
        let parsed = load_svnm(path)?;
        debug!("{} states parsed from '{}'", parsed.len(), path.display());
        svnm.merge(parsed)
            .with_context(|| format!("while merging '{}'", path.display()))?;
    }
    info!("{} script file(s) merged into {} states", files.len(), svnm.len());
    Ok(svnm)
}

/// Read and parse one script file.
///
/// # Errors
/// Fails when the file cannot be read or does not parse.
pub fn load_svnm(path: &Path) -> Result<Svnm> {
    let text = fs::read_to_string(path).with_context(|| format!("reading script '{}'", path.display()))?;
    parse_svnm(&text).with_context(|| format!("while parsing '{}'", path.display()))
}

/// Lint the graph and return a single aggregated error listing every finding.
///
/// # Errors
/// Fails when any state reference does not resolve.
pub fn validate_svnm(svnm: &Svnm) -> Result<()> {
    let findings = collect_lints(svnm);
    if findings.is_empty() {
        return Ok(());
    }
    let details = findings
        .into_iter()
        .map(|finding| format!("- {finding}"))
        .collect::<Vec<_>>()
        .join("\n");
    bail!("svnm lint failed:\n{details}");
}
