//! Shared data model for SVNM narratives.

pub mod defs;
pub mod validate;

pub use defs::*;
pub use validate::{LintEntry, LintKind, LintReport, Severity, collect_lints, lint_svnm};
