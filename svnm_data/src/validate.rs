use std::fmt;

use crate::*;

/// How serious a lint finding is. Only `Error` is produced today.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warn,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Error => f.write_str("error"),
            Severity::Warn => f.write_str("warn"),
        }
    }
}

/// What a lint entry is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LintKind {
    /// A command references a state id that is not in the graph.
    MissingState { id: StateId, state: StateId, context: String },
    /// A graph key does not match the id stored in its state.
    IdMismatch { key: StateId, id: StateId },
}

/// One finding of [`lint_svnm`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintEntry {
    pub severity: Severity,
    pub kind: LintKind,
}

impl LintEntry {
    fn error(kind: LintKind) -> Self {
        Self {
            severity: Severity::Error,
            kind,
        }
    }
}

impl fmt::Display for LintEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            LintKind::MissingState { id, state, context } => {
                write!(f, "{}: no state found for '{id}' (state '{state}' {context})", self.severity)
            },
            LintKind::IdMismatch { key, id } => {
                write!(f, "{}: state id mismatch: '{id}' stored under '{key}'", self.severity)
            },
        }
    }
}

/// Every finding of a failed lint run, in traversal order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LintReport {
    pub entries: Vec<LintEntry>,
}

impl LintReport {
    pub fn errors(&self) -> impl Iterator<Item = &LintEntry> {
        self.entries.iter().filter(|e| e.severity == Severity::Error)
    }
}

impl fmt::Display for LintReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "svnm lint failed with {} finding(s):", self.entries.len())?;
        for entry in &self.entries {
            write!(f, "\n- {entry}")?;
        }
        Ok(())
    }
}

impl std::error::Error for LintReport {}

/// Collect every lint finding for a graph without failing.
pub fn collect_lints(svnm: &Svnm) -> Vec<LintEntry> {
    let mut log = Vec::new();

    for (key, state) in &svnm.state_map {
        if state.id != *key {
            log.push(LintEntry::error(LintKind::IdMismatch {
                key: key.clone(),
                id: state.id.clone(),
            }));
        }
        if let Some(options) = &state.options {
            for option in options {
                check_commands(
                    svnm,
                    &option.commands,
                    state,
                    &format!("option '{}'", option.name),
                    &mut log,
                );
            }
        }
        for (name, commands) in &state.events {
            check_commands(svnm, commands, state, &format!("event '{name}'"), &mut log);
        }
    }

    log
}

/// Verify every state reference in the graph resolves.
///
/// The whole graph is always walked; the error carries every finding.
///
/// ```
/// use svnm_data::{Command, Svnm, SvnmState, lint_svnm};
///
/// let mut start = SvnmState::new("start", "start", "Hello.");
/// start.events.insert("다음".into(), vec![Command::call("이동", vec![Command::state("missing")])]);
/// let svnm = Svnm::from_states([start]).unwrap();
///
/// let report = lint_svnm(&svnm).unwrap_err();
/// assert_eq!(report.entries.len(), 1);
/// ```
///
/// # Errors
/// Returns a [`LintReport`] when any finding was recorded.
pub fn lint_svnm(svnm: &Svnm) -> Result<(), LintReport> {
    let entries = collect_lints(svnm);
    if entries.is_empty() {
        Ok(())
    } else {
        Err(LintReport { entries })
    }
}

fn check_commands(svnm: &Svnm, commands: &[Command], state: &SvnmState, context: &str, log: &mut Vec<LintEntry>) {
    for command in commands {
        let Some(function) = command.as_function() else {
            continue;
        };
        for arg in &function.args {
            if let Command::State { id } = arg
                && !svnm.contains(id)
            {
                log.push(LintEntry::error(LintKind::MissingState {
                    id: id.clone(),
                    state: state.id.clone(),
                    context: context.to_string(),
                }));
            }
        }
    }
}
