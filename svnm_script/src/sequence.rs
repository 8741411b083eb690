//! Expanding a chapter into its linked run of states.

use std::collections::BTreeMap;

use svnm_data::{
    Command, EVENT_ENTER, EVENT_FINISHED, EVENT_NEXT, FN_MOVE, FN_OPEN_OPTIONS, SEQ_SEPARATOR, StateId, SvnmOption,
    SvnmState,
};

use crate::chapter::Chapter;
use crate::metadata::Metadata;
use crate::parser::{parse_command, parse_condition_prefix};
use crate::ScriptError;

/// Id of the `index`-th state of a chapter: the chapter id itself, then `{id}__seq{index}`.
pub fn state_id(chapter: &str, index: usize) -> StateId {
    if index == 0 {
        chapter.to_string()
    } else {
        format!("{chapter}{SEQ_SEPARATOR}{index}")
    }
}

/// Build one state per paragraph.
///
/// Variables land on the first state and options on the last. `입장` events
/// stay on the first state and every other authored event on the last; the
/// synthesized `다음` and `완독` events replace authored ones of the same name.
///
/// # Errors
/// Fails when an option key or a command string does not parse.
pub fn build_states(chapter: &Chapter<'_>, metadata: Metadata) -> Result<Vec<SvnmState>, ScriptError> {
    let Metadata {
        mut global_variables,
        mut local_variables,
        scope,
        options,
        events,
    } = metadata;

    let scope = scope
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .unwrap_or(chapter.id)
        .to_string();
    let mut options = match options {
        Some(options) => Some(build_options(chapter.id, options.0)?),
        None => None,
    };
    let events = build_events(chapter.id, events.unwrap_or_default())?;

    let count = chapter.paragraphs.len();
    let mut states = Vec::with_capacity(count);
    for (i, paragraph) in chapter.paragraphs.iter().enumerate() {
        let is_first = i == 0;
        let is_last = i + 1 == count;

        let mut state = SvnmState::new(state_id(chapter.id, i), scope.clone(), *paragraph);
        if is_first {
            state.global_variables = global_variables.take();
            state.local_variables = local_variables.take();
        }
        if is_last {
            state.options = options.take().filter(|o| !o.is_empty());
        }

        for (name, commands) in &events {
            let keep = if name == EVENT_ENTER { is_first } else { is_last };
            if keep {
                state.events.insert(name.clone(), commands.clone());
            }
        }
        if !is_last {
            let next = Command::call(FN_MOVE, vec![Command::state(state_id(chapter.id, i + 1))]);
            state.events.insert(EVENT_NEXT.to_string(), vec![next]);
        } else if state.options().is_some() {
            state
                .events
                .insert(EVENT_FINISHED.to_string(), vec![Command::call(FN_OPEN_OPTIONS, vec![])]);
        }

        states.push(state);
    }
    Ok(states)
}

fn build_options(chapter: &str, options: Vec<(String, Vec<String>)>) -> Result<Vec<SvnmOption>, ScriptError> {
    options
        .into_iter()
        .map(|(key, commands)| {
            let prefix = parse_condition_prefix(&key).map_err(|e| in_chapter(chapter, format!("option key '{key}'"), e))?;
            let commands = parse_commands(&commands)
                .map_err(|e| in_chapter(chapter, format!("option '{}'", prefix.postfix), e))?;
            Ok(SvnmOption {
                name: prefix.postfix,
                condition: prefix.condition,
                commands,
            })
        })
        .collect()
}

fn build_events(
    chapter: &str,
    events: BTreeMap<String, Vec<String>>,
) -> Result<BTreeMap<String, Vec<Command>>, ScriptError> {
    events
        .into_iter()
        .map(|(name, commands)| {
            let commands = parse_commands(&commands).map_err(|e| in_chapter(chapter, format!("event '{name}'"), e))?;
            Ok((name, commands))
        })
        .collect()
}

fn parse_commands(commands: &[String]) -> Result<Vec<Command>, ScriptError> {
    commands.iter().map(|c| parse_command(c)).collect()
}

fn in_chapter(chapter: &str, context: String, source: ScriptError) -> ScriptError {
    ScriptError::Command {
        chapter: chapter.to_string(),
        context,
        source: Box::new(source),
    }
}
