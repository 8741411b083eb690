use pest::Parser;
use pest::iterators::Pair;

use svnm_data::{Command, Condition, FunctionCommand};

use super::conditions::parse_condition_arg;
use super::primitive::parse_primitive_command;
use super::{CommandParser, Rule};
use crate::ScriptError;

/// Text split into an optional `(<condition>) 이면,` guard and what follows it.
#[derive(Debug, Clone, PartialEq)]
pub struct ConditionPrefix {
    pub postfix: String,
    pub condition: Option<Condition>,
}

/// `(<condition>) 이면, name(arg, ...)`, where both the guard and the
/// parenthesised argument list are optional.
///
/// Quoted arguments keep commas and parentheses inside them; empty argument
/// slots are skipped.
///
/// # Errors
/// Returns a syntax error when the text does not match the call shape, or when
/// the guard or an argument does not parse.
pub fn parse_function_command(text: &str) -> Result<FunctionCommand, ScriptError> {
    let t = text.trim();
    let mut pairs = CommandParser::parse(Rule::function_command, t).map_err(|_| ScriptError::syntax(t, "function"))?;
    let root = pairs.next().ok_or(ScriptError::Structure("expected function command"))?;

    let mut name = None;
    let mut condition = None;
    let mut args = Vec::new();
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::guard => condition = Some(parse_guard(pair)?),
            Rule::function_name => name = Some(pair.as_str().to_string()),
            Rule::arguments => args = parse_arguments(pair)?,
            _ => {},
        }
    }

    let name = name.ok_or_else(|| ScriptError::syntax(t, "function"))?;
    Ok(FunctionCommand { name, args, condition })
}

/// Strip an optional guard from the front of an option key.
///
/// Text that does not start with a complete guard is returned unchanged as the
/// postfix.
///
/// # Errors
/// Returns a syntax error when a guard is present but its condition is malformed.
pub fn parse_condition_prefix(text: &str) -> Result<ConditionPrefix, ScriptError> {
    let t = text.trim();
    let mut pairs = CommandParser::parse(Rule::option_key, t).map_err(|_| ScriptError::syntax(t, "option key"))?;
    let root = pairs.next().ok_or(ScriptError::Structure("expected option key"))?;

    let mut prefix = ConditionPrefix {
        postfix: String::new(),
        condition: None,
    };
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::guard => prefix.condition = Some(parse_guard(pair)?),
            Rule::option_name => prefix.postfix = pair.as_str().trim().to_string(),
            _ => {},
        }
    }
    Ok(prefix)
}

fn parse_guard(pair: Pair<'_, Rule>) -> Result<Condition, ScriptError> {
    let inner = pair
        .into_inner()
        .find(|p| p.as_rule() == Rule::guard_condition)
        .ok_or(ScriptError::Structure("guard without condition"))?;
    parse_condition_arg(inner.as_str())
}

fn parse_arguments(pair: Pair<'_, Rule>) -> Result<Vec<Command>, ScriptError> {
    pair.into_inner()
        .map(|arg| arg.as_str().trim())
        .filter(|arg| !arg.is_empty())
        .map(parse_primitive_command)
        .collect()
}
