use svnm_data::{Command, Keyword, ValueCommand};

use crate::ScriptError;

type Parse<T> = fn(&str) -> Result<T, ScriptError>;

/// Try each parser in order; fail with one error naming `expected` if none match.
fn parse_one_of<T>(text: &str, expected: &'static str, parsers: &[Parse<T>]) -> Result<T, ScriptError> {
    parsers
        .iter()
        .find_map(|parse| parse(text).ok())
        .ok_or_else(|| ScriptError::syntax(text.trim(), expected))
}

/// A non-empty run without whitespace.
fn is_token(s: &str) -> bool {
    !s.is_empty() && !s.chars().any(char::is_whitespace)
}

/// `#state-id`
///
/// # Errors
/// Returns a syntax error unless the text is `#` followed by a whitespace-free id.
pub fn parse_state_command(text: &str) -> Result<Command, ScriptError> {
    let t = text.trim();
    match t.strip_prefix('#') {
        Some(id) if is_token(id) => Ok(Command::state(id)),
        _ => Err(ScriptError::syntax(t, "state")),
    }
}

/// `$name`
///
/// # Errors
/// Returns a syntax error unless the text is `$` followed by a whitespace-free name.
pub fn parse_variable_command(text: &str) -> Result<ValueCommand, ScriptError> {
    let t = text.trim();
    match t.strip_prefix('$') {
        Some(name) if is_token(name) => Ok(ValueCommand::Variable { name: name.to_string() }),
        _ => Err(ScriptError::syntax(t, "variable")),
    }
}

/// Any finite number, e.g. `0`, `.53`, `-53`, `1e3`, or an unsigned
/// `0x`/`0o`/`0b` integer.
///
/// # Errors
/// Returns a syntax error for empty, non-numeric, or non-finite text.
pub fn parse_numeric_command(text: &str) -> Result<ValueCommand, ScriptError> {
    let t = text.trim();
    let value = parse_radix_integer(t).or_else(|| t.parse::<f64>().ok());
    match value {
        Some(value) if value.is_finite() => Ok(ValueCommand::Numeric { value }),
        _ => Err(ScriptError::syntax(t, "numeric")),
    }
}

fn parse_radix_integer(t: &str) -> Option<f64> {
    let (radix, digits) = match t.get(..2)? {
        "0x" | "0X" => (16, &t[2..]),
        "0o" | "0O" => (8, &t[2..]),
        "0b" | "0B" => (2, &t[2..]),
        _ => return None,
    };
    if digits.is_empty() {
        return None;
    }
    digits
        .chars()
        .try_fold(0.0, |acc: f64, c| c.to_digit(radix).map(|d| acc * f64::from(radix) + f64::from(d)))
}

/// `'text'` or `"text"`. There are no escapes: the literal ends at the first
/// repeat of its opening quote, which must be the last character.
///
/// # Errors
/// Returns a syntax error for unquoted or unterminated text.
pub fn parse_string_command(text: &str) -> Result<ValueCommand, ScriptError> {
    let t = text.trim();
    let quote = match t.chars().next() {
        Some(q @ ('\'' | '"')) => q,
        _ => return Err(ScriptError::syntax(t, "string")),
    };
    let body = &t[1..];
    match body.find(quote) {
        Some(end) if end + 1 == body.len() => Ok(ValueCommand::String {
            value: body[..end].to_string(),
        }),
        _ => Err(ScriptError::syntax(t, "string")),
    }
}

/// `true`/`false` in any letter case, or `참`/`거짓`.
///
/// # Errors
/// Returns a syntax error for anything else.
pub fn parse_boolean_command(text: &str) -> Result<ValueCommand, ScriptError> {
    let t = text.trim();
    let value = match t {
        "참" => true,
        "거짓" => false,
        _ if t.eq_ignore_ascii_case("true") => true,
        _ if t.eq_ignore_ascii_case("false") => false,
        _ => return Err(ScriptError::syntax(t, "boolean")),
    };
    Ok(ValueCommand::Boolean { value })
}

/// # Errors
/// Always fails while the keyword set is empty.
pub fn parse_keyword_command(text: &str) -> Result<Keyword, ScriptError> {
    let t = text.trim();
    Keyword::from_name(t).ok_or_else(|| ScriptError::syntax(t, "keyword"))
}

/// A variable reference or a literal.
///
/// # Errors
/// Returns one syntax error when no value form matches.
pub fn parse_value_command(text: &str) -> Result<ValueCommand, ScriptError> {
    const PARSERS: [Parse<ValueCommand>; 4] = [
        parse_variable_command,
        parse_numeric_command,
        parse_string_command,
        parse_boolean_command,
    ];
    parse_one_of(text, "string, numeric, boolean, or variable", &PARSERS)
}

/// A state reference, a value, or a keyword.
///
/// # Errors
/// Returns one syntax error when no primitive form matches.
pub fn parse_primitive_command(text: &str) -> Result<Command, ScriptError> {
    const PARSERS: [Parse<Command>; 3] = [parse_state_command, parse_value_as_command, parse_keyword_as_command];
    parse_one_of(text, "primitive", &PARSERS)
}

fn parse_value_as_command(text: &str) -> Result<Command, ScriptError> {
    parse_value_command(text).map(Command::Value)
}

fn parse_keyword_as_command(text: &str) -> Result<Command, ScriptError> {
    parse_keyword_command(text).map(Command::Keyword)
}
