//! Command grammar for SVNM.
//!
//! Function calls, guard prefixes and conditions are matched by the Pest
//! grammar in `command.pest`; the literal operands they contain (`#id`,
//! `$name`, numbers, strings, booleans) are classified by the primitive
//! parsers.

use pest_derive::Parser as PestParser;

use svnm_data::Command;

use crate::ScriptError;

mod conditions;
mod function;
mod primitive;

pub use conditions::parse_condition_arg;
pub use function::{ConditionPrefix, parse_condition_prefix, parse_function_command};
pub use primitive::{
    parse_boolean_command, parse_keyword_command, parse_numeric_command, parse_primitive_command,
    parse_state_command, parse_string_command, parse_value_command, parse_variable_command,
};

#[derive(PestParser)]
#[grammar = "src/command.pest"]
struct CommandParser;

/// Parse any command: a primitive first, then a function call.
///
/// # Errors
/// Returns a syntax error naming the whole input when neither form matches.
pub fn parse_command(text: &str) -> Result<Command, ScriptError> {
    parse_primitive_command(text)
        .or_else(|_| parse_function_command(text).map(Command::Function))
        .map_err(|_| ScriptError::syntax(text.trim(), "command"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use svnm_data::ValueCommand;

    #[test]
    fn primitives_win_over_functions() {
        assert_eq!(parse_command("#start").unwrap(), Command::state("start"));
        assert_eq!(parse_command(" 3 ").unwrap(), Command::numeric(3.0));
        assert_eq!(
            parse_command("$flag").unwrap(),
            Command::Value(ValueCommand::Variable { name: "flag".into() })
        );
    }

    #[test]
    fn bare_words_are_zero_argument_calls() {
        assert_eq!(parse_command("선택지").unwrap(), Command::call("선택지", vec![]));
        assert_eq!(parse_command("선택지()").unwrap(), Command::call("선택지", vec![]));
    }

    #[test]
    fn invalid_commands_name_the_whole_input() {
        let err = parse_command("  foo bar ").unwrap_err();
        assert!(err.is_syntax());
        assert!(err.to_string().contains("\"foo bar\" is not command"));
        assert!(parse_command("").unwrap_err().is_syntax());
    }
}
