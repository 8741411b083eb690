use pest::Parser;

use svnm_data::{Condition, Operator};

use super::primitive::parse_value_command;
use super::{CommandParser, Rule};
use crate::ScriptError;

/// `left` or `left op right`, with `op` one of `<`, `<=`, `=`, `>=`, `>`.
///
/// # Errors
/// Returns a syntax error for malformed conditions or operands that are not values.
pub fn parse_condition_arg(text: &str) -> Result<Condition, ScriptError> {
    let t = text.trim();
    let mut pairs = CommandParser::parse(Rule::condition, t).map_err(|_| ScriptError::syntax(t, "condition"))?;
    let root = pairs.next().ok_or(ScriptError::Structure("expected condition"))?;

    let mut operands = Vec::with_capacity(2);
    let mut op = None;
    for pair in root.into_inner() {
        match pair.as_rule() {
            Rule::operand => operands.push(parse_value_command(pair.as_str())?),
            Rule::comparison => op = Operator::from_symbol(pair.as_str()),
            _ => {},
        }
    }

    let mut operands = operands.into_iter();
    let left = operands.next().ok_or_else(|| ScriptError::syntax(t, "condition"))?;
    match (op, operands.next()) {
        (None, None) => Ok(Condition::single(left)),
        (Some(op), Some(value)) => Ok(Condition::compare(left, op, value)),
        _ => Err(ScriptError::syntax(t, "condition")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svnm_data::ValueCommand;

    fn num(value: f64) -> ValueCommand {
        ValueCommand::Numeric { value }
    }

    #[test]
    fn single_operand() {
        assert_eq!(
            parse_condition_arg(" $done ").unwrap(),
            Condition::single(ValueCommand::Variable { name: "done".into() })
        );
    }

    #[test]
    fn two_character_operators_are_not_split() {
        let c = parse_condition_arg("$a<=3").unwrap();
        assert_eq!(c.right.unwrap().op, Operator::LessOrEqual);
        let c = parse_condition_arg("$a >= -1").unwrap();
        let right = c.right.unwrap();
        assert_eq!(right.op, Operator::GreaterOrEqual);
        assert_eq!(right.value, num(-1.0));
    }

    #[test]
    fn quoted_operands_may_hold_spaces_and_operators() {
        let c = parse_condition_arg("'a < b' = $x").unwrap();
        assert_eq!(c.left, ValueCommand::String { value: "a < b".into() });
        assert_eq!(c.right.unwrap().op, Operator::Equal);
    }

    #[test]
    fn malformed_conditions_fail() {
        for bad in ["", "$a <", "1 2", "$a << 2", "$a => 1", "#state", "< 3"] {
            assert!(parse_condition_arg(bad).unwrap_err().is_syntax(), "{bad:?} should fail");
        }
    }
}
