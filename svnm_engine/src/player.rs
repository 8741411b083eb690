//! Terminal player.
//!
//! Prints each state's paragraph as it is entered and `출력` output as it is
//! dispatched. An empty line advances (`다음`, or `완독` at the end of a
//! chapter); once options are open, typing an option's name or number selects it.

pub mod input;

use std::sync::Arc;

use anyhow::{Context, Result};
use log::info;
use svnm_data::{EVENT_ENTER, EVENT_FINISHED, EVENT_NEXT, FN_OUTPUT, Svnm, SvnmState, Value};

use crate::runtime::{Arg, RuntimeConfig, SvnmRuntime};
use crate::style::NarrativeStyle;
use input::{InputEvent, InputManager};

/// A line of player input, interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayerCommand {
    Advance,
    Choose(String),
    Variables,
    Help,
    Quit,
}

impl PlayerCommand {
    pub fn parse(line: &str) -> Self {
        match line.trim() {
            "" => PlayerCommand::Advance,
            ":q" | ":quit" => PlayerCommand::Quit,
            ":vars" => PlayerCommand::Variables,
            ":help" | ":h" => PlayerCommand::Help,
            choice => PlayerCommand::Choose(choice.to_string()),
        }
    }
}

/// What advancing from a state does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advance {
    Emit(&'static str),
    AwaitChoice,
    End,
}

/// Decide how an empty line advances from `state`.
pub fn next_step(state: &SvnmState, options_open: bool) -> Advance {
    if state.event(EVENT_NEXT).is_some() {
        Advance::Emit(EVENT_NEXT)
    } else if state.options().is_some() {
        if options_open { Advance::AwaitChoice } else { Advance::Emit(EVENT_FINISHED) }
    } else {
        Advance::End
    }
}

/// Map typed text to an option name: a 1-based number into `names`, or a name itself.
pub fn resolve_choice<'a>(input: &str, names: &'a [String]) -> Option<&'a str> {
    let input = input.trim();
    let by_number = input
        .parse::<usize>()
        .ok()
        .and_then(|n| n.checked_sub(1))
        .and_then(|i| names.get(i));
    by_number
        .or_else(|| names.iter().find(|name| *name == input))
        .map(String::as_str)
}

/// Names of the current state's options whose guards hold.
pub fn visible_options(runtime: &SvnmRuntime) -> Vec<String> {
    runtime
        .current_state()
        .and_then(SvnmState::options)
        .unwrap_or_default()
        .iter()
        .filter(|option| runtime.check_condition(option.condition.as_ref()).unwrap_or(false))
        .map(|option| option.name.clone())
        .collect()
}

/// Host functions the player binds: paragraph display on enter, and `출력`.
pub fn player_config(start: &str) -> RuntimeConfig {
    RuntimeConfig::new(start)
        .function(EVENT_ENTER, |runtime: &mut SvnmRuntime, _args: &[Arg]| {
            if let Some(state) = runtime.current_state() {
                println!("\n{}", state.paragraph.paragraph_style());
            }
            Ok(())
        })
        .function(FN_OUTPUT, |_runtime: &mut SvnmRuntime, args: &[Arg]| {
            println!("{}", output_text(args).output_style());
            Ok(())
        })
}

/// Run an interactive session over `svnm`, starting at `start`.
///
/// # Errors
/// Fails when the start state is missing or input cannot be read.
pub fn run_player(svnm: Arc<Svnm>, start: &str) -> Result<()> {
    let mut runtime = SvnmRuntime::new(svnm, player_config(start)).context("while starting the narrative")?;
    let mut input = InputManager::new();
    drain(&mut runtime);

    loop {
        let options = if runtime.is_options_open() {
            visible_options(&runtime)
        } else {
            Vec::new()
        };
        for (i, name) in options.iter().enumerate() {
            println!("  {}. {}", i + 1, name.option_style());
        }

        let line = match input.read_line(&"> ".prompt_style().to_string())? {
            InputEvent::Line(line) => line,
            InputEvent::Eof => break,
            InputEvent::Interrupted => continue,
        };

        match PlayerCommand::parse(&line) {
            PlayerCommand::Quit => break,
            PlayerCommand::Help => {
                println!("{}", "enter: continue | <number or name>: choose | :vars | :quit".hint_style());
            },
            PlayerCommand::Variables => print_variables(&runtime),
            PlayerCommand::Advance => {
                let Some(state) = runtime.current_state() else {
                    break;
                };
                match next_step(state, runtime.is_options_open()) {
                    Advance::Emit(event) => report(runtime.emit(event)),
                    Advance::AwaitChoice => println!("{}", "(choose an option)".hint_style()),
                    Advance::End => {
                        println!("\n{}", "끝".hint_style());
                        break;
                    },
                }
            },
            PlayerCommand::Choose(text) => match resolve_choice(&text, &options) {
                Some(name) => report(runtime.select(name)),
                None => report(runtime.select(&text)),
            },
        }
        drain(&mut runtime);
    }

    info!("player session ended");
    Ok(())
}

/// `출력` arguments joined by spaces; resolved strings print bare, anything
/// else in its source form.
pub fn output_text(args: &[Arg]) -> String {
    args.iter()
        .map(|arg| match arg.as_value().and_then(Value::as_str) {
            Some(text) => text.to_string(),
            None => arg.to_string(),
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn drain(runtime: &mut SvnmRuntime) {
    if let Err(failures) = runtime.run_until_idle() {
        for failure in &failures.0 {
            eprintln!("{}", failure.to_string().error_style());
        }
    }
}

fn report<E: std::fmt::Display>(result: Result<(), E>) {
    if let Err(e) = result {
        eprintln!("{}", e.to_string().error_style());
    }
}

fn print_variables(runtime: &SvnmRuntime) {
    for (scope, variables) in [("global", runtime.global_variables()), ("local", runtime.local_variables())] {
        for (name, value) in variables {
            println!("{}", format!("[{scope}] {name} = {value}").hint_style());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use svnm_data::{Command, SvnmOption};

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn input_lines_map_to_commands() {
        assert_eq!(PlayerCommand::parse("  "), PlayerCommand::Advance);
        assert_eq!(PlayerCommand::parse(":quit"), PlayerCommand::Quit);
        assert_eq!(PlayerCommand::parse(":vars"), PlayerCommand::Variables);
        assert_eq!(PlayerCommand::parse(" 싸운다 "), PlayerCommand::Choose("싸운다".into()));
    }

    #[test]
    fn choices_resolve_by_number_or_name() {
        let options = names(&["싸운다", "도망친다"]);
        assert_eq!(resolve_choice("2", &options), Some("도망친다"));
        assert_eq!(resolve_choice("싸운다", &options), Some("싸운다"));
        assert_eq!(resolve_choice("0", &options), None);
        assert_eq!(resolve_choice("3", &options), None);
        assert_eq!(resolve_choice("숨는다", &options), None);
    }

    #[test]
    fn output_joins_resolved_values_and_commands() {
        let args = [
            Arg::Value(Value::from("금화")),
            Arg::Value(Value::from(3)),
            Arg::Command(Command::state("shop")),
        ];
        assert_eq!(output_text(&args), "금화 3 #shop");
        assert_eq!(output_text(&[]), "");
    }

    #[test]
    fn advancing_follows_the_state_shape() {
        let mut middle = SvnmState::new("S", "S", "a.");
        middle
            .events
            .insert(EVENT_NEXT.into(), vec![Command::call("이동", vec![Command::state("S__seq1")])]);
        assert_eq!(next_step(&middle, false), Advance::Emit(EVENT_NEXT));

        let mut last = SvnmState::new("S__seq1", "S", "b.");
        assert_eq!(next_step(&last, false), Advance::End);

        last.options = Some(vec![SvnmOption {
            name: "go".into(),
            condition: None,
            commands: vec![],
        }]);
        assert_eq!(next_step(&last, false), Advance::Emit(EVENT_FINISHED));
        assert_eq!(next_step(&last, true), Advance::AwaitChoice);
    }
}
