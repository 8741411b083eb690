//! Commands handled by the runtime itself before any host handler.

use svnm_data::{Command, FN_MOVE, FN_OPEN_OPTIONS, FN_OUTPUT, Value};

use crate::runtime::{Arg, RuntimeError, SvnmRuntime};

/// The closed set of built-in command names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    /// `이동(#id)`: move to another state.
    Move,
    /// `선택지()`: open the current state's options.
    OpenOptions,
    /// `출력(...)`: resolve value arguments for the host.
    Output,
}

/// What happens after a built-in ran.
#[derive(Debug, Clone, PartialEq)]
pub enum BuiltinOutcome {
    /// Call the host handler of the same name with these arguments.
    Continue(Vec<Arg>),
    /// Skip the host handler.
    Stop,
}

impl Builtin {
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            FN_MOVE => Some(Builtin::Move),
            FN_OPEN_OPTIONS => Some(Builtin::OpenOptions),
            FN_OUTPUT => Some(Builtin::Output),
            _ => None,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Builtin::Move => FN_MOVE,
            Builtin::OpenOptions => FN_OPEN_OPTIONS,
            Builtin::Output => FN_OUTPUT,
        }
    }

    /// Run the built-in against `runtime`.
    ///
    /// # Errors
    /// - `이동` without a state argument, or to a missing state
    /// - `출력` with a variable argument that is not defined
    pub fn run(self, runtime: &mut SvnmRuntime, args: &[Command]) -> Result<BuiltinOutcome, RuntimeError> {
        match self {
            Builtin::Move => {
                let Some(Command::State { id }) = args.first() else {
                    return Err(RuntimeError::InvalidArgument {
                        name: self.name(),
                        expected: "a state reference like #id",
                    });
                };
                runtime.move_to(id)?;
                Ok(BuiltinOutcome::Continue(vec![Arg::Value(Value::String(id.clone()))]))
            },
            Builtin::OpenOptions => {
                runtime.open_options();
                Ok(BuiltinOutcome::Continue(Vec::new()))
            },
            Builtin::Output => {
                let resolved = args
                    .iter()
                    .map(|arg| match arg {
                        Command::Value(value) => runtime.get_value(value).map(Arg::Value),
                        other => Ok(Arg::Command(other.clone())),
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(BuiltinOutcome::Continue(resolved))
            },
        }
    }
}
