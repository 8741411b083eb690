//! The SVNM interpreter.
//!
//! An [`SvnmRuntime`] walks one shared [`Svnm`] graph. It owns the session:
//! the current state, the global variables (kept for the whole session) and
//! the local variables (cleared whenever a move crosses into another scope).
//!
//! [`SvnmRuntime::emit`], [`SvnmRuntime::select`] and moves never run commands
//! directly. They evaluate guards and push the surviving calls onto the
//! [`DispatchQueue`]; the host then calls [`SvnmRuntime::run_until_idle`] (or
//! [`SvnmRuntime::step`]) to execute them in order.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use log::{debug, error, info};
use svnm_data::{
    Command, Condition, EVENT_ENTER, EVENT_EXIT, HOOK_CHANGE_SCOPE, Operator, StateId, Svnm, SvnmState, Value,
    ValueCommand, Variables,
};
use thiserror::Error;

use crate::builtin::{Builtin, BuiltinOutcome};
use crate::scheduler::{Dispatch, DispatchQueue};

/// Local variable that marks the current state's options as selectable.
pub const OPTIONS_OPEN_FLAG: &str = "__is_options_open";

/// A host function bound to a command name.
pub type Handler = Rc<dyn Fn(&mut SvnmRuntime, &[Arg]) -> anyhow::Result<()>>;

/// An argument handed to a host handler.
///
/// Built-ins may resolve raw commands to values first (`출력` resolves
/// variables and literals, `이동` passes the target id); commands without a
/// built-in reach the handler unchanged.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Value(Value),
    Command(Command),
}

impl Arg {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Arg::Value(value) => Some(value),
            Arg::Command(_) => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arg::Value(value) => write!(f, "{value}"),
            Arg::Command(command) => write!(f, "{command}"),
        }
    }
}

/// Errors raised by runtime operations and by dispatched units.
#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("no state found for \"{0}\"")]
    StateNotFound(StateId),
    #[error("current state not found")]
    NoCurrentState,
    #[error("options not found in state \"{0}\"")]
    NoOptions(StateId),
    #[error("options of state \"{0}\" are not open")]
    OptionsClosed(StateId),
    #[error("option \"{option}\" not found in state \"{state}\"")]
    UnknownOption { state: StateId, option: String },
    #[error("\"{0}\" is not defined")]
    UndefinedVariable(String),
    #[error("{name}: expected {expected}")]
    InvalidArgument { name: &'static str, expected: &'static str },
    #[error("handler '{name}' failed: {source}")]
    Handler {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// A dispatched unit that failed while the queue was draining.
#[derive(Debug)]
pub struct DispatchFailure {
    pub name: String,
    pub state: Option<StateId>,
    pub error: RuntimeError,
}

impl fmt::Display for DispatchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "'{}' (queued in state '{state}'): {}", self.name, self.error),
            None => write!(f, "'{}': {}", self.name, self.error),
        }
    }
}

impl std::error::Error for DispatchFailure {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        Some(&self.error)
    }
}

/// Every failure of one drain, in the order the units ran.
#[derive(Debug)]
pub struct DispatchFailures(pub Vec<DispatchFailure>);

impl fmt::Display for DispatchFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} dispatch(es) failed:", self.0.len())?;
        for failure in &self.0 {
            write!(f, "\n- {failure}")?;
        }
        Ok(())
    }
}

impl std::error::Error for DispatchFailures {}

/// Where to start and which host functions to call.
#[derive(Clone, Default)]
pub struct RuntimeConfig {
    pub start: StateId,
    pub functions: HashMap<String, Handler>,
}

impl RuntimeConfig {
    pub fn new(start: impl Into<StateId>) -> Self {
        Self {
            start: start.into(),
            functions: HashMap::new(),
        }
    }

    /// Register `handler` for the command `name`, replacing any earlier one.
    #[must_use]
    pub fn function<F>(mut self, name: impl Into<String>, handler: F) -> Self
    where
        F: Fn(&mut SvnmRuntime, &[Arg]) -> anyhow::Result<()> + 'static,
    {
        self.functions.insert(name.into(), Rc::new(handler));
        self
    }
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.functions.keys().collect();
        names.sort();
        f.debug_struct("RuntimeConfig")
            .field("start", &self.start)
            .field("functions", &names)
            .finish()
    }
}

/// One narrative session over a shared graph.
pub struct SvnmRuntime {
    svnm: Arc<Svnm>,
    functions: HashMap<String, Handler>,
    current: Option<StateId>,
    global_variables: Variables,
    local_variables: Variables,
    queue: DispatchQueue,
}

impl SvnmRuntime {
    /// Create a session and move to `config.start`.
    ///
    /// The move's hooks and enter commands are queued, not run.
    ///
    /// # Errors
    /// Returns [`RuntimeError::StateNotFound`] when the start state does not
    /// exist, or an evaluation error from a guard of the start state's enter
    /// commands.
    pub fn new(svnm: Arc<Svnm>, config: RuntimeConfig) -> Result<Self, RuntimeError> {
        let RuntimeConfig { start, functions } = config;
        let mut runtime = Self {
            svnm,
            functions,
            current: None,
            global_variables: Variables::new(),
            local_variables: Variables::new(),
            queue: DispatchQueue::new(),
        };
        info!(
            "starting runtime at '{start}' with {} host function(s)",
            runtime.functions.len()
        );
        runtime.move_to(&start)?;
        Ok(runtime)
    }

    pub fn svnm(&self) -> &Arc<Svnm> {
        &self.svnm
    }

    pub fn current_state(&self) -> Option<&SvnmState> {
        self.current.as_deref().and_then(|id| self.svnm.get(id))
    }

    pub fn global_variables(&self) -> &Variables {
        &self.global_variables
    }

    pub fn local_variables(&self) -> &Variables {
        &self.local_variables
    }

    /// Dispatches waiting to run, oldest first.
    pub fn pending(&self) -> impl Iterator<Item = &Dispatch> {
        self.queue.iter()
    }

    pub fn is_idle(&self) -> bool {
        self.queue.is_empty()
    }

    /// Move to `id`.
    ///
    /// In order: the outgoing state's `퇴장` commands and the `퇴장` hook are
    /// queued; crossing a scope clears local variables and queues the
    /// `changeScope` hook; the incoming state's variables are merged in; the
    /// state becomes current; the `입장` hook and the `입장` commands are queued.
    ///
    /// # Errors
    /// Returns [`RuntimeError::StateNotFound`] before touching the session if
    /// `id` is not in the graph, or a guard evaluation error.
    pub fn move_to(&mut self, id: &str) -> Result<(), RuntimeError> {
        let svnm = Arc::clone(&self.svnm);
        let target = svnm.get(id).ok_or_else(|| RuntimeError::StateNotFound(id.to_string()))?;
        let previous = self.current.as_deref().and_then(|current| svnm.get(current));

        if previous.is_some() {
            self.emit(EVENT_EXIT)?;
            self.call(EVENT_EXIT, Vec::new());
        }
        if previous.is_none_or(|state| state.scope != target.scope) {
            debug!("entering scope '{}'; clearing local variables", target.scope);
            self.local_variables.clear();
            self.call(HOOK_CHANGE_SCOPE, Vec::new());
        }
        if let Some(globals) = &target.global_variables {
            self.global_variables
                .extend(globals.iter().map(|(name, value)| (name.clone(), value.clone())));
        }
        if let Some(locals) = &target.local_variables {
            self.local_variables
                .extend(locals.iter().map(|(name, value)| (name.clone(), value.clone())));
        }

        info!("moved to state '{id}'");
        self.current = Some(target.id.clone());
        self.call(EVENT_ENTER, Vec::new());
        self.emit(EVENT_ENTER)
    }

    /// Queue the commands of the current state's `event`, in order.
    ///
    /// Nothing happens without a current state or without such an event.
    ///
    /// # Errors
    /// Returns an evaluation error from a command guard; commands before it
    /// stay queued.
    pub fn emit(&mut self, event: &str) -> Result<(), RuntimeError> {
        let svnm = Arc::clone(&self.svnm);
        let Some(commands) = self.current.as_deref().and_then(|id| svnm.get(id)).and_then(|s| s.event(event)) else {
            return Ok(());
        };
        debug!("emitting '{event}' ({} command(s))", commands.len());
        for command in commands {
            self.run_command(command)?;
        }
        Ok(())
    }

    /// Queue the commands of the option called `name`.
    ///
    /// A false option guard is not an error; nothing is queued.
    ///
    /// # Errors
    /// - [`RuntimeError::NoCurrentState`]
    /// - [`RuntimeError::NoOptions`] when the current state has no options
    /// - [`RuntimeError::OptionsClosed`] before `선택지` ran in this state
    /// - [`RuntimeError::UnknownOption`]
    /// - evaluation errors from guards
    pub fn select(&mut self, name: &str) -> Result<(), RuntimeError> {
        let svnm = Arc::clone(&self.svnm);
        let state = self
            .current
            .as_deref()
            .and_then(|id| svnm.get(id))
            .ok_or(RuntimeError::NoCurrentState)?;
        let options = state.options().ok_or_else(|| RuntimeError::NoOptions(state.id.clone()))?;
        if !self.is_options_open() {
            return Err(RuntimeError::OptionsClosed(state.id.clone()));
        }
        let option = options
            .iter()
            .find(|option| option.name == name)
            .ok_or_else(|| RuntimeError::UnknownOption {
                state: state.id.clone(),
                option: name.to_string(),
            })?;

        if !self.check_condition(option.condition.as_ref())? {
            debug!("option '{name}' is guarded off");
            return Ok(());
        }
        for command in &option.commands {
            self.run_command(command)?;
        }
        Ok(())
    }

    /// Queue `command` if it is a call whose guard holds.
    ///
    /// # Errors
    /// Returns an evaluation error from the guard.
    pub fn run_command(&mut self, command: &Command) -> Result<(), RuntimeError> {
        let Some(function) = command.as_function() else {
            debug!("skipping non-call command {command}");
            return Ok(());
        };
        if self.check_condition(function.condition.as_ref())? {
            self.call(&function.name, function.args.clone());
        }
        Ok(())
    }

    /// Mark the current state's options as selectable.
    pub fn open_options(&mut self) {
        self.local_variables.insert(OPTIONS_OPEN_FLAG.to_string(), Value::Bool(true));
    }

    pub fn is_options_open(&self) -> bool {
        matches!(self.local_variables.get(OPTIONS_OPEN_FLAG), Some(Value::Bool(true)))
    }

    /// No condition holds; a single operand holds only when it is exactly `true`.
    ///
    /// Comparisons order numbers numerically and strings or booleans by their
    /// natural order; `=` is equality of same-kind values. Ordering values of
    /// different kinds is always false.
    ///
    /// # Errors
    /// Returns [`RuntimeError::UndefinedVariable`] for an unknown operand.
    pub fn check_condition(&self, condition: Option<&Condition>) -> Result<bool, RuntimeError> {
        let Some(condition) = condition else {
            return Ok(true);
        };
        let left = self.get_value(&condition.left)?;
        let Some(right) = &condition.right else {
            return Ok(left == Value::Bool(true));
        };
        let value = self.get_value(&right.value)?;
        Ok(compare(&left, right.op, &value))
    }

    /// Literal commands evaluate to themselves; variables are looked up.
    ///
    /// # Errors
    /// Returns [`RuntimeError::UndefinedVariable`] for an unknown variable.
    pub fn get_value(&self, command: &ValueCommand) -> Result<Value, RuntimeError> {
        match command {
            ValueCommand::Variable { name } => self.get_variable(name).cloned(),
            ValueCommand::Numeric { value } => Ok(Value::Number(*value)),
            ValueCommand::String { value } => Ok(Value::String(value.clone())),
            ValueCommand::Boolean { value } => Ok(Value::Bool(*value)),
        }
    }

    /// Local variables shadow global ones. Stored `0`, `false` and `""` are found.
    ///
    /// # Errors
    /// Returns [`RuntimeError::UndefinedVariable`] when neither scope has `name`.
    pub fn get_variable(&self, name: &str) -> Result<&Value, RuntimeError> {
        self.local_variables
            .get(name)
            .or_else(|| self.global_variables.get(name))
            .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))
    }

    /// Overwrite an existing variable, local first.
    ///
    /// # Errors
    /// Returns [`RuntimeError::UndefinedVariable`] when neither scope has `name`.
    pub fn set_variable(&mut self, name: &str, value: impl Into<Value>) -> Result<(), RuntimeError> {
        let slot = match self.local_variables.get_mut(name) {
            Some(slot) => slot,
            None => self
                .global_variables
                .get_mut(name)
                .ok_or_else(|| RuntimeError::UndefinedVariable(name.to_string()))?,
        };
        *slot = value.into();
        Ok(())
    }

    /// Run the oldest queued dispatch, if any.
    ///
    /// A failed unit is logged and returned; the queue is left intact.
    pub fn step(&mut self) -> Option<Result<(), DispatchFailure>> {
        let Dispatch { name, args, state } = self.queue.pop()?;
        let result = self.dispatch(&name, &args).map_err(|error| DispatchFailure { name, state, error });
        if let Err(failure) = &result {
            error!("dispatch failed: {failure}");
        }
        Some(result)
    }

    /// Drain the queue, including units queued while draining.
    ///
    /// A failing unit never stops the drain.
    ///
    /// # Errors
    /// Returns every failure of this drain once the queue is empty.
    pub fn run_until_idle(&mut self) -> Result<usize, DispatchFailures> {
        let mut ran = 0;
        let mut failures = Vec::new();
        while let Some(result) = self.step() {
            ran += 1;
            if let Err(failure) = result {
                failures.push(failure);
            }
        }
        debug!("queue idle after {ran} dispatch(es)");
        if failures.is_empty() {
            Ok(ran)
        } else {
            Err(DispatchFailures(failures))
        }
    }

    fn call(&mut self, name: &str, args: Vec<Command>) {
        self.queue.push(Dispatch::new(name, args, self.current.clone()));
    }

    fn dispatch(&mut self, name: &str, args: &[Command]) -> Result<(), RuntimeError> {
        let builtin = Builtin::from_name(name);
        let args = match builtin {
            Some(builtin) => match builtin.run(self, args)? {
                BuiltinOutcome::Continue(args) => args,
                BuiltinOutcome::Stop => return Ok(()),
            },
            None => args.iter().cloned().map(Arg::Command).collect(),
        };

        match self.functions.get(name).cloned() {
            Some(handler) => handler(self, &args).map_err(|source| RuntimeError::Handler {
                name: name.to_string(),
                source: source.into(),
            }),
            None => {
                if builtin.is_none() {
                    debug!("no built-in or handler for '{name}'; ignoring");
                }
                Ok(())
            },
        }
    }
}

impl fmt::Debug for SvnmRuntime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SvnmRuntime")
            .field("current", &self.current)
            .field("global_variables", &self.global_variables)
            .field("local_variables", &self.local_variables)
            .field("pending", &self.queue.len())
            .finish_non_exhaustive()
    }
}

fn compare(left: &Value, op: Operator, right: &Value) -> bool {
    if op == Operator::Equal {
        return left == right;
    }
    let ordering = match (left, right) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b),
        (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
        (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
        _ => None,
    };
    let Some(ordering) = ordering else {
        return false;
    };
    match op {
        Operator::Less => ordering == Ordering::Less,
        Operator::LessOrEqual => ordering != Ordering::Greater,
        Operator::GreaterOrEqual => ordering != Ordering::Less,
        Operator::Greater => ordering == Ordering::Greater,
        Operator::Equal => ordering == Ordering::Equal,
    }
}
