use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Stable identifier of a state in the graph.
pub type StateId = String;

/// Event fired when a state is entered.
pub const EVENT_ENTER: &str = "입장";
/// Event fired when a state is left.
pub const EVENT_EXIT: &str = "퇴장";
/// Synthesized event advancing to the next paragraph of a chapter.
pub const EVENT_NEXT: &str = "다음";
/// Synthesized event fired when the last paragraph with options has been read.
pub const EVENT_FINISHED: &str = "완독";
/// Lifecycle hook dispatched whenever the variable scope changes.
pub const HOOK_CHANGE_SCOPE: &str = "changeScope";

/// Built-in function: move to another state.
pub const FN_MOVE: &str = "이동";
/// Built-in function: open the options of the current state.
pub const FN_OPEN_OPTIONS: &str = "선택지";
/// Built-in function: resolve values and hand them to the output handler.
pub const FN_OUTPUT: &str = "출력";

/// Separator between a chapter id and the paragraph index of derived states.
pub const SEQ_SEPARATOR: &str = "__seq";

/// A variable payload, as written in metadata variable tables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Bool(bool),
    Number(f64),
    String(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bool(b) => write!(f, "{b}"),
            Value::Number(n) => write!(f, "{n}"),
            Value::String(s) => f.write_str(s),
            Value::List(values) => {
                f.write_str("[")?;
                for (i, v) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{v}")?;
                }
                f.write_str("]")
            },
            Value::Map(entries) => {
                f.write_str("{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{k}: {v}")?;
                }
                f.write_str("}")
            },
        }
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Bool(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Number(value)
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Number(f64::from(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}

/// Name -> value table attached to the first state of a chapter.
pub type Variables = BTreeMap<String, Value>;

/// A parsed command.
///
/// Function arguments are always primitive commands (never nested functions).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// `#id`
    State { id: StateId },
    /// Variable reference or literal.
    Value(ValueCommand),
    /// Reserved keyword; the keyword set is currently empty.
    Keyword(Keyword),
    /// `(<condition>) 이면, name(args)`
    Function(FunctionCommand),
}

impl Command {
    pub fn state(id: impl Into<StateId>) -> Self {
        Command::State { id: id.into() }
    }

    pub fn variable(name: impl Into<String>) -> Self {
        Command::Value(ValueCommand::Variable { name: name.into() })
    }

    pub fn numeric(value: f64) -> Self {
        Command::Value(ValueCommand::Numeric { value })
    }

    pub fn string(value: impl Into<String>) -> Self {
        Command::Value(ValueCommand::String { value: value.into() })
    }

    pub fn boolean(value: bool) -> Self {
        Command::Value(ValueCommand::Boolean { value })
    }

    pub fn call(name: impl Into<String>, args: Vec<Command>) -> Self {
        Command::Function(FunctionCommand {
            name: name.into(),
            args,
            condition: None,
        })
    }

    pub fn as_function(&self) -> Option<&FunctionCommand> {
        match self {
            Command::Function(f) => Some(f),
            _ => None,
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::State { id } => write!(f, "#{id}"),
            Command::Value(value) => write!(f, "{value}"),
            Command::Keyword(keyword) => write!(f, "{keyword}"),
            Command::Function(function) => write!(f, "{function}"),
        }
    }
}

/// Commands that evaluate to a value; the only valid condition operands.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ValueCommand {
    Variable { name: String },
    Numeric { value: f64 },
    String { value: String },
    Boolean { value: bool },
}

impl fmt::Display for ValueCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueCommand::Variable { name } => write!(f, "${name}"),
            ValueCommand::Numeric { value } => write!(f, "{value}"),
            // no escapes in the grammar: pick the delimiter the text does not contain
            ValueCommand::String { value } if value.contains('\'') => write!(f, "\"{value}\""),
            ValueCommand::String { value } => write!(f, "'{value}'"),
            ValueCommand::Boolean { value } => write!(f, "{value}"),
        }
    }
}

/// Reserved keywords. No keyword is defined yet, so no value of this type exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Keyword {}

impl Keyword {
    pub fn from_name(_name: &str) -> Option<Self> {
        None
    }
}

impl fmt::Display for Keyword {
    fn fmt(&self, _f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {}
    }
}

/// A call to a built-in or host-registered function, optionally guarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCommand {
    pub name: String,
    pub args: Vec<Command>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
}

impl fmt::Display for FunctionCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(condition) = &self.condition {
            write!(f, "({condition}) 이면, ")?;
        }
        write!(f, "{}(", self.name)?;
        for (i, arg) in self.args.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{arg}")?;
        }
        f.write_str(")")
    }
}

/// `left` alone (true iff it is boolean `true`) or `left op right`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Condition {
    pub left: ValueCommand,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub right: Option<Comparison>,
}

impl Condition {
    pub fn single(left: ValueCommand) -> Self {
        Self { left, right: None }
    }

    pub fn compare(left: ValueCommand, op: Operator, value: ValueCommand) -> Self {
        Self {
            left,
            right: Some(Comparison { op, value }),
        }
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.left)?;
        if let Some(Comparison { op, value }) = &self.right {
            write!(f, " {op} {value}")?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comparison {
    pub op: Operator,
    pub value: ValueCommand,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Operator {
    Less,
    LessOrEqual,
    Equal,
    GreaterOrEqual,
    Greater,
}

impl Operator {
    pub fn from_symbol(symbol: &str) -> Option<Self> {
        match symbol.trim() {
            "<" => Some(Operator::Less),
            "<=" => Some(Operator::LessOrEqual),
            "=" => Some(Operator::Equal),
            ">=" => Some(Operator::GreaterOrEqual),
            ">" => Some(Operator::Greater),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Less => "<",
            Operator::LessOrEqual => "<=",
            Operator::Equal => "=",
            Operator::GreaterOrEqual => ">=",
            Operator::Greater => ">",
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

/// A player-selectable branch on the last state of a chapter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvnmOption {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<Condition>,
    pub commands: Vec<Command>,
}

/// One expanded narrative beat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SvnmState {
    pub id: StateId,
    /// Local variables are reset whenever a move crosses a scope boundary.
    pub scope: String,
    pub paragraph: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub global_variables: Option<Variables>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local_variables: Option<Variables>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<SvnmOption>>,
    #[serde(default)]
    pub events: BTreeMap<String, Vec<Command>>,
}

impl SvnmState {
    /// A state with no variables, options, or events.
    pub fn new(id: impl Into<StateId>, scope: impl Into<String>, paragraph: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            scope: scope.into(),
            paragraph: paragraph.into(),
            global_variables: None,
            local_variables: None,
            options: None,
            events: BTreeMap::new(),
        }
    }

    /// Options of this state, treating an empty list like no options at all.
    pub fn options(&self) -> Option<&[SvnmOption]> {
        self.options.as_deref().filter(|options| !options.is_empty())
    }

    pub fn option(&self, name: &str) -> Option<&SvnmOption> {
        self.options.as_ref()?.iter().find(|option| option.name == name)
    }

    pub fn event(&self, name: &str) -> Option<&[Command]> {
        self.events.get(name).map(Vec::as_slice)
    }
}

/// The global state graph, keyed by state id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Svnm {
    pub state_map: BTreeMap<StateId, SvnmState>,
}

impl Svnm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from states, rejecting repeated ids.
    ///
    /// # Errors
    /// Returns the first id that occurs twice.
    pub fn from_states(states: impl IntoIterator<Item = SvnmState>) -> Result<Self, DuplicateStateId> {
        let mut svnm = Self::new();
        for state in states {
            if svnm.state_map.contains_key(&state.id) {
                return Err(DuplicateStateId { id: state.id });
            }
            svnm.state_map.insert(state.id.clone(), state);
        }
        Ok(svnm)
    }

    pub fn get(&self, id: &str) -> Option<&SvnmState> {
        self.state_map.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.state_map.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.state_map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state_map.is_empty()
    }

    pub fn states(&self) -> impl Iterator<Item = &SvnmState> {
        self.state_map.values()
    }

    /// Move every state of `other` into `self`.
    ///
    /// Nothing is inserted when any id is already present.
    ///
    /// # Errors
    /// Returns the first id present in both graphs.
    pub fn merge(&mut self, other: Svnm) -> Result<(), DuplicateStateId> {
        if let Some(id) = other.state_map.keys().find(|id| self.state_map.contains_key(*id)) {
            return Err(DuplicateStateId { id: id.clone() });
        }
        self.state_map.extend(other.state_map);
        Ok(())
    }

    /// Combine two graphs into a new one.
    ///
    /// # Errors
    /// Returns the first id present in both graphs.
    pub fn concat(mut a: Svnm, b: Svnm) -> Result<Svnm, DuplicateStateId> {
        a.merge(b)?;
        Ok(a)
    }
}

/// Two states with the same id were combined into one graph.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateStateId {
    pub id: StateId,
}

impl fmt::Display for DuplicateStateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "state id '{}' must be unique", self.id)
    }
}

impl std::error::Error for DuplicateStateId {}

#[cfg(test)]
mod tests {
    use super::*;

    fn state(id: &str, paragraph: &str) -> SvnmState {
        SvnmState::new(id, id, paragraph)
    }

    #[test]
    fn concat_disjoint_graphs_keeps_every_state() {
        let a = Svnm::from_states([state("1", "asd"), state("2", "qwe")]).unwrap();
        let b = Svnm::from_states([state("3", "asd"), state("4", "qwe")]).unwrap();
        let merged = Svnm::concat(a, b).unwrap();
        assert_eq!(merged.state_map.keys().collect::<Vec<_>>(), ["1", "2", "3", "4"]);
    }

    #[test]
    fn concat_overlapping_graphs_fails() {
        let a = Svnm::from_states([state("1", "1")]).unwrap();
        let b = Svnm::from_states([state("1", "2")]).unwrap();
        let err = Svnm::concat(a, b).unwrap_err();
        assert_eq!(err.id, "1");
    }

    #[test]
    fn failed_merge_leaves_graph_untouched() {
        let mut a = Svnm::from_states([state("1", "1")]).unwrap();
        let b = Svnm::from_states([state("0", "0"), state("1", "2")]).unwrap();
        assert!(a.merge(b).is_err());
        assert_eq!(a.len(), 1);
        assert_eq!(a.get("1").unwrap().paragraph, "1");
    }

    #[test]
    fn from_states_rejects_repeated_ids() {
        assert!(Svnm::from_states([state("a", "x"), state("a", "y")]).is_err());
    }

    #[test]
    fn empty_options_count_as_none() {
        let mut s = state("a", "x");
        s.options = Some(Vec::new());
        assert!(s.options().is_none());
    }

    #[test]
    fn commands_render_in_source_syntax() {
        let mut call = FunctionCommand {
            name: "foo".into(),
            args: vec![Command::state("A"), Command::string("it's"), Command::numeric(-0.5)],
            condition: None,
        };
        assert_eq!(call.to_string(), "foo(#A, \"it's\", -0.5)");
        call.condition = Some(Condition::compare(
            ValueCommand::Variable { name: "hp".into() },
            Operator::GreaterOrEqual,
            ValueCommand::Numeric { value: 3.0 },
        ));
        assert_eq!(call.to_string(), "($hp >= 3) 이면, foo(#A, \"it's\", -0.5)");
    }

    #[test]
    fn values_render_readably() {
        let v = Value::List(vec![Value::from(1), Value::from("a"), Value::from(true)]);
        assert_eq!(v.to_string(), "[1, a, true]");
    }
}
