use svnm_data::DuplicateStateId;

/// Errors that can happen while turning SVNM text into a state graph.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("syntax error: \"{input}\" is not {expected}")]
    Syntax { input: String, expected: &'static str },
    #[error("syntax error: {0}")]
    Structure(&'static str),
    #[error("syntax error in chapter '{chapter}': {message}")]
    Chapter { chapter: String, message: &'static str },
    #[error("metadata of chapter '{chapter}' does not match the schema: {source}")]
    Schema {
        chapter: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("in chapter '{chapter}' ({context}): {source}")]
    Command {
        chapter: String,
        context: String,
        #[source]
        source: Box<ScriptError>,
    },
    #[error(transparent)]
    Merge(#[from] DuplicateStateId),
}

impl ScriptError {
    pub(crate) fn syntax(input: &str, expected: &'static str) -> Self {
        ScriptError::Syntax {
            input: input.to_string(),
            expected,
        }
    }

    /// True for grammar mismatches, including those found inside a chapter.
    pub fn is_syntax(&self) -> bool {
        match self {
            ScriptError::Syntax { .. } | ScriptError::Structure(_) | ScriptError::Chapter { .. } => true,
            ScriptError::Command { source, .. } => source.is_syntax(),
            ScriptError::Schema { .. } | ScriptError::Merge(_) => false,
        }
    }
}
