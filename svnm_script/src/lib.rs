//! svnm_script: command grammar and chapter compiler for SVNM narratives.
//!
//! A document is a run of chapters:
//!
//! ```text
//! # start
//! First paragraph.
//!
//! Second paragraph.
//! ---
//! 선택지:
//!   ($용기 > 3)이면, 싸운다: [이동(#fight)]
//!   도망친다: [이동(#run)]
//! ```
//!
//! Each paragraph becomes one state of the resulting [`Svnm`] graph; the
//! optional YAML after `---` carries variables, scope, options, and events.

mod chapter;
mod error;
mod files;
mod metadata;
mod parser;
mod sequence;

pub use chapter::{Chapter, parse_chapter, split_chapters};
pub use error::ScriptError;
pub use files::{SCRIPT_EXTENSION, script_files};
pub use metadata::{Metadata, OrderedMap, parse_metadata};
pub use parser::{
    ConditionPrefix, parse_boolean_command, parse_command, parse_condition_arg, parse_condition_prefix,
    parse_function_command, parse_keyword_command, parse_numeric_command, parse_primitive_command,
    parse_state_command, parse_string_command, parse_value_command, parse_variable_command,
};
pub use sequence::{build_states, state_id};

use svnm_data::Svnm;

/// Parse a whole SVNM document into one state graph.
///
/// Chapters are merged left to right. A blank document yields an empty graph.
///
/// # Errors
/// Returns the first syntax or schema error found, or [`ScriptError::Merge`]
/// when two chapters produce the same state id.
pub fn parse_svnm(text: &str) -> Result<Svnm, ScriptError> {
    let text = text.replace("\r\n", "\n");
    let mut svnm = Svnm::new();
    for chapter_text in split_chapters(text.trim())? {
        let chapter = parse_chapter(chapter_text)?;
        let metadata = parse_metadata(chapter.id, chapter.metadata)?;
        let states = build_states(&chapter, metadata)?;
        svnm.merge(Svnm::from_states(states)?)?;
    }
    Ok(svnm)
}
