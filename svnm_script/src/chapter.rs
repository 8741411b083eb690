//! Splitting a document into chapters and a chapter into its parts.

use std::sync::LazyLock;

use regex::Regex;

use crate::ScriptError;

static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^# ?\S+$").expect("valid heading regex"));
static SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)^---$").expect("valid separator regex"));
static PARAGRAPH_BREAK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n{2,}").expect("valid paragraph regex"));

/// One `# id` block of a document, before expansion into states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chapter<'a> {
    pub id: &'a str,
    pub paragraphs: Vec<&'a str>,
    pub metadata: Option<&'a str>,
}

/// Cut a normalized, trimmed document before every heading line.
///
/// # Errors
/// Fails when there is text in front of the first heading.
pub fn split_chapters(text: &str) -> Result<Vec<&str>, ScriptError> {
    let starts: Vec<usize> = HEADING.find_iter(text).map(|m| m.start()).collect();
    let first = starts.first().copied().unwrap_or(text.len());
    if !text[..first].trim().is_empty() {
        return Err(ScriptError::Structure("content before first chapter heading"));
    }

    let chapters = starts
        .iter()
        .enumerate()
        .map(|(i, &start)| {
            let end = starts.get(i + 1).copied().unwrap_or(text.len());
            &text[start..end]
        })
        .collect();
    Ok(chapters)
}

/// Split one chapter into its id, paragraphs and optional metadata text.
///
/// Metadata runs from the first `---` line to the next one; anything after a
/// second separator is ignored.
///
/// # Errors
/// Fails when the chapter has a heading but no paragraph text.
pub fn parse_chapter(text: &str) -> Result<Chapter<'_>, ScriptError> {
    let text = text.trim();
    let (script, metadata) = match SEPARATOR.find(text) {
        Some(m) => {
            let rest = &text[m.end()..];
            let end = SEPARATOR.find(rest).map_or(rest.len(), |next| next.start());
            (&text[..m.start()], Some(rest[..end].trim()))
        },
        None => (text, None),
    };

    let script = script.trim();
    let (heading, body) = script.split_once('\n').unwrap_or((script, ""));
    let id = heading.strip_prefix('#').unwrap_or(heading).trim();
    let body = body.trim();
    if body.is_empty() {
        return Err(ScriptError::Chapter {
            chapter: id.to_string(),
            message: "chapter has no paragraphs",
        });
    }

    let paragraphs = PARAGRAPH_BREAK.split(body).map(str::trim).collect();
    Ok(Chapter { id, paragraphs, metadata })
}
