//! Localization files.
//!
//! Messages live in INI files: `key = value` lines, optional `[section]`
//! headers, `;` or `#` comments. The widget needs a fixed set of
//! notification keys to be present in every language file.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};

/// The language file bundled with the binary.
pub const BUNDLED_EN_US: &str = include_str!("../lang/en-US.ini");

/// Notification messages the MyToDos widget shows.
pub const REQUIRED_NOTIFICATION_KEYS: [&str; 14] = [
    "notifications.group_changes_applied",
    "notifications.group_changes_partial",
    "notifications.group_changes_failed",
    "notifications.sorting_error",
    "notifications.title_updated",
    "notifications.title_update_error",
    "notifications.date_updated",
    "notifications.date_update_error",
    "notifications.milestone_updated",
    "notifications.milestone_update_error",
    "notifications.status_updated",
    "notifications.status_update_error",
    "notifications.subtask_saved",
    "notifications.subtask_save_error",
];

/// Parsed INI document. Keys inside a section are stored as `section.key`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IniDocument {
    entries: BTreeMap<String, String>,
}

impl IniDocument {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Parse INI text. Syntax errors report the 1-based line number.
pub fn parse_ini(text: &str) -> Result<IniDocument> {
    let mut doc = IniDocument::default();
    let mut section: Option<String> = None;

    for (idx, raw) in text.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.trim();
        if line.is_empty() || line.starts_with(';') || line.starts_with('#') {
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            let name = rest.strip_suffix(']').ok_or_else(|| Error::IniSyntax {
                line: line_no,
                message: "unterminated section header".into(),
            })?;
            let name = name.trim();
            if name.is_empty() {
                return Err(Error::IniSyntax { line: line_no, message: "empty section name".into() });
            }
            section = Some(name.to_string());
            continue;
        }

        let (key, value) = line.split_once('=').ok_or_else(|| Error::IniSyntax {
            line: line_no,
            message: "expected 'key = value'".into(),
        })?;
        let key = key.trim();
        if key.is_empty() {
            return Err(Error::IniSyntax { line: line_no, message: "missing key".into() });
        }
        let value = parse_value(value.trim()).map_err(|message| Error::IniSyntax { line: line_no, message })?;

        let full_key = match &section {
            Some(s) => format!("{s}.{key}"),
            None => key.to_string(),
        };
        doc.entries.insert(full_key, value);
    }

    Ok(doc)
}

/// Strip optional double quotes; a `""` inside quotes is a literal quote.
fn parse_value(value: &str) -> std::result::Result<String, String> {
    let Some(inner) = value.strip_prefix('"') else {
        // Unquoted values end at the first inline comment.
        let end = value.find(';').unwrap_or(value.len());
        return Ok(value[..end].trim_end().to_string());
    };
    let mut out = String::new();
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        if ch == '"' {
            if chars.peek() == Some(&'"') {
                out.push('"');
                chars.next();
                continue;
            }
            let trailing: String = chars.collect();
            let trailing = trailing.trim();
            if trailing.is_empty() || trailing.starts_with(';') {
                return Ok(out);
            }
            return Err(format!("unexpected text after closing quote: {trailing}"));
        }
        out.push(ch);
    }
    Err("unterminated quoted value".into())
}

/// Required keys that do not occur in `content`.
pub fn missing_notification_keys(content: &str) -> Vec<String> {
    REQUIRED_NOTIFICATION_KEYS
        .iter()
        .filter(|key| !content.contains(*key))
        .map(|key| key.to_string())
        .collect()
}

/// Validate a language file's text: parseable, non-empty, and carrying every notification key.
pub fn check_language_text(content: &str, origin: &Path) -> Result<IniDocument> {
    let doc = parse_ini(content)?;
    if doc.is_empty() {
        return Err(Error::EmptyLanguageFile(origin.to_path_buf()));
    }
    let missing = missing_notification_keys(content);
    if !missing.is_empty() {
        return Err(Error::MissingMessages(missing));
    }
    debug!(path = %origin.display(), entries = doc.len(), "language file ok");
    Ok(doc)
}

/// Read and validate a language file.
pub fn check_language_file(path: &Path) -> Result<IniDocument> {
    let content = fs::read_to_string(path)?;
    check_language_text(&content, path)
}

/// Message lookup over a parsed language file.
#[derive(Debug, Clone)]
pub struct Messages {
    doc: IniDocument,
}

impl Messages {
    /// Messages from the bundled en-US file.
    pub fn bundled() -> Result<Self> {
        Ok(Self { doc: parse_ini(BUNDLED_EN_US)? })
    }

    /// Load and validate messages from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        Ok(Self { doc: check_language_file(path)? })
    }

    /// The message for `key`, or the key itself when it is not translated.
    pub fn lookup<'a>(&'a self, key: &'a str) -> &'a str {
        self.doc.get(key).unwrap_or(key)
    }
}
