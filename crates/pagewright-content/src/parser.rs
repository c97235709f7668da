//! Content file parser.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::scan::{scan_dir, ScanError};

/// A recognized attribute key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttributeKey {
    Title,
    Date,
    Category,
}

impl AttributeKey {
    /// Every key the parser recognizes.
    pub const ALL: [AttributeKey; 3] = [Self::Title, Self::Date, Self::Category];

    /// Match a trimmed, lowercased key.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "title" => Some(Self::Title),
            "date" => Some(Self::Date),
            "category" => Some(Self::Category),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Title => "title",
            Self::Date => "date",
            Self::Category => "category",
        }
    }
}

impl fmt::Display for AttributeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How a single line of a content file is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind<'a> {
    /// `key: value` with a recognized key. The value is trimmed.
    Attribute { key: AttributeKey, value: &'a str },
    /// A blank line or a lone token without spaces. Dropped.
    Separator,
    /// Free text, appended to the body verbatim.
    Body,
}

/// Classify one line of a content file.
///
/// Only the first colon is significant. The text before it, trimmed and
/// lowercased, is matched against [`AttributeKey::ALL`]. A line whose leading
/// token contains no space is a separator, which covers blank lines.
pub fn classify_line(line: &str) -> LineKind<'_> {
    let trimmed = line.trim();

    let (head, value) = match trimmed.split_once(':') {
        Some((head, value)) => (head.trim(), Some(value)),
        None => (trimmed, None),
    };

    if let Some(value) = value {
        if let Some(key) = AttributeKey::from_key(&head.to_lowercase()) {
            return LineKind::Attribute {
                key,
                value: value.trim(),
            };
        }
    }

    if head.contains(' ') {
        LineKind::Body
    } else {
        LineKind::Separator
    }
}

/// Attributes and body text extracted from one content file.
///
/// Attributes that never appeared are `None`; nothing is defaulted here.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub date: Option<String>,
    pub category: Option<String>,
    /// Body lines in original order, line terminators intact.
    pub content: String,
}

impl RawRecord {
    /// Look up an attribute by key.
    pub fn get(&self, key: AttributeKey) -> Option<&str> {
        match key {
            AttributeKey::Title => self.title.as_deref(),
            AttributeKey::Date => self.date.as_deref(),
            AttributeKey::Category => self.category.as_deref(),
        }
    }

    fn set(&mut self, key: AttributeKey, value: &str) {
        let slot = match key {
            AttributeKey::Title => &mut self.title,
            AttributeKey::Date => &mut self.date,
            AttributeKey::Category => &mut self.category,
        };
        *slot = Some(value.to_string());
    }

    /// Keys that were not present in the source file.
    pub fn missing(&self) -> Vec<AttributeKey> {
        AttributeKey::ALL
            .into_iter()
            .filter(|key| self.get(*key).is_none())
            .collect()
    }
}

/// A parsed file together with where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentFile {
    pub path: PathBuf,
    pub record: RawRecord,
}

/// Split text into lines ending in `\r\n`, `\n` or a lone `\r`.
///
/// Terminators stay attached to their line.
fn split_lines(source: &str) -> impl Iterator<Item = &str> {
    let mut rest = source;

    std::iter::from_fn(move || {
        if rest.is_empty() {
            return None;
        }
        let end = match rest.find(['\n', '\r']) {
            Some(i) if rest[i..].starts_with("\r\n") => i + 2,
            Some(i) => i + 1,
            None => rest.len(),
        };
        let (line, tail) = rest.split_at(end);
        rest = tail;
        Some(line)
    })
}

/// Parse the text of one content file.
///
/// Lines may end in `\n`, `\r\n` or a bare `\r`. A repeated attribute keeps
/// its last value.
pub fn parse_content(source: &str) -> RawRecord {
    let mut record = RawRecord::default();

    for line in split_lines(source) {
        match classify_line(line) {
            LineKind::Attribute { key, value } => record.set(key, value),
            LineKind::Separator => {}
            LineKind::Body => record.content.push_str(line),
        }
    }

    record
}

/// Read and parse a single content file.
///
/// Invalid UTF-8 is replaced rather than rejected.
pub fn parse_file(path: &Path) -> io::Result<RawRecord> {
    let bytes = fs::read(path)?;
    Ok(parse_content(&String::from_utf8_lossy(&bytes)))
}

/// Parse every file directly inside `dir`.
///
/// Files that cannot be read are logged and skipped. Directory-level
/// failures are returned to the caller, which decides whether to degrade.
pub fn parse_dir(dir: &Path) -> Result<Vec<ContentFile>, ScanError> {
    let paths = scan_dir(dir)?;
    let mut files = Vec::with_capacity(paths.len());

    for path in paths {
        match parse_file(&path) {
            Ok(record) => {
                tracing::debug!("Parsed {}", path.display());
                files.push(ContentFile { path, record });
            }
            Err(e) => {
                tracing::warn!("Skipping unreadable content file {}: {}", path.display(), e);
            }
        }
    }

    Ok(files)
}
