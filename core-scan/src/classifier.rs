//! # Filename Classifier
//!
//! Parses a bare file name into an ordering prefix, an optional title and an
//! optional extension, then decides whether the file competes for an asset
//! slot or is an attachment.
//!
//! ## Grammar
//!
//! ```text
//! [whitespace] <prefix: digits> ( <separator> [title] )* [ "." <ext> ]
//! separator := spaces and/or dashes, e.g. " ", " - ", "-", " --"
//! ```
//!
//! Names without a leading number do not match and are ignored by the scanner.
//!
//! ## Classification
//!
//! | Parse result                        | Outcome                              |
//! |-------------------------------------|--------------------------------------|
//! | no title                            | attachment titled with the file name |
//! | title, no extension                 | attachment titled with the title     |
//! | title + video/html/pdf extension    | asset candidate                      |
//! | title + any other extension         | attachment titled `title.ext`        |

use core_library::AssetType;
use once_cell::sync::Lazy;
use regex::Regex;

static FILENAME_GRAMMAR: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^\s*(?P<prefix>[0-9]+)((?:\s+-+\s+|\s+-+|\s+|-+\s*)(?P<title>[^.][^.]*)?)*(?:\.(?P<ext>\w+))?$",
    )
    .expect("filename grammar is a valid regex")
});

const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "m4v", "mkv", "webm", "mov", "avi", "wmv", "flv", "mpg", "mpeg", "ogv", "ts",
];

const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// What a file extension means to the scanner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    Video,
    Html,
    Pdf,
    Unsupported,
}

impl FileKind {
    /// Asset type for this kind, `None` for unsupported extensions
    pub fn asset_type(&self) -> Option<AssetType> {
        match self {
            Self::Video => Some(AssetType::Video),
            Self::Html => Some(AssetType::Html),
            Self::Pdf => Some(AssetType::Pdf),
            Self::Unsupported => None,
        }
    }
}

/// Map a file extension (without the dot) to a [`FileKind`], case-insensitively.
pub fn classify_extension(ext: &str) -> FileKind {
    let ext = ext.to_ascii_lowercase();
    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Video
    } else if HTML_EXTENSIONS.contains(&ext.as_str()) {
        FileKind::Html
    } else if ext == "pdf" {
        FileKind::Pdf
    } else {
        FileKind::Unsupported
    }
}

/// Outcome of parsing one file name
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParsedName {
    /// The name does not follow the grammar; the file is ignored
    NoMatch,
    /// A supporting file for the asset in the same (chapter, prefix) slot
    Attachment { prefix: i64, title: String },
    /// A file competing to become the asset of its slot
    AssetCandidate {
        prefix: i64,
        title: String,
        kind: AssetType,
    },
}

impl ParsedName {
    pub fn prefix(&self) -> Option<i64> {
        match self {
            Self::NoMatch => None,
            Self::Attachment { prefix, .. } | Self::AssetCandidate { prefix, .. } => Some(*prefix),
        }
    }
}

/// Parse a bare file name (no directory components).
pub fn parse_file_name(file_name: &str) -> ParsedName {
    let Some(caps) = FILENAME_GRAMMAR.captures(file_name) else {
        return ParsedName::NoMatch;
    };

    // Prefixes too large for i64 cannot be ordered; treat them as unparseable.
    let Some(prefix) = caps
        .name("prefix")
        .and_then(|m| m.as_str().parse::<i64>().ok())
    else {
        return ParsedName::NoMatch;
    };

    let title = caps
        .name("title")
        .map(|m| m.as_str().trim())
        .filter(|t| !t.is_empty());
    let ext = caps.name("ext").map(|m| m.as_str());

    match (title, ext) {
        (None, _) => ParsedName::Attachment {
            prefix,
            title: file_name.to_string(),
        },
        (Some(title), None) => ParsedName::Attachment {
            prefix,
            title: title.to_string(),
        },
        (Some(title), Some(ext)) => match classify_extension(ext).asset_type() {
            Some(kind) => ParsedName::AssetCandidate {
                prefix,
                title: title.to_string(),
                kind,
            },
            None => ParsedName::Attachment {
                prefix,
                title: format!("{}.{}", title, ext),
            },
        },
    }
}
