//! Domain models for the course library
//!
//! This module contains the persisted entities with validation and database mapping.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use crate::error::LibraryError;

// =============================================================================
// Asset Types
// =============================================================================

/// Kind of a playable or viewable asset.
///
/// When several candidates compete for the same (chapter, prefix) slot the one
/// with the highest [`rank`](AssetType::rank) becomes the asset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssetType {
    Video,
    Html,
    Pdf,
}

impl AssetType {
    /// Priority used for slot conflict resolution: Video > HTML > PDF.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Video => 3,
            Self::Html => 2,
            Self::Pdf => 1,
        }
    }

    /// Database string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Html => "html",
            Self::Pdf => "pdf",
        }
    }
}

impl fmt::Display for AssetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AssetType {
    type Err = LibraryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "html" => Ok(Self::Html),
            "pdf" => Ok(Self::Pdf),
            _ => Err(LibraryError::InvalidInput {
                field: "type".to_string(),
                message: format!("Unknown asset type: {}", s),
            }),
        }
    }
}

// =============================================================================
// Domain Models
// =============================================================================

/// A course: a directory tree on disk tracked by its root path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    /// Unique identifier
    pub id: String,
    /// Display title
    pub title: String,
    /// Absolute root directory of the course
    pub path: String,
    /// Cover image found at the course root, if any
    pub card_path: Option<String>,
    /// Whether the root path existed the last time it was probed
    pub available: bool,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Course {
    /// Create a new course rooted at `path`, stamped at `now`
    pub fn new(title: String, path: String, now: i64) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title,
            path,
            card_path: None,
            available: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate course data
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() {
            return Err("Course title cannot be empty".to_string());
        }

        if self.path.trim().is_empty() {
            return Err("Course path cannot be empty".to_string());
        }

        if matches!(&self.card_path, Some(card) if card.trim().is_empty()) {
            return Err("Card path must be None rather than empty".to_string());
        }

        Ok(())
    }
}

/// The primary file chosen for a (chapter, prefix) slot of a course
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    /// Unique identifier, stable across rescans while `path` is unchanged
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Title parsed from the file name
    pub title: String,
    /// Leading number of the file name, the ordering key within a chapter
    pub prefix: i64,
    /// Immediate subdirectory the file lives in; empty for root-level files
    pub chapter: String,
    /// Asset kind
    pub asset_type: AssetType,
    /// Full file path, globally unique
    pub path: String,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Asset {
    /// Create a new asset with a fresh identifier
    pub fn new(
        course_id: String,
        title: String,
        prefix: i64,
        chapter: String,
        asset_type: AssetType,
        path: String,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            course_id,
            title,
            prefix,
            chapter,
            asset_type,
            path,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate asset data
    pub fn validate(&self) -> Result<(), String> {
        if self.course_id.is_empty() {
            return Err("Asset must belong to a course".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Asset title cannot be empty".to_string());
        }

        if self.path.is_empty() {
            return Err("Asset path cannot be empty".to_string());
        }

        if self.prefix < 0 {
            return Err(format!("Asset prefix must not be negative: {}", self.prefix));
        }

        Ok(())
    }
}

/// A supporting file owned by exactly one asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Unique identifier, stable across rescans while `path` is unchanged
    pub id: String,
    /// Owning course
    pub course_id: String,
    /// Owning asset
    pub asset_id: String,
    /// Display title
    pub title: String,
    /// Full file path, globally unique
    pub path: String,
    /// Timestamps
    pub created_at: i64,
    pub updated_at: i64,
}

impl Attachment {
    /// Create a new attachment with a fresh identifier
    pub fn new(
        course_id: String,
        asset_id: String,
        title: String,
        path: String,
        now: i64,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            course_id,
            asset_id,
            title,
            path,
            created_at: now,
            updated_at: now,
        }
    }

    /// Validate attachment data
    pub fn validate(&self) -> Result<(), String> {
        if self.course_id.is_empty() || self.asset_id.is_empty() {
            return Err("Attachment must belong to a course and an asset".to_string());
        }

        if self.title.trim().is_empty() {
            return Err("Attachment title cannot be empty".to_string());
        }

        if self.path.is_empty() {
            return Err("Attachment path cannot be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_type_rank_orders_video_html_pdf() {
        assert!(AssetType::Video.rank() > AssetType::Html.rank());
        assert!(AssetType::Html.rank() > AssetType::Pdf.rank());
    }

    #[test]
    fn test_asset_type_string_conversion() {
        assert_eq!(AssetType::Html.as_str(), "html");
        assert_eq!("video".parse::<AssetType>().unwrap(), AssetType::Video);
        assert!(matches!(
            "mp3".parse::<AssetType>(),
            Err(LibraryError::InvalidInput { .. })
        ));
    }

    #[test]
    fn test_course_validation() {
        let course = Course::new(
            "Rust 101".to_string(),
            "/courses/rust".to_string(),
            1_700_000_000,
        );
        assert!(course.validate().is_ok());
        assert!(!course.available);
        assert_eq!((course.created_at, course.updated_at), (1_700_000_000, 1_700_000_000));
        assert_eq!(course.card_path, None);

        let mut bad = course.clone();
        bad.path = "  ".to_string();
        assert!(bad.validate().is_err());

        let mut empty_card = course;
        empty_card.card_path = Some(String::new());
        assert!(empty_card.validate().is_err());
    }

    #[test]
    fn test_asset_validation() {
        let asset = Asset::new(
            "c-1".to_string(),
            "intro".to_string(),
            1,
            String::new(),
            AssetType::Video,
            "/courses/rust/01 intro.mp4".to_string(),
            1_700_000_000,
        );
        assert!(asset.validate().is_ok());

        let mut negative = asset.clone();
        negative.prefix = -1;
        assert!(negative.validate().is_err());
    }

    #[test]
    fn test_attachment_validation() {
        let attachment = Attachment::new(
            "c-1".to_string(),
            "a-1".to_string(),
            "slides.pdf".to_string(),
            "/courses/rust/01 slides.pdf".to_string(),
            1_700_000_000,
        );
        assert!(attachment.validate().is_ok());

        let mut orphan = attachment;
        orphan.asset_id = String::new();
        assert!(orphan.validate().is_err());
    }
}
