//! Card detector
//!
//! A course card is an image named `card.<ext>` directly in the course root.

use std::path::Path;

use crate::walker::ScannedFile;

/// Base name a card image must have, compared case-insensitively
const CARD_STEM: &str = "card";

/// Whether `file` qualifies as a course card for the given extension allow-list.
///
/// `extensions` are expected lower-case and without a leading dot.
pub fn is_card(file: &ScannedFile, extensions: &[String]) -> bool {
    if !file.is_root_level() {
        return false;
    }

    let name = Path::new(&file.file_name);
    let (Some(stem), Some(ext)) = (
        name.file_stem().and_then(|s| s.to_str()),
        name.extension().and_then(|e| e.to_str()),
    ) else {
        return false;
    };

    stem.eq_ignore_ascii_case(CARD_STEM)
        && extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
}

/// Pick the course card: the first qualifying root-level file in walk order.
///
/// Walk order is lexicographic by file name, so with both `card.jpg` and
/// `card.png` present the result is always `card.jpg`.
pub fn detect_card<'a>(files: &'a [ScannedFile], extensions: &[String]) -> Option<&'a ScannedFile> {
    files.iter().find(|file| is_card(file, extensions))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn file(chapter: &str, name: &str) -> ScannedFile {
        let path = if chapter.is_empty() {
            PathBuf::from("/c").join(name)
        } else {
            PathBuf::from("/c").join(chapter).join(name)
        };
        ScannedFile {
            path,
            file_name: name.to_string(),
            chapter: chapter.to_string(),
        }
    }

    fn allow() -> Vec<String> {
        vec!["jpg".to_string(), "png".to_string()]
    }

    #[test]
    fn test_card_must_be_root_level() {
        assert!(is_card(&file("", "card.png"), &allow()));
        assert!(!is_card(&file("01 Intro", "card.jpg"), &allow()));
    }

    #[test]
    fn test_card_name_and_extension_rules() {
        assert!(is_card(&file("", "Card.JPG"), &allow()));
        assert!(!is_card(&file("", "card.gif"), &allow()));
        assert!(!is_card(&file("", "cards.png"), &allow()));
        assert!(!is_card(&file("", "card"), &allow()));
        assert!(!is_card(&file("", "01 card.png"), &allow()));
    }

    #[test]
    fn test_detect_card_picks_first_in_walk_order() {
        let files = vec![
            file("", "01 intro.mp4"),
            file("", "card.jpg"),
            file("", "card.png"),
            file("ch", "card.jpg"),
        ];

        let card = detect_card(&files, &allow()).unwrap();
        assert_eq!(card.file_name, "card.jpg");
        assert!(card.is_root_level());
    }

    #[test]
    fn test_detect_card_none() {
        let files = vec![file("", "01 intro.mp4"), file("ch", "card.png")];
        assert!(detect_card(&files, &allow()).is_none());
    }
}
