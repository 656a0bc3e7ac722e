//! # Priority Resolver
//!
//! Groups classified files by their (chapter, prefix) slot and elects one
//! asset per slot.
//!
//! ## Rules
//!
//! - A slot with no asset candidate has no owner; its attachments are dropped.
//! - A slot with candidates keeps the highest-ranked one (Video > HTML > PDF).
//!   Candidates of the same type are ordered by path, smallest first.
//! - Every losing candidate is demoted to an attachment of the winner, titled
//!   with its full file name.
//!
//! The result depends only on the set of files, never on discovery order.

use core_library::{Asset, AssetType};
use std::collections::BTreeMap;

use crate::classifier::{parse_file_name, ParsedName};
use crate::walker::ScannedFile;

/// Grouping key shared by an asset and its attachments
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SlotKey {
    pub chapter: String,
    pub prefix: i64,
}

impl SlotKey {
    pub fn new(chapter: impl Into<String>, prefix: i64) -> Self {
        Self {
            chapter: chapter.into(),
            prefix,
        }
    }
}

/// An attachment whose owning asset is identified by slot until asset
/// identities are known
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SlottedAttachment {
    pub slot: SlotKey,
    pub title: String,
    pub path: String,
}

/// Output of [`resolve`]
#[derive(Debug, Clone, Default)]
pub struct Resolution {
    /// One asset per occupied slot, ordered by slot
    pub assets: Vec<Asset>,
    /// Attachments of those assets, ordered by slot then path
    pub attachments: Vec<SlottedAttachment>,
    /// Attachments discarded because their slot had no asset
    pub orphans_dropped: usize,
    /// Files whose names did not follow the grammar
    pub ignored: usize,
}

struct Candidate {
    title: String,
    kind: AssetType,
    path: String,
    file_name: String,
}

#[derive(Default)]
struct Slot {
    candidates: Vec<Candidate>,
    attachments: Vec<(String, String)>,
}

/// Classify `files` and elect the asset of every slot.
///
/// Assets are created for `course_id` with both timestamps set to `now`.
pub fn resolve(course_id: &str, files: &[ScannedFile], now: i64) -> Resolution {
    let mut slots: BTreeMap<SlotKey, Slot> = BTreeMap::new();
    let mut ignored = 0;

    for file in files {
        match parse_file_name(&file.file_name) {
            ParsedName::NoMatch => ignored += 1,
            ParsedName::Attachment { prefix, title } => {
                slots
                    .entry(SlotKey::new(file.chapter.as_str(), prefix))
                    .or_default()
                    .attachments
                    .push((title, file.path_string()));
            }
            ParsedName::AssetCandidate {
                prefix,
                title,
                kind,
            } => {
                slots
                    .entry(SlotKey::new(file.chapter.as_str(), prefix))
                    .or_default()
                    .candidates
                    .push(Candidate {
                        title,
                        kind,
                        path: file.path_string(),
                        file_name: file.file_name.clone(),
                    });
            }
        }
    }

    let mut resolution = Resolution {
        ignored,
        ..Default::default()
    };

    for (key, mut slot) in slots {
        if slot.candidates.is_empty() {
            resolution.orphans_dropped += slot.attachments.len();
            continue;
        }

        slot.candidates.sort_by(|a, b| {
            b.kind
                .rank()
                .cmp(&a.kind.rank())
                .then_with(|| a.path.cmp(&b.path))
        });

        let mut candidates = slot.candidates.into_iter();
        let Some(winner) = candidates.next() else {
            continue;
        };

        resolution.assets.push(Asset::new(
            course_id.to_string(),
            winner.title,
            key.prefix,
            key.chapter.clone(),
            winner.kind,
            winner.path,
            now,
        ));

        let demoted = candidates.map(|loser| (loser.file_name, loser.path));
        let mut attachments: Vec<SlottedAttachment> = slot
            .attachments
            .into_iter()
            .chain(demoted)
            .map(|(title, path)| SlottedAttachment {
                slot: key.clone(),
                title,
                path,
            })
            .collect();
        attachments.sort_by(|a, b| a.path.cmp(&b.path));
        resolution.attachments.extend(attachments);
    }

    resolution
}
