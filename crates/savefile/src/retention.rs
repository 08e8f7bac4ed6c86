//! Retention policy: which save is oldest, which is newest, and when to evict.
//!
//! Selection never depends on the order the scanner returned files in, except
//! for [`TieBreak::ScanOrder`], which deliberately keeps the first of several
//! saves sharing one timestamp.

use std::cmp::Ordering;
use std::num::NonZeroUsize;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SaveError};
use crate::scanner::SaveFile;

/// How to order saves whose embedded timestamps are equal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TieBreak {
    /// Compare file names; the lexically smaller name counts as older.
    #[default]
    FileName,
    /// The first file encountered wins, for both oldest and newest.
    ScanOrder,
}

impl TieBreak {
    fn compare(self, a: &SaveFile, b: &SaveFile) -> Ordering {
        let by_time = a.timestamp().cmp(&b.timestamp());
        match self {
            TieBreak::FileName => by_time.then_with(|| a.name().cmp(b.name())),
            TieBreak::ScanOrder => by_time,
        }
    }
}

/// The save with the smallest timestamp.
pub fn oldest(files: &[SaveFile], tie_break: TieBreak) -> Option<&SaveFile> {
    files.iter().reduce(|best, candidate| {
        if tie_break.compare(candidate, best) == Ordering::Less {
            candidate
        } else {
            best
        }
    })
}

/// The save with the largest timestamp.
pub fn newest(files: &[SaveFile], tie_break: TieBreak) -> Option<&SaveFile> {
    files.iter().reduce(|best, candidate| {
        if tie_break.compare(candidate, best) == Ordering::Greater {
            candidate
        } else {
            best
        }
    })
}

/// True iff a limit is in force and `count` has reached it.
pub fn should_evict(count: usize, limit: usize) -> bool {
    limit > 0 && count >= limit
}

/// Sort saves from oldest to newest.
pub fn sort_oldest_first(files: &mut [SaveFile], tie_break: TieBreak) {
    // Stable sort keeps scan order among ties for `ScanOrder`.
    files.sort_by(|a, b| tie_break.compare(a, b));
}

/// Count-based retention settings of a manager.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RetentionPolicy {
    limit: Option<NonZeroUsize>,
    tie_break: TieBreak,
}

impl RetentionPolicy {
    /// Keep every save; nothing is evicted automatically.
    pub const fn unlimited() -> Self {
        Self {
            limit: None,
            tie_break: TieBreak::FileName,
        }
    }

    /// Keep at most `max_files` saves.
    pub fn with_limit(max_files: usize) -> Result<Self> {
        let limit =
            NonZeroUsize::new(max_files).ok_or(SaveError::InvalidRetentionLimit(max_files))?;
        Ok(Self {
            limit: Some(limit),
            tie_break: TieBreak::FileName,
        })
    }

    pub const fn with_tie_break(mut self, tie_break: TieBreak) -> Self {
        self.tie_break = tie_break;
        self
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit.map(NonZeroUsize::get)
    }

    pub fn tie_break(&self) -> TieBreak {
        self.tie_break
    }

    /// Whether `count` saves require an eviction under this policy.
    pub fn evicts(&self, count: usize) -> bool {
        should_evict(count, self.limit().unwrap_or(0))
    }
}
