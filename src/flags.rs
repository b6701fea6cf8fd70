//! Per-picture coding flags and the immutable [`FlagStore`].
//!
//! A [`PictureFlag`] describes one coded picture (not one displayed frame):
//! whether it is progressive, whether its first field is repeated, its field
//! order, and the source group/cell it came from. The store is loaded once
//! and shared read-only; transforms produce new sequences instead of editing
//! it.
//!
//! # Example
//!
//! ```no_run
//! use pulldown::{FlagStore, PulldownError};
//!
//! let store = FlagStore::open("episode.d2v")?;
//! println!("{} pictures", store.len());
//! if let Some(rate) = store.frame_rate() {
//!     println!("indexed at {rate} fps");
//! }
//! # Ok::<(), PulldownError>(())
//! ```

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::d2v::D2vIndex;
use crate::error::PulldownError;
use crate::rational::FrameRate;

/// Field display order of an interlaced picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FieldOrder {
    TopFieldFirst,
    BottomFieldFirst,
}

/// How a picture must be treated downstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Classification {
    /// A full progressive frame; never deinterlaced.
    Progressive,
    /// An interlaced field pair displayed top field first.
    InterlacedTff,
    /// An interlaced field pair displayed bottom field first.
    InterlacedBff,
}

impl Classification {
    /// Field order, or `None` for progressive pictures.
    pub fn field_order(self) -> Option<FieldOrder> {
        match self {
            Classification::Progressive => None,
            Classification::InterlacedTff => Some(FieldOrder::TopFieldFirst),
            Classification::InterlacedBff => Some(FieldOrder::BottomFieldFirst),
        }
    }

    pub fn is_progressive(self) -> bool {
        matches!(self, Classification::Progressive)
    }
}

/// Coding metadata for one picture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct PictureFlag {
    /// Position in the original, pre-normalization picture sequence.
    pub index: usize,
    /// `progressive_frame` from the picture coding extension.
    pub progressive: bool,
    /// `repeat_first_field`: the first field is displayed twice.
    pub repeat_first_field: bool,
    /// `top_field_first`.
    pub top_field_first: bool,
    /// Source group, e.g. the DVD VOB id.
    pub group_id: u32,
    /// Source cell within the group.
    pub cell_id: u32,
}

impl PictureFlag {
    /// `true` for a progressive picture whose repeat flag marks a pulldown
    /// repeat point (`progressive && rff && tff`).
    pub fn is_pulldown(&self) -> bool {
        self.progressive && self.repeat_first_field && self.top_field_first
    }

    /// `rff && tff`, regardless of progressive classification.
    pub(crate) fn is_repeat_mark(&self) -> bool {
        self.repeat_first_field && self.top_field_first
    }

    pub fn classification(&self) -> Classification {
        match (self.progressive, self.top_field_first) {
            (true, _) => Classification::Progressive,
            (false, true) => Classification::InterlacedTff,
            (false, false) => Classification::InterlacedBff,
        }
    }
}

/// One picture as written in a JSON picture list.
///
/// The short names used by DGIndex tooling (`progressive_frame`, `rff`,
/// `tff`, `vob`, `cell`) are accepted as aliases.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FlagRecord {
    #[serde(alias = "progressive_frame")]
    pub progressive: bool,
    #[serde(alias = "rff")]
    pub repeat_first_field: bool,
    #[serde(alias = "tff")]
    pub top_field_first: bool,
    #[serde(default, alias = "vob")]
    pub group_id: u32,
    #[serde(default, alias = "cell")]
    pub cell_id: u32,
}

impl FlagRecord {
    fn at(self, index: usize) -> PictureFlag {
        PictureFlag {
            index,
            progressive: self.progressive,
            repeat_first_field: self.repeat_first_field,
            top_field_first: self.top_field_first,
            group_id: self.group_id,
            cell_id: self.cell_id,
        }
    }
}

/// The ordered, immutable picture flags of one indexed source.
///
/// Cloning is cheap: the flags live behind an [`Arc`] so previously published
/// results stay valid while new passes read the same store.
#[derive(Debug, Clone)]
pub struct FlagStore {
    flags: Arc<[PictureFlag]>,
    frame_rate: Option<FrameRate>,
}

impl FlagStore {
    /// Build a store from records in decode order, numbering them `0..n`.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::EmptySequence`] if no records are given.
    pub fn from_records<I>(records: I) -> Result<Self, PulldownError>
    where
        I: IntoIterator<Item = FlagRecord>,
    {
        let flags: Vec<PictureFlag> = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| record.at(index))
            .collect();
        if flags.is_empty() {
            return Err(PulldownError::EmptySequence);
        }
        Ok(Self {
            flags: flags.into(),
            frame_rate: None,
        })
    }

    /// Build a store from a parsed D2V index.
    ///
    /// Each data line contributes one picture per flag byte; its `vob` and
    /// `cell` become the picture's group and cell. The index's `Frame_Rate`
    /// setting, when present, becomes the store's frame rate.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::EmptySequence`] if the index holds no
    /// pictures.
    pub fn from_d2v(index: &D2vIndex) -> Result<Self, PulldownError> {
        let records = index.entries.iter().flat_map(|entry| {
            entry.flags.iter().map(move |&byte| FlagRecord {
                progressive: byte & 0b0100_0000 != 0,
                repeat_first_field: byte & 0b0000_0001 != 0,
                top_field_first: byte & 0b0000_0010 != 0,
                group_id: entry.vob,
                cell_id: entry.cell,
            })
        });
        let store = Self::from_records(records)?;
        let frame_rate = index.settings.frame_rate()?;
        Ok(store.with_frame_rate_option(frame_rate))
    }

    /// Parse a DGIndex project file from a reader.
    ///
    /// # Errors
    ///
    /// Propagates [`D2vIndex::parse`] errors and
    /// [`PulldownError::EmptySequence`].
    pub fn load<R: Read>(reader: R) -> Result<Self, PulldownError> {
        let index = D2vIndex::parse(BufReader::new(reader))?;
        Self::from_d2v(&index)
    }

    /// Parse a JSON array of [`FlagRecord`]s.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::JsonError`] for invalid JSON and
    /// [`PulldownError::EmptySequence`] for an empty array.
    pub fn from_json(json: &str) -> Result<Self, PulldownError> {
        let records: Vec<FlagRecord> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    /// Load an index from disk.
    ///
    /// Files ending in `.json` are read as picture lists; everything else is
    /// parsed as a D2V project file.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::IoError`] if the file cannot be read, or any
    /// parse error from the chosen format.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, PulldownError> {
        let path = path.as_ref();
        log::debug!("Loading picture index: {}", path.display());
        let is_json = path
            .extension()
            .is_some_and(|extension| extension.eq_ignore_ascii_case("json"));
        let store = if is_json {
            Self::from_json(&std::fs::read_to_string(path)?)?
        } else {
            Self::load(File::open(path)?)?
        };
        log::debug!("Loaded {} pictures from {}", store.len(), path.display());
        Ok(store)
    }

    /// Attach the nominal source frame rate.
    #[must_use]
    pub fn with_frame_rate(self, frame_rate: FrameRate) -> Self {
        self.with_frame_rate_option(Some(frame_rate))
    }

    fn with_frame_rate_option(mut self, frame_rate: Option<FrameRate>) -> Self {
        self.frame_rate = frame_rate;
        self
    }

    pub fn flags(&self) -> &[PictureFlag] {
        &self.flags
    }

    /// A shared handle to the flags, for building derived sequences.
    pub fn shared(&self) -> Arc<[PictureFlag]> {
        Arc::clone(&self.flags)
    }

    pub fn frame_rate(&self) -> Option<FrameRate> {
        self.frame_rate
    }

    /// Number of pictures. Never zero.
    pub fn len(&self) -> usize {
        self.flags.len()
    }

    /// Always `false`; an empty store cannot be constructed.
    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }
}
