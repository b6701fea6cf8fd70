//! DGIndex project file (`.d2v`) parsing.
//!
//! A D2V file is the index DGIndex writes for an MPEG-1/2 elementary stream.
//! Only the parts needed to recover per-picture flags are interpreted:
//!
//! ```text
//! DGIndexProjectFile16
//! 1
//! C:\rips\VTS_01_1.VOB
//!
//! Stream_Type=1
//! Frame_Rate=29970 (30000/1001)
//! Aspect_Ratio=4:3
//!
//! 7 1 0 2048 0 1 0 d2 d0 d3 d1 d2 d0 d3 d1 d2 d0 d3 d1
//! 7 1 0 86016 0 1 0 d2 d0 d3 d1 ff
//!
//! FINISHED  100.00% FILM
//! ```
//!
//! Each data line is `info matrix file position skip vob cell flag...`.
//! Every flag byte is one coded picture; the token `ff` marks the end of the
//! stream and is not a picture.

use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::PathBuf;

use crate::error::PulldownError;
use crate::rational::FrameRate;

const HEADER_MAGIC: &str = "DGIndexProjectFile";
const SUPPORTED_VERSION: &str = "16";
const END_OF_STREAM: &str = "ff";

/// `Key=Value` settings from the second section of a D2V file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct D2vSettings {
    values: BTreeMap<String, String>,
}

impl D2vSettings {
    /// Raw value of a setting.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    /// The indexed stream's nominal frame rate.
    ///
    /// DGIndex writes `Frame_Rate=29970 (30000/1001)`; the parenthesised
    /// fraction is preferred, falling back to the leading value in
    /// thousandths of a frame per second.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::InvalidFrameRate`] if the setting is present
    /// but unreadable.
    pub fn frame_rate(&self) -> Result<Option<FrameRate>, PulldownError> {
        let Some(value) = self.get("Frame_Rate") else {
            return Ok(None);
        };
        if let Some(fraction) = value
            .split_once('(')
            .and_then(|(_, rest)| rest.split_once(')'))
            .map(|(fraction, _)| fraction)
        {
            return fraction.parse().map(Some);
        }
        let millis = value
            .split_whitespace()
            .next()
            .and_then(|token| token.parse::<u64>().ok())
            .ok_or_else(|| PulldownError::InvalidFrameRate(value.to_string()))?;
        FrameRate::new(millis, 1000).map(Some)
    }

    /// Display aspect ratio, e.g. `"4:3"`. Only the first value is returned
    /// when DGIndex lists several.
    pub fn aspect_ratio(&self) -> Option<&str> {
        self.get("Aspect_Ratio")
            .and_then(|value| value.split(',').next())
            .map(str::trim)
    }
}

/// One data line of a D2V file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct D2vEntry {
    /// GOP info bits (hex in the file).
    pub info: u32,
    pub matrix: u32,
    /// Index into [`D2vIndex::files`].
    pub file: usize,
    /// Byte position of the GOP in the source file.
    pub position: u64,
    pub skip: u32,
    /// VOB id the GOP belongs to.
    pub vob: u32,
    /// Cell id the GOP belongs to.
    pub cell: u32,
    /// One flag byte per coded picture.
    pub flags: Vec<u8>,
}

/// A parsed DGIndex project file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct D2vIndex {
    /// Source files referenced by the index, in order.
    pub files: Vec<PathBuf>,
    pub settings: D2vSettings,
    pub entries: Vec<D2vEntry>,
}

impl D2vIndex {
    /// Parse a D2V file.
    ///
    /// # Errors
    ///
    /// Returns [`PulldownError::UnsupportedIndexVersion`] for project files
    /// other than version 16, and [`PulldownError::MalformedIndex`] with the
    /// offending line number for any structural problem.
    pub fn parse<R: BufRead>(reader: R) -> Result<Self, PulldownError> {
        let mut lines = Lines::new(reader);

        let header = lines
            .next_line()?
            .ok_or_else(|| PulldownError::malformed(1, "missing DGIndexProjectFile header"))?;
        let version = header
            .trim()
            .strip_prefix(HEADER_MAGIC)
            .ok_or_else(|| PulldownError::malformed(1, "missing DGIndexProjectFile header"))?;
        if version != SUPPORTED_VERSION {
            return Err(PulldownError::UnsupportedIndexVersion(version.to_string()));
        }

        let count_line = lines
            .next_line()?
            .ok_or_else(|| lines.malformed("missing source file count"))?;
        let file_count: usize = count_line
            .trim()
            .parse()
            .map_err(|_| lines.malformed(format!("invalid file count {:?}", count_line.trim())))?;

        let mut files = Vec::with_capacity(file_count);
        for _ in 0..file_count {
            let path = lines
                .next_line()?
                .ok_or_else(|| lines.malformed("source file list is truncated"))?;
            files.push(PathBuf::from(path.trim()));
        }

        match lines.next_line()? {
            Some(line) if line.trim().is_empty() => {}
            Some(_) => return Err(lines.malformed("expected a blank line after the file list")),
            None => return Err(lines.malformed("missing settings section")),
        }

        let mut settings = D2vSettings::default();
        while let Some(line) = lines.next_line()? {
            let line = line.trim();
            if line.is_empty() {
                break;
            }
            let (key, value) = line
                .split_once('=')
                .ok_or_else(|| lines.malformed(format!("expected Key=Value, found {line:?}")))?;
            settings
                .values
                .insert(key.trim().to_string(), value.trim().to_string());
        }

        let mut entries = Vec::new();
        while let Some(line) = lines.next_line()? {
            let line = line.trim();
            if line.is_empty() || line.starts_with("FINISHED") {
                break;
            }
            entries.push(parse_entry(line, &lines, files.len())?);
        }

        log::debug!(
            "Parsed D2V index: {} file(s), {} settings, {} data lines",
            files.len(),
            settings.values.len(),
            entries.len()
        );

        Ok(Self {
            files,
            settings,
            entries,
        })
    }

    /// Total number of coded pictures across all data lines.
    pub fn picture_count(&self) -> usize {
        self.entries.iter().map(|entry| entry.flags.len()).sum()
    }
}

fn parse_entry<R: BufRead>(
    line: &str,
    lines: &Lines<R>,
    file_count: usize,
) -> Result<D2vEntry, PulldownError> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 7 {
        return Err(lines.malformed(format!(
            "data line has {} fields, expected at least 7",
            tokens.len()
        )));
    }

    let decimal = |position: usize, name: &str| -> Result<u64, PulldownError> {
        tokens[position]
            .parse::<u64>()
            .map_err(|_| lines.malformed(format!("invalid {name} {:?}", tokens[position])))
    };
    let narrow = |value: u64, name: &str| -> Result<u32, PulldownError> {
        u32::try_from(value).map_err(|_| lines.malformed(format!("{name} {value} is too large")))
    };

    let info = u32::from_str_radix(tokens[0], 16)
        .map_err(|_| lines.malformed(format!("invalid info field {:?}", tokens[0])))?;
    let file = decimal(2, "file")? as usize;
    if file_count > 0 && file >= file_count {
        return Err(lines.malformed(format!(
            "file {file} is out of range ({file_count} source files)"
        )));
    }

    let mut flags = Vec::with_capacity(tokens.len() - 7);
    for token in &tokens[7..] {
        if token.eq_ignore_ascii_case(END_OF_STREAM) {
            continue;
        }
        let byte = u8::from_str_radix(token, 16)
            .map_err(|_| lines.malformed(format!("invalid flag byte {token:?}")))?;
        flags.push(byte);
    }

    Ok(D2vEntry {
        info,
        matrix: narrow(decimal(1, "matrix")?, "matrix")?,
        file,
        position: decimal(3, "position")?,
        skip: narrow(decimal(4, "skip")?, "skip")?,
        vob: narrow(decimal(5, "vob")?, "vob")?,
        cell: narrow(decimal(6, "cell")?, "cell")?,
        flags,
    })
}

/// Line reader that remembers the current 1-based line number.
struct Lines<R> {
    reader: R,
    line_number: usize,
}

impl<R: BufRead> Lines<R> {
    fn new(reader: R) -> Self {
        Self {
            reader,
            line_number: 0,
        }
    }

    fn next_line(&mut self) -> Result<Option<String>, PulldownError> {
        let mut buffer = String::new();
        if self.reader.read_line(&mut buffer)? == 0 {
            return Ok(None);
        }
        self.line_number += 1;
        let trimmed_len = buffer.trim_end_matches(['\r', '\n']).len();
        buffer.truncate(trimmed_len);
        Ok(Some(buffer))
    }

    fn malformed(&self, reason: impl Into<String>) -> PulldownError {
        PulldownError::malformed(self.line_number, reason)
    }
}
