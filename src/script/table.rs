use crate::utils::naming::to_pinyin;
use crate::voice::error::ValidationError;

use calamine::{open_workbook_auto, Data, Reader};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Frame rate of the timecodes in the first column.
pub const FRAMES_PER_SECOND: u64 = 24;
pub const COLLAPSED_ROWS: usize = 2;
pub const EXPANDED_ROW_LIMIT: usize = 50;

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("could not open script {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: calamine::Error,
    },
    #[error("script {0} has no worksheet")]
    NoSheet(String),
}

/// Values a picked script row feeds into the test page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptPick {
    /// Timecode with the colons removed; prefixes download names
    pub file_prefix: String,
    /// Pinyin of the speaker column, used as the voice search
    pub voice_search: String,
    pub test_text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScriptRow {
    /// 1-based position in the sheet, headers excluded
    pub number: usize,
    pub cells: Vec<String>,
}

impl ScriptRow {
    pub fn cell(&self, column: usize) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    fn matches(&self, needle_lower: &str) -> bool {
        self.cells
            .iter()
            .any(|c| c.to_lowercase().contains(needle_lower))
    }

    /// Column layout: timecode, _, speaker, _, line.
    pub fn pick(&self) -> ScriptPick {
        ScriptPick {
            file_prefix: self.cell(0).replace(':', "").trim().to_string(),
            voice_search: to_pinyin(self.cell(2)),
            test_text: self.cell(4).to_string(),
        }
    }
}

/// First worksheet of a script file, every cell rendered as text.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScriptTable {
    pub headers: Vec<String>,
    pub rows: Vec<ScriptRow>,
}

impl ScriptTable {
    pub fn from_rows(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self {
            headers,
            rows: rows
                .into_iter()
                .enumerate()
                .map(|(i, cells)| ScriptRow {
                    number: i + 1,
                    cells,
                })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// 1-based row lookup, matching the numbers shown to the user.
    pub fn row(&self, number: usize) -> Option<&ScriptRow> {
        self.rows.iter().find(|r| r.number == number)
    }

    /// Rows with any cell containing `query`, ignoring case. An empty query keeps everything.
    pub fn search(&self, query: &str) -> Vec<&ScriptRow> {
        let needle = query.to_lowercase();
        self.rows
            .iter()
            .filter(|r| needle.is_empty() || r.matches(&needle))
            .collect()
    }

    /// Rows whose first-column timecode is strictly later than `timecode`.
    /// Rows without a parseable timecode are dropped.
    pub fn after_timecode(&self, timecode: &str) -> Result<Vec<&ScriptRow>, ValidationError> {
        let threshold = timecode_to_frames(timecode)
            .ok_or_else(|| ValidationError::Timecode(timecode.to_string()))?;
        Ok(self
            .rows
            .iter()
            .filter(|r| timecode_to_frames(r.cell(0)).is_some_and(|f| f > threshold))
            .collect())
    }

    /// Timecode filter first, then search; blank inputs are skipped.
    pub fn view(&self, query: &str, timecode: Option<&str>) -> Result<Vec<&ScriptRow>, ValidationError> {
        let rows = match timecode.map(str::trim).filter(|t| !t.is_empty()) {
            Some(tc) => self.after_timecode(tc)?,
            None => self.rows.iter().collect(),
        };
        let needle = query.to_lowercase();
        Ok(rows
            .into_iter()
            .filter(|r| needle.is_empty() || r.matches(&needle))
            .collect())
    }
}

/// `HH:MM:SS:FF` to a frame count at 24 fps. Out-of-range minutes, seconds
/// or frames, and hour counts too large to convert, yield `None`.
pub fn timecode_to_frames(timecode: &str) -> Option<u64> {
    let parts: Vec<u64> = timecode
        .trim()
        .split(':')
        .map(|p| p.trim().parse().ok())
        .collect::<Option<_>>()?;
    let [h, m, s, f] = parts.as_slice() else {
        return None;
    };
    if *m >= 60 || *s >= 60 || *f >= FRAMES_PER_SECOND {
        return None;
    }
    h.checked_mul(3600)?
        .checked_add(m * 60 + s)?
        .checked_mul(FRAMES_PER_SECOND)?
        .checked_add(*f)
}

/// Slice shown on screen: two rows collapsed, at most fifty expanded.
pub fn visible_rows<T>(rows: &[T], expanded: bool) -> &[T] {
    let limit = if expanded {
        EXPANDED_ROW_LIMIT
    } else {
        COLLAPSED_ROWS
    };
    &rows[..rows.len().min(limit)]
}

fn render(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        other => other.to_string(),
    }
}

pub fn load_table(path: &Path) -> Result<ScriptTable, ScriptError> {
    let shown_path = path.display().to_string();
    let mut workbook = open_workbook_auto(path).map_err(|source| ScriptError::Open {
        path: shown_path.clone(),
        source,
    })?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| ScriptError::NoSheet(shown_path.clone()))?
        .map_err(|source| ScriptError::Open {
            path: shown_path.clone(),
            source,
        })?;

    let mut rows = range.rows();
    let headers = rows
        .next()
        .map(|r| r.iter().map(render).collect())
        .unwrap_or_default();
    let body = rows.map(|r| r.iter().map(render).collect()).collect();
    let table = ScriptTable::from_rows(headers, body);
    tracing::info!("[Script] Loaded {} rows from {}", table.len(), shown_path);
    Ok(table)
}
