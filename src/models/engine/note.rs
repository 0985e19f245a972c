//! Chart structures and loaders for toml, json and osu!mania charts.

use crate::difficulty::MAX_LANES;
use crate::error::ConfigError;
use rosu_map::section::hit_objects::{HitObject, HitObjectKind};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single target descriptor in a chart.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NoteData {
    /// When the note should be hit (in milliseconds).
    pub start_time_ms: f64,
    /// Which lane (0-indexed).
    pub lane: usize,
    /// Present for hold notes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

impl NoteData {
    pub fn tap(start_time_ms: f64, lane: usize) -> Self {
        Self {
            start_time_ms,
            lane,
            duration_ms: None,
        }
    }

    pub fn hold(start_time_ms: f64, lane: usize, duration_ms: f64) -> Self {
        Self {
            start_time_ms,
            lane,
            duration_ms: Some(duration_ms),
        }
    }

    /// Returns true if this note is judged as a hold.
    pub fn is_hold(&self) -> bool {
        self.duration_ms.is_some_and(|d| d > 0.0)
    }

    /// Returns the end time of this note.
    /// For holds: start + duration. For taps: same as start.
    pub fn end_time_ms(&self) -> f64 {
        match self.duration_ms {
            Some(d) if d > 0.0 => self.start_time_ms + d,
            _ => self.start_time_ms,
        }
    }
}

/// An ordered, validated list of notes for one key count.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub key_count: usize,
    pub notes: Vec<NoteData>,
}

impl Chart {
    /// Validates and sorts the notes.
    pub fn new(key_count: usize, mut notes: Vec<NoteData>) -> Result<Self, ConfigError> {
        if key_count == 0 || key_count > MAX_LANES {
            return Err(ConfigError::UnsupportedLaneCount(key_count));
        }

        for (index, note) in notes.iter().enumerate() {
            if !note.start_time_ms.is_finite() {
                return Err(ConfigError::InvalidTarget {
                    index,
                    reason: format!("non-finite start time {}", note.start_time_ms),
                });
            }
            if let Some(d) = note.duration_ms
                && (!d.is_finite() || d < 0.0)
            {
                return Err(ConfigError::InvalidTarget {
                    index,
                    reason: format!("invalid duration {d}"),
                });
            }
            if note.lane >= key_count {
                return Err(ConfigError::LaneOutOfRange {
                    lane: note.lane,
                    key_count,
                });
            }
        }

        notes.sort_by(|a, b| {
            a.start_time_ms
                .total_cmp(&b.start_time_ms)
                .then(a.lane.cmp(&b.lane))
        });

        Ok(Self { key_count, notes })
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: Chart = toml::from_str(content)?;
        Self::new(raw.key_count, raw.notes)
    }

    pub fn from_json_str(content: &str) -> Result<Self, ConfigError> {
        let raw: Chart = serde_json::from_str(content)?;
        Self::new(raw.key_count, raw.notes)
    }

    /// Loads a chart, picking the format from the file extension.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase);

        if extension.as_deref() == Some("osu") {
            return load_osu_chart(path);
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        match extension.as_deref() {
            Some("json") => Self::from_json_str(&content),
            _ => Self::from_toml_str(&content),
        }
    }

    /// Number of notes that are holds.
    pub fn hold_count(&self) -> usize {
        self.notes.iter().filter(|n| n.is_hold()).count()
    }

    /// md5 of the canonical note list, used to pair replays with charts.
    pub fn hash(&self) -> String {
        let mut canonical = format!("{}K\n", self.key_count);
        for note in &self.notes {
            canonical.push_str(&format!(
                "{:.3}|{}|{:.3}\n",
                note.start_time_ms,
                note.lane,
                note.duration_ms.unwrap_or(0.0)
            ));
        }
        format!("{:x}", md5::compute(canonical.as_bytes()))
    }
}

/// Loads an osu!mania beatmap. Sliders and spinners are skipped.
pub fn load_osu_chart(path: &Path) -> Result<Chart, ConfigError> {
    let map = rosu_map::Beatmap::from_path(path).map_err(|source| ConfigError::Beatmap {
        path: path.to_path_buf(),
        source,
    })?;

    let key_count = map.circle_size.round().max(0.0) as usize;
    if key_count == 0 || key_count > MAX_LANES {
        return Err(ConfigError::UnsupportedLaneCount(key_count));
    }

    let notes = map
        .hit_objects
        .iter()
        .filter_map(|h| parse_hit_object(h, key_count))
        .collect();

    Chart::new(key_count, notes)
}

/// Converts one osu! hit object to a note.
pub fn parse_hit_object(hit_object: &HitObject, key_count: usize) -> Option<NoteData> {
    match &hit_object.kind {
        HitObjectKind::Circle(circle) => {
            let lane = x_to_lane(circle.pos.x, key_count)?;
            Some(NoteData::tap(hit_object.start_time, lane))
        }
        HitObjectKind::Hold(hold) => {
            let lane = x_to_lane(hold.pos_x, key_count)?;
            Some(NoteData::hold(hit_object.start_time, lane, hold.duration))
        }
        _ => None,
    }
}

/// Converts an osu!mania x position (512px grid) to a lane index.
pub fn x_to_lane(x: f32, key_count: usize) -> Option<usize> {
    let lane_width = 512.0 / key_count as f32;
    let lane = (x / lane_width).floor();
    if lane >= 0.0 && (lane as usize) < key_count {
        Some(lane as usize)
    } else {
        log::warn!("ENGINE: unknown lane position {x} for {key_count}K");
        None
    }
}
