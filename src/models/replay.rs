//! Serializable replay structures, autoplay generation and replay simulation.
//!
//! Replays only store raw inputs, so the same replay can be re-simulated under
//! any ruleset. Timestamps are stored in **microseconds (i64)**.

use crate::error::ConfigError;
use crate::input::events::InputEvent;
use crate::logic::engine::JudgementEngine;
use crate::logic::score::ScoreRank;
use crate::models::engine::constants::{AUTOPLAY_RELEASE_DELAY_MS, ms_to_us, us_to_ms};
use crate::models::engine::note::Chart;
use crate::models::ruleset::Ruleset;
use crate::models::stats::HitStats;
use crate::system::bus::JudgementEvent;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};
use std::path::Path;
use zstd::stream::{decode_all, encode_all};

/// Current replay format version.
pub const REPLAY_FORMAT_VERSION: u8 = 5;

const REPLAY_COMPRESSION_LEVEL: i32 = 21;

/// Highest lane the packed payload can carry.
pub const MAX_REPLAY_LANE: usize = (u8::MAX >> 1) as usize;

/// A single press or release.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplayInput {
    /// Absolute time in microseconds since chart start.
    pub time_us: i64,
    /// Packed data: (lane << 1) | is_press
    pub payload: u8,
}

impl ReplayInput {
    /// `None` when the lane does not fit the payload.
    pub fn new(time_us: i64, lane: usize, is_press: bool) -> Option<Self> {
        let lane = u8::try_from(lane)
            .ok()
            .filter(|&l| usize::from(l) <= MAX_REPLAY_LANE)?;
        Some(Self {
            time_us,
            payload: (lane << 1) | u8::from(is_press),
        })
    }

    /// Unpack lane and is_press from payload.
    #[inline]
    pub fn unpack(&self) -> (usize, bool) {
        let is_press = (self.payload & 1) != 0;
        let lane = (self.payload >> 1) as usize;
        (lane, is_press)
    }

    pub fn to_event(self) -> InputEvent {
        let (lane, pressed) = self.unpack();
        InputEvent {
            time_ms: us_to_ms(self.time_us),
            lane,
            pressed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    pub version: u8,
    /// Hash of the chart the replay was recorded on.
    pub chart_hash: String,
    /// Name of the ruleset used while recording.
    pub ruleset: String,
    /// Playback rate used during the play.
    pub rate: f64,
    /// All inputs in chronological order.
    pub inputs: Vec<ReplayInput>,
}

impl ReplayData {
    pub fn new(chart_hash: impl Into<String>, ruleset: impl Into<String>, rate: f64) -> Self {
        Self {
            version: REPLAY_FORMAT_VERSION,
            chart_hash: chart_hash.into(),
            ruleset: ruleset.into(),
            rate,
            inputs: Vec::new(),
        }
    }

    /// Records a live input.
    pub fn record(&mut self, event: InputEvent) {
        self.push(ms_to_us(event.time_ms), event.lane, event.pressed);
    }

    #[inline]
    pub fn add_press(&mut self, time_us: i64, lane: usize) {
        self.push(time_us, lane, true);
    }

    #[inline]
    pub fn add_release(&mut self, time_us: i64, lane: usize) {
        self.push(time_us, lane, false);
    }

    fn push(&mut self, time_us: i64, lane: usize, is_press: bool) {
        match ReplayInput::new(time_us, lane, is_press) {
            Some(input) => self.inputs.push(input),
            None => log::debug!("REPLAY: input on lane {lane} cannot be recorded, dropped"),
        }
    }

    pub fn events(&self) -> impl Iterator<Item = InputEvent> + '_ {
        self.inputs.iter().map(|input| input.to_event())
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// bincode, then zstd.
    pub fn to_compressed(&self) -> Result<Vec<u8>, ConfigError> {
        let binary_data = bincode::serde::encode_to_vec(self, bincode::config::standard())
            .map_err(|e| ConfigError::ReplayCodec(format!("Serialization error: {e}")))?;
        encode_all(&binary_data[..], REPLAY_COMPRESSION_LEVEL)
            .map_err(|e| ConfigError::ReplayCodec(format!("Compression error: {e}")))
    }

    pub fn from_compressed(bytes: &[u8]) -> Result<Self, ConfigError> {
        let binary_data = decode_all(bytes)
            .map_err(|e| ConfigError::ReplayCodec(format!("Decompression error: {e}")))?;
        let (data, _len): (ReplayData, usize) =
            bincode::serde::decode_from_slice(&binary_data, bincode::config::standard())
                .map_err(|e| ConfigError::ReplayCodec(format!("Deserialization error: {e}")))?;
        Ok(data)
    }

    /// Writes JSON for `.json` paths, the compressed format otherwise.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let bytes = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => self.to_json()?.into_bytes(),
            _ => self.to_compressed()?,
        };
        std::fs::write(path, bytes).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("REPLAY: saved {} inputs to {:?}", self.inputs.len(), path);
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = std::fs::read(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Ok(serde_json::from_slice(&bytes)?),
            _ => Self::from_compressed(&bytes),
        }
    }
}

/// Synthetic input stream that hits every target on time.
///
/// Each target is pressed at its start and released at its end, or
/// `AUTOPLAY_RELEASE_DELAY_MS` later for taps, but never after the next press
/// in the same lane. At equal timestamps releases come first.
pub fn generate_autoplay(chart: &Chart) -> Vec<InputEvent> {
    let mut by_lane: Vec<Vec<_>> = vec![Vec::new(); chart.key_count];
    for note in &chart.notes {
        by_lane[note.lane].push(note);
    }

    let mut events = Vec::with_capacity(chart.notes.len() * 2);
    for (lane, notes) in by_lane.iter().enumerate() {
        for (i, note) in notes.iter().enumerate() {
            let press = note.start_time_ms;
            let mut release = if note.is_hold() {
                note.end_time_ms()
            } else {
                press + AUTOPLAY_RELEASE_DELAY_MS
            };
            if let Some(next) = notes.get(i + 1) {
                release = release.min(next.start_time_ms).max(press);
            }
            events.push(InputEvent::press(press, lane));
            events.push(InputEvent::release(release, lane));
        }
    }

    events.sort_by_key(|e| (OrderedFloat(e.time_ms), e.pressed, e.lane));
    events
}

/// Autoplay packaged as a replay for `chart`.
pub fn autoplay_replay(chart: &Chart, ruleset: &Ruleset) -> ReplayData {
    let mut replay = ReplayData::new(chart.hash(), ruleset.name.clone(), ruleset.rate);
    for event in generate_autoplay(chart) {
        replay.record(event);
    }
    replay
}

/// Press without a corresponding target.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GhostTap {
    pub time_us: i64,
    pub lane: u8,
}

/// Complete result of a replay simulation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReplayResult {
    pub ruleset: String,
    pub hit_stats: HitStats,
    /// Accuracy as a fraction (0-1).
    pub accuracy: f64,
    pub total_score: f64,
    pub max_combo: u32,
    pub rank: ScoreRank,
    /// Every judgement, in finalization order.
    pub judgements: Vec<JudgementEvent>,
    pub ghost_taps: Vec<GhostTap>,
}

/// Runs the replay through a fresh engine at the replay's rate.
pub fn simulate_replay(
    replay: &ReplayData,
    chart: &Chart,
    ruleset: &Ruleset,
) -> Result<ReplayResult, ConfigError> {
    let chart_hash = chart.hash();
    if replay.chart_hash != chart_hash {
        log::warn!(
            "REPLAY: chart hash mismatch (replay {}, chart {})",
            replay.chart_hash,
            chart_hash
        );
    }

    let mut engine = JudgementEngine::new(chart, ruleset.clone().with_rate(replay.rate))?;
    let mut ghost_taps = Vec::new();

    for input in &replay.inputs {
        let event = input.to_event();
        let ghosts_before = engine.snapshot().stats.ghost_taps;
        engine.handle_input(event);
        if engine.snapshot().stats.ghost_taps > ghosts_before {
            ghost_taps.push(GhostTap {
                time_us: input.time_us,
                lane: event.lane as u8,
            });
        }
    }

    let snapshot = engine.finish();
    log::info!(
        "REPLAY: simulated {} inputs under '{}', accuracy {:.2}%",
        replay.inputs.len(),
        ruleset.name,
        snapshot.accuracy * 100.0
    );

    Ok(ReplayResult {
        ruleset: ruleset.name.clone(),
        hit_stats: snapshot.stats,
        accuracy: snapshot.accuracy,
        total_score: snapshot.total_score,
        max_combo: snapshot.max_combo,
        rank: snapshot.rank,
        judgements: engine.take_judgements(),
        ghost_taps,
    })
}

/// Re-simulates a replay under a different ruleset.
pub fn rejudge_replay(
    replay: &ReplayData,
    chart: &Chart,
    ruleset: &Ruleset,
) -> Result<ReplayResult, ConfigError> {
    if replay.ruleset != ruleset.name {
        log::info!(
            "REPLAY: rejudging '{}' replay under '{}'",
            replay.ruleset,
            ruleset.name
        );
    }
    simulate_replay(replay, chart, ruleset)
}
