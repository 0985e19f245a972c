//! Per-lane-count cross weights.
//!
//! Row `k` has `k + 1` entries: one per lane boundary, edges included. Lane
//! counts without a tuned row are unsupported rather than defaulted.

use super::MAX_LANES;
use crate::error::ConfigError;
use std::collections::BTreeMap;

/// Result of a weight lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum LaneWeights {
    Supported(Vec<f64>),
    Unsupported,
}

impl LaneWeights {
    pub fn as_slice(&self) -> Option<&[f64]> {
        match self {
            LaneWeights::Supported(weights) => Some(weights),
            LaneWeights::Unsupported => None,
        }
    }

    pub fn is_supported(&self) -> bool {
        matches!(self, LaneWeights::Supported(_))
    }
}

const DEFAULT_ROWS: [Option<&[f64]>; MAX_LANES] = [
    Some(&[0.075, 0.075]),
    Some(&[0.125, 0.05, 0.125]),
    Some(&[0.125, 0.125, 0.125, 0.125]),
    Some(&[0.175, 0.25, 0.05, 0.25, 0.175]),
    Some(&[0.175, 0.25, 0.175, 0.175, 0.25, 0.175]),
    Some(&[0.225, 0.35, 0.25, 0.05, 0.25, 0.35, 0.225]),
    Some(&[0.225, 0.35, 0.25, 0.225, 0.225, 0.25, 0.35, 0.225]),
    Some(&[0.275, 0.45, 0.35, 0.25, 0.05, 0.25, 0.35, 0.45, 0.275]),
    Some(&[0.3, 0.45, 0.35, 0.25, 0.275, 0.275, 0.25, 0.35, 0.45, 0.3]),
    Some(&[
        0.425, 0.55, 0.45, 0.35, 0.25, 0.05, 0.25, 0.35, 0.45, 0.55, 0.425,
    ]),
    None,
    Some(&[
        0.8, 0.8, 0.8, 0.6, 0.4, 0.2, 0.05, 0.2, 0.4, 0.6, 0.8, 0.8, 0.8,
    ]),
    None,
    Some(&[
        0.4, 0.4, 0.2, 0.2, 0.3, 0.3, 0.1, 0.1, 0.3, 0.3, 0.2, 0.2, 0.4, 0.4, 0.4,
    ]),
    None,
    Some(&[
        0.4, 0.4, 0.2, 0.2, 0.4, 0.4, 0.2, 0.1, 0.1, 0.2, 0.4, 0.4, 0.2, 0.2, 0.4, 0.4, 0.4,
    ]),
    None,
    Some(&[
        0.4, 0.4, 0.2, 0.4, 0.2, 0.4, 0.2, 0.3, 0.1, 0.1, 0.3, 0.2, 0.4, 0.2, 0.4, 0.2, 0.4, 0.4,
        0.4,
    ]),
];

/// Built-in row for `lane_count`, if one exists.
pub fn default_weights(lane_count: usize) -> Option<&'static [f64]> {
    lane_count
        .checked_sub(1)
        .and_then(|i| DEFAULT_ROWS.get(i))
        .copied()
        .flatten()
}

/// The built-in table plus caller overrides.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossMatrixTable {
    overrides: BTreeMap<usize, Vec<f64>>,
}

impl CrossMatrixTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Override first, then the built-in row, else unsupported.
    pub fn get(&self, lane_count: usize) -> LaneWeights {
        if lane_count == 0 || lane_count > MAX_LANES {
            return LaneWeights::Unsupported;
        }
        if let Some(weights) = self.overrides.get(&lane_count) {
            return LaneWeights::Supported(weights.clone());
        }
        default_weights(lane_count)
            .map(|row| LaneWeights::Supported(row.to_vec()))
            .unwrap_or(LaneWeights::Unsupported)
    }

    /// Installs an override, or clears it with `None`.
    pub fn set_override(
        &mut self,
        lane_count: usize,
        weights: Option<Vec<f64>>,
    ) -> Result<(), ConfigError> {
        if lane_count == 0 || lane_count > MAX_LANES {
            return Err(ConfigError::UnsupportedLaneCount(lane_count));
        }

        match weights {
            Some(weights) => {
                if weights.len() != lane_count + 1 {
                    return Err(ConfigError::MalformedWeights {
                        lane_count,
                        expected: lane_count + 1,
                        actual: weights.len(),
                    });
                }
                log::info!("WEIGHTS: override installed for {lane_count}K");
                self.overrides.insert(lane_count, weights);
            }
            None => {
                if self.overrides.remove(&lane_count).is_some() {
                    log::info!("WEIGHTS: override cleared for {lane_count}K");
                }
            }
        }
        Ok(())
    }

    pub fn has_override(&self, lane_count: usize) -> bool {
        self.overrides.contains_key(&lane_count)
    }

    pub fn clear_overrides(&mut self) {
        self.overrides.clear();
    }
}
