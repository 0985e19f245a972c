//! Difficulty weighting.
//!
//! The cross-lane weight table lives here together with `ChartDensity`, the
//! density estimate that consumes it.
//!
//! ## Global table
//!
//! A process-wide table is kept behind a mutex. Overrides are installed through
//! `set_global_override` only; every other caller reads through
//! `with_global_weights`.

pub mod cross_matrix;

pub use cross_matrix::{CrossMatrixTable, LaneWeights, default_weights};

use crate::error::ConfigError;
use crate::models::engine::note::Chart;
use std::sync::{Mutex, MutexGuard, OnceLock};

/// Largest lane count any table or chart may use.
pub const MAX_LANES: usize = 18;

static GLOBAL_WEIGHTS: OnceLock<Mutex<CrossMatrixTable>> = OnceLock::new();

fn global_weights() -> MutexGuard<'static, CrossMatrixTable> {
    GLOBAL_WEIGHTS
        .get_or_init(|| Mutex::new(CrossMatrixTable::new()))
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Reads the global table.
pub fn with_global_weights<F, R>(f: F) -> R
where
    F: FnOnce(&CrossMatrixTable) -> R,
{
    f(&global_weights())
}

/// Installs or clears a global override.
pub fn set_global_override(lane_count: usize, weights: Option<Vec<f64>>) -> Result<(), ConfigError> {
    global_weights().set_override(lane_count, weights)
}

/// Drops every global override.
pub fn reset_global_weights() {
    global_weights().clear_overrides();
    log::info!("WEIGHTS: global overrides reset");
}

/// Density figures for one chart.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartDensity {
    pub note_count: usize,
    pub duration_ms: f64,
    /// Notes per second.
    pub nps: f64,
    /// Notes per second, each note weighted by the boundaries around its lane.
    /// `None` when the lane count has no weights.
    pub weighted_nps: Option<f64>,
}

impl ChartDensity {
    pub fn from_chart(chart: &Chart, table: &CrossMatrixTable) -> Self {
        let note_count = chart.notes.len();
        let last_end = chart.notes.iter().map(|n| n.end_time_ms()).reduce(f64::max);
        let duration_ms = match (chart.notes.first(), last_end) {
            (Some(first), Some(last)) => (last - first.start_time_ms).max(0.0),
            _ => 0.0,
        };

        let duration_secs = duration_ms / 1000.0;
        let per_second = |total: f64| {
            if duration_secs > 0.0 {
                total / duration_secs
            } else {
                0.0
            }
        };

        let weighted_nps = table.get(chart.key_count).as_slice().map(|weights| {
            let total: f64 = chart
                .notes
                .iter()
                .map(|n| (weights[n.lane] + weights[n.lane + 1]) / 2.0)
                .sum();
            per_second(total)
        });

        Self {
            note_count,
            duration_ms,
            nps: per_second(note_count as f64),
            weighted_nps,
        }
    }

    /// Same as `from_chart`, reading the global table.
    pub fn from_chart_global(chart: &Chart) -> Self {
        with_global_weights(|table| Self::from_chart(chart, table))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::engine::note::NoteData;

    #[test]
    fn test_density_of_simple_chart() {
        let chart = Chart::new(
            4,
            vec![
                NoteData::tap(0.0, 0),
                NoteData::tap(500.0, 1),
                NoteData::hold(1000.0, 2, 1000.0),
            ],
        )
        .unwrap();
        let density = ChartDensity::from_chart(&chart, &CrossMatrixTable::new());

        assert_eq!(density.duration_ms, 2000.0);
        assert_eq!(density.nps, 1.5);
        // (0.175+0.25)/2 + (0.25+0.05)/2 + (0.05+0.25)/2 = 0.5125 over 2s
        let weighted = density.weighted_nps.unwrap();
        assert!((weighted - 0.25625).abs() < 1e-9);
    }

    #[test]
    fn test_unsupported_lane_count_has_no_weighted_density() {
        let chart = Chart::new(11, vec![NoteData::tap(0.0, 10), NoteData::tap(1000.0, 0)]).unwrap();
        let density = ChartDensity::from_chart(&chart, &CrossMatrixTable::new());
        assert_eq!(density.nps, 2.0);
        assert!(density.weighted_nps.is_none());
    }

    #[test]
    fn test_empty_chart_is_zero() {
        let chart = Chart::new(4, vec![]).unwrap();
        let density = ChartDensity::from_chart(&chart, &CrossMatrixTable::new());
        assert_eq!(density.nps, 0.0);
        assert_eq!(density.weighted_nps, Some(0.0));
    }

    #[test]
    fn test_global_override_lifecycle() {
        // Only this test touches the 16K global row.
        set_global_override(16, Some(vec![1.0; 17])).unwrap();
        assert!(with_global_weights(|t| t.has_override(16)));

        set_global_override(16, None).unwrap();
        let row = with_global_weights(|t| t.get(16));
        assert_eq!(row, LaneWeights::Supported(default_weights(16).unwrap().to_vec()));

        assert!(set_global_override(40, None).is_err());
    }
}
