//! Dive plan segments and the returned schedule
//!
//! A segment is one leg of a dive: a depth change or a flat stretch on a
//! named gas. Schedules returned by the solvers never contain two adjacent
//! flat segments at the same depth on the same gas; [`collapse_segments`]
//! enforces that.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One leg of a dive profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    /// Depth at the start of the leg (m)
    pub start_depth: f64,
    /// Depth at the end of the leg (m)
    pub end_depth: f64,
    /// Label of the gas breathed during the leg
    pub gas_name: String,
    /// Duration (minutes), non-negative
    pub time: f64,
}

impl Segment {
    /// Create a new segment.
    pub fn new(
        start_depth: f64,
        end_depth: f64,
        gas_name: impl Into<String>,
        time: f64,
    ) -> Self {
        Segment {
            start_depth,
            end_depth,
            gas_name: gas_name.into(),
            time,
        }
    }

    /// True when the leg stays at one depth.
    pub fn is_flat(&self) -> bool {
        self.start_depth == self.end_depth
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_flat() {
            write!(
                f,
                "{:.0} m for {:.1} min on {}",
                self.start_depth, self.time, self.gas_name
            )
        } else {
            write!(
                f,
                "{:.0} m -> {:.0} m in {:.1} min on {}",
                self.start_depth, self.end_depth, self.time, self.gas_name
            )
        }
    }
}

/// Merge adjacent flat segments at the same depth on the same gas.
pub fn collapse_segments(segments: Vec<Segment>) -> Vec<Segment> {
    let mut collapsed: Vec<Segment> = Vec::with_capacity(segments.len());
    for segment in segments {
        if let Some(last) = collapsed.last_mut() {
            if last.is_flat()
                && segment.is_flat()
                && last.end_depth == segment.start_depth
                && last.gas_name == segment.gas_name
            {
                last.time += segment.time;
                continue;
            }
        }
        collapsed.push(segment);
    }
    collapsed
}

/// The result of a decompression calculation: the full dive plus the
/// computed ascent, with any non-fatal diagnostics.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DecoSchedule {
    /// Dive and decompression legs in order
    pub segments: Vec<Segment>,
    /// Non-fatal diagnostics raised during the calculation
    pub warnings: Vec<String>,
}

impl DecoSchedule {
    /// Total runtime (minutes) across all legs.
    pub fn runtime(&self) -> f64 {
        self.segments.iter().map(|s| s.time).sum()
    }

    /// Depth of the first flat decompression stop, if any.
    ///
    /// The first flat segment strictly above the deepest point of the
    /// profile and below the surface, once the bottom has been left.
    pub fn first_stop_depth(&self) -> Option<f64> {
        let max_depth = self
            .segments
            .iter()
            .map(|s| s.end_depth)
            .fold(0.0_f64, f64::max);
        let mut past_bottom = false;
        for segment in &self.segments {
            if segment.start_depth == max_depth || segment.end_depth == max_depth {
                past_bottom = true;
                continue;
            }
            if past_bottom
                && segment.is_flat()
                && segment.start_depth > 0.0
                && segment.start_depth < max_depth
            {
                return Some(segment.start_depth);
            }
        }
        None
    }
}
