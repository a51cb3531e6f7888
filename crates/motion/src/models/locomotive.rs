//! Rolling stock definitions and the coach offsets derived from them.

use serde::Deserialize;

use crate::models::types::{MotionError, Result};

/// A locomotive document: per-coach physical lengths (metres) and model URIs.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Locomotive {
    pub interval: Vec<u32>,
    #[serde(default)]
    pub model: Vec<String>,
}

impl Locomotive {
    pub fn new(interval: Vec<u32>, model: Vec<String>) -> Result<Self> {
        let locomotive = Self { interval, model };
        locomotive.validate()?;
        Ok(locomotive)
    }

    pub fn from_json(document: &str) -> Result<Self> {
        let locomotive: Self = serde_json::from_str(document)?;
        locomotive.validate()?;
        Ok(locomotive)
    }

    pub fn validate(&self) -> Result<()> {
        if self.interval.is_empty() {
            return Err(MotionError::InvalidLocomotive("no coach intervals".into()));
        }
        if self.model.len() > self.interval.len() {
            return Err(MotionError::InvalidLocomotive(format!(
                "{} models for {} coaches",
                self.model.len(),
                self.interval.len()
            )));
        }
        Ok(())
    }

    pub fn train_length(&self) -> u32 {
        self.interval.iter().sum()
    }

    pub fn model_count(&self) -> usize {
        self.model.len()
    }

    pub fn coach_offsets(&self) -> CoachOffsets {
        CoachOffsets::from_intervals(&self.interval)
    }
}

/// Signed along-track distances from the train's centre, head first.
///
/// Offset `k` is the front edge of coach `k`; the final entry is the tail end
/// of the train, so there is one more offset than there are coaches.
#[derive(Clone, Debug, PartialEq)]
pub struct CoachOffsets(Vec<f64>);

impl CoachOffsets {
    /// Offsets in head-first order. Callers are expected to pass them
    /// strictly decreasing.
    pub fn new(offsets: Vec<f64>) -> Self {
        Self(offsets)
    }

    pub fn from_intervals(intervals: &[u32]) -> Self {
        let total: i64 = intervals.iter().map(|&len| len as i64).sum();
        let mut edge = (total as f64 / 2.0).ceil() as i64;

        let mut offsets = Vec::with_capacity(intervals.len() + 1);
        offsets.push(edge as f64);
        for &len in intervals {
            edge -= len as i64;
            offsets.push(edge as f64);
        }
        Self(offsets)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[f64] {
        &self.0
    }

    /// `(rank, offset)` pairs sorted tail first, i.e. ascending offset.
    pub fn ascending(&self) -> Vec<(usize, f64)> {
        let mut pairs: Vec<(usize, f64)> = self.0.iter().copied().enumerate().collect();
        pairs.sort_by(|a, b| a.1.total_cmp(&b.1));
        pairs
    }
}
