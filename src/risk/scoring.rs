//! Normalization and aggregation of hazard observations.
//!
//! Pure and deterministic: the same observations, basement flag, and admin
//! configuration always produce the same `ScoringResult`. Observations with
//! confidence 0 appear in the per-hazard maps as `indisponible` but never
//! enter the weighted global score or the confidence average.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::risk::domain::{Hazard, HazardLevel, HazardObservation, ScoringResult};

const FLOOD_BASEMENT_BONUS: u8 = 10;

/// Admin-configurable per-hazard weights. A hazard missing from the map (or
/// carrying a non-positive weight) contributes with the default weight 1.0;
/// a configuration gap never silently zeroes a hazard out.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskWeights(pub BTreeMap<Hazard, f64>);

impl RiskWeights {
    pub fn weight_for(&self, hazard: Hazard) -> f64 {
        match self.0.get(&hazard) {
            Some(weight) if *weight > 0.0 => *weight,
            _ => 1.0,
        }
    }
}

/// Admin-configurable qualitative cut points. Falls back to 25/50/75 as a
/// block whenever the configured values are not strictly ascending in
/// [0, 100].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RiskThresholds {
    pub low: u8,
    pub medium: u8,
    pub high: u8,
}

impl Default for RiskThresholds {
    fn default() -> Self {
        Self {
            low: 25,
            medium: 50,
            high: 75,
        }
    }
}

impl RiskThresholds {
    pub fn validated(self) -> Self {
        if self.low < self.medium && self.medium < self.high && self.high <= 100 {
            self
        } else {
            Self::default()
        }
    }

    fn level_for(&self, score: u8) -> HazardLevel {
        if score < self.low {
            HazardLevel::Faible
        } else if score < self.medium {
            HazardLevel::Moyen
        } else if score < self.high {
            HazardLevel::Eleve
        } else {
            HazardLevel::TresEleve
        }
    }
}

pub struct ScoringEngine {
    weights: RiskWeights,
    thresholds: RiskThresholds,
}

impl ScoringEngine {
    pub fn new(weights: RiskWeights, thresholds: RiskThresholds) -> Self {
        Self {
            weights,
            thresholds: thresholds.validated(),
        }
    }

    /// Fold one observation per hazard into the composite scoring result.
    pub fn score(&self, observations: &[HazardObservation], has_basement: bool) -> ScoringResult {
        let mut scores = BTreeMap::new();
        let mut levels = BTreeMap::new();
        let mut explanations = BTreeMap::new();
        let mut data_sources = Vec::with_capacity(observations.len());

        let mut weighted_sum = 0.0_f64;
        let mut total_weight = 0.0_f64;
        let mut confidence_sum = 0.0_f64;
        let mut confident_count = 0_u32;

        for observation in observations {
            let mut score = observation.normalized_score.min(100);
            if observation.hazard == Hazard::Flood && has_basement {
                score = score.saturating_add(FLOOD_BASEMENT_BONUS).min(100);
            }

            let level = if observation.is_unavailable() {
                HazardLevel::Indisponible
            } else {
                self.thresholds.level_for(score)
            };

            if !observation.is_unavailable() {
                let weight = self.weights.weight_for(observation.hazard);
                weighted_sum += f64::from(score) * weight;
                total_weight += weight;
                confidence_sum += f64::from(observation.confidence);
                confident_count += 1;
            }

            scores.insert(observation.hazard, score);
            levels.insert(observation.hazard, level);
            explanations.insert(observation.hazard, observation.explanation.clone());
            data_sources.push(observation.source.clone());
        }

        let (global_score, global_level) = if total_weight > 0.0 {
            let global = (weighted_sum / total_weight).round() as u8;
            (global, self.thresholds.level_for(global))
        } else {
            (0, HazardLevel::Indisponible)
        };

        let confidence_score = if confident_count > 0 {
            (confidence_sum / f64::from(confident_count)).round() as u8
        } else {
            0
        };

        debug!(
            global_score,
            global_level = global_level.as_str(),
            confidence_score,
            hazards = observations.len(),
            "hazard observations aggregated"
        );

        ScoringResult {
            scores,
            levels,
            global_score,
            global_level,
            confidence_score,
            explanations,
            data_sources,
        }
    }
}
