use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::{Result, TempoError};
use crate::types::ScoreImpact;

/// one row of the table; `upper_bound` of `None` covers everything above
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreBand {
    pub upper_bound: Option<Decimal>,
    pub min_penalty: i32,
    pub max_penalty: i32,
}

impl ScoreBand {
    pub fn new(upper_bound: Option<Decimal>, min_penalty: i32, max_penalty: i32) -> Self {
        Self {
            upper_bound,
            min_penalty,
            max_penalty,
        }
    }

    fn contains(&self, utilization: Decimal) -> bool {
        self.upper_bound.map_or(true, |upper| utilization <= upper)
    }
}

/// utilization bands mapped to the points a profile is assumed to lose
/// against a low utilization. impact between two utilizations is the
/// difference of their penalties, so swapping the arguments negates it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreImpactTable {
    pub bands: Vec<ScoreBand>,
}

impl Default for ScoreImpactTable {
    fn default() -> Self {
        Self {
            bands: vec![
                ScoreBand::new(Some(dec!(10)), 0, 0),
                ScoreBand::new(Some(dec!(30)), 10, 20),
                ScoreBand::new(Some(dec!(50)), 25, 40),
                ScoreBand::new(Some(dec!(75)), 45, 65),
                ScoreBand::new(Some(dec!(100)), 70, 90),
                ScoreBand::new(None, 90, 110),
            ],
        }
    }
}

impl ScoreImpactTable {
    /// points lost at `utilization`, as (min, max)
    pub fn penalty(&self, utilization: Decimal) -> (i32, i32) {
        self.bands
            .iter()
            .find(|band| band.contains(utilization))
            .or_else(|| self.bands.last())
            .map(|band| (band.min_penalty, band.max_penalty))
            .unwrap_or((0, 0))
    }

    /// estimated score change when utilization moves from `before` to `after`.
    /// positive when utilization drops
    pub fn impact(&self, before: Decimal, after: Decimal) -> ScoreImpact {
        let (before_min, before_max) = self.penalty(before);
        let (after_min, after_max) = self.penalty(after);
        ScoreImpact::new(before_min - after_min, before_max - after_max)
    }

    pub fn validate(&self) -> Result<()> {
        let last = self.bands.last().ok_or_else(|| TempoError::InvalidConfiguration {
            message: "score table has no bands".to_string(),
        })?;
        if last.upper_bound.is_some() {
            return Err(TempoError::InvalidConfiguration {
                message: "last score band must be unbounded".to_string(),
            });
        }

        for band in &self.bands {
            if band.min_penalty > band.max_penalty {
                return Err(TempoError::InvalidConfiguration {
                    message: format!(
                        "score band penalty range {}..{} is inverted",
                        band.min_penalty, band.max_penalty
                    ),
                });
            }
        }

        for pair in self.bands.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            let ordered = match (lower.upper_bound, upper.upper_bound) {
                (Some(a), Some(b)) => a < b,
                (Some(_), None) => true,
                (None, _) => false,
            };
            if !ordered {
                return Err(TempoError::InvalidConfiguration {
                    message: "score band bounds must be strictly increasing".to_string(),
                });
            }
            if upper.min_penalty < lower.min_penalty || upper.max_penalty < lower.max_penalty {
                return Err(TempoError::InvalidConfiguration {
                    message: "score band penalties must not decrease".to_string(),
                });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_band_lookup_is_inclusive() {
        let table = ScoreImpactTable::default();
        assert_eq!(table.penalty(dec!(0)), (0, 0));
        assert_eq!(table.penalty(dec!(10)), (0, 0));
        assert_eq!(table.penalty(dec!(10.01)), (10, 20));
        assert_eq!(table.penalty(dec!(30)), (10, 20));
        assert_eq!(table.penalty(dec!(100)), (70, 90));
        assert_eq!(table.penalty(dec!(140)), (90, 110));
    }

    #[test]
    fn test_impact_direction() {
        let table = ScoreImpactTable::default();

        let improvement = table.impact(dec!(60), dec!(5));
        assert_eq!(improvement, ScoreImpact { min: 45, max: 65 });

        let regression = table.impact(dec!(5), dec!(60));
        assert_eq!(regression, improvement.negate());

        assert_eq!(table.impact(dec!(42), dec!(42)), ScoreImpact::NONE);
    }

    #[test]
    fn test_larger_drops_score_higher() {
        let table = ScoreImpactTable::default();
        let small = table.impact(dec!(35), dec!(5));
        let large = table.impact(dec!(90), dec!(5));
        assert!(large.min > small.min);
        assert!(large.max > small.max);
    }

    #[test]
    fn test_validation() {
        assert!(ScoreImpactTable::default().validate().is_ok());
        assert!(ScoreImpactTable { bands: vec![] }.validate().is_err());

        let bounded_tail = ScoreImpactTable {
            bands: vec![ScoreBand::new(Some(dec!(10)), 0, 0)],
        };
        assert!(bounded_tail.validate().is_err());

        let decreasing = ScoreImpactTable {
            bands: vec![
                ScoreBand::new(Some(dec!(10)), 20, 30),
                ScoreBand::new(None, 10, 30),
            ],
        };
        assert!(decreasing.validate().is_err());
    }
}
