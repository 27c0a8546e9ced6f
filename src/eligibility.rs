use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::catalog::PLAYER_COLUMN;
use crate::error::{Result, StatsError};
use crate::record::{StatRecord, StatTable};

pub const APPEARANCES_COLUMN: &str = "Playing Time_MP";
pub const MINUTES_COLUMN: &str = "Playing Time_Min";

/// Minimum participation for a row to count in any stat view.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EligibilityThreshold {
    pub min_appearances: f64,
    pub min_minutes: f64,
}

impl Default for EligibilityThreshold {
    fn default() -> Self {
        Self {
            min_appearances: 5.0,
            min_minutes: 150.0,
        }
    }
}

impl EligibilityThreshold {
    fn passes(&self, record: &StatRecord) -> bool {
        let apps = record.number(APPEARANCES_COLUMN).unwrap_or(0.0);
        let minutes = record.number(MINUTES_COLUMN).unwrap_or(0.0);
        apps >= self.min_appearances && minutes >= self.min_minutes
    }

    /// Keep rows of `target` whose player clears the threshold in `reference`.
    /// With `own_filter_only`, `reference` is ignored and the target's own
    /// participation columns are used instead.
    pub fn filter_eligible(
        &self,
        target: &StatTable,
        reference: &StatTable,
        own_filter_only: bool,
    ) -> Result<StatTable> {
        if own_filter_only {
            require_threshold_columns(target)?;
            let records = target
                .records
                .iter()
                .filter(|r| self.passes(r))
                .cloned()
                .collect();
            return Ok(target.with_records(records));
        }

        let eligible = self.eligible_players(reference)?;
        if !target.has_column(PLAYER_COLUMN) {
            return Err(StatsError::parse("target table has no `Player` column"));
        }
        let records = target
            .records
            .iter()
            .filter(|r| r.player().is_some_and(|name| eligible.contains(name)))
            .cloned()
            .collect();
        Ok(target.with_records(records))
    }

    pub fn eligible_players<'a>(&self, reference: &'a StatTable) -> Result<HashSet<&'a str>> {
        require_threshold_columns(reference)?;
        Ok(reference
            .records
            .iter()
            .filter(|r| self.passes(r))
            .filter_map(StatRecord::player)
            .collect())
    }
}

/// Filter with the default threshold.
pub fn filter_eligible(
    target: &StatTable,
    reference: &StatTable,
    own_filter_only: bool,
) -> Result<StatTable> {
    EligibilityThreshold::default().filter_eligible(target, reference, own_filter_only)
}

fn require_threshold_columns(table: &StatTable) -> Result<()> {
    for column in [APPEARANCES_COLUMN, MINUTES_COLUMN] {
        if !table.has_column(column) {
            return Err(StatsError::MissingReference {
                column: column.to_string(),
            });
        }
    }
    Ok(())
}
