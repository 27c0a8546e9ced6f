use std::collections::BTreeMap;

use log::{debug, warn};
use rayon::prelude::*;

use crate::aggregate::{Aggregate, aggregate};
use crate::catalog::{EligibilitySource, League, Level, Season, StatType};
use crate::config::Settings;
use crate::eligibility::EligibilityThreshold;
use crate::error::Result;
use crate::fetch::{PageSource, TableRequest};
use crate::normalize::normalize;
use crate::record::StatTable;

/// fetch → normalize → eligibility filter, per league, plus the cross-league
/// union. Holds no mutable state; every call recomputes from the source.
pub struct StatsPipeline<S> {
    source: S,
    threshold: EligibilityThreshold,
    parallelism: usize,
}

impl<S: PageSource> StatsPipeline<S> {
    pub fn new(source: S, settings: &Settings) -> Self {
        Self {
            source,
            threshold: settings.threshold,
            parallelism: settings.fetch_parallelism,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn load_table(
        &self,
        level: Level,
        stat: StatType,
        season: Season,
        league: League,
    ) -> Result<StatTable> {
        match level {
            Level::Player => self.player_table(stat, season, league),
            Level::Team => self.team_table(stat, season, league),
        }
    }

    /// Player-level table filtered by the participation threshold of its
    /// eligibility source.
    pub fn player_table(&self, stat: StatType, season: Season, league: League) -> Result<StatTable> {
        let identity = Level::Player.identity_columns();
        let target = self.normalized(&TableRequest::player(stat, season, league), identity)?;
        match stat.eligibility_source() {
            EligibilitySource::Own => self.threshold.filter_eligible(&target, &target, true),
            EligibilitySource::Table(reference_stat) => {
                let reference = self.normalized(
                    &TableRequest::player(reference_stat, season, league),
                    identity,
                )?;
                self.threshold.filter_eligible(&target, &reference, false)
            }
        }
    }

    /// Squad-level table; no participation filter applies.
    pub fn team_table(&self, stat: StatType, season: Season, league: League) -> Result<StatTable> {
        self.normalized(
            &TableRequest::team(stat, season, league),
            Level::Team.identity_columns(),
        )
    }

    /// Player tables of all eight leagues, loaded side by side and unioned.
    /// A league that fails is reported in `Aggregate::skipped`.
    pub fn all_leagues(&self, stat: StatType, season: Season) -> Result<Aggregate> {
        let loaded: Vec<(League, Result<StatTable>)> = with_pool(self.parallelism, || {
            League::ALL
                .par_iter()
                .map(|league| (*league, self.player_table(stat, season, *league)))
                .collect()
        });
        let per_league: BTreeMap<League, Result<StatTable>> = loaded.into_iter().collect();
        aggregate(per_league, Level::Player.identity_columns())
    }

    fn normalized(&self, request: &TableRequest, identity: &[&str]) -> Result<StatTable> {
        let markup = self.source.fetch_table(request)?;
        let table = normalize(&markup, identity)?;
        debug!(
            "{} {} {} {:?}: {} rows, {} columns",
            request.league,
            request.season,
            request.stat,
            request.level,
            table.len(),
            table.columns.len()
        );
        Ok(table)
    }
}

fn with_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new().num_threads(threads).build() {
        Ok(pool) => pool.install(action),
        Err(err) => {
            warn!("fetch pool unavailable, loading on the current pool: {err}");
            action()
        }
    }
}
