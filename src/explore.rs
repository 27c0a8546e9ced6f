use std::collections::BTreeSet;

use serde::Serialize;

use crate::aggregate::Aggregate;
use crate::catalog::{League, LeagueGroup, PLAYER_COLUMN, PLAYER_IDENTITY_COLUMNS, SQUAD_COLUMN};
use crate::error::{Result, StatsError};
use crate::radar::{RadarProjection, project};
use crate::record::{FeatureVector, LeagueTable, LeagueTaggedRecord, StatRecord, StatTable};
use crate::similarity::{SimilarityResult, rank};

const DEFAULT_FEATURE_COUNT: usize = 5;

pub fn squads(table: &StatTable) -> Vec<String> {
    unique_text(table, SQUAD_COLUMN)
}

pub fn players(table: &StatTable) -> Vec<String> {
    unique_text(table, PLAYER_COLUMN)
}

fn unique_text(table: &StatTable, column: &str) -> Vec<String> {
    table
        .records
        .iter()
        .filter_map(|r| r.text(column))
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

pub fn filter_squad(table: &StatTable, squad: &str) -> StatTable {
    filter_text(table, SQUAD_COLUMN, squad)
}

pub fn filter_player(table: &StatTable, player: &str) -> StatTable {
    filter_text(table, PLAYER_COLUMN, player)
}

fn filter_text(table: &StatTable, column: &str, wanted: &str) -> StatTable {
    let records = table
        .records
        .iter()
        .filter(|r| r.text(column) == Some(wanted))
        .cloned()
        .collect();
    table.with_records(records)
}

/// Metric columns in table order. A column counts as metric when every
/// record holds a number for it.
pub fn numeric_columns(columns: &[String], records: &[&StatRecord]) -> Vec<String> {
    columns
        .iter()
        .filter(|c| !PLAYER_IDENTITY_COLUMNS.contains(&c.as_str()))
        .filter(|c| records.iter().all(|r| r.get(c).is_none_or(|v| v.as_number().is_some())))
        .cloned()
        .collect()
}

pub fn table_numeric_columns(table: &StatTable) -> Vec<String> {
    let records: Vec<&StatRecord> = table.records.iter().collect();
    numeric_columns(&table.columns, &records)
}

pub fn league_numeric_columns(table: &LeagueTable) -> Vec<String> {
    let records: Vec<&StatRecord> = table.records.iter().map(|r| &r.record).collect();
    numeric_columns(&table.columns, &records)
}

/// First few metric columns, the radar's initial feature selection.
pub fn default_features(numeric: &[String]) -> Vec<String> {
    numeric.iter().take(DEFAULT_FEATURE_COUNT).cloned().collect()
}

pub fn peer_group(table: &LeagueTable, group: LeagueGroup) -> Vec<&LeagueTaggedRecord> {
    table
        .records
        .iter()
        .filter(|r| group.contains(r.league))
        .collect()
}

fn find_player<'a>(table: &'a LeagueTable, player: &str) -> Result<&'a LeagueTaggedRecord> {
    table
        .find_player(player)
        .ok_or_else(|| StatsError::PlayerNotFound {
            player: player.to_string(),
        })
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupSimilarity {
    pub group: String,
    pub results: Vec<SimilarityResult<LeagueTaggedRecord>>,
}

/// Players in `group` most similar to `player` over `features`.
pub fn similar_players(
    aggregate: &Aggregate,
    player: &str,
    features: &[String],
    group: LeagueGroup,
    top_n: usize,
) -> Result<Vec<SimilarityResult<LeagueTaggedRecord>>> {
    let subject = find_player(&aggregate.table, player)?;
    let Some(vector) = FeatureVector::extract(&subject.record, features) else {
        return Ok(Vec::new());
    };
    let candidates = peer_group(&aggregate.table, group);
    Ok(rank(&vector, &candidates, Some(player), top_n)
        .into_iter()
        .map(|r| SimilarityResult {
            candidate: r.candidate.clone(),
            score: r.score,
        })
        .collect())
}

/// Similar players for the player's own league, the big five, the other
/// three and all eight leagues. Groups without a result are left out.
pub fn similar_across_groups(
    aggregate: &Aggregate,
    player: &str,
    home: League,
    features: &[String],
    top_n: usize,
) -> Result<Vec<GroupSimilarity>> {
    let mut out = Vec::new();
    for group in LeagueGroup::standard_groups(home) {
        let results = similar_players(aggregate, player, features, group, top_n)?;
        if results.is_empty() {
            continue;
        }
        out.push(GroupSimilarity {
            group: group.name(),
            results,
        });
    }
    Ok(out)
}

/// Radar of `player` against `group`, optionally overlaying `other`.
pub fn compare(
    aggregate: &Aggregate,
    player: &str,
    other: Option<&str>,
    group: LeagueGroup,
    features: &[String],
) -> Result<Option<RadarProjection>> {
    let subject = find_player(&aggregate.table, player)?;
    let secondary = other
        .map(|name| find_player(&aggregate.table, name))
        .transpose()?;
    let peers = peer_group(&aggregate.table, group);
    Ok(project(&subject, &peers, features, secondary.as_ref()))
}
