use std::collections::{BTreeMap, HashSet};

use log::{info, warn};

use crate::catalog::League;
use crate::error::{Result, SkippedLeague, StatsError};
use crate::record::{LeagueTable, LeagueTaggedRecord, StatTable, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Aggregate {
    pub table: LeagueTable,
    pub skipped: Vec<SkippedLeague>,
}

/// Union per-league tables into one league-tagged table.
///
/// Leagues whose load failed are logged and listed in `skipped`; only when
/// every league failed does the call itself fail. Columns are the union of the
/// per-league columns in first-seen order. A record that lacks a metric column
/// gets `0` for it, a missing identity column stays absent.
pub fn aggregate(
    per_league: BTreeMap<League, Result<StatTable>>,
    identity_columns: &[&str],
) -> Result<Aggregate> {
    let mut tables = Vec::new();
    let mut skipped = Vec::new();
    for (league, loaded) in per_league {
        match loaded {
            Ok(table) => tables.push((league, table)),
            Err(error) => {
                warn!("skipped {league}: {error}");
                skipped.push(SkippedLeague { league, error });
            }
        }
    }
    if tables.is_empty() {
        return Err(StatsError::NoData);
    }

    let mut columns: Vec<String> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for (_, table) in &tables {
        for column in &table.columns {
            if seen.insert(column.as_str()) {
                columns.push(column.clone());
            }
        }
    }
    let metric_columns: Vec<&String> = columns
        .iter()
        .filter(|c| !identity_columns.contains(&c.as_str()))
        .collect();

    let total = tables.iter().map(|(_, t)| t.len()).sum();
    let mut records = Vec::with_capacity(total);
    for (league, table) in &tables {
        for record in &table.records {
            let mut record = record.clone();
            for column in &metric_columns {
                if !record.contains(column) {
                    record.insert(column.as_str(), Value::Number(0.0));
                }
            }
            records.push(LeagueTaggedRecord {
                league: *league,
                record,
            });
        }
    }
    info!(
        "aggregated {} rows from {} leagues ({} skipped)",
        records.len(),
        tables.len(),
        skipped.len()
    );

    Ok(Aggregate {
        table: LeagueTable { columns, records },
        skipped,
    })
}
