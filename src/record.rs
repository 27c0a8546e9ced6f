use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::catalog::{League, PLAYER_COLUMN, SQUAD_COLUMN};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Value {
    Number(f64),
    Text(String),
}

impl Value {
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Value::Number(n) => Some(*n),
            Value::Text(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s.as_str()),
            Value::Number(_) => None,
        }
    }
}

/// One normalized table row, keyed by flattened column name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatRecord {
    values: BTreeMap<String, Value>,
}

impl StatRecord {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, value: Value) {
        self.values.insert(column.into(), value);
    }

    pub fn with(mut self, column: impl Into<String>, value: Value) -> Self {
        self.insert(column, value);
        self
    }

    pub fn get(&self, column: &str) -> Option<&Value> {
        self.values.get(column)
    }

    pub fn contains(&self, column: &str) -> bool {
        self.values.contains_key(column)
    }

    pub fn number(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(Value::as_number)
    }

    pub fn text(&self, column: &str) -> Option<&str> {
        self.get(column).and_then(Value::as_text)
    }

    /// Player name; the identity used for eligibility, dedup and exclusion.
    pub fn player(&self) -> Option<&str> {
        self.text(PLAYER_COLUMN)
    }

    pub fn squad(&self) -> Option<&str> {
        self.text(SQUAD_COLUMN)
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Access shared by plain and league-tagged rows, so the projector and the
/// ranker can work on either.
pub trait Record {
    fn record(&self) -> &StatRecord;

    fn identity(&self) -> Option<&str> {
        self.record().player()
    }
}

impl Record for StatRecord {
    fn record(&self) -> &StatRecord {
        self
    }
}

impl<T: Record + ?Sized> Record for &T {
    fn record(&self) -> &StatRecord {
        (**self).record()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatTable {
    /// Column names in source order; unique.
    pub columns: Vec<String>,
    pub records: Vec<StatRecord>,
}

impl StatTable {
    pub fn new(columns: Vec<String>, records: Vec<StatRecord>) -> Self {
        Self { columns, records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.columns.iter().any(|c| c == column)
    }

    /// Same columns, a subset of the rows.
    pub fn with_records(&self, records: Vec<StatRecord>) -> StatTable {
        StatTable {
            columns: self.columns.clone(),
            records,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeagueTaggedRecord {
    pub league: League,
    pub record: StatRecord,
}

impl Record for LeagueTaggedRecord {
    fn record(&self) -> &StatRecord {
        &self.record
    }
}

/// Cross-league union produced by the aggregator.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LeagueTable {
    pub columns: Vec<String>,
    pub records: Vec<LeagueTaggedRecord>,
}

impl LeagueTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn for_league(&self, league: League) -> impl Iterator<Item = &LeagueTaggedRecord> {
        self.records.iter().filter(move |r| r.league == league)
    }

    pub fn find_player(&self, player: &str) -> Option<&LeagueTaggedRecord> {
        self.records.iter().find(|r| r.record.player() == Some(player))
    }
}

/// Metric values for a fixed, ordered feature list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub features: Vec<String>,
    pub values: Vec<f64>,
}

impl FeatureVector {
    /// `None` when any feature is absent or non-numeric on the record.
    pub fn extract(record: &StatRecord, features: &[String]) -> Option<FeatureVector> {
        let values = features
            .iter()
            .map(|f| record.number(f))
            .collect::<Option<Vec<f64>>>()?;
        Some(FeatureVector {
            features: features.to_vec(),
            values,
        })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn feature_vector_requires_every_feature() {
        let record = StatRecord::new()
            .with("Player", Value::Text("A".into()))
            .with("Gls", Value::Number(3.0))
            .with("Ast", Value::Number(1.0));
        let features = vec!["Gls".to_string(), "Ast".to_string()];
        let vec = FeatureVector::extract(&record, &features).expect("all present");
        assert_eq!(vec.values, vec![3.0, 1.0]);

        let missing = vec!["Gls".to_string(), "xG".to_string()];
        assert!(FeatureVector::extract(&record, &missing).is_none());
        let text = vec!["Player".to_string()];
        assert!(FeatureVector::extract(&record, &text).is_none());
    }
}
