use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::record::{Record, StatRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarAxis {
    pub feature: String,
    /// `100 - top_pct`; higher always reads as better standing.
    pub magnitude: f64,
    /// "Top X%" position in the population.
    pub top_pct: f64,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PeerAxis {
    pub feature: String,
    /// Mean of the peers' magnitudes, not the magnitude of the mean value.
    pub magnitude: f64,
    pub mean_value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RadarProjection {
    pub subject: Vec<RadarAxis>,
    pub secondary: Option<Vec<RadarAxis>>,
    /// `None` when nobody but the subject(s) is in the population.
    pub peer: Option<Vec<PeerAxis>>,
}

/// Percentile projection of `subject` (and optionally `secondary`) against the
/// union of both with `peer_group`, deduplicated by player name.
///
/// Each feature is ranked ascending with min tie-breaking over the whole
/// population: `top_pct = (1 - rank / N) * 100`, magnitude `100 - top_pct`.
/// Stats where a lower value is better are not inverted.
pub fn project<S, P>(
    subject: &S,
    peer_group: &[P],
    features: &[String],
    secondary: Option<&S>,
) -> Option<RadarProjection>
where
    S: Record,
    P: Record,
{
    if features.is_empty() {
        return None;
    }

    let mut population: Vec<&StatRecord> = Vec::with_capacity(peer_group.len() + 2);
    let mut seen: HashSet<&str> = HashSet::new();
    let mut secondary_idx = None;
    push_unique(&mut population, &mut seen, subject.record());
    if let Some(other) = secondary {
        secondary_idx = Some(push_unique(&mut population, &mut seen, other.record()));
    }
    for peer in peer_group {
        push_unique(&mut population, &mut seen, peer.record());
    }
    let n = population.len();
    if n == 0 {
        return None;
    }

    let peer_idx: Vec<usize> = (0..n).filter(|i| *i != 0 && Some(*i) != secondary_idx).collect();

    let mut subject_axes = Vec::with_capacity(features.len());
    let mut secondary_axes = secondary_idx.map(|_| Vec::with_capacity(features.len()));
    let mut peer_axes = (!peer_idx.is_empty()).then(|| Vec::with_capacity(features.len()));

    for feature in features {
        let values: Vec<f64> = population.iter().map(|r| feature_value(r, feature)).collect();
        let top = top_percentiles(&values);

        subject_axes.push(axis(feature, values[0], top[0]));
        if let (Some(idx), Some(out)) = (secondary_idx, secondary_axes.as_mut()) {
            out.push(axis(feature, values[idx], top[idx]));
        }
        if let Some(out) = peer_axes.as_mut() {
            let count = peer_idx.len() as f64;
            let magnitude = peer_idx.iter().map(|i| 100.0 - top[*i]).sum::<f64>() / count;
            let mean_value = peer_idx.iter().map(|i| values[*i]).sum::<f64>() / count;
            out.push(PeerAxis {
                feature: feature.clone(),
                magnitude,
                mean_value,
            });
        }
    }

    Some(RadarProjection {
        subject: subject_axes,
        secondary: secondary_axes,
        peer: peer_axes,
    })
}

/// Index of `record` in the population; an already present player resolves to
/// the earlier entry.
fn push_unique<'a>(
    population: &mut Vec<&'a StatRecord>,
    seen: &mut HashSet<&'a str>,
    record: &'a StatRecord,
) -> usize {
    if let Some(name) = record.player()
        && !seen.insert(name)
    {
        return population
            .iter()
            .position(|r| r.player() == Some(name))
            .unwrap_or_default();
    }
    population.push(record);
    population.len() - 1
}

fn feature_value(record: &StatRecord, feature: &str) -> f64 {
    record.number(feature).unwrap_or(0.0)
}

fn axis(feature: &str, value: f64, top_pct: f64) -> RadarAxis {
    RadarAxis {
        feature: feature.to_string(),
        magnitude: 100.0 - top_pct,
        top_pct,
        value,
    }
}

/// Ascending min-rank (1-based, ties share the lowest ordinal) per value.
pub fn min_ranks(values: &[f64]) -> Vec<usize> {
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    values
        .iter()
        .map(|v| sorted.partition_point(|s| s.total_cmp(v).is_lt()) + 1)
        .collect()
}

pub fn top_percentiles(values: &[f64]) -> Vec<f64> {
    let n = values.len() as f64;
    min_ranks(values)
        .into_iter()
        .map(|rank| (1.0 - rank as f64 / n) * 100.0)
        .collect()
}
