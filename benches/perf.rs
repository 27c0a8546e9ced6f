use std::collections::BTreeMap;

use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use fbref_explorer::aggregate::aggregate;
use fbref_explorer::catalog::{League, PLAYER_IDENTITY_COLUMNS};
use fbref_explorer::eligibility::filter_eligible;
use fbref_explorer::normalize::normalize;
use fbref_explorer::radar::project;
use fbref_explorer::record::{FeatureVector, StatRecord, StatTable, Value};
use fbref_explorer::similarity::rank;

const FEATURES: [&str; 5] = ["Gls", "Ast", "xG", "xAG", "PrgC"];

fn synthetic_player(idx: usize) -> StatRecord {
    let mut record = StatRecord::new()
        .with("Player", Value::Text(format!("Player {idx}")))
        .with("Squad", Value::Text(format!("Club {}", idx % 20)));
    for (offset, feature) in FEATURES.iter().enumerate() {
        let value = ((idx * 7 + offset * 13) % 41) as f64 / 4.0;
        record.insert(*feature, Value::Number(value));
    }
    record
}

fn synthetic_table(start: usize, players: usize) -> StatTable {
    let mut columns = vec!["Player".to_string(), "Squad".to_string()];
    columns.extend(FEATURES.iter().map(|f| f.to_string()));
    StatTable::new(columns, (start..start + players).map(synthetic_player).collect())
}

fn features() -> Vec<String> {
    FEATURES.iter().map(|f| f.to_string()).collect()
}

fn bench_normalize_standard(c: &mut Criterion) {
    c.bench_function("normalize_standard", |b| {
        b.iter(|| {
            let table = normalize(black_box(STANDARD_HTML), PLAYER_IDENTITY_COLUMNS).unwrap();
            black_box(table.len());
        })
    });
}

fn bench_eligibility_filter(c: &mut Criterion) {
    let standard = normalize(STANDARD_HTML, PLAYER_IDENTITY_COLUMNS).unwrap();
    let gca = normalize(GCA_HTML, PLAYER_IDENTITY_COLUMNS).unwrap();
    c.bench_function("eligibility_filter", |b| {
        b.iter(|| {
            let filtered = filter_eligible(black_box(&gca), black_box(&standard), false).unwrap();
            black_box(filtered.len());
        })
    });
}

fn bench_aggregate_eight_leagues(c: &mut Criterion) {
    c.bench_function("aggregate_eight_leagues", |b| {
        b.iter(|| {
            let per_league: BTreeMap<League, fbref_explorer::Result<StatTable>> = League::ALL
                .iter()
                .enumerate()
                .map(|(idx, league)| (*league, Ok(synthetic_table(idx * 500, 500))))
                .collect();
            let result = aggregate(per_league, PLAYER_IDENTITY_COLUMNS).unwrap();
            black_box(result.table.len());
        })
    });
}

fn bench_similarity_rank(c: &mut Criterion) {
    let population = synthetic_table(0, 4_000).records;
    let features = features();
    let subject = FeatureVector::extract(&population[17], &features).unwrap();
    c.bench_function("similarity_rank", |b| {
        b.iter(|| {
            let results = rank(black_box(&subject), &population, Some("Player 17"), 3);
            black_box(results.len());
        })
    });
}

fn bench_radar_projection(c: &mut Criterion) {
    let population = synthetic_table(0, 2_500).records;
    let features = features();
    c.bench_function("radar_projection", |b| {
        b.iter(|| {
            let projection = project(
                black_box(&population[3]),
                &population,
                &features,
                Some(&population[9]),
            )
            .unwrap();
            black_box(projection.subject.len());
        })
    });
}

criterion_group!(
    perf,
    bench_normalize_standard,
    bench_eligibility_filter,
    bench_aggregate_eight_leagues,
    bench_similarity_rank,
    bench_radar_projection
);
criterion_main!(perf);

static STANDARD_HTML: &str = include_str!("../tests/fixtures/standard_table.html");
static GCA_HTML: &str = include_str!("../tests/fixtures/gca_table.html");
