use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

use fbref_explorer::StatsError;
use fbref_explorer::aggregate::{Aggregate, aggregate};
use fbref_explorer::catalog::{League, LeagueGroup, PLAYER_IDENTITY_COLUMNS};
use fbref_explorer::explore::{
    compare, default_features, filter_player, filter_squad, league_numeric_columns, peer_group,
    players, similar_across_groups, similar_players, squads, table_numeric_columns,
};
use fbref_explorer::normalize::normalize;
use fbref_explorer::record::{StatRecord, StatTable, Value};

fn read_fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    fs::read_to_string(path).expect("fixture file should be readable")
}

fn player(name: &str, gls: f64, ast: f64) -> StatRecord {
    StatRecord::new()
        .with("Player", Value::Text(name.to_string()))
        .with("Squad", Value::Text(format!("{name} FC")))
        .with("Gls", Value::Number(gls))
        .with("Ast", Value::Number(ast))
}

fn table(records: Vec<StatRecord>) -> StatTable {
    StatTable::new(
        vec![
            "Player".to_string(),
            "Squad".to_string(),
            "Gls".to_string(),
            "Ast".to_string(),
        ],
        records,
    )
}

/// S and A in the Premier League, B in La Liga, C in the Eredivisie.
fn sample() -> Aggregate {
    let mut per_league = BTreeMap::new();
    per_league.insert(
        League::PremierLeague,
        Ok(table(vec![player("S", 1.0, 0.0), player("A", 1.0, 0.1)])),
    );
    per_league.insert(League::LaLiga, Ok(table(vec![player("B", 0.0, 1.0)])));
    per_league.insert(League::Eredivisie, Ok(table(vec![player("C", 1.0, 0.5)])));
    aggregate(per_league, PLAYER_IDENTITY_COLUMNS).expect("sample aggregates")
}

fn features() -> Vec<String> {
    vec!["Gls".to_string(), "Ast".to_string()]
}

fn approx(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn lists_and_filters_squads_and_players() {
    let standard = normalize(&read_fixture("standard_table.html"), PLAYER_IDENTITY_COLUMNS)
        .expect("fixture should normalize");
    assert_eq!(squads(&standard), vec!["Arsenal", "Chelsea", "Everton"]);
    assert_eq!(players(&standard).len(), 5);

    let arsenal = filter_squad(&standard, "Arsenal");
    assert_eq!(arsenal.len(), 2);
    assert_eq!(arsenal.columns, standard.columns);
    assert_eq!(filter_player(&standard, "Delta Back").len(), 1);
    assert!(filter_player(&standard, "Nobody").is_empty());
}

#[test]
fn numeric_columns_skip_identity() {
    let standard = normalize(&read_fixture("standard_table.html"), PLAYER_IDENTITY_COLUMNS)
        .expect("fixture should normalize");
    let numeric = table_numeric_columns(&standard);
    assert_eq!(numeric.len(), 6);
    assert_eq!(numeric[0], "Playing Time_MP");
    assert_eq!(
        default_features(&numeric),
        vec![
            "Playing Time_MP",
            "Playing Time_Starts",
            "Playing Time_Min",
            "Playing Time_90s",
            "Performance_Gls",
        ]
    );
    assert_eq!(league_numeric_columns(&sample().table), features());
}

#[test]
fn peer_groups_follow_league_membership() {
    let sample = sample();
    assert_eq!(peer_group(&sample.table, LeagueGroup::Single(League::PremierLeague)).len(), 2);
    assert_eq!(peer_group(&sample.table, LeagueGroup::BigFive).len(), 3);
    assert_eq!(peer_group(&sample.table, LeagueGroup::OtherThree).len(), 1);
    assert_eq!(peer_group(&sample.table, LeagueGroup::AllEight).len(), 4);
}

#[test]
fn similar_players_within_a_group() {
    let sample = sample();
    let results = similar_players(&sample, "S", &features(), LeagueGroup::BigFive, 2)
        .expect("player present");
    let found: Vec<(&str, League)> = results
        .iter()
        .filter_map(|r| r.candidate.record.player().map(|p| (p, r.candidate.league)))
        .collect();
    assert_eq!(found, vec![("A", League::PremierLeague), ("B", League::LaLiga)]);
    assert!(approx(results[0].score, 1.0 / 1.01_f64.sqrt()));
    assert!(approx(results[1].score, 0.0));
}

#[test]
fn similar_players_across_standard_groups() {
    let sample = sample();
    let groups = similar_across_groups(&sample, "S", League::PremierLeague, &features(), 3)
        .expect("player present");
    let summary: Vec<(String, Vec<&str>)> = groups
        .iter()
        .map(|g| {
            (
                g.group.clone(),
                g.results
                    .iter()
                    .filter_map(|r| r.candidate.record.player())
                    .collect(),
            )
        })
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Premier League".to_string(), vec!["A"]),
            ("Big 5 Leagues".to_string(), vec!["A", "B"]),
            (
                "Eredivisie/Primeira Liga/Belgian Pro League".to_string(),
                vec!["C"]
            ),
            ("All 8 Leagues".to_string(), vec!["A", "C", "B"]),
        ]
    );
}

#[test]
fn groups_without_candidates_are_left_out() {
    let sample = sample();
    let groups = similar_across_groups(&sample, "C", League::Eredivisie, &features(), 3)
        .expect("player present");
    let names: Vec<&str> = groups.iter().map(|g| g.group.as_str()).collect();
    assert_eq!(names, vec!["Big 5 Leagues", "All 8 Leagues"]);
}

#[test]
fn compare_projects_subject_secondary_and_peers() {
    let sample = sample();
    let projection = compare(&sample, "S", Some("C"), LeagueGroup::AllEight, &features())
        .expect("players present")
        .expect("features selected");

    // Gls over {S, C, A, B} = [1, 1, 1, 0]; Ast = [0, 0.5, 0.1, 1].
    assert!(approx(projection.subject[0].magnitude, 50.0));
    assert!(approx(projection.subject[1].magnitude, 25.0));
    let secondary = projection.secondary.expect("secondary present");
    assert!(approx(secondary[1].magnitude, 75.0));
    let peer = projection.peer.expect("peers present");
    assert!(approx(peer[0].magnitude, 37.5));
    assert!(approx(peer[0].mean_value, 0.5));
    assert!(approx(peer[1].magnitude, 75.0));
    assert!(approx(peer[1].mean_value, 0.55));
}

#[test]
fn unknown_players_are_reported() {
    let sample = sample();
    assert_eq!(
        compare(&sample, "Nobody", None, LeagueGroup::AllEight, &features()).unwrap_err(),
        StatsError::PlayerNotFound {
            player: "Nobody".to_string()
        }
    );
    assert!(matches!(
        compare(&sample, "S", Some("Ghost"), LeagueGroup::AllEight, &features()),
        Err(StatsError::PlayerNotFound { .. })
    ));
    assert!(matches!(
        similar_players(&sample, "Nobody", &features(), LeagueGroup::BigFive, 3),
        Err(StatsError::PlayerNotFound { .. })
    ));
}

#[test]
fn compare_without_features_has_no_projection() {
    let sample = sample();
    let projection = compare(&sample, "S", None, LeagueGroup::BigFive, &[]).expect("present");
    assert!(projection.is_none());
}
