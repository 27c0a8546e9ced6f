use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StatsError;

pub const PLAYER_IDENTITY_COLUMNS: &[&str] = &["Player", "Nation", "Pos", "Squad", "Age", "Born"];
pub const TEAM_IDENTITY_COLUMNS: &[&str] = &["Squad", "Country"];

pub const PLAYER_COLUMN: &str = "Player";
pub const SQUAD_COLUMN: &str = "Squad";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum League {
    #[serde(rename = "Premier League")]
    PremierLeague,
    #[serde(rename = "La Liga")]
    LaLiga,
    #[serde(rename = "Bundesliga")]
    Bundesliga,
    #[serde(rename = "Serie A")]
    SerieA,
    #[serde(rename = "Ligue 1")]
    Ligue1,
    #[serde(rename = "Eredivisie")]
    Eredivisie,
    #[serde(rename = "Primeira Liga")]
    PrimeiraLiga,
    #[serde(rename = "Belgian Pro League")]
    BelgianProLeague,
}

impl League {
    pub const ALL: [League; 8] = [
        League::PremierLeague,
        League::LaLiga,
        League::Bundesliga,
        League::SerieA,
        League::Ligue1,
        League::Eredivisie,
        League::PrimeiraLiga,
        League::BelgianProLeague,
    ];

    pub const BIG_FIVE: [League; 5] = [
        League::PremierLeague,
        League::LaLiga,
        League::Bundesliga,
        League::SerieA,
        League::Ligue1,
    ];

    pub const OTHER_THREE: [League; 3] = [
        League::Eredivisie,
        League::PrimeiraLiga,
        League::BelgianProLeague,
    ];

    pub fn name(self) -> &'static str {
        match self {
            League::PremierLeague => "Premier League",
            League::LaLiga => "La Liga",
            League::Bundesliga => "Bundesliga",
            League::SerieA => "Serie A",
            League::Ligue1 => "Ligue 1",
            League::Eredivisie => "Eredivisie",
            League::PrimeiraLiga => "Primeira Liga",
            League::BelgianProLeague => "Belgian Pro League",
        }
    }

    /// Competition id used in fbref URLs.
    pub fn fbref_id(self) -> u32 {
        match self {
            League::PremierLeague => 9,
            League::LaLiga => 12,
            League::Bundesliga => 20,
            League::SerieA => 11,
            League::Ligue1 => 13,
            League::Eredivisie => 23,
            League::PrimeiraLiga => 32,
            League::BelgianProLeague => 37,
        }
    }

    pub fn url_slug(self) -> String {
        self.name().replace(' ', "-")
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for League {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim().replace(['-', '_'], " ");
        League::ALL
            .into_iter()
            .find(|league| league.name().eq_ignore_ascii_case(&needle))
            .ok_or_else(|| StatsError::UnknownKey {
                kind: "league",
                value: raw.to_string(),
            })
    }
}

/// Which table decides whether a player clears the participation threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EligibilitySource {
    Own,
    Table(StatType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatType {
    Standard,
    Shooting,
    Passing,
    PassingTypes,
    Gca,
    Defense,
    Possession,
    #[serde(rename = "playingtime")]
    PlayingTime,
    Keepers,
    #[serde(rename = "keepersadv")]
    KeepersAdv,
}

impl StatType {
    pub const ALL: [StatType; 10] = [
        StatType::Standard,
        StatType::Shooting,
        StatType::Passing,
        StatType::PassingTypes,
        StatType::Gca,
        StatType::Defense,
        StatType::Possession,
        StatType::PlayingTime,
        StatType::Keepers,
        StatType::KeepersAdv,
    ];

    pub fn key(self) -> &'static str {
        match self {
            StatType::Standard => "standard",
            StatType::Shooting => "shooting",
            StatType::Passing => "passing",
            StatType::PassingTypes => "passing_types",
            StatType::Gca => "gca",
            StatType::Defense => "defense",
            StatType::Possession => "possession",
            StatType::PlayingTime => "playingtime",
            StatType::Keepers => "keepers",
            StatType::KeepersAdv => "keepersadv",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatType::Standard => "Standard",
            StatType::Shooting => "Shooting",
            StatType::Passing => "Passing",
            StatType::PassingTypes => "Pass Types",
            StatType::Gca => "Goal and Shot Creation",
            StatType::Defense => "Defensive Actions",
            StatType::Possession => "Possession",
            StatType::PlayingTime => "Playing Time",
            StatType::Keepers => "Goalkeeping",
            StatType::KeepersAdv => "Goalkeeping Advanced",
        }
    }

    pub fn url_segment(self) -> &'static str {
        match self {
            StatType::Standard => "stats",
            other => other.key(),
        }
    }

    /// `id` attribute of the player-level table on the stat page.
    pub fn table_id(self) -> String {
        match self {
            StatType::Standard => "stats_standard".to_string(),
            StatType::PlayingTime => "stats_playing_time".to_string(),
            StatType::Keepers => "stats_keeper".to_string(),
            StatType::KeepersAdv => "stats_keeper_adv".to_string(),
            other => format!("stats_{}", other.key()),
        }
    }

    pub fn eligibility_source(self) -> EligibilitySource {
        match self {
            StatType::Standard | StatType::Keepers => EligibilitySource::Own,
            StatType::KeepersAdv => EligibilitySource::Table(StatType::Keepers),
            _ => EligibilitySource::Table(StatType::Standard),
        }
    }
}

impl fmt::Display for StatType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for StatType {
    type Err = StatsError;

    /// Accepts either the key (`passing_types`) or the display label
    /// (`Pass Types`).
    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        StatType::ALL
            .into_iter()
            .find(|st| st.key() == needle || st.label().eq_ignore_ascii_case(needle))
            .ok_or_else(|| StatsError::UnknownKey {
                kind: "stat type",
                value: raw.to_string(),
            })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Season {
    start_year: u16,
}

impl Season {
    pub const SUPPORTED: [Season; 4] = [
        Season { start_year: 2024 },
        Season { start_year: 2023 },
        Season { start_year: 2022 },
        Season { start_year: 2021 },
    ];

    pub fn latest() -> Season {
        Season::SUPPORTED[0]
    }

    pub fn start_year(self) -> u16 {
        self.start_year
    }

    /// `YYYY-YYYY` form used in URLs and labels.
    pub fn label(self) -> String {
        format!("{}-{}", self.start_year, self.start_year + 1)
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for Season {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        Season::SUPPORTED
            .into_iter()
            .find(|season| season.label() == trimmed)
            .ok_or_else(|| StatsError::UnknownKey {
                kind: "season",
                value: raw.to_string(),
            })
    }
}

impl TryFrom<String> for Season {
    type Error = StatsError;

    fn try_from(raw: String) -> Result<Self, Self::Error> {
        raw.parse()
    }
}

impl From<Season> for String {
    fn from(season: Season) -> Self {
        season.label()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Level {
    Player,
    Team,
}

impl Level {
    pub fn identity_columns(self) -> &'static [&'static str] {
        match self {
            Level::Player => PLAYER_IDENTITY_COLUMNS,
            Level::Team => TEAM_IDENTITY_COLUMNS,
        }
    }
}

impl FromStr for Level {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_lowercase().as_str() {
            "player" => Ok(Level::Player),
            "team" => Ok(Level::Team),
            _ => Err(StatsError::UnknownKey {
                kind: "level",
                value: raw.to_string(),
            }),
        }
    }
}

/// Peer population used for percentile and similarity comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LeagueGroup {
    Single(League),
    BigFive,
    OtherThree,
    AllEight,
}

impl LeagueGroup {
    /// Groups the explorer walks for a player whose own league is `home`.
    pub fn standard_groups(home: League) -> [LeagueGroup; 4] {
        [
            LeagueGroup::Single(home),
            LeagueGroup::BigFive,
            LeagueGroup::OtherThree,
            LeagueGroup::AllEight,
        ]
    }

    pub fn leagues(self) -> &'static [League] {
        match self {
            LeagueGroup::Single(league) => single_slice(league),
            LeagueGroup::BigFive => &League::BIG_FIVE,
            LeagueGroup::OtherThree => &League::OTHER_THREE,
            LeagueGroup::AllEight => &League::ALL,
        }
    }

    pub fn contains(self, league: League) -> bool {
        self.leagues().contains(&league)
    }

    pub fn name(self) -> String {
        match self {
            LeagueGroup::Single(league) => league.name().to_string(),
            LeagueGroup::BigFive => "Big 5 Leagues".to_string(),
            LeagueGroup::OtherThree => "Eredivisie/Primeira Liga/Belgian Pro League".to_string(),
            LeagueGroup::AllEight => "All 8 Leagues".to_string(),
        }
    }
}

impl fmt::Display for LeagueGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

impl FromStr for LeagueGroup {
    type Err = StatsError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let needle = raw.trim();
        match needle.to_lowercase().as_str() {
            "big5" | "big 5" | "big 5 leagues" => return Ok(LeagueGroup::BigFive),
            "other3" | "other 3" | "eredivisie/primeira liga/belgian pro league" => {
                return Ok(LeagueGroup::OtherThree);
            }
            "all" | "all8" | "all 8" | "all 8 leagues" => return Ok(LeagueGroup::AllEight),
            _ => {}
        }
        needle
            .parse::<League>()
            .map(LeagueGroup::Single)
            .map_err(|_| StatsError::UnknownKey {
                kind: "league group",
                value: raw.to_string(),
            })
    }
}

static LEAGUES: [League; 8] = League::ALL;

fn single_slice(league: League) -> &'static [League] {
    match league {
        League::PremierLeague => &LEAGUES[0..1],
        League::LaLiga => &LEAGUES[1..2],
        League::Bundesliga => &LEAGUES[2..3],
        League::SerieA => &LEAGUES[3..4],
        League::Ligue1 => &LEAGUES[4..5],
        League::Eredivisie => &LEAGUES[5..6],
        League::PrimeiraLiga => &LEAGUES[6..7],
        League::BelgianProLeague => &LEAGUES[7..8],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stat_type_table_ids_follow_site_naming() {
        assert_eq!(StatType::Standard.table_id(), "stats_standard");
        assert_eq!(StatType::PlayingTime.table_id(), "stats_playing_time");
        assert_eq!(StatType::Keepers.table_id(), "stats_keeper");
        assert_eq!(StatType::KeepersAdv.table_id(), "stats_keeper_adv");
        assert_eq!(StatType::PassingTypes.table_id(), "stats_passing_types");
        assert_eq!(StatType::Standard.url_segment(), "stats");
        assert_eq!(StatType::Gca.url_segment(), "gca");
    }

    #[test]
    fn eligibility_source_per_stat_type() {
        assert_eq!(StatType::Standard.eligibility_source(), EligibilitySource::Own);
        assert_eq!(StatType::Keepers.eligibility_source(), EligibilitySource::Own);
        assert_eq!(
            StatType::KeepersAdv.eligibility_source(),
            EligibilitySource::Table(StatType::Keepers)
        );
        assert_eq!(
            StatType::Possession.eligibility_source(),
            EligibilitySource::Table(StatType::Standard)
        );
    }

    #[test]
    fn parses_keys_and_labels() {
        assert_eq!("Pass Types".parse::<StatType>().unwrap(), StatType::PassingTypes);
        assert_eq!("keepersadv".parse::<StatType>().unwrap(), StatType::KeepersAdv);
        assert_eq!("serie-a".parse::<League>().unwrap(), League::SerieA);
        assert_eq!("2022-2023".parse::<Season>().unwrap().start_year(), 2022);
        assert!("2019-2020".parse::<Season>().is_err());
        assert!("Championship".parse::<League>().is_err());
    }

    #[test]
    fn single_league_group_holds_exactly_that_league() {
        for league in League::ALL {
            assert_eq!(LeagueGroup::Single(league).leagues(), &[league]);
        }
    }

    #[test]
    fn league_groups_cover_expected_leagues() {
        assert_eq!(LeagueGroup::Single(League::Ligue1).leagues(), &[League::Ligue1]);
        assert!(LeagueGroup::BigFive.contains(League::SerieA));
        assert!(!LeagueGroup::BigFive.contains(League::Eredivisie));
        assert_eq!(LeagueGroup::AllEight.leagues().len(), 8);
        assert_eq!("Big 5 Leagues".parse::<LeagueGroup>().unwrap(), LeagueGroup::BigFive);
        assert_eq!(League::BelgianProLeague.url_slug(), "Belgian-Pro-League");
    }
}
