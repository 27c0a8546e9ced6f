use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use env_logger::Env;
use log::info;
use serde::Serialize;

use fbref_explorer::catalog::{League, LeagueGroup, Level, Season, StatType};
use fbref_explorer::config::Settings;
use fbref_explorer::explore;
use fbref_explorer::export::{export_aggregate, export_table};
use fbref_explorer::fetch::FbrefSource;
use fbref_explorer::pipeline::StatsPipeline;
use fbref_explorer::similarity::DEFAULT_TOP_N;

const USAGE: &str = "usage: fbref_explorer <table|leagues|similar|compare> [options]
  --stat=<key>        standard, shooting, passing, passing_types, gca, defense,
                      possession, playingtime, keepers, keepersadv
  --season=<YYYY-YYYY>
  --league=<name>     table only
  --level=<player|team>
  --squad=<name> --player=<name> --other=<name>
  --group=<league|big5|other3|all>
  --features=<col,col,...> --top=<n>
  --xlsx=<path>       write a workbook instead of printing json";

fn main() -> Result<()> {
    let settings = Settings::load();
    env_logger::Builder::from_env(Env::default().default_filter_or("warn")).init();

    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let Some(command) = args.first().cloned() else {
        println!("{USAGE}");
        return Ok(());
    };
    let opts = Options::parse(&args[1..])?;
    let pipeline = StatsPipeline::new(FbrefSource::new(&settings), &settings);

    match command.as_str() {
        "table" => run_table(&pipeline, &opts),
        "leagues" => run_leagues(&pipeline, &opts),
        "similar" => run_similar(&pipeline, &opts),
        "compare" => run_compare(&pipeline, &opts),
        "help" | "--help" | "-h" => {
            println!("{USAGE}");
            Ok(())
        }
        other => Err(anyhow!("unknown command `{other}`\n{USAGE}")),
    }
}

struct Options {
    stat: StatType,
    season: Season,
    league: Option<League>,
    level: Level,
    squad: Option<String>,
    player: Option<String>,
    other: Option<String>,
    group: Option<LeagueGroup>,
    features: Vec<String>,
    top: usize,
    xlsx: Option<PathBuf>,
}

impl Options {
    fn parse(args: &[String]) -> Result<Self> {
        let stat = match arg_value(args, "stat") {
            Some(raw) => raw.parse::<StatType>()?,
            None => StatType::Standard,
        };
        let season = match arg_value(args, "season") {
            Some(raw) => raw.parse::<Season>()?,
            None => Season::latest(),
        };
        let level = match arg_value(args, "level") {
            Some(raw) => raw.parse::<Level>()?,
            None => Level::Player,
        };
        let league = arg_value(args, "league")
            .map(|raw| raw.parse::<League>())
            .transpose()?;
        let group = arg_value(args, "group")
            .map(|raw| raw.parse::<LeagueGroup>())
            .transpose()?;
        let features = arg_value(args, "features")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|f| !f.is_empty())
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .unwrap_or_default();
        let top = arg_value(args, "top")
            .and_then(|raw| raw.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_TOP_N)
            .max(1);
        Ok(Self {
            stat,
            season,
            league,
            level,
            squad: arg_value(args, "squad"),
            player: arg_value(args, "player"),
            other: arg_value(args, "other"),
            group,
            features,
            top,
            xlsx: arg_value(args, "xlsx").map(PathBuf::from),
        })
    }

    fn require_player(&self) -> Result<&str> {
        self.player.as_deref().context("--player is required")
    }
}

/// `--name=value` or `--name value`.
fn arg_value(args: &[String], name: &str) -> Option<String> {
    let flag = format!("--{name}");
    let prefix = format!("{flag}=");
    for (idx, arg) in args.iter().enumerate() {
        if let Some(raw) = arg.strip_prefix(&prefix) {
            let trimmed = raw.trim();
            if !trimmed.is_empty() {
                return Some(trimmed.to_string());
            }
        }
        if *arg == flag
            && let Some(next) = args.get(idx + 1)
            && !next.trim().is_empty()
        {
            return Some(next.trim().to_string());
        }
    }
    None
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("serialize output")?;
    println!("{json}");
    Ok(())
}

fn run_table(pipeline: &StatsPipeline<FbrefSource>, opts: &Options) -> Result<()> {
    let league = opts.league.context("--league is required for `table`")?;
    let mut table = pipeline.load_table(opts.level, opts.stat, opts.season, league)?;
    if let Some(squad) = opts.squad.as_deref() {
        table = explore::filter_squad(&table, squad);
    }
    if opts.level == Level::Player
        && let Some(player) = opts.player.as_deref()
    {
        table = explore::filter_player(&table, player);
    }
    info!("{} rows loaded", table.len());

    if let Some(path) = opts.xlsx.as_ref() {
        let title = format!("{} {} {} {:?}", opts.stat.label(), opts.season, league, opts.level);
        let report = export_table(path, &table, &title)?;
        println!("Wrote {} rows x {} columns to {}", report.rows, report.columns, path.display());
        return Ok(());
    }
    print_json(&table)
}

fn run_leagues(pipeline: &StatsPipeline<FbrefSource>, opts: &Options) -> Result<()> {
    let aggregate = pipeline.all_leagues(opts.stat, opts.season)?;
    for skipped in &aggregate.skipped {
        eprintln!("Skipped {} due to error: {}", skipped.league, skipped.error);
    }
    if let Some(path) = opts.xlsx.as_ref() {
        let title = format!("{} {} all leagues", opts.stat.label(), opts.season);
        let report = export_aggregate(path, &aggregate, &title)?;
        println!(
            "Wrote {} rows ({} leagues skipped) to {}",
            report.rows,
            report.skipped_leagues,
            path.display()
        );
        return Ok(());
    }
    print_json(&aggregate.table)
}

fn features_or_default(opts: &Options, numeric: Vec<String>) -> Vec<String> {
    if opts.features.is_empty() {
        explore::default_features(&numeric)
    } else {
        opts.features.clone()
    }
}

fn run_similar(pipeline: &StatsPipeline<FbrefSource>, opts: &Options) -> Result<()> {
    let player = opts.require_player()?;
    let aggregate = pipeline.all_leagues(opts.stat, opts.season)?;
    let features = features_or_default(opts, explore::league_numeric_columns(&aggregate.table));
    let home = aggregate
        .table
        .find_player(player)
        .map(|r| r.league)
        .with_context(|| format!("no data for player {player}"))?;

    match opts.group {
        Some(group) => {
            let results = explore::similar_players(&aggregate, player, &features, group, opts.top)?;
            print_json(&results)
        }
        None => {
            let groups =
                explore::similar_across_groups(&aggregate, player, home, &features, opts.top)?;
            print_json(&groups)
        }
    }
}

fn run_compare(pipeline: &StatsPipeline<FbrefSource>, opts: &Options) -> Result<()> {
    let player = opts.require_player()?;
    let aggregate = pipeline.all_leagues(opts.stat, opts.season)?;
    let features = features_or_default(opts, explore::league_numeric_columns(&aggregate.table));
    let group = match opts.group {
        Some(group) => group,
        None => aggregate
            .table
            .find_player(player)
            .map(|r| LeagueGroup::Single(r.league))
            .with_context(|| format!("no data for player {player}"))?,
    };
    let projection = explore::compare(&aggregate, player, opts.other.as_deref(), group, &features)?;
    print_json(&projection)
}
