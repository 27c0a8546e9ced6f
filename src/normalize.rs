use std::collections::{HashMap, HashSet};

use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::error::{Result, StatsError};
use crate::record::{StatRecord, StatTable, Value};

/// Flattened names of columns that never carry a stat (rank index and the
/// match-report link column).
const DROPPED_COLUMNS: &[&str] = &["rk", "matches"];

/// Row classes the site uses for header rows repeated inside the body.
const NOISE_ROW_CLASSES: &[&str] = &["thead", "over_header", "spacer"];

/// Browsers clamp `colspan` to the same limit.
const MAX_COLSPAN: usize = 1000;

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static ROW: Lazy<Selector> = Lazy::new(|| selector("tr"));

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!("static selector `{css}`"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct RawRow {
    pub class: Option<String>,
    pub cells: Vec<String>,
}

/// Table markup tokenized into header rows and body rows. Colspans are
/// expanded so every row is addressed by column index.
#[derive(Debug, Clone, PartialEq)]
pub struct RawStatTable {
    pub header_rows: Vec<Vec<String>>,
    pub body_rows: Vec<RawRow>,
}

impl RawStatTable {
    pub fn parse(markup: &str) -> Result<RawStatTable> {
        let fragment = Html::parse_fragment(markup);
        let table = fragment
            .select(&TABLE)
            .next()
            .ok_or_else(|| StatsError::parse("no <table> element in markup"))?;

        let mut header_rows = Vec::new();
        let mut rest = Vec::new();
        for tr in table.select(&ROW) {
            let cells = row_cells(&tr);
            if in_thead(&tr) {
                header_rows.push(cells.into_iter().map(|(_, text)| text).collect());
            } else {
                rest.push((tr, cells));
            }
        }

        // Without a <thead>, leading all-<th> rows are the header.
        let mut start = 0;
        if header_rows.is_empty() {
            for (_, cells) in &rest {
                if cells.is_empty() || !cells.iter().all(|(is_th, _)| *is_th) {
                    break;
                }
                header_rows.push(cells.iter().map(|(_, text)| text.clone()).collect());
                start += 1;
            }
        }
        if header_rows.is_empty() {
            return Err(StatsError::parse("table has no header row"));
        }

        let body_rows = rest
            .into_iter()
            .skip(start)
            .map(|(tr, cells)| RawRow {
                class: tr.value().attr("class").map(str::to_string),
                cells: cells.into_iter().map(|(_, text)| text).collect(),
            })
            .collect::<Vec<_>>();
        if body_rows.is_empty() {
            return Err(StatsError::parse("table has no body rows"));
        }

        Ok(RawStatTable {
            header_rows,
            body_rows,
        })
    }

    pub fn width(&self) -> usize {
        self.header_rows.iter().map(Vec::len).max().unwrap_or(0)
    }
}

fn in_thead(tr: &ElementRef) -> bool {
    tr.parent()
        .and_then(ElementRef::wrap)
        .is_some_and(|parent| parent.value().name() == "thead")
}

/// `(is_th, text)` per column, colspans expanded.
fn row_cells(tr: &ElementRef) -> Vec<(bool, String)> {
    let mut out = Vec::new();
    for cell in tr.children().filter_map(ElementRef::wrap) {
        let name = cell.value().name();
        if name != "th" && name != "td" {
            continue;
        }
        let span = cell
            .value()
            .attr("colspan")
            .and_then(|v| v.trim().parse::<usize>().ok())
            .unwrap_or(1)
            .clamp(1, MAX_COLSPAN);
        let text = normalize_ws(&cell.text().collect::<String>());
        for _ in 0..span {
            out.push((name == "th", text.clone()));
        }
    }
    out
}

fn normalize_ws(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Tokenize and normalize located table markup in one step.
pub fn normalize(markup: &str, identity_columns: &[&str]) -> Result<StatTable> {
    let raw = RawStatTable::parse(markup)?;
    normalize_raw(&raw, identity_columns)
}

pub fn normalize_raw(raw: &RawStatTable, identity_columns: &[&str]) -> Result<StatTable> {
    let width = raw.width();
    if width == 0 {
        return Err(StatsError::parse("header has no columns"));
    }

    let flattened = dedupe_columns(flatten_header(&raw.header_rows));
    let first_label = raw
        .header_rows
        .last()
        .and_then(|row| row.first())
        .cloned()
        .unwrap_or_default();

    let kept: Vec<(usize, &String)> = flattened
        .iter()
        .enumerate()
        .filter(|(_, name)| !DROPPED_COLUMNS.iter().any(|d| name.eq_ignore_ascii_case(d)))
        .collect();

    let identity: HashSet<&str> = identity_columns.iter().copied().collect();
    let mut records = Vec::with_capacity(raw.body_rows.len());
    for row in &raw.body_rows {
        if is_noise_row(row, &first_label, &flattened[0]) {
            continue;
        }
        let mut record = StatRecord::new();
        for (idx, name) in &kept {
            let cell = row.cells.get(*idx).map(String::as_str);
            let value = if identity.contains(name.as_str()) {
                Value::Text(cell.unwrap_or_default().to_string())
            } else {
                Value::Number(cell.map(coerce_number).unwrap_or(0.0))
            };
            record.insert(name.as_str(), value);
        }
        records.push(record);
    }

    let columns = kept.into_iter().map(|(_, name)| name.clone()).collect();
    Ok(StatTable::new(columns, records))
}

fn is_noise_row(row: &RawRow, first_label: &str, first_column: &str) -> bool {
    let Some(first) = row.cells.first() else {
        return true;
    };
    if !first_label.is_empty() && (first == first_label || first == first_column) {
        return true;
    }
    row.class.as_deref().is_some_and(|class| {
        class
            .split_whitespace()
            .any(|c| NOISE_ROW_CLASSES.contains(&c))
    })
}

fn is_placeholder(label: &str) -> bool {
    let trimmed = label.trim();
    trimmed.is_empty() || trimmed.starts_with("Unnamed")
}

/// Collapse a one- or two-level header into one name per column.
///
/// The first header row is the category level and the last row the metric
/// level. A missing or placeholder category, or one equal to the metric,
/// yields the metric alone; otherwise `"{category}_{metric}"`.
pub fn flatten_header(header_rows: &[Vec<String>]) -> Vec<String> {
    let width = header_rows.iter().map(Vec::len).max().unwrap_or(0);
    let Some(bottom) = header_rows.last() else {
        return Vec::new();
    };
    let top = if header_rows.len() > 1 {
        header_rows.first()
    } else {
        None
    };

    (0..width)
        .map(|idx| {
            let t = top
                .and_then(|row| row.get(idx))
                .map(|s| s.trim())
                .unwrap_or_default();
            let b = bottom.get(idx).map(|s| s.trim()).unwrap_or_default();
            match (is_placeholder(t), is_placeholder(b)) {
                (_, true) if !is_placeholder(t) => t.to_string(),
                (_, true) => format!("Unnamed: {idx}"),
                (true, false) => b.to_string(),
                (false, false) if t == b => b.to_string(),
                (false, false) => format!("{t}_{b}"),
            }
        })
        .collect()
}

/// Repeated names get `_2`, `_3`, ... in order of appearance.
pub fn dedupe_columns(names: Vec<String>) -> Vec<String> {
    let mut seen: HashSet<String> = HashSet::with_capacity(names.len());
    // Next suffix to try per base name.
    let mut next_suffix: HashMap<String, usize> = HashMap::new();
    let mut out = Vec::with_capacity(names.len());
    for name in names {
        if seen.insert(name.clone()) {
            out.push(name);
            continue;
        }
        let mut n = next_suffix.get(&name).copied().unwrap_or(2);
        let unique = loop {
            let candidate = format!("{name}_{n}");
            n += 1;
            if !seen.contains(&candidate) {
                break candidate;
            }
        };
        next_suffix.insert(name, n);
        seen.insert(unique.clone());
        out.push(unique);
    }
    out
}

/// Lossy numeric coercion: anything unparseable, empty or non-finite is 0.
pub fn coerce_number(raw: &str) -> f64 {
    let cleaned: String = raw.trim().chars().filter(|c| *c != ',').collect();
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[&str]) -> Vec<String> {
        cells.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn flatten_uses_metric_alone_for_placeholder_or_equal_category() {
        let header = vec![
            row(&["", "Unnamed: 1_level_0", "Playing Time", "Performance", "Gls"]),
            row(&["Rk", "Player", "MP", "Gls", "Gls"]),
        ];
        assert_eq!(
            flatten_header(&header),
            row(&["Rk", "Player", "Playing Time_MP", "Performance_Gls", "Gls"])
        );
    }

    #[test]
    fn flatten_single_row_header() {
        let header = vec![row(&["Squad", "# Pl", "Age"])];
        assert_eq!(flatten_header(&header), row(&["Squad", "# Pl", "Age"]));
    }

    #[test]
    fn dedupe_appends_ordinal_suffix() {
        let names = row(&["Gls", "Ast", "Gls", "Gls", "Gls_2"]);
        assert_eq!(
            dedupe_columns(names),
            row(&["Gls", "Ast", "Gls_2", "Gls_3", "Gls_2_2"])
        );
    }

    #[test]
    fn dedupe_handles_many_repeats() {
        let names = vec!["X".to_string(); 5_000];
        let deduped = dedupe_columns(names);
        assert_eq!(deduped.len(), 5_000);
        assert_eq!(deduped[0], "X");
        assert_eq!(deduped[1], "X_2");
        assert_eq!(deduped[4_999], "X_5000");
        let unique: HashSet<&String> = deduped.iter().collect();
        assert_eq!(unique.len(), 5_000);
    }

    #[test]
    fn coercion_defaults_to_zero() {
        assert_eq!(coerce_number("1,234"), 1234.0);
        assert_eq!(coerce_number(" 0.45 "), 0.45);
        assert_eq!(coerce_number(""), 0.0);
        assert_eq!(coerce_number("n/a"), 0.0);
        assert_eq!(coerce_number("NaN"), 0.0);
        assert_eq!(coerce_number("inf"), 0.0);
    }
}
