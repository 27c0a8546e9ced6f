use log::debug;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Selector};

use crate::catalog::{League, Level, Season, StatType};
use crate::config::Settings;
use crate::error::{Result, StatsError};
use crate::http_client::http_client;
use crate::page_cache::PageCache;

const TEAM_CAPTION_PREFIX: &str = "Squad";

static TABLE: Lazy<Selector> = Lazy::new(|| selector("table"));
static CAPTION: Lazy<Selector> = Lazy::new(|| selector("caption"));

fn selector(css: &'static str) -> Selector {
    Selector::parse(css).unwrap_or_else(|_| unreachable!("static selector `{css}`"))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TableRequest {
    pub level: Level,
    pub stat: StatType,
    pub season: Season,
    pub league: League,
}

impl TableRequest {
    pub fn player(stat: StatType, season: Season, league: League) -> Self {
        Self {
            level: Level::Player,
            stat,
            season,
            league,
        }
    }

    pub fn team(stat: StatType, season: Season, league: League) -> Self {
        Self {
            level: Level::Team,
            stat,
            season,
            league,
        }
    }

    pub fn url(&self, base_url: &str) -> String {
        let season = self.season.label();
        format!(
            "{}/en/comps/{}/{}/{}/{}-{}-Stats",
            base_url.trim_end_matches('/'),
            self.league.fbref_id(),
            season,
            self.stat.url_segment(),
            season,
            self.league.url_slug()
        )
    }
}

/// Source of located table markup. Implementations own network access,
/// caching and the comment unwrapping; callers only see a `<table>` fragment.
pub trait PageSource: Sync {
    fn fetch_table(&self, request: &TableRequest) -> Result<String>;
}

pub struct FbrefSource {
    base_url: String,
    timeout: std::time::Duration,
    cache: Option<PageCache>,
}

impl FbrefSource {
    pub fn new(settings: &Settings) -> Self {
        Self {
            base_url: settings.base_url.clone(),
            timeout: settings.request_timeout,
            cache: settings.page_cache_ttl.map(PageCache::on_disk),
        }
    }

    pub fn with_cache(mut self, cache: Option<PageCache>) -> Self {
        self.cache = cache;
        self
    }

    fn fetch_page(&self, url: &str) -> Result<String> {
        if let Some(body) = self.cache.as_ref().and_then(|c| c.get(url)) {
            return Ok(body);
        }
        let client =
            http_client(self.timeout).map_err(|err| StatsError::fetch(url, format!("{err:#}")))?;
        debug!("GET {url}");
        let resp = client
            .get(url)
            .send()
            .map_err(|err| StatsError::fetch(url, err))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(StatsError::fetch(url, format!("http {status}")));
        }
        let body = resp.text().map_err(|err| StatsError::fetch(url, err))?;
        if let Some(cache) = self.cache.as_ref() {
            cache.put(url, &body);
        }
        Ok(body)
    }
}

impl PageSource for FbrefSource {
    fn fetch_table(&self, request: &TableRequest) -> Result<String> {
        let url = request.url(&self.base_url);
        let page = self.fetch_page(&url)?;
        match request.level {
            Level::Player => {
                let id = request.stat.table_id();
                find_table_by_id(&page, &id).ok_or_else(|| {
                    StatsError::parse(format!("table `{id}` not found at {url}"))
                })
            }
            Level::Team => find_table_by_caption(&page, TEAM_CAPTION_PREFIX).ok_or_else(|| {
                StatsError::parse(format!(
                    "no team-level table found for stat type `{}`",
                    request.stat
                ))
            }),
        }
    }
}

/// Outer HTML of the table with the given `id`, searching the live document
/// first and then every HTML comment (the site ships most tables commented
/// out and reveals them with script).
pub fn find_table_by_id(page: &str, id: &str) -> Option<String> {
    find_table(page, Some(id), |table| table.value().attr("id") == Some(id))
}

/// Outer HTML of the first table whose caption starts with `prefix`.
pub fn find_table_by_caption(page: &str, prefix: &str) -> Option<String> {
    find_table(page, None, |table| {
        table.select(&CAPTION).next().is_some_and(|caption| {
            caption
                .text()
                .collect::<String>()
                .trim()
                .starts_with(prefix)
        })
    })
}

fn find_table(
    page: &str,
    hint: Option<&str>,
    matches: impl Fn(&ElementRef) -> bool,
) -> Option<String> {
    let document = Html::parse_document(page);
    if let Some(found) = first_match(&document, &matches) {
        return Some(found);
    }
    for node in document.tree.values() {
        let Some(comment) = node.as_comment() else {
            continue;
        };
        let text: &str = comment;
        if !text.contains("<table") || hint.is_some_and(|h| !text.contains(h)) {
            continue;
        }
        let fragment = Html::parse_fragment(text);
        if let Some(found) = first_match(&fragment, &matches) {
            debug!("table located inside an html comment");
            return Some(found);
        }
    }
    None
}

fn first_match(doc: &Html, matches: &impl Fn(&ElementRef) -> bool) -> Option<String> {
    doc.select(&TABLE).find(|t| matches(t)).map(|t| t.html())
}
