pub mod aggregate;
pub mod catalog;
pub mod config;
pub mod eligibility;
pub mod error;
pub mod explore;
pub mod export;
pub mod fetch;
pub mod http_client;
pub mod normalize;
pub mod page_cache;
pub mod pipeline;
pub mod radar;
pub mod record;
pub mod similarity;

pub use error::{Result, StatsError};
