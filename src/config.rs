use anyhow::Context;
use derive_builder::Builder;
use tracing::Level;

use crate::favourites::FAVOURITES_KEY;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:favourites.db";

/// Runtime settings, read from the environment (and `.env` when present).
#[derive(Debug, Clone, PartialEq, Builder)]
#[builder(setter(into))]
pub struct Config {
    /// `DATABASE_URL`; `sqlite::memory:` keeps favourites for this run only
    #[builder(default = "DEFAULT_DATABASE_URL.to_string()")]
    pub database_url: String,
    /// `FAVOURITES_KEY`
    #[builder(default = "FAVOURITES_KEY.to_string()")]
    pub favourites_key: String,
    /// `LOG_LEVEL`
    #[builder(default = "Level::INFO")]
    pub log_level: Level,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from any variable source. Unset variables keep their default.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let mut builder = ConfigBuilder::default();
        if let Some(url) = lookup("DATABASE_URL") {
            builder.database_url(url);
        }
        if let Some(key) = lookup("FAVOURITES_KEY") {
            builder.favourites_key(key);
        }
        if let Some(level) = lookup("LOG_LEVEL") {
            let level: Level = level
                .parse()
                .with_context(|| format!("invalid LOG_LEVEL {level:?}"))?;
            builder.log_level(level);
        }
        builder.build().with_context(|| "fail to build config")
    }
}
