use std::env;
use std::net::{IpAddr, SocketAddr};
use std::str::FromStr;

use anyhow::{bail, Context};

use crate::pagination::PageLimits;

/// Runtime settings, read once at startup from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub bind_addr: SocketAddr,
    pub max_connections: u32,
    pub page_limits: PageLimits,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url =
            env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite://todo.db".to_string());

        let host: IpAddr = parse_var("HOST", IpAddr::from([0, 0, 0, 0]))?;
        let port: u16 = parse_var("PORT", 8000)?;
        let max_connections = parse_var("DB_MAX_CONNECTIONS", 5)?;

        let page_limits = PageLimits::new(
            parse_var("PAGE_SIZE_MIN", PageLimits::DEFAULT.min_size)?,
            parse_var("PAGE_SIZE_MAX", PageLimits::DEFAULT.max_size)?,
            parse_var("PAGE_SIZE_DEFAULT", PageLimits::DEFAULT.default_size)?,
        )
        .context("page size limits must satisfy 0 < PAGE_SIZE_MIN <= PAGE_SIZE_DEFAULT <= PAGE_SIZE_MAX")?;

        if max_connections == 0 {
            bail!("DB_MAX_CONNECTIONS must be at least 1");
        }

        Ok(Self {
            database_url,
            bind_addr: SocketAddr::new(host, port),
            max_connections,
            page_limits,
        })
    }
}

fn parse_var<T>(key: &str, default: T) -> anyhow::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse()
            .with_context(|| format!("invalid value for {key}: {raw:?}")),
        Err(_) => Ok(default),
    }
}
