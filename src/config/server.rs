use error_stack::{Report, Result};
use serde::Deserialize;
use std::net::{IpAddr, Ipv4Addr};
use std::num::NonZeroUsize;

use super::ParseError;

#[derive(Debug, Deserialize)]
pub struct Server {
    #[serde(default)]
    pub http: Http,
    /// Absent means the wall runs in "not configured" mode: reads come
    /// back empty and writes are refused with a distinct response.
    #[serde(default)]
    pub db: Option<super::Database>,
    #[serde(default)]
    pub wall: super::Wall,
}

#[derive(Debug, Deserialize)]
pub struct Http {
    /// **Environment variables**:
    /// - `MURAL_HTTP_IP`
    #[serde(default = "Http::default_ip")]
    pub ip: IpAddr,
    /// **Environment variables**:
    /// - `MURAL_HTTP_PORT`
    #[serde(default = "Http::default_port")]
    pub port: u16,
    /// Tokio worker threads; defaults to the actix default when unset.
    ///
    /// **Environment variables**:
    /// - `MURAL_HTTP_WORKERS`
    pub workers: Option<NonZeroUsize>,
}

impl Http {
    const DEFAULT_PORT: u16 = 3000;

    const fn default_ip() -> IpAddr {
        IpAddr::V4(Ipv4Addr::LOCALHOST)
    }

    const fn default_port() -> u16 {
        Self::DEFAULT_PORT
    }
}

impl Default for Http {
    fn default() -> Self {
        Self {
            ip: Self::default_ip(),
            port: Self::default_port(),
            workers: None,
        }
    }
}

impl Server {
    pub fn load() -> Result<Self, ParseError> {
        dotenvy::dotenv().ok();

        Self::figment()
            .extract::<Self>()
            .map_err(|e| Report::new(e).change_context(ParseError))
    }
}

impl Server {
    const DEFAULT_CONFIG_FILE: &'static str = "mural.toml";

    /// Creates the default [`figment::Figment`] used to load server
    /// configuration. Split out from [`Server::load`] for testing.
    pub(crate) fn figment() -> figment::Figment {
        use figment::{
            providers::{Env, Format, Toml},
            Figment,
        };

        Figment::new()
            .merge(Toml::file(Self::DEFAULT_CONFIG_FILE))
            // The env provider turns every underscore into a dot, which
            // mangles keys that contain one. Map those by hand.
            .merge(Env::prefixed("MURAL_").map(|v| match v.as_str() {
                "DB_MIN_IDLE" => "db.min_idle".into(),
                "DB_POOL_SIZE" => "db.pool_size".into(),
                "DB_TIMEOUT_SECS" => "db.timeout_secs".into(),
                "DB_ENFORCE_TLS" => "db.enforce_tls".into(),
                "WALL_IP_SALT" => "wall.ip_salt".into(),
                _ => v.as_str().replace('_', ".").into(),
            }))
            // Environment variable aliases
            .merge(Env::raw().map(|v| match v.as_str() {
                "DATABASE_URL" => "db.url".into(),
                _ => v.into(),
            }))
    }
}
