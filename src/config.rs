//! Store and server configuration

use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::Deserialize;

use crate::constants::{DEFAULT_LISTEN, DEFAULT_MAP_SIZE, DEFAULT_PER_PAGE};
use crate::error::{DriveError, Result};

/// Runtime configuration. Values come from defaults, an optional TOML file,
/// then `DRIVEBIT_*` environment variables, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding the LMDB environment
    pub db_path: PathBuf,
    /// Maximum size of the memory map in bytes
    pub map_size: usize,
    /// Page size used when a request does not give one
    pub per_page: usize,
    /// Address the HTTP server binds to
    pub listen: String,
    /// User granted every capability when the server starts
    pub admin: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            db_path: PathBuf::from("./data/drivebit.mdb"),
            map_size: DEFAULT_MAP_SIZE,
            per_page: DEFAULT_PER_PAGE,
            listen: DEFAULT_LISTEN.to_string(),
            admin: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| DriveError::Config(e.to_string()))
    }

    /// Read a TOML file, then apply environment overrides
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|e| DriveError::Config(format!("{}: {}", path.display(), e)))?;
        Self::from_toml_str(&raw)?.with_env()
    }

    /// Defaults with environment overrides
    pub fn from_env() -> Result<Self> {
        Config::default().with_env()
    }

    pub fn with_env(self) -> Result<Self> {
        self.with_vars(|name| std::env::var(name).ok())
    }

    fn with_vars<F: Fn(&str) -> Option<String>>(mut self, var: F) -> Result<Self> {
        if let Some(p) = var("DRIVEBIT_DB") {
            self.db_path = PathBuf::from(p);
        }
        if let Some(s) = var("DRIVEBIT_MAP_SIZE") {
            self.map_size = parse_num("DRIVEBIT_MAP_SIZE", &s)?;
        }
        if let Some(s) = var("DRIVEBIT_PER_PAGE") {
            self.per_page = parse_num("DRIVEBIT_PER_PAGE", &s)?;
        }
        if let Some(l) = var("DRIVEBIT_LISTEN") {
            self.listen = l;
        }
        if let Some(a) = var("DRIVEBIT_ADMIN") {
            self.admin = Some(parse_num("DRIVEBIT_ADMIN", &a)?);
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        if self.per_page == 0 {
            return Err(DriveError::Config("per_page must be at least 1".into()));
        }
        if self.admin == Some(0) {
            return Err(DriveError::Config("admin must be a user id, not 0".into()));
        }
        if self.map_size == 0 {
            return Err(DriveError::Config("map_size must be non-zero".into()));
        }
        Ok(())
    }
}

fn parse_num<T: FromStr>(name: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DriveError::Config(format!("{} is not a number: '{}'", name, raw)))
}
