//! Server configuration: an optional TOML file overlaid with CLI flags.

use holdfast_core::Principal;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::str::FromStr;

pub const DEFAULT_PORT: u16 = 8040;

/// Timestamp source for ownership history.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockKind {
    /// Strictly increasing ticks, one per approval.
    #[default]
    Logical,
    /// Unix seconds.
    System,
}

/// Configuration file format.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields, rename_all = "snake_case")]
pub struct ConfigFile {
    pub name: Option<String>,
    pub address: Option<IpAddr>,
    pub port: Option<u16>,
    /// Receives Admin and User at startup.
    pub bootstrap: Option<Principal>,
    /// Granted User at startup.
    #[serde(default)]
    pub users: Vec<Principal>,
    #[serde(default)]
    pub clock: ClockKind,
}

impl FromStr for ConfigFile {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(toml::from_str(s)?)
    }
}

impl ConfigFile {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::FileIo(e, path.to_path_buf()))?;
        contents.parse()
    }
}

/// Values given on the command line; each one wins over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub name: Option<String>,
    pub port: Option<u16>,
    pub bootstrap: Option<Principal>,
}

/// Resolved configuration with every field ready to use.
#[derive(Debug, Clone)]
pub struct Config {
    pub name: String,
    pub address: IpAddr,
    pub port: u16,
    pub bootstrap: Principal,
    pub users: Vec<Principal>,
    pub clock: ClockKind,
}

impl Config {
    pub fn resolve(file: ConfigFile, overrides: Overrides) -> Result<Self, ConfigError> {
        let bootstrap = overrides
            .bootstrap
            .or(file.bootstrap)
            .ok_or(ConfigError::MissingBootstrap)?;

        Ok(Self {
            name: overrides
                .name
                .or(file.name)
                .unwrap_or_else(|| "Holdfast".to_string()),
            address: file.address.unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: overrides.port.or(file.port).unwrap_or(DEFAULT_PORT),
            bootstrap,
            users: file.users,
            clock: file.clock,
        })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {1}: {0}")]
    FileIo(std::io::Error, PathBuf),
    #[error(transparent)]
    Toml(#[from] toml::de::Error),
    #[error("no bootstrap principal: pass --bootstrap or set `bootstrap` in the config file")]
    MissingBootstrap,
}
