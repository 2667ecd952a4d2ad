//! Server settings read from the environment

use anyhow::Result;
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

/// Listen address and backup location
#[derive(Debug, Clone)]
pub struct Settings {
    pub host: IpAddr,
    pub port: u16,
    pub backup_dir: PathBuf,
}

impl Settings {
    pub const DEFAULT_PORT: u16 = 3005;
    pub const DEFAULT_BACKUP_DIR: &'static str = "backups";

    /// Read `HOST`, `PORT` and `BACKUP_DIR`, using defaults for unset values
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        Ok(Self {
            host: config::env_parse("HOST", defaults.host)?,
            port: config::env_parse("PORT", defaults.port)?,
            backup_dir: config::env_var("BACKUP_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.backup_dir),
        })
    }

    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: Self::DEFAULT_PORT,
            backup_dir: PathBuf::from(Self::DEFAULT_BACKUP_DIR),
        }
    }
}
