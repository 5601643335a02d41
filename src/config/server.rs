/// Server configuration.
/// 
/// Compile-time defaults plus the few paths that can be overridden from the environment.
use std::path::PathBuf;

/// Default address for the operation surface.
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8080";

/// Default root directory for guild data (snapshots, rendered boards, catalog).
pub const DEFAULT_DATA_DIR: &str = "./data";

/// Maximum number of board updates pushed to players at the same time.
pub const FANOUT_WORKERS: usize = 4;

/// File name of the local media catalog used as the metadata source.
pub const CATALOG_FILE: &str = "catalog.json";

/// Runtime server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub data_dir: PathBuf,
}

impl ServerConfig {
    /// Read `RAIL_GRID_BIND` and `RAIL_GRID_DATA_DIR`, falling back to the defaults.
    pub fn from_env() -> Self {
        let bind_addr = std::env::var("RAIL_GRID_BIND").unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string());
        let data_dir = std::env::var("RAIL_GRID_DATA_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_DATA_DIR));
        Self { bind_addr, data_dir }
    }
}
