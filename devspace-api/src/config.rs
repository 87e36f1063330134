use devspace_orchestrator::guard::DEFAULT_WORKSPACE_QUOTA;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    #[serde(default = "default_workspace_quota")]
    pub workspace_quota: i64,
}

fn default_bind_addr() -> String {
    std::env::var("DEVSPACE_API_BIND").unwrap_or_else(|_| "0.0.0.0:3150".to_string())
}

fn default_db_path() -> PathBuf {
    if let Ok(path) = std::env::var("DEVSPACE_DB_PATH") {
        return PathBuf::from(path);
    }

    if cfg!(windows) {
        let appdata = std::env::var("APPDATA").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(appdata)
            .join("devspace")
            .join("api")
            .join("devspace.db")
    } else {
        let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
        PathBuf::from(home)
            .join(".devspace")
            .join("api")
            .join("devspace.db")
    }
}

fn default_workspace_quota() -> i64 {
    std::env::var("DEVSPACE_WORKSPACE_QUOTA")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(DEFAULT_WORKSPACE_QUOTA)
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            db_path: default_db_path(),
            workspace_quota: default_workspace_quota(),
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::default()
    }
}
