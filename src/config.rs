//! Configuration handling for the TUI

use crate::api::DEFAULT_BASE_URL;
use crate::state::{PolicyRules, View};
use anyhow::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Default deadline for a single remote call
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// User configuration for the TUI
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TuiConfig {
    /// Base URL of the policy API
    pub api_base_url: Option<String>,
    /// Seconds before a remote call is abandoned
    pub request_timeout_secs: Option<u64>,
    /// Reject policies whose end date is not after the start date
    pub enforce_date_order: Option<bool>,
    /// Route opened after a successful login (e.g. "policies")
    pub post_login_route: Option<String>,
    /// Email pre-filled on the login form
    pub last_email: Option<String>,
}

impl TuiConfig {
    fn project_dirs() -> Option<ProjectDirs> {
        ProjectDirs::from("io", "policydesk", "policydesk-tui")
    }

    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Directory for the log file
    pub fn log_dir() -> Option<PathBuf> {
        Self::project_dirs().map(|dirs| dirs.data_local_dir().to_path_buf())
    }

    /// Load configuration from file
    pub fn load() -> Result<Self> {
        let path = Self::config_path();

        if let Some(path) = path {
            if path.exists() {
                let content = fs::read_to_string(&path)?;
                let config: TuiConfig = serde_json::from_str(&content)?;
                return Ok(config);
            }
        }

        Ok(Self::default())
    }

    /// Save configuration to file
    pub fn save(&self) -> Result<()> {
        if let Some(path) = Self::config_path() {
            if let Some(parent) = path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = serde_json::to_string_pretty(self)?;
            fs::write(&path, content)?;
        }
        Ok(())
    }

    /// Resolve the effective settings, letting environment variables win
    pub fn settings(&self) -> Settings {
        self.settings_with_env(|key| std::env::var(key).ok())
    }

    fn settings_with_env(&self, env: impl Fn(&str) -> Option<String>) -> Settings {
        let api_base_url = env("POLICYDESK_API_URL")
            .filter(|v| !v.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        let timeout_secs = env("POLICYDESK_TIMEOUT_SECS")
            .and_then(|v| v.trim().parse::<u64>().ok())
            .or(self.request_timeout_secs)
            .filter(|secs| *secs > 0)
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let post_login_view = match self.post_login_route.as_deref() {
            Some(route) => View::from_route(route).unwrap_or_else(|| {
                tracing::warn!(route, "Unknown post-login route, using policies");
                View::Policies
            }),
            None => View::Policies,
        };

        Settings {
            api_base_url,
            request_timeout: Duration::from_secs(timeout_secs),
            policy_rules: PolicyRules {
                enforce_date_order: self.enforce_date_order.unwrap_or(false),
            },
            post_login_view,
        }
    }
}

/// Effective runtime settings
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub api_base_url: String,
    pub request_timeout: Duration,
    pub policy_rules: PolicyRules,
    pub post_login_view: View,
}
