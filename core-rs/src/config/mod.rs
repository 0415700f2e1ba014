//! Parser for gate.yaml configuration files
//!
//! Format:
//! ```yaml
//! loginRoute: /admin/login
//! unauthorizedRoute: /unauthorized
//! service:
//!   baseUrl: https://menu.example.com/rest/v1
//!   serviceKey: <service key>
//!   rolesTable: user_roles
//! ```
//!
//! Both routes default when omitted; `service` is only needed when the
//! hosted role store is in use.

use crate::errors::{QrMenuError, Result};
use crate::gate::GateRoutes;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

fn default_login_route() -> String {
    crate::gate::access_gate::DEFAULT_LOGIN_ROUTE.to_string()
}

fn default_unauthorized_route() -> String {
    crate::gate::access_gate::DEFAULT_UNAUTHORIZED_ROUTE.to_string()
}

fn default_roles_table() -> String {
    "user_roles".to_string()
}

/// Hosted data service connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ServiceConfig {
    pub base_url: String,
    pub service_key: String,
    #[serde(default = "default_roles_table")]
    pub roles_table: String,
}

/// gate.yaml file structure
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GateConfig {
    #[serde(default = "default_login_route")]
    pub login_route: String,
    #[serde(default = "default_unauthorized_route")]
    pub unauthorized_route: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub service: Option<ServiceConfig>,
}

impl Default for GateConfig {
    fn default() -> Self {
        GateConfig {
            login_route: default_login_route(),
            unauthorized_route: default_unauthorized_route(),
            service: None,
        }
    }
}

impl GateConfig {
    /// Load config from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(QrMenuError::Config(format!(
                "Config file not found: {}",
                path.display()
            )));
        }

        let content = fs::read_to_string(path)?;
        let config: GateConfig = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Write config to a YAML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let content = serde_yaml::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Fallback routes for the gate
    pub fn routes(&self) -> GateRoutes {
        GateRoutes {
            login_route: self.login_route.clone(),
            unauthorized_route: self.unauthorized_route.clone(),
        }
    }
}
