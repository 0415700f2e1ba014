//! Hosted Role Store client
//!
//! Talks to the hosted data service's row API (PostgREST-style
//! filters: `?user_id=eq.{id}`), authenticated with the service key.
//! Reads are tolerant: rows carrying an unknown role label are skipped
//! rather than failing the whole fetch.

use crate::errors::{QrMenuError, Result};
use crate::roles::{Role, RoleAssignment, RoleStore};
use crate::session::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

const DEFAULT_ROLES_TABLE: &str = "user_roles";

/// Wire row for the `user_roles` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct UserRoleRow {
    id: Uuid,
    user_id: String,
    role: String,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
}

/// Row-API client for the hosted role store.
#[derive(Debug, Clone)]
pub struct HostedRoleStore {
    base_url: String,
    service_key: String,
    table: String,
    client: reqwest::Client,
}

impl HostedRoleStore {
    /// Create a client against `base_url` (the service's row-API root).
    pub fn new(base_url: String, service_key: String) -> Self {
        HostedRoleStore {
            base_url: base_url.trim_end_matches('/').to_string(),
            service_key,
            table: DEFAULT_ROLES_TABLE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Override the roles table name.
    pub fn with_table(mut self, table: impl Into<String>) -> Self {
        self.table = table.into();
        self
    }

    fn table_url(&self) -> String {
        format!("{}/{}", self.base_url, self.table)
    }

    fn authed(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        req.header("apikey", &self.service_key)
            .header("Authorization", format!("Bearer {}", self.service_key))
    }

    fn decode_rows(&self, rows: Vec<UserRoleRow>) -> Vec<RoleAssignment> {
        let mut assignments = Vec::with_capacity(rows.len());
        for row in rows {
            match Role::from_str(&row.role) {
                Ok(role) => assignments.push(RoleAssignment {
                    id: row.id,
                    user_id: UserId::new(row.user_id),
                    role,
                    created_at: row.created_at.unwrap_or_else(Utc::now),
                }),
                Err(_) => {
                    eprintln!(
                        "[HostedRoleStore] Skipping row {} with unknown role label: {}",
                        row.id, row.role
                    );
                }
            }
        }
        assignments
    }
}

#[async_trait]
impl RoleStore for HostedRoleStore {
    async fn roles_for_user(&self, user: &UserId) -> Result<Vec<RoleAssignment>> {
        let response = self
            .authed(self.client.get(self.table_url()))
            .query(&[("user_id", format!("eq.{}", user))])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QrMenuError::RoleFetch(format!(
                "role query for user {} returned HTTP {}",
                user, status
            )));
        }

        let rows: Vec<UserRoleRow> = response.json().await?;
        Ok(self.decode_rows(rows))
    }

    async fn assign_role(&self, user: &UserId, role: Role) -> Result<RoleAssignment> {
        let body = serde_json::json!([{
            "user_id": user.as_str(),
            "role": role.as_str(),
        }]);

        let response = self
            .authed(self.client.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QrMenuError::Store(format!(
                "role insert for user {} returned HTTP {}",
                user, status
            )));
        }

        let rows: Vec<UserRoleRow> = response.json().await?;
        let mut assignments = self.decode_rows(rows);
        assignments.pop().ok_or_else(|| {
            QrMenuError::Store("role insert returned no representation".to_string())
        })
    }

    async fn remove_role(&self, user: &UserId, role: Role) -> Result<()> {
        let response = self
            .authed(self.client.delete(self.table_url()))
            .query(&[
                ("user_id", format!("eq.{}", user)),
                ("role", format!("eq.{}", role)),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(QrMenuError::Store(format!(
                "role delete for user {} returned HTTP {}",
                user, status
            )));
        }

        Ok(())
    }
}
