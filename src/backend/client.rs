//! Reservation Client
//!
//! Talks to the UE reservation backend that owns a remotely-backed resource:
//!
//! - `GET    {base}/test`         - reachability check, answers `{"status": "up"}`
//! - `POST   {base}/ue/reserve`   - create a reservation
//! - `DELETE {base}/ue/terminate` - terminate a reservation
//!
//! Reserve and terminate send `{"username", "resourceId"}` with the backend
//! secret as bearer token. Every call is single-attempt.

use super::http::{sanitize_for_log, BackendHttpClient};
use crate::error::{ManagerError, Result};
use crate::index::ResourceIndexEntry;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::time::Duration;
use url::Url;

/// Status reported by the reachability check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendStatus {
    Up,
    /// Any status other than "up", as reported
    Down(String),
}

/// Credentials of a reserved UE, handed back to the experimenter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReservationRecord {
    pub resource_id: String,
    pub resource_name: String,
    pub url: String,
    pub login: String,
    pub password: String,
    pub reservation_name: String,
}

#[derive(Deserialize)]
struct StatusResponse {
    status: String,
}

#[derive(Deserialize)]
struct ReserveResponse {
    url: String,
    email: String,
    password: String,
    ue_name: String,
}

#[derive(Clone)]
pub struct ReservationClient {
    http: BackendHttpClient,
}

impl ReservationClient {
    pub fn new(user_agent: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            http: BackendHttpClient::new(user_agent, timeout)?,
        })
    }

    /// Check whether the backend is up
    pub async fn check_reachable(&self, entry: &ResourceIndexEntry) -> Result<BackendStatus> {
        let url = endpoint(entry, "test")?;
        let response = self.http.get(&url).await?;

        if response.is_server_error() {
            return Err(ManagerError::BackendUnreachable(format!(
                "{} answered {}",
                url, response.status
            )));
        }

        let parsed: StatusResponse = response.json().map_err(|e| {
            ManagerError::BackendUnreachable(format!(
                "unparsable status from {}: {} ({})",
                url,
                e,
                sanitize_for_log(&response.body)
            ))
        })?;

        tracing::debug!("Backend {} reports status '{}'", entry.backend_url, parsed.status);

        if parsed.status == "up" {
            Ok(BackendStatus::Up)
        } else {
            Ok(BackendStatus::Down(parsed.status))
        }
    }

    /// Reserve a UE for `user_name`
    pub async fn reserve(
        &self,
        entry: &ResourceIndexEntry,
        user_name: &str,
        resource_name: &str,
    ) -> Result<ReservationRecord> {
        let url = endpoint(entry, "ue/reserve")?;
        let body = json!({
            "username": user_name,
            "resourceId": resource_name,
        });

        let response = self
            .http
            .post(&url, &entry.backend_secret, &body)
            .await?;

        if response.is_server_error() {
            return Err(ManagerError::ReservationFailed(format!(
                "reserve of {} for {} answered {}",
                resource_name, user_name, response.status
            )));
        }

        let reserved: ReserveResponse = response.json().map_err(|e| {
            ManagerError::ReservationFailed(format!(
                "unexpected reserve response ({}): {}",
                response.status, e
            ))
        })?;

        tracing::info!(
            "Reserved {} ({}) for {} as {}",
            resource_name,
            entry.resource_id,
            user_name,
            reserved.ue_name
        );

        Ok(ReservationRecord {
            resource_id: entry.resource_id.clone(),
            resource_name: resource_name.to_string(),
            url: reserved.url,
            login: reserved.email,
            password: reserved.password,
            reservation_name: reserved.ue_name,
        })
    }

    /// Terminate the reservation of `user_name`. Anything but a 5xx counts as done.
    pub async fn terminate(
        &self,
        entry: &ResourceIndexEntry,
        user_name: &str,
        resource_name: &str,
    ) -> Result<()> {
        let url = endpoint(entry, "ue/terminate")?;
        let body = json!({
            "username": user_name,
            "resourceId": resource_name,
        });

        let response = self
            .http
            .delete(&url, &entry.backend_secret, &body)
            .await?;

        if response.is_server_error() {
            return Err(ManagerError::ReservationFailed(format!(
                "terminate of {} for {} answered {}",
                resource_name, user_name, response.status
            )));
        }

        tracing::info!(
            "Terminated {} ({}) for {} ({})",
            resource_name,
            entry.resource_id,
            user_name,
            response.status
        );
        Ok(())
    }
}

/// Resolve `path` under the backend base url. The base is treated as a
/// directory even when it lacks the trailing slash.
fn endpoint(entry: &ResourceIndexEntry, path: &str) -> Result<Url> {
    let base = if entry.backend_url.ends_with('/') {
        entry.backend_url.clone()
    } else {
        format!("{}/", entry.backend_url)
    };

    Url::parse(&base)
        .and_then(|base| base.join(path))
        .map_err(|e| {
            ManagerError::Configuration(format!(
                "invalid backend url '{}' for {}: {}",
                entry.backend_url, entry.resource_id, e
            ))
        })
}
