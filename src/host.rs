//! Host Adapter
//!
//! Line-delimited JSON bridge between the orchestrator side and a
//! [`ResourceManager`]. Each stdin line is one request:
//!
//! ```json
//! {"id": 7, "method": "provide_resources", "user": {"name": "alice"}, "payload": "{...}"}
//! ```
//!
//! and produces exactly one stdout line, `{"id": 7, "result": ...}` or
//! `{"id": 7, "error": {"kind": "invalid_resource", "message": "..."}}`.
//! Requests are handled one at a time, in order.

use crate::error::ManagerError;
use crate::manager::{ResourceManager, UserInfo};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::Instrument;
use uuid::Uuid;

/// Error kind for lines that are not valid requests
const INVALID_REQUEST: &str = "invalid_request";
/// Error kind for results that cannot be encoded
const ENCODING_FAILED: &str = "encoding_failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    ListResources,
    ValidateResources,
    ProvideResources,
    ReleaseResources,
    CreateUser,
    RefreshResources,
}

#[derive(Debug, Deserialize)]
pub struct HostRequest {
    #[serde(default)]
    pub id: Option<Value>,
    pub method: Method,
    pub user: UserInfo,
    #[serde(default)]
    pub payload: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostError {
    pub kind: String,
    pub message: String,
}

impl From<ManagerError> for HostError {
    fn from(err: ManagerError) -> Self {
        Self {
            kind: err.kind().as_str().to_string(),
            message: err.message().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HostResponse {
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<HostError>,
}

impl HostResponse {
    fn ok(id: Option<Value>, result: Value) -> Self {
        Self {
            id,
            result: Some(result),
            error: None,
        }
    }

    fn err(id: Option<Value>, error: HostError) -> Self {
        Self {
            id,
            result: None,
            error: Some(error),
        }
    }
}

/// Handle one request line
pub async fn handle_line<M: ResourceManager>(manager: &M, line: &str) -> HostResponse {
    let request: HostRequest = match serde_json::from_str(line) {
        Ok(request) => request,
        Err(e) => {
            tracing::warn!("Rejected request line: {}", e);
            return HostResponse::err(
                None,
                HostError {
                    kind: INVALID_REQUEST.to_string(),
                    message: e.to_string(),
                },
            );
        },
    };

    let span = tracing::info_span!(
        "request",
        request_id = %Uuid::new_v4(),
        method = ?request.method,
        user = %request.user.name
    );
    let id = request.id.clone();

    match dispatch(manager, &request).instrument(span).await {
        Ok(result) => HostResponse::ok(id, result),
        Err(e) => {
            tracing::info!("Request failed: {}", e.message);
            HostResponse::err(id, e)
        },
    }
}

async fn dispatch<M: ResourceManager>(
    manager: &M,
    request: &HostRequest,
) -> std::result::Result<Value, HostError> {
    let user = &request.user;
    let payload = request.payload.as_str();

    let value = match request.method {
        Method::ListResources => to_value(manager.list_resources(user).await?)?,
        Method::ValidateResources => {
            manager.validate_resources(user, payload).await?;
            Value::Null
        },
        Method::ProvideResources => to_value(manager.provide_resources(user, payload).await?)?,
        Method::ReleaseResources => {
            manager.release_resources(user, payload).await?;
            Value::Null
        },
        Method::CreateUser => to_value(manager.create_user(user).await?)?,
        Method::RefreshResources => to_value(manager.refresh_resources(user).await?)?,
    };
    Ok(value)
}

fn to_value<T: Serialize>(value: T) -> std::result::Result<Value, HostError> {
    serde_json::to_value(value).map_err(|e| {
        tracing::error!("Cannot encode result: {}", e);
        HostError {
            kind: ENCODING_FAILED.to_string(),
            message: e.to_string(),
        }
    })
}

/// Serve requests until the reader hits EOF
pub async fn serve<M, R, W>(manager: &M, reader: R, mut writer: W) -> Result<()>
where
    M: ResourceManager,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = reader.lines();
    let mut handled = 0usize;

    while let Some(line) = lines.next_line().await.context("Failed to read request")? {
        if line.trim().is_empty() {
            continue;
        }

        let response = handle_line(manager, &line).await;
        let mut encoded = serde_json::to_string(&response).context("Failed to encode response")?;
        encoded.push('\n');
        writer
            .write_all(encoded.as_bytes())
            .await
            .context("Failed to write response")?;
        writer.flush().await.context("Failed to flush response")?;
        handled += 1;
    }

    tracing::info!("Input closed after {} requests", handled);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::ReservationClient;
    use crate::catalog::{Catalog, ResourceDescriptor};
    use crate::manager::LifecycleController;
    use std::sync::Arc;

    fn controller() -> LifecycleController {
        let catalog = Catalog::from_descriptors(vec![ResourceDescriptor {
            resource_id: "fokus-cell".to_string(),
            testbed: "fokus".to_string(),
            node_type: "PhysicalResource".to_string(),
            cardinality: 1,
            description: "cell".to_string(),
            private: None,
            value: Some("come to Berlin".to_string()),
        }]);
        let client = ReservationClient::new("pd-manager-test", None).unwrap();
        LifecycleController::new(Arc::new(catalog), client)
    }

    #[tokio::test]
    async fn test_list_request() {
        let response = handle_line(
            &controller(),
            r#"{"id": 1, "method": "list_resources", "user": {"name": "alice"}}"#,
        )
        .await;

        assert_eq!(response.id, Some(Value::from(1)));
        assert!(response.error.is_none());
        let result = response.result.unwrap();
        assert_eq!(result[0]["resource_id"], "fokus-cell");
        assert_eq!(result[0]["testbed"], 0);
    }

    #[tokio::test]
    async fn test_error_carries_kind() {
        let response = handle_line(
            &controller(),
            r#"{"id": "a", "method": "validate_resources", "user": {"name": "alice"},
                "payload": "properties:\n  resource_id: ghost\n"}"#,
        )
        .await;

        let error = response.error.unwrap();
        assert_eq!(error.kind, "invalid_resource");
        assert!(error.message.contains("ghost"));
    }

    #[test]
    fn test_unencodable_result_is_an_error() {
        let mut bad = std::collections::HashMap::new();
        bad.insert((1u8, 2u8), "tuple keys are not JSON object keys");

        let err = to_value(bad).unwrap_err();
        assert_eq!(err.kind, ENCODING_FAILED);
        assert!(!err.message.is_empty());
    }

    #[tokio::test]
    async fn test_malformed_line_is_invalid_request() {
        let response = handle_line(&controller(), r#"{"method": "explode"}"#).await;
        assert_eq!(response.error.unwrap().kind, INVALID_REQUEST);
        assert!(response.id.is_none());
    }

    #[tokio::test]
    async fn test_serve_answers_every_line() {
        let input = concat!(
            r#"{"id": 1, "method": "list_resources", "user": {"name": "alice"}}"#,
            "\n\n",
            r#"{"id": 2, "method": "provide_resources", "user": {"name": "alice"}, "payload": "{\"properties\": {\"resource_id\": \"fokus-cell\"}}"}"#,
            "\n",
            r#"{"id": 3, "method": "release_resources", "user": {"name": "alice"}, "payload": "garbage"}"#,
            "\n",
        );
        let mut output = Vec::new();

        serve(&controller(), input.as_bytes(), &mut output)
            .await
            .unwrap();

        let lines: Vec<Value> = String::from_utf8(output)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[1]["result"][0], r#"{"value":"come to Berlin"}"#);
        assert_eq!(lines[2]["id"], 3);
        assert!(lines[2]["result"].is_null());
        assert!(lines[2].get("error").is_none());
    }
}
