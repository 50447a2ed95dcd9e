//! Request payload parsing
//!
//! The orchestrator hands over the resource's node template, either as YAML
//! (validate) or JSON (provide, release). Only `properties` matter:
//!
//! ```yaml
//! properties:
//!   resource_id: surrey-ue
//!   resource_name: my-ue     # optional, defaults to resource_id
//! ```

use crate::error::{ManagerError, Result};
use serde::Deserialize;

/// Encoding of an incoming payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadFormat {
    /// YAML, which also accepts JSON documents
    Yaml,
    Json,
}

#[derive(Debug, Deserialize)]
struct RequestPayload {
    properties: RequestProperties,
}

#[derive(Debug, Deserialize)]
struct RequestProperties {
    // Older orchestrator templates spell it "resources_id"
    #[serde(alias = "resources_id")]
    resource_id: String,
    #[serde(default)]
    resource_name: Option<String>,
}

/// One reservation request, as derived from a payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReservationRequest {
    pub resource_id: String,
    pub resource_name: String,
    pub user_name: String,
}

impl ReservationRequest {
    /// Parse a payload for `user_name`. Malformed payloads are invalid resources.
    pub fn parse(payload: &str, format: PayloadFormat, user_name: &str) -> Result<Self> {
        let parsed: RequestPayload = match format {
            PayloadFormat::Yaml => serde_yaml::from_str(payload)
                .map_err(|e| ManagerError::InvalidResource(format!("malformed payload: {}", e)))?,
            PayloadFormat::Json => serde_json::from_str(payload)
                .map_err(|e| ManagerError::InvalidResource(format!("malformed payload: {}", e)))?,
        };

        let resource_id = parsed.properties.resource_id.trim().to_string();
        if resource_id.is_empty() {
            return Err(ManagerError::InvalidResource(
                "payload has an empty resource_id".to_string(),
            ));
        }

        let resource_name = parsed
            .properties
            .resource_name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| resource_id.clone());

        Ok(Self {
            resource_id,
            resource_name,
            user_name: user_name.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_parse_yaml() {
        let payload = "properties:\n  resource_id: surrey-ue\n  resource_name: my-ue\n";
        let request = ReservationRequest::parse(payload, PayloadFormat::Yaml, "alice").unwrap();
        assert_eq!(
            request,
            ReservationRequest {
                resource_id: "surrey-ue".to_string(),
                resource_name: "my-ue".to_string(),
                user_name: "alice".to_string(),
            }
        );
    }

    #[test]
    fn test_yaml_accepts_json() {
        let payload = r#"{"properties": {"resource_id": "fokus-cell"}}"#;
        let request = ReservationRequest::parse(payload, PayloadFormat::Yaml, "bob").unwrap();
        assert_eq!(request.resource_id, "fokus-cell");
        assert_eq!(request.resource_name, "fokus-cell");
    }

    #[test]
    fn test_legacy_alias() {
        let payload = r#"{"properties": {"resources_id": "fokus-cell"}}"#;
        let request = ReservationRequest::parse(payload, PayloadFormat::Json, "bob").unwrap();
        assert_eq!(request.resource_id, "fokus-cell");
    }

    #[test]
    fn test_extra_fields_are_ignored() {
        let payload = r#"{"type": "PhysicalResource", "properties": {"resource_id": "x", "foo": 1}}"#;
        assert!(ReservationRequest::parse(payload, PayloadFormat::Json, "bob").is_ok());
    }

    #[test]
    fn test_malformed_payloads_are_invalid_resource() {
        let cases = [
            ("", PayloadFormat::Json),
            ("not json", PayloadFormat::Json),
            (r#"{"properties": {}}"#, PayloadFormat::Json),
            (r#"{"resource_id": "x"}"#, PayloadFormat::Json),
            (r#"{"properties": {"resource_id": "  "}}"#, PayloadFormat::Json),
            ("properties: [1, 2]", PayloadFormat::Yaml),
            ("- just\n- a list\n", PayloadFormat::Yaml),
        ];

        for (payload, format) in cases {
            let err = ReservationRequest::parse(payload, format, "bob").unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidResource, "payload: {:?}", payload);
        }
    }
}
