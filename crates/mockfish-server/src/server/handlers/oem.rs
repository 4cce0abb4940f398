//! Contoso OEM extension.

use axum::Json;
use axum::body::Bytes;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::server::ApiError;
use crate::server::respond::json_object;
use crate::tasks::model::rfc3339;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct CustomActionResponse {
    #[serde(rename = "@odata.type")]
    pub odata_type: &'static str,
    pub action: String,
    pub status: &'static str,
    pub message: &'static str,
    pub timestamp: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<Map<String, Value>>,
}

impl CustomActionResponse {
    fn from_request(request: &Map<String, Value>, timestamp: String) -> Self {
        Self {
            odata_type: "#OemCustomAction.v1_0_0.Response",
            action: request
                .get("Action")
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string(),
            status: "Success",
            message: "OEM custom action executed successfully",
            timestamp,
            parameters: request
                .get("Parameters")
                .and_then(Value::as_object)
                .cloned(),
        }
    }
}

/// `POST /redfish/v1/Oem/Contoso/CustomAction`
///
/// Echoes the requested `Action` and `Parameters`. An empty body is accepted.
pub async fn custom_action(body: Bytes) -> Result<Json<CustomActionResponse>, ApiError> {
    let request = json_object(&body, true)?;
    Ok(Json(CustomActionResponse::from_request(
        &request,
        rfc3339(chrono::Utc::now()),
    )))
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use serde_json::json;

    use super::*;

    fn respond(body: &Value) -> Value {
        let request = body.as_object().cloned().unwrap_or_default();
        let response = CustomActionResponse::from_request(&request, "2026-01-01T00:00:00Z".into());
        serde_json::to_value(response).unwrap()
    }

    #[test]
    fn echoes_action_and_parameters() {
        let doc = respond(&json!({"Action": "Blink", "Parameters": {"Times": 3}}));
        assert_eq!(doc["Action"], "Blink");
        assert_eq!(doc["Status"], "Success");
        assert_eq!(doc["Parameters"]["Times"], 3);
        assert_eq!(doc["Timestamp"], "2026-01-01T00:00:00Z");
    }

    #[test]
    fn non_object_parameters_are_dropped() {
        let doc = respond(&json!({"Parameters": [1, 2]}));
        assert_eq!(doc["Action"], "");
        assert!(doc.get("Parameters").is_none());
    }
}
