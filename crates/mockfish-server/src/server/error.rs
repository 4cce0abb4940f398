//! Redfish error envelope.

use axum::Json;
use axum::http::{Method, StatusCode, header};
use axum::response::{IntoResponse, Response};
use mockfish_core::QueryError;
use mockfish_core::actions::ActionError;
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::events::SubscriptionError;
use crate::tasks::DispatchError;

/// Realm advertised on 401 responses.
pub const AUTH_REALM: &str = r#"Basic realm="Redfish Service""#;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("The request requires authentication")]
    AuthenticationRequired,

    /// Reserved: every authenticated principal is currently allowed every operation.
    #[error("There are insufficient privileges for the account or credentials associated with the current session to perform the requested operation")]
    InsufficientPrivilege,

    #[error("The requested resource of type {0} was not found")]
    ResourceNotFound(String),

    #[error("The HTTP method {0} is not allowed for this resource")]
    MethodNotAllowed(Method),

    #[error("The action {action} is not supported by the resource {resource}")]
    ActionNotSupported { action: String, resource: String },

    #[error("The value '{value}' for the parameter {name} is not in the list of acceptable values")]
    InvalidParameter { name: String, value: String },

    #[error("{0}")]
    QueryParameterError(String),

    #[error("The request body submitted was malformed JSON: {0}")]
    MalformedRequestBody(String),

    #[error("The property {0} is a required property and must be included in the request")]
    PropertyMissing(String),

    #[error("The service is temporarily unavailable: {0}")]
    ServiceUnavailable(String),

    /// Details are logged, never sent to the client.
    #[error("The request failed due to an internal service error")]
    Internal(String),
}

impl ApiError {
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::InsufficientPrivilege => StatusCode::FORBIDDEN,
            Self::ResourceNotFound(_) => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            Self::ActionNotSupported { .. }
            | Self::InvalidParameter { .. }
            | Self::QueryParameterError(_)
            | Self::MalformedRequestBody(_)
            | Self::PropertyMissing(_) => StatusCode::BAD_REQUEST,
            Self::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Error kind, appended to the `Base.1.0.` registry prefix.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => "AuthenticationRequired",
            Self::InsufficientPrivilege => "InsufficientPrivilege",
            Self::ResourceNotFound(_) => "ResourceNotFound",
            Self::MethodNotAllowed(_) => "MethodNotAllowed",
            Self::ActionNotSupported { .. } => "ActionNotSupported",
            Self::InvalidParameter { .. } => "InvalidParameter",
            Self::QueryParameterError(_) => "QueryParameterError",
            Self::MalformedRequestBody(_) => "MalformedRequestBody",
            Self::PropertyMissing(_) => "PropertyMissing",
            Self::ServiceUnavailable(_) => "ServiceUnavailable",
            Self::Internal(_) => "InternalError",
        }
    }

    const fn resolution(&self) -> &'static str {
        match self {
            Self::AuthenticationRequired => {
                "Establish a session or provide valid credentials and resubmit the request."
            }
            Self::InsufficientPrivilege => {
                "Either abandon the operation or change the associated access rights and resubmit the request."
            }
            Self::ResourceNotFound(_) => {
                "Provide a valid resource identifier and resubmit the request."
            }
            Self::MethodNotAllowed(_) => {
                "Resubmit the request using a method listed in the Allow header."
            }
            Self::ActionNotSupported { .. } => {
                "The action supplied cannot be resubmitted to the implementation."
            }
            Self::InvalidParameter { .. } => {
                "Choose a value from the enumeration list and resubmit the request."
            }
            Self::QueryParameterError(_) => {
                "Correct the value for the query parameter and resubmit the request."
            }
            Self::MalformedRequestBody(_) => "Ensure that the request body is valid JSON and resubmit the request.",
            Self::PropertyMissing(_) => "Ensure that the property is in the request body and has a valid value.",
            Self::ServiceUnavailable(_) => "Wait and resubmit the request.",
            Self::Internal(_) => "Resubmit the request. If the problem persists, contact the service administrator.",
        }
    }

    const fn severity(&self) -> &'static str {
        match self {
            Self::Internal(_) | Self::ServiceUnavailable(_) => "Critical",
            _ => "Warning",
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
    #[serde(rename = "@Message.ExtendedInfo")]
    extended_info: Vec<ExtendedInfo>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
struct ExtendedInfo {
    message_id: String,
    message: String,
    severity: &'static str,
    resolution: &'static str,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if let Self::Internal(detail) = &self {
            error!(error = %detail, "Internal error while handling request");
        }
        let status = self.status_code();
        let code = format!("Base.1.0.{}", self.kind());
        let message = self.to_string();
        let envelope = ErrorEnvelope {
            error: ErrorBody {
                extended_info: vec![ExtendedInfo {
                    message_id: code.clone(),
                    message: message.clone(),
                    severity: self.severity(),
                    resolution: self.resolution(),
                }],
                code,
                message,
            },
        };

        let mut response = (status, Json(envelope)).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                header::HeaderValue::from_static(AUTH_REALM),
            );
        }
        response
    }
}

impl From<QueryError> for ApiError {
    fn from(e: QueryError) -> Self {
        Self::QueryParameterError(e.to_string())
    }
}

impl From<ActionError> for ApiError {
    fn from(e: ActionError) -> Self {
        match e {
            ActionError::InvalidParameter { name, value } => Self::InvalidParameter {
                name: name.to_string(),
                value,
            },
            ActionError::MissingParameter(name) => Self::PropertyMissing(name.to_string()),
        }
    }
}

impl From<DispatchError> for ApiError {
    fn from(e: DispatchError) -> Self {
        match e {
            DispatchError::QueueFull => Self::ServiceUnavailable(e.to_string()),
            DispatchError::Closed => Self::Internal(e.to_string()),
        }
    }
}

impl From<SubscriptionError> for ApiError {
    fn from(e: SubscriptionError) -> Self {
        match e {
            SubscriptionError::MissingDestination => Self::PropertyMissing("Destination".into()),
        }
    }
}

impl From<crate::auth::IdentityError> for ApiError {
    fn from(e: crate::auth::IdentityError) -> Self {
        Self::Internal(e.to_string())
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        Self::Internal(format!("serialization failed: {e}"))
    }
}

#[cfg(test)]
#[allow(clippy::panic, clippy::expect_used, clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body_json(err: ApiError) -> (StatusCode, axum::http::HeaderMap, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, headers, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn envelope_shape() {
        let (status, _, body) = body_json(ApiError::ResourceNotFound("ComputerSystem".into())).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "Base.1.0.ResourceNotFound");
        let info = &body["error"]["@Message.ExtendedInfo"][0];
        assert_eq!(info["MessageId"], "Base.1.0.ResourceNotFound");
        assert_eq!(info["Severity"], "Warning");
        assert!(info["Resolution"].is_string());
    }

    #[tokio::test]
    async fn unauthorized_carries_challenge() {
        let (status, headers, _) = body_json(ApiError::AuthenticationRequired).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(headers[header::WWW_AUTHENTICATE], AUTH_REALM);
    }

    #[tokio::test]
    async fn method_not_allowed_names_the_verb() {
        let (status, _, body) = body_json(ApiError::MethodNotAllowed(Method::PATCH)).await;
        assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
        assert!(body["error"]["message"].as_str().unwrap().contains("PATCH"));
    }

    #[tokio::test]
    async fn internal_details_are_hidden() {
        let (status, _, body) = body_json(ApiError::internal("lock poisoned at foo.rs")).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!body["error"]["message"].as_str().unwrap().contains("foo.rs"));
    }

    #[test]
    fn module_errors_convert() {
        let e: ApiError = DispatchError::QueueFull.into();
        assert_eq!(e.status_code(), StatusCode::SERVICE_UNAVAILABLE);

        let e: ApiError = ActionError::InvalidParameter {
            name: "ResetType",
            value: "Explode".into(),
        }
        .into();
        assert_eq!(e.status_code(), StatusCode::BAD_REQUEST);
        assert!(e.to_string().contains("Explode"));

        let e: ApiError = SubscriptionError::MissingDestination.into();
        assert!(matches!(e, ApiError::PropertyMissing(ref p) if p == "Destination"));
    }
}
