//! Response helpers shared by handlers: conditional GETs, query extraction,
//! and JSON body parsing.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use mockfish_core::{EntityTag, QueryParams};
use serde::Serialize;
use serde_json::{Map, Value};

use super::error::ApiError;

/// Parsed OData query options. Malformed `$top`/`$skip` reject the request
/// before the handler runs.
#[derive(Debug, Clone, Default)]
pub struct ODataQuery(pub QueryParams);

impl<S> FromRequestParts<S> for ODataQuery
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(pairs) = Query::<Vec<(String, String)>>::from_request_parts(parts, state)
            .await
            .map_err(|e| ApiError::QueryParameterError(e.body_text()))?;
        let params = QueryParams::parse(pairs.iter().map(|(k, v)| (k.as_str(), v.as_str())))?;
        Ok(Self(params))
    }
}

/// Serialize `body` and answer with `200` + `ETag`, or `304` when the
/// client's `If-None-Match` already names the current tag.
pub fn conditional_json<T: Serialize>(headers: &HeaderMap, body: &T) -> Result<Response, ApiError> {
    let document = serde_json::to_value(body)?;
    let tag = EntityTag::from_json(&document)?;
    if let Some(response) = not_modified(headers, &tag) {
        return Ok(response);
    }
    Ok((StatusCode::OK, etag_header(&tag), Json(document)).into_response())
}

/// Like [`conditional_json`] for a static text document.
pub fn conditional_text(
    headers: &HeaderMap,
    content_type: &'static str,
    body: &'static str,
) -> Response {
    let tag = EntityTag::from_bytes(body.as_bytes());
    if let Some(response) = not_modified(headers, &tag) {
        return response;
    }
    (
        StatusCode::OK,
        etag_header(&tag),
        [(header::CONTENT_TYPE, HeaderValue::from_static(content_type))],
        body,
    )
        .into_response()
}

fn not_modified(headers: &HeaderMap, tag: &EntityTag) -> Option<Response> {
    let if_none_match = headers.get(header::IF_NONE_MATCH)?.to_str().ok()?;
    tag.matches(if_none_match)
        .then(|| (StatusCode::NOT_MODIFIED, etag_header(tag)).into_response())
}

fn etag_header(tag: &EntityTag) -> [(header::HeaderName, String); 1] {
    [(header::ETAG, tag.to_string())]
}

/// `201 Created` with a `Location` header.
pub fn created<T: Serialize>(location: &str, body: &T) -> Result<Response, ApiError> {
    let document = serde_json::to_value(body)?;
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location.to_string())],
        Json(document),
    )
        .into_response())
}

/// `202 Accepted` pointing at the task monitor.
pub fn accepted<T: Serialize>(location: &str, body: &T) -> Result<Response, ApiError> {
    let document = serde_json::to_value(body)?;
    Ok((
        StatusCode::ACCEPTED,
        [(header::LOCATION, location.to_string())],
        Json(document),
    )
        .into_response())
}

/// Parse a request body that must be a JSON object. An empty body yields an
/// empty object when `allow_empty` is set.
pub fn json_object(body: &Bytes, allow_empty: bool) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        if allow_empty {
            return Ok(Map::new());
        }
        return Err(ApiError::MalformedRequestBody("request body is empty".into()));
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::MalformedRequestBody(
            "request body must be a JSON object".into(),
        )),
        Err(e) => Err(ApiError::MalformedRequestBody(e.to_string())),
    }
}
