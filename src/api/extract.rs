//! Request extractors

use axum::{
    body::Bytes,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;

use super::middleware::ApiError;

/// JSON list-request body
///
/// Unlike `axum::Json`, a missing body, a blank body or a JSON `null` all
/// mean "use the defaults", and the Content-Type header is not checked.
/// Anything else must deserialize into `T` or the request is rejected
/// with 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ListBody<T>(pub T);

impl<S, T> FromRequest<S> for ListBody<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Default,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let bytes = Bytes::from_request(req, state)
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;

        parse_body(&bytes).map(ListBody)
    }
}

fn parse_body<T: DeserializeOwned + Default>(bytes: &[u8]) -> Result<T, ApiError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(T::default());
    }

    let value: serde_json::Value = serde_json::from_slice(bytes)
        .map_err(|e| ApiError::bad_request(format!("Invalid JSON body: {}", e)))?;
    if value.is_null() {
        return Ok(T::default());
    }

    serde_json::from_value(value)
        .map_err(|e| ApiError::bad_request(format!("Invalid list parameters: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ConfigCenterQuery, PageQuery};

    #[test]
    fn test_blank_and_null_bodies_use_defaults() {
        assert_eq!(parse_body::<PageQuery>(b"").unwrap(), PageQuery::default());
        assert_eq!(parse_body::<PageQuery>(b"  \n").unwrap(), PageQuery::default());
        assert_eq!(parse_body::<PageQuery>(b"null").unwrap(), PageQuery::default());
    }

    #[test]
    fn test_body_with_filters() {
        let query: ConfigCenterQuery =
            parse_body(br#"{"pageIndex":2,"configType":"system"}"#).unwrap();

        assert_eq!(query.page, PageQuery::new(2, 10));
        assert_eq!(query.config_type.as_deref(), Some("system"));
    }

    #[test]
    fn test_malformed_body_is_rejected() {
        let err = parse_body::<PageQuery>(b"{pageIndex:").unwrap_err();
        assert_eq!(err.code, 400);

        let err = parse_body::<PageQuery>(br#"{"pageIndex":"two"}"#).unwrap_err();
        assert_eq!(err.code, 400);
        assert!(err.message.contains("Invalid list parameters"));
    }
}
