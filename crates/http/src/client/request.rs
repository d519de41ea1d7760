//! Request descriptors and responses

use super::error::ClientError;
use reqwest::{Method, StatusCode, header};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;

/// Which send of a request this is
///
/// Only an `Original` send may trigger a token refresh, so a request is
/// refreshed and replayed at most once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Attempt {
    Original,
    Retried,
}

impl Attempt {
    pub(crate) fn may_refresh(self) -> bool {
        matches!(self, Self::Original)
    }
}

/// A request to the API, relative to the client's base URL
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    method: Method,
    path: String,
    headers: BTreeMap<String, String>,
    body: Option<serde_json::Value>,
}

impl RequestDescriptor {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            headers: BTreeMap::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::GET, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::POST, path)
    }

    /// Attach a JSON body
    pub fn json<T: Serialize + ?Sized>(mut self, body: &T) -> Result<Self, ClientError> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Add a header; names are stored lowercased
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers
            .insert(name.into().to_ascii_lowercase(), value.into());
        self
    }

    /// Copy of this descriptor carrying `Authorization: Bearer <token>`
    pub fn with_bearer(&self, token: &str) -> Self {
        self.clone()
            .header(header::AUTHORIZATION.as_str(), format!("Bearer {token}"))
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn headers(&self) -> &BTreeMap<String, String> {
        &self.headers
    }

    pub fn body(&self) -> Option<&serde_json::Value> {
        self.body.as_ref()
    }
}

/// Successful response with its raw body
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: String,
}

impl ApiResponse {
    /// Decode the body; an empty body decodes as JSON `null`
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ClientError> {
        let body = if self.body.trim().is_empty() {
            "null"
        } else {
            self.body.as_str()
        };
        Ok(serde_json::from_str(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_bearer_leaves_original_untouched() {
        let original = RequestDescriptor::get("/customers/");
        let authorized = original.with_bearer("A1");

        assert!(original.headers().is_empty());
        assert_eq!(
            authorized.headers().get("authorization").map(String::as_str),
            Some("Bearer A1")
        );

        let replaced = authorized.with_bearer("A2");
        assert_eq!(replaced.headers().len(), 1);
        assert_eq!(
            replaced.headers().get("authorization").map(String::as_str),
            Some("Bearer A2")
        );
    }

    #[test]
    fn test_attempt_gates_refresh() {
        assert!(Attempt::Original.may_refresh());
        assert!(!Attempt::Retried.may_refresh());
    }

    #[test]
    fn test_empty_body_decodes_as_null() {
        let response = ApiResponse {
            status: StatusCode::NO_CONTENT,
            body: String::new(),
        };
        let value: Option<serde_json::Value> = response.json().unwrap();
        assert!(value.is_none());
    }
}
