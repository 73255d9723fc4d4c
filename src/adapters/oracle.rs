//! Declarative oracle HTTP client.
//!
//! The request is described by an [`OracleSpec`] (url, method, parse rule)
//! rather than ad-hoc call sites, so the endpoint can change without touching
//! stage logic.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use crate::error::{ParleyError, Result};

const HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Declarative request spec for the betting-outcome endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSpec {
    pub url: String,
    /// GET or POST
    pub method: String,
    /// Dotted path to the object holding the boolean `result` field;
    /// empty selects the whole response body
    #[serde(default)]
    pub response_path: String,
}

/// Client for the external betting-outcome oracle
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait OracleClient: Send + Sync {
    /// Fetch and parse the signal selected by the spec
    async fn fetch(&self, spec: &OracleSpec) -> Result<Value>;
}

/// reqwest-backed oracle client
#[derive(Debug, Clone)]
pub struct HttpOracleClient {
    http: reqwest::Client,
}

impl HttpOracleClient {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpOracleClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl OracleClient for HttpOracleClient {
    async fn fetch(&self, spec: &OracleSpec) -> Result<Value> {
        let request = match spec.method.as_str() {
            "POST" => self.http.post(&spec.url),
            _ => self.http.get(&spec.url),
        };
        let body: Value = request
            .timeout(HTTP_TIMEOUT)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        extract_path(&body, &spec.response_path)
            .cloned()
            .ok_or_else(|| {
                ParleyError::Oracle(format!(
                    "response path `{}` not found in oracle body",
                    spec.response_path
                ))
            })
    }
}

/// Read the boolean outcome the stages act on
pub fn outcome_result(signal: &Value) -> Result<bool> {
    signal
        .get("result")
        .and_then(Value::as_bool)
        .ok_or_else(|| ParleyError::Oracle("signal has no boolean `result` field".to_string()))
}

fn extract_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    if path.is_empty() {
        return Some(value);
    }
    path.split('.').try_fold(value, |current, segment| current.get(segment))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_extract_path_walks_nested_objects() {
        let body = json!({"data": {"match": {"result": true, "score": "2-1"}}});
        assert_eq!(
            extract_path(&body, "data.match"),
            Some(&json!({"result": true, "score": "2-1"}))
        );
        assert_eq!(extract_path(&body, ""), Some(&body));
        assert_eq!(extract_path(&body, "data.missing"), None);
    }

    #[test]
    fn test_outcome_result_requires_boolean() {
        assert!(outcome_result(&json!({"result": true})).unwrap());
        assert!(!outcome_result(&json!({"result": false})).unwrap());
        assert!(outcome_result(&json!({"result": "yes"})).is_err());
        assert!(outcome_result(&json!({})).is_err());
    }
}
