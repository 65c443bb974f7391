use anyhow::Result;
use reqwest::{
    Client,
    header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION},
    Method, StatusCode,
};
use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, error};

use shared_config::AppConfig;

/// PostgREST error code for a unique constraint violation.
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Error, Debug)]
pub enum SupabaseError {
    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Invalid header value: {0}")]
    InvalidHeader(String),
}

impl SupabaseError {
    fn from_response(status: StatusCode, body: String) -> Self {
        let code = serde_json::from_str::<Value>(&body)
            .ok()
            .and_then(|json| json["code"].as_str().map(str::to_string));

        match status.as_u16() {
            401 | 403 => SupabaseError::Auth(body),
            404 => SupabaseError::NotFound(body),
            409 => SupabaseError::Conflict(body),
            _ if code.as_deref() == Some(UNIQUE_VIOLATION) => SupabaseError::Conflict(body),
            _ => SupabaseError::Api { status: status.as_u16(), message: body },
        }
    }
}

/// True when the error came from a uniqueness violation in the database.
pub fn is_conflict(err: &anyhow::Error) -> bool {
    matches!(err.downcast_ref::<SupabaseError>(), Some(SupabaseError::Conflict(_)))
}

pub struct SupabaseClient {
    client: Client,
    base_url: String,
    anon_key: String,
    service_role_key: Option<String>,
}

impl SupabaseClient {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.supabase_url.clone(),
            anon_key: config.supabase_anon_key.clone(),
            service_role_key: config.supabase_service_role_key.clone(),
        }
    }

    fn get_headers(&self, auth_token: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();

        let api_key = HeaderValue::from_str(&self.anon_key)
            .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?;
        headers.insert("apikey", api_key);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        // Anonymous calls run as the service role when one is configured, so
        // the public booking page can read a provider's schedule.
        let bearer = auth_token
            .or(self.service_role_key.as_deref())
            .unwrap_or(&self.anon_key);

        let authorization = HeaderValue::from_str(&format!("Bearer {}", bearer))
            .map_err(|e| SupabaseError::InvalidHeader(e.to_string()))?;
        headers.insert(AUTHORIZATION, authorization);

        Ok(headers)
    }

    pub async fn request<T>(&self, method: Method, path: &str,
                            auth_token: Option<&str>, body: Option<Value>)
                            -> Result<T>
    where T: DeserializeOwned {
        self.request_with_headers(method, path, auth_token, body, None).await
    }

    pub async fn request_with_headers<T>(&self, method: Method, path: &str,
                                         auth_token: Option<&str>, body: Option<Value>,
                                         extra_headers: Option<HeaderMap>)
                                         -> Result<T>
    where T: DeserializeOwned {
        let url = format!("{}{}", self.base_url, path);
        debug!("Making {} request to {}", method, url);

        let mut headers = self.get_headers(auth_token)?;
        if let Some(extra) = extra_headers {
            headers.extend(extra);
        }

        let mut req = self.client.request(method, &url)
            .headers(headers);

        if let Some(body_data) = body {
            req = req.json(&body_data);
        }

        let response = req.send().await?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await?;
            error!("API error ({}): {}", status, error_text);
            return Err(SupabaseError::from_response(status, error_text).into());
        }

        // DELETE and minimal-return writes come back with an empty body.
        let bytes = response.bytes().await?;
        let data = if bytes.is_empty() {
            serde_json::from_value(Value::Array(vec![]))?
        } else {
            serde_json::from_slice::<T>(&bytes)?
        };
        Ok(data)
    }

    /// Headers asking PostgREST to echo the written rows back.
    pub fn representation_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert("Prefer", HeaderValue::from_static("return=representation"));
        headers
    }

    /// Headers for an insert that merges on the table's unique key.
    pub fn upsert_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Prefer",
            HeaderValue::from_static("resolution=merge-duplicates,return=representation"),
        );
        headers
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unique_violation_maps_to_conflict() {
        let body = r#"{"code":"23505","message":"duplicate key value"}"#.to_string();
        let err = SupabaseError::from_response(StatusCode::BAD_REQUEST, body);
        assert!(matches!(err, SupabaseError::Conflict(_)));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            SupabaseError::from_response(StatusCode::UNAUTHORIZED, String::new()),
            SupabaseError::Auth(_)
        ));
        assert!(matches!(
            SupabaseError::from_response(StatusCode::NOT_FOUND, String::new()),
            SupabaseError::NotFound(_)
        ));
        assert!(matches!(
            SupabaseError::from_response(StatusCode::INTERNAL_SERVER_ERROR, "boom".to_string()),
            SupabaseError::Api { status: 500, .. }
        ));
    }

    #[test]
    fn test_conflict_detection_through_anyhow() {
        let err: anyhow::Error = SupabaseError::Conflict("dup".to_string()).into();
        assert!(is_conflict(&err));

        let err: anyhow::Error = SupabaseError::NotFound("missing".to_string()).into();
        assert!(!is_conflict(&err));
    }
}
