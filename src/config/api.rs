use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    #[serde(default)]
    pub endpoint: Option<String>,
    #[serde(default)]
    pub image_endpoint: Option<String>,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub request_timeout: Option<u64>,
}

/// Turn a base URL into a full endpoint URL ending in `path`.
///
/// `https://host/v1` and `https://host` both become `https://host/v1/<path>`;
/// a URL already ending in `path` is kept as is.
pub fn normalize_endpoint(endpoint: &str, path: &str) -> String {
    if endpoint.ends_with(path) {
        endpoint.to_string()
    } else if endpoint.ends_with("/v1") {
        format!("{}/{}", endpoint, path)
    } else if endpoint.ends_with("/v1/") {
        format!("{}{}", endpoint, path)
    } else {
        format!("{}/v1/{}", endpoint.trim_end_matches('/'), path)
    }
}
