/// HTTP endpoint paths for the Files API.
pub mod endpoints {
    pub const HEALTH: &str = "/health";
    pub const FILES: &str = "/files";
    pub const FILE: &str = "/files/*path";
}

/// Health check response.
#[derive(Clone, Debug, serde::Serialize, serde::Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

impl Default for HealthResponse {
    fn default() -> Self {
        Self {
            status: "ok".into(),
            version: env!("CARGO_PKG_VERSION").into(),
        }
    }
}

/// Body of a successful upload.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct PutFileResponse {
    pub file_path: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn health_response_defaults() {
        let h = HealthResponse::default();
        assert_eq!(h.status, "ok");
        assert_eq!(h.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn endpoint_paths() {
        assert_eq!(endpoints::HEALTH, "/health");
        assert_eq!(endpoints::FILES, "/files");
        assert!(endpoints::FILE.starts_with(endpoints::FILES));
    }
}
