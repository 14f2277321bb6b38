use crate::auth::jwt::JwtConfig;

/// Server configuration loaded from environment variables.
///
/// All fields except `JWT_SECRET` have defaults suitable for local
/// development. In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `3000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS`.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// JWT token configuration (secret, expiry durations).
    pub jwt: JwtConfig,
    /// OCR service configuration.
    pub ocr: OcrConfig,
}

/// Configuration for the external OCR service.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    /// HTTP base URL of the OCR service (default: `http://localhost:8600`).
    pub base_url: String,
    /// Recognition language hint sent with every image (default: `fra` --
    /// the receipts this service was built for are French).
    pub language: String,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `3000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `OCR_BASE_URL`         | `http://localhost:8600`    |
    /// | `OCR_LANGUAGE`         | `fra`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "3000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let jwt = JwtConfig::from_env();

        let ocr = OcrConfig {
            base_url: std::env::var("OCR_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8600".into()),
            language: std::env::var("OCR_LANGUAGE").unwrap_or_else(|_| "fra".into()),
        };

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            jwt,
            ocr,
        }
    }
}
