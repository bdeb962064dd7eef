//! Environment-sourced application configuration.
//!
//! Grounded on the teacher's `Config` struct in `main.rs` (plain fields,
//! `std::env::var` with sensible defaults, parsed once at startup).

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub redis_url: String,
    pub queue_redis_url: String,
    pub upload_tmp_dir: std::path::PathBuf,
    pub max_upload_size_mb: u64,
    pub api_prefix: String,
    pub environment: String,
    pub port: u16,
    pub worker_concurrency: usize,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: std::env::var("DATABASE_URL").unwrap_or_else(|_| "sqlite:data.db?mode=rwc".to_string()),
            redis_url: std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string()),
            queue_redis_url: std::env::var("QUEUE_REDIS_URL")
                .unwrap_or_else(|_| std::env::var("REDIS_URL").unwrap_or_else(|_| "redis://127.0.0.1:6379".to_string())),
            upload_tmp_dir: std::env::var("UPLOAD_TMP_DIR").map(std::path::PathBuf::from).unwrap_or_else(|_| std::env::temp_dir()),
            max_upload_size_mb: std::env::var("MAX_UPLOAD_SIZE_MB").ok().and_then(|v| v.parse().ok()).unwrap_or(512),
            api_prefix: std::env::var("API_PREFIX").unwrap_or_else(|_| "/api".to_string()),
            environment: std::env::var("ENVIRONMENT").unwrap_or_else(|_| "development".to_string()),
            port: std::env::var("PORT").unwrap_or_else(|_| "3000".to_string()).parse().unwrap_or(3000),
            worker_concurrency: std::env::var("WORKER_CONCURRENCY").ok().and_then(|v| v.parse().ok()).unwrap_or(4),
        }
    }

    pub fn max_upload_size_bytes(&self) -> u64 {
        self.max_upload_size_mb * 1024 * 1024
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_upload_size_bytes_converts_from_megabytes() {
        let config = Config { max_upload_size_mb: 512, ..Config::from_env() };
        assert_eq!(config.max_upload_size_bytes(), 512 * 1024 * 1024);
    }
}
