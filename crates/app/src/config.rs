use std::path::PathBuf;

/// Runtime configuration loaded from environment variables.
///
/// All fields have defaults suitable for local development against a
/// gateway on localhost.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Base URL of the generation gateway.
    pub gateway_url: String,
    /// Path of the durable session file.
    pub session_file: PathBuf,
    /// Seconds between status polls for the pending job.
    pub poll_interval_secs: u64,
    /// Optional path of a reference image to attach to submissions.
    pub reference_image: Option<PathBuf>,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                      | Default                 |
    /// |------------------------------|-------------------------|
    /// | `ATELIER_GATEWAY_URL`        | `http://localhost:9000` |
    /// | `ATELIER_SESSION_FILE`       | `atelier-session.json`  |
    /// | `ATELIER_POLL_INTERVAL_SECS` | `5`                     |
    /// | `ATELIER_REFERENCE_IMAGE`    | unset                   |
    pub fn from_env() -> Self {
        let gateway_url = std::env::var("ATELIER_GATEWAY_URL")
            .unwrap_or_else(|_| "http://localhost:9000".into());

        let session_file: PathBuf = std::env::var("ATELIER_SESSION_FILE")
            .unwrap_or_else(|_| "atelier-session.json".into())
            .into();

        let poll_interval_secs: u64 = std::env::var("ATELIER_POLL_INTERVAL_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("ATELIER_POLL_INTERVAL_SECS must be a valid u64");

        let reference_image = std::env::var("ATELIER_REFERENCE_IMAGE")
            .ok()
            .map(PathBuf::from);

        Self {
            gateway_url,
            session_file,
            poll_interval_secs,
            reference_image,
        }
    }
}
