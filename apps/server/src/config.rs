use std::net::SocketAddr;

pub struct Config {
    pub listen_addr: SocketAddr,
    pub db_path: String,
    pub cors_allow: Vec<String>,
    /// Root URL of the realtime database.
    pub realtime_url: String,
    /// Top-level node all synced documents live under.
    pub realtime_namespace: String,
    /// Optional access token appended to realtime DB requests.
    pub realtime_auth: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();
        let listen_addr: SocketAddr = std::env::var("LUMEN_LISTEN_ADDR")
            .unwrap_or_else(|_| "0.0.0.0:8080".to_string())
            .parse()
            .expect("Invalid LUMEN_LISTEN_ADDR");
        let db_path = std::env::var("LUMEN_DB_PATH").unwrap_or_else(|_| "./db/lumen.db".into());
        let cors_allow = std::env::var("LUMEN_CORS_ALLOW_ORIGINS")
            .unwrap_or_else(|_| "*".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        // Defaults point at a local emulator so a dev checkout runs without
        // credentials.
        let realtime_url = std::env::var("LUMEN_REALTIME_URL")
            .unwrap_or_else(|_| "http://127.0.0.1:9000".into());
        let realtime_namespace =
            std::env::var("LUMEN_REALTIME_NAMESPACE").unwrap_or_else(|_| "site".into());
        let realtime_auth = std::env::var("LUMEN_REALTIME_AUTH")
            .ok()
            .filter(|s| !s.trim().is_empty());
        Self {
            listen_addr,
            db_path,
            cors_allow,
            realtime_url,
            realtime_namespace,
            realtime_auth,
        }
    }
}
