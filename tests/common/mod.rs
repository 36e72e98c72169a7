//! Shared utilities for integration and load testing.

use std::path::{Path, PathBuf};

use ecommerce_service::store::setup;
use ecommerce_service::{HttpServer, MetricsRecorder, ServiceConfig, Shutdown, Store};
use tempfile::TempDir;
use tokio::net::TcpListener;

/// A running service on an ephemeral port with its own seeded database.
/// Dropping it stops the server.
pub struct TestService {
    pub base_url: String,
    pub metrics: MetricsRecorder,
    pub db_path: PathBuf,
    shutdown: Shutdown,
    _dir: TempDir,
}

impl TestService {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestService {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Seed a fresh database and start the real server on 127.0.0.1:0.
pub async fn start_service() -> TestService {
    let dir = tempfile::tempdir().unwrap();
    let db_path = dir.path().join("ecommerce.db");
    setup::initialize(&db_path).unwrap();

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let mut config = ServiceConfig::default();
    config.listener.bind_address = addr.to_string();
    config.database.path = db_path.display().to_string();

    let metrics = MetricsRecorder::new().unwrap();
    let store = Store::from_config(&config.database);
    let server = HttpServer::new(config, store, metrics.clone());

    let shutdown = Shutdown::new();
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    TestService {
        base_url: format!("http://{}", addr),
        metrics,
        db_path,
        shutdown,
        _dir: dir,
    }
}

/// Client that never reuses connections, so every test request is independent.
pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap()
}

/// Count rows in a table, bypassing the service.
pub fn count_rows(db_path: &Path, table: &str) -> i64 {
    let conn = rusqlite::Connection::open(db_path).unwrap();
    conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |row| row.get(0))
        .unwrap()
}

/// Value of the sample `name{...}` whose labels include every given pair.
#[allow(dead_code)]
pub fn sample(text: &str, name: &str, labels: &[(&str, &str)]) -> Option<f64> {
    text.lines()
        .filter(|line| line.starts_with(&format!("{name}{{")))
        .find(|line| {
            labels
                .iter()
                .all(|(k, v)| line.contains(&format!("{k}=\"{v}\"")))
        })
        .and_then(|line| line.rsplit(' ').next())
        .and_then(|value| value.parse().ok())
}
