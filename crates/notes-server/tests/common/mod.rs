//! Common test utilities for integration tests.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::Client;
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tokio::time::timeout;

use notes_server::{Server, ServerConfig};
use notes_store::NoteStore;

/// A test server that runs in the background over a file-backed store.
pub struct TestServer {
    /// The server's address.
    pub addr: SocketAddr,
    /// HTTP client configured for this server.
    pub client: Client,
    /// The store the server writes through.
    pub store: Arc<NoteStore>,
    /// Handle to the server task.
    handle: JoinHandle<()>,
    /// Temporary directory holding the notes file, if owned by this server.
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    /// Start a new test server with a fresh notes file.
    pub async fn start() -> Result<Self> {
        let temp_dir = TempDir::new()?;
        let path = temp_dir.path().join("data").join("notes.json");
        let mut server = Self::start_with_data_file(&path).await?;
        server._temp_dir = Some(temp_dir);
        Ok(server)
    }

    /// Start a test server over an existing (or not yet existing) notes file.
    pub async fn start_with_data_file(path: &Path) -> Result<Self> {
        let addr = find_available_port().await?;

        let config = ServerConfig::new()
            .with_bind_address(addr)
            .with_request_logging(false);

        let store = Arc::new(NoteStore::open(path));
        let server = Server::new(Arc::clone(&store), config);
        let handle = tokio::spawn(async move {
            let _ = server.run_on(addr).await;
        });

        let client = Client::new();
        wait_for_server(&client, addr).await?;

        Ok(Self {
            addr,
            client,
            store,
            handle,
            _temp_dir: None,
        })
    }

    /// Path of the notes file backing this server.
    pub fn data_file(&self) -> PathBuf {
        self.store
            .path()
            .map(Path::to_path_buf)
            .expect("test server store is file-backed")
    }

    /// Stop the server task.
    pub fn stop(&self) {
        self.handle.abort();
    }

    /// Get the base URL for the server.
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Get a GET request builder.
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.get(format!("{}{}", self.base_url(), path))
    }

    /// Get a POST request builder.
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.post(format!("{}{}", self.base_url(), path))
    }

    /// Get a PUT request builder.
    pub fn put(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.put(format!("{}{}", self.base_url(), path))
    }

    /// Get a DELETE request builder.
    pub fn delete(&self, path: &str) -> reqwest::RequestBuilder {
        self.client.delete(format!("{}{}", self.base_url(), path))
    }

    /// Check if server is healthy.
    pub async fn health(&self) -> Result<bool> {
        let resp = self.get("/health").send().await?;
        Ok(resp.status().is_success())
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Find an available port for the test server.
async fn find_available_port() -> Result<SocketAddr> {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    drop(listener);
    Ok(addr)
}

/// Wait for the server to become ready.
async fn wait_for_server(client: &Client, addr: SocketAddr) -> Result<()> {
    let url = format!("http://{}/health", addr);

    let result = timeout(Duration::from_secs(5), async {
        loop {
            match client.get(&url).send().await {
                Ok(resp) if resp.status().is_success() => return,
                _ => tokio::time::sleep(Duration::from_millis(50)).await,
            }
        }
    })
    .await;

    match result {
        Ok(()) => Ok(()),
        Err(_) => anyhow::bail!("Timeout waiting for server to start"),
    }
}
