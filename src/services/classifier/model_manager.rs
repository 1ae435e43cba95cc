use crate::config::ModelConfig;
use crate::error::AppError;
use crate::models::classify_types::{ModelOrigin, ModelStatus};
use crate::services::classifier::inference::{OrtEngine, OutputActivation, SessionOptions};
use futures::StreamExt;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};

const DEFAULT_MODEL_FILE: &str = "scene_classification.onnx";
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// When the remote model may be fetched.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DownloadPolicy {
    /// Download when no cached copy exists; fall back to the local model if
    /// the network is unavailable.
    #[default]
    WhenOnline,
    /// Never touch the network.
    Never,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedModel {
    pub path: PathBuf,
    pub origin: ModelOrigin,
}

#[derive(Clone)]
pub struct ModelManager {
    pub model_dir: PathBuf,
    remote_url: Option<String>,
    local_path: PathBuf,
    policy: DownloadPolicy,
    client: reqwest::Client,
}

impl ModelManager {
    pub fn new(
        cache_dir: PathBuf,
        remote_url: Option<String>,
        local_path: PathBuf,
        policy: DownloadPolicy,
    ) -> Self {
        let client = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()
            .unwrap_or_default();
        Self {
            model_dir: cache_dir.join("models"),
            remote_url,
            local_path,
            policy,
            client,
        }
    }

    pub fn from_config(config: &ModelConfig) -> Self {
        Self::new(
            config.resolved_cache_dir(),
            config.remote_url.clone(),
            config.local_path.clone(),
            config.download,
        )
    }

    /// Where the remote model lives once downloaded.
    pub fn cached_path(&self) -> Option<PathBuf> {
        self.remote_url
            .as_deref()
            .map(|url| self.model_dir.join(cache_file_name(url)))
    }

    pub fn is_cached(&self) -> bool {
        self.cached_path().map(|p| p.exists()).unwrap_or(false)
    }

    pub fn status(&self) -> ModelStatus {
        let cached = self.is_cached();
        let (origin, path) = if cached {
            (Some(ModelOrigin::Remote), self.cached_path())
        } else if self.local_path.exists() {
            (Some(ModelOrigin::Local), Some(self.local_path.clone()))
        } else {
            (None, None)
        };
        ModelStatus { cached, origin, path }
    }

    /// Picks the model to run: the cached remote model, a freshly downloaded
    /// one, or the local model when the remote is unavailable.
    pub async fn resolve(&self) -> Result<ResolvedModel, AppError> {
        if let Some(cached) = self.cached_path() {
            if cached.exists() {
                debug!("Using cached remote model {}", cached.display());
                return Ok(ResolvedModel {
                    path: cached,
                    origin: ModelOrigin::Remote,
                });
            }
        }

        match (&self.remote_url, self.policy) {
            (Some(url), DownloadPolicy::WhenOnline) => match self.download_model(url).await {
                Ok(path) => {
                    info!("Downloaded remote model to {}", path.display());
                    return Ok(ResolvedModel {
                        path,
                        origin: ModelOrigin::Remote,
                    });
                }
                Err(e) => warn!("Failed to download model from {}: {}; using local model", url, e),
            },
            (Some(_), DownloadPolicy::Never) => debug!("Downloads disabled; using local model"),
            (None, _) => debug!("No remote model configured; using local model"),
        }

        self.local_model()
    }

    fn local_model(&self) -> Result<ResolvedModel, AppError> {
        if !self.local_path.exists() {
            return Err(AppError::Model(format!(
                "remote model unavailable and local model {} does not exist",
                self.local_path.display()
            )));
        }
        Ok(ResolvedModel {
            path: self.local_path.clone(),
            origin: ModelOrigin::Local,
        })
    }

    async fn download_model(&self, url: &str) -> Result<PathBuf, AppError> {
        tokio::fs::create_dir_all(&self.model_dir).await.map_err(|e| {
            AppError::Model(format!("Failed to create model directory: {}", e))
        })?;

        let dest = self.model_dir.join(cache_file_name(url));
        let partial = dest.with_extension("part");
        if let Err(e) = download_file(&self.client, url, &partial).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e);
        }
        tokio::fs::rename(&partial, &dest).await?;
        Ok(dest)
    }

    /// Builds an inference session for `model` off the async runtime.
    pub async fn load(
        &self,
        model: &ResolvedModel,
        options: SessionOptions,
        activation: OutputActivation,
    ) -> Result<OrtEngine, AppError> {
        let path = model.path.clone();
        tokio::task::spawn_blocking(move || OrtEngine::from_file(&path, options, activation))
            .await
            .map_err(|e| AppError::Model(format!("Failed to spawn model loading task: {}", e)))?
    }
}

fn cache_file_name(url: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let name: String = path
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '.' || c == '-' || c == '_' { c } else { '_' })
        .collect();
    if name.is_empty() || name.starts_with('.') {
        DEFAULT_MODEL_FILE.to_string()
    } else {
        name
    }
}

async fn download_file(client: &reqwest::Client, url: &str, dest: &Path) -> Result<(), AppError> {
    let response = client.get(url).send().await?;

    if !response.status().is_success() {
        return Err(format!("Failed to download {}: HTTP {}", url, response.status()).into());
    }

    let total_size = response.content_length().unwrap_or(0);
    let mut downloaded: u64 = 0;
    let mut last_progress = 0;

    let mut file = tokio::fs::File::create(dest).await.map_err(|e| {
        AppError::Model(format!("Failed to create file {}: {}", dest.display(), e))
    })?;

    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        downloaded += chunk.len() as u64;
        file.write_all(&chunk).await?;

        if total_size > 0 {
            let progress = (downloaded * 100) / total_size;
            if progress > last_progress {
                debug!(progress, "downloading model");
                last_progress = progress;
            }
        }
    }
    file.flush().await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    fn manager(dir: &Path, url: Option<&str>, local: &Path, policy: DownloadPolicy) -> ModelManager {
        ModelManager::new(dir.to_path_buf(), url.map(String::from), local.to_path_buf(), policy)
    }

    /// Serves a single HTTP response on an ephemeral port.
    async fn serve_once(status: &'static str, body: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let head = format!(
                "HTTP/1.1 {}\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                status,
                body.len()
            );
            socket.write_all(head.as_bytes()).await.unwrap();
            socket.write_all(body).await.unwrap();
        });
        format!("http://{}/models/scene.onnx", addr)
    }

    #[test]
    fn cache_file_name_uses_last_segment() {
        assert_eq!(cache_file_name("https://cdn.example.com/m/scene_v2.onnx?sig=abc"), "scene_v2.onnx");
        assert_eq!(cache_file_name("https://cdn.example.com/"), DEFAULT_MODEL_FILE);
        assert_eq!(cache_file_name("https://cdn.example.com/a%20b.onnx"), "a_20b.onnx");
    }

    #[tokio::test]
    async fn offline_policy_uses_local_model() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("bundled.onnx");
        std::fs::write(&local, b"onnx").unwrap();

        let mm = manager(dir.path(), Some("http://127.0.0.1:9/scene.onnx"), &local, DownloadPolicy::Never);
        let resolved = mm.resolve().await.unwrap();
        assert_eq!(resolved.origin, ModelOrigin::Local);
        assert_eq!(resolved.path, local);
    }

    #[tokio::test]
    async fn failed_download_falls_back_to_local_model() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("bundled.onnx");
        std::fs::write(&local, b"onnx").unwrap();
        let url = serve_once("404 Not Found", b"").await;

        let mm = manager(dir.path(), Some(url.as_str()), &local, DownloadPolicy::WhenOnline);
        let resolved = mm.resolve().await.unwrap();
        assert_eq!(resolved.origin, ModelOrigin::Local);
        assert!(!mm.is_cached());
        assert!(!mm.model_dir.join("scene.part").exists());
    }

    #[tokio::test]
    async fn successful_download_is_cached() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("bundled.onnx");
        let url = serve_once("200 OK", b"remote-model").await;

        let mm = manager(dir.path(), Some(url.as_str()), &local, DownloadPolicy::WhenOnline);
        let resolved = mm.resolve().await.unwrap();
        assert_eq!(resolved.origin, ModelOrigin::Remote);
        assert_eq!(std::fs::read(&resolved.path).unwrap(), b"remote-model");
        assert!(mm.is_cached());

        // Second resolve must not hit the (now closed) server.
        let again = mm.resolve().await.unwrap();
        assert_eq!(again, resolved);
        assert_eq!(mm.status().origin, Some(ModelOrigin::Remote));
    }

    #[tokio::test]
    async fn missing_models_are_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let local = dir.path().join("missing.onnx");
        let mm = manager(dir.path(), None, &local, DownloadPolicy::WhenOnline);
        assert!(matches!(mm.resolve().await, Err(AppError::Model(_))));
        assert_eq!(mm.status().origin, None);
    }
}
