//! Model fetching from the models directory or over HTTP
//!
//! Assets named by an `http://` or `https://` URL are downloaded; anything
//! else is a path relative to the configured models directory. The fetched
//! glTF document is turned into a hierarchy off the async runtime.

use anyhow::{Context, Result};
use facade_core::{hierarchy_from_gltf, AssetSource, LoadError, MeshNode};
use std::path::{Component, Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Asset source backed by the local models directory and an HTTP client
pub struct ModelFetcher {
    client: reqwest::Client,
    models_dir: PathBuf,
}

impl ModelFetcher {
    pub fn new(models_dir: impl Into<PathBuf>) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            models_dir: models_dir.into(),
        })
    }

    pub fn models_dir(&self) -> &Path {
        &self.models_dir
    }

    /// Map an asset name to a file under the models directory
    pub fn resolve_path(&self, asset: &str) -> Result<PathBuf, LoadError> {
        let relative = Path::new(asset);
        let escapes = relative
            .components()
            .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir));
        if asset.is_empty() || escapes {
            return Err(LoadError::fetch(asset, "path is outside the models directory"));
        }
        Ok(self.models_dir.join(relative))
    }

    async fn read_bytes(&self, asset: &str) -> Result<Vec<u8>, LoadError> {
        if is_url(asset) {
            debug!(url = %asset, "Downloading model");
            let response = self
                .client
                .get(asset)
                .send()
                .await
                .map_err(|e| LoadError::fetch(asset, e))?;
            if !response.status().is_success() {
                return Err(LoadError::fetch(asset, format!("HTTP {}", response.status())));
            }
            let bytes = response.bytes().await.map_err(|e| LoadError::fetch(asset, e))?;
            Ok(bytes.to_vec())
        } else {
            let path = self.resolve_path(asset)?;
            debug!(path = %path.display(), "Reading model");
            tokio::fs::read(&path).await.map_err(|e| LoadError::fetch(asset, e))
        }
    }
}

fn is_url(asset: &str) -> bool {
    asset.starts_with("http://") || asset.starts_with("https://")
}

impl AssetSource for ModelFetcher {
    async fn fetch(&self, asset: &str) -> Result<MeshNode, LoadError> {
        let bytes = self.read_bytes(asset).await?;
        let size = bytes.len();

        let name = asset.to_string();
        let root = tokio::task::spawn_blocking(move || hierarchy_from_gltf(&name, &bytes))
            .await
            .map_err(|e| LoadError::parse(asset, e))??;

        info!(asset = %asset, bytes = size, nodes = root.node_count(), "Fetched model");
        Ok(root)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const TRIANGLE: &str = r#"{
        "asset": { "version": "2.0" },
        "scene": 0,
        "scenes": [{ "nodes": [0] }],
        "nodes": [{ "name": "hall", "mesh": 0, "translation": [0.0, 0.0, 5.0] }],
        "meshes": [{ "primitives": [{ "attributes": { "POSITION": 0 } }] }],
        "accessors": [{
            "componentType": 5126, "count": 3, "type": "VEC3",
            "min": [0.0, 0.0, 0.0], "max": [4.0, 3.0, 2.0]
        }]
    }"#;

    #[test]
    fn test_resolve_rejects_escaping_paths() {
        let fetcher = ModelFetcher::new("/srv/models").unwrap();
        assert_eq!(
            fetcher.resolve_path("office/tower.glb").unwrap(),
            PathBuf::from("/srv/models/office/tower.glb")
        );
        assert!(fetcher.resolve_path("../secret.glb").is_err());
        assert!(fetcher.resolve_path("/etc/passwd").is_err());
        assert!(fetcher.resolve_path("").is_err());
    }

    #[tokio::test]
    async fn test_fetch_local_model() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hall.gltf"), TRIANGLE).unwrap();

        let fetcher = ModelFetcher::new(dir.path()).unwrap();
        let root = fetcher.fetch("hall.gltf").await.unwrap();
        assert!(root.has_geometry());
    }

    #[tokio::test]
    async fn test_missing_file_is_fetch_error() {
        let dir = TempDir::new().unwrap();
        let fetcher = ModelFetcher::new(dir.path()).unwrap();
        let err = fetcher.fetch("nowhere.gltf").await.unwrap_err();
        assert_eq!(err.kind(), "fetch");
        assert_eq!(err.asset(), "nowhere.gltf");
    }

    #[tokio::test]
    async fn test_garbage_is_parse_error() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("broken.gltf"), "not a model").unwrap();

        let fetcher = ModelFetcher::new(dir.path()).unwrap();
        let err = fetcher.fetch("broken.gltf").await.unwrap_err();
        assert_eq!(err.kind(), "parse");
    }
}
