//! Asset source seam and load errors

use std::future::Future;
use thiserror::Error;

use crate::hierarchy::MeshNode;

/// Why a load did not produce a usable hierarchy.
///
/// None of these are fatal to a session: the swap controller moves to
/// `Error` and keeps showing the last good model.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LoadError {
    #[error("failed to fetch '{asset}': {reason}")]
    Fetch { asset: String, reason: String },

    #[error("failed to parse '{asset}': {reason}")]
    Parse { asset: String, reason: String },

    #[error("'{asset}' contains no geometry")]
    EmptyModel { asset: String },
}

impl LoadError {
    pub fn fetch(asset: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::Fetch {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }

    pub fn parse(asset: impl Into<String>, reason: impl ToString) -> Self {
        LoadError::Parse {
            asset: asset.into(),
            reason: reason.to_string(),
        }
    }

    pub fn asset(&self) -> &str {
        match self {
            LoadError::Fetch { asset, .. } | LoadError::Parse { asset, .. } | LoadError::EmptyModel { asset } => {
                asset
            }
        }
    }

    /// Short machine-readable category
    pub fn kind(&self) -> &'static str {
        match self {
            LoadError::Fetch { .. } => "fetch",
            LoadError::Parse { .. } => "parse",
            LoadError::EmptyModel { .. } => "empty_model",
        }
    }
}

/// Resolves an asset identifier (file name or URL) into a parsed hierarchy
pub trait AssetSource: Send + Sync + 'static {
    fn fetch(&self, asset: &str) -> impl Future<Output = Result<MeshNode, LoadError>> + Send;
}
