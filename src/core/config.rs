use std::net::SocketAddr;
use std::path::PathBuf;

use super::cache::ArtifactKey;

/// Where the fitted vectorizer, scaler and classifier files live.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArtifactSource {
    /// A local directory holding `vectorizer.json`, `scaler.json` and `classifier.json`.
    Dir(PathBuf),
    /// A Hugging Face Hub model repository holding the same files.
    Hub { repo: String, revision: String },
}

impl ArtifactSource {
    pub fn hub(repo: impl Into<String>) -> Self {
        ArtifactSource::Hub {
            repo: repo.into(),
            revision: "main".to_string(),
        }
    }
}

impl ArtifactKey for ArtifactSource {
    fn cache_key(&self) -> String {
        match self {
            ArtifactSource::Dir(path) => format!("dir:{}", path.display()),
            ArtifactSource::Hub { repo, revision } => format!("hub:{repo}@{revision}"),
        }
    }
}

/// Runtime settings for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub bind: SocketAddr,
    pub artifacts: ArtifactSource,
    /// Replaces the built-in English stopword list when set.
    pub stopwords: Option<PathBuf>,
    pub max_upload_bytes: usize,
}

pub const DEFAULT_BIND: &str = "127.0.0.1:5000";
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

impl ServiceConfig {
    pub fn new(artifacts: ArtifactSource) -> Self {
        Self {
            bind: SocketAddr::from(([127, 0, 0, 1], 5000)),
            artifacts,
            stopwords: None,
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cache_keys_distinguish_sources() {
        let dir = ArtifactSource::Dir(PathBuf::from("models"));
        let main = ArtifactSource::hub("acme/reviews");
        let pinned = ArtifactSource::Hub {
            repo: "acme/reviews".into(),
            revision: "v2".into(),
        };
        assert_eq!(dir.cache_key(), "dir:models");
        assert_eq!(main.cache_key(), "hub:acme/reviews@main");
        assert_ne!(main.cache_key(), pinned.cache_key());
    }

    #[test]
    fn default_bind_matches_constant() {
        let config = ServiceConfig::new(ArtifactSource::Dir(PathBuf::from(".")));
        assert_eq!(config.bind.to_string(), DEFAULT_BIND);
    }
}
