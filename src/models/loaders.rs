use std::path::{Path, PathBuf};

use anyhow::Context;
use hf_hub::api::sync::Api as HfApi;
use hf_hub::{Repo, RepoType};
use serde::de::DeserializeOwned;

use super::{ClassifierConfig, CountVectorizer, ScalerConfig, SentimentModel, VectorizerConfig};
use crate::core::ArtifactSource;

pub const VECTORIZER_FILE: &str = "vectorizer.json";
pub const SCALER_FILE: &str = "scaler.json";
pub const CLASSIFIER_FILE: &str = "classifier.json";

/// Fetches one file from a Hugging Face Hub model repository.
#[derive(Debug, Clone)]
pub struct HfLoader {
    pub repo: String,
    pub revision: String,
    pub filename: String,
}

impl HfLoader {
    pub fn new(repo: &str, revision: &str, filename: &str) -> Self {
        Self {
            repo: repo.into(),
            revision: revision.into(),
            filename: filename.into(),
        }
    }

    pub fn load(&self) -> anyhow::Result<PathBuf> {
        let hf_api = HfApi::new()?;
        let hf_repo = hf_api.repo(Repo::with_revision(
            self.repo.clone(),
            RepoType::Model,
            self.revision.clone(),
        ));
        let path = hf_repo.get(&self.filename).with_context(|| {
            format!(
                "Failed to fetch {} from {}@{}",
                self.filename, self.repo, self.revision
            )
        })?;
        Ok(path)
    }
}

/// Resolves and parses the vectorizer, scaler and classifier artifacts.
#[derive(Debug, Clone)]
pub struct ArtifactLoader {
    source: ArtifactSource,
}

impl ArtifactLoader {
    pub fn new(source: ArtifactSource) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &ArtifactSource {
        &self.source
    }

    fn resolve(&self, filename: &str) -> anyhow::Result<PathBuf> {
        match &self.source {
            ArtifactSource::Dir(dir) => {
                let path = dir.join(filename);
                if !path.is_file() {
                    anyhow::bail!("Artifact {filename} not found in {dir:?}");
                }
                Ok(path)
            }
            ArtifactSource::Hub { repo, revision } => {
                HfLoader::new(repo, revision, filename).load()
            }
        }
    }

    /// Loads all three artifacts and checks they agree on dimensionality.
    pub fn load(&self) -> anyhow::Result<SentimentModel> {
        let vectorizer: VectorizerConfig = read_json(&self.resolve(VECTORIZER_FILE)?)?;
        let scaler: ScalerConfig = read_json(&self.resolve(SCALER_FILE)?)?;
        let classifier: ClassifierConfig = read_json(&self.resolve(CLASSIFIER_FILE)?)?;

        let model = SentimentModel {
            vectorizer: std::sync::Arc::new(
                CountVectorizer::from_config(vectorizer).context("Invalid vectorizer artifact")?,
            ),
            scaler: std::sync::Arc::new(scaler.build().context("Invalid scaler artifact")?),
            classifier: classifier.build().context("Invalid classifier artifact")?,
        };
        model.check_dimensions()?;

        tracing::info!(
            source = ?self.source,
            features = model.vectorizer.n_features(),
            "loaded sentiment artifacts"
        );
        Ok(model)
    }
}

fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read artifact {path:?}"))?;
    serde_json::from_str(&content).with_context(|| format!("Failed to parse artifact {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::SentimentError;
    use std::fs;

    fn write_artifacts(dir: &Path, scaler: &str) -> anyhow::Result<()> {
        fs::write(
            dir.join(VECTORIZER_FILE),
            r#"{"vocabulary": {"great": 0, "terribl": 1}}"#,
        )?;
        fs::write(dir.join(SCALER_FILE), scaler)?;
        fs::write(
            dir.join(CLASSIFIER_FILE),
            r#"{"kind": "logistic", "coef": [3.0, -3.0], "intercept": 0.0}"#,
        )?;
        Ok(())
    }

    #[test]
    fn loads_a_directory() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_artifacts(dir.path(), r#"{"kind": "identity", "n_features": 2}"#)?;
        let model = ArtifactLoader::new(ArtifactSource::Dir(dir.path().into())).load()?;
        assert_eq!(model.vectorizer.n_features(), 2);
        assert_eq!(model.classifier.n_features(), 2);
        Ok(())
    }

    #[test]
    fn missing_file_names_the_artifact() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let err = ArtifactLoader::new(ArtifactSource::Dir(dir.path().into()))
            .load()
            .unwrap_err();
        assert!(err.to_string().contains(VECTORIZER_FILE));
        Ok(())
    }

    #[test]
    fn inconsistent_widths_are_encoding_errors() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_artifacts(dir.path(), r#"{"kind": "identity", "n_features": 5}"#)?;
        let err = ArtifactLoader::new(ArtifactSource::Dir(dir.path().into()))
            .load()
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SentimentError>(),
            Some(SentimentError::Encoding(_))
        ));
        Ok(())
    }

    #[test]
    fn malformed_json_is_reported_with_path() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        write_artifacts(dir.path(), "{not json")?;
        let err = ArtifactLoader::new(ArtifactSource::Dir(dir.path().into()))
            .load()
            .unwrap_err();
        assert!(format!("{err:#}").contains(SCALER_FILE));
        Ok(())
    }
}
