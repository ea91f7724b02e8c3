use std::path::{Path, PathBuf};

use anyhow::Context;
use candle_core::Device;

use super::pipeline::SentimentAnalysisPipeline;
use crate::core::{global_cache, ArtifactKey, ArtifactSource};
use crate::models::{ArtifactLoader, SentimentModel};
use crate::text::StopwordSet;

enum ModelRequest {
    Source(ArtifactSource),
    Loaded(SentimentModel),
}

/// Request for a specific device.
#[derive(Clone, Default)]
pub enum DeviceRequest {
    /// The feature matrices are small and sparse, so CPU is the default.
    #[default]
    Cpu,
    /// Select a specific CUDA device by index.
    Cuda(usize),
    /// Provide an already constructed device.
    Explicit(Device),
}

impl DeviceRequest {
    pub fn resolve(self) -> anyhow::Result<Device> {
        match self {
            DeviceRequest::Cpu => Ok(Device::Cpu),
            DeviceRequest::Cuda(i) => {
                Device::new_cuda(i).with_context(|| format!("CUDA device {i} is not available"))
            }
            DeviceRequest::Explicit(d) => Ok(d),
        }
    }
}

enum StopwordRequest {
    English,
    Set(StopwordSet),
    File(PathBuf),
}

pub struct SentimentAnalysisPipelineBuilder {
    model: ModelRequest,
    stopwords: StopwordRequest,
    device_request: DeviceRequest,
}

impl SentimentAnalysisPipelineBuilder {
    fn new(model: ModelRequest) -> Self {
        Self {
            model,
            stopwords: StopwordRequest::English,
            device_request: DeviceRequest::default(),
        }
    }

    /// Artifacts from a local directory.
    pub fn from_dir(path: impl AsRef<Path>) -> Self {
        Self::new(ModelRequest::Source(ArtifactSource::Dir(
            path.as_ref().to_path_buf(),
        )))
    }

    /// Artifacts from a Hugging Face Hub model repository, `main` revision
    /// unless [`Self::revision`] says otherwise.
    pub fn hub(repo: impl Into<String>) -> Self {
        Self::new(ModelRequest::Source(ArtifactSource::hub(repo)))
    }

    pub fn from_source(source: ArtifactSource) -> Self {
        Self::new(ModelRequest::Source(source))
    }

    /// An already loaded model; bypasses the artifact cache.
    pub fn with_model(model: SentimentModel) -> Self {
        Self::new(ModelRequest::Loaded(model))
    }

    /// Only meaningful for Hub sources.
    pub fn revision(mut self, rev: impl Into<String>) -> Self {
        if let ModelRequest::Source(ArtifactSource::Hub { revision, .. }) = &mut self.model {
            *revision = rev.into();
        }
        self
    }

    pub fn stopwords(mut self, stopwords: StopwordSet) -> Self {
        self.stopwords = StopwordRequest::Set(stopwords);
        self
    }

    /// Newline-separated stopword file replacing the built-in English list.
    pub fn stopwords_file(mut self, path: impl AsRef<Path>) -> Self {
        self.stopwords = StopwordRequest::File(path.as_ref().to_path_buf());
        self
    }

    pub fn cpu(mut self) -> Self {
        self.device_request = DeviceRequest::Cpu;
        self
    }

    pub fn cuda_device(mut self, index: usize) -> Self {
        self.device_request = DeviceRequest::Cuda(index);
        self
    }

    pub fn device(mut self, device: Device) -> Self {
        self.device_request = DeviceRequest::Explicit(device);
        self
    }

    pub async fn build(self) -> anyhow::Result<SentimentAnalysisPipeline> {
        let device = self.device_request.resolve()?;

        let model = match self.model {
            ModelRequest::Loaded(model) => model,
            ModelRequest::Source(source) => {
                let key = source.cache_key();
                global_cache()
                    .get_or_create(&key, || ArtifactLoader::new(source.clone()).load())
                    .await
                    .with_context(|| format!("Failed to load sentiment artifacts from {key}"))?
            }
        };

        let stopwords = match self.stopwords {
            StopwordRequest::English => StopwordSet::english(),
            StopwordRequest::Set(set) => set,
            StopwordRequest::File(path) => StopwordSet::from_file(&path)?,
        };

        let pipeline = SentimentAnalysisPipeline::new(model, stopwords, device)?;
        tracing::info!(features = pipeline.n_features(), "sentiment pipeline ready");
        Ok(pipeline)
    }
}
