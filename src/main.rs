use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use sentiment_service::core::config::{DEFAULT_BIND, DEFAULT_MAX_UPLOAD_BYTES};
use sentiment_service::{
    ArtifactSource, BatchTable, SentimentAnalysisPipeline, SentimentAnalysisPipelineBuilder,
    SentimentLabel, ServiceConfig,
};

#[derive(Parser)]
#[command(name = "sentiment")]
#[command(about = "Classify review sentiment with pre-fit vectorizer, scaler and classifier artifacts")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    artifacts: ArtifactArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ArtifactArgs {
    /// Directory holding vectorizer.json, scaler.json and classifier.json
    #[arg(long, global = true, env = "SENTIMENT_ARTIFACTS", default_value = "models")]
    artifacts: PathBuf,

    /// Hugging Face Hub repository to fetch the artifacts from instead
    #[arg(long, global = true, env = "SENTIMENT_HUB_REPO")]
    hub_repo: Option<String>,

    /// Hub revision
    #[arg(long, global = true, env = "SENTIMENT_HUB_REVISION", default_value = "main")]
    hub_revision: String,

    /// Newline-separated stopword file replacing the built-in English list
    #[arg(long, global = true, env = "SENTIMENT_STOPWORDS")]
    stopwords: Option<PathBuf>,
}

impl ArtifactArgs {
    fn source(&self) -> ArtifactSource {
        match &self.hub_repo {
            Some(repo) => ArtifactSource::Hub {
                repo: repo.clone(),
                revision: self.hub_revision.clone(),
            },
            None => ArtifactSource::Dir(self.artifacts.clone()),
        }
    }

    async fn pipeline(&self) -> anyhow::Result<SentimentAnalysisPipeline> {
        let mut builder = SentimentAnalysisPipelineBuilder::from_source(self.source());
        if let Some(path) = &self.stopwords {
            builder = builder.stopwords_file(path);
        }
        builder.build().await
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(long, env = "SENTIMENT_BIND", default_value = DEFAULT_BIND)]
        bind: SocketAddr,

        /// Largest accepted request body
        #[arg(long, env = "SENTIMENT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
        max_upload_bytes: usize,
    },

    /// Classify a single text
    Predict {
        /// Text to classify
        #[arg(short, long)]
        text: String,
    },

    /// Classify every row of a CSV file with a Sentence column
    PredictFile {
        /// Input CSV
        #[arg(short, long)]
        input: PathBuf,

        /// Output CSV with a Predicted sentiment column
        #[arg(short, long)]
        output: PathBuf,

        /// Also write the distribution pie chart as PNG
        #[arg(long)]
        chart: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Serve {
            bind,
            max_upload_bytes,
        } => {
            let config = ServiceConfig {
                bind,
                artifacts: cli.artifacts.source(),
                stopwords: cli.artifacts.stopwords.clone(),
                max_upload_bytes,
            };
            sentiment_service::server::serve(config).await
        }
        Commands::Predict { text } => {
            let pipeline = cli.artifacts.pipeline().await?;
            let label = pipeline.predict(&text)?;
            println!("{label}");
            Ok(())
        }
        Commands::PredictFile {
            input,
            output,
            chart,
        } => {
            let pipeline = cli.artifacts.pipeline().await?;
            let file = File::open(&input).with_context(|| format!("Failed to open {input:?}"))?;
            let table = BatchTable::from_csv_reader(file)?;

            let prediction = tokio::task::spawn_blocking(move || pipeline.predict_batch(table)).await??;

            std::fs::write(&output, prediction.table.to_csv_bytes()?)
                .with_context(|| format!("Failed to write {output:?}"))?;
            if let Some(path) = &chart {
                std::fs::write(path, prediction.summary.chart_png())
                    .with_context(|| format!("Failed to write {path:?}"))?;
            }

            let summary = &prediction.summary;
            for label in SentimentLabel::ALL {
                println!("{label}: {}", summary.count(label));
            }
            Ok(())
        }
    }
}
