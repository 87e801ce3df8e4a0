//! One normalization run: fetch, render on a blocking thread, optionally write.
//!
//! Each run produces a [`RunReport`]. Failures never escape as errors or
//! panics; they are recorded in the report, whose transcript is what the
//! caller of `/run` sees.

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use imageframe_core::{normalize, LayoutPlan, NormalizeError, NormalizeOptions};
use serde::Serialize;
use thiserror::Error;

use crate::fetch::{AssetFetcher, FetchError};
use crate::output::{CanvasOutput, OutputError};

/// Final transcript line of a run that reached the photo server.
pub const COMPLETION_MARKER: &str = "Script executed successfully";

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Fetch(#[from] FetchError),

    /// The photo server answered with something other than 200.
    #[error("photo server returned HTTP {status}")]
    UpstreamStatus { status: u16 },

    #[error(transparent)]
    Normalize(#[from] NormalizeError),

    #[error(transparent)]
    Output(#[from] OutputError),

    /// The blocking render task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Launch(String),

    #[error("run did not finish within {0:?}")]
    Timeout(Duration),
}

impl PipelineError {
    /// Status code used when failures are reported as HTTP errors.
    pub fn status_code(&self) -> StatusCode {
        match self {
            PipelineError::Fetch(_) | PipelineError::UpstreamStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            PipelineError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
            PipelineError::Normalize(_) | PipelineError::Output(_) | PipelineError::Launch(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

/// What a successful run produced.
#[derive(Debug, Clone, Serialize)]
pub struct CanvasSummary {
    pub width: u32,
    pub height: u32,
    pub layout: LayoutPlan,
    pub written_to: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunReport {
    pub asset_id: String,
    /// Status returned by the photo server, if it answered.
    pub upstream_status: Option<u16>,
    pub outcome: Result<CanvasSummary, PipelineError>,
}

impl RunReport {
    /// Status to answer with when failures are surfaced.
    pub fn status_code(&self) -> StatusCode {
        match &self.outcome {
            Ok(_) => StatusCode::OK,
            Err(e) => e.status_code(),
        }
    }

    /// Transcript lines relayed to the caller.
    ///
    /// A run that got an answer from the photo server and then either
    /// rendered or skipped rendering reports the status and the completion
    /// marker; any other failure reports only the error.
    pub fn lines(&self) -> Vec<String> {
        match (&self.outcome, self.upstream_status) {
            (Ok(_), Some(status)) | (Err(PipelineError::UpstreamStatus { .. }), Some(status)) => {
                vec![status.to_string(), COMPLETION_MARKER.to_string()]
            }
            (Err(e), _) => vec![format!("error: {e}")],
            (Ok(_), None) => vec![COMPLETION_MARKER.to_string()],
        }
    }

    /// The transcript as text, one line per entry.
    pub fn transcript(&self) -> String {
        self.lines()
            .into_iter()
            .map(|line| line + "\n")
            .collect()
    }
}

/// Runs the fetch and render steps for one asset.
#[derive(Debug, Clone)]
pub struct Normalizer {
    fetcher: AssetFetcher,
    options: NormalizeOptions,
    output: Option<CanvasOutput>,
    run_timeout: Duration,
}

impl Normalizer {
    pub fn new(fetcher: AssetFetcher, options: NormalizeOptions, run_timeout: Duration) -> Self {
        Self {
            fetcher,
            options,
            output: None,
            run_timeout,
        }
    }

    /// Write every rendered canvas to `output`.
    pub fn with_output(mut self, output: CanvasOutput) -> Self {
        self.output = Some(output);
        self
    }

    /// Run the pipeline for `asset_id`, bounded by the run timeout.
    ///
    /// A render still going when the timeout fires keeps its thread until it
    /// finishes, but it is abandoned: its canvas is never written.
    #[tracing::instrument(skip(self))]
    pub async fn run(&self, asset_id: &str) -> RunReport {
        let abandoned = Arc::new(AtomicBool::new(false));
        let execution = self.execute(asset_id, Arc::clone(&abandoned));

        let report = match tokio::time::timeout(self.run_timeout, execution).await {
            Ok(report) => report,
            Err(_) => {
                abandoned.store(true, Ordering::SeqCst);
                RunReport {
                    asset_id: asset_id.to_string(),
                    upstream_status: None,
                    outcome: Err(PipelineError::Timeout(self.run_timeout)),
                }
            }
        };

        match &report.outcome {
            Ok(summary) => tracing::info!(
                status = report.upstream_status,
                orientation = ?summary.layout.orientation,
                width = summary.width,
                height = summary.height,
                "canvas rendered"
            ),
            Err(e) => tracing::warn!(
                status = report.upstream_status,
                error = %e,
                "run finished without a canvas"
            ),
        }

        report
    }

    async fn execute(&self, asset_id: &str, abandoned: Arc<AtomicBool>) -> RunReport {
        let report = |upstream_status: Option<u16>,
                      outcome: Result<CanvasSummary, PipelineError>| RunReport {
            asset_id: asset_id.to_string(),
            upstream_status,
            outcome,
        };

        let asset = match self.fetcher.fetch(asset_id).await {
            Ok(asset) => asset,
            Err(e) => return report(None, Err(e.into())),
        };
        let status = asset.status;

        let Some(body) = asset.body else {
            return report(Some(status), Err(PipelineError::UpstreamStatus { status }));
        };

        let options = self.options;
        let output = self.output.clone();
        let run_timeout = self.run_timeout;
        let task = tokio::task::spawn_blocking(move || {
            let target = output.as_ref().map(|output| RenderTarget {
                output,
                abandoned: &abandoned,
                run_timeout,
            });
            render(&body, &options, target)
        });

        let outcome = match task.await {
            Ok(result) => result,
            Err(join_error) => Err(PipelineError::Launch(join_error.to_string())),
        };

        report(Some(status), outcome)
    }
}

/// Where a render persists its canvas, and whether it still may.
struct RenderTarget<'a> {
    output: &'a CanvasOutput,
    abandoned: &'a AtomicBool,
    run_timeout: Duration,
}

fn render(
    bytes: &[u8],
    options: &NormalizeOptions,
    target: Option<RenderTarget<'_>>,
) -> Result<CanvasSummary, PipelineError> {
    let canvas = normalize(bytes, options)?;

    let written_to = match target {
        Some(target) => {
            let staged = target.output.stage(&canvas.image)?;
            // The caller has already reported a timeout; the staged file is
            // dropped and removed.
            if target.abandoned.load(Ordering::SeqCst) {
                tracing::warn!("run abandoned after timeout, canvas discarded");
                return Err(PipelineError::Timeout(target.run_timeout));
            }
            Some(staged.commit()?)
        }
        None => None,
    };

    Ok(CanvasSummary {
        width: canvas.width(),
        height: canvas.height(),
        layout: canvas.layout,
        written_to,
    })
}
