//! The per-job state machine.
//!
//! Side-effect order for one job: lease transition, output key planning,
//! input materialization (enveloped jobs), renderer invocation, output
//! upload and registration, output-row insert, cleanup, terminal status.
//! Any error short of DONE records the job FAILED with a truncated
//! message; cleanup errors alone are swallowed.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::{error, info};

use reel_catalog::{Catalog, JobsRepo, OutputsRepo};
use reel_models::NewJobOutput;
use reel_renderer::{OutputKeysV0, OutputKeysV1, RenderSpecV0, RenderSpecV1, RendererClient};
use reel_storage::StorageProvider;

use crate::cleanup::Cleanup;
use crate::config::WorkerConfig;
use crate::error::{WorkerError, WorkerResult};
use crate::inputs::InputHandler;
use crate::outputs::{OutputHandler, OutputKeys};
use crate::parser::JobParser;
use crate::util::truncate_chars;

/// Persisted failure messages are capped at this many chars.
const MAX_ERROR_TEXT: usize = 2000;

/// Drives a single leased job through the pipeline.
pub struct Processor {
    jobs: JobsRepo,
    output_rows: OutputsRepo,
    parser: JobParser,
    inputs: InputHandler,
    outputs: OutputHandler,
    cleanup: Cleanup,
    renderer: RendererClient,
}

impl Processor {
    pub fn new(
        catalog: &Catalog,
        storage: Arc<dyn StorageProvider>,
        renderer: RendererClient,
        config: &WorkerConfig,
    ) -> Self {
        Self {
            jobs: catalog.jobs(),
            output_rows: catalog.outputs(),
            parser: JobParser::new(catalog.templates()),
            inputs: InputHandler::new(
                catalog.assets(),
                Arc::clone(&storage),
                &config.storage_root,
            ),
            outputs: OutputHandler::new(
                catalog.assets(),
                Arc::clone(&storage),
                &config.storage_root,
                config.cleanup_local,
            ),
            cleanup: Cleanup::new(&config.storage_root, config.cleanup_local, storage),
            renderer,
        }
    }

    /// Process one delivery. Returns the cause when the job was marked
    /// FAILED; a dropped duplicate delivery is a success.
    pub async fn process(&self, job_id: &str) -> WorkerResult<()> {
        match self.run(job_id).await {
            Ok(()) => Ok(()),
            Err(cause) => Err(self.fail_job(job_id, cause).await),
        }
    }

    async fn run(&self, job_id: &str) -> WorkerResult<()> {
        let job = self
            .jobs
            .get(job_id)
            .await?
            .ok_or_else(|| WorkerError::JobNotFound(job_id.to_string()))?;

        let parsed = self.parser.parse(&job.params).await?;

        // The only transition out of QUEUED. A duplicate delivery finds
        // the guard already spent and is dropped.
        if !self.jobs.try_start(job_id).await? {
            info!(job_id = %job_id, "Job already left QUEUED, dropping delivery");
            return Ok(());
        }

        let captions_requested = parsed.used_v1() && parsed.captions_enabled();
        let keys = OutputKeys::for_job(job_id, captions_requested);

        let input_paths = if parsed.needs_input_materialization() {
            self.inputs.materialize(job_id, &parsed.inputs).await?
        } else {
            BTreeMap::new()
        };

        if parsed.used_v1() {
            let spec = RenderSpecV1 {
                job_id: job_id.to_string(),
                template_id: parsed.template_id.clone().unwrap_or_default(),
                inputs: input_paths,
                params: Value::Object(parsed.merged_params.clone()),
                output: OutputKeysV1 {
                    video_object_key: keys.video.clone(),
                    thumb_object_key: keys.thumb.clone(),
                    captions_object_key: keys.captions.clone(),
                },
            };
            self.renderer.render_v1(&spec).await?;
        } else {
            let spec = RenderSpecV0 {
                job_id: job_id.to_string(),
                params: Value::Object(parsed.merged_params.clone()),
                output: OutputKeysV0 {
                    video_object_key: keys.video.clone(),
                    thumb_object_key: keys.thumb.clone(),
                },
            };
            self.renderer.render_v0(&spec).await?;
        }

        let outputs = self
            .outputs
            .register_outputs(job_id, &keys, parsed.used_v1(), parsed.captions_enabled())
            .await?;

        self.output_rows
            .insert(
                NewJobOutput::new(job_id, &outputs.video_asset_id)
                    .with_thumbnail(&outputs.thumbnail_asset_id)
                    .with_captions(outputs.captions_asset_id.clone()),
            )
            .await?;

        self.cleanup.cleanup_job(job_id).await;

        self.jobs.mark_done(job_id).await?;
        info!(job_id = %job_id, "Job done");
        Ok(())
    }

    /// Record a terminal failure and hand the cause back up.
    async fn fail_job(&self, job_id: &str, cause: WorkerError) -> WorkerError {
        let message = truncate_chars(&cause.to_string(), MAX_ERROR_TEXT);

        if let Err(e) = self.jobs.mark_failed(job_id, &message).await {
            error!(job_id = %job_id, error = %e, "Failed to record job failure");
        }

        error!(
            job_id = %job_id,
            code = cause.code(),
            error = %cause,
            "Job failed"
        );
        cause
    }
}
