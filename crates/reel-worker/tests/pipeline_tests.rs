//! Pipeline integration tests: the processor against a real catalog, a
//! tempdir-backed local store, and a stub renderer that writes files at
//! the agreed keys. These need a reachable Postgres at `DATABASE_URL`
//! and are ignored by default.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde_json::{json, Value};

use std::sync::atomic::{AtomicU32, Ordering};

use reel_catalog::Catalog;
use reel_models::{JobStatus, NewAsset, NewJob, NewTemplate};
use reel_renderer::RendererClient;
use reel_storage::{
    LocalFsProvider, ObjectReader, ObjectStream, PutResult, StorageProvider, StorageResult,
};
use reel_worker::{Processor, WorkerConfig};

#[derive(Clone)]
struct StubRenderer {
    root: PathBuf,
    fail: bool,
    skip_captions: bool,
}

async fn render(State(stub): State<StubRenderer>, Json(spec): Json<Value>) -> StatusCode {
    if stub.fail {
        return StatusCode::INTERNAL_SERVER_ERROR;
    }

    let text = spec["params"]["text"].as_str().unwrap_or("").to_string();
    let output = &spec["output"];

    for key_field in ["video_object_key", "thumb_object_key", "captions_object_key"] {
        if key_field == "captions_object_key" && stub.skip_captions {
            continue;
        }
        if let Some(key) = output[key_field].as_str() {
            let path = stub.root.join(key);
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(&path, format!("{key_field}:{text}")).unwrap();
        }
    }

    StatusCode::OK
}

async fn spawn_stub(stub: StubRenderer) -> String {
    let app = Router::new()
        .route("/render", post(render))
        .route("/render/v1", post(render))
        .with_state(stub);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    // Give the listener a beat to accept connections.
    tokio::time::sleep(Duration::from_millis(20)).await;
    format!("http://{addr}")
}

struct Harness {
    catalog: Catalog,
    processor: Processor,
    storage: Arc<dyn StorageProvider>,
    root: PathBuf,
    _dir: tempfile::TempDir,
}

async fn harness(fail_render: bool, skip_captions: bool) -> Harness {
    dotenvy::dotenv().ok();

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    let catalog = Catalog::from_env().await.expect("Failed to connect");
    catalog.init_schema().await.expect("Failed to init schema");

    let base_url = spawn_stub(StubRenderer {
        root: root.clone(),
        fail: fail_render,
        skip_captions,
    })
    .await;

    let storage: Arc<dyn StorageProvider> = Arc::new(LocalFsProvider::new(&root));
    let config = WorkerConfig {
        storage_root: root.to_string_lossy().into_owned(),
        cleanup_local: false,
        renderer_base_url: base_url.clone(),
        pop_timeout: Duration::from_secs(1),
    };

    let processor = Processor::new(
        &catalog,
        Arc::clone(&storage),
        RendererClient::new(&base_url).unwrap(),
        &config,
    );

    Harness {
        catalog,
        processor,
        storage,
        root,
        _dir: dir,
    }
}

async fn upload_asset(h: &Harness, mime: &str, body: &[u8]) -> String {
    let asset_id = reel_models::new_id("ast");
    let key = format!("assets/{asset_id}/original");

    let put = h
        .storage
        .put(&key, mime, Box::new(std::io::Cursor::new(body.to_vec())), body.len() as i64)
        .await
        .unwrap();

    let mut new = NewAsset::new("uploaded_input", "localfs", put.object_key, mime, put.size);
    new.id = asset_id.clone();
    h.catalog.assets().insert(new).await.unwrap();
    asset_id
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_legacy_happy_path() {
    let h = harness(false, false).await;

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(None, json!({"text": "HELLO"})))
        .await
        .unwrap();

    h.processor.process(&job.id).await.unwrap();

    let done = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Done);
    assert!(done.finished_at.is_some());
    assert!(done.error_text.is_none());

    // Exactly one output row, with live assets behind every id.
    let outputs = h.catalog.outputs().list_for_job(&job.id).await.unwrap();
    assert_eq!(outputs.len(), 1);
    let output = &outputs[0];
    assert_eq!(output.variant, 1);
    assert!(output.captions_asset_id.is_none());

    let video = h
        .catalog
        .assets()
        .get(&output.video_asset_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(video.object_key, format!("renders/{}/hello.mp4", job.id));
    assert_eq!(video.kind, "render_output");
    assert!(video.size_bytes > 0);

    // Streaming the asset back yields the rendered bytes.
    let stream = h.storage.get(&video.object_key).await.unwrap();
    assert!(stream.size > 0);
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_enveloped_happy_path_with_captions() {
    let h = harness(false, false).await;

    let avatar = upload_asset(&h, "image/png", b"png bytes").await;
    let voice = upload_asset(&h, "audio/wav", b"wav bytes").await;

    let mut tpl = NewTemplate::new("avatar", format!("tpl-{}", reel_models::new_id("n")));
    tpl.defaults = Some(json!({"text": "default"}));
    let template = h.catalog.templates().create(tpl).await.unwrap();

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(
            Some("gala".into()),
            json!({
                "template_id": template.id,
                "inputs": {
                    "avatar_image_asset_id": avatar,
                    "voice_audio_asset_id": voice
                },
                "params": {"text": "GALA", "captions": true}
            }),
        ))
        .await
        .unwrap();

    h.processor.process(&job.id).await.unwrap();

    let done = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Done);

    // Inputs were materialized under the job-scoped directory.
    let inputs_dir = h.root.join("jobs").join(&job.id).join("inputs");
    assert!(inputs_dir.join("avatar_image_asset_id.png").exists());
    assert!(inputs_dir.join("voice_audio_asset_id.wav").exists());

    // Job params won the merge: the renderer saw "GALA", not "default".
    let video_file = h.root.join("renders").join(&job.id).join("hello.mp4");
    let body = std::fs::read_to_string(video_file).unwrap();
    assert!(body.ends_with(":GALA"));

    let outputs = h.catalog.outputs().list_for_job(&job.id).await.unwrap();
    assert_eq!(outputs.len(), 1);
    let captions_id = outputs[0].captions_asset_id.as_ref().expect("captions");
    let captions = h.catalog.assets().get(captions_id).await.unwrap().unwrap();
    assert_eq!(captions.kind, "captions");
    assert_eq!(captions.mime, "text/vtt");
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_captions_requested_but_absent_still_done() {
    let h = harness(false, true).await;

    let avatar = upload_asset(&h, "image/png", b"png bytes").await;
    let mut tpl = NewTemplate::new("avatar", format!("tpl-{}", reel_models::new_id("n")));
    tpl.defaults = Some(json!({"text": "default"}));
    let template = h.catalog.templates().create(tpl).await.unwrap();

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(
            None,
            json!({
                "template_id": template.id,
                "inputs": {"avatar_image_asset_id": avatar},
                "params": {"text": "quiet", "captions": "yes"}
            }),
        ))
        .await
        .unwrap();

    h.processor.process(&job.id).await.unwrap();

    let done = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Done);

    let outputs = h.catalog.outputs().list_for_job(&job.id).await.unwrap();
    assert_eq!(outputs.len(), 1);
    assert!(outputs[0].captions_asset_id.is_none());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_missing_avatar_input_fails_job() {
    let h = harness(false, false).await;

    let mut tpl = NewTemplate::new("avatar", format!("tpl-{}", reel_models::new_id("n")));
    tpl.defaults = Some(json!({"text": "default"}));
    let template = h.catalog.templates().create(tpl).await.unwrap();

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(
            None,
            json!({
                "template_id": template.id,
                "inputs": {},
                "params": {"text": "x"}
            }),
        ))
        .await
        .unwrap();

    let err = h.processor.process(&job.id).await.unwrap_err();
    assert_eq!(err.code(), "VALIDATION_ERROR");

    let failed = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    let error_text = failed.error_text.unwrap();
    assert!(error_text.contains("avatar_image_asset_id"));
    assert!(error_text.chars().count() <= 2000);

    assert!(h
        .catalog
        .outputs()
        .list_for_job(&job.id)
        .await
        .unwrap()
        .is_empty());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_renderer_failure_fails_job_without_outputs() {
    let h = harness(true, false).await;

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(None, json!({"text": "boom"})))
        .await
        .unwrap();

    let err = h.processor.process(&job.id).await.unwrap_err();
    assert_eq!(err.code(), "UNAVAILABLE");

    let failed = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert!(!failed.error_text.as_deref().unwrap_or("").is_empty());

    // Registration is ordered after render success: no partial rows.
    assert!(h
        .catalog
        .outputs()
        .list_for_job(&job.id)
        .await
        .unwrap()
        .is_empty());
}

/// A remote-like backend: stores bytes in a side directory and hands
/// back an opaque identifier instead of the logical key.
struct SubstitutingProvider {
    inner: LocalFsProvider,
    counter: AtomicU32,
}

impl SubstitutingProvider {
    fn new(root: &std::path::Path) -> Self {
        Self {
            inner: LocalFsProvider::new(root.join("remote-objects")),
            counter: AtomicU32::new(0),
        }
    }
}

#[axum::async_trait]
impl StorageProvider for SubstitutingProvider {
    fn provider_label(&self) -> &'static str {
        "gdrive"
    }

    async fn put(
        &self,
        _key: &str,
        content_type: &str,
        reader: ObjectReader,
        size: i64,
    ) -> StorageResult<PutResult> {
        let id = format!("DRIVE-{}", self.counter.fetch_add(1, Ordering::SeqCst));
        self.inner.put(&id, content_type, reader, size).await?;
        Ok(PutResult {
            object_key: id,
            size,
        })
    }

    async fn get(&self, key: &str) -> StorageResult<ObjectStream> {
        self.inner.get(key).await
    }

    async fn delete(&self, key: &str) -> StorageResult<()> {
        self.inner.delete(key).await
    }
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_remote_provider_key_substitution_and_cleanup() {
    dotenvy::dotenv().ok();

    let dir = tempfile::tempdir().unwrap();
    let root = dir.path().to_path_buf();

    let catalog = Catalog::from_env().await.expect("Failed to connect");
    catalog.init_schema().await.expect("Failed to init schema");

    let base_url = spawn_stub(StubRenderer {
        root: root.clone(),
        fail: false,
        skip_captions: false,
    })
    .await;

    let storage: Arc<dyn StorageProvider> = Arc::new(SubstitutingProvider::new(&root));
    let config = WorkerConfig {
        storage_root: root.to_string_lossy().into_owned(),
        cleanup_local: true,
        renderer_base_url: base_url.clone(),
        pop_timeout: Duration::from_secs(1),
    };

    let processor = Processor::new(
        &catalog,
        Arc::clone(&storage),
        RendererClient::new(&base_url).unwrap(),
        &config,
    );

    let job = catalog
        .jobs()
        .create(NewJob::new(None, json!({"text": "remote"})))
        .await
        .unwrap();

    processor.process(&job.id).await.unwrap();

    let outputs = catalog.outputs().list_for_job(&job.id).await.unwrap();
    assert_eq!(outputs.len(), 1);

    // The row stores the provider-assigned id, not the staging key.
    let video = catalog
        .assets()
        .get(&outputs[0].video_asset_id)
        .await
        .unwrap()
        .unwrap();
    assert!(video.object_key.starts_with("DRIVE-"));
    assert_eq!(video.provider, "gdrive");

    // The bytes stream back through the substituted key.
    let stream = storage.get(&video.object_key).await.unwrap();
    assert!(stream.size > 0);

    // Cleanup removed the staging copies for the remote provider.
    assert!(!root.join("renders").join(&job.id).join("hello.mp4").exists());
    assert!(!root.join("renders").join(&job.id).exists());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_duplicate_delivery_is_dropped() {
    let h = harness(false, false).await;

    let job = h
        .catalog
        .jobs()
        .create(NewJob::new(None, json!({"text": "twice"})))
        .await
        .unwrap();

    h.processor.process(&job.id).await.unwrap();
    // Second delivery of the same id finds the job terminal and drops.
    h.processor.process(&job.id).await.unwrap();

    let done = h.catalog.jobs().get(&job.id).await.unwrap().unwrap();
    assert_eq!(done.status, JobStatus::Done);
    assert_eq!(
        h.catalog.outputs().list_for_job(&job.id).await.unwrap().len(),
        1
    );
}
