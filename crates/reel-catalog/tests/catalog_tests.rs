//! Catalog integration tests. These need a reachable Postgres at
//! `DATABASE_URL` and are ignored by default.

use serde_json::json;

use reel_catalog::Catalog;
use reel_models::{JobStatus, NewAsset, NewJob, NewJobOutput, NewTemplate};

async fn catalog() -> Catalog {
    dotenvy::dotenv().ok();
    let catalog = Catalog::from_env().await.expect("Failed to connect");
    catalog.init_schema().await.expect("Failed to init schema");
    catalog
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_job_create_and_get() {
    let catalog = catalog().await;
    let jobs = catalog.jobs();

    let created = jobs
        .create(NewJob::new(Some("smoke".into()), json!({"text": "HELLO"})))
        .await
        .expect("Failed to create job");

    assert_eq!(created.status, JobStatus::Queued);
    assert!(created.started_at.is_none());

    let fetched = jobs.get(&created.id).await.expect("get failed").unwrap();
    assert_eq!(fetched.id, created.id);
    assert_eq!(fetched.params["text"], "HELLO");
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_lease_is_single_shot() {
    let catalog = catalog().await;
    let jobs = catalog.jobs();

    let job = jobs
        .create(NewJob::new(None, json!({"text": "lease"})))
        .await
        .expect("Failed to create job");

    // First lease wins, the duplicate delivery is dropped.
    assert!(jobs.try_start(&job.id).await.unwrap());
    assert!(!jobs.try_start(&job.id).await.unwrap());

    let running = jobs.get(&job.id).await.unwrap().unwrap();
    assert_eq!(running.status, JobStatus::Running);
    assert!(running.started_at.is_some());

    // Terminal states are also never re-leased.
    jobs.mark_done(&job.id).await.unwrap();
    assert!(!jobs.try_start(&job.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_failed_job_records_error_text() {
    let catalog = catalog().await;
    let jobs = catalog.jobs();

    let job = jobs
        .create(NewJob::new(None, json!({"text": "boom"})))
        .await
        .unwrap();
    jobs.try_start(&job.id).await.unwrap();
    jobs.mark_failed(&job.id, "renderer http 500").await.unwrap();

    let failed = jobs.get(&job.id).await.unwrap().unwrap();
    assert_eq!(failed.status, JobStatus::Failed);
    assert_eq!(failed.error_text.as_deref(), Some("renderer http 500"));
    assert!(failed.finished_at.is_some());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_referenced_asset_is_blocked() {
    let catalog = catalog().await;

    let job = catalog
        .jobs()
        .create(NewJob::new(None, json!({"text": "ref"})))
        .await
        .unwrap();

    let asset = catalog
        .assets()
        .insert(NewAsset::new(
            reel_models::asset::kind::RENDER_OUTPUT,
            "localfs",
            format!("renders/{}/hello.mp4", job.id),
            "video/mp4",
            1024,
        ))
        .await
        .unwrap();

    assert!(!catalog.assets().is_referenced(&asset.id).await.unwrap());

    catalog
        .outputs()
        .insert(NewJobOutput::new(&job.id, &asset.id))
        .await
        .unwrap();

    assert!(catalog.assets().is_referenced(&asset.id).await.unwrap());
}

#[tokio::test]
#[ignore = "requires Postgres"]
async fn test_template_tombstone_and_name_reuse() {
    let catalog = catalog().await;
    let templates = catalog.templates();

    let name = format!("avatar-{}", reel_models::new_id("t"));

    let mut new = NewTemplate::new("avatar", &name);
    new.defaults = Some(json!({"text": "default", "captions": false}));
    let tpl = templates.create(new).await.unwrap();

    // Live duplicate name is rejected.
    let dup = templates.create(NewTemplate::new("avatar", &name)).await;
    assert!(matches!(
        dup,
        Err(reel_catalog::CatalogError::UniqueViolation(_))
    ));

    let defaults = templates.defaults(&tpl.id).await.unwrap().unwrap();
    assert_eq!(defaults["text"], "default");

    // Tombstoned templates stop resolving, and the name frees up.
    assert!(templates.soft_delete(&tpl.id).await.unwrap());
    assert!(!templates.soft_delete(&tpl.id).await.unwrap());
    assert!(templates.defaults(&tpl.id).await.unwrap().is_none());
    templates
        .create(NewTemplate::new("avatar", &name))
        .await
        .expect("name should be reusable after tombstone");
}
