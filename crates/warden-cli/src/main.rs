use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use tokio::time::{Duration, sleep};

use warden_core::app::{CleanupEngine, RunOutcome, SpawnOutcome};
use warden_core::config::{ConfigStore, WardenConfig};
use warden_core::domain::{ClassMapping, RetentionClass, TriggerKind};
use warden_core::impls::{InMemoryArtifactIndex, InMemoryRecorder, SimRemoteFs};
use warden_core::ports::{ArtifactIndex, RemoteFs, RunRecorder, SystemClock, artifact_path};

fn demo_config() -> WardenConfig {
    let mut config = WardenConfig::default();
    config.retention_classes = vec![
        RetentionClass {
            name: "nightly".to_string(),
            retention_days: 3,
            priority: 1,
        },
        RetentionClass {
            name: "release".to_string(),
            retention_days: 30,
            priority: 3,
        },
    ];
    config.class_mappings = vec![
        ClassMapping {
            pattern: "release-*".to_string(),
            class: "release".to_string(),
        },
        ClassMapping {
            pattern: "*".to_string(),
            class: "nightly".to_string(),
        },
    ];
    config
}

/// Seed a simulated file server at ~95% usage: a disk of 10 GiB with
/// nightly and release builds of various ages.
async fn seed_server(
    root: &str,
    remote: &SimRemoteFs,
    now: DateTime<Utc>,
) -> HashMap<String, Vec<(String, DateTime<Utc>)>> {
    let gib = 1024u64 * 1024 * 1024;
    let builds: &[(&str, &str, i64, u64)] = &[
        ("app-main", "1021", 6, gib / 2),
        ("app-main", "1022", 5, gib / 2),
        ("app-main", "1023", 2, gib / 2),
        ("app-main", "1024", 1, gib / 2),
        ("release-2026", "7", 45, gib),
        ("release-2026", "8", 12, gib),
    ];

    let mut tree: HashMap<String, Vec<(String, DateTime<Utc>)>> = HashMap::new();
    for (collection, artifact, age_days, size) in builds {
        let modified = now - ChronoDuration::days(*age_days);
        tree.entry(collection.to_string())
            .or_default()
            .push((artifact.to_string(), modified));
        remote
            .add_directory(artifact_path(root, collection, artifact), *size)
            .await;
    }
    tree
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    // (A) Config + simulated collaborators.
    let config = demo_config();
    let root = config.server.artifact_root.clone();
    let now = Utc::now();

    let gib = 1024u64 * 1024 * 1024;
    let remote = Arc::new(SimRemoteFs::new(10 * gib, 5 * gib + gib / 2));
    let tree = seed_server(&root, &remote, now).await;
    let index = Arc::new(InMemoryArtifactIndex::new(tree));
    let recorder = Arc::new(InMemoryRecorder::new());

    let engine = CleanupEngine::new(
        Arc::new(ConfigStore::new(config)),
        Arc::clone(&index) as Arc<dyn ArtifactIndex>,
        Arc::clone(&remote) as Arc<dyn RemoteFs>,
        Arc::clone(&recorder) as Arc<dyn RunRecorder>,
        Arc::new(SystemClock),
    );

    println!("disk usage before: {:.1}%", remote.usage_percent().await);

    // (B) Dry-run first: preview what the policy would delete.
    match engine.run_cleanup(TriggerKind::Manual, true).await {
        Ok(RunOutcome::Completed(run)) => {
            println!("dry-run {} considered these builds:", run.id);
            for log in recorder.logs().await {
                println!(
                    "  {}/{} class={} age={:.1}d score={:.1}",
                    log.collection, log.artifact, log.class_name, log.age_days, log.score
                );
            }
        }
        Ok(RunOutcome::Busy) => println!("engine busy, try later"),
        Err(e) => eprintln!("dry-run failed: {e}"),
    }

    // (C) Real cleanup in the background, like a manual trigger from the
    // UI; watch progress through the status snapshot.
    match engine.spawn_cleanup(TriggerKind::Manual) {
        SpawnOutcome::Started => println!("cleanup started"),
        SpawnOutcome::Busy => println!("cleanup already in progress"),
    }

    loop {
        let status = engine.status();
        if !status.running {
            break;
        }
        if let Some(progress) = status.progress {
            println!("  [{}] {progress}", status.current_run_id.map_or_else(|| "-".to_string(), |id| id.to_string()));
        }
        sleep(Duration::from_millis(50)).await;
    }

    // (D) Final state, from the run records.
    for run in recorder.runs().await {
        println!(
            "{}: {:?} {:?} deleted={} freed={} bytes, usage {:?}% -> {:?}%",
            run.id,
            run.trigger,
            run.status,
            run.builds_deleted,
            run.bytes_freed,
            run.disk_usage_before,
            run.disk_usage_after
        );
    }
    println!("disk usage after: {:.1}%", remote.usage_percent().await);
}
