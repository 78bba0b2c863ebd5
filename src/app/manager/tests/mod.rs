//! Unit tests for the download manager
//!
//! The manager is driven by a scripted fetcher so that every outcome, and the
//! progress record at the moment of each fetch, can be checked without a
//! network. HTTP-backed scenarios live in the top-level tests directory.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tempfile::TempDir;
use tokio::sync::{broadcast, mpsc};

use crate::app::client::AssetFetcher;
use crate::app::models::WorkSet;
use crate::app::progress::ProgressStore;
use crate::errors::{FetchError, FetchResult};

use super::*;

/// Fetch call observed by the scripted fetcher
#[derive(Debug, Clone)]
struct FetchCall {
    url: String,
    /// Pending identifiers in the progress record when the fetch started
    record_at_fetch: Vec<String>,
}

/// Fetcher that answers from a script instead of the network
#[derive(Clone, Default)]
struct ScriptedFetcher {
    failures: Arc<HashMap<String, FetchError>>,
    calls: Arc<Mutex<Vec<FetchCall>>>,
    record_path: Option<PathBuf>,
    /// Fire shutdown once this many fetches have completed
    shutdown_after: Option<(usize, broadcast::Sender<()>)>,
}

impl ScriptedFetcher {
    fn new() -> Self {
        Self::default()
    }

    fn failing(mut self, url: &str, error: FetchError) -> Self {
        let mut failures = (*self.failures).clone();
        failures.insert(url.to_string(), error);
        self.failures = Arc::new(failures);
        self
    }

    fn observing(mut self, record_path: &Path) -> Self {
        self.record_path = Some(record_path.to_path_buf());
        self
    }

    fn shutdown_after(mut self, count: usize, tx: broadcast::Sender<()>) -> Self {
        self.shutdown_after = Some((count, tx));
        self
    }

    fn urls(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|call| call.url.clone())
            .collect()
    }

    fn calls(&self) -> Vec<FetchCall> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssetFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str, destination: &Path) -> FetchResult<()> {
        let record_at_fetch = self
            .record_path
            .as_ref()
            .and_then(|path| ProgressStore::new(path).load().unwrap())
            .map(|set| set.identifiers().map(String::from).collect())
            .unwrap_or_default();

        let count = {
            let mut calls = self.calls.lock().unwrap();
            calls.push(FetchCall {
                url: url.to_string(),
                record_at_fetch,
            });
            calls.len()
        };

        let result = match self.failures.get(url) {
            Some(error) => Err(error.clone()),
            None => {
                std::fs::write(destination, format!("body of {}", url)).unwrap();
                Ok(())
            }
        };

        if let Some((after, tx)) = &self.shutdown_after {
            if count == *after {
                let _ = tx.send(());
            }
        }

        result
    }
}

struct Fixture {
    _dir: TempDir,
    output_dir: PathBuf,
    record_path: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = TempDir::new().unwrap();
        let output_dir = dir.path().join("out");
        let record_path = dir.path().join("data").join("download_progress.json");
        Self {
            _dir: dir,
            output_dir,
            record_path,
        }
    }

    fn store(&self) -> ProgressStore {
        ProgressStore::new(&self.record_path)
    }

    fn config(&self) -> ManagerConfig {
        ManagerConfig::new(&self.output_dir)
            .with_inter_item_delay(Duration::ZERO)
            .with_default_extension("pdf")
    }

    fn manager(&self, fetcher: ScriptedFetcher) -> DownloadManager<ScriptedFetcher> {
        DownloadManager::new(self.config(), self.store(), fetcher)
    }

    fn output(&self, name: &str) -> PathBuf {
        self.output_dir.join(name)
    }
}

fn seed(items: &[(&str, &str)]) -> WorkSet {
    items.iter().copied().collect()
}

fn abc() -> WorkSet {
    seed(&[
        ("A", "http://h/a.pdf"),
        ("B", "http://h/b.pdf"),
        ("C", "http://h/c.pdf"),
    ])
}

// All items fetched in order, record removed at the end
#[tokio::test]
async fn test_fresh_run_completes_and_clears_record() {
    let fixture = Fixture::new();
    let fetcher = ScriptedFetcher::new();
    let mut manager = fixture.manager(fetcher.clone());

    let summary = manager.run_with_seed(abc()).await.unwrap();

    assert_eq!(summary.status, RunStatus::Complete);
    assert_eq!(summary.succeeded, 3);
    assert_eq!(summary.remaining, 0);
    assert!(!summary.resumed);
    assert_eq!(
        fetcher.urls(),
        vec!["http://h/a.pdf", "http://h/b.pdf", "http://h/c.pdf"]
    );
    assert!(fixture.output("A.pdf").exists());
    assert!(fixture.output("C.pdf").exists());
    assert!(!fixture.store().exists());
}

// Second run over the same output makes no network calls
#[tokio::test]
async fn test_rerun_is_idempotent() {
    let fixture = Fixture::new();
    fixture.manager(ScriptedFetcher::new()).run_with_seed(abc()).await.unwrap();

    let fetcher = ScriptedFetcher::new();
    let summary = fixture
        .manager(fetcher.clone())
        .run_with_seed(abc())
        .await
        .unwrap();

    assert!(fetcher.urls().is_empty());
    assert_eq!(summary.skipped, 3);
    assert_eq!(summary.status, RunStatus::Complete);
    assert!(!fixture.store().exists());
}

// Existing destination is skipped and dropped from the record
#[tokio::test]
async fn test_existing_destination_skipped() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(&fixture.output_dir).unwrap();
    std::fs::write(fixture.output("B.pdf"), "already here").unwrap();

    let fetcher = ScriptedFetcher::new();
    let summary = fixture
        .manager(fetcher.clone())
        .run_with_seed(abc())
        .await
        .unwrap();

    assert_eq!(fetcher.urls(), vec!["http://h/a.pdf", "http://h/c.pdf"]);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.succeeded, 2);
    assert_eq!(
        std::fs::read_to_string(fixture.output("B.pdf")).unwrap(),
        "already here"
    );
}

// A succeeds, B returns 500: record keeps only B, next run fetches only B
#[tokio::test]
async fn test_failed_item_stays_pending_and_is_retried() {
    let fixture = Fixture::new();
    let items = seed(&[("A", "http://h/a.pdf"), ("B", "http://h/b.pdf")]);

    let fetcher = ScriptedFetcher::new().failing("http://h/b.pdf", FetchError::BadStatus(500));
    let summary = fixture
        .manager(fetcher)
        .run_with_seed(items.clone())
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Partial { remaining: 1 });
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.failures[0].identifier, "B");
    assert_eq!(summary.failures[0].error, FetchError::BadStatus(500));
    assert!(fixture.output("A.pdf").exists());
    assert!(!fixture.output("B.pdf").exists());

    let record = fixture.store().load().unwrap().unwrap();
    assert_eq!(record, seed(&[("B", "http://h/b.pdf")]));

    let retry = ScriptedFetcher::new();
    let summary = fixture
        .manager(retry.clone())
        .run(|| async {
            Err::<WorkSet, _>(AppError::generic(
                "fresh seed must not be consulted while a record exists",
            ))
        })
        .await
        .unwrap();

    assert!(summary.resumed);
    assert_eq!(retry.urls(), vec!["http://h/b.pdf"]);
    assert_eq!(summary.status, RunStatus::Complete);
    assert!(!fixture.store().exists());
}

// Record never grows and reflects every earlier outcome when a fetch starts
#[tokio::test]
async fn test_record_shrinks_monotonically() {
    let fixture = Fixture::new();
    let fetcher = ScriptedFetcher::new()
        .failing("http://h/b.pdf", FetchError::Transport("reset".into()))
        .observing(&fixture.record_path);

    fixture
        .manager(fetcher.clone())
        .run_with_seed(abc())
        .await
        .unwrap();

    let snapshots: Vec<Vec<String>> = fetcher
        .calls()
        .into_iter()
        .map(|call| call.record_at_fetch)
        .collect();
    assert_eq!(
        snapshots,
        vec![
            vec!["A".to_string(), "B".into(), "C".into()],
            vec!["B".to_string(), "C".into()],
            vec!["B".to_string(), "C".into()],
        ]
    );

    let record = fixture.store().load().unwrap().unwrap();
    assert_eq!(record.identifiers().collect::<Vec<_>>(), vec!["B"]);
}

// Interrupted run resumes from the record without re-fetching finished items
#[tokio::test]
async fn test_cancelled_run_resumes() {
    let fixture = Fixture::new();
    let (tx, rx) = create_shutdown_channel();
    let fetcher = ScriptedFetcher::new().shutdown_after(1, tx);

    let summary = fixture
        .manager(fetcher.clone())
        .with_shutdown(rx)
        .run_with_seed(abc())
        .await
        .unwrap();

    assert_eq!(fetcher.urls(), vec!["http://h/a.pdf"]);
    assert_eq!(summary.status, RunStatus::Cancelled { remaining: 2 });
    let record = fixture.store().load().unwrap().unwrap();
    assert_eq!(record.identifiers().collect::<Vec<_>>(), vec!["B", "C"]);

    let resumed = ScriptedFetcher::new();
    let summary = fixture
        .manager(resumed.clone())
        .run_with_seed(seed(&[("Z", "http://h/z.pdf")]))
        .await
        .unwrap();

    assert!(summary.resumed);
    assert_eq!(resumed.urls(), vec!["http://h/b.pdf", "http://h/c.pdf"]);
    assert!(!fixture.output("Z.pdf").exists());
    assert!(!fixture.store().exists());
}

// Shutdown during the pacing delay stops without waiting it out
#[tokio::test]
async fn test_shutdown_interrupts_delay() {
    let fixture = Fixture::new();
    let (tx, rx) = create_shutdown_channel();
    let fetcher = ScriptedFetcher::new().shutdown_after(1, tx);
    let config = fixture
        .config()
        .with_inter_item_delay(Duration::from_secs(30));

    let mut manager =
        DownloadManager::new(config, fixture.store(), fetcher.clone()).with_shutdown(rx);

    let summary = tokio::time::timeout(Duration::from_secs(5), manager.run_with_seed(abc()))
        .await
        .expect("delay should be interrupted")
        .unwrap();

    assert_eq!(summary.status, RunStatus::Cancelled { remaining: 2 });
    assert_eq!(fetcher.urls().len(), 1);
}

// Empty seed completes immediately and leaves no record
#[tokio::test]
async fn test_empty_seed_completes() {
    let fixture = Fixture::new();
    let fetcher = ScriptedFetcher::new();

    let summary = fixture
        .manager(fetcher.clone())
        .run_with_seed(WorkSet::new())
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Complete);
    assert_eq!(summary.total, 0);
    assert!(fetcher.urls().is_empty());
    assert!(!fixture.store().exists());
}

// Empty record from an earlier run counts as finished
#[tokio::test]
async fn test_empty_record_is_cleared() {
    let fixture = Fixture::new();
    fixture.store().save(&WorkSet::new()).unwrap();

    let summary = fixture
        .manager(ScriptedFetcher::new())
        .run_with_seed(abc())
        .await
        .unwrap();

    assert_eq!(summary.status, RunStatus::Complete);
    assert!(summary.resumed);
    assert!(!fixture.store().exists());
    assert!(!fixture.output("A.pdf").exists());
}

// Events arrive in processing order
#[tokio::test]
async fn test_events_emitted() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(&fixture.output_dir).unwrap();
    std::fs::write(fixture.output("A.pdf"), "x").unwrap();

    let (tx, mut rx) = mpsc::channel(32);
    let fetcher = ScriptedFetcher::new().failing("http://h/c.pdf", FetchError::BadStatus(404));
    fixture
        .manager(fetcher)
        .with_events(tx)
        .run_with_seed(abc())
        .await
        .unwrap();

    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }

    assert_eq!(
        events,
        vec![
            DownloadEvent::Started {
                total: 3,
                resumed: false
            },
            DownloadEvent::ItemSkipped {
                index: 1,
                total: 3,
                identifier: "A".into()
            },
            DownloadEvent::ItemSucceeded {
                index: 2,
                total: 3,
                identifier: "B".into()
            },
            DownloadEvent::ItemFailed {
                index: 3,
                total: 3,
                identifier: "C".into(),
                error: FetchError::BadStatus(404)
            },
            DownloadEvent::Finished {
                status: RunStatus::Partial { remaining: 1 }
            },
        ]
    );
}

// Unwritable record location is fatal
#[tokio::test]
async fn test_persist_failure_is_fatal() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(fixture.record_path.parent().unwrap()).unwrap();
    // A directory where the record file should go cannot be replaced by a file
    std::fs::create_dir_all(fixture.record_path.join("blocker")).unwrap();

    let result = fixture
        .manager(ScriptedFetcher::new())
        .run_with_seed(abc())
        .await;

    assert!(matches!(result, Err(AppError::Progress(_))));
}

// Identifiers are sanitized into safe file names
#[tokio::test]
async fn test_identifier_sanitized_for_destination() {
    let fixture = Fixture::new();
    let fetcher = ScriptedFetcher::new();

    fixture
        .manager(fetcher)
        .run_with_seed(seed(&[("a/b:c", "http://h/x")]))
        .await
        .unwrap();

    let expected = PathGenerator::file_name_for("a/b:c", Some("pdf"));
    assert!(expected.starts_with("a-b-c-"));
    assert!(fixture.output(&expected).exists());
}

// Identifiers whose sanitized or extended names look alike are each fetched
#[tokio::test]
async fn test_lookalike_identifiers_each_downloaded() {
    let fixture = Fixture::new();
    let fetcher = ScriptedFetcher::new();
    let items = seed(&[
        ("a/b", "http://h/first"),
        ("a-b", "http://h/second"),
        ("X", "http://h/x"),
        ("X.pdf", "http://h/xpdf"),
    ]);

    let summary = fixture
        .manager(fetcher.clone())
        .run_with_seed(items.clone())
        .await
        .unwrap();

    assert_eq!(summary.succeeded, 4);
    assert_eq!(summary.skipped, 0);
    assert_eq!(
        fetcher.urls(),
        vec![
            "http://h/first",
            "http://h/second",
            "http://h/x",
            "http://h/xpdf"
        ]
    );
    for item in &items {
        let name = PathGenerator::file_name_for(&item.identifier, Some("pdf"));
        assert_eq!(
            std::fs::read_to_string(fixture.output(&name)).unwrap(),
            format!("body of {}", item.source_url)
        );
    }
}

// A lookalike left pending is not mistaken for its finished neighbour
#[tokio::test]
async fn test_resumed_lookalike_not_skipped() {
    let fixture = Fixture::new();
    let first = ScriptedFetcher::new().failing("http://h/second", FetchError::BadStatus(503));
    fixture
        .manager(first)
        .run_with_seed(seed(&[("a/b", "http://h/first"), ("a-b", "http://h/second")]))
        .await
        .unwrap();

    let retry = ScriptedFetcher::new();
    let summary = fixture
        .manager(retry.clone())
        .run_with_seed(WorkSet::new())
        .await
        .unwrap();

    assert!(summary.resumed);
    assert_eq!(summary.succeeded, 1);
    assert_eq!(retry.urls(), vec!["http://h/second"]);
    assert_eq!(
        std::fs::read_to_string(fixture.output("a-b.pdf")).unwrap(),
        "body of http://h/second"
    );
}

// The pacing delay separates consecutive fetches
#[tokio::test(start_paused = true)]
async fn test_delay_applied_between_fetches() {
    let fixture = Fixture::new();
    let delay = Duration::from_secs(10);
    let fetcher = ScriptedFetcher::new().failing("http://h/b.pdf", FetchError::BadStatus(500));
    let config = fixture.config().with_inter_item_delay(delay);
    let mut manager = DownloadManager::new(config, fixture.store(), fetcher.clone());

    let started = tokio::time::Instant::now();
    manager.run_with_seed(abc()).await.unwrap();
    let elapsed = started.elapsed();

    // Three fetches (one failing) and no delay after the last
    assert_eq!(fetcher.urls().len(), 3);
    assert!(elapsed >= delay * 2, "elapsed {:?}", elapsed);
    assert!(elapsed < delay * 3, "elapsed {:?}", elapsed);
}

// A skipped item makes no request and is not followed by a delay
#[tokio::test(start_paused = true)]
async fn test_no_delay_after_skipped_item() {
    let fixture = Fixture::new();
    std::fs::create_dir_all(&fixture.output_dir).unwrap();
    std::fs::write(fixture.output("B.pdf"), "already here").unwrap();

    let delay = Duration::from_secs(10);
    let fetcher = ScriptedFetcher::new();
    let config = fixture.config().with_inter_item_delay(delay);
    let mut manager = DownloadManager::new(config, fixture.store(), fetcher.clone());

    let started = tokio::time::Instant::now();
    let summary = manager.run_with_seed(abc()).await.unwrap();
    let elapsed = started.elapsed();

    assert_eq!(summary.skipped, 1);
    assert_eq!(fetcher.urls(), vec!["http://h/a.pdf", "http://h/c.pdf"]);
    assert!(elapsed >= delay, "elapsed {:?}", elapsed);
    assert!(elapsed < delay * 2, "elapsed {:?}", elapsed);
}
