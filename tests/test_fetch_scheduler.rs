mod common;

use std::fs;
use std::time::Duration;

use common::{not_found, transient, ymd, ScriptedClient};
use edgar_quant::filing::fetch::{
    DocumentCache, FetchFailure, FetchPolicy, FetchScheduler, FetchState, RetryPolicy,
};
use edgar_quant::filing::model::IndexRecord;

const URL: &str = "https://www.sec.gov/Archives/edgar/data/1/a.txt";

fn policy(min_interval_ms: u64, max_attempts: u32) -> FetchPolicy {
    FetchPolicy {
        min_interval: Duration::from_millis(min_interval_ms),
        retry: RetryPolicy::immediate(max_attempts),
    }
}

#[tokio::test]
async fn test_second_fetch_hits_cache_without_network() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("1_2019-05-01_10-Q.txt");
    let client = ScriptedClient::new();
    client.ok(URL, "body");
    let mut scheduler = FetchScheduler::new(client, policy(0, 3));

    let first = scheduler.fetch_to(URL, &dest).await;
    assert_eq!(first.state, FetchState::Succeeded);
    assert_eq!(first.attempts, 1);
    assert_eq!(fs::read_to_string(&dest)?, "body");

    let second = scheduler.fetch_to(URL, &dest).await;
    assert_eq!(second.state, FetchState::Cached);
    assert_eq!(second.attempts, 0);
    assert_eq!(scheduler.client().call_count(), 1);
    Ok(())
}

#[tokio::test]
async fn test_not_found_fails_after_one_attempt() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("missing.txt");
    let client = ScriptedClient::new();
    client.script(URL, vec![not_found(URL), Ok(b"never".to_vec())]);
    let mut scheduler = FetchScheduler::new(client, policy(0, 4));

    let outcome = scheduler.fetch_to(URL, &dest).await;
    assert_eq!(outcome.state, FetchState::Failed(FetchFailure::NotFound));
    assert_eq!(outcome.attempts, 1);
    assert_eq!(scheduler.client().call_count(), 1);
    assert!(!dest.exists());
    Ok(())
}

#[tokio::test]
async fn test_transient_failures_then_success() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("doc.txt");
    let client = ScriptedClient::new();
    client.script(URL, vec![transient("503"), transient("timeout"), Ok(b"ok".to_vec())]);
    let mut scheduler = FetchScheduler::new(client, policy(0, 3));

    let outcome = scheduler.fetch_to(URL, &dest).await;
    assert_eq!(outcome.state, FetchState::Succeeded);
    assert_eq!(outcome.attempts, 3);
    assert_eq!(fs::read(&dest)?, b"ok");
    Ok(())
}

#[tokio::test]
async fn test_exceeding_attempt_cap_fails_without_partial_file() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let dest = dir.path().join("doc.txt");
    let client = ScriptedClient::new();
    client.script(
        URL,
        vec![transient("a"), transient("b"), transient("c"), Ok(b"late".to_vec())],
    );
    let mut scheduler = FetchScheduler::new(client, policy(0, 3));

    let outcome = scheduler.fetch_to(URL, &dest).await;
    assert_eq!(
        outcome.state,
        FetchState::Failed(FetchFailure::RetriesExhausted { last_error: "c".to_string() })
    );
    assert_eq!(outcome.attempts, 3);
    assert_eq!(scheduler.client().call_count(), 3);
    assert!(!dest.exists());
    assert_eq!(fs::read_dir(dir.path())?.count(), 0);
    Ok(())
}

#[tokio::test]
async fn test_min_interval_holds_across_retries_and_records() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let other = "https://www.sec.gov/Archives/edgar/data/2/b.txt";
    let client = ScriptedClient::new();
    client.script(URL, vec![transient("503"), Ok(b"a".to_vec())]);
    client.ok(other, "b");
    let mut scheduler = FetchScheduler::new(client, policy(40, 3));

    scheduler.fetch_to(URL, &dir.path().join("a.txt")).await;
    scheduler.fetch_to(other, &dir.path().join("b.txt")).await;

    let times = scheduler.client().call_times();
    assert_eq!(times.len(), 3);
    for pair in times.windows(2) {
        assert!(pair[1].duration_since(pair[0]) >= Duration::from_millis(35));
    }
    Ok(())
}

#[tokio::test]
async fn test_min_interval_counts_from_end_of_slow_response() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let other = "https://www.sec.gov/Archives/edgar/data/2/b.txt";
    let client = ScriptedClient::with_latency(Duration::from_millis(60));
    client.ok(URL, "a");
    client.ok(other, "b");
    let mut scheduler = FetchScheduler::new(client, policy(40, 1));

    scheduler.fetch_to(URL, &dir.path().join("a.txt")).await;
    scheduler.fetch_to(other, &dir.path().join("b.txt")).await;

    let times = scheduler.client().call_times();
    assert_eq!(times.len(), 2);
    // 60ms 响应 + 40ms 间隔
    assert!(times[1].duration_since(times[0]) >= Duration::from_millis(95));
    Ok(())
}

#[tokio::test]
async fn test_backoff_grows_between_attempts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let client = ScriptedClient::new();
    client.script(URL, vec![transient("1"), transient("2"), Ok(b"ok".to_vec())]);
    let policy = FetchPolicy {
        min_interval: Duration::ZERO,
        retry: RetryPolicy {
            max_attempts: 3,
            initial_backoff: Duration::from_millis(20),
            multiplier: 2,
        },
    };
    let mut scheduler = FetchScheduler::new(client, policy);

    let outcome = scheduler.fetch_to(URL, &dir.path().join("a.txt")).await;
    assert_eq!(outcome.state, FetchState::Succeeded);

    let times = scheduler.client().call_times();
    assert!(times[1].duration_since(times[0]) >= Duration::from_millis(18));
    assert!(times[2].duration_since(times[1]) >= Duration::from_millis(38));
    Ok(())
}

#[tokio::test]
async fn test_fetch_records_reports_counts() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let cache = DocumentCache::new(dir.path().join("downloads"));
    let archive = "https://www.sec.gov/Archives";

    let records = vec![
        IndexRecord {
            cik: 1,
            name: "A".into(),
            form: "10-Q".into(),
            filing_date: ymd(2019, 5, 1),
            path: "edgar/data/1/a.txt".into(),
        },
        IndexRecord {
            cik: 2,
            name: "B".into(),
            form: "10-Q".into(),
            filing_date: ymd(2019, 5, 2),
            path: "edgar/data/2/b.txt".into(),
        },
    ];
    let client = ScriptedClient::new();
    client.ok(&format!("{}/edgar/data/1/a.txt", archive), "doc a");
    let mut scheduler = FetchScheduler::new(client, policy(0, 2));

    let selected: Vec<&IndexRecord> = records.iter().collect();
    let (outcomes, report) = scheduler.fetch_records(&selected, archive, &cache).await;
    assert_eq!(outcomes.len(), 2);
    assert_eq!(report.succeeded, 1);
    assert_eq!(report.failed, 1);
    assert_eq!(report.not_found, 1);
    assert!(cache.contains(&records[0].key()));

    let (_, again) = scheduler.fetch_records(&selected, archive, &cache).await;
    assert_eq!(again.cached, 1);
    assert_eq!(again.failed, 1);
    Ok(())
}
