#![cfg(feature = "cli")]
//! Integration tests for report mode.

use tokio_util::sync::CancellationToken;

use mlh::cli::inspect::{run_session, Mode};
use mlh::diag::session::{Row, ScriptedSession};
use mlh::LocksError;

fn s(v: &str) -> Option<String> {
    Some(v.to_string())
}

fn status_rows(pairs: &[(&str, &str)]) -> Vec<Row> {
    pairs.iter().map(|(k, v)| vec![s(k), s(v)]).collect()
}

fn healthy_status() -> Vec<Row> {
    status_rows(&[
        ("Innodb_buffer_pool_pages_free", "50"),
        ("Innodb_buffer_pool_pages_total", "1000"),
        ("Innodb_buffer_pool_wait_free", "0"),
        ("Innodb_buffer_pool_pages_flushed", "321"),
        ("Innodb_buffer_pool_reads", "10"),
        ("Innodb_buffer_pool_read_requests", "100"),
        ("Created_tmp_disk_tables", "0"),
        ("Created_tmp_tables", "0"),
    ])
}

fn lock_rows() -> Vec<Row> {
    vec![vec![
        s("421937"),
        s("12"),
        s("UPDATE accounts SET balance = 0 WHERE id = 7"),
        s("421936"),
        s("11"),
        None,
    ]]
}

fn v80_session() -> ScriptedSession {
    ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("8.0.36")]])
        .respond("performance_schema.data_lock_waits", lock_rows())
        .respond(
            "innodb_buffer_pool_size",
            vec![vec![s("innodb_buffer_pool_size"), s("2147483648")]],
        )
        .respond("SUM(data_length", vec![vec![s("536870912")]])
        .respond("performance_schema.global_status", healthy_status())
}

fn v57_session() -> ScriptedSession {
    ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("5.7.44-log")]])
        .respond("INNODB_LOCK_WAITS", vec![])
        .respond(
            "innodb_buffer_pool_size",
            vec![vec![s("innodb_buffer_pool_size"), s("134217728")]],
        )
        .respond("SUM(data_length", vec![vec![None]])
        .respond("information_schema.GLOBAL_STATUS", healthy_status())
}

async fn run_report(
    session: &mut ScriptedSession,
    json: bool,
) -> (Result<(), LocksError>, String) {
    colored::control::set_override(false);
    let cancel = CancellationToken::new();
    let mut output = Vec::new();
    let result = run_session(session, &cancel, Mode::Report, json, &mut output).await;
    (result, String::from_utf8(output).unwrap())
}

#[tokio::test]
async fn test_report_sections_in_order() {
    let mut session = v80_session();
    let (result, text) = run_report(&mut session, false).await;
    result.unwrap();

    let labels = [
        "Table locks:",
        "Data currently in use by the InnoDB engine:",
        "Some important global metrics:",
    ];
    let positions: Vec<usize> = labels
        .iter()
        .map(|l| {
            assert_eq!(text.matches(l).count(), 1, "label {:?} in:\n{}", l, text);
            text.find(l).unwrap()
        })
        .collect();
    assert!(positions.windows(2).all(|w| w[0] < w[1]));
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_report_lock_table_contents() {
    let mut session = v80_session();
    let (result, text) = run_report(&mut session, false).await;
    result.unwrap();

    assert!(text.contains("| waiting_trx_id | waiting_thread | waiting_query"));
    assert!(text.contains("UPDATE accounts SET balance = 0 WHERE id = 7"));
    let row = text.lines().find(|l| l.contains("421937")).unwrap();
    assert_eq!(row.matches('|').count(), 7);
    assert!(row.contains("421936"));
    assert!(text.contains("NULL"));
}

#[tokio::test]
async fn test_report_sizes_and_metrics() {
    let mut session = v80_session();
    let (result, text) = run_report(&mut session, false).await;
    result.unwrap();

    assert!(text.contains("Total InnoDB Size (GB)"));
    assert!(text.contains("0.50"));
    assert!(text.contains("2.00"));

    let metric = |label: &str| -> String {
        let line = text
            .lines()
            .find(|l| l.contains(label))
            .unwrap_or_else(|| panic!("missing {}", label));
        line.trim_end_matches('|')
            .rsplit('|')
            .next()
            .unwrap()
            .trim()
            .to_string()
    };
    assert_eq!(metric("Buffer pool free pages"), "5");
    assert_eq!(metric("Waits for free pages"), "0");
    assert_eq!(metric("Buffer pool pages flushed"), "321");
    assert_eq!(metric("Read from disk to buffer"), "10");
    assert_eq!(metric("Tmp tables on disk"), "n/a");
}

#[tokio::test]
async fn test_report_v57_uses_information_schema() {
    let mut session = v57_session();
    let (result, text) = run_report(&mut session, false).await;
    result.unwrap();

    let executed = session.executed();
    assert_eq!(executed.len(), 5);
    assert!(executed[1].contains("information_schema.INNODB_LOCK_WAITS"));
    assert!(executed[4].contains("information_schema.GLOBAL_STATUS"));
    assert!(executed.iter().all(|q| !q.contains("performance_schema")));
    // NULL sum with no InnoDB tables counts as zero
    assert!(text.contains("0.00"));
    // 134217728 bytes is exactly 0.125 GiB; `{:.2}` rounds the tie to even
    assert!(text.contains("0.12"));
    assert!(!text.contains("0.13"));
}

#[tokio::test]
async fn test_unsupported_version_stops_before_diagnostics() {
    let mut session = ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("10.6.16-MariaDB")]])
        .respond("SELECT", vec![]);
    let (result, text) = run_report(&mut session, false).await;

    match result {
        Err(LocksError::UnsupportedVersion(v)) => assert_eq!(v, "10.6.16-MariaDB"),
        other => panic!("expected UnsupportedVersion, got {:?}", other),
    }
    assert_eq!(session.executed(), ["SELECT VERSION()"]);
    assert!(text.is_empty());
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_report_json() {
    let mut session = v80_session();
    let (result, text) = run_report(&mut session, true).await;
    result.unwrap();

    let json: serde_json::Value = serde_json::from_str(&text).unwrap();
    assert_eq!(json["version"], "8.0.36");
    assert_eq!(json["dialect"], "8.0");
    assert_eq!(json["lock_waits"].as_array().unwrap().len(), 1);
    assert_eq!(json["lock_waits"][0]["blocking_thread"], "11");
    assert!(json["lock_waits"][0]["blocking_query"].is_null());
    assert_eq!(json["storage"]["buffer_pool_gib"], 2.0);
    assert_eq!(json["health"]["free_page_pct"], 5);
    assert_eq!(json["health"]["disk_read_pct"], 10);
    assert!(json["health"]["tmp_disk_table_pct"].is_null());
    assert!(json["collected_at"].is_string());
}

#[tokio::test]
async fn test_report_missing_status_renders_na() {
    let mut session = ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("8.0.36")]])
        .respond("data_lock_waits", vec![])
        .respond(
            "innodb_buffer_pool_size",
            vec![vec![s("innodb_buffer_pool_size"), s("134217728")]],
        )
        .respond("SUM(data_length", vec![vec![s("0")]])
        .respond("global_status", vec![]);
    let (result, text) = run_report(&mut session, false).await;
    result.unwrap();
    assert_eq!(text.matches("n/a").count(), 5);
}

#[tokio::test]
async fn test_query_failure_aborts_report() {
    let mut session = ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("8.0.36")]])
        .respond("data_lock_waits", vec![])
        .fail("innodb_buffer_pool_size", "Access denied")
        .respond("global_status", healthy_status());
    let (result, text) = run_report(&mut session, false).await;

    assert!(matches!(result, Err(LocksError::Query(m)) if m == "Access denied"));
    assert!(text.contains("Table locks:"));
    assert!(!text.contains("Some important global metrics:"));
    assert!(session.executed().iter().all(|q| !q.contains("global_status")));
    assert!(session.is_closed());
}

#[tokio::test]
async fn test_interrupt_during_report() {
    colored::control::set_override(false);
    let cancel = CancellationToken::new();
    let mut session = ScriptedSession::new()
        .respond("SELECT VERSION()", vec![vec![s("8.0.36")]])
        .cancel_during("data_lock_waits", cancel.clone())
        .respond("SELECT", vec![]);
    let mut output = Vec::new();
    let result = run_session(&mut session, &cancel, Mode::Report, false, &mut output).await;

    assert!(matches!(result, Err(LocksError::Interrupted)));
    assert_eq!(session.executed().len(), 2);
    assert!(output.is_empty());
    assert!(session.is_closed());
}
