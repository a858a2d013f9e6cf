//! Tests for the ClickHouse sink

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use chute_columns::ColumnSpec;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use super::*;

// =============================================================================
// Test Helpers
// =============================================================================

/// Writer that keeps every body and fails the first `failures` calls
#[derive(Clone, Default)]
struct MemoryWriter {
    blocks: Arc<Mutex<Vec<(String, Bytes)>>>,
    failures: Arc<AtomicUsize>,
    calls: Arc<AtomicUsize>,
}

impl MemoryWriter {
    fn failing(failures: usize) -> Self {
        let writer = Self::default();
        writer.failures.store(failures, Ordering::SeqCst);
        writer
    }

    fn blocks(&self) -> Vec<(String, Bytes)> {
        self.blocks.lock().clone()
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlockWriter for MemoryWriter {
    async fn write(&self, table: &str, body: Bytes) -> Result<(), ClickHouseSinkError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let failed = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failed {
            return Err(ClickHouseSinkError::Server {
                status: 503,
                body: "unavailable".into(),
            });
        }
        self.blocks.lock().push((table.to_string(), body));
        Ok(())
    }
}

fn id_name_config() -> ClickHouseConfig {
    ClickHouseConfig::default()
        .with_table(
            "logs",
            vec![
                ColumnSpec::parse("id", "Int32").unwrap(),
                ColumnSpec::parse("name", "Nullable(String)").unwrap(),
            ],
        )
        .with_flush_interval(Duration::from_secs(3600))
        .with_retry(3, Duration::from_millis(1))
}

/// Row count of an encoded block (second uvarint of the header)
fn block_rows(body: &[u8]) -> u8 {
    body[1]
}

async fn run_with(
    config: ClickHouseConfig,
    writer: MemoryWriter,
    records: Vec<Value>,
) -> Result<MetricsSnapshot, ClickHouseSinkError> {
    let (tx, rx) = mpsc::channel(records.len().max(1));
    for record in records {
        tx.send(record).await.unwrap();
    }
    drop(tx);

    ClickHouseSink::with_writer(config, rx, writer).unwrap().run().await
}

// =============================================================================
// Configuration Tests
// =============================================================================

#[test]
fn test_config_defaults() {
    let config = ClickHouseConfig::default();
    assert_eq!(config.url, "http://localhost:8123");
    assert_eq!(config.database, "default");
    assert!(config.username.is_none());
    assert!(config.password.is_none());
    assert_eq!(config.batch_size, DEFAULT_BATCH_SIZE);
    assert_eq!(config.flush_interval, DEFAULT_FLUSH_INTERVAL);
    assert_eq!(config.connection_timeout, DEFAULT_CONNECTION_TIMEOUT);
    assert_eq!(config.retry_attempts, DEFAULT_RETRY_ATTEMPTS);
    assert_eq!(config.on_reject, RejectPolicy::Skip);
}

#[test]
fn test_config_builders() {
    let config = ClickHouseConfig::default()
        .with_url("http://clickhouse:8123")
        .with_database("observability")
        .with_credentials("admin", Some("secret".into()))
        .with_batch_size(5000)
        .with_connection_timeout(Duration::from_secs(3))
        .with_reject_policy(RejectPolicy::Fail);
    assert_eq!(config.url, "http://clickhouse:8123");
    assert_eq!(config.database, "observability");
    assert_eq!(config.username.as_deref(), Some("admin"));
    assert_eq!(config.password.as_deref(), Some("secret"));
    assert_eq!(config.batch_size, 5000);
    assert_eq!(config.connection_timeout, Duration::from_secs(3));
    assert_eq!(config.on_reject, RejectPolicy::Fail);
}

#[test]
fn test_retry_delay_doubles_up_to_max() {
    let config = ClickHouseConfig::default().with_retry(10, Duration::from_millis(100));
    assert_eq!(config.retry_delay(1), Duration::from_millis(100));
    assert_eq!(config.retry_delay(2), Duration::from_millis(200));
    assert_eq!(config.retry_delay(3), Duration::from_millis(400));
    assert_eq!(config.retry_delay(40), config.retry_max_delay);
}

#[test]
fn test_insert_query() {
    assert_eq!(insert_query("logs"), "INSERT INTO logs FORMAT Native");
}

#[test]
fn test_sink_requires_table_and_columns() {
    let (_tx, rx) = mpsc::channel(1);
    let err = ClickHouseSink::with_writer(ClickHouseConfig::default(), rx, MemoryWriter::default())
        .err()
        .unwrap();
    assert!(matches!(err, ClickHouseSinkError::ConfigError(_)));

    let (_tx, rx) = mpsc::channel(1);
    let config = ClickHouseConfig::default().with_table("logs", Vec::new());
    let err = ClickHouseSink::with_writer(config, rx, MemoryWriter::default())
        .err()
        .unwrap();
    assert!(err.to_string().contains("no columns"));
}

#[test]
fn test_sink_rejects_zero_flush_interval() {
    let (_tx, rx) = mpsc::channel(1);
    let config = id_name_config().with_flush_interval(Duration::ZERO);
    let err = ClickHouseSink::with_writer(config, rx, MemoryWriter::default())
        .err()
        .unwrap();
    assert!(matches!(err, ClickHouseSinkError::ConfigError(_)));
    assert!(err.to_string().contains("flush interval"));
}

// =============================================================================
// Batching Tests
// =============================================================================

#[tokio::test]
async fn test_final_flush_writes_native_block() {
    let writer = MemoryWriter::default();
    let records = vec![
        json!({"id": 1, "name": "a"}),
        json!({"id": 2}),
        json!({"id": 3, "name": "c"}),
    ];

    let snapshot = run_with(id_name_config(), writer.clone(), records).await.unwrap();

    assert_eq!(snapshot.records_received, 3);
    assert_eq!(snapshot.rows_written, 3);
    assert_eq!(snapshot.blocks_written, 1);

    let blocks = writer.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(blocks[0].0, "logs");

    let mut expected = vec![2, 3];
    expected.extend_from_slice(b"\x02id\x05Int32");
    expected.extend_from_slice(&[1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
    expected.extend_from_slice(b"\x04name\x10Nullable(String)");
    expected.extend_from_slice(&[0, 1, 0, 1, b'a', 0, 1, b'c']);
    assert_eq!(&blocks[0].1[..], &expected[..]);
}

#[tokio::test]
async fn test_flushes_at_batch_size() {
    let writer = MemoryWriter::default();
    let records = (0..5).map(|i| json!({"id": i})).collect();

    let snapshot = run_with(id_name_config().with_batch_size(2), writer.clone(), records)
        .await
        .unwrap();

    assert_eq!(snapshot.blocks_written, 3);
    assert_eq!(snapshot.rows_written, 5);
    let rows: Vec<u8> = writer.blocks().iter().map(|(_, b)| block_rows(b)).collect();
    assert_eq!(rows, vec![2, 2, 1]);
}

#[tokio::test]
async fn test_empty_run_writes_nothing() {
    let writer = MemoryWriter::default();
    let snapshot = run_with(id_name_config(), writer.clone(), Vec::new()).await.unwrap();
    assert_eq!(snapshot, MetricsSnapshot::default());
    assert_eq!(writer.calls(), 0);
}

#[tokio::test]
async fn test_interval_flushes_partial_block() {
    let writer = MemoryWriter::default();
    let config = id_name_config().with_flush_interval(Duration::from_millis(20));
    let (tx, rx) = mpsc::channel(4);
    let sink = ClickHouseSink::with_writer(config, rx, writer.clone()).unwrap();
    let metrics = sink.metrics();
    let task = tokio::spawn(sink.run());

    tx.send(json!({"id": 7})).await.unwrap();

    let mut waited = Duration::ZERO;
    while writer.blocks().is_empty() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(10)).await;
        waited += Duration::from_millis(10);
    }
    assert_eq!(writer.blocks().len(), 1);
    assert_eq!(metrics.snapshot().rows_written, 1);

    drop(tx);
    let snapshot = task.await.unwrap().unwrap();
    assert_eq!(snapshot.blocks_written, 1);
}

// =============================================================================
// Reject Policy Tests
// =============================================================================

#[tokio::test]
async fn test_skip_policy_drops_bad_records() {
    let writer = MemoryWriter::default();
    let records = vec![
        json!({"id": 1}),
        json!({"name": "no id"}),
        json!({"id": "not a number"}),
        json!({"id": 4}),
    ];

    let snapshot = run_with(id_name_config(), writer.clone(), records).await.unwrap();

    assert_eq!(snapshot.records_received, 4);
    assert_eq!(snapshot.records_rejected, 2);
    assert_eq!(snapshot.rows_written, 2);

    let blocks = writer.blocks();
    assert_eq!(block_rows(&blocks[0].1), 2);
}

#[tokio::test]
async fn test_fail_policy_flushes_then_stops() {
    let writer = MemoryWriter::default();
    let config = id_name_config().with_reject_policy(RejectPolicy::Fail);
    let records = vec![json!({"id": 1}), json!({"id": 2}), json!({"name": "x"}), json!({"id": 4})];

    let err = run_with(config, writer.clone(), records).await.unwrap_err();

    match err {
        ClickHouseSinkError::RecordRejected(e) => {
            assert_eq!(e.column, "id");
            assert!(e.source.is_nil());
        }
        other => panic!("unexpected error: {other}"),
    }

    let blocks = writer.blocks();
    assert_eq!(blocks.len(), 1);
    assert_eq!(block_rows(&blocks[0].1), 2);
}

// =============================================================================
// Retry Tests
// =============================================================================

#[tokio::test]
async fn test_retries_until_success() {
    let writer = MemoryWriter::failing(2);
    let snapshot = run_with(id_name_config(), writer.clone(), vec![json!({"id": 1})])
        .await
        .unwrap();

    assert_eq!(writer.calls(), 3);
    assert_eq!(snapshot.retry_count, 2);
    assert_eq!(snapshot.blocks_written, 1);
    assert_eq!(snapshot.write_errors, 0);
}

#[tokio::test]
async fn test_block_dropped_after_last_attempt() {
    let writer = MemoryWriter::failing(usize::MAX);
    let config = id_name_config().with_retry(2, Duration::from_millis(1));

    let snapshot = run_with(config, writer.clone(), vec![json!({"id": 1})])
        .await
        .unwrap();

    assert_eq!(writer.calls(), 2);
    assert_eq!(snapshot.retry_count, 1);
    assert_eq!(snapshot.write_errors, 1);
    assert_eq!(snapshot.rows_written, 0);
}

// =============================================================================
// HTTP Writer Tests
// =============================================================================

/// Accept one request, answer with `status`, and return the raw request
async fn serve_once(listener: TcpListener, status: &'static str) -> String {
    let (mut socket, _) = listener.accept().await.unwrap();
    let mut request = Vec::new();
    let mut chunk = [0u8; 4096];

    loop {
        let n = socket.read(&mut chunk).await.unwrap();
        if n == 0 {
            break;
        }
        request.extend_from_slice(&chunk[..n]);

        let text = String::from_utf8_lossy(&request);
        if let Some(header_end) = text.find("\r\n\r\n") {
            let content_length = text[..header_end]
                .lines()
                .find_map(|line| {
                    let (name, value) = line.split_once(':')?;
                    name.eq_ignore_ascii_case("content-length")
                        .then(|| value.trim().parse::<usize>().ok())
                        .flatten()
                })
                .unwrap_or(0);
            if request.len() >= header_end + 4 + content_length {
                break;
            }
        }
    }

    let response = format!("HTTP/1.1 {status}\r\ncontent-length: 4\r\nconnection: close\r\n\r\nnope");
    socket.write_all(response.as_bytes()).await.unwrap();
    String::from_utf8_lossy(&request).into_owned()
}

#[tokio::test]
async fn test_http_writer_posts_native_body() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, "200 OK"));

    let config = id_name_config()
        .with_url(format!("http://{addr}/"))
        .with_database("obs")
        .with_credentials("user", Some("pass".into()));
    let writer = HttpBlockWriter::new(&config).unwrap();

    writer
        .write("logs", Bytes::from_static(b"\x01\x00"))
        .await
        .unwrap();

    let request = server.await.unwrap();
    let request_line = request.lines().next().unwrap();
    assert!(request_line.starts_with("POST /?database=obs&query=INSERT"));
    assert!(request_line.contains("FORMAT") && request_line.contains("Native"));
    // base64("user:pass")
    assert!(request.contains("dXNlcjpwYXNz"));
    assert!(request.ends_with("\x01\x00"));
}

#[tokio::test]
async fn test_http_writer_reports_server_error() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let server = tokio::spawn(serve_once(listener, "500 Internal Server Error"));

    let config = id_name_config().with_url(format!("http://{addr}"));
    let writer = HttpBlockWriter::new(&config).unwrap();

    let err = writer.write("logs", Bytes::new()).await.unwrap_err();
    server.await.unwrap();

    match err {
        ClickHouseSinkError::Server { status, body } => {
            assert_eq!(status, 500);
            assert_eq!(body, "nope");
        }
        other => panic!("unexpected error: {other}"),
    }
}
