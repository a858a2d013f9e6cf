//! Run the pipeline: stdin records into the ClickHouse sink

use anyhow::{Context, Result};
use chute_config::{ClickHouseOutputConfig, Config, LokiConfig, OnError};
use chute_sinks::clickhouse::{ClickHouseConfig, ClickHouseSink, RejectPolicy};
use chute_sinks::loki::{Label, LokiAuth, effective_labels};
use tokio::signal;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::input::{InputStats, forward_lines, stdin_reader};

/// Read stdin until EOF or Ctrl-C, then flush and report
///
/// The sink is always drained before an input error is returned.
pub async fn run(config: Config) -> Result<()> {
    if let Some(ref loki) = config.loki {
        validate_loki(loki)?;
    }

    let clickhouse_config = sink_config(&config.clickhouse)?;
    let stdin = stdin_reader().context("starting stdin reader")?;
    let (tx, rx) = mpsc::channel(config.clickhouse.queue_size);
    let sink = ClickHouseSink::new(clickhouse_config, rx)?;
    let task = tokio::spawn(sink.run());

    let mut stats = InputStats::default();
    let input = tokio::select! {
        result = forward_lines(stdin, &tx, &mut stats) => result,
        _ = signal::ctrl_c() => {
            info!("interrupt received, flushing");
            Ok(())
        }
    };
    drop(tx);

    let sink_result = task.await.context("sink task panicked")?;
    info!(
        lines = stats.lines,
        forwarded = stats.forwarded,
        invalid = stats.invalid,
        "input finished"
    );
    input.context("reading stdin")?;

    let snapshot = sink_result?;
    info!(
        received = snapshot.records_received,
        rejected = snapshot.records_rejected,
        rows = snapshot.rows_written,
        blocks = snapshot.blocks_written,
        write_errors = snapshot.write_errors,
        "sink finished"
    );

    Ok(())
}

/// Build the sink configuration from the `[clickhouse]` section
fn sink_config(ch: &ClickHouseOutputConfig) -> Result<ClickHouseConfig> {
    let columns = ch.column_specs()?;

    let mut config = ClickHouseConfig::default()
        .with_url(&ch.url)
        .with_database(&ch.database)
        .with_table(&ch.table, columns)
        .with_batch_size(ch.batch_size)
        .with_flush_interval(ch.flush_interval)
        .with_connection_timeout(ch.connection_timeout)
        .with_retry(ch.retry_attempts, ch.retry_base_delay)
        .with_reject_policy(match ch.on_error {
            OnError::Skip => RejectPolicy::Skip,
            OnError::Fail => RejectPolicy::Fail,
        });

    if let Some(ref username) = ch.username {
        config = config.with_credentials(username, ch.password.clone());
    }

    Ok(config)
}

/// Check `[loki]` header values up front
fn validate_loki(loki: &LokiConfig) -> Result<()> {
    let auth = LokiAuth {
        tenant_id: loki.tenant_id.clone(),
        username: loki.auth_username.clone(),
        password: loki.auth_password.clone(),
        bearer_token: loki.bearer_token.clone(),
    };
    let headers = auth.headers().context("invalid [loki] settings")?;

    let labels: Vec<Label> = loki
        .labels
        .iter()
        .map(|l| Label::new(&l.label, &l.value))
        .collect();
    debug!(
        headers = headers.len(),
        labels = ?effective_labels(&labels),
        "loki settings validated"
    );

    Ok(())
}
