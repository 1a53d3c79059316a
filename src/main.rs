//! # Fine Offset Decoder
//!
//! Decode Fine Offset and Alecto weather sensor rows read from stdin.
//!
//! Each input line holds one demodulated row in `{N}hex` notation, for example
//! `{71}fe71451e0401ffcea2`. Every enabled decoder family is tried on the row
//! and each resulting record is written to stdout as one JSON line.

use anyhow::{Context, Result};
use std::future::Future;
use std::pin::pin;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{debug, info, warn};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use fineoffset_decoder::config::{Config, LoggingConfig};
use fineoffset_decoder::fineoffset::{BitRow, Family};
use fineoffset_decoder::telemetry::{decode_and_emit, JsonLinesSink, RecordSink};

/// File name prefix of the rolling log
const LOG_FILE_PREFIX: &str = "fineoffset-decoder.log";

/// Counters reported at shutdown
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
struct Stats {
    rows: u64,
    records: u64,
    rejected: u64,
}

/// Main entry point
///
/// # Control Flow
///
/// 1. Load configuration from the optional path argument
/// 2. Set up logging to stderr or a daily rolling file
/// 3. Decode stdin line by line until end of input or Ctrl+C
///
/// # Examples
///
/// ```bash
/// echo '{71}fe71451e0401ffcea2' | cargo run --release
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(&path).with_context(|| format!("loading {}", path))?,
        None => Config::default(),
    };

    let _guard = init_logging(&config.logging)?;

    info!("Fine Offset Decoder v{} starting...", env!("CARGO_PKG_VERSION"));
    info!(
        "Enabled decoders: {}",
        config
            .decoders
            .enabled
            .iter()
            .map(Family::to_string)
            .collect::<Vec<_>>()
            .join(", ")
    );

    let mut sink = JsonLinesSink::new(std::io::stdout(), config.output.timestamps);
    let reader = BufReader::new(tokio::io::stdin());

    let stats = run(reader, &config.decoders.enabled, &mut sink, async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
        }
    })
    .await?;

    info!(
        "Rows: {}, records: {}, rejected lines: {}",
        stats.rows, stats.records, stats.rejected
    );

    Ok(())
}

/// Install the tracing subscriber
///
/// The returned guard must stay alive for file logging to flush.
fn init_logging(logging: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let level: tracing::Level = logging.level.parse()?;
    let filter = EnvFilter::from_default_env().add_directive(level.into());

    if logging.log_dir.is_empty() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    }

    let appender = tracing_appender::rolling::daily(&logging.log_dir, LOG_FILE_PREFIX);
    let (writer, guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();

    Ok(Some(guard))
}

/// Decode every line from `reader` until end of input or `shutdown` resolves
async fn run<R, S, F>(reader: R, families: &[Family], sink: &mut S, shutdown: F) -> Result<Stats>
where
    R: AsyncBufRead + Unpin,
    S: RecordSink,
    F: Future<Output = ()>,
{
    let mut lines = reader.lines();
    let mut shutdown = pin!(shutdown);
    let mut stats = Stats::default();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    debug!("End of input");
                    break;
                };
                process_line(&line, families, sink, &mut stats)?;
            }

            _ = &mut shutdown => break,
        }
    }

    Ok(stats)
}

/// Parse one input line and emit whatever decodes from it
fn process_line<S: RecordSink>(
    line: &str,
    families: &[Family],
    sink: &mut S,
    stats: &mut Stats,
) -> Result<()> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(());
    }

    let row: BitRow = match line.parse() {
        Ok(row) => row,
        Err(e) => {
            warn!("Skipping line {:?}: {}", line, e);
            stats.rejected += 1;
            return Ok(());
        }
    };

    stats.rows += 1;
    stats.records += decode_and_emit(families, &row, sink)? as u64;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const WH0530_LINE: &str = "{71}fe71451e0401ffcea2";

    #[test]
    fn test_wh0530_line_parses() {
        let row: BitRow = WH0530_LINE.parse().unwrap();
        assert_eq!(row.bit_count(), 71);
    }

    #[test]
    fn test_run_decodes_until_end_of_input() {
        let input = format!("# capture\n{}\n\nnot-hex\n{{48}}000000000000\n", WH0530_LINE);
        let mut sink = JsonLinesSink::new(Vec::new(), false);

        let stats = tokio_test::block_on(run(
            input.as_bytes(),
            &Family::ALL,
            &mut sink,
            std::future::pending(),
        ))
        .unwrap();

        assert_eq!(stats, Stats { rows: 2, records: 1, rejected: 1 });
        let out = String::from_utf8(sink.into_inner()).unwrap();
        assert!(out.starts_with("{\"model\":\"Fineoffset-WH0530\",\"id\":138,"));
    }

    #[test]
    fn test_run_stops_on_shutdown() {
        let mut sink = JsonLinesSink::new(Vec::new(), false);
        let (_tx, rx) = tokio::io::duplex(64);

        let stats = tokio_test::block_on(run(
            BufReader::new(rx),
            &Family::ALL,
            &mut sink,
            std::future::ready(()),
        ))
        .unwrap();

        assert_eq!(stats, Stats::default());
    }

    #[test]
    fn test_filtered_families() {
        let mut sink = JsonLinesSink::new(Vec::new(), false);
        let mut stats = Stats::default();
        process_line(WH0530_LINE, &[Family::Wh2], &mut sink, &mut stats).unwrap();
        assert_eq!(stats, Stats { rows: 1, records: 0, rejected: 0 });
    }
}
