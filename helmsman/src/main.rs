//! Helmsman daemon: shovel records between the bus and the ship controller,
//! and run the controller exactly once every 100 ms.
//!
//! The loop sleeps on bus input or the next sampling deadline, whichever
//! comes first. Records accumulate into the controller input; at each
//! deadline the supervisor runs once and the actuator set points go out.
//! Over-runs are logged and the deadline rebases to now — ticks are never
//! skipped, only late.

use std::path::PathBuf;
use std::pin::Pin;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use anyhow::{bail, Context};
use clap::Parser;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::net::UnixStream;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use bus_types::{BusRecord, LineBuffer, RecordError};
use helmsman::bus::{apply_record, skipper_record, status_record};
use helmsman::config::HelmsmanConfig;
use helmsman::controller::ControllerInput;
use helmsman::ship_control::ShipControl;
use helmsman::{SAMPLING_PERIOD, SKIPPER_UPDATE_PERIOD, STATUS_UPDATE_PERIOD};

#[derive(Parser, Debug)]
#[command(name = "helmsman", about = "Periodic sailing control core")]
struct Args {
    /// Bus socket path; stdin/stdout when absent.
    bus: Option<PathBuf>,
    /// Tuning file; built-in defaults when absent.
    #[arg(long)]
    config: Option<PathBuf>,
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

type BusReader = Pin<Box<dyn AsyncRead + Send>>;
type BusWriter = Pin<Box<dyn AsyncWrite + Send>>;

async fn open_bus(path: Option<&PathBuf>) -> anyhow::Result<(BusReader, BusWriter)> {
    match path {
        Some(p) => {
            let stream = UnixStream::connect(p)
                .await
                .with_context(|| format!("connecting bus socket {}", p.display()))?;
            let (r, w) = stream.into_split();
            Ok((Box::pin(r), Box::pin(w)))
        }
        None => Ok((Box::pin(tokio::io::stdin()), Box::pin(tokio::io::stdout()))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "helmsman=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let config = HelmsmanConfig::load(args.config.as_deref())?;

    let (mut reader, mut writer) = open_bus(args.bus.as_ref()).await?;

    info!(
        "⛵ helmsman {} starting — {} ms tick, bus: {}",
        env!("CARGO_PKG_VERSION"),
        (SAMPLING_PERIOD * 1000.0) as u64,
        args.bus
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "stdio".into()),
    );

    let mut ship = ShipControl::new(&config);
    let mut input = ControllerInput::default();
    let mut lines = LineBuffer::new();
    let mut read_buf = [0u8; 4096];

    let period = Duration::from_secs_f64(SAMPLING_PERIOD);
    let skipper_every = (SKIPPER_UPDATE_PERIOD / SAMPLING_PERIOD) as u64;
    let status_every = (STATUS_UPDATE_PERIOD / SAMPLING_PERIOD) as u64;
    let mut next_call = Instant::now() + period;
    let mut loops: u64 = 0;

    loop {
        tokio::select! {
            read = reader.read(&mut read_buf) => {
                match read {
                    Ok(0) => bail!("bus EOF"),
                    Ok(n) => {
                        lines.push(&read_buf[..n]);
                        while let Some(line) = lines.pop_line() {
                            match BusRecord::parse(&line) {
                                Ok(record) => apply_record(&record, &mut input, &mut ship, now_ms()),
                                Err(RecordError::Empty) => {}
                                Err(err) => debug!("unreadable input: {err} >>>{line}<<<"),
                            }
                        }
                    }
                    Err(err) => bail!("bus read: {err}"),
                }
            }
            _ = tokio::time::sleep_until(next_call) => {
                let timestamp = now_ms();
                let out = ship.run(&input, timestamp).clone();

                let mut wire = String::new();
                if !ship.idling() {
                    let ctl = out.drives_reference.to_record(timestamp, &input.drives);
                    wire.push_str(&ctl.to_string());
                    wire.push('\n');
                }
                if loops % skipper_every == 0 {
                    if let Some(rec) = skipper_record(&out, timestamp) {
                        wire.push_str(&rec.to_string());
                        wire.push('\n');
                    }
                }
                if loops % status_every == 5 {
                    wire.push_str(&status_record(&out, timestamp).to_string());
                    wire.push('\n');
                }
                if !wire.is_empty() {
                    writer.write_all(wire.as_bytes()).await.context("bus write")?;
                    writer.flush().await.context("bus write")?;
                }

                loops = loops.wrapping_add(1);
                next_call += period;
                let behind = Instant::now();
                if behind > next_call {
                    warn!(
                        "tick over-run by {} µs",
                        (behind - next_call).as_micros()
                    );
                    next_call = behind;
                }
            }
        }
    }
}
