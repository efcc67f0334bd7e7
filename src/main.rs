//! kbrpc-dump: decode a captured framed msgpack-RPC byte stream.
//!
//! Reads the capture from a file (or stdin), splits it into frames and
//! prints one JSON object per message on stdout.
//!
//! ```text
//! $ kbrpc-dump session.bin
//! {"type":"call","seqno":0,"method":"keybase.1.login.isOnline","arg":{}}
//! {"type":"response","seqno":0,"error":null,"result":true}
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, warn};
use serde_json::json;

use kbrpc::RpcConfig;
use kbrpc::logging::init_logging;
use kbrpc::rpc::{FrameDecoder, RpcMessage};

#[derive(Debug, Parser)]
#[command(name = "kbrpc-dump", version, about = "Dump framed msgpack-RPC captures as JSON lines")]
struct Cli {
    /// Capture file; reads stdin when absent or "-".
    input: Option<PathBuf>,

    /// JSON file with RPC settings.
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,

    /// Override the configured maximum frame size.
    #[arg(long)]
    max_frame_size: Option<usize>,

    /// Override the configured log level.
    #[arg(long, short = 'l')]
    log_level: Option<String>,

    /// Stop at the first message that fails to decode.
    #[arg(long)]
    strict: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => RpcConfig::from_json_file(path)?,
        None => RpcConfig::default(),
    };
    if let Some(max) = cli.max_frame_size {
        config.max_frame_size = max;
    }
    if let Some(level) = &cli.log_level {
        config.log_level.clone_from(level);
    }
    config.validate()?;
    init_logging(&config.log_level).context("starting logger")?;

    let input: Box<dyn Read> = match cli.input.as_deref() {
        None => Box::new(io::stdin().lock()),
        Some(p) if p.as_os_str() == "-" => Box::new(io::stdin().lock()),
        Some(p) => Box::new(File::open(p).with_context(|| format!("opening {}", p.display()))?),
    };

    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let stats = dump(input, &mut out, &config, cli.strict)?;
    out.flush()?;

    info!("{} messages, {} undecodable", stats.messages, stats.failed);
    if stats.trailing > 0 {
        warn!("{} trailing bytes do not form a complete frame", stats.trailing);
    }
    Ok(())
}

#[derive(Debug, Default)]
struct Stats {
    messages: usize,
    failed: usize,
    trailing: usize,
}

fn dump(mut input: impl Read, out: &mut impl Write, config: &RpcConfig, strict: bool) -> Result<Stats> {
    let mut decoder = FrameDecoder::new(config.max_frame_size);
    let mut buf = vec![0u8; config.read_buffer_size];
    let mut stats = Stats::default();

    loop {
        let n = input.read(&mut buf).context("reading capture")?;
        if n == 0 {
            break;
        }
        decoder.feed(&buf[..n]);

        while let Some(frame) = decoder.next_frame().context("splitting frames")? {
            match RpcMessage::decode(&frame) {
                Ok(msg) => {
                    stats.messages += 1;
                    serde_json::to_writer(&mut *out, &message_json(&msg)?)?;
                    writeln!(out)?;
                }
                Err(e) if strict => return Err(e).context("decoding message"),
                Err(e) => {
                    stats.failed += 1;
                    warn!("skipping undecodable frame ({} bytes): {}", frame.len(), e);
                }
            }
        }
    }

    stats.trailing = decoder.buffered();
    Ok(stats)
}

fn message_json(msg: &RpcMessage) -> Result<serde_json::Value> {
    Ok(match msg {
        RpcMessage::Call { seqno, method, arg } => json!({
            "type": msg.kind(),
            "seqno": seqno,
            "method": method,
            "arg": serde_json::to_value(arg)?,
        }),
        RpcMessage::Response {
            seqno,
            error,
            result,
        } => json!({
            "type": msg.kind(),
            "seqno": seqno,
            "error": serde_json::to_value(error)?,
            "result": serde_json::to_value(result)?,
        }),
        RpcMessage::Notify { method, arg } => json!({
            "type": msg.kind(),
            "method": method,
            "arg": serde_json::to_value(arg)?,
        }),
        RpcMessage::Cancel { seqno, method } => json!({
            "type": msg.kind(),
            "seqno": seqno,
            "method": method,
        }),
    })
}
