mod parser;

use amqp_value::{size, Encoder, EncoderConfig, FixedSink, Sink, Value};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use structopt::StructOpt;
use tracing::{debug, Level};

/// Encode AMQP 0-10 values written in textual notation
#[derive(StructOpt)]
#[structopt(name = "vq")]
struct Opt {
    /// write the encoded bytes to stdout instead of a hex dump
    #[structopt(short, long)]
    raw: bool,
    /// print the parsed value in canonical notation to stderr
    #[structopt(short, long)]
    print: bool,
    /// read from this file instead of stdin
    #[structopt(short, long, parse(from_os_str))]
    input: Option<PathBuf>,
    /// one of error, warn, info, debug, trace
    #[structopt(long, default_value = "warn")]
    log_level: Level,
    /// trust the measured length of a top level list or map instead of recomputing it while encoding
    #[structopt(long)]
    no_verify: bool,
}

fn main() -> Result<()> {
    let opt = Opt::from_args();
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_max_level(opt.log_level)
        .init();
    let text = read_input(opt.input.as_deref())?;
    let value = parser::parse(&text).context("Failed to parse input")?;
    if opt.print {
        eprintln!("{}", &value);
    }
    let buf = encode(&value, EncoderConfig { verify_lengths: !opt.no_verify })?;
    if opt.raw {
        io::stdout().write_all(&buf).context("Failed to write stdout")?;
    } else {
        println!("{} bytes", buf.len());
        print!("{}", hexdump(&buf));
    }
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display())),
        None       => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("Failed to read stdin")?;
            Ok(text)
        },
    }
}

/// Measure first, then encode into a buffer of exactly that size. Top level composites go through the
/// explicit length interface so the configured verification applies to them.
fn encode(value: &Value, config: EncoderConfig) -> Result<Vec<u8>> {
    let len = size::tagged(value).context("Value cannot be encoded")?;
    debug!(len, kind = value.typename(), "measured value");
    let mut buf = vec![0u8; len];
    let mut sink = FixedSink::new(&mut buf);
    if value.is_composite() {
        sink.put_u8(value.type_code()?.to_u8())?;
    }
    let mut encoder = Encoder::with_config(&mut sink, config);
    match value {
        Value::List(values) => encoder.encode_list(values, size::list(values)?),
        Value::Map(map)     => encoder.encode_map(map, size::map(map)?),
        other               => encoder.encode_tagged(other),
    }.context("Encoding error")?;
    Ok(buf)
}

fn hexdump(buf: &[u8]) -> String {
    let mut out = String::with_capacity(buf.len() * 4);
    for (line, chunk) in buf.chunks(16).enumerate() {
        let _ = write!(out, "{:08x} ", line * 16);
        for b in chunk {
            let _ = write!(out, " {:02x}", b);
        }
        out.push('\n');
    }
    out
}
