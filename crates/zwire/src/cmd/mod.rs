use std::path::PathBuf;

use clap::{Args, Subcommand};

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode wire bytes into a frame listing.
    Decode(DecodeArgs),
    /// Encode payload parts into wire frames.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Version(args) => version::run(args, format),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File holding wire bytes, or `-` for stdin.
    pub input: Option<PathBuf>,
    /// Decode wire bytes given as a hex string instead of a file.
    #[arg(long, value_name = "STRING", conflicts_with = "input")]
    pub hex: Option<String>,
    /// Reject frames whose payload exceeds this many bytes.
    #[arg(long, value_name = "BYTES")]
    pub max_msg_size: Option<usize>,
    /// Stop after decoding N frames.
    #[arg(long, value_name = "N")]
    pub count: Option<usize>,
    /// Append totals: frames, logical messages, payload bytes.
    #[arg(long)]
    pub summary: bool,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// String payload part (repeatable).
    #[arg(long, value_name = "STRING", conflicts_with_all = ["hex", "file"])]
    pub data: Vec<String>,
    /// Hex payload part (repeatable).
    #[arg(long, value_name = "HEX", conflicts_with_all = ["data", "file"])]
    pub hex: Vec<String>,
    /// Read one payload part from a file.
    #[arg(long, value_name = "PATH")]
    pub file: Option<PathBuf>,
    /// Mark every frame final instead of grouping the parts into one
    /// logical message.
    #[arg(long)]
    pub no_group: bool,
    /// Write wire bytes to a file instead of stdout.
    #[arg(long, short = 'o', value_name = "FILE")]
    pub output: Option<PathBuf>,
    /// Print the wire bytes as hex text.
    #[arg(long)]
    pub hex_out: bool,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

/// Parse hex text into bytes, skipping interior whitespace.
pub(crate) fn parse_hex(input: &str) -> Result<Vec<u8>, String> {
    let digits: Vec<u8> = input
        .bytes()
        .filter(|b| !b.is_ascii_whitespace())
        .collect();
    if digits.len() % 2 != 0 {
        return Err(format!("hex input has an odd digit count ({})", digits.len()));
    }

    digits
        .chunks(2)
        .map(|pair| Ok(hex_value(pair[0])? << 4 | hex_value(pair[1])?))
        .collect()
}

fn hex_value(digit: u8) -> Result<u8, String> {
    match digit {
        b'0'..=b'9' => Ok(digit - b'0'),
        b'a'..=b'f' => Ok(digit - b'a' + 10),
        b'A'..=b'F' => Ok(digit - b'A' + 10),
        other => Err(format!("invalid hex digit: {:?}", other as char)),
    }
}

pub(crate) fn to_hex(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}
