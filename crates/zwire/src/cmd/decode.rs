use std::fs;
use std::io::Read;

use serde::Serialize;
use tracing::debug;
use zwire_frame::{FrameDecoder, MultipartBuffer};

use crate::cmd::{parse_hex, DecodeArgs};
use crate::exit::{frame_error, io_error, CliError, CliResult, DATA_INVALID, SUCCESS, USAGE};
use crate::output::{print_msg, OutputFormat};

#[derive(Serialize)]
struct SummaryOutput {
    schema_id: &'static str,
    frames: usize,
    messages: usize,
    payload_bytes: usize,
}

pub fn run(args: DecodeArgs, format: OutputFormat) -> CliResult<i32> {
    let wire = read_input(&args)?;
    debug!(bytes = wire.len(), "decoding input");

    let mut decoder = match args.max_msg_size {
        Some(max) => FrameDecoder::with_max_msg_size(max),
        None => FrameDecoder::new(),
    };

    let mut rest = wire.as_slice();
    let mut groups = MultipartBuffer::new();
    let mut frames = 0usize;
    let mut messages = 0usize;
    let mut payload_bytes = 0usize;

    while !rest.is_empty() {
        let (consumed, msg) = decoder
            .decode(rest)
            .map_err(|err| frame_error("decode failed", err))?;
        rest = &rest[consumed..];

        let Some(msg) = msg else {
            continue;
        };

        frames += 1;
        payload_bytes += msg.size();
        print_msg(&msg, frames, format);
        if groups.push(msg).is_some() {
            messages += 1;
        }

        if args.count.is_some_and(|count| frames >= count) {
            break;
        }
    }

    let stopped_early = args.count.is_some_and(|count| frames >= count);
    if !stopped_early && !decoder.is_idle() {
        return Err(CliError::new(DATA_INVALID, "input ends mid-frame"));
    }

    if args.summary {
        print_summary(frames, messages, payload_bytes, format);
    }

    Ok(SUCCESS)
}

fn read_input(args: &DecodeArgs) -> CliResult<Vec<u8>> {
    if let Some(hex) = &args.hex {
        return parse_hex(hex).map_err(|err| CliError::new(USAGE, err));
    }

    match &args.input {
        Some(path) if path.as_os_str() != "-" => fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err)),
        _ => {
            let mut buf = Vec::new();
            std::io::stdin()
                .read_to_end(&mut buf)
                .map_err(|err| io_error("failed reading stdin", err))?;
            Ok(buf)
        }
    }
}

fn print_summary(frames: usize, messages: usize, payload_bytes: usize, format: OutputFormat) {
    match format {
        OutputFormat::Json => {
            let out = SummaryOutput {
                schema_id: "https://schemas.3leaps.dev/zwire/cli/v1/decode-summary.schema.json",
                frames,
                messages,
                payload_bytes,
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table | OutputFormat::Pretty => {
            println!("frames={frames} messages={messages} payload_bytes={payload_bytes}");
        }
        OutputFormat::Raw => {}
    }
}
