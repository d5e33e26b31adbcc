use std::fs;
use std::io::{Read, Write};

use bytes::BytesMut;
use zwire_frame::encode_frame;

use crate::cmd::{parse_hex, to_hex, EncodeArgs};
use crate::exit::{io_error, CliError, CliResult, SUCCESS, USAGE};
use crate::output::OutputFormat;

pub fn run(args: EncodeArgs, _format: OutputFormat) -> CliResult<i32> {
    let parts = resolve_parts(&args)?;

    let mut wire = BytesMut::new();
    let last = parts.len().saturating_sub(1);
    for (i, part) in parts.iter().enumerate() {
        let more = !args.no_group && i < last;
        encode_frame(part, more, &mut wire);
    }

    if args.hex_out {
        let text = to_hex(&wire);
        match &args.output {
            Some(path) => fs::write(path, format!("{text}\n"))
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?,
            None => println!("{text}"),
        }
    } else {
        match &args.output {
            Some(path) => fs::write(path, &wire)
                .map_err(|err| io_error(&format!("failed writing {}", path.display()), err))?,
            None => {
                let mut out = std::io::stdout();
                out.write_all(&wire)
                    .and_then(|()| out.flush())
                    .map_err(|err| io_error("failed writing stdout", err))?;
            }
        }
    }

    Ok(SUCCESS)
}

fn resolve_parts(args: &EncodeArgs) -> CliResult<Vec<Vec<u8>>> {
    if !args.data.is_empty() {
        return Ok(args.data.iter().map(|s| s.as_bytes().to_vec()).collect());
    }
    if !args.hex.is_empty() {
        return args
            .hex
            .iter()
            .map(|h| parse_hex(h).map_err(|err| CliError::new(USAGE, err)))
            .collect();
    }
    if let Some(path) = &args.file {
        return Ok(vec![fs::read(path)
            .map_err(|err| io_error(&format!("failed reading {}", path.display()), err))?]);
    }

    // No explicit source: one part from stdin.
    let mut buf = Vec::new();
    std::io::stdin()
        .read_to_end(&mut buf)
        .map_err(|err| io_error("failed reading stdin", err))?;
    Ok(vec![buf])
}
