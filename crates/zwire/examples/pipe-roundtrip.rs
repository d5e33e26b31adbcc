//! Round-trips one frame over a socket pair.
//!
//! Run with:
//!   cargo run --example pipe-roundtrip

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;

    use zwire::frame::{MsgReader, MsgWriter};

    let (left, right) = UnixStream::pair()?;
    let mut writer = MsgWriter::new(left);
    let mut reader = MsgReader::new(right);

    writer.send(b"hello over the wire", false)?;

    let msg = reader.read_msg()?;
    println!(
        "received {} bytes: {}",
        msg.size(),
        String::from_utf8_lossy(msg.payload())
    );

    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("this example needs a unix socket pair");
}
