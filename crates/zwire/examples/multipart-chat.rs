//! Sends a multi-frame logical message and reassembles it on the other end.
//!
//! Run with:
//!   cargo run --example multipart-chat

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::os::unix::net::UnixStream;
    use std::thread;

    use zwire::frame::{MsgReader, MsgWriter, MultipartBuffer};

    let (left, right) = UnixStream::pair()?;

    let sender = thread::spawn(move || {
        let mut writer = MsgWriter::new(left);
        writer
            .send_multipart([b"routing-id".as_ref(), b"".as_ref(), b"payload body".as_ref()])
            .expect("send should succeed");
        // Dropping the stream closes it; the reader sees EOF afterwards.
    });

    let mut reader = MsgReader::new(right);
    let mut parts = MultipartBuffer::new();

    loop {
        let msg = reader.read_msg()?;
        if let Some(group) = parts.push(msg) {
            println!("logical message with {} parts:", group.len());
            for (i, part) in group.iter().enumerate() {
                println!("  part {i}: {:?}", String::from_utf8_lossy(part.payload()));
            }
            break;
        }
    }

    sender.join().expect("sender thread should finish");
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("this example needs a unix socket pair");
}
