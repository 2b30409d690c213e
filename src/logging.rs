//! Logging setup.
//!
//! Logs go to stderr through `tracing-subscriber`. The filter comes from
//! `--log-level`, then `RUST_LOG`, then [`DEFAULT_FILTER`]. While the
//! terminal display holds the TTY in raw mode a bare `\n` does not return
//! the cursor, so stderr terminals get `\r\n` line endings.

use std::io::{self, IsTerminal, Write};

use tracing_subscriber::EnvFilter;

pub const DEFAULT_FILTER: &str = "gesture_pilot=info";

/// Writer that turns `\n` into `\r\n`.
pub struct CrlfWriter<W> {
    inner: W,
    /// Last byte of the previous write, so a split `\r\n` stays intact.
    last: Option<u8>,
}

impl<W: Write> CrlfWriter<W> {
    pub fn new(inner: W) -> Self {
        Self { inner, last: None }
    }
}

impl<W: Write> Write for CrlfWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let mut start = 0;
        let mut prev = self.last;
        for (i, &b) in buf.iter().enumerate() {
            if b == b'\n' && prev != Some(b'\r') {
                self.inner.write_all(&buf[start..i])?;
                self.inner.write_all(b"\r\n")?;
                start = i + 1;
            }
            prev = Some(b);
        }
        self.inner.write_all(&buf[start..])?;
        self.last = prev;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

fn filter(level: Option<&str>) -> EnvFilter {
    match level {
        Some(level) => EnvFilter::new(level),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER)),
    }
}

/// Install the global subscriber. Call once, before anything logs.
pub fn init(level: Option<&str>) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(level));
    if io::stderr().is_terminal() {
        builder
            .with_writer(|| CrlfWriter::new(io::stderr()))
            .init();
    } else {
        builder.with_writer(io::stderr).with_ansi(false).init();
    }
}
