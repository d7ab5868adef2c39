use std::io;
use std::path::PathBuf;

use once_cell::sync::OnceCell;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

static FILE_GUARD: OnceCell<WorkerGuard> = OnceCell::new();

fn filter(debug: bool) -> EnvFilter {
    // Without debug we force `info` so a stray RUST_LOG cannot turn on
    // per-event tracing of pointer moves.
    if debug {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::new("info")
    }
}

/// Initialise logging. The level is `info` unless `debug` is set, in which
/// case `RUST_LOG` may override the `debug` default.
///
/// When `log_file` is given, output goes to that file through a non-blocking
/// writer instead of stderr.
pub fn init(debug: bool, log_file: Option<PathBuf>) {
    let builder = tracing_subscriber::fmt().with_env_filter(filter(debug));
    match log_file {
        Some(path) => {
            let dir = path
                .parent()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("."));
            let file_name = path
                .file_name()
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("reading_mask.log"));
            let appender = tracing_appender::rolling::never(dir, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            if builder.with_writer(writer).with_ansi(false).try_init().is_ok() {
                let _ = FILE_GUARD.set(guard);
            }
        }
        None => {
            let _ = builder.try_init();
        }
    }
}

/// Initialise logging to the browser console. Timestamps are omitted since
/// the wasm target has no system clock.
#[cfg(all(target_arch = "wasm32", target_os = "unknown"))]
pub fn init_console(debug: bool) {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter(debug))
        .with_writer(|| LineWriter::new(|line: &str| web_sys::console::log_1(&line.into())))
        .with_ansi(false)
        .without_time()
        .try_init();
}

/// Buffers one formatted event and hands it to `sink` without the trailing
/// newline when flushed or dropped.
pub struct LineWriter<F: FnMut(&str)> {
    buf: Vec<u8>,
    sink: F,
}

impl<F: FnMut(&str)> LineWriter<F> {
    pub fn new(sink: F) -> Self {
        Self {
            buf: Vec::new(),
            sink,
        }
    }
}

impl<F: FnMut(&str)> io::Write for LineWriter<F> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.buf.extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if !self.buf.is_empty() {
            let line = String::from_utf8_lossy(&self.buf);
            (self.sink)(line.trim_end());
            self.buf.clear();
        }
        Ok(())
    }
}

impl<F: FnMut(&str)> Drop for LineWriter<F> {
    fn drop(&mut self) {
        let _ = io::Write::flush(self);
    }
}
