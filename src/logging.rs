use std::fs::OpenOptions;
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::{Arc, Mutex};
use tracing::Level;
use tracing_subscriber::Layer;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

pub const LOG_FILE_CAP: u64 = 10 * 1024 * 1024;

/// Parses `trace`..`error`, falling back to INFO.
pub fn parse_level(raw: &str) -> Level {
    Level::from_str(raw).unwrap_or_else(|_| {
        eprintln!("Invalid log level: {}. Using INFO level.", raw);
        Level::INFO
    })
}

/// Logs go to stderr so they never interleave with replies on stdout.
pub fn init_logging(log_level: Level, log_file: Option<&Path>) {
    let level_filter = LevelFilter::from_level(log_level);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(level_filter);

    let file_layer = log_file.map(|path| {
        let writer = CappedFile::new(path.to_path_buf(), LOG_FILE_CAP);
        tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .with_filter(level_filter)
    });

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(file_layer)
        .init();
}

/// Append-only log file that, once it reaches `max_len`, drops its older half.
#[derive(Clone)]
struct CappedFile {
    path: PathBuf,
    max_len: u64,
    lock: Arc<Mutex<()>>,
}

impl CappedFile {
    fn new(path: PathBuf, max_len: u64) -> Self {
        Self { path, max_len, lock: Arc::new(Mutex::new(())) }
    }

    fn keep_tail(&self) -> io::Result<()> {
        let mut file = OpenOptions::new().read(true).open(&self.path)?;
        let size = file.metadata()?.len();
        file.seek(SeekFrom::Start(size.saturating_sub(self.max_len / 2)))?;
        let mut tail = Vec::new();
        file.read_to_end(&mut tail)?;
        std::fs::write(&self.path, tail)
    }
}

impl Write for CappedFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        // Poisoning only means another writer panicked mid-line
        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        let full = std::fs::metadata(&self.path).map_or(false, |m| m.len() >= self.max_len);
        if full {
            self.keep_tail()?;
        }

        OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?
            .write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}
