use std::{
    fmt::Write as _,
    fs::{self, OpenOptions},
    io::{BufWriter, Write},
    path::{Path, PathBuf},
    sync::Mutex,
    thread,
    time::Duration,
};

use chrono::{format::DelayedFormat, Local};
use crossbeam_channel::{bounded, unbounded, Sender};
use once_cell::sync::Lazy;

static LOGGER: Lazy<Logger> = Lazy::new(|| Logger::new("default"));

/// 所有已建立的寫入線程，程序結束前由 `flush_and_wait` 逐一清空
static WRITERS: Lazy<Mutex<Vec<Sender<Entry>>>> = Lazy::new(Default::default);

const LINE_CAPACITY: usize = 2048;

/// What the writer thread receives: a line to append, or a request to flush
/// everything buffered so far and acknowledge.
enum Entry {
    Line(String),
    Flush(Sender<()>),
}

/// A named logger that appends to `log/{date}_{name}_{level}.log`.
///
/// Each level owns a background thread so the caller never blocks on disk I/O.
pub struct Logger {
    info_writer: Option<Sender<Entry>>,
    warn_writer: Option<Sender<Entry>>,
    error_writer: Option<Sender<Entry>>,
    debug_writer: Option<Sender<Entry>>,
}

impl Logger {
    pub fn new(log_name: &str) -> Self {
        Logger {
            info_writer: Self::create_writer(&format!("{}_info", log_name)),
            warn_writer: Self::create_writer(&format!("{}_warn", log_name)),
            error_writer: Self::create_writer(&format!("{}_error", log_name)),
            debug_writer: Self::create_writer(&format!("{}_debug", log_name)),
        }
    }

    pub fn info(&self, log: String) {
        Self::send(log, &self.info_writer);
    }

    pub fn warn(&self, log: String) {
        Self::send(log, &self.warn_writer);
    }

    pub fn error(&self, log: String) {
        Self::send(log, &self.error_writer);
    }

    pub fn debug(&self, log: String) {
        Self::send(log, &self.debug_writer);
    }

    /// Asks every writer thread of this logger to flush and waits at most
    /// `timeout` for each.
    pub fn flush(&self, timeout: Duration) {
        let writers = [
            &self.info_writer,
            &self.warn_writer,
            &self.error_writer,
            &self.debug_writer,
        ];

        for writer in writers.into_iter().flatten() {
            flush_writer(writer, timeout);
        }
    }

    fn send(msg: String, writer: &Option<Sender<Entry>>) {
        match writer {
            Some(w) => {
                if let Err(why) = w.send(Entry::Line(msg)) {
                    error_console(why.to_string());
                }
            }
            None => error_console(msg),
        }
    }

    fn create_writer(log_name: &str) -> Option<Sender<Entry>> {
        let log_path = match Self::get_log_path(log_name) {
            Some(p) => p,
            None => {
                error_console(format!(
                    "Failed to create log directory for {}. Falling back to console",
                    log_name
                ));
                return None;
            }
        };

        let file = match OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_path)
        {
            Ok(f) => f,
            Err(why) => {
                error_console(format!(
                    "Failed to open log file {} because {:?}",
                    log_path.display(),
                    why
                ));
                return None;
            }
        };

        let (tx, rx) = unbounded::<Entry>();

        // 寫入檔案的操作使用另一個線程處理
        thread::spawn(move || {
            let mut writer = BufWriter::new(file);
            let mut line = String::with_capacity(LINE_CAPACITY);

            for received in &rx {
                let ack = match received {
                    Entry::Line(msg) => {
                        if writeln!(&mut line, "{} {}", Local::now().format("%F %X%.6f"), msg)
                            .is_err()
                        {
                            continue;
                        }
                        None
                    }
                    Entry::Flush(ack) => Some(ack),
                };

                if ack.is_some() || rx.is_empty() || line.len() >= LINE_CAPACITY {
                    if let Err(why) = writer.write_all(line.as_bytes()) {
                        error_console(format!(
                            "Failed to write to log file. because:{:#?}\r\nmsg:{}",
                            why, line
                        ));
                    }

                    if let Err(why) = writer.flush() {
                        error_console(format!("Failed to flush log file. because:{:#?}", why));
                    }

                    line.clear();
                }

                if let Some(ack) = ack {
                    let _ = ack.send(());
                }
            }
        });

        WRITERS
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push(tx.clone());

        Some(tx)
    }

    fn get_log_path(name: &str) -> Option<PathBuf> {
        let path = Path::new("log");

        if !path.exists() {
            fs::create_dir_all(path).ok()?;
        }

        let mut log_path = PathBuf::from(path);
        log_path.push(format!("{}_{}.log", Local::now().format("%Y-%m-%d"), name));

        Some(log_path)
    }
}

pub fn info_file_async(log: String) {
    LOGGER.info(log);
}

pub fn warn_file_async(log: String) {
    LOGGER.warn(log);
}

pub fn error_file_async(log: String) {
    LOGGER.error(log);
}

pub fn debug_file_async(log: String) {
    LOGGER.debug(log);
}

/// Flushes every named logger created so far; called before the process exits.
pub fn flush_and_wait() {
    let writers: Vec<Sender<Entry>> = WRITERS
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .clone();

    for writer in &writers {
        flush_writer(writer, Duration::from_millis(500));
    }
}

fn flush_writer(writer: &Sender<Entry>, timeout: Duration) {
    let (ack_tx, ack_rx) = bounded::<()>(1);
    if writer.send(Entry::Flush(ack_tx)).is_ok() {
        let _ = ack_rx.recv_timeout(timeout);
    }
}

pub fn info_console(log: String) {
    println!(
        "{} Info {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn warn_console(log: String) {
    println!(
        "{} Warn {}",
        Local::now().format("%Y-%m-%d %H:%M:%S.%3f"),
        log
    );
}

pub fn error_console(log: String) {
    eprintln!(
        "{} Error {}",
        DelayedFormat::to_string(&Local::now().format("%Y-%m-%d %H:%M:%S.%3f")),
        log
    );
}
