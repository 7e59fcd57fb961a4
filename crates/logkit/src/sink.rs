//! Daily rotating log file
//!
//! Writes go to `<output_dir><YYYY-MM-DD><filename>`; a stable link at
//! `<output_dir><filename>` always points at the file written last. Files
//! older than the retention window are removed on a background thread.

use crate::error::{LogError, Result};
use chrono::{DateTime, Local, NaiveDate};
use std::cell::Cell;
use std::fmt;
use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::JoinHandle;
use std::time::{Duration, SystemTime};
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer};

/// Files are kept for a week
pub const DEFAULT_MAX_AGE: Duration = Duration::from_secs(7 * 24 * 60 * 60);

const DATE_FORMAT: &str = "%Y-%m-%d";
const DATE_PLACEHOLDER: &str = "{date}";

/// Source of the current local time for rotation and timestamps
pub trait Clock: Send + Sync + fmt::Debug {
    fn now(&self) -> DateTime<Local>;
}

/// Wall clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Local> {
        Local::now()
    }
}

thread_local! {
    static EVENT_TIME: Cell<Option<DateTime<Local>>> = const { Cell::new(None) };
}

/// Time of the event being written on this thread, or `clock.now()` outside
/// of one.
pub(crate) fn event_now(clock: &dyn Clock) -> DateTime<Local> {
    EVENT_TIME.with(Cell::get).unwrap_or_else(|| clock.now())
}

/// Reads the clock once per event so that every copy of an entry carries the
/// same timestamp and lands in the same dated file.
///
/// The `stamp` layer must sit below the fmt layers and the `clear` layer
/// above them: inner layers see an event first.
#[derive(Debug, Clone)]
pub(crate) struct EventTime {
    clock: Option<Arc<dyn Clock>>,
}

impl EventTime {
    pub(crate) fn stamp(clock: Arc<dyn Clock>) -> Self {
        Self { clock: Some(clock) }
    }

    pub(crate) fn clear() -> Self {
        Self { clock: None }
    }
}

impl<S: Subscriber> Layer<S> for EventTime {
    fn on_event(&self, _event: &Event<'_>, _ctx: Context<'_, S>) {
        let now = self.clock.as_ref().map(|clock| clock.now());
        EVENT_TIME.with(|time| time.set(now));
    }
}

/// Knobs for [`RotatingFile`] that are not part of [`crate::LoggerConfig`]
#[derive(Debug, Clone)]
pub struct SinkOptions {
    /// Dated files last modified longer ago than this are deleted
    pub max_age: Duration,

    pub clock: Arc<dyn Clock>,
}

impl Default for SinkOptions {
    fn default() -> Self {
        Self {
            max_age: DEFAULT_MAX_AGE,
            clock: Arc::new(SystemClock),
        }
    }
}

/// Append-only writer that switches to a new file every calendar day.
///
/// One mutex covers both rotation and the physical write, so every entry
/// lands whole in exactly one file: the one current when the write is taken.
pub struct RotatingFile {
    output_dir: String,
    filename: String,
    link_path: PathBuf,
    max_age: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<ActiveFile>,
    last_purge: Mutex<Option<JoinHandle<()>>>,
}

struct ActiveFile {
    date: NaiveDate,
    path: PathBuf,
    file: File,
}

impl RotatingFile {
    /// Open today's file, creating the directory if needed.
    ///
    /// Fails if the directory cannot be created or the file cannot be opened.
    pub fn new(output_dir: &str, filename: &str, options: SinkOptions) -> Result<Self> {
        let link_path = PathBuf::from(format!("{}{}", output_dir, filename));
        let date = options.clock.now().date_naive();
        let path = dated_path(output_dir, filename, date);

        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|source| LogError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let file = open_append(&path).map_err(|source| LogError::OpenFile {
            path: path.clone(),
            source,
        })?;

        let sink = Self {
            output_dir: output_dir.to_string(),
            filename: filename.to_string(),
            link_path,
            max_age: options.max_age,
            clock: options.clock,
            state: Mutex::new(ActiveFile { date, path, file }),
            last_purge: Mutex::new(None),
        };

        sink.update_link(&sink.current_path());
        sink.spawn_purge();
        Ok(sink)
    }

    /// Path of the file currently written to
    pub fn current_path(&self) -> PathBuf {
        self.lock().path.clone()
    }

    /// Stable name pointing at the current file
    pub fn link_path(&self) -> &Path {
        &self.link_path
    }

    /// Physical file used for `date`
    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        dated_path(&self.output_dir, &self.filename, date)
    }

    fn lock(&self) -> MutexGuard<'_, ActiveFile> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_entry(&self, buf: &[u8]) -> io::Result<()> {
        let mut active = self.lock();

        let today = event_now(&*self.clock).date_naive();
        if today != active.date {
            self.rotate(&mut active, today)?;
        }

        active.file.write_all(buf)
    }

    fn rotate(&self, active: &mut ActiveFile, date: NaiveDate) -> io::Result<()> {
        let path = self.path_for(date);
        let file = open_append(&path)?;

        active.file.flush()?;
        *active = ActiveFile { date, path, file };

        self.update_link(&active.path);
        self.spawn_purge();
        Ok(())
    }

    /// Repoint the link; failures are reported and otherwise ignored.
    fn update_link(&self, target: &Path) {
        if let Err(e) = replace_link(&self.link_path, target) {
            eprintln!(
                "Warning: Failed to update log link {:?} -> {:?}: {}",
                self.link_path, target, e
            );
        }
    }

    fn spawn_purge(&self) {
        let Some(pattern) = FilePattern::new(&self.output_dir, &self.filename) else {
            return;
        };
        let max_age = self.max_age;
        let now = SystemTime::from(self.clock.now());

        let spawned = std::thread::Builder::new()
            .name("logkit-purge".to_string())
            .spawn(move || {
                if let Err(e) = pattern.purge(now, max_age) {
                    eprintln!("Warning: Failed to purge old log files: {}", e);
                }
            });
        match spawned {
            Ok(handle) => {
                *self.last_purge.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            Err(e) => eprintln!("Warning: Failed to start log purge thread: {}", e),
        }
    }

    /// Wait for the most recently started background sweep
    #[cfg(test)]
    fn join_purge(&self) {
        let handle = self.last_purge.lock().unwrap_or_else(PoisonError::into_inner).take();
        if let Some(handle) = handle {
            handle.join().unwrap();
        }
    }

    /// Delete dated files older than the retention window, returning how many
    /// were removed.
    ///
    /// Runs on a background thread after every rotation; exposed for callers
    /// that want a synchronous sweep.
    pub fn purge_expired(&self) -> io::Result<usize> {
        match FilePattern::new(&self.output_dir, &self.filename) {
            Some(pattern) => pattern.purge(SystemTime::from(self.clock.now()), self.max_age),
            None => Ok(0),
        }
    }
}

impl fmt::Debug for RotatingFile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RotatingFile")
            .field("output_dir", &self.output_dir)
            .field("filename", &self.filename)
            .field("max_age", &self.max_age)
            .finish()
    }
}

impl Write for &RotatingFile {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_entry(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().file.flush()
    }
}

fn dated_path(output_dir: &str, filename: &str, date: NaiveDate) -> PathBuf {
    PathBuf::from(format!("{}{}{}", output_dir, date.format(DATE_FORMAT), filename))
}

fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

#[cfg(unix)]
fn replace_link(link: &Path, target: &Path) -> io::Result<()> {
    // Same directory: keep the link relative so the tree can be moved.
    let target = match (link.parent(), target.parent(), target.file_name()) {
        (Some(a), Some(b), Some(name)) if a == b => PathBuf::from(name),
        _ => target.to_path_buf(),
    };

    let Some(name) = link.file_name() else {
        return Err(io::Error::new(io::ErrorKind::InvalidInput, "link has no file name"));
    };
    let tmp = link.with_file_name(format!(".{}.tmp", name.to_string_lossy()));
    let _ = std::fs::remove_file(&tmp);

    std::os::unix::fs::symlink(&target, &tmp)?;
    std::fs::rename(&tmp, link)
}

#[cfg(not(unix))]
fn replace_link(_link: &Path, _target: &Path) -> io::Result<()> {
    Ok(())
}

/// Recognises the dated files of one sink inside its directory
#[derive(Debug, Clone)]
struct FilePattern {
    dir: PathBuf,
    head: String,
    tail: String,
}

impl FilePattern {
    fn new(output_dir: &str, filename: &str) -> Option<Self> {
        let template = PathBuf::from(format!("{}{}{}", output_dir, DATE_PLACEHOLDER, filename));
        let name = template.file_name()?.to_str()?;
        let (head, tail) = name.split_once(DATE_PLACEHOLDER)?;

        let dir = match template.parent() {
            Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
            _ => PathBuf::from("."),
        };

        Some(Self {
            dir,
            head: head.to_string(),
            tail: tail.to_string(),
        })
    }

    fn matches(&self, name: &str) -> bool {
        name.strip_prefix(self.head.as_str())
            .and_then(|rest| rest.strip_suffix(self.tail.as_str()))
            .is_some_and(|date| NaiveDate::parse_from_str(date, DATE_FORMAT).is_ok())
    }

    fn purge(&self, now: SystemTime, max_age: Duration) -> io::Result<usize> {
        let Some(cutoff) = now.checked_sub(max_age) else {
            return Ok(0);
        };

        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            // Directory removed under us: nothing left to purge.
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name();
            let Some(name) = name.to_str() else {
                continue;
            };
            if !self.matches(name) {
                continue;
            }

            let Ok(modified) = entry.metadata().and_then(|m| m.modified()) else {
                continue;
            };
            if modified >= cutoff {
                continue;
            }

            match std::fs::remove_file(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => eprintln!("Warning: Failed to remove old log file {:?}: {}", entry.path(), e),
            }
        }

        Ok(removed)
    }
}
