//! Append-only daily order spreadsheet

use chrono::NaiveDateTime;
use songdesk_core::{LogDate, LogRecord, LOG_HEADER};
use tokio::sync::broadcast;
use tracing::{debug, error, info};

use crate::clock::Clock;
use crate::error::Result;
use crate::event::LogEvent;
use crate::storage::LogStorage;
use crate::workbook::{self, Cell};

/// Capacity of the event channel; slow subscribers miss older events
const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Result of a successful append
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Appended {
    /// Location of the file written
    pub file: String,
    pub date: LogDate,
    /// Data rows in the file after the append (header excluded)
    pub data_rows: usize,
    /// Timestamp written into the row
    pub at: NaiveDateTime,
}

/// A day's spreadsheet as stored
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub name: String,
    pub bytes: Vec<u8>,
}

/// Order log over an injected storage handle and clock
///
/// Each append reads the whole day's file, adds one row and writes it back.
/// There is no locking: two appends racing on the same day can lose a row.
pub struct OrderLog<S, C> {
    storage: S,
    clock: C,
    prefix: String,
    events: broadcast::Sender<LogEvent>,
}

impl<S: LogStorage, C: Clock> OrderLog<S, C> {
    pub fn new(storage: S, clock: C, prefix: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            storage,
            clock,
            prefix: prefix.into(),
            events,
        }
    }

    /// Receive an event for every append attempt from now on
    pub fn subscribe(&self) -> broadcast::Receiver<LogEvent> {
        self.events.subscribe()
    }

    /// Date of the file the next append goes to
    pub fn today(&self) -> LogDate {
        LogDate::from_datetime(&self.clock.now())
    }

    pub fn file_name(&self, date: &LogDate) -> String {
        date.file_name(&self.prefix)
    }

    /// Append one row for `record` to today's file
    ///
    /// Emits a [`LogEvent`] either way.
    pub fn append(&self, record: &LogRecord) -> Result<Appended> {
        let at = self.clock.now();
        let date = LogDate::from_datetime(&at);
        let name = self.file_name(&date);
        let file = self.storage.locate(&name);

        match self.write_row(&name, record, at) {
            Ok(data_rows) => {
                info!(file = %file, data_rows, "Order logged");
                let _ = self.events.send(LogEvent::Appended {
                    file: file.clone(),
                    date: date.to_string(),
                    data_rows,
                });
                Ok(Appended {
                    file,
                    date,
                    data_rows,
                    at,
                })
            }
            Err(e) => {
                error!(file = %file, error = %e, "Failed to log order, row dropped");
                let _ = self.events.send(LogEvent::AppendFailed {
                    file,
                    date: date.to_string(),
                    error: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Append, swallowing any failure
    ///
    /// The failure is still reported through tracing and the event channel.
    pub fn record(&self, record: &LogRecord) -> Option<Appended> {
        self.append(record).ok()
    }

    /// Stored bytes of a day's file, if it exists
    pub fn read_file(&self, date: &LogDate) -> Result<Option<LogFile>> {
        let name = self.file_name(date);
        Ok(self
            .storage
            .read(&name)?
            .map(|bytes| LogFile { name, bytes }))
    }

    /// Decoded rows of a day's file, header first; empty if it does not exist
    pub fn rows(&self, date: &LogDate) -> Result<Vec<Vec<String>>> {
        match self.storage.read(&self.file_name(date))? {
            Some(bytes) => workbook::decode(&bytes),
            None => Ok(Vec::new()),
        }
    }

    fn write_row(&self, name: &str, record: &LogRecord, at: NaiveDateTime) -> Result<usize> {
        self.storage.prepare()?;

        let mut rows = match self.storage.read(name)? {
            Some(bytes) => workbook::decode_cells(&bytes)?,
            None => Vec::new(),
        };

        if rows.iter().flatten().all(Cell::is_blank) {
            debug!("Starting new order log: {}", name);
            rows = vec![LOG_HEADER.iter().map(|h| Cell::from(*h)).collect()];
        }

        rows.push(record.to_row(at).into_iter().map(Cell::from).collect());
        let bytes = workbook::encode_cells(&rows)?;
        self.storage.write(name, &bytes)?;

        Ok(rows.len() - 1)
    }
}
