// Copyright 2023-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Date-partitioned JSON transcript of every classified event.
//!
//! Events are appended to `<dir>/<YYYY-MM-DD>-log.log`, one JSON object per line. The file
//! is opened in append-create mode for every record and closed right after, so concurrent
//! writers never share a descriptor. Each record is a single `write_all` of the full line on
//! an `O_APPEND` descriptor, which keeps lines from interleaving.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;

use time::{Date, OffsetDateTime, UtcOffset};
use tracing::{error, trace};

/// Returns the local UTC offset, or UTC when it cannot be determined.
///
/// Must be called before the async runtime spawns its worker threads: the offset lookup
/// refuses to run in a multi-threaded process on some platforms.
pub fn local_offset() -> UtcOffset {
    UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC)
}

#[derive(Debug, Clone)]
pub struct Transcript {
    dir: PathBuf,
    offset: UtcOffset,
}

impl Transcript {
    pub fn new(dir: impl Into<PathBuf>, offset: UtcOffset) -> Self {
        Transcript {
            dir: dir.into(),
            offset,
        }
    }

    /// `YYYY-MM-DD-log.log` for the given calendar date.
    pub fn file_name(date: Date) -> String {
        format!(
            "{:04}-{:02}-{:02}-log.log",
            date.year(),
            u8::from(date.month()),
            date.day()
        )
    }

    /// File for `now` in the startup offset.
    pub fn path_for(&self, now: OffsetDateTime) -> PathBuf {
        self.dir
            .join(Self::file_name(now.to_offset(self.offset).date()))
    }

    /// The file today's records go to.
    pub fn current_path(&self) -> PathBuf {
        let now = OffsetDateTime::now_utc();
        self.dir
            .join(Self::file_name(now.to_offset(self.offset_at(now)).date()))
    }

    /// Local offset at `now`, so a DST change takes effect without a restart. Platforms that
    /// refuse the lookup once the process has several threads keep the startup offset.
    pub fn offset_at(&self, now: OffsetDateTime) -> UtcOffset {
        UtcOffset::local_offset_at(now).unwrap_or(self.offset)
    }

    /// Appends `json` plus a newline to today's file and returns its path.
    pub async fn append(&self, json: &str) -> std::io::Result<PathBuf> {
        let path = self.current_path();
        let mut line = String::with_capacity(json.len() + 1);
        line.push_str(json);
        line.push('\n');

        tokio::task::spawn_blocking(move || {
            let mut file = OpenOptions::new().create(true).append(true).open(&path)?;
            file.write_all(line.as_bytes())?;
            Ok::<_, std::io::Error>(path)
        })
        .await
        .map_err(std::io::Error::other)?
    }

    /// Like [`Transcript::append`], but failures are logged and swallowed.
    pub async fn record(&self, json: &str) {
        match self.append(json).await {
            Ok(path) => trace!("Appended event to {}", path.display()),
            Err(e) => error!("Error appending to transcript: {}", e),
        }
    }
}
