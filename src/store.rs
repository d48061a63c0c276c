use crate::{
    data::Entry,
    read::{read_entries, Layout},
    write::write_entries,
};
use anyhow::Context;
use std::{
    fs::{self, File},
    io::{BufReader, ErrorKind},
    path::{Path, PathBuf},
};
use tracing::{debug, info, warn};

/// Append-only entry log backed by a single CSV file. Every call re-reads the
/// file; nothing is cached between calls and there is no locking, so two
/// concurrent `save`s can lose one of the batches.
#[derive(Debug, Clone)]
pub(crate) struct Store {
    path: PathBuf,
}

impl Store {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the whole log. A missing, empty or malformed file reads as an empty
    /// log; the file itself is left alone until the next `save` overwrites it.
    pub fn load(&self) -> Result<Vec<Entry>, anyhow::Error> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "no entry log yet");
                return Ok(Vec::new());
            }
            Err(e) => {
                return Err(e).with_context(|| format!("opening {}", self.path.display()));
            }
        };
        let mut entries = Vec::new();
        let layout = read_entries(BufReader::new(file), &mut entries)
            .with_context(|| format!("reading {}", self.path.display()))?;
        match layout {
            Layout::Entries(read) => {
                debug!(path = %self.path.display(), read, "entry log loaded");
            }
            Layout::Empty => {
                warn!(path = %self.path.display(), "entry log is empty, starting from an empty log");
            }
            Layout::MissingColumns(missing) => {
                warn!(
                    path = %self.path.display(),
                    ?missing,
                    "entry log lacks required columns, discarding its contents"
                );
            }
        }
        Ok(entries)
    }

    /// Appends `new_entries` after the current log and rewrites the whole file.
    /// Returns the number of entries now in the log.
    pub fn save(&self, new_entries: &[Entry]) -> Result<usize, anyhow::Error> {
        let mut entries = self.load()?;
        let existing = entries.len();
        entries.extend_from_slice(new_entries);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let file = File::create(&self.path)
            .with_context(|| format!("creating {}", self.path.display()))?;
        write_entries(file, &entries)
            .with_context(|| format!("writing {}", self.path.display()))?;
        info!(
            path = %self.path.display(),
            existing,
            appended = new_entries.len(),
            "entry log saved"
        );
        Ok(entries.len())
    }
}
