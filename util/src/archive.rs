//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
pub use csv::Writer;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors which can occur while writing an archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot open the archive file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    Csv(#[from] csv::Error),

    #[error("The archiver has not been opened")]
    NotOpen,
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a csv.
///
/// The struct shall own an `Archiver` which is opened in its `init` or
/// `new` functions, or later on once a session is available.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        // Create the parent directories and truncate any previous file
        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        File::create(&session_path)?;

        let file = OpenOptions::new().append(true).open(session_path)?;

        let w = WriterBuilder::new().has_headers(true).from_writer(file);

        Ok(Self { writer: Some(w) })
    }

    /// Returns true if the archiver has an open file.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: T) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                w.serialize(record)?;
                w.flush()?;
                Ok(())
            }
            None => Err(ArchiveError::NotOpen),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        tick: u64,
        error: i32,
    }

    #[test]
    fn test_archiver_writes_rows() {
        let sessions = std::env::temp_dir().join("follower_util_archive_test");
        let session = Session::new_in(&sessions, "archive_test").unwrap();

        let mut arch = Archiver::from_path(&session, "ctrl/rows.csv").unwrap();
        assert!(arch.is_open());
        arch.serialise(Row { tick: 0, error: 170 }).unwrap();
        arch.serialise(Row { tick: 1, error: -3 }).unwrap();

        let contents = std::fs::read_to_string(session.arch_root.join("ctrl/rows.csv")).unwrap();
        assert_eq!(contents, "tick,error\n0,170\n1,-3\n");
    }

    #[test]
    fn test_unopened_archiver() {
        let mut arch = Archiver::default();
        assert!(!arch.is_open());
        assert!(matches!(
            arch.serialise(Row { tick: 0, error: 0 }),
            Err(ArchiveError::NotOpen)
        ));
    }
}
