//! Struct archiving functionality
//!
//! To add archiving functionality to a struct implement the `Archived` trait.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use std::path::Path;
use std::fs::{File, OpenOptions};
use csv::WriterBuilder;
pub use csv::Writer;
use thiserror::Error;

// Internal imports
use crate::session::{Session, get_elapsed_seconds};

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
///
/// Each row starts with the session elapsed time, followed by the values of the record.
#[derive(Default)]
pub struct Archiver {
    writer: Option<Writer<File>>
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors raised while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot open the archive file: {0}")]
    OpenError(std::io::Error),

    #[error("Cannot write to the archive: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),

    #[error("The archiver has not been initialised")]
    NotInitialised
}

// ---------------------------------------------------------------------------
// TRAITS
// ---------------------------------------------------------------------------

/// A trait which enables a struct to be archived as a timestamped csv.
///
/// To implement this trait, the struct shall have an `Archiver` member which
/// shall be setup in the struct's `init` or `new` functions.
pub trait Archived {
    /// Write the archives for this struct
    fn write(&mut self) -> Result<(), ArchiveError>;
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root, writing the given column names as the header line.
    pub fn from_path<P: AsRef<Path>>(
        session: &Session, path: P, columns: &[String]
    ) -> Result<Self, ArchiveError> {
        let session_path = session.arch_root.join(path);

        if let Some(parent) = session_path.parent() {
            std::fs::create_dir_all(parent).map_err(ArchiveError::OpenError)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(session_path)
            .map_err(ArchiveError::OpenError)?;

        let mut w = WriterBuilder::new()
            .has_headers(false)
            .from_writer(file);

        let mut header = vec![String::from("time_s")];
        header.extend(columns.iter().cloned());
        w.write_record(&header).map_err(ArchiveError::WriteError)?;

        Ok(Self {
            writer: Some(w)
        })
    }

    /// Write a row of values into the archive, prefixed by the elapsed session time.
    pub fn write_row(&mut self, row: &[f64]) -> Result<(), ArchiveError> {
        match self.writer {
            Some(ref mut w) => {
                let fields = std::iter::once(get_elapsed_seconds())
                    .chain(row.iter().copied())
                    .map(|v| v.to_string());
                w.write_record(fields).map_err(ArchiveError::WriteError)?;
                w.flush().map_err(ArchiveError::FlushError)
            },
            None => Err(ArchiveError::NotInitialised)
        }
    }

    /// True once the archiver has been opened on a file.
    pub fn is_open(&self) -> bool {
        self.writer.is_some()
    }
}
