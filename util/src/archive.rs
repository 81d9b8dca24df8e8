//! CSV archiving
//!
//! Archivers write rows into a CSV file inside the session's archive
//! directory. They are used for trace output which is not part of the control
//! path. Records must be flat structs and should carry their own timestamp.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External imports
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::path::Path;
use thiserror::Error;

// Internal imports
use crate::session::Session;

pub use csv::Writer;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// An object used to write CSV archive files.
pub struct Archiver {
    writer: Writer<File>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

/// Errors that can occur while archiving.
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("Cannot create the archive file: {0}")]
    CreateError(std::io::Error),

    #[error("Cannot write the archive record: {0}")]
    WriteError(csv::Error),

    #[error("Cannot flush the archive: {0}")]
    FlushError(std::io::Error),
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl Archiver {
    /// Create a new archiver from a paricular path relative to the session's
    /// archive root.
    pub fn from_path<P: AsRef<Path>>(session: &Session, path: P) -> Result<Self, ArchiveError> {
        let file = File::create(session.arch_root.join(path)).map_err(ArchiveError::CreateError)?;

        Ok(Self {
            writer: WriterBuilder::new().has_headers(true).from_writer(file),
        })
    }

    /// Serialise a record into the archive.
    pub fn serialise<T: Serialize>(&mut self, record: &T) -> Result<(), ArchiveError> {
        self.writer
            .serialize(record)
            .map_err(ArchiveError::WriteError)?;

        self.writer.flush().map_err(ArchiveError::FlushError)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[derive(Serialize)]
    struct Row {
        time_s: f64,
        name: String,
        on_target: bool,
    }

    // Only one session may be started per process, so this is the only test
    // in the crate which creates one.
    #[test]
    fn test_session_archive() {
        let dir = std::env::temp_dir().join(format!("util_archive_test_{}", std::process::id()));
        let session = Session::new_in("test_exec", &dir).unwrap();
        assert!(session.arch_root.is_dir());
        assert!(crate::session::get_epoch().is_some());

        let mut arch = Archiver::from_path(&session, "rows.csv").unwrap();
        for i in 0..3 {
            arch.serialise(&Row {
                time_s: i as f64 * 0.5,
                name: format!("row{}", i),
                on_target: i == 2,
            })
            .unwrap();
        }

        let text = std::fs::read_to_string(session.arch_root.join("rows.csv")).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "time_s,name,on_target");
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[3], "1.0,row2,true");

        session.save_json("out/summary.json", &vec![1, 2, 3]).unwrap();
        let json = std::fs::read_to_string(session.session_root.join("out/summary.json")).unwrap();
        assert!(json.contains('2'));

        // A second session in the same process is refused
        assert!(matches!(
            Session::new_in("test_exec", &dir),
            Err(crate::session::SessionError::CannotInitEpoch(_))
        ));

        std::fs::remove_dir_all(&dir).ok();
    }
}
