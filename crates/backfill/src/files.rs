//! Starter files for the fabricated project and the marker appends that give
//! every commit something to record.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// A file seeded into the project, and a candidate target for later commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileSpec {
    pub name: &'static str,
    pub content: &'static str,
}

pub const DEFAULT_FILES: [FileSpec; 3] = [
    FileSpec {
        name: "index.html",
        content: "<!DOCTYPE html>\n<html>\n<head>\n    <title>Dummy Project</title>\n    <link rel='stylesheet' href='styles.css'>\n</head>\n<body>\n    <h1>Hello World</h1>\n    <script src='script.js'></script>\n</body>\n</html>",
    },
    FileSpec {
        name: "styles.css",
        content: "body { font-family: Arial, sans-serif; }\nh1 { color: #333; }",
    },
    FileSpec {
        name: "script.js",
        content: "console.log('Hello World');",
    },
];

/// Write every spec into `dir`, truncating whatever was there before.
pub fn seed_files(dir: &Path, specs: &[FileSpec]) -> io::Result<()> {
    for spec in specs {
        fs::write(dir.join(spec.name), spec.content)?;
    }
    Ok(())
}

/// The line appended to a file for a commit stamped `timestamp`.
pub fn marker_line(timestamp: &str) -> String {
    format!("\n// Commit on {}\n", timestamp)
}

/// A marker that has been appended to a file and can be taken back.
#[derive(Debug)]
pub struct AppendedMarker {
    path: PathBuf,
    previous_len: u64,
}

impl AppendedMarker {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Truncate the file back to its length before the append.
    pub fn revert(self) -> io::Result<()> {
        let file = OpenOptions::new().write(true).open(&self.path)?;
        file.set_len(self.previous_len)
    }
}

/// Append the marker for `timestamp` to `spec`'s file inside `dir`.
///
/// The file is created if missing; existing content is never touched.
pub fn append_marker(dir: &Path, spec: &FileSpec, timestamp: &str) -> io::Result<AppendedMarker> {
    let path = dir.join(spec.name);
    let previous_len = match fs::metadata(&path) {
        Ok(meta) => meta.len(),
        Err(e) if e.kind() == io::ErrorKind::NotFound => 0,
        Err(e) => return Err(e),
    };
    let mut file: File = OpenOptions::new().create(true).append(true).open(&path)?;
    file.write_all(marker_line(timestamp).as_bytes())?;
    Ok(AppendedMarker { path, previous_len })
}
