//! Handing exported files to the user.
//!
//! A [`ShareTarget`] receives a [`ShareRequest`]: the files, their
//! `file://` references, a subject and a message. [`FolderShare`] copies
//! into a synced folder; [`ChooserShare`] prints the references so the user
//! can pick where they go. [`share_with_fallback`] tries one, then the other.

use std::cell::RefCell;
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use crate::error::{Result, TodoError};

pub const SHARE_SUBJECT: &str = "Medical Data Backup";

/// What a share target is handed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareRequest {
    pub files: Vec<PathBuf>,
    pub uris: Vec<String>,
    pub subject: String,
    pub text: String,
}

impl ShareRequest {
    /// Build a request for `files`, which must exist.
    ///
    /// # Errors
    ///
    /// Returns `Share` if a file cannot be resolved to a canonical path.
    pub fn new(files: &[PathBuf], task_count: usize) -> Result<Self> {
        let mut canonical = Vec::with_capacity(files.len());
        for file in files {
            let path = dunce::canonicalize(file).map_err(|e| TodoError::Share {
                reason: format!("cannot resolve {}: {e}", file.display()),
            })?;
            canonical.push(path);
        }
        let uris = canonical.iter().map(|p| file_uri(p)).collect();

        Ok(Self {
            files: canonical,
            uris,
            subject: SHARE_SUBJECT.to_string(),
            text: format!("Backup files (Excel) with {task_count} medical records"),
        })
    }
}

/// `file://` reference for an absolute path.
#[must_use]
pub fn file_uri(path: &Path) -> String {
    let mut raw = path.to_string_lossy().replace('\\', "/");
    if !raw.starts_with('/') {
        raw.insert(0, '/');
    }
    let mut uri = String::from("file://");
    for ch in raw.chars() {
        match ch {
            ' ' => uri.push_str("%20"),
            '#' => uri.push_str("%23"),
            '%' => uri.push_str("%25"),
            '?' => uri.push_str("%3F"),
            c => uri.push(c),
        }
    }
    uri
}

/// Something that can take a batch of files off our hands.
pub trait ShareTarget {
    /// Short label for logs and output.
    fn name(&self) -> &str;

    /// # Errors
    ///
    /// Returns `Share` if the files could not be handed over.
    fn share(&self, request: &ShareRequest) -> Result<()>;
}

/// Copies the files into a folder that some other tool keeps in sync.
#[derive(Debug, Clone)]
pub struct FolderShare {
    pub dest: PathBuf,
}

impl FolderShare {
    #[must_use]
    pub fn new(dest: impl Into<PathBuf>) -> Self {
        Self { dest: dest.into() }
    }
}

impl ShareTarget for FolderShare {
    fn name(&self) -> &str {
        "folder"
    }

    fn share(&self, request: &ShareRequest) -> Result<()> {
        let fail = |what: &str, e: io::Error| TodoError::Share {
            reason: format!("{what} {}: {e}", self.dest.display()),
        };

        fs::create_dir_all(&self.dest).map_err(|e| fail("cannot create", e))?;
        for file in &request.files {
            let Some(name) = file.file_name() else {
                continue;
            };
            fs::copy(file, self.dest.join(name)).map_err(|e| fail("cannot copy into", e))?;
        }
        tracing::info!(
            dest = %self.dest.display(),
            files = request.files.len(),
            "Copied backup to share folder"
        );
        Ok(())
    }
}

/// Generic fallback: shows the references and leaves the rest to the user.
#[derive(Debug)]
pub struct ChooserShare<W = io::Stdout> {
    out: RefCell<W>,
}

impl ChooserShare {
    #[must_use]
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> ChooserShare<W> {
    pub const fn new(out: W) -> Self {
        Self {
            out: RefCell::new(out),
        }
    }

    pub fn into_inner(self) -> W {
        self.out.into_inner()
    }
}

impl<W: Write> ShareTarget for ChooserShare<W> {
    fn name(&self) -> &str {
        "chooser"
    }

    fn share(&self, request: &ShareRequest) -> Result<()> {
        let mut out = self.out.borrow_mut();
        let mut write = || -> io::Result<()> {
            writeln!(out, "{}", request.subject)?;
            writeln!(out, "{}", request.text)?;
            for uri in &request.uris {
                writeln!(out, "  {uri}")?;
            }
            out.flush()
        };
        write().map_err(|e| TodoError::Share {
            reason: e.to_string(),
        })
    }
}

/// Share through `primary`; on failure log it and use `fallback`.
/// Returns the name of the target that succeeded.
///
/// # Errors
///
/// Returns the fallback's error if both fail.
pub fn share_with_fallback<'a>(
    primary: &'a dyn ShareTarget,
    fallback: &'a dyn ShareTarget,
    request: &ShareRequest,
) -> Result<&'a str> {
    match primary.share(request) {
        Ok(()) => Ok(primary.name()),
        Err(e) => {
            tracing::warn!(share_target = primary.name(), error = %e, "Share failed, using fallback");
            fallback.share(request)?;
            Ok(fallback.name())
        }
    }
}
