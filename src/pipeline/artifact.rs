//! Scratch storage for intermediate HTML files.
//!
//! ## Why go through a file at all?
//!
//! Injecting markup straight into a blank tab loses the document's base
//! URL, so relative references (images, stylesheets) fail to load. Writing
//! the preprocessed markup to disk and navigating to a `file://` URL gives
//! the browser a real origin to resolve against.
//!
//! One conversion owns exactly one artifact. Names are UUIDs, so the shared
//! scratch directory is safe under concurrent conversions, and directory
//! creation is idempotent so concurrent first-use cannot race. Release is
//! best-effort: a file already gone is fine, anything else is logged and
//! swallowed — leaked temp files are a resource leak worth a log line, but
//! never worth failing a conversion that already produced its PDF.

use crate::error::HtmlPressError;
use crate::renderer::RenderTarget;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{trace, warn};
use uuid::Uuid;

/// Subdirectory of the system temp location holding all scratch files.
const SCRATCH_SUBDIR: &str = "htmlpress";

/// The process-wide scratch directory.
#[derive(Debug, Clone)]
pub struct ScratchDir {
    dir: PathBuf,
}

impl ScratchDir {
    /// Resolve the scratch directory under `base` (or the system temp
    /// location) and create it if missing. Creating an existing directory
    /// is not an error.
    pub fn new(base: Option<&Path>) -> Result<Self, HtmlPressError> {
        let dir = base
            .map(Path::to_path_buf)
            .unwrap_or_else(std::env::temp_dir)
            .join(SCRATCH_SUBDIR);
        fs::create_dir_all(&dir).map_err(|source| HtmlPressError::Scratch {
            path: dir.clone(),
            source,
        })?;
        Ok(Self { dir })
    }

    pub fn path(&self) -> &Path {
        &self.dir
    }

    /// Write `html` to a uniquely-named file and return the owning artifact.
    pub fn write_html(&self, html: &str) -> Result<TempArtifact, HtmlPressError> {
        let path = self.dir.join(format!("{}.html", Uuid::new_v4()));
        fs::write(&path, html).map_err(|source| HtmlPressError::Scratch {
            path: path.clone(),
            source,
        })?;
        trace!(path = %path.display(), "wrote scratch artifact");
        Ok(TempArtifact {
            path,
            released: false,
        })
    }
}

/// A temporary HTML file owned by one in-flight conversion.
///
/// Deleted on [`release`](TempArtifact::release); the `Drop` impl is a
/// backstop so the file goes away on every exit path even when an error
/// unwinds past the explicit release.
#[derive(Debug)]
pub struct TempArtifact {
    path: PathBuf,
    released: bool,
}

impl TempArtifact {
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// The render-target reference for this artifact.
    pub fn render_target(&self) -> RenderTarget {
        RenderTarget::File(self.path.clone())
    }

    /// Delete the file. Best-effort: a missing file is fine, unexpected
    /// I/O failures are logged rather than raised.
    pub fn release(mut self) {
        self.released = true;
        delete_best_effort(&self.path);
    }
}

impl Drop for TempArtifact {
    fn drop(&mut self) {
        if !self.released {
            delete_best_effort(&self.path);
        }
    }
}

fn delete_best_effort(path: &Path) {
    match fs::remove_file(path) {
        Ok(()) => trace!(path = %path.display(), "scratch artifact deleted"),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {}
        Err(e) => warn!(path = %path.display(), error = %e, "failed to delete scratch artifact"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn creation_is_idempotent() {
        let base = tempdir().unwrap();
        let a = ScratchDir::new(Some(base.path())).unwrap();
        let b = ScratchDir::new(Some(base.path())).unwrap();
        assert_eq!(a.path(), b.path());
        assert!(a.path().is_dir());
    }

    #[test]
    fn write_release_round_trip() {
        let base = tempdir().unwrap();
        let scratch = ScratchDir::new(Some(base.path())).unwrap();

        let artifact = scratch.write_html("<p>hi</p>").unwrap();
        let path = artifact.path().to_path_buf();
        assert!(path.is_file());
        assert_eq!(fs::read_to_string(&path).unwrap(), "<p>hi</p>");
        assert_eq!(path.extension().unwrap(), "html");

        artifact.release();
        assert!(!path.exists());
    }

    #[test]
    fn artifacts_get_unique_names() {
        let base = tempdir().unwrap();
        let scratch = ScratchDir::new(Some(base.path())).unwrap();
        let a = scratch.write_html("a").unwrap();
        let b = scratch.write_html("b").unwrap();
        assert_ne!(a.path(), b.path());
    }

    #[test]
    fn release_tolerates_missing_file() {
        let base = tempdir().unwrap();
        let scratch = ScratchDir::new(Some(base.path())).unwrap();
        let artifact = scratch.write_html("x").unwrap();
        fs::remove_file(artifact.path()).unwrap();
        artifact.release(); // must not panic
    }

    #[test]
    fn drop_is_a_cleanup_backstop() {
        let base = tempdir().unwrap();
        let scratch = ScratchDir::new(Some(base.path())).unwrap();
        let path = {
            let artifact = scratch.write_html("x").unwrap();
            artifact.path().to_path_buf()
        };
        assert!(!path.exists());
    }

    #[test]
    fn render_target_is_a_file_reference() {
        let base = tempdir().unwrap();
        let scratch = ScratchDir::new(Some(base.path())).unwrap();
        let artifact = scratch.write_html("x").unwrap();
        match artifact.render_target() {
            RenderTarget::File(p) => assert_eq!(p, artifact.path()),
            other => panic!("expected file target, got {other:?}"),
        }
    }
}
