mod typst;

pub use typst::TypstRenderer;

use std::fs::{self, OpenOptions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::error::{ReportError, Result};
use crate::report::ReportModel;

/// Lock file marking an export in flight
pub const LOCK_FILE: &str = ".valorizacion-export.lock";

/// Turns a finished report into a document file
pub trait Renderer {
    fn render(&self, report: &ReportModel, output_path: &Path) -> Result<()>;
}

/// Exclusive export lock held for the duration of one export
#[derive(Debug)]
pub struct ExportLock {
    path: PathBuf,
}

impl ExportLock {
    pub fn acquire(dir: &Path) -> Result<Self> {
        let path = dir.join(LOCK_FILE);
        match OpenOptions::new().write(true).create_new(true).open(&path) {
            Ok(mut file) => {
                writeln!(file, "{}", std::process::id())?;
                tracing::debug!(lock = %path.display(), "acquired export lock");
                Ok(Self { path })
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                Err(ReportError::ExportInProgress(path))
            }
            Err(e) => Err(e.into()),
        }
    }
}

impl Drop for ExportLock {
    fn drop(&mut self) {
        if let Err(e) = fs::remove_file(&self.path) {
            tracing::warn!(lock = %self.path.display(), error = %e, "failed to release export lock");
        }
    }
}

/// Whether an export currently holds the lock in `dir`
pub fn export_in_progress(dir: &Path) -> bool {
    dir.join(LOCK_FILE).exists()
}

/// Render `report` to `output_path` (or `<output_dir>/Valorizacion_<n>.pdf`).
///
/// The lock lives in `lock_dir`, so at most one export runs per session
/// whatever the target path. The document is rendered to a hidden sibling
/// file and moved into place once complete, so a failed export never leaves
/// a partial PDF behind.
pub fn export_report(
    renderer: &dyn Renderer,
    report: &ReportModel,
    lock_dir: &Path,
    output_dir: &Path,
    output_path: Option<PathBuf>,
) -> Result<PathBuf> {
    let _lock = ExportLock::acquire(lock_dir)?;

    let target = output_path.unwrap_or_else(|| output_dir.join(report.file_name()));
    let parent = match target.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    };
    fs::create_dir_all(&parent)?;

    let file_name = target
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| report.file_name());
    let partial = parent.join(format!(".{file_name}.partial.pdf"));

    tracing::info!(
        pages = report.total_pages(),
        output = %target.display(),
        "exporting report"
    );

    let result = renderer
        .render(report, &partial)
        .and_then(|()| fs::rename(&partial, &target).map_err(ReportError::from));
    if let Err(e) = result {
        let _ = fs::remove_file(&partial);
        tracing::error!(error = %e, "export failed");
        return Err(e);
    }

    Ok(target)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::initial_session;
    use std::cell::Cell;
    use tempfile::TempDir;

    struct FakeRenderer {
        fail: bool,
        lock_dir: PathBuf,
        calls: Cell<usize>,
    }

    impl Renderer for FakeRenderer {
        fn render(&self, report: &ReportModel, output_path: &Path) -> Result<()> {
            self.calls.set(self.calls.get() + 1);
            assert!(export_in_progress(&self.lock_dir));
            fs::write(output_path, format!("{} pages", report.total_pages()))?;
            if self.fail {
                return Err(ReportError::PdfGeneration("boom".to_string()));
            }
            Ok(())
        }
    }

    fn renderer(fail: bool, lock_dir: &Path) -> FakeRenderer {
        FakeRenderer {
            fail,
            lock_dir: lock_dir.to_path_buf(),
            calls: Cell::new(0),
        }
    }

    /// Separate lock and output directories, like a config dir and its output/
    fn dirs() -> (TempDir, TempDir) {
        (TempDir::new().unwrap(), TempDir::new().unwrap())
    }

    #[test]
    fn export_uses_report_file_name() {
        let (lock_dir, out) = dirs();
        let report = initial_session().unwrap().build_report();
        let fake = renderer(false, lock_dir.path());
        let path = export_report(&fake, &report, lock_dir.path(), out.path(), None).unwrap();
        assert_eq!(path, out.path().join("Valorizacion_1.pdf"));
        assert_eq!(fs::read_to_string(&path).unwrap(), "3 pages");
        assert!(!export_in_progress(lock_dir.path()));
    }

    #[test]
    fn failed_export_leaves_no_file_and_releases_lock() {
        let (lock_dir, out) = dirs();
        let report = initial_session().unwrap().build_report();
        let fake = renderer(true, lock_dir.path());
        let err = export_report(&fake, &report, lock_dir.path(), out.path(), None).unwrap_err();
        assert!(matches!(err, ReportError::PdfGeneration(_)));
        assert_eq!(fs::read_dir(out.path()).unwrap().count(), 0);
        assert!(!export_in_progress(lock_dir.path()));
    }

    #[test]
    fn failed_move_into_place_removes_rendered_file() {
        let (lock_dir, out) = dirs();
        let report = initial_session().unwrap().build_report();
        // A non-empty directory at the target path cannot be replaced by a file
        let blocker = out.path().join(report.file_name());
        fs::create_dir(&blocker).unwrap();
        fs::write(blocker.join("keep"), "x").unwrap();

        let fake = renderer(false, lock_dir.path());
        let err = export_report(&fake, &report, lock_dir.path(), out.path(), None).unwrap_err();
        assert!(matches!(err, ReportError::Io(_)));
        assert_eq!(fake.calls.get(), 1);

        let names: Vec<_> = fs::read_dir(out.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![blocker.file_name().unwrap().to_os_string()]);
        assert!(!export_in_progress(lock_dir.path()));
    }

    #[test]
    fn concurrent_export_is_rejected() {
        let (lock_dir, out) = dirs();
        let report = initial_session().unwrap().build_report();
        let _held = ExportLock::acquire(lock_dir.path()).unwrap();
        let fake = renderer(false, lock_dir.path());
        let err = export_report(&fake, &report, lock_dir.path(), out.path(), None).unwrap_err();
        assert!(matches!(err, ReportError::ExportInProgress(_)));
        assert_eq!(fake.calls.get(), 0);
    }

    #[test]
    fn lock_covers_exports_to_any_path() {
        let (lock_dir, out) = dirs();
        let elsewhere = TempDir::new().unwrap();
        let report = initial_session().unwrap().build_report();
        let _held = ExportLock::acquire(lock_dir.path()).unwrap();
        let fake = renderer(false, lock_dir.path());
        let target = elsewhere.path().join("copy.pdf");
        let err = export_report(&fake, &report, lock_dir.path(), out.path(), Some(target.clone()))
            .unwrap_err();
        assert!(matches!(err, ReportError::ExportInProgress(_)));
        assert!(!target.exists());
    }

    #[test]
    fn lock_released_on_drop() {
        let dir = TempDir::new().unwrap();
        {
            let _lock = ExportLock::acquire(dir.path()).unwrap();
            assert!(export_in_progress(dir.path()));
        }
        assert!(!export_in_progress(dir.path()));
        assert!(ExportLock::acquire(dir.path()).is_ok());
    }

    #[test]
    fn explicit_output_path_is_honored() {
        let (lock_dir, out) = dirs();
        let report = initial_session().unwrap().build_report();
        let target = out.path().join("nested").join("report.pdf");
        let fake = renderer(false, lock_dir.path());
        let path =
            export_report(&fake, &report, lock_dir.path(), out.path(), Some(target.clone())).unwrap();
        assert_eq!(path, target);
        assert!(target.exists());
    }
}
