//! Browser discovery: locate an installed Chrome/Chromium executable.
//!
//! Strategy, in priority order:
//!
//! 1. **Windows registry** — Chrome records its install location under the
//!    uninstall key; this also finds non-default install paths, so it is
//!    checked before any directory probing.
//! 2. **The running executable's own directory** — a browser shipped next
//!    to the binary (container images, portable bundles) wins over system
//!    installs.
//! 3. **Common install directories** crossed with the platform's candidate
//!    executable names, open-source variants included.
//!
//! Absence is a normal outcome: `find()` returns `Ok(None)` when nothing
//! matches, and callers decide whether that is fatal. macOS is not
//! supported for discovery and errors immediately. No caching — every call
//! re-probes the filesystem, which keeps the function safe to call
//! concurrently and correct across installs/uninstalls at runtime.

use crate::error::HtmlPressError;
use std::path::PathBuf;
use tracing::debug;

/// Locate a Chrome or Chromium executable on this host.
///
/// Returns `Ok(None)` when no browser is installed; this is not an error.
///
/// # Errors
/// [`HtmlPressError::UnsupportedPlatform`] on macOS, where discovery is not
/// implemented.
pub fn find() -> Result<Option<PathBuf>, HtmlPressError> {
    #[cfg(target_os = "macos")]
    {
        return Err(HtmlPressError::UnsupportedPlatform { os: "macos" });
    }

    #[cfg(not(target_os = "macos"))]
    {
        if let Some(path) = find_via_registry() {
            debug!(path = %path.display(), "browser found via registry");
            return Ok(Some(path));
        }

        let names = candidate_names();

        // The directory of the running executable first.
        if let Ok(exe) = std::env::current_exe() {
            if let Some(dir) = exe.parent() {
                for name in &names {
                    let path = dir.join(name);
                    if path.is_file() {
                        debug!(path = %path.display(), "browser found next to executable");
                        return Ok(Some(path));
                    }
                }
            }
        }

        for dir in application_directories() {
            for name in &names {
                let path = dir.join(name);
                if path.is_file() {
                    debug!(path = %path.display(), "browser found in install directory");
                    return Ok(Some(path));
                }
            }
        }

        Ok(None)
    }
}

/// Candidate executable names, most specific first.
#[cfg(target_os = "windows")]
fn candidate_names() -> Vec<&'static str> {
    vec!["chrome.exe"]
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn candidate_names() -> Vec<&'static str> {
    vec!["google-chrome", "chrome", "chromium", "chromium-browser"]
}

/// Chrome x64 registers under the WOW6432Node uninstall key regardless of
/// where it actually installed, so one key covers both program-files trees.
#[cfg(target_os = "windows")]
fn find_via_registry() -> Option<PathBuf> {
    use winreg::enums::HKEY_LOCAL_MACHINE;
    use winreg::RegKey;

    let key = RegKey::predef(HKEY_LOCAL_MACHINE)
        .open_subkey(r"SOFTWARE\WOW6432Node\Microsoft\Windows\CurrentVersion\Uninstall\Google Chrome")
        .ok()?;
    let install_location: String = key.get_value("InstallLocation").ok()?;
    let path = PathBuf::from(install_location).join("chrome.exe");
    path.is_file().then_some(path)
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn find_via_registry() -> Option<PathBuf> {
    None
}

#[cfg(target_os = "windows")]
fn application_directories() -> Vec<PathBuf> {
    const SUBDIR: &str = r"Google\Chrome\Application";
    let mut dirs = Vec::new();
    for var in ["ProgramFiles", "ProgramFiles(x86)"] {
        if let Ok(base) = std::env::var(var) {
            dirs.push(PathBuf::from(base).join(SUBDIR));
        }
    }
    dirs
}

#[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
fn application_directories() -> Vec<PathBuf> {
    [
        "/usr/local/sbin",
        "/usr/local/bin",
        "/usr/sbin",
        "/usr/bin",
        "/sbin",
        "/bin",
        "/opt/google/chrome",
    ]
    .iter()
    .map(PathBuf::from)
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(target_os = "macos")]
    fn discovery_errors_on_macos() {
        assert!(matches!(
            find(),
            Err(HtmlPressError::UnsupportedPlatform { os: "macos" })
        ));
    }

    #[test]
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    fn discovery_probes_without_error_on_linux() {
        // Whether a browser is installed varies by host; discovery itself
        // must not error here.
        assert!(find().is_ok());
    }

    #[test]
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    fn linux_candidates_include_open_source_variants() {
        let names = candidate_names();
        assert!(names.contains(&"google-chrome"));
        assert!(names.contains(&"chromium"));
        assert!(names.contains(&"chromium-browser"));
    }

    #[test]
    #[cfg(all(not(target_os = "windows"), not(target_os = "macos")))]
    fn linux_search_paths_cover_standard_bins() {
        let dirs = application_directories();
        assert!(dirs.contains(&PathBuf::from("/usr/bin")));
        assert!(dirs.contains(&PathBuf::from("/opt/google/chrome")));
    }
}
