//! Headless Chromium as the print engine.
//!
//! Each session gets a private scratch directory holding the page, the browser
//! profile and the printed PDF. The browser is started once per print with
//! `--print-to-pdf` and a virtual-time budget, which makes Chromium wait for
//! pending network activity (images, fonts, stylesheets) before printing.

use super::engine::{PdfOptions, RenderEngine, RenderSession};
use crate::error::RenderError;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use tempfile::TempDir;

/// Overrides the browser binary.
pub const CHROME_ENV: &str = "ICLI_CHROME";
/// Set to `1` to pass `--no-sandbox` (needed when running as root in containers).
pub const NO_SANDBOX_ENV: &str = "ICLI_CHROME_NO_SANDBOX";

const CANDIDATES: &[&str] = &[
    "chromium",
    "chromium-browser",
    "google-chrome",
    "google-chrome-stable",
    "chrome",
];

const LOAD_BUDGET_MS: u32 = 10_000;
const PAGE_FILE: &str = "invoice.html";
const PDF_FILE: &str = "invoice.pdf";

#[derive(Debug, Clone, Default)]
pub struct ChromeEngine {
    binary: Option<PathBuf>,
    no_sandbox: bool,
}

impl ChromeEngine {
    pub fn new(binary: Option<PathBuf>) -> Self {
        Self {
            binary,
            no_sandbox: false,
        }
    }

    pub fn from_env() -> Self {
        let binary = env::var_os(CHROME_ENV)
            .filter(|v| !v.is_empty())
            .map(PathBuf::from);
        let no_sandbox = env::var(NO_SANDBOX_ENV).map(|v| v == "1").unwrap_or(false);
        Self::new(binary).with_no_sandbox(no_sandbox)
    }

    pub fn with_no_sandbox(mut self, no_sandbox: bool) -> Self {
        self.no_sandbox = no_sandbox;
        self
    }

    fn locate(&self) -> Result<PathBuf, RenderError> {
        if let Some(binary) = &self.binary {
            return if binary.is_file() {
                Ok(binary.clone())
            } else {
                Err(RenderError::EngineUnavailable(format!(
                    "{} does not exist",
                    binary.display()
                )))
            };
        }
        CANDIDATES
            .iter()
            .find_map(|name| find_on_path(name))
            .ok_or_else(|| {
                RenderError::EngineUnavailable(format!(
                    "no Chromium found on PATH (tried {}); set {}",
                    CANDIDATES.join(", "),
                    CHROME_ENV
                ))
            })
    }
}

fn find_on_path(name: &str) -> Option<PathBuf> {
    let paths = env::var_os("PATH")?;
    env::split_paths(&paths)
        .map(|dir| dir.join(name))
        .find(|candidate| candidate.is_file())
}

impl RenderEngine for ChromeEngine {
    type Session = ChromeSession;

    fn open(&self) -> Result<ChromeSession, RenderError> {
        let binary = self.locate()?;
        let workdir = tempfile::Builder::new()
            .prefix("icli-render-")
            .tempdir()
            .map_err(RenderError::EngineIo)?;
        tracing::debug!(binary = %binary.display(), workdir = %workdir.path().display(), "render session opened");
        Ok(ChromeSession {
            binary,
            no_sandbox: self.no_sandbox,
            workdir: Some(workdir),
            markup: None,
            loaded: false,
            child: None,
        })
    }
}

pub struct ChromeSession {
    binary: PathBuf,
    no_sandbox: bool,
    workdir: Option<TempDir>,
    markup: Option<String>,
    loaded: bool,
    child: Option<Child>,
}

impl ChromeSession {
    fn workdir(&self) -> Result<&Path, RenderError> {
        self.workdir
            .as_ref()
            .map(|dir| dir.path())
            .ok_or(RenderError::Session("session already closed"))
    }

    fn command(&self, page: &Path, pdf: &Path, profile: &Path) -> Command {
        let mut cmd = Command::new(&self.binary);
        cmd.arg("--headless")
            .arg("--disable-gpu")
            .arg("--no-first-run")
            .arg("--no-pdf-header-footer")
            .arg("--run-all-compositor-stages-before-draw")
            .arg(format!("--virtual-time-budget={}", LOAD_BUDGET_MS))
            .arg(format!("--user-data-dir={}", profile.display()))
            .arg(format!("--print-to-pdf={}", pdf.display()));
        if self.no_sandbox {
            cmd.arg("--no-sandbox");
        }
        cmd.arg(format!("file://{}", page.display()))
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null());
        cmd
    }
}

impl RenderSession for ChromeSession {
    fn load(&mut self, markup: &str) -> Result<(), RenderError> {
        self.workdir()?;
        self.markup = Some(markup.to_string());
        self.loaded = false;
        Ok(())
    }

    // Chromium does the actual waiting through its virtual-time budget; here we
    // only make sure there is something to wait for.
    fn wait_until_loaded(&mut self) -> Result<(), RenderError> {
        if self.markup.is_none() {
            return Err(RenderError::Session("nothing loaded"));
        }
        self.loaded = true;
        Ok(())
    }

    // Paper size and backgrounds come from the print stylesheet already in the markup.
    fn print_pdf(&mut self, _options: &PdfOptions) -> Result<Vec<u8>, RenderError> {
        if !self.loaded {
            return Err(RenderError::Session("document not loaded"));
        }
        let markup = self
            .markup
            .as_deref()
            .ok_or(RenderError::Session("nothing loaded"))?;
        let workdir = self.workdir()?.to_path_buf();
        let page = workdir.join(PAGE_FILE);
        let pdf = workdir.join(PDF_FILE);

        fs::write(&page, markup).map_err(RenderError::EngineIo)?;

        let mut cmd = self.command(&page, &pdf, &workdir.join("profile"));
        let child = self
            .child
            .insert(cmd.spawn().map_err(RenderError::EngineIo)?);
        let status = child.wait().map_err(RenderError::EngineIo)?;
        self.child = None;

        if !status.success() {
            return Err(RenderError::EngineExit(status.code().unwrap_or(-1)));
        }
        let bytes = fs::read(&pdf)
            .map_err(|e| RenderError::Engine(format!("no PDF was produced: {}", e)))?;
        tracing::debug!(bytes = bytes.len(), "pdf printed");
        Ok(bytes)
    }

    fn close(&mut self) -> Result<(), RenderError> {
        if let Some(mut child) = self.child.take() {
            if child.try_wait().map_err(RenderError::EngineIo)?.is_none() {
                let _ = child.kill();
                child.wait().map_err(RenderError::EngineIo)?;
            }
        }
        if let Some(dir) = self.workdir.take() {
            dir.close().map_err(RenderError::EngineIo)?;
        }
        self.markup = None;
        self.loaded = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::engine::SessionGuard;

    #[test]
    fn test_missing_binary_is_unavailable() {
        let engine = ChromeEngine::new(Some(PathBuf::from("/definitely/not/chromium")));
        assert!(matches!(
            engine.open(),
            Err(RenderError::EngineUnavailable(_))
        ));
    }

    #[cfg(unix)]
    mod process {
        use super::*;
        use std::os::unix::fs::PermissionsExt;

        /// A stand-in browser: writes a fake PDF to the `--print-to-pdf` target.
        const FAKE_CHROME: &str = r#"#!/bin/sh
for arg in "$@"; do
  case "$arg" in
    --print-to-pdf=*) printf '%%PDF-1.4 fake' > "${arg#--print-to-pdf=}" ;;
  esac
done
"#;

        fn script(dir: &Path, body: &str) -> PathBuf {
            let path = dir.join("chromium");
            fs::write(&path, body).unwrap();
            fs::set_permissions(&path, fs::Permissions::from_mode(0o755)).unwrap();
            path
        }

        #[test]
        fn test_full_session() {
            let bin = tempfile::TempDir::new().unwrap();
            let engine = ChromeEngine::new(Some(script(bin.path(), FAKE_CHROME)));

            let mut session = engine.open().unwrap();
            let workdir = session.workdir().unwrap().to_path_buf();
            session.load("<html><head></head><body>hi</body></html>").unwrap();
            session.wait_until_loaded().unwrap();
            let pdf = session.print_pdf(&PdfOptions::default()).unwrap();
            assert_eq!(pdf, b"%PDF-1.4 fake");

            let page = fs::read_to_string(workdir.join(PAGE_FILE)).unwrap();
            assert_eq!(page, "<html><head></head><body>hi</body></html>");

            session.close().unwrap();
            assert!(!workdir.exists());
            // Closing twice is harmless
            session.close().unwrap();
        }

        #[test]
        fn test_nonzero_exit() {
            let bin = tempfile::TempDir::new().unwrap();
            let engine = ChromeEngine::new(Some(script(bin.path(), "#!/bin/sh\nexit 3\n")));
            let mut session = SessionGuard::new(engine.open().unwrap());
            session.load("<p>x</p>").unwrap();
            session.wait_until_loaded().unwrap();
            assert!(matches!(
                session.print_pdf(&PdfOptions::default()),
                Err(RenderError::EngineExit(3))
            ));
        }

        #[test]
        fn test_exit_without_output() {
            let bin = tempfile::TempDir::new().unwrap();
            let engine = ChromeEngine::new(Some(script(bin.path(), "#!/bin/sh\nexit 0\n")));
            let mut session = SessionGuard::new(engine.open().unwrap());
            session.load("<p>x</p>").unwrap();
            session.wait_until_loaded().unwrap();
            assert!(matches!(
                session.print_pdf(&PdfOptions::default()),
                Err(RenderError::Engine(_))
            ));
        }

        #[test]
        fn test_out_of_order_calls() {
            let bin = tempfile::TempDir::new().unwrap();
            let engine = ChromeEngine::new(Some(script(bin.path(), FAKE_CHROME)));
            let mut session = SessionGuard::new(engine.open().unwrap());
            assert!(matches!(
                session.wait_until_loaded(),
                Err(RenderError::Session(_))
            ));
            session.load("<p>x</p>").unwrap();
            assert!(matches!(
                session.print_pdf(&PdfOptions::default()),
                Err(RenderError::Session(_))
            ));
        }
    }
}
