use icli::error::{IcliError, Result};
use std::path::Path;
use std::process::Command;

/// Hands `path` to the platform's default handler.
/// - macOS: `open`
/// - Linux: `xdg-open`
/// - Windows: `explorer`
pub fn open_path(path: &Path) -> Result<()> {
    if !path.exists() {
        return Err(IcliError::Launch(format!(
            "{} (it does not exist)",
            path.display()
        )));
    }

    #[cfg(target_os = "macos")]
    let mut cmd = Command::new("open");

    #[cfg(target_os = "linux")]
    let mut cmd = Command::new("xdg-open");

    #[cfg(target_os = "windows")]
    let mut cmd = Command::new("explorer");

    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    return Err(IcliError::Launch(format!(
        "{} (not supported on this platform)",
        path.display()
    )));

    #[cfg(any(target_os = "macos", target_os = "linux", target_os = "windows"))]
    {
        let status = cmd
            .arg(path)
            .status()
            .map_err(|e| IcliError::Launch(format!("{}: {}", path.display(), e)))?;
        // explorer.exe reports failure even when it opened the folder
        if status.success() || cfg!(target_os = "windows") {
            Ok(())
        } else {
            Err(IcliError::Launch(path.display().to_string()))
        }
    }
}
