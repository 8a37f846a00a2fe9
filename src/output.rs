//! Side-effect sinks for generated commands: outfile persistence and the
//! system clipboard.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::info;

#[cfg(unix)]
const OUTFILE_MODE: u32 = 0o755;

/// Write the generated command text verbatim to `path`.
///
/// The file is marked executable so it can be run as a script directly.
pub fn write_command_file<P: AsRef<Path>>(path: P, command: &str) -> Result<()> {
    let path = path.as_ref();
    fs::write(path, command)
        .with_context(|| format!("could not write {}", path.display()))?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, fs::Permissions::from_mode(OUTFILE_MODE))
            .with_context(|| format!("could not set permissions on {}", path.display()))?;
    }

    info!("Saved command to {}", path.display());
    Ok(())
}

/// Write text to the system clipboard.
pub fn copy_to_clipboard(text: &str) -> Result<()> {
    let mut clipboard = arboard::Clipboard::new().context("Failed to initialize clipboard")?;
    clipboard
        .set_text(text)
        .context("Failed to write to clipboard")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outfile_contains_command_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd.sh");

        write_command_file(&path, "ls -la | grep foo").unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "ls -la | grep foo");
    }

    #[cfg(unix)]
    #[test]
    fn test_outfile_is_executable() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cmd.sh");

        write_command_file(&path, "echo hi").unwrap();

        let mode = fs::metadata(&path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o755);
    }

    #[test]
    fn test_write_to_missing_directory_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope").join("cmd.sh");
        assert!(write_command_file(&path, "echo hi").is_err());
    }
}
