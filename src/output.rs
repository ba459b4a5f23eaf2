//! Writing artifacts and recovered files to disk.

use anyhow::{Context, Result, bail};
use getrandom::fill;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

/// Whether an existing file at the target path may be replaced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overwrite {
    Deny,
    Allow,
}

/// A destination file for an encrypted artifact or a decrypted payload.
///
/// The content is written to a temporary file in the same directory,
/// synced, and only then moved into place, so a crash never leaves a
/// half-written file at the final path.
#[derive(Debug, Clone)]
pub struct OutputFile {
    path: PathBuf,
}

impl OutputFile {
    /// Creates a new OutputFile for the given path.
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Returns the path to the output file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Returns `true` if something already exists at the path.
    pub fn exists(&self) -> bool {
        self.path.exists()
    }

    /// Writes `data` to the output path.
    ///
    /// With [`Overwrite::Deny`] an existing file is left untouched and an
    /// error is returned. On Unix the file is created with mode `0600`.
    /// Creates parent directories if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists and overwriting is denied, or if
    /// any filesystem step fails.
    pub fn write(&self, data: &[u8], overwrite: Overwrite) -> Result<()> {
        if overwrite == Overwrite::Deny && self.exists() {
            bail!(
                "{} already exists (use --force to overwrite)",
                self.path.display()
            );
        }

        if let Some(parent) = self.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }

        let tmp_path = self.random_tmp_path()?;

        let mut tmp_file = Self::create_private(&tmp_path)?;
        let written = tmp_file
            .write_all(data)
            .and_then(|_| tmp_file.sync_all());
        drop(tmp_file);

        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e).context("failed to write temporary file");
        }

        let placed = match overwrite {
            Overwrite::Allow if self.exists() => self.atomic_replace(&tmp_path),
            _ => self.link_new(&tmp_path),
        };
        let _ = fs::remove_file(&tmp_path);
        placed?;

        if let Some(parent) = self.parent() {
            sync_dir(parent)?;
        }

        tracing::debug!(path = %self.path.display(), len = data.len(), "wrote output file");
        Ok(())
    }

    fn parent(&self) -> Option<&Path> {
        self.path.parent().filter(|p| !p.as_os_str().is_empty())
    }

    fn create_private(path: &Path) -> Result<File> {
        let mut options = OpenOptions::new();
        options.write(true).create_new(true);

        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }

        options
            .open(path)
            .context("failed to create temporary file")
    }

    /// Generates a unique temporary file path in the same directory.
    ///
    /// Format: `.filename.tmp.<randomhex>`
    fn random_tmp_path(&self) -> Result<PathBuf> {
        let mut buf = [0u8; 8];
        fill(&mut buf).map_err(|_| anyhow::anyhow!("OS random generator unavailable"))?;

        let file_name = self
            .path
            .file_name()
            .context("output path has no file name")?
            .to_string_lossy();

        let tmp_name = format!(".{}.tmp.{}", file_name, hex::encode(buf));

        Ok(self.path.with_file_name(tmp_name))
    }

    /// Places the temporary file at the target path without clobbering.
    ///
    /// A hard link fails if the target exists, which closes the window
    /// between the existence check and the final move.
    fn link_new(&self, tmp_path: &Path) -> Result<()> {
        match fs::hard_link(tmp_path, &self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                Err(e).with_context(|| format!("{} already exists", self.path.display()))
            }
            // filesystems without hard link support
            Err(_) if !self.exists() => fs::rename(tmp_path, &self.path)
                .with_context(|| format!("failed to create {}", self.path.display())),
            Err(e) => Err(e).with_context(|| format!("failed to create {}", self.path.display())),
        }
    }

    /// Atomically replaces the target file with the temporary file.
    ///
    /// Uses Windows `ReplaceFileW` API with `REPLACEFILE_WRITE_THROUGH` flag
    /// to ensure the operation is truly atomic and persisted to disk.
    #[cfg(target_os = "windows")]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        use std::ffi::OsStr;
        use std::os::windows::ffi::OsStrExt;
        use windows_sys::Win32::Storage::FileSystem::{REPLACEFILE_WRITE_THROUGH, ReplaceFileW};

        fn to_wide(s: &OsStr) -> Vec<u16> {
            s.encode_wide().chain(std::iter::once(0)).collect()
        }

        let target_w = to_wide(self.path.as_os_str());
        let tmp_w = to_wide(tmp_path.as_os_str());

        // SAFETY:
        // - Strings are valid UTF-16 and null-terminated
        // - Pointers remain valid during the call
        // - Windows does not retain the pointers after return
        let result = unsafe {
            ReplaceFileW(
                target_w.as_ptr(),
                tmp_w.as_ptr(),
                std::ptr::null(),
                REPLACEFILE_WRITE_THROUGH,
                std::ptr::null(),
                std::ptr::null(),
            )
        };

        if result == 0 {
            let err = std::io::Error::last_os_error();
            return Err(err).context("atomic replace failed");
        }

        Ok(())
    }

    /// Atomically replaces the target file with the temporary file.
    ///
    /// On Unix, `rename()` is atomic when both paths are on the same filesystem.
    #[cfg(not(target_os = "windows"))]
    fn atomic_replace(&self, tmp_path: &Path) -> Result<()> {
        fs::rename(tmp_path, &self.path).context("atomic replace failed")?;
        Ok(())
    }
}

#[cfg(unix)]
fn sync_dir(dir: &Path) -> Result<()> {
    File::open(dir)?.sync_all()?;
    Ok(())
}

// Directories cannot be opened as files on Windows; ReplaceFileW with
// write-through already persisted the rename.
#[cfg(not(unix))]
fn sync_dir(_dir: &Path) -> Result<()> {
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn write_creates_file_with_content() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");

        let out = OutputFile::new(path.clone());
        out.write(b"hello world", Overwrite::Deny).unwrap();

        assert_eq!(fs::read(path).unwrap(), b"hello world");
    }

    #[test]
    fn write_refuses_existing_file_without_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");
        fs::write(&path, b"original").unwrap();

        let out = OutputFile::new(path.clone());
        let err = out.write(b"new", Overwrite::Deny).unwrap_err();

        assert!(err.to_string().contains("already exists"));
        assert_eq!(fs::read(path).unwrap(), b"original");
    }

    #[test]
    fn write_replaces_existing_file_with_overwrite() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");

        let out = OutputFile::new(path.clone());
        out.write(b"first", Overwrite::Allow).unwrap();
        out.write(b"second", Overwrite::Allow).unwrap();

        assert_eq!(fs::read(path).unwrap(), b"second");
    }

    #[test]
    fn tmp_file_is_removed_after_success() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");

        OutputFile::new(path)
            .write(b"data", Overwrite::Deny)
            .unwrap();

        let entries: Vec<_> = fs::read_dir(dir.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();

        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0], "out.enc");
    }

    #[test]
    fn tmp_file_is_removed_after_refusal() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");
        fs::write(&path, b"original").unwrap();

        let _ = OutputFile::new(path).write(b"data", Overwrite::Deny);

        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[test]
    fn parent_directory_is_created() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a").join("b").join("out.enc");

        OutputFile::new(nested.clone())
            .write(b"data", Overwrite::Deny)
            .unwrap();

        assert!(nested.exists());
    }

    #[test]
    fn tmp_names_are_unique_and_local() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("out.enc");
        let out = OutputFile::new(path.clone());

        let a = out.random_tmp_path().unwrap();
        let b = out.random_tmp_path().unwrap();

        assert_ne!(a, b);
        assert_ne!(a, path);
        assert_eq!(a.parent(), path.parent());
    }

    #[cfg(unix)]
    #[test]
    fn output_is_private_on_unix() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        OutputFile::new(path.clone())
            .write(b"secret", Overwrite::Deny)
            .unwrap();

        let mode = fs::metadata(path).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o600);
    }
}
