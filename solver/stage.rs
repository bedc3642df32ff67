//! Provision the working directory an engine runs in: background
//! knowledge files are either linked (shared, read-only) or copied
//! (private to the query) next to the generated program.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// A provisioned directory and the background files staged in it,
/// link files first, then copy files.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StagedDirectory {
    pub path: PathBuf,
    pub files: Vec<PathBuf>,
}

/// Directory provisioning.
pub trait Stage {
    fn stage(
        &self,
        link_files: &[PathBuf],
        copy_files: &[PathBuf],
    ) -> io::Result<StagedDirectory>;
}

/// Stage every query into one fixed directory. Staged files and query
/// outputs are overwritten by the next query, so queries against the
/// same directory must not run concurrently.
#[derive(Clone, Debug)]
pub struct QueryDirectory {
    root: PathBuf,
}

impl QueryDirectory {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn target(&self, source: &Path) -> io::Result<PathBuf> {
        source
            .file_name()
            .map(|name| self.root.join(name))
            .ok_or_else(|| {
                io::Error::new(
                    io::ErrorKind::InvalidInput,
                    format!("{} names no file", source.display()),
                )
            })
    }
}

impl Default for QueryDirectory {
    fn default() -> Self {
        Self::new(std::env::temp_dir().join("tempo"))
    }
}

/// Remove a stale file or link, but never a directory.
fn clear(path: &Path) -> io::Result<()> {
    match fs::symlink_metadata(path) {
        Ok(meta) if !meta.is_dir() => fs::remove_file(path),
        Ok(_) => Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!("{} is a directory", path.display()),
        )),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(unix)]
fn link(source: &Path, target: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(fs::canonicalize(source)?, target)
}

#[cfg(not(unix))]
fn link(source: &Path, target: &Path) -> io::Result<()> {
    fs::copy(source, target).map(|_| ())
}

impl Stage for QueryDirectory {
    fn stage(
        &self,
        link_files: &[PathBuf],
        copy_files: &[PathBuf],
    ) -> io::Result<StagedDirectory> {
        fs::create_dir_all(&self.root)?;
        let mut files = Vec::with_capacity(link_files.len() + copy_files.len());
        for source in link_files {
            let target = self.target(source)?;
            clear(&target)?;
            link(source, &target)?;
            files.push(target);
        }
        for source in copy_files {
            let target = self.target(source)?;
            clear(&target)?;
            fs::copy(source, &target)?;
            files.push(target);
        }
        Ok(StagedDirectory {
            path: self.root.clone(),
            files,
        })
    }
}
