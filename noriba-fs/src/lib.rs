//! Filesystem helpers for feed directories and store files, built on
//! `cap-std` and `camino`.
#![forbid(unsafe_code)]

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};
use std::io::{self, Read};
use std::path::Component;

/// What a path points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PathKind {
    /// Nothing exists at the path.
    Missing,
    /// A regular file.
    File,
    /// A directory.
    Directory,
    /// Something else, such as a socket or device.
    Other,
}

/// Classify a path without following it beyond its final component's metadata.
pub fn path_kind(path: &Utf8Path) -> io::Result<PathKind> {
    let Some(name) = path.file_name() else {
        // `.`, `..` and roots have no file name; they can only be directories.
        return match fs_utf8::Dir::open_ambient_dir(path, ambient_authority()) {
            Ok(_) => Ok(PathKind::Directory),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PathKind::Missing),
            Err(err) => Err(err),
        };
    };
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = match fs_utf8::Dir::open_ambient_dir(parent, ambient_authority()) {
        Ok(dir) => dir,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(PathKind::Missing),
        Err(err) => return Err(err),
    };
    match dir.metadata(name) {
        Ok(meta) if meta.is_file() => Ok(PathKind::File),
        Ok(meta) if meta.is_dir() => Ok(PathKind::Directory),
        Ok(_) => Ok(PathKind::Other),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(PathKind::Missing),
        Err(err) => Err(err),
    }
}

/// Return whether `path` is an existing regular file.
pub fn is_file(path: &Utf8Path) -> io::Result<bool> {
    path_kind(path).map(|kind| kind == PathKind::File)
}

/// Return whether `path` is an existing directory.
pub fn is_dir(path: &Utf8Path) -> io::Result<bool> {
    path_kind(path).map(|kind| kind == PathKind::Directory)
}

/// Read a whole file into memory.
pub fn read_bytes(path: &Utf8Path) -> io::Result<Vec<u8>> {
    let mut file = fs_utf8::File::open_ambient(path, ambient_authority())?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(bytes)
}

/// Create the directory that will hold `path` when it does not exist yet.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() {
        return Ok(());
    }
    let (anchor, relative) = split_anchor(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    fs_utf8::Dir::open_ambient_dir(&anchor, ambient_authority())?.create_dir_all(&relative)
}

/// Split a path into the directory capability is granted from and the rest.
///
/// Absolute paths anchor at their root (or Windows prefix); relative paths
/// anchor at the current directory.
fn split_anchor(path: &Utf8Path) -> io::Result<(Utf8PathBuf, Utf8PathBuf)> {
    let mut anchor = Utf8PathBuf::new();
    let mut relative = Utf8PathBuf::new();
    for component in path.as_std_path().components() {
        match component {
            Component::Prefix(prefix) => {
                let prefix = prefix
                    .as_os_str()
                    .to_str()
                    .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
                anchor.push(prefix);
            }
            Component::RootDir => anchor.push(std::path::MAIN_SEPARATOR_STR),
            Component::CurDir => {}
            Component::ParentDir => relative.push(".."),
            Component::Normal(part) => {
                let part = part
                    .to_str()
                    .ok_or_else(|| io::Error::other("non-UTF-8 path component"))?;
                relative.push(part);
            }
        }
    }
    if anchor.as_str().is_empty() {
        anchor.push(".");
    }
    Ok((anchor, relative))
}
