//! Media references, local handles and catalog name resolution

use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// Temporary locator for an uploaded file. Must be released through
/// [`LocalHandles::release`] once its instrument goes away.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LocalHandle(u64);

impl LocalHandle {
    pub fn locator(&self) -> String {
        format!("local:{}", self.0)
    }
}

/// Table of live local handles
#[derive(Debug, Default)]
pub struct LocalHandles {
    next: u64,
    live: HashSet<u64>,
}

impl LocalHandles {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn acquire(&mut self) -> LocalHandle {
        self.next += 1;
        self.live.insert(self.next);
        LocalHandle(self.next)
    }

    /// Returns false if the handle was already released
    pub fn release(&mut self, handle: LocalHandle) -> bool {
        self.live.remove(&handle.0)
    }

    pub fn is_live(&self, handle: LocalHandle) -> bool {
        self.live.contains(&handle.0)
    }

    pub fn live(&self) -> usize {
        self.live.len()
    }
}

/// Media as requested by a caller adding an instrument
#[derive(Debug, Clone, PartialEq)]
pub enum MediaSource {
    /// A local file not yet known to any catalog
    Upload(PathBuf),
    /// An already resolved locator
    Locator(String),
}

/// Media bound to an instrument
#[derive(Debug, Clone, PartialEq)]
pub enum MediaRef {
    Upload { path: PathBuf, handle: LocalHandle },
    Locator(String),
}

impl MediaRef {
    /// Locator a player can open
    pub fn locator(&self) -> String {
        match self {
            MediaRef::Upload { handle, .. } => handle.locator(),
            MediaRef::Locator(url) => url.clone(),
        }
    }

    /// Path of the uploaded file, if this media was never catalogued
    pub fn upload_path(&self) -> Option<&Path> {
        match self {
            MediaRef::Upload { path, .. } => Some(path),
            MediaRef::Locator(_) => None,
        }
    }

    pub fn local_handle(&self) -> Option<LocalHandle> {
        match self {
            MediaRef::Upload { handle, .. } => Some(*handle),
            MediaRef::Locator(_) => None,
        }
    }
}

/// Strip the last extension from a file name: `kick.mp4` -> `kick`.
/// Names without an extension are returned unchanged.
pub fn logical_name(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(dot) if dot + 1 < filename.len() && !filename[dot + 1..].contains('/') => {
            &filename[..dot]
        }
        _ => filename,
    }
}

/// Logical media name to resolved locator, built from a catalog listing
#[derive(Debug, Clone, Default)]
pub struct MediaIndex {
    by_name: HashMap<String, String>,
}

impl MediaIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from an ordered listing of file names. When two files share a
    /// logical name the later one wins.
    pub fn from_listing<I, S, F>(filenames: I, resolve: F) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
        F: Fn(&str) -> String,
    {
        let mut index = Self::new();
        for filename in filenames {
            let filename = filename.as_ref();
            index.insert(logical_name(filename), resolve(filename));
        }
        index
    }

    pub fn insert(&mut self, name: impl Into<String>, locator: impl Into<String>) {
        self.by_name.insert(name.into(), locator.into());
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.by_name.get(name).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}
