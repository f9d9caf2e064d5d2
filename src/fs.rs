//! Filesystem access seam and filesystem-kind classification.
//!
//! The `FileSystem` trait lets collectors read real files in production
//! and in-memory fixtures in tests, mirroring how the network side
//! abstracts the kernel behind [`crate::net::NetKernel`].

use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Abstraction for file reads.
pub trait FileSystem {
    /// Reads the entire contents of a file as bytes.
    fn read(&self, path: &Path) -> io::Result<Vec<u8>>;

    /// Checks if a path exists.
    fn exists(&self, path: &Path) -> bool;
}

/// Real filesystem implementation delegating to `std::fs`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RealFs;

impl RealFs {
    /// Creates a new `RealFs` instance.
    pub fn new() -> Self {
        Self
    }
}

impl FileSystem for RealFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        std::fs::read(path)
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }
}

/// In-memory filesystem for tests and doctests.
#[derive(Debug, Default, Clone)]
pub struct MemFs {
    files: HashMap<PathBuf, Vec<u8>>,
}

impl MemFs {
    /// Creates an empty in-memory filesystem.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a file with the given contents, replacing any previous one.
    pub fn add_file(&mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) {
        self.files.insert(path.into(), contents.into());
    }
}

impl FileSystem for MemFs {
    fn read(&self, path: &Path) -> io::Result<Vec<u8>> {
        self.files
            .get(path)
            .cloned()
            .ok_or_else(|| io::Error::from(io::ErrorKind::NotFound))
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.contains_key(path)
    }
}

/// Broad category of a mounted filesystem, derived from its
/// kernel-reported type name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FsCategory {
    Unknown,
    None,
    LocalDisk,
    Network,
    RamDisk,
    Cdrom,
    Swap,
}

impl FsCategory {
    /// Stable lowercase name for monitoring output.
    pub fn name(self) -> &'static str {
        match self {
            FsCategory::Unknown => "unknown",
            FsCategory::None => "none",
            FsCategory::LocalDisk => "local",
            FsCategory::Network => "remote",
            FsCategory::RamDisk => "ram",
            FsCategory::Cdrom => "cdrom",
            FsCategory::Swap => "swap",
        }
    }

    /// Classifies a kernel filesystem type name.
    ///
    /// Covers the portable type names; callers with platform-specific
    /// knowledge should consult it first and fall back here. Unrecognized
    /// names classify as [`FsCategory::None`].
    pub fn classify(sys_type_name: &str) -> FsCategory {
        match sys_type_name {
            "nfs" | "smbfs" | "afs" => FsCategory::Network,
            "swap" => FsCategory::Swap,
            "iso9660" => FsCategory::Cdrom,
            "msdos" | "minix" | "hpfs" | "vfat" => FsCategory::LocalDisk,
            _ => FsCategory::None,
        }
    }
}

impl std::fmt::Display for FsCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
