//! Build directory layout.
//!
//! One build root holds a `desc/` subdirectory for the descriptor set and a
//! `gen/` subdirectory for generated sources. The root is created if absent and
//! is never cleaned up on failure, so partial outputs stay around for
//! debugging.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::Result;

/// Directories for one compiler run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildDirs {
    /// Build root
    pub root: PathBuf,
    /// Holds `<name>.desc.pb`
    pub desc: PathBuf,
    /// Holds generated sources and headers
    pub gen: PathBuf,
}

impl BuildDirs {
    /// Create the build layout under `base`.
    ///
    /// With `fresh` set, an existing base is left untouched and the first free
    /// numbered sibling (`base_1`, `base_2`, …) is used instead.
    pub fn prepare(base: &Path, fresh: bool) -> Result<Self> {
        let root = if fresh {
            allocate_fresh(base)
        } else {
            base.to_path_buf()
        };

        let desc = root.join("desc");
        let gen = root.join("gen");
        fs::create_dir_all(&desc)?;
        fs::create_dir_all(&gen)?;

        Ok(Self { root, desc, gen })
    }

    /// Path of the descriptor-set file for the given base name.
    pub fn descriptor_path(&self, name: &str) -> PathBuf {
        self.desc.join(format!("{name}.desc.pb"))
    }
}

fn allocate_fresh(base: &Path) -> PathBuf {
    if !base.exists() {
        return base.to_path_buf();
    }
    let file_name = base
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "build".to_string());
    let mut i = 1;
    loop {
        let candidate = base.with_file_name(format!("{file_name}_{i}"));
        if !candidate.exists() {
            return candidate;
        }
        i += 1;
    }
}
