//! Exclude-aware walker that selects candidate Go source files.
//!
//! - File and directory exclude lists are wildcard patterns matched on the
//!   base name (`*_test.go`, `gen*`, ...).
//! - `vendor/` and `testdata/` directories are always pruned.
//! - Non-recursive mode caps traversal at the root's direct children.
//! - Deterministic ordering for stable CLI output and tests.
//!
//! Backed by ripgrep's `ignore` crate and `globset`.

use std::path::{Path, PathBuf};

use anyhow::Result;
use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::{DirEntry, WalkBuilder};

/// Directory names pruned unconditionally during traversal.
const ALWAYS_PRUNED: &[&str] = &["vendor", "testdata", ".git"];

/// Walker with exclude patterns for files and directories.
pub struct FileWalker {
    /// Compiled base-name patterns for files to skip
    exclude_files: GlobSet,

    /// Compiled base-name patterns for directories to prune
    exclude_dirs: GlobSet,

    /// Recurse into subdirectories; `false` caps depth at 1
    recurse: bool,
}

impl FileWalker {
    /// Build a walker from wildcard exclude lists (base-name matching).
    pub fn new(exclude_files: &[String], exclude_dirs: &[String]) -> Result<Self> {
        Ok(Self {
            exclude_files: compile(exclude_files)?,
            exclude_dirs: compile(exclude_dirs)?,
            recurse: true,
        })
    }

    /// Cap traversal at the root's direct children when `recurse == false`.
    pub fn with_recurse(mut self, recurse: bool) -> Self {
        self.recurse = recurse;
        self
    }

    /// Traverse `root` and return the sorted candidate `.go` files.
    /// A root that is itself a file is returned as-is when it qualifies.
    pub fn walk_files<P: AsRef<Path>>(&self, root: P) -> Vec<PathBuf> {
        let root_path = root.as_ref();

        let mut b = WalkBuilder::new(root_path);

        // The exclude lists are the only filtering policy; ignore files
        // and hidden-file rules do not apply to a lint sweep.
        b.standard_filters(false);
        b.max_depth(if self.recurse { None } else { Some(1) });

        // Early directory pruning (fast short-circuit).
        let dirs = self.exclude_dirs.clone();
        b.filter_entry(move |ent: &DirEntry| {
            let is_dir = ent.file_type().is_some_and(|ft| ft.is_dir());
            if !is_dir || ent.depth() == 0 {
                return true;
            }
            let name = ent.file_name().to_string_lossy();
            if ALWAYS_PRUNED.contains(&name.as_ref()) {
                return false;
            }
            !dirs.is_match(name.as_ref())
        });

        let mut out: Vec<PathBuf> = b
            .build()
            // Drop entries with IO errors
            .filter_map(|res| res.ok())
            // Keep only regular files
            .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
            .map(|entry| entry.into_path())
            // Candidate extension
            .filter(|p| p.extension().is_some_and(|e| e == "go"))
            // Late base-name exclude filtering
            .filter(|p| {
                let name = p
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default();
                !self.exclude_files.is_match(&name)
            })
            .collect();

        // Deterministic order (stable CLI & tests)
        out.sort();

        out
    }
}

fn compile(patterns: &[String]) -> Result<GlobSet> {
    let mut builder = GlobSetBuilder::new();

    for pattern in patterns {
        builder.add(Glob::new(pattern)?);
    }

    Ok(builder.build()?)
}
