//! **strictimports** - Strict checker/fixer for grouped Go import ordering
//!
//! Checks that the grouped import block at the top of each Go source file
//! follows one strict canonical order (standard library, third party, optional
//! local group, blank-line separated, sorted within groups) and pinpoints the
//! first line that violates it. Fix mode rewrites the file in place with the
//! oracle's canonical form.

/// Command-line interface with clap integration
pub mod cli;

/// Shell completion generation
pub mod completion;

/// Core pipeline - line model, canonicalization, divergence detection
pub mod core {
    /// Imports-only scanner for Go source (specs with byte offsets)
    pub mod scan;
    pub use scan::{ParsedImports, scan};

    /// Import-block line model: build real/ideal line sequences
    pub mod lines;
    pub use lines::{ImportBlock, ImportLine, build_block};

    /// Canonical-ordering oracle boundary (builtin and goimports backends)
    pub mod oracle;
    pub use oracle::{BuiltinOracle, Canonicalize, GoimportsOracle};

    /// Canonicalization adapter: normalize, invoke oracle, re-parse
    pub mod canonical;
    pub use canonical::canonicalize;

    /// Real-vs-ideal lockstep comparator
    pub mod compare;
    pub use compare::{Divergence, compare};

    /// Per-file check/fix driver, reporting, exit codes
    pub mod check;
    pub use check::{run as check_run, run_fix as fix_run};
}

/// Infrastructure - configuration, I/O, line indexing, walking
pub mod infra {
    /// Configuration management with TOML support
    pub mod config;
    pub use config::{Config, load_config};

    /// File read and permission-preserving write-back
    pub mod io;
    pub use io::{read_source, write_preserving_permissions};

    /// Full-file line-start offset table for line/column resolution
    pub mod line_index;
    pub use line_index::LineIndex;

    /// Exclude-aware directory walking for Go sources
    pub mod walk;
    pub use walk::FileWalker;
}

// Strategic re-exports for clean CLI interface
pub use cli::{AppContext, Cli, Commands};
pub use crate::core::{check_run, fix_run};
pub use infra::{Config, FileWalker, LineIndex, load_config};

// Core types for external consumers
pub use crate::core::check::{CheckError, Finding};
pub use crate::core::lines::{ImportBlock, ImportLine};
