//! Canonical-ordering oracle boundary.
//!
//! The check never decides what canonical order is; it only diffs the file
//! against whatever a [`Canonicalize`] implementation returns. Two backends
//! are provided:
//!
//! - [`BuiltinOracle`]: embedded grouping/sorting that satisfies the oracle
//!   contract (stdlib group, third-party group, optional local group, one
//!   blank line between groups, lexicographic within a group, leading
//!   comment runs stay attached to their entry).
//! - [`GoimportsOracle`]: stages the source in a scratch file and shells out
//!   to `goimports -local`. The scratch file is removed when the call
//!   returns, success or not.

use std::io::Write;
use std::process::Command;

use thiserror::Error;

use crate::cli::OracleKind;
use crate::core::scan::scan;
use crate::infra::line_index::LineIndex;

/// Oracle invocation failure. There is no fallback ordering; callers treat
/// this as fatal for the file being checked.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("failed to run {cmd}: {source}")]
    Spawn {
        cmd: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{cmd} exited with {status}: {stderr}")]
    Failed {
        cmd: String,
        status: String,
        stderr: String,
    },

    #[error("oracle produced output that is not valid source: {0}")]
    Unparseable(String),

    #[error("scratch file staging failed: {0}")]
    Staging(#[from] std::io::Error),
}

/// The single boundary to the canonical-ordering service.
pub trait Canonicalize {
    /// Return a fully reformatted version of `src` whose grouped import
    /// block is in canonical order. `local` is a comma-separated list of
    /// path prefixes sorted into their own trailing group; empty means no
    /// local group.
    fn canonicalize(&self, src: &[u8], local: &str) -> Result<Vec<u8>, OracleError>;
}

/// Construct the oracle backend selected by configuration.
pub fn create_oracle(kind: OracleKind) -> Box<dyn Canonicalize> {
    match kind {
        OracleKind::Builtin => Box::new(BuiltinOracle),
        OracleKind::Goimports => Box::new(GoimportsOracle::default()),
    }
}

/// Go standard library root packages, sorted for binary search.
const GO_STDLIB_ROOTS: &[&str] = &[
    "archive", "bufio", "builtin", "bytes", "cmp", "compress", "container", "context", "crypto",
    "database", "debug", "embed", "encoding", "errors", "expvar", "flag", "fmt", "go", "hash",
    "html", "image", "index", "io", "iter", "log", "maps", "math", "mime", "net", "os", "path",
    "plugin", "reflect", "regexp", "runtime", "slices", "sort", "strconv", "strings", "structs",
    "sync", "syscall", "testing", "text", "time", "unicode", "unique", "unsafe", "weak",
];

fn is_stdlib(path: &str) -> bool {
    let root = path.split('/').next().unwrap_or(path);
    GO_STDLIB_ROOTS.binary_search(&root).is_ok()
}

/// Prefix match with goimports `-local` semantics: the prefix matches the
/// whole path or a path-segment boundary.
fn matches_local(path: &str, prefixes: &str) -> bool {
    prefixes
        .split(',')
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .any(|p| path == p || (path.starts_with(p) && path[p.len()..].starts_with('/')))
}

/// One import entry as the oracle sees it: the spec plus any comment run
/// that documents it.
#[derive(Debug)]
struct Entry {
    name: Option<String>,
    path: String,
    trailing_comment: String,
    leading_comments: Vec<String>,
}

/// Embedded conforming implementation of the oracle contract.
pub struct BuiltinOracle;

impl Canonicalize for BuiltinOracle {
    fn canonicalize(&self, src: &[u8], local: &str) -> Result<Vec<u8>, OracleError> {
        let text = std::str::from_utf8(src)
            .map_err(|_| OracleError::Unparseable("input is not UTF-8".into()))?;

        let parsed = match scan(text) {
            Ok(p) => p,
            // Nothing recognizable to reorder; hand the input back.
            Err(_) => return Ok(src.to_vec()),
        };

        let Some(decl) = parsed.decls.iter().find(|d| d.grouped) else {
            return Ok(src.to_vec());
        };
        let Some(close_line) = decl.close_line else {
            return Ok(src.to_vec());
        };

        let index = LineIndex::build(src);

        // Collect entries with their attached comment runs.
        let mut entries: Vec<Entry> = Vec::with_capacity(decl.specs.len());
        let mut pending_comments: Vec<String> = Vec::new();
        let mut floating_comments: Vec<String> = Vec::new();
        let mut next_spec = decl.specs.start;

        for line_no in decl.line + 1..close_line {
            let start = index.start_of_line(line_no).unwrap_or(0);
            let end = index.end_of_line(line_no, src).unwrap_or(start);
            let line = &text[start..end];
            let trimmed = line.trim();

            if trimmed.is_empty() {
                continue;
            }
            if let Some(comment) = trimmed.strip_prefix("//") {
                pending_comments.push(comment.to_string());
                continue;
            }
            if next_spec >= decl.specs.end {
                return Err(OracleError::Unparseable(format!(
                    "unrecognized import line {line_no}"
                )));
            }
            let spec = &parsed.specs[next_spec];
            next_spec += 1;

            let trailing_comment = line
                .split_once("//")
                .map(|(_, rest)| rest.to_string())
                .unwrap_or_default();

            entries.push(Entry {
                name: spec.name.clone(),
                path: spec.path.clone(),
                trailing_comment,
                leading_comments: std::mem::take(&mut pending_comments),
            });
        }
        // A comment run not followed by any entry stays at the block's end.
        floating_comments.append(&mut pending_comments);

        // Group: stdlib, third party, then local when a hint is given.
        let mut groups: [Vec<Entry>; 3] = [Vec::new(), Vec::new(), Vec::new()];
        for entry in entries {
            let slot = if matches_local(&entry.path, local) {
                2
            } else if is_stdlib(&entry.path) {
                0
            } else {
                1
            };
            groups[slot].push(entry);
        }
        for group in &mut groups {
            group.sort_by(|a, b| a.path.cmp(&b.path));
        }

        // Render the canonical block.
        let mut block = String::from("import (\n");
        let mut first_group = true;
        for group in &groups {
            if group.is_empty() {
                continue;
            }
            if !first_group {
                block.push('\n');
            }
            first_group = false;
            for entry in group {
                for comment in &entry.leading_comments {
                    block.push_str("\t//");
                    block.push_str(comment);
                    block.push('\n');
                }
                block.push('\t');
                if let Some(name) = &entry.name {
                    block.push_str(name);
                    block.push(' ');
                }
                block.push('"');
                block.push_str(&entry.path);
                block.push('"');
                if !entry.trailing_comment.is_empty() {
                    block.push_str(" //");
                    block.push_str(&entry.trailing_comment);
                }
                block.push('\n');
            }
        }
        for comment in &floating_comments {
            block.push_str("\t//");
            block.push_str(comment);
            block.push('\n');
        }
        block.push(')');

        // Splice the rebuilt block over the original block's lines.
        let open_start = index.start_of_line(decl.line).unwrap_or(0);
        let close_end = index
            .end_of_line(close_line, src)
            .unwrap_or(src.len());

        let mut out = String::with_capacity(text.len() + 16);
        out.push_str(&text[..open_start]);
        out.push_str(&block);
        out.push_str(&text[close_end..]);

        Ok(out.into_bytes())
    }
}

/// Subprocess backend invoking `goimports`.
pub struct GoimportsOracle {
    program: String,
}

impl Default for GoimportsOracle {
    fn default() -> Self {
        Self {
            program: "goimports".to_string(),
        }
    }
}

impl GoimportsOracle {
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Canonicalize for GoimportsOracle {
    fn canonicalize(&self, src: &[u8], local: &str) -> Result<Vec<u8>, OracleError> {
        // Scratch file scoped to this call; dropped (and removed) on every
        // exit path.
        let mut scratch = tempfile::Builder::new()
            .prefix("strictimports-")
            .suffix(".go")
            .tempfile()?;
        scratch.write_all(src)?;
        scratch.flush()?;

        let mut cmd = Command::new(&self.program);
        if !local.is_empty() {
            cmd.arg("-local").arg(local);
        }
        cmd.arg(scratch.path());

        let output = cmd.output().map_err(|source| OracleError::Spawn {
            cmd: self.program.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(OracleError::Failed {
                cmd: self.program.clone(),
                status: output.status.to_string(),
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
            });
        }

        Ok(output.stdout)
    }
}
