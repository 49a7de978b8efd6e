//! Per-file check/fix driver, reporting, and exit-code mapping.
//!
//! For each candidate file: build the real line model, obtain the ideal
//! model via the oracle round trip, compare, and either report the first
//! divergence as `file:line:col` plus the synthesized block, or (fix mode)
//! write the oracle's full reformatted bytes back in place. Errors are per
//! file and never abort the sweep.

use std::path::{Path, PathBuf};

use anyhow::Result;
use owo_colors::OwoColorize;
use serde::Serialize;
use tracing::{debug, instrument};

use crate::cli::{AppContext, CheckArgs, FixArgs, SelectArgs};
use crate::core::canonical::canonicalize;
use crate::core::compare::{Divergence, compare};
use crate::core::lines::{MalformedBlock, build_block};
use crate::core::oracle::{Canonicalize, OracleError, create_oracle};
use crate::core::scan::{ScanError, scan};
use crate::infra::config::load_config;
use crate::infra::io::{read_source, write_preserving_permissions};
use crate::infra::line_index::LineIndex;
use crate::infra::walk::FileWalker;

/// Domain error taxonomy for one file's check.
#[derive(Debug, thiserror::Error)]
pub enum CheckError {
    /// Source is not parseable at all; the file is skipped, not failed.
    #[error("unparseable source: {0}")]
    Parse(#[from] ScanError),

    /// Unsupported construct inside the import block; fatal for this file.
    #[error(transparent)]
    Malformed(#[from] MalformedBlock),

    /// The canonical-order oracle failed; there is no fallback ordering.
    #[error("canonical-order oracle unavailable: {0}")]
    Oracle(#[from] OracleError),

    /// Read or write-back failure.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Outcome of checking one file.
#[derive(Debug)]
pub enum Finding {
    /// Block matches the canonical order, or there is nothing to check.
    Clean,

    /// First deviation, with the synthesized replacement.
    Divergent {
        /// 1-based line of the first deviating line
        line: usize,
        /// 1-based column of its first significant character
        column: usize,
        /// Rendered canonical block for display
        ideal_block: String,
        /// Full oracle-reformatted file for fix mode
        ideal_bytes: Vec<u8>,
    },
}

/// Check a single file against the canonical import order.
#[instrument(level = "debug", skip_all, fields(file = %path.display()))]
pub fn check_file(
    path: &Path,
    local: &str,
    oracle: &dyn Canonicalize,
) -> Result<Finding, CheckError> {
    let src = read_source(path)?;
    let parsed = scan(&src)?;
    let index = LineIndex::build(src.as_bytes());

    let real = build_block(&src, &parsed, &index)?;
    if real.is_empty() {
        debug!("no grouped import block; trivially canonical");
        return Ok(Finding::Clean);
    }

    let (ideal, ideal_bytes) = canonicalize(&src, local, oracle)?;

    match compare(&real, &ideal) {
        Divergence::Identical => Ok(Finding::Clean),
        Divergence::Diverged { index: at } => {
            // Past-the-end divergence (trailing separator lines) reports at
            // the closing marker.
            let pos = real
                .lines
                .get(at)
                .map(|l| l.pos)
                .or_else(|| real.span.map(|s| s.close_pos))
                .unwrap_or(0);
            let (line, column) = index.line_col_of_byte(pos);

            Ok(Finding::Divergent {
                line,
                column,
                ideal_block: ideal.to_string(),
                ideal_bytes,
            })
        }
    }
}

/// Aggregated result of a sweep; maps onto the process exit code.
#[derive(Debug, Default)]
pub struct Summary {
    pub checked: usize,
    pub findings: usize,
    pub errors: usize,
}

impl Summary {
    /// 0 = clean, 1 = divergences found (check mode), 2 = per-file errors.
    fn exit_code(&self, mode: Mode) -> i32 {
        if self.errors > 0 {
            2
        } else if self.findings > 0 && matches!(mode, Mode::Check) {
            1
        } else {
            0
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Check,
    Fix,
}

/// `check` subcommand entry point. Returns the process exit code.
pub fn run(args: CheckArgs, ctx: &AppContext) -> Result<i32> {
    run_sweep(args.select, Mode::Check, args.json, args.diff, ctx)
}

/// `fix` subcommand entry point. Returns the process exit code.
pub fn run_fix(args: FixArgs, ctx: &AppContext) -> Result<i32> {
    run_sweep(args.select, Mode::Fix, false, false, ctx)
}

fn run_sweep(
    select: SelectArgs,
    mode: Mode,
    json: bool,
    diff: bool,
    ctx: &AppContext,
) -> Result<i32> {
    let config = load_config().unwrap_or_default();

    // CLI flags override config; exclude lists combine.
    let local = select.local.unwrap_or(config.local);
    let oracle_kind = select.oracle.unwrap_or(config.oracle);

    let mut exclude = config.exclude;
    exclude.extend(select.exclude);
    let mut exclude_dirs = config.exclude_dirs;
    exclude_dirs.extend(select.exclude_dir);

    let walker = FileWalker::new(&exclude, &exclude_dirs)?.with_recurse(!select.no_recurse);
    let oracle = create_oracle(oracle_kind);

    let mut summary = Summary::default();

    for root in &select.paths {
        if !root.exists() {
            eprintln!("{}: no such file or directory", root.display());
            summary.errors += 1;
            continue;
        }

        for file in walker.walk_files(root) {
            summary.checked += 1;
            process_file(&file, &local, oracle.as_ref(), mode, json, diff, ctx, &mut summary);
        }
    }

    Ok(summary.exit_code(mode))
}

#[allow(clippy::too_many_arguments)]
fn process_file(
    file: &PathBuf,
    local: &str,
    oracle: &dyn Canonicalize,
    mode: Mode,
    json: bool,
    diff: bool,
    ctx: &AppContext,
    summary: &mut Summary,
) {
    match check_file(file, local, oracle) {
        Ok(Finding::Clean) => {}
        Ok(Finding::Divergent {
            line,
            column,
            ideal_block,
            ideal_bytes,
        }) => {
            summary.findings += 1;
            match mode {
                Mode::Check => {
                    report_divergence(file, line, column, &ideal_block, &ideal_bytes, json, diff, ctx);
                }
                Mode::Fix => {
                    if ctx.dry_run {
                        if !ctx.quiet {
                            println!("would fix {}", file.display());
                        }
                    } else if let Err(e) = write_preserving_permissions(file, &ideal_bytes) {
                        eprintln!("{}: {e:#}", file.display());
                        summary.errors += 1;
                    }
                    // Successful rewrites are silent.
                }
            }
        }
        Err(CheckError::Parse(e)) => {
            // Not checkable is not a failure; move on.
            debug!(error = %e, "skipping unparseable file");
        }
        Err(CheckError::Malformed(e)) => {
            summary.errors += 1;
            report_malformed(file, &e, ctx);
        }
        Err(e) => {
            summary.errors += 1;
            eprintln!("{}: {e}", file.display());
        }
    }
}

#[derive(Serialize)]
struct JsonFinding<'a> {
    file: &'a Path,
    line: usize,
    column: usize,
    ideal: &'a str,
}

#[allow(clippy::too_many_arguments)]
fn report_divergence(
    file: &Path,
    line: usize,
    column: usize,
    ideal_block: &str,
    ideal_bytes: &[u8],
    json: bool,
    diff: bool,
    ctx: &AppContext,
) {
    if json {
        let record = JsonFinding {
            file,
            line,
            column,
            ideal: ideal_block,
        };
        match serde_json::to_string(&record) {
            Ok(s) => println!("{s}"),
            Err(e) => eprintln!("{}: failed to encode finding: {e}", file.display()),
        }
        return;
    }

    let loc = format!("{}:{line}:{column}", file.display());
    if ctx.no_color {
        println!("{loc}: import block not in canonical order; should be:\n{ideal_block}");
    } else {
        println!(
            "{}: import block not in canonical order; should be:\n{ideal_block}",
            loc.red()
        );
    }

    if diff && let Ok(orig) = read_source(file) {
        let ideal_text = String::from_utf8_lossy(ideal_bytes);
        let udiff = similar::TextDiff::from_lines(orig.as_str(), ideal_text.as_ref())
            .unified_diff()
            .header("current", "canonical")
            .to_string();
        println!("{udiff}");
    }
}

fn report_malformed(file: &Path, err: &MalformedBlock, ctx: &AppContext) {
    // Map the byte offset back to line:col for the diagnostic.
    let loc = match read_source(file) {
        Ok(src) => {
            let index = LineIndex::build(src.as_bytes());
            let (line, column) = index.line_col_of_byte(err.offset);
            format!("{}:{line}:{column}", file.display())
        }
        Err(_) => file.display().to_string(),
    };

    if ctx.no_color {
        eprintln!("{loc}: {err}");
    } else {
        eprintln!("{}: {err}", loc.red());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::oracle::BuiltinOracle;
    use std::fs;
    use tempfile::TempDir;

    fn write_go(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn canonical_file_is_clean() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "ok.go",
            "package main\n\nimport (\n\t\"fmt\"\n\n\t\"mypkg/x\"\n)\n",
        );

        let finding = check_file(&path, "", &BuiltinOracle).unwrap();
        assert!(matches!(finding, Finding::Clean));
    }

    #[test]
    fn misordered_file_reports_first_bad_line() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "bad.go",
            "package main\n\nimport (\n\t\"mypkg/x\"\n\t\"fmt\"\n)\n",
        );

        match check_file(&path, "", &BuiltinOracle).unwrap() {
            Finding::Divergent {
                line,
                column,
                ideal_block,
                ..
            } => {
                // Line 4 is the misplaced third-party path; the tab puts its
                // first significant character in column 2.
                assert_eq!((line, column), (4, 2));
                assert_eq!(
                    ideal_block,
                    "import (\n\t\"fmt\"\n\n\t\"mypkg/x\"\n)"
                );
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn missing_separator_reports_the_shifted_line() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "nosep.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"mypkg/x\"\n)\n",
        );

        match check_file(&path, "", &BuiltinOracle).unwrap() {
            Finding::Divergent { line, column, .. } => {
                assert_eq!((line, column), (5, 2));
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn local_prefix_scenario_three_groups() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "local.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t\"github.com/acme/lib\"\n\t\"github.com/other/lib\"\n)\n",
        );

        match check_file(&path, "github.com/acme", &BuiltinOracle).unwrap() {
            Finding::Divergent { ideal_block, .. } => {
                assert_eq!(
                    ideal_block,
                    "import (\n\t\"fmt\"\n\n\t\"github.com/other/lib\"\n\n\t\"github.com/acme/lib\"\n)"
                );
            }
            other => panic!("expected divergence, got {other:?}"),
        }
    }

    #[test]
    fn single_bare_import_is_clean() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(&tmp, "single.go", "package main\n\nimport \"fmt\"\n");

        let finding = check_file(&path, "", &BuiltinOracle).unwrap();
        assert!(matches!(finding, Finding::Clean));
    }

    #[test]
    fn star_comment_is_malformed_for_this_file() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "star.go",
            "package main\n\nimport (\n\t\"fmt\"\n\t/* note */\n)\n",
        );

        let err = check_file(&path, "", &BuiltinOracle).unwrap_err();
        assert!(matches!(err, CheckError::Malformed(_)));
    }

    #[test]
    fn unparseable_file_surfaces_parse_error() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(&tmp, "frag.go", "import \"fmt\"\n");

        let err = check_file(&path, "", &BuiltinOracle).unwrap_err();
        assert!(matches!(err, CheckError::Parse(_)));
    }

    #[test]
    fn fix_then_recheck_is_identical() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "fixme.go",
            "package main\n\nimport (\n\t\"mypkg/x\"\n\t\"fmt\"\n)\n\nfunc main() {}\n",
        );

        let ideal_bytes = match check_file(&path, "", &BuiltinOracle).unwrap() {
            Finding::Divergent { ideal_bytes, .. } => ideal_bytes,
            other => panic!("expected divergence, got {other:?}"),
        };

        write_preserving_permissions(&path, &ideal_bytes).unwrap();

        let finding = check_file(&path, "", &BuiltinOracle).unwrap();
        assert!(matches!(finding, Finding::Clean));
    }

    #[test]
    fn cgo_pseudo_import_is_tolerated() {
        let tmp = TempDir::new().unwrap();
        let path = write_go(
            &tmp,
            "cgo.go",
            "package main\n\nimport \"C\"\n\nimport (\n\t\"fmt\"\n\n\t\"mypkg/x\"\n)\n",
        );

        let finding = check_file(&path, "", &BuiltinOracle).unwrap();
        assert!(matches!(finding, Finding::Clean));
    }
}
