//! Canonicalization adapter.
//!
//! Produces the *ideal* line model for a file: normalize the source (drop
//! blank separators inside the grouped block so the oracle regroups from a
//! clean slate; comment runs keep their place directly above the entry they
//! document), hand the bytes to the oracle, and re-parse its output through
//! the same line model builder used for the real file.
//!
//! Any failure on this path is an oracle failure: without the oracle there
//! is no canonical ordering to compare against.

use tracing::trace;

use crate::core::lines::{ImportBlock, build_block};
use crate::core::oracle::{Canonicalize, OracleError};
use crate::core::scan::scan;
use crate::infra::line_index::LineIndex;

/// Round-trip `src` through the oracle and model its import block.
/// Returns the ideal block plus the full reformatted file bytes (fix mode
/// writes those back verbatim).
pub fn canonicalize(
    src: &str,
    local: &str,
    oracle: &dyn Canonicalize,
) -> Result<(ImportBlock, Vec<u8>), OracleError> {
    let normalized = strip_block_blank_lines(src);
    trace!(local, "invoking canonical-order oracle");

    let ideal_bytes = oracle.canonicalize(normalized.as_bytes(), local)?;

    let ideal_text = String::from_utf8(ideal_bytes)
        .map_err(|_| OracleError::Unparseable("output is not UTF-8".into()))?;

    let parsed =
        scan(&ideal_text).map_err(|e| OracleError::Unparseable(e.to_string()))?;
    let index = LineIndex::build(ideal_text.as_bytes());
    let block = build_block(&ideal_text, &parsed, &index)
        .map_err(|e| OracleError::Unparseable(e.to_string()))?;

    Ok((block, ideal_text.into_bytes()))
}

/// Remove every blank line strictly inside the first grouped import block.
/// All other lines pass through verbatim.
fn strip_block_blank_lines(src: &str) -> String {
    let mut out: Vec<&str> = Vec::with_capacity(src.split('\n').count());

    let mut in_block = false;
    let mut done = false;

    for line in src.split('\n') {
        let trimmed = line.trim();

        if in_block {
            if trimmed.starts_with(')') {
                in_block = false;
                done = true;
            } else if trimmed.is_empty() {
                continue;
            }
        } else if !done && trimmed.starts_with("import (") {
            in_block = true;
        }

        out.push(line);
    }

    out.join("\n")
}
