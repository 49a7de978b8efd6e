//! Imports-only scanner for Go source.
//!
//! Extracts the import declarations at the top of a file, recording each
//! spec's bound name, path, 1-based line and byte offset of its first token.
//! Scanning stops at the first non-import declaration; nothing below the
//! import section is ever inspected.
//!
//! The scanner is deliberately tolerant of `/* */` runs inside a grouped
//! block: those lines are skipped here and rejected later by the line model
//! builder, which owns the malformed-block diagnostics.

use std::ops::Range;

use thiserror::Error;

/// Failure to make sense of the import section. Callers treat this as a
/// non-fatal "file is not checkable" signal and skip the file.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("no package clause")]
    NoPackageClause,

    #[error("line {line}: malformed import spec: {text:?}")]
    BadSpec { line: usize, text: String },

    #[error("grouped import opened at line {line} is never closed")]
    UnclosedBlock { line: usize },
}

/// One import specification in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportSpec {
    /// Bound identifier (`mp` in `mp "github.com/user/pkg"`), if any
    pub name: Option<String>,

    /// Import path without surrounding quotes
    pub path: String,

    /// Byte offset of the spec's first token (name or opening quote)
    pub offset: usize,

    /// 1-based physical line number
    pub line: usize,
}

/// One `import` declaration, grouped or single.
#[derive(Debug, Clone)]
pub struct ImportDecl {
    /// `import ( ... )` as opposed to `import "path"`
    pub grouped: bool,

    /// Byte offset of the `import` keyword
    pub offset: usize,

    /// 1-based line of the `import` keyword
    pub line: usize,

    /// Indices into `ParsedImports::specs` belonging to this declaration
    pub specs: Range<usize>,

    /// 1-based line of the closing `)` for grouped declarations
    pub close_line: Option<usize>,
}

/// Scanner output: all specs in declaration order plus per-declaration spans.
#[derive(Debug, Default)]
pub struct ParsedImports {
    pub specs: Vec<ImportSpec>,
    pub decls: Vec<ImportDecl>,
}

impl ParsedImports {
    /// The C-interop pseudo-import: a single `import "C"` declaration.
    pub fn is_cgo_decl(&self, decl: &ImportDecl) -> bool {
        !decl.grouped
            && decl.specs.len() == 1
            && self.specs[decl.specs.start].path == "C"
    }
}

/// Scan the import section of `src`.
pub fn scan(src: &str) -> Result<ParsedImports, ScanError> {
    let mut parsed = ParsedImports::default();

    let mut offset = 0usize;
    let mut line_no = 0usize;
    let mut saw_package = false;
    let mut in_star_comment = false;

    // Grouped-block state: Some((decl index, first spec index)) while inside.
    let mut open_block: Option<(usize, usize)> = None;

    for raw in src.split('\n') {
        line_no += 1;
        let line_start = offset;
        offset += raw.len() + 1;

        let text = raw.strip_suffix('\r').unwrap_or(raw);
        let trimmed = text.trim();

        if in_star_comment {
            if let Some(end) = text.find("*/") {
                in_star_comment = false;
                // `*/import (` on one line: record the open so the builder
                // can reject the adjacency with a position.
                if text[end + 2..].trim_start().starts_with("import (")
                    && let Some(col) = text.find("import (")
                {
                    parsed.decls.push(ImportDecl {
                        grouped: true,
                        offset: line_start + col,
                        line: line_no,
                        specs: 0..0,
                        close_line: None,
                    });
                    open_block = Some((parsed.decls.len() - 1, parsed.specs.len()));
                }
            }
            continue;
        }

        if let Some((decl_idx, first_spec)) = open_block {
            if trimmed.starts_with(')') {
                parsed.decls[decl_idx].specs = first_spec..parsed.specs.len();
                parsed.decls[decl_idx].close_line = Some(line_no);
                open_block = None;
                continue;
            }
            if trimmed.is_empty() || trimmed.starts_with("//") {
                continue;
            }
            if trimmed.contains("/*") {
                // Tolerated here; the builder rejects the block with a
                // positioned error before any spec is consumed.
                if !trimmed.contains("*/") {
                    in_star_comment = true;
                }
                continue;
            }
            let spec = parse_spec_line(text, line_start, line_no)?;
            parsed.specs.push(spec);
            continue;
        }

        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if trimmed.starts_with("/*") {
            // A star comment butting up against the open marker is still a
            // grouped declaration; the builder owns the rejection.
            if saw_package
                && trimmed.contains("*/")
                && let Some(col) = text.find("import (")
            {
                parsed.decls.push(ImportDecl {
                    grouped: true,
                    offset: line_start + col,
                    line: line_no,
                    specs: 0..0,
                    close_line: None,
                });
                open_block = Some((parsed.decls.len() - 1, parsed.specs.len()));
                continue;
            }
            if !trimmed.contains("*/") {
                in_star_comment = true;
            }
            continue;
        }

        if !saw_package {
            if trimmed.starts_with("package ") || trimmed == "package" {
                saw_package = true;
                continue;
            }
            return Err(ScanError::NoPackageClause);
        }

        if let Some(rest) = trimmed.strip_prefix("import") {
            let keyword_col = text.find("import").unwrap_or(0);
            let decl_offset = line_start + keyword_col;
            let rest_trimmed = rest.trim_start();

            if rest_trimmed.starts_with('(') {
                let after_paren = rest_trimmed[1..].trim();
                if !(after_paren.is_empty()
                    || after_paren.starts_with("//")
                    // Star comment after the open marker: let the builder
                    // reject it with a position.
                    || after_paren.contains("/*"))
                {
                    // One-line grouped imports are outside the line model.
                    return Err(ScanError::BadSpec {
                        line: line_no,
                        text: text.to_string(),
                    });
                }
                parsed.decls.push(ImportDecl {
                    grouped: true,
                    offset: decl_offset,
                    line: line_no,
                    specs: 0..0,
                    close_line: None,
                });
                open_block = Some((parsed.decls.len() - 1, parsed.specs.len()));
            } else if rest.starts_with(' ') || rest.starts_with('\t') {
                // `rest_trimmed` borrows from the same line buffer, so the
                // pointer difference is its column within `text`.
                let rest_col = rest_trimmed.as_ptr() as usize - text.as_ptr() as usize;
                let spec = parse_spec_line(rest_trimmed, line_start + rest_col, line_no)?;
                parsed.specs.push(spec);
                parsed.decls.push(ImportDecl {
                    grouped: false,
                    offset: decl_offset,
                    line: line_no,
                    specs: parsed.specs.len() - 1..parsed.specs.len(),
                    close_line: None,
                });
            } else {
                // An identifier like `imports` starting a declaration:
                // the import section is over.
                break;
            }
            continue;
        }

        // First non-import declaration ends the scan.
        break;
    }

    if let Some((decl_idx, _)) = open_block {
        return Err(ScanError::UnclosedBlock {
            line: parsed.decls[decl_idx].line,
        });
    }

    Ok(parsed)
}

/// Parse one spec line: `[name] "path" [// comment]`.
/// `line_start` is the byte offset of `text`'s first character.
fn parse_spec_line(text: &str, line_start: usize, line_no: usize) -> Result<ImportSpec, ScanError> {
    let bad = || ScanError::BadSpec {
        line: line_no,
        text: text.to_string(),
    };

    let open_quote = text.find('"').ok_or_else(bad)?;
    let close_quote = text[open_quote + 1..]
        .find('"')
        .map(|i| open_quote + 1 + i)
        .ok_or_else(bad)?;

    let path = text[open_quote + 1..close_quote].to_string();
    if path.is_empty() {
        return Err(bad());
    }

    let before = text[..open_quote].trim();
    let (name, token_col) = if before.is_empty() {
        (None, open_quote)
    } else {
        if before.split_whitespace().count() != 1 {
            return Err(bad());
        }
        let col = text.find(before).unwrap_or(0);
        (Some(before.to_string()), col)
    };

    Ok(ImportSpec {
        name,
        path,
        offset: line_start + token_col,
        line: line_no,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn grouped_block_with_names_and_comments() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\n\tmp \"github.com/user/pkg\" // pinned\n)\n\nfunc main() {}\n";
        let parsed = scan(src).unwrap();

        assert_eq!(parsed.decls.len(), 1);
        assert!(parsed.decls[0].grouped);
        assert_eq!(parsed.decls[0].specs, 0..2);

        assert_eq!(parsed.specs[0].name, None);
        assert_eq!(parsed.specs[0].path, "fmt");
        assert_eq!(parsed.specs[0].line, 4);

        assert_eq!(parsed.specs[1].name.as_deref(), Some("mp"));
        assert_eq!(parsed.specs[1].path, "github.com/user/pkg");
        assert_eq!(parsed.specs[1].line, 6);
    }

    #[test]
    fn spec_offsets_point_at_first_token() {
        let src = "package main\nimport (\n\t\"fmt\"\n)\n";
        let parsed = scan(src).unwrap();

        // Line 3 starts after "package main\nimport (\n" (22 bytes); the
        // quote sits past the tab.
        assert_eq!(parsed.specs[0].offset, 23);
        assert_eq!(&src[23..24], "\"");
    }

    #[test]
    fn single_import_and_cgo() {
        let src = "package main\n\nimport \"C\"\n\nimport (\n\t\"os\"\n)\n";
        let parsed = scan(src).unwrap();

        assert_eq!(parsed.decls.len(), 2);
        assert!(parsed.is_cgo_decl(&parsed.decls[0]));
        assert!(parsed.decls[1].grouped);
        assert_eq!(parsed.specs[parsed.decls[1].specs.clone()].len(), 1);
    }

    #[test]
    fn stops_at_first_non_import_decl() {
        let src = "package main\n\nimport \"fmt\"\n\nvar x = 1\n\nimport \"os\"\n";
        let parsed = scan(src).unwrap();

        // The trailing import after `var` is unreachable Go anyway; the
        // scanner never sees it.
        assert_eq!(parsed.decls.len(), 1);
        assert_eq!(parsed.specs[0].path, "fmt");
    }

    #[test]
    fn blank_and_comment_lines_do_not_produce_specs() {
        let src = "package main\n\nimport (\n\t\"io\"\n\n\t// docs\n\t\"os\"\n)\n";
        let parsed = scan(src).unwrap();

        let paths: Vec<_> = parsed.specs.iter().map(|s| s.path.as_str()).collect();
        assert_eq!(paths, vec!["io", "os"]);
    }

    #[test]
    fn star_comment_lines_are_tolerated_not_modeled() {
        let src = "package main\n\nimport (\n\t/* note */\n\t\"os\"\n)\n";
        let parsed = scan(src).unwrap();

        assert_eq!(parsed.specs.len(), 1);
        assert_eq!(parsed.specs[0].path, "os");
    }

    #[test]
    fn missing_package_clause_is_a_scan_error() {
        let err = scan("import \"fmt\"\n").unwrap_err();
        assert!(matches!(err, ScanError::NoPackageClause));
    }

    #[test]
    fn unclosed_block_is_a_scan_error() {
        let err = scan("package main\nimport (\n\t\"fmt\"\n").unwrap_err();
        assert!(matches!(err, ScanError::UnclosedBlock { line: 2 }));
    }

    #[test]
    fn unquoted_entry_is_a_scan_error() {
        let err = scan("package main\nimport (\n\tfmt\n)\n").unwrap_err();
        assert!(matches!(err, ScanError::BadSpec { line: 3, .. }));
    }
}
