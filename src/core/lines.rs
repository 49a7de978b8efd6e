//! Import-block line model.
//!
//! `build_block` turns the physical lines of a grouped import declaration
//! into an ordered sequence of [`ImportLine`] records, each carrying its
//! semantic content plus the 1-based line number and the byte offset of its
//! first significant character. Insertion order is the property under test:
//! the same model is built for the file as-is and for the oracle's canonical
//! output, and the two sequences are compared index by index.

use std::fmt;

use thiserror::Error;

use crate::core::scan::{ImportDecl, ParsedImports};
use crate::infra::line_index::LineIndex;

/// Unsupported construct inside (or adjacent to) the grouped import block.
/// Fatal for the file being checked; `offset` points at the offending bytes.
#[derive(Debug, Error)]
#[error("{reason}")]
pub struct MalformedBlock {
    pub offset: usize,
    pub reason: String,
}

impl MalformedBlock {
    fn at(offset: usize, reason: impl Into<String>) -> Self {
        Self {
            offset,
            reason: reason.into(),
        }
    }
}

/// One logical line inside the grouped import block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLine {
    /// Bound identifier (`mp` in `mp "github.com/user/pkg"`), if any
    pub name: Option<String>,

    /// Import path; empty for blank separators and comment-only lines
    pub path: String,

    /// Raw text after the `//` marker; empty when the line has no comment
    pub comment: String,

    /// 1-based line number within the physical file
    pub line: usize,

    /// Byte offset of the line's first significant character
    pub pos: usize,
}

impl ImportLine {
    /// Blank separator between groups.
    pub fn is_blank_separator(&self) -> bool {
        self.name.is_none() && self.path.is_empty() && self.comment.is_empty()
    }

    /// Line-comment with no import entry on the line.
    pub fn is_comment_only(&self) -> bool {
        self.name.is_none() && self.path.is_empty() && !self.comment.is_empty()
    }
}

/// Where the grouped block opens and closes in the file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BlockSpan {
    pub open_line: usize,
    pub open_pos: usize,
    pub close_line: usize,
    pub close_pos: usize,
}

/// Ordered sequence of import-block lines. Empty when the file has no
/// grouped import declaration (a single bare import is trivially correct).
#[derive(Debug, Clone, Default)]
pub struct ImportBlock {
    pub lines: Vec<ImportLine>,
    pub span: Option<BlockSpan>,
}

impl ImportBlock {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }
}

impl fmt::Display for ImportBlock {
    /// Serialize back into grouped-import textual form.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "import (")?;
        for line in &self.lines {
            if !line.is_blank_separator() {
                write!(f, "\t")?;
            }
            if let Some(name) = &line.name {
                write!(f, "{name} ")?;
            }
            if !line.path.is_empty() {
                write!(f, "\"{}\"", line.path)?;
            }
            if !line.comment.is_empty() {
                if !line.is_comment_only() {
                    write!(f, " ")?;
                }
                write!(f, "//{}", line.comment)?;
            }
            writeln!(f)?;
        }
        write!(f, ")")
    }
}

/// Build the line model for the file's grouped import block.
///
/// Returns an empty block when the file has no grouped declaration. The
/// C-interop pseudo-import (`import "C"`) is permitted alongside the grouped
/// block but contributes no comparable line.
pub fn build_block(
    src: &str,
    parsed: &ParsedImports,
    index: &LineIndex,
) -> Result<ImportBlock, MalformedBlock> {
    let main_decls: Vec<&ImportDecl> = parsed
        .decls
        .iter()
        .filter(|d| !parsed.is_cgo_decl(d))
        .collect();

    if main_decls.len() > 1 {
        return Err(MalformedBlock::at(
            main_decls[1].offset,
            "more than one import declaration",
        ));
    }

    let decl = match main_decls.first() {
        Some(d) if d.grouped => *d,
        // A single bare import (or no imports at all) has no block to model.
        _ => return Ok(ImportBlock::default()),
    };

    // Star comments touching the opening line break per-line scanning.
    let open_text = line_text(src, index, decl.line);
    if open_text.contains("/*") || open_text.contains("*/") {
        return Err(MalformedBlock::at(
            decl.offset,
            "star comment (/* */) in import lines",
        ));
    }

    let mut lines = Vec::with_capacity(decl.specs.len() * 2);
    let mut next_spec = decl.specs.start;

    for line_no in decl.line + 1..=index.line_count() {
        let start = index
            .start_of_line(line_no)
            .expect("line within indexed range");
        let text = line_text(src, index, line_no);
        let trimmed = text.trim();

        if trimmed.starts_with(')') {
            return Ok(ImportBlock {
                lines,
                span: Some(BlockSpan {
                    open_line: decl.line,
                    open_pos: decl.offset,
                    close_line: line_no,
                    close_pos: start + (text.len() - text.trim_start().len()),
                }),
            });
        }

        if let Some(col) = text.find("/*").or_else(|| text.find("*/")) {
            return Err(MalformedBlock::at(
                start + col,
                "star comment (/* */) in import lines",
            ));
        }

        if trimmed.is_empty() {
            lines.push(ImportLine {
                name: None,
                path: String::new(),
                comment: String::new(),
                line: line_no,
                pos: start,
            });
        } else if trimmed.starts_with("//") {
            let col = text.find("//").expect("comment marker located");
            lines.push(ImportLine {
                name: None,
                path: String::new(),
                comment: text[col + 2..].to_string(),
                line: line_no,
                pos: start + col,
            });
        } else {
            if next_spec >= decl.specs.end {
                return Err(MalformedBlock::at(start, "unrecognized import entry"));
            }
            let spec = &parsed.specs[next_spec];
            next_spec += 1;

            let comment = match text.split_once("//") {
                Some((_, rest)) => {
                    if let Some(extra) = rest.find("//") {
                        // At most one trailing inline comment per entry;
                        // anything more is ambiguous.
                        let marker = text.len() - rest.len();
                        return Err(MalformedBlock::at(
                            start + marker + extra,
                            "multiple inline comments on one import entry",
                        ));
                    }
                    rest.to_string()
                }
                None => String::new(),
            };

            lines.push(ImportLine {
                name: spec.name.clone(),
                path: spec.path.clone(),
                comment,
                line: line_no,
                pos: spec.offset,
            });
        }
    }

    // The scanner already rejected unterminated blocks; reaching EOF here
    // means the model and scanner disagree.
    Err(MalformedBlock::at(decl.offset, "import block never closed"))
}

fn line_text<'a>(src: &'a str, index: &LineIndex, line_no: usize) -> &'a str {
    let start = index.start_of_line(line_no).unwrap_or(src.len());
    let end = index
        .end_of_line(line_no, src.as_bytes())
        .unwrap_or(src.len());
    &src[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::scan::scan;

    fn model(src: &str) -> Result<ImportBlock, MalformedBlock> {
        let parsed = scan(src).expect("scan");
        let index = LineIndex::build(src.as_bytes());
        build_block(src, &parsed, &index)
    }

    #[test]
    fn models_entries_blanks_and_comments_in_order() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\n\t// helper\n\tmp \"github.com/user/pkg\" // pinned\n)\n";
        let block = model(src).unwrap();

        assert_eq!(block.len(), 4);

        assert_eq!(block.lines[0].path, "fmt");
        assert_eq!(block.lines[0].line, 4);

        assert!(block.lines[1].is_blank_separator());
        assert_eq!(block.lines[1].line, 5);

        assert!(block.lines[2].is_comment_only());
        assert_eq!(block.lines[2].comment, " helper");

        assert_eq!(block.lines[3].name.as_deref(), Some("mp"));
        assert_eq!(block.lines[3].comment, " pinned");

        let span = block.span.unwrap();
        assert_eq!(span.open_line, 3);
        assert_eq!(span.close_line, 8);
    }

    #[test]
    fn entry_position_is_first_token_not_line_start() {
        let src = "package main\nimport (\n\t\"fmt\"\n)\n";
        let block = model(src).unwrap();
        let index = LineIndex::build(src.as_bytes());

        // Column 2: the tab occupies column 1.
        assert_eq!(index.line_col_of_byte(block.lines[0].pos), (3, 2));
    }

    #[test]
    fn blank_separator_position_is_line_start() {
        let src = "package main\nimport (\n\t\"fmt\"\n\n\t\"os\"\n)\n";
        let block = model(src).unwrap();
        let index = LineIndex::build(src.as_bytes());

        assert!(block.lines[1].is_blank_separator());
        assert_eq!(index.line_col_of_byte(block.lines[1].pos), (4, 1));
    }

    #[test]
    fn single_bare_import_yields_empty_block() {
        let block = model("package main\n\nimport \"fmt\"\n").unwrap();
        assert!(block.is_empty());
        assert!(block.span.is_none());
    }

    #[test]
    fn cgo_pseudo_import_shifts_spec_indexing() {
        let src = "package main\n\nimport \"C\"\n\nimport (\n\t\"os\"\n\t\"fmt\"\n)\n";
        let block = model(src).unwrap();

        let paths: Vec<_> = block.lines.iter().map(|l| l.path.as_str()).collect();
        assert_eq!(paths, vec!["os", "fmt"]);
        assert_eq!(block.lines[0].line, 6);
    }

    #[test]
    fn two_grouped_declarations_are_malformed() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n)\n\nimport (\n\t\"os\"\n)\n";
        let err = model(src).unwrap_err();
        assert!(err.reason.contains("more than one"));

        let index = LineIndex::build(src.as_bytes());
        assert_eq!(index.line_of_byte(err.offset), 7);
    }

    #[test]
    fn star_comment_inside_block_is_malformed_with_position() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\t/* note */\n\t\"os\"\n)\n";
        let err = model(src).unwrap_err();
        assert!(err.reason.contains("star comment"));

        let index = LineIndex::build(src.as_bytes());
        assert_eq!(index.line_col_of_byte(err.offset), (5, 2));
    }

    #[test]
    fn star_comment_on_open_line_is_malformed() {
        let src = "package main\n\n/* hidden */import (\n\t\"fmt\"\n)\n";
        let err = model(src).unwrap_err();
        assert!(err.reason.contains("star comment"));
    }

    #[test]
    fn second_inline_comment_is_malformed() {
        let src = "package main\n\nimport (\n\t\"fmt\" // one // two\n)\n";
        let err = model(src).unwrap_err();
        assert!(err.reason.contains("multiple inline comments"));
    }

    #[test]
    fn render_round_trips_the_canonical_shape() {
        let src = "package main\n\nimport (\n\t\"fmt\"\n\n\t// helper\n\tmp \"github.com/user/pkg\" // pinned\n)\n";
        let block = model(src).unwrap();

        let expected = "import (\n\t\"fmt\"\n\n\t// helper\n\tmp \"github.com/user/pkg\" // pinned\n)";
        assert_eq!(block.to_string(), expected);
    }
}
