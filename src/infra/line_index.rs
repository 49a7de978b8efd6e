//! Full-file line-start offset table.
//!
//! Goals
//! - Single pass over bytes to record the start offset of every line.
//! - 1-based external line numbers (friendly for diagnostics).
//! - O(1) line→byte start via the table.
//! - Binary search for byte→line and byte→column mapping.
//!
//! Notes
//! - An empty buffer has 0 lines.
//! - A non-empty buffer without '\n' has 1 line.
//! - A trailing '\n' opens a final empty line, matching how editors count.

/// Byte offsets of every line start in a buffer.
#[derive(Debug, Clone)]
pub struct LineIndex {
    /// Start offset of each line; `line_starts[0] == 0` for non-empty input.
    line_starts: Vec<usize>,
    /// Total byte length of the buffer.
    len: usize,
}

impl LineIndex {
    /// Build the table by recording the byte after every '\n'.
    pub fn build(bytes: &[u8]) -> Self {
        let mut line_starts = Vec::with_capacity(bytes.len() / 32 + 1);
        if !bytes.is_empty() {
            line_starts.push(0);
        }

        let mut i = 0usize;
        while let Some(pos) = memchr::memchr(b'\n', &bytes[i..]) {
            let abs = i + pos;
            line_starts.push(abs + 1);
            i = abs + 1;
        }

        Self {
            line_starts,
            len: bytes.len(),
        }
    }

    /// Total number of logical lines. Empty buffer => 0 lines.
    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    /// Start byte (inclusive) of a 1-based line.
    /// Returns None if line is out of range.
    pub fn start_of_line(&self, line1: usize) -> Option<usize> {
        if line1 == 0 {
            return None;
        }
        self.line_starts.get(line1 - 1).copied()
    }

    /// End byte (exclusive, excluding the '\n' and any '\r' before it)
    /// of a 1-based line.
    pub fn end_of_line(&self, line1: usize, bytes: &[u8]) -> Option<usize> {
        let start = self.start_of_line(line1)?;
        let end = match self.line_starts.get(line1) {
            // Next line start minus the '\n' itself.
            Some(&next) => next - 1,
            // Last line runs to EOF.
            None => self.len,
        };
        let end = if end > start && bytes.get(end - 1) == Some(&b'\r') {
            end - 1
        } else {
            end
        };
        Some(end)
    }

    /// 1-based line number covering the given byte offset.
    /// Offsets at '\n' belong to that line; the byte after it starts the next.
    /// Returns 0 for empty buffers.
    pub fn line_of_byte(&self, byte: usize) -> usize {
        // Number of line starts at or before `byte`.
        self.line_starts.partition_point(|&s| s <= byte)
    }

    /// 1-based (line, column) of a byte offset. Column counts bytes from the
    /// line start, so a tab-indented token at offset start+1 is column 2.
    pub fn line_col_of_byte(&self, byte: usize) -> (usize, usize) {
        let line = self.line_of_byte(byte);
        if line == 0 {
            return (0, 0);
        }
        let start = self.line_starts[line - 1];
        (line, byte - start + 1)
    }
}
