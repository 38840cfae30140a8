//! Fenced `corefile` snippet extraction.
//!
//! A snippet is the body of a block opened by a line reading `~~~ corefile`
//! or ```` ``` corefile ```` and closed by the bare marker of the same family:
//!
//! ```text
//! ~~~ corefile
//! . {
//!     whoami
//! }
//! ~~~
//! ```
//!
//! Marker lines are compared after trimming surrounding whitespace. Body lines
//! are kept verbatim (only the line terminator is normalised to `\n`), so
//! whitespace-sensitive examples reach the server exactly as documented.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{CorecheckError, Result};

/// Language tag identifying a fenced block as a server configuration example.
pub const CONFIG_LANGUAGE: &str = "corefile";

/// The two supported fence delimiter families.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum FenceStyle {
    /// `~~~`
    Tilde,
    /// ```` ``` ````
    Backtick,
}

impl FenceStyle {
    /// The bare marker that opens (with a language tag) and closes a block.
    pub fn marker(&self) -> &'static str {
        match self {
            FenceStyle::Tilde => "~~~",
            FenceStyle::Backtick => "```",
        }
    }

    /// Recognise an opening line for a configuration block.
    ///
    /// `line` must already be trimmed. Only the exact form `<marker> corefile`
    /// opens a block; other languages and untagged fences do not.
    pub fn parse_open(line: &str) -> Option<FenceStyle> {
        [FenceStyle::Tilde, FenceStyle::Backtick]
            .into_iter()
            .find(|style| {
                line.strip_prefix(style.marker())
                    .and_then(|rest| rest.strip_prefix(' '))
                    .is_some_and(|lang| lang == CONFIG_LANGUAGE)
            })
    }

    /// Whether a trimmed line closes a block opened with this style.
    pub fn is_close(&self, line: &str) -> bool {
        line == self.marker()
    }
}

/// One configuration example lifted out of a document.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ConfigSnippet {
    /// Zero-based position among the document's snippets.
    index: usize,

    /// One-based line number of the opening fence.
    line: usize,

    /// Delimiter family used by the block.
    fence: FenceStyle,

    /// Block contents, each line terminated by `\n`.
    body: String,
}

impl ConfigSnippet {
    /// Create a snippet directly; mostly useful for tests and fakes.
    pub fn new(index: usize, line: usize, fence: FenceStyle, body: impl Into<String>) -> Self {
        Self {
            index,
            line,
            fence,
            body: body.into(),
        }
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn line(&self) -> usize {
        self.line
    }

    pub fn fence(&self) -> FenceStyle {
        self.fence
    }

    /// The configuration text handed to the server.
    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Line-at-a-time fence state machine.
#[derive(Debug, Default)]
struct SnippetScanner {
    snippets: Vec<ConfigSnippet>,
    open: Option<OpenBlock>,
    line_no: usize,
}

#[derive(Debug)]
struct OpenBlock {
    fence: FenceStyle,
    line: usize,
    body: String,
}

impl SnippetScanner {
    fn push_line(&mut self, raw: &str) {
        self.line_no += 1;
        let trimmed = raw.trim();

        match self.open.take() {
            None => {
                if let Some(fence) = FenceStyle::parse_open(trimmed) {
                    self.open = Some(OpenBlock {
                        fence,
                        line: self.line_no,
                        body: String::new(),
                    });
                }
            }
            Some(block) if block.fence.is_close(trimmed) => {
                let index = self.snippets.len();
                self.snippets
                    .push(ConfigSnippet::new(index, block.line, block.fence, block.body));
            }
            Some(mut block) => {
                block.body.push_str(raw.strip_suffix('\r').unwrap_or(raw));
                block.body.push('\n');
                self.open = Some(block);
            }
        }
    }

    /// Completed snippets; an unterminated trailing block is dropped.
    fn finish(self) -> Vec<ConfigSnippet> {
        if let Some(block) = &self.open {
            tracing::debug!(line = block.line, "dropping unterminated corefile block");
        }
        self.snippets
    }
}

/// Extract every configuration snippet from in-memory document text.
pub fn extract_snippets(text: &str) -> Vec<ConfigSnippet> {
    let mut scanner = SnippetScanner::default();
    for line in text.lines() {
        scanner.push_line(line);
    }
    scanner.finish()
}

/// Extract snippets from a buffered reader, failing on the first read error.
///
/// Bytes that are not valid UTF-8 are replaced rather than rejected, so a
/// stray byte in prose never hides the snippets around it.
pub fn read_snippets<R: BufRead>(mut reader: R) -> std::io::Result<Vec<ConfigSnippet>> {
    let mut scanner = SnippetScanner::default();
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let raw = buf.strip_suffix(b"\n").unwrap_or(&buf);
        scanner.push_line(&String::from_utf8_lossy(raw));
    }
    Ok(scanner.finish())
}

/// Open `path` and extract its snippets.
pub fn extract_from_file(path: &Path) -> Result<Vec<ConfigSnippet>> {
    let read_err = |source| CorecheckError::ReadDocument {
        path: path.to_path_buf(),
        source,
    };
    let file = File::open(path).map_err(read_err)?;
    read_snippets(BufReader::new(file)).map_err(read_err)
}
