/*!
 * Output formatting for a walked selection
 */

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::types::TraversalResult;

pub const TREE_HEADER: &str = "Directory Structure:";
pub const CONTENTS_HEADER: &str = "File Contents:";

/// Output format of the writer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Headers, tree and file contents as plain text
    #[default]
    Text,
    /// The whole traversal result as pretty JSON
    Json,
}

/// Combines a traversal result into the single string handed to the caller
#[derive(Debug, Clone, Default)]
pub struct ContextWriter {
    format: OutputFormat,
}

impl ContextWriter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Render `result` in the configured format
    pub fn render(&self, result: &TraversalResult) -> Result<String> {
        match self.format {
            OutputFormat::Text => Ok(render_text(result)),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(result)?),
        }
    }

    /// Write already rendered output to a file, or to stdout when `path` is None
    pub fn write(&self, output: &str, path: Option<&Path>) -> io::Result<()> {
        match path {
            Some(path) => {
                let mut writer = BufWriter::new(File::create(path)?);
                writer.write_all(output.as_bytes())?;
                writer.flush()
            }
            None => {
                let stdout = io::stdout();
                let mut handle = stdout.lock();
                handle.write_all(output.as_bytes())?;
                if !output.ends_with('\n') {
                    handle.write_all(b"\n")?;
                }
                handle.flush()
            }
        }
    }
}

fn render_text(result: &TraversalResult) -> String {
    let mut output = format!("{}\n{}\n", TREE_HEADER, result.tree());

    if !result.content_blocks.is_empty() {
        output.push('\n');
        output.push_str(CONTENTS_HEADER);
        output.push_str(&result.contents());
    }

    output
}
