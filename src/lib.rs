//! gorefmt — a highly opinionated Go source code formatter.
//!
//! The pipeline is parse → reorganize → generate. Reorganization is where
//! the opinions live: declarations are rebucketed into a fixed file layout
//! (init funcs, merged constants, merged vars, types with their
//! constructors and methods attached, free functions ranked by call-graph
//! layer, main last), struct members are regrouped and alphabetized, and
//! composite literals are rewritten to match. Comments and deliberate
//! blank lines ride along on the nodes they decorate.

pub mod ast;
pub mod callgraph;
pub mod codegen;
pub mod file_handler;
pub mod formatter;
pub mod imports;
pub mod lexer;
pub mod literals;
pub mod organizer;
pub mod parser;
pub mod spacing;
pub mod structs;

use anyhow::{Context, Result};

pub use formatter::{FormatConfig, GoreFormatter};

/// Format Go source with gorefmt's opinionated rules.
///
/// This is the main entry point for programmatic use. Generated files are
/// returned unchanged.
pub fn format_go_source(source: &str, filename: &str, config: &FormatConfig) -> Result<String> {
    let parser = parser::GoParser::new();
    let file = parser
        .parse(source, filename)
        .context("Failed to parse Go source")?;

    if formatter::is_generated(&file) {
        return Ok(source.to_string());
    }

    let formatted = GoreFormatter::with_config(config.clone())
        .format(file)
        .context("Failed to reorganize file")?;

    codegen::CodeGenerator::new()
        .generate(&formatted)
        .context("Failed to print reorganized file")
}
