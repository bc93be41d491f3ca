//! The formatting pipeline.
//!
//! `GoreFormatter` owns the pass order; every pass takes the tree by
//! `&mut` and the whole run is synchronous with no state shared across
//! files, so callers are free to format many files in parallel.

use anyhow::Result;

use crate::ast::File;
use crate::{imports, literals, organizer, spacing, structs};

/// Explicit knobs threaded from the CLI into the engine. No global state.
#[derive(Debug, Clone)]
pub struct FormatConfig {
    /// Rewrite purely positional composite literals into name-tagged form.
    pub keyed_literals: bool,
    /// Regroup the import block (stdlib first, then third-party).
    pub group_imports: bool,
}

impl Default for FormatConfig {
    fn default() -> Self {
        FormatConfig {
            keyed_literals: true,
            group_imports: true,
        }
    }
}

pub struct GoreFormatter {
    config: FormatConfig,
}

impl Default for GoreFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl GoreFormatter {
    pub fn new() -> Self {
        Self::with_config(FormatConfig::default())
    }

    pub fn with_config(config: FormatConfig) -> Self {
        Self { config }
    }

    pub fn format(&self, mut file: File) -> Result<File> {
        // Positional literals bind to the member order as written, so the
        // conversion must see the tree before field normalization.
        if self.config.keyed_literals {
            let source_orders = structs::collect_source_field_orders(&file);
            literals::convert_positional_to_keyed(&mut file, &source_orders);
        }

        let member_orders = structs::collect_struct_definitions(&file);
        structs::reorder_struct_fields(&mut file);
        literals::reorder_struct_literals(&mut file, &member_orders);

        let decls = std::mem::take(&mut file.decls);
        file.decls = organizer::reorder_declarations(decls)?;

        if self.config.group_imports {
            imports::group_imports(&mut file);
        }
        spacing::normalize(&mut file);

        Ok(file)
    }
}

/// Conventional generated-file markers in the file's leading comment.
pub fn is_generated(file: &File) -> bool {
    let Some(first) = file.decor.comments.first() else {
        return false;
    };
    const MARKERS: [&str; 6] = [
        "// Code generated",
        "// DO NOT EDIT",
        "// GENERATED",
        "// Autogenerated",
        "// auto-generated",
        "// Automatically generated",
    ];
    MARKERS.iter().any(|marker| first.text.starts_with(marker))
}
