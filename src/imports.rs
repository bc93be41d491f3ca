//! Import block grouping.
//!
//! The reorganization core passes imports through untouched; this optional
//! pass then rebuilds the block with standard-library imports first and
//! third-party imports after, one blank line between the groups, paths
//! sorted within each.

use crate::ast::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportCategory {
    /// Standard library (first path segment carries no dot).
    Std,
    /// Everything fetched from a module host.
    External,
}

#[derive(Debug, Clone)]
pub struct ImportInfo {
    pub category: ImportCategory,
    pub path: String,
    pub spec: ImportSpec,
}

pub fn categorize_import(path: &str) -> ImportCategory {
    let first_segment = path.split('/').next().unwrap_or(path);
    if first_segment.contains('.') {
        ImportCategory::External
    } else {
        ImportCategory::Std
    }
}

/// Sort by category first (Std < External), then alphabetically by path
/// within each category.
pub fn sort_imports(mut imports: Vec<ImportInfo>) -> Vec<ImportInfo> {
    let category_order = |category: ImportCategory| match category {
        ImportCategory::Std => 0,
        ImportCategory::External => 1,
    };
    imports.sort_by(|a, b| {
        category_order(a.category)
            .cmp(&category_order(b.category))
            .then_with(|| a.path.cmp(&b.path))
    });
    imports
}

/// Collapses every import declaration of the file into one sorted, grouped
/// block at the position of the first one.
pub fn group_imports(file: &mut File) {
    let decls = std::mem::take(&mut file.decls);
    let mut rest = Vec::new();
    let mut specs = Vec::new();
    let mut block_decor: Option<Decor> = None;

    for decl in decls {
        match decl {
            Decl::Gen(d) if d.kind == DeclKind::Import => {
                if block_decor.is_none() {
                    block_decor = Some(d.decor);
                }
                for spec in d.specs {
                    if let Spec::Import(s) = spec {
                        specs.push(s);
                    }
                }
            }
            other => rest.push(other),
        }
    }

    let Some(decor) = block_decor else {
        file.decls = rest;
        return;
    };

    let infos: Vec<ImportInfo> = specs
        .into_iter()
        .map(|spec| ImportInfo {
            category: categorize_import(&spec.path),
            path: spec.path.clone(),
            spec,
        })
        .collect();
    let sorted = sort_imports(infos);

    let grouped = sorted.len() > 1;
    let mut last_category = None;
    let mut import_specs = Vec::new();
    for info in sorted {
        let mut spec = info.spec;
        spec.decor.before = match last_category {
            Some(last) if last != info.category => Spacing::Blank,
            _ => Spacing::Newline,
        };
        last_category = Some(info.category);
        import_specs.push(Spec::Import(spec));
    }

    let mut decls = Vec::with_capacity(rest.len() + 1);
    decls.push(Decl::Gen(GenDecl {
        decor,
        kind: DeclKind::Import,
        grouped,
        specs: import_specs,
    }));
    decls.extend(rest);
    file.decls = decls;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CodeGenerator;
    use crate::parser::GoParser;

    fn regroup(source: &str) -> String {
        let mut file = GoParser::new().parse(source, "test.go").unwrap();
        group_imports(&mut file);
        CodeGenerator::new().generate(&file).unwrap()
    }

    #[test]
    fn test_categorize_import() {
        assert_eq!(categorize_import("fmt"), ImportCategory::Std);
        assert_eq!(categorize_import("net/http"), ImportCategory::Std);
        assert_eq!(
            categorize_import("github.com/spf13/cobra"),
            ImportCategory::External
        );
        assert_eq!(categorize_import("golang.org/x/mod"), ImportCategory::External);
    }

    #[test]
    fn test_std_before_external_sorted() {
        let out = regroup(
            "package main\n\nimport (\n\t\"github.com/a/b\"\n\t\"os\"\n\t\"fmt\"\n)\n",
        );
        assert_eq!(
            out,
            "package main\n\nimport (\n\t\"fmt\"\n\t\"os\"\n\n\t\"github.com/a/b\"\n)\n"
        );
    }

    #[test]
    fn test_separate_import_decls_merge() {
        let out = regroup("package main\n\nimport \"os\"\n\nimport \"fmt\"\n");
        assert!(out.contains("import (\n\t\"fmt\"\n\t\"os\"\n)"));
    }

    #[test]
    fn test_single_import_stays_plain() {
        let out = regroup("package main\n\nimport \"fmt\"\n");
        assert!(out.contains("import \"fmt\""));
        assert!(!out.contains("import ("));
    }

    #[test]
    fn test_aliases_survive() {
        let out = regroup(
            "package main\n\nimport (\n\t_ \"embed\"\n\tstdfmt \"fmt\"\n)\n",
        );
        assert!(out.contains("_ \"embed\""));
        assert!(out.contains("stdfmt \"fmt\""));
    }
}
