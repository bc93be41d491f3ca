//! Blank-line hygiene inside function bodies.
//!
//! Three rules, applied everywhere a statement list appears: a `return`
//! that is not the first statement of its list gets a blank line above, a
//! comment-led statement that is not first gets a blank line above its
//! comment, and `case`/`default` clauses never carry blank lines between
//! them.

use crate::ast::*;

pub fn normalize(file: &mut File) {
    struct SpacingPass;

    impl MutVisitor for SpacingPass {
        fn visit_stmt_list(&mut self, stmts: &mut Vec<Stmt>) {
            for (i, stmt) in stmts.iter_mut().enumerate() {
                if i == 0 {
                    continue;
                }
                let is_return = matches!(stmt, Stmt::Return { .. });
                let decor = stmt.decor_mut();
                if is_return || leads_with_line_comment(decor) {
                    decor.before = Spacing::Blank;
                }
            }
        }

        fn visit_stmt(&mut self, stmt: &mut Stmt) {
            match stmt {
                Stmt::Switch(s) => {
                    for case in &mut s.cases {
                        case.decor.before = Spacing::Newline;
                        if let Some(first) = case.body.first_mut() {
                            first.decor_mut().before = Spacing::Newline;
                        }
                    }
                }
                Stmt::Select(s) => {
                    for case in &mut s.cases {
                        case.decor.before = Spacing::Newline;
                        if let Some(first) = case.body.first_mut() {
                            first.decor_mut().before = Spacing::Newline;
                        }
                    }
                }
                _ => {}
            }
        }
    }

    walk_file(file, &mut SpacingPass);
}

fn leads_with_line_comment(decor: &Decor) -> bool {
    decor
        .comments
        .first()
        .is_some_and(|c| c.text.starts_with("//"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codegen::CodeGenerator;
    use crate::parser::GoParser;

    fn pass(source: &str) -> String {
        let mut file = GoParser::new().parse(source, "test.go").unwrap();
        normalize(&mut file);
        CodeGenerator::new().generate(&file).unwrap()
    }

    #[test]
    fn test_blank_line_before_return() {
        let out = pass("package main\n\nfunc f() int {\n\tx := 1\n\ty := 2\n\treturn x + y\n}\n");
        assert!(out.contains("y := 2\n\n\treturn x + y"));
    }

    #[test]
    fn test_lone_return_stays_tight() {
        let out = pass("package main\n\nfunc f() int {\n\treturn 42\n}\n");
        assert!(out.contains("{\n\treturn 42\n}"));
    }

    #[test]
    fn test_return_inside_if_is_first_statement() {
        let out = pass(
            "package main\n\nfunc f(x int) int {\n\tif x < 0 {\n\t\treturn 0\n\t}\n\treturn x\n}\n",
        );
        assert!(out.contains("if x < 0 {\n\t\treturn 0\n\t}\n\n\treturn x"));
    }

    #[test]
    fn test_blank_line_before_comment_led_statement() {
        let out = pass(
            "package main\n\nfunc f() {\n\tx := 1\n\t// about y\n\ty := 2\n\t_ = x\n\t_ = y\n}\n",
        );
        assert!(out.contains("x := 1\n\n\t// about y\n\ty := 2"));
    }

    #[test]
    fn test_no_blank_lines_between_cases() {
        let source = "package main\n\nfunc f(x int) string {\n\tswitch x {\n\n\tcase 1:\n\t\treturn \"one\"\n\n\tdefault:\n\t\treturn \"many\"\n\t}\n}\n";
        let out = pass(source);
        assert!(out.contains("switch x {\n\tcase 1:"));
        assert!(out.contains("\"one\"\n\tdefault:"));
    }

    #[test]
    fn test_select_cases_tightened() {
        let source = "package main\n\nfunc f(ch chan int) {\n\tselect {\n\n\tcase v := <-ch:\n\t\t_ = v\n\n\tdefault:\n\t}\n}\n";
        let out = pass(source);
        assert!(out.contains("select {\n\tcase v := <-ch:"));
        assert!(out.contains("_ = v\n\tdefault:"));
    }
}
