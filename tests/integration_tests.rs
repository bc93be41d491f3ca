use gorefmt::{format_go_source, FormatConfig};
use pretty_assertions::assert_eq;

fn format_code(input: &str) -> String {
    format_go_source(input, "test.go", &FormatConfig::default()).unwrap()
}

#[test]
fn test_end_to_end_reorganization() {
    let input = r#"package main

const z = "z"

const a = "a"

func (t *T) M() {}

type T struct {
	b int
	A string
}
"#;

    let expected = r#"package main

const (
	a = "a"
	z = "z"
)

type T struct {
	A string

	b int
}

func (t *T) M() {}
"#;

    assert_eq!(format_code(input), expected);
}

#[test]
fn test_import_organization_complete() {
    let input = r#"package server

import (
	"github.com/spf13/cobra"
	"os"
	"fmt"
	"golang.org/x/mod/modfile"
	"net/http"
)

func run() {
	fmt.Println(os.Args)
	_ = http.DefaultClient
	_ = cobra.Command{}
	_ = modfile.File{}
}
"#;

    let result = format_code(input);

    let import_lines: Vec<&str> = result
        .lines()
        .map(str::trim)
        .filter(|line| line.starts_with('"'))
        .collect();
    assert_eq!(
        import_lines,
        vec![
            "\"fmt\"",
            "\"net/http\"",
            "\"os\"",
            "\"github.com/spf13/cobra\"",
            "\"golang.org/x/mod/modfile\"",
        ]
    );

    // Blank line between the stdlib and external groups.
    assert!(result.contains("\"os\"\n\n\t\"github.com/spf13/cobra\""));

    // The rest of the code survives.
    assert!(result.contains("func run() {"));
    assert!(result.contains("fmt.Println(os.Args)"));
}

#[test]
fn test_types_carry_constructors_and_methods() {
    let input = r#"package server

func (s *Server) privateMethod() {}

func NewServer() *Server {
	return &Server{}
}

type Server struct {
	port int
	Host string
}

func (s *Server) PublicMethod() {}

func NewServerWithOptions(host string) *Server {
	return &Server{Host: host}
}
"#;

    let result = format_code(input);

    let ty = result.find("type Server struct").unwrap();
    let new_server = result.find("func NewServer()").unwrap();
    let new_with_options = result.find("func NewServerWithOptions(").unwrap();
    let public = result.find("func (s *Server) PublicMethod()").unwrap();
    let private = result.find("func (s *Server) privateMethod()").unwrap();

    // Type first, then constructors sorted by name, then methods with
    // exported ones leading.
    assert!(ty < new_server);
    assert!(new_server < new_with_options);
    assert!(new_with_options < public);
    assert!(public < private);
}

#[test]
fn test_init_first_main_last() {
    let input = r#"package main

import "fmt"

func helper() {
	fmt.Println("helper")
}

func main() {
	helper()
}

func init() {
	fmt.Println("init")
}
"#;

    let result = format_code(input);

    let init = result.find("func init()").unwrap();
    let helper = result.find("func helper()").unwrap();
    let main_fn = result.find("func main()").unwrap();
    assert!(init < helper);
    assert!(helper < main_fn);
    assert!(result.trim_end().ends_with("}"));
}

#[test]
fn test_iota_blocks_stay_separate() {
    let input = r#"package main

const (
	PriorityLow Priority = iota
	PriorityMedium
	PriorityHigh
)

const name = "x"

type Priority int
"#;

    let result = format_code(input);

    // The plain constant comes first, the iota block stays intact after it.
    let name_pos = result.find("const name = \"x\"").unwrap();
    let iota_pos = result.find("PriorityLow Priority = iota").unwrap();
    assert!(name_pos < iota_pos);
    assert!(result.contains("const (\n\tPriorityLow Priority = iota\n\tPriorityMedium\n\tPriorityHigh\n)"));
}

#[test]
fn test_positional_literals_become_keyed() {
    let input = r#"package main

type PositionalTest struct {
	Name string
	Age  int
	City string
}

func createPositional() *PositionalTest {
	return &PositionalTest{"John", 30, "NYC"}
}
"#;

    let result = format_code(input);
    assert!(result.contains("&PositionalTest{Age: 30, City: \"NYC\", Name: \"John\"}"));
}

#[test]
fn test_foreign_literals_untouched() {
    let input = r#"package main

import "image"

func corner() image.Point {
	return image.Point{1, 2}
}
"#;

    let result = format_code(input);
    assert!(result.contains("image.Point{1, 2}"));
}

#[test]
fn test_literal_inside_method_reordered() {
    let input = r#"package main

type Config struct {
	debug   bool
	Verbose bool
	Timeout int
}

func NewConfigWithDefaults() *Config {
	return &Config{Verbose: true, debug: false, Timeout: 30}
}
"#;

    let result = format_code(input);
    assert!(result.contains("&Config{Timeout: 30, Verbose: true, debug: false}"));
}

#[test]
fn test_orphan_method_kept_after_types() {
    let input = r#"package main

func (w *Widget) Draw() {}

type Server struct{}
"#;

    let result = format_code(input);
    let ty = result.find("type Server struct{}").unwrap();
    let orphan = result.find("func (w *Widget) Draw()").unwrap();
    assert!(ty < orphan);
}

#[test]
fn test_generated_file_passes_through() {
    let input = "// Code generated by stringer. DO NOT EDIT.\npackage main\n\nconst z = 1\n\nconst a = 2\n";
    assert_eq!(format_code(input), input);
}

#[test]
fn test_blank_line_before_return_added() {
    let input = r#"package main

func sum() int {
	x := 1
	y := 2
	return x + y
}
"#;

    let result = format_code(input);
    assert!(result.contains("y := 2\n\n\treturn x + y"));
}

#[test]
fn test_switch_cases_tightened() {
    let input = r#"package main

func classify(x int) string {
	switch x {

	case 1:
		return "one"

	default:
		return "many"
	}
}
"#;

    let result = format_code(input);
    assert!(result.contains("switch x {\n\tcase 1:\n\t\treturn \"one\"\n\tdefault:\n\t\treturn \"many\"\n\t}"));
}

#[test]
fn test_comments_move_with_their_declarations() {
    let input = r#"package main

// M does the thing.
func (t *T) M() {}

// T is the thing.
type T struct{}
"#;

    let result = format_code(input);
    assert!(result.contains("// T is the thing.\ntype T struct{}"));
    assert!(result.contains("// M does the thing.\nfunc (t *T) M() {}"));
    let ty = result.find("type T").unwrap();
    let method = result.find("func (t *T) M()").unwrap();
    assert!(ty < method);
}

#[test]
fn test_var_block_merges_with_discards_first() {
    let input = r#"package main

var globalZ = 10

var _ Checker = (*Server)(nil)

var GlobalPublic = "public"

type Checker interface {
	Check() error
}

type Server struct{}

func (s *Server) Check() error {
	return nil
}
"#;

    let result = format_code(input);
    assert!(result.contains("var (\n\t_ Checker = (*Server)(nil)\n\n\tGlobalPublic = \"public\"\n\n\tglobalZ = 10\n)"));
}

#[test]
fn test_functions_ranked_by_call_depth() {
    let input = r#"package main

func leaf() int {
	return 1
}

func mid() int {
	return leaf()
}

func top() int {
	return mid() + leaf()
}
"#;

    let result = format_code(input);
    let top = result.find("func top()").unwrap();
    let mid = result.find("func mid()").unwrap();
    let leaf = result.find("func leaf()").unwrap();
    assert!(top < mid);
    assert!(mid < leaf);
}

#[test]
fn test_parse_error_reported() {
    let result = format_go_source("package main\n\nfunc {\n", "broken.go", &FormatConfig::default());
    assert!(result.is_err());
}
