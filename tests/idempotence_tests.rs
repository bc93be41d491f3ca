// Reorganizing a reorganized file must be a fixed point, at the text level.

use gorefmt::{format_go_source, FormatConfig};
use pretty_assertions::assert_eq;

fn assert_fixed_point(input: &str) {
    let config = FormatConfig::default();
    let once = format_go_source(input, "test.go", &config).unwrap();
    let twice = format_go_source(&once, "test.go", &config).unwrap();
    assert_eq!(once, twice);
}

#[test]
fn test_fixed_point_small_file() {
    assert_fixed_point("package main\n\nfunc main() {}\n");
}

#[test]
fn test_fixed_point_consts_and_vars() {
    assert_fixed_point(
        r#"package config

const retries = 3

const Timeout = 30

var debug = false

var _ = register()

var Verbose = true

func register() bool {
	return true
}
"#,
    );
}

#[test]
fn test_fixed_point_types_and_methods() {
    assert_fixed_point(
        r#"package pool

type Pool struct {
	mu      sync.Mutex
	workers []*worker
	Size    int
}

func NewPool(size int) *Pool {
	return &Pool{Size: size}
}

func (p *Pool) Close() {
	p.mu.Lock()
	defer p.mu.Unlock()
	for _, w := range p.workers {
		w.stop()
	}
}

type worker struct {
	id int
}

func (w *worker) stop() {}
"#,
    );
}

#[test]
fn test_fixed_point_messy_file() {
    assert_fixed_point(
        r#"package mess

import "fmt"

func main() {
	fmt.Println(run())
}

// run drives everything.
func run() int {
	total := 0
	for i := 0; i < 3; i++ {
		total += weight(i)
	}

	switch {
	case total > 10:
		return total
	default:
		return 0
	}
}

var _ = fmt.Sprint

const (
	limit   = 10
	Version = "1.0"
)

type Stats struct {
	count int
	Max   int
	Min   int
}

func weight(n int) int {
	s := Stats{1, 2, 3}
	return s.Max + n
}

func init() {
	fmt.Println("ready")
}
"#,
    );
}

#[test]
fn test_fixed_point_literals_and_nesting() {
    assert_fixed_point(
        r#"package scene

type Point struct {
	Y int
	X int
}

type Shape struct {
	Origin Point
	Name   string
}

var shapes = []Shape{
	{Name: "a", Origin: Point{1, 2}},
	{Origin: Point{Y: 3, X: 4}, Name: "b"},
}

var index = map[string]Point{
	"origin": {0, 0},
}
"#,
    );
}

#[test]
fn test_fixed_point_control_flow_zoo() {
    assert_fixed_point(
        r#"package zoo

func visit(ch chan int, xs []int) int {
	total := 0
	for i, x := range xs {
		if x < 0 {
			continue
		} else if x == 0 {
			total++
		}
		total += i
	}

	select {
	case v := <-ch:
		total += v
	default:
	}

	go func() {
		ch <- total
	}()

	defer close(ch)

	switch v := interface{}(total).(type) {
	case int:
		return v
	default:
		return 0
	}
}
"#,
    );
}
