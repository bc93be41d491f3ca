use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gorefmt::{format_go_source, FormatConfig};

const SAMPLE: &str = r#"package sample

import (
	"github.com/spf13/cobra"
	"fmt"
	"os"
)

func main() {
	fmt.Println(run())
}

var _ = cobra.Command{}

const retries = 3

const Timeout = 30

type Server struct {
	port int
	Host string
	Addr string
}

func (s *Server) handle() {}

func NewServer(host string) *Server {
	return &Server{Host: host, port: 0}
}

func (s *Server) Serve() error {
	s.handle()
	_ = os.Args
	return nil
}

func run() int {
	total := 0
	for i := 0; i < 100; i++ {
		total += i
	}

	return total
}
"#;

fn bench_format(c: &mut Criterion) {
    let config = FormatConfig::default();
    c.bench_function("format_representative_file", |b| {
        b.iter(|| format_go_source(black_box(SAMPLE), "sample.go", &config).unwrap())
    });
}

criterion_group!(benches, bench_format);
criterion_main!(benches);
