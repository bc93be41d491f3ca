use anyhow::Result;
use clap::Parser;
use colored::Colorize;
use rayon::prelude::*;
use std::path::PathBuf;

use gorefmt::{file_handler::FileHandler, format_go_source, FormatConfig};

#[derive(Parser)]
#[command(name = "gorefmt")]
#[command(version)]
#[command(about = "A highly opinionated Go source code formatter", long_about = None)]
struct Cli {
    #[arg(help = "Files or directories to format")]
    paths: Vec<PathBuf>,

    #[arg(short, long, help = "Check if files are formatted without modifying them")]
    check: bool,

    #[arg(long, help = "Print formatted output to stdout instead of writing to file")]
    stdout: bool,

    #[arg(short, long, help = "Exclude files matching glob pattern (can be repeated)")]
    exclude: Vec<String>,

    #[arg(long, help = "Leave positional composite literals as written")]
    no_keyed_literals: bool,

    #[arg(long, help = "Leave the import block as written")]
    no_group_imports: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.paths.is_empty() {
        eprintln!("{}", "Error: No files or directories specified".red());
        std::process::exit(1);
    }

    let file_handler = FileHandler::new(&cli.exclude)?;
    let files = file_handler.find_go_files(&cli.paths)?;

    if files.is_empty() {
        println!("{}", "No Go files found".yellow());
        return Ok(());
    }

    println!("{} {} files", "Formatting".green(), files.len());

    let config = FormatConfig {
        keyed_literals: !cli.no_keyed_literals,
        group_imports: !cli.no_group_imports,
    };

    let mut had_changes = false;
    let mut had_errors = false;

    // Each file is an independent reorganization; fan out across cores.
    let results: Vec<_> = files
        .par_iter()
        .map(|file| process_file(&file_handler, file, &cli, &config))
        .collect();

    for (file, result) in files.iter().zip(results.iter()) {
        match result {
            Ok(changed) => {
                if *changed {
                    had_changes = true;
                    if cli.check {
                        println!("{} {}", "✗".red(), file.display());
                    } else {
                        println!("{} {}", "✓".green(), file.display());
                    }
                } else {
                    println!("{} {} (no changes)", "✓".green(), file.display());
                }
            }
            Err(e) => {
                had_errors = true;
                eprintln!("{} {}: {:#}", "✗".red(), file.display(), e);
            }
        }
    }

    if cli.check && had_changes {
        eprintln!("\n{}", "Some files are not formatted".red());
        std::process::exit(1);
    }

    if had_errors {
        eprintln!("\n{}", "Some files had errors".red());
        std::process::exit(1);
    }

    println!("\n{}", "All files formatted successfully".green());
    Ok(())
}

fn process_file(
    file_handler: &FileHandler,
    path: &PathBuf,
    cli: &Cli,
    config: &FormatConfig,
) -> Result<bool> {
    let content = file_handler.read_file(path)?;

    let filename = path.to_str().unwrap_or("unknown.go");
    let formatted = format_go_source(&content, filename, config)?;

    if content == formatted {
        return Ok(false);
    }

    if cli.stdout {
        println!("{formatted}");
    } else if !cli.check {
        file_handler.write_file(path, &formatted)?;
    }

    Ok(true)
}
