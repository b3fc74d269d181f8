//! CLI entry point: reads the bracket/arrow DSL from a file or stdin,
//! renders it to ASCII, and writes it to a file or stdout.

use std::fs;
use std::io::{self, Read, Write};
use std::process;

use clap::Parser;

use asciigraph_core::parser;

#[derive(Parser, Debug)]
#[command(name = "asciigraph", about = "Declarative graph to ASCII-art layout")]
struct Cli {
    /// Input file (reads from stdin if not provided)
    input: Option<String>,

    /// Write output to this file instead of stdout
    #[arg(short = 'o', long = "output")]
    output: Option<String>,
}

fn main() {
    if std::env::var("RUST_LOG").is_ok() {
        tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .init();
    }

    let cli = Cli::parse();

    let text = if let Some(ref path) = cli.input {
        match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                eprintln!("error: cannot read '{path}': {e}");
                process::exit(1);
            }
        }
    } else {
        let mut buf = String::new();
        if let Err(e) = io::stdin().read_to_string(&mut buf) {
            eprintln!("error: cannot read stdin: {e}");
            process::exit(1);
        }
        buf
    };

    let mut graph = match parser::parse(&text) {
        Ok(g) => g,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    let rendered = match graph.as_ascii() {
        Ok(s) => s,
        Err(e) => {
            eprintln!("error: {e}");
            process::exit(1);
        }
    };

    if let Some(ref path) = cli.output {
        match fs::write(path, rendered) {
            Ok(()) => {}
            Err(e) => {
                eprintln!("error: cannot write '{path}': {e}");
                process::exit(1);
            }
        }
    } else {
        print!("{rendered}");
        if let Err(e) = io::stdout().flush() {
            eprintln!("error: cannot flush stdout: {e}");
            process::exit(1);
        }
    }
}
