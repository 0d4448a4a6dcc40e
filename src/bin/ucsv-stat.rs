use std::env;
use std::ffi::OsString;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process;

use tracing_subscriber::EnvFilter;
use ucsv::{EncodingMode, ParseOutcome, ParserBuilder, Table};

const DEFAULT_PATH: &str = "assets/sample.csv";

const USAGE: &str = "\
Print the shape of a CSV file.

USAGE:
    ucsv-stat [PATH] [--detect]

PATH defaults to assets/sample.csv. With --detect, the encoding is taken
from a leading byte order mark instead of assuming UTF-8.

Set UCSV_LOG (e.g. UCSV_LOG=debug) to log to stderr.
";

#[derive(Debug)]
struct Args {
    path: PathBuf,
    detect: bool,
}

impl Args {
    fn parse<I: IntoIterator<Item = OsString>>(
        it: I,
    ) -> Result<Option<Args>, String> {
        let mut path = None;
        let mut detect = false;
        for arg in it {
            if arg == "-h" || arg == "--help" {
                return Ok(None);
            } else if arg == "--detect" {
                detect = true;
            } else if arg != "-" && arg.to_string_lossy().starts_with('-') {
                return Err(format!(
                    "unrecognized flag: {}",
                    arg.to_string_lossy()
                ));
            } else if path.is_some() {
                return Err(format!(
                    "expected at most 1 path, but got another: {:?}",
                    arg
                ));
            } else {
                path = Some(PathBuf::from(arg));
            }
        }
        Ok(Some(Args {
            path: path.unwrap_or_else(|| PathBuf::from(DEFAULT_PATH)),
            detect: detect,
        }))
    }
}

fn run(args: &Args) -> ucsv::Result<Table> {
    let mode = if args.detect {
        EncodingMode::DetectFromBom
    } else {
        EncodingMode::Utf8
    };
    ParserBuilder::new().encoding(mode).build().parse_path(&args.path)
}

fn main() {
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_env("UCSV_LOG")
                .unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .init();

    let args = match Args::parse(env::args_os().skip(1)) {
        Ok(Some(args)) => args,
        Ok(None) => {
            print!("{}", USAGE);
            return;
        }
        Err(msg) => {
            eprintln!("{}\n\n{}", msg, USAGE);
            process::exit(ParseOutcome::ArgumentError.code());
        }
    };
    match run(&args) {
        Ok(table) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            let res = writeln!(out, "column count: {}", table.column_count())
                .and_then(|_| writeln!(out, "row count: {}", table.len()));
            if let Err(err) = res {
                if err.kind() != io::ErrorKind::BrokenPipe {
                    eprintln!("{}", err);
                    process::exit(1);
                }
            }
        }
        Err(err) => {
            eprintln!("{}", err);
            process::exit(err.outcome().code());
        }
    }
}
