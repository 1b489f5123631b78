use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use env_logger::Env;
use log::error;

use keyspace_cracker::{
    crack_archive, extract_entries, format_elapsed, resolve_workers, Outcome, Reporter,
    SearchConfig, DEFAULT_ALPHABET, DEFAULT_LENGTH, DEFAULT_OUTPUT,
};

const EXIT_NOT_FOUND: u8 = 2;
const EXIT_TIMED_OUT: u8 = 3;

#[derive(Parser, Debug)]
struct Args {
    #[arg(short, long, help = "The encrypted ZIP file", default_value = "emergency_storage_key.zip")]
    pub file: PathBuf,
    #[arg(short, long, help = "Enables debug logging")]
    pub verbose: bool,
    #[arg(short, long, default_value_t = String::from(DEFAULT_ALPHABET))]
    pub charset: String,
    #[arg(
        short,
        long,
        default_value_t = DEFAULT_LENGTH,
        help = "The exact length of the password"
    )]
    pub length: usize,
    #[arg(
        short,
        long,
        default_value_t = 0,
        help = "Number of threads to use, 0 defaults to the number of CPU cores"
    )]
    pub thread_count: usize,
    #[arg(short, long, help = "Where to write the recovered password", default_value = DEFAULT_OUTPUT)]
    pub output: PathBuf,
    #[arg(short = 'x', long, help = "Extract the decrypted entries into this directory")]
    pub extract: Option<PathBuf>,
    #[arg(long, default_value_t = 50, help = "How often the workers are checked, in milliseconds")]
    pub poll_interval_ms: u64,
    #[arg(long, default_value_t = 10, help = "Seconds between progress lines, 0 disables them")]
    pub progress_secs: u64,
    #[arg(long, help = "Give up after this many seconds")]
    pub timeout_secs: Option<u64>,
}

fn main() -> ExitCode {
    let args = Args::parse();
    let level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(Env::default().default_filter_or(level)).init();

    match run(args) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: Args) -> anyhow::Result<ExitCode> {
    let config = SearchConfig::new(&args.charset, args.length, resolve_workers(args.thread_count))?
        .with_poll_interval(Duration::from_millis(args.poll_interval_ms))?
        .with_progress_interval(Some(Duration::from_secs(args.progress_secs)))
        .with_timeout(args.timeout_secs.map(Duration::from_secs));

    let report = crack_archive(&args.file, config)
        .with_context(|| format!("Failed to crack {}", args.file.display()))?;

    match report.outcome {
        Outcome::Found(recovered) => {
            println!("Password found: {}", recovered.password);
            println!(
                "Tried {} passwords in {}",
                report.attempts,
                format_elapsed(report.elapsed)
            );

            // The password is already on the console, so a failed write only gets logged.
            if let Err(e) = Reporter::new(&args.output).write(&recovered.password, report.elapsed) {
                error!("{e}: {}", e.source);
            }
            if let Some(dir) = &args.extract {
                if let Err(e) = extract_entries(dir, &recovered.extracted) {
                    error!("{e}: {}", e.source);
                }
            }
            Ok(ExitCode::SUCCESS)
        }
        Outcome::NotFound => {
            println!(
                "Password not found after {} attempts in {}",
                report.attempts,
                format_elapsed(report.elapsed)
            );
            Ok(ExitCode::from(EXIT_NOT_FOUND))
        }
        Outcome::TimedOut => {
            println!(
                "Gave up after {} attempts in {}",
                report.attempts,
                format_elapsed(report.elapsed)
            );
            Ok(ExitCode::from(EXIT_TIMED_OUT))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["keyspace_cracker"]);
        assert_eq!(args.file, PathBuf::from("emergency_storage_key.zip"));
        assert_eq!(args.charset, DEFAULT_ALPHABET);
        assert_eq!(args.length, 6);
        assert_eq!(args.thread_count, 0);
        assert_eq!(args.output, PathBuf::from("password.txt"));
        assert_eq!(args.timeout_secs, None);
    }

    #[test]
    fn short_flags() {
        let args = Args::parse_from([
            "keyspace_cracker",
            "-f",
            "secret.zip",
            "-c",
            "01",
            "-l",
            "3",
            "-t",
            "2",
            "-x",
            "out",
        ]);
        assert_eq!(args.file, PathBuf::from("secret.zip"));
        assert_eq!(args.charset, "01");
        assert_eq!(args.length, 3);
        assert_eq!(args.thread_count, 2);
        assert_eq!(args.extract, Some(PathBuf::from("out")));
    }
}
