//! Read a gridscape job into the whiteboard and print it.
//!
//! Usage:
//!   gridscape <job> [iterations] [--aggregate] [--names=<pattern>]
//!
//! Options:
//!   --aggregate          Load results/annual_hourly_ops.csv instead of per-iteration tables
//!   --names=<pattern>    Print only the names matching a glob, e.g. 'Gen*P'

use anyhow::Result;
use gridscape_reader::config::ReaderConfig;
use gridscape_reader::logging::{log, obj, v_str, Domain, Level};
use gridscape_reader::{Ingestor, Whiteboard};
use serde_json::json;

const USAGE: &str = "usage: gridscape <job> [iterations] [--aggregate] [--names=<pattern>]";

struct Args {
    job: u64,
    hint: Option<usize>,
    aggregate: bool,
    names: Option<String>,
}

fn parse_args(raw: &[String]) -> Result<Args, String> {
    let mut positional = Vec::new();
    let mut aggregate = false;
    let mut names = None;
    for arg in raw {
        if arg == "--aggregate" {
            aggregate = true;
        } else if let Some(pat) = arg.strip_prefix("--names=") {
            names = Some(pat.to_string());
        } else if arg.starts_with("--") {
            return Err(format!("unknown option {}", arg));
        } else {
            positional.push(arg.as_str());
        }
    }
    let job = positional
        .first()
        .ok_or("missing job id")?
        .parse::<u64>()
        .map_err(|e| format!("bad job id: {}", e))?;
    let hint = match positional.get(1) {
        Some(v) => Some(v.parse::<usize>().map_err(|e| format!("bad iteration count: {}", e))?),
        None => None,
    };
    Ok(Args {
        job,
        hint,
        aggregate,
        names,
    })
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let raw: Vec<String> = std::env::args().skip(1).collect();
    let args = match parse_args(&raw) {
        Ok(a) => a,
        Err(e) => {
            eprintln!("{}\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    let cfg = ReaderConfig::from_env();
    log(
        Level::Info,
        Domain::System,
        "start",
        obj(&[
            ("job", json!(args.job)),
            ("base_url", v_str(&cfg.base_url)),
            ("cache_root", v_str(&cfg.cache_root.display().to_string())),
            ("local_only", json!(cfg.local_only)),
        ]),
    );

    let ingestor = Ingestor::from_config(&cfg)?;
    let mut wb = Whiteboard::new();
    let report = if args.aggregate {
        ingestor.ingest_aggregate(args.job, &mut wb).await
    } else {
        ingestor.ingest(args.job, args.hint, &mut wb).await
    };

    match &args.names {
        Some(pattern) => {
            for name in wb.names_matching(pattern)? {
                println!("{}", name);
            }
        }
        None => print!("{}", wb.render()),
    }
    if let Some(e) = report.fatal() {
        eprintln!("failed to read job {}: {}", args.job, e);
        std::process::exit(1);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_parse_job_and_hint() {
        let a = parse_args(&args(&["1588", "4"])).unwrap();
        assert_eq!(a.job, 1588);
        assert_eq!(a.hint, Some(4));
        assert!(!a.aggregate);
    }

    #[test]
    fn test_parse_options() {
        let a = parse_args(&args(&["--aggregate", "12", "--names=Gen*P"])).unwrap();
        assert_eq!(a.job, 12);
        assert_eq!(a.hint, None);
        assert!(a.aggregate);
        assert_eq!(a.names.as_deref(), Some("Gen*P"));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_args(&args(&[])).is_err());
        assert!(parse_args(&args(&["x"])).is_err());
        assert!(parse_args(&args(&["1", "--plot"])).is_err());
    }
}
