//! vecfunc SQL shell
//!
//! Runs each SQL argument against a DataFusion session with the vector
//! functions loaded and prints the results as tables.

use anyhow::{bail, Context, Result};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use vecfunc_core::{ExtensionConfig, VectorExtension};

const USAGE: &str = "usage: vecfunc [--config FILE] [--json-logs] [--] SQL...";

#[derive(Debug, Default, PartialEq)]
struct Args {
    config: Option<PathBuf>,
    json_logs: bool,
    help: bool,
    statements: Vec<String>,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Args> {
    let mut parsed = Args::default();
    let mut args = args.into_iter();

    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" => {
                let Some(path) = args.next() else {
                    bail!("--config needs a file path\n{USAGE}");
                };
                parsed.config = Some(PathBuf::from(path));
            }
            "--json-logs" => parsed.json_logs = true,
            "-h" | "--help" => {
                parsed.help = true;
                return Ok(parsed);
            }
            "--" => {
                parsed.statements.extend(args.by_ref());
                break;
            }
            _ => parsed.statements.push(arg),
        }
    }

    if parsed.statements.is_empty() {
        bail!("no SQL given\n{USAGE}");
    }
    Ok(parsed)
}

fn load_config(path: Option<&Path>) -> Result<ExtensionConfig> {
    match path {
        Some(path) => ExtensionConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display())),
        None => Ok(ExtensionConfig::default()),
    }
}

// Logs go to stderr so query output on stdout stays clean.
fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = parse_args(std::env::args().skip(1))?;
    if args.help {
        println!("{USAGE}");
        return Ok(());
    }
    init_logging(args.json_logs);

    let config = load_config(args.config.as_deref())?;
    let ctx = VectorExtension::new(config)?.session_context();

    for sql in &args.statements {
        tracing::debug!(%sql, "executing statement");
        let df = ctx
            .sql(sql)
            .await
            .with_context(|| format!("failed to plan: {sql}"))?;
        df.show()
            .await
            .with_context(|| format!("failed to execute: {sql}"))?;
    }

    Ok(())
}
