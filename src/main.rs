use clap::Parser;
use dcalc::{toplevel, Config, Interpreter};
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

/// Calculator with variables and single-parameter functions.
#[derive(Parser, Debug)]
#[command(name = "dcalc", version)]
struct Cli {
    /// Evaluate the lines of FILE instead of starting the interactive prompt
    file: Option<PathBuf>,

    /// Nested user-function calls allowed before a recursion error
    #[arg(long, default_value_t = Config::DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Parenthesis depth plus power-chain length allowed on one line
    #[arg(long, default_value_t = Config::DEFAULT_MAX_NESTING)]
    max_nesting: usize,

    /// Expression nodes the evaluator may have open at once, across all calls
    #[arg(long, default_value_t = Config::DEFAULT_MAX_EVAL_DEPTH)]
    max_eval_depth: usize,

    /// Log filter such as `debug` or `dcalc=trace`; overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,
}

fn install_tracing(directive: Option<&str>) {
    let filter = match directive {
        Some(d) => EnvFilter::new(d),
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() {
    let cli = Cli::parse();
    install_tracing(cli.log.as_deref());

    let mut interp = Interpreter::with_config(Config {
        max_call_depth: cli.max_depth,
        max_nesting: cli.max_nesting,
        max_eval_depth: cli.max_eval_depth,
        ..Config::default()
    });

    let result = match &cli.file {
        Some(path) => toplevel::run_file(&mut interp, path),
        None => toplevel::main_loop(&mut interp),
    };

    if let Err(e) = result {
        eprintln!("error: {}", e);
        for cause in e.iter_causes() {
            eprintln!("  caused by: {}", cause);
        }
        process::exit(1);
    }
}
