use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_subscriber::filter::{EnvFilter, LevelFilter};

use esdate::repl::Session;
use esdate::{DateBuiltin, DateConfig, HostZone, UtcMode};

#[derive(Parser)]
#[command(name = "esdate", version, about = "Evaluate ECMAScript Date expressions")]
struct Cli {
    /// File with one expression per line
    file: Option<PathBuf>,

    /// Evaluate a single expression
    #[arg(short = 'e', long = "eval")]
    eval: Option<String>,

    /// Local time zone: `local`, `utc`, an IANA name such as `Europe/Berlin`, or an offset such as `+05:30`
    #[arg(long, env = "ESDATE_ZONE", default_value = "local")]
    zone: HostZone,

    /// How `Date.UTC` resolves its components: `calendar` or `local-delegate`
    #[arg(long, env = "ESDATE_UTC_MODE", default_value = "calendar")]
    utc_mode: UtcMode,
}

/// Evaluates every non-blank line, stopping at the first uncaught error.
fn execute_code(session: &mut Session, code: &str) -> ExitCode {
    for line in code.lines() {
        match session.eval_line(line) {
            Ok(Some(output)) => println!("{output}"),
            Ok(None) => {}
            Err(e) => {
                eprintln!("Uncaught {e}");
                return ExitCode::from(1);
            }
        }
    }
    ExitCode::SUCCESS
}

fn run_file(session: &mut Session, path: &Path) -> ExitCode {
    let source = match std::fs::read_to_string(path) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("Error reading {}: {e}", path.display());
            return ExitCode::from(1);
        }
    };
    execute_code(session, &source)
}

fn run_repl(session: &mut Session) -> ExitCode {
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    println!("esdate v{}", env!("CARGO_PKG_VERSION"));
    println!(
        "Local zone: {}. Type Date expressions. Press Ctrl-D to exit.",
        session.date().zone().name()
    );

    loop {
        print!("> ");
        if stdout.flush().is_err() {
            break;
        }

        let mut line = String::new();
        let read_result = stdin.lock().read_line(&mut line);

        match read_result {
            Ok(0) => break,
            Ok(_) => match session.eval_line(&line) {
                Ok(Some(output)) => println!("{output}"),
                Ok(None) => {}
                Err(e) => eprintln!("Uncaught {e}"),
            },
            Err(e) => {
                eprintln!("Read error: {e}");
                return ExitCode::from(1);
            }
        }
    }

    println!();
    ExitCode::SUCCESS
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::WARN.into())
                .from_env_lossy(),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    tracing::debug!(zone = %cli.zone, utc_mode = %cli.utc_mode, "starting");

    let config = DateConfig::default()
        .with_zone(cli.zone)
        .with_utc_mode(cli.utc_mode);
    let mut session = Session::new(DateBuiltin::new(config));

    if let Some(code) = &cli.eval {
        return execute_code(&mut session, code);
    }

    if let Some(path) = &cli.file {
        return run_file(&mut session, path);
    }

    run_repl(&mut session)
}
