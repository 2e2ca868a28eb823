use std::path::PathBuf;

use clap::{Parser, Subcommand};
use countdown_cli::commands;
use countdown_cli::logging;
use countdown_cli::{CliContext, Repl};
use countdown_core::CountdownKey;
use std::io::Write;

#[derive(Parser)]
#[command(version, about = "Interactive countdown timer demo")]
struct Args {
    /// Milliseconds per tick (overrides the config file)
    #[arg(long)]
    tick_ms: Option<u64>,

    /// Config file to use instead of the default location
    #[arg(long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let args = Args::parse();
    logging::init();

    let ctx = CliContext::new(args.config.as_deref(), args.tick_ms)?;
    let mut repl = Repl::new();

    while let Some(line) = repl.readline().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        match respond(line, &ctx) {
            Ok(quit) => {
                if quit {
                    break;
                }
            }
            Err(err) => {
                writeln!(std::io::stdout(), "{err}").map_err(|e| e.to_string())?;
                std::io::stdout().flush().map_err(|e| e.to_string())?;
            }
        }
    }

    Ok(())
}

#[derive(Parser)]
#[command(version, about = "countdown")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    Start {
        #[arg(short, long)]
        key: CountdownKey,
        #[arg(short, long, allow_negative_numbers = true)]
        count: i64,
    },
    Stop {
        #[arg(short, long)]
        key: CountdownKey,
    },
    Resume {
        #[arg(short, long)]
        key: CountdownKey,
    },
    Status {
        #[arg(short, long)]
        key: Option<CountdownKey>,
    },
    StopAll,
    ResumeAll,
    Config,
    Exit,
}

fn respond(line: &str, ctx: &CliContext) -> Result<bool, String> {
    let mut args = shlex::split(line).ok_or("error: Invalid quoting")?;
    args.insert(0, "countdown".to_string());
    let cli = Cli::try_parse_from(args).map_err(|e| e.to_string())?;

    match &cli.command {
        Some(Commands::Start { key, count }) => commands::start(ctx, *key, *count)?,
        Some(Commands::Stop { key }) => commands::stop(ctx, *key)?,
        Some(Commands::Resume { key }) => commands::resume(ctx, *key)?,
        Some(Commands::Status { key }) => commands::show_status(ctx, *key)?,
        Some(Commands::StopAll) => commands::stop_all(ctx),
        Some(Commands::ResumeAll) => commands::resume_all(ctx),
        Some(Commands::Config) => commands::show_config(ctx),
        Some(Commands::Exit) => {
            commands::exit(ctx)?;
            return Ok(true);
        }
        None => {}
    }
    Ok(false)
}
