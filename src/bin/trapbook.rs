//! Command-line front end for a trap library stored in a JSON directory.

use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use serde::Serialize;

use trapbook::config::LibraryConfig;
use trapbook::explorer::{ExplorerSession, MoveLookup};
use trapbook::import::{line_name_from_file_stem, ImportRequest};
use trapbook::rules::RulesEngine;
use trapbook::store::LinePattern;
use trapbook::{Side, SourceTag, TrapLibrary};

#[derive(Parser, Debug)]
#[command(name = "trapbook")]
#[command(about = "Study opening traps and gambits from curated move sequences")]
struct Args {
    /// Directory holding traps.json, pro-games.json and my-games.json
    #[arg(long, value_name = "DIR", env = "TRAPBOOK_DATA_DIR", default_value = "data")]
    data_dir: PathBuf,

    /// Write compact instead of pretty-printed store files
    #[arg(long)]
    compact: bool,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Import one line, or a blank-line separated batch of variations
    Import {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "white")]
        side: Side,
        #[arg(long, default_value = "traps")]
        source: String,
        /// PGN file to read (stdin if omitted)
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,
    },
    /// Import every `.pgn` file of a directory, one line per file named after the file
    ImportDir {
        #[arg(value_name = "DIR")]
        dir: PathBuf,
        #[arg(long, default_value = "white")]
        side: Side,
        #[arg(long, default_value = "traps")]
        source: String,
    },
    /// Known moves at a position (FEN; start position if omitted)
    Moves {
        #[arg(long)]
        fen: Option<String>,
    },
    /// Every named line
    Lines,
    /// All records of one line, grouped by position
    Details {
        #[arg(long)]
        name: String,
    },
    /// Delete a line (or a batch of numbered variations) from one source
    Delete {
        #[arg(long)]
        source: SourceTag,
        #[arg(long)]
        name: String,
        /// Also delete "<name> N" siblings
        #[arg(long)]
        variations: bool,
    },
    /// Empty one source, or all of them
    Reset {
        #[arg(long)]
        source: Option<SourceTag>,
    },
    /// Walk the merged index interactively
    Explore,
    /// Step through one line
    Learn {
        #[arg(long)]
        name: String,
    },
}

fn main() {
    let args = Args::parse();
    setup_tracing(args.verbose);

    let config = LibraryConfig::new()
        .with_data_dir(&args.data_dir)
        .with_pretty_json(!args.compact);
    let library = match TrapLibrary::open(&config) {
        Ok(l) => l,
        Err(e) => {
            eprintln!("Failed to open library at {}: {e}", args.data_dir.display());
            std::process::exit(1);
        }
    };

    if let Err(e) = run(&library, args.command) {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

fn run(library: &TrapLibrary, command: Command) -> Result<(), Box<dyn std::error::Error>> {
    match command {
        Command::Import {
            name,
            side,
            source,
            file,
        } => {
            let pgn = match file {
                Some(path) => std::fs::read_to_string(path)?,
                None => {
                    let mut buf = String::new();
                    io::stdin().read_to_string(&mut buf)?;
                    buf
                }
            };
            let report = library.import_batch(ImportRequest {
                line_name: &name,
                intended_side: side,
                source: &source,
                pgn: &pgn,
            })?;
            print_json(&report)?;
        }
        Command::ImportDir { dir, side, source } => {
            let mut files: Vec<PathBuf> = std::fs::read_dir(&dir)?
                .map(|entry| entry.map(|e| e.path()))
                .collect::<io::Result<_>>()?;
            files.retain(|p| p.extension().is_some_and(|ext| ext == "pgn"));
            files.sort();

            for path in &files {
                let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let name = line_name_from_file_stem(stem);
                println!("Processing {name}...");
                let pgn = std::fs::read_to_string(path)?;
                let report = library.import_batch(ImportRequest {
                    line_name: &name,
                    intended_side: side,
                    source: &source,
                    pgn: &pgn,
                })?;
                println!("{}", report.message);
            }
            println!(
                "Imported {} files; the index now holds {} positions.",
                files.len(),
                library.snapshot().position_count()
            );
        }
        Command::Moves { fen } => {
            let moves = match fen {
                Some(fen) => library.query_fen(&fen)?,
                None => library.query_moves(&trapbook::PositionKey::starting()),
            };
            print_json(&moves)?;
        }
        Command::Lines => print_json(&library.list_lines())?,
        Command::Details { name } => print_json(&library.line_details(&name))?,
        Command::Delete {
            source,
            name,
            variations,
        } => {
            let pattern = if variations {
                LinePattern::Variations(name)
            } else {
                LinePattern::Exact(name)
            };
            let removed = library.delete_lines(source, &pattern)?;
            println!("Removed {removed} records from {}.", source.label());
        }
        Command::Reset { source } => {
            match source {
                Some(tag) => library.reset_source(tag)?,
                None => library.reset_all()?,
            }
            println!("Reset complete.");
        }
        Command::Explore => {
            let mut session = library.explorer();
            interact(&mut session, false)?;
        }
        Command::Learn { name } => {
            let Some((summary, mut session)) = library.line_session(&name) else {
                return Err(format!("unknown line {name:?}").into());
            };
            println!(
                "{} ({}), play as {}",
                summary.name,
                summary.source.label(),
                summary.intended_side
            );
            interact(&mut session, true)?;
        }
    }
    Ok(())
}

fn interact<R, L>(session: &mut ExplorerSession<R, L>, replay: bool) -> io::Result<()>
where
    R: RulesEngine,
    L: MoveLookup,
{
    print_help(replay);
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        render(session, replay);
        print!("> ");
        io::stdout().flush()?;

        let Some(line) = lines.next() else {
            break;
        };
        let line = line?;
        let cmd = line.trim();
        if cmd.is_empty() {
            continue;
        }

        let outcome = match cmd.split_whitespace().collect::<Vec<_>>().as_slice() {
            ["quit"] | ["q"] => break,
            ["help"] => {
                print_help(replay);
                continue;
            }
            ["next"] | ["auto"] | ["n"] => session.auto_advance().map(|m| match m {
                Some(m) => format!("played {m}"),
                None => "no known move here".to_string(),
            }),
            ["back"] | ["undo"] | ["b"] => session.undo().map(|m| format!("took back {m}")),
            ["reset"] => {
                session.reset();
                Ok("reset".to_string())
            }
            ["pick", n] if !replay => match n.parse::<usize>() {
                Ok(i) if i >= 1 => session.select(i - 1).map(|m| format!("following line, played {m}")),
                _ => Ok(format!("invalid candidate number {n}")),
            },
            [mv] if !replay => session.play(mv).map(|m| format!("played {m}")),
            _ => Ok(format!("unknown command: {cmd}")),
        };

        match outcome {
            Ok(msg) => println!("{msg}"),
            Err(e) => println!("{e}"),
        }
    }
    Ok(())
}

fn render<R: RulesEngine, L: MoveLookup>(session: &ExplorerSession<R, L>, replay: bool) {
    println!();
    println!("Position: {}", session.current_key());
    let history: Vec<&str> = session.history().collect();
    if !history.is_empty() {
        println!("Moves: {}", history.join(" "));
    }

    if replay {
        match session.suggested_move() {
            Some(m) => println!("Next move: {m}"),
            None => println!("End of the line."),
        }
        return;
    }

    if session.candidates().is_empty() {
        println!("No known moves from this position.");
    } else {
        let preferred = session.preferred_line();
        for (i, c) in session.candidates().iter().enumerate() {
            let mark = if preferred.is_some_and(|p| c.belongs_to(p)) {
                "*"
            } else {
                " "
            };
            println!(
                "{mark}{:>2}. {:<8} (from {}: {})",
                i + 1,
                c.mv,
                c.source.label(),
                c.line_name
            );
        }
    }
    if let Some(m) = session.suggested_move() {
        println!("Suggested: {m}");
    }
}

fn print_help(replay: bool) {
    if replay {
        println!("Commands: next | back | reset | help | quit");
    } else {
        println!("Commands: <SAN move> | pick <N> | auto | undo | reset | help | quit");
    }
}

fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    serde_json::to_writer_pretty(&mut out, value)?;
    writeln!(out)
}

fn setup_tracing(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if verbose {
            EnvFilter::new("trapbook=debug,info")
        } else {
            EnvFilter::new("warn")
        }
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}
