//! ontobot CLI: ontology-backed robot command shell.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};

use ontobot::shell::Shell;
use ontobot::vocab::KITCHEN_NS;
use ontobot::world::World;

#[derive(Parser)]
#[command(name = "ontobot", version, about = "Ontology-backed robot command shell")]
struct Cli {
    /// Ontology file to load (format chosen by extension).
    #[arg(long, global = true, default_value = "ontology/kitchen.ttl")]
    ontology: PathBuf,

    /// Ontology namespace bound to the `:` prefix in every query.
    #[arg(long, global = true, default_value = KITCHEN_NS)]
    namespace: String,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the interactive shell (the default).
    Repl,

    /// Run one shell command and exit.
    Exec {
        /// The command line, e.g. "put ryeLoaf counter".
        line: String,
    },

    /// Run a raw SPARQL SELECT against the model.
    Query {
        /// SELECT body; the well-known prefixes and `:` are pre-declared.
        sparql: String,

        /// Print rows as JSON instead of variable/term pairs.
        #[arg(long)]
        json: bool,
    },

    /// Show world model info.
    Info {
        /// Print the info as JSON.
        #[arg(long)]
        json: bool,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let world = World::open(&cli.ontology, cli.namespace.clone())?;

    match cli.command.unwrap_or(Commands::Repl) {
        Commands::Repl => {
            let shell = Shell::new();
            let stdin = std::io::stdin();
            let mut stdout = std::io::stdout();
            shell.run(&world, stdin.lock(), &mut stdout)?;
        }

        Commands::Exec { line } => {
            let shell = Shell::new();
            let mut stdout = std::io::stdout();
            shell.run_line(&world, &line, &mut stdout)?;
        }

        Commands::Query { sparql, json } => {
            let rows = world.queries().select(&sparql)?;
            if json {
                let rows: Vec<BTreeMap<String, String>> = rows
                    .iter()
                    .map(|row| row.to_pairs().into_iter().collect())
                    .collect();
                let rendered = serde_json::to_string_pretty(&rows).into_diagnostic()?;
                println!("{rendered}");
            } else if rows.is_empty() {
                println!("No solutions.");
            } else {
                let mut stdout = std::io::stdout();
                for (i, row) in rows.iter().enumerate() {
                    writeln!(stdout, "solution {}:", i + 1).into_diagnostic()?;
                    for (variable, term) in row.to_pairs() {
                        writeln!(stdout, "  ?{variable} = {term}").into_diagnostic()?;
                    }
                }
            }
        }

        Commands::Info { json } => {
            let info = world.info()?;
            if json {
                println!("{}", serde_json::to_string_pretty(&info).into_diagnostic()?);
            } else {
                println!("{info}");
            }
        }
    }

    Ok(())
}
