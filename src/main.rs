//! Deckhand CLI - Commander decklist analysis and deck building.

use std::process;

use clap::Parser;
use deckhand::cli::{Cli, Commands, McpCommands};
use deckhand::commands::{self, CommandResult};
use deckhand::models::BuildInput;
use deckhand::{mcp, DataContext};

fn main() {
    let cli = Cli::parse();
    let human = cli.human_readable;

    let data_dir = DataContext::resolve_data_dir(cli.data_dir);
    let ctx = match DataContext::open(&data_dir) {
        Ok(ctx) => ctx,
        Err(e) => {
            print_error(&e.to_string(), human);
            process::exit(1);
        }
    };
    let human = human || ctx.config.output_format() == deckhand::config::OutputFormat::Human;

    let result = run_command(&ctx, cli.command, human);
    if let Err(e) = result {
        print_error(&e.to_string(), human);
        process::exit(1);
    }
}

fn run_command(ctx: &DataContext, command: Commands, human: bool) -> deckhand::Result<()> {
    match command {
        Commands::Analyze {
            file,
            template,
            bracket,
            commander,
        } => {
            let analysis = commands::analyze(ctx, file.as_deref(), template, bracket, commander)?;
            print_result(&analysis, human);
        }
        Commands::Build {
            commander,
            template,
            bracket,
            seed,
            recommend,
            autofill,
        } => {
            let input = BuildInput {
                commander,
                template,
                bracket,
                seed_cards: seed,
                fetch_recommendations: recommend,
                autofill,
                ..Default::default()
            };
            let result = commands::build(ctx, &input)?;
            print_result(&result, human);
        }
        Commands::Card { name } => {
            let report = commands::card(ctx, &name)?;
            print_result(&report, human);
        }
        Commands::Mcp { command } => match command {
            McpCommands::Serve => mcp::serve(ctx)?,
            McpCommands::Manifest => mcp::manifest(),
        },
    }
    Ok(())
}

fn print_result<T: CommandResult>(result: &T, human: bool) {
    if human {
        println!("{}", result.to_human());
    } else {
        println!("{}", result.to_json());
    }
}

fn print_error(message: &str, human: bool) {
    if human {
        eprintln!("Error: {}", message);
    } else {
        eprintln!(
            "{}",
            serde_json::json!({"error": message})
        );
    }
}
