mod cli;

use clap::Parser;

use cli::{Cli, Commands, ReportCommands, ShiftsCommands};

fn main() {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "info" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .format_timestamp(None)
        .init();

    let result = match cli.command {
        Commands::Init { data_dir } => cli::init::run(data_dir),
        Commands::Shifts { command } => match command {
            ShiftsCommands::Add { start, end } => cli::shifts::add(start, end),
            ShiftsCommands::End { id, end } => cli::shifts::end(id, end),
            ShiftsCommands::List => cli::shifts::list(),
            ShiftsCommands::Delete { id } => cli::shifts::delete(id),
        },
        Commands::Import { file, layout } => cli::import::run(&file, layout.as_deref()),
        Commands::Rematch => cli::rematch::run(),
        Commands::Validate { file, layout, json } => {
            cli::validate::run(&file, layout.as_deref(), json)
        }
        Commands::Report { command } => match command {
            ReportCommands::Shift { id, json } => cli::report::shift(id, json),
            ReportCommands::Totals => cli::report::totals(),
        },
        Commands::Orphans { csv } => cli::orphans::run(csv.as_deref()),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
