//! xmlsheet CLI - edit XML catalogs as tables without touching the source.

mod cli;
mod commands;
mod logging;
mod server;

use clap::Parser;
use cli::{Cli, Commands};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logging::init_logging(cli.verbose) {
        eprintln!("Warning: logging disabled: {}", e);
    }

    let store = cli.store;
    let result = match cli.command {
        Commands::Inspect {
            source,
            limit,
            json,
        } => commands::inspect::run(&store, &source, limit, json, cli.verbose),

        Commands::Fields { source, id } => commands::fields::run(&store, &source, &id),

        Commands::Set {
            source,
            id,
            name,
            value,
            label,
        } => commands::edit::set(&store, &source, &id, &name, &value, label.as_deref()),

        Commands::Unset { source, id, name } => commands::edit::unset(&store, &source, &id, &name),

        Commands::Group { source, label, ids } => {
            commands::edit::group(&store, &source, &label, &ids)
        }

        Commands::DropColumn { name } => commands::edit::drop_column(&store, &name),

        Commands::Export {
            source,
            format,
            output,
            hide,
            filter,
            sort,
            desc,
            deactivate,
            group_sort,
        } => commands::export::run(
            &store,
            &source,
            commands::export::ExportOptions {
                format,
                output,
                hide,
                filter,
                sort,
                desc,
                deactivate,
                group_sort,
            },
        ),

        Commands::Restore => commands::restore::run(&store),

        Commands::Status { source, json } => {
            commands::status::run(&store, source.as_deref(), json)
        }

        Commands::Serve { source, port } => {
            commands::serve::run(&store, source.as_deref(), port, cli.verbose)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
