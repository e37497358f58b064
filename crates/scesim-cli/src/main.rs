use anyhow::Result;
use clap::{value_parser, Arg, ArgAction, Command};
use scesim_cli::{init_tracing, inspect_file, migrate_file, validate_file, version_report};
use std::path::PathBuf;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Scenario document (.scesim)")
}

fn cli() -> Command {
    Command::new("scesim")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Scenario-simulation document tools")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Enable debug logging"),
        )
        .subcommand(
            Command::new("migrate")
                .about("Upgrade a document to the current schema version")
                .arg(file_arg())
                .arg(
                    Arg::new("in-place")
                        .long("in-place")
                        .action(ArgAction::SetTrue)
                        .help("Rewrite the file instead of printing the result"),
                ),
        )
        .subcommand(
            Command::new("version")
                .about("Show the schema version and the migration path")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("validate")
                .about("Decode and validate a document")
                .arg(file_arg()),
        )
        .subcommand(
            Command::new("inspect")
                .about("Summarise a document")
                .arg(file_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
}

fn file(args: &clap::ArgMatches) -> Result<&PathBuf> {
    args.get_one::<PathBuf>("file")
        .ok_or_else(|| anyhow::anyhow!("missing file argument"))
}

fn main() -> Result<()> {
    let matches = cli().get_matches();
    let verbose = matches.get_flag("verbose")
        || matches
            .subcommand()
            .is_some_and(|(_, args)| args.get_flag("verbose"));
    init_tracing(verbose);

    match matches.subcommand() {
        Some(("migrate", args)) => {
            println!("{}", migrate_file(file(args)?, args.get_flag("in-place"))?);
        }
        Some(("version", args)) => {
            println!("{}", version_report(file(args)?)?);
        }
        Some(("validate", args)) => {
            let path = file(args)?;
            let model = validate_file(path)?;
            println!(
                "{}: valid ({} scenarios)",
                path.display(),
                model.simulation().len()
            );
        }
        Some(("inspect", args)) => {
            print!("{}", inspect_file(file(args)?, args.get_flag("json"))?);
            if args.get_flag("json") {
                println!();
            }
        }
        _ => unreachable!("subcommand is required"),
    }

    Ok(())
}
