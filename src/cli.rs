// Copyright (c) 2021 Tangram Robotics Inc. - All Rights Reserved
// Unauthorized copying of this file, via any medium is strictly prohibited
// Proprietary and confidential
// ----------------------------

use std::path::Path;

use anyhow::Result;
use clap::{crate_authors, crate_description, crate_version};
use clap::{Arg, ArgMatches, Command};

use crate::app_config::CompleteAppConfig;
use crate::core::commands;
use crate::server;

/// Match commands
pub fn cli_match(config: config::Config, cli_matches: ArgMatches) -> Result<()> {
    // Handle config subcommand first, because it doesn't need any valid configuration, and is helpful for debugging bad config!
    if let Some(("config", _config_matches)) = cli_matches.subcommand() {
        commands::print_config(config)?;
        return Ok(());
    }

    let mut app_config = CompleteAppConfig::from_config(config)?;

    match cli_matches.subcommand() {
        Some(("serve", serve_matches)) => {
            if let Some(host) = serve_matches.value_of("host") {
                app_config.server.host = host.to_owned();
            }
            if serve_matches.is_present("port") {
                app_config.server.port = serve_matches
                    .value_of_t("port")
                    .unwrap_or_else(|e| e.exit());
            }
            let runtime = tokio::runtime::Runtime::new()?;
            runtime.block_on(server::serve(app_config))?;
        }
        Some(("lookup", lookup_matches)) => {
            // Safe to unwrap because arguments are required
            let input = commands::birth_input(
                lookup_matches.value_of("month").unwrap(),
                lookup_matches.value_of("day").unwrap(),
                lookup_matches.value_of("year").unwrap(),
                lookup_matches.value_of("sex").unwrap(),
            )?;
            let runtime = tokio::runtime::Runtime::new()?;
            let report = runtime.block_on(commands::lookup(&app_config.scraper, &input))?;
            commands::print_report(&report)?;
        }
        Some(("parse", parse_matches)) => {
            // Safe to unwrap because argument is required
            let file = parse_matches.value_of("file").unwrap();
            let report = commands::parse_results_file(Path::new(file))?;
            commands::print_report(&report)?;
        }
        _ => {
            // Arguments are required by default (in Clap).
            // This section should never execute.
            unreachable!("No matching subcommand!");
        }
    }
    Ok(())
}

/// Configure Clap
pub fn cli_app() -> Command<'static> {
    Command::new("ssa-scraper")
        .arg_required_else_help(true)
        .subcommand_required(true)
        .version(crate_version!())
        .about(crate_description!())
        .author(crate_authors!("\n"))
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .value_name("FILE")
                .help("Set a custom config file")
                .takes_value(true),
        )
        .subcommand(
            Command::new("serve")
                .about("Serve the lookup as an HTTP function at /api/scrape")
                .arg(
                    Arg::new("host")
                        .long("host")
                        .value_name("HOST")
                        .help("Address to listen on (overrides config)")
                        .takes_value(true),
                )
                .arg(
                    Arg::new("port")
                        .short('p')
                        .long("port")
                        .value_name("PORT")
                        .help("Port to listen on (overrides config)")
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("lookup")
                .about("Look up life expectancy once and print it as JSON")
                .arg(
                    Arg::new("month")
                        .long("month")
                        .value_name("MONTH")
                        .help("Month of birth, 1-12")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("day")
                        .long("day")
                        .value_name("DAY")
                        .help("Day of birth")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("year")
                        .long("year")
                        .value_name("YEAR")
                        .help("Year of birth")
                        .required(true)
                        .takes_value(true),
                )
                .arg(
                    Arg::new("sex")
                        .long("sex")
                        .value_name("SEX")
                        .help("m or f")
                        .required(true)
                        .takes_value(true),
                ),
        )
        .subcommand(
            Command::new("parse")
                .about("Parse a saved calculator results page and print it as JSON")
                .arg(
                    Arg::new("file")
                        .required(true)
                        .value_name("FILE")
                        .takes_value(true),
                ),
        )
        .subcommand(Command::new("config").about("Show Configuration"))
}

/// Parse the process's command line.
pub fn cli_config() -> Result<ArgMatches> {
    // Get matches
    let cli_matches = cli_app().get_matches();

    Ok(cli_matches)
}
