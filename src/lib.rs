//! ssa-scraper looks up life expectancy from the Social Security
//! Administration's [longevity calculator](https://www.ssa.gov/cgi-bin/longevity.cgi)
//! and returns it as JSON.
//!
//! Given a date of birth and sex, the calculator reports how many more years
//! someone can expect to live, and the total age that implies, both now and at
//! a few later ages (e.g. full retirement age). ssa-scraper fills in the
//! calculator form, reads the results table, and hands it back in a shape
//! programs can use.
//!
//! # Usage
//!
//! View CLI help with `ssa-scraper help` or `ssa-scraper help <subcommand>`.
//!
//! ## Configuration
//!
//! A configuration file is optional. If present, it is read from
//! `~/.config/ssa-scraper/ssa-scraper.toml`; use `--config path/to/file.toml`
//! to read another one. Any value can be overridden with an environment
//! variable, e.g. `SSA_SCRAPER_SERVER__PORT=8080` (note the double underscore
//! between section and key).
//!
//! ```toml
//! [server]
//! host = "0.0.0.0"
//! port = 7071
//! function_keys = ["change-me"]
//!
//! [scraper]
//! calculator_url = "https://www.ssa.gov/cgi-bin/longevity.cgi"
//! timeout_secs = 60
//! max_concurrent = 4
//! ```
//!
//! ## Commands
//!
//! ```ssa-scraper serve [--host HOST] [--port PORT]```
//!
//! Serves the lookup as an HTTP function. Send a JSON body with `month`
//! (1-12), `day`, `year`, and `sex` (`m` or `f`) to `POST /api/scrape`, with a
//! function key in the `x-functions-key` header or `code` query parameter:
//!
//! ```shell
//! curl -X POST 'http://localhost:7071/api/scrape?code=change-me' \
//!     -d '{"month": 3, "day": 14, "year": 1960, "sex": "f"}'
//! ```
//!
//! ```json
//! {
//!   "initial": {"atAge": 64.25, "additionalLE": 21.4, "totalLE": 85.7},
//!   "future": [
//!     {"atAge": 66.83333333333333, "additionalLE": 19.3, "totalLE": 86.1},
//!     {"atAge": 67.0, "additionalLE": 19.2, "totalLE": 86.2}
//!   ]
//! }
//! ```
//!
//! Bad requests get a 400, a missing or wrong function key a 401, and
//! calculator failures a 500, each with a `{"message": ...}` body. With no
//! function keys configured, the endpoint is open.
//!
//! <br>
//!
//! ---
//!
//! ```ssa-scraper lookup --month M --day D --year Y --sex S```
//!
//! Looks up life expectancy once and prints the JSON report.
//!
//! <br>
//!
//! ---
//!
//! ```ssa-scraper parse <FILE>```
//!
//! Parses a results page saved from the calculator (handy when the page layout
//! changes and the parser needs checking).
//!
//! <br>
//!
//! ---
//!
//! ```ssa-scraper config```
//!
//! Echoes current config (with any overrides applied) and exits.
//!
//! # Logging
//!
//! Set `RUST_LOG` to control log output, e.g. `RUST_LOG=ssa_scraper=debug`.

#[cfg(not(debug_assertions))]
use human_panic::setup_panic;

mod app_config;
mod cli;
mod core;
mod server;

use anyhow::Result;

#[doc(hidden)]
/// Main entrypoint
pub fn run() -> Result<()> {
    // Human Panic. Only enabled when *not* debugging.
    //
    // Example of what panic message looks like:
    // https://docs.rs/human-panic/1.0.3/human_panic/
    #[cfg(not(debug_assertions))]
    {
        setup_panic!();
    }

    // Better Panic. Only enabled *when* debugging.
    #[cfg(debug_assertions)]
    {
        better_panic::Settings::debug()
            .most_recent_first(false)
            .lineno_suffix(true)
            .verbosity(better_panic::Verbosity::Full)
            .install();
    }

    env_logger::init();

    // Get CLI arguments and flags (one may have provided the config file to use)
    let cli_matches = cli::cli_config()?;

    let mut settings = config::Config::default();
    // A config file given on the command line must exist; the default one is optional
    if let Some(config_file) = cli_matches.value_of("config") {
        settings.merge(config::File::with_name(config_file))?;
    } else {
        settings.merge(
            config::File::with_name(&shellexpand::tilde(app_config::DEFAULT_CONFIG_PATH))
                .required(false),
        )?;
    }

    // Override with environment variables, if present
    // Example of overriding: SSA_SCRAPER_SERVER__PORT=8080
    settings.merge(config::Environment::with_prefix(app_config::ENV_PREFIX).separator("__"))?;

    // Match against CLI subcommands, which delegate to functions
    cli::cli_match(settings, cli_matches)
}
