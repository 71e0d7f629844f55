use std::process::ExitCode;

use regdfa::prelude::*;

use tracing::{debug, trace};
use tracing_subscriber::{filter, prelude::*};

use clap::{Arg, ArgAction, ArgMatches, Command};

fn cli() -> clap::Command {
    Command::new("regdfa")
    .about("Converts a regular grammar into a minimal deterministic finite automaton")
    .arg(
        Arg::new("input")
        .help("file containing the grammar, one rule `<NT> ::= alt | alt` per line")
        .default_value("entrada.txt")
    )
    .arg(
        Arg::new("output")
        .help("file the minimal automaton is written to")
        .default_value("saida.csv")
    )
    .arg(
        Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .help("log every stage, repeat for refinement details")
    )
    .arg(
        Arg::new("format")
        .long("format")
        .value_parser(|s: &str| s.parse::<OutputFormat>())
        .default_value("transitions")
        .help("write one row per transition or the transition table")
    )
}

fn setup_logging(matches: &ArgMatches) {
    let level = match matches.get_count("verbose") {
        0 => filter::LevelFilter::WARN,
        1 => filter::LevelFilter::DEBUG,
        _ => filter::LevelFilter::TRACE,
    };

    let stderr_log = tracing_subscriber::fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(stderr_log.with_filter(level))
        .init();

    trace!("setup {level} logging");
}

fn options(matches: &ArgMatches) -> Options {
    let format = *matches
        .get_one::<OutputFormat>("format")
        .expect("format has a default value");
    Options {
        format,
        ..Default::default()
    }
}

/// Runs the pipeline for the given arguments and returns the path of the written file.
fn execute(matches: &ArgMatches) -> regdfa::Result<String> {
    let input = matches
        .get_one::<String>("input")
        .expect("input has a default value");
    let output = matches
        .get_one::<String>("output")
        .expect("output has a default value");
    let options = options(matches);

    debug!("converting {input} into {output} as {}", options.format);
    regdfa::pipeline::run_file(input, output, &options)?;
    Ok(output.clone())
}

pub fn main() -> ExitCode {
    let matches = cli().get_matches();

    setup_logging(&matches);

    match execute(&matches) {
        Ok(output) => {
            println!("minimal DFA written to {output}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
