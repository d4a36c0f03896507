extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate ghsearch;
extern crate shlex;

use std::env;
use std::fs::File;
use std::io::Write;

use clap::Parser;
use color_eyre::eyre::Result;
use ghsearch::prelude::*;

//------------------------------------------------------------------------------
fn main() {
    let opts = parse_args();
    init_logger(&opts);

    match real_main(opts) {
        Ok(exit_code) => std::process::exit(exit_code),
        Err(err) => {
            error!("{err:?}");
            eprintln!("ghs: {err}");
            std::process::exit(2)
        }
    }
}

fn parse_args() -> SearchOptions {
    let mut args = Vec::new();

    args.push(env::args().next().unwrap_or_else(|| String::from("ghs")));
    args.extend(
        env::var("GHS_DEFAULT_OPTIONS")
            .ok()
            .and_then(|val| shlex::split(&val))
            .unwrap_or_default(),
    );
    args.extend(env::args().skip(1));

    SearchOptions::parse_from(args).build()
}

/// Logs go to stderr unless `--log-file` is set, since the TUI draws on stderr too
fn init_logger(opts: &SearchOptions) {
    let mut builder = env_logger::builder();
    builder.format_timestamp_nanos();
    if let Some(path) = &opts.log_file {
        match File::create(path) {
            Ok(file) => {
                builder.target(env_logger::Target::Pipe(Box::new(file)));
            }
            Err(e) => eprintln!("ghs: cannot open log file {path}: {e}"),
        }
    }
    builder.init();
}

fn real_main(opts: SearchOptions) -> Result<i32> {
    color_eyre::install()?;

    let output = Finder::run_with(opts)?;
    debug!("quit with query {:?}", output.query);

    let mut stdout = std::io::stdout().lock();
    for url in &output.opened {
        writeln!(stdout, "{url}")?;
    }
    stdout.flush()?;
    Ok(0)
}
