/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use anyhow::Context;
use colored::Colorize;
use stressbench::{
    clap_args::{self, Commands, OutputFormat},
    jobfile,
    runner::StressNg,
    summary, Orchestrator, RunConfig,
};
use tracing::{debug, subscriber::set_global_default, Subscriber};
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = clap_args::parse();

    let subscriber = get_subscriber(args.verbose);
    set_global_default(subscriber).context("Failed to set subscriber")?;
    debug!("{:?}", args);

    match args.command {
        Commands::Run {
            config,
            stress_ng,
            format,
        } => {
            let config = RunConfig::try_from_path(&config)?;
            let runner = stress_ng.map(StressNg::new).unwrap_or_else(StressNg::from_env);

            println!(
                "> running {} stressor(s) for {}s with {}",
                config.stressors.len(),
                config.timeout,
                runner.command().green()
            );
            let result = match Orchestrator::new(runner).run(config) {
                Ok(result) => result,
                Err(err) => {
                    eprintln!("{}", err.error.red());
                    return Err(err.into());
                }
            };

            match format {
                OutputFormat::Table => {
                    println!("\n{}", " Summary ".reversed().green());
                    println!("{}", summary::host_line(&result).bright_black());
                    println!("{}", summary::render(&result));
                }
                OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&result)?),
                OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
            }
        }

        Commands::Jobfile { config } => {
            let config = RunConfig::try_from_path(&config)?;
            print!("{}", jobfile::encode(&config)?);
        }

        Commands::Init { path } => {
            RunConfig::write_example_to_file(&path)?;
            println!("{} {}", "Wrote example config to".green(), path.display());
        }
    }

    Ok(())
}

fn get_subscriber(verbose: bool) -> impl Subscriber + Sync + Send {
    let env_filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish()
}
