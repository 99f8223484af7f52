/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about = "Run stress-ng workloads and collect their metrics", long_about = None)]
pub struct Args {
    /// Verbose mode (-v, --verbose)
    #[arg(short, long)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the workload described by a config file
    Run {
        /// Path to the config file
        #[arg(short, long, default_value = "stressbench.toml")]
        config: PathBuf,

        /// stress-ng command, overrides STRESSBENCH_STRESS_NG
        #[arg(long)]
        stress_ng: Option<String>,

        /// How to print the result
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,
    },

    /// Print the stress-ng job file a config file encodes to
    Jobfile {
        /// Path to the config file
        #[arg(short, long, default_value = "stressbench.toml")]
        config: PathBuf,
    },

    /// Write an example config file
    Init {
        #[arg(default_value = "stressbench.toml")]
        path: PathBuf,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Table,
    Yaml,
    Json,
}

pub fn parse() -> Args {
    Args::parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn run_defaults() -> anyhow::Result<()> {
        let args = Args::try_parse_from(["stressbench", "run"])?;
        match args.command {
            Commands::Run {
                config,
                stress_ng,
                format,
            } => {
                assert_eq!(config, PathBuf::from("stressbench.toml"));
                assert_eq!(stress_ng, None);
                assert_eq!(format, OutputFormat::Table);
            }
            other => panic!("expected run, got {:?}", other),
        }
        assert!(!args.verbose);
        Ok(())
    }

    #[test]
    fn run_with_overrides() -> anyhow::Result<()> {
        let args = Args::try_parse_from([
            "stressbench",
            "-v",
            "run",
            "-c",
            "bench.toml",
            "--stress-ng",
            "sudo -n stress-ng",
            "--format",
            "json",
        ])?;
        assert!(args.verbose);
        match args.command {
            Commands::Run {
                config,
                stress_ng,
                format,
            } => {
                assert_eq!(config, PathBuf::from("bench.toml"));
                assert_eq!(stress_ng.as_deref(), Some("sudo -n stress-ng"));
                assert_eq!(format, OutputFormat::Json);
            }
            other => panic!("expected run, got {:?}", other),
        }
        Ok(())
    }

    #[test]
    fn unknown_format_is_rejected() {
        let args = Args::try_parse_from(["stressbench", "run", "--format", "xml"]);
        assert!(args.is_err());
    }
}
