/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::errors::Failure;
use std::path::Path;
use subprocess::{Exec, ExitStatus, Redirection};
use tracing::debug;

pub const DEFAULT_COMMAND: &str = "/usr/bin/stress-ng";

/// Environment variable overriding the stress-ng command, e.g. `sudo -n stress-ng`.
pub const COMMAND_ENV: &str = "STRESSBENCH_STRESS_NG";

/// Where stress-ng reads its job, where it writes its report and where it runs.
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    pub job_file: &'a Path,
    pub report_file: &'a Path,
    pub workdir: &'a Path,
}

/// Runs stress-ng to completion. On success the report file holds whatever stress-ng wrote,
/// possibly nothing.
pub trait ProcessRunner {
    /// Returns stdout and stderr of the tool, interleaved.
    fn run(&self, invocation: &Invocation) -> Result<String, Failure>;
}

#[derive(Debug, Clone)]
pub struct StressNg {
    command: String,
}

impl StressNg {
    pub fn new(command: impl Into<String>) -> Self {
        StressNg {
            command: command.into(),
        }
    }

    pub fn from_env() -> Self {
        std::env::var(COMMAND_ENV)
            .map(StressNg::new)
            .unwrap_or_default()
    }

    pub fn command(&self) -> &str {
        &self.command
    }
}

impl Default for StressNg {
    fn default() -> Self {
        StressNg::new(DEFAULT_COMMAND)
    }
}

impl ProcessRunner for StressNg {
    fn run(&self, invocation: &Invocation) -> Result<String, Failure> {
        // break command string into POSIX words
        let words = shlex::split(&self.command).unwrap_or_default();
        let (program, args) = words.split_first().ok_or_else(|| Failure::ToolExecution {
            code: None,
            output: format!("`{}` is not a runnable command", self.command),
        })?;

        debug!(
            "Running {} -j {} --metrics -Y {} in {}",
            self.command,
            invocation.job_file.display(),
            invocation.report_file.display(),
            invocation.workdir.display()
        );

        let capture = Exec::cmd(program)
            .args(args)
            .arg("-j")
            .arg(invocation.job_file)
            .arg("--metrics")
            .arg("-Y")
            .arg(invocation.report_file)
            .cwd(invocation.workdir)
            .stdout(Redirection::Pipe)
            .stderr(Redirection::Merge)
            .capture()
            .map_err(|e| Failure::ToolExecution {
                code: None,
                output: format!("failed to start {}: {}", program, e),
            })?;

        let output = capture.stdout_str();
        match capture.exit_status {
            ExitStatus::Exited(0) => Ok(output),
            ExitStatus::Exited(code) => Err(Failure::ToolExecution {
                code: Some(code as i32),
                output,
            }),
            status => Err(Failure::ToolExecution {
                code: None,
                output: format!("{}\n{:?}", output, status),
            }),
        }
    }
}
