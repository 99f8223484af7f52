/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

pub mod clap_args;
pub mod config;
pub mod errors;
pub mod jobfile;
pub mod report;
pub mod runner;
pub mod stressor;
pub mod summary;
pub mod workload;

pub use config::RunConfig;
pub use errors::WorkloadError;
pub use workload::{Orchestrator, WorkloadResult};

use runner::StressNg;

/// Runs stress-ng once with the given configuration. The command comes from
/// `STRESSBENCH_STRESS_NG`, or `/usr/bin/stress-ng` when it is not set.
pub fn run_workload(config: RunConfig) -> Result<WorkloadResult, WorkloadError> {
    Orchestrator::new(StressNg::from_env()).run(config)
}
