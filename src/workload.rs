/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    config::RunConfig,
    errors::{Failure, WorkloadError},
    jobfile,
    report::{self, CommonOutput, Report, SystemInfo},
    runner::{Invocation, ProcessRunner},
    stressor::{hdd::IoOutput, matrix::MatrixOutput, StressorKind, StressorResult},
};
use serde::Serialize;
use std::{
    fmt,
    fs,
    io::Write,
    path::{Path, PathBuf},
};
use tempfile::NamedTempFile;
use tracing::{debug, info, info_span};

/// The stages of a run, in order. A failure in any of them ends the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Encode,
    Artifacts,
    Execute,
    Decode,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Encode => "encode",
            Stage::Artifacts => "artifacts",
            Stage::Execute => "execute",
            Stage::Decode => "decode",
        };
        f.write_str(name)
    }
}

impl WorkloadError {
    pub fn from_stage(stage: Stage, cause: Failure) -> Self {
        WorkloadError::new(format!("{} stage failed: {}", stage, cause))
    }
}

/// The success channel of a run: the config it ran with, the host it ran on and one slot per
/// stressor kind. A slot is empty when that kind was not part of the run or stress-ng did not
/// report it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkloadResult {
    pub run_id: String,
    pub test_config: RunConfig,
    pub system_info: Option<SystemInfo>,
    pub cpu: Option<CommonOutput>,
    pub vm: Option<CommonOutput>,
    pub mmap: Option<CommonOutput>,
    pub matrix: Option<MatrixOutput>,
    pub mq: Option<CommonOutput>,
    pub hdd: Option<IoOutput>,
    pub iomix: Option<IoOutput>,
    pub sock: Option<CommonOutput>,
}

impl WorkloadResult {
    pub(crate) fn assemble(run_id: String, test_config: RunConfig, report: Report) -> Self {
        let mut result = WorkloadResult {
            run_id,
            test_config,
            system_info: report.system_info,
            cpu: None,
            vm: None,
            mmap: None,
            matrix: None,
            mq: None,
            hdd: None,
            iomix: None,
            sock: None,
        };

        for stressor_result in report.results.into_values() {
            match stressor_result {
                StressorResult::Cpu(output) => result.cpu = Some(output),
                StressorResult::Vm(output) => result.vm = Some(output),
                StressorResult::Mmap(output) => result.mmap = Some(output),
                StressorResult::Matrix(output) => result.matrix = Some(output),
                StressorResult::Mq(output) => result.mq = Some(output),
                StressorResult::Hdd(output) => result.hdd = Some(output),
                StressorResult::Iomix(output) => result.iomix = Some(output),
                StressorResult::Sock(output) => result.sock = Some(output),
            }
        }

        result
    }

    /// The common metrics of the given kind, if it was reported.
    pub fn common(&self, kind: StressorKind) -> Option<&CommonOutput> {
        match kind {
            StressorKind::Cpu => self.cpu.as_ref(),
            StressorKind::Vm => self.vm.as_ref(),
            StressorKind::Mmap => self.mmap.as_ref(),
            StressorKind::Matrix => self.matrix.as_ref().map(|output| &output.common),
            StressorKind::Mq => self.mq.as_ref(),
            StressorKind::Hdd => self.hdd.as_ref().map(|output| &output.common),
            StressorKind::Iomix => self.iomix.as_ref().map(|output| &output.common),
            StressorKind::Sock => self.sock.as_ref(),
        }
    }

    /// Every reported kind in catalog order.
    pub fn reported(&self) -> Vec<(StressorKind, &CommonOutput)> {
        StressorKind::ALL
            .iter()
            .filter_map(|kind| self.common(*kind).map(|output| (*kind, output)))
            .collect()
    }
}

/// The job file and the report of one run. Dropping this removes the report, and the job file
/// too unless it was kept.
struct Artifacts {
    job: JobArtifact,
    report: NamedTempFile,
}

enum JobArtifact {
    Scoped(NamedTempFile),
    Kept(PathBuf),
}

impl Artifacts {
    fn create(run_id: &str, job_text: &str, keep_job: bool) -> Result<Self, Failure> {
        let mut job = tempfile::Builder::new()
            .prefix(&format!("stressbench-{}-", run_id))
            .suffix(".job")
            .tempfile()
            .map_err(|e| Failure::artifact("create job file in", std::env::temp_dir(), e))?;
        job.write_all(job_text.as_bytes())
            .and_then(|_| job.flush())
            .map_err(|e| Failure::artifact("write job file", job.path(), e))?;

        let job = if keep_job {
            let path = job.path().to_path_buf();
            let (_, path) = job
                .keep()
                .map_err(|e| Failure::artifact("keep job file", path, e.error))?;
            JobArtifact::Kept(path)
        } else {
            JobArtifact::Scoped(job)
        };

        let report = tempfile::Builder::new()
            .prefix(&format!("stressbench-{}-", run_id))
            .suffix(".yaml")
            .tempfile()
            .map_err(|e| Failure::artifact("create report file in", std::env::temp_dir(), e))?;

        Ok(Artifacts { job, report })
    }

    fn job_path(&self) -> &Path {
        match &self.job {
            JobArtifact::Scoped(file) => file.path(),
            JobArtifact::Kept(path) => path,
        }
    }

    fn report_path(&self) -> &Path {
        self.report.path()
    }

    fn read_report(&self) -> Result<String, Failure> {
        fs::read_to_string(self.report_path())
            .map_err(|e| Failure::artifact("read report", self.report_path(), e))
    }
}

/// Drives one run: encode, execute, decode, assemble.
pub struct Orchestrator<R> {
    runner: R,
}

impl<R: ProcessRunner> Orchestrator<R> {
    pub fn new(runner: R) -> Self {
        Orchestrator { runner }
    }

    pub fn run(&self, config: RunConfig) -> Result<WorkloadResult, WorkloadError> {
        let run_id = nanoid::nanoid!(5, &nanoid::alphabet::SAFE);
        let span = info_span!("workload", run_id = %run_id);
        let _enter = span.enter();

        let job_text = jobfile::encode(&config)
            .map_err(|e| WorkloadError::from_stage(Stage::Encode, e))?;
        debug!("Job file:\n{}", job_text);

        let artifacts = Artifacts::create(&run_id, &job_text, !config.cleanup)
            .map_err(|e| WorkloadError::from_stage(Stage::Artifacts, e))?;
        if let JobArtifact::Kept(path) = &artifacts.job {
            info!("Job file kept at {}", path.display());
        }

        let workdir = config.workdir.clone().unwrap_or_else(std::env::temp_dir);
        let output = self
            .runner
            .run(&Invocation {
                job_file: artifacts.job_path(),
                report_file: artifacts.report_path(),
                workdir: &workdir,
            })
            .map_err(|e| WorkloadError::from_stage(Stage::Execute, e))?;
        debug!("stress-ng output:\n{}", output);

        let report = artifacts
            .read_report()
            .and_then(|text| report::decode(&text))
            .map_err(|e| WorkloadError::from_stage(Stage::Decode, e))?;

        info!(
            "Workload run complete, {} stressor(s) reported",
            report.results.len()
        );
        Ok(WorkloadResult::assemble(run_id, config, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stressor::{cpu::CpuStressor, mq::MqStressor, StressorSpec};
    use std::cell::RefCell;

    /// Copies a fixture into the report path and records the paths it was given.
    struct FakeRunner {
        report: &'static str,
        seen: RefCell<Option<(PathBuf, PathBuf, PathBuf)>>,
    }

    impl FakeRunner {
        fn new(report: &'static str) -> Self {
            FakeRunner {
                report,
                seen: RefCell::new(None),
            }
        }
    }

    impl ProcessRunner for FakeRunner {
        fn run(&self, invocation: &Invocation) -> Result<String, Failure> {
            *self.seen.borrow_mut() = Some((
                invocation.job_file.to_path_buf(),
                invocation.report_file.to_path_buf(),
                invocation.workdir.to_path_buf(),
            ));
            fs::write(invocation.report_file, self.report)
                .map_err(|e| Failure::artifact("write report", invocation.report_file, e))?;
            Ok(String::new())
        }
    }

    struct FailingRunner;

    impl ProcessRunner for FailingRunner {
        fn run(&self, _invocation: &Invocation) -> Result<String, Failure> {
            Err(Failure::ToolExecution {
                code: Some(1),
                output: "stress-ng: FATAL: no stressors".to_string(),
            })
        }
    }

    fn cpu_config(cleanup: bool) -> RunConfig {
        RunConfig {
            timeout: 5,
            stressors: vec![StressorSpec::Cpu(CpuStressor {
                workers: 2,
                ..CpuStressor::default()
            })],
            cleanup,
            ..RunConfig::default()
        }
    }

    #[test]
    fn cleanup_removes_both_artifacts() -> anyhow::Result<()> {
        let runner = FakeRunner::new("metrics: []\nsystem-info: {}\n");
        let orchestrator = Orchestrator::new(runner);

        // an empty system-info fails decoding, artifacts must still go away
        let result = orchestrator.run(cpu_config(true));
        assert!(result.is_err());

        let (job, report, _) = orchestrator.runner.seen.take().expect("runner was called");
        assert!(!job.exists());
        assert!(!report.exists());
        Ok(())
    }

    #[test]
    fn job_file_is_kept_without_cleanup() -> anyhow::Result<()> {
        let orchestrator = Orchestrator::new(FakeRunner::new(""));
        let result = orchestrator.run(cpu_config(false));
        assert!(result.is_ok());

        let (job, report, workdir) = orchestrator.runner.seen.take().expect("runner was called");
        assert_eq!(fs::read_to_string(&job)?, "timeout 5\ncpu 2\ncpu-method all\n");
        assert!(!report.exists());
        assert_eq!(workdir, std::env::temp_dir());
        fs::remove_file(job)?;
        Ok(())
    }

    #[test]
    fn empty_report_gives_empty_slots() -> anyhow::Result<()> {
        let result = Orchestrator::new(FakeRunner::new("")).run(cpu_config(true))?;
        assert_eq!(result.system_info, None);
        assert!(result.reported().is_empty());
        assert_eq!(result.test_config, cpu_config(true));
        Ok(())
    }

    #[test]
    fn tool_failure_names_stage_code_and_output() {
        let err = Orchestrator::new(FailingRunner)
            .run(cpu_config(true))
            .expect_err("run should fail");
        assert!(err.error.starts_with("execute stage failed"));
        assert!(err.error.contains("return code 1"));
        assert!(err.error.contains("stress-ng: FATAL: no stressors"));
    }

    #[test]
    fn encode_failure_never_reaches_the_runner() {
        let orchestrator = Orchestrator::new(FakeRunner::new(""));
        let config = RunConfig {
            timeout: 5,
            stressors: vec![StressorSpec::Mq(MqStressor::default())],
            taskset: Some("0, 1".to_string()),
            ..RunConfig::default()
        };

        let err = orchestrator.run(config).expect_err("run should fail");
        assert!(err.error.starts_with("encode stage failed"));
        assert!(orchestrator.runner.seen.take().is_none());
    }

    #[test]
    fn uses_the_configured_workdir() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let orchestrator = Orchestrator::new(FakeRunner::new(""));
        let config = RunConfig {
            workdir: Some(dir.path().to_path_buf()),
            ..cpu_config(true)
        };
        orchestrator.run(config)?;

        let (_, _, workdir) = orchestrator.runner.seen.take().expect("runner was called");
        assert_eq!(workdir, dir.path());
        Ok(())
    }
}
