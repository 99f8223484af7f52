/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{config::RunConfig, errors::Failure, stressor::StressorKind};
use itertools::Itertools;
use std::fmt::Display;

/// Line oriented writer for the stress-ng job file grammar. Every directive is either a bare
/// name (a switch) or `name value`, and ends with a newline.
#[derive(Debug, Default)]
pub struct JobFile {
    text: String,
}

impl JobFile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes the `<kind> <workers>` line that opens a stressor block.
    pub fn header(&mut self, kind: StressorKind, workers: u32) -> &mut Self {
        self.push_line(kind.as_str(), Some(&workers.to_string()));
        self
    }

    /// Writes `name value`. Values are single tokens so anything with whitespace is refused.
    pub fn directive(&mut self, name: &str, value: impl Display) -> Result<&mut Self, Failure> {
        let value = value.to_string();
        if value.is_empty() {
            return Err(Failure::Encoding(format!("`{}` has an empty value", name)));
        }
        if value.chars().any(char::is_whitespace) {
            return Err(Failure::Encoding(format!(
                "value {:?} of `{}` contains whitespace",
                value, name
            )));
        }
        self.push_line(name, Some(&value));
        Ok(self)
    }

    /// Writes `name value` when a value is present.
    pub fn option<T: Display>(&mut self, name: &str, value: Option<T>) -> Result<&mut Self, Failure> {
        match value {
            Some(value) => self.directive(name, value),
            None => Ok(self),
        }
    }

    /// Magnitude strings such as `256M` go through verbatim. Empty strings count as unset.
    pub fn text(&mut self, name: &str, value: Option<&str>) -> Result<&mut Self, Failure> {
        self.option(name, value.filter(|value| !value.is_empty()))
    }

    /// Switches are emission only: `true` writes the bare name, `false` writes nothing.
    pub fn switch(&mut self, name: &str, on: bool) -> &mut Self {
        if on {
            self.push_line(name, None);
        }
        self
    }

    /// Writes `name a,b,c` in the given order. Empty lists are skipped.
    pub fn list<T: Display>(&mut self, name: &str, values: &[T]) -> Result<&mut Self, Failure> {
        if values.is_empty() {
            return Ok(self);
        }
        self.directive(name, values.iter().join(","))
    }

    pub fn finish(self) -> String {
        self.text
    }

    fn push_line(&mut self, name: &str, value: Option<&str>) {
        self.text.push_str(name);
        if let Some(value) = value {
            self.text.push(' ');
            self.text.push_str(value);
        }
        self.text.push('\n');
    }
}

/// Encodes a run configuration into job file text: the global directives first, then one block
/// per stressor in input order.
pub fn encode(config: &RunConfig) -> Result<String, Failure> {
    config.validate()?;

    let mut job = JobFile::new();
    job.directive("timeout", config.timeout)?;
    job.switch("verbose", config.verbose)
        .switch("metrics-brief", config.metrics_brief)
        .switch("page-in", config.page_in);
    job.text("taskset", config.taskset.as_deref())?;

    for stressor in config.stressors.iter() {
        stressor.write_directives(&mut job)?;
    }

    Ok(job.finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stressor::{
        cpu::{CpuMethod, CpuStressor},
        hdd::{HddOpt, HddStressor},
        iomix::IomixStressor,
        matrix::{MatrixMethod, MatrixStressor},
        mmap::MmapStressor,
        mq::MqStressor,
        sock::SockStressor,
        vm::{VmMethod, VmStressor},
        StressorSpec,
    };
    use std::{fs, path::Path};

    fn run_config(stressors: Vec<StressorSpec>) -> RunConfig {
        RunConfig {
            timeout: 5,
            stressors,
            ..RunConfig::default()
        }
    }

    fn reference(name: &str) -> anyhow::Result<String> {
        Ok(fs::read_to_string(Path::new("./fixtures/jobfiles").join(name))?)
    }

    #[test]
    fn cpu_jobfile_matches_the_documented_layout() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Cpu(CpuStressor {
            workers: 2,
            cpu_ops: Some(1000),
            cpu_load: Some(5),
            cpu_method: Some(CpuMethod::All),
            ..CpuStressor::default()
        })]);

        let text = encode(&config)?;
        assert_eq!(
            text,
            "timeout 5\ncpu 2\ncpu-ops 1000\ncpu-load 5\ncpu-method all\n"
        );
        assert_eq!(text, reference("cpu")?);
        Ok(())
    }

    #[test]
    fn vm_jobfile_matches_reference() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Vm(VmStressor {
            workers: 1,
            vm_bytes: Some("100M".to_string()),
            vm_ops: Some(1000),
            vm_hang: Some(1),
            vm_keep: true,
            vm_locked: true,
            vm_method: Some(VmMethod::All),
            vm_populate: true,
            ..VmStressor::default()
        })]);

        assert_eq!(encode(&config)?, reference("vm")?);
        Ok(())
    }

    #[test]
    fn mmap_jobfile_matches_reference() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Mmap(MmapStressor {
            workers: 1,
            mmap_ops: Some(1000),
            mmap_async: true,
            mmap_bytes: Some("100M".to_string()),
            mmap_file: true,
            mmap_mmap2: true,
            mmap_mprotect: true,
            mmap_odirect: true,
            mmap_osync: true,
        })]);

        assert_eq!(encode(&config)?, reference("mmap")?);
        Ok(())
    }

    #[test]
    fn matrix_jobfile_matches_reference() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Matrix(MatrixStressor {
            workers: 1,
            matrix_ops: Some(1000),
            matrix_method: Some(MatrixMethod::All),
            matrix_size: Some(1000),
            matrix_yx: true,
        })]);

        assert_eq!(encode(&config)?, reference("matrix")?);
        Ok(())
    }

    #[test]
    fn mq_jobfile_matches_reference() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Mq(MqStressor {
            workers: 1,
            mq_ops: Some(10_000_000),
            mq_size: Some(32),
        })]);

        assert_eq!(encode(&config)?, reference("mq")?);
        Ok(())
    }

    #[test]
    fn hdd_jobfile_matches_reference() -> anyhow::Result<()> {
        let config = run_config(vec![StressorSpec::Hdd(HddStressor {
            workers: 1,
            hdd_bytes: Some("100M".to_string()),
            hdd_opts: vec![HddOpt::Direct, HddOpt::Fsync, HddOpt::WrRnd],
            hdd_ops: Some(10000),
            hdd_write_size: Some("4M".to_string()),
        })]);

        assert_eq!(encode(&config)?, reference("hdd")?);
        Ok(())
    }

    #[test]
    fn encoding_is_deterministic() -> anyhow::Result<()> {
        let config = RunConfig::try_from_path(Path::new("./fixtures/stressbench.toml"))?;
        let first = encode(&config)?;
        let second = encode(&config.clone())?;
        assert_eq!(first, second);
        Ok(())
    }

    #[test]
    fn unset_options_are_omitted_but_header_is_kept() -> anyhow::Result<()> {
        let config = run_config(vec![
            StressorSpec::Cpu(CpuStressor {
                workers: 0,
                cpu_method: None,
                ..CpuStressor::default()
            }),
            StressorSpec::Mq(MqStressor::default()),
            StressorSpec::Hdd(HddStressor {
                hdd_bytes: Some(String::new()),
                ..HddStressor::default()
            }),
        ]);

        assert_eq!(encode(&config)?, "timeout 5\ncpu 0\nmq 0\nhdd 0\n");
        Ok(())
    }

    #[test]
    fn default_stressors_write_headers_and_method_defaults_only() -> anyhow::Result<()> {
        let config = run_config(vec![
            StressorSpec::Cpu(CpuStressor::default()),
            StressorSpec::Vm(VmStressor::default()),
            StressorSpec::Mmap(MmapStressor::default()),
            StressorSpec::Matrix(MatrixStressor::default()),
            StressorSpec::Mq(MqStressor::default()),
            StressorSpec::Hdd(HddStressor::default()),
            StressorSpec::Iomix(IomixStressor::default()),
            StressorSpec::Sock(SockStressor::default()),
        ]);

        assert_eq!(
            encode(&config)?,
            "timeout 5\n\
             cpu 0\ncpu-method all\n\
             vm 0\nvm-method all\n\
             mmap 0\n\
             matrix 0\nmatrix-method all\n\
             mq 0\n\
             hdd 0\n\
             iomix 0\n\
             sock 0\n"
        );
        Ok(())
    }

    #[test]
    fn global_switches_emit_bare_names() -> anyhow::Result<()> {
        let config = RunConfig {
            verbose: true,
            metrics_brief: false,
            page_in: true,
            taskset: Some("0,2-3".to_string()),
            ..run_config(vec![StressorSpec::Mq(MqStressor::default())])
        };

        assert_eq!(
            encode(&config)?,
            "timeout 5\nverbose\npage-in\ntaskset 0,2-3\nmq 0\n"
        );
        Ok(())
    }

    #[test]
    fn duplicate_kinds_are_emitted_independently() -> anyhow::Result<()> {
        let config = run_config(vec![
            StressorSpec::Mq(MqStressor {
                workers: 1,
                ..MqStressor::default()
            }),
            StressorSpec::Mq(MqStressor {
                workers: 3,
                mq_size: Some(8),
                ..MqStressor::default()
            }),
        ]);

        assert_eq!(encode(&config)?, "timeout 5\nmq 1\nmq 3\nmq-size 8\n");
        Ok(())
    }

    #[test]
    fn list_options_keep_order_and_duplicates() -> anyhow::Result<()> {
        let mut job = JobFile::new();
        job.list("hdd-opts", &[HddOpt::WrSeq, HddOpt::Direct, HddOpt::WrSeq])?;
        job.list::<HddOpt>("hdd-opts", &[])?;
        assert_eq!(job.finish(), "hdd-opts wr-seq,direct,wr-seq\n");
        Ok(())
    }

    #[test]
    fn values_with_whitespace_are_refused() {
        let config = run_config(vec![StressorSpec::Vm(VmStressor {
            vm_bytes: Some("1 G".to_string()),
            ..VmStressor::default()
        })]);

        assert!(matches!(encode(&config), Err(Failure::Encoding(_))));
    }

    #[test]
    fn empty_stressor_list_is_refused() {
        assert!(matches!(
            encode(&run_config(vec![])),
            Err(Failure::Encoding(_))
        ));
    }
}
