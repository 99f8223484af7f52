/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, stressor::StressorSpec};
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::{
    fs::{self, File},
    io::{Read, Write},
    path::{Path, PathBuf},
};

static EXAMPLE_CONFIG: &str = include_str!("templates/stressbench.toml");

// ******** ******** ********
// **    CONFIGURATION     **
// ******** ******** ********
/// Everything needed for one stress-ng run. Immutable once handed to the orchestrator.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct RunConfig {
    /// Run time of every stressor in seconds.
    pub timeout: u64,

    #[serde(rename(serialize = "stressor", deserialize = "stressor"))]
    pub stressors: Vec<StressorSpec>,

    #[serde(default)]
    pub verbose: bool,

    /// Only report the bogo-op metrics.
    #[serde(default)]
    pub metrics_brief: bool,

    /// Touch allocated pages that are not resident so they get paged in.
    #[serde(default)]
    pub page_in: bool,

    /// CPU list the stressors are pinned to, e.g. `0,2-3`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub taskset: Option<String>,

    /// Directory stress-ng runs in, e.g. to target a specific volume. Defaults to the system
    /// temporary directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workdir: Option<PathBuf>,

    /// Remove the job file once the run is over.
    #[serde(default)]
    pub cleanup: bool,
}

impl RunConfig {
    pub fn write_example_to_file(path: &Path) -> anyhow::Result<File> {
        let mut file = File::create_new(path)
            .context(format!("Unable to create {}", path.display()))?;
        file.write_all(EXAMPLE_CONFIG.as_bytes())?;
        Ok(file)
    }

    pub fn try_from_path(path: &Path) -> anyhow::Result<RunConfig> {
        let mut config_str = String::new();
        fs::File::open(path)
            .context(format!("Unable to open config file {}", path.display()))?
            .read_to_string(&mut config_str)?;
        RunConfig::try_from_str(&config_str).context(format!("Invalid config {}", path.display()))
    }

    pub fn try_from_str(conf_str: &str) -> anyhow::Result<RunConfig> {
        let config = toml::from_str::<RunConfig>(conf_str)
            .map_err(|e| anyhow::anyhow!("TOML parsing error: {}", e))?;
        config.validate()?;
        Ok(config)
    }

    /// stress-ng has nothing to do without stressors, and a zero timeout means "run forever".
    pub fn validate(&self) -> Result<(), Failure> {
        if self.timeout == 0 {
            return Err(Failure::Encoding("timeout must be at least one second".to_string()));
        }
        if self.stressors.is_empty() {
            return Err(Failure::Encoding("at least one stressor is required".to_string()));
        }
        for stressor in self.stressors.iter() {
            stressor.validate()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stressor::StressorKind;
    use itertools::Itertools;

    #[test]
    fn can_load_config_file() -> anyhow::Result<()> {
        let cfg = RunConfig::try_from_path(Path::new("./fixtures/stressbench.toml"))?;
        assert_eq!(cfg.timeout, 10);
        assert!(cfg.cleanup);
        assert_eq!(cfg.workdir, Some(PathBuf::from("/var/tmp")));

        let kinds = cfg.stressors.iter().map(|s| s.kind()).collect_vec();
        assert_eq!(
            kinds,
            [
                StressorKind::Cpu,
                StressorKind::Vm,
                StressorKind::Matrix,
                StressorKind::Hdd,
                StressorKind::Cpu
            ]
        );
        Ok(())
    }

    #[test]
    fn example_config_is_valid() -> anyhow::Result<()> {
        let cfg = RunConfig::try_from_str(EXAMPLE_CONFIG)?;
        assert!(!cfg.stressors.is_empty());
        Ok(())
    }

    #[test]
    fn can_write_example_config() -> anyhow::Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("stressbench.toml");
        RunConfig::write_example_to_file(&path)?;
        RunConfig::try_from_path(&path)?;

        // never overwrites an existing file
        assert!(RunConfig::write_example_to_file(&path).is_err());
        Ok(())
    }

    #[test]
    fn empty_stressor_list_is_rejected() {
        let cfg = RunConfig::try_from_str("timeout = 5\nstressor = []");
        assert!(cfg.is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        let cfg = RunConfig::try_from_str(
            "timeout = 0\n[[stressor]]\nstressor = \"cpu\"\nworkers = 1",
        );
        assert!(cfg.is_err());
    }

    #[test]
    fn missing_workers_is_rejected() {
        let cfg = RunConfig::try_from_str("timeout = 5\n[[stressor]]\nstressor = \"cpu\"");
        assert!(cfg.is_err());
    }
}
