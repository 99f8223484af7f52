/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    errors::Failure,
    jobfile::JobFile,
    report::{CommonOutput, Section},
};
use serde::{Deserialize, Serialize};

tag_enum! {
    /// I/O options for the hdd stressor, written as a comma separated list.
    pub enum HddOpt {
        Direct => "direct",
        Dsync => "dsync",
        Fadvdontneed => "fadv-dontneed",
        Fadvnoreuse => "fadv-noreuse",
        Fadvnormal => "fadv-normal",
        Fadvrnd => "fadv-rnd",
        Fadvseq => "fadv-seq",
        Fadvwillneed => "fadv-willneed",
        Fdatasync => "fdatasync",
        Fsync => "fsync",
        Iovec => "iovec",
        Noatime => "noatime",
        RdRnd => "rd-rnd",
        RdSeq => "rd-seq",
        Sync => "sync",
        Syncfs => "syncfs",
        Utimes => "utimes",
        WrRnd => "wr-rnd",
        WrSeq => "wr-seq",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct HddStressor {
    pub workers: u32,

    /// Bytes written by each worker, e.g. `1G`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdd_bytes: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub hdd_opts: Vec<HddOpt>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdd_ops: Option<u64>,

    /// Size of each write, from `1` byte up to `4M`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hdd_write_size: Option<String>,
}

impl HddStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.text("hdd-bytes", self.hdd_bytes.as_deref())?
            .list("hdd-opts", &self.hdd_opts)?
            .option("hdd-ops", self.hdd_ops)?
            .text("hdd-write-size", self.hdd_write_size.as_deref())?;
        Ok(())
    }
}

/// Throughput in MB/s. stress-ng leaves these out when nothing was read or written.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IoRates {
    pub read: Option<f64>,
    pub write: Option<f64>,
    pub read_write: Option<f64>,
}

/// Output of the stressors doing file I/O, `hdd` and `iomix`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IoOutput {
    #[serde(flatten)]
    pub common: CommonOutput,
    pub rates: IoRates,
}

impl IoOutput {
    pub(crate) fn decode(entry: &Section) -> Result<Self, Failure> {
        Ok(IoOutput {
            common: CommonOutput::decode(entry)?,
            rates: IoRates {
                read: entry.optional_float("mb-sec-read-rate")?,
                write: entry.optional_float("mb-sec-write-rate")?,
                read_write: entry.optional_float("mb-sec-read-write-combined-rate")?,
            },
        })
    }
}
