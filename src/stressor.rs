/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

/// Declares a closed set of stress-ng option tags. Each variant maps to exactly one tag, which is
/// used for serde, `Display` (what goes into the job file) and `FromStr`.
macro_rules! tag_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $tag:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize)]
        pub enum $name {
            $(
                #[serde(rename = $tag)]
                $variant,
            )+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $tag,)+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = crate::stressor::UnknownTag;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($tag => Ok($name::$variant),)+
                    _ => Err(crate::stressor::UnknownTag(s.to_string())),
                }
            }
        }
    };
}

pub mod cpu;
pub mod hdd;
pub mod iomix;
pub mod matrix;
pub mod mmap;
pub mod mq;
pub mod sock;
pub mod vm;

use crate::{
    errors::Failure,
    jobfile::JobFile,
    report::{CommonOutput, Section},
};
use cpu::CpuStressor;
use hdd::{HddStressor, IoOutput};
use iomix::IomixStressor;
use matrix::{MatrixOutput, MatrixStressor};
use mmap::MmapStressor;
use mq::MqStressor;
use serde::{Deserialize, Serialize};
use sock::SockStressor;
use vm::VmStressor;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown tag `{0}`")]
pub struct UnknownTag(pub String);

tag_enum! {
    /// The stressors this crate knows how to configure and how to read back.
    pub enum StressorKind {
        Cpu => "cpu",
        Vm => "vm",
        Mmap => "mmap",
        Matrix => "matrix",
        Mq => "mq",
        Hdd => "hdd",
        Iomix => "iomix",
        Sock => "sock",
    }
}

impl StressorKind {
    /// Reads a report entry into the output record of this kind.
    pub(crate) fn decode(self, entry: &Section) -> Result<StressorResult, Failure> {
        let result = match self {
            StressorKind::Cpu => StressorResult::Cpu(CommonOutput::decode(entry)?),
            StressorKind::Vm => StressorResult::Vm(CommonOutput::decode(entry)?),
            StressorKind::Mmap => StressorResult::Mmap(CommonOutput::decode(entry)?),
            StressorKind::Matrix => StressorResult::Matrix(MatrixOutput::decode(entry)?),
            StressorKind::Mq => StressorResult::Mq(CommonOutput::decode(entry)?),
            StressorKind::Hdd => StressorResult::Hdd(IoOutput::decode(entry)?),
            StressorKind::Iomix => StressorResult::Iomix(IoOutput::decode(entry)?),
            StressorKind::Sock => StressorResult::Sock(CommonOutput::decode(entry)?),
        };
        Ok(result)
    }
}

/// One stressor of a run. The `stressor` field selects the variant.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(tag = "stressor", rename_all = "lowercase")]
pub enum StressorSpec {
    Cpu(CpuStressor),
    Vm(VmStressor),
    Mmap(MmapStressor),
    Matrix(MatrixStressor),
    Mq(MqStressor),
    Hdd(HddStressor),
    Iomix(IomixStressor),
    Sock(SockStressor),
}

impl StressorSpec {
    pub fn kind(&self) -> StressorKind {
        match self {
            StressorSpec::Cpu(_) => StressorKind::Cpu,
            StressorSpec::Vm(_) => StressorKind::Vm,
            StressorSpec::Mmap(_) => StressorKind::Mmap,
            StressorSpec::Matrix(_) => StressorKind::Matrix,
            StressorSpec::Mq(_) => StressorKind::Mq,
            StressorSpec::Hdd(_) => StressorKind::Hdd,
            StressorSpec::Iomix(_) => StressorKind::Iomix,
            StressorSpec::Sock(_) => StressorKind::Sock,
        }
    }

    /// Number of workers, `0` meaning one per online CPU. Never resolved here.
    pub fn workers(&self) -> u32 {
        match self {
            StressorSpec::Cpu(params) => params.workers,
            StressorSpec::Vm(params) => params.workers,
            StressorSpec::Mmap(params) => params.workers,
            StressorSpec::Matrix(params) => params.workers,
            StressorSpec::Mq(params) => params.workers,
            StressorSpec::Hdd(params) => params.workers,
            StressorSpec::Iomix(params) => params.workers,
            StressorSpec::Sock(params) => params.workers,
        }
    }

    pub fn validate(&self) -> Result<(), Failure> {
        match self {
            StressorSpec::Cpu(params) => params.validate(),
            StressorSpec::Vm(_)
            | StressorSpec::Mmap(_)
            | StressorSpec::Matrix(_)
            | StressorSpec::Mq(_)
            | StressorSpec::Hdd(_)
            | StressorSpec::Iomix(_)
            | StressorSpec::Sock(_) => Ok(()),
        }
    }

    /// Writes the `<kind> <workers>` header followed by every option that is set.
    pub(crate) fn write_directives(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.header(self.kind(), self.workers());
        match self {
            StressorSpec::Cpu(params) => params.write_options(job),
            StressorSpec::Vm(params) => params.write_options(job),
            StressorSpec::Mmap(params) => params.write_options(job),
            StressorSpec::Matrix(params) => params.write_options(job),
            StressorSpec::Mq(params) => params.write_options(job),
            StressorSpec::Hdd(params) => params.write_options(job),
            StressorSpec::Iomix(params) => params.write_options(job),
            StressorSpec::Sock(params) => params.write_options(job),
        }
    }
}

/// The metrics stress-ng reported for one stressor, typed by kind.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum StressorResult {
    Cpu(CommonOutput),
    Vm(CommonOutput),
    Mmap(CommonOutput),
    Matrix(MatrixOutput),
    Mq(CommonOutput),
    Hdd(IoOutput),
    Iomix(IoOutput),
    Sock(CommonOutput),
}

impl StressorResult {
    pub fn kind(&self) -> StressorKind {
        match self {
            StressorResult::Cpu(_) => StressorKind::Cpu,
            StressorResult::Vm(_) => StressorKind::Vm,
            StressorResult::Mmap(_) => StressorKind::Mmap,
            StressorResult::Matrix(_) => StressorKind::Matrix,
            StressorResult::Mq(_) => StressorKind::Mq,
            StressorResult::Hdd(_) => StressorKind::Hdd,
            StressorResult::Iomix(_) => StressorKind::Iomix,
            StressorResult::Sock(_) => StressorKind::Sock,
        }
    }

    /// The fields every stressor reports, whatever its kind.
    pub fn common(&self) -> &CommonOutput {
        match self {
            StressorResult::Cpu(output)
            | StressorResult::Vm(output)
            | StressorResult::Mmap(output)
            | StressorResult::Mq(output)
            | StressorResult::Sock(output) => output,
            StressorResult::Matrix(output) => &output.common,
            StressorResult::Hdd(output) | StressorResult::Iomix(output) => &output.common,
        }
    }
}
