/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

tag_enum! {
    /// Fine grained choice of the computation the cpu stressor runs.
    pub enum CpuMethod {
        All => "all",
        Ackermann => "ackermann",
        Apery => "apery",
        Bitops => "bitops",
        Callfunc => "callfunc",
        Cdouble => "cdouble",
        Cfloat => "cfloat",
        Clongdouble => "clongdouble",
        Collatz => "collatz",
        Correlate => "correlate",
        Crc16 => "crc16",
        Dither => "dither",
        Div8 => "div8",
        Div16 => "div16",
        Div32 => "div32",
        Div64 => "div64",
        Div128 => "div128",
        Double => "double",
        Euler => "euler",
        Explog => "explog",
        Factorial => "factorial",
        Fibonacci => "fibonacci",
        Fft => "fft",
        Fletcher16 => "fletcher16",
        Float => "float",
        Float32 => "float32",
        Float64 => "float64",
        Float80 => "float80",
        Float128 => "float128",
        Floatconversion => "floatconversion",
        Gamma => "gamma",
        Gcd => "gcd",
        Gray => "gray",
        Hamming => "hamming",
        Hanoi => "hanoi",
        Hyperbolic => "hyperbolic",
        Idct => "idct",
        Int8 => "int8",
        Int16 => "int16",
        Int32 => "int32",
        Int64 => "int64",
        Int128 => "int128",
        Int64Float => "int64float",
        Int64Double => "int64double",
        Intconversion => "intconversion",
        Ipv4checksum => "ipv4checksum",
        Jmp => "jmp",
        Lfsr32 => "lfsr32",
        Ln2 => "ln2",
        Logmap => "logmap",
        Longdouble => "longdouble",
        Loop => "loop",
        Matrixprod => "matrixprod",
        Nsqrt => "nsqrt",
        Omega => "omega",
        Parity => "parity",
        Phi => "phi",
        Pi => "pi",
        Prime => "prime",
        Psi => "psi",
        Queens => "queens",
        Rand => "rand",
        Rand48 => "rand48",
        Rgb => "rgb",
        Sieve => "sieve",
        Stats => "stats",
        Sqrt => "sqrt",
        Trig => "trig",
        Union => "union",
        Zeta => "zeta",
    }
}

fn default_method() -> Option<CpuMethod> {
    Some(CpuMethod::All)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct CpuStressor {
    pub workers: u32,

    /// Stop after this many bogo operations.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_ops: Option<u64>,

    /// Load each CPU by this percentage.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_load: Option<u8>,

    /// Length of each busy/idle slice in milliseconds when `cpu_load` is used.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu_load_slice: Option<i64>,

    #[serde(default = "default_method", skip_serializing_if = "Option::is_none")]
    pub cpu_method: Option<CpuMethod>,
}

impl Default for CpuStressor {
    fn default() -> Self {
        CpuStressor {
            workers: 0,
            cpu_ops: None,
            cpu_load: None,
            cpu_load_slice: None,
            cpu_method: default_method(),
        }
    }
}

impl CpuStressor {
    pub fn validate(&self) -> Result<(), Failure> {
        match self.cpu_load {
            Some(load) if load > 100 => Err(Failure::Encoding(format!(
                "cpu-load must be a percentage, got {}",
                load
            ))),
            _ => Ok(()),
        }
    }

    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.option("cpu-ops", self.cpu_ops)?
            .option("cpu-load", self.cpu_load)?
            .option("cpu-load-slice", self.cpu_load_slice)?
            .option("cpu-method", self.cpu_method)?;
        Ok(())
    }
}
