/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

tag_enum! {
    /// Memory access pattern used by the vm workers.
    pub enum VmMethod {
        All => "all",
        CacheLines => "cache-lines",
        CacheStripe => "cache-stripe",
        Checkerboard => "checkerboard",
        Flip => "flip",
        Fwdrev => "fwdrev",
        Galpat0 => "galpat-0",
        Galpat1 => "galpat-1",
        Gray => "gray",
        Grayflip => "grayflip",
        Incdec => "incdec",
        IncNybble => "inc-nybble",
        Lfsr32 => "lfsr32",
        ModuloX => "modulo-x",
        MoveInv => "move-inv",
        Mscan => "mscan",
        Prime0 => "prime-0",
        Prime1 => "prime-1",
        PrimeGray0 => "prime-gray-0",
        PrimeGray1 => "prime-gray-1",
        PrimeIncdec => "prime-incdec",
        RandSet => "rand-set",
        RandSum => "rand-sum",
        Read64 => "read64",
        Ror => "ror",
        Swap => "swap",
        Walk0a => "walk-0a",
        Walk0d => "walk-0d",
        Walk1a => "walk-1a",
        Walk1d => "walk-1d",
        Write64 => "write64",
        Write64nt => "write64nt",
        Write1024v => "write1024v",
        Wrrd128nt => "wrrd128nt",
        ZeroOne => "zero-one",
    }
}

tag_enum! {
    /// Advice passed to madvise(2) for the mapped vm regions.
    pub enum VmMadvise {
        Cold => "cold",
        Dontneed => "dontneed",
        Hugepage => "hugepage",
        Mergeable => "mergeable",
        Nohugepage => "nohugepage",
        Normal => "normal",
        Pageout => "pageout",
        Random => "random",
        Sequential => "sequential",
        Unmergeable => "unmergeable",
        Willneed => "willneed",
    }
}

fn default_method() -> Option<VmMethod> {
    Some(VmMethod::All)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct VmStressor {
    pub workers: u32,

    /// Memory per vm worker, e.g. `256M` or `50%`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_bytes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_ops: Option<u64>,

    /// Seconds to sleep before unmapping memory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_hang: Option<u64>,

    /// Keep re-using the mapping instead of unmapping and remapping it.
    #[serde(default)]
    pub vm_keep: bool,

    #[serde(default)]
    pub vm_locked: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vm_madvise: Option<VmMadvise>,

    #[serde(default = "default_method", skip_serializing_if = "Option::is_none")]
    pub vm_method: Option<VmMethod>,

    #[serde(default)]
    pub vm_populate: bool,
}

impl Default for VmStressor {
    fn default() -> Self {
        VmStressor {
            workers: 0,
            vm_bytes: None,
            vm_ops: None,
            vm_hang: None,
            vm_keep: false,
            vm_locked: false,
            vm_madvise: None,
            vm_method: default_method(),
            vm_populate: false,
        }
    }
}

impl VmStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.text("vm-bytes", self.vm_bytes.as_deref())?
            .option("vm-ops", self.vm_ops)?
            .option("vm-hang", self.vm_hang)?
            .switch("vm-keep", self.vm_keep)
            .switch("vm-locked", self.vm_locked)
            .option("vm-madvise", self.vm_madvise)?
            .option("vm-method", self.vm_method)?
            .switch("vm-populate", self.vm_populate);
        Ok(())
    }
}
