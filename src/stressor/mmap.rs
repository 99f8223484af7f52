/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MmapStressor {
    pub workers: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmap_ops: Option<u64>,

    /// Flush pages with asynchronous msync.
    #[serde(default)]
    pub mmap_async: bool,

    /// Mapping size per worker, e.g. `100M`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mmap_bytes: Option<String>,

    /// Back the mapping with a file instead of anonymous memory.
    #[serde(default)]
    pub mmap_file: bool,

    #[serde(default)]
    pub mmap_mmap2: bool,

    #[serde(default)]
    pub mmap_mprotect: bool,

    #[serde(default)]
    pub mmap_odirect: bool,

    #[serde(default)]
    pub mmap_osync: bool,
}

impl MmapStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.option("mmap-ops", self.mmap_ops)?
            .switch("mmap-async", self.mmap_async)
            .text("mmap-bytes", self.mmap_bytes.as_deref())?
            .switch("mmap-file", self.mmap_file)
            .switch("mmap-mmap2", self.mmap_mmap2)
            .switch("mmap-mprotect", self.mmap_mprotect)
            .switch("mmap-odirect", self.mmap_odirect)
            .switch("mmap-osync", self.mmap_osync);
        Ok(())
    }
}
