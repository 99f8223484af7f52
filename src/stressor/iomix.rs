/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

/// Mixed sequential, random and memory mapped reads and writes. Reports the same rates as `hdd`
/// so its output is read into `hdd::IoOutput`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct IomixStressor {
    pub workers: u32,

    /// Size of the file each worker writes, e.g. `1G`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iomix_bytes: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iomix_ops: Option<u64>,
}

impl IomixStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.text("iomix-bytes", self.iomix_bytes.as_deref())?
            .option("iomix-ops", self.iomix_ops)?;
        Ok(())
    }
}
