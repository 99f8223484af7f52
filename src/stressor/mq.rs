/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

/// POSIX message queue stressor.
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MqStressor {
    pub workers: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mq_ops: Option<u64>,

    /// Number of messages in the queue.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mq_size: Option<u64>,
}

impl MqStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.option("mq-ops", self.mq_ops)?
            .option("mq-size", self.mq_size)?;
        Ok(())
    }
}
