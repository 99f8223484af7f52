/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{errors::Failure, jobfile::JobFile};
use serde::{Deserialize, Serialize};

tag_enum! {
    pub enum SockDomain {
        Ipv4 => "ipv4",
        Ipv6 => "ipv6",
        Unix => "unix",
    }
}

tag_enum! {
    /// How the sock clients send their data.
    pub enum SockOpts {
        Random => "random",
        Send => "send",
        Sendmsg => "sendmsg",
        Sendmmsg => "sendmmsg",
    }
}

tag_enum! {
    pub enum SockType {
        Stream => "stream",
        Seqpacket => "seqpacket",
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SockStressor {
    pub workers: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_domain: Option<SockDomain>,

    /// Network interface to bind to, e.g. `lo`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_if: Option<String>,

    /// Disable Nagle's algorithm.
    #[serde(default)]
    pub sock_nodelay: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_ops: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_opts: Option<SockOpts>,

    /// First port of the range used by the workers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_port: Option<u16>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sock_type: Option<SockType>,

    #[serde(default)]
    pub sock_zerocopy: bool,
}

impl SockStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.option("sock-domain", self.sock_domain)?
            .text("sock-if", self.sock_if.as_deref())?
            .switch("sock-nodelay", self.sock_nodelay)
            .option("sock-ops", self.sock_ops)?
            .option("sock-opts", self.sock_opts)?
            .option("sock-port", self.sock_port)?
            .option("sock-type", self.sock_type)?
            .switch("sock-zerocopy", self.sock_zerocopy);
        Ok(())
    }
}
