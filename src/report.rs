/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::{
    errors::Failure,
    stressor::{StressorKind, StressorResult},
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_yaml::{Mapping, Value};
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// A decoded stress-ng report. `system_info` is only absent when stress-ng wrote an empty report,
/// which happens when none of the stressors could run.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Report {
    pub system_info: Option<SystemInfo>,
    pub results: BTreeMap<StressorKind, StressorResult>,
}

impl Report {
    pub fn get(&self, kind: StressorKind) -> Option<&StressorResult> {
        self.results.get(&kind)
    }
}

/// Decodes the YAML report written by `stress-ng -Y`.
pub fn decode(text: &str) -> Result<Report, Failure> {
    let root: Value = if text.trim().is_empty() {
        Value::Null
    } else {
        serde_yaml::from_str(text).map_err(|e| Failure::MalformedReport(e.to_string()))?
    };

    if root.is_null() {
        debug!("stress-ng wrote an empty report, no stressors ran");
        return Ok(Report::default());
    }

    let root = Section::new("report", &root)?;
    let system_info = SystemInfo::decode(&root.section("system-info")?)?;

    let entries = match root.get("metrics") {
        None => vec![],
        Some(Value::Sequence(entries)) => entries.iter().collect(),
        Some(_) => return Err(Failure::schema("report", "metrics", "is not a sequence")),
    };

    let mut results = BTreeMap::new();
    for (idx, entry) in entries.into_iter().enumerate() {
        let entry = Section::nested("report", format!("metrics[{}]", idx), entry)?;
        let tag = entry.string("stressor")?;
        let kind = tag
            .parse::<StressorKind>()
            .map_err(|_| Failure::UnknownStressorKind(tag.clone()))?;

        let result = kind.decode(&entry)?;
        if results.insert(kind, result).is_some() {
            warn!(
                "stress-ng reported {} more than once, keeping the last entry",
                kind
            );
        }
    }

    Ok(Report {
        system_info: Some(system_info),
        results,
    })
}

/// A YAML mapping read with strict field checks. Every error names the section and the field.
pub(crate) struct Section<'a> {
    name: String,
    map: &'a Mapping,
}

impl<'a> Section<'a> {
    pub(crate) fn new(name: impl Into<String>, value: &'a Value) -> Result<Self, Failure> {
        let name = name.into();
        match value {
            Value::Mapping(map) => Ok(Section { name, map }),
            _ => Err(Failure::MalformedReport(format!("{} is not a mapping", name))),
        }
    }

    /// A mapping inside another section. Any other shape is a schema violation of the parent.
    fn nested(parent: &str, name: impl Into<String>, value: &'a Value) -> Result<Self, Failure> {
        let name = name.into();
        match value {
            Value::Mapping(map) => Ok(Section { name, map }),
            other => Err(Failure::schema(
                parent,
                name,
                format!("should be a mapping, found {}", describe(other)),
            )),
        }
    }

    fn section(&self, field: &str) -> Result<Section<'a>, Failure> {
        Section::nested(&self.name, field, self.require(field)?)
    }

    /// Fields set to `~` count as missing.
    fn get(&self, field: &str) -> Option<&'a Value> {
        self.map.get(field).filter(|value| !value.is_null())
    }

    fn require(&self, field: &str) -> Result<&'a Value, Failure> {
        self.get(field)
            .ok_or_else(|| Failure::schema(&self.name, field, "is missing"))
    }

    fn wrong_type(&self, field: &str, expected: &str, value: &Value) -> Failure {
        Failure::schema(
            &self.name,
            field,
            format!("should be {}, found {}", expected, describe(value)),
        )
    }

    pub(crate) fn string(&self, field: &str) -> Result<String, Failure> {
        match self.require(field)? {
            Value::String(s) => Ok(s.clone()),
            other => Err(self.wrong_type(field, "a string", other)),
        }
    }

    /// Versions like `0.17` are parsed as floats by YAML, so numbers are taken verbatim too.
    fn version(&self, field: &str) -> Result<String, Failure> {
        match self.require(field)? {
            Value::Number(n) => Ok(n.to_string()),
            _ => self.string(field),
        }
    }

    pub(crate) fn optional_string(&self, field: &str) -> Result<Option<String>, Failure> {
        match self.get(field) {
            Some(_) => self.string(field).map(Some),
            None => Ok(None),
        }
    }

    pub(crate) fn unsigned(&self, field: &str) -> Result<u64, Failure> {
        let value = self.require(field)?;
        value
            .as_u64()
            .ok_or_else(|| self.wrong_type(field, "an unsigned integer", value))
    }

    pub(crate) fn signed(&self, field: &str) -> Result<i64, Failure> {
        let value = self.require(field)?;
        value
            .as_i64()
            .ok_or_else(|| self.wrong_type(field, "an integer", value))
    }

    /// Integers are accepted as floats.
    pub(crate) fn float(&self, field: &str) -> Result<f64, Failure> {
        let value = self.require(field)?;
        value
            .as_f64()
            .ok_or_else(|| self.wrong_type(field, "a number", value))
    }

    /// For fields stress-ng only writes for some runs. Present but mistyped is still an error.
    pub(crate) fn optional_float(&self, field: &str) -> Result<Option<f64>, Failure> {
        match self.get(field) {
            Some(_) => self.float(field).map(Some),
            None => Ok(None),
        }
    }
}

fn describe(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// The `system-info` section: who ran stress-ng, where and when.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SystemInfo {
    pub stress_ng_version: String,
    /// Only written by recent stress-ng releases.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub compiler: Option<String>,
    pub run_by: String,
    pub date: String,
    pub time: String,
    pub epoch: i64,
    pub hostname: String,
    pub sysname: String,
    pub nodename: String,
    pub release: String,
    pub version: String,
    pub machine: String,
    pub uptime: u64,
    pub totalram: u64,
    pub freeram: u64,
    pub sharedram: u64,
    pub bufferram: u64,
    pub totalswap: u64,
    pub freeswap: u64,
    pub pagesize: u64,
    pub cpus: u64,
    pub cpus_online: u64,
    pub ticks_per_second: u64,
}

impl SystemInfo {
    pub(crate) fn decode(section: &Section) -> Result<Self, Failure> {
        Ok(SystemInfo {
            stress_ng_version: section.version("stress-ng-version")?,
            compiler: section.optional_string("compiler")?,
            run_by: section.string("run-by")?,
            date: section.string("date-yyyy-mm-dd")?,
            time: section.string("time-hh-mm-ss")?,
            epoch: section.signed("epoch-secs")?,
            hostname: section.string("hostname")?,
            sysname: section.string("sysname")?,
            nodename: section.string("nodename")?,
            release: section.string("release")?,
            version: section.string("version")?,
            machine: section.string("machine")?,
            uptime: section.unsigned("uptime")?,
            totalram: section.unsigned("totalram")?,
            freeram: section.unsigned("freeram")?,
            sharedram: section.unsigned("sharedram")?,
            bufferram: section.unsigned("bufferram")?,
            totalswap: section.unsigned("totalswap")?,
            freeswap: section.unsigned("freeswap")?,
            pagesize: section.unsigned("pagesize")?,
            cpus: section.unsigned("cpus")?,
            cpus_online: section.unsigned("cpus-online")?,
            ticks_per_second: section.unsigned("ticks-per-second")?,
        })
    }

    /// When the run started, from `epoch-secs`.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.epoch, 0)
    }
}

/// Metrics stress-ng reports for every stressor.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommonOutput {
    pub stressor: String,
    pub max_rss: u64,
    pub bogo_ops: u64,
    /// Bogo ops divided by user + system time: the real per CPU throughput.
    pub bogo_ops_per_second_usr_sys_time: f64,
    /// Bogo ops divided by wall clock time.
    pub bogo_ops_per_second_real_time: f64,
    pub wall_clock_time: f64,
    pub user_time: f64,
    pub system_time: f64,
    pub cpu_usage_per_instance: f64,
}

impl CommonOutput {
    pub(crate) fn decode(entry: &Section) -> Result<Self, Failure> {
        Ok(CommonOutput {
            stressor: entry.string("stressor")?,
            max_rss: entry.unsigned("max-rss")?,
            bogo_ops: entry.unsigned("bogo-ops")?,
            bogo_ops_per_second_usr_sys_time: entry.float("bogo-ops-per-second-usr-sys-time")?,
            bogo_ops_per_second_real_time: entry.float("bogo-ops-per-second-real-time")?,
            wall_clock_time: entry.float("wall-clock-time")?,
            user_time: entry.float("user-time")?,
            system_time: entry.float("system-time")?,
            cpu_usage_per_instance: entry.float("cpu-usage-per-instance")?,
        })
    }
}
