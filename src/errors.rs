/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Everything that can go wrong between a `RunConfig` and a `WorkloadResult`. None of these are
/// retried, each one ends the run.
#[derive(Debug, Error)]
pub enum Failure {
    #[error("job file cannot be encoded: {0}")]
    Encoding(String),

    #[error("unable to {action} {}: {source}", .path.display())]
    ArtifactIo {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", tool_failure(.code, .output))]
    ToolExecution { code: Option<i32>, output: String },

    #[error("report is not valid YAML: {0}")]
    MalformedReport(String),

    #[error("{section}: field `{field}` {reason}")]
    SchemaViolation {
        section: String,
        field: String,
        reason: String,
    },

    #[error("report contains unknown stressor kind `{0}`")]
    UnknownStressorKind(String),
}

impl Failure {
    pub(crate) fn artifact(action: &'static str, path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Failure::ArtifactIo {
            action,
            path: path.into(),
            source,
        }
    }

    pub(crate) fn schema(
        section: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Failure::SchemaViolation {
            section: section.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

fn tool_failure(code: &Option<i32>, output: &str) -> String {
    match code {
        Some(code) => format!("stress-ng failed with return code {}:\n{}", code, output),
        None => format!("stress-ng did not exit normally:\n{}", output),
    }
}

/// The error channel of a run: a single human readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{error}")]
pub struct WorkloadError {
    pub error: String,
}

impl WorkloadError {
    pub fn new(error: impl Into<String>) -> Self {
        WorkloadError {
            error: error.into(),
        }
    }
}
