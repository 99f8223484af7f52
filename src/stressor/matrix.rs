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
    pub enum MatrixMethod {
        All => "all",
        Add => "add",
        Copy => "copy",
        Div => "div",
        Frobenius => "frobenius",
        Hadamard => "hadamard",
        Identity => "identity",
        Mean => "mean",
        Mult => "mult",
        Negate => "negate",
        Prod => "prod",
        Sub => "sub",
        Square => "square",
        Trans => "trans",
        Zero => "zero",
    }
}

fn default_method() -> Option<MatrixMethod> {
    Some(MatrixMethod::All)
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MatrixStressor {
    pub workers: u32,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_ops: Option<u64>,

    #[serde(default = "default_method", skip_serializing_if = "Option::is_none")]
    pub matrix_method: Option<MatrixMethod>,

    /// Matrices are `matrix_size` x `matrix_size` floats.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub matrix_size: Option<u64>,

    /// Walk the matrices in y, x order instead of x, y.
    #[serde(default)]
    pub matrix_yx: bool,
}

impl Default for MatrixStressor {
    fn default() -> Self {
        MatrixStressor {
            workers: 0,
            matrix_ops: None,
            matrix_method: default_method(),
            matrix_size: None,
            matrix_yx: false,
        }
    }
}

impl MatrixStressor {
    pub(crate) fn write_options(&self, job: &mut JobFile) -> Result<(), Failure> {
        job.option("matrix-ops", self.matrix_ops)?
            .option("matrix-method", self.matrix_method)?
            .option("matrix-size", self.matrix_size)?
            .switch("matrix-yx", self.matrix_yx);
        Ok(())
    }
}

/// Per method throughput in matrix operations per second. Only the methods that actually ran
/// are reported, so every rate is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MatrixRates {
    pub add: Option<f64>,
    pub copy: Option<f64>,
    pub div: Option<f64>,
    pub frobenius: Option<f64>,
    pub hadamard: Option<f64>,
    pub identity: Option<f64>,
    pub mean: Option<f64>,
    pub mult: Option<f64>,
    pub negate: Option<f64>,
    pub prod: Option<f64>,
    pub square: Option<f64>,
    pub sub: Option<f64>,
    pub trans: Option<f64>,
    pub zero: Option<f64>,
}

impl MatrixRates {
    fn decode(entry: &Section) -> Result<Self, Failure> {
        let rate = |method: &str| entry.optional_float(&format!("{}-matrix-ops-per-sec", method));
        Ok(MatrixRates {
            add: rate("add")?,
            copy: rate("copy")?,
            div: rate("div")?,
            frobenius: rate("frobenius")?,
            hadamard: rate("hadamard")?,
            identity: rate("identity")?,
            mean: rate("mean")?,
            mult: rate("mult")?,
            negate: rate("negate")?,
            prod: rate("prod")?,
            square: rate("square")?,
            sub: rate("sub")?,
            trans: rate("trans")?,
            zero: rate("zero")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixOutput {
    #[serde(flatten)]
    pub common: CommonOutput,
    pub rates: MatrixRates,
}

impl MatrixOutput {
    pub(crate) fn decode(entry: &Section) -> Result<Self, Failure> {
        Ok(MatrixOutput {
            common: CommonOutput::decode(entry)?,
            rates: MatrixRates::decode(entry)?,
        })
    }
}
