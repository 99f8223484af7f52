/*
 * This Source Code Form is subject to the terms of the Mozilla Public
 * License, v. 2.0. If a copy of the MPL was not distributed with this
 * file, You can obtain one at https://mozilla.org/MPL/2.0/.
 */

use crate::workload::WorkloadResult;
use colored::*;
use term_table::{row, row::Row, rows, table_cell::*, Table, TableStyle};

/// One line describing the host stress-ng ran on.
pub fn host_line(result: &WorkloadResult) -> String {
    match &result.system_info {
        Some(info) => format!(
            "stress-ng {} on {} ({} {}, {}/{} CPUs online) by {} at {} {}",
            info.stress_ng_version,
            info.hostname,
            info.sysname,
            info.release,
            info.cpus_online,
            info.cpus,
            info.run_by,
            info.date,
            info.time
        ),
        None => "stress-ng did not report any system info".to_string(),
    }
}

/// Renders the reported metrics as a table, one row per stressor kind.
pub fn render(result: &WorkloadResult) -> String {
    let reported = result.reported();
    if reported.is_empty() {
        return format!("{}", "No stressor reported any metrics".yellow());
    }

    let mut rows = rows![row![
        TableCell::builder("Stressor".bold()).build(),
        TableCell::builder("Bogo ops".bold()).build(),
        TableCell::builder("Ops/s (real)".bold()).build(),
        TableCell::builder("Ops/s (usr+sys)".bold()).build(),
        TableCell::builder("Wall clock (s)".bold()).build(),
        TableCell::builder("CPU/instance (%)".bold()).build(),
        TableCell::builder("Max RSS (KB)".bold()).build()
    ]];

    for (kind, output) in reported {
        rows.push(Row::new(vec![
            TableCell::new(kind.as_str().green()),
            TableCell::new(output.bogo_ops),
            TableCell::new(format!("{:.2}", output.bogo_ops_per_second_real_time)),
            TableCell::new(format!("{:.2}", output.bogo_ops_per_second_usr_sys_time)),
            TableCell::new(format!("{:.2}", output.wall_clock_time)),
            TableCell::new(format!("{:.2}", output.cpu_usage_per_instance)),
            TableCell::new(output.max_rss),
        ]));
    }

    Table::builder()
        .rows(rows)
        .style(TableStyle::rounded())
        .build()
        .render()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{report, RunConfig};
    use std::{fs, path::Path};

    fn result_from(fixture: &str) -> anyhow::Result<WorkloadResult> {
        let text = fs::read_to_string(Path::new("./fixtures/reports").join(fixture))?;
        let report = report::decode(&text)?;
        Ok(WorkloadResult::assemble("abcde".to_string(), RunConfig::default(), report))
    }

    #[test]
    fn table_has_a_row_per_reported_kind() -> anyhow::Result<()> {
        colored::control::set_override(false);
        let table = render(&result_from("all.yaml")?);
        for kind in ["cpu", "vm", "mmap", "matrix", "mq", "hdd", "iomix", "sock"] {
            assert!(table.contains(kind), "missing {} in\n{}", kind, table);
        }
        assert!(table.contains("41672"));
        Ok(())
    }

    #[test]
    fn host_line_names_the_host() -> anyhow::Result<()> {
        let line = host_line(&result_from("cpu.yaml")?);
        assert!(line.contains("bench-01"));
        assert!(line.contains("8/8 CPUs online"));
        Ok(())
    }
}
