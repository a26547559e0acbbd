//! Rendering of curve reports as terminal tables, JSON and CSV.

use comfy_table::modifiers::{UTF8_ROUND_CORNERS, UTF8_SOLID_INNER_BORDERS};
use comfy_table::presets::{UTF8_FULL, UTF8_FULL_CONDENSED};
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};

use km_core::write_curves_csv;
use km_model::{ArmOutcome, CurveSet, TreatmentArm};

use crate::pipeline::CurveReport;

/// Title, per-arm summary, optional risk table and the step table.
pub fn render_table(report: &CurveReport, risk_grid: &[f64], styled: bool) -> String {
    let curves = &report.curves;
    let mut tables = vec![arm_summary_table(curves)];
    if !risk_grid.is_empty() {
        tables.push(risk_table(curves, risk_grid));
    }
    tables.push(step_table(curves));

    let mut out = String::new();
    out.push_str(&report.title);
    out.push('\n');
    out.push_str(&format!(
        "Study: {}  Entries: {}  Excluded rows: {}  Time: {}\n",
        curves.study_id,
        report.cohort_size,
        report.exclusions.total(),
        curves.time_unit.axis_label()
    ));
    for mut table in tables {
        if !styled {
            table.force_no_tty();
        }
        out.push('\n');
        out.push_str(&table.to_string());
        out.push('\n');
    }
    out
}

pub fn render_json(report: &CurveReport) -> serde_json::Result<String> {
    serde_json::to_string_pretty(report)
}

pub fn render_csv(report: &CurveReport) -> km_core::Result<String> {
    let mut buffer = Vec::new();
    write_curves_csv(&report.curves, &mut buffer)?;
    Ok(String::from_utf8_lossy(&buffer).into_owned())
}

/// One row per arm: size, events, censorings and median survival.
pub fn arm_summary_table(curves: &CurveSet) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Arm"),
        header_cell("N"),
        header_cell("Events"),
        header_cell("Censored"),
        header_cell("Median"),
        header_cell("Status"),
    ]);
    apply_summary_table_style(&mut table);
    for index in 1..=4 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (arm, outcome) in &curves.arms {
        match outcome {
            ArmOutcome::Estimated(function) => {
                let median = match function.median_survival() {
                    Some(time) => Cell::new(format!("{time:.2}")),
                    None => dim_cell("NR"),
                };
                table.add_row(vec![
                    arm_cell(*arm),
                    Cell::new(function.n_subjects),
                    count_cell(function.n_events, Color::Red),
                    count_cell(function.n_censored, Color::Yellow),
                    median,
                    Cell::new("estimated").fg(Color::Green),
                ]);
            }
            ArmOutcome::Insufficient(data) => {
                table.add_row(vec![
                    arm_cell(*arm),
                    Cell::new(data.observed),
                    dim_cell("-"),
                    dim_cell("-"),
                    dim_cell("-"),
                    Cell::new("insufficient")
                        .fg(Color::Yellow)
                        .add_attribute(Attribute::Bold),
                ]);
            }
        }
    }
    table
}

/// Every step of every estimated arm.
pub fn step_table(curves: &CurveSet) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Arm"),
        header_cell("Time"),
        header_cell("At risk"),
        header_cell("Events"),
        header_cell("Censored"),
        header_cell("Survival"),
        header_cell("SE"),
        header_cell("Lower"),
        header_cell("Upper"),
    ]);
    apply_table_style(&mut table);
    for index in 1..=8 {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (arm, function) in curves.estimated() {
        for point in &function.points {
            table.add_row(vec![
                arm_cell(arm),
                Cell::new(format!("{:.2}", point.time)),
                Cell::new(point.at_risk),
                count_cell(point.events, Color::Red),
                count_cell(point.censored, Color::Yellow),
                Cell::new(format!("{:.4}", point.survival)),
                Cell::new(format!("{:.4}", point.std_error)),
                Cell::new(format!("{:.4}", point.lower)),
                Cell::new(format!("{:.4}", point.upper)),
            ]);
        }
    }
    table
}

/// Numbers at risk per estimated arm at the grid times.
pub fn risk_table(curves: &CurveSet, grid: &[f64]) -> Table {
    let mut table = Table::new();
    let mut header = vec![header_cell("At risk")];
    header.extend(grid.iter().map(|t| header_cell(&format!("{t}"))));
    table.set_header(header);
    apply_table_style(&mut table);
    for index in 1..=grid.len() {
        align_column(&mut table, index, CellAlignment::Right);
    }
    for (arm, counts) in curves.risk_table(grid) {
        let mut row = vec![arm_cell(arm)];
        row.extend(counts.into_iter().map(Cell::new));
        table.add_row(row);
    }
    table
}

/// The fixed arm set with its legend colours.
pub fn arms_table() -> Table {
    let mut table = Table::new();
    table.set_header(vec![header_cell("#"), header_cell("Arm"), header_cell("Colour")]);
    apply_table_style(&mut table);
    align_column(&mut table, 0, CellAlignment::Right);
    for arm in TreatmentArm::ALL {
        table.add_row(vec![
            Cell::new(arm.display_index()),
            arm_cell(arm),
            Cell::new(arm.color()).fg(arm_color(arm)),
        ]);
    }
    table
}

fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn apply_summary_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .apply_modifier(UTF8_SOLID_INNER_BORDERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
}

fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn arm_color(arm: TreatmentArm) -> Color {
    match arm {
        TreatmentArm::Placebo => Color::Blue,
        TreatmentArm::XanomelineLowDose => Color::Green,
        TreatmentArm::XanomelineHighDose => Color::Magenta,
    }
}

fn arm_cell(arm: TreatmentArm) -> Cell {
    Cell::new(arm.label())
        .fg(arm_color(arm))
        .add_attribute(Attribute::Bold)
}

fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color)
    } else {
        dim_cell(count)
    }
}

fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}
