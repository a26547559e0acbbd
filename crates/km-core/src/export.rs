//! Flat CSV export of assembled curves.

use std::io::Write;

use km_model::CurveSet;

use crate::error::Result;

pub const CSV_HEADER: [&str; 9] = [
    "arm",
    "time",
    "at_risk",
    "events",
    "censored",
    "survival",
    "std_error",
    "lower",
    "upper",
];

/// Write one row per step of every estimated arm, arms in display order.
/// Arms reported as insufficient are omitted.
pub fn write_curves_csv<W: Write>(curves: &CurveSet, writer: W) -> Result<()> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(CSV_HEADER)?;
    for (arm, function) in curves.estimated() {
        for point in &function.points {
            csv.write_record([
                arm.label().to_string(),
                format!("{:.6}", point.time),
                point.at_risk.to_string(),
                point.events.to_string(),
                point.censored.to_string(),
                format!("{:.6}", point.survival),
                format!("{:.6}", point.std_error),
                format!("{:.6}", point.lower),
                format!("{:.6}", point.upper),
            ])?;
        }
    }
    csv.flush()?;
    Ok(())
}
