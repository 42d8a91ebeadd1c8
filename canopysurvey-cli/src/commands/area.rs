//! Area command - resolve and print a target polygon's net area.

use std::path::Path;

use console::style;

use canopysurvey::TargetArea;

use crate::error::CliError;

/// Run the area command.
pub fn run(polygon: &Path) -> Result<(), CliError> {
    let payload = std::fs::read_to_string(polygon)?;
    let target = TargetArea::from_geojson(&payload)?;

    println!(
        "{} {} ({})",
        style("Target:").bold(),
        target.id(),
        target.kind()
    );
    println!(
        "  Outer rings: {}  Inner rings: {}",
        target.outer_rings().len(),
        target.inner_rings().len()
    );
    println!(
        "  Net area:    {} m2",
        style(format!("{:.1}", target.resolve_area())).green()
    );
    Ok(())
}
