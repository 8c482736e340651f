use comfy_table::{Attribute, Cell, CellAlignment, Color, Table, modifiers, presets};

use crate::{
    quantity::energy::KilowattHours,
    sim::{ChargeEvent, Summary},
};

#[must_use]
pub fn build_summary_table(summary: &Summary) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Metric", "Value"]);
    table.add_row(vec![
        Cell::new("Distance"),
        Cell::new(format!("{:.1} km", summary.distance / 1000.0))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Duration"),
        Cell::new(format!("{:.0} min", summary.duration / 60.0))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Electric energy"),
        Cell::new(summary.electric_energy).set_alignment(CellAlignment::Right).fg(Color::Green),
    ]);
    table.add_row(vec![
        Cell::new("Combustion energy"),
        Cell::new(summary.combustion_energy).set_alignment(CellAlignment::Right).fg(
            if summary.combustion_energy > KilowattHours::ZERO {
                Color::Red
            } else {
                Color::Reset
            },
        ),
    ]);
    table.add_row(vec![
        Cell::new("Fuel equivalent"),
        Cell::new(format!("{:.3} gal", summary.fuel_gallons)).set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Emissions (electric)"),
        Cell::new(format!("{:.3} kg CO₂e", summary.electric_emissions_kg))
            .set_alignment(CellAlignment::Right),
    ]);
    table.add_row(vec![
        Cell::new("Emissions (combustion)"),
        Cell::new(format!("{:.3} kg CO₂e", summary.combustion_emissions_kg))
            .set_alignment(CellAlignment::Right),
    ]);
    if summary.degenerate_time_deltas != 0 {
        table.add_row(vec![
            Cell::new("Degenerate timestamps"),
            Cell::new(summary.degenerate_time_deltas)
                .set_alignment(CellAlignment::Right)
                .fg(Color::DarkYellow),
        ]);
    }
    table
}

#[must_use]
pub fn build_charge_table(events: &[ChargeEvent]) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED).apply_modifier(modifiers::UTF8_ROUND_CORNERS);
    table.enforce_styling();
    table.set_header(vec!["Station", "Location", "Energy", "Time at charger"]);
    for event in events {
        let energy = match event.energy_delivered {
            Some(energy) => Cell::new(energy).fg(Color::Green),
            // The trip ended before the vehicle reached the station.
            None => Cell::new("en route").fg(Color::DarkYellow).add_attribute(Attribute::Dim),
        };
        let duration = match event.charge_duration {
            Some(duration) => Cell::new(format!("{:.0} min", duration.0 / 60.0)),
            None => Cell::new("—").add_attribute(Attribute::Dim),
        };
        table.add_row(vec![
            Cell::new(&event.station_name),
            Cell::new(event.station_location).add_attribute(Attribute::Dim),
            energy.set_alignment(CellAlignment::Right),
            duration.set_alignment(CellAlignment::Right),
        ]);
    }
    table
}
