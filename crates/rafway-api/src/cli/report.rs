//! `rafway report`: the parent dashboard in the terminal.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use rafway_core::report::{LOCKED_MESSAGE, ReportView, view_report};
use rafway_types::report::ReportData;

use crate::state::AppState;

pub async fn report(state: &AppState, json: bool) -> Result<()> {
    let (_, profile) = super::require_sign_in(state).await?;
    let view = view_report(&profile, &state.report);

    if json {
        println!("{}", serde_json::to_string_pretty(&view)?);
        return Ok(());
    }

    match view {
        ReportView::Locked => {
            println!();
            println!("  {} {}", style("🔒").bold(), style(LOCKED_MESSAGE).yellow());
            println!("  {}", style("Run `rafway upgrade` to unlock it.").dim());
            println!();
        }
        ReportView::Available(report) => print_report(&report),
    }
    Ok(())
}

fn print_report(report: &ReportData) {
    println!();
    println!("  {} {}", style("📊").bold(), style("Bilan d'orientation").cyan().bold());
    if let Some(top) = report.strongest_trait() {
        println!(
            "  {} {}",
            style("Point fort :").bold(),
            style(&top.name).green()
        );
    }
    println!();

    let mut traits = Table::new();
    traits.load_preset(presets::UTF8_FULL_CONDENSED);
    traits.set_content_arrangement(ContentArrangement::Dynamic);
    traits.set_header(vec![
        Cell::new("Trait").fg(Color::White),
        Cell::new("Score").fg(Color::White),
        Cell::new("").fg(Color::White),
    ]);
    for t in &report.personality_traits {
        traits.add_row(vec![
            Cell::new(&t.name),
            Cell::new(t.value),
            Cell::new(bar(t.value)).fg(Color::Cyan),
        ]);
    }
    println!("{traits}");
    println!();

    let mut schools = Table::new();
    schools.load_preset(presets::UTF8_FULL_CONDENSED);
    schools.set_content_arrangement(ContentArrangement::Dynamic);
    schools.set_header(vec![
        Cell::new("École").fg(Color::White),
        Cell::new("Type").fg(Color::White),
        Cell::new("Lieu").fg(Color::White),
        Cell::new("Match").fg(Color::White),
    ]);
    for school in &report.recommended_schools {
        schools.add_row(vec![
            Cell::new(&school.name),
            Cell::new(&school.kind),
            Cell::new(&school.location),
            Cell::new(format!("{}%", school.match_score)).fg(Color::Green),
        ]);
    }
    println!("{schools}");
    println!();

    println!("  {}", style("Pistes métiers").bold());
    for path in &report.career_paths {
        println!("  {} {path}", style("•").cyan());
    }
    println!();
}

/// Ten-cell bar for a 0-100 score.
fn bar(value: u8) -> String {
    let filled = usize::from(value.min(100)) / 10;
    format!("{}{}", "█".repeat(filled), "░".repeat(10 - filled))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar() {
        assert_eq!(bar(0), "░░░░░░░░░░");
        assert_eq!(bar(85), "████████░░");
        assert_eq!(bar(250), "██████████");
    }
}
