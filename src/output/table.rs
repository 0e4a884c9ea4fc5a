use comfy_table::presets::UTF8_FULL;
use comfy_table::{Cell, Color, ContentArrangement, Row, Table};

use crate::advisor::{Recommendation, RecommendationKind};
use crate::classify::{RangeCheck, RangeStatus};
use crate::output::format_value;
use crate::solver::{Solution, Strategy};

fn new_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

pub fn render_solution_table(solution: &Solution) -> String {
    let mut table = new_table();
    table.set_header(vec!["Item", "Value"]);

    let strategy = format!("{:?}", solution.strategy).to_uppercase();
    let strategy_cell = match solution.strategy {
        Strategy::Direct => Cell::new(strategy).fg(Color::Green),
        Strategy::Sequential => Cell::new(strategy).fg(Color::Yellow),
        Strategy::Aeration => Cell::new(strategy).fg(Color::Red),
    };
    table.add_row(Row::from(vec![Cell::new("Strategy"), strategy_cell]));

    for (agent, amount) in &solution.doses {
        table.add_row(vec![format!("Dose {agent}"), format!("{amount:.2} units")]);
    }
    for (parameter, value) in &solution.projected {
        table.add_row(vec![
            format!("Projected {parameter}"),
            format_value(*parameter, *value),
        ]);
    }
    table.to_string()
}

pub fn render_checks_table(checks: &[RangeCheck]) -> String {
    let mut table = new_table();
    table.set_header(vec![
        "Parameter",
        "Value",
        "Target",
        "Range",
        "Status",
        "Deviation",
    ]);

    for check in checks {
        let status_cell = match (check.status, check.above_hard_ceiling) {
            (_, true) => Cell::new("ABOVE CEILING").fg(Color::Red),
            (RangeStatus::OutOfRange, false) => Cell::new("OUT").fg(Color::Red),
            (RangeStatus::WithinRange, false) => Cell::new("OK").fg(Color::Green),
        };
        table.add_row(Row::from(vec![
            Cell::new(check.parameter.to_string()),
            Cell::new(format_value(check.parameter, check.value)),
            Cell::new(format_value(check.parameter, check.target)),
            Cell::new(format!(
                "{} - {}",
                format_value(check.parameter, check.min),
                format_value(check.parameter, check.max)
            )),
            status_cell,
            Cell::new(
                check
                    .deviation
                    .map(|d| format_value(check.parameter, d))
                    .unwrap_or_else(|| "-".to_string()),
            ),
        ]));
    }
    table.to_string()
}

pub fn render_recommendations_table(items: &[Recommendation]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Priority", "Kind", "Action", "Doses", "Rationale"]);

    for item in items {
        let kind = Cell::new(item.kind.as_slug()).fg(match item.kind {
            RecommendationKind::Chemistry => Color::Green,
            RecommendationKind::Retest => Color::Cyan,
            RecommendationKind::Aeration | RecommendationKind::Maintenance => Color::Yellow,
        });
        let doses = if item.doses.is_empty() {
            "-".to_string()
        } else {
            item.doses
                .iter()
                .map(|(agent, amount)| format!("{amount:.2} {}", agent.as_slug()))
                .collect::<Vec<_>>()
                .join(", ")
        };
        table.add_row(Row::from(vec![
            Cell::new(item.priority.to_string()),
            kind,
            Cell::new(&item.title),
            Cell::new(doses),
            Cell::new(&item.rationale),
        ]));
    }
    table.to_string()
}

/// Two-column summary for single-value results.
pub fn render_key_value_table(rows: &[(&str, String)]) -> String {
    let mut table = new_table();
    table.set_header(vec!["Field", "Value"]);
    for (key, value) in rows {
        table.add_row(vec![key.to_string(), value.clone()]);
    }
    table.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chemistry::ChemistryModel;
    use crate::solver::solve_ph_ta;

    #[test]
    fn solution_table_lists_doses_and_projection() {
        let solution = solve_ph_ta(&ChemistryModel::standard(), 8.0, 50.0);
        let rendered = render_solution_table(&solution);
        assert!(rendered.contains("DIRECT"));
        assert!(rendered.contains("Dose Sodium Bisulfate"));
        assert!(rendered.contains("Projected pH"));
        assert!(rendered.contains("7.20"));
    }
}
