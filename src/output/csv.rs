use anyhow::Result;

use crate::advisor::Recommendation;
use crate::classify::RangeCheck;

pub fn checks_to_csv(checks: &[RangeCheck]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "parameter",
        "value",
        "target",
        "min",
        "max",
        "out_of_range",
        "deviation",
        "above_hard_ceiling",
    ])?;
    for check in checks {
        writer.write_record([
            check.parameter.as_slug().to_string(),
            check.value.to_string(),
            check.target.to_string(),
            check.min.to_string(),
            check.max.to_string(),
            check.status.is_out_of_range().to_string(),
            check.deviation.map(|d| format!("{d:.3}")).unwrap_or_default(),
            check.above_hard_ceiling.to_string(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}

pub fn recommendations_to_csv(items: &[Recommendation]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(vec![]);
    writer.write_record([
        "priority",
        "kind",
        "title",
        "doses",
        "aeration_hours",
        "rationale",
    ])?;
    for item in items {
        let doses = item
            .doses
            .iter()
            .map(|(agent, amount)| format!("{}={amount:.3}", agent.as_slug()))
            .collect::<Vec<_>>()
            .join(";");
        writer.write_record([
            item.priority.to_string(),
            item.kind.as_slug().to_string(),
            item.title.clone(),
            doses,
            item.aeration_hours
                .map(|h| format!("{h:.2}"))
                .unwrap_or_default(),
            item.rationale.clone(),
        ])?;
    }
    let data = writer.into_inner()?;
    Ok(String::from_utf8_lossy(&data).to_string())
}
