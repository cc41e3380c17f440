use anyhow::Result;
use colored::Colorize;
use fco_core::{
    EfficientPlan, PositionResult, Rarity, RarityCounts, ValueUnit, format_bp, format_ovr,
};
use serde::Serialize;
use std::io::Write;

use super::simulation::{DrawBatchSummary, UpgradeCampaignSummary};

/// Output format selected with `--report`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Console,
    Json,
    Markdown,
}

impl ReportFormat {
    /// Parse the `--report` value; anything unrecognised falls back to console.
    #[must_use]
    pub fn from_flag(flag: &str) -> Self {
        match flag {
            "json" => Self::Json,
            "markdown" => Self::Markdown,
            _ => Self::Console,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PositionRow {
    pub id: String,
    pub display_name: String,
    pub stat_count: usize,
    pub weight_sum: f64,
    pub top_stats: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoxRow {
    pub id: String,
    pub name: String,
    pub value_unit: ValueUnit,
    pub cost: u64,
    pub reward_count: usize,
    pub expected_value: f64,
    pub expires_at: Option<String>,
    pub purchase_limit: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpgradeTarget {
    pub stat: String,
    pub weight: f64,
    pub impact: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreReport {
    pub position_id: String,
    pub display_name: String,
    pub score: f64,
    pub boosted_score: f64,
    pub top_targets: Vec<UpgradeTarget>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlanReport {
    pub position_id: String,
    pub display_name: String,
    pub base_score: f64,
    pub plan: EfficientPlan,
}

/// Everything a subcommand can report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "data", rename_all = "snake_case")]
pub enum Report {
    Positions(Vec<PositionRow>),
    Boxes(Vec<BoxRow>),
    Score(ScoreReport),
    Rank(Vec<PositionResult>),
    Plan(PlanReport),
    Upgrade(UpgradeCampaignSummary),
    Draw(DrawBatchSummary),
}

/// Render `report` in `format`.
///
/// # Errors
///
/// Returns an error when writing or JSON serialisation fails.
pub fn write_report(out: &mut dyn Write, format: ReportFormat, report: &Report) -> Result<()> {
    match format {
        ReportFormat::Json => generate_json_report(out, report),
        ReportFormat::Markdown => generate_markdown_report(out, report),
        ReportFormat::Console => generate_console_report(out, report),
    }
}

pub fn generate_json_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    serde_json::to_writer_pretty(&mut *out, report)?;
    writeln!(out)?;
    Ok(())
}

fn value_label(unit: ValueUnit, value: u64) -> String {
    match unit {
        ValueUnit::Bp => format!("{} BP", format_bp(value)),
        ValueUnit::Count => value.to_string(),
    }
}

fn rarity_colored(rarity: Rarity) -> colored::ColoredString {
    let key = rarity.key();
    match rarity {
        Rarity::Legendary => key.bright_yellow().bold(),
        Rarity::Epic => key.magenta(),
        Rarity::Rare => key.blue(),
        Rarity::Uncommon => key.green(),
        Rarity::Common => key.normal(),
    }
}

fn section(out: &mut dyn Write, title: &str) -> Result<()> {
    writeln!(out, "{}", title.bright_cyan().bold())?;
    writeln!(out, "{}", "=".repeat(title.chars().count()).cyan())?;
    Ok(())
}

pub fn generate_console_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Positions(rows) => {
            section(out, "Positions")?;
            for row in rows {
                writeln!(
                    out,
                    "{:5} {:24} {:2} stats, top: {}",
                    row.id.bold(),
                    row.display_name,
                    row.stat_count,
                    row.top_stats.join(", ")
                )?;
            }
        }
        Report::Boxes(rows) => {
            section(out, "Boxes")?;
            for row in rows {
                writeln!(out, "{} ({})", row.name.bold(), row.id)?;
                writeln!(
                    out,
                    "   Cost: {}  Rewards: {}  Expected value: {:.2}",
                    format_bp(row.cost),
                    row.reward_count,
                    row.expected_value
                )?;
                if let Some(limit) = row.purchase_limit {
                    writeln!(out, "   Purchase limit: {limit}")?;
                }
                if let Some(expires) = &row.expires_at {
                    writeln!(out, "   Expires: {expires}")?;
                }
            }
        }
        Report::Score(score) => {
            section(out, "Position Score")?;
            writeln!(out, "{} ({})", score.display_name.bold(), score.position_id)?;
            writeln!(
                out,
                "OVR: {} ({})",
                format_ovr(score.score, true).green().bold(),
                format_ovr(score.score, false)
            )?;
            writeln!(
                out,
                "With top boosts: {}",
                format_ovr(score.boosted_score, true).green()
            )?;
            writeln!(out)?;
            writeln!(out, "Top upgrade targets:")?;
            for target in &score.top_targets {
                writeln!(
                    out,
                    "  • {} weight {:.0}, +{:.2} OVR per upgrade",
                    target.stat, target.weight, target.impact
                )?;
            }
        }
        Report::Rank(results) => {
            section(out, "Position Ranking")?;
            for (index, result) in results.iter().enumerate() {
                writeln!(
                    out,
                    "{:2}. {:5} {:>6} -> {:>6} (+{:.2})",
                    index + 1,
                    result.position_id.bold(),
                    format_ovr(result.base_score, true),
                    format_ovr(result.boosted_score, true).green(),
                    result.gain()
                )?;
            }
        }
        Report::Plan(plan) => write_console_plan(out, plan)?,
        Report::Upgrade(summary) => write_console_upgrade(out, summary)?,
        Report::Draw(summary) => write_console_draw(out, summary)?,
    }
    Ok(())
}

fn write_console_plan(out: &mut dyn Write, report: &PlanReport) -> Result<()> {
    let plan = &report.plan;
    section(out, "Efficient Upgrade Plan")?;
    writeln!(out, "{} ({})", report.display_name.bold(), report.position_id)?;
    writeln!(out, "Current OVR: {}", format_ovr(report.base_score, true))?;
    writeln!(
        out,
        "Full boost: {} (floor {})",
        format_ovr(plan.full_boost_score, true),
        plan.floored_full_boost_score
    )?;
    writeln!(
        out,
        "Minimum boosts needed: {} reaching {}",
        plan.minimum_boosts_needed.to_string().green().bold(),
        format_ovr(plan.minimum_boost_score, true)
    )?;
    if plan.saved_boosts > 0 {
        writeln!(
            out,
            "Saves {} boost(s)",
            plan.saved_boosts.to_string().green()
        )?;
    }
    writeln!(out, "Boost: {}", plan.recommended_stats.join(", "))?;
    Ok(())
}

fn write_console_upgrade(out: &mut dyn Write, summary: &UpgradeCampaignSummary) -> Result<()> {
    section(out, "Upgrade Campaigns")?;
    writeln!(out, "Seed: {}", summary.seed.seed)?;
    writeln!(
        out,
        "Level {} -> {} with boost {:.1}{}",
        summary.start_level,
        summary.target_level,
        summary.boost,
        if summary.protect { " (protected)" } else { "" }
    )?;
    writeln!(out, "First attempt chance: {:.2}%", summary.first_attempt_chance)?;
    writeln!(
        out,
        "Campaigns reaching target: {}/{}",
        summary.campaigns_reaching_target.to_string().green(),
        summary.iterations
    )?;
    writeln!(
        out,
        "Attempts: {} ({} success, {} fail)",
        summary.total_attempts,
        summary.total_successes.to_string().green(),
        summary.total_failures.to_string().red()
    )?;
    writeln!(out, "Success rate: {:.2}%", summary.success_rate)?;
    match summary.mean_attempts_to_target {
        Some(mean) => writeln!(out, "Mean attempts to target: {mean:.2}")?,
        None => writeln!(out, "Mean attempts to target: {}", "never reached".yellow())?,
    }
    writeln!(
        out,
        "Catastrophic drops: {}",
        summary.catastrophic_drops.to_string().red()
    )?;
    writeln!(out, "Highest level: +{}", summary.highest_level)?;
    writeln!(out, "Mean final level: {:.2}", summary.mean_final_level)?;
    writeln!(out, "Mean rating bonus: +{:.2}", summary.mean_rating_bonus)?;
    Ok(())
}

fn write_console_rarities(out: &mut dyn Write, counts: &RarityCounts) -> Result<()> {
    writeln!(out, "Rarities:")?;
    for (rarity, count) in counts.iter() {
        writeln!(out, "  {:10} {count}", rarity_colored(rarity))?;
    }
    Ok(())
}

fn write_console_draw(out: &mut dyn Write, summary: &DrawBatchSummary) -> Result<()> {
    let unit = summary.value_unit;
    section(out, "Box Draws")?;
    writeln!(out, "Seed: {}", summary.seed.seed)?;
    writeln!(out, "{} ({})", summary.box_name.bold(), summary.box_id)?;
    writeln!(
        out,
        "Opened: {} ({} x {})",
        summary.total_opened, summary.batches, summary.draws_per_batch
    )?;
    writeln!(out, "Earned: {}", value_label(unit, summary.total_earned))?;
    writeln!(out, "Spent: {}", format_bp(summary.total_spent))?;
    if unit == ValueUnit::Bp {
        let profit = format!("{:.0}", summary.profit);
        let colored_profit = if summary.profit >= 0.0 {
            profit.green()
        } else {
            profit.red()
        };
        writeln!(out, "Profit: {colored_profit}")?;
    }
    writeln!(
        out,
        "Mean per draw: {:.2} (expected {:.2})",
        summary.mean_value_per_draw, summary.expected_value_per_draw
    )?;
    if let Some(best) = &summary.best {
        writeln!(
            out,
            "Best: {} [{}] {}",
            best.reward.name.bold(),
            rarity_colored(best.reward.rarity),
            value_label(unit, best.realized_value)
        )?;
    }
    write_console_rarities(out, &summary.rarity_counts)?;
    Ok(())
}

pub fn generate_markdown_report(out: &mut dyn Write, report: &Report) -> Result<()> {
    match report {
        Report::Positions(rows) => {
            writeln!(out, "# Positions\n")?;
            writeln!(out, "| Id | Name | Stats | Top stats |")?;
            writeln!(out, "|----|------|-------|-----------|")?;
            for row in rows {
                writeln!(
                    out,
                    "| {} | {} | {} | {} |",
                    row.id,
                    row.display_name,
                    row.stat_count,
                    row.top_stats.join(", ")
                )?;
            }
        }
        Report::Boxes(rows) => {
            writeln!(out, "# Boxes\n")?;
            writeln!(out, "| Id | Name | Cost | Rewards | Expected value |")?;
            writeln!(out, "|----|------|------|---------|----------------|")?;
            for row in rows {
                writeln!(
                    out,
                    "| {} | {} | {} | {} | {:.2} |",
                    row.id, row.name, row.cost, row.reward_count, row.expected_value
                )?;
            }
        }
        Report::Score(score) => {
            writeln!(out, "# {} ({})\n", score.display_name, score.position_id)?;
            writeln!(out, "- **OVR**: {}", format_ovr(score.score, true))?;
            writeln!(
                out,
                "- **With top boosts**: {}\n",
                format_ovr(score.boosted_score, true)
            )?;
            writeln!(out, "| Stat | Weight | Impact |")?;
            writeln!(out, "|------|--------|--------|")?;
            for target in &score.top_targets {
                writeln!(
                    out,
                    "| {} | {:.0} | {:.2} |",
                    target.stat, target.weight, target.impact
                )?;
            }
        }
        Report::Rank(results) => {
            writeln!(out, "# Position Ranking\n")?;
            writeln!(out, "| # | Position | Base | Boosted | Boost targets |")?;
            writeln!(out, "|---|----------|------|---------|---------------|")?;
            for (index, result) in results.iter().enumerate() {
                writeln!(
                    out,
                    "| {} | {} | {:.2} | {:.2} | {} |",
                    index + 1,
                    result.position_id,
                    result.base_score,
                    result.boosted_score,
                    result.top_boost_targets.join(", ")
                )?;
            }
        }
        Report::Plan(report) => {
            let plan = &report.plan;
            writeln!(out, "# Efficient Upgrade Plan: {}\n", report.position_id)?;
            writeln!(out, "- **Current OVR**: {:.2}", report.base_score)?;
            writeln!(out, "- **Full boost**: {:.2}", plan.full_boost_score)?;
            writeln!(
                out,
                "- **Minimum boosts needed**: {}",
                plan.minimum_boosts_needed
            )?;
            writeln!(out, "- **Saved boosts**: {}", plan.saved_boosts)?;
            writeln!(
                out,
                "- **Recommended stats**: {}",
                plan.recommended_stats.join(", ")
            )?;
        }
        Report::Upgrade(summary) => {
            writeln!(out, "# Upgrade Campaigns\n")?;
            writeln!(out, "- **Seed**: {}", summary.seed.seed)?;
            writeln!(
                out,
                "- **Levels**: {} -> {}",
                summary.start_level, summary.target_level
            )?;
            writeln!(out, "- **Boost**: {:.1}", summary.boost)?;
            writeln!(out, "- **Protected**: {}", summary.protect)?;
            writeln!(
                out,
                "- **Reached target**: {}/{}",
                summary.campaigns_reaching_target, summary.iterations
            )?;
            writeln!(out, "- **Success rate**: {:.2}%", summary.success_rate)?;
            if let Some(mean) = summary.mean_attempts_to_target {
                writeln!(out, "- **Mean attempts to target**: {mean:.2}")?;
            }
            writeln!(
                out,
                "- **Catastrophic drops**: {}",
                summary.catastrophic_drops
            )?;
            writeln!(out, "- **Highest level**: {}", summary.highest_level)?;
        }
        Report::Draw(summary) => {
            writeln!(out, "# Box Draws: {}\n", summary.box_name)?;
            writeln!(out, "- **Seed**: {}", summary.seed.seed)?;
            writeln!(out, "- **Opened**: {}", summary.total_opened)?;
            writeln!(out, "- **Earned**: {}", summary.total_earned)?;
            writeln!(out, "- **Spent**: {}", summary.total_spent)?;
            writeln!(out, "- **Profit**: {:.0}\n", summary.profit)?;
            writeln!(out, "| Rarity | Count |")?;
            writeln!(out, "|--------|-------|")?;
            for (rarity, count) in summary.rarity_counts.iter() {
                writeln!(out, "| {rarity} | {count} |")?;
            }
        }
    }
    Ok(())
}
