mod logic;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use fco_core::constants::{MAX_LEVEL, MAX_STAT_UPGRADES};
use fco_core::scoring::score_with_upgrades;
use fco_core::{StatTable, SystemClock, Toolkit};
use std::fs::File;
use std::io::{BufWriter, Write, stdout};
use std::path::PathBuf;

use logic::{
    BoxRow, DrawBatch, PlanReport, PositionRow, Report, ReportFormat, ScoreReport, StatsArgs,
    UpgradeCampaign, UpgradeTarget, resolve_seed, run_draw_batches, run_upgrade_campaigns,
    write_report,
};

#[derive(Debug, Parser)]
#[command(name = "fco-sim", version)]
#[command(about = "FC Online toolkit: position ratings, upgrade campaigns and box draws")]
struct Args {
    #[command(subcommand)]
    command: Command,

    /// Seed for upgrade and draw simulations (decimal or 0x hex); omitted draws a fresh one
    #[arg(long, global = true)]
    seed: Option<String>,

    /// Output report format
    #[arg(long, default_value = "console", global = true)]
    #[arg(value_parser = ["json", "markdown", "console"])]
    report: String,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Optional path to write the report output instead of stdout
    #[arg(long, global = true)]
    output: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List positions with their heaviest stats
    Positions,
    /// List the loot boxes and their expected value
    Boxes,
    /// Weighted OVR at one position
    Score {
        #[arg(long)]
        position: String,
        #[command(flatten)]
        stats: StatsArgs,
    },
    /// Rank every position by boosted OVR
    Rank {
        #[command(flatten)]
        stats: StatsArgs,
    },
    /// Fewest boosts reaching the full-boost OVR floor
    Plan {
        #[arg(long)]
        position: String,
        #[command(flatten)]
        stats: StatsArgs,
    },
    /// Simulate upgrade attempts
    Upgrade(UpgradeArgs),
    /// Simulate opening a box
    Draw(DrawArgs),
}

#[derive(Debug, Clone, clap::Args)]
struct UpgradeArgs {
    /// Starting level (1-13)
    #[arg(long, default_value_t = 1)]
    level: u8,

    /// Boost amount (0-5)
    #[arg(long, default_value_t = 5.0)]
    boost: f64,

    /// Level to stop at; defaults to one above the start
    #[arg(long)]
    target: Option<u8>,

    /// Attempt cap per campaign
    #[arg(long, default_value_t = 1)]
    max_attempts: u32,

    /// Keep the level on failure
    #[arg(long)]
    protect: bool,

    /// Number of independent campaigns
    #[arg(long, default_value_t = 1)]
    iterations: u32,
}

impl UpgradeArgs {
    fn campaign(&self) -> UpgradeCampaign {
        UpgradeCampaign {
            start_level: self.level,
            target_level: self
                .target
                .unwrap_or_else(|| self.level.saturating_add(1).min(MAX_LEVEL)),
            boost: self.boost,
            protect: self.protect,
            max_attempts: self.max_attempts,
            iterations: self.iterations,
        }
    }
}

#[derive(Debug, Clone, clap::Args)]
struct DrawArgs {
    /// Box id (see `boxes`)
    #[arg(long = "box")]
    box_id: String,

    /// Draws per batch (1-100)
    #[arg(long, default_value_t = 1)]
    count: u32,

    /// Number of batches
    #[arg(long, default_value_t = 1)]
    iterations: u32,
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);
    run(&args)
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

fn run(args: &Args) -> Result<()> {
    let toolkit = Toolkit::embedded().context("failed to load reference data")?;
    let report = build_report(args, &toolkit)?;
    write_reports(args, &report)
}

fn announce_banner(out: &mut dyn Write) -> Result<()> {
    writeln!(out, "{}", "⚽ FC Online Toolkit".bright_cyan().bold())?;
    writeln!(out, "{}", "====================".cyan())?;
    Ok(())
}

fn build_report(args: &Args, toolkit: &Toolkit) -> Result<Report> {
    let report = match &args.command {
        Command::Positions => Report::Positions(position_rows(toolkit)),
        Command::Boxes => Report::Boxes(box_rows(toolkit)),
        Command::Score { position, stats } => {
            let table = stats.build(toolkit.positions())?;
            Report::Score(score_report(toolkit, position, &table)?)
        }
        Command::Rank { stats } => {
            let table = stats.build(toolkit.positions())?;
            Report::Rank(toolkit.rank_positions(&table))
        }
        Command::Plan { position, stats } => {
            let table = stats.build(toolkit.positions())?;
            Report::Plan(plan_report(toolkit, position, &table)?)
        }
        Command::Upgrade(upgrade) => {
            let seed = resolve_seed(args.seed.as_deref())?;
            Report::Upgrade(run_upgrade_campaigns(
                toolkit,
                upgrade.campaign(),
                seed,
                &seed.bundle(),
            ))
        }
        Command::Draw(draw) => {
            let seed = resolve_seed(args.seed.as_deref())?;
            let batch = DrawBatch {
                box_id: draw.box_id.clone(),
                count: draw.count,
                iterations: draw.iterations,
            };
            Report::Draw(run_draw_batches(
                toolkit,
                &batch,
                seed,
                &seed.bundle(),
                &SystemClock,
            )?)
        }
    };
    Ok(report)
}

fn position_rows(toolkit: &Toolkit) -> Vec<PositionRow> {
    toolkit
        .positions()
        .iter()
        .map(|position| PositionRow {
            id: position.id.clone(),
            display_name: position.display_name.clone(),
            stat_count: position.stats.len(),
            weight_sum: position.weight_sum(),
            top_stats: toolkit
                .top_upgrade_targets(&position.id, MAX_STAT_UPGRADES)
                .into_iter()
                .map(|entry| entry.stat)
                .collect(),
        })
        .collect()
}

fn box_rows(toolkit: &Toolkit) -> Vec<BoxRow> {
    toolkit
        .boxes()
        .iter()
        .map(|definition| BoxRow {
            id: definition.id().to_string(),
            name: definition.name().to_string(),
            value_unit: definition.value_unit(),
            cost: definition.cost(),
            reward_count: definition.rewards().len(),
            expected_value: definition.expected_value(),
            expires_at: definition.expires_at().map(str::to_string),
            purchase_limit: definition.purchase_limit(),
        })
        .collect()
}

fn score_report(toolkit: &Toolkit, position_id: &str, stats: &StatTable) -> Result<ScoreReport> {
    let position = toolkit
        .positions()
        .get(position_id)
        .with_context(|| format!("unknown position {position_id}"))?;
    let targets = toolkit.top_upgrade_targets(position_id, MAX_STAT_UPGRADES);
    let names: Vec<&str> = targets.iter().map(|entry| entry.stat.as_str()).collect();
    let top_targets = targets
        .iter()
        .filter_map(|entry| {
            toolkit
                .upgrade_impact(&entry.stat, position_id)
                .map(|impact| UpgradeTarget {
                    stat: entry.stat.clone(),
                    weight: impact.weight,
                    impact: impact.impact,
                })
        })
        .collect();
    Ok(ScoreReport {
        position_id: position.id.clone(),
        display_name: position.display_name.clone(),
        score: toolkit.score_position(stats, position_id),
        boosted_score: score_with_upgrades(stats, &position.stats, &names),
        top_targets,
    })
}

fn plan_report(toolkit: &Toolkit, position_id: &str, stats: &StatTable) -> Result<PlanReport> {
    let position = toolkit
        .positions()
        .get(position_id)
        .with_context(|| format!("unknown position {position_id}"))?;
    let plan = toolkit
        .efficient_upgrade_plan(stats, position_id)
        .with_context(|| format!("no plan for position {position_id}"))?;
    Ok(PlanReport {
        position_id: position.id.clone(),
        display_name: position.display_name.clone(),
        base_score: toolkit.score_position(stats, position_id),
        plan,
    })
}

fn write_reports(args: &Args, report: &Report) -> Result<()> {
    let format = ReportFormat::from_flag(&args.report);
    let mut output_target = OutputTarget::new(args.output.clone())?;
    if format == ReportFormat::Console {
        announce_banner(output_target.writer())?;
    }
    write_report(output_target.writer(), format, report)?;
    output_target.flush_inner()?;
    Ok(())
}

enum OutputTarget {
    Stdout(BufWriter<std::io::Stdout>),
    File(BufWriter<File>),
}

impl OutputTarget {
    fn new(path: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = path {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            Ok(Self::File(BufWriter::new(file)))
        } else {
            Ok(Self::Stdout(BufWriter::new(stdout())))
        }
    }

    fn writer(&mut self) -> &mut dyn Write {
        match self {
            Self::Stdout(w) => w,
            Self::File(w) => w,
        }
    }

    fn flush_inner(&mut self) -> std::io::Result<()> {
        match self {
            Self::Stdout(w) => w.flush(),
            Self::File(w) => w.flush(),
        }
    }
}

impl Write for OutputTarget {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer().write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.flush_inner()
    }
}
