pub mod reports;
pub mod seeds;
pub mod simulation;
pub mod stats_input;

pub use reports::{
    BoxRow, PlanReport, PositionRow, Report, ReportFormat, ScoreReport, UpgradeTarget,
    write_report,
};
pub use seeds::{SeedInfo, resolve_seed};
pub use simulation::{DrawBatch, UpgradeCampaign, run_draw_batches, run_upgrade_campaigns};
pub use stats_input::StatsArgs;
