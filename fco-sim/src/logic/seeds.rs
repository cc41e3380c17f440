use anyhow::{Context, Result, bail};
use fco_core::RngBundle;
use serde::Serialize;

/// Where a run's seed came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedSource {
    Provided,
    Entropy,
}

/// Resolved seed for a run, kept on reports so the run can be replayed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SeedInfo {
    pub seed: u64,
    pub source: SeedSource,
}

impl SeedInfo {
    #[must_use]
    pub const fn provided(seed: u64) -> Self {
        Self {
            seed,
            source: SeedSource::Provided,
        }
    }

    #[must_use]
    pub fn bundle(&self) -> RngBundle {
        RngBundle::from_user_seed(self.seed)
    }
}

/// Resolve the `--seed` flag. Accepts decimal or `0x` hex; no flag draws a fresh seed.
///
/// # Errors
///
/// Returns an error when the token is neither a decimal nor a hex number.
pub fn resolve_seed(raw: Option<&str>) -> Result<SeedInfo> {
    let Some(token) = raw.map(str::trim) else {
        let bundle = RngBundle::from_entropy();
        log::debug!("seed drawn from entropy: {}", bundle.seed());
        return Ok(SeedInfo {
            seed: bundle.seed(),
            source: SeedSource::Entropy,
        });
    };

    if token.is_empty() {
        bail!("seed must not be empty");
    }

    let seed = if let Some(hex) = token
        .strip_prefix("0x")
        .or_else(|| token.strip_prefix("0X"))
    {
        u64::from_str_radix(&hex.replace('_', ""), 16)
            .with_context(|| format!("invalid hex seed: {token}"))?
    } else {
        token
            .replace('_', "")
            .parse::<u64>()
            .with_context(|| format!("invalid seed: {token}"))?
    };
    Ok(SeedInfo::provided(seed))
}
