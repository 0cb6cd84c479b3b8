use std::path::PathBuf;

use chrono::{Local, Utc};
use usage::{
    BlockQuery, CostMode, DailyQuery, DailyUsage, EnrichedBlock, LiveBlock, daily_report,
    default_claude_paths, live_block, load_blocks, load_usage_entries, select_blocks,
};

use crate::error::Result;
use crate::services::SharedConfig;

/// Reads token usage from the local transcript directories.
///
/// Every call rescans the transcripts; nothing is cached between calls.
#[derive(Clone)]
pub struct UsageService {
    config: SharedConfig,
}

impl UsageService {
    pub(super) fn new(config: SharedConfig) -> Self {
        Self { config }
    }

    fn roots(&self) -> Result<Vec<PathBuf>> {
        match &self.config.claude_paths {
            Some(paths) => Ok(paths.clone()),
            None => Ok(default_claude_paths()?),
        }
    }

    pub fn blocks(&self, query: &BlockQuery) -> Result<Vec<EnrichedBlock>> {
        let now = Utc::now();
        let blocks = load_blocks(&self.roots()?, query.mode, now)?;
        Ok(select_blocks(blocks, query, now))
    }

    pub fn live(&self) -> Result<LiveBlock> {
        let now = Utc::now();
        let blocks = load_blocks(&self.roots()?, CostMode::Auto, now)?;
        Ok(live_block(blocks, now))
    }

    pub fn daily(&self, query: &DailyQuery, mode: CostMode) -> Result<Vec<DailyUsage>> {
        let loaded = load_usage_entries(&self.roots()?, mode)?;
        Ok(daily_report(&loaded.entries, query, &Local))
    }
}
