mod blocks;
mod daily;
mod loader;
mod parser;
mod paths;
mod pricing;
mod select;
mod types;

pub use blocks::identify_blocks;
pub use daily::{DailyQuery, DailyUsage, daily_report};
pub use loader::{LoadedUsage, load_blocks, load_usage_entries};
pub use paths::default_claude_paths;
pub use pricing::{ModelPrice, calculate_cost, price_for_model};
pub use select::{enrich_block, live_block, select_blocks};
pub use types::{
    BlockQuery, CostMode, EnrichedBlock, LiveBlock, LoadIssue, LoadStats, Result, SortOrder,
    TokenLimit, UsageError,
};
