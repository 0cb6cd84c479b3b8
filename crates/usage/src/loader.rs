use std::collections::HashSet;
use std::fs::{self, File};
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use monitor_core::{UsageBlock, UsageEntry};
use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::blocks::identify_blocks;
use crate::parser::{ParsedEntry, parse_line};
use crate::pricing::calculate_cost;
use crate::types::{CostMode, LoadIssue, LoadStats, Result, UsageError};

#[derive(Debug, Clone, Default)]
pub struct LoadedUsage {
    /// Deduplicated and sorted by timestamp ascending.
    pub entries: Vec<UsageEntry>,
    pub stats: LoadStats,
}

struct ParsedFile {
    entries: Vec<ParsedEntry>,
    lines_read: usize,
    issues: Vec<LoadIssue>,
}

fn is_transcript_path(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|value| value.to_str()),
        Some("jsonl")
    )
}

fn parse_file(path: &Path) -> ParsedFile {
    let file_path = path.to_string_lossy().to_string();
    let mut parsed = ParsedFile {
        entries: Vec::new(),
        lines_read: 0,
        issues: Vec::new(),
    };
    let file = match File::open(path) {
        Ok(file) => file,
        Err(err) => {
            parsed.issues.push(LoadIssue {
                file_path,
                message: err.to_string(),
            });
            return parsed;
        }
    };
    let mut reader = BufReader::new(file);
    let mut buf = String::new();
    loop {
        match reader.read_line(&mut buf) {
            Ok(0) => break,
            Ok(_) => {
                parsed.lines_read += 1;
                if let Some(entry) = parse_line(&buf) {
                    parsed.entries.push(entry);
                }
                buf.clear();
            }
            Err(err) => {
                parsed.issues.push(LoadIssue {
                    file_path: file_path.clone(),
                    message: err.to_string(),
                });
                break;
            }
        }
    }
    parsed
}

fn collect_transcripts(roots: &[PathBuf], stats: &mut LoadStats) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for root in roots {
        let projects = root.join("projects");
        fs::metadata(&projects).map_err(|source| UsageError::Io {
            path: projects.clone(),
            source,
        })?;
        for entry in WalkDir::new(&projects).follow_links(false).into_iter() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(err) => {
                    let file_path = err
                        .path()
                        .map(|path| path.to_string_lossy().to_string())
                        .unwrap_or_else(|| "<unknown>".to_string());
                    stats.issues.push(LoadIssue {
                        file_path,
                        message: err.to_string(),
                    });
                    continue;
                }
            };
            if entry.file_type().is_file() && is_transcript_path(entry.path()) {
                files.push(entry.into_path());
            }
        }
    }
    files.sort();
    Ok(files)
}

fn apply_cost_mode(parsed: ParsedEntry, mode: CostMode) -> UsageEntry {
    let ParsedEntry {
        mut entry,
        stored_cost,
    } = parsed;
    entry.cost_usd = match (mode, stored_cost) {
        (CostMode::Display, stored) => stored.unwrap_or(0.0),
        (CostMode::Auto, Some(stored)) => stored,
        (CostMode::Auto, None) | (CostMode::Calculate, _) => {
            calculate_cost(entry.model.as_deref(), &entry.token_counts)
        }
    };
    entry
}

/// Scans `<root>/projects/**/*.jsonl` under every root and returns priced,
/// deduplicated entries.
pub fn load_usage_entries(roots: &[PathBuf], mode: CostMode) -> Result<LoadedUsage> {
    if roots.is_empty() {
        return Err(UsageError::NoDataDirectory {
            checked: String::new(),
        });
    }
    let mut stats = LoadStats::default();
    let files = collect_transcripts(roots, &mut stats)?;
    stats.files_scanned = files.len();

    let parsed_files = files
        .into_par_iter()
        .map(|path| parse_file(&path))
        .collect::<Vec<_>>();

    let mut seen = HashSet::new();
    let mut entries = Vec::new();
    for parsed in parsed_files {
        stats.lines_read += parsed.lines_read;
        stats.issues.extend(parsed.issues);
        for entry in parsed.entries {
            if let Some(key) = entry.dedupe_key()
                && !seen.insert(key)
            {
                stats.duplicates_skipped += 1;
                continue;
            }
            entries.push(apply_cost_mode(entry, mode));
        }
    }
    entries.sort_by(|left, right| left.timestamp.cmp(&right.timestamp));
    stats.entries_loaded = entries.len();
    debug!(
        files = stats.files_scanned,
        entries = stats.entries_loaded,
        duplicates = stats.duplicates_skipped,
        "loaded usage entries"
    );
    Ok(LoadedUsage { entries, stats })
}

pub fn load_blocks(
    roots: &[PathBuf],
    mode: CostMode,
    now: DateTime<Utc>,
) -> Result<Vec<UsageBlock>> {
    let loaded = load_usage_entries(roots, mode)?;
    Ok(identify_blocks(&loaded.entries, now))
}

#[cfg(test)]
mod tests {
    use super::*;
    use monitor_core::TokenCounts;

    fn parsed(model: &str, stored_cost: Option<f64>) -> ParsedEntry {
        ParsedEntry {
            entry: UsageEntry {
                timestamp: Utc::now(),
                model: Some(model.to_string()),
                session_id: None,
                message_id: None,
                request_id: None,
                token_counts: TokenCounts {
                    input_tokens: 1_000_000,
                    ..TokenCounts::default()
                },
                cost_usd: 0.0,
            },
            stored_cost,
        }
    }

    #[test]
    fn auto_prefers_stored_cost() {
        let entry = apply_cost_mode(parsed("claude-sonnet-4", Some(9.0)), CostMode::Auto);
        assert_eq!(entry.cost_usd, 9.0);
        let entry = apply_cost_mode(parsed("claude-sonnet-4", None), CostMode::Auto);
        assert!((entry.cost_usd - 3.0).abs() < 1e-9);
    }

    #[test]
    fn calculate_ignores_stored_cost() {
        let entry = apply_cost_mode(parsed("claude-sonnet-4", Some(9.0)), CostMode::Calculate);
        assert!((entry.cost_usd - 3.0).abs() < 1e-9);
    }

    #[test]
    fn display_uses_stored_cost_only() {
        let entry = apply_cost_mode(parsed("claude-sonnet-4", None), CostMode::Display);
        assert_eq!(entry.cost_usd, 0.0);
    }
}
