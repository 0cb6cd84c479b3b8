use std::str::FromStr;

use chrono::NaiveDate;
use grouping::{GroupingPreferences, GroupingPreset};
use monitor_app::{
    AppError, DEFAULT_HISTORICAL_LIMIT, DEFAULT_RECENT_LIMIT, GroupedView, Result, now_millis,
    parse_iso_to_millis,
};
use monitor_core::{FilterOptions, HistoricalPage, HookEvent};
use usage::{
    BlockQuery, CostMode, DailyQuery, DailyUsage, EnrichedBlock, SortOrder, TokenLimit,
};

use crate::{
    AppContext, BlocksRequest, DailyRequest, GroupedRequest, HistoricalRequest, PostEventRequest,
    PresetRequest, RecentRequest, StreamMessage, UsageEnvelope, validate_event,
};

fn parse_param<T>(value: Option<String>) -> Result<T>
where
    T: FromStr<Err = String> + Default,
{
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(T::default()),
        Some(value) => value.parse().map_err(AppError::InvalidInput),
    }
}

fn parse_flag(value: Option<String>) -> bool {
    value.as_deref() == Some("true")
}

fn parse_date_param(value: Option<String>, name: &str) -> Result<Option<NaiveDate>> {
    match value.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(value) => DailyQuery::parse_date(value).map(Some).ok_or_else(|| {
            AppError::InvalidInput(format!("{name} must be YYYY-MM-DD or YYYYMMDD"))
        }),
    }
}

fn envelope<T>(result: Result<T>, what: &str) -> UsageEnvelope<T> {
    match result {
        Ok(data) => UsageEnvelope::ok(data),
        Err(err) => {
            tracing::warn!(error = %err, "failed to load {what}");
            UsageEnvelope::failed(err.to_string())
        }
    }
}

pub fn post_event(ctx: &AppContext, req: PostEventRequest) -> Result<HookEvent> {
    let event = validate_event(req, now_millis())?;
    ctx.app_state.services.events.insert(&event)
}

pub fn recent_events(ctx: &AppContext, req: RecentRequest) -> Result<Vec<HookEvent>> {
    let limit = req.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    ctx.app_state.services.events.recent(limit)
}

pub fn historical_events(ctx: &AppContext, req: HistoricalRequest) -> Result<HistoricalPage> {
    let before = req.before.ok_or_else(|| {
        AppError::InvalidInput("Missing required parameter: before (ISO timestamp)".to_string())
    })?;
    let before_ms = parse_iso_to_millis(&before)?;
    let limit = req.limit.unwrap_or(DEFAULT_HISTORICAL_LIMIT);
    ctx.app_state
        .services
        .events
        .historical(before_ms, limit)
}

pub fn filter_options(ctx: &AppContext) -> Result<FilterOptions> {
    ctx.app_state.services.events.filter_options()
}

pub fn grouped_events(ctx: &AppContext, req: GroupedRequest) -> Result<GroupedView> {
    let limit = req.limit.unwrap_or(DEFAULT_RECENT_LIMIT);
    ctx.app_state.services.grouping.grouped(limit)
}

pub fn preferences_get(ctx: &AppContext) -> Result<GroupingPreferences> {
    ctx.app_state.services.preferences.get()
}

pub fn preferences_put(ctx: &AppContext, prefs: GroupingPreferences) -> Result<GroupingPreferences> {
    ctx.app_state.services.preferences.set(prefs)
}

pub fn preferences_preset(ctx: &AppContext, req: PresetRequest) -> Result<GroupingPreferences> {
    let preset = GroupingPreset::from_str(&req.preset).map_err(AppError::InvalidInput)?;
    ctx.app_state.services.preferences.apply_preset(preset)
}

pub fn blocks_query(req: BlocksRequest) -> Result<BlockQuery> {
    let token_limit = match req.token_limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(value) => Some(TokenLimit::from_str(value).map_err(AppError::InvalidInput)?),
    };
    Ok(BlockQuery {
        active: parse_flag(req.active),
        recent: parse_flag(req.recent),
        mode: parse_param::<CostMode>(req.mode)?,
        order: parse_param::<SortOrder>(req.order)?,
        token_limit,
    })
}

/// Bad query parameters are a 400; load failures come back in the envelope.
pub fn usage_blocks(
    ctx: &AppContext,
    req: BlocksRequest,
) -> Result<UsageEnvelope<Vec<EnrichedBlock>>> {
    let query = blocks_query(req)?;
    Ok(envelope(
        ctx.app_state.services.usage.blocks(&query),
        "usage blocks",
    ))
}

pub fn usage_live(ctx: &AppContext) -> UsageEnvelope<EnrichedBlock> {
    match ctx.app_state.services.usage.live() {
        Ok(live) => match live.block {
            Some(block) => UsageEnvelope::ok(block),
            None => UsageEnvelope::empty(live.message.unwrap_or_default()),
        },
        Err(err) => {
            tracing::warn!(error = %err, "failed to load live usage");
            UsageEnvelope::failed(err.to_string())
        }
    }
}

pub fn usage_daily(ctx: &AppContext, req: DailyRequest) -> Result<UsageEnvelope<Vec<DailyUsage>>> {
    let query = DailyQuery {
        since: parse_date_param(req.since, "since")?,
        until: parse_date_param(req.until, "until")?,
        order: parse_param::<SortOrder>(req.order)?,
    };
    let mode = parse_param::<CostMode>(req.mode)?;
    Ok(envelope(
        ctx.app_state.services.usage.daily(&query, mode),
        "daily usage",
    ))
}

/// First frame for a new stream subscriber.
pub fn stream_initial(ctx: &AppContext) -> Result<StreamMessage> {
    let events = ctx
        .app_state
        .services
        .events
        .recent(ctx.stream_recent_limit)?;
    Ok(StreamMessage::Initial(events))
}

/// Current live block as a stream frame; `None` when there is nothing to send.
pub fn stream_token_usage(ctx: &AppContext) -> Option<StreamMessage> {
    match ctx.app_state.services.usage.live() {
        Ok(live) => live.block.map(StreamMessage::TokenUsage),
        Err(err) => {
            tracing::debug!(error = %err, "live usage unavailable for stream");
            None
        }
    }
}
