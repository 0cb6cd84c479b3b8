/// Default page size for `/api/events/recent` and the grouped view.
pub const DEFAULT_RECENT_LIMIT: usize = 100;
pub const DEFAULT_HISTORICAL_LIMIT: usize = 50;
/// Events sent to a stream subscriber when it connects.
pub const STREAM_RECENT_LIMIT: usize = 200;
