use time::{Date, OffsetDateTime, UtcOffset};

use crate::taxonomy::ItemId;

/// Builds `{namespace}_{item_id}_{YYYYMMDD}`.
pub fn related_cache_key(namespace: &str, item_id: ItemId, day: Date) -> String {
	format!(
		"{namespace}_{item_id}_{:04}{:02}{:02}",
		day.year(),
		u8::from(day.month()),
		day.day()
	)
}

pub fn cache_day(now: OffsetDateTime, offset: UtcOffset) -> Date {
	now.to_offset(offset).date()
}

pub fn utc_offset_from_minutes(minutes: i32) -> UtcOffset {
	UtcOffset::from_whole_seconds(minutes.saturating_mul(60)).unwrap_or(UtcOffset::UTC)
}
