use std::time::Duration;

use chrono::{DateTime, Utc};

use sheetsync_api::{Record, RecordId, RecordStore};

use crate::error::ExportError;

/// Smallest identifier that could belong to a record created at or after
/// `now - lookback`.
///
/// The cutoff is floored to whole seconds, so records from the cutoff's own
/// second are admitted even if they were created slightly before it.
/// Cutoffs before the epoch clamp to 0, after `u32::MAX` seconds to the max.
pub fn window_floor(now: DateTime<Utc>, lookback: Duration) -> RecordId {
    let lookback_ms = i64::try_from(lookback.as_millis()).unwrap_or(i64::MAX);
    let cutoff_ms = now.timestamp_millis().saturating_sub(lookback_ms);
    let secs = cutoff_ms.div_euclid(1000).clamp(0, i64::from(u32::MAX));
    RecordId::floor_for_timestamp(secs as u32)
}

/// Query the store for every record in the lookback window, ascending by id.
pub async fn select_window(
    store: &dyn RecordStore,
    now: DateTime<Utc>,
    lookback: Duration,
) -> Result<Vec<Record>, ExportError> {
    let floor = window_floor(now, lookback);
    tracing::debug!(floor = %floor, floor_secs = floor.timestamp_secs(), "selecting window");

    let records = store.find_from(floor).await.map_err(ExportError::Store)?;
    tracing::info!(candidates = records.len(), lookback_s = lookback.as_secs(), "window selected");
    Ok(records)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn floor_is_cutoff_second() {
        let now = DateTime::from_timestamp(1_700_021_600, 500_000_000).unwrap();
        let floor = window_floor(now, Duration::from_secs(6 * 3600));
        assert_eq!(floor.timestamp_secs(), 1_700_000_000);
        assert_eq!(floor, RecordId::floor_for_timestamp(1_700_000_000));
    }

    #[test]
    fn sub_second_cutoff_floors_down() {
        let now = DateTime::from_timestamp(100, 0).unwrap();
        let floor = window_floor(now, Duration::from_millis(1_500));
        assert_eq!(floor.timestamp_secs(), 98);
    }

    #[test]
    fn cutoff_before_epoch_clamps() {
        let now = DateTime::from_timestamp(10, 0).unwrap();
        let floor = window_floor(now, Duration::from_secs(3600));
        assert_eq!(floor.timestamp_secs(), 0);
    }
}
