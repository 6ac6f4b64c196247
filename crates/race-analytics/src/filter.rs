//! Season filtering.

use crate::error::Result;
use race_domain::{ResultSet, SeasonWindow};
use tracing::debug;

/// Records with `year_min <= year <= year_max`, in original order.
///
/// Fails with [`AnalyticsError::InvalidRange`](crate::AnalyticsError::InvalidRange)
/// when the bounds are inverted. The input is never modified.
pub fn filter_seasons(results: &ResultSet, year_min: i32, year_max: i32) -> Result<ResultSet> {
    let window = SeasonWindow::new(year_min, year_max)?;
    Ok(filter_window(results, &window))
}

/// Records falling inside an already validated window.
#[must_use]
pub fn filter_window(results: &ResultSet, window: &SeasonWindow) -> ResultSet {
    let filtered = results.subset(|r| window.contains(r.year));
    debug!(
        window = %window,
        kept = filtered.len(),
        total = results.len(),
        "Filtered results to season window"
    );
    filtered
}
