use common::{ComparisonPayload, MONTHLY_UNIT};
use tracing::{debug, trace};

/// True when the projection unit denotes monthly figures.
pub fn is_monthly(unit: &str) -> bool {
    unit.trim().eq_ignore_ascii_case(MONTHLY_UNIT)
}

/// Scales a monthly projection to a yearly figure so it can sit next to an
/// annual historical total.
///
/// Only rows for `projection_year` with a quantity are touched: they are
/// multiplied by 12 and flagged `annualized`. Rows already flagged are left
/// alone, as are payloads whose unit is not monthly or that disable
/// annualization.
pub fn annualize(mut payload: ComparisonPayload, projection_year: i32) -> ComparisonPayload {
    if !is_monthly(&payload.projection_unit) {
        trace!(unit = %payload.projection_unit, "Projection is not monthly, skipping annualization");
        return payload;
    }
    if !payload.annualize_allowed() {
        trace!("Annualization disabled by payload");
        return payload;
    }

    for row in payload
        .rows
        .iter_mut()
        .filter(|row| row.year == projection_year && !row.annualized)
    {
        if let Some(quantity) = row.quantity {
            row.quantity = Some(quantity * 12.0);
            row.annualized = true;
            debug!(year = row.year, monthly = quantity, "Annualized monthly projection");
        }
    }
    payload
}
