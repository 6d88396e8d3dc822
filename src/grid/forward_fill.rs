//! Forward-filling of sparse per-account entries onto the shared date axis.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use super::GridEntry;

/// Densify one account's sparse entries over the sorted axis.
///
/// Walking the axis in order, a real entry becomes the cell for its date and
/// the new carry value; dates without one repeat the carry. Dates before the
/// account's first entry get no cell at all, so late-starting accounts render
/// as "no data" instead of zero.
pub fn project_dense(
    entries: &BTreeMap<NaiveDate, GridEntry>,
    axis: &[NaiveDate],
) -> BTreeMap<NaiveDate, GridEntry> {
    let mut dense = BTreeMap::new();
    let mut carry: Option<GridEntry> = None;

    for &date in axis {
        if let Some(entry) = entries.get(&date) {
            carry = Some(*entry);
        }
        if let Some(entry) = carry {
            dense.insert(date, entry);
        }
    }

    dense
}
