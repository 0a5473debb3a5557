// File: src/core/cluster.rs
use crate::core::types::WordFrequencyRecord;

/// Cuts a contiguous run of up to `size` words roughly centered on `center`.
///
/// The window is `[start, end)` with `start = center - size/2` and
/// `end = min(len - 1, start + size)`, so the last word of the view is never
/// included and windows near either edge come back short.
pub fn cluster(view: &[WordFrequencyRecord], center: usize, size: usize) -> &[WordFrequencyRecord] {
    if view.is_empty() {
        return &[];
    }
    let end_cap = view.len() - 1;
    let start = center.saturating_sub(size / 2).min(end_cap);
    let end = start.saturating_add(size).min(end_cap);
    &view[start..end]
}
