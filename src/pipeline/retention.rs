// ABOUTME: Retention policy for old artifact versions.
// ABOUTME: Pure selection of which versions fall outside the keep window.

use crate::types::Version;

/// Versions to remove from a most-recent-first list, keeping the first `keep`.
///
/// Returns `versions[keep..]` exactly, preserving order; empty when
/// `keep >= versions.len()`.
pub fn select_for_removal(versions: &[Version], keep: usize) -> Vec<Version> {
    versions.get(keep..).map(<[Version]>::to_vec).unwrap_or_default()
}
