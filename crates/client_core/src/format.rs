//! Display helpers for folder paths.

pub const ELLIPSIS_PREFIX: &str = ".../";

/// Shortens `path` for display by replacing leading components with `.../`.
///
/// Paths shorter than `max_len` characters come back unchanged. Otherwise the
/// first two components (the root marker and the first directory) are dropped,
/// then one more at a time, until the result fits or only the last component
/// is left. The result is best effort and can still be longer than `max_len`.
pub fn truncate_folder_path(path: &str, max_len: usize) -> String {
    if path.chars().count() < max_len {
        return path.to_string();
    }

    let components: Vec<&str> = path.split('/').collect();
    let mut dropped = 2;
    loop {
        let remainder = components
            .get(dropped..)
            .map(|rest| rest.join("/"))
            .unwrap_or_default();
        let candidate = format!("{ELLIPSIS_PREFIX}{remainder}");
        if candidate.chars().count() < max_len || dropped + 1 >= components.len() {
            return candidate;
        }
        dropped += 1;
    }
}

#[cfg(test)]
#[path = "tests/format_tests.rs"]
mod tests;
