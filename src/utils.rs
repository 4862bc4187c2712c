use std::path::Path;

/// Display a path relative to work_dir, or just filename if outside.
pub fn display_path(path: &Path, work_dir: &Path) -> String {
    path.strip_prefix(work_dir)
        .map(|p| p.display().to_string())
        .unwrap_or_else(|_| {
            path.file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| path.display().to_string())
        })
}

/// Truncate a string to at most `max_chars` characters, ending in `…` when
/// shortened. Counts characters, so multi-byte text is never split.
pub fn truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        return s.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }
    let truncated: String = s.chars().take(max_chars - 1).collect();
    format!("{truncated}…")
}

/// Collapse a string onto one line for table cells
pub fn single_line(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
