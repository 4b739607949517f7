use std::fs::FileType;
use std::path::Path;

/// Checks if a file name ends with `suffix`.
///
/// The comparison is literal and case-sensitive, on the file name only, so a
/// file called `.txt` qualifies while `notes.TXT` and `notes.txt.bak` do not.
pub fn has_suffix(path: &Path, suffix: &str) -> bool {
    path.file_name()
        .map(|name| name.to_string_lossy().ends_with(suffix))
        .unwrap_or(false)
}

/// Determines if a directory entry should be scanned.
///
/// `file_type` must come from the entry itself rather than from following
/// it, so symlinks, sockets and devices are never regular files here.
pub fn is_eligible_file(path: &Path, file_type: FileType, suffix: &str) -> bool {
    file_type.is_file() && has_suffix(path, suffix)
}
