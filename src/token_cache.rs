use std::fs;
use std::io;
use std::path::Path;

/// Reads a previously stored token. Missing, unreadable and blank files all
/// count as "no token".
pub fn load(path: &Path) -> Option<String> {
    let value = fs::read_to_string(path).ok()?;
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

pub fn store(path: &Path, token: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, token)
}
