use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Ensure directory exists.
pub fn ensure_dir(path: &Path) -> Result<(), String> {
    if !path.exists() {
        fs::create_dir_all(path)
            .map_err(|e| format!("Unable to create directory {}: {}", path.display(), e))?;
    }
    #[cfg(unix)]
    {
        fs::set_permissions(path, fs::Permissions::from_mode(0o700)).ok();
    }
    Ok(())
}

/// Write `bytes` to `path` through a sibling temp file and a rename, so a
/// reader never observes a half-written file.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut tmp_name = path.file_name().unwrap_or_default().to_os_string();
    tmp_name.push(".tmp");
    let tmp_path = path.with_file_name(tmp_name);

    let written = File::create(&tmp_path).and_then(|mut f| {
        f.write_all(bytes)?;
        f.sync_all()
    });
    if let Err(e) = written {
        let _ = fs::remove_file(&tmp_path);
        return Err(e);
    }
    #[cfg(unix)]
    {
        fs::set_permissions(&tmp_path, fs::Permissions::from_mode(0o600)).ok();
    }

    rename_with_fallback(&tmp_path, path)
}

/// Rename `from` over `to`, removing `to` first on platforms where rename
/// refuses to replace an existing file. `from` is removed if both attempts fail.
fn rename_with_fallback(from: &Path, to: &Path) -> io::Result<()> {
    if let Err(initial_err) = fs::rename(from, to) {
        let _ = fs::remove_file(to);
        fs::rename(from, to).map_err(|retry_err| {
            let _ = fs::remove_file(from);
            io::Error::new(
                retry_err.kind(),
                format!(
                    "Atomic rename failed (initial: {}, retry: {})",
                    initial_err, retry_err
                ),
            )
        })?;
    }
    Ok(())
}

/// ISO-8601 timestamp made safe for file names (`:` and `.` become `-`).
pub fn file_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Micros, true)
        .replace([':', '.'], "-")
}
