pub mod json;
pub mod text;

use kte_core::error::KteError;
use std::io;
use std::path::Path;

/// Write `contents` to `path`, creating parent directories. An existing file
/// is only replaced when `force` is set.
pub fn write_file(path: &Path, contents: &str, force: bool) -> Result<(), KteError> {
    if path.exists() && !force {
        return Err(KteError::Io(io::Error::new(
            io::ErrorKind::AlreadyExists,
            format!(
                "output file already exists: {} (use --force to overwrite)",
                path.display()
            ),
        )));
    }
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, contents)?;
    Ok(())
}
