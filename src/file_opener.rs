//! Hands a finished PDF to the system viewer

use crate::error::{PdfStackError, Result};
use std::path::Path;

/// Opens `path` with the default application and returns without waiting for it
pub fn open_file(path: &Path) -> Result<()> {
    if !path.is_file() {
        return Err(PdfStackError::Io(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("{} does not exist", path.display()),
        )));
    }

    tracing::info!(path = %path.display(), "opening with system viewer");
    open::that_detached(path)?;
    Ok(())
}
