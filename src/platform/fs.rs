// bs-logviewer - platform/fs.rs
//
// Log file intake: plain text or gzip-compressed text, decoded lossily.

use crate::util::constants::GZIP_MAGIC;
use crate::util::error::InputError;
use flate2::read::GzDecoder;
use std::io::Read;
use std::path::Path;

/// Read a log file into a string.
///
/// Files named `*.gz`, or whose first bytes are the gzip magic number, are
/// decompressed first. Invalid UTF-8 is replaced rather than rejected.
pub fn read_log_file(path: &Path) -> Result<String, InputError> {
    let bytes = std::fs::read(path).map_err(|e| InputError::Io {
        path: path.to_path_buf(),
        source: e,
    })?;

    let has_gz_extension = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("gz"));

    let text = if has_gz_extension || bytes.starts_with(&GZIP_MAGIC) {
        let mut decompressed = Vec::new();
        GzDecoder::new(bytes.as_slice())
            .read_to_end(&mut decompressed)
            .map_err(|e| InputError::Decompress {
                path: path.to_path_buf(),
                source: e,
            })?;
        tracing::debug!(
            path = %path.display(),
            compressed = bytes.len(),
            decompressed = decompressed.len(),
            "Decompressed gzip log"
        );
        String::from_utf8_lossy(&decompressed).into_owned()
    } else {
        String::from_utf8_lossy(&bytes).into_owned()
    };

    tracing::info!(path = %path.display(), bytes = text.len(), "Log file read");
    Ok(text)
}
