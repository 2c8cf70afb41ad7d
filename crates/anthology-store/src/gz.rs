use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;

use crate::StoreError;

/// Open a gzipped file for buffered reading.
pub(crate) fn open(path: &Path) -> Result<BufReader<GzDecoder<File>>, StoreError> {
    let file = File::open(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => StoreError::NotFound(path.to_path_buf()),
        _ => StoreError::Io(e),
    })?;
    Ok(BufReader::new(GzDecoder::new(file)))
}

/// Write a gzipped file through `body`.
///
/// With `atomic`, the data goes to a temporary file in the same directory
/// that is renamed over `path` once complete, so readers never see a
/// partial file.
pub(crate) fn write<F>(path: &Path, atomic: bool, body: F) -> Result<(), StoreError>
where
    F: FnOnce(&mut dyn Write) -> Result<(), StoreError>,
{
    if !atomic {
        let file = File::create(path)?;
        return encode(BufWriter::new(file), body);
    }

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    encode(BufWriter::new(&mut tmp), body)?;
    tmp.persist(path).map_err(|e| StoreError::Io(e.error))?;
    Ok(())
}

fn encode<W, F>(writer: W, body: F) -> Result<(), StoreError>
where
    W: Write,
    F: FnOnce(&mut dyn Write) -> Result<(), StoreError>,
{
    let mut encoder = GzEncoder::new(writer, Compression::default());
    body(&mut encoder)?;
    encoder.finish()?.flush()?;
    Ok(())
}
