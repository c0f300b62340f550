//! The per-collection read/write body logic shared by every compact columnar
//! collection type.
//!
//! One generic implementation serves `Collection<Point>`, `Collection<Measurement>`,
//! and `Collection<Stay>` alike, since the body algorithm is identical modulo
//! `R::STRIDE`.

use crate::collection::Collection;
use crate::error::Result;
use crate::persistence::stream::{ByteChunkSink, ByteChunkSource, ChunkedReader, ChunkedWriter};
use crate::record::{Record, TimeSpan};

/// The target chunk size used by [`read_body`]/[`write_body`]: records are never
/// split across a chunk boundary, so the actual chunk length is the largest
/// multiple of `R::STRIDE` not exceeding this.
const TARGET_CHUNK_BYTES: usize = 4 * 1024 * 1024;

fn chunk_len<R: Record>() -> usize {
    (TARGET_CHUNK_BYTES / R::STRIDE).max(1) * R::STRIDE
}

/// Reads the columnar body into `collection`, appending raw chunks and restoring
/// an accurate `sorted_by_time` once the whole body has loaded.
///
/// Pre-reserves capacity from `reader`'s `remaining_bytes_hint`, if known. Stops at
/// the first short read, per the stride-aligned-chunk contract.
pub async fn read_body<R: Record + TimeSpan, S: ByteChunkSource>(
    collection: &mut Collection<R>,
    reader: &mut ChunkedReader<S>,
) -> Result<()> {
    if let Some(hint) = reader.remaining_bytes_hint() {
        collection.reserve_capacity(collection.len() + hint / R::STRIDE)?;
    }
    let chunk = chunk_len::<R>();
    loop {
        let bytes = reader.read_byte_data(chunk).await?;
        if bytes.is_empty() {
            break;
        }
        let usable = bytes.len() - (bytes.len() % R::STRIDE);
        if usable > 0 {
            collection.load_raw(&bytes[..usable])?;
        }
        if bytes.len() < chunk {
            break;
        }
    }
    collection.check_contents_sorted_by_time(0, collection.len())?;
    Ok(())
}

/// Writes the columnar body via zero-copy slices of `collection`'s underlying
/// buffer, in stride-aligned chunks.
pub async fn write_body<R: Record + TimeSpan, S: ByteChunkSink>(
    collection: &Collection<R>,
    writer: &mut ChunkedWriter<S>,
) -> Result<()> {
    let chunk_records = (TARGET_CHUNK_BYTES / R::STRIDE).max(1);
    let mut offset = 0;
    while offset < collection.len() {
        let take = chunk_records.min(collection.len() - offset);
        let bytes = collection.export_bytes(offset, take)?;
        writer.write_bytes(bytes).await?;
        offset += take;
    }
    Ok(())
}
