//! Framing collections to and from the self-describing binary container format:
//! a 100-byte header (see [`header`]) followed by an opaque per-persister byte body
//! (see [`persister`]), read and written through a pull-based chunked stream
//! (see [`stream`]) via a process-wide type-to-signature [`registry`].

pub mod header;
pub mod persister;
pub mod registry;
pub mod stream;

use crate::collection::Collection;
use crate::config::ContainerSettings;
use crate::error::{Error, Result};
use crate::record::{Record, TimeSpan};
use header::{ContainerHeader, CONTAINER_VERSION};
use log::warn;
use registry::PersisterRegistry;
use stream::{ByteChunkSink, ByteChunkSource, ChunkedReader, ChunkedWriter};

/// Reads a container into `collection`.
///
/// Follows the read flow in order: refuse a `read_only` or non-empty target, look
/// up `R`'s persister in `registry`, validate the container header (signature and
/// version) against `container`'s configured signature, validate the persister
/// signature and version found in the header against the registered/declared
/// ones, then delegate the body to [`persister::read_body`].
///
/// # Errors
///
/// Returns [`Error::ReadonlyContainer`] if `read_only` is set,
/// [`Error::NotEmptyContainer`] if `collection` already has records,
/// [`Error::NoPersister`] if `R` has no registered persister, or any of the header
/// validation errors from [`header::ContainerHeader::read_from`].
pub async fn read<R: Record + TimeSpan + 'static, S: ByteChunkSource>(
    collection: &mut Collection<R>,
    reader: &mut ChunkedReader<S>,
    registry: &PersisterRegistry,
    read_only: bool,
    container: &ContainerSettings,
) -> Result<ContainerHeader> {
    if read_only {
        return Err(Error::ReadonlyContainer);
    }
    if !collection.is_empty() {
        return Err(Error::NotEmptyContainer { len: collection.len() });
    }
    let expected_signature = registry.signature_for::<R>()?;

    let header = match ContainerHeader::read_from(reader, container.configured_signature(), CONTAINER_VERSION).await {
        Ok(header) => header,
        Err(err) => {
            warn!("container header read failed: {err}");
            return Err(err);
        }
    };
    if header.persister_signature != expected_signature {
        let err = Error::InvalidSignature {
            reason: format!(
                "persister signature mismatch: expected {expected_signature:?}, found {:?}",
                header.persister_signature
            ),
        };
        warn!("{err}");
        return Err(err);
    }
    if header.persister_version > R::PERSISTER_VERSION {
        let err = Error::NewerVersion { found: header.persister_version, max: R::PERSISTER_VERSION };
        warn!("{err}");
        return Err(err);
    }

    persister::read_body(collection, reader).await?;
    Ok(header)
}

/// Writes `collection` as a container: container header, persister header,
/// metadata, then the columnar body.
///
/// `metadata` is round-tripped verbatim but otherwise unused for compact
/// persisters; it must be at most 55 bytes. The container signature stamped into
/// the header comes from `container`'s configured signature.
pub async fn write<R: Record + TimeSpan + 'static, S: ByteChunkSink>(
    collection: &Collection<R>,
    writer: &mut ChunkedWriter<S>,
    metadata: Vec<u8>,
    container: &ContainerSettings,
) -> Result<()> {
    let signature = registry::persister_signature::<R>()?;
    let header = ContainerHeader::new(
        container.configured_signature(),
        CONTAINER_VERSION,
        &signature,
        R::PERSISTER_VERSION,
        metadata,
    )?;
    header.write_to(writer).await?;
    persister::write_body(collection, writer).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Point;
    use futures_executor::block_on;
    use stream::{MemoryChunkSink, MemoryChunkSource};

    fn point(time: u32) -> Point {
        Point { time, latitude: 10.0, longitude: 20.0, altitude: Some(5.0) }
    }

    #[test]
    fn write_then_read_full_container_round_trips() {
        block_on(async {
            let mut registry = PersisterRegistry::new();
            registry.register::<Point>().unwrap();

            let mut source: Collection<Point> = Collection::new();
            for t in [100, 200, 300] {
                source.push(point(t)).unwrap();
            }
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            write(&source, &mut writer, vec![7, 7], &ContainerSettings::new()).await.unwrap();
            let bytes = writer.into_inner().bytes;

            let mut dest: Collection<Point> = Collection::new();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(bytes, 37));
            let header = read(&mut dest, &mut reader, &registry, false, &ContainerSettings::new()).await.unwrap();

            assert_eq!(3, dest.len());
            assert_eq!(200, dest.get(1).unwrap().time);
            assert_eq!(vec![7, 7], header.metadata);
            assert!(dest.sorted_by_time());
        });
    }

    // S4 from spec.md.
    #[test]
    fn s4_empty_write_has_expected_header_bytes() {
        block_on(async {
            let mut registry = PersisterRegistry::new();
            registry.register::<Point>().unwrap();
            let source: Collection<Point> = Collection::new();
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            write(&source, &mut writer, Vec::new(), &ContainerSettings::new()).await.unwrap();
            let bytes = writer.into_inner().bytes;

            assert_eq!(b"AnqsGpsHistoryFile--", &bytes[0..20]);
            assert_eq!([1, 0], bytes[20..22]);
            assert_eq!(b"Point               ", &bytes[22..42]);
            assert_eq!([1, 0], bytes[42..44]);
            assert_eq!(0, bytes[44]);
            assert!(bytes[45..100].iter().all(|&b| b == 0));
            let _ = &registry;
        });
    }

    #[test]
    fn write_then_read_honors_overridden_container_signature() {
        block_on(async {
            let mut registry = PersisterRegistry::new();
            registry.register::<Point>().unwrap();
            let container = ContainerSettings::new().signature("MyCustomSignature20").unwrap();

            let mut source: Collection<Point> = Collection::new();
            source.push(point(1)).unwrap();
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            write(&source, &mut writer, Vec::new(), &container).await.unwrap();
            let bytes = writer.into_inner().bytes;
            assert_eq!(b"MyCustomSignature20", &bytes[0..20]);

            let mut dest: Collection<Point> = Collection::new();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(bytes.clone(), 37));
            read(&mut dest, &mut reader, &registry, false, &container).await.unwrap();
            assert_eq!(1, dest.len());

            // Reading it back against the default signature (rather than the one it was
            // actually written with) must fail, proving the signature isn't hardcoded.
            let mut mismatched_dest: Collection<Point> = Collection::new();
            let mut mismatched_reader = ChunkedReader::new(MemoryChunkSource::new(bytes, 37));
            let result =
                read(&mut mismatched_dest, &mut mismatched_reader, &registry, false, &ContainerSettings::new()).await;
            assert!(matches!(result, Err(Error::InvalidSignature { .. })));
        });
    }

    #[test]
    fn read_rejects_nonempty_target() {
        block_on(async {
            let mut registry = PersisterRegistry::new();
            registry.register::<Point>().unwrap();
            let mut dest: Collection<Point> = Collection::new();
            dest.push(point(1)).unwrap();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(Vec::new(), 8));
            let result = read(&mut dest, &mut reader, &registry, false, &ContainerSettings::new()).await;
            assert!(matches!(result, Err(Error::NotEmptyContainer { .. })));
        });
    }

    #[test]
    fn read_rejects_readonly_target() {
        block_on(async {
            let registry = PersisterRegistry::new();
            let mut dest: Collection<Point> = Collection::new();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(Vec::new(), 8));
            let result = read(&mut dest, &mut reader, &registry, true, &ContainerSettings::new()).await;
            assert!(matches!(result, Err(Error::ReadonlyContainer)));
        });
    }

    #[test]
    fn read_fails_without_registered_persister() {
        block_on(async {
            let registry = PersisterRegistry::new();
            let mut dest: Collection<Point> = Collection::new();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(Vec::new(), 8));
            let result = read(&mut dest, &mut reader, &registry, false, &ContainerSettings::new()).await;
            assert!(matches!(result, Err(Error::NoPersister { .. })));
        });
    }
}
