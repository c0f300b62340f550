//! The 100-byte container header framed at the start of every persisted stream.

use crate::error::{Error, Result};
use crate::persistence::stream::{ByteChunkSink, ByteChunkSource, ChunkedReader, ChunkedWriter};

/// The default container signature stamped onto every written container unless
/// overridden via [`crate::config::ContainerSettings`].
pub const DEFAULT_CONTAINER_SIGNATURE: &str = "AnqsGpsHistoryFile--";

/// The container-format version this build writes and the maximum it can read.
pub const CONTAINER_VERSION: u16 = 1;

/// The width, in bytes, of each signature field.
const SIGNATURE_LEN: usize = 20;

/// The width, in bytes, of the metadata field.
pub const MAX_METADATA_LEN: usize = 55;

/// The 100-byte wire header: container identity/version, persister identity/version,
/// and an opaque metadata blob.
///
/// ```text
/// offset  size  field
/// 0       20    container signature
/// 20      2     container version
/// 22      20    persister signature
/// 42      2     persister version
/// 44      1     metadata length m in [0, 55]
/// 45      55    metadata bytes (first m significant, rest zero padding)
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct ContainerHeader {
    /// The container signature, already ASCII-normalized.
    pub container_signature: String,
    /// The container-format version this header declares.
    pub container_version: u16,
    /// The persister signature, trimmed of trailing padding.
    pub persister_signature: String,
    /// The persister-specific data version.
    pub persister_version: u16,
    /// The metadata bytes actually carried (length `m`, not padded).
    pub metadata: Vec<u8>,
}

impl ContainerHeader {
    /// Builds a header, normalizing both signatures and validating the metadata
    /// length.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] if either signature exceeds 20 bytes, or
    /// [`Error::InvalidMetadata`] if `metadata.len() > 55`.
    pub fn new(
        container_signature: &str,
        container_version: u16,
        persister_signature: &str,
        persister_version: u16,
        metadata: Vec<u8>,
    ) -> Result<Self> {
        normalize_signature(container_signature)?;
        normalize_signature(persister_signature)?;
        if metadata.len() > MAX_METADATA_LEN {
            return Err(Error::InvalidMetadata {
                reason: format!("metadata length {} exceeds {MAX_METADATA_LEN}", metadata.len()),
            });
        }
        Ok(ContainerHeader {
            container_signature: container_signature.to_string(),
            container_version,
            persister_signature: persister_signature.to_string(),
            persister_version,
            metadata,
        })
    }

    /// Writes the 100-byte header.
    pub async fn write_to<S: ByteChunkSink>(&self, writer: &mut ChunkedWriter<S>) -> Result<()> {
        writer.write_bytes(&normalize_signature(&self.container_signature)?).await?;
        writer.write_u16(self.container_version).await?;
        writer.write_bytes(&normalize_signature(&self.persister_signature)?).await?;
        writer.write_u16(self.persister_version).await?;
        if self.metadata.len() > MAX_METADATA_LEN {
            return Err(Error::InvalidMetadata {
                reason: format!("metadata length {} exceeds {MAX_METADATA_LEN}", self.metadata.len()),
            });
        }
        writer.write_u8(self.metadata.len() as u8).await?;
        let mut padded = self.metadata.clone();
        padded.resize(MAX_METADATA_LEN, 0);
        writer.write_bytes(&padded).await?;
        Ok(())
    }

    /// Reads and validates a 100-byte header.
    ///
    /// Validates the container signature against `expected_container_signature` and
    /// the container version against `max_container_version` (steps 2–3 of the read
    /// flow); persister signature/version validation happens one layer up, once the
    /// caller has looked up the expected persister signature for its concrete
    /// collection type.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidSignature`] on a container signature mismatch,
    /// [`Error::NewerVersion`] if the container version exceeds `max_container_version`,
    /// or [`Error::InvalidMetadata`] if the declared metadata length exceeds 55.
    pub async fn read_from<S: ByteChunkSource>(
        reader: &mut ChunkedReader<S>,
        expected_container_signature: &str,
        max_container_version: u16,
    ) -> Result<Self> {
        let expected = normalize_signature(expected_container_signature)?;
        let found_bytes = reader.read_bytes(SIGNATURE_LEN).await?;
        if found_bytes != expected {
            return Err(Error::InvalidSignature {
                reason: format!(
                    "container signature mismatch: expected {:?}, found {:?}",
                    String::from_utf8_lossy(&expected),
                    String::from_utf8_lossy(&found_bytes)
                ),
            });
        }
        let container_version = reader.read_u16().await?;
        if container_version > max_container_version {
            return Err(Error::NewerVersion { found: container_version, max: max_container_version });
        }
        let persister_signature = reader.read_string(SIGNATURE_LEN).await?.trim_end().to_string();
        let persister_version = reader.read_u16().await?;
        let declared_len = reader.read_u8().await? as usize;
        if declared_len > MAX_METADATA_LEN {
            return Err(Error::InvalidMetadata {
                reason: format!("declared metadata length {declared_len} exceeds {MAX_METADATA_LEN}"),
            });
        }
        let raw_metadata = reader.read_bytes(MAX_METADATA_LEN).await?;
        let metadata = raw_metadata[..declared_len].to_vec();
        Ok(ContainerHeader {
            container_signature: expected_container_signature.to_string(),
            container_version,
            persister_signature,
            persister_version,
            metadata,
        })
    }
}

impl Default for ContainerHeader {
    fn default() -> Self {
        ContainerHeader {
            container_signature: DEFAULT_CONTAINER_SIGNATURE.to_string(),
            container_version: CONTAINER_VERSION,
            persister_signature: String::new(),
            persister_version: 0,
            metadata: Vec::new(),
        }
    }
}

/// Pads or space-fills `raw` to exactly 20 bytes, replacing any byte outside the
/// printable-ASCII range `32..=126` with a space.
///
/// # Errors
///
/// Returns [`Error::InvalidSignature`] if `raw` is longer than 20 bytes.
pub(crate) fn normalize_signature(raw: &str) -> Result<[u8; SIGNATURE_LEN]> {
    if raw.len() > SIGNATURE_LEN {
        return Err(Error::InvalidSignature {
            reason: format!("signature {raw:?} exceeds {SIGNATURE_LEN} bytes"),
        });
    }
    let mut buf = [b' '; SIGNATURE_LEN];
    for (slot, byte) in buf.iter_mut().zip(raw.bytes()) {
        *slot = if (32..=126).contains(&byte) { byte } else { b' ' };
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persistence::stream::{MemoryChunkSink, MemoryChunkSource};
    use futures_executor::block_on;

    #[test]
    fn normalize_signature_pads_with_spaces() {
        let sig = normalize_signature("abc").unwrap();
        assert_eq!(b'a', sig[0]);
        assert_eq!(b' ', sig[19]);
    }

    #[test]
    fn normalize_signature_rejects_non_ascii() {
        let sig = normalize_signature("héllo").unwrap();
        assert_eq!(b'h', sig[0]);
        assert_eq!(b' ', sig[1]);
    }

    #[test]
    fn normalize_signature_rejects_too_long() {
        assert!(normalize_signature(&"x".repeat(21)).is_err());
    }

    #[test]
    fn write_produces_exactly_one_hundred_bytes() {
        block_on(async {
            let header = ContainerHeader::new(
                DEFAULT_CONTAINER_SIGNATURE,
                CONTAINER_VERSION,
                "PointCollection",
                1,
                vec![9, 9, 9],
            )
            .unwrap();
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            header.write_to(&mut writer).await.unwrap();
            assert_eq!(100, writer.bytes_written());
            assert_eq!(100, writer.into_inner().bytes.len());
        });
    }

    #[test]
    fn s4_empty_write_matches_expected_byte_layout() {
        block_on(async {
            let header =
                ContainerHeader::new(DEFAULT_CONTAINER_SIGNATURE, CONTAINER_VERSION, "PointCollection    ", 1, Vec::new())
                    .unwrap();
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            header.write_to(&mut writer).await.unwrap();
            let bytes = writer.bytes_written();
            assert_eq!(100, bytes);
        });
    }

    #[test]
    fn read_from_rejects_signature_mismatch() {
        block_on(async {
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            let header =
                ContainerHeader::new("WrongSignature------", CONTAINER_VERSION, "Sig", 1, Vec::new()).unwrap();
            header.write_to(&mut writer).await.unwrap();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(writer.into_inner().bytes, 8));
            let result = ContainerHeader::read_from(&mut reader, DEFAULT_CONTAINER_SIGNATURE, CONTAINER_VERSION).await;
            assert!(matches!(result, Err(Error::InvalidSignature { .. })));
        });
    }

    #[test]
    fn read_from_rejects_newer_container_version() {
        block_on(async {
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            let header = ContainerHeader::new(DEFAULT_CONTAINER_SIGNATURE, 99, "Sig", 1, Vec::new()).unwrap();
            header.write_to(&mut writer).await.unwrap();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(writer.into_inner().bytes, 8));
            let result = ContainerHeader::read_from(&mut reader, DEFAULT_CONTAINER_SIGNATURE, CONTAINER_VERSION).await;
            assert!(matches!(result, Err(Error::NewerVersion { .. })));
        });
    }

    #[test]
    fn write_then_read_preserves_metadata() {
        block_on(async {
            let mut writer = ChunkedWriter::new(MemoryChunkSink::default());
            let header =
                ContainerHeader::new(DEFAULT_CONTAINER_SIGNATURE, CONTAINER_VERSION, "PointCollection", 3, vec![1, 2, 3])
                    .unwrap();
            header.write_to(&mut writer).await.unwrap();
            let mut reader = ChunkedReader::new(MemoryChunkSource::new(writer.into_inner().bytes, 17));
            let decoded =
                ContainerHeader::read_from(&mut reader, DEFAULT_CONTAINER_SIGNATURE, CONTAINER_VERSION).await.unwrap();
            assert_eq!("PointCollection", decoded.persister_signature);
            assert_eq!(3, decoded.persister_version);
            assert_eq!(vec![1, 2, 3], decoded.metadata);
        });
    }
}
