use std::sync::Arc;

use crate::{
    container::reader::ByteReader,
    foundation::error::{FormatError, LdiResult},
};

/// Big-endian marker stored in the last two bytes of every container.
pub const END_MARKER: u16 = 0x1E1A;
/// Field type of the legacy scene-description payload.
pub const SCENE_FIELD_LEGACY: u32 = 7;
/// Field type of the current scene-description payload; preferred over the legacy one.
pub const SCENE_FIELD_CURRENT: u32 = 8;

// u32 region offset + u16 end marker
const TRAILER_LEN: usize = 6;
// u32 type + u32 size
const FIELD_HEADER_LEN: usize = 8;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct FieldEntry {
    field_type: u32,
    offset: usize,
    size: usize,
}

/// Borrowed view of one directory entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field<'a> {
    /// Position in directory order.
    pub index: usize,
    /// Field type tag.
    pub field_type: u32,
    /// Payload bytes.
    pub data: &'a [u8],
}

/// A decoded container: the source buffer plus its field directory.
///
/// The buffer is shared, never copied; fields are ranges into it.
#[derive(Clone)]
pub struct Container {
    bytes: Arc<[u8]>,
    region_offset: u32,
    entries: Vec<FieldEntry>,
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("full_size", &self.bytes.len())
            .field("region_offset", &self.region_offset)
            .field("fields", &self.entries.len())
            .finish()
    }
}

impl Container {
    /// Decode `bytes`; see [`decode_container`].
    pub fn decode(bytes: impl Into<Arc<[u8]>>) -> LdiResult<Self> {
        decode_container(bytes.into())
    }

    /// Byte length of the source buffer.
    pub fn full_size(&self) -> usize {
        self.bytes.len()
    }

    /// Distance from end-of-buffer back to the directory header.
    pub fn region_offset(&self) -> u32 {
        self.region_offset
    }

    /// The whole source buffer, e.g. for the leading JPEG of a container.
    pub fn source_bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub(crate) fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn field(&self, index: usize) -> Option<Field<'_>> {
        self.entries.get(index).map(|e| self.view(index, e))
    }

    /// All fields in directory order.
    pub fn fields(&self) -> impl Iterator<Item = Field<'_>> + '_ {
        self.entries
            .iter()
            .enumerate()
            .map(|(i, e)| self.view(i, e))
    }

    /// First field with `field_type`.
    pub fn field_by_type(&self, field_type: u32) -> Option<Field<'_>> {
        self.fields().find(|f| f.field_type == field_type)
    }

    /// Every field with `field_type`, in directory order.
    pub fn fields_by_type(&self, field_type: u32) -> impl Iterator<Item = Field<'_>> + '_ {
        self.fields().filter(move |f| f.field_type == field_type)
    }

    fn view(&self, index: usize, e: &FieldEntry) -> Field<'_> {
        Field {
            index,
            field_type: e.field_type,
            data: &self.bytes[e.offset..e.offset + e.size],
        }
    }
}

/// Parse the trailing field directory of `bytes`.
///
/// Layout, anchored at the end of the buffer:
///
/// ```text
/// [ ... payload ... ][count u32][(type u32, size u32, data)*count][region_offset u32][0x1E1A u16]
///                    ^ full_size - region_offset
/// ```
///
/// All integers are big-endian. Only the marker, the region offset and the directory start are
/// located by position; the directory itself is read strictly forward and must end exactly at
/// the trailer.
#[tracing::instrument(skip(bytes), fields(full_size = bytes.len()))]
pub fn decode_container(bytes: Arc<[u8]>) -> LdiResult<Container> {
    let full = bytes.len();

    let marker = if full >= 2 {
        ByteReader::window(&bytes, full - 2, full)?.u16_be()?
    } else {
        0
    };
    if full < 2 || marker != END_MARKER {
        return Err(FormatError::NotContainerFormat {
            found: marker,
            expected: END_MARKER,
        }
        .into());
    }
    if full < TRAILER_LEN {
        return Err(FormatError::Truncated {
            offset: 0,
            needed: TRAILER_LEN,
            available: full,
        }
        .into());
    }

    let region_offset = ByteReader::window(&bytes, full - TRAILER_LEN, full - 2)?.u32_be()?;
    let dir_end = full - TRAILER_LEN;
    let dir_start = full
        .checked_sub(region_offset as usize)
        .ok_or(FormatError::Truncated {
            offset: 0,
            needed: region_offset as usize,
            available: full,
        })?;

    let mut r = ByteReader::window(&bytes, dir_start, dir_end)?;
    let declared = r.u32_be()?;

    // Every record needs at least its header, so a count the region cannot hold is rejected
    // before anything is allocated for it.
    let max_records = r.remaining() / FIELD_HEADER_LEN;
    if declared as usize > max_records {
        return Err(FormatError::Truncated {
            offset: r.position(),
            needed: (declared as usize).saturating_mul(FIELD_HEADER_LEN),
            available: r.remaining(),
        }
        .into());
    }

    let mut entries = Vec::with_capacity(declared as usize);
    for _ in 0..declared {
        let field_type = r.u32_be()?;
        let size = r.u32_be()? as usize;
        let offset = r.position();
        r.bytes(size)?;
        entries.push(FieldEntry {
            field_type,
            offset,
            size,
        });
    }

    if !r.is_empty() {
        return Err(FormatError::BadFieldCount {
            declared,
            trailing: r.remaining(),
        }
        .into());
    }

    tracing::debug!(fields = entries.len(), region_offset, "decoded container directory");

    Ok(Container {
        bytes,
        region_offset,
        entries,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/container/decode.rs"]
mod tests;
