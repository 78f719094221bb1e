// Minimal bag-of-cells reader
//
// Just enough of the TON cell serialization format to read plain-text
// comments out of transfer forward payloads: single-root BOC, optional
// index and checksum sections, snake-encoded text continued through the
// first reference of each cell. Anything unexpected yields `None` - a
// malformed payload is never an error, the comment is simply absent.

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

const BOC_MAGIC: [u8; 4] = [0xb5, 0xee, 0x9c, 0x72];

const FLAG_HAS_INDEX: u8 = 0x80;

/// One deserialized cell: byte-aligned data prefix plus reference indices
#[derive(Debug, Clone)]
pub struct Cell {
    pub data: Vec<u8>,
    pub bit_len: usize,
    pub refs: Vec<usize>,
    pub is_exotic: bool,
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Option<&'a [u8]> {
        let slice = self.bytes.get(self.pos..self.pos + n)?;
        self.pos += n;
        Some(slice)
    }

    fn byte(&mut self) -> Option<u8> {
        let b = *self.bytes.get(self.pos)?;
        self.pos += 1;
        Some(b)
    }

    fn uint(&mut self, n: usize) -> Option<usize> {
        let slice = self.take(n)?;
        let mut value = 0usize;
        for &b in slice {
            value = value.checked_mul(256)?.checked_add(b as usize)?;
        }
        Some(value)
    }
}

/// Parse a base64-serialized BOC into its cells plus the root cell index
pub fn parse_boc_base64(payload: &str) -> Option<(Vec<Cell>, usize)> {
    let bytes = STANDARD.decode(payload.trim()).ok()?;
    parse_boc(&bytes)
}

fn parse_boc(bytes: &[u8]) -> Option<(Vec<Cell>, usize)> {
    let mut reader = Reader { bytes, pos: 0 };

    if reader.take(4)? != BOC_MAGIC {
        return None;
    }

    let flags = reader.byte()?;
    let ref_size = (flags & 0x07) as usize;
    if ref_size == 0 || ref_size > 4 {
        return None;
    }
    let offset_size = reader.byte()? as usize;
    if offset_size == 0 || offset_size > 8 {
        return None;
    }

    let cell_count = reader.uint(ref_size)?;
    let root_count = reader.uint(ref_size)?;
    let _absent = reader.uint(ref_size)?;
    let _total_cells_size = reader.uint(offset_size)?;

    if root_count != 1 || cell_count == 0 || cell_count > 4096 {
        return None;
    }
    let root_index = reader.uint(ref_size)?;

    if flags & FLAG_HAS_INDEX != 0 {
        reader.take(cell_count * offset_size)?;
    }

    let mut cells = Vec::with_capacity(cell_count);
    for _ in 0..cell_count {
        let d1 = reader.byte()?;
        let d2 = reader.byte()? as usize;

        let ref_count = (d1 & 0x07) as usize;
        let is_exotic = d1 & 0x08 != 0;
        if ref_count > 4 {
            return None;
        }

        let data_len = (d2 + 1) / 2;
        let mut data = reader.take(data_len)?.to_vec();
        let mut bit_len = data_len * 8;
        if d2 % 2 == 1 {
            // Partial last byte: the lowest set bit is the completion tag
            let last = *data.last()?;
            if last == 0 {
                return None;
            }
            let padding = last.trailing_zeros() as usize + 1;
            bit_len -= padding;
            *data.last_mut()? &= 0xffu8.checked_shl(padding as u32).unwrap_or(0);
        }

        let mut refs = Vec::with_capacity(ref_count);
        for _ in 0..ref_count {
            let idx = reader.uint(ref_size)?;
            if idx >= cell_count {
                return None;
            }
            refs.push(idx);
        }

        cells.push(Cell { data, bit_len, refs, is_exotic });
    }

    // A trailing checksum may follow; it is not verified here

    if root_index >= cells.len() {
        return None;
    }
    Some((cells, root_index))
}

/// Read a snake-encoded plain-text comment (32-bit zero op code prefix)
/// from a serialized payload cell.
pub fn read_comment(payload_base64: &str) -> Option<String> {
    let (cells, root_index) = parse_boc_base64(payload_base64)?;
    let root = &cells[root_index];
    if root.is_exotic || root.bit_len < 32 || root.bit_len % 8 != 0 {
        return None;
    }
    if root.data[..4] != [0, 0, 0, 0] {
        return None;
    }

    let mut text = root.data[4..].to_vec();
    let mut current = root;
    let mut hops = 0;
    while let Some(&next_index) = current.refs.first() {
        // Defensive bound; well-formed comments are short chains
        hops += 1;
        if hops > cells.len() {
            return None;
        }
        current = &cells[next_index];
        if current.is_exotic || current.bit_len % 8 != 0 {
            return None;
        }
        text.extend_from_slice(&current.data);
    }

    String::from_utf8(text).ok()
}
