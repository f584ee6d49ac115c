use crate::constants::BITFIELD_GROW_STEP;
use bytes::Bytes;

/// A growable bitfield recording which pieces a peer has.
///
/// Bits are numbered from the high bit of the first byte. Reading past the
/// end is always `false`; writing past the end grows the buffer with zeroed
/// bytes first. Peers may announce more pieces than we expected, so the
/// buffer is never treated as a hard limit.
///
/// Not synchronized: keep it inside the connection that owns it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Bitfield {
    bits: Vec<u8>,
}

impl Bitfield {
    /// Creates a bitfield of `len` zeroed bytes.
    pub fn new(len: usize) -> Self {
        Self {
            bits: vec![0; len],
        }
    }

    /// Creates a bitfield with no pieces set, large enough for `piece_count`.
    pub fn for_pieces(piece_count: usize) -> Self {
        Self::new(piece_count.div_ceil(8))
    }

    /// Marks the piece at `index` as available, growing if needed.
    ///
    /// Setting an already-set bit leaves it set.
    ///
    /// ```
    /// use btwire::peer::Bitfield;
    ///
    /// let mut bf = Bitfield::new(1);
    /// bf.set(0);
    /// assert_eq!(bf.as_bytes()[0], 0b1000_0000);
    /// ```
    pub fn set(&mut self, index: usize) {
        let byte_index = index / 8;
        if byte_index >= self.bits.len() {
            self.grow(byte_index + 1 - self.bits.len());
        }
        self.bits[byte_index] |= mask(index);
    }

    /// Clears the bit at `index`. Out-of-range indices are already clear.
    pub fn clear(&mut self, index: usize) {
        if let Some(byte) = self.bits.get_mut(index / 8) {
            *byte &= !mask(index);
        }
    }

    /// Returns true if the piece at `index` is available.
    pub fn is_set(&self, index: usize) -> bool {
        self.bits
            .get(index / 8)
            .is_some_and(|byte| byte & mask(index) != 0)
    }

    /// Overlays peer-supplied bytes onto the start of the bitfield.
    ///
    /// The buffer becomes `max(current, supplied)` bytes long; anything past
    /// the supplied bytes is zeroed.
    pub fn load_from_bytes(&mut self, bytes: &[u8]) {
        let len = self.bits.len().max(bytes.len());
        let mut bits = vec![0; len];
        bits[..bytes.len()].copy_from_slice(bytes);
        self.bits = bits;
    }

    /// Returns an independent copy of the current bytes.
    pub fn snapshot(&self) -> Bytes {
        Bytes::copy_from_slice(&self.bits)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bits
    }

    /// Number of bytes currently backing the bitfield.
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    /// True when no bytes back the bitfield, matching [`len`](Self::len).
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Returns true if no piece is marked available.
    pub fn none_set(&self) -> bool {
        self.bits.iter().all(|&b| b == 0)
    }

    /// Returns the number of set bits.
    pub fn count(&self) -> usize {
        self.bits.iter().map(|b| b.count_ones() as usize).sum()
    }

    fn grow(&mut self, at_least: usize) {
        let new_len = self.bits.len() + at_least.max(BITFIELD_GROW_STEP);
        self.bits.resize(new_len, 0);
    }
}

fn mask(index: usize) -> u8 {
    0x80 >> (index % 8)
}
