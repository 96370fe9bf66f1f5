//! containers::bitmap
//!
//! Fixed-length bit array with range queries.
//!
//! Bits are packed little-endian into `u64` words: bit `i` lives in word
//! `i / 64` under mask `1 << (i % 64)`. Unused high bits of the last word
//! are always zero.

use std::fmt;

use super::ContainerError;

const WORD_BITS: usize = u64::BITS as usize;
const HEX_PER_LINE: usize = 16;

/// A fixed-length sequence of bits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    words: Vec<u64>,
    len: usize,
}

fn word_count(bits: usize) -> usize {
    bits.div_ceil(WORD_BITS)
}

fn mask(idx: usize) -> u64 {
    1 << (idx % WORD_BITS)
}

impl Bitmap {
    /// Creates a bitmap of `bits` bits, all `false`.
    ///
    /// Fails with [`ContainerError::Alloc`] if the storage cannot be
    /// reserved.
    pub fn new(bits: usize) -> Result<Self, ContainerError> {
        let count = word_count(bits);
        let mut words = Vec::new();
        words
            .try_reserve_exact(count)
            .map_err(|_| ContainerError::Alloc { bits })?;
        words.resize(count, 0);
        Ok(Self { words, len: bits })
    }

    /// Number of bits.
    pub fn size(&self) -> usize {
        self.len
    }

    fn check_index(&self, idx: usize) -> Result<(), ContainerError> {
        if idx < self.len {
            Ok(())
        } else {
            Err(ContainerError::BitIndex {
                idx,
                size: self.len,
            })
        }
    }

    fn check_range(&self, start: usize, cnt: usize) -> Result<(), ContainerError> {
        match start.checked_add(cnt) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(ContainerError::BitRange {
                start,
                cnt,
                size: self.len,
            }),
        }
    }

    fn get(&self, idx: usize) -> bool {
        self.words[idx / WORD_BITS] & mask(idx) != 0
    }

    fn put(&mut self, idx: usize, value: bool) {
        let word = &mut self.words[idx / WORD_BITS];
        if value {
            *word |= mask(idx);
        } else {
            *word &= !mask(idx);
        }
    }

    /// Returns the bit at `idx`.
    pub fn test(&self, idx: usize) -> Result<bool, ContainerError> {
        self.check_index(idx)?;
        Ok(self.get(idx))
    }

    /// Sets the bit at `idx` to `value`.
    pub fn set(&mut self, idx: usize, value: bool) -> Result<(), ContainerError> {
        self.check_index(idx)?;
        self.put(idx, value);
        Ok(())
    }

    /// Sets the bit at `idx` to `true`.
    pub fn mark(&mut self, idx: usize) -> Result<(), ContainerError> {
        self.set(idx, true)
    }

    /// Sets the bit at `idx` to `false`.
    pub fn reset(&mut self, idx: usize) -> Result<(), ContainerError> {
        self.set(idx, false)
    }

    /// Toggles the bit at `idx`.
    pub fn flip(&mut self, idx: usize) -> Result<(), ContainerError> {
        self.check_index(idx)?;
        self.words[idx / WORD_BITS] ^= mask(idx);
        Ok(())
    }

    /// Sets every bit to `value`.
    pub fn set_all(&mut self, value: bool) {
        // Whole-range writes are always in bounds.
        self.fill(0, self.len, value);
    }

    /// Sets bits `[start, start + cnt)` to `value`.
    pub fn set_multiple(&mut self, start: usize, cnt: usize, value: bool) -> Result<(), ContainerError> {
        self.check_range(start, cnt)?;
        self.fill(start, cnt, value);
        Ok(())
    }

    fn fill(&mut self, start: usize, cnt: usize, value: bool) {
        for idx in start..start + cnt {
            self.put(idx, value);
        }
    }

    /// Counts bits in `[start, start + cnt)` equal to `value`.
    pub fn count(&self, start: usize, cnt: usize, value: bool) -> Result<usize, ContainerError> {
        self.check_range(start, cnt)?;
        Ok((start..start + cnt).filter(|&idx| self.get(idx) == value).count())
    }

    /// Returns `true` if any bit in `[start, start + cnt)` equals `value`.
    pub fn contains(&self, start: usize, cnt: usize, value: bool) -> Result<bool, ContainerError> {
        self.check_range(start, cnt)?;
        Ok((start..start + cnt).any(|idx| self.get(idx) == value))
    }

    /// Returns `true` if any bit in the range is set.
    pub fn any(&self, start: usize, cnt: usize) -> Result<bool, ContainerError> {
        self.contains(start, cnt, true)
    }

    /// Returns `true` if no bit in the range is set.
    pub fn none(&self, start: usize, cnt: usize) -> Result<bool, ContainerError> {
        self.contains(start, cnt, true).map(|found| !found)
    }

    /// Returns `true` if every bit in the range is set.
    pub fn all(&self, start: usize, cnt: usize) -> Result<bool, ContainerError> {
        self.contains(start, cnt, false).map(|found| !found)
    }

    /// Finds the first index at or after `start` that begins `cnt`
    /// consecutive bits equal to `value`.
    ///
    /// Returns `Ok(None)` when no such run exists.
    pub fn scan(&self, start: usize, cnt: usize, value: bool) -> Result<Option<usize>, ContainerError> {
        if start > self.len {
            return Err(ContainerError::BitIndex {
                idx: start,
                size: self.len,
            });
        }
        if cnt > self.len {
            return Ok(None);
        }
        let last = self.len - cnt;
        Ok((start..=last).find(|&idx| !(idx..idx + cnt).any(|bit| self.get(bit) != value)))
    }

    /// Like [`Bitmap::scan`], then flips the run it found to `!value`.
    pub fn scan_and_flip(
        &mut self,
        start: usize,
        cnt: usize,
        value: bool,
    ) -> Result<Option<usize>, ContainerError> {
        let found = self.scan(start, cnt, value)?;
        if let Some(idx) = found {
            self.fill(idx, cnt, !value);
        }
        Ok(found)
    }

    /// Returns a copy grown by `delta` bits.
    ///
    /// Existing bits keep their indices; new bits are `false`. The original
    /// is left untouched so the caller can swap the copy in.
    pub fn expanded(&self, delta: usize) -> Result<Bitmap, ContainerError> {
        let len = self.len.checked_add(delta).ok_or(ContainerError::BitRange {
            start: self.len,
            cnt: delta,
            size: self.len,
        })?;
        let mut grown = Bitmap::new(len)?;
        grown.words[..self.words.len()].copy_from_slice(&self.words);
        Ok(grown)
    }

    /// Raw backing bytes in memory order.
    pub fn bytes(&self) -> Vec<u8> {
        self.words.iter().flat_map(|word| word.to_le_bytes()).collect()
    }

    /// Renders the backing storage as hex dump lines: an 8-digit offset,
    /// then 16 bytes per line with a `-` after the eighth.
    pub fn hex_dump(&self) -> Vec<String> {
        self.bytes()
            .chunks(HEX_PER_LINE)
            .enumerate()
            .map(|(line, chunk)| {
                let mut out = format!("{:08x}  ", line * HEX_PER_LINE);
                for (i, byte) in chunk.iter().enumerate() {
                    let sep = if i == HEX_PER_LINE / 2 - 1 { '-' } else { ' ' };
                    out.push_str(&format!("{:02x}{}", byte, sep));
                }
                out.trim_end().to_string()
            })
            .collect()
    }
}

/// Bits as a `0`/`1` string, lowest index first.
impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..self.len {
            f.write_str(if self.get(idx) { "1" } else { "0" })?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_bit_ops() {
        let mut bm = Bitmap::new(8).unwrap();
        bm.set(3, true).unwrap();
        assert_eq!(bm.to_string(), "00010000");
        bm.flip(0).unwrap();
        bm.mark(7).unwrap();
        assert_eq!(bm.to_string(), "10010001");
        bm.reset(3).unwrap();
        assert_eq!(bm.test(3), Ok(false));
        assert_eq!(bm.test(0), Ok(true));
    }

    #[test]
    fn out_of_range_bits_are_rejected() {
        let mut bm = Bitmap::new(4).unwrap();
        assert_eq!(bm.set(4, true), Err(ContainerError::BitIndex { idx: 4, size: 4 }));
        assert_eq!(
            bm.count(2, 3, true),
            Err(ContainerError::BitRange {
                start: 2,
                cnt: 3,
                size: 4
            })
        );
        assert_eq!(bm.to_string(), "0000");
    }

    #[test]
    fn set_all_then_count() {
        let mut bm = Bitmap::new(70).unwrap();
        bm.set_all(true);
        assert_eq!(bm.count(0, 70, true), Ok(70));
        assert_eq!(bm.count(0, 70, false), Ok(0));
        assert!(bm.all(0, 70).unwrap());
        bm.set_all(false);
        assert!(bm.none(0, 70).unwrap());
    }

    #[test]
    fn range_queries() {
        let mut bm = Bitmap::new(16).unwrap();
        bm.set_multiple(4, 4, true).unwrap();
        assert!(bm.any(0, 5).unwrap());
        assert!(!bm.any(0, 4).unwrap());
        assert!(bm.all(4, 4).unwrap());
        assert!(!bm.all(3, 4).unwrap());
        assert!(bm.contains(0, 16, false).unwrap());
        assert!(bm.none(8, 8).unwrap());
        // Empty ranges: nothing to find, so `all` and `none` hold.
        assert!(!bm.any(5, 0).unwrap());
        assert!(bm.all(5, 0).unwrap());
    }

    #[test]
    fn scan_finds_runs() {
        let mut bm = Bitmap::new(8).unwrap();
        bm.set_multiple(0, 3, true).unwrap();
        assert_eq!(bm.scan(0, 2, false), Ok(Some(3)));
        assert_eq!(bm.scan(0, 5, false), Ok(Some(3)));
        assert_eq!(bm.scan(0, 6, false), Ok(None));
        assert_eq!(bm.scan(1, 2, true), Ok(Some(1)));
        assert_eq!(bm.scan(0, 9, true), Ok(None));
        assert!(bm.scan(9, 1, true).is_err());
    }

    #[test]
    fn scan_and_flip_claims_run() {
        let mut bm = Bitmap::new(8).unwrap();
        assert_eq!(bm.scan_and_flip(0, 3, false), Ok(Some(0)));
        assert_eq!(bm.scan_and_flip(0, 3, false), Ok(Some(3)));
        assert_eq!(bm.scan_and_flip(0, 3, false), Ok(None));
        assert_eq!(bm.to_string(), "11111100");
    }

    #[test]
    fn expand_preserves_bits() {
        let mut bm = Bitmap::new(62).unwrap();
        bm.set(61, true).unwrap();
        bm.set(0, true).unwrap();
        let grown = bm.expanded(10).unwrap();
        assert_eq!(grown.size(), 72);
        assert_eq!(grown.test(61), Ok(true));
        assert_eq!(grown.test(0), Ok(true));
        assert_eq!(grown.count(0, 72, true), Ok(2));
        assert_eq!(bm.size(), 62);
    }

    #[test]
    fn hex_dump_layout() {
        let mut bm = Bitmap::new(8).unwrap();
        bm.set(3, true).unwrap();
        assert_eq!(bm.hex_dump(), vec!["00000000  08 00 00 00 00 00 00 00-"]);

        let wide = Bitmap::new(192).unwrap();
        let lines = wide.hex_dump();
        assert_eq!(lines.len(), 2);
        assert!(lines[1].starts_with("00000010  00"));
    }

    #[test]
    fn oversized_bitmap_is_an_error() {
        assert_eq!(
            Bitmap::new(usize::MAX),
            Err(ContainerError::Alloc { bits: usize::MAX })
        );
    }

    #[test]
    fn oversized_expand_leaves_original() {
        let mut bm = Bitmap::new(8).unwrap();
        bm.mark(2).unwrap();
        let delta = usize::MAX - 8;
        assert_eq!(
            bm.expanded(delta),
            Err(ContainerError::Alloc { bits: usize::MAX })
        );
        assert_eq!(bm.to_string(), "00100000");
    }

    #[test]
    fn empty_bitmap() {
        let bm = Bitmap::new(0).unwrap();
        assert_eq!(bm.size(), 0);
        assert_eq!(bm.to_string(), "");
        assert!(bm.hex_dump().is_empty());
        assert_eq!(bm.scan(0, 0, true), Ok(Some(0)));
    }
}
