//! Bucket storage for the d-ary cuckoo filter.
//!
//! Three interchangeable layouts: a densely byte-packed table used by default, a
//! full-word table for measuring the effect of fingerprint size in isolation, and a
//! table whose index space is rotated by a stored "mark" so it can be sized below
//! the power-of-`d` bucket count.

use crate::dary_cuckoo::error::Error;

/// Which concrete bucket layout a filter was built with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableKind {
    #[default]
    Single,
    Mock,
    PackedWithMark,
}

/// Storage primitives a d-ary cuckoo filter needs from its bucket array.
///
/// `insert` takes the index by mutable reference because the packed-with-mark
/// variant rotates it to the displaced bucket's stored mark on a successful
/// kickout; the single and mock tables leave it untouched.
pub trait Table {
    fn read(&self, i: usize) -> u32;
    fn write(&mut self, i: usize, tag: u32);

    fn find(&self, i: usize, tag: u32) -> bool {
        self.read(i) == tag
    }

    fn delete(&mut self, i: usize, tag: u32) -> bool {
        if self.read(i) == tag {
            self.write(i, 0);
            true
        } else {
            false
        }
    }

    fn insert(&mut self, i: &mut usize, tag: u32, kickout: bool, oldtag: &mut u32) -> bool;

    /// Number of buckets actually allocated.
    fn size_in_buckets(&self) -> usize;

    /// Byte footprint of the backing storage.
    fn size_in_bytes(&self) -> usize;

    /// Size of the index space the hash layer should reduce indices into.
    /// Equal to `size_in_buckets()` except for the packed-with-mark variant.
    fn hash_table_size(&self) -> usize;

    fn info(&self, bits_per_tag: u32) -> String;
}

pub(crate) fn tag_mask(bits_per_tag: u32) -> u32 {
    if bits_per_tag >= 32 {
        u32::MAX
    } else {
        (1u32 << bits_per_tag) - 1
    }
}

fn density_threshold(d: usize) -> f64 {
    match d {
        2 => 0.42,
        3 => 0.91,
        4 => 0.97,
        5 => 0.985,
        _ => unreachable!("d is validated to be in 2..=5 before a table is built"),
    }
}

/// Smallest power of `d` at least `max_keys.max(1)`, i.e. `d^ceil(log_d(max_keys))`.
///
/// Computed by repeated multiplication rather than floating-point `pow`/`log` so the
/// result is exact and overflow is explicit rather than relying on floating-point
/// `pow`/`log`.
fn upperpower_of_d(d: usize, max_keys: u64) -> Option<u64> {
    let m = max_keys.max(1);
    let mut n: u64 = 1;
    while n < m {
        n = n.checked_mul(d as u64)?;
    }
    Some(n)
}

/// Bucket count for the single/mock table layouts: round up to a power of `d`, then
/// apply the empirical density correction below.
fn sized_bucket_count(d: usize, max_keys: u64) -> Result<u64, Error> {
    let mut n = upperpower_of_d(d, max_keys).ok_or(Error::InvalidMaxKeys(max_keys))?;
    let frac = max_keys as f64 / n as f64;
    if frac > density_threshold(d) {
        n = n.checked_mul(d as u64).ok_or(Error::InvalidMaxKeys(max_keys))?;
    }
    Ok(n)
}

/// Densely byte-packed table: `⌈bits_per_tag/8⌉` bytes per bucket, little-endian.
pub struct SingleTable {
    bytes_per_bucket: usize,
    tag_mask: u32,
    num_buckets: usize,
    buckets: Vec<u8>,
}

impl SingleTable {
    pub fn new(d: usize, bits_per_tag: u32, max_keys: u64) -> Result<Self, Error> {
        let num_buckets = sized_bucket_count(d, max_keys)? as usize;
        let bytes_per_bucket = ((bits_per_tag + 7) / 8) as usize;
        Ok(SingleTable {
            bytes_per_bucket,
            tag_mask: tag_mask(bits_per_tag),
            num_buckets,
            buckets: vec![0u8; bytes_per_bucket * num_buckets],
        })
    }
}

impl Table for SingleTable {
    fn read(&self, i: usize) -> u32 {
        let start = i * self.bytes_per_bucket;
        let mut tag: u32 = 0;
        for (k, byte) in self.buckets[start..start + self.bytes_per_bucket].iter().enumerate() {
            tag |= (*byte as u32) << (8 * k);
        }
        tag & self.tag_mask
    }

    fn write(&mut self, i: usize, t: u32) {
        let tag = t & self.tag_mask;
        let start = i * self.bytes_per_bucket;
        for k in 0..self.bytes_per_bucket {
            self.buckets[start + k] = ((tag >> (8 * k)) & 0xFF) as u8;
        }
    }

    fn insert(&mut self, i: &mut usize, tag: u32, kickout: bool, oldtag: &mut u32) -> bool {
        if self.read(*i) == 0 {
            self.write(*i, tag);
            return true;
        }
        if kickout {
            *oldtag = self.read(*i);
            self.write(*i, tag);
        }
        false
    }

    fn size_in_buckets(&self) -> usize {
        self.num_buckets
    }

    fn size_in_bytes(&self) -> usize {
        self.bytes_per_bucket * self.num_buckets
    }

    fn hash_table_size(&self) -> usize {
        self.num_buckets
    }

    fn info(&self, bits_per_tag: u32) -> String {
        format!(
            "\t\tSingleTable with tag size: {} bits\n\t\tTotal rows: {}\n\t\tTable size in bits: {}\n",
            bits_per_tag,
            self.num_buckets,
            self.size_in_buckets() * bits_per_tag as usize,
        )
    }
}

/// Full 32-bit-word bucket, unpacked — isolates fingerprint-size effects from
/// packing overhead when measuring load factor.
pub struct MockTable {
    tag_mask: u32,
    num_buckets: usize,
    buckets: Vec<u32>,
}

impl MockTable {
    pub fn new(d: usize, bits_per_tag: u32, max_keys: u64) -> Result<Self, Error> {
        let num_buckets = sized_bucket_count(d, max_keys)? as usize;
        Ok(MockTable {
            tag_mask: tag_mask(bits_per_tag),
            num_buckets,
            buckets: vec![0u32; num_buckets],
        })
    }
}

impl Table for MockTable {
    fn read(&self, i: usize) -> u32 {
        self.buckets[i] & self.tag_mask
    }

    fn write(&mut self, i: usize, t: u32) {
        self.buckets[i] = t & self.tag_mask;
    }

    fn insert(&mut self, i: &mut usize, tag: u32, kickout: bool, oldtag: &mut u32) -> bool {
        if self.read(*i) == 0 {
            self.write(*i, tag);
            return true;
        }
        if kickout {
            *oldtag = self.read(*i);
            self.write(*i, tag);
        }
        false
    }

    fn size_in_buckets(&self) -> usize {
        self.num_buckets
    }

    fn size_in_bytes(&self) -> usize {
        self.num_buckets * 4
    }

    fn hash_table_size(&self) -> usize {
        self.num_buckets
    }

    fn info(&self, bits_per_tag: u32) -> String {
        format!(
            "\t\tMockTable with tag size: {} bits\n\t\tTotal rows: {}\n\t\tTable size in bits: {}\n",
            bits_per_tag,
            self.num_buckets,
            self.size_in_buckets() * bits_per_tag as usize,
        )
    }
}

/// Bucket count rounded down from the power-of-`d` index space, with a `mark`
/// recording which "lap" of that larger index space a slot's occupant came from.
pub struct PackedTable {
    tag_mask: u32,
    num_buckets: usize,
    hash_table_size: usize,
    tags: Vec<u32>,
    marks: Vec<u32>,
}

impl PackedTable {
    pub fn new(d: usize, bits_per_tag: u32, max_keys: u64) -> Result<Self, Error> {
        let hash_table_size = upperpower_of_d(d, max_keys).ok_or(Error::InvalidMaxKeys(max_keys))? as usize;
        // d=4 uses 0.96 here, distinct from the 0.97 used by the single/mock table
        // density correction above -- an intentional asymmetry, see DESIGN.md.
        let threshold = match d {
            2 => 0.42,
            3 => 0.91,
            4 => 0.96,
            5 => 0.985,
            _ => unreachable!("d is validated to be in 2..=5 before a table is built"),
        };
        let num_buckets = ((max_keys as f64 / threshold).ceil() as usize).max(1);
        Ok(PackedTable {
            tag_mask: tag_mask(bits_per_tag),
            num_buckets,
            hash_table_size,
            tags: vec![0u32; num_buckets],
            marks: vec![0u32; num_buckets],
        })
    }
}

impl Table for PackedTable {
    fn read(&self, i: usize) -> u32 {
        self.tags[i % self.num_buckets] & self.tag_mask
    }

    fn write(&mut self, i: usize, t: u32) {
        let b = i % self.num_buckets;
        self.tags[b] = t & self.tag_mask;
        self.marks[b] = (i / self.num_buckets) as u32;
    }

    fn find(&self, i: usize, tag: u32) -> bool {
        let b = i % self.num_buckets;
        self.tags[b] == (tag & self.tag_mask) && self.marks[b] as usize == i / self.num_buckets
    }

    fn delete(&mut self, i: usize, tag: u32) -> bool {
        if self.find(i, tag) {
            self.write(i, 0);
            true
        } else {
            false
        }
    }

    fn insert(&mut self, i: &mut usize, tag: u32, kickout: bool, oldtag: &mut u32) -> bool {
        let b = *i % self.num_buckets;
        if self.tags[b] == 0 {
            self.write(*i, tag);
            return true;
        }
        if kickout {
            let mark = self.marks[b] as usize;
            *oldtag = self.tags[b];
            self.write(*i, tag);
            *i = b + mark * self.num_buckets;
        }
        false
    }

    fn size_in_buckets(&self) -> usize {
        self.num_buckets
    }

    fn size_in_bytes(&self) -> usize {
        self.num_buckets * 8
    }

    fn hash_table_size(&self) -> usize {
        self.hash_table_size
    }

    fn info(&self, bits_per_tag: u32) -> String {
        format!(
            "\t\tPackedTable with tag size: {} bits\n\t\tTotal rows: {}\n\t\tTable size in bits: {}\n",
            bits_per_tag,
            self.num_buckets,
            self.size_in_buckets() * bits_per_tag as usize,
        )
    }
}

/// Enum dispatch over the three table layouts, chosen once at construction.
pub enum TableImpl {
    Single(SingleTable),
    Mock(MockTable),
    Packed(PackedTable),
}

impl Table for TableImpl {
    fn read(&self, i: usize) -> u32 {
        match self {
            TableImpl::Single(t) => t.read(i),
            TableImpl::Mock(t) => t.read(i),
            TableImpl::Packed(t) => t.read(i),
        }
    }

    fn write(&mut self, i: usize, tag: u32) {
        match self {
            TableImpl::Single(t) => t.write(i, tag),
            TableImpl::Mock(t) => t.write(i, tag),
            TableImpl::Packed(t) => t.write(i, tag),
        }
    }

    fn find(&self, i: usize, tag: u32) -> bool {
        match self {
            TableImpl::Single(t) => t.find(i, tag),
            TableImpl::Mock(t) => t.find(i, tag),
            TableImpl::Packed(t) => t.find(i, tag),
        }
    }

    fn delete(&mut self, i: usize, tag: u32) -> bool {
        match self {
            TableImpl::Single(t) => t.delete(i, tag),
            TableImpl::Mock(t) => t.delete(i, tag),
            TableImpl::Packed(t) => t.delete(i, tag),
        }
    }

    fn insert(&mut self, i: &mut usize, tag: u32, kickout: bool, oldtag: &mut u32) -> bool {
        match self {
            TableImpl::Single(t) => t.insert(i, tag, kickout, oldtag),
            TableImpl::Mock(t) => t.insert(i, tag, kickout, oldtag),
            TableImpl::Packed(t) => t.insert(i, tag, kickout, oldtag),
        }
    }

    fn size_in_buckets(&self) -> usize {
        match self {
            TableImpl::Single(t) => t.size_in_buckets(),
            TableImpl::Mock(t) => t.size_in_buckets(),
            TableImpl::Packed(t) => t.size_in_buckets(),
        }
    }

    fn size_in_bytes(&self) -> usize {
        match self {
            TableImpl::Single(t) => t.size_in_bytes(),
            TableImpl::Mock(t) => t.size_in_bytes(),
            TableImpl::Packed(t) => t.size_in_bytes(),
        }
    }

    fn hash_table_size(&self) -> usize {
        match self {
            TableImpl::Single(t) => t.hash_table_size(),
            TableImpl::Mock(t) => t.hash_table_size(),
            TableImpl::Packed(t) => t.hash_table_size(),
        }
    }

    fn info(&self, bits_per_tag: u32) -> String {
        match self {
            TableImpl::Single(t) => t.info(bits_per_tag),
            TableImpl::Mock(t) => t.info(bits_per_tag),
            TableImpl::Packed(t) => t.info(bits_per_tag),
        }
    }
}
