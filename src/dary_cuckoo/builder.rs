use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::dary_cuckoo::error::Error;
use crate::dary_cuckoo::table::{tag_mask, MockTable, PackedTable, SingleTable, TableImpl, TableKind};
use crate::dary_cuckoo::{CuckooFilter, Victim};

/// Builds a [`CuckooFilter`] through a plain constructor plus levers, each returning
/// `Self` for chaining.
///
/// Defaults to `d = 2` (the classical binary cuckoo filter), 8-bit fingerprints, and
/// the densely packed [`TableKind::Single`] layout.
pub struct CuckooFilterBuilder {
    max_keys: u64,
    d: usize,
    bits_per_tag: u32,
    table_kind: TableKind,
}

impl CuckooFilterBuilder {
    pub fn new(max_keys: u64) -> Self {
        CuckooFilterBuilder {
            max_keys,
            d: 2,
            bits_per_tag: 8,
            table_kind: TableKind::Single,
        }
    }

    /// Number of candidate buckets per element. Must be between 2 and 5.
    pub fn d(mut self, d: usize) -> Self {
        self.d = d;
        self
    }

    pub fn bits_per_tag(mut self, bits_per_tag: u32) -> Self {
        self.bits_per_tag = bits_per_tag;
        self
    }

    pub fn table_kind(mut self, table_kind: TableKind) -> Self {
        self.table_kind = table_kind;
        self
    }

    pub fn build(self) -> Result<CuckooFilter, Error> {
        if !(2..=5).contains(&self.d) {
            return Err(Error::InvalidCandidateCount(self.d));
        }
        if self.bits_per_tag == 0 || self.bits_per_tag > 32 {
            return Err(Error::InvalidBitsPerTag(self.bits_per_tag));
        }

        let table = match self.table_kind {
            TableKind::Single => {
                TableImpl::Single(SingleTable::new(self.d, self.bits_per_tag, self.max_keys)?)
            }
            TableKind::Mock => TableImpl::Mock(MockTable::new(self.d, self.bits_per_tag, self.max_keys)?),
            TableKind::PackedWithMark => {
                TableImpl::Packed(PackedTable::new(self.d, self.bits_per_tag, self.max_keys)?)
            }
        };

        log::debug!(
            "constructed d-ary cuckoo filter: d={} bits_per_tag={} table_kind={:?} max_keys={}",
            self.d,
            self.bits_per_tag,
            self.table_kind,
            self.max_keys,
        );

        Ok(CuckooFilter {
            table,
            d: self.d,
            bits_per_tag: self.bits_per_tag,
            tag_mask: tag_mask(self.bits_per_tag),
            item_count: 0,
            victim: Victim::default(),
            rng: StdRng::from_entropy(),
        })
    }
}
