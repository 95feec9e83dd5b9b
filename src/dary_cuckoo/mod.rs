//! Implements a d-ary cuckoo filter: a cuckoo filter generalized to give each element
//! `d` candidate buckets instead of 2. The wider candidate set sustains a markedly
//! higher load factor before the random-walk eviction loop has to fall back to the
//! single-slot victim cache, at the cost of a more involved displacement function
//! (see the `alt` submodule).
//!
//! Elements are taken as `AsRef<[u8]>` rather than through a generic hasher type: the
//! index/fingerprint derivation (SHA-1) and the displacement step (`lookup3`) are
//! fixed, not pluggable.

use rand::rngs::StdRng;
use rand::Rng;
use sha1::{Digest, Sha1};

mod alt;
mod builder;
mod error;
mod table;
#[cfg(test)]
mod test;

pub use builder::CuckooFilterBuilder;
pub use error::Error;
pub use table::TableKind;

use table::{Table, TableImpl};

/// Bound on the number of displacements attempted per `add` before the element is
/// handed to the victim cache.
const MAX_KICKS: u32 = 5000;

/// Outcome of `add`/`contain`/`delete`. `NotFound` and `NotEnoughSpace` are routine,
/// expected outcomes of a probabilistic membership structure, not exceptional ones --
/// modeled as a plain enum rather than `Result`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Ok,
    NotFound,
    NotEnoughSpace,
}

#[derive(Debug, Clone, Copy, Default)]
struct Victim {
    index: usize,
    tag: u32,
    used: bool,
}

/// A d-ary cuckoo filter: a set-membership sketch with no false negatives and a
/// tunable false-positive rate, supporting deletion.
///
/// Construct with [`CuckooFilterBuilder`].
pub struct CuckooFilter {
    table: TableImpl,
    d: usize,
    bits_per_tag: u32,
    tag_mask: u32,
    item_count: u64,
    victim: Victim,
    rng: StdRng,
}

/// Where an element ended up after [`CuckooFilter::place`] ran the try-all-empty and
/// random-walk phases.
enum Placement {
    Table,
    Victim(usize, u32),
}

impl CuckooFilter {
    /// `d=2`, 8-bit fingerprints, [`TableKind::Single`] storage -- the classical
    /// binary cuckoo filter shape, sized for roughly `max_keys` elements.
    pub fn new(max_keys: u64) -> Result<Self, Error> {
        CuckooFilterBuilder::new(max_keys).build()
    }

    fn hash_item(&self, bytes: &[u8]) -> (usize, u32) {
        let mut hasher = Sha1::new();
        hasher.update(bytes);
        let digest = hasher.finalize();
        let hv = u64::from_le_bytes(digest[0..8].try_into().expect("sha1 digest is >= 8 bytes"));

        let h_hi = (hv >> 32) as u32;
        let h_lo = (hv & 0xFFFF_FFFF) as u32;

        let index = h_hi as usize % self.table.hash_table_size();
        let mut tag = h_lo & self.tag_mask;
        if tag == 0 {
            tag = 1;
        }
        (index, tag)
    }

    /// Candidate bucket indices for `(i0, tag)`, filled left to right via `alt` and
    /// debug-asserted to cycle back to `i0` after exactly `d` steps. A fixed-size stack
    /// array of 5 slots covers every supported `d` without a heap allocation; only the
    /// first `self.d` entries are meaningful.
    fn candidate_set(&self, i0: usize, tag: u32) -> [usize; 5] {
        let mut idx = [i0; 5];
        let index_space = self.table.hash_table_size();
        for k in 1..self.d {
            idx[k] = alt::alt(idx[k - 1], tag, self.d, index_space);
        }
        debug_assert_eq!(
            alt::alt(idx[self.d - 1], tag, self.d, index_space),
            idx[0],
            "candidate set failed to cycle back to its starting index",
        );
        idx
    }

    /// Tries every candidate bucket empty-first, then runs the bounded random-walk
    /// eviction loop. Does not touch `item_count` -- callers decide whether a
    /// successful placement represents a new item or a victim being reinstated.
    fn place(&mut self, i0: usize, tag: u32) -> Placement {
        let mut cur_tag = tag;
        let mut idx = self.candidate_set(i0, cur_tag);

        for k in 0..self.d {
            let mut oldtag = 0u32;
            let mut candidate = idx[k];
            if self.table.insert(&mut candidate, cur_tag, false, &mut oldtag) {
                return Placement::Table;
            }
        }

        let start = self.rng.gen_range(0..self.d);
        let mut i = idx[start];

        for _ in 0..MAX_KICKS {
            let mut oldtag = 0u32;
            self.table.insert(&mut i, cur_tag, true, &mut oldtag);
            cur_tag = oldtag;

            idx = self.candidate_set(i, cur_tag);

            let pick = if self.d > 1 {
                self.rng.gen_range(0..self.d - 1)
            } else {
                0
            };
            i = idx[1 + pick];

            let mut oldtag2 = 0u32;
            if self.table.insert(&mut i, cur_tag, false, &mut oldtag2) {
                return Placement::Table;
            }
        }

        log::warn!(
            "d-ary cuckoo filter saturated after {} kicks; load_factor={:.4}",
            MAX_KICKS,
            self.load_factor(),
        );
        Placement::Victim(i, cur_tag)
    }

    /// Adds an element to the filter.
    ///
    /// Returns [`Status::NotEnoughSpace`] only if the victim slot was already
    /// occupied on entry; an element that overflows the random walk during this call
    /// is still considered stored (it spills into the victim slot) and `Ok` is
    /// returned.
    pub fn add<I: AsRef<[u8]>>(&mut self, entry: I) -> Status {
        if self.victim.used {
            log::warn!("rejecting add: victim slot already occupied");
            return Status::NotEnoughSpace;
        }

        let (i0, tag) = self.hash_item(entry.as_ref());
        match self.place(i0, tag) {
            Placement::Table => {}
            Placement::Victim(index, tag) => {
                self.victim = Victim { index, tag, used: true };
            }
        }
        self.item_count += 1;
        Status::Ok
    }

    /// Reports whether `entry` may be in the filter. May return `Ok` for an element
    /// never inserted (a false positive); never returns `NotFound` for an element that
    /// was inserted and not subsequently deleted.
    pub fn contains<I: AsRef<[u8]>>(&self, entry: I) -> Status {
        let (i0, tag) = self.hash_item(entry.as_ref());
        let idx = self.candidate_set(i0, tag);

        let victim_hit =
            self.victim.used && self.victim.tag == tag && idx[..self.d].contains(&self.victim.index);
        if victim_hit {
            return Status::Ok;
        }

        for &i in &idx[..self.d] {
            if self.table.find(i, tag) {
                return Status::Ok;
            }
        }
        Status::NotFound
    }

    /// Removes `entry`. Uses first-match semantics across the candidate set: if two
    /// elements share a fingerprint and a candidate bucket, whichever is found first
    /// is removed (a classical, accepted cuckoo filter caveat). Deleting an element
    /// that was never inserted is undefined in general, but returns `NotFound` unless
    /// it happens to collide with a stored fingerprint.
    pub fn delete<I: AsRef<[u8]>>(&mut self, entry: I) -> Status {
        let (i0, tag) = self.hash_item(entry.as_ref());
        let idx = self.candidate_set(i0, tag);

        for &i in &idx[..self.d] {
            if self.table.delete(i, tag) {
                self.item_count -= 1;
                self.try_eliminate_victim();
                return Status::Ok;
            }
        }

        let victim_hit = idx[..self.d].contains(&self.victim.index);
        if self.victim.used && self.victim.tag == tag && victim_hit {
            self.victim.used = false;
            self.item_count -= 1;
            return Status::Ok;
        }

        Status::NotFound
    }

    /// After a delete frees a table slot, try to move the victim (if any) back into
    /// the table. Reuses `place` rather than `add` since this is relocating an item
    /// already counted in `item_count`, not inserting a new one.
    fn try_eliminate_victim(&mut self) {
        if !self.victim.used {
            return;
        }
        let index = self.victim.index;
        let tag = self.victim.tag;
        self.victim.used = false;

        match self.place(index, tag) {
            Placement::Table => {}
            Placement::Victim(index, tag) => {
                self.victim = Victim { index, tag, used: true };
            }
        }
    }

    /// Number of items currently stored, including one held in the victim slot.
    pub fn size(&self) -> u64 {
        self.item_count
    }

    pub fn size_in_bytes(&self) -> usize {
        self.table.size_in_bytes()
    }

    pub fn load_factor(&self) -> f64 {
        self.item_count as f64 / self.table.size_in_buckets() as f64
    }

    pub fn info(&self) -> String {
        format!(
            "DaryCuckooFilter Status:\n{}\t\tKeys stored: {}\n\t\tLoad factor: {:.4}\n",
            self.table.info(self.bits_per_tag),
            self.item_count,
            self.load_factor(),
        )
    }
}
