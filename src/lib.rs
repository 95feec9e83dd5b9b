//! Probabilistic set-membership filters.
//!
//! [`dary_cuckoo::CuckooFilter`] is a d-ary cuckoo filter: each element gets `d`
//! candidate buckets (2 to 5) instead of the classical binary cuckoo filter's 2,
//! trading a more involved displacement function for a markedly higher load factor.

pub mod dary_cuckoo;

pub use dary_cuckoo::{CuckooFilter, CuckooFilterBuilder, Error, Status, TableKind};
