use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("invalid candidate bucket count {0}: must be between 2 and 5")]
    InvalidCandidateCount(usize),

    #[error("invalid bits per tag {0}: must be nonzero and at most 32")]
    InvalidBitsPerTag(u32),

    #[error("max_keys {0} is too large: bucket count calculation overflowed")]
    InvalidMaxKeys(u64),
}
