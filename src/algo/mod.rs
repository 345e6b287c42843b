//! Algorithm implementations for sequence splicing.
//!
//! - `splices`: greedy splice search between two sequences
//! - `batch`: splice search over many independent pairs

mod batch;
mod splices;

pub use batch::{find_splices_batch, SequencePair};
pub use splices::{find_splices, find_splices_by, find_splices_with, try_find_splices};
