//! Binary heap merger.

use std::cmp::Reverse;
use std::collections::BinaryHeap;
use std::error::Error;
use std::io;
use std::io::prelude::*;

use crate::line::LineWriter;

/// Binary heap merger implementation.
/// Merges multiple sorted inputs into a single sorted output.
/// Time complexity is *m* \* log(*n*) in worst case where *m* is the number of items,
/// *n* is the number of chunks (inputs).
///
/// At most one item per input is held in memory. Equal items coming from different inputs
/// are yielded in unspecified order. The merger stops after the first input error.
pub struct BinaryHeapMerger<T, E, C>
where
    T: Ord,
    E: Error,
    C: IntoIterator<Item = Result<T, E>>,
{
    // binary heap is max-heap by default so we reverse it to convert it to min-heap
    items: BinaryHeap<(Reverse<T>, usize)>,
    chunks: Vec<C::IntoIter>,
    initiated: bool,
    pending_error: Option<E>,
    failed: bool,
}

impl<T, E, C> BinaryHeapMerger<T, E, C>
where
    T: Ord,
    E: Error,
    C: IntoIterator<Item = Result<T, E>>,
{
    /// Creates an instance of a binary heap merger using chunks as inputs.
    /// Chunk items should be sorted in ascending order otherwise the result is undefined.
    ///
    /// # Arguments
    /// * `chunks` - Chunks to be merged in a single sorted one
    pub fn new<I>(chunks: I) -> Self
    where
        I: IntoIterator<Item = C>,
    {
        let chunks = Vec::from_iter(chunks.into_iter().map(|c| c.into_iter()));
        let items = BinaryHeap::with_capacity(chunks.len());

        return BinaryHeapMerger {
            chunks,
            items,
            initiated: false,
            pending_error: None,
            failed: false,
        };
    }

    fn advance(&mut self, idx: usize) -> Result<(), E> {
        if let Some(item) = self.chunks[idx].next() {
            self.items.push((Reverse(item?), idx));
        }

        return Ok(());
    }
}

impl<T, E, C> Iterator for BinaryHeapMerger<T, E, C>
where
    T: Ord,
    E: Error,
    C: IntoIterator<Item = Result<T, E>>,
{
    type Item = Result<T, E>;

    /// Returns the next item from the inputs in ascending order.
    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        if let Some(err) = self.pending_error.take() {
            self.failed = true;
            return Some(Err(err));
        }

        if !self.initiated {
            self.initiated = true;
            for idx in 0..self.chunks.len() {
                if let Err(err) = self.advance(idx) {
                    self.failed = true;
                    return Some(Err(err));
                }
            }
        }

        // the popped item is still yielded, the error follows on the next call
        let (result, idx) = self.items.pop()?;
        if let Err(err) = self.advance(idx) {
            self.pending_error = Some(err);
        }

        return Some(Ok(result.0));
    }
}

/// Merges sorted record streams into `writer`.
/// Returns the number of records written.
///
/// The first read or write error aborts the merge. Records written before the failure stay
/// in the output, which then holds a sorted prefix of the result.
pub fn merge<W, C, I>(writer: &mut LineWriter<W>, readers: I) -> io::Result<u64>
where
    W: Write,
    C: IntoIterator<Item = io::Result<Vec<u8>>>,
    I: IntoIterator<Item = C>,
{
    let mut records_count = 0;

    for record in BinaryHeapMerger::new(readers) {
        writer.write_line(&record?)?;
        records_count += 1;
    }

    return Ok(records_count);
}
