//! `line-ext-sort` is an external sort implementation for newline-delimited text records.
//!
//! External sorting is a class of sorting algorithms that can handle massive amounts of data. External sorting
//! is required when the data being sorted do not fit into the main memory (RAM) of a computer and instead must be
//! resided in slower external memory, usually a hard disk drive. Sorting is achieved in two passes. During the
//! first pass it sorts partitions of data that each fit in RAM, during the second pass it merges the sorted
//! partitions together. For more information see [External Sorting](https://en.wikipedia.org/wiki/External_sorting).
//!
//! # Overview
//!
//! * **Partitions sorted in place:**
//!   every partition file is loaded, sorted and written back over itself, so no extra disk space
//!   is required beyond the partitions themselves.
//! * **Streaming k-way merge:**
//!   sorted partitions are merged through a binary heap holding at most one record per partition.
//! * **Byte-wise ordering:**
//!   records are arbitrary byte strings compared lexicographically, empty records included.
//!   A missing terminator after the last record of a partition is tolerated.
//! * **Input splitting:**
//!   a single large input can be split into bounded partitions stored in a temporary directory.
//!
//! # Example
//!
//! ```no_run
//! use std::fs;
//! use std::io;
//!
//! use env_logger;
//! use log;
//!
//! use line_ext_sort::{ExternalSorter, ExternalSorterBuilder, Partition};
//!
//! fn main() {
//!     env_logger::Builder::new().filter_level(log::LevelFilter::Debug).init();
//!
//!     let partitions = vec![Partition::new("part-0.txt"), Partition::new("part-1.txt")];
//!     let output_writer = io::BufWriter::new(fs::File::create("output.txt").unwrap());
//!
//!     let sorter: ExternalSorter = ExternalSorterBuilder::new().build().unwrap();
//!     sorter.sort(&partitions, output_writer).unwrap();
//! }
//! ```

pub mod buffer;
pub mod chunk;
pub mod line;
pub mod merger;
pub mod sort;

pub use buffer::{
    ChunkBuffer, ChunkBufferBuilder, LimitedBuffer, LimitedBufferBuilder, MemoryLimitedBuffer,
    MemoryLimitedBufferBuilder,
};
pub use chunk::{Partition, PartitionReader};
pub use line::{LineReader, LineWriter, ReadLine, TERMINATOR};
pub use merger::{merge, BinaryHeapMerger};
pub use sort::{ExternalSorter, ExternalSorterBuilder, SortError};
