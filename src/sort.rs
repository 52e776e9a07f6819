//! External sorter.

use log;
use std::cell::OnceCell;
use std::error::Error;
use std::fmt;
use std::fmt::Display;
use std::io;
use std::io::prelude::*;
use std::path::Path;

use crate::chunk::Partition;
use crate::line::{LineReader, LineWriter};
use crate::merger;
use crate::{ChunkBuffer, ChunkBufferBuilder, LimitedBufferBuilder};

/// Sorting error.
#[derive(Debug)]
pub enum SortError {
    /// Temporary directory creation error.
    TempDir(io::Error),
    /// Partition or output stream open/read/write error.
    IO(io::Error),
}

impl Error for SortError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        Some(match &self {
            SortError::TempDir(err) => err,
            SortError::IO(err) => err,
        })
    }
}

impl Display for SortError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self {
            SortError::TempDir(err) => write!(f, "temporary directory not created: {}", err),
            SortError::IO(err) => write!(f, "I/O operation failed: {}", err),
        }
    }
}

/// External sorter builder. Provides methods for [`ExternalSorter`] initialization.
#[derive(Clone)]
pub struct ExternalSorterBuilder<B = LimitedBufferBuilder>
where
    B: ChunkBufferBuilder,
{
    /// Directory to be used to store partitions created by splitting an input.
    tmp_dir: Option<Box<Path>>,
    /// Partition file read/write buffer size.
    rw_buf_size: Option<usize>,
    /// Chunk buffer builder.
    buffer_builder: B,
}

impl<B> ExternalSorterBuilder<B>
where
    B: ChunkBufferBuilder,
{
    /// Creates an instance of a builder with default parameters.
    pub fn new() -> Self {
        ExternalSorterBuilder::default()
    }

    /// Builds an [`ExternalSorter`] instance using provided configuration.
    pub fn build(self) -> Result<ExternalSorter<B>, SortError> {
        ExternalSorter::new(self.tmp_dir.as_deref(), self.buffer_builder, self.rw_buf_size)
    }

    /// Sets directory to be used to store temporary partitions.
    pub fn with_tmp_dir(mut self, path: &Path) -> ExternalSorterBuilder<B> {
        self.tmp_dir = Some(path.into());
        return self;
    }

    /// Sets buffer builder bounding the size of partitions created by splitting.
    pub fn with_buffer(mut self, buffer_builder: B) -> ExternalSorterBuilder<B> {
        self.buffer_builder = buffer_builder;
        return self;
    }

    /// Sets partition read/write buffer size. Zero keeps the default size.
    pub fn with_rw_buf_size(mut self, buf_size: usize) -> ExternalSorterBuilder<B> {
        self.rw_buf_size = Some(buf_size);
        return self;
    }
}

impl<B> Default for ExternalSorterBuilder<B>
where
    B: ChunkBufferBuilder,
{
    fn default() -> Self {
        ExternalSorterBuilder {
            tmp_dir: None,
            rw_buf_size: None,
            buffer_builder: B::default(),
        }
    }
}

/// External sorter.
///
/// Sorting runs in two strictly ordered phases: every partition is sorted in place first,
/// then all of them are reopened and merged into the output. No partition is modified while
/// it is being read by the merge phase.
pub struct ExternalSorter<B = LimitedBufferBuilder>
where
    B: ChunkBufferBuilder,
{
    /// Parent of the temporary directory. [`None`] means the OS temporary directory.
    tmp_path: Option<Box<Path>>,
    /// Directory holding partitions created by splitting an input, created on first split.
    tmp_dir: OnceCell<tempfile::TempDir>,
    /// Chunk buffer builder.
    buffer_builder: B,
    /// Partition file read/write buffer size.
    rw_buf_size: Option<usize>,
}

impl<B> ExternalSorter<B>
where
    B: ChunkBufferBuilder,
{
    /// Creates a new external sorter instance.
    ///
    /// # Arguments
    /// * `tmp_path` - Directory to be used to store temporary partitions. If paramater is [`None`] default OS
    ///   temporary directory will be used. The directory is only created once an input is split.
    /// * `buffer_builder` - An instance of a buffer builder that will be used to bound split partitions.
    /// * `rw_buf_size` - Partition files read/write buffer size. [`None`] or zero selects the default size.
    pub fn new(tmp_path: Option<&Path>, buffer_builder: B, rw_buf_size: Option<usize>) -> Result<Self, SortError> {
        return Ok(ExternalSorter {
            rw_buf_size: rw_buf_size.filter(|&buf_size| buf_size > 0),
            buffer_builder,
            tmp_path: tmp_path.map(Box::from),
            tmp_dir: OnceCell::new(),
        });
    }

    fn tmp_directory(&self) -> Result<&tempfile::TempDir, SortError> {
        if let Some(tmp_dir) = self.tmp_dir.get() {
            return Ok(tmp_dir);
        }

        let tmp_dir = Self::init_tmp_directory(self.tmp_path.as_deref())?;

        return Ok(self.tmp_dir.get_or_init(|| tmp_dir));
    }

    fn init_tmp_directory(tmp_path: Option<&Path>) -> Result<tempfile::TempDir, SortError> {
        let tmp_dir = if let Some(tmp_path) = tmp_path {
            tempfile::tempdir_in(tmp_path)
        } else {
            tempfile::tempdir()
        }
        .map_err(|err| SortError::TempDir(err))?;

        log::info!("using {} as a temporary directory", tmp_dir.path().display());

        return Ok(tmp_dir);
    }

    /// Sorts the partitions in place and merges them into `output`.
    /// Returns the number of records written.
    ///
    /// Partitions are processed in order and the first failure aborts the operation.
    /// Partitions sorted before the failure stay sorted.
    ///
    /// # Arguments
    /// * `partitions` - Partitions to be sorted
    /// * `output` - Sink the sorted records are written to
    pub fn sort<W: Write>(&self, partitions: &[Partition], output: W) -> Result<u64, SortError> {
        log::info!("sorting {} partitions", partitions.len());

        for partition in partitions {
            let records_count = partition.sort(self.rw_buf_size).map_err(|err| SortError::IO(err))?;
            log::debug!("partition {} sorted ({} records)", partition.path().display(), records_count);
        }

        let readers = partitions
            .iter()
            .map(|partition| partition.open(self.rw_buf_size))
            .collect::<io::Result<Vec<_>>>()
            .map_err(|err| SortError::IO(err))?;

        let output = match self.rw_buf_size {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, output),
            None => io::BufWriter::new(output),
        };
        let mut output_writer = LineWriter::new(output);

        let records_count = merger::merge(&mut output_writer, readers).map_err(|err| SortError::IO(err))?;
        output_writer.flush().map_err(|err| SortError::IO(err))?;

        log::debug!("merge done ({} records)", records_count);

        return Ok(records_count);
    }

    /// Sorts partition files given by their paths and merges them into `output`.
    pub fn sort_paths<P, W>(&self, paths: &[P], output: W) -> Result<u64, SortError>
    where
        P: AsRef<Path>,
        W: Write,
    {
        let partitions = Vec::from_iter(paths.iter().map(|path| Partition::new(path.as_ref())));
        self.sort(&partitions, output)
    }

    /// Splits the input into unsorted partitions stored in the temporary directory.
    /// Partitions size is bounded by the configured buffer. Empty input produces no partitions.
    ///
    /// # Arguments
    /// * `input` - Input stream records to be fetched from
    pub fn split<R: BufRead>(&self, input: R) -> Result<Vec<Partition>, SortError> {
        let mut chunk_buf = self.buffer_builder.build();
        let mut partitions = Vec::new();

        for record in LineReader::new(input) {
            chunk_buf.push(record.map_err(|err| SortError::IO(err))?);

            if chunk_buf.is_full() {
                partitions.push(self.create_partition(chunk_buf)?);
                chunk_buf = self.buffer_builder.build();
            }
        }

        if chunk_buf.len() > 0 {
            partitions.push(self.create_partition(chunk_buf)?);
        }

        log::debug!("input split into {} partitions", partitions.len());

        return Ok(partitions);
    }

    /// Splits the input into partitions, sorts them and merges them into `output`.
    /// Returns the number of records written.
    pub fn sort_reader<R, W>(&self, input: R, output: W) -> Result<u64, SortError>
    where
        R: BufRead,
        W: Write,
    {
        let partitions = self.split(input)?;
        self.sort(&partitions, output)
    }

    fn create_partition(&self, buffer: impl ChunkBuffer) -> Result<Partition, SortError> {
        log::debug!("saving partition data ({} records)", buffer.len());
        let partition =
            Partition::build(self.tmp_directory()?, buffer, self.rw_buf_size).map_err(|err| SortError::IO(err))?;

        return Ok(partition);
    }
}
