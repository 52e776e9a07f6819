use std::fs;
use std::io;
use std::io::prelude::*;
use std::path::{Path, PathBuf};

use log;
use tempfile;

use crate::line::{LineReader, LineWriter};

/// Partition file reader.
pub type PartitionReader = LineReader<io::BufReader<fs::File>>;

/// A file-backed partition of newline-delimited records.
/// Provides methods for creating a partition, sorting it in place and streaming records from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    path: PathBuf,
}

impl Partition {
    /// Creates a handle to an existing partition file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Partition { path: path.into() }
    }

    /// Builds a new partition file in `dir` holding `records` in the given order.
    pub fn build(
        dir: &tempfile::TempDir,
        records: impl IntoIterator<Item = Vec<u8>>,
        buf_size: Option<usize>,
    ) -> io::Result<Self> {
        let (tmp_file, path) = tempfile::Builder::new()
            .prefix("partition-")
            .tempfile_in(dir)?
            .keep()
            .map_err(|err| err.error)?;

        let mut partition_writer = LineWriter::new(Self::buf_writer(tmp_file, buf_size));
        Self::dump(&mut partition_writer, records)?;
        partition_writer.flush()?;

        return Ok(Partition { path });
    }

    /// Returns the partition file path.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens a fresh record stream over the partition content.
    pub fn open(&self, buf_size: Option<usize>) -> io::Result<PartitionReader> {
        let file = fs::File::open(&self.path)?;

        return Ok(LineReader::new(match Self::capacity(buf_size) {
            Some(buf_size) => io::BufReader::with_capacity(buf_size, file),
            None => io::BufReader::new(file),
        }));
    }

    /// Sorts the partition in place.
    ///
    /// All records are loaded into memory, sorted in byte-wise lexicographic order and written
    /// back over the original content. Every record including the last one is terminated.
    /// On failure the partition content is undefined.
    ///
    /// Returns the number of records in the partition.
    pub fn sort(&self, buf_size: Option<usize>) -> io::Result<usize> {
        let mut records = {
            let reader = self.open(buf_size)?;
            reader.collect::<io::Result<Vec<Vec<u8>>>>()?
        };

        log::trace!("sorting {} records of {}", records.len(), self.path.display());
        records.sort_unstable();

        let file = fs::OpenOptions::new().write(true).truncate(true).open(&self.path)?;
        let mut partition_writer = LineWriter::new(Self::buf_writer(file, buf_size));

        let records_count = records.len();
        Self::dump(&mut partition_writer, records)?;
        partition_writer.flush()?;

        return Ok(records_count);
    }

    // a zero-capacity reader never yields data, so it falls back to the default size
    fn capacity(buf_size: Option<usize>) -> Option<usize> {
        buf_size.filter(|&buf_size| buf_size > 0)
    }

    fn buf_writer(file: fs::File, buf_size: Option<usize>) -> io::BufWriter<fs::File> {
        match Self::capacity(buf_size) {
            Some(buf_size) => io::BufWriter::with_capacity(buf_size, file),
            None => io::BufWriter::new(file),
        }
    }

    fn dump<W: Write>(
        partition_writer: &mut LineWriter<W>,
        records: impl IntoIterator<Item = Vec<u8>>,
    ) -> io::Result<()> {
        for record in records.into_iter() {
            partition_writer.write_line(&record)?;
        }

        return Ok(());
    }
}

#[cfg(test)]
mod test {
    use std::fs;
    use std::io::{self, Write};

    use rstest::*;

    use super::Partition;
    use crate::line::LineWriter;

    #[fixture]
    fn tmp_dir() -> tempfile::TempDir {
        tempfile::tempdir_in("./").unwrap()
    }

    fn read_records(partition: &Partition) -> Vec<Vec<u8>> {
        let records: io::Result<Vec<Vec<u8>>> = partition.open(None).unwrap().collect();
        records.unwrap()
    }

    #[rstest]
    fn test_build_partition(tmp_dir: tempfile::TempDir) {
        let saved = vec![b"b".to_vec(), vec![], b"a".to_vec()];

        let partition = Partition::build(&tmp_dir, saved.clone(), None).unwrap();

        assert!(partition.path().starts_with(tmp_dir.path()));
        assert_eq!(fs::read(partition.path()).unwrap(), b"b\n\na\n".to_vec());
        assert_eq!(read_records(&partition), saved);
    }

    #[rstest]
    #[case(&b""[..], &b""[..])]
    #[case(&b"banana\napple\n"[..], &b"apple\nbanana\n"[..])]
    #[case(&b"cherry\napple"[..], &b"apple\ncherry\n"[..])]
    #[case(&b"b\n\na\n"[..], &b"\na\nb\n"[..])]
    #[case(&b"\n"[..], &b"\n"[..])]
    #[case(&b"ab\na\nb\naa\n"[..], &b"a\naa\nab\nb\n"[..])]
    fn test_sort_partition(tmp_dir: tempfile::TempDir, #[case] content: &[u8], #[case] expected: &[u8]) {
        let path = tmp_dir.path().join("partition.txt");
        fs::write(&path, content).unwrap();

        let partition = Partition::new(&path);
        partition.sort(Some(4)).unwrap();
        assert_eq!(fs::read(&path).unwrap(), expected.to_vec());

        // sorting a sorted partition leaves it unchanged
        partition.sort(None).unwrap();
        assert_eq!(fs::read(&path).unwrap(), expected.to_vec());
    }

    #[rstest]
    fn test_sort_partition_count(tmp_dir: tempfile::TempDir) {
        let records = Vec::from_iter((0..100).rev().map(|i| format!("{:03}", i).into_bytes()));
        let partition = Partition::build(&tmp_dir, records.clone(), None).unwrap();

        assert_eq!(partition.sort(None).unwrap(), 100);

        let mut expected = records;
        expected.sort();
        assert_eq!(read_records(&partition), expected);
    }

    #[rstest]
    fn test_sort_zero_buf_size(tmp_dir: tempfile::TempDir) {
        let path = tmp_dir.path().join("partition.txt");
        fs::write(&path, b"banana\napple\n").unwrap();

        let partition = Partition::new(&path);
        assert_eq!(partition.sort(Some(0)).unwrap(), 2);
        assert_eq!(fs::read(&path).unwrap(), b"apple\nbanana\n".to_vec());
    }

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "test error"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_dump_write_error() {
        let mut partition_writer = LineWriter::new(FailingWriter);

        let result = Partition::dump(&mut partition_writer, vec![b"a".to_vec(), b"b".to_vec()]);
        assert_eq!(result.unwrap_err().to_string(), "test error");
    }

    #[rstest]
    fn test_sort_missing_partition(tmp_dir: tempfile::TempDir) {
        let partition = Partition::new(tmp_dir.path().join("missing.txt"));

        let err = partition.sort(None).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }
}
