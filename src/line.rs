//! Newline-delimited record streams.

use std::io;
use std::io::prelude::*;

/// Record terminator byte.
pub const TERMINATOR: u8 = b'\n';

/// Result of a single [`LineReader::read_line`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReadLine {
    /// A terminated record. More data may follow.
    Line(Vec<u8>),
    /// The input ended right after a non-empty record that had no terminator.
    LastLine(Vec<u8>),
    /// The input is exhausted and no bytes are pending.
    End,
}

impl ReadLine {
    /// Returns the record if the read produced one.
    pub fn into_record(self) -> Option<Vec<u8>> {
        match self {
            ReadLine::Line(record) | ReadLine::LastLine(record) => Some(record),
            ReadLine::End => None,
        }
    }
}

/// Reads terminator-delimited records from a buffered source.
///
/// A trailing terminator is not required: the last unterminated fragment is returned
/// as [`ReadLine::LastLine`]. An empty line is a valid record and is never confused with
/// the end of input.
pub struct LineReader<R> {
    reader: R,
    failed: bool,
}

impl<R: BufRead> LineReader<R> {
    /// Creates a line reader on top of a buffered source.
    pub fn new(reader: R) -> Self {
        LineReader { reader, failed: false }
    }

    /// Reads the next record.
    pub fn read_line(&mut self) -> io::Result<ReadLine> {
        let mut record = Vec::new();
        let read = self.reader.read_until(TERMINATOR, &mut record)?;

        if read == 0 {
            return Ok(ReadLine::End);
        }

        if record.last() == Some(&TERMINATOR) {
            record.pop();
            return Ok(ReadLine::Line(record));
        }

        return Ok(ReadLine::LastLine(record));
    }

}

impl<R: BufRead> Iterator for LineReader<R> {
    type Item = io::Result<Vec<u8>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        match self.read_line() {
            Ok(line) => line.into_record().map(Ok),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

/// Writes records to a sink, terminating each one.
pub struct LineWriter<W: Write> {
    writer: W,
}

impl<W: Write> LineWriter<W> {
    /// Creates a line writer on top of a sink.
    pub fn new(writer: W) -> Self {
        LineWriter { writer }
    }

    /// Writes the record followed by exactly one terminator.
    pub fn write_line(&mut self, record: &[u8]) -> io::Result<()> {
        self.writer.write_all(record)?;
        self.writer.write_all(&[TERMINATOR])?;

        return Ok(());
    }

    /// Flushes the underlying sink.
    pub fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    /// Unwraps this line writer, returning the underlying sink without flushing it.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

#[cfg(test)]
mod test {
    use std::io::{self, BufReader, ErrorKind, Read};

    use rstest::*;

    use super::{LineReader, LineWriter, ReadLine};

    #[rstest]
    #[case(&b""[..], vec![ReadLine::End])]
    #[case(&b"a\nb\n"[..], vec![ReadLine::Line(b"a".to_vec()), ReadLine::Line(b"b".to_vec()), ReadLine::End])]
    #[case(&b"a\nb"[..], vec![ReadLine::Line(b"a".to_vec()), ReadLine::LastLine(b"b".to_vec()), ReadLine::End])]
    #[case(&b"\n"[..], vec![ReadLine::Line(vec![]), ReadLine::End])]
    #[case(
        &b"\nx\n\n"[..],
        vec![ReadLine::Line(vec![]), ReadLine::Line(b"x".to_vec()), ReadLine::Line(vec![]), ReadLine::End],
    )]
    fn test_read_line(#[case] input: &[u8], #[case] expected: Vec<ReadLine>) {
        let mut reader = LineReader::new(input);

        for expected_line in expected {
            assert_eq!(reader.read_line().unwrap(), expected_line);
        }
        // end of input is sticky
        assert_eq!(reader.read_line().unwrap(), ReadLine::End);
    }

    #[test]
    fn test_small_buffer_long_line() {
        let input = b"0123456789abcdef\nxyz".to_vec();
        let reader = LineReader::new(BufReader::with_capacity(3, input.as_slice()));

        let records: io::Result<Vec<Vec<u8>>> = reader.collect();
        assert_eq!(records.unwrap(), vec![b"0123456789abcdef".to_vec(), b"xyz".to_vec()]);
    }

    struct FailingReader;

    impl Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(ErrorKind::Other, "test error"))
        }
    }

    #[test]
    fn test_read_error() {
        let mut reader = LineReader::new(BufReader::new(FailingReader));
        assert!(reader.read_line().is_err());

        let mut reader = LineReader::new(BufReader::new(FailingReader));
        assert!(matches!(reader.next(), Some(Err(_))));
        assert!(reader.next().is_none());
    }

    #[test]
    fn test_write_line() {
        let mut writer = LineWriter::new(Vec::new());
        writer.write_line(b"b").unwrap();
        writer.write_line(b"").unwrap();
        writer.write_line(b"a").unwrap();
        writer.flush().unwrap();

        assert_eq!(writer.into_inner(), b"b\n\na\n".to_vec());
    }

    #[test]
    fn test_written_lines_read_back() {
        let records = vec![b"x".to_vec(), vec![], b"y z".to_vec()];

        let mut writer = LineWriter::new(Vec::new());
        for record in &records {
            writer.write_line(record).unwrap();
        }
        let written = writer.into_inner();

        let reader = LineReader::new(written.as_slice());
        let restored: io::Result<Vec<Vec<u8>>> = reader.collect();
        assert_eq!(restored.unwrap(), records);
    }
}
