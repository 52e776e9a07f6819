//! Limited record buffer implementations.

/// Buffer builder.
pub trait ChunkBufferBuilder: Default {
    type Buffer: ChunkBuffer;

    /// Creates a new buffer.
    fn build(&self) -> Self::Buffer;
}

/// Base limited buffer interface.
pub trait ChunkBuffer: IntoIterator<Item = Vec<u8>> {
    /// Adds a new record to the buffer.
    fn push(&mut self, record: Vec<u8>);

    /// Returns buffer length
    fn len(&self) -> usize;

    /// Checks if the buffer reached the limit.
    fn is_full(&self) -> bool;
}

pub struct LimitedBufferBuilder {
    buffer_limit: usize,
    preallocate: bool,
}

impl LimitedBufferBuilder {
    pub fn new(buffer_limit: usize, preallocate: bool) -> Self {
        LimitedBufferBuilder {
            buffer_limit,
            preallocate,
        }
    }
}

impl ChunkBufferBuilder for LimitedBufferBuilder {
    type Buffer = LimitedBuffer;

    fn build(&self) -> Self::Buffer {
        if self.preallocate {
            LimitedBuffer::with_capacity(self.buffer_limit)
        } else {
            LimitedBuffer::new(self.buffer_limit)
        }
    }
}

impl Default for LimitedBufferBuilder {
    fn default() -> Self {
        LimitedBufferBuilder {
            buffer_limit: usize::MAX,
            preallocate: false,
        }
    }
}

/// Buffer limited by records count.
pub struct LimitedBuffer {
    limit: usize,
    inner: Vec<Vec<u8>>,
}

impl LimitedBuffer {
    pub fn new(limit: usize) -> Self {
        LimitedBuffer {
            limit,
            inner: Vec::new(),
        }
    }

    pub fn with_capacity(limit: usize) -> Self {
        LimitedBuffer {
            limit,
            inner: Vec::with_capacity(limit),
        }
    }
}

impl ChunkBuffer for LimitedBuffer {
    fn push(&mut self, record: Vec<u8>) {
        self.inner.push(record);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_full(&self) -> bool {
        self.inner.len() >= self.limit
    }
}

impl IntoIterator for LimitedBuffer {
    type Item = Vec<u8>;
    type IntoIter = <Vec<Vec<u8>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

pub struct MemoryLimitedBufferBuilder {
    buffer_limit: u64,
}

impl MemoryLimitedBufferBuilder {
    pub fn new(buffer_limit: u64) -> Self {
        MemoryLimitedBufferBuilder { buffer_limit }
    }
}

impl ChunkBufferBuilder for MemoryLimitedBufferBuilder {
    type Buffer = MemoryLimitedBuffer;

    fn build(&self) -> Self::Buffer {
        MemoryLimitedBuffer::new(self.buffer_limit)
    }
}

impl Default for MemoryLimitedBufferBuilder {
    fn default() -> Self {
        MemoryLimitedBufferBuilder { buffer_limit: u64::MAX }
    }
}

/// Buffer limited by the partition file size its records occupy.
/// Each record is accounted as its length plus one terminator byte.
pub struct MemoryLimitedBuffer {
    limit: u64,
    current_size: u64,
    inner: Vec<Vec<u8>>,
}

impl MemoryLimitedBuffer {
    pub fn new(limit: u64) -> Self {
        MemoryLimitedBuffer {
            limit,
            current_size: 0,
            inner: Vec::new(),
        }
    }

    pub fn mem_size(&self) -> u64 {
        self.current_size
    }
}

impl ChunkBuffer for MemoryLimitedBuffer {
    fn push(&mut self, record: Vec<u8>) {
        self.current_size += record.len() as u64 + 1;
        self.inner.push(record);
    }

    fn len(&self) -> usize {
        self.inner.len()
    }

    fn is_full(&self) -> bool {
        self.current_size >= self.limit
    }
}

impl IntoIterator for MemoryLimitedBuffer {
    type Item = Vec<u8>;
    type IntoIter = <Vec<Vec<u8>> as IntoIterator>::IntoIter;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.into_iter()
    }
}

#[cfg(test)]
mod test {
    use super::{ChunkBuffer, ChunkBufferBuilder, LimitedBufferBuilder, MemoryLimitedBufferBuilder};

    #[test]
    fn test_limited_buffer() {
        let builder = LimitedBufferBuilder::new(2, true);
        let mut buffer = builder.build();

        buffer.push(b"b".to_vec());
        assert_eq!(buffer.is_full(), false);
        buffer.push(b"a".to_vec());
        assert_eq!(buffer.is_full(), true);

        let data = Vec::from_iter(buffer);
        assert_eq!(data, vec![b"b".to_vec(), b"a".to_vec()]);
    }

    #[test]
    fn test_memory_limited_buffer() {
        let builder = MemoryLimitedBufferBuilder::new(12);
        let mut buffer = builder.build();

        buffer.push(b"hello".to_vec());
        assert_eq!(buffer.mem_size(), 6);
        assert_eq!(buffer.is_full(), false);

        // empty records still take a terminator
        buffer.push(vec![]);
        assert_eq!(buffer.mem_size(), 7);
        assert_eq!(buffer.is_full(), false);

        buffer.push(b"world".to_vec());
        assert_eq!(buffer.mem_size(), 13);
        assert_eq!(buffer.is_full(), true);
        assert_eq!(buffer.len(), 3);

        let actual_data = Vec::from_iter(buffer);
        assert_eq!(actual_data, vec![b"hello".to_vec(), vec![], b"world".to_vec()]);
    }
}
