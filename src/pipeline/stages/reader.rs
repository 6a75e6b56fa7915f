use crate::config::PipelineConfig;
use crate::error::ConduitResult;
use crate::pipeline::{FeedWriter, Source};
use std::io::{ErrorKind, Read};

/// Source that feeds raw byte chunks read from any [`Read`] into the chain
///
/// Chunks are at most `chunk_size` bytes long and carry no boundary
/// guarantees; put a [`Utf8Normalizer`](super::Utf8Normalizer) behind it for text.
pub struct ByteReader<R> {
    reader: R,
    chunk_size: usize,
}

impl<R: Read + Send> ByteReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            chunk_size: PipelineConfig::default().read_chunk_size,
        }
    }

    /// Set the maximum chunk size; values below 1 are raised to 1
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }
}

impl<R: Read + Send> Source<Vec<u8>> for ByteReader<R> {
    fn produce(&mut self, output: &FeedWriter<Vec<u8>>) -> ConduitResult<()> {
        let mut buf = vec![0u8; self.chunk_size];
        loop {
            let n = match self.reader.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => return Err(e.into()),
            };
            output.emit(buf[..n].to_vec())?;
        }
        tracing::debug!("Reader exhausted after {} chunk(s)", output.emitted());
        Ok(())
    }

    fn name(&self) -> &str {
        "byte-reader"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConduitError;
    use crate::pipeline::feed;
    use std::fs::File;
    use std::io::{self, Cursor, Write};
    use tempfile::TempDir;

    // Reader that is interrupted once and then fails
    struct FlakyReader {
        calls: usize,
    }

    impl Read for FlakyReader {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            self.calls += 1;
            match self.calls {
                1 => Err(io::Error::new(ErrorKind::Interrupted, "signal")),
                2 => {
                    buf[0] = b'x';
                    Ok(1)
                }
                _ => Err(io::Error::new(ErrorKind::BrokenPipe, "gone")),
            }
        }
    }

    #[test]
    fn test_reader_chunks_input() {
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        let (writer, reader) = feed::bounded(64).unwrap();

        let mut source = ByteReader::new(Cursor::new(data.clone())).with_chunk_size(300);
        source.produce(&writer).unwrap();
        drop(writer);

        let chunks: Vec<Vec<u8>> = reader.iter().collect();
        assert_eq!(chunks.len(), 4);
        assert!(chunks.iter().all(|c| c.len() <= 300));
        assert_eq!(chunks.concat(), data);
    }

    #[test]
    fn test_reader_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("input.txt");
        let mut file = File::create(&path).unwrap();
        file.write_all("line one\nline two\n".as_bytes()).unwrap();
        file.flush().unwrap();

        let (writer, reader) = feed::bounded(8).unwrap();
        let mut source = ByteReader::new(File::open(&path).unwrap());
        assert_eq!(source.chunk_size(), 8192);
        source.produce(&writer).unwrap();
        drop(writer);

        let chunks: Vec<Vec<u8>> = reader.iter().collect();
        assert_eq!(chunks.concat(), b"line one\nline two\n");
    }

    #[test]
    fn test_reader_retries_interrupted_and_reports_io_error() {
        let (writer, reader) = feed::bounded(8).unwrap();
        let mut source = ByteReader::new(FlakyReader { calls: 0 });
        let result = source.produce(&writer);
        drop(writer);

        assert!(matches!(result, Err(ConduitError::Io(_))));
        assert_eq!(reader.iter().collect::<Vec<_>>(), vec![b"x".to_vec()]);
    }

    #[test]
    fn test_zero_chunk_size_is_raised() {
        let source = ByteReader::new(Cursor::new(Vec::new())).with_chunk_size(0);
        assert_eq!(source.chunk_size(), 1);
    }
}
