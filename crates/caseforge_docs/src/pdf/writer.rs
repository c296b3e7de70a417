//! Incremental PDF 1.4 writer.
//!
//! [`PdfWriter`] emits the file one chunk per object into a [`ChunkSink`] and
//! keeps the byte offsets needed for the cross-reference table.
//! [`BufferedSink`] turns that stream of chunks back into a single result.

use std::io;

use tracing::debug;

use crate::error::ExportError;

/// Receives the output of a [`PdfWriter`] as it is produced.
pub trait ChunkSink {
    /// Accept the next chunk. An error aborts the document.
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()>;

    /// Terminal signal, sent exactly once after the last chunk or on failure.
    fn finish(&mut self, outcome: Result<(), ExportError>);
}

/// Accumulates every chunk and resolves once with the whole document.
///
/// Partial output is never handed out: a failure, or a writer that stops
/// without signalling completion, discards the buffer.
#[derive(Debug, Default)]
pub struct BufferedSink {
    buffer: Vec<u8>,
    outcome: Option<Result<(), ExportError>>,
}

impl BufferedSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.outcome.is_some()
    }

    /// The complete document, or the failure that ended it.
    pub fn into_bytes(self) -> Result<Vec<u8>, ExportError> {
        match self.outcome {
            Some(Ok(())) => Ok(self.buffer),
            Some(Err(err)) => Err(err),
            None => Err(ExportError::Rendering(
                "document writer stopped without signalling completion".into(),
            )),
        }
    }
}

impl ChunkSink for BufferedSink {
    fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
        if self.outcome.is_some() {
            return Err(io::Error::other("chunk received after completion"));
        }
        self.buffer.extend_from_slice(chunk);
        Ok(())
    }

    fn finish(&mut self, outcome: Result<(), ExportError>) {
        if self.outcome.is_some() {
            debug!("ignoring repeated completion signal");
            return;
        }
        self.outcome = Some(outcome);
    }
}

/// Writes numbered objects in order, then the xref table and trailer.
pub struct PdfWriter<'a, S: ChunkSink> {
    sink: &'a mut S,
    offset: usize,
    /// Byte offset of object `n` at index `n - 1`.
    offsets: Vec<usize>,
}

impl<'a, S: ChunkSink> PdfWriter<'a, S> {
    pub fn new(sink: &'a mut S) -> Self {
        Self {
            sink,
            offset: 0,
            offsets: Vec::new(),
        }
    }

    fn emit(&mut self, chunk: &[u8]) -> io::Result<()> {
        self.sink.write_chunk(chunk)?;
        self.offset += chunk.len();
        Ok(())
    }

    /// Version line plus a binary comment marking the file as 8-bit.
    pub fn write_header(&mut self) -> io::Result<()> {
        self.emit(b"%PDF-1.4\n%\xE2\xE3\xCF\xD3\n")
    }

    fn begin_object(&mut self, id: usize) -> io::Result<()> {
        let expected = self.offsets.len() + 1;
        if id != expected {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("object {id} written out of order, expected {expected}"),
            ));
        }
        self.offsets.push(self.offset);
        Ok(())
    }

    /// Write `id 0 obj <dictionary> endobj`.
    pub fn write_object(&mut self, id: usize, dictionary: &str) -> io::Result<()> {
        self.begin_object(id)?;
        let chunk = format!("{id} 0 obj\n{dictionary}\nendobj\n");
        self.emit(chunk.as_bytes())
    }

    /// Write an uncompressed stream object.
    pub fn write_stream(&mut self, id: usize, data: &[u8]) -> io::Result<()> {
        self.begin_object(id)?;
        let mut chunk = format!("{id} 0 obj\n<< /Length {} >>\nstream\n", data.len()).into_bytes();
        chunk.extend_from_slice(data);
        chunk.extend_from_slice(b"\nendstream\nendobj\n");
        self.emit(&chunk)
    }

    /// Write the cross-reference table and trailer.
    pub fn finish(mut self, root: usize, info: usize) -> io::Result<()> {
        let xref_offset = self.offset;
        let size = self.offsets.len() + 1;

        let mut xref = format!("xref\n0 {size}\n0000000000 65535 f \n");
        for offset in &self.offsets {
            xref.push_str(&format!("{offset:010} 00000 n \n"));
        }
        xref.push_str(&format!(
            "trailer\n<< /Size {size} /Root {root} 0 R /Info {info} 0 R >>\n"
        ));
        xref.push_str(&format!("startxref\n{xref_offset}\n%%EOF\n"));
        self.emit(xref.as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Records chunks and fails once `fail_after` chunks have been accepted.
    struct FlakySink {
        chunks: Vec<Vec<u8>>,
        fail_after: usize,
    }

    impl ChunkSink for FlakySink {
        fn write_chunk(&mut self, chunk: &[u8]) -> io::Result<()> {
            if self.chunks.len() >= self.fail_after {
                return Err(io::Error::new(io::ErrorKind::BrokenPipe, "sink closed"));
            }
            self.chunks.push(chunk.to_vec());
            Ok(())
        }

        fn finish(&mut self, _outcome: Result<(), ExportError>) {}
    }

    #[test]
    fn test_buffered_sink_concatenates_chunks() {
        let mut sink = BufferedSink::new();
        sink.write_chunk(b"abc").unwrap();
        sink.write_chunk(b"def").unwrap();
        assert!(!sink.is_finished());
        sink.finish(Ok(()));
        assert_eq!(sink.into_bytes().unwrap(), b"abcdef");
    }

    #[test]
    fn test_buffered_sink_failure_discards_partial_output() {
        let mut sink = BufferedSink::new();
        sink.write_chunk(b"partial").unwrap();
        sink.finish(Err(ExportError::Rendering("boom".into())));
        let err = sink.into_bytes().unwrap_err();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn test_buffered_sink_requires_completion() {
        let mut sink = BufferedSink::new();
        sink.write_chunk(b"never finished").unwrap();
        assert!(sink.into_bytes().is_err());
    }

    #[test]
    fn test_buffered_sink_first_completion_wins() {
        let mut sink = BufferedSink::new();
        sink.finish(Err(ExportError::Rendering("first".into())));
        sink.finish(Ok(()));
        assert!(sink.into_bytes().is_err());
    }

    #[test]
    fn test_buffered_sink_rejects_late_chunks() {
        let mut sink = BufferedSink::new();
        sink.finish(Ok(()));
        assert!(sink.write_chunk(b"late").is_err());
    }

    #[test]
    fn test_writer_offsets_and_trailer() {
        let mut sink = BufferedSink::new();
        let mut writer = PdfWriter::new(&mut sink);
        writer.write_header().unwrap();
        writer.write_object(1, "<< /Type /Catalog /Pages 2 0 R >>").unwrap();
        writer.write_stream(2, b"BT ET").unwrap();
        writer.finish(1, 1).unwrap();
        sink.finish(Ok(()));

        let bytes = sink.into_bytes().unwrap();
        let text = String::from_utf8_lossy(&bytes);
        assert!(bytes.starts_with(b"%PDF-1.4"));
        assert!(text.ends_with("%%EOF\n"));
        assert!(text.contains("<< /Length 5 >>\nstream\nBT ET\nendstream"));
        assert!(text.contains("/Size 3 /Root 1 0 R"));

        // The xref entry for object 1 points at its "1 0 obj" line.
        let obj1 = text.find("1 0 obj").unwrap();
        assert!(text.contains(&format!("{obj1:010} 00000 n ")));
        let xref = text.find("xref\n").unwrap();
        assert!(text.contains(&format!("startxref\n{xref}\n")));
    }

    #[test]
    fn test_writer_rejects_out_of_order_objects() {
        let mut sink = BufferedSink::new();
        let mut writer = PdfWriter::new(&mut sink);
        assert!(writer.write_object(2, "<< >>").is_err());
    }

    #[test]
    fn test_writer_stops_on_sink_error() {
        let mut sink = FlakySink {
            chunks: Vec::new(),
            fail_after: 1,
        };
        let mut writer = PdfWriter::new(&mut sink);
        writer.write_header().unwrap();
        let err = writer.write_object(1, "<< >>").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert_eq!(sink.chunks.len(), 1);
    }
}
