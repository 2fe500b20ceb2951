//! Byte sources the navigator can walk.
//!
//! A [`BoxStream`] is a `Read` that also knows its absolute position and can
//! move forward without handing bytes back to the caller.

use crate::diag::{Diagnostic, DiagnosticSink};
use std::io::{self, BufRead, Read, Seek, SeekFrom};

const TRACE_CHUNK: usize = 4096;

pub trait BoxStream: Read {
    /// Absolute offset of the next byte `read` will return.
    fn position(&self) -> u64;

    /// Total length, if the source knows it.
    fn len(&self) -> Option<u64>;

    /// True when no more bytes can be read.
    fn at_end(&mut self) -> io::Result<bool>;

    /// Advance `n` bytes. Fails with `UnexpectedEof` if the source ends first.
    fn skip_forward(&mut self, n: u64) -> io::Result<()>;

    /// Like [`skip_forward`](Self::skip_forward), but reads the bytes and hands
    /// them to `sink` in chunks.
    fn skip_forward_with_trace(&mut self, n: u64, sink: &mut dyn DiagnosticSink) -> io::Result<()> {
        let mut buf = vec![0u8; TRACE_CHUNK.min(n as usize)];
        let mut left = n;
        while left > 0 {
            let want = left.min(buf.len() as u64) as usize;
            let offset = self.position();
            self.read_exact(&mut buf[..want])?;
            sink.record(&Diagnostic::Skipped { offset, bytes: &buf[..want] });
            left -= want as u64;
        }
        Ok(())
    }
}

/// Seekable source. Forward skips are seeks, bounded by the length measured
/// at construction.
#[derive(Debug)]
pub struct SeekStream<R> {
    inner: R,
    pos: u64,
    len: u64,
}

impl<R: Read + Seek> SeekStream<R> {
    pub fn new(mut inner: R) -> io::Result<Self> {
        let pos = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(pos))?;
        Ok(Self { inner, pos, len })
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }
}

impl<R: Read> Read for SeekStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: Read + Seek> BoxStream for SeekStream<R> {
    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> Option<u64> {
        Some(self.len)
    }

    fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.pos >= self.len)
    }

    fn skip_forward(&mut self, n: u64) -> io::Result<()> {
        let target = self
            .pos
            .checked_add(n)
            .filter(|&t| t <= self.len)
            .ok_or_else(|| io::Error::new(io::ErrorKind::UnexpectedEof, "skip past end of stream"))?;
        self.inner.seek(SeekFrom::Start(target))?;
        self.pos = target;
        Ok(())
    }
}

/// Sequential source (pipes, sockets). Skips read and discard.
#[derive(Debug)]
pub struct ReadStream<R> {
    inner: R,
    pos: u64,
}

impl<R: BufRead> ReadStream<R> {
    pub fn new(inner: R) -> Self {
        Self { inner, pos: 0 }
    }
}

impl<R: BufRead> Read for ReadStream<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.inner.read(buf)?;
        self.pos += n as u64;
        Ok(n)
    }
}

impl<R: BufRead> BoxStream for ReadStream<R> {
    fn position(&self) -> u64 {
        self.pos
    }

    fn len(&self) -> Option<u64> {
        None
    }

    fn at_end(&mut self) -> io::Result<bool> {
        Ok(self.inner.fill_buf()?.is_empty())
    }

    fn skip_forward(&mut self, n: u64) -> io::Result<()> {
        let copied = io::copy(&mut (&mut self.inner).take(n), &mut io::sink())?;
        self.pos += copied;
        if copied < n {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                format!("stream ended {} bytes into a {} byte skip", copied, n),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::MemorySink;
    use std::io::Cursor;

    #[test]
    fn seek_stream_tracks_reads_and_skips() {
        let mut s = SeekStream::new(Cursor::new(vec![0u8; 32])).unwrap();
        let mut buf = [0u8; 5];
        s.read_exact(&mut buf).unwrap();
        assert_eq!(s.position(), 5);
        s.skip_forward(20).unwrap();
        assert_eq!(s.position(), 25);
        assert_eq!(s.get_ref().position(), 25);
        assert!(!s.at_end().unwrap());
        s.skip_forward(7).unwrap();
        assert!(s.at_end().unwrap());
    }

    #[test]
    fn seek_stream_starts_from_current_offset() {
        let mut c = Cursor::new(vec![0u8; 16]);
        c.set_position(4);
        let s = SeekStream::new(c).unwrap();
        assert_eq!(s.position(), 4);
        assert_eq!(s.len(), Some(16));
    }

    #[test]
    fn seek_stream_refuses_skip_past_end() {
        let mut s = SeekStream::new(Cursor::new(vec![0u8; 8])).unwrap();
        let err = s.skip_forward(9).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn read_stream_discards_on_skip() {
        let data: Vec<u8> = (0u8..10).collect();
        let mut s = ReadStream::new(Cursor::new(data));
        s.skip_forward(4).unwrap();
        let mut b = [0u8; 1];
        s.read_exact(&mut b).unwrap();
        assert_eq!(b[0], 4);
        assert_eq!(s.position(), 5);
        assert_eq!(s.len(), None);
    }

    #[test]
    fn read_stream_short_skip_is_eof() {
        let mut s = ReadStream::new(Cursor::new(vec![0u8; 3]));
        let err = s.skip_forward(10).unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
        assert_eq!(s.position(), 3);
        assert!(s.at_end().unwrap());
    }

    #[test]
    fn traced_skip_surfaces_every_byte() {
        let data: Vec<u8> = (0u8..=255).cycle().take(5000).collect();
        let mut s = SeekStream::new(Cursor::new(data)).unwrap();
        let mut sink = MemorySink::new();
        s.skip_forward_with_trace(4100, &mut sink).unwrap();
        assert_eq!(s.position(), 4100);
        assert_eq!(sink.lines.len(), 2);
        assert!(sink.lines[0].starts_with("skipped 4096 bytes at 0x0"));
        assert!(sink.lines[1].starts_with("skipped 4 bytes at 0x1000"));
    }
}
