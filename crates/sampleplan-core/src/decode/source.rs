//! Peekable, re-readable byte source over any [`Read`].
//!
//! Decode planning needs three things from an input stream: a peek at the
//! leading bytes that does not consume them, a way to read the data twice
//! (bounds pass, then pixel pass) without buffering more than the bounds pass
//! actually touched, and full materialisation for the buffered strategies.
//!
//! Everything read through [`ByteSource::peek`] or a [`PeekReader`] stays in
//! the internal buffer and is replayed by the consuming [`Read`]/[`BufRead`]
//! impls.

use std::io::{self, BufRead, Read};

const CHUNK_SIZE: usize = 8 * 1024;

/// A byte stream that supports non-consuming reads.
#[derive(Debug)]
pub struct ByteSource<R> {
    inner: R,
    buf: Vec<u8>,
    pos: usize,
    eof: bool,
}

impl<R: Read> ByteSource<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            buf: Vec::new(),
            pos: 0,
            eof: false,
        }
    }

    /// Return up to `len` unconsumed bytes without consuming them.
    ///
    /// The slice is shorter than `len` only if the stream ends first.
    pub fn peek(&mut self, len: usize) -> io::Result<&[u8]> {
        self.fill_to(len)?;
        let end = (self.pos + len).min(self.buf.len());
        Ok(&self.buf[self.pos..end])
    }

    /// True once every byte has been consumed and the stream is at its end.
    pub fn exhausted(&mut self) -> io::Result<bool> {
        self.fill_to(1)?;
        Ok(self.pos == self.buf.len())
    }

    /// Consume the remainder of the stream into a single buffer.
    ///
    /// On a read error nothing is consumed: the buffered bytes, plus whatever
    /// the failed read delivered, stay available to later reads.
    pub fn read_to_vec(&mut self) -> io::Result<Vec<u8>> {
        let mut out = self.buf.split_off(self.pos);
        self.buf.clear();
        self.pos = 0;
        if let Err(e) = self.inner.read_to_end(&mut out) {
            self.buf = out;
            return Err(e);
        }
        self.eof = true;
        Ok(out)
    }

    /// A reader over the unconsumed bytes that leaves them unconsumed.
    ///
    /// Bytes pulled through the peek reader are buffered and will be returned
    /// again by the next consuming read.
    pub fn peek_reader(&mut self) -> PeekReader<'_, R> {
        PeekReader {
            source: self,
            offset: 0,
        }
    }

    /// Number of bytes buffered but not yet consumed.
    pub fn buffered_len(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn into_inner(self) -> R {
        self.inner
    }

    fn fill_to(&mut self, len: usize) -> io::Result<()> {
        while self.buffered_len() < len && !self.eof {
            self.fill_more()?;
        }
        Ok(())
    }

    /// Append the next chunk from the inner reader; returns bytes added.
    fn fill_more(&mut self) -> io::Result<usize> {
        if self.pos == self.buf.len() {
            self.buf.clear();
            self.pos = 0;
        }

        let start = self.buf.len();
        self.buf.resize(start + CHUNK_SIZE, 0);
        let read = loop {
            match self.inner.read(&mut self.buf[start..]) {
                Ok(n) => break n,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    self.buf.truncate(start);
                    return Err(e);
                }
            }
        };
        self.buf.truncate(start + read);
        if read == 0 {
            self.eof = true;
        }
        Ok(read)
    }
}

impl<R: Read> Read for ByteSource<R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for ByteSource<R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.pos == self.buf.len() && !self.eof {
            self.fill_more()?;
        }
        Ok(&self.buf[self.pos..])
    }

    fn consume(&mut self, amt: usize) {
        self.pos = (self.pos + amt).min(self.buf.len());
    }
}

/// Non-consuming reader returned by [`ByteSource::peek_reader`].
#[derive(Debug)]
pub struct PeekReader<'a, R> {
    source: &'a mut ByteSource<R>,
    offset: usize,
}

impl<R: Read> Read for PeekReader<'_, R> {
    fn read(&mut self, out: &mut [u8]) -> io::Result<usize> {
        let available = self.fill_buf()?;
        let n = available.len().min(out.len());
        out[..n].copy_from_slice(&available[..n]);
        self.consume(n);
        Ok(n)
    }
}

impl<R: Read> BufRead for PeekReader<'_, R> {
    fn fill_buf(&mut self) -> io::Result<&[u8]> {
        if self.offset == self.source.buffered_len() && !self.source.eof {
            self.source.fill_more()?;
        }
        let start = self.source.pos + self.offset;
        Ok(&self.source.buf[start..])
    }

    fn consume(&mut self, amt: usize) {
        self.offset = (self.offset + amt).min(self.source.buffered_len());
    }
}
