//! The destination the encoder writes into. All multi-byte numbers go out in network byte order.

use crate::error::{EncodeError, Result};
use bytes::{BufMut, BytesMut};
use tracing::debug;

pub trait Sink {

    /// Bytes that can still be written.
    fn remaining(&self) -> usize;

    /// Makes room for `additional` bytes up front, failing if the sink cannot grow that far.
    fn reserve(&mut self, additional: usize) -> Result<()>;

    /// Writes all of `src` or nothing.
    fn put_slice(&mut self, src: &[u8]) -> Result<()>;

    fn put_u8(&mut self, v: u8) -> Result<()> {
        self.put_slice(&[v])
    }

    fn put_u16(&mut self, v: u16) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_u32(&mut self, v: u32) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_u64(&mut self, v: u64) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_i8(&mut self, v: i8) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_i16(&mut self, v: i16) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_i32(&mut self, v: i32) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_i64(&mut self, v: i64) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_f32(&mut self, v: f32) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

    fn put_f64(&mut self, v: f64) -> Result<()> {
        self.put_slice(&v.to_be_bytes())
    }

}

impl Sink for BytesMut {

    fn remaining(&self) -> usize {
        self.remaining_mut()
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        BytesMut::reserve(self, additional);
        Ok(())
    }

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        BufMut::put_slice(self, src);
        Ok(())
    }

}

impl Sink for Vec<u8> {

    fn remaining(&self) -> usize {
        self.remaining_mut()
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        Vec::reserve(self, additional);
        Ok(())
    }

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        self.extend_from_slice(src);
        Ok(())
    }

}

impl<S: Sink + ?Sized> Sink for &mut S {

    fn remaining(&self) -> usize {
        (**self).remaining()
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        (**self).reserve(additional)
    }

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        (**self).put_slice(src)
    }

}

/// A sink over a caller provided, pre-sized region. It never grows; a write that does not fit is refused
/// before any of its bytes land.
#[derive(Debug)]
pub struct FixedSink<'a> {
    buf: &'a mut [u8],
    pos: usize,
}

impl<'a> FixedSink<'a> {

    pub fn new(buf: &'a mut [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    /// Number of bytes written so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn is_full(&self) -> bool {
        self.pos == self.buf.len()
    }

    pub fn written(&self) -> &[u8] {
        &self.buf[..self.pos]
    }

    fn check(&self, needed: usize) -> Result<()> {
        let remaining = self.remaining();
        if needed > remaining {
            debug!(needed, remaining, "fixed sink refused write");
            Err(EncodeError::SinkExhausted { needed, remaining })
        } else {
            Ok(())
        }
    }

}

impl<'a> Sink for FixedSink<'a> {

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn reserve(&mut self, additional: usize) -> Result<()> {
        self.check(additional)
    }

    fn put_slice(&mut self, src: &[u8]) -> Result<()> {
        self.check(src.len())?;
        self.buf[self.pos..self.pos + src.len()].copy_from_slice(src);
        self.pos += src.len();
        Ok(())
    }

}
