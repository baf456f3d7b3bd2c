//! Byte-buffer state for the transport.
//!
//! One [`WriteBuffer`] accumulates outbound bytes between flushes; one
//! [`ReadBuffer`] exposes the last response body for sequential decoding.

use bytes::{Bytes, BytesMut};

/// Outbound accumulator. Append-only between flushes.
#[derive(Debug, Default)]
pub(crate) struct WriteBuffer {
    buf: BytesMut,
}

impl WriteBuffer {
    pub(crate) fn new() -> Self {
        Self {
            buf: BytesMut::new(),
        }
    }

    /// Append `data` in write order.
    pub(crate) fn put(&mut self, data: &[u8]) {
        self.buf.extend_from_slice(data);
    }

    /// Drain the accumulated bytes, leaving the buffer empty.
    pub(crate) fn take(&mut self) -> Bytes {
        self.buf.split().freeze()
    }

    pub(crate) fn len(&self) -> usize {
        self.buf.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }
}

/// Inbound response bytes with a read cursor.
///
/// The contents are set once per successful flush and never mutated;
/// reading only advances the cursor.
#[derive(Debug, Default)]
pub(crate) struct ReadBuffer {
    buf: Bytes,
}

impl ReadBuffer {
    pub(crate) fn new(body: Bytes) -> Self {
        Self { buf: body }
    }

    /// Up to `n` bytes from the cursor, advancing past them. Short (possibly
    /// empty) when fewer than `n` bytes remain.
    pub(crate) fn read(&mut self, n: usize) -> Bytes {
        let n = n.min(self.buf.len());
        self.buf.split_to(n)
    }

    pub(crate) fn remaining(&self) -> usize {
        self.buf.len()
    }
}
