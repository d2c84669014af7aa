//! Length-prefixed framing (§4.1).
//!
//! A record is an 8-byte little-endian unsigned length followed by exactly
//! that many payload bytes. The reader reads one socket chunk — up to
//! [`MAX_CHUNK`], large enough that every record this profile produces
//! fits in one chunk by construction — and decodes exactly one record from
//! it. Records larger than one chunk are not supported.

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::Error;

/// Largest single read a [`FramedStream`] performs (§4.1, §9 open question).
pub const MAX_CHUNK: usize = 32 * 1024;

/// Largest payload a single record may carry.
pub const MAX_PAYLOAD: usize = MAX_CHUNK - 8;

/// Datagram size cap for multicast announcements (§6).
pub const MAX_DATAGRAM: usize = 8192;

/// Prepend the 8-byte little-endian length prefix to `payload`.
///
/// # Panics
/// Panics if `payload` exceeds [`MAX_PAYLOAD`] — producers must respect the
/// cap themselves; see [`FramedStream::write_frame`] for a checked version.
pub fn encode_frame(payload: &[u8]) -> Vec<u8> {
    assert!(payload.len() <= MAX_PAYLOAD, "payload exceeds the 32 KiB framing cap");
    let mut buf = Vec::with_capacity(8 + payload.len());
    buf.extend_from_slice(&(payload.len() as u64).to_le_bytes());
    buf.extend_from_slice(payload);
    buf
}

/// Decode one record out of `chunk`: an 8-byte length prefix followed by
/// exactly that many payload bytes. A chunk shorter than 8 bytes, or whose
/// declared length exceeds the remaining bytes, is a [`Error::ShortRead`].
pub fn decode_frame(chunk: &[u8]) -> Result<&[u8], Error> {
    if chunk.len() < 8 {
        log::debug!("[middleair-wire] short read: {} bytes, need at least 8", chunk.len());
        return Err(Error::ShortRead);
    }
    let len = u64::from_le_bytes(chunk[..8].try_into().unwrap()) as usize;
    let body = &chunk[8..];
    if body.len() < len {
        log::debug!("[middleair-wire] short read: declared length {len}, body has {}", body.len());
        return Err(Error::ShortRead);
    }
    Ok(&body[..len])
}

/// A length-framed stream wrapping any `AsyncRead + AsyncWrite` transport.
///
/// This is the secure channel's and the plaintext handshake's shared
/// transport primitive — [`crate::envelope`] and `middleair-crypto`'s
/// handshake both read and write through it.
pub struct FramedStream<S> {
    inner: S,
}

impl<S> FramedStream<S> {
    /// Wrap `inner` for framed reads and writes.
    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    /// Borrow the underlying transport.
    pub fn get_ref(&self) -> &S { &self.inner }

    /// Mutably borrow the underlying transport.
    pub fn get_mut(&mut self) -> &mut S { &mut self.inner }

    /// Unwrap back to the underlying transport.
    pub fn into_inner(self) -> S { self.inner }
}

impl<S: AsyncWrite + Unpin> FramedStream<S> {
    /// Write one framed record.
    pub async fn write_frame(&mut self, payload: &[u8]) -> Result<(), Error> {
        if payload.len() > MAX_PAYLOAD {
            return Err(Error::PayloadTooLarge);
        }
        self.inner.write_all(&encode_frame(payload)).await?;
        Ok(())
    }
}

impl<S: AsyncRead + Unpin> FramedStream<S> {
    /// Read one socket chunk and decode exactly one framed record from it.
    ///
    /// A short read with zero bytes is end-of-stream (`Ok(None)`); any
    /// other short read is a [`Error::ShortRead`].
    pub async fn read_frame(&mut self) -> Result<Option<Vec<u8>>, Error> {
        let mut chunk = vec![0u8; MAX_CHUNK];
        let n = self.inner.read(&mut chunk).await?;
        if n == 0 {
            return Ok(None);
        }
        let payload = decode_frame(&chunk[..n])?;
        Ok(Some(payload.to_vec()))
    }
}
