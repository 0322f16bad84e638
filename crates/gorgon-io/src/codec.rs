//! Codec capability.
//!
//! A codec turns a byte stream into [`ImageSettings`] plus a buffer laid
//! out as [`BufferLayout`](gorgon_core::BufferLayout) describes, and back.
//! [`ImageData`] never parses files itself.

use std::io::{Read, Seek, SeekFrom, Write};

use gorgon_core::{ImageSettings, PitchFlags};

use crate::{ImageData, ImageResult};

/// Readable, seekable stream.
pub trait ReadSeek: Read + Seek {}

impl<T: Read + Seek + ?Sized> ReadSeek for T {}

/// What a codec decoded: settings and the buffer in layout order.
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Settings of the decoded image.
    pub settings: ImageSettings,
    /// Pitch rules `data` is laid out with.
    pub flags: PitchFlags,
    /// Pixel buffer.
    pub data: Vec<u8>,
}

/// File format encoder/decoder.
pub trait ImageCodec: Send + Sync {
    /// Codec name, e.g. `"PNG"`.
    fn name(&self) -> &'static str;

    /// File extensions without dots, lowercase.
    fn extensions(&self) -> &'static [&'static str];

    /// Checks the stream header. The stream position is restored.
    fn is_readable(&self, stream: &mut dyn ReadSeek) -> ImageResult<bool>;

    /// Decodes one image; `byte_len` is the number of bytes left in the
    /// stream.
    fn decode(&self, stream: &mut dyn ReadSeek, byte_len: u64) -> ImageResult<DecodedImage>;

    /// Encodes `image` to `stream`.
    fn encode(&self, image: &ImageData, stream: &mut dyn Write) -> ImageResult<()>;
}

/// Reads up to `len` bytes and seeks back to where the stream was.
pub(crate) fn peek(stream: &mut dyn ReadSeek, len: usize) -> ImageResult<Vec<u8>> {
    let start = stream.stream_position()?;
    let mut header = Vec::with_capacity(len);
    let read = (&mut *stream).take(len as u64).read_to_end(&mut header);
    stream.seek(SeekFrom::Start(start))?;
    read?;
    Ok(header)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_peek_restores_position() {
        let mut cursor = Cursor::new(vec![1u8, 2, 3, 4, 5]);
        cursor.set_position(1);
        let header = peek(&mut cursor, 3).unwrap();
        assert_eq!(header, vec![2, 3, 4]);
        assert_eq!(cursor.position(), 1);

        let header = peek(&mut cursor, 16).unwrap();
        assert_eq!(header, vec![2, 3, 4, 5]);
        assert_eq!(cursor.position(), 1);
    }
}
