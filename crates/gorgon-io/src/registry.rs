//! Codec registry.
//!
//! The registry maps codec names and file extensions to [`ImageCodec`]s
//! and detects codecs from stream headers. It is an ordinary value:
//! populate it once at start-up, then pass it by reference to whatever
//! loads or saves files.
//!
//! # Example
//!
//! ```rust
//! use gorgon_io::CodecRegistry;
//!
//! let registry = CodecRegistry::with_builtin();
//! assert!(registry.by_extension("GORIMG").is_some());
//! assert!(registry.for_path("textures/stone.gorimg").is_some());
//! ```

use std::collections::HashMap;
use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::ImageResult;
use crate::codec::{ImageCodec, ReadSeek};
use crate::raw::RawCodec;

/// Registered codecs, looked up by name or extension.
#[derive(Default)]
pub struct CodecRegistry {
    codecs: Vec<Box<dyn ImageCodec>>,
    by_extension: HashMap<String, usize>,
}

impl CodecRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a registry with the raw codec and, with the `png` feature,
    /// the PNG codec.
    pub fn with_builtin() -> Self {
        let mut registry = Self::new();
        registry.register(Box::new(RawCodec::new()));
        #[cfg(feature = "png")]
        registry.register(Box::new(crate::png::PngCodec::new()));
        registry
    }

    /// Adds a codec. Extensions already claimed move to the new codec.
    pub fn register(&mut self, codec: Box<dyn ImageCodec>) {
        let index = self.codecs.len();
        for ext in codec.extensions() {
            self.by_extension.insert(ext.to_ascii_lowercase(), index);
        }
        debug!(codec = codec.name(), extensions = ?codec.extensions(), "registered codec");
        self.codecs.push(codec);
    }

    /// Codec with the given name (case-insensitive).
    pub fn by_name(&self, name: &str) -> Option<&dyn ImageCodec> {
        self.codecs
            .iter()
            .find(|c| c.name().eq_ignore_ascii_case(name))
            .map(|c| c.as_ref())
    }

    /// Codec for a file extension, with or without the dot (case-insensitive).
    pub fn by_extension(&self, ext: &str) -> Option<&dyn ImageCodec> {
        let ext = ext.trim_start_matches('.').to_ascii_lowercase();
        self.by_extension.get(&ext).map(|&i| self.codecs[i].as_ref())
    }

    /// Codec for the extension of `path`.
    pub fn for_path<P: AsRef<Path>>(&self, path: P) -> Option<&dyn ImageCodec> {
        path.as_ref()
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|e| self.by_extension(e))
    }

    /// First codec whose [`is_readable`](ImageCodec::is_readable) accepts
    /// the stream. The stream position is unchanged.
    pub fn detect(&self, stream: &mut dyn ReadSeek) -> ImageResult<Option<&dyn ImageCodec>> {
        for codec in &self.codecs {
            if codec.is_readable(stream)? {
                return Ok(Some(codec.as_ref()));
            }
        }
        Ok(None)
    }

    /// All codecs in registration order.
    pub fn codecs(&self) -> impl Iterator<Item = &dyn ImageCodec> + '_ {
        self.codecs.iter().map(|c| c.as_ref())
    }

    /// Every registered extension, sorted.
    pub fn extensions(&self) -> Vec<&str> {
        let mut exts: Vec<&str> = self.by_extension.keys().map(String::as_str).collect();
        exts.sort_unstable();
        exts
    }
}

impl fmt::Debug for CodecRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.codecs.iter().map(|c| c.name())).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    use crate::codec::DecodedImage;
    use crate::{ImageData, ImageError};

    struct Dummy;

    impl ImageCodec for Dummy {
        fn name(&self) -> &'static str {
            "Dummy"
        }
        fn extensions(&self) -> &'static [&'static str] {
            &["gorimg", "dmy"]
        }
        fn is_readable(&self, _stream: &mut dyn ReadSeek) -> ImageResult<bool> {
            Ok(false)
        }
        fn decode(&self, _stream: &mut dyn ReadSeek, _byte_len: u64) -> ImageResult<DecodedImage> {
            Err(ImageError::Decode("dummy".into()))
        }
        fn encode(&self, _image: &ImageData, _stream: &mut dyn Write) -> ImageResult<()> {
            Ok(())
        }
    }

    #[test]
    fn test_lookup() {
        let registry = CodecRegistry::with_builtin();
        assert_eq!(registry.by_name("gorgonraw").map(|c| c.name()), Some("GorgonRaw"));
        assert_eq!(registry.by_extension(".GorImg").map(|c| c.name()), Some("GorgonRaw"));
        assert!(registry.by_extension("exr").is_none());
        assert!(registry.for_path("noext").is_none());
    }

    #[test]
    fn test_later_registration_wins_extension() {
        let mut registry = CodecRegistry::new();
        registry.register(Box::new(RawCodec::new()));
        registry.register(Box::new(Dummy));
        assert_eq!(registry.for_path("a.gorimg").map(|c| c.name()), Some("Dummy"));
        assert_eq!(registry.codecs().count(), 2);
        assert_eq!(registry.extensions(), vec!["dmy", "gorimg"]);
    }

    #[test]
    fn test_detect() {
        let registry = CodecRegistry::with_builtin();
        let mut cursor = Cursor::new(b"GIMG\x01\x00\x00\x00".to_vec());
        let codec = registry.detect(&mut cursor).unwrap();
        assert_eq!(codec.map(|c| c.name()), Some("GorgonRaw"));
        assert_eq!(cursor.position(), 0);

        let mut cursor = Cursor::new(b"nothing".to_vec());
        assert!(registry.detect(&mut cursor).unwrap().is_none());
    }
}
