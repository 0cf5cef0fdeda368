//! Transparent decompression of the input stream.
//!
//! The first bytes of the stream are sniffed for a magic number and then chained
//! back in front of the reader, so nothing needs to be seekable and nothing is
//! decompressed twice.
use std::fmt;
use std::io::{self, Chain, Cursor, Read};

#[cfg(feature = "compression")]
use bzip2::read::BzDecoder;
#[cfg(feature = "compression")]
use flate2::read::MultiGzDecoder;
#[cfg(feature = "compression")]
use xz2::read::XzDecoder;

#[cfg(feature = "compression")]
use crate::errors::DecodeFailure;
use crate::errors::ParseError;

// Magic bytes for each compression format
const GZ_MAGIC: [u8; 2] = [0x1F, 0x8B];
const BZ_MAGIC: [u8; 2] = [0x42, 0x5A];
const XZ_MAGIC: [u8; 2] = [0xFD, 0x37];

/// A reader with some already-consumed bytes put back in front of it
pub type Rewound<R> = Chain<Cursor<Vec<u8>>, R>;

/// How the input stream is encoded
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Compression {
    None,
    Gzip,
    Bzip2,
    Xz,
}

impl Compression {
    /// Looks at the first two bytes of a stream. Anything shorter or unknown is plain.
    pub fn detect(magic: &[u8]) -> Self {
        match magic {
            [a, b, ..] if [*a, *b] == GZ_MAGIC => Self::Gzip,
            [a, b, ..] if [*a, *b] == BZ_MAGIC => Self::Bzip2,
            [a, b, ..] if [*a, *b] == XZ_MAGIC => Self::Xz,
            _ => Self::None,
        }
    }
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Self::None => "plain",
            Self::Gzip => "gzip",
            Self::Bzip2 => "bzip2",
            Self::Xz => "xz",
        };
        f.write_str(name)
    }
}

/// Reads up to `want` bytes, stopping early only at EOF
pub(crate) fn read_prefix<R: Read>(reader: &mut R, want: usize) -> io::Result<Vec<u8>> {
    let mut prefix = Vec::with_capacity(want);
    reader.by_ref().take(want as u64).read_to_end(&mut prefix)?;
    Ok(prefix)
}

/// The decompressed byte stream of a file.
///
/// Errors raised by a decompressor are wrapped so that they turn into
/// [`ParseErrorKind::Decode`](crate::errors::ParseErrorKind::Decode) once converted.
/// Read failures of the underlying reader stay I/O errors.
pub enum Decoder<R: Read> {
    Plain(R),
    #[cfg(feature = "compression")]
    Gzip(MultiGzDecoder<R>),
    #[cfg(feature = "compression")]
    Bzip2(BzDecoder<R>),
    #[cfg(feature = "compression")]
    Xz(XzDecoder<R>),
}

impl<R: Read> Decoder<R> {
    /// Wraps `reader` with the decoder for `compression`
    #[cfg(feature = "compression")]
    pub fn new(reader: R, compression: Compression) -> Result<Self, ParseError> {
        Ok(match compression {
            Compression::None => Self::Plain(reader),
            Compression::Gzip => Self::Gzip(MultiGzDecoder::new(reader)),
            Compression::Bzip2 => Self::Bzip2(BzDecoder::new(reader)),
            Compression::Xz => Self::Xz(XzDecoder::new(reader)),
        })
    }

    /// Wraps `reader` with the decoder for `compression`
    #[cfg(not(feature = "compression"))]
    pub fn new(reader: R, compression: Compression) -> Result<Self, ParseError> {
        match compression {
            Compression::None => Ok(Self::Plain(reader)),
            other => Err(ParseError::new_decode(format!(
                "{} input found but compression support is disabled",
                other
            ))),
        }
    }

    pub fn compression(&self) -> Compression {
        match self {
            Self::Plain(_) => Compression::None,
            #[cfg(feature = "compression")]
            Self::Gzip(_) => Compression::Gzip,
            #[cfg(feature = "compression")]
            Self::Bzip2(_) => Compression::Bzip2,
            #[cfg(feature = "compression")]
            Self::Xz(_) => Compression::Xz,
        }
    }
}

/// flate2, bzip2 and xz2 report corrupt or truncated data with these kinds.
/// Anything else comes from the wrapped reader and stays an I/O error.
#[cfg(feature = "compression")]
#[inline]
fn tag_decode_error(res: io::Result<usize>) -> io::Result<usize> {
    res.map_err(|e| match e.kind() {
        kind @ (io::ErrorKind::InvalidData
        | io::ErrorKind::InvalidInput
        | io::ErrorKind::UnexpectedEof) => io::Error::new(kind, DecodeFailure(e)),
        _ => e,
    })
}

impl<R: Read> Read for Decoder<R> {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        match self {
            Self::Plain(r) => r.read(buf),
            #[cfg(feature = "compression")]
            Self::Gzip(r) => tag_decode_error(r.read(buf)),
            #[cfg(feature = "compression")]
            Self::Bzip2(r) => tag_decode_error(r.read(buf)),
            #[cfg(feature = "compression")]
            Self::Xz(r) => tag_decode_error(r.read(buf)),
        }
    }
}

/// Sniffs the compression of `reader` and returns the decompressed stream.
pub fn open_stream<R: Read>(mut reader: R) -> Result<Decoder<Rewound<R>>, ParseError> {
    let magic = read_prefix(&mut reader, 2)?;
    let compression = Compression::detect(&magic);
    tracing::debug!(%compression, "detected input compression");
    Decoder::new(Cursor::new(magic).chain(reader), compression)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect() {
        assert_eq!(Compression::detect(&[0x1F, 0x8B, 0x08]), Compression::Gzip);
        assert_eq!(Compression::detect(b"BZh9"), Compression::Bzip2);
        assert_eq!(Compression::detect(&[0xFD, 0x37, 0x7A]), Compression::Xz);
        assert_eq!(Compression::detect(b">id"), Compression::None);
        assert_eq!(Compression::detect(&[0x1F]), Compression::None);
        assert_eq!(Compression::detect(&[]), Compression::None);
    }

    #[test]
    fn test_plain_passes_through() {
        let mut stream = open_stream(&b">id\nACGT\n"[..]).unwrap();
        assert_eq!(stream.compression(), Compression::None);
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b">id\nACGT\n");
    }

    #[test]
    fn test_tiny_inputs() {
        for input in [&b""[..], &b"@"[..]] {
            let mut stream = open_stream(input).unwrap();
            let mut out = Vec::new();
            stream.read_to_end(&mut out).unwrap();
            assert_eq!(out, input);
        }
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_gzip_is_inflated() {
        use crate::errors::ParseErrorKind;
        use flate2::write::GzEncoder;
        use std::io::Write;

        let mut encoder = GzEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(b">id\nACGT\n").unwrap();
        let gz = encoder.finish().unwrap();

        let mut stream = open_stream(&gz[..]).unwrap();
        assert_eq!(stream.compression(), Compression::Gzip);
        let mut out = Vec::new();
        stream.read_to_end(&mut out).unwrap();
        assert_eq!(out, b">id\nACGT\n");

        // chop off the trailer and some of the deflate data
        let truncated = &gz[..gz.len() - 10];
        let mut stream = open_stream(truncated).unwrap();
        let err: ParseError = stream.read_to_end(&mut Vec::new()).unwrap_err().into();
        assert_eq!(err.kind, ParseErrorKind::Decode);
    }

    /// Serves a gzip header, then fails every read
    #[cfg(feature = "compression")]
    struct FailingDisk {
        pos: usize,
    }

    #[cfg(feature = "compression")]
    impl Read for FailingDisk {
        fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
            const GZ_HEADER: [u8; 10] = [0x1F, 0x8B, 0x08, 0, 0, 0, 0, 0, 0, 0x03];
            if self.pos == GZ_HEADER.len() {
                return Err(io::Error::new(io::ErrorKind::Other, "device error"));
            }
            let n = (GZ_HEADER.len() - self.pos).min(buf.len());
            buf[..n].copy_from_slice(&GZ_HEADER[self.pos..self.pos + n]);
            self.pos += n;
            Ok(n)
        }
    }

    #[cfg(feature = "compression")]
    #[test]
    fn test_read_failure_under_gzip_stays_io() {
        use crate::errors::ParseErrorKind;

        let mut stream = open_stream(FailingDisk { pos: 0 }).unwrap();
        assert_eq!(stream.compression(), Compression::Gzip);
        let err: ParseError = stream.read_to_end(&mut Vec::new()).unwrap_err().into();
        assert_eq!(err.kind, ParseErrorKind::Io);
        assert!(err.msg.contains("device error"));
    }

    #[cfg(not(feature = "compression"))]
    #[test]
    fn test_compressed_input_without_support() {
        use crate::errors::ParseErrorKind;

        let err = open_stream(&[0x1F, 0x8B, 0x08, 0x00][..]).err().unwrap();
        assert_eq!(err.kind, ParseErrorKind::Decode);
    }
}
