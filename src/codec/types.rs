//! Domain value types with their own stored encodings.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// 32-bit packed ARGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Color {
    pub a: u8,
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn argb(a: u8, r: u8, g: u8, b: u8) -> Self {
        Self { a, r, g, b }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::argb(255, r, g, b)
    }

    /// Pack as `0xAARRGGBB`, reinterpreted as a signed 32-bit integer.
    pub fn to_argb(self) -> i32 {
        i32::from_be_bytes([self.a, self.r, self.g, self.b])
    }

    pub fn from_argb(packed: i32) -> Self {
        let [a, r, g, b] = packed.to_be_bytes();
        Self { a, r, g, b }
    }
}

/// Errors from bitmap encoding and decoding.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("pixel buffer holds {got} bytes, expected {expected} for {width}x{height} RGBA")]
    Size {
        width: u32,
        height: u32,
        expected: usize,
        got: usize,
    },
    #[error("PNG encoding failed: {0}")]
    Encode(#[from] png::EncodingError),
    #[error("PNG decoding failed: {0}")]
    Decode(#[from] png::DecodingError),
    #[error("unsupported PNG color type {0:?}")]
    Unsupported(png::ColorType),
}

/// An 8-bit RGBA raster image, stored as PNG.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: u32, height: u32, rgba: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * 4;
        if rgba.len() != expected {
            return Err(ImageError::Size {
                width,
                height,
                expected,
                got: rgba.len(),
            });
        }
        Ok(Self {
            width,
            height,
            rgba,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.rgba
    }

    pub fn to_png(&self) -> Result<Vec<u8>, ImageError> {
        let mut out = Vec::new();
        let mut encoder = png::Encoder::new(&mut out, self.width, self.height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&self.rgba)?;
        writer.finish()?;
        Ok(out)
    }

    /// Decode any 8/16-bit PNG, normalizing to 8-bit RGBA.
    pub fn from_png(bytes: &[u8]) -> Result<Self, ImageError> {
        let mut decoder = png::Decoder::new(bytes);
        decoder.set_transformations(png::Transformations::EXPAND | png::Transformations::STRIP_16);
        let mut reader = decoder.read_info()?;
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf)?;
        buf.truncate(info.buffer_size());

        let rgba = match info.color_type {
            png::ColorType::Rgba => buf,
            png::ColorType::Rgb => buf
                .chunks_exact(3)
                .flat_map(|p| [p[0], p[1], p[2], 255])
                .collect(),
            png::ColorType::Grayscale => buf.iter().flat_map(|&g| [g, g, g, 255]).collect(),
            png::ColorType::GrayscaleAlpha => buf
                .chunks_exact(2)
                .flat_map(|p| [p[0], p[0], p[0], p[1]])
                .collect(),
            other => return Err(ImageError::Unsupported(other)),
        };
        Self::new(info.width, info.height, rgba)
    }
}

/// A vector image; its stored encoding is the UTF-8 markup.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SvgImage {
    pub markup: String,
}

impl SvgImage {
    pub fn new(markup: impl Into<String>) -> Self {
        Self {
            markup: markup.into(),
        }
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        self.markup.as_bytes().to_vec()
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, std::string::FromUtf8Error> {
        String::from_utf8(bytes.to_vec()).map(Self::new)
    }
}

/// A hyperlink with an optional display title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub title: Option<String>,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid link on line {line}: {reason}")]
pub struct ParseLinkError {
    pub line: usize,
    pub reason: &'static str,
}

/// An ordered collection of links.
///
/// Canonical form: one link per line, `url` or `title<TAB>url`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct LinkCollection {
    links: Vec<Link>,
}

impl LinkCollection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, title: Option<&str>, url: &str) -> &mut Self {
        self.links.push(Link {
            title: title.map(str::to_string),
            url: url.to_string(),
        });
        self
    }

    pub fn links(&self) -> &[Link] {
        &self.links
    }

    /// The canonical text form, refusing links it could not represent.
    ///
    /// Titles may not contain tab or line breaks; urls may not contain them
    /// either and may not be blank.
    pub fn to_text(&self) -> Result<String, ParseLinkError> {
        let breaks = |s: &str| s.contains(['\t', '\n', '\r']);
        for (i, link) in self.links.iter().enumerate() {
            let reason = if link.title.as_deref().is_some_and(breaks) {
                "title contains a tab or line break"
            } else if breaks(&link.url) {
                "url contains a tab or line break"
            } else if link.url.trim().is_empty() {
                "url is blank"
            } else {
                continue;
            };
            return Err(ParseLinkError { line: i + 1, reason });
        }
        Ok(self.to_string())
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl fmt::Display for LinkCollection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, link) in self.links.iter().enumerate() {
            if i > 0 {
                f.write_str("\n")?;
            }
            match &link.title {
                Some(title) => write!(f, "{}\t{}", title, link.url)?,
                None => f.write_str(&link.url)?,
            }
        }
        Ok(())
    }
}

impl FromStr for LinkCollection {
    type Err = ParseLinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut links = Vec::new();
        for (i, line) in s.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (title, url) = match line.split_once('\t') {
                Some((title, url)) => (Some(title.to_string()), url),
                None => (None, line),
            };
            if url.is_empty() || url.contains('\t') {
                return Err(ParseLinkError {
                    line: i + 1,
                    reason: "expected `url` or `title<TAB>url`",
                });
            }
            links.push(Link {
                title,
                url: url.to_string(),
            });
        }
        Ok(Self { links })
    }
}

/// A packed bit array, least significant bit first within each byte.
///
/// Byte-granular: the length is always a multiple of 8, so the stored backing
/// bytes describe the array completely. Bits past the last one given to
/// [`BitArray::from_bools`] read as `false`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct BitArray {
    len: usize,
    bytes: Vec<u8>,
}

impl BitArray {
    pub fn from_bools(bits: &[bool]) -> Self {
        let mut bytes = vec![0u8; bits.len().div_ceil(8)];
        for (i, bit) in bits.iter().enumerate() {
            if *bit {
                bytes[i / 8] |= 1 << (i % 8);
            }
        }
        Self::from_bytes(bytes)
    }

    /// Wrap backing bytes; the length is every bit they hold.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            len: bytes.len() * 8,
            bytes,
        }
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        (index < self.len).then(|| self.bytes[index / 8] & (1 << (index % 8)) != 0)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }
}
