//! Uncompressed 24-bit BMP reader and writer.
//!
//! ## Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 14 | File header: signature `BM`, file size, 2 reserved, pixel offset |
//! | 14 | 40 | Info header: size, width, height, planes, bpp, compression, ... |
//! | offset | stride * height | Pixel rows, B,G,R, each padded to 4 bytes |
//!
//! All fields are little-endian. A positive height means rows are stored
//! bottom-to-top; a negative height means top-to-bottom. Only 24 bits per
//! pixel with compression 0 is accepted. Files are always written
//! bottom-to-top with a 54-byte header.

use std::fmt;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;

use byteorder::{ByteOrder, LittleEndian, WriteBytesExt};
use tracing::{debug, trace};

use crate::color::Rgb;
use crate::error::{ImageError, ImageResult};
use crate::image::{alloc_pixels, Image, CHANNELS};

/// "BM" read as a little-endian u16
pub const SIGNATURE: u16 = 0x4D42;
pub const FILE_HEADER_SIZE: u32 = 14;
pub const INFO_HEADER_SIZE: u32 = 40;
pub const BITS_PER_PIXEL: u16 = 24;
pub const COMPRESSION_NONE: u32 = 0;

/// ~72 DPI
const PIXELS_PER_METER: i32 = 2835;

/// 14-byte BMP file header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileHeader {
    pub signature: u16,
    pub file_size: u32,
    pub reserved1: u16,
    pub reserved2: u16,
    pub pixel_offset: u32,
}

/// 40-byte BITMAPINFOHEADER.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InfoHeader {
    pub header_size: u32,
    pub width: i32,
    pub height: i32,
    pub planes: u16,
    pub bits_per_pixel: u16,
    pub compression: u32,
    pub image_size: u32,
    pub x_pixels_per_meter: i32,
    pub y_pixels_per_meter: i32,
    pub colors_used: u32,
    pub colors_important: u32,
}

/// Both BMP headers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BmpHeader {
    pub file: FileHeader,
    pub info: InfoHeader,
}

impl BmpHeader {
    /// Headers describing a bottom-up 24-bit encoding of a `width` x `height` image.
    pub fn for_image(width: usize, height: usize) -> ImageResult<Self> {
        let too_large =
            || ImageError::Dimension(format!("{}x{} is too large for a BMP file", width, height));

        let stride = row_stride(width)?;
        let image_size = stride
            .checked_mul(height)
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(too_large)?;
        let header_size = FILE_HEADER_SIZE + INFO_HEADER_SIZE;
        let file_size = image_size.checked_add(header_size).ok_or_else(too_large)?;

        Ok(BmpHeader {
            file: FileHeader {
                signature: SIGNATURE,
                file_size,
                reserved1: 0,
                reserved2: 0,
                pixel_offset: header_size,
            },
            info: InfoHeader {
                header_size: INFO_HEADER_SIZE,
                width: i32::try_from(width).map_err(|_| too_large())?,
                height: i32::try_from(height).map_err(|_| too_large())?,
                planes: 1,
                bits_per_pixel: BITS_PER_PIXEL,
                compression: COMPRESSION_NONE,
                image_size,
                x_pixels_per_meter: PIXELS_PER_METER,
                y_pixels_per_meter: PIXELS_PER_METER,
                colors_used: 0,
                colors_important: 0,
            },
        })
    }

    /// Read both headers and check the signature.
    ///
    /// Bit depth and compression are not checked here; see [`BmpHeader::validate`].
    pub fn read_from<R: Read>(reader: &mut R) -> ImageResult<Self> {
        let mut buf = [0u8; FILE_HEADER_SIZE as usize];
        reader
            .read_exact(&mut buf)
            .map_err(|e| read_error(e, "BMP file header"))?;
        let file = FileHeader {
            signature: LittleEndian::read_u16(&buf[0..2]),
            file_size: LittleEndian::read_u32(&buf[2..6]),
            reserved1: LittleEndian::read_u16(&buf[6..8]),
            reserved2: LittleEndian::read_u16(&buf[8..10]),
            pixel_offset: LittleEndian::read_u32(&buf[10..14]),
        };
        if file.signature != SIGNATURE {
            return Err(ImageError::Format(format!(
                "not a BMP file (signature 0x{:04X})",
                file.signature
            )));
        }

        let mut buf = [0u8; INFO_HEADER_SIZE as usize];
        reader
            .read_exact(&mut buf)
            .map_err(|e| read_error(e, "BMP info header"))?;
        let info = InfoHeader {
            header_size: LittleEndian::read_u32(&buf[0..4]),
            width: LittleEndian::read_i32(&buf[4..8]),
            height: LittleEndian::read_i32(&buf[8..12]),
            planes: LittleEndian::read_u16(&buf[12..14]),
            bits_per_pixel: LittleEndian::read_u16(&buf[14..16]),
            compression: LittleEndian::read_u32(&buf[16..20]),
            image_size: LittleEndian::read_u32(&buf[20..24]),
            x_pixels_per_meter: LittleEndian::read_i32(&buf[24..28]),
            y_pixels_per_meter: LittleEndian::read_i32(&buf[28..32]),
            colors_used: LittleEndian::read_u32(&buf[32..36]),
            colors_important: LittleEndian::read_u32(&buf[36..40]),
        };

        Ok(BmpHeader { file, info })
    }

    /// Reject anything other than uncompressed 24-bit data.
    pub fn validate(&self) -> ImageResult<()> {
        if self.info.bits_per_pixel != BITS_PER_PIXEL {
            return Err(ImageError::Format(format!(
                "only 24-bit BMP supported, got {} bits per pixel",
                self.info.bits_per_pixel
            )));
        }
        if self.info.compression != COMPRESSION_NONE {
            return Err(ImageError::Format(format!(
                "compressed BMP not supported (compression {})",
                self.info.compression
            )));
        }
        Ok(())
    }

    /// (width, height, top_down) of the stored pixel grid.
    pub fn geometry(&self) -> ImageResult<(usize, usize, bool)> {
        let InfoHeader { width, height, .. } = self.info;
        if width <= 0 || height == 0 {
            return Err(ImageError::Dimension(format!(
                "BMP header declares {}x{}",
                width, height
            )));
        }
        Ok((width as usize, height.unsigned_abs() as usize, height < 0))
    }

    pub fn write_to<W: Write>(&self, writer: &mut W) -> ImageResult<()> {
        let f = &self.file;
        writer.write_u16::<LittleEndian>(f.signature)?;
        writer.write_u32::<LittleEndian>(f.file_size)?;
        writer.write_u16::<LittleEndian>(f.reserved1)?;
        writer.write_u16::<LittleEndian>(f.reserved2)?;
        writer.write_u32::<LittleEndian>(f.pixel_offset)?;

        let i = &self.info;
        writer.write_u32::<LittleEndian>(i.header_size)?;
        writer.write_i32::<LittleEndian>(i.width)?;
        writer.write_i32::<LittleEndian>(i.height)?;
        writer.write_u16::<LittleEndian>(i.planes)?;
        writer.write_u16::<LittleEndian>(i.bits_per_pixel)?;
        writer.write_u32::<LittleEndian>(i.compression)?;
        writer.write_u32::<LittleEndian>(i.image_size)?;
        writer.write_i32::<LittleEndian>(i.x_pixels_per_meter)?;
        writer.write_i32::<LittleEndian>(i.y_pixels_per_meter)?;
        writer.write_u32::<LittleEndian>(i.colors_used)?;
        writer.write_u32::<LittleEndian>(i.colors_important)?;
        Ok(())
    }
}

impl fmt::Display for BmpHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [lo, hi] = self.file.signature.to_le_bytes();
        writeln!(f, "BMP File Info:")?;
        writeln!(f, "  Signature: {}{}", lo as char, hi as char)?;
        writeln!(f, "  File size: {} bytes", self.file.file_size)?;
        writeln!(f, "  Data offset: {}", self.file.pixel_offset)?;
        writeln!(f, "  Image size: {}x{}", self.info.width, self.info.height)?;
        writeln!(f, "  Bits per pixel: {}", self.info.bits_per_pixel)?;
        write!(f, "  Compression: {}", self.info.compression)
    }
}

/// Bytes per stored row: 3 bytes per pixel rounded up to a multiple of 4.
pub fn row_stride(width: usize) -> ImageResult<usize> {
    width
        .checked_mul(CHANNELS)
        .and_then(|n| n.checked_add(3))
        .map(|n| n / 4 * 4)
        .ok_or_else(|| ImageError::Dimension(format!("row of {} pixels overflows", width)))
}

fn read_error(e: io::Error, what: &str) -> ImageError {
    if e.kind() == io::ErrorKind::UnexpectedEof {
        ImageError::Format(format!("truncated {}", what))
    } else {
        ImageError::Io(e)
    }
}

/// Decode a BMP stream.
pub fn read_bmp<R: Read + Seek>(reader: &mut R) -> ImageResult<Image> {
    let header = BmpHeader::read_from(reader)?;
    header.validate()?;
    let (width, height, top_down) = header.geometry()?;
    trace!(width, height, top_down, offset = header.file.pixel_offset, "read_bmp");

    reader.seek(SeekFrom::Start(u64::from(header.file.pixel_offset)))?;

    let stride = row_stride(width)?;
    let mut row = vec![0u8; stride];
    let mut flat = alloc_pixels(width, height)?;
    let row_len = width * CHANNELS;

    for y in 0..height {
        reader
            .read_exact(&mut row)
            .map_err(|e| read_error(e, &format!("pixel data at row {}", y)))?;

        let target = if top_down { y } else { height - 1 - y };
        let out = &mut flat[target * row_len..(target + 1) * row_len];
        for (dst, bgr) in out.chunks_exact_mut(CHANNELS).zip(row.chunks_exact(3)) {
            let c = Rgb::from_bytes(bgr[2], bgr[1], bgr[0]);
            dst.copy_from_slice(&c.to_array());
        }
    }

    Image::from_flat(width, height, flat)
}

/// Encode `image` as a bottom-up 24-bit BMP.
pub fn write_bmp<W: Write>(writer: &mut W, image: &Image) -> ImageResult<()> {
    let (width, height) = image.dimensions();
    let header = BmpHeader::for_image(width, height)?;
    trace!(width, height, file_size = header.file.file_size, "write_bmp");
    header.write_to(writer)?;

    // Pad bytes stay zero
    let mut row = vec![0u8; row_stride(width)?];
    for y in (0..height).rev() {
        for x in 0..width {
            let [r, g, b] = image.at(x, y).to_bytes();
            row[x * 3] = b;
            row[x * 3 + 1] = g;
            row[x * 3 + 2] = r;
        }
        writer.write_all(&row)?;
    }
    Ok(())
}

/// Load a 24-bit BMP file.
pub fn load<P: AsRef<Path>>(path: P) -> ImageResult<Image> {
    let path = path.as_ref();
    debug!(path = %path.display(), "Loading BMP");
    let mut reader = BufReader::new(File::open(path)?);
    read_bmp(&mut reader)
}

/// Save `image` as a 24-bit BMP file, replacing any existing file.
pub fn save<P: AsRef<Path>>(path: P, image: &Image) -> ImageResult<()> {
    let path = path.as_ref();
    debug!(path = %path.display(), width = image.width(), height = image.height(), "Saving BMP");
    let mut writer = BufWriter::new(File::create(path)?);
    write_bmp(&mut writer, image)?;
    writer.flush()?;
    Ok(())
}

/// Read and validate the headers of a BMP file without decoding pixels.
pub fn probe<P: AsRef<Path>>(path: P) -> ImageResult<BmpHeader> {
    let mut reader = BufReader::new(File::open(path)?);
    let header = BmpHeader::read_from(&mut reader)?;
    header.validate()?;
    header.geometry()?;
    Ok(header)
}
