//! Image header / TLV reading.
//!
//! Outside the swap engine proper (spec.md §1 places header parsing, hashing
//! and signature verification out of scope), but the header shape itself is
//! needed by [`crate::header`]'s slot-resolution logic and kept here in the
//! teacher's original style, ported from `embedded_storage::ReadStorage` onto
//! [`storage::Flash`] so the whole crate shares one flash abstraction.

use core::mem::size_of;

use asraw::{AsMutRaw, AsRaw};

use crate::boot_log_dbg;
use crate::error::{flash, Error, Result};

/// The image header begins with the following magic value.
pub const IMAGE_MAGIC: u32 = 0x96f3b83d;

const INFO_MAGIC: u16 = 0x6907;

/// An image is a bootable image residing in a flash partition: a header,
/// followed immediately by the image payload, followed by a TLV block.
pub struct Image {
    pub header: ImageHeader,
}

fn to_u32(v: usize) -> Result<u32> {
    v.try_into().map_err(|_| Error::InvalidImage)
}

impl Image {
    /// Reads and validates the header and TLV block at the start of `flash`.
    pub fn from_flash<F: storage::Flash>(flash_dev: &mut F) -> Result<Image> {
        let mut header = ImageHeader::default();
        flash!(flash_dev.read(0, header.as_mut_raw()))?;

        if header.magic != IMAGE_MAGIC {
            return Err(Error::InvalidImage);
        }

        let tlv_base = (header.img_size as usize)
            .checked_add(header.hdr_size as usize)
            .ok_or(Error::InvalidImage)?;

        let mut info = TlvInfo::default();
        flash!(flash_dev.read(to_u32(tlv_base)? as usize, info.as_mut_raw()))?;

        boot_log_dbg!("image header: {:#x?}", header);

        if info.magic != INFO_MAGIC {
            return Err(Error::InvalidImage);
        }

        let mut pos = size_of::<TlvEntry>();
        while pos < info.len as usize {
            let mut entry = TlvEntry::default();
            flash!(flash_dev.read(to_u32(tlv_base + pos)? as usize, entry.as_mut_raw()))?;
            boot_log_dbg!("tlv entry: {:x?}", entry);

            pos += size_of::<TlvEntry>() + entry.len as usize;
        }

        Ok(Image { header })
    }
}

/// The image begins with the following header, interpreted as a C struct.
#[derive(Debug, Default)]
#[repr(C)]
pub struct ImageHeader {
    /// Magic number, indicates this particular header.
    pub magic: u32,
    /// The address to load this image. Only used for non-XIP.
    pub load_addr: u32,
    /// The size of the header. This struct is at the beginning, and there is
    /// some amount of padding before the actual image starts.
    pub hdr_size: u16,
    /// The size of the protected TLV.
    pub protected_tlv_size: u16,
    /// The size of the image, not counting the header.
    pub img_size: u32,
    /// Flags for this image.
    pub flags: u32,
    /// Version of this particular image.
    pub version: ImageVersion,
    /// Padding, to reach a nicely aligned minimum size.
    pub pad1: u32,
}

impl AsRaw for ImageHeader {}
unsafe impl AsMutRaw for ImageHeader {}

/// A pseudo-semantic version used to determine upgrade eligibility.
#[derive(Debug, Default)]
#[repr(C)]
pub struct ImageVersion {
    pub major: u8,
    pub minor: u8,
    pub revision: u16,
    pub build_num: u32,
}

/// The TLV block contains this header.
#[derive(Debug, Default)]
#[repr(C)]
struct TlvInfo {
    /// One of `TLV_INFO_MAGIC` or `TLV_PROT_INFO_MAGIC`.
    magic: u16,
    /// Length of the TLV block, including this header.
    len: u16,
}

impl AsRaw for TlvInfo {}
unsafe impl AsMutRaw for TlvInfo {}

/// Each TLV entry is preceded by this header.
#[derive(Debug, Default)]
#[repr(C)]
struct TlvEntry {
    kind: u16,
    len: u16,
}

impl AsRaw for TlvEntry {}
unsafe impl AsMutRaw for TlvEntry {}

#[cfg(test)]
mod tests {
    use super::*;
    use simflash::fake::FakeArea;

    #[test]
    fn rejects_bad_magic() {
        let mut area = FakeArea::new(4096, 1024, 4, 4);
        let err = Image::from_flash(&mut area).unwrap_err();
        assert!(matches!(err, Error::InvalidImage));
    }

    #[test]
    fn reads_valid_header_and_tlv() {
        let mut area = FakeArea::new(4096, 1024, 4, 4);

        let header = ImageHeader {
            magic: IMAGE_MAGIC,
            load_addr: 0,
            hdr_size: size_of::<ImageHeader>() as u16,
            protected_tlv_size: 0,
            img_size: 256,
            flags: 0,
            version: ImageVersion::default(),
            pad1: 0,
        };
        area.write_raw(0, header.as_raw());

        let tlv_base = header.img_size as usize + header.hdr_size as usize;
        let info = TlvInfo { magic: INFO_MAGIC, len: size_of::<TlvInfo>() as u16 };
        area.write_raw(tlv_base, info.as_raw());

        let image = Image::from_flash(&mut area).unwrap();
        assert_eq!(image.header.magic, IMAGE_MAGIC);
        assert_eq!(image.header.img_size, 256);
    }
}
