//! DirectDraw Surface parsing for DXT1/DXT3/DXT5 block-compressed textures.
//!
//! Layout: the 4-byte magic `"DDS "`, a 124-byte header, then the mip chain
//! payload. Only the fields needed for upload are read:
//!
//! | header offset | field        |
//! |---------------|--------------|
//! | 8             | height       |
//! | 12            | width        |
//! | 16            | linear size  |
//! | 24            | mip count    |
//! | 80            | fourCC       |

use crate::error::LoadError;

pub const DDS_MAGIC: &[u8; 4] = b"DDS ";
pub const HEADER_SIZE: usize = 124;
const PAYLOAD_OFFSET: usize = DDS_MAGIC.len() + HEADER_SIZE;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DxtFormat {
    Dxt1,
    Dxt3,
    Dxt5,
}

impl DxtFormat {
    pub fn from_four_cc(four_cc: [u8; 4]) -> Result<Self, LoadError> {
        match &four_cc {
            b"DXT1" => Ok(Self::Dxt1),
            b"DXT3" => Ok(Self::Dxt3),
            b"DXT5" => Ok(Self::Dxt5),
            _ => Err(LoadError::UnsupportedFourCc(four_cc)),
        }
    }

    /// Bytes per 4x4 block.
    pub fn block_size(self) -> u32 {
        match self {
            Self::Dxt1 => 8,
            Self::Dxt3 | Self::Dxt5 => 16,
        }
    }

    pub fn texture_format(self) -> wgpu::TextureFormat {
        match self {
            Self::Dxt1 => wgpu::TextureFormat::Bc1RgbaUnormSrgb,
            Self::Dxt3 => wgpu::TextureFormat::Bc2RgbaUnormSrgb,
            Self::Dxt5 => wgpu::TextureFormat::Bc3RgbaUnormSrgb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DdsHeader {
    pub width: u32,
    pub height: u32,
    pub linear_size: u32,
    pub mip_count: u32,
    pub format: DxtFormat,
}

impl DdsHeader {
    /// Size of the mip chain payload announced by the header.
    pub fn payload_size(&self) -> usize {
        if self.mip_count > 1 {
            self.linear_size as usize * 2
        } else {
            self.linear_size as usize
        }
    }

    /// Every level the header describes, with offsets into the payload.
    /// Dimensions halve per level and never drop below one texel.
    pub fn mip_levels(&self) -> Vec<MipLevel> {
        let block = self.format.block_size() as usize;
        let mut levels = Vec::new();
        let mut offset = 0usize;

        for level in 0..self.mip_count.max(1) {
            let raw_width = self.width.checked_shr(level).unwrap_or(0);
            let raw_height = self.height.checked_shr(level).unwrap_or(0);
            if raw_width == 0 && raw_height == 0 {
                break;
            }
            let width = raw_width.max(1);
            let height = raw_height.max(1);
            let size = width.div_ceil(4) as usize * height.div_ceil(4) as usize * block;
            levels.push(MipLevel {
                width,
                height,
                offset,
                size,
            });
            offset += size;
        }

        levels
    }

    /// Texture size rounded up to whole 4x4 blocks. BC textures must be
    /// allocated in block multiples; the extra texels are block padding.
    pub fn block_extent(&self) -> (u32, u32) {
        (
            self.width.max(1).next_multiple_of(4),
            self.height.max(1).next_multiple_of(4),
        )
    }
}

/// Whether `level` of the file has the same block grid as `mip` of a texture
/// allocated at `extent`. Rounding the base size up can make deeper levels
/// disagree, and those can't be uploaded.
fn fits_block_extent(level: &MipLevel, mip: u32, (width, height): (u32, u32)) -> bool {
    let mip_width = (width >> mip).max(1);
    let mip_height = (height >> mip).max(1);
    level.blocks_per_row() == mip_width.div_ceil(4) && level.block_rows() == mip_height.div_ceil(4)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub offset: usize,
    pub size: usize,
}

impl MipLevel {
    pub fn blocks_per_row(&self) -> u32 {
        self.width.div_ceil(4)
    }

    pub fn block_rows(&self) -> u32 {
        self.height.div_ceil(4)
    }
}

/// A parsed DDS file borrowing its payload from the source bytes.
#[derive(Debug)]
pub struct DdsImage<'a> {
    pub header: DdsHeader,
    /// Levels that fit inside the payload, in upload order.
    pub levels: Vec<MipLevel>,
    pub payload: &'a [u8],
}

impl DdsImage<'_> {
    pub fn level_data(&self, level: &MipLevel) -> &[u8] {
        &self.payload[level.offset..level.offset + level.size]
    }
}

pub fn is_dds(bytes: &[u8]) -> bool {
    bytes.starts_with(DDS_MAGIC)
}

pub fn parse_header(bytes: &[u8]) -> Result<DdsHeader, LoadError> {
    if bytes.len() < DDS_MAGIC.len() {
        return Err(LoadError::DdsTruncated("magic"));
    }
    if !is_dds(bytes) {
        return Err(LoadError::DdsMagic);
    }
    let header = bytes
        .get(DDS_MAGIC.len()..PAYLOAD_OFFSET)
        .ok_or(LoadError::DdsTruncated("header"))?;

    let read_u32 = |offset: usize| {
        u32::from_le_bytes([
            header[offset],
            header[offset + 1],
            header[offset + 2],
            header[offset + 3],
        ])
    };
    let four_cc = [header[80], header[81], header[82], header[83]];

    Ok(DdsHeader {
        height: read_u32(8),
        width: read_u32(12),
        linear_size: read_u32(16),
        mip_count: read_u32(24),
        format: DxtFormat::from_four_cc(four_cc)?,
    })
}

pub fn parse(bytes: &[u8]) -> Result<DdsImage<'_>, LoadError> {
    let header = parse_header(bytes)?;
    let extent = header.block_extent();

    let available = bytes.len() - PAYLOAD_OFFSET;
    let payload_len = header.payload_size().min(available);
    let payload = &bytes[PAYLOAD_OFFSET..PAYLOAD_OFFSET + payload_len];

    let levels: Vec<MipLevel> = header
        .mip_levels()
        .into_iter()
        .enumerate()
        .take_while(|(mip, level)| {
            level.offset + level.size <= payload.len() && fits_block_extent(level, *mip as u32, extent)
        })
        .map(|(_, level)| level)
        .collect();

    if levels.is_empty() {
        return Err(LoadError::DdsTruncated("first mip level"));
    }
    if levels.len() < header.mip_count.max(1) as usize {
        log::debug!(
            "DDS payload holds {} of {} announced mip levels",
            levels.len(),
            header.mip_count
        );
    }

    Ok(DdsImage {
        header,
        levels,
        payload,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build_dds(
        width: u32,
        height: u32,
        linear_size: u32,
        mip_count: u32,
        four_cc: &[u8; 4],
        payload_len: usize,
    ) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(PAYLOAD_OFFSET + payload_len);
        bytes.extend_from_slice(DDS_MAGIC);
        let mut header = [0u8; HEADER_SIZE];
        header[0..4].copy_from_slice(&124u32.to_le_bytes());
        header[8..12].copy_from_slice(&height.to_le_bytes());
        header[12..16].copy_from_slice(&width.to_le_bytes());
        header[16..20].copy_from_slice(&linear_size.to_le_bytes());
        header[24..28].copy_from_slice(&mip_count.to_le_bytes());
        header[80..84].copy_from_slice(four_cc);
        bytes.extend_from_slice(&header);
        bytes.extend((0..payload_len).map(|i| i as u8));
        bytes
    }

    #[test]
    fn single_level_payload_equals_linear_size() {
        let bytes = build_dds(64, 64, 2048, 1, b"DXT1", 2048);
        let header = parse_header(&bytes).unwrap();

        assert_eq!(header.payload_size(), 2048);
        let image = parse(&bytes).unwrap();
        assert_eq!(image.levels.len(), 1);
        assert_eq!(image.levels[0].size, 2048);
        assert_eq!(image.payload.len(), 2048);
    }

    #[test]
    fn mip_chain_fits_doubled_linear_size_and_shrinks() {
        let bytes = build_dds(64, 64, 2048, 4, b"DXT1", 4096);
        let image = parse(&bytes).unwrap();

        assert_eq!(image.header.payload_size(), 4096);
        assert_eq!(image.levels.len(), 4);
        let total: usize = image.levels.iter().map(|l| l.size).sum();
        assert!(total <= 2048 * 2);
        for pair in image.levels.windows(2) {
            assert!(pair[1].size < pair[0].size);
        }
        assert_eq!(
            image.levels.iter().map(|l| l.width).collect::<Vec<_>>(),
            vec![64, 32, 16, 8]
        );
    }

    #[test]
    fn block_size_depends_on_format() {
        let dxt1_bytes = build_dds(8, 8, 32, 1, b"DXT1", 32);
        let dxt5_bytes = build_dds(8, 8, 64, 1, b"DXT5", 64);
        let dxt1 = parse(&dxt1_bytes).unwrap();
        let dxt5 = parse(&dxt5_bytes).unwrap();

        assert_eq!(dxt1.levels[0].size, 4 * 8);
        assert_eq!(dxt5.levels[0].size, 4 * 16);
        assert_eq!(
            dxt5.header.format.texture_format(),
            wgpu::TextureFormat::Bc3RgbaUnormSrgb
        );
    }

    #[test]
    fn level_dimensions_clamp_to_one() {
        let header = DdsHeader {
            width: 8,
            height: 4,
            linear_size: 32,
            mip_count: 4,
            format: DxtFormat::Dxt1,
        };
        let levels = header.mip_levels();

        assert_eq!(
            levels
                .iter()
                .map(|l| (l.width, l.height))
                .collect::<Vec<_>>(),
            vec![(8, 4), (4, 2), (2, 1), (1, 1)]
        );
        assert!(levels.iter().skip(1).all(|l| l.size == 8));
    }

    #[test]
    fn unknown_four_cc_is_rejected() {
        let bytes = build_dds(4, 4, 8, 1, b"ATI2", 8);
        assert!(matches!(
            parse(&bytes),
            Err(LoadError::UnsupportedFourCc(cc)) if &cc == b"ATI2"
        ));
    }

    #[test]
    fn missing_magic_is_rejected() {
        let mut bytes = build_dds(4, 4, 8, 1, b"DXT1", 8);
        bytes[0] = b'X';
        assert!(!is_dds(&bytes));
        assert!(matches!(parse(&bytes), Err(LoadError::DdsMagic)));
    }

    #[test]
    fn truncated_header_is_rejected() {
        let bytes = build_dds(4, 4, 8, 1, b"DXT1", 0);
        assert!(matches!(
            parse(&bytes[..64]),
            Err(LoadError::DdsTruncated("header"))
        ));
    }

    #[test]
    fn short_payload_drops_trailing_levels() {
        let bytes = build_dds(16, 16, 128, 3, b"DXT1", 128 + 32);
        let image = parse(&bytes).unwrap();

        assert_eq!(image.levels.len(), 2);
        assert_eq!(image.level_data(&image.levels[1]).len(), 32);
        assert_eq!(image.level_data(&image.levels[1])[0], 128);
    }

    #[test]
    fn empty_payload_is_rejected() {
        let bytes = build_dds(16, 16, 128, 1, b"DXT1", 16);
        assert!(matches!(
            parse(&bytes),
            Err(LoadError::DdsTruncated(_))
        ));
    }

    #[test]
    fn unaligned_dimensions_round_up_to_whole_blocks() {
        // 6x4 DXT1 is two blocks wide: ceil(6 / 4) * ceil(4 / 4) * 8 bytes
        let bytes = build_dds(6, 4, 16, 1, b"DXT1", 16);
        let image = parse(&bytes).unwrap();

        assert_eq!(image.header.block_extent(), (8, 4));
        assert_eq!(image.levels.len(), 1);
        assert_eq!(image.levels[0].blocks_per_row(), 2);
        assert_eq!(image.level_data(&image.levels[0]).len(), 16);
    }

    #[test]
    fn levels_whose_block_grid_drifts_are_dropped() {
        // 17 wide pads to 20. Level 1 of the file is 8 texels (2 blocks)
        // while the texture's level 1 is 10 texels (3 blocks).
        let header = DdsHeader {
            width: 17,
            height: 4,
            linear_size: 40,
            mip_count: 2,
            format: DxtFormat::Dxt1,
        };
        let levels = header.mip_levels();
        let extent = header.block_extent();

        assert_eq!(extent, (20, 4));
        assert!(fits_block_extent(&levels[0], 0, extent));
        assert!(!fits_block_extent(&levels[1], 1, extent));

        let bytes = build_dds(17, 4, 40, 2, b"DXT1", 80);
        assert_eq!(parse(&bytes).unwrap().levels.len(), 1);
    }
}
