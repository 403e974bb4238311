//! BCn format classification
//!
//! Maps an API-native format name (e.g. `VK_FORMAT_BC1_RGBA_UNORM_BLOCK`,
//! `BC3_UNORM`) onto the block-compression family whose fallback decode
//! shader would be needed.

use serde::Serialize;
use std::fmt;

/// Block-compression family of a texture format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum FormatTag {
    /// BC1 - DXT1, RGB + 1-bit alpha
    BC1,
    /// BC2 - DXT3, explicit 4-bit alpha
    BC2,
    /// BC3 - DXT5, interpolated alpha
    BC3,
    /// BC4 - single channel
    BC4,
    /// BC5 - two channel, normal maps
    BC5,
    /// BC6H - HDR half-float
    BC6H,
    /// BC7 - high quality RGBA
    BC7,
    /// Not a BCn format, no fallback applies
    Unknown,
}

/// Substring tokens checked in priority order. First hit wins.
const CLASSIFY_ORDER: &[(&str, FormatTag)] = &[
    ("BC1", FormatTag::BC1),
    ("BC2", FormatTag::BC2),
    ("BC3", FormatTag::BC3),
    ("BC4", FormatTag::BC4),
    ("BC5", FormatTag::BC5),
    ("BC6", FormatTag::BC6H),
    ("BC7", FormatTag::BC7),
];

/// All BCn tags, excluding `Unknown`
pub const ALL_BC_TAGS: &[FormatTag] = &[
    FormatTag::BC1,
    FormatTag::BC2,
    FormatTag::BC3,
    FormatTag::BC4,
    FormatTag::BC5,
    FormatTag::BC6H,
    FormatTag::BC7,
];

/// Classify a format name by case-sensitive substring match.
///
/// Empty or absent input yields `Unknown`. Note that `"BC10"` contains
/// `"BC1"` and therefore classifies as BC1.
pub fn classify(format_id: Option<&str>) -> FormatTag {
    let Some(name) = format_id.filter(|s| !s.is_empty()) else {
        return FormatTag::Unknown;
    };

    CLASSIFY_ORDER
        .iter()
        .find(|(token, _)| name.contains(token))
        .map(|(_, tag)| *tag)
        .unwrap_or(FormatTag::Unknown)
}

impl FormatTag {
    /// Filename of the precompiled SPIR-V decoder for this family
    pub fn asset_file_name(self) -> Option<&'static str> {
        match self {
            FormatTag::BC1 => Some("bc1.spv"),
            FormatTag::BC2 => Some("bc2.spv"),
            FormatTag::BC3 => Some("bc3.spv"),
            FormatTag::BC4 => Some("bc4.spv"),
            FormatTag::BC5 => Some("bc5.spv"),
            FormatTag::BC6H => Some("bc6h.spv"),
            FormatTag::BC7 => Some("bc7.spv"),
            FormatTag::Unknown => None,
        }
    }

    /// Get format name for logging
    pub fn name(self) -> &'static str {
        match self {
            FormatTag::BC1 => "BC1",
            FormatTag::BC2 => "BC2",
            FormatTag::BC3 => "BC3",
            FormatTag::BC4 => "BC4",
            FormatTag::BC5 => "BC5",
            FormatTag::BC6H => "BC6H",
            FormatTag::BC7 => "BC7",
            FormatTag::Unknown => "unknown",
        }
    }

    pub fn is_known(self) -> bool {
        self != FormatTag::Unknown
    }
}

impl fmt::Display for FormatTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_each_token() {
        assert_eq!(classify(Some("BC1_UNORM")), FormatTag::BC1);
        assert_eq!(classify(Some("BC2_UNORM")), FormatTag::BC2);
        assert_eq!(classify(Some("BC3_UNORM")), FormatTag::BC3);
        assert_eq!(classify(Some("BC4_SNORM")), FormatTag::BC4);
        assert_eq!(classify(Some("BC5_UNORM")), FormatTag::BC5);
        assert_eq!(classify(Some("BC6H_UFLOAT")), FormatTag::BC6H);
        assert_eq!(classify(Some("BC6_SFLOAT")), FormatTag::BC6H);
        assert_eq!(classify(Some("BC7_UNORM_SRGB")), FormatTag::BC7);
    }

    #[test]
    fn test_classify_vulkan_names() {
        assert_eq!(classify(Some("VK_FORMAT_BC1_RGBA_UNORM_BLOCK")), FormatTag::BC1);
        assert_eq!(classify(Some("VK_FORMAT_BC3_SRGB_BLOCK")), FormatTag::BC3);
        assert_eq!(classify(Some("VK_FORMAT_BC6H_UFLOAT_BLOCK")), FormatTag::BC6H);
    }

    #[test]
    fn test_classify_empty_and_absent() {
        assert_eq!(classify(None), FormatTag::Unknown);
        assert_eq!(classify(Some("")), FormatTag::Unknown);
        assert_eq!(classify(Some("R8G8B8A8_UNORM")), FormatTag::Unknown);
    }

    #[test]
    fn test_classify_is_case_sensitive() {
        assert_eq!(classify(Some("bc1_unorm")), FormatTag::Unknown);
        assert_eq!(classify(Some("Bc3")), FormatTag::Unknown);
    }

    #[test]
    fn test_classify_priority_on_overlap() {
        // Earlier token wins regardless of position in the string
        assert_eq!(classify(Some("BC7_AS_BC3")), FormatTag::BC3);
        assert_eq!(classify(Some("BC5BC1")), FormatTag::BC1);
        // "BC10" contains "BC1"
        assert_eq!(classify(Some("BC10_FUTURE")), FormatTag::BC1);
        // "BC99" contains nothing in the table
        assert_eq!(classify(Some("BC99_UNKNOWN")), FormatTag::Unknown);
    }

    #[test]
    fn test_classify_is_stable() {
        let a = classify(Some("BC4_UNORM"));
        let b = classify(Some("BC4_UNORM"));
        assert_eq!(a, b);
    }

    #[test]
    fn test_asset_file_names() {
        assert_eq!(FormatTag::BC1.asset_file_name(), Some("bc1.spv"));
        assert_eq!(FormatTag::BC6H.asset_file_name(), Some("bc6h.spv"));
        assert_eq!(FormatTag::Unknown.asset_file_name(), None);
        for tag in ALL_BC_TAGS {
            assert!(tag.asset_file_name().is_some());
            assert!(tag.is_known());
        }
    }
}
