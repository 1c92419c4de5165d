//! Product version lookup in PE version resources.
//!
//! The `StringFileInfo` block stores `ProductVersion` as a NUL-terminated
//! UTF-16LE key, zero padding, then the NUL-terminated UTF-16LE value.

use encoding_rs::UTF_16LE;
use memchr::memmem;

const PRODUCT_VERSION_KEY: &str = "ProductVersion";
const MAX_VALUE_UNITS: usize = 64;

fn utf16le(text: &str) -> Vec<u8> {
    text.encode_utf16().flat_map(u16::to_le_bytes).collect()
}

fn unit_at(bytes: &[u8], offset: usize) -> Option<u16> {
    let pair = bytes.get(offset..offset + 2)?;
    Some(u16::from_le_bytes([pair[0], pair[1]]))
}

/// First non-empty `ProductVersion` value in `bytes`.
pub fn product_version(bytes: &[u8]) -> Option<String> {
    let mut needle = utf16le(PRODUCT_VERSION_KEY);
    needle.extend_from_slice(&[0, 0]);

    for start in memmem::find_iter(bytes, &needle) {
        let mut offset = start + needle.len();
        while unit_at(bytes, offset) == Some(0) {
            offset += 2;
        }

        let value_start = offset;
        while let Some(unit) = unit_at(bytes, offset) {
            if unit == 0 || offset - value_start == MAX_VALUE_UNITS * 2 {
                break;
            }
            offset += 2;
        }

        let raw = &bytes[value_start..offset];
        let Some(value) = UTF_16LE.decode_without_bom_handling_and_without_replacement(raw) else {
            continue;
        };
        let value = value.trim();
        if !value.is_empty() && value.chars().all(|c| !c.is_control()) {
            return Some(value.to_string());
        }
    }
    None
}

#[cfg(test)]
pub(crate) fn version_resource(version: &str) -> Vec<u8> {
    let mut bytes = b"MZ\x90\x00fake header".to_vec();
    bytes.extend(utf16le("CompanyName"));
    bytes.extend([0, 0, 0, 0]);
    bytes.extend(utf16le("The PHP Group"));
    bytes.extend([0, 0]);
    bytes.extend(utf16le(PRODUCT_VERSION_KEY));
    bytes.extend([0, 0, 0, 0]);
    bytes.extend(utf16le(version));
    bytes.extend([0, 0, 0, 0]);
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_version_found() {
        assert_eq!(
            product_version(&version_resource("7.4.33")),
            Some("7.4.33".to_string())
        );
    }

    #[test]
    fn test_product_version_missing() {
        assert_eq!(product_version(b"MZ no resources here"), None);
        let mut empty = utf16le(PRODUCT_VERSION_KEY);
        empty.extend([0, 0]);
        assert_eq!(product_version(&empty), None);
    }
}
