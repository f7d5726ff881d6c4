//! Text encoding of exports and day files.
//!
//! Labels follow the WHATWG Encoding Standard (`utf-8`, `windows-1252`,
//! `utf-16le`, ...). Decoding is strict: an export that is not valid in the
//! requested encoding is rejected rather than silently repaired, since the
//! day files must reproduce it byte for byte.
//!
//! `encoding_rs` has no UTF-16 encoder, so UTF-16LE/BE output is produced
//! from `str::encode_utf16`. Day files never start with a byte order mark.

use std::borrow::Cow;
use std::fs;
use std::path::Path;

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE};
use tracing::warn;

use crate::error::{ChatminutesError, Result};

/// Resolves an encoding label.
///
/// # Example
///
/// ```rust
/// use chatminutes::encoding::resolve;
///
/// assert_eq!(resolve("utf8").unwrap().name(), "UTF-8");
/// assert_eq!(resolve("latin1").unwrap().name(), "windows-1252");
/// assert!(resolve("klingon").is_err());
/// ```
pub fn resolve(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| ChatminutesError::unknown_encoding(label))
}

/// Decodes `bytes` read from `path`.
///
/// A leading byte order mark is dropped when it agrees with `encoding`.
pub fn decode(bytes: &[u8], encoding: &'static Encoding, path: &Path) -> Result<String> {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };
    encoding
        .decode_without_bom_handling_and_without_replacement(body)
        .map(Cow::into_owned)
        .ok_or_else(|| ChatminutesError::decode(path, encoding.name()))
}

/// Reads a whole export as text.
pub fn read_export(path: &Path, encoding: &'static Encoding) -> Result<String> {
    let bytes =
        fs::read(path).map_err(|e| ChatminutesError::input_read(path, encoding.name(), e))?;
    decode(&bytes, encoding, path)
}

/// Encodes text for a day file.
pub fn encode<'a>(text: &'a str, encoding: &'static Encoding) -> Cow<'a, [u8]> {
    if encoding == UTF_16LE {
        return Cow::Owned(text.encode_utf16().flat_map(u16::to_le_bytes).collect());
    }
    if encoding == UTF_16BE {
        return Cow::Owned(text.encode_utf16().flat_map(u16::to_be_bytes).collect());
    }

    let (bytes, used, had_unmappable) = encoding.encode(text);
    if used != encoding {
        warn!(
            requested = encoding.name(),
            used = used.name(),
            "output encoding not supported for writing, falling back"
        );
    }
    if had_unmappable {
        warn!(
            encoding = used.name(),
            "characters not representable in output encoding were replaced"
        );
    }
    bytes
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_utf8_strips_bom() {
        let bytes = b"\xEF\xBB\xBF10/18/22, 09:00 - Alice: hi\n";
        let text = decode(bytes, encoding_rs::UTF_8, Path::new("chat.txt")).unwrap();
        assert!(text.starts_with("10/18/22"));
    }

    #[test]
    fn test_decode_rejects_malformed() {
        let err = decode(b"caf\xE9\n", encoding_rs::UTF_8, Path::new("chat.txt")).unwrap_err();
        assert!(matches!(err, ChatminutesError::Decode { encoding: "UTF-8", .. }));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_windows_1252_round_trip() {
        let enc = resolve("windows-1252").unwrap();
        let text = decode(b"caf\xE9\n", enc, Path::new("chat.txt")).unwrap();
        assert_eq!(text, "café\n");
        assert_eq!(encode(&text, enc).as_ref(), b"caf\xE9\n");
    }

    #[test]
    fn test_utf16le_input() {
        let enc = resolve("utf-16le").unwrap();
        let bytes: Vec<u8> = "\u{feff}hi\n"
            .encode_utf16()
            .flat_map(u16::to_le_bytes)
            .collect();
        assert_eq!(decode(&bytes, enc, Path::new("chat.txt")).unwrap(), "hi\n");
    }

    #[test]
    fn test_utf16_output() {
        assert_eq!(encode("hé\n", UTF_16LE).as_ref(), b"h\0\xE9\0\n\0");
        assert_eq!(encode("hé\n", UTF_16BE).as_ref(), b"\0h\0\xE9\0\n");
        // Characters outside the BMP become surrogate pairs
        assert_eq!(encode("😀", UTF_16LE).as_ref(), b"\x3D\xD8\x00\xDE");
    }

    #[test]
    fn test_read_export_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_export(&dir.path().join("missing.txt"), encoding_rs::UTF_8).unwrap_err();
        assert!(matches!(
            err,
            ChatminutesError::InputNotFound {
                encoding: "UTF-8",
                ..
            }
        ));
        assert!(err.to_string().contains("UTF-8"));
    }
}
