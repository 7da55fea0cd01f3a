//! PNG textual metadata (`tEXt` and uncompressed `iTXt` chunks).
//!
//! Screenshot tools and most editors write a `Description` or `Title`
//! keyword; that plays the role IPTC Caption-Abstract plays for JPEG.
//! Compressed text (`zTXt`, compressed `iTXt`) is ignored.

const PNG_SIGNATURE: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

/// Text fields found in a PNG.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PngText {
    pub description: Option<String>,
    pub title: Option<String>,
}

impl PngText {
    /// Description, falling back to the title.
    pub fn caption(self) -> Option<String> {
        self.description.or(self.title)
    }
}

/// Scan PNG chunks for `Description` and `Title` keywords.
pub fn read_png_text(data: &[u8]) -> PngText {
    let mut result = PngText::default();
    if !data.starts_with(PNG_SIGNATURE) {
        return result;
    }

    let mut pos = PNG_SIGNATURE.len();
    while pos + 8 <= data.len() {
        let length =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        let kind = &data[pos + 4..pos + 8];
        let start = pos + 8;
        let Some(end) = start.checked_add(length).filter(|&e| e <= data.len()) else {
            break;
        };
        let body = &data[start..end];

        let entry = match kind {
            b"tEXt" => parse_text(body),
            b"iTXt" => parse_itxt(body),
            b"IEND" => break,
            _ => None,
        };
        if let Some((keyword, value)) = entry {
            let value = value.trim().to_string();
            if !value.is_empty() {
                match keyword.as_str() {
                    "Description" => result.description = Some(value),
                    "Title" => result.title = Some(value),
                    _ => {}
                }
            }
        }

        // data + 4-byte CRC
        pos = end + 4;
    }

    result
}

/// `keyword \0 text`, both Latin-1.
fn parse_text(body: &[u8]) -> Option<(String, String)> {
    let nul = body.iter().position(|&b| b == 0)?;
    Some((latin1(&body[..nul]), latin1(&body[nul + 1..])))
}

/// `keyword \0 flag method language \0 translated \0 text`, text UTF-8.
fn parse_itxt(body: &[u8]) -> Option<(String, String)> {
    let nul = body.iter().position(|&b| b == 0)?;
    let keyword = latin1(&body[..nul]);
    let rest = body.get(nul + 1..)?;
    let (&compressed, rest) = rest.split_first()?;
    if compressed != 0 {
        return None;
    }
    let rest = rest.get(1..)?;
    let lang_end = rest.iter().position(|&b| b == 0)?;
    let rest = &rest[lang_end + 1..];
    let translated_end = rest.iter().position(|&b| b == 0)?;
    let text = &rest[translated_end + 1..];
    Some((keyword, String::from_utf8_lossy(text).into_owned()))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| b as char).collect()
}
