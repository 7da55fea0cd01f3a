//! Minimal IPTC-IIM reader for JPEG files.
//!
//! Extracts two fields from IPTC Record 2:
//! - Caption-Abstract (2:120), the "Caption" field in Lightroom
//! - ObjectName (2:05), the "Title" field
//!
//! JPEG stores them in the APP13 marker, inside Photoshop 8BIM resource
//! 0x0404.

/// IPTC fields we care about.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IptcData {
    pub object_name: Option<String>,
    pub caption: Option<String>,
}

impl IptcData {
    /// Caption, falling back to the object name.
    pub fn description(self) -> Option<String> {
        self.caption.or(self.object_name)
    }
}

/// Read IPTC fields from JPEG bytes. Returns empty data when there is no
/// APP13/IPTC block or it cannot be parsed.
pub fn read_iptc_from_jpeg(data: &[u8]) -> IptcData {
    match find_jpeg_app13_iptc(data) {
        Some(iptc_bytes) => parse_iptc_iim(iptc_bytes),
        None => IptcData::default(),
    }
}

/// Parse raw IPTC-IIM datasets.
///
/// Each dataset:
///   Byte 0:    0x1C (tag marker)
///   Byte 1:    Record number (we want 0x02)
///   Byte 2:    Dataset number (0x05=ObjectName, 0x78=Caption)
///   Bytes 3-4: Data length (big-endian u16)
///   Bytes 5+:  Data
fn parse_iptc_iim(data: &[u8]) -> IptcData {
    let mut result = IptcData::default();
    let mut pos = 0;

    while pos + 5 <= data.len() {
        if data[pos] != 0x1C {
            pos += 1;
            continue;
        }

        let record = data[pos + 1];
        let dataset = data[pos + 2];
        let length = u16::from_be_bytes([data[pos + 3], data[pos + 4]]) as usize;
        pos += 5;

        if pos + length > data.len() {
            break;
        }

        if record == 2 {
            let value = String::from_utf8_lossy(&data[pos..pos + length])
                .trim()
                .to_string();
            if !value.is_empty() {
                match dataset {
                    5 => result.object_name = Some(value),
                    120 => result.caption = Some(value),
                    _ => {}
                }
            }
        }

        pos += length;
    }

    result
}

const PHOTOSHOP_HEADER: &[u8] = b"Photoshop 3.0\0";
const BIM_MARKER: &[u8] = b"8BIM";
const IPTC_RESOURCE_ID: u16 = 0x0404;

/// Find the IPTC-IIM bytes inside a JPEG's APP13 segment.
fn find_jpeg_app13_iptc(data: &[u8]) -> Option<&[u8]> {
    if !data.starts_with(&[0xFF, 0xD8]) {
        return None;
    }
    let mut pos = 2;
    while pos + 4 <= data.len() {
        if data[pos] != 0xFF {
            pos += 1;
            continue;
        }
        let marker = data[pos + 1];
        match marker {
            // Fill byte
            0xFF => {
                pos += 1;
                continue;
            }
            // Start of scan: entropy-coded data follows, no more metadata
            0xDA | 0xD9 => break,
            0x01 | 0xD0..=0xD7 => {
                pos += 2;
                continue;
            }
            _ => {}
        }

        let seg_len = u16::from_be_bytes([data[pos + 2], data[pos + 3]]) as usize;
        if seg_len < 2 {
            break;
        }
        let seg_end = (pos + 2 + seg_len).min(data.len());
        if marker == 0xED {
            if let Some(iptc) = extract_iptc_from_8bim(&data[pos + 4..seg_end]) {
                return Some(iptc);
            }
        }
        pos += 2 + seg_len;
    }
    None
}

/// Pull resource 0x0404 out of a Photoshop 8BIM resource block.
fn extract_iptc_from_8bim(segment: &[u8]) -> Option<&[u8]> {
    let data = segment.strip_prefix(PHOTOSHOP_HEADER).unwrap_or(segment);

    let mut pos = 0;
    while pos + 12 <= data.len() {
        // "8BIM" (4) + resource_id (2) + pascal string + data_len (4) + data
        if &data[pos..pos + 4] != BIM_MARKER {
            pos += 1;
            continue;
        }
        pos += 4;

        let resource_id = u16::from_be_bytes([data[pos], data[pos + 1]]);
        pos += 2;

        // Pascal string, padded to an even total length
        let pascal_len = data[pos] as usize;
        pos += 1 + pascal_len + ((1 + pascal_len) % 2);

        if pos + 4 > data.len() {
            break;
        }
        let res_len =
            u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]]) as usize;
        pos += 4;

        if pos + res_len > data.len() {
            break;
        }
        if resource_id == IPTC_RESOURCE_ID {
            return Some(&data[pos..pos + res_len]);
        }
        pos += res_len + (res_len % 2);
    }

    None
}
