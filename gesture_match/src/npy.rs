//! Minimal NumPy `.npy` codec for 63-value landmark records.
//!
//! Only what exemplar files need: little-endian `f8` (and `f4` on read),
//! C order, shape `(63,)` or `(21, 3)`.
//!
//! ```text
//!  offset  0         6      7      8          10                 10+H
//!          │ \x93NUMPY │ major │ minor │ H: u16 LE │ dict + pad + '\n' │ 63 × f64 LE
//! ```
//!
//! `10 + H` is always a multiple of 64.
//!
//! Version 2.0 differs only in a 4-byte header length.  Files that are not
//! `.npy` at all but exactly 504 bytes long are read as a bare array of 63
//! little-endian doubles.

use thiserror::Error;

use hand_pose::COMPONENT_COUNT;

const MAGIC: &[u8; 6] = b"\x93NUMPY";
const ALIGN: usize = 64;

/// Size of a headerless record.
pub const RAW_LEN: usize = COMPONENT_COUNT * 8;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("not an .npy file and not a 504-byte raw record ({found} bytes)")]
    BadMagic { found: usize },

    #[error("unsupported .npy version {major}.{minor}")]
    UnsupportedVersion { major: u8, minor: u8 },

    #[error("truncated: need {needed} bytes, found {found}")]
    Truncated { needed: usize, found: usize },

    #[error("malformed header: {0}")]
    Header(String),

    #[error("unsupported dtype {0:?} (want little-endian f8 or f4)")]
    Dtype(String),

    #[error("unsupported shape {0:?} (want (63,) or (21, 3))")]
    Shape(Vec<usize>),
}

// ════════════════════════════════════════════════════════════════════════════
// Encode
// ════════════════════════════════════════════════════════════════════════════

/// Serialise 63 values as an `.npy` v1.0 file.
pub fn encode(values: &[f64; COMPONENT_COUNT]) -> Vec<u8> {
    let mut header = format!(
        "{{'descr': '<f8', 'fortran_order': False, 'shape': ({},), }}",
        COMPONENT_COUNT
    );
    // Pad with spaces so that magic + version + len + header + '\n' is a
    // multiple of ALIGN.
    let unpadded = MAGIC.len() + 2 + 2 + header.len() + 1;
    let pad = (ALIGN - unpadded % ALIGN) % ALIGN;
    header.extend(std::iter::repeat(' ').take(pad));
    header.push('\n');

    let mut out = Vec::with_capacity(10 + header.len() + RAW_LEN);
    out.extend_from_slice(MAGIC);
    out.push(1); // major
    out.push(0); // minor
    out.extend_from_slice(&(header.len() as u16).to_le_bytes());
    out.extend_from_slice(header.as_bytes());
    for v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
    out
}

// ════════════════════════════════════════════════════════════════════════════
// Decode
// ════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Dtype { F8, F4 }

impl Dtype {
    fn width(self) -> usize {
        match self { Dtype::F8 => 8, Dtype::F4 => 4 }
    }
}

/// Parse an `.npy` file (or a raw 504-byte record) into 63 values.
pub fn decode(bytes: &[u8]) -> Result<[f64; COMPONENT_COUNT], CodecError> {
    if !bytes.starts_with(MAGIC) {
        if bytes.len() == RAW_LEN {
            return read_values(bytes, Dtype::F8);
        }
        return Err(CodecError::BadMagic { found: bytes.len() });
    }

    let need = |n: usize| if bytes.len() < n {
        Err(CodecError::Truncated { needed: n, found: bytes.len() })
    } else {
        Ok(())
    };

    need(8)?;
    let (major, minor) = (bytes[6], bytes[7]);
    let (header_start, header_len) = match major {
        1 => {
            need(10)?;
            (10, u16::from_le_bytes([bytes[8], bytes[9]]) as usize)
        }
        2 | 3 => {
            need(12)?;
            (12, u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize)
        }
        _ => return Err(CodecError::UnsupportedVersion { major, minor }),
    };
    let data_start = header_start + header_len;
    need(data_start)?;

    let header = std::str::from_utf8(&bytes[header_start..data_start])
        .map_err(|_| CodecError::Header("not ASCII".into()))?;
    let dtype = parse_dtype(header)?;
    let shape = parse_shape(header)?;
    // Irrelevant for 1-D, a transpose for (21, 3).
    if dict_value(header, "fortran_order")?.starts_with("True") && shape.len() > 1 {
        return Err(CodecError::Header("fortran_order arrays not supported".into()));
    }
    let count: usize = shape.iter().product();
    let shape_ok = matches!(shape.as_slice(), [63] | [21, 3]);
    if !shape_ok || count != COMPONENT_COUNT {
        return Err(CodecError::Shape(shape));
    }

    let data = &bytes[data_start..];
    let needed = COMPONENT_COUNT * dtype.width();
    if data.len() < needed {
        return Err(CodecError::Truncated { needed: data_start + needed, found: bytes.len() });
    }
    read_values(&data[..needed], dtype)
}

fn read_values(data: &[u8], dtype: Dtype) -> Result<[f64; COMPONENT_COUNT], CodecError> {
    let mut out = [0.0; COMPONENT_COUNT];
    let w = dtype.width();
    if data.len() < COMPONENT_COUNT * w {
        return Err(CodecError::Truncated { needed: COMPONENT_COUNT * w, found: data.len() });
    }
    for (i, chunk) in data.chunks_exact(w).take(COMPONENT_COUNT).enumerate() {
        out[i] = match dtype {
            Dtype::F8 => {
                let mut b = [0u8; 8];
                b.copy_from_slice(chunk);
                f64::from_le_bytes(b)
            }
            Dtype::F4 => {
                let mut b = [0u8; 4];
                b.copy_from_slice(chunk);
                f32::from_le_bytes(b) as f64
            }
        };
    }
    Ok(out)
}

// ── header dict scraping ──────────────────────────────────────────────────
//
// The header is a Python dict literal written by numpy; the three keys are
// always present.  Values are located textually rather than parsed as Python.

/// Text immediately after `'key':`, leading whitespace trimmed.
fn dict_value<'a>(header: &'a str, key: &str) -> Result<&'a str, CodecError> {
    let pat = format!("'{}':", key);
    let at = header.find(&pat)
        .ok_or_else(|| CodecError::Header(format!("missing key '{}'", key)))?;
    Ok(header[at + pat.len()..].trim_start())
}

fn parse_dtype(header: &str) -> Result<Dtype, CodecError> {
    let v = dict_value(header, "descr")?;
    let descr = v.strip_prefix('\'')
        .and_then(|rest| rest.split('\'').next())
        .ok_or_else(|| CodecError::Header("descr is not a string".into()))?;
    match descr {
        "<f8" => Ok(Dtype::F8),
        "<f4" => Ok(Dtype::F4),
        other => Err(CodecError::Dtype(other.to_string())),
    }
}

fn parse_shape(header: &str) -> Result<Vec<usize>, CodecError> {
    let v = dict_value(header, "shape")?;
    let inner = v.strip_prefix('(')
        .and_then(|rest| rest.split(')').next())
        .ok_or_else(|| CodecError::Header("shape is not a tuple".into()))?;
    inner.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse::<usize>()
            .map_err(|_| CodecError::Header(format!("bad shape entry {:?}", s))))
        .collect()
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
