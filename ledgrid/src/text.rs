//! Source-literal text form of a [`ByteMatrix`], for pasting into firmware.

use crate::error::FrameError;
use crate::pack::ByteMatrix;

/// Declaration used when rendering a byte matrix as a C array literal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CArray {
    pub ty: String,
    pub name: String,
}

impl Default for CArray {
    fn default() -> Self {
        Self {
            ty: "uint8_t".to_string(),
            name: "frame".to_string(),
        }
    }
}

impl CArray {
    pub fn new(ty: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            ty: ty.into(),
            name: name.into(),
        }
    }

    /// Render as `type name[rows][registers] = { {..}, .. };`, one row per line.
    pub fn format(&self, matrix: &ByteMatrix) -> String {
        let rows: Vec<String> = matrix
            .iter_rows()
            .map(|row| {
                let values: Vec<String> = row.iter().map(|v| v.to_string()).collect();
                format!("  {{{}}}", values.join(", "))
            })
            .collect();

        format!(
            "{} {}[{}][{}] = {{\n{}\n}};\n",
            self.ty,
            self.name,
            matrix.rows(),
            matrix.registers(),
            rows.join(",\n")
        )
    }
}

/// Parse a two-dimensional array literal back into a byte matrix.
///
/// Accepts the output of [`CArray::format`] and hand-edited variants of it:
/// any declaration with two `[N]` dimensions, decimal, hex (`0x`) or binary
/// (`0b`) values, and arbitrary whitespace.
pub fn parse_c_array(text: &str) -> Result<ByteMatrix, FrameError> {
    let (decl, body) = text
        .split_once('=')
        .ok_or_else(|| FrameError::Parse("missing '=' in array declaration".into()))?;

    let dims = parse_dims(decl)?;
    let (rows, registers) = match dims.as_slice() {
        [r, s] => (*r, *s),
        _ => {
            return Err(FrameError::Parse(format!(
                "expected two array dimensions, found {}",
                dims.len()
            )))
        }
    };

    let start = body
        .find('{')
        .ok_or_else(|| FrameError::Parse("missing opening brace".into()))?;
    let end = body
        .rfind('}')
        .filter(|&end| end > start)
        .ok_or_else(|| FrameError::Parse("missing closing brace".into()))?;
    let mut rest = &body[start + 1..end];

    if rows.checked_mul(registers).is_none() {
        return Err(FrameError::Parse(format!(
            "array dimensions {rows}x{registers} are too large"
        )));
    }

    // Grows with the values actually present, not the declared size.
    let mut bytes = Vec::new();
    let mut row_count = 0;
    while let Some(open) = rest.find('{') {
        let close = rest[open..]
            .find('}')
            .map(|c| open + c)
            .ok_or_else(|| FrameError::Parse(format!("row {row_count} is not closed")))?;

        let mut width = 0;
        for token in rest[open + 1..close].split(',') {
            let token = token.trim();
            if token.is_empty() {
                continue;
            }
            bytes.push(parse_byte(token)?);
            width += 1;
        }
        if width != registers {
            return Err(FrameError::Parse(format!(
                "row {row_count} has {width} values, expected {registers}"
            )));
        }

        row_count += 1;
        rest = &rest[close + 1..];
    }

    if row_count != rows {
        return Err(FrameError::Parse(format!(
            "found {row_count} rows, declaration says {rows}"
        )));
    }
    ByteMatrix::from_bytes(rows, registers, bytes)
}

fn parse_dims(decl: &str) -> Result<Vec<usize>, FrameError> {
    let mut dims = Vec::new();
    let mut rest = decl;
    while let Some(open) = rest.find('[') {
        let close = rest[open..]
            .find(']')
            .map(|c| open + c)
            .ok_or_else(|| FrameError::Parse("unterminated array dimension".into()))?;
        let dim = rest[open + 1..close].trim();
        let value = dim
            .parse()
            .map_err(|_| FrameError::Parse(format!("invalid array dimension '{dim}'")))?;
        dims.push(value);
        rest = &rest[close + 1..];
    }
    Ok(dims)
}

fn parse_byte(token: &str) -> Result<u8, FrameError> {
    let parsed = if let Some(hex) = token.strip_prefix("0x").or_else(|| token.strip_prefix("0X")) {
        u8::from_str_radix(hex, 16)
    } else if let Some(bin) = token.strip_prefix("0b").or_else(|| token.strip_prefix("0B")) {
        u8::from_str_radix(bin, 2)
    } else {
        token.parse()
    };
    parsed.map_err(|_| FrameError::Parse(format!("'{token}' is not a byte value")))
}
