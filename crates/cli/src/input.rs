//! Export acquisition: file or stdin, decoded to text.

use std::io::Read;
use std::path::Path;

/// Read `path` (or stdin for `-`) as text.
///
/// UTF-8 is tried first (a BOM is kept for the tokenizer to strip). Anything else
/// is decoded as Shift_JIS, the usual encoding of POS exports opened in Excel.
pub fn read_export(path: &Path) -> Result<String, String> {
    let bytes = if path.as_os_str() == "-" {
        let mut buf = Vec::new();
        std::io::stdin()
            .read_to_end(&mut buf)
            .map_err(|e| format!("cannot read stdin: {e}"))?;
        buf
    } else {
        std::fs::read(path).map_err(|e| format!("cannot read {}: {e}", path.display()))?
    };
    Ok(decode(bytes))
}

fn decode(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(s) => s,
        Err(e) => {
            let bytes = e.into_bytes();
            let (decoded, _, had_errors) = encoding_rs::SHIFT_JIS.decode(&bytes);
            if had_errors {
                log::warn!("input is neither UTF-8 nor clean Shift_JIS; undecodable bytes replaced");
            } else {
                log::info!("input decoded as Shift_JIS");
            }
            decoded.into_owned()
        }
    }
}
