//! Quote-aware comma-separated tokenizer.
//!
//! Exports from the supported chains are not always RFC 4180 clean (bare `\r`,
//! quotes opened mid-field, ragged rows), so this is a small hand-written state
//! machine rather than a strict CSV reader:
//!
//! - `"` outside a quoted field opens quoting, even mid-field
//! - `""` inside a quoted field is a literal quote
//! - `,` and `\n` inside quotes are field content
//! - `\r` outside quotes is discarded
//! - a wholly blank line is dropped
//! - an unterminated final field/row is still emitted
//! - a leading BOM on the first cell is stripped

const BOM: char = '\u{FEFF}';

pub type Grid = Vec<Vec<String>>;

/// Tokenize `text` into rows of cells.
pub fn tokenize(text: &str) -> Grid {
    let mut rows: Grid = Vec::new();
    let mut row: Vec<String> = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            if c == '"' {
                if chars.peek() == Some(&'"') {
                    chars.next();
                    field.push('"');
                } else {
                    in_quotes = false;
                }
            } else {
                field.push(c);
            }
            continue;
        }

        match c {
            '"' => in_quotes = true,
            ',' => row.push(std::mem::take(&mut field)),
            '\n' => {
                row.push(std::mem::take(&mut field));
                push_row(&mut rows, std::mem::take(&mut row));
            }
            '\r' => {}
            _ => field.push(c),
        }
    }

    if !field.is_empty() || !row.is_empty() {
        row.push(field);
        push_row(&mut rows, row);
    }

    if let Some(first) = rows.first_mut().and_then(|r| r.first_mut()) {
        if first.starts_with(BOM) {
            first.remove(0);
        }
    }

    rows
}

fn push_row(rows: &mut Grid, row: Vec<String>) {
    let blank = row.len() == 1 && row[0].is_empty();
    if !blank {
        rows.push(row);
    }
}
