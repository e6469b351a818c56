//! Pseudo receipt ids.
//!
//! Exports carry no receipt number, so a receipt is identified by
//! (member, store, date, time). The id is a 32-bit polynomial hash of that key
//! with the date and time digits appended; the suffix makes two different keys
//! collide only if they also share a date and time.
//!
//! Such collisions do happen (`"Aa"` and `"BB"` hash alike), so a load runs every
//! id through [`ReceiptIds`], which keeps ids unique per key.

use std::collections::HashMap;

/// `R<hex hash>_<date digits>_<time digits>`, e.g. `R1a2b3c4d_20240105_130500`.
pub fn synthesize(member: &str, store: &str, date: &str, time: &str) -> String {
    let base = format!("{member}|{store}|{date} {time}");
    format!("R{:x}_{}_{}", rolling_hash(&base), digits(date), digits(time))
}

/// `h = h * 31 + unit (mod 2^32)` over UTF-16 code units.
pub fn rolling_hash(s: &str) -> u32 {
    s.encode_utf16()
        .fold(0u32, |h, unit| h.wrapping_mul(31).wrapping_add(u32::from(unit)))
}

fn digits(s: &str) -> String {
    s.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Receipt ids handed out during one load.
///
/// The first key to produce an id keeps it. A later, different key with the same
/// id gets `-2`, `-3`, ... appended in order of first appearance.
#[derive(Debug, Default)]
pub struct ReceiptIds {
    owners: HashMap<String, Vec<[String; 4]>>,
}

impl ReceiptIds {
    pub fn new() -> Self {
        Self::default()
    }

    /// Id for the (member, store, date, time) `key` that synthesized `id`.
    pub fn claim(&mut self, id: String, key: [&str; 4]) -> String {
        let owners = self.owners.entry(id.clone()).or_default();
        let (slot, fresh) = match owners.iter().position(|k| k.iter().zip(key).all(|(a, b)| a == b)) {
            Some(slot) => (slot, false),
            None => {
                owners.push(key.map(String::from));
                (owners.len() - 1, true)
            }
        };
        if slot == 0 {
            return id;
        }
        let unique = format!("{id}-{}", slot + 1);
        if fresh {
            log::warn!(
                "receipt id {id} collides for member {} store {} at {} {}; using {unique}",
                key[0],
                key[1],
                key[2],
                key[3]
            );
        }
        unique
    }
}
