//! Bounded diagnostic rendering for `Message`.
//!
//! Output is best-effort and not meant to be parsed back. Every piece that
//! can grow with the message (payload, property values, property count, the
//! whole string) is cut off at a `DisplayLimits` bound, and formatting stops
//! as soon as the total bound is hit instead of building the full text first.

use std::fmt::{self, Write};

use sdtmsg_core::error::{MessageError, Result};
use sdtmsg_core::sdt::Data;

use super::Message;
use crate::native::{PayloadKind, StringField};

/// `fmt::Write` sink that accepts at most `limit` chars, then refuses.
struct Bounded {
    buf: String,
    limit: usize,
    used: usize,
    truncated: bool,
}

impl Bounded {
    fn new(limit: usize) -> Self {
        Self {
            buf: String::new(),
            limit,
            used: 0,
            truncated: false,
        }
    }

    fn finish(mut self) -> String {
        if self.truncated {
            self.buf.push_str("...");
        }
        self.buf
    }
}

impl Write for Bounded {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        if self.truncated {
            return Err(fmt::Error);
        }
        let room = self.limit - self.used;
        match s.char_indices().nth(room) {
            None => {
                self.used += s.chars().count();
                self.buf.push_str(s);
                Ok(())
            }
            Some((cut, _)) => {
                self.buf.push_str(&s[..cut]);
                self.used = self.limit;
                self.truncated = true;
                Err(fmt::Error)
            }
        }
    }
}

/// Render `v` into at most `limit` chars (plus a `...` marker when cut).
fn bounded<T: fmt::Display + ?Sized>(v: &T, limit: usize) -> String {
    let mut out = Bounded::new(limit);
    let _ = write!(out, "{v}");
    out.finish()
}

/// Unwrap an accessor result for display; faults are shown inline.
fn shown<T>(
    res: Result<T>,
    w: &mut Bounded,
    f: impl FnOnce(&mut Bounded, T) -> fmt::Result,
) -> fmt::Result {
    match res {
        Ok(v) => f(w, v),
        Err(e) => write!(w, "<fault: {}>", e.code().as_str()),
    }
}

/// Longest UTF-8 prefix of `raw` that still holds more than `max_chars`
/// chars when `raw` does. A char split by the cut is dropped; invalid bytes
/// inside the prefix are a fault.
fn utf8_prefix(raw: &[u8], max_chars: usize) -> Result<&str> {
    let cut = &raw[..raw.len().min(max_chars.saturating_add(1).saturating_mul(4))];
    let valid = match std::str::from_utf8(cut) {
        Ok(s) => return Ok(s),
        Err(e) if e.error_len().is_none() && cut.len() < raw.len() => e.valid_up_to(),
        Err(e) => {
            return Err(MessageError::Corrupt(format!("text payload is not utf-8: {e}")));
        }
    };
    std::str::from_utf8(&cut[..valid])
        .map_err(|e| MessageError::Corrupt(format!("text payload is not utf-8: {e}")))
}

impl Message {
    fn render_into(&self, w: &mut Bounded) -> fmt::Result {
        if self.is_disposed() {
            return w.write_str("Message { disposed }");
        }
        let limits = self.limits;

        w.write_str("Message {")?;
        for field in StringField::ALL {
            shown(self.string_field(field), w, |w, v| match v {
                Some(s) => {
                    let s = bounded(&s, limits.max_string_chars);
                    write!(w, " {}: {s:?},", field.as_str())
                }
                None => Ok(()),
            })?;
        }
        shown(self.sequence_number(), w, |w, v| match v {
            Some(n) => write!(w, " sequence_number: {n},"),
            None => Ok(()),
        })?;
        shown(self.priority(), w, |w, v| match v {
            Some(p) => write!(w, " priority: {p},"),
            None => Ok(()),
        })?;
        w.write_str(" class_of_service: ")?;
        shown(self.class_of_service(), w, |w, c| write!(w, "{},", c.as_u8()))?;
        w.write_str(" expiration: ")?;
        shown(self.expiration(), w, |w, e| write!(w, "{e},"))?;

        w.write_str(" properties: ")?;
        shown(self.head_properties(limits.max_properties), w, |w, head| {
            let (total, props) = head.unwrap_or_default();
            write!(w, "({total}) {{")?;
            for (i, (k, v)) in props.iter().enumerate() {
                if i > 0 {
                    w.write_str(", ")?;
                }
                let k = bounded(k, limits.max_string_chars);
                write!(w, "{k:?}: {}", bounded(v, limits.max_string_chars))?;
            }
            if total > props.len() {
                write!(w, ", ... ({} more)", total - props.len())?;
            }
            w.write_str("},")
        })?;

        w.write_str(" payload: ")?;
        shown(self.payload_kind(), w, |w, kind| self.render_payload(kind, w))?;
        w.write_str(" }")
    }

    /// Property count plus the first `max` properties, decoded under one
    /// read guard. The rest are never fetched.
    fn head_properties(&self, max: usize) -> Result<Option<(usize, Vec<(String, Data)>)>> {
        self.handle.with_live(|n| {
            let keys = n.property_keys()?;
            let mut head = Vec::with_capacity(keys.len().min(max));
            for key in keys.iter().take(max) {
                if let Some(raw) = n.property(key)? {
                    head.push((key.clone(), self.decoder.decode_data(&raw)?));
                }
            }
            Ok((keys.len(), head))
        })
    }

    fn render_payload(&self, kind: PayloadKind, w: &mut Bounded) -> fmt::Result {
        let limits = self.limits;
        let label = kind.as_str();
        match kind {
            PayloadKind::None => w.write_str(label),
            PayloadKind::Bytes => shown(self.payload_as_bytes(), w, |w, b| {
                let b = b.unwrap_or_default();
                let head = &b[..b.len().min(limits.max_payload_bytes)];
                write!(w, "{label}[{}] {}", b.len(), hex::encode(head))?;
                if head.len() < b.len() {
                    w.write_str("...")?;
                }
                Ok(())
            }),
            PayloadKind::Text => {
                let head = self.read_payload(|_, raw| {
                    utf8_prefix(&raw, limits.max_string_chars)
                        .map(|s| Some((raw.len(), bounded(s, limits.max_string_chars))))
                });
                shown(head, w, |w, head| {
                    let (len, s) = head.unwrap_or_default();
                    write!(w, "{label}[{len}] {s:?}")
                })
            }
            // decoders have no partial mode; the decoded value is cut when printed
            PayloadKind::Map => shown(self.payload_as_map(), w, |w, m| {
                let m = m.unwrap_or_default();
                write!(w, "{label}({}) {}", m.len(), bounded(&m, limits.max_string_chars))
            }),
            PayloadKind::Stream => shown(self.payload_as_stream(), w, |w, s| {
                let s = s.unwrap_or_default();
                write!(w, "{label}({}) {}", s.len(), bounded(&s, limits.max_string_chars))
            }),
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = Bounded::new(self.limits.max_total_chars);
        // Err here only means the bound was hit; keep what fit.
        let _ = self.render_into(&mut out);
        f.write_str(&out.finish())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounded_cuts_at_char_boundary() {
        assert_eq!(bounded("héllo wörld", 4), "héll...");
        assert_eq!(bounded("abc", 3), "abc");
        assert_eq!(bounded("abc", 10), "abc");
    }

    #[test]
    fn bounded_stops_accepting_after_limit() {
        let mut b = Bounded::new(5);
        assert!(b.write_str("abc").is_ok());
        assert!(b.write_str("defg").is_err());
        assert!(b.write_str("more").is_err());
        assert_eq!(b.finish(), "abcde...");
    }

    #[test]
    fn utf8_prefix_reads_only_the_head() {
        let raw = "ab".repeat(1000);
        let head = utf8_prefix(raw.as_bytes(), 3).unwrap();
        assert_eq!(head, "ab".repeat(8));
        assert_eq!(bounded(head, 3), "aba...");
        assert_eq!(utf8_prefix(b"short", 100).unwrap(), "short");
    }

    #[test]
    fn utf8_prefix_drops_a_split_char() {
        let raw = format!("a{}", "é".repeat(100));
        let head = utf8_prefix(raw.as_bytes(), 2).unwrap();
        assert_eq!(head, format!("a{}", "é".repeat(5)));
    }

    #[test]
    fn utf8_prefix_rejects_invalid_bytes() {
        let err = utf8_prefix(&[b'a', 0xff, b'b'], 10).unwrap_err();
        assert_eq!(err.code().as_str(), "CORRUPT");
        // a truncated char at the very end of the whole payload is corrupt too
        let err = utf8_prefix(&[b'a', 0xc3], 10).unwrap_err();
        assert_eq!(err.code().as_str(), "CORRUPT");
    }
}
