//! Payload layouts and the bit-exact record arithmetic that operates on them.
//!
//! A [`Layout`] is an ordered list of named, fixed-width fields. A [`Record`]
//! is a value conforming to some layout. `cat_payload`/`payload_eq`/`cat_dict`
//! are the bit-exact concatenation operations every `Stream` relies on to
//! wire fields together (see `connect` in [`crate::connect`]).
use std::collections::HashMap;
use std::sync::Arc;

use crate::{Error, Result};

/// The practical width ceiling for one concatenated payload (including the
/// two framing bits, when requested). No layout in this corpus needs more;
/// enforcing it lets `cat_payload` return a plain `u128` instead of a bignum.
pub const MAX_CAT_WIDTH: u32 = 128;

/// An ordered list of named, fixed-width payload fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Layout {
    fields: Vec<(String, u32)>,
}

impl Layout {
    /// Construct a layout from `(name, width)` pairs.
    ///
    /// Errors if a name repeats, a field has zero width, or the
    /// concatenated width (flags included) would exceed [`MAX_CAT_WIDTH`].
    pub fn new(fields: Vec<(&str, u32)>) -> Result<Self> {
        let mut seen = std::collections::HashSet::new();
        let mut owned = Vec::with_capacity(fields.len());
        for (name, width) in fields {
            if width == 0 {
                return Err(Error::ZeroWidthField(name.to_string()));
            }
            if !seen.insert(name.to_string()) {
                return Err(Error::DuplicateField(name.to_string()));
            }
            owned.push((name.to_string(), width));
        }
        let total: u32 = owned.iter().map(|(_, w)| w).sum();
        if total + 2 > MAX_CAT_WIDTH {
            return Err(Error::LayoutTooWide(total));
        }
        Ok(Self { fields: owned })
    }

    /// A single field named `data` of the given width — the common case for
    /// width adapters and arithmetic blocks.
    pub fn data(width: u32) -> Result<Self> {
        Self::new(vec![("data", width)])
    }

    /// The ordered `(name, width)` pairs.
    #[must_use]
    pub fn fields(&self) -> &[(String, u32)] {
        &self.fields
    }

    /// Look up a field's bit width.
    pub fn width(&self, name: &str) -> Result<u32> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, w)| *w)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// Look up a field's position in the layout.
    pub fn index_of(&self, name: &str) -> Result<usize> {
        self.fields
            .iter()
            .position(|(n, _)| n == name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))
    }

    /// True if `name` is a field of this layout.
    #[must_use]
    pub fn has_field(&self, name: &str) -> bool {
        self.fields.iter().any(|(n, _)| n == name)
    }

    /// Total width of the concatenated payload (flags not included).
    #[must_use]
    pub fn cat_width(&self) -> u32 {
        self.fields.iter().map(|(_, w)| w).sum()
    }

    /// Build a layout consisting of the fields of `self` followed by those
    /// of `other`. Used by `Join` to concatenate input layouts.
    pub fn concat(&self, other: &Layout) -> Result<Layout> {
        let mut fields: Vec<(&str, u32)> = self
            .fields
            .iter()
            .map(|(n, w)| (n.as_str(), *w))
            .collect();
        for (n, w) in &other.fields {
            if self.has_field(n) {
                return Err(Error::OverlappingLayout(n.clone()));
            }
            fields.push((n.as_str(), *w));
        }
        Layout::new(fields)
    }
}

/// A value conforming to a [`Layout`]: one `u64` per field, masked to that
/// field's width.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Record {
    layout: Arc<Layout>,
    values: Vec<u64>,
}

pub(crate) fn mask(width: u32) -> u64 {
    if width >= 64 { u64::MAX } else { (1u64 << width) - 1 }
}

/// Sign-extend the low `width` bits of `value` to a full `i64`.
#[must_use]
pub fn sign_extend(value: u64, width: u32) -> i64 {
    if width == 0 || width >= 64 {
        return value as i64;
    }
    let shift = 64 - width;
    ((value << shift) as i64) >> shift
}

impl Record {
    /// A record of all-zero fields.
    #[must_use]
    pub fn zero(layout: Arc<Layout>) -> Self {
        let n = layout.fields().len();
        Self {
            layout,
            values: vec![0; n],
        }
    }

    /// Build a record from an ordered list of values, one per layout field,
    /// masking each to its declared width.
    pub fn from_values(layout: Arc<Layout>, values: &[u64]) -> Result<Self> {
        if values.len() != layout.fields().len() {
            return Err(Error::UnknownField(format!(
                "expected {} values, got {}",
                layout.fields().len(),
                values.len()
            )));
        }
        let values = values
            .iter()
            .zip(layout.fields())
            .map(|(v, (_, w))| v & mask(*w))
            .collect();
        Ok(Self { layout, values })
    }

    /// Build a record from a name -> value map (`cat_dict`), defaulting
    /// unmentioned fields to zero.
    pub fn cat_dict(layout: Arc<Layout>, dict: &HashMap<String, u64>) -> Result<Self> {
        let mut rec = Self::zero(layout);
        for (k, v) in dict {
            rec.set(k, *v)?;
        }
        Ok(rec)
    }

    /// This record's layout.
    #[must_use]
    pub fn layout(&self) -> &Arc<Layout> {
        &self.layout
    }

    /// Read a field's value.
    pub fn get(&self, name: &str) -> Result<u64> {
        let idx = self.layout.index_of(name)?;
        Ok(self.values[idx])
    }

    /// Set a field's value, masking to its declared width.
    pub fn set(&mut self, name: &str, value: u64) -> Result<()> {
        let idx = self.layout.index_of(name)?;
        let width = self.layout.fields()[idx].1;
        self.values[idx] = value & mask(width);
        Ok(())
    }

    /// Concatenate all payload fields (in layout order) into a single bit
    /// vector, optionally appending `first`/`last` as the two most
    /// significant bits.
    #[must_use]
    pub fn cat_payload(&self, flags: Option<(bool, bool)>) -> u128 {
        let mut acc: u128 = 0;
        let mut shift = 0u32;
        for (v, (_, w)) in self.values.iter().zip(self.layout.fields()) {
            acc |= (*v as u128) << shift;
            shift += w;
        }
        if let Some((first, last)) = flags {
            acc |= (first as u128) << shift;
            acc |= (last as u128) << (shift + 1);
        }
        acc
    }

    /// Inverse of [`Record::cat_payload`]: slice `bits` into fields per
    /// `layout`, in layout order, optionally reading `first`/`last` from the
    /// two bits above the payload.
    #[must_use]
    pub fn payload_eq(layout: Arc<Layout>, bits: u128, flags: bool) -> (Self, Option<(bool, bool)>) {
        let mut values = Vec::with_capacity(layout.fields().len());
        let mut shift = 0u32;
        for (_, w) in layout.fields() {
            let v = ((bits >> shift) & (mask(*w) as u128)) as u64;
            values.push(v);
            shift += w;
        }
        let flag_bits = if flags {
            Some((
                (bits >> shift) & 1 != 0,
                (bits >> (shift + 1)) & 1 != 0,
            ))
        } else {
            None
        };
        (Self { layout, values }, flag_bits)
    }
}

/// One transfer: a payload plus packet-framing flags. The element type that
/// flows through [`crate::stream::ReadStream`]/[`crate::stream::WriteStream`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Beat<T> {
    /// The payload carried by this transfer.
    pub payload: T,
    /// Set on the first transfer of a packet.
    pub first: bool,
    /// Set on the last transfer of a packet.
    pub last: bool,
}

impl<T> Beat<T> {
    /// A single-element packet: `first = last = true`.
    pub fn single(payload: T) -> Self {
        Self {
            payload,
            first: true,
            last: true,
        }
    }
}

/// Turn a plain sequence of payloads into a packet: `first` on the first
/// element, `last` on the final one.
pub fn to_packet<T: Clone>(items: &[T]) -> Vec<Beat<T>> {
    let n = items.len();
    items
        .iter()
        .enumerate()
        .map(|(i, v)| Beat {
            payload: v.clone(),
            first: i == 0,
            last: i + 1 == n,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_rejects_duplicate_and_zero_width() {
        assert_eq!(
            Layout::new(vec![("a", 4), ("a", 4)]),
            Err(Error::DuplicateField("a".into()))
        );
        assert_eq!(
            Layout::new(vec![("a", 0)]),
            Err(Error::ZeroWidthField("a".into()))
        );
    }

    #[test]
    fn layout_rejects_too_wide() {
        assert!(Layout::new(vec![("a", 127), ("b", 2)]).is_err());
        assert!(Layout::new(vec![("a", 126)]).is_ok());
    }

    #[test]
    fn cat_payload_round_trip_is_identity() {
        let layout = Arc::new(Layout::new(vec![("addr", 8), ("data", 16)]).unwrap());
        let mut rec = Record::zero(layout.clone());
        rec.set("addr", 0x12).unwrap();
        rec.set("data", 0xabcd).unwrap();
        let bits = rec.cat_payload(Some((true, false)));
        let (rec2, flags) = Record::payload_eq(layout, bits, true);
        assert_eq!(rec, rec2);
        assert_eq!(flags, Some((true, false)));
    }

    #[test]
    fn set_masks_to_field_width() {
        let layout = Arc::new(Layout::new(vec![("a", 4)]).unwrap());
        let mut rec = Record::zero(layout);
        rec.set("a", 0xff).unwrap();
        assert_eq!(rec.get("a").unwrap(), 0xf);
    }

    #[test]
    fn concat_detects_overlap() {
        let a = Layout::new(vec![("x", 4)]).unwrap();
        let b = Layout::new(vec![("x", 8)]).unwrap();
        assert_eq!(a.concat(&b), Err(Error::OverlappingLayout("x".into())));
    }

    #[test]
    fn to_packet_sets_first_and_last() {
        let beats = to_packet(&[1, 2, 3]);
        assert_eq!(beats[0].first, true);
        assert_eq!(beats[0].last, false);
        assert_eq!(beats[2].last, true);
        assert_eq!(beats.len(), 3);
    }

    #[test]
    fn to_packet_single_element_sets_both_flags() {
        let beats = to_packet(&[7]);
        assert_eq!(beats.len(), 1);
        assert!(beats[0].first && beats[0].last);
    }
}
