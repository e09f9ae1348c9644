//! Object Identifier (OID) type.
//!
//! OIDs are stored as `SmallVec<[u32; 16]>` to avoid heap allocation for common OIDs.
//! Ordering is lexicographic over the arcs, so an ancestor always sorts before
//! its descendants. That ordering is what walk termination is built on.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::error::{DecodeErrorKind, Error, OidErrorKind, Result};

/// Maximum number of arcs (subidentifiers) allowed in an OID.
///
/// Per RFC 2578 Section 3.5: "there are at most 128 sub-identifiers in a value".
pub const MAX_OID_LEN: usize = 128;

/// Object Identifier.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Oid {
    arcs: SmallVec<[u32; 16]>,
}

impl Oid {
    /// Create an empty OID.
    pub fn empty() -> Self {
        Self {
            arcs: SmallVec::new(),
        }
    }

    /// Create an OID from arc values.
    pub fn new(arcs: impl IntoIterator<Item = u32>) -> Self {
        Self {
            arcs: arcs.into_iter().collect(),
        }
    }

    /// Create an OID from a slice of arcs.
    ///
    /// ```
    /// use snmpc::oid::Oid;
    ///
    /// let oid = Oid::from_slice(&[1, 3, 6, 1, 2, 1, 1, 1, 0]);
    /// assert_eq!(oid.to_string(), "1.3.6.1.2.1.1.1.0");
    /// ```
    pub fn from_slice(arcs: &[u32]) -> Self {
        Self {
            arcs: SmallVec::from_slice(arcs),
        }
    }

    /// Parse an OID from dotted notation (e.g. `1.3.6.1.2.1.1.1.0`).
    ///
    /// A single leading dot is accepted. Empty arcs, non-digit characters,
    /// arcs above `u32::MAX` and more than [`MAX_OID_LEN`] arcs are rejected.
    pub fn parse(s: &str) -> Result<Self> {
        let body = s.strip_prefix('.').unwrap_or(s);
        if body.is_empty() {
            return Err(Error::invalid_oid_with_input(OidErrorKind::Empty, s));
        }

        let mut arcs = SmallVec::new();
        for part in body.split('.') {
            if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
                return Err(Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s));
            }
            let arc: u32 = part
                .parse()
                .map_err(|_| Error::invalid_oid_with_input(OidErrorKind::InvalidArc, s))?;
            arcs.push(arc);
        }

        let oid = Self { arcs };
        oid.validate_length()?;
        Ok(oid)
    }

    /// Get the arc values.
    pub fn arcs(&self) -> &[u32] {
        &self.arcs
    }

    /// Get the number of arcs.
    pub fn len(&self) -> usize {
        self.arcs.len()
    }

    /// Check if the OID is empty.
    pub fn is_empty(&self) -> bool {
        self.arcs.is_empty()
    }

    /// Check if this OID starts with another OID.
    ///
    /// An OID always starts with itself.
    pub fn starts_with(&self, other: &Oid) -> bool {
        self.arcs.len() >= other.arcs.len() && self.arcs[..other.arcs.len()] == other.arcs[..]
    }

    /// True if `self` lies strictly below `root` in the tree.
    ///
    /// ```
    /// use snmpc::oid;
    ///
    /// let system = oid!(1, 3, 6, 1, 2, 1, 1);
    /// assert!(oid!(1, 3, 6, 1, 2, 1, 1, 5, 0).is_descendant_of(&system));
    /// assert!(!oid!(1, 3, 6, 1, 2, 1, 2, 1).is_descendant_of(&system));
    /// assert!(!system.is_descendant_of(&system));
    /// ```
    pub fn is_descendant_of(&self, root: &Oid) -> bool {
        is_subtree_member(root, self)
    }

    /// Create a child OID by appending an arc.
    pub fn child(&self, arc: u32) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.push(arc);
        Oid { arcs }
    }

    /// Create an OID by appending several arcs.
    pub fn extend(&self, suffix: &[u32]) -> Oid {
        let mut arcs = self.arcs.clone();
        arcs.extend_from_slice(suffix);
        Oid { arcs }
    }

    /// Validate that the OID doesn't exceed the maximum arc count.
    pub fn validate_length(&self) -> Result<()> {
        if self.arcs.len() > MAX_OID_LEN {
            return Err(Error::invalid_oid(OidErrorKind::TooManyArcs {
                count: self.arcs.len(),
                max: MAX_OID_LEN,
            }));
        }
        Ok(())
    }

    /// Validate arcs per X.690 Section 8.19.4 so the OID can be BER encoded.
    ///
    /// - arc1 must be 0, 1, or 2
    /// - arc2 must be <= 39 when arc1 is 0 or 1
    pub fn validate(&self) -> Result<()> {
        let Some(&arc1) = self.arcs.first() else {
            return Ok(());
        };
        if arc1 > 2 {
            return Err(Error::invalid_oid(OidErrorKind::InvalidFirstArc(arc1)));
        }
        if let Some(&arc2) = self.arcs.get(1)
            && arc1 < 2
            && arc2 >= 40
        {
            return Err(Error::invalid_oid(OidErrorKind::InvalidSecondArc {
                first: arc1,
                second: arc2,
            }));
        }
        self.validate_length()
    }

    /// Encode the BER content octets of this OID.
    ///
    /// The first two arcs are combined as `arc1 * 40 + arc2`, the rest are
    /// written base-128 with continuation bits.
    pub fn to_ber_smallvec(&self) -> SmallVec<[u8; 64]> {
        let mut bytes = SmallVec::new();

        match self.arcs.len() {
            0 => {}
            1 => encode_subidentifier(&mut bytes, self.arcs[0].saturating_mul(40)),
            _ => {
                let first = self.arcs[0]
                    .saturating_mul(40)
                    .saturating_add(self.arcs[1]);
                encode_subidentifier(&mut bytes, first);
                for &arc in &self.arcs[2..] {
                    encode_subidentifier(&mut bytes, arc);
                }
            }
        }

        bytes
    }

    /// Decode from BER content octets.
    ///
    /// Enforces [`MAX_OID_LEN`].
    pub fn from_ber(data: &[u8]) -> Result<Self> {
        if data.is_empty() {
            return Err(Error::decode(0, DecodeErrorKind::InvalidOidEncoding));
        }

        let mut arcs = SmallVec::new();
        let (first, mut offset) = decode_subidentifier(data, 0)?;
        match first {
            0..=39 => {
                arcs.push(0);
                arcs.push(first);
            }
            40..=79 => {
                arcs.push(1);
                arcs.push(first - 40);
            }
            _ => {
                arcs.push(2);
                arcs.push(first - 80);
            }
        }

        while offset < data.len() {
            let (arc, next) = decode_subidentifier(data, offset)?;
            arcs.push(arc);
            offset = next;
            if arcs.len() > MAX_OID_LEN {
                return Err(Error::decode(offset, DecodeErrorKind::InvalidOidEncoding));
            }
        }

        Ok(Self { arcs })
    }
}

/// Compare two OIDs component by component.
///
/// A strict prefix sorts before any OID it is a prefix of.
pub fn compare(a: &Oid, b: &Oid) -> Ordering {
    a.arcs.as_slice().cmp(b.arcs.as_slice())
}

/// True iff `candidate` is a strict descendant of `root`.
///
/// Being numerically greater is not enough: every arc of `root` must match
/// the start of `candidate`, and `candidate` must be longer.
pub fn is_subtree_member(root: &Oid, candidate: &Oid) -> bool {
    compare(root, candidate) == Ordering::Less && candidate.starts_with(root)
}

fn encode_subidentifier(bytes: &mut SmallVec<[u8; 64]>, value: u32) {
    let groups = (32 - value.leading_zeros()).div_ceil(7).max(1);
    for i in (0..groups).rev() {
        let mut byte = ((value >> (i * 7)) & 0x7F) as u8;
        if i > 0 {
            byte |= 0x80;
        }
        bytes.push(byte);
    }
}

/// Decode one subidentifier starting at `offset`, returning (value, next offset).
fn decode_subidentifier(data: &[u8], offset: usize) -> Result<(u32, usize)> {
    let mut value: u32 = 0;
    let mut i = offset;

    loop {
        let Some(&byte) = data.get(i) else {
            return Err(Error::decode(i, DecodeErrorKind::TruncatedData));
        };
        i += 1;

        if value > (u32::MAX >> 7) {
            return Err(Error::decode(i, DecodeErrorKind::IntegerOverflow));
        }
        value = (value << 7) | u32::from(byte & 0x7F);

        if byte & 0x80 == 0 {
            return Ok((value, i));
        }
    }
}

impl fmt::Debug for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Oid({})", self)
    }
}

impl fmt::Display for Oid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, arc) in self.arcs.iter().enumerate() {
            if i > 0 {
                f.write_str(".")?;
            }
            write!(f, "{}", arc)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Oid {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl From<&[u32]> for Oid {
    fn from(arcs: &[u32]) -> Self {
        Self::from_slice(arcs)
    }
}

impl<const N: usize> From<[u32; N]> for Oid {
    fn from(arcs: [u32; N]) -> Self {
        Self::new(arcs)
    }
}

impl PartialOrd for Oid {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Oid {
    fn cmp(&self, other: &Self) -> Ordering {
        compare(self, other)
    }
}

/// Create an OID from literal arcs.
///
/// ```
/// use snmpc::oid;
///
/// let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1, 0);
/// assert_eq!(sys_descr.to_string(), "1.3.6.1.2.1.1.1.0");
/// ```
#[macro_export]
macro_rules! oid {
    ($($arc:expr),* $(,)?) => {
        $crate::oid::Oid::from_slice(&[$($arc),*])
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_parse_dotted() {
        let oid = Oid::parse("1.3.6.1.2.1.1.1.0").unwrap();
        assert_eq!(oid.arcs(), &[1, 3, 6, 1, 2, 1, 1, 1, 0]);

        let leading = Oid::parse(".1.3.6").unwrap();
        assert_eq!(leading.arcs(), &[1, 3, 6]);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(Oid::parse("").is_err());
        assert!(Oid::parse("1..3").is_err());
        assert!(Oid::parse("1.3.x").is_err());
        assert!(Oid::parse("1.3.").is_err());
        assert!(Oid::parse("1.4294967296").is_err());
        assert!(Oid::parse("1.-3").is_err());
    }

    #[test]
    fn test_parse_rejects_too_many_arcs() {
        let text = vec!["1"; MAX_OID_LEN + 1].join(".");
        assert!(Oid::parse(&text).is_err());
        let text = vec!["1"; MAX_OID_LEN].join(".");
        assert!(Oid::parse(&text).is_ok());
    }

    #[test]
    fn test_compare_prefix_sorts_first() {
        let system = oid!(1, 3, 6, 1, 2, 1, 1);
        let sys_descr = oid!(1, 3, 6, 1, 2, 1, 1, 1);
        assert_eq!(compare(&system, &sys_descr), Ordering::Less);
        assert_eq!(compare(&sys_descr, &system), Ordering::Greater);
        assert_eq!(compare(&system, &system), Ordering::Equal);
        // 1.3.6.1.2.1.1.9 < 1.3.6.1.2.1.1.10 numerically, not textually
        assert!(oid!(1, 3, 6, 1, 2, 1, 1, 9) < oid!(1, 3, 6, 1, 2, 1, 1, 10));
    }

    #[test]
    fn test_subtree_member() {
        let root = oid!(1, 3, 6, 1, 2, 1, 1);
        assert!(is_subtree_member(&root, &oid!(1, 3, 6, 1, 2, 1, 1, 1, 0)));
        assert!(!is_subtree_member(&root, &root));
        // Greater but a sibling, not a descendant
        assert!(!is_subtree_member(&root, &oid!(1, 3, 6, 1, 2, 1, 2, 1)));
        // Smaller
        assert!(!is_subtree_member(&root, &oid!(1, 3, 6, 1, 2, 1)));
    }

    #[test]
    fn test_ber_encoding() {
        assert_eq!(&oid!(1, 3, 6, 1).to_ber_smallvec()[..], &[0x2B, 0x06, 0x01]);
        // Multi-byte subidentifier: 2680 = 0x94 0x78
        assert_eq!(
            &oid!(1, 3, 6, 1, 4, 1, 2680).to_ber_smallvec()[..],
            &[0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x78]
        );
    }

    #[test]
    fn test_ber_decoding() {
        let oid = Oid::from_ber(&[0x2B, 0x06, 0x01, 0x04, 0x01, 0x94, 0x78]).unwrap();
        assert_eq!(oid, oid!(1, 3, 6, 1, 4, 1, 2680));
        // arc1 = 2 with a large arc2
        let oid = Oid::from_ber(&[0x88, 0x37]).unwrap();
        assert_eq!(oid.arcs(), &[2, 999]);
    }

    #[test]
    fn test_ber_decoding_rejects_malformed() {
        assert!(Oid::from_ber(&[]).is_err());
        // Continuation bit on the final byte
        assert!(Oid::from_ber(&[0x2B, 0x86]).is_err());
        // Subidentifier wider than 32 bits
        assert!(Oid::from_ber(&[0x2B, 0x8F, 0xFF, 0xFF, 0xFF, 0xFF, 0x7F]).is_err());
    }

    #[test]
    fn test_validate_arcs() {
        assert!(oid!(1, 3, 6).validate().is_ok());
        assert!(oid!(3, 1).validate().is_err());
        assert!(oid!(1, 40).validate().is_err());
        assert!(oid!(2, 999).validate().is_ok());
    }

    fn arcs() -> impl Strategy<Value = Vec<u32>> {
        prop::collection::vec(0u32..1000, 1..20)
    }

    proptest! {
        #[test]
        fn prop_prefix_is_less_and_ancestor(base in arcs(), suffix in arcs()) {
            let a = Oid::from_slice(&base);
            let b = a.extend(&suffix);
            prop_assert_eq!(compare(&a, &b), Ordering::Less);
            prop_assert!(is_subtree_member(&a, &b));
        }

        #[test]
        fn prop_non_prefix_is_never_member(a in arcs(), b in arcs()) {
            let a = Oid::from_slice(&a);
            let b = Oid::from_slice(&b);
            prop_assume!(!b.starts_with(&a));
            prop_assert!(!is_subtree_member(&a, &b));
        }

        #[test]
        fn prop_ber_round_trip(tail in prop::collection::vec(any::<u32>(), 0..20), second in 0u32..40) {
            let oid = Oid::new([1, second].into_iter().chain(tail));
            let decoded = Oid::from_ber(&oid.to_ber_smallvec()).unwrap();
            prop_assert_eq!(decoded, oid);
        }
    }
}
