//! Type-safe SAI object ID wrappers and the object ID encoding scheme.
//!
//! Object IDs carry their object type in bits 48..56 and an object index
//! (port number, LAG table slot, ...) in the low 32 bits:
//!
//! ```text
//!  63      56 55     48 47           32 31                            0
//! +----------+---------+---------------+-------------------------------+
//! | reserved |  type   |   reserved    |             index             |
//! +----------+---------+---------------+-------------------------------+
//! ```
//!
//! The mapping is pure and collision-free per `(type, index)` pair, and the
//! null object ID (0) never decodes.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;

use crate::error::{SaiError, SaiResult};

/// Untyped object ID, as carried in attribute values.
pub type RawSaiObjectId = u64;

const OBJECT_TYPE_SHIFT: u32 = 48;
const OBJECT_TYPE_MASK: RawSaiObjectId = 0xff;
const OBJECT_INDEX_MASK: RawSaiObjectId = 0xffff_ffff;
const OBJECT_RESERVED_MASK: RawSaiObjectId =
    !((OBJECT_TYPE_MASK << OBJECT_TYPE_SHIFT) | OBJECT_INDEX_MASK);

/// SAI object types known to the stub.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SaiObjectType {
    Null = 0,
    Port = 1,
    Lag = 2,
    LagMember = 3,
    Switch = 4,
}

impl SaiObjectType {
    fn from_raw(raw: u8) -> Self {
        match raw {
            1 => SaiObjectType::Port,
            2 => SaiObjectType::Lag,
            3 => SaiObjectType::LagMember,
            4 => SaiObjectType::Switch,
            _ => SaiObjectType::Null,
        }
    }
}

impl fmt::Display for SaiObjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SaiObjectType::Null => "SAI_OBJECT_TYPE_NULL",
            SaiObjectType::Port => "SAI_OBJECT_TYPE_PORT",
            SaiObjectType::Lag => "SAI_OBJECT_TYPE_LAG",
            SaiObjectType::LagMember => "SAI_OBJECT_TYPE_LAG_MEMBER",
            SaiObjectType::Switch => "SAI_OBJECT_TYPE_SWITCH",
        };
        write!(f, "{}", s)
    }
}

/// Encodes an object index of the given type into a raw object ID.
pub fn encode_object_id(object_type: SaiObjectType, index: u32) -> RawSaiObjectId {
    ((object_type as RawSaiObjectId) << OBJECT_TYPE_SHIFT) | RawSaiObjectId::from(index)
}

/// Returns the object type encoded in a raw object ID.
pub fn object_type_of(raw: RawSaiObjectId) -> SaiObjectType {
    SaiObjectType::from_raw(((raw >> OBJECT_TYPE_SHIFT) & OBJECT_TYPE_MASK) as u8)
}

/// Decodes a raw object ID into its index, checking the expected type.
///
/// # Errors
///
/// Returns `InvalidParameter` for the null object ID, when a reserved bit is
/// set, or when the encoded object type differs from `expected`.
pub fn decode_object_id(raw: RawSaiObjectId, expected: SaiObjectType) -> SaiResult<u32> {
    let actual = object_type_of(raw);
    if raw == 0 || actual == SaiObjectType::Null {
        return Err(SaiError::invalid_parameter(format!(
            "object id 0x{:016x} is not a valid {}",
            raw, expected
        )));
    }
    if raw & OBJECT_RESERVED_MASK != 0 {
        return Err(SaiError::invalid_parameter(format!(
            "object id 0x{:016x} has reserved bits set",
            raw
        )));
    }
    if actual != expected {
        return Err(SaiError::invalid_parameter(format!(
            "object id 0x{:016x} has type {}, expected {}",
            raw, actual, expected
        )));
    }
    Ok((raw & OBJECT_INDEX_MASK) as u32)
}

/// Object kind marker binding a Rust type to its encoded object type.
pub trait SaiObjectKind: Send + Sync + 'static {
    /// The object type encoded in IDs of this kind.
    const OBJECT_TYPE: SaiObjectType;

    /// Kind name used in `Debug` output.
    fn type_name() -> &'static str;
}

/// Object ID tagged with its kind.
///
/// The phantom type parameter `T` indicates what kind of SAI object this ID
/// refers to, so a LAG member ID cannot be passed where a LAG ID is expected.
///
/// # Examples
///
/// ```
/// use sonic_sai_stub::{LagOid, PortOid};
///
/// let port = PortOid::from_index(3);
/// assert_eq!(port.index().unwrap(), 3);
///
/// // A port ID is not a LAG ID.
/// assert!(LagOid::from_raw(port.as_raw()).is_none());
/// ```
#[derive(Clone, Copy)]
pub struct SaiObjectId<T: SaiObjectKind> {
    raw: RawSaiObjectId,
    _marker: PhantomData<T>,
}

impl<T: SaiObjectKind> SaiObjectId<T> {
    /// `SAI_NULL_OBJECT_ID`.
    pub const NULL: Self = Self {
        raw: 0,
        _marker: PhantomData,
    };

    /// Creates an object ID from a raw value.
    ///
    /// Returns `None` for the null object ID or an ID of another type.
    pub fn from_raw(raw: RawSaiObjectId) -> Option<Self> {
        decode_object_id(raw, T::OBJECT_TYPE)
            .ok()
            .map(|_| Self::from_raw_unchecked(raw))
    }

    /// Creates an object ID from a raw value without checking its type.
    pub const fn from_raw_unchecked(raw: RawSaiObjectId) -> Self {
        Self {
            raw,
            _marker: PhantomData,
        }
    }

    /// Encodes an object index as an ID of this kind.
    pub fn from_index(index: u32) -> Self {
        Self::from_raw_unchecked(encode_object_id(T::OBJECT_TYPE, index))
    }

    /// Decodes the object index.
    ///
    /// # Errors
    ///
    /// Returns `InvalidParameter` if the ID is null or was built from a raw
    /// value of another object type.
    pub fn index(&self) -> SaiResult<u32> {
        decode_object_id(self.raw, T::OBJECT_TYPE)
    }

    pub const fn as_raw(&self) -> RawSaiObjectId {
        self.raw
    }

    pub const fn is_null(&self) -> bool {
        self.raw == 0
    }
}

impl<T: SaiObjectKind> fmt::Debug for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(0x{:016x})", T::type_name(), self.raw)
    }
}

impl<T: SaiObjectKind> fmt::Display for SaiObjectId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{:016x}", self.raw)
    }
}

impl<T: SaiObjectKind> PartialEq for SaiObjectId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.raw == other.raw
    }
}

impl<T: SaiObjectKind> Eq for SaiObjectId<T> {}

impl<T: SaiObjectKind> Hash for SaiObjectId<T> {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.raw.hash(state);
    }
}

impl<T: SaiObjectKind> Default for SaiObjectId<T> {
    fn default() -> Self {
        Self::NULL
    }
}

// ============================================================================
// Object Kind Markers
// ============================================================================

macro_rules! define_object_kind {
    ($name:ident, $object_type:expr, $type_name:literal, $oid_alias:ident) => {
        #[doc = concat!("Marker type for SAI ", $type_name, " objects.")]
        #[derive(Debug, Clone, Copy)]
        pub struct $name;

        impl SaiObjectKind for $name {
            const OBJECT_TYPE: SaiObjectType = $object_type;

            fn type_name() -> &'static str {
                $type_name
            }
        }

        #[doc = concat!("Type alias for ", $type_name, " object IDs.")]
        pub type $oid_alias = SaiObjectId<$name>;
    };
}

define_object_kind!(SwitchKind, SaiObjectType::Switch, "Switch", SwitchOid);
define_object_kind!(PortKind, SaiObjectType::Port, "Port", PortOid);
define_object_kind!(LagKind, SaiObjectType::Lag, "Lag", LagOid);
define_object_kind!(LagMemberKind, SaiObjectType::LagMember, "LagMember", LagMemberOid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_layout() {
        assert_eq!(encode_object_id(SaiObjectType::Port, 1), 0x1000000000001);
        assert_eq!(encode_object_id(SaiObjectType::Lag, 0), 0x2000000000000);
        assert_eq!(object_type_of(0x3000000000010), SaiObjectType::LagMember);
    }

    #[test]
    fn test_decode_checks_type() {
        let lag = encode_object_id(SaiObjectType::Lag, 4);
        assert_eq!(decode_object_id(lag, SaiObjectType::Lag).unwrap(), 4);

        let err = decode_object_id(lag, SaiObjectType::Port).unwrap_err();
        assert!(matches!(err, SaiError::InvalidParameter { .. }));
    }

    #[test]
    fn test_decode_rejects_null_and_unknown_type() {
        assert!(decode_object_id(0, SaiObjectType::Port).is_err());
        assert!(decode_object_id(0x7f000000000001, SaiObjectType::Port).is_err());
        // Index zero with a valid type is a real object.
        assert_eq!(
            decode_object_id(encode_object_id(SaiObjectType::Port, 0), SaiObjectType::Port)
                .unwrap(),
            0
        );
    }

    #[test]
    fn test_decode_rejects_reserved_bits() {
        // Bit 32 set on an otherwise valid member ID for port 5.
        let raw = 0x0003_0001_0000_0005;
        assert!(decode_object_id(raw, SaiObjectType::LagMember).is_err());
        assert!(LagMemberOid::from_raw(raw).is_none());
        assert!(decode_object_id(0x0103_0000_0000_0005, SaiObjectType::LagMember).is_err());

        let canonical = encode_object_id(SaiObjectType::LagMember, 5);
        assert_eq!(decode_object_id(canonical, SaiObjectType::LagMember).unwrap(), 5);
    }

    #[test]
    fn test_typed_oid_from_index() {
        let member = LagMemberOid::from_index(9);
        assert_eq!(member.as_raw(), 0x3000000000009);
        assert_eq!(member.index().unwrap(), 9);
        assert!(!member.is_null());
    }

    #[test]
    fn test_typed_oid_from_raw() {
        let port = PortOid::from_index(2);
        assert_eq!(PortOid::from_raw(port.as_raw()), Some(port));
        assert!(LagOid::from_raw(port.as_raw()).is_none());
        assert!(PortOid::from_raw(0).is_none());
    }

    #[test]
    fn test_unchecked_oid_fails_to_decode() {
        let bogus = LagOid::from_raw_unchecked(PortOid::from_index(1).as_raw());
        assert!(bogus.index().is_err());
        assert!(LagOid::NULL.index().is_err());
    }

    #[test]
    fn test_oid_debug() {
        let port = PortOid::from_index(1);
        let debug = format!("{:?}", port);
        assert!(debug.contains("Port"));
        assert!(debug.contains("0x0001000000000001"));
    }
}
