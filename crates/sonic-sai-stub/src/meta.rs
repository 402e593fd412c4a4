//! Attribute metadata and the generic attribute dispatcher.
//!
//! Each object type declares two static tables:
//!
//! - a schema ([`AttributeEntry`]) saying which attributes exist, which
//!   operations they are valid for and what value type they carry;
//! - a vendor table ([`VendorAttributeEntry`]) saying which operations the
//!   stub implements and which getter serves each attribute.
//!
//! [`check_attribs_metadata`] validates an attribute list against a schema
//! before any state is touched, and [`get_attributes`] routes each requested
//! attribute to its getter and stores the result in the caller's slot.

use std::fmt;

use log::{error, trace};

use crate::error::{SaiError, SaiResult};
use crate::types::RawSaiObjectId;

/// Operation an attribute list is validated for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommonApi {
    Create,
    Remove,
    Set,
    Get,
}

impl fmt::Display for CommonApi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CommonApi::Create => write!(f, "create"),
            CommonApi::Remove => write!(f, "remove"),
            CommonApi::Set => write!(f, "set"),
            CommonApi::Get => write!(f, "get"),
        }
    }
}

/// Value type declared for an attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AttrValueType {
    Bool,
    U32,
    ObjectId,
    ObjectList,
}

/// A list of object IDs exchanged with the caller.
///
/// On input `count` is the number of entries the caller can receive. On
/// output it is the number of entries produced, or the number required when
/// the list was too small.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SaiObjectList {
    pub count: u32,
    pub list: Vec<RawSaiObjectId>,
}

impl SaiObjectList {
    /// Creates an empty list able to receive `count` object IDs.
    pub fn with_capacity(count: u32) -> Self {
        Self {
            count,
            list: Vec::with_capacity(count as usize),
        }
    }

    /// Copies `data` into this list, honoring the caller's capacity.
    ///
    /// # Errors
    ///
    /// Returns `BufferOverflow` and sets `count` to the required size when
    /// `data` does not fit.
    pub fn fill(&mut self, data: &[RawSaiObjectId]) -> SaiResult<()> {
        let required = data.len() as u32;
        if required > self.count {
            let capacity = self.count;
            self.count = required;
            return Err(SaiError::BufferOverflow { required, capacity });
        }

        self.list.clear();
        self.list.extend_from_slice(data);
        self.count = required;
        Ok(())
    }
}

/// Attribute value union.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaiAttributeValue {
    Bool(bool),
    U32(u32),
    Oid(RawSaiObjectId),
    ObjList(SaiObjectList),
}

impl SaiAttributeValue {
    /// Returns the value type carried by this value.
    pub fn value_type(&self) -> AttrValueType {
        match self {
            SaiAttributeValue::Bool(_) => AttrValueType::Bool,
            SaiAttributeValue::U32(_) => AttrValueType::U32,
            SaiAttributeValue::Oid(_) => AttrValueType::ObjectId,
            SaiAttributeValue::ObjList(_) => AttrValueType::ObjectList,
        }
    }

    /// Returns the object ID carried by this value.
    pub fn as_oid(&self) -> Option<RawSaiObjectId> {
        match self {
            SaiAttributeValue::Oid(oid) => Some(*oid),
            _ => None,
        }
    }

    /// Returns the object list carried by this value.
    pub fn as_obj_list(&self) -> Option<&SaiObjectList> {
        match self {
            SaiAttributeValue::ObjList(list) => Some(list),
            _ => None,
        }
    }

    /// Returns the u32 carried by this value.
    pub fn as_u32(&self) -> Option<u32> {
        match self {
            SaiAttributeValue::U32(v) => Some(*v),
            _ => None,
        }
    }
}

/// An attribute id/value pair, keyed by the per-object attribute enum.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaiAttribute<A> {
    pub id: A,
    pub value: SaiAttributeValue,
}

impl<A> SaiAttribute<A> {
    /// Creates a new attribute.
    pub fn new(id: A, value: SaiAttributeValue) -> Self {
        Self { id, value }
    }

    /// Creates an object ID attribute.
    pub fn oid(id: A, oid: RawSaiObjectId) -> Self {
        Self::new(id, SaiAttributeValue::Oid(oid))
    }

    /// Creates an object list attribute ready to receive `count` entries.
    pub fn obj_list(id: A, count: u32) -> Self {
        Self::new(id, SaiAttributeValue::ObjList(SaiObjectList::with_capacity(count)))
    }
}

/// Schema entry for one attribute of an object type.
#[derive(Debug, Clone, Copy)]
pub struct AttributeEntry<A> {
    pub id: A,
    pub mandatory_on_create: bool,
    pub valid_for_create: bool,
    pub valid_for_set: bool,
    pub valid_for_get: bool,
    pub name: &'static str,
    pub value_type: AttrValueType,
}

impl<A> AttributeEntry<A> {
    fn valid_for(&self, op: CommonApi) -> bool {
        match op {
            CommonApi::Create => self.valid_for_create,
            CommonApi::Set => self.valid_for_set,
            CommonApi::Get => self.valid_for_get,
            CommonApi::Remove => false,
        }
    }
}

/// Per-operation flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AttrOps {
    pub create: bool,
    pub remove: bool,
    pub set: bool,
    pub get: bool,
}

impl AttrOps {
    /// Flags for an attribute that can only be read.
    pub const GET_ONLY: Self = Self {
        create: false,
        remove: false,
        set: false,
        get: true,
    };

    /// Returns true if the flag for `op` is set.
    pub fn allows(&self, op: CommonApi) -> bool {
        match op {
            CommonApi::Create => self.create,
            CommonApi::Remove => self.remove,
            CommonApi::Set => self.set,
            CommonApi::Get => self.get,
        }
    }
}

/// Getter over object state `S`, keyed by the object ID and attribute id.
pub type AttrGetter<S, A> = fn(&S, RawSaiObjectId, A) -> SaiResult<SaiAttributeValue>;

/// Vendor handler entry for one attribute.
pub struct VendorAttributeEntry<S, A> {
    pub id: A,
    pub is_implemented: AttrOps,
    pub is_supported: AttrOps,
    pub getter: Option<AttrGetter<S, A>>,
}

/// Validates an attribute list against an object schema.
///
/// Rejects unknown and duplicated attributes, attributes not valid for `op`,
/// values whose type does not match the schema, and (on create) missing
/// mandatory attributes. Nothing is mutated.
pub fn check_attribs_metadata<A>(
    attrs: &[SaiAttribute<A>],
    schema: &[AttributeEntry<A>],
    op: CommonApi,
    key_str: &str,
) -> SaiResult<()>
where
    A: Copy + PartialEq + fmt::Debug,
{
    if op == CommonApi::Get && attrs.is_empty() {
        return Err(SaiError::invalid_parameter(format!(
            "{}: empty attribute list for get",
            key_str
        )));
    }

    for (i, attr) in attrs.iter().enumerate() {
        let entry = schema.iter().find(|e| e.id == attr.id).ok_or_else(|| {
            SaiError::invalid_parameter(format!(
                "{}: unknown attribute {:?} at index {}",
                key_str, attr.id, i
            ))
        })?;

        if attrs[..i].iter().any(|prev| prev.id == attr.id) {
            return Err(SaiError::invalid_parameter(format!(
                "{}: attribute {} appears more than once",
                key_str, entry.name
            )));
        }

        if !entry.valid_for(op) {
            return Err(SaiError::invalid_parameter(format!(
                "{}: attribute {} is not valid for {}",
                key_str, entry.name, op
            )));
        }

        let type_matters = op != CommonApi::Get || entry.value_type == AttrValueType::ObjectList;
        if type_matters && attr.value.value_type() != entry.value_type {
            return Err(SaiError::invalid_parameter(format!(
                "{}: attribute {} expects {:?}, got {:?}",
                key_str,
                entry.name,
                entry.value_type,
                attr.value.value_type()
            )));
        }
    }

    if op == CommonApi::Create {
        if let Some(missing) = schema
            .iter()
            .filter(|e| e.mandatory_on_create)
            .find(|e| !attrs.iter().any(|a| a.id == e.id))
        {
            return Err(SaiError::mandatory_attribute_missing(format!(
                "{}: {}",
                key_str, missing.name
            )));
        }
    }

    Ok(())
}

/// Reads the requested attributes of one object.
///
/// Validates the list, then calls the vendor getter for each attribute and
/// stores the value in place. Object lists are copied into the caller's
/// list, so a too-small list yields `BufferOverflow` with the required count.
pub fn get_attributes<S, A>(
    state: &S,
    key: RawSaiObjectId,
    key_str: &str,
    schema: &[AttributeEntry<A>],
    vendor: &[VendorAttributeEntry<S, A>],
    attrs: &mut [SaiAttribute<A>],
) -> SaiResult<()>
where
    A: Copy + PartialEq + fmt::Debug,
{
    trace!("Get {} attribute(s) of {}", attrs.len(), key_str);

    check_attribs_metadata(attrs, schema, CommonApi::Get, key_str).inspect_err(|e| {
        error!("Failed attributes check for {}: {}", key_str, e);
    })?;

    for attr in attrs.iter_mut() {
        let handler = vendor
            .iter()
            .find(|v| v.id == attr.id)
            .ok_or_else(|| SaiError::not_implemented(format!("{:?}", attr.id)))?;

        if !handler.is_implemented.allows(CommonApi::Get) {
            return Err(SaiError::not_implemented(format!("get {:?}", attr.id)));
        }
        if !handler.is_supported.allows(CommonApi::Get) {
            return Err(SaiError::not_supported(format!("get {:?}", attr.id)));
        }
        let getter = handler
            .getter
            .ok_or_else(|| SaiError::not_implemented(format!("get {:?}", attr.id)))?;

        let value = getter(state, key, attr.id).inspect_err(|e| {
            error!("Failed getting {:?} of {}: {}", attr.id, key_str, e);
        })?;

        match (&mut attr.value, value) {
            (SaiAttributeValue::ObjList(out), SaiAttributeValue::ObjList(data)) => {
                out.fill(&data.list)?;
            }
            (slot, value) => *slot = value,
        }
    }

    Ok(())
}
