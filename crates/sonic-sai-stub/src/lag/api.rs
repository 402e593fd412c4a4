//! LAG and LAG member lifecycle and attribute handlers.
//!
//! Every operation validates all of its inputs before touching the table,
//! so a failed call leaves the table exactly as it was.

use log::{debug, error, info, trace};

use super::table::{LagTable, PORT_MASK_CAPACITY};
use crate::config::LagConfig;
use crate::error::{SaiError, SaiResult};
use crate::meta::{
    check_attribs_metadata, get_attributes, AttrOps, AttrValueType, AttributeEntry, CommonApi,
    SaiAttribute, SaiAttributeValue, SaiObjectList, VendorAttributeEntry,
};
use crate::types::{LagMemberOid, LagOid, PortOid, RawSaiObjectId};

/// LAG attribute ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagAttr {
    /// Member ports of the LAG, in ascending port order.
    PortList,
}

/// LAG member attribute ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagMemberAttr {
    /// LAG the member belongs to.
    LagId,
    /// Port bonded by the member.
    PortId,
}

const LAG_ATTRIBS: &[AttributeEntry<LagAttr>] = &[AttributeEntry {
    id: LagAttr::PortList,
    mandatory_on_create: false,
    valid_for_create: false,
    valid_for_set: false,
    valid_for_get: true,
    name: "LAG port list",
    value_type: AttrValueType::ObjectList,
}];

const LAG_VENDOR_ATTRIBS: &[VendorAttributeEntry<LagTable, LagAttr>] = &[VendorAttributeEntry {
    id: LagAttr::PortList,
    is_implemented: AttrOps::GET_ONLY,
    is_supported: AttrOps::GET_ONLY,
    getter: Some(lag_attrib_get),
}];

const LAG_MEMBER_ATTRIBS: &[AttributeEntry<LagMemberAttr>] = &[
    AttributeEntry {
        id: LagMemberAttr::LagId,
        mandatory_on_create: true,
        valid_for_create: true,
        valid_for_set: false,
        valid_for_get: true,
        name: "LAG member LAG ID",
        value_type: AttrValueType::ObjectId,
    },
    AttributeEntry {
        id: LagMemberAttr::PortId,
        mandatory_on_create: true,
        valid_for_create: true,
        valid_for_set: false,
        valid_for_get: true,
        name: "LAG member PORT ID",
        value_type: AttrValueType::ObjectId,
    },
];

const LAG_MEMBER_VENDOR_ATTRIBS: &[VendorAttributeEntry<LagTable, LagMemberAttr>] = &[
    VendorAttributeEntry {
        id: LagMemberAttr::LagId,
        is_implemented: AttrOps::GET_ONLY,
        is_supported: AttrOps::GET_ONLY,
        getter: Some(lag_member_attrib_get),
    },
    VendorAttributeEntry {
        id: LagMemberAttr::PortId,
        is_implemented: AttrOps::GET_ONLY,
        is_supported: AttrOps::GET_ONLY,
        getter: Some(lag_member_attrib_get),
    },
];

fn lag_key_to_str(lag_id: LagOid) -> String {
    match lag_id.index() {
        Ok(lag) => format!("lag {:x}", lag),
        Err(_) => "invalid lag".to_string(),
    }
}

fn lag_member_key_to_str(member_id: LagMemberOid) -> String {
    match member_id.index() {
        Ok(port) => format!("port {:x}", port),
        Err(_) => "invalid lag member".to_string(),
    }
}

/// Absent and unresolvable LAG IDs both report `ItemNotFound`.
fn lag_port_list(table: &LagTable, lag_id: LagOid) -> SaiResult<Vec<PortOid>> {
    let entry = table
        .find_by_oid(lag_id)
        .and_then(|slot| table.entry(slot))
        .ok_or_else(|| SaiError::not_found(format!("LAG {}", lag_id)))?;

    Ok(entry.ports().iter().map(PortOid::from_index).collect())
}

fn lag_member_lag_id(table: &LagTable, member_id: LagMemberOid) -> SaiResult<LagOid> {
    let port = member_id.index()?;
    table
        .find_owner_of_port(port)
        .and_then(|slot| table.entry(slot))
        .and_then(|entry| entry.oid())
        .ok_or_else(|| SaiError::not_found(format!("LAG member for port {}", port)))
}

fn lag_member_port_id(member_id: LagMemberOid) -> SaiResult<PortOid> {
    member_id.index().map(PortOid::from_index)
}

fn lag_attrib_get(
    table: &LagTable,
    key: RawSaiObjectId,
    attr: LagAttr,
) -> SaiResult<SaiAttributeValue> {
    match attr {
        LagAttr::PortList => {
            debug!("{}", table.dump());
            let list: Vec<RawSaiObjectId> = lag_port_list(table, LagOid::from_raw_unchecked(key))?
                .iter()
                .map(PortOid::as_raw)
                .collect();
            Ok(SaiAttributeValue::ObjList(SaiObjectList {
                count: list.len() as u32,
                list,
            }))
        }
    }
}

fn lag_member_attrib_get(
    table: &LagTable,
    key: RawSaiObjectId,
    attr: LagMemberAttr,
) -> SaiResult<SaiAttributeValue> {
    let member_id = LagMemberOid::from_raw_unchecked(key);
    match attr {
        LagMemberAttr::LagId => {
            lag_member_lag_id(table, member_id).map(|lag| SaiAttributeValue::Oid(lag.as_raw()))
        }
        LagMemberAttr::PortId => {
            lag_member_port_id(member_id).map(|port| SaiAttributeValue::Oid(port.as_raw()))
        }
    }
}

/// LAG API: owns the LAG table and enforces its invariants.
///
/// # Invariants
///
/// - at most `max_lags` LAGs exist (the table has exactly that many slots);
/// - a LAG has at most `max_ports_per_lag` members;
/// - a port is a member of at most one LAG;
/// - a LAG with members cannot be removed.
#[derive(Debug, Clone)]
pub struct LagApi {
    table: LagTable,
    max_ports_per_lag: u32,
    port_count: u32,
}

impl LagApi {
    /// Creates an empty LAG table for a switch with `port_count` ports.
    ///
    /// Ports beyond the port mask capacity are never accepted as members.
    pub fn new(config: &LagConfig, port_count: u32) -> Self {
        Self {
            table: LagTable::new(config.max_lags as usize),
            max_ports_per_lag: config.max_ports_per_lag,
            port_count: port_count.min(PORT_MASK_CAPACITY),
        }
    }

    /// Read-only view of the LAG table.
    pub fn table(&self) -> &LagTable {
        &self.table
    }

    /// Maximum number of members per LAG.
    pub fn max_ports_per_lag(&self) -> u32 {
        self.max_ports_per_lag
    }

    /// Creates a LAG in the lowest free table slot.
    ///
    /// No create attributes are defined for LAGs, so `attrs` must be empty.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if any attribute is supplied;
    /// - `InsufficientResources` if every slot is occupied.
    pub fn create_lag(&mut self, attrs: &[SaiAttribute<LagAttr>]) -> SaiResult<LagOid> {
        trace!("Enter create_lag");

        check_attribs_metadata(attrs, LAG_ATTRIBS, CommonApi::Create, "new lag")
            .inspect_err(|e| error!("Failed attributes check for new LAG: {}", e))?;

        let slot = self.table.find_free_slot().ok_or_else(|| {
            let err = SaiError::insufficient_resources(format!(
                "LAG table full ({} entries)",
                self.table.capacity()
            ));
            error!("Failed to create LAG: {}", err);
            err
        })?;

        let lag_id = LagOid::from_index(slot as u32);
        self.table.occupy(slot, lag_id);
        info!("Create LAG: 0x{:010x}", lag_id.as_raw());

        Ok(lag_id)
    }

    /// Removes an empty LAG.
    ///
    /// # Errors
    ///
    /// - `ItemNotFound` if no LAG has this ID;
    /// - `ObjectInUse` if the LAG still has members.
    pub fn remove_lag(&mut self, lag_id: LagOid) -> SaiResult<()> {
        trace!("Enter remove_lag {}", lag_id);

        let slot = self
            .table
            .find_by_oid(lag_id)
            .ok_or_else(|| SaiError::not_found(format!("LAG {}", lag_id)))?;

        let members = self.table.entry(slot).map_or(0, |e| e.member_count());
        if members > 0 {
            let err = SaiError::object_in_use(format!("LAG {} has {} member(s)", lag_id, members));
            error!("Failed to remove LAG: {}", err);
            return Err(err);
        }

        self.table.clear(slot);
        info!("Remove LAG: 0x{:010x}", lag_id.as_raw());

        Ok(())
    }

    /// LAG attributes are read-only.
    pub fn set_lag_attribute(
        &mut self,
        _lag_id: LagOid,
        _attr: &SaiAttribute<LagAttr>,
    ) -> SaiResult<()> {
        Err(SaiError::not_implemented("set_lag_attribute"))
    }

    /// Reads LAG attributes through the metadata dispatcher.
    pub fn get_lag_attribute(
        &self,
        lag_id: LagOid,
        attrs: &mut [SaiAttribute<LagAttr>],
    ) -> SaiResult<()> {
        trace!("Enter get_lag_attribute");

        let key_str = lag_key_to_str(lag_id);
        get_attributes(
            &self.table,
            lag_id.as_raw(),
            &key_str,
            LAG_ATTRIBS,
            LAG_VENDOR_ATTRIBS,
            attrs,
        )
    }

    /// Member ports of a LAG, in ascending port order.
    pub fn get_lag_ports(&self, lag_id: LagOid) -> SaiResult<Vec<PortOid>> {
        lag_port_list(&self.table, lag_id)
    }

    /// Adds a port to a LAG.
    ///
    /// `attrs` must hold exactly the LAG ID and the port ID. The member ID is
    /// derived from the port, since a port can be in only one LAG.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` for a wrong attribute count, bad IDs or a port
    ///   outside the switch port range;
    /// - `ItemNotFound` if the LAG does not exist;
    /// - `InsufficientResources` if the LAG is full;
    /// - `ItemAlreadyExists` if the port is already in any LAG.
    pub fn create_lag_member(
        &mut self,
        attrs: &[SaiAttribute<LagMemberAttr>],
    ) -> SaiResult<LagMemberOid> {
        trace!("Enter create_lag_member");

        if attrs.len() != 2 {
            let err = SaiError::invalid_parameter(format!(
                "expected LAG ID and Port ID, got {} attribute(s)",
                attrs.len()
            ));
            error!("Failed to create LAG member: {}", err);
            return Err(err);
        }

        check_attribs_metadata(attrs, LAG_MEMBER_ATTRIBS, CommonApi::Create, "new lag member")
            .inspect_err(|e| error!("Failed attributes check for new LAG member: {}", e))?;

        let lag_raw = Self::member_attr_oid(attrs, LagMemberAttr::LagId)?;
        let port_raw = Self::member_attr_oid(attrs, LagMemberAttr::PortId)?;

        let lag_id = LagOid::from_raw(lag_raw).ok_or_else(|| {
            SaiError::invalid_parameter(format!("0x{:016x} is not a LAG ID", lag_raw))
        })?;
        let lag_number = lag_id.index()?;
        let slot = self.table.find_by_oid(lag_id).ok_or_else(|| {
            let err = SaiError::not_found(format!("LAG {}", lag_number));
            error!("Failed to create LAG member: {}", err);
            err
        })?;

        let member_count = self.table.entry(slot).map_or(0, |e| e.member_count());
        if member_count >= self.max_ports_per_lag {
            let err = SaiError::insufficient_resources(format!(
                "LAG {} already has {} members",
                lag_number, member_count
            ));
            error!("Failed to create LAG member: {}", err);
            return Err(err);
        }

        let port = PortOid::from_raw_unchecked(port_raw)
            .index()
            .inspect_err(|e| error!("Failed to create LAG member: {}", e))?;
        if port >= self.port_count {
            let err = SaiError::invalid_parameter(format!(
                "port {} outside switch port range 0..{}",
                port, self.port_count
            ));
            error!("Failed to create LAG member: {}", err);
            return Err(err);
        }

        if let Some(owner) = self.table.find_owner_of_port(port) {
            let err =
                SaiError::already_exists(format!("port {} already added to LAG {}", port, owner));
            error!("Failed to create LAG member: {}", err);
            return Err(err);
        }

        if !self.table.add_port(slot, port) {
            let err = SaiError::invalid_parameter(format!(
                "port {} does not fit the LAG {} port mask",
                port, lag_number
            ));
            error!("Failed to create LAG member: {}", err);
            return Err(err);
        }
        let member_id = LagMemberOid::from_index(port);
        info!(
            "Create LAG MEMBER: 0x{:010x} {{LAG_ID: {}, PORT_ID: {}}}",
            member_id.as_raw(),
            lag_number,
            port
        );

        Ok(member_id)
    }

    fn member_attr_oid(
        attrs: &[SaiAttribute<LagMemberAttr>],
        id: LagMemberAttr,
    ) -> SaiResult<RawSaiObjectId> {
        attrs
            .iter()
            .find(|a| a.id == id)
            .and_then(|a| a.value.as_oid())
            .ok_or_else(|| SaiError::mandatory_attribute_missing(format!("{:?}", id)))
    }

    /// Removes a port from whichever LAG holds it.
    ///
    /// # Errors
    ///
    /// - `InvalidParameter` if the ID is not a LAG member ID;
    /// - `ItemNotFound` if the port is not in any LAG.
    pub fn remove_lag_member(&mut self, member_id: LagMemberOid) -> SaiResult<()> {
        trace!("Enter remove_lag_member {}", member_id);

        let port = member_id
            .index()
            .inspect_err(|e| error!("Failed to get LAG member object data: {}", e))?;

        let slot = self
            .table
            .find_owner_of_port(port)
            .ok_or_else(|| SaiError::not_found(format!("LAG member for port {}", port)))?;

        self.table.remove_port(slot, port);
        info!(
            "Remove LAG MEMBER: 0x{:010x} {{LAG_ID: {}, PORT_ID: {}}}",
            member_id.as_raw(),
            slot,
            port
        );

        Ok(())
    }

    /// LAG member attributes are read-only.
    pub fn set_lag_member_attribute(
        &mut self,
        _member_id: LagMemberOid,
        _attr: &SaiAttribute<LagMemberAttr>,
    ) -> SaiResult<()> {
        Err(SaiError::not_implemented("set_lag_member_attribute"))
    }

    /// Reads LAG member attributes through the metadata dispatcher.
    pub fn get_lag_member_attribute(
        &self,
        member_id: LagMemberOid,
        attrs: &mut [SaiAttribute<LagMemberAttr>],
    ) -> SaiResult<()> {
        trace!("Enter get_lag_member_attribute");

        let key_str = lag_member_key_to_str(member_id);
        get_attributes(
            &self.table,
            member_id.as_raw(),
            &key_str,
            LAG_MEMBER_ATTRIBS,
            LAG_MEMBER_VENDOR_ATTRIBS,
            attrs,
        )
    }

    /// LAG holding the member's port.
    pub fn get_lag_member_lag(&self, member_id: LagMemberOid) -> SaiResult<LagOid> {
        lag_member_lag_id(&self.table, member_id)
    }

    /// Port bonded by the member.
    pub fn get_lag_member_port(&self, member_id: LagMemberOid) -> SaiResult<PortOid> {
        lag_member_port_id(member_id)
    }
}
