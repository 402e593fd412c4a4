//! Switch initialization and port enumeration.
//!
//! The stub switch exposes a fixed list of ports `0..port_count`. Port IDs
//! are derived from the port index, so the same index always yields the same
//! port ID.

use log::{info, trace};

use crate::config::SwitchConfig;
use crate::error::{SaiError, SaiResult};
use crate::meta::{
    get_attributes, AttrOps, AttrValueType, AttributeEntry, SaiAttribute, SaiAttributeValue,
    SaiObjectList, VendorAttributeEntry,
};
use crate::types::{PortOid, RawSaiObjectId, SwitchOid};

/// Switch attribute ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SwitchAttr {
    /// Number of ports.
    PortNumber,
    /// Port IDs, in ascending port order.
    PortList,
}

const SWITCH_ATTRIBS: &[AttributeEntry<SwitchAttr>] = &[
    AttributeEntry {
        id: SwitchAttr::PortNumber,
        mandatory_on_create: false,
        valid_for_create: false,
        valid_for_set: false,
        valid_for_get: true,
        name: "Switch port number",
        value_type: AttrValueType::U32,
    },
    AttributeEntry {
        id: SwitchAttr::PortList,
        mandatory_on_create: false,
        valid_for_create: false,
        valid_for_set: false,
        valid_for_get: true,
        name: "Switch port list",
        value_type: AttrValueType::ObjectList,
    },
];

const SWITCH_VENDOR_ATTRIBS: &[VendorAttributeEntry<SwitchApi, SwitchAttr>] = &[
    VendorAttributeEntry {
        id: SwitchAttr::PortNumber,
        is_implemented: AttrOps::GET_ONLY,
        is_supported: AttrOps::GET_ONLY,
        getter: Some(switch_attrib_get),
    },
    VendorAttributeEntry {
        id: SwitchAttr::PortList,
        is_implemented: AttrOps::GET_ONLY,
        is_supported: AttrOps::GET_ONLY,
        getter: Some(switch_attrib_get),
    },
];

fn switch_attrib_get(
    switch: &SwitchApi,
    _key: RawSaiObjectId,
    attr: SwitchAttr,
) -> SaiResult<SaiAttributeValue> {
    match attr {
        SwitchAttr::PortNumber => Ok(SaiAttributeValue::U32(switch.port_count)),
        SwitchAttr::PortList => {
            let list: Vec<RawSaiObjectId> =
                switch.port_list()?.iter().map(PortOid::as_raw).collect();
            Ok(SaiAttributeValue::ObjList(SaiObjectList {
                count: list.len() as u32,
                list,
            }))
        }
    }
}

/// Stub switch.
#[derive(Debug, Clone)]
pub struct SwitchApi {
    port_count: u32,
    switch_id: Option<SwitchOid>,
    hardware_id: Option<String>,
}

impl SwitchApi {
    /// Creates a switch that is not yet initialized.
    pub fn new(config: &SwitchConfig) -> Self {
        Self {
            port_count: config.port_count,
            switch_id: None,
            hardware_id: None,
        }
    }

    /// Initializes the switch.
    ///
    /// # Errors
    ///
    /// Returns `ItemAlreadyExists` if the switch is already initialized.
    pub fn initialize(&mut self, hardware_id: &str) -> SaiResult<SwitchOid> {
        if let Some(id) = self.switch_id {
            return Err(SaiError::already_exists(format!("switch {}", id)));
        }

        let id = SwitchOid::from_index(0);
        self.switch_id = Some(id);
        self.hardware_id = Some(hardware_id.to_string());
        info!(
            "Initialize switch {} (hardware id {}, {} ports)",
            id, hardware_id, self.port_count
        );

        Ok(id)
    }

    /// Shuts the switch down. Does nothing if it was not initialized.
    pub fn shutdown(&mut self) {
        if let Some(id) = self.switch_id.take() {
            self.hardware_id = None;
            info!("Shutdown switch {}", id);
        }
    }

    pub fn is_initialized(&self) -> bool {
        self.switch_id.is_some()
    }

    pub fn switch_id(&self) -> Option<SwitchOid> {
        self.switch_id
    }

    pub fn hardware_id(&self) -> Option<&str> {
        self.hardware_id.as_deref()
    }

    /// Number of ports, whether or not the switch is initialized.
    pub fn port_count(&self) -> u32 {
        self.port_count
    }

    /// Port IDs of every switch port.
    ///
    /// # Errors
    ///
    /// Returns `Uninitialized` before [`initialize`](Self::initialize).
    pub fn port_list(&self) -> SaiResult<Vec<PortOid>> {
        if !self.is_initialized() {
            return Err(SaiError::Uninitialized);
        }
        Ok((0..self.port_count).map(PortOid::from_index).collect())
    }

    /// Reads switch attributes through the metadata dispatcher.
    pub fn get_switch_attribute(&self, attrs: &mut [SaiAttribute<SwitchAttr>]) -> SaiResult<()> {
        trace!("Enter get_switch_attribute");

        let switch_id = self.switch_id.ok_or(SaiError::Uninitialized)?;
        get_attributes(
            self,
            switch_id.as_raw(),
            "switch",
            SWITCH_ATTRIBS,
            SWITCH_VENDOR_ATTRIBS,
            attrs,
        )
    }
}
