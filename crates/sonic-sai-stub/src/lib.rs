//! Stub SAI (Switch Abstraction Interface) with LAG support.
//!
//! This crate implements the LAG and LAG member part of the SAI API on top of
//! an in-memory table, together with the small slice of switch and metadata
//! machinery it needs. It is meant for exercising SAI clients without
//! hardware.
//!
//! # Architecture
//!
//! - [`types`]: type-safe object IDs and their encoding
//! - [`error`]: error types and status handling
//! - [`meta`]: attribute metadata validation and the getter dispatcher
//! - [`switch`]: switch initialization and port enumeration
//! - [`lag`]: the LAG table and the LAG/LAG member API
//! - [`context`]: owner of all stub state
//! - [`config`]: capacities and port count
//! - [`flows`]: scripted end-to-end LAG flows
//!
//! # Example
//!
//! ```
//! use sonic_sai_stub::{LagMemberAttr, SaiAttribute, SaiContext, StubConfig};
//!
//! let mut ctx = SaiContext::new(StubConfig::default())?;
//! ctx.initialize_switch("HW_ID")?;
//! let port = ctx.switch_api().port_list()?[0];
//!
//! let lag_api = ctx.lag_api_mut()?;
//! let lag = lag_api.create_lag(&[])?;
//! let member = lag_api.create_lag_member(&[
//!     SaiAttribute::oid(LagMemberAttr::LagId, lag.as_raw()),
//!     SaiAttribute::oid(LagMemberAttr::PortId, port.as_raw()),
//! ])?;
//! assert_eq!(lag_api.get_lag_ports(lag)?, vec![port]);
//!
//! lag_api.remove_lag_member(member)?;
//! lag_api.remove_lag(lag)?;
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod config;
pub mod context;
pub mod error;
pub mod flows;
pub mod lag;
pub mod meta;
pub mod switch;
pub mod types;

// Re-export commonly used types
pub use types::{
    LagKind, LagMemberKind, LagMemberOid, LagOid, PortKind, PortOid, RawSaiObjectId,
    SaiObjectId, SaiObjectKind, SaiObjectType, SwitchKind, SwitchOid,
};

pub use config::{ConfigError, LagConfig, StubConfig, SwitchConfig};
pub use context::SaiContext;
pub use error::{SaiError, SaiResult, SaiStatus};
pub use flows::{FlowError, LagFlow};
pub use lag::{LagApi, LagAttr, LagMemberAttr, LagTable};
pub use meta::{SaiAttribute, SaiAttributeValue, SaiObjectList};
pub use switch::{SwitchApi, SwitchAttr};
