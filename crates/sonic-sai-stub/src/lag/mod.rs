//! Link Aggregation Group (LAG) management.
//!
//! - [`LagTable`]: fixed-capacity registry of LAG slots and their port masks
//! - [`LagApi`]: create/remove of LAGs and LAG members, attribute reads
//!
//! A LAG member has no storage of its own: it is one bit in its LAG's port
//! mask, and its object ID is derived from the port index.

mod api;
mod table;

pub use api::{LagApi, LagAttr, LagMemberAttr};
pub use table::{LagEntry, LagTable, LagTableDump, PortMask, PORT_MASK_CAPACITY};
