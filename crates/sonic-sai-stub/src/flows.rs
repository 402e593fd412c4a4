//! Scripted LAG flows.
//!
//! Two end-to-end scenarios driven through [`SaiContext`]: a basic membership
//! flow and a limits flow exercising every capacity and in-use corner case.
//! Each step checks the status it expects and stops at the first deviation.

use std::fmt;

use log::info;
use thiserror::Error;

use crate::context::SaiContext;
use crate::error::{SaiError, SaiResult, SaiStatus};
use crate::lag::{LagApi, LagAttr, LagMemberAttr};
use crate::meta::SaiAttribute;
use crate::types::{LagMemberOid, LagOid, PortOid};

/// Object list capacity used for port list reads.
const PORT_LIST_CAPACITY: u32 = 64;

/// Error type for flow execution.
#[derive(Debug, Error)]
pub enum FlowError {
    #[error("{step}: {source}")]
    Sai {
        step: &'static str,
        #[source]
        source: SaiError,
    },

    #[error("{step}: expected {expected}, got {actual}")]
    UnexpectedStatus {
        step: &'static str,
        expected: SaiStatus,
        actual: SaiStatus,
    },

    #[error("{step}: {message}")]
    Mismatch { step: &'static str, message: String },

    #[error("flow precondition not met: {0}")]
    Precondition(String),
}

/// A scripted LAG flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LagFlow {
    /// Two LAGs with two members each, attribute reads, teardown.
    Basic,
    /// Table and group capacity limits, reuse and in-use errors.
    Limits,
}

impl LagFlow {
    pub const ALL: [LagFlow; 2] = [LagFlow::Basic, LagFlow::Limits];

    /// Runs the flow against an initialized context.
    pub fn run(self, ctx: &mut SaiContext) -> Result<(), FlowError> {
        info!("RUNNING >>> LAG FLOW {}", self);
        match self {
            LagFlow::Basic => run_basic_flow(ctx),
            LagFlow::Limits => run_limits_flow(ctx),
        }
    }
}

impl fmt::Display for LagFlow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LagFlow::Basic => write!(f, "basic"),
            LagFlow::Limits => write!(f, "limits"),
        }
    }
}

fn expect_ok<T>(step: &'static str, result: SaiResult<T>) -> Result<T, FlowError> {
    result.map_err(|source| FlowError::Sai { step, source })
}

fn expect_status<T>(
    step: &'static str,
    result: SaiResult<T>,
    expected: SaiStatus,
) -> Result<(), FlowError> {
    let actual = SaiStatus::of(&result);
    if actual != expected {
        return Err(FlowError::UnexpectedStatus {
            step,
            expected,
            actual,
        });
    }
    Ok(())
}

fn member_attrs(lag: LagOid, port: PortOid) -> [SaiAttribute<LagMemberAttr>; 2] {
    [
        SaiAttribute::oid(LagMemberAttr::LagId, lag.as_raw()),
        SaiAttribute::oid(LagMemberAttr::PortId, port.as_raw()),
    ]
}

fn switch_ports(ctx: &SaiContext, needed: usize) -> Result<Vec<PortOid>, FlowError> {
    let ports = expect_ok("get switch port list", ctx.switch_api().port_list())?;
    if ports.len() < needed {
        return Err(FlowError::Precondition(format!(
            "flow needs {} ports, switch has {}",
            needed,
            ports.len()
        )));
    }
    Ok(ports)
}

/// Reads the port list attribute of `lag` and logs it.
fn read_port_list(
    api: &LagApi,
    step: &'static str,
    lag: LagOid,
) -> Result<Vec<PortOid>, FlowError> {
    let mut attrs = [SaiAttribute::obj_list(LagAttr::PortList, PORT_LIST_CAPACITY)];
    expect_ok(step, api.get_lag_attribute(lag, &mut attrs))?;

    let ports: Vec<PortOid> = attrs[0]
        .value
        .as_obj_list()
        .map(|list| {
            list.list
                .iter()
                .map(|raw| PortOid::from_raw_unchecked(*raw))
                .collect()
        })
        .unwrap_or_default();

    let rendered: Vec<String> = ports
        .iter()
        .enumerate()
        .map(|(i, port)| format!("{}:0x{:010x}", i, port.as_raw()))
        .collect();
    info!(
        "GET LAG 0x{:010x} PORTS LIST ({} ports): {}",
        lag.as_raw(),
        ports.len(),
        rendered.join(" ")
    );

    Ok(ports)
}

fn expect_ports(
    step: &'static str,
    actual: &[PortOid],
    expected: &[PortOid],
) -> Result<(), FlowError> {
    if actual != expected {
        return Err(FlowError::Mismatch {
            step,
            message: format!("port list {:?}, expected {:?}", actual, expected),
        });
    }
    Ok(())
}

/// Two LAGs with two members each; reads port lists and member attributes,
/// then tears everything down member first.
pub fn run_basic_flow(ctx: &mut SaiContext) -> Result<(), FlowError> {
    let ports = switch_ports(ctx, 4)?;
    let api = expect_ok("query LAG API", ctx.lag_api_mut())?;

    let lag_a = expect_ok("create LAG 1", api.create_lag(&[]))?;
    let m0 = expect_ok(
        "create LAG member 1",
        api.create_lag_member(&member_attrs(lag_a, ports[0])),
    )?;
    let m1 = expect_ok(
        "create LAG member 2",
        api.create_lag_member(&member_attrs(lag_a, ports[1])),
    )?;

    let lag_b = expect_ok("create LAG 2", api.create_lag(&[]))?;
    let m2 = expect_ok(
        "create LAG member 3",
        api.create_lag_member(&member_attrs(lag_b, ports[2])),
    )?;
    let m3 = expect_ok(
        "create LAG member 4",
        api.create_lag_member(&member_attrs(lag_b, ports[3])),
    )?;

    let list = read_port_list(api, "get LAG 1 port list", lag_a)?;
    expect_ports("get LAG 1 port list", &list, &ports[0..2])?;
    let list = read_port_list(api, "get LAG 2 port list", lag_b)?;
    expect_ports("get LAG 2 port list", &list, &ports[2..4])?;

    let mut attrs = [SaiAttribute::oid(LagMemberAttr::LagId, 0)];
    expect_ok("get LAG member 1 LAG ID", api.get_lag_member_attribute(m0, &mut attrs))?;
    info!(
        "GET LAG MEMBER 0x{:010x} LAG_ID: 0x{:010x}",
        m0.as_raw(),
        attrs[0].value.as_oid().unwrap_or(0)
    );
    if attrs[0].value.as_oid() != Some(lag_a.as_raw()) {
        return Err(FlowError::Mismatch {
            step: "get LAG member 1 LAG ID",
            message: format!("expected {}", lag_a),
        });
    }

    let mut attrs = [SaiAttribute::oid(LagMemberAttr::PortId, 0)];
    expect_ok("get LAG member 3 port ID", api.get_lag_member_attribute(m2, &mut attrs))?;
    info!(
        "GET LAG MEMBER 0x{:010x} PORT_ID: 0x{:010x}",
        m2.as_raw(),
        attrs[0].value.as_oid().unwrap_or(0)
    );
    if attrs[0].value.as_oid() != Some(ports[2].as_raw()) {
        return Err(FlowError::Mismatch {
            step: "get LAG member 3 port ID",
            message: format!("expected {}", ports[2]),
        });
    }

    expect_ok("remove LAG member 2", api.remove_lag_member(m1))?;
    let list = read_port_list(api, "get LAG 1 port list", lag_a)?;
    expect_ports("get LAG 1 port list", &list, &ports[0..1])?;

    expect_ok("remove LAG member 3", api.remove_lag_member(m2))?;
    let list = read_port_list(api, "get LAG 2 port list", lag_b)?;
    expect_ports("get LAG 2 port list", &list, &ports[3..4])?;

    expect_ok("remove LAG member 1", api.remove_lag_member(m0))?;
    expect_ok("remove LAG member 4", api.remove_lag_member(m3))?;

    expect_ok("remove LAG 1", api.remove_lag(lag_a))?;
    expect_ok("remove LAG 2", api.remove_lag(lag_b))?;

    Ok(())
}

/// Fills the LAG table and one LAG to capacity, checks the overflow, reuse
/// and in-use errors, then tears everything down.
pub fn run_limits_flow(ctx: &mut SaiContext) -> Result<(), FlowError> {
    let max_lags = ctx.config().lag.max_lags as usize;
    let max_members = ctx.config().lag.max_ports_per_lag as usize;
    if max_lags < 3 {
        return Err(FlowError::Precondition(format!(
            "flow needs at least 3 LAGs, table has {}",
            max_lags
        )));
    }
    if max_members < 10 {
        return Err(FlowError::Precondition(format!(
            "flow needs at least 10 members per LAG, limit is {}",
            max_members
        )));
    }

    let ports = switch_ports(ctx, max_members + 1)?;
    let api = expect_ok("query LAG API", ctx.lag_api_mut())?;

    let mut lags = Vec::with_capacity(max_lags);
    for _ in 0..max_lags {
        lags.push(expect_ok("create LAG", api.create_lag(&[]))?);
    }

    expect_status(
        "create LAG beyond table capacity",
        api.create_lag(&[]),
        SaiStatus::InsufficientResources,
    )?;

    let freed = lags[2];
    expect_ok("remove 3rd LAG", api.remove_lag(freed))?;
    let reused = expect_ok("create LAG in freed slot", api.create_lag(&[]))?;
    if reused != freed {
        return Err(FlowError::Mismatch {
            step: "create LAG in freed slot",
            message: format!("got {}, expected freed {}", reused, freed),
        });
    }

    let lag = lags[0];
    let mut members: Vec<LagMemberOid> = Vec::with_capacity(max_members + 1);
    for port in &ports[..max_members] {
        members.push(expect_ok(
            "create LAG member",
            api.create_lag_member(&member_attrs(lag, *port)),
        )?);
    }

    let extra = ports[max_members];
    expect_status(
        "create LAG member beyond LAG capacity",
        api.create_lag_member(&member_attrs(lag, extra)),
        SaiStatus::InsufficientResources,
    )?;

    let removed = members[9];
    expect_ok("remove 10th LAG member", api.remove_lag_member(removed))?;
    members.push(expect_ok(
        "create LAG member in freed place",
        api.create_lag_member(&member_attrs(lag, extra)),
    )?);

    let list = read_port_list(api, "get LAG 1 port list", lag)?;
    let expected: Vec<PortOid> = ports[..=max_members]
        .iter()
        .copied()
        .filter(|port| *port != ports[9])
        .collect();
    expect_ports("get LAG 1 port list", &list, &expected)?;

    expect_status("remove LAG with members", api.remove_lag(lag), SaiStatus::ObjectInUse)?;
    for other in &lags[1..] {
        expect_ok("remove LAG", api.remove_lag(*other))?;
    }

    for member in &members {
        let result = api.remove_lag_member(*member);
        if *member == removed {
            expect_status("remove already removed LAG member", result, SaiStatus::ItemNotFound)?;
        } else {
            expect_ok("remove LAG member", result)?;
        }
    }
    expect_ok("remove LAG 1", api.remove_lag(lag))?;

    Ok(())
}
