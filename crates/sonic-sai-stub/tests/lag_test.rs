//! Integration tests for the stub LAG API
//!
//! These tests drive the LAG API through `SaiContext` the way a SAI client
//! would, and check the table invariants after every mutating call.

use pretty_assertions::assert_eq;
use sonic_sai_stub::{
    LagApi, LagAttr, LagMemberAttr, LagMemberOid, LagOid, PortOid, SaiAttribute, SaiContext,
    SaiError, SaiStatus, StubConfig,
};

fn context() -> SaiContext {
    let mut ctx = SaiContext::new(StubConfig::default()).unwrap();
    ctx.initialize_switch("HW_ID").unwrap();
    ctx
}

fn port(index: u32) -> PortOid {
    PortOid::from_index(index)
}

fn add_member(api: &mut LagApi, lag: LagOid, port_index: u32) -> Result<LagMemberOid, SaiError> {
    let result = api.create_lag_member(&[
        SaiAttribute::oid(LagMemberAttr::LagId, lag.as_raw()),
        SaiAttribute::oid(LagMemberAttr::PortId, port(port_index).as_raw()),
    ]);
    assert_invariants(api);
    result
}

fn port_list(api: &LagApi, lag: LagOid) -> Vec<PortOid> {
    let mut attrs = [SaiAttribute::obj_list(LagAttr::PortList, 64)];
    api.get_lag_attribute(lag, &mut attrs).unwrap();
    attrs[0]
        .value
        .as_obj_list()
        .unwrap()
        .list
        .iter()
        .map(|raw| PortOid::from_raw(*raw).unwrap())
        .collect()
}

/// Port masks are pairwise disjoint and every count matches its mask.
fn assert_invariants(api: &LagApi) {
    let table = api.table();
    let occupied: Vec<_> = table.occupied().collect();

    for (slot, entry) in &occupied {
        assert_eq!(
            entry.member_count(),
            entry.ports().len(),
            "LAG slot {} count out of sync with mask",
            slot
        );
        assert!(entry.member_count() <= api.max_ports_per_lag());
    }

    for (i, (slot_a, a)) in occupied.iter().enumerate() {
        for (slot_b, b) in occupied.iter().skip(i + 1) {
            assert!(
                a.ports().is_disjoint(b.ports()),
                "LAG slots {} and {} share a port",
                slot_a,
                slot_b
            );
        }
    }

    assert!(table.len() <= table.capacity());
}

#[test]
fn test_end_to_end_membership() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();

    let a = api.create_lag(&[]).unwrap();
    let b = api.create_lag(&[]).unwrap();

    let a1 = add_member(api, a, 1).unwrap();
    let a3 = add_member(api, a, 3).unwrap();
    let b5 = add_member(api, b, 5).unwrap();

    assert_eq!(port_list(api, a), vec![port(1), port(3)]);
    assert_eq!(port_list(api, b), vec![port(5)]);

    api.remove_lag_member(a3).unwrap();
    assert_invariants(api);
    assert_eq!(port_list(api, a), vec![port(1)]);

    let err = add_member(api, a, 5).unwrap_err();
    assert_eq!(err.status(), SaiStatus::ItemAlreadyExists);
    assert_eq!(port_list(api, a), vec![port(1)]);
    assert_eq!(port_list(api, b), vec![port(5)]);

    api.remove_lag_member(a1).unwrap();
    api.remove_lag(a).unwrap();
    api.remove_lag_member(b5).unwrap();
    api.remove_lag(b).unwrap();

    assert!(api.table().is_empty());
}

#[test]
fn test_table_full_and_slot_reuse() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();

    let lags: Vec<LagOid> = (0..5).map(|_| api.create_lag(&[]).unwrap()).collect();
    assert_eq!(
        api.create_lag(&[]).unwrap_err().status(),
        SaiStatus::InsufficientResources
    );

    api.remove_lag(lags[2]).unwrap();
    let again = api.create_lag(&[]).unwrap();
    assert_eq!(again, lags[2]);
    assert_eq!(api.table().find_by_oid(again), Some(2));
}

#[test]
fn test_lag_capacity_and_retry() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();
    let lag = api.create_lag(&[]).unwrap();

    let members: Vec<LagMemberOid> = (0..16).map(|p| add_member(api, lag, p).unwrap()).collect();
    assert_eq!(
        add_member(api, lag, 16).unwrap_err().status(),
        SaiStatus::InsufficientResources
    );

    api.remove_lag_member(members[9]).unwrap();
    add_member(api, lag, 16).unwrap();

    let ports = port_list(api, lag);
    assert_eq!(ports.len(), 16);
    assert!(!ports.contains(&port(9)));
    assert!(ports.contains(&port(16)));
}

#[test]
fn test_remove_lag_in_use_keeps_members() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();
    let lag = api.create_lag(&[]).unwrap();
    let m0 = add_member(api, lag, 0).unwrap();
    let m1 = add_member(api, lag, 1).unwrap();

    assert_eq!(api.remove_lag(lag).unwrap_err().status(), SaiStatus::ObjectInUse);
    assert_eq!(port_list(api, lag), vec![port(0), port(1)]);

    api.remove_lag_member(m0).unwrap();
    assert_eq!(api.remove_lag(lag).unwrap_err().status(), SaiStatus::ObjectInUse);

    api.remove_lag_member(m1).unwrap();
    api.remove_lag(lag).unwrap();
}

#[test]
fn test_remove_member_twice() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();
    let lag = api.create_lag(&[]).unwrap();
    let member = add_member(api, lag, 4).unwrap();

    api.remove_lag_member(member).unwrap();
    assert_eq!(
        api.remove_lag_member(member).unwrap_err().status(),
        SaiStatus::ItemNotFound
    );
}

#[test]
fn test_member_attributes() {
    let mut ctx = context();
    let api = ctx.lag_api_mut().unwrap();
    let _first = api.create_lag(&[]).unwrap();
    let lag = api.create_lag(&[]).unwrap();
    let member = add_member(api, lag, 12).unwrap();

    assert_eq!(api.get_lag_member_lag(member).unwrap(), lag);
    assert_eq!(api.get_lag_member_port(member).unwrap(), port(12));

    let mut attrs = [SaiAttribute::oid(LagMemberAttr::PortId, 0)];
    api.get_lag_member_attribute(member, &mut attrs).unwrap();
    assert_eq!(attrs[0].value.as_oid(), Some(port(12).as_raw()));
}

#[test]
fn test_get_with_empty_attribute_list() {
    let ctx = context();
    let api = ctx.lag_api().unwrap();
    let mut attrs: [SaiAttribute<LagAttr>; 0] = [];
    let err = api
        .get_lag_attribute(LagOid::from_index(0), &mut attrs)
        .unwrap_err();
    assert_eq!(err.status(), SaiStatus::InvalidParameter);
}

#[test]
fn test_lag_api_unavailable_after_shutdown() {
    let mut ctx = context();
    ctx.lag_api_mut().unwrap().create_lag(&[]).unwrap();
    ctx.shutdown_switch();

    assert_eq!(ctx.lag_api().unwrap_err().status(), SaiStatus::Uninitialized);
}

#[test]
fn test_custom_capacities() {
    let config = StubConfig::from_json_str(
        r#"{ "switch": { "port_count": 8 }, "lag": { "max_lags": 2, "max_ports_per_lag": 3 } }"#,
    )
    .unwrap();
    let mut ctx = SaiContext::new(config).unwrap();
    ctx.initialize_switch("HW_ID").unwrap();
    let api = ctx.lag_api_mut().unwrap();

    let lag = api.create_lag(&[]).unwrap();
    api.create_lag(&[]).unwrap();
    assert!(api.create_lag(&[]).is_err());

    for p in 0..3 {
        add_member(api, lag, p).unwrap();
    }
    assert_eq!(
        add_member(api, lag, 3).unwrap_err().status(),
        SaiStatus::InsufficientResources
    );

    let other = LagOid::from_index(1);
    assert_eq!(
        add_member(api, other, 8).unwrap_err().status(),
        SaiStatus::InvalidParameter
    );
}

#[test]
fn test_port_count_wider_than_mask_rejected() {
    let mut config = StubConfig::default();
    config.switch.port_count = 200;
    assert!(SaiContext::new(config).is_err());

    // A LAG API built directly never accepts ports past the mask.
    let mut api = LagApi::new(&StubConfig::default().lag, 200);
    let lag = api.create_lag(&[]).unwrap();
    assert_eq!(
        add_member(&mut api, lag, 150).unwrap_err().status(),
        SaiStatus::InvalidParameter
    );
    assert!(port_list(&api, lag).is_empty());
}
