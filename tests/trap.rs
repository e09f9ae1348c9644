//! Notification assembly and delivery.

mod common;

use common::*;
use snmpc::error::UsageErrorKind;
use snmpc::pdu::PduType;
use snmpc::trap::{self, TrapBinding, Uptime};
use snmpc::{ErrorCategory, Request};
use snmpc::prelude::*;

fn strings(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn trap_carries_uptime_and_trap_oid_first() {
    let agent = FakeAgent::new(Vec::new());
    let session = fake_session(&agent, Version::V2c);

    let bindings = trap::triples(&strings(&[
        "ifIndex.2", "i", "2", "ifDescr.2", "s", "lo0", "sysName.0", "x", "67 77",
    ]))
    .unwrap();
    let notification = trap::assemble(Uptime::Ticks(4200), "linkDown", &bindings).unwrap();
    notification.send(&session).await.unwrap();

    let requests = agent.requests();
    assert_eq!(requests.len(), 1);
    let pdu = &requests[0];
    assert_eq!(pdu.pdu_type, PduType::TrapV2);

    let oids: Vec<_> = pdu.varbinds.iter().map(|vb| vb.oid.clone()).collect();
    assert_eq!(
        oids,
        vec![
            oid!(1, 3, 6, 1, 2, 1, 1, 3, 0),
            oid!(1, 3, 6, 1, 6, 3, 1, 1, 4, 1, 0),
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 1, 2),
            oid!(1, 3, 6, 1, 2, 1, 2, 2, 1, 2, 2),
            sys_name(),
        ]
    );
    assert_eq!(pdu.varbinds[0].value, Value::TimeTicks(4200));
    assert_eq!(
        pdu.varbinds[1].value,
        Value::ObjectIdentifier(oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 3))
    );
    assert_eq!(pdu.varbinds[2].value, Value::Integer(2));
    assert_eq!(pdu.varbinds[3].value, Value::from("lo0"));
    assert_eq!(pdu.varbinds[4].value, Value::from("gw"));
}

#[tokio::test]
async fn trap_uptime_now_reports_host_uptime() {
    let agent = FakeAgent::new(Vec::new());
    let session = fake_session(&agent, Version::V2c);

    let before = trap::host_uptime_ticks() as u32;
    let notification = trap::assemble(Uptime::parse("").unwrap(), "coldStart", &[]).unwrap();
    notification.send(&session).await.unwrap();

    let pdu = &agent.requests()[0];
    assert_eq!(pdu.varbinds.len(), 2);
    match pdu.varbinds[0].value {
        Value::TimeTicks(ticks) => {
            assert!(ticks > 0);
            assert!(ticks >= before);
        }
        ref other => panic!("unexpected uptime value {other:?}"),
    }
}

#[tokio::test]
async fn trap_large_uptime_is_truncated() {
    let agent = FakeAgent::new(Vec::new());
    let session = fake_session(&agent, Version::V2c);

    let uptime = Uptime::parse("4294967396").unwrap();
    trap::assemble(uptime, "warmStart", &[])
        .unwrap()
        .send(&session)
        .await
        .unwrap();

    assert_eq!(agent.requests()[0].varbinds[0].value, Value::TimeTicks(100));
}

#[tokio::test]
async fn bad_binding_sends_nothing() {
    let agent = FakeAgent::new(Vec::new());

    let bindings = vec![
        TrapBinding::new("sysName.0", "s", "gw"),
        TrapBinding::new("sysLocation.0", "a", "300.1.1.1"),
    ];
    let err = trap::assemble(Uptime::Now, "coldStart", &bindings).unwrap_err();

    assert_eq!(err.category(), ErrorCategory::ValueNotation);
    assert!(agent.requests().is_empty());
}

#[tokio::test]
async fn unknown_trap_oid_is_rejected() {
    let err = trap::assemble(Uptime::Now, "noSuchTrap", &[]).unwrap_err();
    assert!(matches!(err, Error::UnknownObject { .. }));
}

#[tokio::test]
async fn incomplete_triple_is_usage_error() {
    let err = trap::triples(&strings(&["sysName.0", "s"])).unwrap_err();
    assert!(matches!(
        err,
        Error::Usage {
            kind: UsageErrorKind::TrapArguments
        }
    ));
}

#[tokio::test]
async fn trap_refused_on_v1() {
    let agent = FakeAgent::new(Vec::new());
    let session = fake_session(&agent, Version::V1);

    let notification = trap::assemble(Uptime::Ticks(1), "coldStart", &[]).unwrap();
    let err = notification.send(&session).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Usage {
            kind: UsageErrorKind::TrapOnV1
        }
    ));
    assert!(agent.requests().is_empty());
}

#[tokio::test]
async fn trap_through_execute_is_refused() {
    let agent = FakeAgent::new(Vec::new());
    let session = fake_session(&agent, Version::V2c);

    let request = Request::trap(0, oid!(1, 3, 6, 1, 6, 3, 1, 1, 5, 1), Vec::new());
    let err = session.execute(&request).await.unwrap_err();

    assert!(matches!(
        err,
        Error::Usage {
            kind: UsageErrorKind::Unconfirmed
        }
    ));
    assert!(agent.requests().is_empty());
}
