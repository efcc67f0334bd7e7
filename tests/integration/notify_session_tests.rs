//! keybase.1.NotifySession: notifications have no reply, calls do.

use kbrpc::protocol::StatusCode;
use kbrpc::protocol::notify_session::NotifySessionClient;
use kbrpc::rpc::{GenericClient, RpcMessage, to_value};
use rmpv::Value;

use crate::mock_services::{Harness, MockLogin};

#[test]
fn logged_out_is_delivered_without_reply() {
    let h = Harness::new(MockLogin::default());
    let cli = NotifySessionClient::new(h.client());

    cli.logged_out().unwrap();
    cli.logged_in("t_alice").unwrap();

    assert_eq!(*h.session.events.lock().unwrap(), ["loggedOut", "loggedIn:t_alice"]);
}

#[test]
fn server_never_replies_to_notifications() {
    let h = Harness::new(MockLogin::default());
    let msg = RpcMessage::Notify {
        method: "keybase.1.NotifySession.loggedOut".into(),
        arg: Value::Map(vec![]),
    };
    assert_eq!(h.server.dispatch(7, msg), None);

    // Failing and unknown notifications are dropped silently too.
    let msg = RpcMessage::Notify {
        method: "keybase.1.NotifySession.noSuch".into(),
        arg: Value::Nil,
    };
    assert_eq!(h.server.dispatch(7, msg), None);
    assert_eq!(h.session.events.lock().unwrap().len(), 1);
}

#[test]
fn logged_in_errors_reach_the_caller() {
    let h = Harness::new(MockLogin::default());
    let cli = NotifySessionClient::new(h.client());
    let err = cli.logged_in("").unwrap_err();
    assert_eq!(err.status().unwrap().code, StatusCode::SCBadUsername.value());
}

#[test]
fn cancel_is_ignored() {
    let h = Harness::new(MockLogin::default());
    let msg = RpcMessage::Cancel {
        seqno: 3,
        method: "keybase.1.NotifySession.loggedIn".into(),
    };
    assert_eq!(h.server.dispatch(1, msg), None);
    assert!(h.session.events.lock().unwrap().is_empty());
}

#[test]
fn generic_notify_matches_typed_stub() {
    let h = Harness::new(MockLogin::default());
    let c = h.client();
    c.notify(
        "keybase.1.NotifySession.loggedOut",
        to_value(&serde_json::json!({})).unwrap(),
        None,
    )
    .unwrap();
    assert_eq!(*h.session.events.lock().unwrap(), ["loggedOut"]);
}
