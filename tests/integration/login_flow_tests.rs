//! keybase.1.login end to end through `Server` + `LocalClient`.

use kbrpc::RpcError;
use kbrpc::protocol::login::{
    AccountDeleteArg, LoginArg, LoginClient, LoginOneshotArg, LogoutArg, PaperKeySubmitArg,
};
use kbrpc::protocol::{ClientType, DeviceTypeV2, ErrorUnwrapper, Status, StatusCode};
use kbrpc::rpc::{GenericClient, LocalClient, call_typed};
use rmpv::Value;

use crate::mock_services::{Harness, MockLogin, PAPER_KEY, PASSPHRASE};

fn login_arg(username: &str, paper_key: &str) -> LoginArg {
    LoginArg {
        session_id: 1,
        device_type: DeviceTypeV2::desktop(),
        username: username.to_owned(),
        client_type: ClientType::Cli,
        do_user_switch: false,
        paper_key: paper_key.to_owned(),
        device_name: "laptop".to_owned(),
    }
}

fn code_of(err: &RpcError) -> i32 {
    err.status().map(|s| s.code).unwrap_or_else(|| panic!("no status in {err}"))
}

#[test]
fn login_then_logout() {
    let h = Harness::new(MockLogin::with_accounts(&["t_alice", "t_bob"]));
    let cli = LoginClient::new(h.client());

    cli.login(&login_arg("t_alice", "")).unwrap();
    let accounts = cli.get_configured_accounts(1).unwrap();
    assert_eq!(accounts.len(), 2);
    assert!(accounts.iter().find(|a| a.username == "t_alice").unwrap().is_current);
    assert!(!accounts.iter().find(|a| a.username == "t_bob").unwrap().is_current);
    assert_eq!(accounts[0].fullname.as_str(), "t_alice example");

    cli.logout(&LogoutArg {
        session_id: 1,
        force: false,
        keep_secrets: true,
    })
    .unwrap();
    assert!(h.login.current.lock().unwrap().is_none());

    assert_eq!(
        *h.login.calls.lock().unwrap(),
        [
            "keybase.1.login.login",
            "keybase.1.login.getConfiguredAccounts",
            "keybase.1.login.logout"
        ]
    );
}

#[test]
fn empty_account_list() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());
    assert!(cli.get_configured_accounts(0).unwrap().is_empty());
}

#[test]
fn second_login_reports_already_logged_in() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());
    cli.login(&login_arg("t_alice", "")).unwrap();

    let err = cli.login(&login_arg("t_bob", "")).unwrap_err();
    assert_eq!(code_of(&err), StatusCode::SCAlreadyLoggedIn.value());
    assert!(err.status().unwrap().desc.contains("t_alice"));
}

#[test]
fn bad_paper_key_is_bad_login_password() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());

    let err = cli.login(&login_arg("t_alice", "wrong words")).unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code, StatusCode::SCBadLoginPassword.value());
    assert_eq!(status.name, "ERROR");
    assert_eq!(status.desc, "bad paper key");

    cli.login_oneshot(&LoginOneshotArg {
        session_id: 2,
        username: "t_alice".into(),
        paper_key: PAPER_KEY.into(),
    })
    .unwrap();
}

#[test]
fn login_required_paths() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());

    assert_eq!(code_of(&cli.unlock(1).unwrap_err()), StatusCode::SCLoginRequired.value());
    assert_eq!(code_of(&cli.paper_key(1).unwrap_err()), StatusCode::SCLoginRequired.value());

    let err = cli
        .logout(&LogoutArg {
            session_id: 1,
            force: false,
            keep_secrets: false,
        })
        .unwrap_err();
    assert_eq!(code_of(&err), StatusCode::SCNoSession.value());
}

#[test]
fn paper_key_submit() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());
    cli.paper_key_submit(&PaperKeySubmitArg {
        session_id: 1,
        paper_phrase: PAPER_KEY.into(),
    })
    .unwrap();
    assert!(
        cli.paper_key_submit(&PaperKeySubmitArg {
            session_id: 1,
            paper_phrase: "nope".into(),
        })
        .is_err()
    );
}

#[test]
fn account_delete_optional_passphrase() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());
    cli.login(&login_arg("t_alice", "")).unwrap();

    let err = cli
        .account_delete(&AccountDeleteArg {
            session_id: 1,
            passphrase: None,
        })
        .unwrap_err();
    assert_eq!(code_of(&err), StatusCode::SCInputCanceled.value());

    cli.account_delete(&AccountDeleteArg {
        session_id: 1,
        passphrase: Some(PASSPHRASE.into()),
    })
    .unwrap();
    assert!(h.login.current.lock().unwrap().is_none());
}

#[test]
fn is_online_has_no_arguments() {
    let h = Harness::new(MockLogin {
        offline: true,
        ..MockLogin::default()
    });
    let cli = LoginClient::new(h.client());
    assert!(!cli.is_online().unwrap());
}

#[test]
fn anyhow_errors_become_generic() {
    let h = Harness::new(MockLogin::default());
    let cli = LoginClient::new(h.client());

    let err = cli.recover_account_from_email_address("not-an-email").unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code, StatusCode::SCGeneric.value());
    assert_eq!(status.name, "GENERIC");
    assert!(status.desc.contains("not-an-email"));

    cli.recover_account_from_email_address("t_alice@example.com").unwrap();
}

#[test]
fn unknown_method_is_generic_error() {
    let h = Harness::new(MockLogin::default());
    let c = h.client();

    let err = call_typed::<_, _, ()>(&c, "keybase.1.login.noSuchMethod", &Value::Map(vec![]), None)
        .unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code, StatusCode::SCGeneric.value());
    assert!(status.desc.contains("noSuchMethod"));

    let err = c.call("keybase.1.nowhere.ping", Value::Map(vec![]), None).unwrap_err();
    assert!(err.status().unwrap().desc.contains("keybase.1.nowhere"));
}

#[test]
fn mistyped_argument_is_rejected() {
    let h = Harness::new(MockLogin::default());
    let c = h.client();

    // `force` must be a bool.
    let arg = Value::Map(vec![
        (Value::from("sessionID"), Value::from(1)),
        (Value::from("force"), Value::from("yes")),
        (Value::from("keepSecrets"), Value::from(false)),
    ]);
    let err = c.call("keybase.1.login.logout", arg, None).unwrap_err();
    let status = err.status().unwrap();
    assert_eq!(status.code, StatusCode::SCGeneric.value());
    assert!(status.desc.contains("invalid argument for keybase.1.login.logout"));
    assert!(h.login.calls.lock().unwrap().is_empty());
}

#[derive(Debug, thiserror::Error)]
#[error("bad password: {0}")]
struct BadPassword(String);

#[test]
fn upcaster_maps_statuses_to_local_errors() {
    let h = Harness::new(MockLogin::default());
    let unwrapper = ErrorUnwrapper::with_upcaster(|s: Status| {
        if s.code == StatusCode::SCBadLoginPassword.value() {
            anyhow::Error::new(BadPassword(s.desc))
        } else {
            anyhow::Error::new(s)
        }
    });
    let cli = LoginClient::new(LocalClient::new(h.server.clone()).with_unwrapper(unwrapper));

    let err = cli.login(&login_arg("t_alice", "wrong")).unwrap_err();
    let RpcError::Application(app) = &err else {
        panic!("expected application error, got {err}");
    };
    assert_eq!(app.downcast_ref::<BadPassword>().unwrap().0, "bad paper key");
    assert!(err.status().is_none());

    let err = cli.login(&login_arg("", "")).unwrap_err();
    assert_eq!(code_of(&err), StatusCode::SCBadUsername.value());
}
