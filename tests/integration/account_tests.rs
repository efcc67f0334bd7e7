//! keybase.1.account end to end.

use kbrpc::protocol::account::{
    AccountClient, ContactSettings, EmailChangeArg, EnterResetPipelineArg, GuessCurrentLocationArg,
    PassphraseChangeArg, PassphraseCheckArg, SetLockdownModeArg, TeamContactSettings,
};
use kbrpc::protocol::{StatusCode, TeamId};

use crate::mock_services::{Harness, MockLogin, PASSPHRASE};

fn harness() -> Harness {
    Harness::new(MockLogin::default())
}

#[test]
fn passphrase_check_and_change() {
    let h = harness();
    let cli = AccountClient::new(h.client());

    assert!(
        cli.passphrase_check(&PassphraseCheckArg {
            session_id: 1,
            passphrase: PASSPHRASE.into(),
        })
        .unwrap()
    );

    let err = cli
        .passphrase_change(&PassphraseChangeArg {
            session_id: 1,
            old_passphrase: "wrong".into(),
            passphrase: "new one".into(),
            force: false,
        })
        .unwrap_err();
    assert_eq!(err.status().unwrap().code, StatusCode::SCBadLoginPassword.value());

    cli.passphrase_change(&PassphraseChangeArg {
        session_id: 1,
        old_passphrase: String::new(),
        passphrase: "new one".into(),
        force: true,
    })
    .unwrap();
    assert!(
        !cli.passphrase_check(&PassphraseCheckArg {
            session_id: 1,
            passphrase: PASSPHRASE.into(),
        })
        .unwrap()
    );
}

#[test]
fn email_change_rejects_same_address() {
    let h = harness();
    let cli = AccountClient::new(h.client());
    let err = cli
        .email_change(&EmailChangeArg {
            session_id: 1,
            new_email: "t_alice@example.com".into(),
        })
        .unwrap_err();
    assert_eq!(err.status().unwrap().code, StatusCode::SCExists.value());

    cli.email_change(&EmailChangeArg {
        session_id: 1,
        new_email: "alice@example.org".into(),
    })
    .unwrap();
    assert_eq!(*h.account.email.lock().unwrap(), "alice@example.org");
}

#[test]
fn has_server_keys_takes_bare_session_id() {
    let h = harness();
    let cli = AccountClient::new(h.client());
    assert!(cli.has_server_keys(2).unwrap().has_server_keys);
    assert!(!cli.has_server_keys(3).unwrap().has_server_keys);
}

#[test]
fn lockdown_history_accumulates() {
    let h = harness();
    let cli = AccountClient::new(h.client());

    let initial = cli.get_lockdown_mode(1).unwrap();
    assert!(!initial.status);
    assert!(initial.history.is_empty());

    for enabled in [true, false, true] {
        cli.set_lockdown_mode(&SetLockdownModeArg { session_id: 1, enabled })
            .unwrap();
    }
    let res = cli.get_lockdown_mode(1).unwrap();
    assert!(res.status);
    assert_eq!(res.history.len(), 3);
    assert!(res.history[1].creation_time.after(res.history[0].creation_time));
    assert_eq!(res.history[2].device_id.as_str(), "e5f2a8f6f0b6e1a05dd8b9e5e2d9c418");
}

#[test]
fn reset_pipeline_and_cancel() {
    let h = harness();
    let cli = AccountClient::new(h.client());

    let err = cli.cancel_reset(1).unwrap_err();
    assert_eq!(err.status().unwrap().code, StatusCode::SCNotFound.value());

    cli.enter_reset_pipeline(&EnterResetPipelineArg {
        session_id: 1,
        username_or_email: "t_alice".into(),
        passphrase: String::new(),
        interactive: false,
    })
    .unwrap();
    cli.cancel_reset(1).unwrap();
    assert!(!*h.account.reset_pending.lock().unwrap());
}

#[test]
fn contact_settings_roundtrip() {
    let h = harness();
    let cli = AccountClient::new(h.client());

    let fresh = cli.user_get_contact_settings().unwrap();
    assert_eq!(fresh, ContactSettings::default());

    let settings = ContactSettings {
        version: Some(3),
        allow_followee_degrees: 1,
        allow_good_teams: true,
        enabled: true,
        teams: vec![
            TeamContactSettings {
                team_id: TeamId::make_test(1, false),
                enabled: true,
            },
            TeamContactSettings {
                team_id: TeamId::make_test_sub(2, true),
                enabled: false,
            },
        ],
    };
    cli.user_set_contact_settings(settings.clone()).unwrap();
    assert_eq!(cli.user_get_contact_settings().unwrap(), settings);
}

#[test]
fn string_result() {
    let h = harness();
    let cli = AccountClient::new(h.client());
    let loc = cli
        .guess_current_location(&GuessCurrentLocationArg {
            session_id: 1,
            default_country: "NZ".into(),
        })
        .unwrap();
    assert_eq!(loc, "NZ");
}
