//! Real byte streams: a `Connection` talking to `Server::serve` over a
//! Unix socket pair.

use std::os::unix::net::UnixStream;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use kbrpc::protocol::login::{LoginArg, LoginClient, LogoutArg};
use kbrpc::protocol::notify_session::NotifySessionClient;
use kbrpc::protocol::{ClientType, DeviceTypeV2, StatusCode};
use kbrpc::rpc::Connection;
use kbrpc::{RpcConfig, RpcError};

use crate::mock_services::{Harness, MockLogin};

fn spawn_server(h: &Harness) -> (UnixStream, thread::JoinHandle<Result<(), RpcError>>) {
    let (client_end, mut server_end) = UnixStream::pair().unwrap();
    let server = Arc::clone(&h.server);
    let handle = thread::spawn(move || server.serve(&mut server_end));
    (client_end, handle)
}

#[test]
fn calls_and_notifications_over_socket() {
    let h = Harness::new(MockLogin::with_accounts(&["t_alice"]));
    let (sock, server) = spawn_server(&h);
    let conn = Connection::new(sock, &RpcConfig::default());

    {
        let login = LoginClient::new(&conn);
        assert!(login.is_online().unwrap());
        login
            .login(&LoginArg {
                session_id: 1,
                device_type: DeviceTypeV2::desktop(),
                username: "t_alice".into(),
                client_type: ClientType::GuiMain,
                do_user_switch: false,
                paper_key: String::new(),
                device_name: "desk".into(),
            })
            .unwrap();
        assert!(login.get_configured_accounts(1).unwrap()[0].is_current);

        // A notification followed by a call: the call's reply is the
        // next thing on the wire.
        NotifySessionClient::new(&conn).logged_out().unwrap();
        login
            .logout(&LogoutArg {
                session_id: 1,
                force: false,
                keep_secrets: false,
            })
            .unwrap();

        let err = login.unlock(1).unwrap_err();
        assert_eq!(err.status().unwrap().code, StatusCode::SCLoginRequired.value());
    }

    drop(conn);
    server.join().unwrap().unwrap();
    assert_eq!(*h.session.events.lock().unwrap(), ["loggedOut"]);
}

#[test]
fn concurrent_callers_share_one_connection() {
    let h = Harness::new(MockLogin::default());
    let (sock, server) = spawn_server(&h);
    let conn = Arc::new(Connection::new(sock, &RpcConfig::default()));

    let workers: Vec<_> = (0..4)
        .map(|_| {
            let conn = Arc::clone(&conn);
            thread::spawn(move || {
                let login = LoginClient::new(conn);
                for _ in 0..10 {
                    assert!(login.is_online().unwrap());
                }
            })
        })
        .collect();
    for w in workers {
        w.join().unwrap();
    }

    drop(conn);
    server.join().unwrap().unwrap();
    assert_eq!(h.login.calls.lock().unwrap().len(), 40);
}

#[test]
fn silent_peer_times_out() {
    let (sock, _peer) = UnixStream::pair().unwrap();
    let config = RpcConfig {
        call_timeout_ms: 50,
        ..RpcConfig::default()
    };
    let conn = Connection::new(sock, &config);
    let err = LoginClient::new(&conn).is_online().unwrap_err();
    assert!(matches!(err, RpcError::Timeout(d) if d == Duration::from_millis(50)));
}

#[test]
fn hangup_is_connection_closed() {
    let (sock, peer) = UnixStream::pair().unwrap();
    drop(peer);
    let conn = Connection::new(sock, &RpcConfig::default());
    let err = LoginClient::new(&conn).is_online().unwrap_err();
    // Writing to a closed socket may fail before the read sees EOF.
    assert!(matches!(err, RpcError::ConnectionClosed | RpcError::Transport(_)));
}
