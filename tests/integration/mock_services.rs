//! In-memory implementations of the bundled protocols.

use std::sync::{Arc, Mutex};

use kbrpc::RpcConfig;
use kbrpc::protocol::account::{
    AccountInterface, ContactSettings, EmailChangeArg, EnterResetPipelineArg, GetLockdownResponse,
    GuessCurrentLocationArg, HasServerKeysRes, LockdownHistory, PassphraseChangeArg,
    PassphraseCheckArg, RecoverUsernameWithEmailArg, ResetAccountArg, SetLockdownModeArg,
    TimeTravelResetArg, account_protocol,
};
use kbrpc::protocol::login::{
    AccountDeleteArg, ConfiguredAccount, DeprovisionArg, LoginArg, LoginInterface,
    LoginOneshotArg, LoginProvisionedDeviceArg, LoginWithPaperKeyArg, LogoutArg,
    PaperKeySubmitArg, RecoverPassphraseArg, UnlockWithPassphraseArg, login_protocol,
};
use kbrpc::protocol::notify_session::{NotifySessionInterface, notify_session_protocol};
use kbrpc::protocol::{DeviceId, FullName, HandlerError, Status, StatusCode, Time};
use kbrpc::rpc::{CallContext, LocalClient, Server};

pub const PASSPHRASE: &str = "correct horse battery staple";
pub const PAPER_KEY: &str = "fox jump over lazy dog";

// ── Login ────────────────────────────────────────────────────

#[derive(Default)]
pub struct MockLogin {
    pub current: Mutex<Option<String>>,
    pub accounts: Vec<ConfiguredAccount>,
    pub offline: bool,
    pub calls: Mutex<Vec<String>>,
}

impl MockLogin {
    pub fn with_accounts(accounts: &[&str]) -> Self {
        Self {
            accounts: accounts
                .iter()
                .map(|u| ConfiguredAccount {
                    username: (*u).to_owned(),
                    fullname: FullName::new_unchecked(format!("{u} example")),
                    has_stored_secret: true,
                    is_current: false,
                })
                .collect(),
            ..Self::default()
        }
    }

    fn record(&self, ctx: &CallContext) {
        self.calls.lock().unwrap().push(ctx.method.clone());
    }

    fn set_current(&self, username: &str) -> Result<(), HandlerError> {
        let mut cur = self.current.lock().unwrap();
        if let Some(existing) = cur.as_deref() {
            return Err(Status::from_code(
                StatusCode::SCAlreadyLoggedIn,
                &format!("already logged in as {existing}"),
            )
            .into());
        }
        *cur = Some(username.to_owned());
        Ok(())
    }

    fn require_session(&self) -> Result<String, HandlerError> {
        self.current
            .lock()
            .unwrap()
            .clone()
            .ok_or_else(|| HandlerError::app(StatusCode::SCLoginRequired, "login required"))
    }
}

impl LoginInterface for MockLogin {
    fn get_configured_accounts(
        &self,
        ctx: &CallContext,
        _session_id: i32,
    ) -> Result<Vec<ConfiguredAccount>, HandlerError> {
        self.record(ctx);
        let current = self.current.lock().unwrap().clone();
        Ok(self
            .accounts
            .iter()
            .cloned()
            .map(|mut a| {
                a.is_current = current.as_deref() == Some(a.username.as_str());
                a
            })
            .collect())
    }

    fn login(&self, ctx: &CallContext, arg: LoginArg) -> Result<(), HandlerError> {
        self.record(ctx);
        if !arg.paper_key.is_empty() && arg.paper_key != PAPER_KEY {
            return Err(HandlerError::app(StatusCode::SCBadLoginPassword, "bad paper key"));
        }
        if arg.username.is_empty() {
            return Err(HandlerError::app(StatusCode::SCBadUsername, "empty username"));
        }
        self.set_current(&arg.username)
    }

    fn login_provisioned_device(&self, ctx: &CallContext, arg: LoginProvisionedDeviceArg) -> Result<(), HandlerError> {
        self.record(ctx);
        if !self.accounts.iter().any(|a| a.username == arg.username) {
            return Err(HandlerError::app(StatusCode::SCNotFound, "device not provisioned"));
        }
        self.set_current(&arg.username)
    }

    fn login_with_paper_key(&self, ctx: &CallContext, arg: LoginWithPaperKeyArg) -> Result<(), HandlerError> {
        self.record(ctx);
        self.set_current(&arg.username)
    }

    fn logout(&self, ctx: &CallContext, arg: LogoutArg) -> Result<(), HandlerError> {
        self.record(ctx);
        let mut cur = self.current.lock().unwrap();
        if cur.is_none() && !arg.force {
            return Err(HandlerError::app(StatusCode::SCNoSession, "no session"));
        }
        *cur = None;
        Ok(())
    }

    fn deprovision(&self, ctx: &CallContext, _arg: DeprovisionArg) -> Result<(), HandlerError> {
        self.record(ctx);
        Ok(())
    }

    fn recover_account_from_email_address(&self, ctx: &CallContext, email: String) -> Result<(), HandlerError> {
        self.record(ctx);
        if !email.contains('@') {
            // Plain anyhow errors go out as GENERIC.
            return Err(anyhow::anyhow!("not an email address: {email}").into());
        }
        Ok(())
    }

    fn recover_passphrase(&self, ctx: &CallContext, _arg: RecoverPassphraseArg) -> Result<(), HandlerError> {
        self.record(ctx);
        Ok(())
    }

    fn paper_key(&self, ctx: &CallContext, _session_id: i32) -> Result<(), HandlerError> {
        self.record(ctx);
        self.require_session().map(|_| ())
    }

    fn paper_key_submit(&self, ctx: &CallContext, arg: PaperKeySubmitArg) -> Result<(), HandlerError> {
        self.record(ctx);
        if arg.paper_phrase != PAPER_KEY {
            return Err(HandlerError::app(StatusCode::SCBadLoginPassword, "wrong paper phrase"));
        }
        Ok(())
    }

    fn unlock(&self, ctx: &CallContext, _session_id: i32) -> Result<(), HandlerError> {
        self.record(ctx);
        self.require_session().map(|_| ())
    }

    fn unlock_with_passphrase(&self, ctx: &CallContext, arg: UnlockWithPassphraseArg) -> Result<(), HandlerError> {
        self.record(ctx);
        if arg.passphrase != PASSPHRASE {
            return Err(HandlerError::app(StatusCode::SCBadLoginPassword, "bad passphrase"));
        }
        Ok(())
    }

    fn account_delete(&self, ctx: &CallContext, arg: AccountDeleteArg) -> Result<(), HandlerError> {
        self.record(ctx);
        self.require_session()?;
        match arg.passphrase.as_deref() {
            None => Err(HandlerError::app(StatusCode::SCInputCanceled, "prompt canceled")),
            Some(PASSPHRASE) => {
                *self.current.lock().unwrap() = None;
                Ok(())
            }
            Some(_) => Err(HandlerError::app(StatusCode::SCBadLoginPassword, "bad passphrase")),
        }
    }

    fn login_oneshot(&self, ctx: &CallContext, arg: LoginOneshotArg) -> Result<(), HandlerError> {
        self.record(ctx);
        if arg.paper_key != PAPER_KEY {
            return Err(HandlerError::app(StatusCode::SCBadLoginPassword, "bad paper key"));
        }
        self.set_current(&arg.username)
    }

    fn is_online(&self, ctx: &CallContext) -> Result<bool, HandlerError> {
        self.record(ctx);
        Ok(!self.offline)
    }
}

// ── Account ──────────────────────────────────────────────────

pub struct MockAccount {
    pub passphrase: Mutex<String>,
    pub email: Mutex<String>,
    pub lockdown: Mutex<GetLockdownResponse>,
    pub contact: Mutex<ContactSettings>,
    pub reset_pending: Mutex<bool>,
}

impl Default for MockAccount {
    fn default() -> Self {
        Self {
            passphrase: Mutex::new(PASSPHRASE.to_owned()),
            email: Mutex::new("t_alice@example.com".to_owned()),
            lockdown: Mutex::new(GetLockdownResponse::default()),
            contact: Mutex::new(ContactSettings::default()),
            reset_pending: Mutex::new(false),
        }
    }
}

impl AccountInterface for MockAccount {
    fn passphrase_change(&self, _: &CallContext, arg: PassphraseChangeArg) -> Result<(), HandlerError> {
        let mut pp = self.passphrase.lock().unwrap();
        if !arg.force && arg.old_passphrase != *pp {
            return Err(HandlerError::app(StatusCode::SCBadLoginPassword, "old passphrase mismatch"));
        }
        *pp = arg.passphrase;
        Ok(())
    }

    fn passphrase_check(&self, _: &CallContext, arg: PassphraseCheckArg) -> Result<bool, HandlerError> {
        if arg.passphrase.is_empty() {
            return Err(HandlerError::app(StatusCode::SCInputCanceled, "no prompt available"));
        }
        Ok(arg.passphrase == *self.passphrase.lock().unwrap())
    }

    fn email_change(&self, _: &CallContext, arg: EmailChangeArg) -> Result<(), HandlerError> {
        if arg.new_email == *self.email.lock().unwrap() {
            return Err(HandlerError::app(StatusCode::SCExists, "email unchanged"));
        }
        *self.email.lock().unwrap() = arg.new_email;
        Ok(())
    }

    fn has_server_keys(&self, _: &CallContext, session_id: i32) -> Result<HasServerKeysRes, HandlerError> {
        Ok(HasServerKeysRes {
            has_server_keys: session_id % 2 == 0,
        })
    }

    fn reset_account(&self, _: &CallContext, _arg: ResetAccountArg) -> Result<(), HandlerError> {
        *self.reset_pending.lock().unwrap() = true;
        Ok(())
    }

    fn get_lockdown_mode(&self, _: &CallContext, _session_id: i32) -> Result<GetLockdownResponse, HandlerError> {
        Ok(self.lockdown.lock().unwrap().clone())
    }

    fn set_lockdown_mode(&self, _: &CallContext, arg: SetLockdownModeArg) -> Result<(), HandlerError> {
        let mut ld = self.lockdown.lock().unwrap();
        ld.status = arg.enabled;
        let n = ld.history.len() as i64;
        ld.history.push(LockdownHistory {
            status: arg.enabled,
            creation_time: Time::from_seconds(1_600_000_000 + n),
            device_id: DeviceId::from_string("e5f2a8f6f0b6e1a05dd8b9e5e2d9c418").map_err(HandlerError::from)?,
            device_name: "laptop".to_owned(),
        });
        Ok(())
    }

    fn recover_username_with_email(&self, _: &CallContext, _arg: RecoverUsernameWithEmailArg) -> Result<(), HandlerError> {
        Ok(())
    }

    fn enter_reset_pipeline(&self, _: &CallContext, arg: EnterResetPipelineArg) -> Result<(), HandlerError> {
        if arg.username_or_email.is_empty() && !arg.interactive {
            return Err(HandlerError::app(StatusCode::SCInputError, "nothing to reset"));
        }
        *self.reset_pending.lock().unwrap() = true;
        Ok(())
    }

    fn cancel_reset(&self, _: &CallContext, _session_id: i32) -> Result<(), HandlerError> {
        let mut pending = self.reset_pending.lock().unwrap();
        if !*pending {
            return Err(HandlerError::app(StatusCode::SCNotFound, "no reset in progress"));
        }
        *pending = false;
        Ok(())
    }

    fn time_travel_reset(&self, _: &CallContext, _arg: TimeTravelResetArg) -> Result<(), HandlerError> {
        Ok(())
    }

    fn guess_current_location(&self, _: &CallContext, arg: GuessCurrentLocationArg) -> Result<String, HandlerError> {
        Ok(arg.default_country)
    }

    fn user_get_contact_settings(&self, _: &CallContext) -> Result<ContactSettings, HandlerError> {
        Ok(self.contact.lock().unwrap().clone())
    }

    fn user_set_contact_settings(&self, _: &CallContext, settings: ContactSettings) -> Result<(), HandlerError> {
        *self.contact.lock().unwrap() = settings;
        Ok(())
    }
}

// ── NotifySession ────────────────────────────────────────────

#[derive(Default)]
pub struct SessionLog {
    pub events: Mutex<Vec<String>>,
}

impl NotifySessionInterface for SessionLog {
    fn logged_out(&self, _: &CallContext) -> Result<(), HandlerError> {
        self.events.lock().unwrap().push("loggedOut".to_owned());
        Ok(())
    }

    fn logged_in(&self, _: &CallContext, username: String) -> Result<(), HandlerError> {
        if username.is_empty() {
            return Err(HandlerError::app(StatusCode::SCBadUsername, "empty username"));
        }
        self.events.lock().unwrap().push(format!("loggedIn:{username}"));
        Ok(())
    }
}

// ── Wiring ───────────────────────────────────────────────────

pub struct Harness {
    pub server: Arc<Server>,
    pub login: Arc<MockLogin>,
    pub account: Arc<MockAccount>,
    pub session: Arc<SessionLog>,
}

impl Harness {
    pub fn new(login: MockLogin) -> Self {
        let login = Arc::new(login);
        let account = Arc::new(MockAccount::default());
        let session = Arc::new(SessionLog::default());

        let mut server = Server::new(RpcConfig::default());
        server.register(login_protocol(Arc::clone(&login))).unwrap();
        server.register(account_protocol(Arc::clone(&account))).unwrap();
        server.register(notify_session_protocol(Arc::clone(&session))).unwrap();

        Self {
            server: Arc::new(server),
            login,
            account,
            session,
        }
    }

    pub fn client(&self) -> LocalClient {
        LocalClient::new(Arc::clone(&self.server))
    }
}
