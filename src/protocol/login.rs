//! `keybase.1.login`: logging in and out, paper keys, account recovery.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::{ClientType, DeviceTypeV2, FullName};
use super::status::HandlerError;
use crate::error::RpcError;
use crate::rpc::{
    CallContext, GenericClient, Protocol, ServeHandlerDescription, call_typed, join_method_name,
};

pub const PROTOCOL_NAME: &str = "keybase.1.login";

fn method(name: &str) -> String {
    join_method_name(PROTOCOL_NAME, name)
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfiguredAccount {
    pub username: String,
    pub fullname: FullName,
    #[serde(rename = "hasStoredSecret")]
    pub has_stored_secret: bool,
    #[serde(rename = "isCurrent")]
    pub is_current: bool,
}

// ── Arguments ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetConfiguredAccountsArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "deviceType")]
    pub device_type: DeviceTypeV2,
    pub username: String,
    #[serde(rename = "clientType")]
    pub client_type: ClientType,
    #[serde(rename = "doUserSwitch")]
    pub do_user_switch: bool,
    #[serde(rename = "paperKey")]
    pub paper_key: String,
    #[serde(rename = "deviceName")]
    pub device_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginProvisionedDeviceArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
    #[serde(rename = "noPassphrasePrompt")]
    pub no_passphrase_prompt: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginWithPaperKeyArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoutArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub force: bool,
    #[serde(rename = "keepSecrets")]
    pub keep_secrets: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeprovisionArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
    #[serde(rename = "doRevoke")]
    pub do_revoke: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverAccountFromEmailAddressArg {
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverPassphraseArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperKeyArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaperKeySubmitArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "paperPhrase")]
    pub paper_phrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockWithPassphraseArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub passphrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountDeleteArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub passphrase: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginOneshotArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
    #[serde(rename = "paperKey")]
    pub paper_key: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IsOnlineArg {}

// ── Service ──────────────────────────────────────────────────

pub trait LoginInterface: Send + Sync {
    /// Accounts configured on this machine, i.e. those with stored secrets.
    fn get_configured_accounts(
        &self,
        ctx: &CallContext,
        session_id: i32,
    ) -> Result<Vec<ConfiguredAccount>, HandlerError>;

    /// Log in, provisioning this device first if it is not yet.
    fn login(&self, ctx: &CallContext, arg: LoginArg) -> Result<(), HandlerError>;

    /// Log in only if this device is already provisioned.
    fn login_provisioned_device(
        &self,
        ctx: &CallContext,
        arg: LoginProvisionedDeviceArg,
    ) -> Result<(), HandlerError>;

    /// Log in with unlocked device keys, falling back to a paper key prompt.
    fn login_with_paper_key(
        &self,
        ctx: &CallContext,
        arg: LoginWithPaperKeyArg,
    ) -> Result<(), HandlerError>;

    fn logout(&self, ctx: &CallContext, arg: LogoutArg) -> Result<(), HandlerError>;

    fn deprovision(&self, ctx: &CallContext, arg: DeprovisionArg) -> Result<(), HandlerError>;

    fn recover_account_from_email_address(
        &self,
        ctx: &CallContext,
        email: String,
    ) -> Result<(), HandlerError>;

    /// Walk the user through changing a forgotten passphrase.
    fn recover_passphrase(
        &self,
        ctx: &CallContext,
        arg: RecoverPassphraseArg,
    ) -> Result<(), HandlerError>;

    /// Generate a paper backup key.
    fn paper_key(&self, ctx: &CallContext, session_id: i32) -> Result<(), HandlerError>;

    /// Check a paper phrase against the logged-in user and cache its keys.
    fn paper_key_submit(&self, ctx: &CallContext, arg: PaperKeySubmitArg) -> Result<(), HandlerError>;

    /// Prime the passphrase stream cache.
    fn unlock(&self, ctx: &CallContext, session_id: i32) -> Result<(), HandlerError>;

    fn unlock_with_passphrase(
        &self,
        ctx: &CallContext,
        arg: UnlockWithPassphraseArg,
    ) -> Result<(), HandlerError>;

    /// Delete the current user's account.
    fn account_delete(&self, ctx: &CallContext, arg: AccountDeleteArg) -> Result<(), HandlerError>;

    /// One-time login from a paper key, without provisioning a device.
    fn login_oneshot(&self, ctx: &CallContext, arg: LoginOneshotArg) -> Result<(), HandlerError>;

    /// Whether keybase.io is reachable.
    fn is_online(&self, ctx: &CallContext) -> Result<bool, HandlerError>;
}

pub fn login_protocol<I: LoginInterface + ?Sized + 'static>(i: Arc<I>) -> Protocol {
    Protocol::new(PROTOCOL_NAME)
        .method("getConfiguredAccounts", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: GetConfiguredAccountsArg| {
                i.get_configured_accounts(ctx, a.session_id)
            })
        })
        .method("login", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: LoginArg| i.login(ctx, a))
        })
        .method("loginProvisionedDevice", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: LoginProvisionedDeviceArg| {
                i.login_provisioned_device(ctx, a)
            })
        })
        .method("loginWithPaperKey", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: LoginWithPaperKeyArg| {
                i.login_with_paper_key(ctx, a)
            })
        })
        .method("logout", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: LogoutArg| i.logout(ctx, a))
        })
        .method("deprovision", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: DeprovisionArg| i.deprovision(ctx, a))
        })
        .method("recoverAccountFromEmailAddress", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: RecoverAccountFromEmailAddressArg| {
                i.recover_account_from_email_address(ctx, a.email)
            })
        })
        .method("recoverPassphrase", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: RecoverPassphraseArg| {
                i.recover_passphrase(ctx, a)
            })
        })
        .method("paperKey", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: PaperKeyArg| i.paper_key(ctx, a.session_id))
        })
        .method("paperKeySubmit", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: PaperKeySubmitArg| i.paper_key_submit(ctx, a))
        })
        .method("unlock", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: UnlockArg| i.unlock(ctx, a.session_id))
        })
        .method("unlockWithPassphrase", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: UnlockWithPassphraseArg| {
                i.unlock_with_passphrase(ctx, a)
            })
        })
        .method("accountDelete", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: AccountDeleteArg| i.account_delete(ctx, a))
        })
        .method("loginOneshot", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: LoginOneshotArg| i.login_oneshot(ctx, a))
        })
        .method("isOnline", {
            ServeHandlerDescription::call(move |ctx, _: IsOnlineArg| i.is_online(ctx))
        })
}

// ── Client ───────────────────────────────────────────────────

pub struct LoginClient<C> {
    pub cli: C,
}

impl<C: GenericClient> LoginClient<C> {
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    pub fn get_configured_accounts(&self, session_id: i32) -> Result<Vec<ConfiguredAccount>, RpcError> {
        let arg = GetConfiguredAccountsArg { session_id };
        let res: Option<Vec<ConfiguredAccount>> =
            call_typed(&self.cli, &method("getConfiguredAccounts"), &arg, None)?;
        Ok(res.unwrap_or_default())
    }

    pub fn login(&self, arg: &LoginArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("login"), arg, None)
    }

    pub fn login_provisioned_device(&self, arg: &LoginProvisionedDeviceArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("loginProvisionedDevice"), arg, None)
    }

    pub fn login_with_paper_key(&self, arg: &LoginWithPaperKeyArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("loginWithPaperKey"), arg, None)
    }

    pub fn logout(&self, arg: &LogoutArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("logout"), arg, None)
    }

    pub fn deprovision(&self, arg: &DeprovisionArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("deprovision"), arg, None)
    }

    pub fn recover_account_from_email_address(&self, email: &str) -> Result<(), RpcError> {
        let arg = RecoverAccountFromEmailAddressArg {
            email: email.to_owned(),
        };
        call_typed(
            &self.cli,
            &method("recoverAccountFromEmailAddress"),
            &arg,
            None,
        )
    }

    pub fn recover_passphrase(&self, arg: &RecoverPassphraseArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("recoverPassphrase"), arg, None)
    }

    pub fn paper_key(&self, session_id: i32) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("paperKey"), &PaperKeyArg { session_id }, None)
    }

    pub fn paper_key_submit(&self, arg: &PaperKeySubmitArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("paperKeySubmit"), arg, None)
    }

    pub fn unlock(&self, session_id: i32) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("unlock"), &UnlockArg { session_id }, None)
    }

    pub fn unlock_with_passphrase(&self, arg: &UnlockWithPassphraseArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("unlockWithPassphrase"), arg, None)
    }

    pub fn account_delete(&self, arg: &AccountDeleteArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("accountDelete"), arg, None)
    }

    pub fn login_oneshot(&self, arg: &LoginOneshotArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("loginOneshot"), arg, None)
    }

    pub fn is_online(&self) -> Result<bool, RpcError> {
        call_typed(&self.cli, &method("isOnline"), &IsOnlineArg {}, None)
    }
}
