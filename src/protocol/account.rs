//! `keybase.1.account`: passphrase, email, lockdown, reset and contact
//! settings.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::common::nil_as_default;
use super::ids::{DeviceId, TeamId};
use super::status::HandlerError;
use super::time::{DurationSec, Time};
use crate::error::RpcError;
use crate::rpc::{
    CallContext, GenericClient, Protocol, ServeHandlerDescription, call_typed, join_method_name,
};

pub const PROTOCOL_NAME: &str = "keybase.1.account";

fn method(name: &str) -> String {
    join_method_name(PROTOCOL_NAME, name)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasServerKeysRes {
    #[serde(rename = "hasServerKeys")]
    pub has_server_keys: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockdownHistory {
    pub status: bool,
    #[serde(rename = "creationTime")]
    pub creation_time: Time,
    #[serde(rename = "deviceID")]
    pub device_id: DeviceId,
    #[serde(rename = "deviceName")]
    pub device_name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLockdownResponse {
    #[serde(default, deserialize_with = "nil_as_default")]
    pub history: Vec<LockdownHistory>,
    pub status: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamContactSettings {
    #[serde(rename = "teamID")]
    pub team_id: TeamId,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<i32>,
    #[serde(rename = "allowFolloweeDegrees")]
    pub allow_followee_degrees: i32,
    #[serde(rename = "allowGoodTeams")]
    pub allow_good_teams: bool,
    pub enabled: bool,
    #[serde(default, deserialize_with = "nil_as_default")]
    pub teams: Vec<TeamContactSettings>,
}

// ── Arguments ────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseChangeArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "oldPassphrase")]
    pub old_passphrase: String,
    pub passphrase: String,
    pub force: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassphraseCheckArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub passphrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmailChangeArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "newEmail")]
    pub new_email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HasServerKeysArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResetAccountArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub passphrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GetLockdownModeArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetLockdownModeArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub enabled: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecoverUsernameWithEmailArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnterResetPipelineArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "usernameOrEmail")]
    pub username_or_email: String,
    pub passphrase: String,
    pub interactive: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelResetArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TimeTravelResetArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    pub username: String,
    pub duration: DurationSec,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuessCurrentLocationArg {
    #[serde(rename = "sessionID")]
    pub session_id: i32,
    #[serde(rename = "defaultCountry")]
    pub default_country: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserGetContactSettingsArg {}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSetContactSettingsArg {
    pub settings: ContactSettings,
}

// ── Service ──────────────────────────────────────────────────

pub trait AccountInterface: Send + Sync {
    /// Change the passphrase. With no old passphrase and `force` unset the
    /// implementation prompts for it; with `force` set it forces the change.
    fn passphrase_change(&self, ctx: &CallContext, arg: PassphraseChangeArg) -> Result<(), HandlerError>;

    /// `true` when the passphrase matches. An empty passphrase prompts.
    fn passphrase_check(&self, ctx: &CallContext, arg: PassphraseCheckArg) -> Result<bool, HandlerError>;

    fn email_change(&self, ctx: &CallContext, arg: EmailChangeArg) -> Result<(), HandlerError>;

    /// Whether the logged-in user has uploaded private keys.
    fn has_server_keys(&self, ctx: &CallContext, session_id: i32) -> Result<HasServerKeysRes, HandlerError>;

    fn reset_account(&self, ctx: &CallContext, arg: ResetAccountArg) -> Result<(), HandlerError>;

    fn get_lockdown_mode(&self, ctx: &CallContext, session_id: i32) -> Result<GetLockdownResponse, HandlerError>;

    fn set_lockdown_mode(&self, ctx: &CallContext, arg: SetLockdownModeArg) -> Result<(), HandlerError>;

    fn recover_username_with_email(
        &self,
        ctx: &CallContext,
        arg: RecoverUsernameWithEmailArg,
    ) -> Result<(), HandlerError>;

    /// Start a reset for a username or email, prompting for the
    /// passphrase when neither is known.
    fn enter_reset_pipeline(&self, ctx: &CallContext, arg: EnterResetPipelineArg) -> Result<(), HandlerError>;

    fn cancel_reset(&self, ctx: &CallContext, session_id: i32) -> Result<(), HandlerError>;

    fn time_travel_reset(&self, ctx: &CallContext, arg: TimeTravelResetArg) -> Result<(), HandlerError>;

    fn guess_current_location(
        &self,
        ctx: &CallContext,
        arg: GuessCurrentLocationArg,
    ) -> Result<String, HandlerError>;

    fn user_get_contact_settings(&self, ctx: &CallContext) -> Result<ContactSettings, HandlerError>;

    fn user_set_contact_settings(&self, ctx: &CallContext, settings: ContactSettings) -> Result<(), HandlerError>;
}

pub fn account_protocol<I: AccountInterface + ?Sized + 'static>(i: Arc<I>) -> Protocol {
    Protocol::new(PROTOCOL_NAME)
        .method("passphraseChange", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: PassphraseChangeArg| i.passphrase_change(ctx, a))
        })
        .method("passphraseCheck", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: PassphraseCheckArg| i.passphrase_check(ctx, a))
        })
        .method("emailChange", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: EmailChangeArg| i.email_change(ctx, a))
        })
        .method("hasServerKeys", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: HasServerKeysArg| {
                i.has_server_keys(ctx, a.session_id)
            })
        })
        .method("resetAccount", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: ResetAccountArg| i.reset_account(ctx, a))
        })
        .method("getLockdownMode", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: GetLockdownModeArg| {
                i.get_lockdown_mode(ctx, a.session_id)
            })
        })
        .method("setLockdownMode", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: SetLockdownModeArg| i.set_lockdown_mode(ctx, a))
        })
        .method("recoverUsernameWithEmail", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: RecoverUsernameWithEmailArg| {
                i.recover_username_with_email(ctx, a)
            })
        })
        .method("enterResetPipeline", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: EnterResetPipelineArg| {
                i.enter_reset_pipeline(ctx, a)
            })
        })
        .method("cancelReset", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: CancelResetArg| i.cancel_reset(ctx, a.session_id))
        })
        .method("timeTravelReset", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: TimeTravelResetArg| i.time_travel_reset(ctx, a))
        })
        .method("guessCurrentLocation", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, a: GuessCurrentLocationArg| {
                i.guess_current_location(ctx, a)
            })
        })
        .method("userGetContactSettings", {
            let i = Arc::clone(&i);
            ServeHandlerDescription::call(move |ctx, _: UserGetContactSettingsArg| {
                i.user_get_contact_settings(ctx)
            })
        })
        .method("userSetContactSettings", {
            ServeHandlerDescription::call(move |ctx, a: UserSetContactSettingsArg| {
                i.user_set_contact_settings(ctx, a.settings)
            })
        })
}

// ── Client ───────────────────────────────────────────────────

pub struct AccountClient<C> {
    pub cli: C,
}

impl<C: GenericClient> AccountClient<C> {
    pub fn new(cli: C) -> Self {
        Self { cli }
    }

    pub fn passphrase_change(&self, arg: &PassphraseChangeArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("passphraseChange"), arg, None)
    }

    pub fn passphrase_check(&self, arg: &PassphraseCheckArg) -> Result<bool, RpcError> {
        call_typed(&self.cli, &method("passphraseCheck"), arg, None)
    }

    pub fn email_change(&self, arg: &EmailChangeArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("emailChange"), arg, None)
    }

    pub fn has_server_keys(&self, session_id: i32) -> Result<HasServerKeysRes, RpcError> {
        let arg = HasServerKeysArg { session_id };
        call_typed(&self.cli, &method("hasServerKeys"), &arg, None)
    }

    pub fn reset_account(&self, arg: &ResetAccountArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("resetAccount"), arg, None)
    }

    pub fn get_lockdown_mode(&self, session_id: i32) -> Result<GetLockdownResponse, RpcError> {
        let arg = GetLockdownModeArg { session_id };
        call_typed(&self.cli, &method("getLockdownMode"), &arg, None)
    }

    pub fn set_lockdown_mode(&self, arg: &SetLockdownModeArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("setLockdownMode"), arg, None)
    }

    pub fn recover_username_with_email(&self, arg: &RecoverUsernameWithEmailArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("recoverUsernameWithEmail"), arg, None)
    }

    pub fn enter_reset_pipeline(&self, arg: &EnterResetPipelineArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("enterResetPipeline"), arg, None)
    }

    pub fn cancel_reset(&self, session_id: i32) -> Result<(), RpcError> {
        let arg = CancelResetArg { session_id };
        call_typed(&self.cli, &method("cancelReset"), &arg, None)
    }

    pub fn time_travel_reset(&self, arg: &TimeTravelResetArg) -> Result<(), RpcError> {
        call_typed(&self.cli, &method("timeTravelReset"), arg, None)
    }

    pub fn guess_current_location(&self, arg: &GuessCurrentLocationArg) -> Result<String, RpcError> {
        call_typed(&self.cli, &method("guessCurrentLocation"), arg, None)
    }

    pub fn user_get_contact_settings(&self) -> Result<ContactSettings, RpcError> {
        call_typed(
            &self.cli,
            &method("userGetContactSettings"),
            &UserGetContactSettingsArg {},
            None,
        )
    }

    pub fn user_set_contact_settings(&self, settings: ContactSettings) -> Result<(), RpcError> {
        let arg = UserSetContactSettingsArg { settings };
        call_typed(&self.cli, &method("userSetContactSettings"), &arg, None)
    }
}
