//! keybase.1 protocol data model and bindings.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  ids · time · common · status      (shared data model)   │
//! │            ▲                                             │
//! │            │        rpc::{Protocol, GenericClient}       │
//! │            │                    ▲                        │
//! │  login · account · notify_session  (per-protocol         │
//! │                                     trait + dispatch     │
//! │                                     table + client)      │
//! └──────────────────────────────────────────────────────────┘
//! ```

#[macro_use]
mod macros;

mod error;

pub mod account;
pub mod common;
pub mod ids;
pub mod login;
pub mod notify_session;
pub mod status;
pub mod time;

pub use common::{
    ClientType, CompatibilityTeamId, DeviceTypeV2, Folder, FolderType, FullName, PassphraseType,
    SeqType, Seqno, StringKVPair, TeamIdWithVisibility, TeamType, Text, TlfVisibility,
    UserVersion,
};
pub use error::ParseError;
pub use ids::{DeviceId, Kid, LinkId, SigId, SigIdBase, SigIdSuffixParameters, TeamId, TlfId, Uid, UserOrTeamId};
pub use status::{AppError, ErrorUnwrapper, HandlerError, Status, StatusCode, ToStatus, wrap_error};
pub use time::{DurationMsec, DurationSec, Time, UnixTime};
