//! Records and enumerations shared by every keybase.1 protocol.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize};

use super::ParseError;
use super::ids::{TeamId, TlfId, Uid};
use super::time::Time;

/// Read a value that a peer may send as nil, substituting the default.
///
/// Peers encode empty lists and maps as nil, so every collection field
/// goes through this.
pub fn nil_as_default<'de, D, T>(d: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(d)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StringKVPair {
    pub key: String,
    pub value: String,
}

impl StringKVPair {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        StringKVPair {
            key: key.into(),
            value: value.into(),
        }
    }
}

// ── Seqno / UserVersion ──────────────────────────────────────

/// Position of a link in a sigchain.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Seqno(pub i64);

impl fmt::Display for Seqno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A user at a particular account reset generation.
#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserVersion {
    pub uid: Uid,
    #[serde(rename = "eldestSeqno")]
    pub eldest_seqno: Seqno,
}

impl UserVersion {
    pub fn new(uid: Uid, eldest_seqno: Seqno) -> Self {
        UserVersion { uid, eldest_seqno }
    }

    pub fn is_nil(&self) -> bool {
        self.uid.is_nil()
    }

    /// `<uid>%<seqno>`.
    pub fn percent_form(&self) -> String {
        self.to_string()
    }

    /// Parse the percent form. A bare UID means eldest seqno 1.
    pub fn parse_percent_form(s: &str) -> Result<Self, ParseError> {
        let (uid, seqno) = s.split_once('%').unwrap_or((s, "1"));
        let uid = Uid::from_string(uid)?;
        let seqno = seqno
            .parse::<i64>()
            .map_err(|_| ParseError::BadSeqno(seqno.to_owned()))?;
        Ok(UserVersion::new(uid, Seqno(seqno)))
    }
}

impl fmt::Display for UserVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%{}", self.uid, self.eldest_seqno)
    }
}

// ── DeviceTypeV2 / FullName ──────────────────────────────────

string_id!(
    /// Kind of device. Carried as a free-form string on the wire; only
    /// the four known kinds pass [`DeviceTypeV2::from_string`].
    DeviceTypeV2
);

impl DeviceTypeV2 {
    pub const NONE: &'static str = "none";
    pub const PAPER: &'static str = "backup";
    pub const DESKTOP: &'static str = "desktop";
    pub const MOBILE: &'static str = "mobile";

    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        match s {
            Self::NONE | Self::PAPER | Self::DESKTOP | Self::MOBILE => Ok(DeviceTypeV2(s.to_owned())),
            other => Err(ParseError::UnknownEnumValue {
                kind: "DeviceType",
                value: other.to_owned(),
            }),
        }
    }

    pub fn desktop() -> Self {
        DeviceTypeV2(Self::DESKTOP.to_owned())
    }

    pub fn mobile() -> Self {
        DeviceTypeV2(Self::MOBILE.to_owned())
    }

    pub fn paper() -> Self {
        DeviceTypeV2(Self::PAPER.to_owned())
    }

    pub fn is_mobile(&self) -> bool {
        self.0 == Self::MOBILE
    }
}

string_id!(
    /// A user's display name.
    FullName
);

// ── Enumerations ─────────────────────────────────────────────

protocol_enum! {
    pub enum TeamType {
        None = 0 => "NONE",
        Legacy = 1 => "LEGACY",
        Modern = 2 => "MODERN",
    }
}

protocol_enum! {
    pub enum TlfVisibility {
        Any = 0 => "ANY",
        Public = 1 => "PUBLIC",
        Private = 2 => "PRIVATE",
    }
}

protocol_enum! {
    pub enum SeqType {
        None = 0 => "NONE",
        Public = 1 => "PUBLIC",
        Private = 2 => "PRIVATE",
        Semiprivate = 3 => "SEMIPRIVATE",
        UserPrivateHidden = 16 => "USER_PRIVATE_HIDDEN",
        TeamPrivateHidden = 17 => "TEAM_PRIVATE_HIDDEN",
    }
}

protocol_enum! {
    pub enum ClientType {
        None = 0 => "NONE",
        Cli = 1 => "CLI",
        GuiMain = 2 => "GUI_MAIN",
        Kbfs = 3 => "KBFS",
        GuiHelper = 4 => "GUI_HELPER",
    }
}

impl ClientType {
    /// What a person would call this client.
    pub fn description(self) -> &'static str {
        match self {
            ClientType::Cli => "command-line client",
            ClientType::Kbfs => "KBFS",
            ClientType::GuiMain => "desktop",
            ClientType::GuiHelper => "desktop helper",
            ClientType::None => "other",
        }
    }
}

protocol_enum! {
    pub enum PassphraseType {
        None = 0 => "NONE",
        PaperKey = 1 => "PAPER_KEY",
        PassPhrase = 2 => "PASS_PHRASE",
        VerifyPassPhrase = 3 => "VERIFY_PASS_PHRASE",
    }
}

protocol_enum! {
    pub enum FolderType {
        Unknown = 0 => "UNKNOWN",
        Private = 1 => "PRIVATE",
        Public = 2 => "PUBLIC",
        Team = 3 => "TEAM",
    }
}

impl FolderType {
    fn path_prefix(self) -> &'static str {
        match self {
            FolderType::Private => "private",
            FolderType::Public => "public",
            FolderType::Team => "team",
            FolderType::Unknown => "<unrecognized>",
        }
    }
}

// ── Records ──────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Text {
    pub data: String,
    pub markup: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TeamIdWithVisibility {
    #[serde(rename = "teamID")]
    pub team_id: TeamId,
    pub visibility: TlfVisibility,
}

/// A KBFS top-level folder as listed in favorites.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub name: String,
    pub private: bool,
    pub created: bool,
    #[serde(rename = "folderType")]
    pub folder_type: FolderType,
    #[serde(rename = "teamID", default, skip_serializing_if = "Option::is_none")]
    pub team_id: Option<TeamId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mtime: Option<Time>,
}

impl fmt::Display for Folder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.folder_type.path_prefix(), self.name)
    }
}

// ── CompatibilityTeamID ──────────────────────────────────────

/// A team named either by its legacy TLF id or its modern team id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "CompatibilityTeamIdRepr", into = "CompatibilityTeamIdRepr")]
pub enum CompatibilityTeamId {
    Legacy(TlfId),
    Modern(TeamId),
}

impl CompatibilityTeamId {
    pub fn typ(&self) -> TeamType {
        match self {
            CompatibilityTeamId::Legacy(_) => TeamType::Legacy,
            CompatibilityTeamId::Modern(_) => TeamType::Modern,
        }
    }

    pub fn legacy(&self) -> Option<&TlfId> {
        match self {
            CompatibilityTeamId::Legacy(id) => Some(id),
            CompatibilityTeamId::Modern(_) => None,
        }
    }

    pub fn modern(&self) -> Option<&TeamId> {
        match self {
            CompatibilityTeamId::Modern(id) => Some(id),
            CompatibilityTeamId::Legacy(_) => None,
        }
    }
}

/// Wire shape: discriminant plus one populated case field.
#[derive(Serialize, Deserialize)]
struct CompatibilityTeamIdRepr {
    typ: TeamType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    legacy: Option<TlfId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    modern: Option<TeamId>,
}

impl TryFrom<CompatibilityTeamIdRepr> for CompatibilityTeamId {
    type Error = ParseError;

    fn try_from(r: CompatibilityTeamIdRepr) -> Result<Self, Self::Error> {
        const UNION: &str = "CompatibilityTeamID";
        match r.typ {
            TeamType::Legacy => r.legacy.map(CompatibilityTeamId::Legacy).ok_or(
                ParseError::MissingUnionCase {
                    union: UNION,
                    case: "legacy",
                },
            ),
            TeamType::Modern => r.modern.map(CompatibilityTeamId::Modern).ok_or(
                ParseError::MissingUnionCase {
                    union: UNION,
                    case: "modern",
                },
            ),
            TeamType::None => Err(ParseError::UnknownUnionTag {
                union: UNION,
                tag: TeamType::None.to_string(),
            }),
        }
    }
}

impl From<CompatibilityTeamId> for CompatibilityTeamIdRepr {
    fn from(c: CompatibilityTeamId) -> Self {
        match c {
            CompatibilityTeamId::Legacy(id) => CompatibilityTeamIdRepr {
                typ: TeamType::Legacy,
                legacy: Some(id),
                modern: None,
            },
            CompatibilityTeamId::Modern(id) => CompatibilityTeamIdRepr {
                typ: TeamType::Modern,
                legacy: None,
                modern: Some(id),
            },
        }
    }
}

// ── Tests ────────────────────────────────────────────────────
