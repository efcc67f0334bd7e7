//! Keybase identifiers: users, keys, devices, signatures and teams.
//!
//! Every identifier is carried as a lowercase hex string. The trailing
//! byte (or, for KIDs, the leading and trailing bytes) encodes what kind
//! of object the id names:
//!
//! ```text
//! UID       16 bytes   ..00 | ..19
//! DeviceID  16 bytes   ..18
//! TeamID    16 bytes   ..24 (private) ..2e (public) ..25 / ..2f (subteams)
//! SigID     33 bytes   32-byte hash + suffix (0f, 22 or 38)
//! KID       35 bytes   01 <type> <key bytes> 0a
//! ```
//!
//! On the wire ids are plain strings; the checked constructors below are
//! what callers use when an id arrives from user input or JSON.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;

use super::ParseError;

pub const UID_LEN: usize = 16;
pub const UID_SUFFIX: u8 = 0x00;
pub const UID_SUFFIX_2: u8 = 0x19;
pub const UID_SUFFIX_HEX: &str = "00";
pub const UID_SUFFIX_2_HEX: &str = "19";

pub const TEAMID_LEN: usize = 16;
pub const TEAMID_PRIVATE_SUFFIX: u8 = 0x24;
pub const TEAMID_PRIVATE_SUFFIX_HEX: &str = "24";
pub const TEAMID_PUBLIC_SUFFIX: u8 = 0x2e;
pub const TEAMID_PUBLIC_SUFFIX_HEX: &str = "2e";
pub const SUB_TEAMID_PRIVATE_SUFFIX: u8 = 0x25;
pub const SUB_TEAMID_PRIVATE_SUFFIX_HEX: &str = "25";
pub const SUB_TEAMID_PUBLIC_SUFFIX: u8 = 0x2f;
pub const SUB_TEAMID_PUBLIC_SUFFIX_HEX: &str = "2f";

/// UID of the special "public" user.
pub const PUBLIC_UID: &str = "ffffffffffffffffffffffffffffff00";

pub const SIG_ID_LEN: usize = 32;
pub const SIG_ID_SUFFIX: u8 = 0x0f;
pub const SIG_SHORT_ID_BYTES: usize = 27;
pub const SIG_ID_QUERY_MIN: usize = 8;

pub const DEVICE_ID_LEN: usize = 16;
pub const DEVICE_ID_SUFFIX: u8 = 0x18;
pub const DEVICE_ID_SUFFIX_HEX: &str = "18";

pub const KID_LEN: usize = 35;
pub const KID_SUFFIX: u8 = 0x0a;
pub const KID_VERSION: u8 = 0x01;

const TEAM_SUFFIXES: &[&str] = &[
    TEAMID_PRIVATE_SUFFIX_HEX,
    TEAMID_PUBLIC_SUFFIX_HEX,
    SUB_TEAMID_PRIVATE_SUFFIX_HEX,
    SUB_TEAMID_PUBLIC_SUFFIX_HEX,
];

// ── Helpers ──────────────────────────────────────────────────

/// Last two characters of a string already known to be long enough.
fn hex_suffix(s: &str) -> &[u8] {
    let b = s.as_bytes();
    &b[b.len().saturating_sub(2)..]
}

fn has_suffix(s: &str, suffixes: &[&str]) -> bool {
    s.len() >= 2 && suffixes.iter().any(|x| hex_suffix(s) == x.as_bytes())
}

fn decode_or_empty(s: &str) -> Vec<u8> {
    hex::decode(s).unwrap_or_default()
}

/// Unpadded url-safe base64, the short-id encoding.
fn encode_short(b: &[u8]) -> String {
    URL_SAFE_NO_PAD.encode(b)
}

/// Equality over byte strings whose running time does not depend on
/// where the first difference is.
pub fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

/// 16-byte test identifier: `n` little-endian in the first four bytes.
fn make_test_hex(n: u32, suffix: &str, total_len: usize) -> String {
    let mut b = [0u8; 8];
    b[..4].copy_from_slice(&n.to_le_bytes());
    let mut s = hex::encode(b);
    let pad = 2 * total_len - suffix.len() - s.len();
    s.extend(std::iter::repeat_n('0', pad));
    s.push_str(suffix);
    s
}

// ── UID ──────────────────────────────────────────────────────

string_id!(
    /// A user id: 16 bytes, hex encoded, ending in `00` or `19`.
    Uid
);

impl Uid {
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        if s.len() != 2 * UID_LEN {
            return Err(ParseError::WrongLength {
                kind: "UID",
                value: s.to_owned(),
                expected: 2 * UID_LEN,
            });
        }
        if !has_suffix(s, &[UID_SUFFIX_HEX, UID_SUFFIX_2_HEX]) {
            return Err(ParseError::BadSuffix {
                kind: "UID",
                value: s.to_owned(),
                allowed: &[UID_SUFFIX_HEX, UID_SUFFIX_2_HEX],
            });
        }
        Ok(Uid(s.to_owned()))
    }

    pub fn from_slice(b: &[u8]) -> Result<Self, ParseError> {
        Self::from_string(&hex::encode(b))
    }

    /// The special "public" user.
    pub fn public() -> Self {
        Uid(PUBLIC_UID.to_owned())
    }

    /// Deterministic UID for tests.
    pub fn make_test(n: u32) -> Self {
        Uid(make_test_hex(n, UID_SUFFIX_HEX, UID_LEN))
    }

    /// Raw bytes; empty when the string is not hex.
    pub fn to_bytes(&self) -> Vec<u8> {
        decode_or_empty(&self.0)
    }

    pub fn as_user_or_team(&self) -> UserOrTeamId {
        UserOrTeamId(self.0.clone())
    }
}

impl std::str::FromStr for Uid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_string(s)
    }
}

// ── KID ──────────────────────────────────────────────────────

string_id!(
    /// A key id: version byte, key type, key material, `0a` suffix.
    Kid
);

impl Kid {
    /// Wrap without validation; lengths and suffixes are not checked.
    pub fn from_string(s: &str) -> Self {
        Kid(s.to_owned())
    }

    /// Validating constructor. The empty string is a valid "no key" KID.
    pub fn from_string_checked(s: &str) -> Result<Self, ParseError> {
        if s.is_empty() {
            return Ok(Kid::default());
        }

        let b = hex::decode(s)?;
        if b.len() != KID_LEN {
            return Err(ParseError::WrongByteLength {
                kind: "KID",
                expected: KID_LEN,
                got: b.len(),
            });
        }
        let last = b[b.len() - 1];
        if last != KID_SUFFIX {
            return Err(ParseError::BadKidSuffix {
                got: last,
                wanted: KID_SUFFIX,
            });
        }
        if b[0] != KID_VERSION {
            return Err(ParseError::BadKidVersion {
                got: b[0],
                wanted: KID_VERSION,
            });
        }
        Ok(Kid(s.to_owned()))
    }

    pub fn from_slice(b: &[u8]) -> Self {
        Kid(hex::encode(b))
    }

    /// Build a KID around raw public key bytes.
    pub fn from_raw_key(key: &[u8], key_type: u8) -> Self {
        let mut raw = Vec::with_capacity(key.len() + 3);
        raw.push(KID_VERSION);
        raw.push(key_type);
        raw.extend_from_slice(key);
        raw.push(KID_SUFFIX);
        Self::from_slice(&raw)
    }

    pub fn is_valid(&self) -> bool {
        !self.0.is_empty()
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        decode_or_empty(&self.0)
    }

    /// Key type byte, or 0 when the KID is too short to carry one.
    pub fn key_type(&self) -> u8 {
        let raw = self.to_bytes();
        if raw.len() < 2 { 0 } else { raw[1] }
    }

    pub fn to_short_id_string(&self) -> String {
        let raw = self.to_bytes();
        encode_short(&raw[..raw.len().min(12)])
    }

    /// Match a user-supplied query: exact (case-insensitive) or by prefix of
    /// either the hex form or the short id.
    pub fn matches(&self, q: &str, exact: bool) -> bool {
        if self.is_nil() {
            return false;
        }
        if exact {
            return self.0.eq_ignore_ascii_case(q);
        }
        self.0.starts_with(&q.to_lowercase()) || self.to_short_id_string().starts_with(q)
    }

    pub fn secure_equal(&self, other: &Kid) -> bool {
        constant_time_eq(&self.to_bytes(), &other.to_bytes())
    }

    pub fn is_in(&self, list: &[Kid]) -> bool {
        list.contains(self)
    }
}

// ── DeviceID ─────────────────────────────────────────────────

string_id!(
    /// A device id: 16 bytes, hex encoded, ending in `18`.
    DeviceId
);

impl DeviceId {
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        if s.len() != 2 * DEVICE_ID_LEN {
            return Err(ParseError::WrongLength {
                kind: "device ID",
                value: s.to_owned(),
                expected: 2 * DEVICE_ID_LEN,
            });
        }
        if !has_suffix(s, &[DEVICE_ID_SUFFIX_HEX]) {
            return Err(ParseError::BadSuffix {
                kind: "device ID",
                value: s.to_owned(),
                allowed: &[DEVICE_ID_SUFFIX_HEX],
            });
        }
        Ok(DeviceId(s.to_owned()))
    }

    pub fn from_bytes(b: [u8; DEVICE_ID_LEN]) -> Self {
        DeviceId(hex::encode(b))
    }

    pub fn from_slice(b: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; DEVICE_ID_LEN] =
            b.try_into().map_err(|_| ParseError::WrongByteLength {
                kind: "device ID",
                expected: DEVICE_ID_LEN,
                got: b.len(),
            })?;
        Ok(Self::from_bytes(arr))
    }

    pub fn to_bytes(&self) -> Result<[u8; DEVICE_ID_LEN], ParseError> {
        let raw = hex::decode(&self.0)?;
        let got = raw.len();
        raw.try_into().map_err(|_| ParseError::WrongByteLength {
            kind: "device ID",
            expected: DEVICE_ID_LEN,
            got,
        })
    }
}

// ── TeamID ───────────────────────────────────────────────────

string_id!(
    /// A team id: 16 bytes, hex encoded, with a suffix naming
    /// root/sub and public/private.
    TeamId
);

impl TeamId {
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        if s.len() != 2 * TEAMID_LEN {
            return Err(ParseError::WrongLength {
                kind: "TeamID",
                value: s.to_owned(),
                expected: 2 * TEAMID_LEN,
            });
        }
        if !has_suffix(s, TEAM_SUFFIXES) {
            return Err(ParseError::BadSuffix {
                kind: "TeamID",
                value: s.to_owned(),
                allowed: TEAM_SUFFIXES,
            });
        }
        Ok(TeamId(s.to_owned()))
    }

    pub fn make_test(n: u32, public: bool) -> Self {
        let suffix = if public {
            TEAMID_PUBLIC_SUFFIX_HEX
        } else {
            TEAMID_PRIVATE_SUFFIX_HEX
        };
        TeamId(make_test_hex(n, suffix, TEAMID_LEN))
    }

    pub fn make_test_sub(n: u32, public: bool) -> Self {
        let suffix = if public {
            SUB_TEAMID_PUBLIC_SUFFIX_HEX
        } else {
            SUB_TEAMID_PRIVATE_SUFFIX_HEX
        };
        TeamId(make_test_hex(n, suffix, TEAMID_LEN))
    }

    pub fn is_sub_team(&self) -> bool {
        has_suffix(
            &self.0,
            &[SUB_TEAMID_PRIVATE_SUFFIX_HEX, SUB_TEAMID_PUBLIC_SUFFIX_HEX],
        )
    }

    pub fn is_root_team(&self) -> bool {
        !self.is_sub_team()
    }

    pub fn is_public(&self) -> bool {
        has_suffix(
            &self.0,
            &[TEAMID_PUBLIC_SUFFIX_HEX, SUB_TEAMID_PUBLIC_SUFFIX_HEX],
        )
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        decode_or_empty(&self.0)
    }

    pub fn as_user_or_team(&self) -> UserOrTeamId {
        UserOrTeamId(self.0.clone())
    }
}

// ── UserOrTeamID ─────────────────────────────────────────────

string_id!(
    /// Either a UID or a TeamID.
    UserOrTeamId
);

impl UserOrTeamId {
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        let uid_err = match Uid::from_string(s) {
            Ok(uid) => return Ok(uid.as_user_or_team()),
            Err(e) => e,
        };
        let team_err = match TeamId::from_string(s) {
            Ok(team) => return Ok(team.as_user_or_team()),
            Err(e) => e,
        };
        Err(ParseError::NotUserOrTeam {
            value: s.to_owned(),
            uid: Box::new(uid_err),
            team: Box::new(team_err),
        })
    }

    pub fn as_uid(&self) -> Option<Uid> {
        Uid::from_string(&self.0).ok()
    }

    pub fn as_team_id(&self) -> Option<TeamId> {
        TeamId::from_string(&self.0).ok()
    }

    pub fn is_user(&self) -> bool {
        self.as_uid().is_some()
    }

    pub fn is_team(&self) -> bool {
        self.as_team_id().is_some()
    }
}

// ── SigID / SigIDBase ────────────────────────────────────────

string_id!(
    /// A signature id: 32-byte hash plus one suffix byte.
    SigId
);

impl SigId {
    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        // One extra byte for the suffix.
        let expected = 2 * (SIG_ID_LEN + 1);
        if s.len() != expected {
            return Err(ParseError::WrongLength {
                kind: "SigID",
                value: s.to_owned(),
                expected,
            });
        }
        let lower = s.to_lowercase();
        hex::decode(&lower)?;
        Ok(SigId(lower))
    }

    /// The 32 hash bytes, without the suffix; empty when malformed.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut b = decode_or_empty(&self.0);
        if b.len() < SIG_ID_LEN {
            return Vec::new();
        }
        b.truncate(SIG_ID_LEN);
        b
    }

    pub fn strip_suffix(&self) -> SigIdBase {
        let l = 2 * SIG_ID_LEN;
        match self.0.get(..l) {
            Some(base) => SigIdBase(base.to_owned()),
            None => SigIdBase(self.0.clone()),
        }
    }

    /// Compare the hash bytes, ignoring the suffix.
    pub fn eq_bytes(&self, other: &SigId) -> bool {
        let (a, b) = (self.to_bytes(), other.to_bytes());
        !a.is_empty() && !b.is_empty() && constant_time_eq(&a, &b)
    }

    /// Legacy `0f`-suffixed form, used as a storage key.
    pub fn to_map_key(&self) -> String {
        self.strip_suffix().to_sig_id_legacy().0
    }

    pub fn to_medium_id(&self) -> String {
        encode_short(&self.to_bytes())
    }

    pub fn to_short_id(&self) -> String {
        let b = self.to_bytes();
        encode_short(&b[..b.len().min(SIG_SHORT_ID_BYTES)])
    }

    pub fn to_display_string(&self, verbose: bool) -> String {
        if verbose {
            return self.0.clone();
        }
        let head = self.0.get(..SIG_ID_QUERY_MIN).unwrap_or(&self.0);
        format!("{head}...")
    }

    pub fn prefix_match(&self, q: &str, exact: bool) -> bool {
        if self.is_nil() {
            return false;
        }
        if exact {
            return self.0.eq_ignore_ascii_case(q);
        }
        self.0.to_lowercase().starts_with(&q.to_lowercase())
    }
}

string_id!(
    /// The 64-character hex hash of a signature, without a suffix.
    SigIdBase
);

/// How a [`SigIdBase`] becomes a [`SigId`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SigIdSuffixParameters {
    /// True for user sigs, false for team sigs.
    pub is_user_sig: bool,
    pub is_wallet_stellar: bool,
    pub sig_version: i32,
}

impl SigIdSuffixParameters {
    pub fn from_type_and_version(typ: &str, sig_version: i32) -> Self {
        Self {
            is_user_sig: !typ.starts_with("teams."),
            is_wallet_stellar: typ == "wallet.stellar",
            sig_version,
        }
    }

    pub fn suffix(&self) -> &'static str {
        if self.is_wallet_stellar && self.sig_version == 2 {
            return "22";
        }
        if self.is_user_sig {
            return "0f";
        }
        match self.sig_version {
            2 => "22",
            3 => "38",
            _ => "0f",
        }
    }
}

impl std::fmt::Display for SigIdSuffixParameters {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.suffix())
    }
}

impl SigIdBase {
    pub fn from_bytes(b: [u8; SIG_ID_LEN]) -> Self {
        SigIdBase(hex::encode(b))
    }

    pub fn from_slice(b: &[u8]) -> Result<Self, ParseError> {
        let arr: [u8; SIG_ID_LEN] = b.try_into().map_err(|_| ParseError::WrongByteLength {
            kind: "SigIDBase",
            expected: SIG_ID_LEN,
            got: b.len(),
        })?;
        Ok(Self::from_bytes(arr))
    }

    pub fn from_string(s: &str) -> Result<Self, ParseError> {
        Self::from_slice(&hex::decode(s)?)
    }

    pub fn to_sig_id(&self, p: SigIdSuffixParameters) -> SigId {
        SigId(format!("{}{}", self.0, p.suffix()))
    }

    /// Always `0f`, what every SigID used to carry.
    pub fn to_sig_id_legacy(&self) -> SigId {
        self.to_sig_id(SigIdSuffixParameters {
            is_user_sig: true,
            is_wallet_stellar: false,
            sig_version: 1,
        })
    }

    /// Case-insensitive comparison.
    pub fn eq_base(&self, other: &SigIdBase) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }

    pub fn eq_sig_id(&self, other: &SigId) -> bool {
        self.0.eq_ignore_ascii_case(other.strip_suffix().as_str())
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        decode_or_empty(&self.0)
    }
}

// ── LinkID / TLFID ───────────────────────────────────────────

string_id!(
    /// Hash of a sigchain link.
    LinkId
);

impl LinkId {
    pub fn from_bytes32(b: [u8; 32]) -> Self {
        LinkId(hex::encode(b))
    }
}

string_id!(
    /// Top-level folder id.
    TlfId
);

impl TlfId {
    pub fn to_bytes(&self) -> Vec<u8> {
        decode_or_empty(&self.0)
    }
}

// ── Tests ────────────────────────────────────────────────────
