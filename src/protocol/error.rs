//! Parse / validation errors for protocol values.

/// Failure to build a protocol value from its textual or integer form.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ParseError {
    #[error("bad {kind} '{value}'; must be {expected} hex characters long")]
    WrongLength {
        kind: &'static str,
        value: String,
        expected: usize,
    },

    #[error("{kind} wrong length; wanted {expected} but got {got} bytes")]
    WrongByteLength {
        kind: &'static str,
        expected: usize,
        got: usize,
    },

    #[error("bad {kind} '{value}': must end in one of {allowed:?}")]
    BadSuffix {
        kind: &'static str,
        value: String,
        allowed: &'static [&'static str],
    },

    #[error("bad KID suffix: got 0x{got:02x}, wanted 0x{wanted:02x}")]
    BadKidSuffix { got: u8, wanted: u8 },

    #[error("bad KID version: got 0x{got:02x}, wanted 0x{wanted:02x}")]
    BadKidVersion { got: u8, wanted: u8 },

    #[error("invalid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("bad UserOrTeamID: could not parse '{value}' as a UID ({uid}) or team id ({team})")]
    NotUserOrTeam {
        value: String,
        uid: Box<ParseError>,
        team: Box<ParseError>,
    },

    #[error("bad eldest seqno '{0}'")]
    BadSeqno(String),

    #[error("unknown {kind} value '{value}'")]
    UnknownEnumValue { kind: &'static str, value: String },

    #[error("{union}: tag {tag} is not a case of this union")]
    UnknownUnionTag { union: &'static str, tag: String },

    #[error("{union}: unexpected nil value for case {case}")]
    MissingUnionCase {
        union: &'static str,
        case: &'static str,
    },
}
