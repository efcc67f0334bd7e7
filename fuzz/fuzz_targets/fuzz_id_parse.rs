//! Fuzz target: identifier parsers
//!
//! Every parser must either reject the input or accept it and hand back
//! the same (lower-cased, for SigID) text it was given.
//!
//! cargo fuzz run fuzz_id_parse

#![no_main]

use kbrpc::protocol::{DeviceId, Kid, SigId, TeamId, Uid, UserOrTeamId};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    let Ok(s) = std::str::from_utf8(data) else {
        return;
    };

    if let Ok(uid) = Uid::from_string(s) {
        assert_eq!(uid.as_str(), s);
    }
    if let Ok(team) = TeamId::from_string(s) {
        assert_eq!(team.as_str(), s);
        assert!(team.is_root_team() != team.is_sub_team());
    }
    if let Ok(id) = UserOrTeamId::from_string(s) {
        assert!(id.is_user() != id.is_team());
    }
    if let Ok(dev) = DeviceId::from_string(s) {
        assert_eq!(dev.as_str(), s);
    }
    if let Ok(kid) = Kid::from_string_checked(s) {
        let _ = kid.to_short_id_string();
        let _ = kid.key_type();
    }
    if let Ok(sig) = SigId::from_string(s) {
        assert_eq!(sig.as_str(), s.to_lowercase());
        let _ = sig.to_short_id();
        let _ = sig.strip_suffix();
    }
});
