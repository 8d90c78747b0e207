//! Audit trail vocabulary.

/// Action label for a newly created election.
pub const ELECTION_CREATED: &str = "Election Created";
/// Action label for a candidate added to an election.
pub const CANDIDATE_ADDED: &str = "Candidate Added";
/// Action label for a cast vote.
pub const VOTE_CAST: &str = "Vote Cast";

/// The user label recorded for administrative actions.
pub const ADMIN_USER: &str = "Admin";

/// A short, non-cryptographic fingerprint of `input` for display next to
/// audit entries: `0x` followed by at least 8 hex digits.
///
/// This is the classic 32-bit `h * 31 + c` string hash over UTF-16 code
/// units, with the sign dropped.
pub fn display_hash(input: &str) -> String {
    let hash = input
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        });
    format!("0x{:08x}", i64::from(hash).unsigned_abs())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input() {
        assert_eq!(display_hash(""), "0x00000000");
    }

    #[test]
    fn known_values() {
        // 'a' = 97 = 0x61.
        assert_eq!(display_hash("a"), "0x00000061");
        // 97 * 31 + 98 = 3105 = 0xc21.
        assert_eq!(display_hash("ab"), "0x00000c21");
        // "hello" hashes to 99162322 = 0x5e918d2.
        assert_eq!(display_hash("hello"), "0x05e918d2");
    }

    #[test]
    fn negative_hashes_lose_their_sign() {
        // "polygenelubricants" hashes to i32::MIN.
        assert_eq!(display_hash("polygenelubricants"), "0x80000000");
    }

    #[test]
    fn deterministic() {
        let id = "64b7f0c2a1b2c3d4e5f60718";
        assert_eq!(display_hash(id), display_hash(id));
        assert_eq!(display_hash(id).len(), 10);
    }
}
