//! Referral codes and referral linking rules.

use sha2::{Digest, Sha256};

use crate::types::{Address, User};

/// Fixed bonus credited to a referrer, in $BORK.
pub const DEFAULT_REFERRAL_BONUS: i64 = 100;

/// How many salted codes to try before giving up on a collision streak.
pub const MAX_CODE_ATTEMPTS: u32 = 16;

const CODE_PREFIX: &str = "BORK";

/// Derive a referral code for `address`.
///
/// `attempt` salts the hash so a caller that hits a uniqueness collision can
/// simply ask for the next one.
pub fn generate_referral_code(address: &Address, attempt: u32) -> String {
    let mut hasher = Sha256::new();
    hasher.update(address.as_str().as_bytes());
    hasher.update(attempt.to_be_bytes());
    let digest = hasher.finalize();
    format!("{CODE_PREFIX}{}", hex::encode_upper(&digest[..3]))
}

/// Does `reference` (the `ref` query parameter) point at this user?
///
/// A reference matches either the user's address or their referral code,
/// case-insensitively.
pub fn matches_reference(address: &Address, referral_code: &str, reference: &str) -> bool {
    let reference = reference.trim();
    !reference.is_empty()
        && (address.as_str().eq_ignore_ascii_case(reference)
            || referral_code.eq_ignore_ascii_case(reference))
}

/// Find the referrer a `ref` parameter points at.
pub fn resolve_referrer<'a, I>(users: I, reference: &str) -> Option<&'a User>
where
    I: IntoIterator<Item = &'a User>,
{
    users
        .into_iter()
        .find(|u| matches_reference(&u.address, &u.referral_code, reference))
}

/// A referral can be linked only once, and never to oneself.
pub fn can_link(referred: &User, referrer: &Address) -> bool {
    referred.referred_by.is_none() && &referred.address != referrer
}

/// Shareable link for a referral code.
pub fn referral_link(base_url: &str, referral_code: &str) -> String {
    format!("{}/?ref={}", base_url.trim_end_matches('/'), referral_code)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn addr(n: u8) -> Address {
        Address::parse(&format!("0x{}", hex::encode([n; 20]))).unwrap()
    }

    fn user(address: Address, code: &str) -> User {
        User {
            address,
            balance: 0,
            total_earned: 0,
            is_admin: false,
            referral_code: code.to_string(),
            referred_by: None,
            joined_at: Utc::now(),
            login_streak: 0,
            last_login: None,
        }
    }

    #[test]
    fn test_code_shape_and_determinism() {
        let a = addr(1);
        let code = generate_referral_code(&a, 0);
        assert!(code.starts_with("BORK"));
        assert_eq!(code.len(), 10);
        assert!(code[4..].chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_lowercase()));
        assert_eq!(code, generate_referral_code(&a, 0));
        assert_ne!(code, generate_referral_code(&a, 1));
    }

    #[test]
    fn test_resolve_by_code_or_address_case_insensitive() {
        let users = vec![user(addr(1), "BORK123"), user(addr(2), "BORK456")];

        let by_code = resolve_referrer(&users, "bork123").unwrap();
        assert_eq!(by_code.address, addr(1));

        let upper = addr(2).as_str().to_uppercase().replacen("0X", "0x", 1);
        let by_address = resolve_referrer(&users, &upper).unwrap();
        assert_eq!(by_address.address, addr(2));

        assert!(resolve_referrer(&users, "BORK999").is_none());
        assert!(resolve_referrer(&users, "   ").is_none());
    }

    #[test]
    fn test_can_link_rules() {
        let mut referred = user(addr(3), "BORKAAAAAA");
        assert!(can_link(&referred, &addr(1)));
        assert!(!can_link(&referred, &addr(3)));

        referred.referred_by = Some(addr(1));
        assert!(!can_link(&referred, &addr(2)));
    }

    #[test]
    fn test_referral_link() {
        assert_eq!(
            referral_link("https://theborkchain.lovable.app/", "BORK123"),
            "https://theborkchain.lovable.app/?ref=BORK123"
        );
    }
}
