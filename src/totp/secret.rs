// ============================================================================
// src/totp/secret.rs – Tolerant Base32 secret normalization
// ============================================================================

use data_encoding::{Encoding, BASE32};
use std::sync::OnceLock;
use zeroize::Zeroizing;

use super::TotpError;

/// Characters people paste between secret groups; dropped before decoding.
fn is_separator(c: char) -> bool {
    c.is_whitespace() || matches!(c, '-' | '_' | '=')
}

fn is_base32_symbol(c: char) -> bool {
    c.is_ascii_uppercase() || ('2'..='7').contains(&c)
}

/// Padded RFC 4648 Base32 that tolerates non-zero trailing bits, which is
/// what authenticator apps accept for hand-typed secrets.
fn base32() -> &'static Encoding {
    static LENIENT: OnceLock<Encoding> = OnceLock::new();
    LENIENT.get_or_init(|| {
        let mut spec = BASE32.specification();
        spec.check_trailing_bits = false;
        spec.encoding().unwrap_or_else(|_| BASE32.clone())
    })
}

/// Strip separators, uppercase and re-pad a raw secret.
///
/// `"j67g 7kvt-ai7z"` becomes `"J67G7KVTAI7Z===="`. Anything left over that
/// is not in `A-Z2-7` is rejected with [`TotpError::InvalidFormat`].
pub fn normalize(secret: &str) -> Result<String, TotpError> {
    let mut clean: String = secret
        .chars()
        .filter(|c| !is_separator(*c))
        .map(|c| c.to_ascii_uppercase())
        .collect();

    if clean.is_empty() {
        return Err(TotpError::InvalidFormat);
    }
    if !clean.chars().all(is_base32_symbol) {
        return Err(TotpError::InvalidFormat);
    }

    let rem = clean.len() % 8;
    if rem != 0 {
        clean.extend(std::iter::repeat('=').take(8 - rem));
    }
    Ok(clean)
}

/// True iff `normalized` decodes as padded Base32.
pub fn validate(normalized: &str) -> bool {
    base32().decode(normalized.as_bytes()).is_ok()
}

/// Decode a normalized secret into key bytes.
pub(crate) fn decode(normalized: &str) -> Result<Zeroizing<Vec<u8>>, TotpError> {
    base32()
        .decode(normalized.as_bytes())
        .map(Zeroizing::new)
        .map_err(|_| TotpError::InvalidSecret)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_normal_form(s: &str) -> bool {
        let body = s.trim_end_matches('=');
        !body.is_empty() && body.chars().all(is_base32_symbol) && s.len() % 8 == 0
    }

    #[test]
    fn strips_separators_and_uppercases() {
        let out = normalize("j67g 7kvt ai7z fcex 4c3h ku5e hdpk imez").unwrap();
        assert_eq!(out, "J67G7KVTAI7ZFCEX4C3HKU5EHDPKIMEZ");

        let out = normalize("jbsw-y3dp_ehpk\t3pxp\n").unwrap();
        assert_eq!(out, "JBSWY3DPEHPK3PXP");
    }

    #[test]
    fn pads_to_multiple_of_eight() {
        assert_eq!(normalize("abcd").unwrap(), "ABCD====");
        assert_eq!(normalize("ABCDEFG").unwrap(), "ABCDEFG=");
        assert_eq!(normalize("ABCDEFGH").unwrap(), "ABCDEFGH");
        assert_eq!(normalize("ABCDEFGHIJ").unwrap(), "ABCDEFGHIJ======");
    }

    #[test]
    fn separators_in_any_arrangement_give_normal_form() {
        let inputs = [
            "JB SW Y3 DP",
            "--jbswy3dp__",
            " j b s w y 3 d p e ",
            "JBSWY3DPEHPK3PXP====",
            "a-b_c d=e",
            "\u{00a0}gezd gnbv\u{2003}gy3t",
        ];
        for raw in inputs {
            let out = normalize(raw).unwrap();
            assert!(is_normal_form(&out), "{raw:?} -> {out:?}");
        }
    }

    #[test]
    fn normalize_is_idempotent() {
        for raw in ["jbsw y3dp", "ABCDEFG", "j67g-7kvt-ai7z", "GEZDGNBVGY3TQOJQ"] {
            let once = normalize(raw).unwrap();
            assert_eq!(normalize(&once).unwrap(), once);
        }
    }

    #[test]
    fn rejects_characters_outside_alphabet() {
        for raw in ["JBSW0Y3DP", "JBSW1", "ABC8", "9ABC", "AB.CD", "AB/CD", "AB+C", "ÄBCD"] {
            assert_eq!(normalize(raw), Err(TotpError::InvalidFormat), "{raw:?}");
        }
    }

    #[test]
    fn rejects_empty_after_stripping() {
        assert_eq!(normalize(""), Err(TotpError::InvalidFormat));
        assert_eq!(normalize(" -_= \n"), Err(TotpError::InvalidFormat));
    }

    #[test]
    fn validate_accepts_well_formed_secrets() {
        assert!(validate("JBSWY3DPEHPK3PXP"));
        assert!(validate("ABCD===="));
        assert!(validate("ABCDEFG="));
        // non-zero trailing bits are tolerated
        assert!(validate("AB======"));
    }

    #[test]
    fn validate_rejects_impossible_quantum_lengths() {
        assert!(!validate("A======="));
        assert!(!validate("ABC====="));
        assert!(!validate("ABCDEF=="));
        assert!(!validate("AB"));
        assert!(!validate("not base32"));
    }

    #[test]
    fn decode_never_fails_once_validated() {
        for raw in ["jbswy3dpehpk3pxp", "ab", "abcd", "abcde", "abcdefg", "j67g 7kvt"] {
            let normalized = normalize(raw).unwrap();
            if validate(&normalized) {
                assert!(decode(&normalized).is_ok(), "{normalized}");
            }
        }
    }

    #[test]
    fn decodes_known_key() {
        let key = decode("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(key.as_slice(), b"12345678901234567890");
    }
}
