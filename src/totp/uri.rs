// ============================================================================
// src/totp/uri.rs – otpauth:// provisioning URIs for authenticator apps
// ============================================================================

use super::secret::normalize;
use super::TotpError;

/// Build an `otpauth://totp/...` URI that an authenticator app can import.
///
/// The secret goes through [`normalize`] and loses its `=` padding. Label
/// and issuer are percent-encoded.
pub fn provisioning_uri(
    secret: &str,
    account: &str,
    issuer: Option<&str>,
) -> Result<String, TotpError> {
    let normalized = normalize(secret)?;
    let b32 = normalized.trim_end_matches('=');

    let issuer = issuer.map(str::trim).filter(|i| !i.is_empty());
    let label = match issuer {
        Some(i) => format!("{}:{}", urlencoding::encode(i), urlencoding::encode(account)),
        None => urlencoding::encode(account).into_owned(),
    };

    let mut uri = format!("otpauth://totp/{label}?secret={b32}");
    if let Some(i) = issuer {
        uri.push_str("&issuer=");
        uri.push_str(&urlencoding::encode(i));
    }
    Ok(uri)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_uri_with_issuer() {
        let uri = provisioning_uri("jbsw y3dp ehpk 3pxp", "Example", Some("Test")).unwrap();
        assert_eq!(
            uri,
            "otpauth://totp/Test:Example?secret=JBSWY3DPEHPK3PXP&issuer=Test"
        );
    }

    #[test]
    fn drops_padding_and_encodes_label() {
        let uri = provisioning_uri("abcd", "me@example.com", Some("Mail Co")).unwrap();
        assert_eq!(
            uri,
            "otpauth://totp/Mail%20Co:me%40example.com?secret=ABCD&issuer=Mail%20Co"
        );
    }

    #[test]
    fn blank_issuer_is_omitted() {
        let uri = provisioning_uri("ABCDEFGH", "acct", Some("  ")).unwrap();
        assert_eq!(uri, "otpauth://totp/acct?secret=ABCDEFGH");
        let uri = provisioning_uri("ABCDEFGH", "acct", None).unwrap();
        assert_eq!(uri, "otpauth://totp/acct?secret=ABCDEFGH");
    }

    #[test]
    fn bad_secret_is_rejected() {
        assert_eq!(
            provisioning_uri("1234", "acct", None),
            Err(TotpError::InvalidFormat)
        );
    }
}
