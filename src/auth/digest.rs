/// Password the gate falls back to when no digest is configured.
/// Anyone reading this source knows it. Configure a digest in production.
pub const DEFAULT_ADMIN_PASSWORD: &str = "admin123";

/// Environment variable holding the reference digest.
pub const PASSWORD_HASH_ENV: &str = "FOLIO_ADMIN_PASSWORD_HASH";

/// 32-bit string hash of `password`, rendered in base 36.
///
/// This is not a cryptographic hash. It exists so the reference value is not
/// the literal password, nothing more.
pub fn hash_password(password: &str) -> String {
    let hash = password.encode_utf16().fold(0i32, |hash, unit| {
        hash.wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(unit as i32)
    });
    to_base36(hash)
}

/// Digest of [`DEFAULT_ADMIN_PASSWORD`].
pub fn default_reference_digest() -> String {
    hash_password(DEFAULT_ADMIN_PASSWORD)
}

fn to_base36(value: i32) -> String {
    const DIGITS: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

    let mut n = value.unsigned_abs();
    let mut out = Vec::new();
    loop {
        out.push(DIGITS[(n % 36) as usize]);
        n /= 36;
        if n == 0 {
            break;
        }
    }
    if value < 0 {
        out.push(b'-');
    }
    out.reverse();
    String::from_utf8(out).unwrap_or_default()
}
