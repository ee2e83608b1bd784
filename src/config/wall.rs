use serde::Deserialize;

/// Wall-specific knobs.
#[derive(Deserialize)]
pub struct Wall {
    /// Salt mixed into the client address fingerprint. Operators should
    /// set this to a private value so fingerprints cannot be matched
    /// against a rainbow table of public addresses.
    ///
    /// **Environment variables**:
    /// - `MURAL_WALL_IP_SALT`
    #[serde(default)]
    pub ip_salt: String,
}

impl Default for Wall {
    fn default() -> Self {
        Self {
            ip_salt: String::new(),
        }
    }
}

impl std::fmt::Debug for Wall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wall")
            .field("ip_salt", &"<redacted>")
            .finish()
    }
}
