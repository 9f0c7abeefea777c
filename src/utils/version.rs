//! Version information

/// Crate version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get the current crate version
pub fn get_version() -> &'static str {
    VERSION
}

/// Default `User-Agent` sent by the client
pub fn user_agent() -> String {
    format!("{}/{}", env!("CARGO_PKG_NAME"), VERSION)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
        assert_eq!(version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_user_agent() {
        assert_eq!(user_agent(), format!("csrf-session-client/{}", VERSION));
    }
}
