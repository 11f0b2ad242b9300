//! SMTP connection parameters

use std::fmt;

/// Where and as whom to connect
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionParams {
    /// The SMTP host
    pub host: String,

    /// The SMTP port
    pub port: u16,

    /// The SMTP username, empty to skip authentication
    pub username: String,

    /// The SMTP password
    pub password: String,
}

impl ConnectionParams {
    /// Create new connection parameters
    pub fn new(
        host: impl Into<String>,
        port: u16,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for ConnectionParams {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionParams")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("username", &self.username)
            .field("password", &"********")
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_password() {
        let params = ConnectionParams::new("smtp.test", 587, "u", "hunter2");

        let debug = format!("{params:?}");

        assert!(debug.contains("smtp.test"));
        assert!(!debug.contains("hunter2"));
    }
}
