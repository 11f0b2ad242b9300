//! Email message

/// A single HTML email.
///
/// Addresses are kept as given; parsing them is up to the [`Transport`](super::Transport).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Message {
    from: String,
    to: String,
    subject: String,
    body: String,
}

impl Message {
    /// Create a new message
    pub fn new(
        from: impl Into<String>,
        to: impl Into<String>,
        subject: impl Into<String>,
        body: impl Into<String>,
    ) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            subject: subject.into(),
            body: body.into(),
        }
    }

    /// The sender address
    pub fn from(&self) -> &str {
        &self.from
    }

    /// The recipient address
    pub fn to(&self) -> &str {
        &self.to
    }

    /// The subject line
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// The HTML body
    pub fn body(&self) -> &str {
        &self.body
    }
}
