//! SMTP transport implementation

use clap::Parser;
use lettre::{
    message::header::ContentType,
    transport::smtp::{
        authentication::Credentials,
        client::{Tls, TlsParameters},
    },
    Message as Email, SmtpTransport, Transport as _,
};
use tracing::debug;

use crate::domain::communication::{
    dialer::Dialer,
    mailer::{ConnectionParams, Message, Transport, TransportError},
};

/// Port on which servers expect TLS from the first byte
const IMPLICIT_TLS_PORT: u16 = 465;

/// SMTP configuration
#[derive(Clone, Default, Debug, Parser)]
pub struct SmtpConfig {
    /// The SMTP host
    #[clap(long = "smtp-host", env = "SMTP_HOST")]
    pub host: String,

    /// The SMTP port
    #[clap(long = "smtp-port", env = "SMTP_PORT", default_value = "465")]
    pub port: u16,

    /// The SMTP username
    #[clap(long = "smtp-user", env = "SMTP_USER", default_value = "")]
    pub username: String,

    /// The SMTP password
    #[clap(
        long = "smtp-password",
        env = "SMTP_PASSWORD",
        default_value = "",
        hide_env_values = true
    )]
    pub password: String,

    /// Verify the TLS certificate
    #[clap(long, env = "SMTP_VERIFY_TLS", default_value = "true")]
    pub verify_tls: bool,

    /// Require STARTTLS (TLS upgrade on connection)
    #[clap(long, env = "SMTP_STARTTLS", default_value = "true")]
    pub starttls: bool,
}

impl SmtpConfig {
    /// The connection parameters described by this configuration
    pub fn params(&self) -> ConnectionParams {
        ConnectionParams::new(&self.host, self.port, &self.username, &self.password)
    }

    /// A dialer delivering through [`LettreTransport`]
    pub fn dialer(&self) -> Dialer<LettreTransport> {
        Dialer::new(
            self.params(),
            LettreTransport::new(self.verify_tls, self.starttls),
        )
    }
}

/// Delivers messages with `lettre`, opening a fresh connection for every message
#[derive(Clone, Debug)]
pub struct LettreTransport {
    verify_tls: bool,
    starttls: bool,
}

impl Default for LettreTransport {
    fn default() -> Self {
        Self::new(true, true)
    }
}

impl LettreTransport {
    /// Create a new transport
    pub fn new(verify_tls: bool, starttls: bool) -> Self {
        Self {
            verify_tls,
            starttls,
        }
    }

    /// The TLS mode for `params`: implicit TLS on port 465, otherwise a STARTTLS upgrade that is
    /// required unless `starttls` is off.
    pub fn tls(&self, params: &ConnectionParams) -> Result<Tls, TransportError> {
        let tls_parameters = TlsParameters::builder(params.host.clone())
            .dangerous_accept_invalid_certs(!self.verify_tls)
            .build()?;

        Ok(if params.port == IMPLICIT_TLS_PORT {
            Tls::Wrapper(tls_parameters)
        } else if self.starttls {
            Tls::Required(tls_parameters)
        } else {
            Tls::Opportunistic(tls_parameters)
        })
    }

    /// Build the SMTP client for one attempt
    pub fn mailer(&self, params: &ConnectionParams) -> Result<SmtpTransport, TransportError> {
        let mut builder = SmtpTransport::builder_dangerous(&params.host)
            .port(params.port)
            .tls(self.tls(params)?);

        if let Some(credentials) = credentials(params) {
            builder = builder.credentials(credentials);
        }

        Ok(builder.build())
    }
}

/// Login credentials, none when no username is configured
fn credentials(params: &ConnectionParams) -> Option<Credentials> {
    (!params.username.is_empty())
        .then(|| Credentials::new(params.username.clone(), params.password.clone()))
}

/// Build the MIME message for `message`, body as `text/html`
pub fn build_email(message: &Message) -> Result<Email, TransportError> {
    Ok(Email::builder()
        .from(message.from().parse()?)
        .to(message.to().parse()?)
        .subject(message.subject())
        .header(ContentType::TEXT_HTML)
        .body(message.body().to_string())?)
}

impl Transport for LettreTransport {
    fn dial_and_send(
        &self,
        params: &ConnectionParams,
        message: &Message,
    ) -> Result<(), TransportError> {
        let email = build_email(message)?;

        debug!(host = %params.host, port = params.port, "connecting to SMTP server");

        self.mailer(params)?.send(&email)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    fn message() -> Message {
        Message::new("a@x.com", "b@x.com", "hi", "<p>hi</p>")
    }

    #[test]
    fn test_build_email_uses_html_content_type() -> TestResult {
        let email = build_email(&message())?;

        let formatted = String::from_utf8(email.formatted())?;

        assert!(formatted.contains("From: a@x.com"));
        assert!(formatted.contains("To: b@x.com"));
        assert!(formatted.contains("Subject: hi"));
        assert!(formatted.contains("Content-Type: text/html; charset=utf-8"));
        assert!(formatted.contains("<p>hi</p>"));

        Ok(())
    }

    #[test]
    fn test_build_email_rejects_invalid_recipient() {
        let message = Message::new("a@x.com", "not an address", "hi", "<p>hi</p>");

        let result = build_email(&message);

        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn test_invalid_address_fails_before_connecting() {
        let message = Message::new("", "b@x.com", "hi", "<p>hi</p>");
        let params = ConnectionParams::new("smtp.invalid", 587, "u", "p");

        let result = LettreTransport::default().dial_and_send(&params, &message);

        assert!(matches!(result, Err(TransportError::InvalidAddress(_))));
    }

    #[test]
    fn test_implicit_tls_on_port_465() -> TestResult {
        let params = ConnectionParams::new("smtp.test", 465, "", "");

        for starttls in [true, false] {
            let tls = LettreTransport::new(true, starttls).tls(&params)?;
            assert!(matches!(tls, Tls::Wrapper(_)));
        }

        Ok(())
    }

    #[test]
    fn test_starttls_required_on_other_ports() -> TestResult {
        let params = ConnectionParams::new("smtp.test", 587, "", "");

        let tls = LettreTransport::new(true, true).tls(&params)?;

        assert!(matches!(tls, Tls::Required(_)));

        Ok(())
    }

    #[test]
    fn test_starttls_opportunistic_when_disabled() -> TestResult {
        let params = ConnectionParams::new("smtp.test", 25, "", "");

        let tls = LettreTransport::new(false, false).tls(&params)?;

        assert!(matches!(tls, Tls::Opportunistic(_)));

        Ok(())
    }

    #[test]
    fn test_no_credentials_without_username() {
        let params = ConnectionParams::new("smtp.test", 587, "", "secret");

        assert_eq!(credentials(&params), None);
    }

    #[test]
    fn test_credentials_with_username() {
        let params = ConnectionParams::new("smtp.test", 587, "u", "p");

        assert_eq!(
            credentials(&params),
            Some(Credentials::new("u".to_string(), "p".to_string()))
        );
    }

    #[test]
    fn test_mailer_builds_for_each_tls_mode() -> TestResult {
        for (port, starttls) in [(465, true), (587, true), (25, false)] {
            LettreTransport::new(false, starttls)
                .mailer(&ConnectionParams::new("smtp.test", port, "u", "p"))?;
        }

        Ok(())
    }

    #[test]
    fn test_config_params() {
        let config = SmtpConfig {
            host: "smtp.test".to_string(),
            port: 587,
            username: "u".to_string(),
            password: "p".to_string(),
            verify_tls: true,
            starttls: true,
        };

        assert_eq!(
            config.params(),
            ConnectionParams::new("smtp.test", 587, "u", "p")
        );
        assert_eq!(config.dialer().params().port, 587);
    }
}
