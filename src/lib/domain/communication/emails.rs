//! Email templates

use askama::Template;

use super::html::{a, btn, center, img, list, p, padding, space, text, Html, ImgElem, TextStyle};

/// Subject of the billing notice
pub const BILLING_NOTICE_SUBJECT: &str = "This is a test email, please ignore";

/// Page layout wrapping a rendered body and a footer
#[derive(Debug, Template)]
#[template(path = "emails/notice.html")]
pub struct NoticeTemplate {
    /// The HTML body, inserted unescaped
    pub body: String,

    /// Footer text
    pub footer: String,
}

impl NoticeTemplate {
    /// Creates a new `NoticeTemplate`
    pub fn new(body: impl Into<String>, footer: impl Into<String>) -> Self {
        Self {
            body: body.into(),
            footer: footer.into(),
        }
    }
}

/// Body of a failed-payment notice
pub fn billing_notice() -> Html {
    let heading = TextStyle {
        font_weight: Some("bold".to_string()),
        font_size: Some(13.0),
        ..Default::default()
    };

    let banner = img(
        "https://example.net/images/billing-banner.png",
        &ImgElem {
            alt: Some("Billing update".to_string()),
            link: Some("https://example.net/billing".to_string()),
            height: Some(400),
            width: Some(225),
        },
    );

    let mut html = Html::new();

    html.add_elem([
        banner,
        padding(p(["Hello,"]), 0, 5),
        p(["We were unable to process your renewal payment. This typically happens when your bank issues a new card, your existing card has expired, or because of a billing error caused by your bank. We'll automatically try again in a few days."]),
        padding(text("Will my service be impacted?", &heading), 10, 10),
        p(["If we do not receive payment 5 days after your invoice is issued, your paid services will be downgraded."]),
        space(8, 0),
        p(["To avoid a service disruption, take a moment to review or update your billing information."]),
        space(8, 0),
        center([btn("Update your billing information", "https://example.net/billing")]),
        space(10, 0),
        text("Helpful resources", &heading),
        list([
            a("Learn more about why a payment failed", "https://example.net/help/failed-payments"),
            a("Update an existing payment method", "https://example.net/help/payment-methods"),
            a("Pay an outstanding balance", "https://example.net/billing"),
        ]),
        p([
            "If you have additional questions, contact us at our".into(),
            a("Support portal", "https://example.net/support"),
            ".".into(),
        ]),
    ]);

    html
}
