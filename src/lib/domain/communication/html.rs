//! Inline-styled HTML fragments for email bodies
//!
//! Email clients ignore most stylesheets, so every helper writes its styles inline. Fragments are
//! plain strings and are not escaped.

use std::fmt;

const FONT_FAMILY: &str = "font-family: 'Open Sans', sans-serif;";
const BODY_FONT: &str =
    "font-family: 'Open Sans', sans-serif; font-size: 14px; line-height: 19.6px;";

/// A fragment of HTML markup
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Elem(String);

impl Elem {
    /// The raw markup
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Elem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Elem {
    fn from(markup: &str) -> Self {
        Self(markup.to_string())
    }
}

impl From<String> for Elem {
    fn from(markup: String) -> Self {
        Self(markup)
    }
}

impl From<Elem> for String {
    fn from(elem: Elem) -> Self {
        elem.0
    }
}

/// An email body built from a sequence of fragments
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Html {
    elements: Vec<Elem>,
}

impl Html {
    /// Create an empty body
    pub fn new() -> Self {
        Self::default()
    }

    /// Append fragments to the body
    pub fn add_elem<I, E>(&mut self, elems: I) -> &mut Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Elem>,
    {
        self.elements.extend(elems.into_iter().map(Into::into));
        self
    }
}

impl fmt::Display for Html {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.elements.iter().try_for_each(|elem| f.write_str(elem.as_str()))
    }
}

/// Text styling for [`text`]. Unset fields use the body defaults.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TextStyle {
    /// CSS colour, defaults to `#000000`
    pub color: Option<String>,

    /// Font size in pixels, defaults to 14
    pub font_size: Option<f32>,

    /// Line height in pixels, defaults to 19.6
    pub line_height: Option<f32>,

    /// CSS font weight, defaults to `normal`
    pub font_weight: Option<String>,

    /// CSS text decoration, defaults to `none`
    pub decoration: Option<String>,
}

/// Image options for [`img`]
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ImgElem {
    /// Alternative text
    pub alt: Option<String>,

    /// Wrap the image in a link to this URL
    pub link: Option<String>,

    /// Height attribute in pixels
    pub height: Option<u32>,

    /// Width attribute in pixels
    pub width: Option<u32>,
}

fn merge<I, E>(elems: I) -> String
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    elems
        .into_iter()
        .map(|elem| format!(" {}", elem.into()))
        .collect()
}

/// A paragraph of body text
pub fn p<I, E>(elems: I) -> Elem
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    Elem(format!(
        r#"<p style="line-height: 140%; font-size: 14px;"><span style="{BODY_FONT}">{}</span></p>"#,
        merge(elems)
    ))
}

/// Bold text
pub fn strong<I, E>(elems: I) -> Elem
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    Elem(format!(
        r#"<strong style="{BODY_FONT}">{}</strong>"#,
        merge(elems)
    ))
}

/// Text in the body font
pub fn span<I, E>(elems: I) -> Elem
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    Elem(format!(r#"<span style="{BODY_FONT}">{}</span>"#, merge(elems)))
}

/// Vertical padding around a fragment
pub fn padding(elem: impl Into<Elem>, top: u32, bottom: u32) -> Elem {
    Elem(format!(
        r#"<div style="padding-top: {top}px; padding-bottom: {bottom}px;">{}</div>"#,
        elem.into()
    ))
}

/// A link opening in a new tab
pub fn a(elem: impl Into<Elem>, link: &str) -> Elem {
    Elem(format!(
        r#"<a href="{link}" target="_blank">{}</a>"#,
        elem.into()
    ))
}

/// An unordered list, one item per fragment
pub fn list<I, E>(elems: I) -> Elem
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    let items: String = elems
        .into_iter()
        .map(|elem| format!("<li>{}</li>", span([elem])))
        .collect();

    Elem(format!("<ul>{items}</ul>"))
}

/// Empty space of the given height and width in pixels
pub fn space(height: u32, width: u32) -> Elem {
    Elem(format!(
        r#"<div style="height: {height}px; width: {width}px;"></div>"#
    ))
}

/// A call-to-action button
pub fn btn(elem: impl Into<Elem>, link: &str) -> Elem {
    let styles = [
        "text-decoration:none",
        "color:#ffffff",
        "text-align:center",
        "display:block",
        "border-radius:5px",
        "background-color:#0282a6",
        "padding-top:8px",
        "padding-right:16px",
        "padding-bottom:8px",
        "padding-left:16px",
    ]
    .join(";");

    Elem(format!(
        r#"<a href="{link}" style="{styles}" target="_blank">{}</a>"#,
        elem.into()
    ))
}

/// Horizontally centered content
pub fn center<I, E>(elems: I) -> Elem
where
    I: IntoIterator<Item = E>,
    E: Into<Elem>,
{
    Elem(format!(
        concat!(
            r#"<table role="presentation" border="0" cellpadding="0" cellspacing="0" style="margin:0 auto">"#,
            r#"<tbody><tr><td style="{}font-size:14px;">{}</td></tr></tbody></table>"#,
        ),
        FONT_FAMILY,
        merge(elems)
    ))
}

/// Styled text
pub fn text(elem: impl Into<Elem>, style: &TextStyle) -> Elem {
    let font_size = style.font_size.unwrap_or(14.0);
    let line_height = style.line_height.unwrap_or(19.6);
    let color = style.color.as_deref().unwrap_or("#000000");
    let font_weight = style.font_weight.as_deref().unwrap_or("normal");
    let decoration = style.decoration.as_deref().unwrap_or("none");

    Elem(format!(
        concat!(
            r#"<span style="{} font-size: {:.2}px; line-height: {:.2}px;"#,
            r#" color: {}; font-weight: {}; text-decoration: {};">{}</span>"#,
        ),
        FONT_FAMILY,
        font_size,
        line_height,
        color,
        font_weight,
        decoration,
        elem.into()
    ))
}

/// A full-width image, optionally linked
pub fn img(src: &str, options: &ImgElem) -> Elem {
    let mut tag = format!(r#"<img src="{src}""#);

    if let Some(height) = options.height {
        tag.push_str(&format!(r#" height="{height}""#));
    }
    if let Some(width) = options.width {
        tag.push_str(&format!(r#" width="{width}""#));
    }
    if let Some(alt) = &options.alt {
        tag.push_str(&format!(r#" alt="{alt}""#));
    }
    tag.push_str(
        r#" style="display:block;margin-right:auto;margin-left:auto;width:100%;height:auto;">"#,
    );

    let image = match &options.link {
        Some(link) => a(tag, link),
        None => Elem(tag),
    };

    img_section(image)
}

fn img_section(elem: Elem) -> Elem {
    Elem(format!(
        concat!(
            r#"<table role="presentation" width="100%" border="0" cellpadding="0" cellspacing="0" style="min-width:100%">"#,
            r#"<tbody><tr style="white-space:nowrap;background-color:#ffffff">"#,
            r#"<td align="center" style="background-color:#ffffff;padding-left:40px;padding-right:40px">"#,
            r#"<div>{}</div></td></tr></tbody></table>"#,
        ),
        elem
    ))
}
