//! HTML to plain text conversion

/// Column width the plain text alternative is wrapped at
const TEXT_WIDTH: usize = 78;

/// Converts an HTML body into its plain text alternative.
pub fn html_to_text(html: &str) -> String {
    html2text::from_read(html.as_bytes(), TEXT_WIDTH)
}
