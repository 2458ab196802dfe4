use pulldown_cmark::{escape::escape_html, html, Options, Parser};

/// Renders post Markdown to HTML for the preview and the viewer.
///
/// Raw HTML inside the source is passed through untouched.
pub fn render_markdown(source: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);

    let mut output = String::with_capacity(source.len() * 3 / 2);
    html::push_html(&mut output, Parser::new_ext(source, options));
    output
}

/// Escapes text for use in HTML content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut output = String::with_capacity(text.len());
    escape_html(&mut output, text).expect("writing to a String cannot fail");
    output
}
