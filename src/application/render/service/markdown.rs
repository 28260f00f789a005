use comrak::options::Options;
use comrak::{Arena, format_html, parse_document};
use html_escape::encode_text;
use tracing::warn;

pub(crate) fn default_options() -> Options<'static> {
    let mut options = Options::default();
    configure_extensions(&mut options);
    options
}

fn configure_extensions(options: &mut Options<'static>) {
    let ext = &mut options.extension;
    ext.strikethrough = true;
    ext.table = true;
    ext.footnotes = true;
    ext.tasklist = true;
    ext.tagfilter = false;

    let render = &mut options.render;
    // macro handlers emit raw HTML fragments that must survive
    render.r#unsafe = true;
    render.github_pre_lang = true;
}

/// Markdown to HTML. A formatter failure degrades to the escaped source in a
/// preformatted block instead of failing the render.
pub(crate) fn markdown_to_html(text: &str, options: &Options<'static>) -> String {
    let arena = Arena::new();
    let root = parse_document(&arena, text, options);

    let mut html = String::new();
    match format_html(root, options, &mut html) {
        Ok(()) => html,
        Err(err) => {
            warn!(error = %err, "markdown formatting failed");
            format!("<pre>{}</pre>", encode_text(text))
        }
    }
}
