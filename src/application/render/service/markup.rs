use fancy_regex::Regex as FancyRegex;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::domain::topics::TopicRef;

static BRACKET_LINK_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([^\]]+)\](?:\[([^\]]+)\])?\]").expect("bracket link pattern"));

static TML_HEADING_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^(---+)(\++)\s*(.*)").expect("heading pattern"));

static TML_BOLD_ITALIC_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"__(.+?)__").expect("bold italic pattern"));

// The opener refuses a following star so runs emitted by the bold+italic
// rewrite are not consumed again.
static TML_BOLD_RE: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(r"(?<!\*)\*(?![\s*])(.+?)(?<!\s)\*(?!\*)").expect("bold pattern")
});

static TML_ITALIC_RE: Lazy<FancyRegex> = Lazy::new(|| {
    FancyRegex::new(r"(?<!_)_(?!\s)(.+?)(?<!\s)_(?!_)").expect("italic pattern")
});

/// Converts `[[Target][Label]]` and `[[Target]]` bracket links to Markdown.
///
/// Scheme-prefixed targets link out verbatim; everything else resolves to
/// `{base_url}/view/{web}/{topic}` with the current web as the default. The
/// label falls back to the full target text.
pub(crate) fn expand_bracket_links(text: &str, base_url: &str, default_web: &str) -> String {
    BRACKET_LINK_RE
        .replace_all(text, |caps: &regex::Captures| {
            let target = caps[1].trim();
            let label = caps.get(2).map(|m| m.as_str().trim()).unwrap_or("");
            let display = if label.is_empty() { target } else { label };

            if target.starts_with("http://")
                || target.starts_with("https://")
                || target.starts_with("ftp://")
            {
                return format!("[{display}]({target})");
            }

            let target = TopicRef::parse(target, default_web);
            format!("[{display}]({base_url}/view/{}/{})", target.web, target.topic)
        })
        .into_owned()
}

/// Rewrites TML formatting into the Markdown the downstream renderer speaks.
///
/// Heading runs (`---++ Title`, depth from the plus count) convert first,
/// then `__bold italic__`, then `*bold*`, then `_italic_`. The single
/// character rules would eat pieces of `__..__` if they ran earlier.
pub(crate) fn tml_to_markdown(text: &str) -> String {
    let text = TML_HEADING_RE.replace_all(text, |caps: &regex::Captures| {
        let depth = caps[2].len();
        let title = caps[3].trim();
        format!("{} {}", "#".repeat(depth), title)
    });
    let text = TML_BOLD_ITALIC_RE.replace_all(&text, "***${1}***");
    let text = TML_BOLD_RE.replace_all(&text, "**${1}**");
    TML_ITALIC_RE.replace_all(&text, "*${1}*").into_owned()
}
