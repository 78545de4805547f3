use scraper::{ElementRef, Html};

/// A parsed, navigable HTML document.
///
/// Thin wrapper over `scraper::Html` exposing only the queries the extractor,
/// the link discoverer and the pagination lookup need.
pub struct Document {
    html: Html,
}

impl Document {
    /// Parses rendered page markup
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// All elements with the given tag name, in document order
    pub fn elements<'a>(&'a self, tag: &'a str) -> impl Iterator<Item = ElementRef<'a>> + 'a {
        self.html
            .root_element()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(move |el| el.value().name().eq_ignore_ascii_case(tag))
    }

    /// Every `<a>` that carries an `href`, paired with its trimmed text
    pub fn anchors(&self) -> impl Iterator<Item = (&str, String)> + '_ {
        self.elements("a")
            .filter_map(|el| el.value().attr("href").map(|href| (href, text_of(&el))))
    }
}

/// Concatenated text of an element and its descendants, trimmed
pub fn text_of(el: &ElementRef<'_>) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// Value of `name` on the element, if present
pub fn attr_of<'a>(el: &ElementRef<'a>, name: &str) -> Option<&'a str> {
    el.value().attr(name)
}

/// Whether the element's class list contains `class`
pub fn has_class(el: &ElementRef<'_>, class: &str) -> bool {
    el.value().classes().any(|c| c == class)
}

/// The raw text node immediately before the element, if that sibling is text.
///
/// Returns `None` when the element is the first child or when the previous
/// sibling is another element or a comment.
pub fn preceding_text<'a>(el: &ElementRef<'a>) -> Option<&'a str> {
    el.prev_sibling()
        .and_then(|node| node.value().as_text().map(|text| &**text))
}
