use feedscout_crawler::{Element, SessionError};
use sws_scraper::{ElementRef, Selector};

/// An element of a captured page.
#[derive(Debug, Clone)]
pub struct HtmlElement(pub(crate) ElementRef);

impl Element for HtmlElement {
    fn find_child(&self, selector: &str) -> Result<Option<Self>, SessionError> {
        let selector = parse_selector(selector)?;
        Ok(self.0.select(selector).next().map(HtmlElement))
    }

    /// Rendered text, one line per non blank source line.
    fn text(&self) -> String {
        self.0
            .inner_text()
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn attribute(&self, name: &str) -> Option<String> {
        self.0
            .map_value(|el| el.attr(name).map(String::from))
            .flatten()
    }
}

pub(crate) fn parse_selector(selector: &str) -> Result<Selector, SessionError> {
    Selector::parse(selector).map_err(|e| SessionError::InvalidSelector {
        selector: selector.to_string(),
        reason: format!("{e:?}"),
    })
}
