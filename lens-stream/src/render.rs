//! The renderer seam.

use pulldown_cmark::{Options, Parser, html};

/// Receives the full accumulated document after every change.
///
/// Implementations re-render the whole document each time, so every call
/// must cope with a document cut off mid-construct (an unclosed `**`, half
/// a link, an open code fence).
pub trait Render {
    /// Render the document as it stands now.
    fn render(&mut self, document: &str);
}

impl<F> Render for F
where
    F: FnMut(&str),
{
    fn render(&mut self, document: &str) {
        self(document)
    }
}

/// Renders the document from Markdown to HTML on every update.
///
/// CommonMark parsing is total: any prefix of a document renders to valid
/// HTML, so partial documents never fail.
#[derive(Debug, Clone)]
pub struct MarkdownRenderer {
    options: Options,
    html: String,
    renders: usize,
}

impl MarkdownRenderer {
    /// A renderer with tables, strikethrough, and task lists enabled.
    pub fn new() -> Self {
        Self::with_options(Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TASKLISTS)
    }

    /// A renderer with explicit parser options.
    pub fn with_options(options: Options) -> Self {
        Self {
            options,
            html: String::new(),
            renders: 0,
        }
    }

    /// HTML of the most recent render.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// How many times the document has been rendered.
    pub fn renders(&self) -> usize {
        self.renders
    }

    /// Render `document` into a fresh string without touching state.
    pub fn to_html(&self, document: &str) -> String {
        let mut out = String::with_capacity(document.len() * 3 / 2);
        html::push_html(&mut out, Parser::new_ext(document, self.options));
        out
    }
}

impl Default for MarkdownRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl Render for MarkdownRenderer {
    fn render(&mut self, document: &str) {
        self.html = self.to_html(document);
        self.renders += 1;
    }
}
