//! Built-in formatters.

mod html;
mod message;

pub use html::{HtmlFormatter, HtmlOutput, html_formatter};
pub use message::{MessageFormatter, MessageOutput, message_formatter};

use crate::formatter::Formatter;

/// Every built-in formatter, ready to register with a broker.
#[must_use]
pub fn builtin() -> Vec<Box<dyn Formatter>> {
    vec![Box::new(message_formatter()), Box::new(html_formatter())]
}
