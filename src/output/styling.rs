//! Styling helpers for stderr output.

use console::{style, StyledObject};
use std::fmt::Display;

type Styled = StyledObject<String>;

/// Title line of the banner.
pub fn title(text: impl Display) -> Styled {
    style(text.to_string()).magenta().bold()
}

/// A project key or another value the eye should land on.
pub fn highlight(text: impl Display) -> Styled {
    style(text.to_string()).bright()
}

pub fn muted(text: impl Display) -> Styled {
    style(text.to_string()).dim()
}

/// Work in progress.
pub fn pending(text: impl Display) -> Styled {
    style(text.to_string()).bright().yellow()
}

pub fn success(text: impl Display) -> Styled {
    style(text.to_string()).bright().green()
}

pub fn failure(text: impl Display) -> Styled {
    style(text.to_string()).bright().red()
}
