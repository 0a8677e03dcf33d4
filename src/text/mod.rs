//! Styled text: the color/style-annotated message content model (spec §4.1).
//!
//! A [`LogText`] is an ordered sequence of immutable [`LogTextItem`]s. It can
//! be built by parsing a marked-up string, by constructing items directly, or
//! by concatenating other `LogText` values.

mod parser;
mod render;

pub use render::RenderProfile;

use bitflags::bitflags;

/// Named color, or a modifier on the prior item's color.
///
/// `Unchanged` means "inherit from prior item"; `Default` resets to the
/// sink's default foreground.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LogColor {
    Unchanged,
    Default,
    Black,
    Gray,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

impl LogColor {
    const NAMES: &'static [(&'static str, LogColor)] = &[
        ("unchanged", LogColor::Unchanged),
        ("default", LogColor::Default),
        ("black", LogColor::Black),
        ("gray", LogColor::Gray),
        ("grey", LogColor::Gray),
        ("blue", LogColor::Blue),
        ("green", LogColor::Green),
        ("cyan", LogColor::Cyan),
        ("red", LogColor::Red),
        ("magenta", LogColor::Magenta),
        ("yellow", LogColor::Yellow),
        ("white", LogColor::White),
    ];

    fn lookup(name: &str) -> Option<LogColor> {
        let lower = name.to_ascii_lowercase();
        Self::NAMES
            .iter()
            .find(|(n, _)| *n == lower)
            .map(|(_, c)| *c)
    }

    /// Canonical `<Token>` spelling, used by the markup round-trip
    /// serializer.
    pub(crate) const fn token_name(self) -> &'static str {
        match self {
            LogColor::Unchanged => "Unchanged",
            LogColor::Default => "Default",
            LogColor::Black => "Black",
            LogColor::Gray => "Gray",
            LogColor::Blue => "Blue",
            LogColor::Green => "Green",
            LogColor::Cyan => "Cyan",
            LogColor::Red => "Red",
            LogColor::Magenta => "Magenta",
            LogColor::Yellow => "Yellow",
            LogColor::White => "White",
        }
    }
}

bitflags! {
    /// Bitflag set of composable text styles.
    ///
    /// `Unchanged` is represented as the empty set (inherit). `Reset` is not
    /// a stored bit: encountering the `<Reset>` token during parsing clears
    /// the accumulator to empty rather than setting a bit, matching "Reset
    /// clears prior style; other flags compose by union."
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct LogStyle: u8 {
        const BOLD = 0b0001;
        const ITALIC = 0b0010;
        const UNDERLINE = 0b0100;
        const INVERSE = 0b1000;
    }
}

impl LogStyle {
    /// Token names recognized by the parser as *style* directives, beyond
    /// the bitflag names themselves (`Reset` and `Unchanged` carry no bit).
    fn lookup(name: &str) -> Option<StyleToken> {
        match name.to_ascii_lowercase().as_str() {
            "unchanged" => Some(StyleToken::Unchanged),
            "reset" => Some(StyleToken::Reset),
            "bold" => Some(StyleToken::Flag(LogStyle::BOLD)),
            "italic" => Some(StyleToken::Flag(LogStyle::ITALIC)),
            "underline" => Some(StyleToken::Flag(LogStyle::UNDERLINE)),
            "inverse" => Some(StyleToken::Flag(LogStyle::INVERSE)),
            _ => None,
        }
    }
}

pub(crate) enum StyleToken {
    Unchanged,
    Reset,
    Flag(LogStyle),
}

impl LogStyle {
    /// Canonical `<Token>` names for each set bit, in a fixed emission
    /// order, used by the markup round-trip serializer.
    pub(crate) fn token_names(self) -> Vec<&'static str> {
        let mut names = Vec::new();
        if self.contains(LogStyle::BOLD) {
            names.push("Bold");
        }
        if self.contains(LogStyle::ITALIC) {
            names.push("Italic");
        }
        if self.contains(LogStyle::UNDERLINE) {
            names.push("Underline");
        }
        if self.contains(LogStyle::INVERSE) {
            names.push("Inverse");
        }
        names
    }
}

/// One atomic, immutable styled fragment of a [`LogText`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogTextItem {
    /// A run of plain or styled text.
    Run {
        text: String,
        color: LogColor,
        style: LogStyle,
    },
    /// A hard line break.
    NewLine,
}

impl LogTextItem {
    pub fn run(text: impl Into<String>, color: LogColor, style: LogStyle) -> Self {
        LogTextItem::Run {
            text: text.into(),
            color,
            style,
        }
    }
}

/// An ordered sequence of styled text fragments.
///
/// Equality is sequence-equality of items (text, color, style all compared).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogText {
    items: Vec<LogTextItem>,
}

impl LogText {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a marked-up string into styled items (spec §4.1 grammar). This
    /// is a total function: every input produces a valid `LogText`.
    pub fn parse(input: &str) -> Self {
        parser::parse(input)
    }

    pub fn from_items(items: Vec<LogTextItem>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[LogTextItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn push(&mut self, item: LogTextItem) {
        self.items.push(item);
    }

    pub fn extend(&mut self, other: LogText) {
        self.items.extend(other.items);
    }

    /// Concatenation of item texts, with line breaks included as `\n`.
    pub fn render_plain(&self) -> String {
        render::render_plain(self)
    }

    /// Render control sequences for the given sink profile, transitioning
    /// only on changes from the previously-emitted color/style.
    pub fn render(&self, profile: RenderProfile) -> String {
        render::render(self, profile)
    }

    /// Serialize back to the §4.1 markup grammar, assuming a fresh
    /// (`Unchanged`/empty) starting context. Used internally by the
    /// formatter to splice already-styled content into a larger template
    /// before a single combined parse, so that surrounding color/style
    /// context carries across the splice the same way it would if the
    /// whole line had been authored as one marked-up string.
    pub(crate) fn to_markup(&self) -> String {
        render::render_markup(self)
    }
}

impl std::ops::Add for LogText {
    type Output = LogText;

    fn add(mut self, rhs: LogText) -> LogText {
        self.extend(rhs);
        self
    }
}

impl From<&str> for LogText {
    fn from(value: &str) -> Self {
        LogText::parse(value)
    }
}

impl From<String> for LogText {
    fn from(value: String) -> Self {
        LogText::parse(&value)
    }
}

pub(crate) fn lookup_color(name: &str) -> Option<LogColor> {
    LogColor::lookup(name)
}

pub(crate) fn lookup_style(name: &str) -> Option<StyleToken> {
    LogStyle::lookup(name)
}
