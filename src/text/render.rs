use owo_colors::{OwoColorize, Style};

use super::{LogColor, LogStyle, LogText, LogTextItem};

/// Which sink a [`LogText`] is being rendered for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderProfile {
    /// No control sequences at all.
    Plain,
    /// ANSI SGR escape sequences (terminal sinks).
    Ansi,
    /// HTML `<span>` runs (HTML file sinks).
    Html,
}

pub(super) fn render_plain(text: &LogText) -> String {
    let mut out = String::new();
    for item in text.items() {
        match item {
            LogTextItem::Run { text, .. } => out.push_str(text),
            LogTextItem::NewLine => out.push('\n'),
        }
    }
    out
}

pub(super) fn render(text: &LogText, profile: RenderProfile) -> String {
    match profile {
        RenderProfile::Plain => render_plain(text),
        RenderProfile::Ansi => render_ansi(text),
        RenderProfile::Html => render_html(text),
    }
}

/// Render via `owo_colors`, the same crate the teacher uses to colorize its
/// level strings (`OwoColorize`/`Style`). Each run is wrapped independently
/// rather than tracking emitted-code transitions by hand: `owo_colors`
/// already appends `ESC[0m` after every styled value, so consecutive runs
/// that share a color/style simply each carry their own (harmless,
/// idempotent) reset rather than eliding it.
fn render_ansi(text: &LogText) -> String {
    let mut out = String::new();
    for item in text.items() {
        match item {
            LogTextItem::NewLine => out.push('\n'),
            LogTextItem::Run { text, color, style } => {
                if *color == LogColor::Unchanged && style.is_empty() {
                    out.push_str(text);
                } else {
                    out.push_str(&text.style(owo_style(*color, *style)).to_string());
                }
            }
        }
    }
    out
}

/// Maps spec §3's named `LogColor`/`LogStyle` sets onto the standard 8-color
/// ANSI palette via `owo_colors::Style`'s builder. `Unchanged` leaves the
/// foreground unset (no code emitted), matching "inherit from prior item".
fn owo_style(color: LogColor, style: LogStyle) -> Style {
    let mut s = match color {
        LogColor::Unchanged => Style::new(),
        LogColor::Default => Style::new().default_color(),
        LogColor::Black => Style::new().black(),
        LogColor::Gray => Style::new().bright_black(),
        LogColor::Blue => Style::new().blue(),
        LogColor::Green => Style::new().green(),
        LogColor::Cyan => Style::new().cyan(),
        LogColor::Red => Style::new().red(),
        LogColor::Magenta => Style::new().magenta(),
        LogColor::Yellow => Style::new().yellow(),
        LogColor::White => Style::new().white(),
    };
    if style.contains(LogStyle::BOLD) {
        s = s.bold();
    }
    if style.contains(LogStyle::ITALIC) {
        s = s.italic();
    }
    if style.contains(LogStyle::UNDERLINE) {
        s = s.underline();
    }
    if style.contains(LogStyle::INVERSE) {
        s = s.reversed();
    }
    s
}

fn render_html(text: &LogText) -> String {
    let mut out = String::new();
    let mut last_color = None::<LogColor>;
    let mut last_style = None::<LogStyle>;
    let mut span_open = false;

    for item in text.items() {
        match item {
            LogTextItem::NewLine => {
                if span_open {
                    out.push_str("</span>");
                    span_open = false;
                }
                out.push_str("<br/>");
            }
            LogTextItem::Run { text, color, style } => {
                if last_color != Some(*color) || last_style != Some(*style) {
                    if span_open {
                        out.push_str("</span>");
                    }
                    out.push_str(&format!(
                        "<span style=\"{}\">",
                        html_style_attr(*color, *style)
                    ));
                    span_open = true;
                    last_color = Some(*color);
                    last_style = Some(*style);
                }
                out.push_str(&html_escape(text));
            }
        }
    }
    if span_open {
        out.push_str("</span>");
    }
    out
}

fn html_style_attr(color: LogColor, style: LogStyle) -> String {
    let mut decls = Vec::new();
    if let Some(css) = html_color_css(color) {
        decls.push(format!("color:{css}"));
    }
    if style.contains(LogStyle::BOLD) {
        decls.push("font-weight:bold".to_string());
    }
    if style.contains(LogStyle::ITALIC) {
        decls.push("font-style:italic".to_string());
    }
    if style.contains(LogStyle::UNDERLINE) {
        decls.push("text-decoration:underline".to_string());
    }
    if style.contains(LogStyle::INVERSE) {
        decls.push("filter:invert(1)".to_string());
    }
    decls.join(";")
}

fn html_color_css(color: LogColor) -> Option<&'static str> {
    match color {
        LogColor::Unchanged => None,
        LogColor::Default => Some("inherit"),
        LogColor::Black => Some("black"),
        LogColor::Gray => Some("gray"),
        LogColor::Blue => Some("blue"),
        LogColor::Green => Some("green"),
        LogColor::Cyan => Some("cyan"),
        LogColor::Red => Some("red"),
        LogColor::Magenta => Some("magenta"),
        LogColor::Yellow => Some("#b59400"),
        LogColor::White => Some("white"),
    }
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// Serialize back to the §4.1 markup grammar, assuming a fresh
/// (`Unchanged`/empty) starting context.
///
/// Emits a `<ColorName>` token only when color changes from the prior item,
/// and either the newly-set style tokens (when the new style set is a
/// superset of the prior one) or a `<Reset>` followed by the full style set
/// (when a bit was cleared). Literal `<` in run text is escaped with a
/// zero-width space so it can never be mistaken for the start of a token by
/// a later parse.
pub(super) fn render_markup(text: &LogText) -> String {
    let mut out = String::new();
    let mut last_color = LogColor::Unchanged;
    let mut last_style = LogStyle::empty();

    for item in text.items() {
        match item {
            LogTextItem::NewLine => out.push('\n'),
            LogTextItem::Run { text, color, style } => {
                if *color != last_color {
                    out.push('<');
                    out.push_str(color.token_name());
                    out.push('>');
                    last_color = *color;
                }
                if *style != last_style {
                    if style.contains(last_style) {
                        for name in (*style & !last_style).token_names() {
                            out.push('<');
                            out.push_str(name);
                            out.push('>');
                        }
                    } else {
                        out.push_str("<Reset>");
                        for name in style.token_names() {
                            out.push('<');
                            out.push_str(name);
                            out.push('>');
                        }
                    }
                    last_style = *style;
                }
                out.push_str(&escape_markup_literal(text));
            }
        }
    }
    out
}

fn escape_markup_literal(text: &str) -> String {
    if text.contains('<') {
        text.replace('<', "<\u{200B}")
    } else {
        text.to_string()
    }
}
