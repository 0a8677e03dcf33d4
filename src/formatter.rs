//! Turns a [`LogMessage`] into a styled [`LogText`] line (spec §4.6).

use crate::level::LogLevel;
use crate::message::LogMessage;
use crate::text::{LogColor, LogStyle, LogText, LogTextItem};

/// A closed-set field reference usable in a [`MessageTemplate::Custom`]
/// sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placeholder {
    DateTime,
    Level,
    SenderName,
    SenderType,
    Content,
    Exception,
    SourceFile,
    SourceLine,
    NewLine,
}

/// One element of a custom template: either fixed text or a placeholder.
#[derive(Debug, Clone)]
pub enum TemplateElement {
    Literal(String),
    Placeholder(Placeholder),
}

/// Which line layout a [`Formatter`] produces.
#[derive(Debug, Clone, Default)]
pub enum MessageTemplate {
    /// `"<ts>: <LvlName> <Sender>> <content>\n"`.
    #[default]
    Default,
    /// `Default`, with the header through the sender name wrapped in
    /// `<Inverse><LevelColor>…<Reset>`.
    DefaultColored,
    /// `"<LvlInitial> <hh:mm:ss.fff> <Sender>> <content>\n"`, level-colored.
    ShortColored,
    Custom(Vec<TemplateElement>),
}

/// Turns a [`LogMessage`] into a [`LogText`] line using a template and a
/// timestamp format string (`chrono` strftime syntax).
///
/// Culture-aware formatting of interpolated values (decimal separators,
/// boolean spelling) happens at the producer call site before `content` is
/// constructed (spec §4.2); the formatter itself is culture-agnostic.
#[derive(Debug, Clone)]
pub struct Formatter {
    pub date_time_format: String,
    pub template: MessageTemplate,
}

impl Default for Formatter {
    fn default() -> Self {
        Self {
            date_time_format: crate::constants::DEFAULT_TIMESTAMP_FORMAT.to_string(),
            template: MessageTemplate::Default,
        }
    }
}

impl Formatter {
    pub fn new(template: MessageTemplate) -> Self {
        Self {
            template,
            ..Self::default()
        }
    }

    pub fn format(&self, message: &LogMessage) -> LogText {
        match &self.template {
            MessageTemplate::Default => self.format_default(message),
            MessageTemplate::DefaultColored => self.format_colored(message, &self.date_time_format, true),
            MessageTemplate::ShortColored => {
                self.format_colored(message, crate::constants::SHORT_TIMESTAMP_FORMAT, false)
            }
            MessageTemplate::Custom(elements) => self.format_custom(elements, message),
        }
    }

    fn format_default(&self, message: &LogMessage) -> LogText {
        let ts = message.date_time.format(&self.date_time_format);
        let mut text = LogText::new();
        text.push(LogTextItem::run(
            format!("{ts}: {} {}> ", message.level, message.sender_name),
            LogColor::Unchanged,
            LogStyle::empty(),
        ));
        text.extend(message.content.clone());
        text.push(LogTextItem::run("\n", LogColor::Unchanged, LogStyle::empty()));
        text
    }

    /// Shared `DefaultColored`/`ShortColored` builder: the header and
    /// content are composed into one marked-up string and parsed in a
    /// single pass, so a colored header correctly carries its context into
    /// spliced content the same way it would if the whole line had been
    /// authored as one markup literal.
    fn format_colored(&self, message: &LogMessage, date_time_format: &str, full_header: bool) -> LogText {
        let ts = message.date_time.format(date_time_format);
        let color = level_color(message.level);
        let header = if full_header {
            format!("{ts} {} {}", message.level, message.sender_name)
        } else {
            format!("{} {ts} {}", message.level.initial(), message.sender_name)
        };
        let markup = format!(
            "<Inverse><{color}>{header}<Reset>> {}<Reset>\n",
            message.content.to_markup(),
        );
        LogText::parse(&markup)
    }

    fn format_custom(&self, elements: &[TemplateElement], message: &LogMessage) -> LogText {
        let mut text = LogText::new();
        for element in elements {
            match element {
                TemplateElement::Literal(s) => {
                    text.push(LogTextItem::run(s.clone(), LogColor::Unchanged, LogStyle::empty()));
                }
                TemplateElement::Placeholder(placeholder) => {
                    text.extend(self.render_placeholder(*placeholder, message));
                }
            }
        }
        text
    }

    fn render_placeholder(&self, placeholder: Placeholder, message: &LogMessage) -> LogText {
        let literal = |s: String| LogText::from_items(vec![LogTextItem::run(s, LogColor::Unchanged, LogStyle::empty())]);
        match placeholder {
            Placeholder::DateTime => literal(message.date_time.format(&self.date_time_format).to_string()),
            Placeholder::Level => literal(message.level.to_string()),
            Placeholder::SenderName => literal(message.sender_name.clone()),
            Placeholder::SenderType => literal(message.sender_type.clone().unwrap_or_default()),
            Placeholder::Content => message.content.clone(),
            Placeholder::Exception => match &message.exception {
                Some(exc) => LogText::parse(&format!("{}: {}\n{}", exc.type_name, exc.message, exc.stack)),
                None => LogText::new(),
            },
            Placeholder::SourceFile => literal(message.call_site.source_file.clone().unwrap_or_default()),
            Placeholder::SourceLine => literal(
                message
                    .call_site
                    .source_line
                    .map(|l| l.to_string())
                    .unwrap_or_default(),
            ),
            Placeholder::NewLine => LogText::from_items(vec![LogTextItem::NewLine]),
        }
    }
}

/// The §4.6 level → color table, always applied under `Inverse` style.
fn level_color(level: LogLevel) -> &'static str {
    match level {
        LogLevel::Emergency | LogLevel::Alert | LogLevel::Critical => "Magenta",
        LogLevel::Error => "Red",
        LogLevel::Warning => "Yellow",
        LogLevel::Notice => "Green",
        LogLevel::Information => "Cyan",
        LogLevel::Debug => "Gray",
        LogLevel::Verbose => "Blue",
        LogLevel::None => "Default",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::CallSite;
    use chrono::TimeZone;

    fn sample_message() -> LogMessage {
        let date_time = chrono::Local
            .with_ymd_and_hms(2023, 2, 23, 23, 2, 23)
            .unwrap()
            + chrono::Duration::milliseconds(200);
        LogMessage {
            date_time,
            sender_name: "T".to_string(),
            sender_type: None,
            level: LogLevel::Critical,
            content: LogText::parse(
                "Critical test message number 2.5: This is even = True",
            ),
            exception: None,
            call_site: CallSite::default(),
        }
    }

    #[test]
    fn default_preset_matches_invariant_culture_scenario() {
        let formatter = Formatter::default();
        let rendered = formatter.format(&sample_message()).render_plain();
        assert_eq!(
            rendered,
            "2023-02-23 23:02:23.200: Critical T> Critical test message number 2.5: This is even = True\n"
        );
    }

    #[test]
    fn default_colored_preset_matches_scenario_string() {
        let formatter = Formatter::new(MessageTemplate::DefaultColored);
        let rendered = formatter.format(&sample_message());
        let expected = LogText::parse(
            "<Inverse><Magenta>2023-02-23 23:02:23.200 Critical T<Reset>> Critical test message number 2.5: This is even = True<Reset>\n",
        );
        assert_eq!(rendered, expected);
    }

    #[test]
    fn short_colored_preset_uses_initial_and_time_only() {
        let formatter = Formatter::new(MessageTemplate::ShortColored);
        let rendered = formatter.format(&sample_message()).render_plain();
        assert_eq!(rendered, "C 23:02:23.200 T> Critical test message number 2.5: This is even = True\n");
    }

    #[test]
    fn custom_template_composes_selected_placeholders() {
        let formatter = Formatter::new(MessageTemplate::Custom(vec![
            TemplateElement::Placeholder(Placeholder::SenderName),
            TemplateElement::Literal(" says: ".to_string()),
            TemplateElement::Placeholder(Placeholder::Content),
            TemplateElement::Placeholder(Placeholder::NewLine),
        ]));
        let rendered = formatter.format(&sample_message()).render_plain();
        assert_eq!(
            rendered,
            "T says: Critical test message number 2.5: This is even = True\n"
        );
    }
}
