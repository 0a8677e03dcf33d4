use super::{lookup_color, lookup_style, LogColor, LogStyle, LogText, LogTextItem, StyleToken};

/// Single-pass scanner implementing the spec §4.1 grammar. Total: every
/// input produces a valid `LogText`, malformed tokens fall back to literal
/// text.
pub(super) fn parse(input: &str) -> LogText {
    let bytes = input.as_bytes();
    let len = bytes.len();

    let mut items = Vec::new();
    let mut pending = String::new();
    let mut current_color = LogColor::Unchanged;
    let mut current_style = LogStyle::empty();

    let mut pos = 0usize;

    let flush_pending =
        |pending: &mut String, items: &mut Vec<LogTextItem>, color: LogColor, style: LogStyle| {
            if !pending.is_empty() {
                items.push(LogTextItem::run(std::mem::take(pending), color, style));
            }
        };

    while pos < len {
        match bytes[pos] {
            b'\r' => {
                flush_pending(&mut pending, &mut items, current_color, current_style);
                items.push(LogTextItem::NewLine);
                if pos + 1 < len && bytes[pos + 1] == b'\n' {
                    pos += 2;
                } else {
                    pos += 1;
                }
            }
            b'\n' => {
                flush_pending(&mut pending, &mut items, current_color, current_style);
                items.push(LogTextItem::NewLine);
                pos += 1;
            }
            b'<' => {
                // Scan for a matching '>', but bail out (unterminated start)
                // if another '<' is encountered first.
                let mut j = pos + 1;
                let mut close = None;
                while j < len {
                    match bytes[j] {
                        b'>' => {
                            close = Some(j);
                            break;
                        }
                        b'<' => break,
                        _ => {}
                    }
                    j += 1;
                }

                match close {
                    Some(end) => {
                        let name = &input[pos + 1..end];
                        if let Some(color) = lookup_color(name) {
                            flush_pending(&mut pending, &mut items, current_color, current_style);
                            current_color = color;
                            pos = end + 1;
                        } else if let Some(token) = lookup_style(name) {
                            flush_pending(&mut pending, &mut items, current_color, current_style);
                            match token {
                                StyleToken::Unchanged => {}
                                StyleToken::Reset => current_style = LogStyle::empty(),
                                StyleToken::Flag(flag) => current_style |= flag,
                            }
                            pos = end + 1;
                        } else {
                            // Unrecognized token: literal text, brackets included.
                            pending.push_str(&input[pos..=end]);
                            pos = end + 1;
                        }
                    }
                    None => {
                        // No closing '>' before end-of-input or a nested '<':
                        // the '<' itself is literal.
                        pending.push('<');
                        pos += 1;
                    }
                }
            }
            _ => {
                // Advance by one UTF-8 scalar value.
                let ch_len = utf8_len(bytes[pos]);
                let end = (pos + ch_len).min(len);
                pending.push_str(&input[pos..end]);
                pos = end;
            }
        }
    }

    flush_pending(&mut pending, &mut items, current_color, current_style);

    // Invariant: a LogText containing any styled item must end with an
    // implicit or explicit style reset when rendered. If the final item
    // carries a non-Unchanged color, append an implicit reset.
    if let Some(LogTextItem::Run { color, .. }) = items.last() {
        if *color != LogColor::Unchanged {
            items.push(LogTextItem::run("", LogColor::Default, LogStyle::empty()));
        }
    }

    LogText::from_items(items)
}

fn utf8_len(first_byte: u8) -> usize {
    if first_byte & 0x80 == 0 {
        1
    } else if first_byte & 0xE0 == 0xC0 {
        2
    } else if first_byte & 0xF0 == 0xE0 {
        3
    } else if first_byte & 0xF8 == 0xF0 {
        4
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_is_one_run() {
        let text = parse("hello world");
        assert_eq!(
            text.items(),
            &[LogTextItem::run("hello world", LogColor::Unchanged, LogStyle::empty())]
        );
    }

    #[test]
    fn recognized_color_token_sets_color() {
        let text = parse("<Red>alert");
        assert_eq!(
            text.items(),
            &[
                LogTextItem::run("alert", LogColor::Red, LogStyle::empty()),
                LogTextItem::run("", LogColor::Default, LogStyle::empty()),
            ]
        );
    }

    #[test]
    fn unrecognized_token_is_literal() {
        let text = parse("<NotAColor>hi");
        assert_eq!(
            text.items(),
            &[LogTextItem::run(
                "<NotAColor>hi",
                LogColor::Unchanged,
                LogStyle::empty()
            )]
        );
    }

    #[test]
    fn curly_braces_survive_as_literal() {
        let text = parse("count={5}");
        assert_eq!(
            text.items(),
            &[LogTextItem::run("count={5}", LogColor::Unchanged, LogStyle::empty())]
        );
    }

    #[test]
    fn reset_clears_style_but_not_color() {
        let text = parse("<Bold><Red>a<Reset>b");
        assert_eq!(
            text.items(),
            &[
                LogTextItem::run("a", LogColor::Red, LogStyle::BOLD),
                LogTextItem::run("b", LogColor::Red, LogStyle::empty()),
                LogTextItem::run("", LogColor::Default, LogStyle::empty()),
            ]
        );
    }

    #[test]
    fn style_flags_compose_by_union() {
        let text = parse("<Bold><Italic>a");
        assert_eq!(
            text.items(),
            &[LogTextItem::run(
                "a",
                LogColor::Unchanged,
                LogStyle::BOLD | LogStyle::ITALIC
            )]
        );
    }

    #[test]
    fn nested_unterminated_start_is_literal() {
        // The first '<' has no '>' before the next '<', so it is literal;
        // scanning resumes at the second '<', which is a valid token.
        let text = parse("<<Red>x");
        assert_eq!(
            text.items(),
            &[
                LogTextItem::run("<", LogColor::Unchanged, LogStyle::empty()),
                LogTextItem::run("x", LogColor::Red, LogStyle::empty()),
                LogTextItem::run("", LogColor::Default, LogStyle::empty()),
            ]
        );
    }

    #[test]
    fn trailing_newline_produces_newline_item() {
        let text = parse("hi\n");
        assert_eq!(
            text.items(),
            &[
                LogTextItem::run("hi", LogColor::Unchanged, LogStyle::empty()),
                LogTextItem::NewLine,
            ]
        );
    }

    #[test]
    fn crlf_is_a_single_line_break() {
        let text = parse("a\r\nb");
        assert_eq!(
            text.items(),
            &[
                LogTextItem::run("a", LogColor::Unchanged, LogStyle::empty()),
                LogTextItem::NewLine,
                LogTextItem::run("b", LogColor::Unchanged, LogStyle::empty()),
            ]
        );
    }

    #[test]
    fn parser_is_total_never_panics() {
        let malformed_inputs = [
            "", "<", ">", "<<<<", "<Red", "<>", "\r\r\n\n", "<Red><<Bold>>",
        ];
        for input in malformed_inputs {
            let _ = parse(input);
        }
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// The parser never panics, on any byte sequence that happens to be
        /// valid UTF-8 (arbitrary `String` inputs `proptest` generates).
        #[test]
        fn never_panics_on_arbitrary_input(input in ".*") {
            let _ = parse(&input);
        }

        /// Text with no `<`, `\r`, or `\n` round-trips exactly through a
        /// single run with no color or style applied.
        #[test]
        fn plain_text_round_trips(input in "[^<\r\n]*") {
            let text = parse(&input);
            prop_assert_eq!(text.render_plain(), input);
        }
    }
}
