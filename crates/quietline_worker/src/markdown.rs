//! The two markdown forms popup bubbles understand: fenced code blocks and
//! `**bold**` spans. Everything else renders as plain text.

const FENCE: &str = "```";
const BOLD: &str = "**";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Span {
    Plain(String),
    Bold(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Block {
    Prose(Vec<Span>),
    /// Body of a fenced block with the language hint line removed.
    Code(String),
}

/// Split bubble text into prose and code blocks.
/// An unterminated fence is kept as prose.
/// Allocation: one `String` per span. Complexity: O(n).
pub fn parse_blocks(text: &str) -> Vec<Block> {
    let mut blocks = Vec::new();
    let mut rest = text;

    while let Some(open) = rest.find(FENCE) {
        let after_open = &rest[open + FENCE.len()..];
        let Some(close) = after_open.find(FENCE) else {
            break;
        };
        push_prose(&mut blocks, &rest[..open]);
        blocks.push(Block::Code(strip_language_hint(&after_open[..close])));
        rest = &after_open[close + FENCE.len()..];
    }
    push_prose(&mut blocks, rest);
    blocks
}

fn push_prose(blocks: &mut Vec<Block>, text: &str) {
    if text.is_empty() {
        return;
    }
    blocks.push(Block::Prose(parse_spans(text)));
}

fn strip_language_hint(body: &str) -> String {
    let code = body.trim();
    match code.split_once('\n') {
        Some((_hint, code)) => code.to_owned(),
        None => code.to_owned(),
    }
}

/// `**x**` becomes bold when `x` is non-empty and free of `*`; any other
/// asterisks stay literal.
pub fn parse_spans(text: &str) -> Vec<Span> {
    let mut spans = Vec::new();
    let mut plain = String::new();
    let mut rest = text;

    while let Some(open) = rest.find(BOLD) {
        let after_open = &rest[open + BOLD.len()..];
        let inner_len = after_open.find('*').unwrap_or(after_open.len());
        let closes = inner_len > 0 && after_open[inner_len..].starts_with(BOLD);
        if !closes {
            // Keep the first `*` literal and rescan from the next one.
            plain.push_str(&rest[..open + 1]);
            rest = &rest[open + 1..];
            continue;
        }
        plain.push_str(&rest[..open]);
        if !plain.is_empty() {
            spans.push(Span::Plain(std::mem::take(&mut plain)));
        }
        spans.push(Span::Bold(after_open[..inner_len].to_owned()));
        rest = &after_open[inner_len + BOLD.len()..];
    }

    plain.push_str(rest);
    if !plain.is_empty() {
        spans.push(Span::Plain(plain));
    }
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn plain_text_is_one_span() {
        assert_eq!(
            parse_blocks("hello there"),
            vec![Block::Prose(vec![Span::Plain("hello there".to_owned())])]
        );
    }

    #[test]
    fn bold_spans_are_split_out() {
        assert_eq!(
            parse_spans("say **yes** or **no**."),
            vec![
                Span::Plain("say ".to_owned()),
                Span::Bold("yes".to_owned()),
                Span::Plain(" or ".to_owned()),
                Span::Bold("no".to_owned()),
                Span::Plain(".".to_owned()),
            ]
        );
    }

    #[test]
    fn stray_asterisks_stay_literal() {
        assert_eq!(
            parse_spans("**open only"),
            vec![Span::Plain("**open only".to_owned())]
        );
        assert_eq!(parse_spans("****"), vec![Span::Plain("****".to_owned())]);
        assert_eq!(
            parse_spans("a *b* c"),
            vec![Span::Plain("a *b* c".to_owned())]
        );
    }

    #[test]
    fn bold_span_may_contain_spaces() {
        assert_eq!(
            parse_spans("2 ** 3 ** 4"),
            vec![
                Span::Plain("2 ".to_owned()),
                Span::Bold(" 3 ".to_owned()),
                Span::Plain(" 4".to_owned()),
            ]
        );
    }

    #[test]
    fn fenced_code_drops_language_hint() {
        let text = "Run this:\n```rust\nfn main() {}\n```\nthen **reply**";
        assert_eq!(
            parse_blocks(text),
            vec![
                Block::Prose(vec![Span::Plain("Run this:\n".to_owned())]),
                Block::Code("fn main() {}".to_owned()),
                Block::Prose(vec![
                    Span::Plain("\nthen ".to_owned()),
                    Span::Bold("reply".to_owned()),
                ]),
            ]
        );
    }

    #[test]
    fn single_line_fence_keeps_its_content() {
        assert_eq!(
            parse_blocks("```ls -la```"),
            vec![Block::Code("ls -la".to_owned())]
        );
    }

    #[test]
    fn unterminated_fence_is_prose() {
        assert_eq!(
            parse_blocks("before ```never closed"),
            vec![Block::Prose(vec![Span::Plain(
                "before ```never closed".to_owned()
            )])]
        );
    }

    #[test]
    fn bold_markers_inside_code_are_not_parsed() {
        assert_eq!(
            parse_blocks("```\nx = a**b**c\n```"),
            vec![Block::Code("x = a**b**c".to_owned())]
        );
    }
}
