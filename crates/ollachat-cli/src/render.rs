use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};

/// Render Markdown into plain terminal text.
///
/// Headings keep their `#` markers, code blocks are fenced by a rule and
/// indented, list items get bullets or numbers, links show their target.
pub fn render_markdown(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_STRIKETHROUGH | Options::ENABLE_TABLES);

    let mut out = String::new();
    let mut in_code_block = false;
    let mut list_stack: Vec<Option<u64>> = Vec::new();
    let mut link_targets: Vec<String> = Vec::new();

    for event in parser {
        match event {
            Event::Start(tag) => match tag {
                Tag::Heading { level, .. } => {
                    ensure_blank_line(&mut out);
                    out.push_str(heading_marker(level));
                    out.push(' ');
                }
                Tag::Paragraph => {
                    if list_stack.is_empty() {
                        ensure_blank_line(&mut out);
                    }
                }
                Tag::CodeBlock(kind) => {
                    ensure_blank_line(&mut out);
                    let lang = match kind {
                        CodeBlockKind::Fenced(lang) if !lang.is_empty() => format!(" {lang} "),
                        _ => String::new(),
                    };
                    out.push_str(&format!("──{lang}──────────\n"));
                    in_code_block = true;
                }
                Tag::List(start) => {
                    if list_stack.is_empty() {
                        ensure_blank_line(&mut out);
                    } else {
                        ensure_newline(&mut out);
                    }
                    list_stack.push(start);
                }
                Tag::Item => {
                    ensure_newline(&mut out);
                    let depth = list_stack.len().saturating_sub(1);
                    out.push_str(&"  ".repeat(depth));
                    match list_stack.last_mut() {
                        Some(Some(n)) => {
                            out.push_str(&format!("{n}. "));
                            *n += 1;
                        }
                        _ => out.push_str("• "),
                    }
                }
                Tag::BlockQuote(_) => {
                    ensure_blank_line(&mut out);
                    out.push_str("│ ");
                }
                Tag::Link { dest_url, .. } => link_targets.push(dest_url.to_string()),
                _ => {}
            },
            Event::End(tag) => match tag {
                TagEnd::Heading(_) | TagEnd::Paragraph | TagEnd::BlockQuote(_) => {
                    ensure_newline(&mut out);
                }
                TagEnd::CodeBlock => {
                    ensure_newline(&mut out);
                    out.push_str("────────────\n");
                    in_code_block = false;
                }
                TagEnd::List(_) => {
                    list_stack.pop();
                    ensure_newline(&mut out);
                }
                TagEnd::Link => {
                    if let Some(url) = link_targets.pop() {
                        out.push_str(&format!(" ({url})"));
                    }
                }
                _ => {}
            },
            Event::Text(text) => {
                if in_code_block {
                    for line in text.lines() {
                        out.push_str("    ");
                        out.push_str(line);
                        out.push('\n');
                    }
                } else {
                    out.push_str(&text);
                }
            }
            Event::Code(code) => {
                out.push('`');
                out.push_str(&code);
                out.push('`');
            }
            Event::SoftBreak => out.push(' '),
            Event::HardBreak => out.push('\n'),
            Event::Rule => {
                ensure_blank_line(&mut out);
                out.push_str("────────────\n");
            }
            Event::TaskListMarker(done) => out.push_str(if done { "[x] " } else { "[ ] " }),
            Event::Html(html) | Event::InlineHtml(html) => out.push_str(&html),
            _ => {}
        }
    }

    out.trim_end().to_string()
}

fn heading_marker(level: HeadingLevel) -> &'static str {
    match level {
        HeadingLevel::H1 => "#",
        HeadingLevel::H2 => "##",
        HeadingLevel::H3 => "###",
        HeadingLevel::H4 => "####",
        HeadingLevel::H5 => "#####",
        HeadingLevel::H6 => "######",
    }
}

fn ensure_newline(out: &mut String) {
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
}

fn ensure_blank_line(out: &mut String) {
    if out.is_empty() {
        return;
    }
    ensure_newline(out);
    if !out.ends_with("\n\n") {
        out.push('\n');
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headings_and_paragraphs() {
        let rendered = render_markdown("# Title\n\nSome *emphasis* here.");
        assert_eq!(rendered, "# Title\n\nSome emphasis here.");
    }

    #[test]
    fn bullet_and_numbered_lists() {
        let rendered = render_markdown("- one\n- two\n\n1. first\n2. second");
        assert!(rendered.contains("• one\n• two"));
        assert!(rendered.contains("1. first\n2. second"));
    }

    #[test]
    fn code_blocks_are_indented() {
        let rendered = render_markdown("```rust\nfn main() {}\n```");
        assert!(rendered.contains("── rust ──"));
        assert!(rendered.contains("    fn main() {}"));
    }

    #[test]
    fn links_show_target() {
        let rendered = render_markdown("See [docs](https://ollama.com).");
        assert_eq!(rendered, "See docs (https://ollama.com).");
    }
}
