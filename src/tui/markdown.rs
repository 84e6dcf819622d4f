//! Markdown → ratatui `Text` renderer for answer turns.
//!
//! Walks `pulldown_cmark` events and emits styled `Line`/`Span` values in the
//! active [`Palette`]. Covers headings, emphasis, inline code, fenced code
//! (syntect-highlighted when the palette names a theme), lists, blockquotes,
//! rules and links. Raw HTML is dropped, never interpreted.

use std::sync::LazyLock;

use pulldown_cmark::{CodeBlockKind, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span, Text};
use syntect::easy::HighlightLines;
use syntect::highlighting::ThemeSet;
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;

use crate::tui::palette::Palette;

static SYNTAX_SET: LazyLock<SyntaxSet> = LazyLock::new(SyntaxSet::load_defaults_newlines);
static THEME_SET: LazyLock<ThemeSet> = LazyLock::new(ThemeSet::load_defaults);

const RULE_WIDTH: usize = 40;

/// Parse markdown into owned styled text.
pub fn render(content: &str, palette: &Palette) -> Text<'static> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut writer = Writer::new(palette);
    for event in Parser::new_ext(content, opts) {
        writer.handle(event);
    }
    writer.text
}

enum CodeMode {
    Off,
    Plain,
    Highlighted(Box<HighlightLines<'static>>),
}

struct Writer<'p> {
    text: Text<'static>,
    palette: &'p Palette,
    /// Inline styles compose via `patch`, so bold inside italic stays both.
    styles: Vec<Style>,
    /// Per-line prefixes (blockquote and code gutters).
    line_prefixes: Vec<Span<'static>>,
    /// None = bullet list, Some(n) = ordered list at n.
    list_indices: Vec<Option<u64>>,
    code: CodeMode,
    link_url: Option<String>,
    needs_blank: bool,
}

impl<'p> Writer<'p> {
    fn new(palette: &'p Palette) -> Self {
        Self {
            text: Text::default(),
            palette,
            styles: vec![],
            line_prefixes: vec![],
            list_indices: vec![],
            code: CodeMode::Off,
            link_url: None,
            needs_blank: false,
        }
    }

    fn style(&self) -> Style {
        self.styles
            .last()
            .copied()
            .unwrap_or_else(|| Style::default().fg(self.palette.assistant))
    }

    fn push_style(&mut self, overlay: Style) {
        self.styles.push(self.style().patch(overlay));
    }

    fn pop_style(&mut self) {
        self.styles.pop();
    }

    fn gutter(&self) -> Style {
        Style::default().fg(self.palette.muted)
    }

    fn push_line(&mut self, mut line: Line<'static>) {
        for prefix in self.line_prefixes.iter().rev() {
            line.spans.insert(0, prefix.clone());
        }
        self.text.lines.push(line);
    }

    fn push_span(&mut self, span: Span<'static>) {
        match self.text.lines.last_mut() {
            Some(line) => line.push_span(span),
            None => self.push_line(Line::from(span)),
        }
    }

    fn blank_line_if_needed(&mut self) {
        if self.needs_blank {
            self.push_line(Line::default());
            self.needs_blank = false;
        }
    }

    fn handle(&mut self, event: Event<'_>) {
        match event {
            Event::Start(tag) => self.open(tag),
            Event::End(tag) => self.close(tag),
            Event::Text(t) => self.text(t),
            Event::Code(c) => {
                let style = Style::default().fg(self.palette.code_fg).bg(self.palette.code_bg);
                self.push_span(Span::styled(c.to_string(), style));
            }
            Event::SoftBreak => self.push_span(Span::raw(" ")),
            Event::HardBreak => self.push_line(Line::default()),
            Event::Rule => {
                self.blank_line_if_needed();
                let rule = Span::styled("─".repeat(RULE_WIDTH), self.gutter());
                self.push_line(Line::from(rule));
                self.needs_blank = true;
            }
            Event::TaskListMarker(checked) => {
                self.push_span(Span::raw(if checked { "[x] " } else { "[ ] " }));
            }
            // Inline/block HTML is shown as nothing rather than interpreted
            _ => {}
        }
    }

    fn open(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph => {
                self.blank_line_if_needed();
                self.push_line(Line::default());
            }
            Tag::Heading { level, .. } => {
                self.blank_line_if_needed();
                let style = heading_style(self.palette, level);
                let marker = format!("{} ", "#".repeat(level as usize));
                self.push_line(Line::from(Span::styled(marker, style)));
                self.push_style(style);
            }
            Tag::BlockQuote(_) => {
                self.blank_line_if_needed();
                self.line_prefixes.push(Span::styled("│ ", self.gutter()));
                self.push_style(Style::default().add_modifier(Modifier::ITALIC));
            }
            Tag::CodeBlock(kind) => self.open_code_block(kind),
            Tag::List(start) => {
                if self.list_indices.is_empty() {
                    self.blank_line_if_needed();
                }
                self.list_indices.push(start);
            }
            Tag::Item => self.open_item(),
            Tag::Emphasis => self.push_style(Style::default().add_modifier(Modifier::ITALIC)),
            Tag::Strong => self.push_style(Style::default().add_modifier(Modifier::BOLD)),
            Tag::Strikethrough => {
                self.push_style(Style::default().add_modifier(Modifier::CROSSED_OUT))
            }
            Tag::Link { dest_url, .. } => {
                self.link_url = Some(dest_url.to_string());
                self.push_style(link_style(self.palette));
            }
            _ => {}
        }
    }

    fn open_code_block(&mut self, kind: CodeBlockKind<'_>) {
        if !self.text.lines.is_empty() {
            self.push_line(Line::default());
        }
        let lang = match &kind {
            CodeBlockKind::Fenced(l) => l.as_ref(),
            CodeBlockKind::Indented => "",
        };

        let gutter = self.gutter();
        let mut top = vec![Span::styled("╭──", gutter)];
        if !lang.is_empty() {
            top.push(Span::styled(format!(" {lang}"), gutter.add_modifier(Modifier::BOLD)));
        }
        self.push_line(Line::from(top));
        self.line_prefixes.push(Span::styled("│ ", gutter));

        let highlighter = self
            .palette
            .syntax_theme
            .filter(|_| !lang.is_empty())
            .and_then(|name| THEME_SET.themes.get(name))
            .zip(SYNTAX_SET.find_syntax_by_token(lang))
            .map(|(theme, syntax)| HighlightLines::new(syntax, theme));

        self.code = match highlighter {
            Some(h) => CodeMode::Highlighted(Box::new(h)),
            None => CodeMode::Plain,
        };
    }

    fn open_item(&mut self) {
        self.push_line(Line::default());
        let indent = "  ".repeat(self.list_indices.len().saturating_sub(1));
        let marker = match self.list_indices.last_mut() {
            Some(Some(n)) => {
                let marker = format!("{indent}{n}. ");
                *n += 1;
                marker
            }
            Some(None) => format!("{indent}• "),
            None => return,
        };
        self.push_span(Span::styled(marker, self.gutter()));
    }

    fn close(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => self.needs_blank = true,
            TagEnd::Heading(_) => {
                self.pop_style();
                self.needs_blank = true;
            }
            TagEnd::BlockQuote(_) => {
                self.line_prefixes.pop();
                self.pop_style();
                self.needs_blank = true;
            }
            TagEnd::CodeBlock => {
                self.code = CodeMode::Off;
                self.line_prefixes.pop();
                self.push_line(Line::from(Span::styled("╰──", self.gutter())));
                self.needs_blank = true;
            }
            TagEnd::List(_) => {
                self.list_indices.pop();
                self.needs_blank = true;
            }
            TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough => self.pop_style(),
            TagEnd::Link => {
                self.pop_style();
                if let Some(url) = self.link_url.take() {
                    let style = link_style(self.palette);
                    self.push_span(Span::raw(" ("));
                    self.push_span(Span::styled(url, style));
                    self.push_span(Span::raw(")"));
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, cow: CowStr<'_>) {
        // ratatui renders \t as zero-width
        let text = cow.replace('\t', "    ");

        match std::mem::replace(&mut self.code, CodeMode::Off) {
            CodeMode::Highlighted(mut highlighter) => {
                for line in LinesWithEndings::from(text.as_str()) {
                    let Ok(ranges) = highlighter.highlight_line(line, &SYNTAX_SET) else {
                        continue;
                    };
                    let spans: Vec<Span<'static>> = ranges
                        .into_iter()
                        .filter_map(|(style, fragment)| {
                            let fragment = fragment.trim_end_matches('\n');
                            (!fragment.is_empty()).then(|| {
                                let fg = style.foreground;
                                Span::styled(
                                    fragment.to_owned(),
                                    Style::default().fg(Color::Rgb(fg.r, fg.g, fg.b)),
                                )
                            })
                        })
                        .collect();
                    self.push_line(Line::from(spans));
                }
                self.code = CodeMode::Highlighted(highlighter);
            }
            CodeMode::Plain => {
                let style = Style::default().fg(self.palette.code_fg);
                for line in text.lines() {
                    self.push_line(Line::from(Span::styled(line.to_owned(), style)));
                }
                self.code = CodeMode::Plain;
            }
            CodeMode::Off => {
                let style = self.style();
                self.push_span(Span::styled(text, style));
            }
        }
    }
}

fn heading_style(palette: &Palette, level: HeadingLevel) -> Style {
    let base = Style::default().fg(palette.accent).add_modifier(Modifier::BOLD);
    match level {
        HeadingLevel::H1 => base.add_modifier(Modifier::UNDERLINED),
        HeadingLevel::H2 => base,
        _ => base.add_modifier(Modifier::ITALIC),
    }
}

fn link_style(palette: &Palette) -> Style {
    Style::default()
        .fg(palette.accent)
        .add_modifier(Modifier::UNDERLINED)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::theme::Theme;

    fn lines_of(text: &Text<'_>) -> Vec<String> {
        text.lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn heading_text_inherits_heading_style() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("## Lesson 2", &palette);
        let line = &text.lines[0];
        assert!(line.spans.len() >= 2, "expected >= 2 spans, got {:?}", line);
        let text_style = line.spans[1].style;
        assert!(text_style.add_modifier.contains(Modifier::BOLD));
        assert_eq!(text_style.fg, Some(palette.accent));
    }

    #[test]
    fn bold_text_is_bold() {
        let palette = Palette::for_theme(Theme::Light);
        let text = render("Some **bold** text", &palette);
        let bold = text.lines[0].spans.iter().find(|s| s.content == "bold").unwrap();
        assert!(bold.style.add_modifier.contains(Modifier::BOLD));
    }

    #[test]
    fn plain_text_uses_assistant_colour() {
        let palette = Palette::for_theme(Theme::Terminal);
        let text = render("hello", &palette);
        assert_eq!(text.lines[0].spans[0].style.fg, Some(palette.assistant));
    }

    #[test]
    fn code_block_has_border_structure() {
        let palette = Palette::for_theme(Theme::Terminal);
        let text = render("```\nline1\n\tline2\n```", &palette);
        let lines = lines_of(&text);
        assert!(lines[0].starts_with('╭'), "top border, got {:?}", lines[0]);
        assert_eq!(lines[1], "│ line1");
        assert_eq!(lines[2], "│     line2");
        assert!(lines.last().unwrap().starts_with('╰'));
    }

    #[test]
    fn highlighted_code_keeps_line_count() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("```rust\nfn main() {}\nlet x = 1;\n```", &palette);
        let lines = lines_of(&text);
        assert!(lines[0].contains("rust"));
        assert_eq!(lines.len(), 4);
        assert!(lines[1].contains("fn main"));
    }

    #[test]
    fn html_is_not_rendered() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("<script>alert(1)</script>", &palette);
        assert!(lines_of(&text).iter().all(|l| !l.contains("script")));
    }

    #[test]
    fn links_show_their_target() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("[docs](https://example.com)", &palette);
        assert_eq!(lines_of(&text)[0], "docs (https://example.com)");
    }

    #[test]
    fn ordered_list_counts_up() {
        let palette = Palette::for_theme(Theme::Dark);
        let text = render("1. one\n2. two", &palette);
        let lines = lines_of(&text);
        assert_eq!(lines, vec!["1. one", "2. two"]);
    }
}
