use pulldown_cmark::{CowStr, Event, Options, Parser, Tag, TagEnd};

pub fn flatten(input: &str) -> Vec<String> {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts.insert(Options::ENABLE_TASKLISTS);

    let mut writer = PlainWriter::default();
    writer.render(Parser::new_ext(input, opts));
    writer.finish()
}

#[derive(Default)]
struct PlainWriter {
    lines: Vec<String>,
    buffer: String,
    // Next ordinal per open list; `None` for bullets.
    lists: Vec<Option<u64>>,
    item_marker: Option<String>,
    quote_depth: usize,
    code: Option<String>,
    link_target: Option<String>,
}

impl PlainWriter {
    fn render<'a, I>(&mut self, parser: I)
    where
        I: Iterator<Item = Event<'a>>,
    {
        for event in parser {
            match event {
                Event::Start(tag) => self.start_tag(tag),
                Event::End(tag) => self.end_tag(tag),
                Event::Text(text) => self.text(text),
                Event::Code(code) => self.buffer.push_str(&code),
                Event::Html(_) | Event::InlineHtml(_) => {}
                Event::FootnoteReference(name) => self.buffer.push_str(&format!("[{name}]")),
                Event::SoftBreak => self.buffer.push(' '),
                Event::HardBreak => self.flush(),
                Event::Rule => {
                    self.flush();
                    self.separate();
                }
                Event::TaskListMarker(done) => {
                    self.buffer.push_str(if done { "[x] " } else { "[ ] " });
                }
            }
        }
        self.flush();
    }

    fn start_tag(&mut self, tag: Tag<'_>) {
        match tag {
            Tag::Paragraph | Tag::Heading { .. } => self.flush(),
            Tag::BlockQuote => {
                self.flush();
                self.quote_depth += 1;
            }
            Tag::CodeBlock(_) => {
                self.flush();
                self.code = Some(String::new());
            }
            Tag::List(start) => {
                self.flush();
                self.lists.push(start);
            }
            Tag::Item => {
                self.flush();
                let marker = match self.lists.last_mut() {
                    Some(Some(next)) => {
                        let marker = format!("{next}.");
                        *next += 1;
                        marker
                    }
                    _ => "-".to_string(),
                };
                self.item_marker = Some(marker);
            }
            Tag::Link { dest_url, .. } => self.link_target = Some(dest_url.into_string()),
            Tag::Image { .. } => self.buffer.push_str("[image]"),
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph | TagEnd::Heading(_) => {
                self.flush();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::BlockQuote => {
                self.flush();
                self.quote_depth = self.quote_depth.saturating_sub(1);
                self.separate();
            }
            TagEnd::CodeBlock => {
                if let Some(code) = self.code.take() {
                    for line in code.trim_end_matches('\n').split('\n') {
                        self.lines.push(format!("    {line}"));
                    }
                    self.separate();
                }
            }
            TagEnd::List(_) => {
                self.flush();
                self.lists.pop();
                if self.lists.is_empty() {
                    self.separate();
                }
            }
            TagEnd::Item => {
                self.flush();
                self.item_marker = None;
            }
            TagEnd::Link => {
                if let Some(target) = self.link_target.take() {
                    if !target.is_empty() && !self.buffer.ends_with(target.as_str()) {
                        self.buffer.push_str(&format!(" ({target})"));
                    }
                }
            }
            _ => {}
        }
    }

    fn text(&mut self, text: CowStr<'_>) {
        match self.code.as_mut() {
            Some(code) => code.push_str(&text),
            None => self.buffer.push_str(&text),
        }
    }

    fn flush(&mut self) {
        let text = self.buffer.trim().to_string();
        self.buffer.clear();
        if text.is_empty() {
            return;
        }

        let mut line = String::new();
        if self.quote_depth > 0 {
            line.push_str(&"> ".repeat(self.quote_depth));
        }
        if let Some(marker) = self.item_marker.take() {
            line.push_str(&"  ".repeat(self.lists.len().saturating_sub(1)));
            line.push_str(&marker);
            line.push(' ');
        } else if !self.lists.is_empty() {
            line.push_str(&"  ".repeat(self.lists.len()));
        }
        line.push_str(&text);
        self.lines.push(line);
    }

    fn separate(&mut self) {
        if matches!(self.lines.last(), Some(last) if !last.is_empty()) {
            self.lines.push(String::new());
        }
    }

    fn finish(mut self) -> Vec<String> {
        while matches!(self.lines.last(), Some(last) if last.is_empty()) {
            self.lines.pop();
        }
        self.lines
    }
}
