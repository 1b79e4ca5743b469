//! Structured content model for blog posts and the dashboard editor.
//!
//! Stored markup stays markdown; this module parses it into a tagged
//! block/inline tree, renders the tree to display HTML with the site's
//! fixed styling map, and serializes the tree back to markdown. The
//! transform is stateless and deterministic.

use pulldown_cmark::{CodeBlockKind, Event, Parser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

/// Block-level node. Headings deeper than level 3 are clamped to 3.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Heading { level: u8, content: Vec<Inline> },
    Paragraph { content: Vec<Inline> },
    List { ordered: bool, items: Vec<Vec<Inline>> },
    Quote { content: Vec<Block> },
    CodeBlock { language: Option<String>, code: String },
}

/// Inline node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Inline {
    Text { text: String },
    Bold { content: Vec<Inline> },
    Italic { content: Vec<Inline> },
    Code { code: String },
    Link { href: String, content: Vec<Inline> },
}

/// A parsed post body.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    /// Parse stored markdown into the block model.
    pub fn parse(markdown: &str) -> Self {
        let mut builder = DocumentBuilder::default();
        for event in Parser::new(markdown) {
            builder.consume(event);
        }
        Document {
            blocks: builder.finish(),
        }
    }

    /// Render display HTML with the site's fixed element styling. Every
    /// link opens in a new browsing context with no opener back-reference.
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        for block in &self.blocks {
            render_block(&mut out, block);
        }
        out
    }

    /// Serialize the model back to the stored markup format.
    pub fn to_markdown(&self) -> String {
        let parts: Vec<String> = self.blocks.iter().map(block_to_markdown).collect();
        parts.join("\n\n")
    }
}

// ---------------------------------------------------------------------------
// Markdown → model
// ---------------------------------------------------------------------------

enum InlineKind {
    Bold,
    Italic,
    Link(String),
}

struct InlineFrame {
    kind: InlineKind,
    children: Vec<Inline>,
}

struct ListBuilder {
    ordered: bool,
    items: Vec<Vec<Inline>>,
}

#[derive(Default)]
struct DocumentBuilder {
    root: Vec<Block>,
    quote_stack: Vec<Vec<Block>>,
    list_stack: Vec<ListBuilder>,
    inline_stack: Vec<InlineFrame>,
    inlines: Vec<Inline>,
    code: Option<(Option<String>, String)>,
    // Nesting depth of elements outside the fixed mapping (images,
    // tables, raw HTML); their text content is dropped.
    skip_depth: usize,
}

impl DocumentBuilder {
    fn consume(&mut self, event: Event<'_>) {
        if self.skip_depth > 0 {
            match event {
                Event::Start(tag) if is_skipped(&tag) => self.skip_depth += 1,
                Event::End(tag) if is_skipped_end(&tag) => self.skip_depth -= 1,
                _ => {},
            }
            return;
        }

        match event {
            Event::Start(Tag::Paragraph) | Event::Start(Tag::Heading { .. })
                if self.in_list_item() =>
            {
                // Leaf blocks inside list items flatten into the item.
                self.separate_inlines();
            },
            Event::Start(Tag::Paragraph) => {},
            Event::End(TagEnd::Paragraph) => {
                if !self.in_list_item() {
                    let content = std::mem::take(&mut self.inlines);
                    self.push_block(Block::Paragraph { content });
                }
            },
            Event::Start(Tag::Heading { .. }) => {},
            Event::End(TagEnd::Heading(level)) => {
                if !self.in_list_item() {
                    let content = std::mem::take(&mut self.inlines);
                    self.push_block(Block::Heading {
                        level: (level as u8).min(3),
                        content,
                    });
                }
            },

            Event::Start(Tag::BlockQuote(_)) => self.quote_stack.push(Vec::new()),
            Event::End(TagEnd::BlockQuote(_)) => {
                let content = self.quote_stack.pop().unwrap_or_default();
                self.push_block(Block::Quote { content });
            },

            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.to_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            },
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, code)) = self.code.take() {
                    self.push_block(Block::CodeBlock {
                        language,
                        code: code.trim_end_matches('\n').to_string(),
                    });
                }
            },

            Event::Start(Tag::List(start)) => {
                if self.list_stack.last().is_some() {
                    // A nested list interrupts the surrounding item.
                    self.separate_inlines();
                }
                self.list_stack.push(ListBuilder {
                    ordered: start.is_some(),
                    items: Vec::new(),
                });
            },
            Event::Start(Tag::Item) => {},
            Event::End(TagEnd::Item) => {
                let item = std::mem::take(&mut self.inlines);
                if let (Some(list), false) = (self.list_stack.last_mut(), item.is_empty()) {
                    list.items.push(item);
                }
            },
            Event::End(TagEnd::List(_)) => {
                if let Some(done) = self.list_stack.pop() {
                    match self.list_stack.last_mut() {
                        // Nested lists flatten into the parent list.
                        Some(parent) => parent.items.extend(done.items),
                        None => self.push_block(Block::List {
                            ordered: done.ordered,
                            items: done.items,
                        }),
                    }
                }
            },

            Event::Start(Tag::Strong) => self.push_frame(InlineKind::Bold),
            Event::End(TagEnd::Strong) => self.pop_frame(),
            Event::Start(Tag::Emphasis) => self.push_frame(InlineKind::Italic),
            Event::End(TagEnd::Emphasis) => self.pop_frame(),
            Event::Start(Tag::Link { dest_url, .. }) => {
                self.push_frame(InlineKind::Link(dest_url.to_string()));
            },
            Event::End(TagEnd::Link) => self.pop_frame(),

            Event::Text(text) => match self.code.as_mut() {
                Some((_, buffer)) => buffer.push_str(&text),
                None => self.push_inline(Inline::Text {
                    text: text.to_string(),
                }),
            },
            Event::Code(code) => self.push_inline(Inline::Code {
                code: code.to_string(),
            }),
            Event::SoftBreak | Event::HardBreak => self.push_inline(Inline::Text {
                text: " ".to_string(),
            }),

            Event::Start(tag) if is_skipped(&tag) => self.skip_depth += 1,

            // Rules, HTML, footnotes, task markers: outside the mapping.
            _ => {},
        }
    }

    fn finish(mut self) -> Vec<Block> {
        // Unterminated input: close whatever is still open.
        if let Some((language, code)) = self.code.take() {
            self.root.push(Block::CodeBlock {
                language,
                code: code.trim_end_matches('\n').to_string(),
            });
        }
        while let Some(frame) = self.inline_stack.pop() {
            let inline = close_frame(frame);
            match self.inline_stack.last_mut() {
                Some(parent) => parent.children.push(inline),
                None => self.inlines.push(inline),
            }
        }
        if !self.inlines.is_empty() {
            let content = std::mem::take(&mut self.inlines);
            self.root.push(Block::Paragraph { content });
        }
        while let Some(content) = self.quote_stack.pop() {
            self.root.push(Block::Quote { content });
        }
        self.root
    }

    fn in_list_item(&self) -> bool {
        !self.list_stack.is_empty()
    }

    /// Insert a plain-space separator between flattened leaf runs.
    fn separate_inlines(&mut self) {
        if !self.inlines.is_empty() {
            self.inlines.push(Inline::Text {
                text: " ".to_string(),
            });
        }
    }

    fn push_frame(&mut self, kind: InlineKind) {
        self.inline_stack.push(InlineFrame {
            kind,
            children: Vec::new(),
        });
    }

    fn pop_frame(&mut self) {
        if let Some(frame) = self.inline_stack.pop() {
            let inline = close_frame(frame);
            self.push_inline(inline);
        }
    }

    fn push_inline(&mut self, inline: Inline) {
        match self.inline_stack.last_mut() {
            Some(frame) => frame.children.push(inline),
            None => self.inlines.push(inline),
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.quote_stack.last_mut() {
            Some(quote) => quote.push(block),
            None => self.root.push(block),
        }
    }
}

fn close_frame(frame: InlineFrame) -> Inline {
    match frame.kind {
        InlineKind::Bold => Inline::Bold {
            content: frame.children,
        },
        InlineKind::Italic => Inline::Italic {
            content: frame.children,
        },
        InlineKind::Link(href) => Inline::Link {
            href,
            content: frame.children,
        },
    }
}

fn is_skipped(tag: &Tag<'_>) -> bool {
    matches!(
        tag,
        Tag::Image { .. } | Tag::Table(_) | Tag::HtmlBlock | Tag::FootnoteDefinition(_)
    )
}

fn is_skipped_end(tag: &TagEnd) -> bool {
    matches!(
        tag,
        TagEnd::Image | TagEnd::Table | TagEnd::HtmlBlock | TagEnd::FootnoteDefinition
    )
}

// ---------------------------------------------------------------------------
// Model → display HTML
// ---------------------------------------------------------------------------

const H1_CLASS: &str = "text-4xl font-bold text-[#1e3352] mb-6 mt-8";
const H2_CLASS: &str = "text-3xl font-bold text-[#1e3352] mb-4 mt-8";
const H3_CLASS: &str = "text-2xl font-bold text-[#1e3352] mb-3 mt-6";
const PARAGRAPH_CLASS: &str = "text-gray-700 leading-relaxed mb-4";
const UL_CLASS: &str = "list-disc list-inside space-y-2 mb-4 text-gray-700";
const OL_CLASS: &str = "list-decimal list-inside space-y-2 mb-4 text-gray-700";
const QUOTE_CLASS: &str = "border-l-4 border-[#4ade80] bg-gray-50 p-4 my-6 italic";
const PRE_CLASS: &str = "bg-gray-900 text-gray-100 p-4 rounded-lg overflow-x-auto";
const CODE_BLOCK_CLASS: &str = "font-mono text-sm";
const INLINE_CODE_CLASS: &str = "bg-gray-100 px-1 py-0.5 rounded text-sm font-mono";
const BOLD_CLASS: &str = "font-bold text-[#1e3352]";
const LINK_CLASS: &str = "text-[#4ade80] hover:text-[#3dc76a] underline";

fn render_block(out: &mut String, block: &Block) {
    match block {
        Block::Heading { level, content } => {
            let (tag, class) = match level {
                1 => ("h1", H1_CLASS),
                2 => ("h2", H2_CLASS),
                _ => ("h3", H3_CLASS),
            };
            out.push_str(&format!("<{tag} class=\"{class}\">"));
            render_inlines(out, content);
            out.push_str(&format!("</{tag}>"));
        },
        Block::Paragraph { content } => {
            out.push_str(&format!("<p class=\"{PARAGRAPH_CLASS}\">"));
            render_inlines(out, content);
            out.push_str("</p>");
        },
        Block::List { ordered, items } => {
            let (tag, class) = if *ordered { ("ol", OL_CLASS) } else { ("ul", UL_CLASS) };
            out.push_str(&format!("<{tag} class=\"{class}\">"));
            for item in items {
                out.push_str("<li>");
                render_inlines(out, item);
                out.push_str("</li>");
            }
            out.push_str(&format!("</{tag}>"));
        },
        Block::Quote { content } => {
            out.push_str(&format!("<blockquote class=\"{QUOTE_CLASS}\">"));
            for inner in content {
                render_block(out, inner);
            }
            out.push_str("</blockquote>");
        },
        Block::CodeBlock { code, .. } => {
            out.push_str(&format!(
                "<pre class=\"{PRE_CLASS}\"><code class=\"{CODE_BLOCK_CLASS}\">"
            ));
            out.push_str(&html_escape(code));
            out.push_str("</code></pre>");
        },
    }
}

fn render_inlines(out: &mut String, inlines: &[Inline]) {
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(&html_escape(text)),
            Inline::Bold { content } => {
                out.push_str(&format!("<strong class=\"{BOLD_CLASS}\">"));
                render_inlines(out, content);
                out.push_str("</strong>");
            },
            Inline::Italic { content } => {
                out.push_str("<em class=\"italic\">");
                render_inlines(out, content);
                out.push_str("</em>");
            },
            Inline::Code { code } => {
                out.push_str(&format!("<code class=\"{INLINE_CODE_CLASS}\">"));
                out.push_str(&html_escape(code));
                out.push_str("</code>");
            },
            Inline::Link { href, content } => {
                out.push_str(&format!(
                    "<a href=\"{}\" class=\"{LINK_CLASS}\" target=\"_blank\" \
                     rel=\"noopener noreferrer\">",
                    html_attr_escape(href)
                ));
                render_inlines(out, content);
                out.push_str("</a>");
            },
        }
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn html_attr_escape(s: &str) -> String {
    html_escape(s).replace('"', "&quot;")
}

// ---------------------------------------------------------------------------
// Model → markdown
// ---------------------------------------------------------------------------

fn block_to_markdown(block: &Block) -> String {
    match block {
        Block::Heading { level, content } => {
            format!("{} {}", "#".repeat(*level as usize), inlines_to_markdown(content))
        },
        Block::Paragraph { content } => inlines_to_markdown(content),
        Block::List { ordered, items } => items
            .iter()
            .enumerate()
            .map(|(i, item)| {
                if *ordered {
                    format!("{}. {}", i + 1, inlines_to_markdown(item))
                } else {
                    format!("- {}", inlines_to_markdown(item))
                }
            })
            .collect::<Vec<_>>()
            .join("\n"),
        Block::Quote { content } => {
            let inner: Vec<String> = content.iter().map(block_to_markdown).collect();
            inner
                .join("\n\n")
                .lines()
                .map(|line| format!("> {line}"))
                .collect::<Vec<_>>()
                .join("\n")
        },
        Block::CodeBlock { language, code } => {
            format!("```{}\n{}\n```", language.as_deref().unwrap_or(""), code)
        },
    }
}

fn inlines_to_markdown(inlines: &[Inline]) -> String {
    let mut out = String::new();
    for inline in inlines {
        match inline {
            Inline::Text { text } => out.push_str(text),
            Inline::Bold { content } => {
                out.push_str(&format!("**{}**", inlines_to_markdown(content)));
            },
            Inline::Italic { content } => {
                out.push_str(&format!("*{}*", inlines_to_markdown(content)));
            },
            Inline::Code { code } => out.push_str(&format!("`{code}`")),
            Inline::Link { href, content } => {
                out.push_str(&format!("[{}]({})", inlines_to_markdown(content), href));
            },
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::{Block, Document, Inline};

    #[test]
    fn parses_the_fixed_element_set() {
        let doc = Document::parse(
            "# Título\n\nUm parágrafo com **negrito** e *itálico* e `código`.\n\n\
             ## Seção\n\n- item um\n- item dois\n\n1. primeiro\n2. segundo\n\n\
             > citação\n\n```rust\nfn main() {}\n```\n",
        );

        assert!(matches!(&doc.blocks[0], Block::Heading { level: 1, .. }));
        assert!(matches!(&doc.blocks[1], Block::Paragraph { .. }));
        assert!(matches!(&doc.blocks[2], Block::Heading { level: 2, .. }));
        assert!(matches!(&doc.blocks[3], Block::List { ordered: false, items } if items.len() == 2));
        assert!(matches!(&doc.blocks[4], Block::List { ordered: true, items } if items.len() == 2));
        assert!(matches!(&doc.blocks[5], Block::Quote { .. }));
        assert!(matches!(
            &doc.blocks[6],
            Block::CodeBlock { language: Some(lang), code } if lang == "rust" && code == "fn main() {}"
        ));
    }

    #[test]
    fn deep_headings_clamp_to_level_three() {
        let doc = Document::parse("##### muito fundo");
        assert!(matches!(&doc.blocks[0], Block::Heading { level: 3, .. }));
    }

    #[test]
    fn links_open_in_a_new_context_without_opener() {
        let html = Document::parse("[receita](https://example.com.br)").to_html();
        assert!(html.contains("target=\"_blank\""), "html: {html}");
        assert!(html.contains("rel=\"noopener noreferrer\""), "html: {html}");
        assert!(html.contains("href=\"https://example.com.br\""), "html: {html}");
    }

    #[test]
    fn html_output_carries_the_fixed_classes() {
        let html = Document::parse("# T\n\ncorpo\n\n> q").to_html();
        assert!(html.contains("<h1 class=\"text-4xl"), "html: {html}");
        assert!(html.contains("<p class=\"text-gray-700"), "html: {html}");
        assert!(html.contains("<blockquote class=\"border-l-4"), "html: {html}");
    }

    #[test]
    fn text_content_is_escaped() {
        let html = Document::parse("perigo <script>alert(1)</script> & cia").to_html();
        assert!(!html.contains("<script>"), "html: {html}");
        assert!(html.contains("&lt;script&gt;"), "html: {html}");
        assert!(html.contains("&amp; cia"), "html: {html}");
    }

    #[test]
    fn markdown_round_trips_through_the_model() {
        let doc = Document {
            blocks: vec![
                Block::Heading {
                    level: 2,
                    content: vec![Inline::Text {
                        text: "Obrigações do MEI".to_string(),
                    }],
                },
                Block::Paragraph {
                    content: vec![
                        Inline::Text {
                            text: "Pague o ".to_string(),
                        },
                        Inline::Bold {
                            content: vec![Inline::Text {
                                text: "DAS".to_string(),
                            }],
                        },
                        Inline::Text {
                            text: " em dia.".to_string(),
                        },
                    ],
                },
                Block::List {
                    ordered: false,
                    items: vec![
                        vec![Inline::Text {
                            text: "emitir nota fiscal".to_string(),
                        }],
                        vec![Inline::Text {
                            text: "declaração anual".to_string(),
                        }],
                    ],
                },
            ],
        };

        let markdown = doc.to_markdown();
        assert_eq!(Document::parse(&markdown), doc);
    }

    #[test]
    fn rendering_is_deterministic() {
        let source = "## A\n\ntexto com [link](https://example.com)\n";
        assert_eq!(Document::parse(source).to_html(), Document::parse(source).to_html());
    }

    #[test]
    fn editor_payload_serializes_as_tagged_json() {
        let doc = Document::parse("**forte**");
        let value = serde_json::to_value(&doc).expect("serializable");
        assert_eq!(value["blocks"][0]["type"], "paragraph");
        assert_eq!(value["blocks"][0]["content"][0]["type"], "bold");
    }
}
