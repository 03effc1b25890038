//! Portable text to HTML.
//!
//! Rendering is driven by [`Serializers`], a map from a tag to a render
//! function. Block styles (`normal`, `h1`, ...), list containers (`ul`, `ol`),
//! list items (`li`), marks (`strong`, `link`, ...) and node types (`image`)
//! all resolve through the same map. Tags without an entry use the fallback,
//! which passes the children through unchanged.

use cms::ImageUrlBuilder;
use domain::portable_text::{BodyNode, ListKind, Span, TextBlock};
use maud::{html, Markup};
use std::collections::HashMap;
use tracing::debug;

pub struct Props<'a> {
    pub tag: &'a str,
    pub children: Markup,
    pub href: Option<&'a str>,
    pub image_url: Option<String>,
    pub alt: Option<&'a str>,
}

impl<'a> Props<'a> {
    fn new(tag: &'a str, children: Markup) -> Self {
        Self {
            tag,
            children,
            href: None,
            image_url: None,
            alt: None,
        }
    }
}

pub type Serializer = Box<dyn Fn(Props<'_>) -> Markup + Send + Sync>;

const DECORATORS: [&str; 5] = ["strong", "em", "code", "underline", "strike-through"];

pub struct Serializers {
    map: HashMap<String, Serializer>,
    fallback: Serializer,
}

impl Serializers {
    /// No entries at all; everything goes through the fallback.
    pub fn empty() -> Self {
        Self {
            map: HashMap::new(),
            fallback: Box::new(passthrough),
        }
    }

    pub fn with<F>(mut self, tag: &str, f: F) -> Self
    where
        F: Fn(Props<'_>) -> Markup + Send + Sync + 'static,
    {
        self.map.insert(tag.to_string(), Box::new(f));
        self
    }

    pub fn with_fallback<F>(mut self, f: F) -> Self
    where
        F: Fn(Props<'_>) -> Markup + Send + Sync + 'static,
    {
        self.fallback = Box::new(f);
        self
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.map.contains_key(tag)
    }

    pub fn render(&self, props: Props<'_>) -> Markup {
        match self.map.get(props.tag) {
            Some(f) => f(props),
            None => (self.fallback)(props),
        }
    }

    /// Plain HTML element for every standard tag.
    pub fn standard() -> Self {
        Self::empty()
            .with("normal", |p| html! { p { (p.children) } })
            .with("h1", |p| html! { h1 { (p.children) } })
            .with("h2", |p| html! { h2 { (p.children) } })
            .with("h3", |p| html! { h3 { (p.children) } })
            .with("h4", |p| html! { h4 { (p.children) } })
            .with("h5", |p| html! { h5 { (p.children) } })
            .with("h6", |p| html! { h6 { (p.children) } })
            .with("blockquote", |p| html! { blockquote { (p.children) } })
            .with("ul", |p| html! { ul { (p.children) } })
            .with("ol", |p| html! { ol { (p.children) } })
            .with("li", |p| html! { li { (p.children) } })
            .with("strong", |p| html! { strong { (p.children) } })
            .with("em", |p| html! { em { (p.children) } })
            .with("code", |p| html! { code { (p.children) } })
            .with("underline", |p| html! { span style="text-decoration: underline" { (p.children) } })
            .with("strike-through", |p| html! { del { (p.children) } })
            .with("link", |p| html! { a href=(p.href.unwrap_or("#")) { (p.children) } })
            .with("image", |p| match p.image_url {
                Some(src) => html! { img src=(src) alt=(p.alt.unwrap_or("")); },
                None => html! {},
            })
    }

    /// Standard set with the blog's styled headings, lists and links.
    pub fn site() -> Self {
        Self::standard()
            .with("h1", |p| html! { h1 class="text-2xl font-bold my-5" { (p.children) } })
            .with("h2", |p| html! { h2 class="text-xl font-bold my-5" { (p.children) } })
            .with("li", |p| html! { li class="ml-4 list-disc" { (p.children) } })
            .with("link", |p| {
                html! { a href=(p.href.unwrap_or("#")) class="text-blue-500 hover:underline" { (p.children) } }
            })
            .with("ul", |p| html! { ul class="my-10" { (p.children) } })
    }
}

fn passthrough(p: Props<'_>) -> Markup {
    debug!("No serializer for '{}', passing children through", p.tag);
    p.children
}

fn level(block: &TextBlock) -> u32 {
    block.level.unwrap_or(1)
}

impl Default for Serializers {
    fn default() -> Self {
        Self::standard()
    }
}

pub struct PortableText<'a> {
    serializers: &'a Serializers,
    images: &'a ImageUrlBuilder,
}

impl<'a> PortableText<'a> {
    pub fn new(serializers: &'a Serializers, images: &'a ImageUrlBuilder) -> Self {
        Self {
            serializers,
            images,
        }
    }

    pub fn render(&self, doc: &[BodyNode]) -> Markup {
        let mut out = String::new();
        let mut i = 0;
        while i < doc.len() {
            let items: Vec<&TextBlock> = doc[i..]
                .iter()
                .map_while(|node| match node {
                    BodyNode::Block(b) if b.list_item.is_some() => Some(b),
                    _ => None,
                })
                .collect();

            if items.is_empty() {
                out.push_str(&self.node(&doc[i]).into_string());
                i += 1;
                continue;
            }

            let mut done = 0;
            while done < items.len() {
                let (markup, used) = self.list(&items[done..]);
                out.push_str(&markup.into_string());
                done += used;
            }
            i += items.len();
        }
        maud::PreEscaped(out)
    }

    /// Renders one `ul`/`ol` starting at `items[0]`. Deeper items nest
    /// inside the preceding `li`. Returns the markup and how many items it
    /// consumed.
    fn list(&self, items: &[&TextBlock]) -> (Markup, usize) {
        let base = level(items[0]);
        let kind = items[0].list_item.as_ref();
        let container = match kind {
            Some(ListKind::Number) => "ol",
            _ => "ul",
        };

        let mut lis = String::new();
        let mut i = 0;
        while i < items.len() {
            let item = items[i];
            if level(item) < base || item.list_item.as_ref() != kind {
                break;
            }
            i += 1;

            let mut children = self.spans(item).into_string();
            while i < items.len() && level(items[i]) > base {
                let (nested, used) = self.list(&items[i..]);
                children.push_str(&nested.into_string());
                i += used;
            }
            let li = self
                .serializers
                .render(Props::new("li", maud::PreEscaped(children)));
            lis.push_str(&li.into_string());
        }

        let markup = self
            .serializers
            .render(Props::new(container, maud::PreEscaped(lis)));
        (markup, i)
    }

    fn node(&self, node: &BodyNode) -> Markup {
        match node {
            BodyNode::Block(block) => self
                .serializers
                .render(Props::new(&block.style, self.spans(block))),
            BodyNode::Image { image, .. } => {
                let mut props = Props::new("image", html! {});
                props.image_url = self.images.url(image).ok();
                props.alt = image.alt.as_deref();
                self.serializers.render(props)
            }
            BodyNode::Other { kind, .. } => self.serializers.render(Props::new(kind, html! {})),
        }
    }

    fn spans(&self, block: &TextBlock) -> Markup {
        html! {
            @for span in &block.children {
                (self.span(block, span))
            }
        }
    }

    fn span(&self, block: &TextBlock, span: &Span) -> Markup {
        let mut markup = html! { (span.text) };
        for mark in &span.marks {
            markup = if DECORATORS.contains(&mark.as_str()) {
                self.serializers.render(Props::new(mark, markup))
            } else if let Some(def) = block.mark_def(mark) {
                let mut props = Props::new(&def.kind, markup);
                props.href = def.href.as_deref();
                self.serializers.render(props)
            } else {
                self.serializers.render(Props::new(mark, markup))
            };
        }
        markup
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain::portable_text::Document;
    use serde_json::json;

    fn doc(v: serde_json::Value) -> Document {
        serde_json::from_value(v).unwrap()
    }

    fn render(serializers: &Serializers, d: &Document) -> String {
        let images = ImageUrlBuilder::new("proj", "production");
        PortableText::new(serializers, &images).render(d).into_string()
    }

    fn block(style: &str, text: &str) -> serde_json::Value {
        json!({ "_type": "block", "style": style, "children": [{ "_type": "span", "text": text }] })
    }

    #[test]
    fn headings_use_site_serializers() {
        let d = doc(json!([block("h1", "Title"), block("normal", "Body")]));
        let html = render(&Serializers::site(), &d);
        assert_eq!(
            html,
            r#"<h1 class="text-2xl font-bold my-5">Title</h1><p>Body</p>"#
        );
    }

    #[test]
    fn consecutive_list_items_are_grouped() {
        let d = doc(json!([
            { "_type": "block", "listItem": "bullet", "children": [{ "text": "a" }] },
            { "_type": "block", "listItem": "bullet", "children": [{ "text": "b" }] },
            { "_type": "block", "listItem": "number", "children": [{ "text": "c" }] },
            block("normal", "after")
        ]));
        let html = render(&Serializers::standard(), &d);
        assert_eq!(
            html,
            "<ul><li>a</li><li>b</li></ul><ol><li>c</li></ol><p>after</p>"
        );
    }

    #[test]
    fn link_annotation_resolves_mark_def() {
        let d = doc(json!([{
            "_type": "block",
            "style": "normal",
            "markDefs": [{ "_key": "k1", "_type": "link", "href": "https://example.com" }],
            "children": [
                { "text": "see " },
                { "text": "here", "marks": ["strong", "k1"] }
            ]
        }]));
        let html = render(&Serializers::site(), &d);
        assert_eq!(
            html,
            r#"<p>see <a href="https://example.com" class="text-blue-500 hover:underline"><strong>here</strong></a></p>"#
        );
    }

    #[test]
    fn unknown_types_fall_back_without_error() {
        let d = doc(json!([
            { "_type": "youtube", "url": "https://example.com/v" },
            block("mystery", "kept text")
        ]));
        let html = render(&Serializers::standard(), &d);
        assert_eq!(html, "kept text");
    }

    #[test]
    fn custom_fallback_is_used_for_missing_tags() {
        let serializers =
            Serializers::empty().with_fallback(|p| html! { div data-tag=(p.tag) { (p.children) } });
        let d = doc(json!([block("h1", "x")]));
        assert_eq!(render(&serializers, &d), r#"<div data-tag="h1">x</div>"#);
    }

    #[test]
    fn image_block_uses_cdn_url() {
        let d = doc(json!([
            { "_type": "image", "asset": { "_ref": "image-abc-10x20-png" }, "alt": "pic" },
            { "_type": "image", "asset": { "_ref": "broken" } }
        ]));
        let html = render(&Serializers::standard(), &d);
        assert_eq!(
            html,
            r#"<img src="https://cdn.sanity.io/images/proj/production/abc-10x20.png" alt="pic">"#
        );
    }

    #[test]
    fn span_text_is_escaped() {
        let d = doc(json!([block("normal", "<script>")]));
        assert_eq!(render(&Serializers::standard(), &d), "<p>&lt;script&gt;</p>");
    }

    #[test]
    fn deeper_list_items_nest_inside_previous_item() {
        let item = |kind: &str, level: u32, text: &str| {
            json!({ "_type": "block", "listItem": kind, "level": level, "children": [{ "text": text }] })
        };
        let d = doc(json!([
            item("bullet", 1, "a"),
            item("number", 2, "a1"),
            item("number", 2, "a2"),
            item("bullet", 3, "deep"),
            item("bullet", 1, "b"),
            block("normal", "after")
        ]));
        let html = render(&Serializers::standard(), &d);
        assert_eq!(
            html,
            "<ul><li>a<ol><li>a1</li><li>a2<ul><li>deep</li></ul></li></ol></li><li>b</li></ul><p>after</p>"
        );
    }
}
