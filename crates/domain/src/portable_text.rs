//! Portable text document model.
//!
//! A body is a flat list of nodes. Text blocks carry a `style` (`normal`,
//! `h1`, ...) and optionally a `listItem` kind; everything else is kept as raw
//! JSON so renderers can decide what to do with it.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::models::{null_as_default, ImageRef};

pub type Document = Vec<BodyNode>;

#[derive(Debug, Clone, PartialEq)]
pub enum BodyNode {
    Block(TextBlock),
    Image {
        key: Option<String>,
        image: ImageRef,
    },
    Other {
        kind: String,
        raw: Value,
    },
}

impl BodyNode {
    /// The `_type` this node was stored under.
    pub fn kind(&self) -> &str {
        match self {
            BodyNode::Block(_) => "block",
            BodyNode::Image { .. } => "image",
            BodyNode::Other { kind, .. } => kind,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBlock {
    #[serde(rename = "_key", default, skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,
    #[serde(default = "default_style", deserialize_with = "style_or_default")]
    pub style: String,
    #[serde(rename = "listItem", default, skip_serializing_if = "Option::is_none")]
    pub list_item: Option<ListKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub level: Option<u32>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub children: Vec<Span>,
    #[serde(rename = "markDefs", default, deserialize_with = "null_as_default")]
    pub mark_defs: Vec<MarkDef>,
}

impl TextBlock {
    pub fn plain_text(&self) -> String {
        self.children.iter().map(|s| s.text.as_str()).collect()
    }

    pub fn mark_def(&self, key: &str) -> Option<&MarkDef> {
        self.mark_defs.iter().find(|d| d.key == key)
    }
}

fn default_style() -> String {
    "normal".to_string()
}

fn style_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_style))
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ListKind {
    Bullet,
    Number,
    Other(String),
}

impl From<String> for ListKind {
    fn from(s: String) -> Self {
        match s.as_str() {
            "bullet" => ListKind::Bullet,
            "number" => ListKind::Number,
            _ => ListKind::Other(s),
        }
    }
}

impl From<ListKind> for String {
    fn from(kind: ListKind) -> Self {
        match kind {
            ListKind::Bullet => "bullet".to_string(),
            ListKind::Number => "number".to_string(),
            ListKind::Other(s) => s,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Span {
    #[serde(default, deserialize_with = "null_as_default")]
    pub text: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub marks: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarkDef {
    #[serde(rename = "_key")]
    pub key: String,
    #[serde(rename = "_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
}

impl<'de> Deserialize<'de> for BodyNode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let kind = raw
            .get("_type")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        // 结构不对的节点降级为 Other，不影响整篇文章
        let typed = if kind == "block" {
            TextBlock::deserialize(&raw).map(BodyNode::Block).ok()
        } else if kind == "image" {
            let key = raw.get("_key").and_then(Value::as_str).map(str::to_string);
            ImageRef::deserialize(&raw)
                .map(|image| BodyNode::Image { key, image })
                .ok()
        } else {
            None
        };
        Ok(typed.unwrap_or(BodyNode::Other { kind, raw }))
    }
}

impl Serialize for BodyNode {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let value = match self {
            BodyNode::Block(block) => {
                let mut v = serde_json::to_value(block).map_err(serde::ser::Error::custom)?;
                v["_type"] = Value::from("block");
                v
            }
            BodyNode::Image { key, image } => {
                let mut v = serde_json::to_value(image).map_err(serde::ser::Error::custom)?;
                v["_type"] = Value::from("image");
                if let Some(key) = key {
                    v["_key"] = Value::from(key.as_str());
                }
                v
            }
            BodyNode::Other { raw, .. } => raw.clone(),
        };
        value.serialize(serializer)
    }
}
