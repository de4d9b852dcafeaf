//! Minimal element tree over quick-xml events
//!
//! SOAP responses are small, so the whole envelope is read into memory and
//! walked by local name. Namespace prefixes are dropped.

use crate::error::{common, Result};
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct XmlNode {
    pub name: String,
    pub attributes: Vec<(String, String)>,
    pub children: Vec<XmlNode>,
    pub text: String,
}

impl XmlNode {
    fn from_start(start: &BytesStart<'_>) -> Result<Self> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(quick_xml::Error::from)?;
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value()?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            name,
            attributes,
            ..Self::default()
        })
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        self.children.iter().find(|c| c.name == name)
    }

    pub fn children_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a XmlNode> {
        self.children.iter().filter(move |c| c.name == name)
    }

    /// First descendant (or self) with the given local name, depth first
    pub fn find(&self, name: &str) -> Option<&XmlNode> {
        if self.name == name {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(name))
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// `xsi:nil="true"` or `xsi:nil="1"`
    pub fn is_nil(&self) -> bool {
        matches!(self.attr("nil").map(str::trim), Some("true" | "1"))
    }

    /// Value carried either as an attribute or as a child element's text
    pub fn value_of(&self, name: &str) -> Option<String> {
        self.attr(name)
            .map(str::to_string)
            .or_else(|| {
                self.child(name)
                    .filter(|c| !c.is_nil())
                    .map(|c| c.text().to_string())
            })
            .filter(|v| !v.is_empty())
    }
}

/// Parse a full document into its root element
pub fn parse_document(input: &str) -> Result<XmlNode> {
    let mut reader = Reader::from_str(input);
    reader.trim_text(true);

    let mut stack: Vec<XmlNode> = Vec::new();
    let mut root: Option<XmlNode> = None;

    loop {
        match reader.read_event()? {
            Event::Start(start) => stack.push(XmlNode::from_start(&start)?),
            Event::Empty(start) => {
                let node = XmlNode::from_start(&start)?;
                attach(&mut stack, &mut root, node);
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| common::malformed_response("parse", "unbalanced end tag"))?;
                attach(&mut stack, &mut root, node);
            }
            Event::Text(text) => {
                if let Some(current) = stack.last_mut() {
                    current.text.push_str(&text.unescape()?);
                }
            }
            Event::CData(data) => {
                if let Some(current) = stack.last_mut() {
                    current
                        .text
                        .push_str(&String::from_utf8_lossy(&data.into_inner()));
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(common::malformed_response("parse", "unclosed element"));
    }
    root.ok_or_else(|| common::malformed_response("parse", "empty document"))
}

fn attach(stack: &mut [XmlNode], root: &mut Option<XmlNode>, node: XmlNode) {
    match stack.last_mut() {
        Some(parent) => parent.children.push(node),
        None => {
            if root.is_none() {
                *root = Some(node);
            }
        }
    }
}

/// Escape text for element content and attribute values
pub fn escape(value: &str) -> String {
    quick_xml::escape::escape(value).into_owned()
}
