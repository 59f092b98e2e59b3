// /////////////////////////////////////////////////////////////////////////////
// Mediadesk
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! A small, total sum type over a parsed XML tree, built by a single
//! streaming pass of `quick_xml::Reader`. Unlike an ad-hoc dictionary
//! built up incrementally, the tree is built once and then only ever
//! queried by borrowed `&str` name lookups.

use quick_xml::events::Event;
use quick_xml::reader::Reader;
use std::collections::HashMap;

use mediadesk_domain::MediadeskError;

/// One node of a parsed XML document.
#[derive(Debug, Clone)]
pub enum XmlNode {
    Text(String),
    Element {
        name: String,
        attrs: HashMap<String, String>,
        children: Vec<XmlNode>,
        /// The concatenation of this element's direct text children,
        /// trimmed.
        text: String,
    },
}

impl XmlNode {
    /// Parses a full XML document into a single root node.
    pub fn parse(bytes: &[u8]) -> Result<Self, MediadeskError> {
        let mut reader = Reader::from_reader(bytes);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<(String, HashMap<String, String>, Vec<XmlNode>, String)> = Vec::new();
        let mut root: Option<XmlNode> = None;
        let mut buf = Vec::new();

        loop {
            match reader.read_event_into(&mut buf) {
                Ok(Event::Start(ref tag)) => {
                    let name = decode_name(tag.name().as_ref());
                    let attrs = decode_attrs(tag);
                    stack.push((name, attrs, Vec::new(), String::new()));
                }
                Ok(Event::Empty(ref tag)) => {
                    let name = decode_name(tag.name().as_ref());
                    let attrs = decode_attrs(tag);
                    let node = XmlNode::Element {
                        name,
                        attrs,
                        children: Vec::new(),
                        text: String::new(),
                    };
                    push_node(&mut stack, &mut root, node);
                }
                Ok(Event::End(_)) => {
                    if let Some((name, attrs, children, text)) = stack.pop() {
                        let node = XmlNode::Element {
                            name,
                            attrs,
                            children,
                            text: text.trim().to_string(),
                        };
                        push_node(&mut stack, &mut root, node);
                    }
                }
                Ok(Event::Text(ref text)) => {
                    append_text(&mut stack, std::str::from_utf8(text).unwrap_or_default());
                }
                Ok(Event::CData(ref text)) => {
                    append_text(&mut stack, std::str::from_utf8(text).unwrap_or_default());
                }
                Ok(Event::Eof) => break,
                Ok(_) => {}
                Err(err) => {
                    return Err(MediadeskError::MalformedXml(format!(
                        "XML parse error at position {}: {err}",
                        reader.buffer_position()
                    )))
                }
            }
            buf.clear();
        }

        root.ok_or_else(|| MediadeskError::MalformedXml("empty document".to_string()))
    }

    /// This node's element name, or `""` for a text node.
    pub fn name(&self) -> &str {
        match self {
            XmlNode::Element { name, .. } => name,
            XmlNode::Text(_) => "",
        }
    }

    /// The first direct child element with the given name.
    pub fn child(&self, name: &str) -> Option<&XmlNode> {
        match self {
            XmlNode::Element { children, .. } => {
                children.iter().find(|child| child.name() == name)
            }
            XmlNode::Text(_) => None,
        }
    }

    /// All direct child elements with the given name.
    pub fn children(&self, name: &str) -> Vec<&XmlNode> {
        match self {
            XmlNode::Element { children, .. } => {
                children.iter().filter(|child| child.name() == name).collect()
            }
            XmlNode::Text(_) => Vec::new(),
        }
    }

    /// All direct child elements, regardless of name.
    pub fn all_children(&self) -> &[XmlNode] {
        match self {
            XmlNode::Element { children, .. } => children,
            XmlNode::Text(_) => &[],
        }
    }

    /// An attribute on this element.
    pub fn attr(&self, name: &str) -> Option<&str> {
        match self {
            XmlNode::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            XmlNode::Text(_) => None,
        }
    }

    /// Recursively finds the first descendant (depth-first, including
    /// self) satisfying `predicate`.
    pub fn find<'a>(&'a self, predicate: &impl Fn(&XmlNode) -> bool) -> Option<&'a XmlNode> {
        if predicate(self) {
            return Some(self);
        }
        for child in self.all_children() {
            if let Some(found) = child.find(predicate) {
                return Some(found);
            }
        }
        None
    }

    /// The CDATA-extraction rule: trimmed text content, or the trimmed
    /// `Value` attribute, or the empty string. Total: never panics on an
    /// unexpected shape.
    pub fn cdata(&self) -> String {
        match self {
            XmlNode::Text(text) => text.trim().to_string(),
            XmlNode::Element { text, attrs, .. } => {
                if !text.is_empty() {
                    text.clone()
                } else if let Some(value) = attrs.get("Value") {
                    value.trim().to_string()
                } else {
                    String::new()
                }
            }
        }
    }

    /// Looks up a named `Property` child's CDATA value within an element
    /// whose children are `<Property FormalName="X">value</Property>`
    /// entries.
    pub fn property(&self, formal_name: &str) -> Option<String> {
        self.children("Property")
            .into_iter()
            .find(|prop| prop.attr("FormalName") == Some(formal_name))
            .map(|prop| prop.cdata())
    }
}

fn append_text(
    stack: &mut [(String, HashMap<String, String>, Vec<XmlNode>, String)],
    decoded: &str,
) {
    if decoded.trim().is_empty() {
        return;
    }
    if let Some((_, _, _, accumulated)) = stack.last_mut() {
        if !accumulated.is_empty() {
            accumulated.push(' ');
        }
        accumulated.push_str(decoded.trim());
    }
}

fn decode_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

fn decode_attrs(tag: &quick_xml::events::BytesStart) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    for attr in tag.attributes().flatten() {
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = std::str::from_utf8(&attr.value).unwrap_or_default().to_string();
        attrs.insert(key, value);
    }
    attrs
}

fn push_node(
    stack: &mut [(String, HashMap<String, String>, Vec<XmlNode>, String)],
    root: &mut Option<XmlNode>,
    node: XmlNode,
) {
    if let Some((_, _, children, _)) = stack.last_mut() {
        children.push(node);
    } else {
        *root = Some(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"<Root>
        <Item FormalName="A">hello</Item>
        <Item FormalName="B"><Value>nested</Value></Item>
        <Empty/>
    </Root>"#;

    #[test]
    fn parses_nested_elements_and_attributes() {
        let root = XmlNode::parse(SAMPLE.as_bytes()).unwrap();
        assert_eq!(root.name(), "Root");
        let items = root.children("Item");
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].attr("FormalName"), Some("A"));
        assert_eq!(items[0].cdata(), "hello");
    }

    #[test]
    fn cdata_falls_back_to_value_attribute() {
        let xml = r#"<Prop Value="x"/>"#;
        let node = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(node.cdata(), "x");
    }

    #[test]
    fn cdata_is_empty_string_when_nothing_present() {
        let xml = r#"<Empty/>"#;
        let node = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(node.cdata(), "");
    }

    #[test]
    fn find_recurses_depth_first() {
        let xml = r#"<A><B><C FormalName="target"/></B></A>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        let found = root.find(&|node| node.attr("FormalName") == Some("target"));
        assert!(found.is_some());
        assert_eq!(found.unwrap().name(), "C");
    }

    #[test]
    fn property_lookup_by_formal_name() {
        let xml = r#"<Meta><Property FormalName="Edition">Morning</Property></Meta>"#;
        let root = XmlNode::parse(xml.as_bytes()).unwrap();
        assert_eq!(root.property("Edition"), Some("Morning".to_string()));
        assert_eq!(root.property("Missing"), None);
    }
}
