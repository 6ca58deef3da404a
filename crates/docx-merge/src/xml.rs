//! Owned, editable XML tree
//!
//! Built from a `roxmltree` parse. Element start tags are kept as the raw
//! source slice, so attributes, namespace declarations and entity spelling
//! survive a round trip untouched. Only text content is re-escaped on output.

use crate::error::MergeError;

/// WordprocessingML main namespace
pub const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// WordprocessingML namespace of Strict Open XML documents
pub const W_STRICT_NS: &str = "http://purl.oclc.org/ooxml/wordprocessingml/main";

#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Element(Element),
    Text(String),
    /// Comment or processing instruction, verbatim
    Raw(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    /// Start tag without its closing `>` or `/>`
    start: String,
    name: String,
    local: String,
    namespace: Option<String>,
    attributes: Vec<(String, String)>,
    pub children: Vec<Node>,
}

impl Element {
    /// New element in the WordprocessingML namespace using `prefix`
    pub fn wml(prefix: Option<&str>, local: &str) -> Self {
        Self::wml_with_attrs(prefix, local, &[])
    }

    /// New WordprocessingML element with attributes given by local name
    pub fn wml_with_attrs(prefix: Option<&str>, local: &str, attrs: &[(&str, &str)]) -> Self {
        let qualify = |n: &str| match prefix {
            Some(p) => format!("{}:{}", p, n),
            None => n.to_string(),
        };
        let name = qualify(local);

        let mut start = format!("<{}", name);
        for (key, value) in attrs {
            // xml:space lives in the xml namespace, never the WML prefix
            let attr_name = if key.starts_with("xml:") {
                key.to_string()
            } else {
                qualify(*key)
            };
            start.push_str(&format!(" {}=\"{}\"", attr_name, escape_attr(value)));
        }

        Self {
            start,
            name,
            local: local.to_string(),
            namespace: Some(W_NS.to_string()),
            attributes: attrs
                .iter()
                .map(|(k, v)| {
                    let key = k.strip_prefix("xml:").unwrap_or(*k);
                    (key.to_string(), v.to_string())
                })
                .collect(),
            children: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        &self.local
    }

    /// Namespace prefix of the qualified name, if any
    pub fn prefix(&self) -> Option<&str> {
        self.name.split_once(':').map(|(p, _)| p)
    }

    /// True for a WordprocessingML element with the given local name
    pub fn is(&self, local: &str) -> bool {
        self.local == local && matches!(self.namespace.as_deref(), Some(W_NS | W_STRICT_NS))
    }

    /// Attribute value by local name
    pub fn attr(&self, local: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == local)
            .map(|(_, v)| v.as_str())
    }

    pub fn child(&self, local: &str) -> Option<&Element> {
        self.child_elements().find(|e| e.is(local))
    }

    pub fn child_elements(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|n| match n {
            Node::Element(e) => Some(e),
            _ => None,
        })
    }

    pub fn child_index(&self, local: &str) -> Option<usize> {
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if e.is(local)))
    }

    /// Element child at `index`, if that child is an element
    pub fn element_at_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Follow a path of child indices
    pub fn descend(&self, path: &[usize]) -> Option<&Element> {
        let mut current = self;
        for &index in path {
            current = match current.children.get(index) {
                Some(Node::Element(e)) => e,
                _ => return None,
            };
        }
        Some(current)
    }

    pub fn descend_mut(&mut self, path: &[usize]) -> Option<&mut Element> {
        let mut current = self;
        for &index in path {
            current = current.element_at_mut(index)?;
        }
        Some(current)
    }

    /// Concatenated text of all descendant text nodes
    pub fn text(&self) -> String {
        let mut out = String::new();
        for child in &self.children {
            match child {
                Node::Text(t) => out.push_str(t),
                Node::Element(e) => out.push_str(&e.text()),
                Node::Raw(_) => {}
            }
        }
        out
    }

    pub fn write_to(&self, out: &mut String) {
        out.push_str(&self.start);
        if self.children.is_empty() {
            out.push_str("/>");
            return;
        }

        out.push('>');
        for child in &self.children {
            match child {
                Node::Element(e) => e.write_to(out),
                Node::Text(t) => out.push_str(&escape_text(t)),
                Node::Raw(r) => out.push_str(r),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

/// A parsed XML part: the root element plus verbatim prolog and epilog
#[derive(Debug, Clone)]
pub struct XmlDocument {
    prolog: String,
    pub root: Element,
    epilog: String,
}

impl XmlDocument {
    pub fn parse(text: &str) -> Result<Self, MergeError> {
        let doc = roxmltree::Document::parse(text).map_err(|e| MergeError::malformed("invalid XML", e))?;
        let root = doc.root_element();
        let range = root.range();

        Ok(Self {
            prolog: text[..range.start].to_string(),
            root: build_element(root, text),
            epilog: text[range.end..].to_string(),
        })
    }

    pub fn to_xml(&self) -> String {
        let mut out = String::with_capacity(self.prolog.len() + self.epilog.len() + 4096);
        out.push_str(&self.prolog);
        self.root.write_to(&mut out);
        out.push_str(&self.epilog);
        out
    }
}

fn build_element(node: roxmltree::Node, source: &str) -> Element {
    let raw = &source[node.range()];
    let start = start_tag(raw);
    let name = start[1..]
        .split(|c: char| c.is_whitespace() || c == '/')
        .next()
        .unwrap_or_default()
        .to_string();

    let children = node
        .children()
        .filter_map(|child| {
            if child.is_element() {
                Some(Node::Element(build_element(child, source)))
            } else if child.is_text() {
                child.text().map(|t| Node::Text(t.to_string()))
            } else if child.is_comment() || child.is_pi() {
                Some(Node::Raw(source[child.range()].to_string()))
            } else {
                None
            }
        })
        .collect();

    Element {
        start: start.to_string(),
        name,
        local: node.tag_name().name().to_string(),
        namespace: node.tag_name().namespace().map(str::to_string),
        attributes: node
            .attributes()
            .map(|a| (a.name().to_string(), a.value().to_string()))
            .collect(),
        children,
    }
}

/// Start tag of a raw element slice, without `>` or `/>`
fn start_tag(raw: &str) -> &str {
    let mut quote: Option<u8> = None;
    for (i, b) in raw.bytes().enumerate() {
        match (quote, b) {
            (Some(q), _) if b == q => quote = None,
            (Some(_), _) => {}
            (None, b'"') | (None, b'\'') => quote = Some(b),
            (None, b'>') => {
                let tag = &raw[..i];
                return tag.strip_suffix('/').unwrap_or(tag);
            }
            _ => {}
        }
    }
    raw
}

pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
    out
}

fn escape_attr(value: &str) -> String {
    escape_text(value).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const SAMPLE: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body><!-- c --><w:p><w:r><w:t xml:space="preserve">A &amp; B</w:t><w:br/></w:r></w:p><w:sectPr w:rsidR="00A1"/></w:body></w:document>"#;

    #[test]
    fn test_round_trip_is_lossless_for_plain_content() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.to_xml(), SAMPLE);
    }

    #[test]
    fn test_elements_resolve_namespace() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        let body = doc.root.child("body").unwrap();
        assert!(body.is("body"));
        assert_eq!(body.prefix(), Some("w"));
        assert_eq!(body.child("sectPr").unwrap().attr("rsidR"), Some("00A1"));
    }

    #[test]
    fn test_strict_namespace_is_wordprocessingml() {
        let doc = XmlDocument::parse(
            r#"<w:document xmlns:w="http://purl.oclc.org/ooxml/wordprocessingml/main"><w:body/></w:document>"#,
        )
        .unwrap();
        assert!(doc.root.child("body").is_some());

        let other = XmlDocument::parse(r#"<w:document xmlns:w="urn:other"><w:body/></w:document>"#).unwrap();
        assert!(other.root.child("body").is_none());
    }

    #[test]
    fn test_text_is_unescaped_and_reescaped() {
        let doc = XmlDocument::parse(SAMPLE).unwrap();
        assert_eq!(doc.root.text(), "A & B");
        assert_eq!(escape_text("a<b>&c"), "a&lt;b&gt;&amp;c");
    }

    #[test]
    fn test_self_closing_gains_children() {
        let mut el = Element::wml(Some("w"), "pPr");
        el.children
            .push(Node::Element(Element::wml_with_attrs(Some("w"), "pStyle", &[("val", "ListBullet")])));
        let mut out = String::new();
        el.write_to(&mut out);
        assert_eq!(out, r#"<w:pPr><w:pStyle w:val="ListBullet"/></w:pPr>"#);
    }

    #[test]
    fn test_start_tag_ignores_gt_in_quotes() {
        assert_eq!(start_tag(r#"<a b="x>y">z</a>"#), r#"<a b="x>y""#);
        assert_eq!(start_tag("<w:br />"), "<w:br ");
    }

    #[test]
    fn test_invalid_xml_is_malformed() {
        assert!(matches!(
            XmlDocument::parse("<a><b></a>"),
            Err(MergeError::MalformedDocument(_))
        ));
    }
}
