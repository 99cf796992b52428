//! Immutable element tree built from a DMR++ document.
//!
//! The document is read once with `quick-xml`'s namespace-aware reader and
//! converted into owned [`Element`]s. Every later stage only borrows from
//! this tree; nothing in the pipeline mutates it.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::reader::NsReader;

use crate::error::{DmrppError, DmrppResult};

/// DAP4 namespace for structural elements.
pub const DAP_NAMESPACE: &str = "http://xml.opendap.org/ns/DAP/4.0#";

/// DMR++ extension namespace for chunk and compression elements.
pub const DMRPP_NAMESPACE: &str = "http://xml.opendap.org/dap/dmrpp/1.0.0#";

/// Namespace an element was resolved into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum XmlNamespace {
    Dap,
    Dmrpp,
    Other,
}

impl XmlNamespace {
    fn resolve(result: &ResolveResult<'_>) -> Self {
        match result {
            ResolveResult::Bound(ns) if ns.0 == DAP_NAMESPACE.as_bytes() => Self::Dap,
            ResolveResult::Bound(ns) if ns.0 == DMRPP_NAMESPACE.as_bytes() => Self::Dmrpp,
            // Hand-written DMR documents frequently omit the default namespace.
            ResolveResult::Unbound => Self::Dap,
            _ => Self::Other,
        }
    }
}

/// One XML element with its attributes, children and text content.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Element {
    pub ns: XmlNamespace,
    pub name: String,
    attrs: Vec<(String, String)>,
    pub children: Vec<Element>,
    text: String,
}

impl Element {
    fn from_start(ns: XmlNamespace, start: &BytesStart<'_>) -> DmrppResult<Self> {
        let name = utf8(start.local_name().as_ref())?.to_string();
        let mut attrs = Vec::new();
        for attr in start.attributes() {
            let attr = attr?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = utf8(attr.key.local_name().as_ref())?.to_string();
            let value = attr.unescape_value()?.into_owned();
            attrs.push((key, value));
        }
        Ok(Self {
            ns,
            name,
            attrs,
            children: Vec::new(),
            text: String::new(),
        })
    }

    /// Value of an XML attribute, by local name.
    pub fn attr(&self, key: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Value of an XML attribute that must be present.
    pub fn require_attr(&self, key: &str) -> DmrppResult<&str> {
        self.attr(key)
            .ok_or_else(|| DmrppError::missing_attribute(&self.name, key))
    }

    /// Text content, `None` when the element holds no text.
    pub fn text(&self) -> Option<&str> {
        if self.text.is_empty() {
            None
        } else {
            Some(&self.text)
        }
    }

    pub fn is(&self, ns: XmlNamespace, name: &str) -> bool {
        self.ns == ns && self.name == name
    }

    /// Direct children with the given namespace and local name.
    pub fn children_named<'a>(
        &'a self,
        ns: XmlNamespace,
        name: &'a str,
    ) -> impl Iterator<Item = &'a Element> + 'a {
        self.children.iter().filter(move |c| c.is(ns, name))
    }

    /// First direct child with the given namespace and local name.
    pub fn child(&self, ns: XmlNamespace, name: &str) -> Option<&Element> {
        self.children.iter().find(|c| c.is(ns, name))
    }

    /// All descendants in document (pre-)order, excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Direct `<Attribute name="...">` child.
    pub fn dap_attribute(&self, name: &str) -> Option<&Element> {
        self.children_named(XmlNamespace::Dap, "Attribute")
            .find(|a| a.attr("name") == Some(name))
    }

    /// Text of the first `<Value>` of the direct `<Attribute name="...">` child.
    pub fn dap_attribute_text(&self, name: &str) -> Option<&str> {
        self.dap_attribute(name)?
            .child(XmlNamespace::Dap, "Value")?
            .text()
    }
}

/// Pre-order iterator over an element's descendants.
pub(crate) struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let next = self.stack.pop()?;
        self.stack.extend(next.children.iter().rev());
        Some(next)
    }
}

/// Parse a complete XML document into its root element.
pub(crate) fn parse_document(xml: &str) -> DmrppResult<Element> {
    let mut reader = NsReader::from_str(xml);
    reader.trim_text(true);

    let mut stack: Vec<Element> = Vec::new();
    let mut root: Option<Element> = None;

    loop {
        let (resolved, event) = reader.read_resolved_event()?;
        let ns = XmlNamespace::resolve(&resolved);
        match event {
            Event::Start(e) => {
                stack.push(Element::from_start(ns, &e)?);
            }
            Event::Empty(e) => {
                let element = Element::from_start(ns, &e)?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::End(_) => {
                let element = stack
                    .pop()
                    .ok_or_else(|| DmrppError::Xml("unbalanced end tag".to_string()))?;
                attach(&mut stack, &mut root, element)?;
            }
            Event::Text(t) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(&t.unescape()?);
                }
            }
            Event::CData(c) => {
                if let Some(top) = stack.last_mut() {
                    top.text.push_str(utf8(&c)?);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(DmrppError::Xml(format!(
            "unexpected end of document inside <{}>",
            stack.last().map(|e| e.name.as_str()).unwrap_or_default()
        )));
    }
    root.ok_or_else(|| DmrppError::Xml("document has no root element".to_string()))
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> DmrppResult<()> {
    match stack.last_mut() {
        Some(parent) => parent.children.push(element),
        None if root.is_none() => *root = Some(element),
        None => {
            return Err(DmrppError::Xml(format!(
                "second root element <{}>",
                element.name
            )))
        }
    }
    Ok(())
}

fn utf8(bytes: &[u8]) -> DmrppResult<&str> {
    std::str::from_utf8(bytes).map_err(|e| DmrppError::Xml(e.to_string()))
}
