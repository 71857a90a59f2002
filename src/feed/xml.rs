//! Minimal namespace-aware XML tree for feed documents.
//!
//! Feeds are small, so the whole document is read into an [`Element`] tree
//! and the extractors query it with namespace/local-name pairs. Parsing is
//! strict: anything that is not well-formed XML is reported as
//! [`FeedError::Malformed`].
//!
//! quick-xml (0.37) never parses `<!ENTITY>` declarations, so only the five
//! predefined entities and numeric character references are accepted in text
//! and attribute values. Any other entity reference fails the parse.

use quick_xml::events::{BytesStart, Event};
use quick_xml::name::ResolveResult;
use quick_xml::NsReader;

use super::FeedError;

/// Strips anything before the XML declaration.
///
/// Some CMS exports prepend whitespace, a byte-order mark or stray output
/// before `<?xml`. Documents without a declaration are returned unchanged.
pub fn sanitize(raw: &str) -> &str {
    match raw.find("<?xml") {
        Some(start) if start > 0 => &raw[start..],
        _ => raw,
    }
}

/// A child of an element: nested element or character data.
#[derive(Debug, Clone)]
pub enum Node {
    Element(Element),
    Text(String),
}

/// A parsed XML element.
#[derive(Debug, Clone)]
pub struct Element {
    namespace: Option<String>,
    name: String,
    attributes: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    fn from_start(
        namespace: Option<String>,
        start: &BytesStart<'_>,
    ) -> Result<Self, FeedError> {
        let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();
        let mut attributes = Vec::new();
        for attr in start.attributes() {
            let attr = attr.map_err(malformed)?;
            if attr.key.as_namespace_binding().is_some() {
                continue;
            }
            let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
            let value = attr.unescape_value().map_err(malformed)?.into_owned();
            attributes.push((key, value));
        }
        Ok(Self {
            namespace,
            name,
            attributes,
            children: Vec::new(),
        })
    }

    /// Local name, without prefix.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// True when the element has the given namespace and local name.
    pub fn is(&self, namespace: Option<&str>, name: &str) -> bool {
        self.name == name && self.namespace.as_deref() == namespace
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Direct child elements, in document order.
    pub fn children(&self) -> impl Iterator<Item = &Element> {
        self.children.iter().filter_map(|node| match node {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        })
    }

    /// First direct child with the given name.
    pub fn child(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        self.children().find(|e| e.is(namespace, name))
    }

    /// Text of the first direct child with the given name, or `""` if absent.
    pub fn child_text(&self, namespace: Option<&str>, name: &str) -> String {
        self.child(namespace, name)
            .map(Element::text)
            .unwrap_or_default()
    }

    /// Concatenated character data (text and CDATA) directly inside this
    /// element. Text of nested elements is not included.
    pub fn text(&self) -> String {
        self.children
            .iter()
            .filter_map(|node| match node {
                Node::Text(t) => Some(t.as_str()),
                Node::Element(_) => None,
            })
            .collect()
    }

    /// All descendants (excluding `self`) with the given name, in document order.
    pub fn find_all(&self, namespace: Option<&str>, name: &str) -> Vec<&Element> {
        let mut found = Vec::new();
        self.collect_descendants(namespace, name, &mut found);
        found
    }

    /// First descendant (excluding `self`) with the given name.
    pub fn find(&self, namespace: Option<&str>, name: &str) -> Option<&Element> {
        for child in self.children() {
            if child.is(namespace, name) {
                return Some(child);
            }
            if let Some(found) = child.find(namespace, name) {
                return Some(found);
            }
        }
        None
    }

    fn collect_descendants<'a>(
        &'a self,
        namespace: Option<&str>,
        name: &str,
        out: &mut Vec<&'a Element>,
    ) {
        for child in self.children() {
            if child.is(namespace, name) {
                out.push(child);
            }
            child.collect_descendants(namespace, name, out);
        }
    }
}

/// A parsed feed document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Element,
}

impl Document {
    /// Sanitizes and parses a feed document.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::Malformed`] when the document is empty, has more
    /// than one root element, leaves elements unclosed, closes elements that
    /// were never opened, has text outside the root element, uses an
    /// undeclared namespace prefix or an unknown entity.
    pub fn parse(raw: &str) -> Result<Self, FeedError> {
        let content = sanitize(raw);
        let mut reader = NsReader::from_str(content);

        let mut stack: Vec<Element> = Vec::new();
        let mut root: Option<Element> = None;

        loop {
            let (resolved, event) = reader.read_resolved_event().map_err(malformed)?;
            let namespace = match resolved {
                ResolveResult::Bound(ns) => Some(String::from_utf8_lossy(ns.as_ref()).into_owned()),
                ResolveResult::Unbound => None,
                ResolveResult::Unknown(prefix) => {
                    return Err(FeedError::Malformed(format!(
                        "undeclared namespace prefix '{}'",
                        String::from_utf8_lossy(&prefix)
                    )));
                }
            };

            match event {
                Event::Start(e) => {
                    if stack.is_empty() && root.is_some() {
                        return Err(FeedError::Malformed(
                            "multiple root elements".to_string(),
                        ));
                    }
                    stack.push(Element::from_start(namespace, &e)?);
                }
                Event::Empty(e) => {
                    let element = Element::from_start(namespace, &e)?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::End(_) => {
                    let element = stack.pop().ok_or_else(|| {
                        FeedError::Malformed("closing tag without opening tag".to_string())
                    })?;
                    attach(&mut stack, &mut root, element)?;
                }
                Event::Text(e) => {
                    let text = e.unescape().map_err(malformed)?;
                    push_text(&mut stack, &text)?;
                }
                Event::CData(e) => {
                    let text = std::str::from_utf8(&e)
                        .map_err(|err| FeedError::Malformed(format!("CDATA is not UTF-8: {err}")))?;
                    push_text(&mut stack, text)?;
                }
                Event::Eof => break,
                // Declaration, comments, processing instructions, DOCTYPE
                _ => {}
            }
        }

        if let Some(open) = stack.last() {
            return Err(FeedError::Malformed(format!(
                "unclosed element <{}>",
                open.name
            )));
        }

        root.map(|root| Self { root })
            .ok_or_else(|| FeedError::Malformed("document has no root element".to_string()))
    }

    pub fn root(&self) -> &Element {
        &self.root
    }
}

fn attach(
    stack: &mut [Element],
    root: &mut Option<Element>,
    element: Element,
) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => {
            parent.children.push(Node::Element(element));
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(element);
            Ok(())
        }
        None => Err(FeedError::Malformed("multiple root elements".to_string())),
    }
}

fn push_text(stack: &mut [Element], text: &str) -> Result<(), FeedError> {
    match stack.last_mut() {
        Some(parent) => {
            // Adjacent text/CDATA runs merge into one node
            if let Some(Node::Text(prev)) = parent.children.last_mut() {
                prev.push_str(text);
            } else {
                parent.children.push(Node::Text(text.to_string()));
            }
            Ok(())
        }
        None if is_blank(text) => Ok(()),
        None => Err(FeedError::Malformed(
            "text outside the root element".to_string(),
        )),
    }
}

fn is_blank(text: &str) -> bool {
    text.chars().all(|c| c.is_whitespace() || c == '\u{feff}')
}

fn malformed(err: impl std::fmt::Display) -> FeedError {
    FeedError::Malformed(err.to_string())
}
