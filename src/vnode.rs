//! Rendered-output model: a plain node tree produced by component render
//! functions and queried through the mount wrapper. Widget nodes are symbolic
//! component references; the orchestrator resolves them against the merged
//! stub registry after the suspense gate settles.
use std::collections::BTreeMap;

use crate::component::Props;

#[derive(Clone, Debug, PartialEq)]
pub enum VNode {
    Element {
        tag: String,
        attrs: BTreeMap<String, String>,
        children: Vec<VNode>,
    },
    Text(String),
    Fragment(Vec<VNode>),
    /// A by-name reference to a registered component (stub or app-level).
    Widget {
        name: String,
        props: Props,
        children: Vec<VNode>,
    },
}

impl VNode {
    pub fn element(tag: impl Into<String>) -> Self {
        VNode::Element {
            tag: tag.into(),
            attrs: BTreeMap::new(),
            children: Vec::new(),
        }
    }

    pub fn text(content: impl Into<String>) -> Self {
        VNode::Text(content.into())
    }

    pub fn fragment(children: Vec<VNode>) -> Self {
        VNode::Fragment(children)
    }

    pub fn widget(name: impl Into<String>) -> Self {
        VNode::Widget {
            name: name.into(),
            props: Props::new(),
            children: Vec::new(),
        }
    }

    pub fn empty() -> Self {
        VNode::Fragment(Vec::new())
    }

    /// Element attribute (stringly). On widget nodes the value lands in props.
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        match &mut self {
            VNode::Element { attrs, .. } => {
                attrs.insert(name.into(), value.into());
            }
            VNode::Widget { props, .. } => {
                props.insert(name.into(), serde_json::Value::String(value.into()));
            }
            _ => {}
        }
        self
    }

    /// Widget prop (typed JSON value). On element nodes the value is
    /// stringified into an attribute.
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        match &mut self {
            VNode::Widget { props, .. } => {
                props.insert(name.into(), value.into());
            }
            VNode::Element { attrs, .. } => {
                attrs.insert(name.into(), json_to_attr(&value.into()));
            }
            _ => {}
        }
        self
    }

    pub fn child(mut self, node: VNode) -> Self {
        match &mut self {
            VNode::Element { children, .. }
            | VNode::Fragment(children)
            | VNode::Widget { children, .. } => children.push(node),
            VNode::Text(_) => {}
        }
        self
    }

    pub fn children(mut self, nodes: impl IntoIterator<Item = VNode>) -> Self {
        for node in nodes {
            self = self.child(node);
        }
        self
    }

    pub fn tag(&self) -> Option<&str> {
        match self {
            VNode::Element { tag, .. } => Some(tag),
            _ => None,
        }
    }

    pub fn get_attr(&self, name: &str) -> Option<&str> {
        match self {
            VNode::Element { attrs, .. } => attrs.get(name).map(String::as_str),
            _ => None,
        }
    }

    /// Depth-first search for the first element with the given tag.
    pub fn find(&self, tag: &str) -> Option<&VNode> {
        match self {
            VNode::Element { tag: t, children, .. } => {
                if t == tag {
                    return Some(self);
                }
                children.iter().find_map(|c| c.find(tag))
            }
            VNode::Fragment(children) | VNode::Widget { children, .. } => {
                children.iter().find_map(|c| c.find(tag))
            }
            VNode::Text(_) => None,
        }
    }

    pub fn find_all<'a>(&'a self, tag: &str) -> Vec<&'a VNode> {
        let mut out = Vec::new();
        self.collect_tagged(tag, &mut out);
        out
    }

    fn collect_tagged<'a>(&'a self, tag: &str, out: &mut Vec<&'a VNode>) {
        match self {
            VNode::Element { tag: t, children, .. } => {
                if t == tag {
                    out.push(self);
                }
                for c in children {
                    c.collect_tagged(tag, out);
                }
            }
            VNode::Fragment(children) | VNode::Widget { children, .. } => {
                for c in children {
                    c.collect_tagged(tag, out);
                }
            }
            VNode::Text(_) => {}
        }
    }

    /// Concatenated text content of the subtree.
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            VNode::Text(s) => out.push_str(s),
            VNode::Element { children, .. }
            | VNode::Fragment(children)
            | VNode::Widget { children, .. } => {
                for c in children {
                    c.push_text(out);
                }
            }
        }
    }

    /// Markup serialization of the subtree. Fragments are transparent.
    pub fn html(&self) -> String {
        let mut out = String::new();
        self.push_html(&mut out);
        out
    }

    fn push_html(&self, out: &mut String) {
        match self {
            VNode::Text(s) => out.push_str(&escape_text(s)),
            VNode::Fragment(children) => {
                for c in children {
                    c.push_html(out);
                }
            }
            VNode::Element { tag, attrs, children } => {
                out.push('<');
                out.push_str(tag);
                for (k, v) in attrs {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(v));
                    out.push('"');
                }
                out.push('>');
                for c in children {
                    c.push_html(out);
                }
                out.push_str("</");
                out.push_str(tag);
                out.push('>');
            }
            // An unresolved reference serializes like a custom element so the
            // markup stays inspectable instead of silently vanishing.
            VNode::Widget { name, props, children } => {
                out.push('<');
                out.push_str(name);
                for (k, v) in props {
                    out.push(' ');
                    out.push_str(k);
                    out.push_str("=\"");
                    out.push_str(&escape_attr(&json_to_attr(v)));
                    out.push('"');
                }
                out.push('>');
                for c in children {
                    c.push_html(out);
                }
                out.push_str("</");
                out.push_str(name);
                out.push('>');
            }
        }
    }
}

pub(crate) fn json_to_attr(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attr(s: &str) -> String {
    escape_text(s).replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn html_serialization_escapes_and_nests() {
        let node = VNode::element("div")
            .attr("class", "a\"b")
            .child(VNode::text("1 < 2"))
            .child(VNode::element("a").attr("href", "/test").child(VNode::text("go")));
        assert_eq!(
            node.html(),
            "<div class=\"a&quot;b\">1 &lt; 2<a href=\"/test\">go</a></div>"
        );
    }

    #[test]
    fn find_walks_through_fragments() {
        let node = VNode::fragment(vec![
            VNode::text("x"),
            VNode::element("span").child(VNode::element("a").attr("href", "/here")),
        ]);
        assert_eq!(node.find("a").and_then(|n| n.get_attr("href")), Some("/here"));
        assert!(node.find("button").is_none());
    }

    #[test]
    fn text_content_concatenates_in_order() {
        let node = VNode::fragment(vec![
            VNode::text("a"),
            VNode::element("b").child(VNode::text("c")),
        ]);
        assert_eq!(node.text_content(), "ac");
    }
}
