//! Page tree plumbing over `scraper`
//!
//! [`Page`] wraps a parsed HTML document and exposes the node-level reads and
//! writes the localization engine needs: text node values, attribute values,
//! whole-element text content, and serialization. Nodes are addressed by
//! [`ego_tree::NodeId`], which stays valid for the life of the tree and is
//! what the snapshot side table keys on.
//!
//! Writes are forgiving: a write against a node that no longer exists (or is
//! not of the expected kind) returns `false` instead of failing, because a
//! half-localized page must degrade, never crash.

use ego_tree::{NodeId, Tree};
use scraper::node::{Node, Text};
use scraper::Html;
use std::path::Path;
use tendril::StrTendril;

use crate::utils::error::PageError;

/// A parsed HTML page with mutable access to its tree
pub struct Page {
    html: Html,
}

impl Page {
    /// Parse a complete HTML document
    pub fn parse(document: &str) -> Self {
        Self {
            html: Html::parse_document(document),
        }
    }

    /// Parse an HTML fragment (no implied html/head/body scaffolding)
    pub fn parse_fragment(fragment: &str) -> Self {
        Self {
            html: Html::parse_fragment(fragment),
        }
    }

    /// Read and parse a page from disk
    pub async fn read_file(path: impl AsRef<Path>) -> Result<Self, PageError> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| PageError::read(path, e))?;
        Ok(Self::parse(&content))
    }

    /// Serialize and write the page to disk
    pub async fn write_file(&self, path: impl AsRef<Path>) -> Result<(), PageError> {
        let path = path.as_ref();
        tokio::fs::write(path, self.html())
            .await
            .map_err(|e| PageError::write(path, e))
    }

    /// Serialize the whole document
    pub fn html(&self) -> String {
        self.html.html()
    }

    /// The underlying tree, for read-only traversal
    pub fn tree(&self) -> &Tree<Node> {
        &self.html.tree
    }

    /// Value of a text node, with its whitespace intact
    pub fn text_value(&self, id: NodeId) -> Option<String> {
        let node = self.html.tree.get(id)?;
        match node.value() {
            Node::Text(text) => Some(text.text.to_string()),
            _ => None,
        }
    }

    /// Value of a named attribute on an element node
    pub fn attribute(&self, id: NodeId, name: &str) -> Option<String> {
        let node = self.html.tree.get(id)?;
        node.value()
            .as_element()
            .and_then(|el| el.attr(name))
            .map(str::to_string)
    }

    /// Concatenated text of every text node under an element, in document
    /// order, matching the host notion of `textContent`
    pub fn text_content(&self, id: NodeId) -> Option<String> {
        let node = self.html.tree.get(id)?;
        if !node.value().is_element() {
            return None;
        }

        let mut content = String::new();
        for descendant in node.descendants() {
            if let Node::Text(text) = descendant.value() {
                content.push_str(&text.text);
            }
        }
        Some(content)
    }

    /// Overwrite the value of a text node in place
    ///
    /// Returns `false` if the node is gone or is not a text node.
    pub fn set_text_value(&mut self, id: NodeId, value: &str) -> bool {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return false;
        };
        match node.value() {
            Node::Text(text) => {
                text.text = StrTendril::from(value);
                true
            }
            _ => false,
        }
    }

    /// Overwrite an existing attribute value in place
    ///
    /// Only attributes already present are written; this never adds one.
    /// Returns `false` if the node is gone, is not an element, or does not
    /// carry the attribute.
    pub fn set_attribute(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(mut node) = self.html.tree.get_mut(id) else {
            return false;
        };
        let Node::Element(element) = node.value() else {
            return false;
        };

        for (qual_name, attr_value) in element.attrs.iter_mut() {
            if &*qual_name.local == name {
                *attr_value = StrTendril::from(value);
                return true;
            }
        }
        false
    }

    /// Replace an element's entire text content with a single text node,
    /// detaching whatever children it had
    ///
    /// Returns `false` if the node is gone or is not an element.
    pub fn set_text_content(&mut self, id: NodeId, value: &str) -> bool {
        {
            let Some(node) = self.html.tree.get(id) else {
                return false;
            };
            if !node.value().is_element() {
                return false;
            }
        }

        let Some(mut node) = self.html.tree.get_mut(id) else {
            return false;
        };
        while let Some(mut child) = node.first_child() {
            child.detach();
        }
        if !value.is_empty() {
            node.append(Node::Text(Text {
                text: StrTendril::from(value),
            }));
        }
        true
    }

    /// Tag name of an element node
    pub fn element_name(&self, id: NodeId) -> Option<String> {
        let node = self.html.tree.get(id)?;
        node.value().as_element().map(|el| el.name().to_string())
    }

    /// Parse a fragment and append its nodes as children of an element,
    /// the way a client router mounts freshly rendered content
    ///
    /// Returns `false` if the parent is gone or is not an element.
    pub fn append_fragment(&mut self, parent: NodeId, fragment: &str) -> bool {
        {
            let Some(node) = self.html.tree.get(parent) else {
                return false;
            };
            if !node.value().is_element() {
                return false;
            }
        }

        let parsed = Html::parse_fragment(fragment);
        // Fragment parsing wraps the content in a synthetic <html> element
        let Some(wrapper) = parsed
            .tree
            .root()
            .children()
            .find(|child| child.value().is_element())
        else {
            return true;
        };

        let mut stack: Vec<(NodeId, NodeId)> = wrapper
            .children()
            .rev()
            .map(|child| (child.id(), parent))
            .collect();

        while let Some((source, target)) = stack.pop() {
            let Some(source_node) = parsed.tree.get(source) else {
                continue;
            };
            let value = source_node.value().clone();
            let children: Vec<NodeId> = source_node.children().map(|c| c.id()).collect();

            let Some(mut target_node) = self.html.tree.get_mut(target) else {
                continue;
            };
            let new_id = target_node.append(value).id();
            for child in children.into_iter().rev() {
                stack.push((child, new_id));
            }
        }
        true
    }
}
