//! XML utility functions for navigating and extracting data from record trees.
//!
//! Matching is by local name, so `mods:title`, `dc:title` and a default
//! namespaced `title` are all found by `"title"`.

use roxmltree::Node;

/// Get the tag name without namespace prefix.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_transformer::xml::get_tag_name;
///
/// let xml = r#"<record xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>A</dc:title></record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let title = doc.root_element().first_element_child().unwrap();
/// assert_eq!(get_tag_name(title), "title");
/// ```
pub fn get_tag_name<'a>(node: Node<'a, '_>) -> &'a str {
    node.tag_name().name()
}

/// Find the first child element with the given tag name.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_transformer::xml::find_child;
///
/// let xml = r#"<record><header/><metadata/></record>"#;
/// let doc = Document::parse(xml).unwrap();
/// let root = doc.root_element();
///
/// assert!(find_child(root, "header").is_some());
/// assert!(find_child(root, "about").is_none());
/// ```
pub fn find_child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|child| has_tag(*child, tag))
}

/// Find all child elements with the given tag name.
pub fn find_children<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| has_tag(*child, tag))
}

/// Find all child elements whose tag name is one of `tags`, in document order.
pub fn find_children_any<'a, 'input>(
    node: Node<'a, 'input>,
    tags: &'a [&'a str],
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children()
        .filter(move |child| child.is_element() && tags.contains(&get_tag_name(*child)))
}

/// Find the first descendant element with the given tag name.
pub fn find_descendant<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &str,
) -> Option<Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .find(|n| has_tag(*n, tag))
}

/// Find all descendant elements with the given tag name, in document order.
pub fn find_descendants<'a, 'input>(
    node: Node<'a, 'input>,
    tag: &'a str,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.descendants()
        .skip(1)
        .filter(move |n| has_tag(*n, tag))
}

/// Find a descendant element matching a path of tag names.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_transformer::xml::find_by_path;
///
/// let xml = r#"<record><header><identifier>oai:x:1</identifier></header></record>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// let id = find_by_path(doc.root_element(), "header/identifier");
/// assert_eq!(id.and_then(|n| n.text()), Some("oai:x:1"));
/// ```
pub fn find_by_path<'a, 'input>(node: Node<'a, 'input>, path: &str) -> Option<Node<'a, 'input>> {
    let mut current = node;
    for part in path.split('/') {
        current = find_child(current, part)?;
    }
    Some(current)
}

/// Get the direct text content of a node, trimmed.
///
/// # Returns
/// Trimmed text content, or empty string if no text
pub fn get_text(node: Node<'_, '_>) -> String {
    node.text()
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

/// Get the trimmed direct text of a node, `None` when blank.
pub fn non_empty_text(node: Node<'_, '_>) -> Option<String> {
    Some(get_text(node)).filter(|s| !s.is_empty())
}

/// Get an attribute value by local name, ignoring any namespace.
pub fn get_attribute<'a>(node: Node<'a, '_>, name: &str) -> Option<&'a str> {
    node.attributes()
        .find(|attr| attr.name() == name)
        .map(|attr| attr.value())
}

/// Check if a node has a specific tag name.
pub fn has_tag(node: Node<'_, '_>, tag: &str) -> bool {
    node.is_element() && get_tag_name(node) == tag
}

/// Get all element children of a node.
pub fn element_children<'a, 'input>(
    node: Node<'a, 'input>,
) -> impl Iterator<Item = Node<'a, 'input>> {
    node.children().filter(|child| child.is_element())
}

fn collect_text_pieces(node: Node<'_, '_>, skipped: &[&str], pieces: &mut Vec<String>) {
    for child in node.children() {
        if child.is_text() {
            if let Some(text) = child.text() {
                let trimmed = text.trim();
                if !trimmed.is_empty() && !pieces.iter().any(|p| p == trimmed) {
                    pieces.push(trimmed.to_string());
                }
            }
        } else if child.is_element() && !skipped.contains(&get_tag_name(child)) {
            collect_text_pieces(child, skipped, pieces);
        }
    }
}

/// Flatten the mixed content of an element into its text pieces.
///
/// Walks all descendants in document order, trims each text node, drops
/// blank and repeated pieces and skips the subtrees of `skipped` elements.
pub fn flatten_text_pieces(node: Node<'_, '_>, skipped: &[&str]) -> Vec<String> {
    let mut pieces = Vec::new();
    collect_text_pieces(node, skipped, &mut pieces);
    pieces
}

/// Flatten the mixed content of an element into one string.
///
/// # Examples
/// ```
/// use roxmltree::Document;
/// use crosswalk_transformer::xml::flatten_text;
///
/// let xml = r#"<unittitle>Papers, <num>MC 1</num> <emph>1900</emph>-1950</unittitle>"#;
/// let doc = Document::parse(xml).unwrap();
///
/// assert_eq!(flatten_text(doc.root_element(), " ", &["num"]), "Papers, 1900 -1950");
/// ```
pub fn flatten_text(node: Node<'_, '_>, separator: &str, skipped: &[&str]) -> String {
    flatten_text_pieces(node, skipped).join(separator)
}
