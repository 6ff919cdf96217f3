//! Small query helpers over the parsed tree for lookups that plain CSS
//! selectors cannot express (or express awkwardly).

use ego_tree::NodeRef;
use scraper::{ElementRef, Html, Node, Selector};

/// First element in the document carrying the given id attribute.
pub fn find_by_id<'a>(doc: &'a Html, id: &str) -> Option<ElementRef<'a>> {
    let with_id = Selector::parse("[id]").unwrap();
    doc.select(&with_id).find(|el| el.value().attr("id") == Some(id))
}

/// First element after `start` in document order (its own descendants
/// included) with the given tag name and exact class token.
pub fn find_following_with_class<'a>(
    start: ElementRef<'a>,
    name: &str,
    class: &str,
) -> Option<ElementRef<'a>> {
    following(*start)
        .filter_map(ElementRef::wrap)
        .find(|el| el.value().name() == name && el.value().classes().any(|c| c == class))
}

/// First descendant element with the given tag name.
pub fn find_descendant_tag<'a>(el: ElementRef<'a>, name: &str) -> Option<ElementRef<'a>> {
    el.descendants()
        .skip(1)
        .filter_map(ElementRef::wrap)
        .find(|e| e.value().name() == name)
}

/// All nodes strictly after `start` in document order.
fn following<'a>(start: NodeRef<'a, Node>) -> impl Iterator<Item = NodeRef<'a, Node>> + 'a {
    let mut next = advance(start);
    std::iter::from_fn(move || {
        let current = next?;
        next = advance(current);
        Some(current)
    })
}

fn advance<'a>(node: NodeRef<'a, Node>) -> Option<NodeRef<'a, Node>> {
    if let Some(child) = node.first_child() {
        return Some(child);
    }
    let mut current = node;
    loop {
        if let Some(sibling) = current.next_sibling() {
            return Some(sibling);
        }
        current = current.parent()?;
    }
}
