use scraper::{Html, Node};

/// Extract the visible text of an HTML document: script/style subtrees
/// are dropped, every text node becomes a line, lines are trimmed and
/// blank lines removed. Idempotent on already-cleaned text.
pub fn html_to_text(html: &str) -> String {
    let doc = Html::parse_document(html);
    let mut raw = String::new();

    // Depth-first over the node tree, children pushed in reverse so the
    // stack pops them in document order.
    let mut stack = vec![doc.tree.root()];
    while let Some(node) = stack.pop() {
        match node.value() {
            Node::Text(t) => {
                raw.push_str(&t.text);
                raw.push('\n');
            }
            Node::Element(el) if matches!(el.name(), "script" | "style") => continue,
            _ => {}
        }
        for child in node.children().rev() {
            stack.push(child);
        }
    }

    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

// ── Tests ──
