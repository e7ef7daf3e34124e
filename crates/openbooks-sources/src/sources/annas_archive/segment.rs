//! Splits a search page into per-result blocks.

/// Literal opening of every result row on the search page.
pub const BLOCK_MARKER: &str = "<div class=\"flex  pt-3 pb-3 border-b";

/// Fragments following each occurrence of [`BLOCK_MARKER`], in document order.
///
/// The text before the first marker is page chrome and is dropped. A page
/// without the marker yields no blocks.
pub fn split_blocks(html: &str) -> Vec<&str> {
    html.split(BLOCK_MARKER).skip(1).collect()
}

/// Drop the rest of the marker's opening tag, up to and including the first `>`.
pub fn block_body(block: &str) -> &str {
    match block.find('>') {
        Some(pos) => &block[pos + 1..],
        None => "",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_marker_yields_no_blocks() {
        assert!(split_blocks("<html><body>nothing here</body></html>").is_empty());
        assert!(split_blocks("").is_empty());
    }

    #[test]
    fn test_single_marker_yields_one_block() {
        let html = format!("<header/>{BLOCK_MARKER} x\">first</div>");
        assert_eq!(split_blocks(&html), vec![" x\">first</div>"]);
    }

    #[test]
    fn test_blocks_keep_document_order() {
        let html = format!("head{BLOCK_MARKER}\">a{BLOCK_MARKER}\">b{BLOCK_MARKER}\">c");
        let bodies: Vec<&str> = split_blocks(&html).into_iter().map(block_body).collect();
        assert_eq!(bodies, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_block_body_without_tag_end_is_empty() {
        assert_eq!(block_body(" truncated"), "");
    }
}
