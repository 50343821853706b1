//! Locating `<script type="application/json">` blocks in listing HTML.
//!
//! An explicit scan rather than one big regex: find each script open tag,
//! check its `type` attribute, then capture the element body. Each step has
//! its own failure mode and its own tests.

/// Contents of every `<script>` element whose `type` attribute is
/// `application/json`, in document order. Unterminated elements are dropped.
pub fn json_script_blocks(html: &str) -> Vec<&str> {
    let mut blocks = Vec::new();
    let mut rest = html;
    while let Some(start) = rest.find("<script") {
        let after_tag = &rest[start + "<script".len()..];
        let Some(attrs_end) = after_tag.find('>') else {
            break;
        };
        let attrs = &after_tag[..attrs_end];
        let body = &after_tag[attrs_end + 1..];
        let Some(close) = body.find("</script>") else {
            break;
        };
        if has_json_type(attrs) {
            blocks.push(&body[..close]);
        }
        rest = &body[close + "</script>".len()..];
    }
    blocks
}

/// True if the attribute text carries `type="application/json"` (either
/// quoting style).
fn has_json_type(attrs: &str) -> bool {
    attrs.contains(r#"type="application/json""#) || attrs.contains("type='application/json'")
}
