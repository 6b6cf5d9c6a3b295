// HTML-escaping for block content that is stored as a raw source substring
// but must come out of block parsing already escaped (§4.2: indented and
// fenced code emit their content HTML-escaped; the inline parser and
// renderer never re-visit `block_code.raw`).
//
// Grounded on the pack's own `escape_html` helper (`renderers/helpers.rs`),
// same five-entity table and replacement order.

pub fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#x27;")
}
