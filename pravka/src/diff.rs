//! HTML view of a text transformation.
use similar::{ChangeTag, TextDiff};

const INSERT_OPEN: &str = "<mark style='background:#e6ffed'>";
const DELETE_OPEN: &str = "<mark style='background:#ffeef0;text-decoration:line-through'>";
const MARK_CLOSE: &str = "</mark>";

/// Renders the change from `original` to `corrected` as an HTML fragment.
///
/// Runs a character-level diff, emits unchanged spans verbatim, wraps
/// inserted spans in a green mark and deleted spans in a struck-through
/// red mark. A replacement is a deleted span immediately followed by an
/// inserted one. All text content is HTML-escaped; output is
/// deterministic for a given input pair.
pub fn make_diff(original: &str, corrected: &str) -> String {
    let diff = TextDiff::from_chars(original, corrected);

    let mut out = String::new();
    let mut span = String::new();
    let mut span_tag: Option<ChangeTag> = None;

    for change in diff.iter_all_changes() {
        if span_tag != Some(change.tag()) {
            flush_span(&mut out, span_tag, &span);
            span.clear();
            span_tag = Some(change.tag());
        }
        span.push_str(change.value());
    }
    flush_span(&mut out, span_tag, &span);

    out
}

fn flush_span(out: &mut String, tag: Option<ChangeTag>, text: &str) {
    if text.is_empty() {
        return;
    }
    let escaped = html_escape::encode_text(text);
    match tag {
        Some(ChangeTag::Equal) | None => out.push_str(&escaped),
        Some(ChangeTag::Insert) => {
            out.push_str(INSERT_OPEN);
            out.push_str(&escaped);
            out.push_str(MARK_CLOSE);
        }
        Some(ChangeTag::Delete) => {
            out.push_str(DELETE_OPEN);
            out.push_str(&escaped);
            out.push_str(MARK_CLOSE);
        }
    }
}
