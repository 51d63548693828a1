use ammonia;

/// Strips markup that could run script in a browser from admin-provided text
/// (question and answer bodies) before it is stored.
///
/// Whitelist based: harmless formatting tags like `<b>` survive, `<script>`
/// and event-handler attributes are removed.
pub fn clean_html(input: &str) -> String {
    ammonia::clean(input)
}

#[cfg(test)]
mod tests {
    use super::clean_html;

    #[test]
    fn keeps_plain_text() {
        assert_eq!(clean_html("What is 2 + 2?"), "What is 2 + 2?");
    }

    #[test]
    fn drops_scripts() {
        let cleaned = clean_html("Pick one<script>alert(1)</script>");
        assert_eq!(cleaned, "Pick one");
    }

    #[test]
    fn drops_event_handlers() {
        let cleaned = clean_html(r#"<b onclick="steal()">bold</b>"#);
        assert_eq!(cleaned, "<b>bold</b>");
    }
}
