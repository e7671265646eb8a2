//! Chat message formatting.
//!
//! Renders a raw role-play transcript message into display HTML: OOC
//! (out-of-character) runs are folded into a `<details>` block, model
//! "thinking" and image-metadata tags are stripped, and a lightweight
//! markdown subset (bold, italics, quoted dialogue, paragraph breaks)
//! becomes HTML. The rules are a fixed substitution pipeline, applied
//! in order; there is no grammar and no round-trip guarantee.

use regex::{Captures, Regex};

/// Compiled substitution pipeline. Build one and reuse it; each rule is
/// a regex and compilation is not free.
pub struct MessageFormatter {
    ooc: Regex,
    thinking: Regex,
    image_info: Regex,
    pic: Regex,
    info_block: Regex,
    bold: Regex,
    italic: Regex,
    underscore: Regex,
    quote: Regex,
    paragraph: Regex,
}

impl Default for MessageFormatter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageFormatter {
    pub fn new() -> Self {
        Self {
            // An OOC marker swallows everything to the end of the message.
            ooc: Regex::new(r"(?s)\(?[Oo][Oo][Cc]\s*:.*$").unwrap(),
            // Thinking blocks, optionally wrapped in a code fence.
            thinking: Regex::new(
                r"(?s)(?:```?\w*[\r\n]?)?<(?:thought|cot|thinking|CoT|think|starter).*?</(?:thought|cot|thinking|CoT|think|starter)>(?:[\r\n]?```?)?",
            )
            .unwrap(),
            image_info: Regex::new(r"(?s)<(?i:imageinfo)>.*?</(?i:imageinfo)>").unwrap(),
            // <pic ...> tags may be left unclosed at the end of a message.
            pic: Regex::new(r"(?s)<pic.*?(?:</pic>|$)").unwrap(),
            info_block: Regex::new(r"(?s)<infoblock>.*?</infoblock>").unwrap(),
            bold: Regex::new(r"\*\*(.+?)\*\*").unwrap(),
            italic: Regex::new(r"\*(.+?)\*").unwrap(),
            underscore: Regex::new(r"_([^_]+)_").unwrap(),
            quote: Regex::new(r#""([^"]+)""#).unwrap(),
            paragraph: Regex::new(r"\n\n+").unwrap(),
        }
    }

    /// Render one message body to HTML.
    pub fn format(&self, content: &str) -> String {
        if content.is_empty() {
            return String::new();
        }

        let content = self.ooc.replace_all(content, |caps: &Captures| {
            format!("<details><summary>OOC</summary>{}</details>", &caps[0])
        });
        let content = self.thinking.replace_all(&content, "");
        let content = self.image_info.replace_all(&content, "");
        let content = self.pic.replace_all(&content, "");
        let content = self.info_block.replace_all(&content, "");
        let content = self.bold.replace_all(&content, "<strong>$1</strong>");
        let content = self.italic.replace_all(&content, "<em>$1</em>");
        let content = self.quote.replace_all(&content, "<q>\"${1}\"</q>");
        let content = self.paragraph.replace_all(&content, "</p><p>");
        let content = content.replace('\n', "<br>");

        format!("<p>{}</p>", content)
    }

    /// Render bookmark caption text: bold, italics (asterisk or
    /// underscore) and line breaks only.
    pub fn format_caption(&self, text: &str) -> String {
        if text.is_empty() {
            return String::new();
        }

        let text = self.bold.replace_all(text, "<strong>$1</strong>");
        let text = self.italic.replace_all(&text, "<em>$1</em>");
        let text = self.underscore.replace_all(&text, "<em>$1</em>");
        text.replace('\n', "<br/>")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fmt(content: &str) -> String {
        MessageFormatter::new().format(content)
    }

    #[test]
    fn test_empty_message() {
        assert_eq!(fmt(""), "");
    }

    #[test]
    fn test_plain_text_is_wrapped_in_paragraph() {
        assert_eq!(fmt("hello"), "<p>hello</p>");
    }

    #[test]
    fn test_bold_and_italic() {
        assert_eq!(
            fmt("**loud** and *soft*"),
            "<p><strong>loud</strong> and <em>soft</em></p>"
        );
    }

    #[test]
    fn test_quoted_dialogue() {
        assert_eq!(
            fmt(r#"she said "hello there""#),
            "<p>she said <q>\"hello there\"</q></p>"
        );
    }

    #[test]
    fn test_paragraphs_and_line_breaks() {
        assert_eq!(fmt("one\ntwo\n\nthree"), "<p>one<br>two</p><p>three</p>");
        // Three or more blank-line newlines still make a single break.
        assert_eq!(fmt("a\n\n\n\nb"), "<p>a</p><p>b</p>");
    }

    #[test]
    fn test_thinking_block_is_stripped() {
        assert_eq!(
            fmt("<thinking>secret plan</thinking>visible"),
            "<p>visible</p>"
        );
        assert_eq!(fmt("<think>short</think>after"), "<p>after</p>");
        // Fenced variant.
        assert_eq!(fmt("```\n<cot>x</cot>\n```done"), "<p>done</p>");
    }

    #[test]
    fn test_image_tags_are_stripped() {
        assert_eq!(fmt("<ImageInfo>prompt stuff</ImageInfo>kept"), "<p>kept</p>");
        assert_eq!(fmt("kept<pic src=\"a.png\"></pic>"), "<p>kept</p>");
        // Unterminated pic tag eats to the end of the message.
        assert_eq!(fmt("kept<pic src=\"a"), "<p>kept</p>");
        assert_eq!(fmt("<infoblock>stats</infoblock>rest"), "<p>rest</p>");
    }

    #[test]
    fn test_ooc_is_folded_into_details() {
        let out = fmt("story line\n(OOC: see you tomorrow)");
        assert!(out.contains("<details><summary>OOC</summary>"));
        assert!(out.contains("(OOC: see you tomorrow)"));
        assert!(out.starts_with("<p>story line"));
    }

    #[test]
    fn test_ooc_without_paren() {
        let out = fmt("scene\nooc: that's all");
        assert!(out.contains("<details><summary>OOC</summary>ooc: that's all"));
    }

    #[test]
    fn test_caption_formatting() {
        let formatter = MessageFormatter::new();
        assert_eq!(
            formatter.format_caption("**bold** _soft_\nnext"),
            "<strong>bold</strong> <em>soft</em><br/>next"
        );
        assert_eq!(formatter.format_caption("*em*"), "<em>em</em>");
        assert_eq!(formatter.format_caption(""), "");
    }
}
