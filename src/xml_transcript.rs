//! Legacy XML transcript writer (spec.md §6, collaborator surface): renders
//! normalized Comments as the flat `<chat>` element stream the historical
//! niconico live client ecosystem expects.

use ndgr_protocol::{AccountStatus, Color, Comment, NamedColor, Opacity};

/// Render `comments` as the concatenation of `<chat>` elements in ascending
/// `(date, date_usec)` order, with no XML prolog and no outer wrapper
/// element.
pub fn render(comments: &[Comment]) -> String {
    let mut ordered: Vec<&Comment> = comments.iter().collect();
    ordered.sort_by_key(|c| c.at);

    let mut out = String::new();
    for comment in ordered {
        render_one(comment, &mut out);
    }
    out
}

fn render_one(comment: &Comment, out: &mut String) {
    let thread = format!("lv{}", comment.live_id);
    let date = comment.at.timestamp();
    let date_usec = comment.at.timestamp_subsec_micros();
    let user_id = if comment.raw_user_id > 0 {
        comment.raw_user_id.to_string()
    } else {
        comment.hashed_user_id.clone()
    };
    let mail = mail_tokens(comment).join(" ");

    out.push_str("<chat thread=\"");
    escape_attr(&thread, out);
    out.push_str("\" no=\"");
    out.push_str(&comment.no.to_string());
    out.push_str("\" vpos=\"");
    out.push_str(&comment.vpos.to_string());
    out.push_str("\" date=\"");
    out.push_str(&date.to_string());
    out.push_str("\" date_usec=\"");
    out.push_str(&date_usec.to_string());
    out.push_str("\" user_id=\"");
    escape_attr(&user_id, out);
    out.push_str("\" mail=\"");
    escape_attr(&mail, out);
    out.push('"');
    if comment.account_status == AccountStatus::Premium {
        out.push_str(" premium=\"1\"");
    }
    if comment.raw_user_id == 0 {
        out.push_str(" anonymity=\"1\"");
    }
    out.push('>');
    escape_text(&comment.content, out);
    out.push_str("</chat>");
}

/// Space-joined command tokens (spec.md §6 `mail` rule).
fn mail_tokens(comment: &Comment) -> Vec<String> {
    let mut tokens = Vec::new();
    if comment.raw_user_id == 0 {
        tokens.push("184".to_owned());
    }
    if comment.position.as_str() != "naka" {
        tokens.push(comment.position.as_str().to_owned());
    }
    if comment.size.as_str() != "medium" {
        tokens.push(comment.size.as_str().to_owned());
    }
    match comment.color {
        Color::Named(NamedColor::White) => {}
        Color::Named(named) => tokens.push(named.as_str().to_owned()),
        Color::Rgb { r, g, b } => tokens.push(format!("#{r:02X}{g:02X}{b:02X}")),
    }
    if comment.font.as_str() != "defont" {
        tokens.push(comment.font.as_str().to_owned());
    }
    if comment.opacity == Opacity::Translucent {
        tokens.push("translucent".to_owned());
    }
    tokens
}

/// Strips the control characters spec.md §6 calls out (preserving tab, LF,
/// CR) and escapes `&`/`<`/`>`.
fn escape_text(input: &str, out: &mut String) {
    for c in input.chars().filter(|&c| !is_stripped_control_char(c)) {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

/// Same as [`escape_text`] plus `"` escaping, for use inside a `"`-quoted
/// attribute value.
fn escape_attr(input: &str, out: &mut String) {
    for c in input.chars().filter(|&c| !is_stripped_control_char(c)) {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

fn is_stripped_control_char(c: char) -> bool {
    matches!(c as u32, 0x00..=0x08 | 0x0B | 0x0C | 0x0E..=0x1F | 0x7F)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};
    use ndgr_protocol::{Font, Position, Size};

    fn sample(at_secs: i64, content: &str) -> Comment {
        Comment {
            id: "id1".to_owned(),
            at: DateTime::<Utc>::from_timestamp(at_secs, 0).unwrap(),
            live_id: 345,
            raw_user_id: 12345,
            hashed_user_id: "a:deadbeef".to_owned(),
            account_status: AccountStatus::Standard,
            no: 1,
            vpos: 1000,
            position: Position::Naka,
            size: Size::Medium,
            color: Color::Named(NamedColor::White),
            font: Font::Defont,
            opacity: Opacity::Normal,
            content: content.to_owned(),
        }
    }

    #[test]
    fn minimal_comment_has_empty_mail_and_no_optional_attrs() {
        let comment = sample(1_700_000_000, "hello");
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.starts_with("<chat thread=\"lv345\""));
        assert!(xml.contains("mail=\"\""));
        assert!(!xml.contains("premium="));
        assert!(!xml.contains("anonymity="));
        assert!(xml.ends_with(">hello</chat>"));
    }

    #[test]
    fn anonymous_comment_sets_184_and_anonymity_and_hashed_user_id() {
        let mut comment = sample(1_700_000_000, "hi");
        comment.raw_user_id = 0;
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.contains("mail=\"184\""));
        assert!(xml.contains("anonymity=\"1\""));
        assert!(xml.contains("user_id=\"a:deadbeef\""));
    }

    #[test]
    fn premium_account_sets_premium_flag() {
        let mut comment = sample(1_700_000_000, "hi");
        comment.account_status = AccountStatus::Premium;
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.contains("premium=\"1\""));
    }

    #[test]
    fn full_mail_token_set_renders_in_order() {
        let mut comment = sample(1_700_000_000, "hi");
        comment.raw_user_id = 0;
        comment.position = Position::Shita;
        comment.size = Size::Big;
        comment.color = Color::Rgb { r: 255, g: 0, b: 128 };
        comment.font = Font::Mincho;
        comment.opacity = Opacity::Translucent;
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.contains("mail=\"184 shita big #FF0080 mincho translucent\""));
    }

    #[test]
    fn control_characters_are_stripped_but_tab_and_newline_survive() {
        let comment = sample(1_700_000_000, "a\u{0000}b\tc\nd\u{007F}e");
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.contains(">ab\tc\nde</chat>"));
    }

    #[test]
    fn elements_are_ordered_ascending_by_timestamp() {
        let early = sample(1_700_000_000, "first");
        let late = sample(1_700_000_100, "second");
        let xml = render(&[late, early]);
        assert!(xml.find("first").unwrap() < xml.find("second").unwrap());
    }

    #[test]
    fn ampersand_and_angle_brackets_are_escaped_in_content() {
        let comment = sample(1_700_000_000, "<a> & <b>");
        let xml = render(std::slice::from_ref(&comment));
        assert!(xml.contains("&lt;a&gt; &amp; &lt;b&gt;"));
    }
}
