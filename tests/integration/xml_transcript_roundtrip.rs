//! Writes a rendered transcript to an on-disk file and re-parses it with a
//! real XML parser, confirming `render`'s output isn't just
//! string-assertion-shaped but actually well-formed once wrapped in a root
//! element.

use chrono::{DateTime, Utc};
use ndgr_client::xml_transcript::render;
use ndgr_protocol::{AccountStatus, Color, Comment, Font, NamedColor, Opacity, Position, Size};
use std::io::Write;

fn comment(id: &str, at_secs: i64, content: &str) -> Comment {
    Comment {
        id: id.to_owned(),
        at: DateTime::<Utc>::from_timestamp(at_secs, 0).unwrap(),
        live_id: 999,
        raw_user_id: 555,
        hashed_user_id: "a:deadbeef".to_owned(),
        account_status: AccountStatus::Standard,
        no: 1,
        vpos: at_secs * 100,
        position: Position::Naka,
        size: Size::Medium,
        color: Color::Named(NamedColor::White),
        font: Font::Defont,
        opacity: Opacity::Normal,
        content: content.to_owned(),
    }
}

#[test]
fn rendered_transcript_parses_as_well_formed_xml_once_wrapped() {
    let comments = vec![
        comment("c1", 1_700_000_010, "second"),
        comment("c2", 1_700_000_000, "first & <tricky>"),
    ];
    let body = render(&comments);

    let mut file = tempfile::NamedTempFile::new().expect("create temp file");
    writeln!(file, "<packet>{body}</packet>").expect("write transcript");
    let path = file.path().to_owned();

    let xml = std::fs::read_to_string(&path).expect("read transcript back");
    let document = scraper::Html::parse_document(&xml);
    let selector = scraper::Selector::parse("chat").unwrap();
    let chats: Vec<_> = document.select(&selector).collect();

    assert_eq!(chats.len(), 2);
    // Ascending by at-timestamp regardless of input order.
    assert_eq!(chats[0].text().collect::<String>(), "first & <tricky>");
    assert_eq!(chats[1].text().collect::<String>(), "second");
    assert_eq!(chats[0].value().attr("thread"), Some("lv999"));
}
