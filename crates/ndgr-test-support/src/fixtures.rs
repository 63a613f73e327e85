//! Builders for constructing wire protobuf fixtures in tests without
//! repeating the full nested struct literal every time.

use ndgr_protocol::wire;

pub fn timestamp(seconds: i64) -> wire::Timestamp {
    wire::Timestamp { seconds, nanos: 0 }
}

pub fn chunked_entry_segment(uri: &str, from_secs: i64, until_secs: i64) -> wire::ChunkedEntry {
    wire::ChunkedEntry {
        entry: Some(wire::chunked_entry::Entry::Segment(wire::MessageSegment {
            uri: uri.to_owned(),
            from: Some(timestamp(from_secs)),
            until: Some(timestamp(until_secs)),
        })),
    }
}

pub fn chunked_entry_next(at: i64) -> wire::ChunkedEntry {
    wire::ChunkedEntry {
        entry: Some(wire::chunked_entry::Entry::Next(wire::ReadyForNext { at })),
    }
}

pub fn chunked_entry_backward(uri: &str) -> wire::ChunkedEntry {
    wire::ChunkedEntry {
        entry: Some(wire::chunked_entry::Entry::Backward(wire::BackwardSegment {
            segment: Some(wire::PackedSegmentRef { uri: uri.to_owned() }),
        })),
    }
}

/// A minimal, fully-admissible chat message at the given at-timestamp,
/// carrying `content` and a stable `id`.
pub fn chat_message(id: &str, at_secs: i64, live_id: i64, content: &str) -> wire::ChunkedMessage {
    wire::ChunkedMessage {
        meta: Some(wire::Meta {
            id: id.to_owned(),
            at: Some(timestamp(at_secs)),
            origin: Some(wire::Origin {
                chat: Some(wire::ChatOrigin { live_id }),
            }),
        }),
        message: Some(wire::MessageData {
            data: Some(wire::message_data::Data::Chat(wire::Chat {
                raw_user_id: 0,
                hashed_user_id: format!("a:{id}"),
                account_status: wire::AccountStatus::Standard as i32,
                no: 1,
                vpos: at_secs * 100,
                content: content.to_owned(),
                modifier: Some(wire::Modifier {
                    position: wire::Position::Naka as i32,
                    size: wire::Size::Medium as i32,
                    font: wire::Font::Defont as i32,
                    opacity: wire::Opacity::Normal as i32,
                    color: None,
                }),
            })),
        }),
    }
}

pub fn packed_segment(messages: Vec<wire::ChunkedMessage>, next_uri: Option<&str>) -> wire::PackedSegment {
    wire::PackedSegment {
        messages,
        next: next_uri.map(|uri| wire::PackedSegmentRef { uri: uri.to_owned() }),
    }
}
