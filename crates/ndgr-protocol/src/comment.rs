//! The normalized, user-facing [`Comment`] record and the admissibility /
//! normalization rules that turn a wire [`crate::wire::ChunkedMessage`] into
//! one.

use crate::wire;
use chrono::{DateTime, TimeZone, Utc};

/// Converts a wire `Timestamp` (seconds + nanos) into a UTC instant.
///
/// An out-of-range timestamp clamps to the nearest representable instant
/// rather than panicking — malformed timestamps are a server-side data
/// quality issue, not a reason to crash the stream.
pub fn timestamp_to_datetime(ts: &wire::Timestamp) -> DateTime<Utc> {
    Utc.timestamp_opt(ts.seconds, ts.nanos.max(0) as u32)
        .single()
        .unwrap_or_else(|| Utc.timestamp_opt(0, 0).unwrap())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccountStatus {
    Standard,
    Premium,
}

impl AccountStatus {
    /// Palette form, as used in the legacy XML `premium` flag and anywhere
    /// else the account status is shown verbatim.
    pub fn as_str(self) -> &'static str {
        match self {
            AccountStatus::Standard => "Standard",
            AccountStatus::Premium => "Premium",
        }
    }
}

impl From<wire::AccountStatus> for AccountStatus {
    fn from(v: wire::AccountStatus) -> Self {
        match v {
            wire::AccountStatus::Premium => AccountStatus::Premium,
            wire::AccountStatus::Standard => AccountStatus::Standard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Position {
    Naka,
    Shita,
    Ue,
}

impl Position {
    pub fn as_str(self) -> &'static str {
        match self {
            Position::Naka => "naka",
            Position::Shita => "shita",
            Position::Ue => "ue",
        }
    }
}

impl From<wire::Position> for Position {
    fn from(v: wire::Position) -> Self {
        match v {
            wire::Position::Naka => Position::Naka,
            wire::Position::Shita => Position::Shita,
            wire::Position::Ue => Position::Ue,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Size {
    Small,
    Medium,
    Big,
}

impl Size {
    pub fn as_str(self) -> &'static str {
        match self {
            Size::Small => "small",
            Size::Medium => "medium",
            Size::Big => "big",
        }
    }
}

impl From<wire::Size> for Size {
    fn from(v: wire::Size) -> Self {
        match v {
            wire::Size::Small => Size::Small,
            wire::Size::Medium => Size::Medium,
            wire::Size::Big => Size::Big,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Font {
    Defont,
    Mincho,
    Gothic,
}

impl Font {
    pub fn as_str(self) -> &'static str {
        match self {
            Font::Defont => "defont",
            Font::Mincho => "mincho",
            Font::Gothic => "gothic",
        }
    }
}

impl From<wire::Font> for Font {
    fn from(v: wire::Font) -> Self {
        match v {
            wire::Font::Defont => Font::Defont,
            wire::Font::Mincho => Font::Mincho,
            wire::Font::Gothic => Font::Gothic,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opacity {
    Normal,
    Translucent,
}

impl Opacity {
    /// Palette form, preserved as-is (not lower-cased) per the normalization
    /// rule in spec.md's data model.
    pub fn as_str(self) -> &'static str {
        match self {
            Opacity::Normal => "Normal",
            Opacity::Translucent => "Translucent",
        }
    }
}

impl From<wire::Opacity> for Opacity {
    fn from(v: wire::Opacity) -> Self {
        match v {
            wire::Opacity::Normal => Opacity::Normal,
            wire::Opacity::Translucent => Opacity::Translucent,
        }
    }
}

/// The frozen named-color palette, carried over verbatim from the upstream
/// Python client's `NDGRComment.color` literal set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamedColor {
    White,
    Red,
    Pink,
    Orange,
    Yellow,
    Green,
    Cyan,
    Blue,
    Purple,
    Black,
    White2,
    Red2,
    Pink2,
    Orange2,
    Yellow2,
    Green2,
    Cyan2,
    Blue2,
    Purple2,
    Black2,
}

impl NamedColor {
    pub fn as_str(self) -> &'static str {
        use NamedColor::*;
        match self {
            White => "white",
            Red => "red",
            Pink => "pink",
            Orange => "orange",
            Yellow => "yellow",
            Green => "green",
            Cyan => "cyan",
            Blue => "blue",
            Purple => "purple",
            Black => "black",
            White2 => "white2",
            Red2 => "red2",
            Pink2 => "pink2",
            Orange2 => "orange2",
            Yellow2 => "yellow2",
            Green2 => "green2",
            Cyan2 => "cyan2",
            Blue2 => "blue2",
            Purple2 => "purple2",
            Black2 => "black2",
        }
    }
}

impl From<wire::NamedColor> for NamedColor {
    fn from(v: wire::NamedColor) -> Self {
        use wire::NamedColor as W;
        match v {
            W::White => NamedColor::White,
            W::Red => NamedColor::Red,
            W::Pink => NamedColor::Pink,
            W::Orange => NamedColor::Orange,
            W::Yellow => NamedColor::Yellow,
            W::Green => NamedColor::Green,
            W::Cyan => NamedColor::Cyan,
            W::Blue => NamedColor::Blue,
            W::Purple => NamedColor::Purple,
            W::Black => NamedColor::Black,
            W::White2 => NamedColor::White2,
            W::Red2 => NamedColor::Red2,
            W::Pink2 => NamedColor::Pink2,
            W::Orange2 => NamedColor::Orange2,
            W::Yellow2 => NamedColor::Yellow2,
            W::Green2 => NamedColor::Green2,
            W::Cyan2 => NamedColor::Cyan2,
            W::Blue2 => NamedColor::Blue2,
            W::Purple2 => NamedColor::Purple2,
            W::Black2 => NamedColor::Black2,
        }
    }
}

/// A comment's render color: either a named palette entry or an explicit
/// 24-bit RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Named(NamedColor),
    Rgb { r: u8, g: u8, b: u8 },
}

/// The normalized, user-facing comment record (spec.md §3 `Comment`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: String,
    pub at: DateTime<Utc>,
    pub live_id: i64,
    /// 0 means anonymized.
    pub raw_user_id: i64,
    pub hashed_user_id: String,
    pub account_status: AccountStatus,
    /// Best-effort sequence number; not guaranteed unique or monotonic.
    pub no: i64,
    /// Hundredths-of-a-second relative to the program's vpos base time.
    pub vpos: i64,
    pub position: Position,
    pub size: Size,
    pub color: Color,
    pub font: Font,
    pub opacity: Opacity,
    pub content: String,
}

/// Determines whether a [`wire::ChunkedMessage`] is admissible (spec.md §3)
/// and, if so, normalizes it into a [`Comment`].
///
/// Returns `None` for non-comment control/UI records — callers must drop
/// these silently rather than treat them as errors.
pub fn normalize(msg: &wire::ChunkedMessage) -> Option<Comment> {
    let meta = msg.meta.as_ref()?;
    if meta.id.is_empty() {
        return None;
    }
    let at = meta.at.as_ref()?;
    let live_id = meta.origin.as_ref()?.chat.as_ref()?.live_id;

    let chat = match msg.message.as_ref()?.data.as_ref()? {
        wire::message_data::Data::Chat(chat) => chat,
        wire::message_data::Data::OverflowedChat(chat) => chat,
    };
    let modifier = chat.modifier.as_ref()?;

    let color = match &modifier.color {
        Some(wire::modifier::Color::FullColor(c)) => Color::Rgb {
            r: c.r.min(255) as u8,
            g: c.g.min(255) as u8,
            b: c.b.min(255) as u8,
        },
        Some(wire::modifier::Color::NamedColor(c)) => {
            let named = wire::NamedColor::try_from(*c).unwrap_or(wire::NamedColor::White);
            Color::Named(named.into())
        }
        None => Color::Named(NamedColor::White),
    };

    Some(Comment {
        id: meta.id.clone(),
        at: timestamp_to_datetime(at),
        live_id,
        raw_user_id: chat.raw_user_id,
        hashed_user_id: chat.hashed_user_id.clone(),
        account_status: wire::AccountStatus::try_from(chat.account_status)
            .unwrap_or(wire::AccountStatus::Standard)
            .into(),
        no: chat.no,
        vpos: chat.vpos,
        position: wire::Position::try_from(modifier.position)
            .unwrap_or(wire::Position::Naka)
            .into(),
        size: wire::Size::try_from(modifier.size)
            .unwrap_or(wire::Size::Medium)
            .into(),
        color,
        font: wire::Font::try_from(modifier.font)
            .unwrap_or(wire::Font::Defont)
            .into(),
        opacity: wire::Opacity::try_from(modifier.opacity)
            .unwrap_or(wire::Opacity::Normal)
            .into(),
        content: chat.content.clone(),
    })
}
