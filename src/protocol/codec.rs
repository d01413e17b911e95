//! Line codec for the companion protocol.
//!
//! Wire format (one ASCII line per message):
//! ```text
//! ┌──────────┬───────────┬──────────────────────────────────────┐
//! │ Tag 1-2  │ Index 2hx │ Payload                              │
//! │ R N n S… │ 00..FF    │ 2/4/8 hex, YYYYMMDDhhmmss, free text │
//! └──────────┴───────────┴──────────────────────────────────────┘
//! ```
//!
//! Every tag is one row of [`ROUTES`]: its payload [`Shape`] and a typed
//! constructor.  Encoding goes the other way through the same tags, so
//! `decode(encode(m)) == m` for every message.  Hex is emitted upper case
//! and accepted in either case.

use core::fmt::Write as _;

use heapless::{String, Vec};

use super::message::{Message, OverlayField, TEXT_CAP};
use crate::app::state::{AnimParam, AnimTable, ColorChannel};
use crate::error::ProtocolError;
use crate::overlay::MonthDay;
use crate::scheduler::calendar::ClockTime;
use crate::window::{TimeWindow, WindowKind};

/// Longest line, excluding the newline.
pub const LINE_CAP: usize = 128;

/// Acknowledgement line.
pub const ACK: &str = "OK";

// ── Line assembly ─────────────────────────────────────────────

/// Accumulates link bytes into lines.
///
/// `\r` is dropped; a line longer than [`LINE_CAP`] is discarded up to
/// the next newline and reported once as [`ProtocolError::LineTooLong`].
#[derive(Debug, Default)]
pub struct LineAssembler {
    buf: Vec<u8, LINE_CAP>,
    overflow: bool,
}

impl LineAssembler {
    pub const fn new() -> Self {
        Self {
            buf: Vec::new(),
            overflow: false,
        }
    }

    /// Feed one byte. Returns a completed non-empty line.
    pub fn push(&mut self, byte: u8) -> Option<Result<String<LINE_CAP>, ProtocolError>> {
        match byte {
            b'\r' => None,
            b'\n' => {
                if self.overflow {
                    self.overflow = false;
                    self.buf.clear();
                    return Some(Err(ProtocolError::LineTooLong));
                }
                if self.buf.is_empty() {
                    return None;
                }
                let line = core::mem::take(&mut self.buf);
                Some(String::from_utf8(line).map_err(|_| ProtocolError::BadPayload))
            }
            _ if self.overflow => None,
            _ => {
                if self.buf.push(byte).is_err() {
                    self.overflow = true;
                }
                None
            }
        }
    }

    pub fn reset(&mut self) {
        self.buf.clear();
        self.overflow = false;
    }
}

// ── Routes ────────────────────────────────────────────────────

/// Payload layout following the index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    Hex2,
    Hex4,
    Hex8,
    /// 14 decimal digits, `YYYYMMDDhhmmss`.
    Timestamp,
    /// Everything up to the end of the line.
    Text,
}

/// A parsed payload, before it is given a meaning by its route.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Payload<'a> {
    Byte(u8),
    Word(u16),
    Long(u32),
    Time(ClockTime),
    Text(&'a str),
}

impl Payload<'_> {
    fn byte(self) -> Result<u8, ProtocolError> {
        match self {
            Self::Byte(b) => Ok(b),
            _ => Err(ProtocolError::BadPayload),
        }
    }

    fn word(self) -> Result<u16, ProtocolError> {
        match self {
            Self::Word(w) => Ok(w),
            _ => Err(ProtocolError::BadPayload),
        }
    }

    fn long(self) -> Result<u32, ProtocolError> {
        match self {
            Self::Long(l) => Ok(l),
            _ => Err(ProtocolError::BadPayload),
        }
    }

    fn time(self) -> Result<ClockTime, ProtocolError> {
        match self {
            Self::Time(t) => Ok(t),
            _ => Err(ProtocolError::BadPayload),
        }
    }

    fn text<const N: usize>(self) -> Result<String<N>, ProtocolError> {
        match self {
            Self::Text(t) => String::try_from(t).map_err(|_| ProtocolError::BadPayload),
            _ => Err(ProtocolError::BadPayload),
        }
    }
}

type Build = fn(u8, Payload<'_>) -> Result<Message, ProtocolError>;

/// One protocol tag: its payload shape and the constructor for its message.
pub struct Route {
    pub tag: &'static str,
    pub shape: Shape,
    build: Build,
}

fn color(index: u8, channel: ColorChannel, p: Payload<'_>) -> Result<Message, ProtocolError> {
    Ok(Message::DisplayColor {
        index,
        channel,
        value: p.byte()?,
    })
}

fn anim(table: AnimTable, index: u8, param: AnimParam, p: Payload<'_>) -> Result<Message, ProtocolError> {
    Ok(Message::AnimParam {
        table,
        index,
        param,
        value: p.byte()?,
    })
}

fn overlay(index: u8, field: OverlayField) -> Result<Message, ProtocolError> {
    Ok(Message::Overlay { index, field })
}

fn window(table: WindowKind, slot: u8, p: Payload<'_>) -> Result<Message, ProtocolError> {
    Ok(Message::WindowRow {
        table,
        slot,
        window: unpack_window(p.long()?),
    })
}

#[rustfmt::skip]
pub static ROUTES: [Route; 27] = [
    Route { tag: "R", shape: Shape::Text, build: |id, p| Ok(Message::RemoteCall { id, args: p.text::<TEXT_CAP>()? }) },
    Route { tag: "N", shape: Shape::Hex4, build: |id, p| Ok(Message::Numeric { id, value: p.word()? }) },
    Route { tag: "n", shape: Shape::Hex4, build: |id, p| {
        let [element, value] = p.word()?.to_be_bytes();
        Ok(Message::NumericElement { id, element, value })
    } },
    Route { tag: "S", shape: Shape::Text, build: |id, p| Ok(Message::Text { id, value: p.text::<TEXT_CAP>()? }) },
    Route { tag: "T", shape: Shape::Timestamp, build: |id, p| Ok(Message::Timestamp { id, time: p.time()? }) },

    Route { tag: "DR", shape: Shape::Hex2, build: |i, p| color(i, ColorChannel::Red, p) },
    Route { tag: "DG", shape: Shape::Hex2, build: |i, p| color(i, ColorChannel::Green, p) },
    Route { tag: "DB", shape: Shape::Hex2, build: |i, p| color(i, ColorChannel::Blue, p) },
    Route { tag: "DW", shape: Shape::Hex2, build: |i, p| color(i, ColorChannel::White, p) },

    Route { tag: "AD", shape: Shape::Hex2, build: |i, p| anim(AnimTable::Animation, i, AnimParam::Duration, p) },
    Route { tag: "AF", shape: Shape::Hex2, build: |i, p| anim(AnimTable::Animation, i, AnimParam::Flags, p) },
    Route { tag: "CD", shape: Shape::Hex2, build: |i, p| anim(AnimTable::ColorAnimation, i, AnimParam::Duration, p) },
    Route { tag: "CF", shape: Shape::Hex2, build: |i, p| anim(AnimTable::ColorAnimation, i, AnimParam::Flags, p) },
    Route { tag: "MD", shape: Shape::Hex2, build: |i, p| anim(AnimTable::AmbientMode, i, AnimParam::Duration, p) },
    Route { tag: "MF", shape: Shape::Hex2, build: |i, p| anim(AnimTable::AmbientMode, i, AnimParam::Flags, p) },

    Route { tag: "OT", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::Kind(p.byte()?)) },
    Route { tag: "OI", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::Interval(p.byte()?)) },
    Route { tag: "OU", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::Duration(p.byte()?)) },
    Route { tag: "OC", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::DateCode(p.byte()?)) },
    Route { tag: "ON", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::Days(p.byte()?)) },
    Route { tag: "OA", shape: Shape::Hex2, build: |i, p| overlay(i, OverlayField::Active(p.byte()? != 0)) },
    Route { tag: "OS", shape: Shape::Hex4, build: |i, p| {
        let [month, day] = p.word()?.to_be_bytes();
        overlay(i, OverlayField::DateStart(MonthDay::new(month, day)))
    } },
    Route { tag: "OX", shape: Shape::Text, build: |i, p| overlay(i, OverlayField::Text(p.text()?)) },

    Route { tag: "t", shape: Shape::Hex8, build: |i, p| window(WindowKind::Night, i, p) },
    Route { tag: "a", shape: Shape::Hex8, build: |i, p| window(WindowKind::AmbientNight, i, p) },
    Route { tag: "l", shape: Shape::Hex8, build: |i, p| window(WindowKind::Alarm, i, p) },

    Route { tag: "G", shape: Shape::Hex2, build: |id, p| Ok(Message::Game { id, value: p.byte()? }) },
];

/// Route whose tag starts `line`. Tags are prefix-free.
pub fn find_route(line: &str) -> Option<&'static Route> {
    ROUTES.iter().find(|r| line.starts_with(r.tag))
}

// ── Window row packing ───────────────────────────────────────

const WINDOW_ACTIVE: u32 = 1 << 0;
const WINDOW_DIRECTION: u32 = 1 << 1;

/// `flags << 24 | (from << 4 | to) << 16 | minutes`.
pub fn pack_window(w: &TimeWindow) -> u32 {
    let mut flags = 0;
    if w.active {
        flags |= WINDOW_ACTIVE;
    }
    if w.direction {
        flags |= WINDOW_DIRECTION;
    }
    let days = u32::from(w.from & 0x0F) << 4 | u32::from(w.to & 0x0F);
    flags << 24 | days << 16 | u32::from(w.minutes)
}

pub fn unpack_window(v: u32) -> TimeWindow {
    let flags = v >> 24;
    let days = (v >> 16) as u8;
    TimeWindow {
        active: flags & WINDOW_ACTIVE != 0,
        direction: flags & WINDOW_DIRECTION != 0,
        from: days >> 4,
        to: days & 0x0F,
        minutes: v as u16,
    }
}

// ── Decoding ──────────────────────────────────────────────────

fn parse_hex(s: &str) -> Option<u32> {
    if s.is_empty() || s.len() > 8 || !s.bytes().all(|b| b.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(s, 16).ok()
}

fn parse_decimal(s: &str) -> Option<u16> {
    if !s.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    s.parse().ok()
}

fn parse_timestamp(s: &str) -> Option<ClockTime> {
    if s.len() != 14 || !s.is_ascii() {
        return None;
    }
    let field = |range: core::ops::Range<usize>| parse_decimal(&s[range]);
    let year = field(0..4)?;
    let month = field(4..6)? as u8;
    let day = field(6..8)? as u8;
    let hour = field(8..10)? as u8;
    let minute = field(10..12)? as u8;
    let second = field(12..14)? as u8;
    let t = ClockTime::new(year, month, day, hour, minute, second);
    t.is_valid().then_some(t)
}

fn parse_payload(shape: Shape, s: &str) -> Result<Payload<'_>, ProtocolError> {
    let bad = ProtocolError::BadPayload;
    match shape {
        Shape::Hex2 if s.len() == 2 => parse_hex(s).map(|v| Payload::Byte(v as u8)).ok_or(bad),
        Shape::Hex4 if s.len() == 4 => parse_hex(s).map(|v| Payload::Word(v as u16)).ok_or(bad),
        Shape::Hex8 if s.len() == 8 => parse_hex(s).map(Payload::Long).ok_or(bad),
        Shape::Timestamp => parse_timestamp(s).map(Payload::Time).ok_or(bad),
        Shape::Text => Ok(Payload::Text(s)),
        _ => Err(bad),
    }
}

/// Decode one line (without its newline).
pub fn decode(line: &str) -> Result<Message, ProtocolError> {
    let line = line.trim_end_matches(['\r', '\n']);
    if line.is_empty() {
        return Err(ProtocolError::Empty);
    }
    if line == ACK {
        return Ok(Message::Ack);
    }
    let route = find_route(line).ok_or(ProtocolError::UnknownTag)?;
    let rest = &line[route.tag.len()..];
    let index = rest
        .get(..2)
        .and_then(parse_hex)
        .ok_or(ProtocolError::BadIndex)? as u8;
    let payload = parse_payload(route.shape, &rest[2..])?;
    (route.build)(index, payload)
}

// ── Encoding ──────────────────────────────────────────────────

const fn color_tag(ch: ColorChannel) -> &'static str {
    match ch {
        ColorChannel::Red => "DR",
        ColorChannel::Green => "DG",
        ColorChannel::Blue => "DB",
        ColorChannel::White => "DW",
    }
}

const fn anim_tag(table: AnimTable, param: AnimParam) -> &'static str {
    match (table, param) {
        (AnimTable::Animation, AnimParam::Duration) => "AD",
        (AnimTable::Animation, AnimParam::Flags) => "AF",
        (AnimTable::ColorAnimation, AnimParam::Duration) => "CD",
        (AnimTable::ColorAnimation, AnimParam::Flags) => "CF",
        (AnimTable::AmbientMode, AnimParam::Duration) => "MD",
        (AnimTable::AmbientMode, AnimParam::Flags) => "MF",
    }
}

const fn window_tag(kind: WindowKind) -> &'static str {
    match kind {
        WindowKind::Night => "t",
        WindowKind::AmbientNight => "a",
        WindowKind::Alarm => "l",
    }
}

fn overlay_parts(field: &OverlayField) -> (&'static str, Payload<'_>) {
    match field {
        OverlayField::Kind(v) => ("OT", Payload::Byte(*v)),
        OverlayField::Interval(v) => ("OI", Payload::Byte(*v)),
        OverlayField::Duration(v) => ("OU", Payload::Byte(*v)),
        OverlayField::DateCode(v) => ("OC", Payload::Byte(*v)),
        OverlayField::Days(v) => ("ON", Payload::Byte(*v)),
        OverlayField::Active(v) => ("OA", Payload::Byte(u8::from(*v))),
        OverlayField::DateStart(md) => ("OS", Payload::Word(u16::from_be_bytes([md.month, md.day]))),
        OverlayField::Text(t) => ("OX", Payload::Text(t)),
    }
}

/// Tag, index and payload of a message; `None` for the acknowledgement.
pub fn route_parts(msg: &Message) -> Option<(&'static str, u8, Payload<'_>)> {
    Some(match msg {
        Message::Ack => return None,
        Message::RemoteCall { id, args } => ("R", *id, Payload::Text(args)),
        Message::Numeric { id, value } => ("N", *id, Payload::Word(*value)),
        Message::NumericElement { id, element, value } => {
            ("n", *id, Payload::Word(u16::from_be_bytes([*element, *value])))
        }
        Message::Text { id, value } => ("S", *id, Payload::Text(value)),
        Message::Timestamp { id, time } => ("T", *id, Payload::Time(*time)),
        Message::DisplayColor { index, channel, value } => (color_tag(*channel), *index, Payload::Byte(*value)),
        Message::AnimParam {
            table,
            index,
            param,
            value,
        } => (anim_tag(*table, *param), *index, Payload::Byte(*value)),
        Message::Overlay { index, field } => {
            let (tag, payload) = overlay_parts(field);
            (tag, *index, payload)
        }
        Message::WindowRow { table, slot, window } => {
            (window_tag(*table), *slot, Payload::Long(pack_window(window)))
        }
        Message::Game { id, value } => ("G", *id, Payload::Byte(*value)),
    })
}

/// Encode a message as one line (without the newline).
pub fn encode(msg: &Message) -> Result<String<LINE_CAP>, ProtocolError> {
    let mut out = String::new();
    let Some((tag, index, payload)) = route_parts(msg) else {
        out.push_str(ACK).map_err(|_| ProtocolError::Encode)?;
        return Ok(out);
    };
    let res = match payload {
        Payload::Byte(b) => write!(out, "{tag}{index:02X}{b:02X}"),
        Payload::Word(w) => write!(out, "{tag}{index:02X}{w:04X}"),
        Payload::Long(l) => write!(out, "{tag}{index:02X}{l:08X}"),
        Payload::Time(t) => {
            if t.year > 9999 {
                return Err(ProtocolError::Encode);
            }
            write!(
                out,
                "{tag}{index:02X}{:04}{:02}{:02}{:02}{:02}{:02}",
                t.year, t.month, t.day, t.hour, t.minute, t.second
            )
        }
        Payload::Text(t) => {
            if t.contains(['\r', '\n']) {
                return Err(ProtocolError::Encode);
            }
            write!(out, "{tag}{index:02X}{t}")
        }
    };
    res.map_err(|_| ProtocolError::Encode)?;
    Ok(out)
}
