//! Typed companion-protocol messages.

use heapless::String;

use crate::app::state::{AnimParam, AnimTable, ColorChannel};
use crate::overlay::{MonthDay, OVERLAY_TEXT_LEN};
use crate::scheduler::calendar::ClockTime;
use crate::window::{TimeWindow, WindowKind};

/// Longest free-text payload.
pub const TEXT_CAP: usize = 64;

/// Remote-call identifiers (`R` lines).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum RemoteCall {
    PowerOn = 0,
    PowerOff = 1,
    AmbientOn = 2,
    AmbientOff = 3,
    /// Outbound: ask the companion for network time; inbound: request it now.
    GetNetTime = 4,
    SendAll = 5,
    SaveAll = 6,
    DisplayTest = 7,
    LearnIr = 8,
    StopAudio = 9,
    /// Outbound only.
    GetIcon = 10,
    /// Outbound only.
    GetWeather = 11,
}

impl RemoteCall {
    pub const fn from_u8(v: u8) -> Option<Self> {
        Some(match v {
            0 => Self::PowerOn,
            1 => Self::PowerOff,
            2 => Self::AmbientOn,
            3 => Self::AmbientOff,
            4 => Self::GetNetTime,
            5 => Self::SendAll,
            6 => Self::SaveAll,
            7 => Self::DisplayTest,
            8 => Self::LearnIr,
            9 => Self::StopAudio,
            10 => Self::GetIcon,
            11 => Self::GetWeather,
            _ => return None,
        })
    }
}

/// One overlay field as carried by an `O` line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverlayField {
    Kind(u8),
    Interval(u8),
    Duration(u8),
    DateCode(u8),
    Days(u8),
    DateStart(MonthDay),
    Text(String<OVERLAY_TEXT_LEN>),
    Active(bool),
}

/// One protocol line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Message {
    /// The bare `OK` acknowledgement.
    Ack,
    RemoteCall { id: u8, args: String<TEXT_CAP> },
    Numeric { id: u8, value: u16 },
    NumericElement { id: u8, element: u8, value: u8 },
    Text { id: u8, value: String<TEXT_CAP> },
    Timestamp { id: u8, time: ClockTime },
    DisplayColor { index: u8, channel: ColorChannel, value: u8 },
    /// Animation, color-animation or ambient-mode parameter.
    AnimParam { table: AnimTable, index: u8, param: AnimParam, value: u8 },
    Overlay { index: u8, field: OverlayField },
    WindowRow { table: WindowKind, slot: u8, window: TimeWindow },
    Game { id: u8, value: u8 },
}

impl Message {
    /// A remote call without arguments.
    pub fn call(call: RemoteCall) -> Self {
        Self::RemoteCall {
            id: call as u8,
            args: String::new(),
        }
    }

    /// A remote call with a text argument; over-long text is truncated.
    pub fn call_with(call: RemoteCall, arg: &str) -> Self {
        let mut args = String::new();
        for c in arg.chars() {
            if args.push(c).is_err() {
                break;
            }
        }
        Self::RemoteCall {
            id: call as u8,
            args,
        }
    }
}
