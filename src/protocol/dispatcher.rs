//! Inbound dispatch, write-through and the acknowledged bulk send.

use heapless::{Deque, String};
use log::{debug, info, warn};

use super::codec::{LINE_CAP, LineAssembler, decode, encode};
use super::message::{Message, OverlayField, RemoteCall, TEXT_CAP};
use super::vars::{ARRAY_VARS, NUMERIC_VARS, TEXT_VARS, array_var, numeric_var, text_var};
use super::Action;
use crate::app::ports::{ConfigStore, LinkError, LinkPort};
use crate::app::state::{AnimParam, AnimTable, COLOR_SLOTS, ClockState, ColorChannel};
use crate::error::{ProtocolError, Result};
use crate::overlay::{MonthDay, OVERLAY_SLOTS, OverlayKind};
use crate::scheduler::calendar::ClockTime;
use crate::store::{self, Persist};
use crate::window::{WINDOW_SLOTS, WindowKind};

/// Bytes drained from the link per inbound poll.
const MAX_BYTES_PER_POLL: usize = LINE_CAP * 4;

const ACTION_QUEUE: usize = 16;

/// Result of applying one message to the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Outcome {
    pub persist: Option<Persist>,
    pub action: Option<Action>,
}

impl Outcome {
    const fn new(persist: Option<Persist>, action: Option<Action>) -> Self {
        Self { persist, action }
    }

    const fn action(action: Action) -> Self {
        Self::new(None, Some(action))
    }
}

fn slot(index: u8, len: usize) -> core::result::Result<usize, ProtocolError> {
    let i = usize::from(index);
    if i < len { Ok(i) } else { Err(ProtocolError::IndexOutOfRange) }
}

/// Apply one decoded message to `state`.
///
/// Out-of-range values are corrected rather than rejected; unknown ids
/// return [`ProtocolError::IndexOutOfRange`].
pub fn apply(state: &mut ClockState, msg: &Message) -> core::result::Result<Outcome, ProtocolError> {
    match msg {
        Message::Ack => Ok(Outcome::default()),

        Message::RemoteCall { id, .. } => {
            let call = RemoteCall::from_u8(*id).ok_or(ProtocolError::IndexOutOfRange)?;
            Ok(match call {
                RemoteCall::PowerOn | RemoteCall::PowerOff => {
                    state.settings.display_power = call == RemoteCall::PowerOn;
                    Outcome::action(Action::DisplayPower)
                }
                RemoteCall::AmbientOn | RemoteCall::AmbientOff => {
                    state.settings.ambient_power = call == RemoteCall::AmbientOn;
                    Outcome::action(Action::AmbientPower)
                }
                RemoteCall::GetNetTime => Outcome::action(Action::RequestNetTime),
                RemoteCall::SendAll => Outcome::action(Action::SendAll),
                RemoteCall::SaveAll => Outcome::new(Some(Persist::All), None),
                RemoteCall::DisplayTest => Outcome::action(Action::DisplayTest),
                RemoteCall::LearnIr => Outcome::action(Action::LearnIr),
                RemoteCall::StopAudio => Outcome::action(Action::StopAudio),
                RemoteCall::GetIcon | RemoteCall::GetWeather => {
                    warn!("protocol: outbound-only call {call:?} received, ignored");
                    Outcome::default()
                }
            })
        }

        Message::Numeric { id, value } => {
            let var = numeric_var(*id).ok_or(ProtocolError::IndexOutOfRange)?;
            let Some(set) = var.set else {
                warn!("protocol: {} is read-only", var.name);
                return Ok(Outcome::default());
            };
            let clamped = var.clamp(*value);
            if clamped != *value {
                warn!("protocol: {} = {} out of range, corrected to {}", var.name, value, clamped);
            }
            set(state, clamped);
            Ok(Outcome::new(var.persist, var.effect))
        }

        Message::NumericElement { id, element, value } => {
            let var = array_var(*id).ok_or(ProtocolError::IndexOutOfRange)?;
            let i = slot(*element, var.len)?;
            (var.set)(state, i, (*value).min(var.max));
            Ok(Outcome::new(Some(var.persist), None))
        }

        Message::Text { id, value } => {
            let var = text_var(*id).ok_or(ProtocolError::IndexOutOfRange)?;
            if !(var.set)(state, value) {
                warn!("protocol: text {id} too long, truncated to {}", (var.get)(state).len());
            }
            Ok(Outcome::new(var.persist, None))
        }

        Message::Timestamp { id, time } => match id {
            0 => Ok(Outcome::action(Action::NetTime(*time))),
            _ => Err(ProtocolError::IndexOutOfRange),
        },

        Message::DisplayColor { index, channel, value } => {
            let i = slot(*index, COLOR_SLOTS)?;
            state.colors[i].set_channel(*channel, *value);
            Ok(Outcome::new(Some(Persist::Color(*index)), Some(Action::Redraw)))
        }

        Message::AnimParam {
            table,
            index,
            param,
            value,
        } => {
            let slots = state.anim_table_mut(*table);
            let i = slot(*index, slots.len())?;
            slots[i].set(*param, *value);
            Ok(Outcome::new(Some(Persist::Anim(*table, *index)), Some(Action::Redraw)))
        }

        Message::Overlay { index, field } => {
            let i = slot(*index, OVERLAY_SLOTS)?;
            apply_overlay_field(state, i, field)
        }

        Message::WindowRow { table, slot: row, window } => {
            let i = slot(*row, WINDOW_SLOTS)?;
            let mut w = *window;
            if w.sanitize() {
                warn!("protocol: {table:?} row {i} out of range, corrected");
            }
            state.windows.table_mut(*table)[i] = w;
            Ok(Outcome::new(Some(Persist::WindowRow(*table, *row)), None))
        }

        Message::Game { id, value } => Ok(Outcome::action(Action::Game {
            id: *id,
            value: *value,
        })),
    }
}

fn apply_overlay_field(
    state: &mut ClockState,
    i: usize,
    field: &OverlayField,
) -> core::result::Result<Outcome, ProtocolError> {
    let o = &mut state.overlays[i];
    let dates_changed = Outcome::action(Action::OverlayDates);
    Ok(match field {
        OverlayField::Kind(k) => {
            o.kind = OverlayKind::from_u8(*k).unwrap_or_else(|| {
                warn!("protocol: overlay {i} kind {k} unknown, corrected to unused");
                OverlayKind::Unused
            });
            Outcome::default()
        }
        OverlayField::Interval(v) => {
            o.interval = *v;
            Outcome::default()
        }
        OverlayField::Duration(v) => {
            o.duration = *v;
            Outcome::default()
        }
        OverlayField::DateCode(v) => {
            o.date_code = *v;
            dates_changed
        }
        OverlayField::Days(v) => {
            o.days = *v;
            dates_changed
        }
        OverlayField::DateStart(md) => {
            o.date_start = if md.month > 12 || md.day > 31 {
                warn!("protocol: overlay {i} start {}/{} out of range, cleared", md.month, md.day);
                MonthDay::NONE
            } else {
                *md
            };
            dates_changed
        }
        OverlayField::Text(t) => {
            o.text = t.clone();
            Outcome::default()
        }
        // Only the active flag is written through; other fields wait for SaveAll.
        OverlayField::Active(a) => {
            o.active = *a;
            Outcome::new(Some(Persist::OverlayActive(i as u8)), None)
        }
    })
}

// ── Bulk snapshot ────────────────────────────────────────────

fn text_message(id: u8, value: &str) -> Message {
    let mut s: String<TEXT_CAP> = String::new();
    for c in value.chars() {
        if s.push(c).is_err() {
            break;
        }
    }
    Message::Text { id, value: s }
}

fn overlay_field(state: &ClockState, index: usize, n: usize) -> OverlayField {
    let o = &state.overlays[index];
    match n {
        0 => OverlayField::Kind(o.kind as u8),
        1 => OverlayField::Interval(o.interval),
        2 => OverlayField::Duration(o.duration),
        3 => OverlayField::DateCode(o.date_code),
        4 => OverlayField::Days(o.days),
        5 => OverlayField::DateStart(o.date_start),
        6 => OverlayField::Text(o.text.clone()),
        _ => OverlayField::Active(o.active),
    }
}

const OVERLAY_FIELDS: usize = 8;

/// The `n`-th line of a full state snapshot, in wire order: numeric vars,
/// array elements, strings, current time, colors, animation tables,
/// overlays, window rows.
pub fn bulk_message(state: &ClockState, now: &ClockTime, mut n: usize) -> Option<Message> {
    if let Some(var) = NUMERIC_VARS.get(n) {
        return Some(Message::Numeric {
            id: var.id,
            value: (var.get)(state),
        });
    }
    n -= NUMERIC_VARS.len();

    for var in &ARRAY_VARS {
        if n < var.len {
            return Some(Message::NumericElement {
                id: var.id,
                element: n as u8,
                value: (var.get)(state, n),
            });
        }
        n -= var.len;
    }

    if let Some(var) = TEXT_VARS.get(n) {
        return Some(text_message(var.id, (var.get)(state)));
    }
    n -= TEXT_VARS.len();

    if n == 0 {
        return Some(Message::Timestamp { id: 0, time: *now });
    }
    n -= 1;

    let colors = COLOR_SLOTS * ColorChannel::ALL.len();
    if n < colors {
        let (index, ch) = (n / ColorChannel::ALL.len(), n % ColorChannel::ALL.len());
        let channel = ColorChannel::ALL[ch];
        return Some(Message::DisplayColor {
            index: index as u8,
            channel,
            value: state.colors[index].channel(channel),
        });
    }
    n -= colors;

    for table in AnimTable::ALL {
        let slots = state.anim_table(table);
        let lines = slots.len() * AnimParam::ALL.len();
        if n < lines {
            let (index, p) = (n / AnimParam::ALL.len(), n % AnimParam::ALL.len());
            let param = AnimParam::ALL[p];
            return Some(Message::AnimParam {
                table,
                index: index as u8,
                param,
                value: slots[index].get(param),
            });
        }
        n -= lines;
    }

    let overlays = OVERLAY_SLOTS * OVERLAY_FIELDS;
    if n < overlays {
        let (index, field) = (n / OVERLAY_FIELDS, n % OVERLAY_FIELDS);
        return Some(Message::Overlay {
            index: index as u8,
            field: overlay_field(state, index, field),
        });
    }
    n -= overlays;

    for table in WindowKind::ALL {
        if n < WINDOW_SLOTS {
            return Some(Message::WindowRow {
                table,
                slot: n as u8,
                window: state.windows.table(table)[n],
            });
        }
        n -= WINDOW_SLOTS;
    }
    None
}

// ── Dispatcher ───────────────────────────────────────────────

/// Inbound line processing and outbound sends over the companion link.
#[derive(Debug)]
pub struct Dispatcher {
    assembler: LineAssembler,
    ack_poll_limit: u32,
    ack_received: bool,
    send_busy: bool,
    send_all_requested: bool,
    store_dirty: bool,
    net_time: Option<ClockTime>,
    actions: Deque<Action, ACTION_QUEUE>,
}

impl Dispatcher {
    pub const fn new(ack_poll_limit: u32) -> Self {
        Self {
            assembler: LineAssembler::new(),
            ack_poll_limit,
            ack_received: false,
            send_busy: false,
            send_all_requested: false,
            store_dirty: false,
            net_time: None,
            actions: Deque::new(),
        }
    }

    /// Drain pending link bytes, applying every complete line.
    /// Returns the number of lines handled.
    pub fn poll_inbound(
        &mut self,
        state: &mut ClockState,
        link: &mut dyn LinkPort,
        store: &mut dyn ConfigStore,
    ) -> usize {
        let mut lines = 0;
        for _ in 0..MAX_BYTES_PER_POLL {
            let Some(byte) = link.read_byte() else { break };
            match self.assembler.push(byte) {
                Some(Ok(line)) => {
                    lines += 1;
                    self.handle_line(&line, state, store);
                }
                Some(Err(e)) => warn!("protocol: {e}, line dropped"),
                None => {}
            }
        }
        lines
    }

    fn handle_line(&mut self, line: &str, state: &mut ClockState, store: &mut dyn ConfigStore) {
        let msg = match decode(line) {
            Ok(msg) => msg,
            Err(e) => {
                warn!("protocol: {e}: {line:?}");
                return;
            }
        };
        if !state.companion.up {
            info!("protocol: companion link up");
        }
        state.companion.up = true;

        if msg == Message::Ack {
            self.ack_received = true;
            return;
        }
        debug!("protocol: <- {line}");

        let outcome = match apply(state, &msg) {
            Ok(o) => o,
            Err(e) => {
                warn!("protocol: {e}: {line:?}");
                return;
            }
        };
        if let Some(what) = outcome.persist {
            if store.is_up() {
                match store::write_through(store, state, what) {
                    Ok(()) => self.store_dirty = true,
                    Err(e) => warn!("protocol: write-through of {what:?} failed: {e}"),
                }
            } else {
                debug!("protocol: store down, {what:?} not persisted");
            }
        }
        match outcome.action {
            None => {}
            Some(Action::SendAll) if self.send_busy => {
                warn!("protocol: send-all requested while sending, dropped");
            }
            Some(Action::SendAll) => self.send_all_requested = true,
            Some(Action::NetTime(t)) => self.net_time = Some(t),
            Some(action) => {
                if self.actions.push_back(action).is_err() {
                    warn!("protocol: action queue full, {action:?} dropped");
                }
            }
        }
    }

    /// Next device-side effect for the main loop.
    pub fn next_action(&mut self) -> Option<Action> {
        self.actions.pop_front()
    }

    /// Network time received since the last call.
    pub fn take_net_time(&mut self) -> Option<ClockTime> {
        self.net_time.take()
    }

    /// Whether a write-through happened since the last call.
    pub fn take_store_dirty(&mut self) -> bool {
        core::mem::take(&mut self.store_dirty)
    }

    pub fn request_send_all(&mut self) {
        self.send_all_requested = true;
    }

    pub fn take_send_all_request(&mut self) -> bool {
        core::mem::take(&mut self.send_all_requested)
    }

    pub const fn is_sending(&self) -> bool {
        self.send_busy
    }

    /// Send one line without waiting for an acknowledgement.
    pub fn send(&mut self, link: &mut dyn LinkPort, msg: &Message) -> Result<()> {
        let line = encode(msg)?;
        debug!("protocol: -> {line}");
        link.write_line(&line)?;
        Ok(())
    }

    /// Send one line and wait for `OK`, processing inbound lines while
    /// waiting.  On timeout the companion is marked down.
    pub fn send_acked(
        &mut self,
        msg: &Message,
        state: &mut ClockState,
        link: &mut dyn LinkPort,
        store: &mut dyn ConfigStore,
    ) -> Result<()> {
        self.ack_received = false;
        self.send(link, msg)?;
        for _ in 0..self.ack_poll_limit {
            self.poll_inbound(state, link, store);
            if self.ack_received {
                return Ok(());
            }
        }
        warn!("protocol: no acknowledgement, companion link down");
        state.companion.up = false;
        Err(LinkError::AckTimeout.into())
    }

    /// Push the complete state snapshot, one acknowledged line at a time.
    /// Returns the number of lines sent.
    pub fn send_all(
        &mut self,
        state: &mut ClockState,
        now: &ClockTime,
        link: &mut dyn LinkPort,
        store: &mut dyn ConfigStore,
    ) -> Result<usize> {
        if self.send_busy {
            return Err(LinkError::Busy.into());
        }
        self.send_busy = true;
        info!("protocol: sending full state");
        let mut sent = 0;
        let result = loop {
            let Some(msg) = bulk_message(state, now, sent) else {
                break Ok(sent);
            };
            if let Err(e) = self.send_acked(&msg, state, link, store) {
                break Err(e);
            }
            sent += 1;
        };
        self.send_busy = false;
        match &result {
            Ok(n) => info!("protocol: full state sent ({n} lines)"),
            Err(e) => warn!("protocol: full state aborted after {sent} lines: {e}"),
        }
        result
    }
}
