//! Persistence: mirrors the persisted parts of [`ClockState`] into the
//! configuration store.
//!
//! Inbound protocol changes are written through immediately via
//! [`write_through`]; [`load`] validates every record at boot and writes
//! back whatever it had to correct.

pub mod layout;

use log::{debug, info, warn};

use crate::app::ports::{ConfigStore, StorageError};
use crate::app::state::{AnimTable, ClockState, HOURS, MAX_BRIGHTNESS, TEXT_LEN};
use crate::error::Result;
use crate::overlay::OVERLAY_SLOTS;
use crate::protocol::vars::clamp_numeric;
use crate::window::{WINDOW_SLOTS, WindowKind, sanitize_table};
use layout::*;

/// Which persisted record a change touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persist {
    Settings,
    Color(u8),
    Anim(AnimTable, u8),
    WindowRow(WindowKind, u8),
    WindowTable(WindowKind),
    HourlyBrightness,
    TimeServer,
    IrCodes,
    /// Only the active flag of one overlay.
    OverlayActive(u8),
    Overlay(u8),
    All,
}

/// What [`load`] had to do besides reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    /// Version tag mismatched; defaults were written.
    pub defaults_written: bool,
    /// Records rewritten after range correction.
    pub rewritten: u8,
}

fn read_array<const N: usize>(store: &mut dyn ConfigStore, offset: u16) -> Result<[u8; N]> {
    let mut buf = [0u8; N];
    store.read(offset, &mut buf)?;
    Ok(buf)
}

/// Populate `state` from the store, correcting out-of-range records.
pub fn load(store: &mut dyn ConfigStore, state: &mut ClockState) -> Result<LoadReport> {
    if !store.is_up() {
        return Err(StorageError::NotReady.into());
    }
    let mut report = LoadReport::default();

    let version = u32::from_le_bytes(read_array(store, VERSION)?);
    if version != STORE_VERSION {
        warn!("store: version {version:#010x} != {STORE_VERSION:#010x}, writing defaults");
        save_all(store, state)?;
        report.defaults_written = true;
        return Ok(report);
    }

    state.settings = decode_settings(&read_array(store, SETTINGS)?);
    if clamp_numeric(state) {
        write_through(store, state, Persist::Settings)?;
        report.rewritten += 1;
    }

    for (i, c) in state.colors.iter_mut().enumerate() {
        *c = decode_color(&read_array(store, color_offset(i))?);
    }
    for table in AnimTable::ALL {
        for (i, slot) in state.anim_table_mut(table).iter_mut().enumerate() {
            *slot = decode_anim(&read_array(store, anim_offset(table, i))?);
        }
    }

    for kind in WindowKind::ALL {
        let table = state.windows.table_mut(kind);
        for (slot, w) in table.iter_mut().enumerate() {
            *w = decode_window(&read_array(store, window_offset(kind, slot))?);
        }
        if sanitize_table(table) {
            warn!("store: {kind:?} table had out-of-range rows, rewriting");
            write_through(store, state, Persist::WindowTable(kind))?;
            report.rewritten += 1;
        }
    }

    state.hourly_brightness = read_array::<HOURS>(store, HOURLY)?;
    let mut hourly_fixed = false;
    for level in &mut state.hourly_brightness {
        if *level > MAX_BRIGHTNESS {
            *level = 0;
            hourly_fixed = true;
        }
    }
    if hourly_fixed {
        write_through(store, state, Persist::HourlyBrightness)?;
        report.rewritten += 1;
    }

    state.time_server = decode_text(&read_array::<TEXT_LEN>(store, TIME_SERVER)?);

    for (i, code) in state.ir_codes.iter_mut().enumerate() {
        *code = decode_ir(&read_array(store, IR_CODES + (i * IR_LEN) as u16)?);
    }

    for i in 0..OVERLAY_SLOTS {
        let (overlay, corrected) = decode_overlay(&read_array(store, overlay_offset(i))?);
        state.overlays[i] = overlay;
        if corrected {
            write_through(store, state, Persist::Overlay(i as u8))?;
            report.rewritten += 1;
        }
    }

    info!(
        "store: loaded (rewritten={}, time_server={:?})",
        report.rewritten, state.time_server
    );
    Ok(report)
}

/// Write one record of `state` to the store.
pub fn write_through(store: &mut dyn ConfigStore, state: &ClockState, what: Persist) -> Result<()> {
    debug!("store: write {what:?}");
    match what {
        Persist::Settings => store.write(SETTINGS, &encode_settings(&state.settings))?,
        Persist::Color(i) => {
            let c = state.colors.get(usize::from(i)).ok_or(StorageError::OutOfBounds)?;
            store.write(color_offset(usize::from(i)), &encode_color(c))?;
        }
        Persist::Anim(table, i) => {
            let slot = state
                .anim_table(table)
                .get(usize::from(i))
                .ok_or(StorageError::OutOfBounds)?;
            store.write(anim_offset(table, usize::from(i)), &encode_anim(slot))?;
        }
        Persist::WindowRow(kind, slot) => {
            let w = state
                .windows
                .table(kind)
                .get(usize::from(slot))
                .ok_or(StorageError::OutOfBounds)?;
            store.write(window_offset(kind, usize::from(slot)), &encode_window(w))?;
        }
        Persist::WindowTable(kind) => {
            let mut buf = [0u8; WINDOW_SLOTS * WINDOW_LEN];
            for (chunk, w) in buf.chunks_exact_mut(WINDOW_LEN).zip(state.windows.table(kind)) {
                chunk.copy_from_slice(&encode_window(w));
            }
            store.write(window_table_offset(kind), &buf)?;
        }
        Persist::HourlyBrightness => store.write(HOURLY, &state.hourly_brightness)?,
        Persist::TimeServer => {
            store.write(TIME_SERVER, &encode_text::<TEXT_LEN>(&state.time_server))?;
        }
        Persist::IrCodes => {
            for (i, code) in state.ir_codes.iter().enumerate() {
                store.write(IR_CODES + (i * IR_LEN) as u16, &encode_ir(*code))?;
            }
        }
        Persist::OverlayActive(i) => {
            let o = state.overlays.get(usize::from(i)).ok_or(StorageError::OutOfBounds)?;
            // Active flag is byte 7 of the record.
            store.write(overlay_offset(usize::from(i)) + 7, &[u8::from(o.active)])?;
        }
        Persist::Overlay(i) => {
            let o = state.overlays.get(usize::from(i)).ok_or(StorageError::OutOfBounds)?;
            store.write(overlay_offset(usize::from(i)), &encode_overlay(o))?;
        }
        Persist::All => save_all(store, state)?,
    }
    Ok(())
}

/// Write every record, then the version tag.
pub fn save_all(store: &mut dyn ConfigStore, state: &ClockState) -> Result<()> {
    write_through(store, state, Persist::Settings)?;
    for i in 0..state.colors.len() {
        write_through(store, state, Persist::Color(i as u8))?;
    }
    for table in AnimTable::ALL {
        for i in 0..state.anim_table(table).len() {
            write_through(store, state, Persist::Anim(table, i as u8))?;
        }
    }
    for kind in WindowKind::ALL {
        write_through(store, state, Persist::WindowTable(kind))?;
    }
    write_through(store, state, Persist::HourlyBrightness)?;
    write_through(store, state, Persist::TimeServer)?;
    write_through(store, state, Persist::IrCodes)?;
    for i in 0..OVERLAY_SLOTS {
        write_through(store, state, Persist::Overlay(i as u8))?;
    }
    store.write(VERSION, &STORE_VERSION.to_le_bytes())?;
    info!("store: full save");
    Ok(())
}
