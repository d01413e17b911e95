//! FIFO of audio tracks for the playback module.
//!
//! The module plays one track at a time and reports completion through
//! [`AudioPort::poll_finished`]; the queue starts the next track then.

use heapless::Deque;
use log::{debug, warn};

use crate::app::ports::AudioPort;

pub const QUEUE_LEN: usize = 8;

/// Folder layout on the module's storage.
pub const ALARM_FOLDER: u8 = 1;
pub const BELL_FOLDER: u8 = 2;
pub const HOUR_FOLDER: u8 = 3;
pub const MINUTE_FOLDER: u8 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Track {
    pub folder: u8,
    pub track: u8,
}

impl Track {
    pub const fn new(folder: u8, track: u8) -> Self {
        Self { folder, track }
    }

    /// `index` is the 1-based alarm slot.
    pub const fn alarm(index: u8) -> Self {
        Self::new(ALARM_FOLDER, index)
    }

    /// Hourly chime: track 1..=12 by the 12-hour clock.
    pub const fn bell(hour: u8) -> Self {
        let h = hour % 12;
        Self::new(BELL_FOLDER, if h == 0 { 12 } else { h })
    }
}

/// Spoken time: hour then minute, tracks numbered from 1.
pub const fn speech(hour: u8, minute: u8) -> [Track; 2] {
    [Track::new(HOUR_FOLDER, hour + 1), Track::new(MINUTE_FOLDER, minute + 1)]
}

#[derive(Debug, Default)]
pub struct AudioQueue {
    queue: Deque<Track, QUEUE_LEN>,
    playing: bool,
}

impl AudioQueue {
    pub const fn new() -> Self {
        Self {
            queue: Deque::new(),
            playing: false,
        }
    }

    /// Returns `false` if the queue is full and the track was dropped.
    pub fn enqueue(&mut self, track: Track) -> bool {
        if self.queue.push_back(track).is_err() {
            warn!("audio: queue full, {}/{} dropped", track.folder, track.track);
            return false;
        }
        true
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub const fn is_playing(&self) -> bool {
        self.playing
    }

    /// Start the next track once the current one has finished.
    pub fn service(&mut self, audio: &mut dyn AudioPort) {
        if !audio.is_up() {
            return;
        }
        if self.playing {
            if !audio.poll_finished() {
                return;
            }
            self.playing = false;
        }
        let Some(next) = self.queue.pop_front() else {
            return;
        };
        match audio.play_folder(next.folder, next.track) {
            Ok(()) => {
                debug!("audio: playing {}/{}", next.folder, next.track);
                self.playing = true;
            }
            Err(e) => warn!("audio: {}/{} failed: {e}", next.folder, next.track),
        }
    }

    /// Drop everything queued and stop the module.
    pub fn stop(&mut self, audio: &mut dyn AudioPort) {
        self.queue.clear();
        self.playing = false;
        if audio.is_up() {
            audio.stop();
        }
    }
}
