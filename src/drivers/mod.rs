//! Loop-side peripheral helpers: input conditioning, learned tables and
//! the audio queue.  Hardware access stays behind the port traits.

pub mod audio_queue;
pub mod brightness;
pub mod button;
pub mod ir;
