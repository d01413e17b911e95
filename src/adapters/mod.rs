//! Adapters: concrete implementations of the hexagonal port traits.
//!
//! | Adapter        | Implements    | Connects to                        |
//! |----------------|---------------|------------------------------------|
//! | `mem_store`    | ConfigStore   | Byte-addressable EEPROM image      |
//! | `cached_store` | ConfigStore   | Page cache over another store      |
//! | `ds3231`       | RtcPort       | DS3231 over `embedded_hal` I²C     |
//! | `pin_button`   | ButtonPort    | Active-low `embedded_hal` input    |
//! | `console_log`  | `log::Log`    | stderr (simulator)                 |
//! | `sim`          | all ports     | stdin/stdout link, simulated parts |

pub mod cached_store;
pub mod console_log;
pub mod ds3231;
pub mod mem_store;
pub mod pin_button;
#[cfg(feature = "sim")]
pub mod sim;
