//! DS3231 real-time clock over I²C.
//!
//! Time registers 0x00..=0x06 are BCD (seconds, minutes, hours in 24 h
//! mode, weekday 1..=7, date, month, two-digit year).  The die temperature
//! is the signed whole-degree register 0x11.

use embedded_hal::i2c::I2c;
use log::{debug, info};

use crate::app::ports::{DeviceError, RtcPort};
use crate::scheduler::calendar::ClockTime;

const ADDR: u8 = 0x68;
const REG_TIME: u8 = 0x00;
const REG_TEMP_MSB: u8 = 0x11;
const CENTURY: u16 = 2000;

const fn from_bcd(v: u8) -> u8 {
    (v >> 4) * 10 + (v & 0x0F)
}

const fn to_bcd(v: u8) -> u8 {
    (v / 10) << 4 | (v % 10)
}

pub struct Ds3231<I2C> {
    i2c: I2C,
    up: bool,
}

impl<I2C: I2c> Ds3231<I2C> {
    /// Probe the chip; an absent chip leaves the adapter down.
    pub fn new(i2c: I2C) -> Self {
        let mut rtc = Self { i2c, up: false };
        let mut probe = [0u8; 1];
        rtc.up = rtc.i2c.write_read(ADDR, &[REG_TIME], &mut probe).is_ok();
        if rtc.up {
            info!("rtc: DS3231 present");
        } else {
            debug!("rtc: no DS3231 on the bus");
        }
        rtc
    }

    pub fn release(self) -> I2C {
        self.i2c
    }
}

/// Decode the seven time registers.
pub fn decode_registers(r: &[u8; 7]) -> Result<ClockTime, DeviceError> {
    let t = ClockTime::new(
        CENTURY + u16::from(from_bcd(r[6])),
        from_bcd(r[5] & 0x1F),
        from_bcd(r[4] & 0x3F),
        from_bcd(r[2] & 0x3F),
        from_bcd(r[1] & 0x7F),
        from_bcd(r[0] & 0x7F),
    );
    if t.is_valid() { Ok(t) } else { Err(DeviceError::InvalidData) }
}

pub fn encode_registers(t: &ClockTime) -> [u8; 7] {
    [
        to_bcd(t.second),
        to_bcd(t.minute),
        to_bcd(t.hour),
        t.weekday + 1,
        to_bcd(t.day),
        to_bcd(t.month),
        to_bcd((t.year % 100) as u8),
    ]
}

impl<I2C: I2c> RtcPort for Ds3231<I2C> {
    fn is_up(&self) -> bool {
        self.up
    }

    fn get_time(&mut self) -> Result<ClockTime, DeviceError> {
        let mut r = [0u8; 7];
        self.i2c
            .write_read(ADDR, &[REG_TIME], &mut r)
            .map_err(|_| DeviceError::Bus)?;
        decode_registers(&r)
    }

    fn set_time(&mut self, t: &ClockTime) -> Result<(), DeviceError> {
        let regs = encode_registers(t);
        let mut buf = [0u8; 8];
        buf[0] = REG_TIME;
        buf[1..].copy_from_slice(&regs);
        self.i2c.write(ADDR, &buf).map_err(|_| DeviceError::Bus)
    }

    fn temperature_index(&mut self) -> Result<u8, DeviceError> {
        let mut msb = [0u8; 1];
        self.i2c
            .write_read(ADDR, &[REG_TEMP_MSB], &mut msb)
            .map_err(|_| DeviceError::Bus)?;
        Ok(msb[0])
    }
}
