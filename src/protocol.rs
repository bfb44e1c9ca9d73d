use log::trace;

use crate::controller::{control::*, status, Controller};
use crate::{Error, Result};

/// Default number of control register polls before a phase is reported as timed out.
pub const DEFAULT_POLL_LIMIT: u32 = 10_000;

// (TWPS bits, prescaler value)
const PRESCALERS: [(u8, u32); 4] = [(0, 1), (1, 4), (2, 16), (3, 64)];

/// Value of the R/W bit in the header byte sent after a start condition.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Write = 0,
    Read = 1,
}

/// A 7-bit device address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BusAddress(pub(crate) u8);

impl BusAddress {
    /// Returns `Error::Unsupported` for anything that does not fit in 7 bits.
    pub fn new(address: u8) -> Result<Self> {
        if address > 0x7F {
            Err(Error::Unsupported)
        } else {
            Ok(Self(address))
        }
    }

    #[inline]
    pub fn get(self) -> u8 {
        self.0
    }

    /// The address+direction byte transmitted right after a start condition.
    #[inline]
    pub fn header(self, direction: Direction) -> u8 {
        (self.0 << 1) | direction as u8
    }
}

impl TryFrom<u16> for BusAddress {
    type Error = Error;

    fn try_from(value: u16) -> Result<Self> {
        u8::try_from(value)
            .map_err(|_| Error::Unsupported)
            .and_then(BusAddress::new)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusConfig {
    /// Clock feeding the bus controller.
    pub cpu_hz: u32,
    /// Requested SCL frequency.
    pub scl_hz: u32,
    /// Upper bound on completion-flag polls per phase.
    pub poll_limit: u32,
}

impl Default for BusConfig {
    fn default() -> Self {
        // 1 MHz core clock with a divider of 2 gives a 50 kHz bus
        Self {
            cpu_hz: 1_000_000,
            scl_hz: 50_000,
            poll_limit: DEFAULT_POLL_LIMIT,
        }
    }
}

impl BusConfig {
    /// Returns `(prescaler_bits, divider)` for `SCL = cpu / (16 + 2 * divider * prescaler)`,
    /// using the smallest prescaler whose divider fits in a byte.
    pub fn bit_rate(&self) -> Result<(u8, u8)> {
        let invalid = Error::InvalidBitRate {
            cpu_hz: self.cpu_hz,
            scl_hz: self.scl_hz,
        };
        if self.scl_hz == 0 || self.cpu_hz / self.scl_hz < 16 {
            return Err(invalid);
        }
        let ticks = self.cpu_hz / self.scl_hz - 16;
        PRESCALERS
            .iter()
            .find_map(|&(bits, prescaler)| {
                u8::try_from(ticks / (2 * prescaler))
                    .ok()
                    .map(|divider| (bits, divider))
            })
            .ok_or(invalid)
    }
}

/// Two-wire bus master. Every method drives the controller through exactly one bus phase and
/// blocks until the controller reports completion. Nothing is retried here.
pub struct Twi<C: Controller> {
    controller: C,
    poll_limit: u32,
    pub(crate) target: BusAddress,
}

impl<C: Controller> Twi<C> {
    /// Programs the bit rate and enables the controller.
    pub fn new(mut controller: C, config: BusConfig) -> Result<Self> {
        let (prescaler_bits, divider) = config.bit_rate()?;
        controller.set_bit_rate(prescaler_bits, divider);
        controller.write_control(TWEN);
        Ok(Self {
            controller,
            poll_limit: config.poll_limit,
            target: BusAddress(0),
        })
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut C {
        &mut self.controller
    }

    pub fn into_inner(self) -> C {
        self.controller
    }

    fn wait(&mut self) -> Result<()> {
        for _ in 0..self.poll_limit {
            if self.controller.read_control() & TWINT != 0 {
                return Ok(());
            }
        }
        Err(Error::Timeout)
    }

    #[inline]
    fn status(&mut self) -> u8 {
        self.controller.read_status() & status::MASK
    }

    /// Issues a start (or repeated start) condition followed by the address+direction byte.
    pub fn start(&mut self, address: BusAddress, direction: Direction) -> Result<()> {
        self.controller.write_control(TWINT | TWSTA | TWEN);
        self.wait()?;
        let st = self.status();
        if st != status::START && st != status::REP_START {
            return Err(Error::Start(st));
        }

        let header = address.header(direction);
        self.controller.write_data(header);
        self.controller.write_control(TWINT | TWEN);
        self.wait()?;
        let st = self.status();
        let expected = match direction {
            Direction::Write => status::MT_SLA_ACK,
            Direction::Read => status::MR_SLA_ACK,
        };
        if st != expected {
            return Err(Error::AddressNack(st));
        }
        trace!("start, header {header:#04x} acknowledged");
        Ok(())
    }

    pub fn write_byte(&mut self, byte: u8) -> Result<()> {
        self.controller.write_data(byte);
        self.controller.write_control(TWINT | TWEN);
        self.wait()?;
        let st = self.status();
        if st != status::MT_DATA_ACK {
            return Err(Error::DataNack(st));
        }
        Ok(())
    }

    /// Receives one byte and acknowledges it, asking the device for more.
    pub fn read_byte_ack(&mut self) -> Result<u8> {
        self.controller.write_control(TWINT | TWEN | TWEA);
        self.wait()?;
        Ok(self.controller.read_data())
    }

    /// Receives one byte without acknowledging it, ending the read.
    pub fn read_byte_nack(&mut self) -> Result<u8> {
        self.controller.write_control(TWINT | TWEN);
        self.wait()?;
        Ok(self.controller.read_data())
    }

    /// Issues a stop condition. Completion is not awaited.
    pub fn stop(&mut self) {
        self.controller.write_control(TWINT | TWEN | TWSTO);
        trace!("stop");
    }

    /// Fills `buf` with acknowledged reads; the final byte is not acknowledged when `nack_last`.
    pub(crate) fn receive(&mut self, buf: &mut [u8], nack_last: bool) -> Result<()> {
        let i_end = buf.len().saturating_sub(1);
        for (i, byte) in buf.iter_mut().enumerate() {
            *byte = if i == i_end && nack_last {
                self.read_byte_nack()?
            } else {
                self.read_byte_ack()?
            };
        }
        Ok(())
    }

    /// Runs the phases in `f` and releases the bus with a stop condition afterwards, whether
    /// they succeeded, failed or panicked.
    pub fn transaction<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let mut guard = StopOnDrop(self);
        f(&mut *guard.0)
    }
}

struct StopOnDrop<'a, C: Controller>(&'a mut Twi<C>);

impl<C: Controller> Drop for StopOnDrop<'_, C> {
    fn drop(&mut self) {
        self.0.stop();
    }
}
