use std::sync::{Arc, Mutex, PoisonError};

use crate::controller::Controller;
use crate::protocol::{BusAddress, Direction, Twi};
use crate::Result;

/// Register-level access to a device with an auto-incrementing register pointer. Each call is one
/// complete start…stop transaction.
pub trait RegisterBus {
    fn write_register(&mut self, device: BusAddress, register: u8, value: u8) -> Result<()>;

    fn read_register(&mut self, device: BusAddress, register: u8) -> Result<u8>;

    /// Burst read; `buf[i]` holds the contents of `register + i`.
    fn read_registers(&mut self, device: BusAddress, register: u8, buf: &mut [u8]) -> Result<()>;
}

impl<C: Controller> RegisterBus for Twi<C> {
    fn write_register(&mut self, device: BusAddress, register: u8, value: u8) -> Result<()> {
        self.transaction(|twi| {
            twi.start(device, Direction::Write)?;
            twi.write_byte(register)?;
            twi.write_byte(value)
        })
    }

    fn read_register(&mut self, device: BusAddress, register: u8) -> Result<u8> {
        self.transaction(|twi| {
            twi.start(device, Direction::Write)?;
            twi.write_byte(register)?;
            twi.start(device, Direction::Read)?;
            twi.read_byte_nack()
        })
    }

    fn read_registers(&mut self, device: BusAddress, register: u8, buf: &mut [u8]) -> Result<()> {
        if buf.is_empty() {
            return Ok(());
        }
        self.transaction(|twi| {
            twi.start(device, Direction::Write)?;
            twi.write_byte(register)?;
            twi.start(device, Direction::Read)?;
            twi.receive(buf, true)
        })
    }
}

impl<T: RegisterBus + ?Sized> RegisterBus for &mut T {
    #[inline]
    fn write_register(&mut self, device: BusAddress, register: u8, value: u8) -> Result<()> {
        (**self).write_register(device, register, value)
    }

    #[inline]
    fn read_register(&mut self, device: BusAddress, register: u8) -> Result<u8> {
        (**self).read_register(device, register)
    }

    #[inline]
    fn read_registers(&mut self, device: BusAddress, register: u8, buf: &mut [u8]) -> Result<()> {
        (**self).read_registers(device, register, buf)
    }
}

// The lock is held for one whole transaction so a bus shared with another component (e.g. a
// display) never sees interleaved start…stop sequences. A poisoned lock is taken over as is:
// `Twi::transaction` issues its stop while unwinding, so the bus is idle again.
impl<T: RegisterBus> RegisterBus for &Mutex<T> {
    fn write_register(&mut self, device: BusAddress, register: u8, value: u8) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .write_register(device, register, value)
    }

    fn read_register(&mut self, device: BusAddress, register: u8) -> Result<u8> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_register(device, register)
    }

    fn read_registers(&mut self, device: BusAddress, register: u8, buf: &mut [u8]) -> Result<()> {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .read_registers(device, register, buf)
    }
}

impl<T: RegisterBus> RegisterBus for Arc<Mutex<T>> {
    #[inline]
    fn write_register(&mut self, device: BusAddress, register: u8, value: u8) -> Result<()> {
        let mut bus: &Mutex<T> = self;
        bus.write_register(device, register, value)
    }

    #[inline]
    fn read_register(&mut self, device: BusAddress, register: u8) -> Result<u8> {
        let mut bus: &Mutex<T> = self;
        bus.read_register(device, register)
    }

    #[inline]
    fn read_registers(&mut self, device: BusAddress, register: u8, buf: &mut [u8]) -> Result<()> {
        let mut bus: &Mutex<T> = self;
        bus.read_registers(device, register, buf)
    }
}
