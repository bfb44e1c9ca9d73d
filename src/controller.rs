/// Hardware seam used by `crate::protocol` to drive a two-wire bus controller. Models the three
/// registers of an AVR-style TWI block (control, status and data) plus the bit-rate setup. Can be
/// replaced with `SimulatedController` for testing.
pub trait Controller {
    /// Writes the control register. Setting `TWINT` starts the action selected by the other bits.
    fn write_control(&mut self, bits: u8);

    /// Reads the control register. `TWINT` is set by the hardware once the current phase is done.
    fn read_control(&mut self) -> u8;

    /// Reads the raw status register, including the prescaler bits.
    fn read_status(&mut self) -> u8;

    fn write_data(&mut self, byte: u8);

    fn read_data(&mut self) -> u8;

    /// Programs the SCL clock: `prescaler_bits` selects 1/4/16/64, `divider` is the TWBR value.
    fn set_bit_rate(&mut self, prescaler_bits: u8, divider: u8);
}

impl<T: Controller + ?Sized> Controller for &mut T {
    #[inline]
    fn write_control(&mut self, bits: u8) {
        (**self).write_control(bits)
    }

    #[inline]
    fn read_control(&mut self) -> u8 {
        (**self).read_control()
    }

    #[inline]
    fn read_status(&mut self) -> u8 {
        (**self).read_status()
    }

    #[inline]
    fn write_data(&mut self, byte: u8) {
        (**self).write_data(byte)
    }

    #[inline]
    fn read_data(&mut self) -> u8 {
        (**self).read_data()
    }

    #[inline]
    fn set_bit_rate(&mut self, prescaler_bits: u8, divider: u8) {
        (**self).set_bit_rate(prescaler_bits, divider)
    }
}

/// Control register bits.
pub mod control {
    pub const TWINT: u8 = 1 << 7;
    pub const TWEA: u8 = 1 << 6;
    pub const TWSTA: u8 = 1 << 5;
    pub const TWSTO: u8 = 1 << 4;
    pub const TWEN: u8 = 1 << 2;
}

/// Status codes, valid after masking the status register with [`status::MASK`].
pub mod status {
    pub const MASK: u8 = 0xF8;

    pub const BUS_ERROR: u8 = 0x00;
    pub const START: u8 = 0x08;
    pub const REP_START: u8 = 0x10;

    // master transmitter
    pub const MT_SLA_ACK: u8 = 0x18;
    pub const MT_SLA_NACK: u8 = 0x20;
    pub const MT_DATA_ACK: u8 = 0x28;
    pub const MT_DATA_NACK: u8 = 0x30;
    pub const ARB_LOST: u8 = 0x38;

    // master receiver
    pub const MR_SLA_ACK: u8 = 0x40;
    pub const MR_SLA_NACK: u8 = 0x48;
    pub const MR_DATA_ACK: u8 = 0x50;
    pub const MR_DATA_NACK: u8 = 0x58;

    pub const NO_INFO: u8 = 0xF8;
}

#[cfg(test)]
pub mod mock {
    use super::control::*;
    use super::status::*;
    use super::Controller;
    use std::collections::VecDeque;

    /// One observable phase on the simulated bus.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub enum Event {
        Start,
        Header(u8),
        Write(u8),
        ReadAck(u8),
        ReadNack(u8),
        Stop,
    }

    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    enum Phase {
        Idle,
        Started,
        Transmitting,
        Receiving,
        Rejected,
    }

    /// A TWI controller with a single BMP390-like target attached. The target has a 256-byte
    /// register file with an auto-incrementing pointer, answers soft reset and turns forced-mode
    /// requests into the next queued conversion result.
    pub struct SimulatedController {
        pub address: u8,
        pub registers: [u8; 256],
        pub events: Vec<Event>,
        pub register_writes: Vec<(u8, u8)>,
        pub bit_rate: Option<(u8, u8)>,
        pub conversions: VecDeque<[u8; 6]>,
        /// NACK every data byte once this many have been accepted in the current transaction.
        pub nack_data_after: Option<usize>,
        pub fail_start: bool,
        /// Never raise `TWINT` again.
        pub stall: bool,
        phase: Phase,
        pointer: u8,
        accepted: usize,
        control: u8,
        status: u8,
        data: u8,
    }

    impl SimulatedController {
        pub fn new(address: u8) -> Self {
            let mut registers = [0u8; 256];
            registers[0x00] = 0x60;
            registers[0x1C] = 0x02;
            Self {
                address,
                registers,
                events: Vec::new(),
                register_writes: Vec::new(),
                bit_rate: None,
                conversions: VecDeque::new(),
                nack_data_after: None,
                fail_start: false,
                stall: false,
                phase: Phase::Idle,
                pointer: 0,
                accepted: 0,
                control: 0,
                status: NO_INFO,
                data: 0,
            }
        }

        pub fn with_calibration(mut self, block: &[u8; 21]) -> Self {
            self.registers[0x31..0x31 + 21].copy_from_slice(block);
            self
        }

        /// Queues one conversion result, delivered on the next forced-mode request.
        pub fn with_conversion(mut self, pressure: u32, temperature: u32) -> Self {
            let p = pressure.to_le_bytes();
            let t = temperature.to_le_bytes();
            self.conversions
                .push_back([p[0], p[1], p[2], t[0], t[1], t[2]]);
            self
        }

        pub fn headers(&self) -> Vec<u8> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Header(h) => Some(*h),
                    _ => None,
                })
                .collect()
        }

        fn store(&mut self, register: u8, value: u8) {
            self.register_writes.push((register, value));
            self.registers[register as usize] = value;
            match register {
                0x7E if value == 0xB6 => {
                    self.registers[0x1B] = 0x00;
                    self.registers[0x1C] = 0x02;
                    self.registers[0x1D] = 0x00;
                    self.registers[0x1F] = 0x00;
                }
                0x1B if matches!((value >> 4) & 0b11, 0b01 | 0b10) => {
                    if let Some(sample) = self.conversions.pop_front() {
                        self.registers[0x04..0x0A].copy_from_slice(&sample);
                    }
                    // back to sleep once the conversion is done
                    self.registers[0x1B] = value & 0b0000_0011;
                }
                _ => {}
            }
        }

        fn execute(&mut self, bits: u8) {
            if bits & TWSTO != 0 {
                self.events.push(Event::Stop);
                self.phase = Phase::Idle;
                self.accepted = 0;
                return;
            }

            if bits & TWSTA != 0 {
                self.events.push(Event::Start);
                self.accepted = 0;
                if self.fail_start {
                    self.status = ARB_LOST;
                    self.phase = Phase::Idle;
                } else {
                    self.status = if self.phase == Phase::Idle {
                        START
                    } else {
                        REP_START
                    };
                    self.phase = Phase::Started;
                }
                self.complete();
                return;
            }

            match self.phase {
                Phase::Started => {
                    let header = self.data;
                    let read = header & 0x01 != 0;
                    self.events.push(Event::Header(header));
                    if header >> 1 != self.address {
                        self.status = if read { MR_SLA_NACK } else { MT_SLA_NACK };
                        self.phase = Phase::Rejected;
                    } else if read {
                        self.status = MR_SLA_ACK;
                        self.phase = Phase::Receiving;
                    } else {
                        self.status = MT_SLA_ACK;
                        self.phase = Phase::Transmitting;
                    }
                }
                Phase::Transmitting => {
                    let byte = self.data;
                    self.events.push(Event::Write(byte));
                    if self.nack_data_after.is_some_and(|n| self.accepted >= n) {
                        self.status = MT_DATA_NACK;
                    } else {
                        self.status = MT_DATA_ACK;
                        // the first byte of a write selects the register
                        if self.accepted == 0 {
                            self.pointer = byte;
                        } else {
                            self.store(self.pointer, byte);
                            self.pointer = self.pointer.wrapping_add(1);
                        }
                        self.accepted += 1;
                    }
                }
                Phase::Receiving => {
                    let byte = self.registers[self.pointer as usize];
                    self.pointer = self.pointer.wrapping_add(1);
                    self.data = byte;
                    if bits & TWEA != 0 {
                        self.events.push(Event::ReadAck(byte));
                        self.status = MR_DATA_ACK;
                    } else {
                        self.events.push(Event::ReadNack(byte));
                        self.status = MR_DATA_NACK;
                    }
                }
                Phase::Idle | Phase::Rejected => self.status = BUS_ERROR,
            }
            self.complete();
        }

        fn complete(&mut self) {
            if !self.stall {
                self.control |= TWINT;
            }
        }
    }

    impl Controller for SimulatedController {
        fn write_control(&mut self, bits: u8) {
            // writing a one to TWINT clears the flag and starts the selected action
            self.control = bits & !TWINT;
            if bits & TWINT != 0 && bits & TWEN != 0 {
                self.execute(bits);
            }
        }

        fn read_control(&mut self) -> u8 {
            self.control
        }

        fn read_status(&mut self) -> u8 {
            // prescaler bits share the register and must be masked off by the reader
            self.status | self.bit_rate.map_or(0, |(prescaler, _)| prescaler & 0b11)
        }

        fn write_data(&mut self, byte: u8) {
            self.data = byte;
        }

        fn read_data(&mut self) -> u8 {
            self.data
        }

        fn set_bit_rate(&mut self, prescaler_bits: u8, divider: u8) {
            self.bit_rate = Some((prescaler_bits, divider));
        }
    }

    /// Records requested delays instead of sleeping.
    #[derive(Debug, Default)]
    pub struct RecordingDelay {
        pub delays_ms: Vec<u32>,
        pub total_ns: u64,
    }

    impl embedded_hal::delay::DelayNs for RecordingDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.delays_ms.push(ms);
            self.total_ns += u64::from(ms) * 1_000_000;
        }
    }
}
