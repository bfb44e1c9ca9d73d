use crate::controller::Controller;
use crate::protocol::{BusAddress, Direction, Twi};
use crate::{Error, Result};
use i2c::{Message, ReadFlags, WriteFlags};
use std::io::{Read, Write};

fn supported_read_flags() -> ReadFlags {
    ReadFlags::NACK | ReadFlags::NO_START
}

fn supported_write_flags() -> WriteFlags {
    WriteFlags::IGNORE_NACK | WriteFlags::NO_START
}

impl<C: Controller> i2c::Master for Twi<C> {
    type Error = Error;
}

impl<C: Controller> i2c::Address for Twi<C> {
    fn set_slave_address(&mut self, addr: u16, tenbit: bool) -> Result<()> {
        if tenbit {
            Err(Error::Unsupported)
        } else {
            self.target = BusAddress::try_from(addr)?;
            Ok(())
        }
    }
}

impl<C: Controller> Read for Twi<C> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let (target, len) = (self.target, buf.len());
        self.transaction(|twi| {
            twi.start(target, Direction::Read)?;
            twi.receive(buf, true)
        })?;
        Ok(len)
    }
}

impl<C: Controller> Write for Twi<C> {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        let (target, len) = (self.target, buf.len());
        self.transaction(|twi| {
            twi.start(target, Direction::Write)?;
            buf.iter().try_for_each(|&byte| twi.write_byte(byte))
        })?;
        Ok(len)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(()) // noop since no buffering is performed
    }
}

fn starts_new_segment(message: &Message) -> bool {
    match message {
        Message::Read { flags, .. } => !flags.contains(ReadFlags::NO_START),
        Message::Write { flags, .. } => !flags.contains(WriteFlags::NO_START),
    }
}

/// Rejects flags the controller cannot honour. A `NO_START` message continues the previous
/// one on the wire, so it cannot come first and cannot change direction: the controller stays
/// in the mode selected by the last header byte.
fn check_messages(messages: &[Message]) -> Result<()> {
    let mut previous_read = None;
    for message in messages {
        let read = match message {
            Message::Read { flags, .. } => {
                if !supported_read_flags().contains(*flags) {
                    return Err(Error::Unsupported);
                }
                true
            }
            Message::Write { flags, .. } => {
                if !supported_write_flags().contains(*flags) {
                    return Err(Error::Unsupported);
                }
                false
            }
        };
        if !starts_new_segment(message) && previous_read != Some(read) {
            return Err(Error::Unsupported);
        }
        previous_read = Some(read);
    }
    Ok(())
}

impl<C: Controller> i2c::BulkTransfer for Twi<C> {
    fn i2c_transfer_support(&mut self) -> Result<(ReadFlags, WriteFlags)> {
        Ok((supported_read_flags(), supported_write_flags()))
    }

    /// Runs all messages as one transaction: a (repeated) start per message unless `NO_START`,
    /// a single stop at the end. Only the last byte of a read segment is not acknowledged.
    fn i2c_transfer(&mut self, messages: &mut [Message]) -> Result<()> {
        if messages.is_empty() {
            return Ok(());
        }
        check_messages(messages)?;

        // whether the next message continues the current one
        let continued: Vec<bool> = messages
            .iter()
            .skip(1)
            .map(|m| !starts_new_segment(m))
            .chain(std::iter::once(false))
            .collect();

        self.transaction(|twi| {
            for (message, &continued) in messages.iter_mut().zip(&continued) {
                let new_segment = starts_new_segment(message);
                match message {
                    Message::Read {
                        address,
                        data,
                        flags,
                    } => {
                        if new_segment {
                            twi.start(BusAddress::try_from(*address)?, Direction::Read)?;
                        }
                        if flags.contains(ReadFlags::NACK) {
                            for byte in data.iter_mut() {
                                *byte = twi.read_byte_nack()?;
                            }
                        } else {
                            twi.receive(data, !continued)?;
                        }
                    }
                    Message::Write {
                        address,
                        data,
                        flags,
                    } => {
                        if new_segment {
                            twi.start(BusAddress::try_from(*address)?, Direction::Write)?;
                        }
                        for &byte in data.iter() {
                            match twi.write_byte(byte) {
                                Err(Error::DataNack(_)) if flags.contains(WriteFlags::IGNORE_NACK) => {}
                                result => result?,
                            }
                        }
                    }
                }
            }
            Ok(())
        })
    }
}
