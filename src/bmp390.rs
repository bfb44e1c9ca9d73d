use embedded_hal::delay::DelayNs;
use log::{debug, trace, warn};

use crate::calibration::{Calibration, CalibrationBlock};
use crate::compensation::{Measurement, RawSample};
use crate::config::{Configuration, RESET_DELAY_MS};
use crate::protocol::BusAddress;
use crate::register::{
    config_bits, osr_bits, PowerControl, PowerMode, Register, CALIBRATION_LEN, CHIP_ID_VALUE,
    DATA_LEN, SOFT_RESET,
};
use crate::register_bus::RegisterBus;
use crate::{Error, Result};

/// A BMP390 sensor session. Owns the bus handle (which may itself be a borrowed or shared bus),
/// the device address and the calibration read during [`Bmp390::new`].
///
/// Every read triggers its own forced conversion. Use [`Bmp390::read_measurement`] when both
/// temperature and pressure are needed, so that they come from the same conversion.
pub struct Bmp390<B, D> {
    bus: B,
    delay: D,
    address: BusAddress,
    config: Configuration,
    calibration: Calibration,
}

impl<B: RegisterBus, D: DelayNs> Bmp390<B, D> {
    /// Resets and configures the sensor, then loads its calibration. The sensor is left in sleep
    /// mode with both pressure and temperature measurement enabled.
    pub fn new(
        mut bus: B,
        address: impl Into<BusAddress>,
        config: Configuration,
        mut delay: D,
    ) -> Result<Self> {
        let address = address.into();

        debug!("soft reset of {:#04x}", address.get());
        bus.write_register(address, Register::Cmd.addr(), SOFT_RESET)?;
        delay.delay_ms(RESET_DELAY_MS);

        if config.verify_chip_id {
            let found = bus.read_register(address, Register::ChipId.addr())?;
            if found != CHIP_ID_VALUE {
                warn!("device at {:#04x} reports chip id {found:#04x}", address.get());
                return Err(Error::UnexpectedDevice {
                    expected: CHIP_ID_VALUE,
                    found,
                });
            }
        }

        let osr = osr_bits(config.pressure_oversampling, config.temperature_oversampling);
        debug!("OSR <- {osr:#010b}");
        bus.write_register(address, Register::Osr.addr(), osr)?;

        let cfg = config_bits(config.iir_filter_coefficient);
        debug!("CONFIG <- {cfg:#010b}");
        bus.write_register(address, Register::Config.addr(), cfg)?;

        bus.write_register(address, Register::Odr.addr(), config.output_data_rate.into())?;

        let mut block = [0u8; CALIBRATION_LEN];
        bus.read_registers(address, Register::Calibration.addr(), &mut block)?;
        let calibration = Calibration::from(&CalibrationBlock(block));
        debug!("calibration: {calibration:?}");

        let pwr = PowerControl {
            press_en: true,
            temp_en: true,
            mode: PowerMode::Sleep,
        };
        bus.write_register(address, Register::PwrCtrl.addr(), pwr.bits())?;

        Ok(Self {
            bus,
            delay,
            address,
            config,
            calibration,
        })
    }

    /// Requests a single forced conversion and waits for it to complete.
    pub fn trigger_forced_measurement(&mut self) -> Result<()> {
        let pwr = PowerControl {
            press_en: true,
            temp_en: true,
            mode: PowerMode::Forced,
        };
        self.bus
            .write_register(self.address, Register::PwrCtrl.addr(), pwr.bits())?;
        let wait = self.config.measurement_delay();
        debug!("forced measurement triggered, waiting {wait} ms");
        self.delay.delay_ms(wait);
        Ok(())
    }

    /// Triggers a conversion and reads the uncompensated pressure and temperature.
    pub fn read_raw_sample(&mut self) -> Result<RawSample> {
        self.trigger_forced_measurement()?;
        let mut burst = [0u8; DATA_LEN];
        self.bus
            .read_registers(self.address, Register::PressureData.addr(), &mut burst)?;
        let sample = RawSample::from_burst(&burst);
        trace!("raw sample: {sample:?}");
        Ok(sample)
    }

    pub fn read_temperature_celsius(&mut self) -> Result<f32> {
        let sample = self.read_raw_sample()?;
        Ok(self
            .calibration
            .compensate_temperature(sample.temperature)
            .celsius())
    }

    pub fn read_pressure_pascals(&mut self) -> Result<f32> {
        let sample = self.read_raw_sample()?;
        let t_lin = self.calibration.compensate_temperature(sample.temperature);
        Ok(self.calibration.compensate_pressure(sample.pressure, t_lin))
    }

    /// Temperature and pressure from a single conversion.
    pub fn read_measurement(&mut self) -> Result<Measurement> {
        let sample = self.read_raw_sample()?;
        Ok(self.calibration.compensate(sample))
    }

    pub fn chip_id(&mut self) -> Result<u8> {
        self.bus.read_register(self.address, Register::ChipId.addr())
    }

    pub fn calibration(&self) -> &Calibration {
        &self.calibration
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    pub fn address(&self) -> BusAddress {
        self.address
    }

    /// Gives back the bus and the delay provider.
    pub fn release(self) -> (B, D) {
        (self.bus, self.delay)
    }
}
