use crate::protocol::BusAddress;
use crate::register::{IirFilterCoefficient, OutputDataRate, Oversampling};

/// Time the device needs to reboot after a soft reset.
pub const RESET_DELAY_MS: u32 = 10;

/// The two addresses selectable with the SDO pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceAddress {
    /// SDO pulled to GND.
    Primary,
    /// SDO pulled to VDDIO.
    Secondary,
}

impl From<DeviceAddress> for BusAddress {
    fn from(address: DeviceAddress) -> Self {
        let raw = match address {
            DeviceAddress::Primary => 0x76,
            DeviceAddress::Secondary => 0x77,
        };
        BusAddress(raw)
    }
}

/// Sensor settings applied by [`crate::Bmp390::new`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Configuration {
    pub(crate) pressure_oversampling: Oversampling,
    pub(crate) temperature_oversampling: Oversampling,
    pub(crate) iir_filter_coefficient: IirFilterCoefficient,
    pub(crate) output_data_rate: OutputDataRate,
    pub(crate) verify_chip_id: bool,
    pub(crate) measurement_delay_ms: Option<u32>,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            pressure_oversampling: Oversampling::X8,
            temperature_oversampling: Oversampling::X2,
            iir_filter_coefficient: IirFilterCoefficient::Coef0,
            output_data_rate: OutputDataRate::R200Hz,
            verify_chip_id: true,
            measurement_delay_ms: None,
        }
    }
}

impl Configuration {
    pub fn pressure_oversampling(mut self, pressure_oversampling: Oversampling) -> Self {
        self.pressure_oversampling = pressure_oversampling;

        self
    }

    pub fn temperature_oversampling(mut self, temperature_oversampling: Oversampling) -> Self {
        self.temperature_oversampling = temperature_oversampling;

        self
    }

    pub fn iir_filter_coefficient(mut self, filter_coefficient: IirFilterCoefficient) -> Self {
        self.iir_filter_coefficient = filter_coefficient;

        self
    }

    /// Has no effect on forced measurements, but the register is still programmed with a valid
    /// value.
    pub fn output_data_rate(mut self, output_data_rate: OutputDataRate) -> Self {
        self.output_data_rate = output_data_rate;

        self
    }

    /// Whether initialization reads CHIP_ID after the reset and fails with
    /// [`crate::Error::UnexpectedDevice`] on a mismatch.
    pub fn verify_chip_id(mut self, verify: bool) -> Self {
        self.verify_chip_id = verify;

        self
    }

    /// Overrides the wait between triggering a forced measurement and reading the result.
    pub fn measurement_delay_ms(mut self, delay_ms: u32) -> Self {
        self.measurement_delay_ms = Some(delay_ms);

        self
    }

    /// Wait applied after a forced-measurement trigger. Unless overridden, this is the
    /// conversion time of datasheet section 3.9.2 for both sensors enabled, plus 10%.
    pub fn measurement_delay(&self) -> u32 {
        if let Some(ms) = self.measurement_delay_ms {
            return ms;
        }
        let conversion_us = 234
            + 392
            + self.pressure_oversampling.ratio() * 2020
            + 163
            + self.temperature_oversampling.ratio() * 2020;
        (conversion_us * 11 / 10).div_ceil(1000)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_firmware_constants() {
        let config = Configuration::default();
        assert_eq!(config.pressure_oversampling, Oversampling::X8);
        assert_eq!(config.temperature_oversampling, Oversampling::X2);
        assert_eq!(config.iir_filter_coefficient, IirFilterCoefficient::Coef0);
        assert_eq!(config.output_data_rate, OutputDataRate::R200Hz);
        assert!(config.verify_chip_id);
    }

    #[test]
    fn test_measurement_delay() {
        // 234 + 392 + 8 * 2020 + 163 + 2 * 2020 = 20989 us, +10% = 23087 us
        assert_eq!(Configuration::default().measurement_delay(), 24);

        let slowest = Configuration::default()
            .pressure_oversampling(Oversampling::X32)
            .temperature_oversampling(Oversampling::X32);
        // 130069 us, +10% = 143075 us
        assert_eq!(slowest.measurement_delay(), 144);

        let fixed = Configuration::default().measurement_delay_ms(40);
        assert_eq!(fixed.measurement_delay(), 40);
    }

    #[test]
    fn test_device_address() {
        assert_eq!(BusAddress::from(DeviceAddress::Primary).get(), 0x76);
        assert_eq!(BusAddress::from(DeviceAddress::Secondary).get(), 0x77);
    }
}
