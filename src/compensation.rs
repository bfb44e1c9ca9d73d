use crate::calibration::Calibration;
use crate::register::DATA_LEN;

/// Intermediate temperature produced by [`Calibration::compensate_temperature`]. Pressure
/// compensation needs the one computed from the same conversion.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct LinearizedTemperature(f32);

impl LinearizedTemperature {
    /// The linearized temperature is the compensated temperature in °C.
    #[inline]
    pub fn celsius(self) -> f32 {
        self.0
    }
}

/// Uncompensated 24-bit ADC counts of one conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawSample {
    pub pressure: u32,
    pub temperature: u32,
}

impl RawSample {
    /// Splits the 0x04..=0x09 burst: pressure first, each field LSB first.
    pub fn from_burst(b: &[u8; DATA_LEN]) -> Self {
        Self {
            pressure: u32::from_le_bytes([b[0], b[1], b[2], 0]),
            temperature: u32::from_le_bytes([b[3], b[4], b[5], 0]),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    /// °C
    pub temperature: f32,
    /// Pa
    pub pressure: f32,
}

impl Calibration {
    pub fn compensate_temperature(&self, uncomp_temp: u32) -> LinearizedTemperature {
        let partial_data1 = uncomp_temp as f32 - self.par_t1;
        let partial_data2 = partial_data1 * self.par_t2;

        LinearizedTemperature(partial_data2 + (partial_data1 * partial_data1) * self.par_t3)
    }

    /// `t_lin` must come from the temperature count of the same conversion as `uncomp_press`;
    /// anything else produces a well-formed but wrong pressure.
    pub fn compensate_pressure(&self, uncomp_press: u32, t_lin: LinearizedTemperature) -> f32 {
        let pressure = uncomp_press as f32;
        let t_lin = t_lin.0;

        let partial_data1 = self.par_p6 * t_lin;
        let partial_data2 = self.par_p7 * (t_lin * t_lin);
        let partial_data3 = self.par_p8 * (t_lin * t_lin * t_lin);
        let partial_out1 = self.par_p5 + partial_data1 + partial_data2 + partial_data3;

        let partial_data1 = self.par_p2 * t_lin;
        let partial_data2 = self.par_p3 * (t_lin * t_lin);
        let partial_data3 = self.par_p4 * (t_lin * t_lin * t_lin);
        let partial_out2 = pressure * (self.par_p1 + partial_data1 + partial_data2 + partial_data3);

        let partial_data1 = pressure * pressure;
        let partial_data2 = self.par_p9 + self.par_p10 * t_lin;
        let partial_data3 = partial_data1 * partial_data2;
        let partial_data4 = partial_data3 + (pressure * pressure * pressure) * self.par_p11;

        partial_out1 + partial_out2 + partial_data4
    }

    /// Compensates both fields of one conversion, temperature first.
    pub fn compensate(&self, sample: RawSample) -> Measurement {
        let t_lin = self.compensate_temperature(sample.temperature);
        Measurement {
            temperature: t_lin.celsius(),
            pressure: self.compensate_pressure(sample.pressure, t_lin),
        }
    }
}
