//! BMP390 register map and the bit-field encodings written by the driver.
//!
//! See section 4 of the BMP390 datasheet.

pub const CHIP_ID_VALUE: u8 = 0x60;
pub const SOFT_RESET: u8 = 0xB6;

/// Length of the factory calibration block starting at [`Register::Calibration`].
pub const CALIBRATION_LEN: usize = 21;
/// Length of the pressure + temperature burst starting at [`Register::PressureData`].
pub const DATA_LEN: usize = 6;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Register {
    ChipId = 0x00,
    Status = 0x03,
    /// 24-bit raw pressure, LSB first (0x04..=0x06).
    PressureData = 0x04,
    /// 24-bit raw temperature, LSB first (0x07..=0x09).
    TemperatureData = 0x07,
    PwrCtrl = 0x1B,
    Osr = 0x1C,
    Odr = 0x1D,
    Config = 0x1F,
    /// First byte of the 21-byte NVM calibration block (0x31..=0x45).
    Calibration = 0x31,
    Cmd = 0x7E,
}

impl Register {
    #[inline]
    pub const fn addr(self) -> u8 {
        self as u8
    }
}

/// Power modes of the PWR_CTRL register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PowerMode {
    /// Sleep mode, the default after power on reset.
    Sleep,
    /// A single measurement, after which the device returns to sleep.
    Forced,
    /// Periodic measurements at the rate selected in ODR.
    Normal,
}

impl From<u8> for PowerMode {
    fn from(field: u8) -> Self {
        match field & 0b11 {
            0b00 => PowerMode::Sleep,
            0b01 | 0b10 => PowerMode::Forced,
            _ => PowerMode::Normal,
        }
    }
}

impl From<PowerMode> for u8 {
    fn from(mode: PowerMode) -> u8 {
        match mode {
            PowerMode::Sleep => 0b00,
            PowerMode::Forced => 0b01,
            PowerMode::Normal => 0b11,
        }
    }
}

/// Contents of PWR_CTRL (0x1B).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PowerControl {
    pub press_en: bool,
    pub temp_en: bool,
    pub mode: PowerMode,
}

impl PowerControl {
    pub fn bits(&self) -> u8 {
        let mode: u8 = self.mode.into();
        u8::from(self.press_en) | u8::from(self.temp_en) << 1 | mode << 4
    }
}

/// Oversampling ratio, used for both the pressure and the temperature field of OSR.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Oversampling {
    X1 = 0b000,
    X2 = 0b001,
    X4 = 0b010,
    X8 = 0b011,
    X16 = 0b100,
    X32 = 0b101,
}

impl Oversampling {
    /// Number of internal samples averaged per reading.
    pub fn ratio(self) -> u32 {
        1 << self as u32
    }
}

impl From<Oversampling> for u8 {
    fn from(osr: Oversampling) -> u8 {
        osr as u8
    }
}

/// OSR (0x1C): pressure in bits 0..=2, temperature in bits 3..=5.
pub fn osr_bits(pressure: Oversampling, temperature: Oversampling) -> u8 {
    u8::from(pressure) | u8::from(temperature) << 3
}

/// IIR filter coefficients for CONFIG (0x1F) bits 1..=3.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IirFilterCoefficient {
    /// Bypass mode, no filtering.
    Coef0 = 0b000,
    Coef1 = 0b001,
    Coef3 = 0b010,
    Coef7 = 0b011,
    Coef15 = 0b100,
    Coef31 = 0b101,
    Coef63 = 0b110,
    Coef127 = 0b111,
}

impl From<IirFilterCoefficient> for u8 {
    fn from(coef: IirFilterCoefficient) -> u8 {
        coef as u8
    }
}

pub fn config_bits(filter: IirFilterCoefficient) -> u8 {
    (u8::from(filter) & 0b111) << 1
}

/// Output data rate (`odr_sel`) as a subdivision of the 200 Hz base rate. Only relevant in
/// normal mode.
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDataRate {
    R200Hz = 0x00,
    R100Hz = 0x01,
    R50Hz = 0x02,
    R25Hz = 0x03,
    R12p5Hz = 0x04,
    R6p25Hz = 0x05,
    R3p1Hz = 0x06,
    R1p5Hz = 0x07,
    R0p78Hz = 0x08,
    R0p39Hz = 0x09,
    R0p2Hz = 0x0A,
    R0p1Hz = 0x0B,
    R0p05Hz = 0x0C,
    R0p02Hz = 0x0D,
    R0p01Hz = 0x0E,
    R0p006Hz = 0x0F,
    R0p003Hz = 0x10,
    R0p0015Hz = 0x11,
}

impl From<OutputDataRate> for u8 {
    fn from(odr: OutputDataRate) -> u8 {
        odr as u8
    }
}
