use crate::register::CALIBRATION_LEN;

/// Raw NVM calibration block as read from 0x31..=0x45.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalibrationBlock(pub [u8; CALIBRATION_LEN]);

/// The integer fields of the block, before rescaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct CalibrationNvm {
    nvm_par_t1: u16,
    nvm_par_t2: u16,
    nvm_par_t3: i8,
    nvm_par_p1: i16,
    nvm_par_p2: i16,
    nvm_par_p3: i8,
    nvm_par_p4: i8,
    nvm_par_p5: u16,
    nvm_par_p6: u16,
    nvm_par_p7: i8,
    nvm_par_p8: i8,
    nvm_par_p9: i16,
    nvm_par_p10: i8,
    nvm_par_p11: i8,
}

impl From<&CalibrationBlock> for CalibrationNvm {
    fn from(block: &CalibrationBlock) -> Self {
        let b = &block.0;
        Self {
            nvm_par_t1: u16::from_le_bytes([b[0], b[1]]),
            nvm_par_t2: u16::from_le_bytes([b[2], b[3]]),
            nvm_par_t3: i8::from_le_bytes([b[4]]),
            nvm_par_p1: i16::from_le_bytes([b[5], b[6]]),
            nvm_par_p2: i16::from_le_bytes([b[7], b[8]]),
            nvm_par_p3: i8::from_le_bytes([b[9]]),
            nvm_par_p4: i8::from_le_bytes([b[10]]),
            nvm_par_p5: u16::from_le_bytes([b[11], b[12]]),
            nvm_par_p6: u16::from_le_bytes([b[13], b[14]]),
            nvm_par_p7: i8::from_le_bytes([b[15]]),
            nvm_par_p8: i8::from_le_bytes([b[16]]),
            nvm_par_p9: i16::from_le_bytes([b[17], b[18]]),
            nvm_par_p10: i8::from_le_bytes([b[19]]),
            nvm_par_p11: i8::from_le_bytes([b[20]]),
        }
    }
}

/// Floating point compensation coefficients (datasheet section 8.4). Created once when the
/// sensor is initialized and never modified afterwards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Calibration {
    pub par_t1: f32,
    pub par_t2: f32,
    pub par_t3: f32,
    pub par_p1: f32,
    pub par_p2: f32,
    pub par_p3: f32,
    pub par_p4: f32,
    pub par_p5: f32,
    pub par_p6: f32,
    pub par_p7: f32,
    pub par_p8: f32,
    pub par_p9: f32,
    pub par_p10: f32,
    pub par_p11: f32,
}

impl From<&CalibrationBlock> for Calibration {
    fn from(block: &CalibrationBlock) -> Self {
        let nvm = CalibrationNvm::from(block);

        // T1 and P5 are specified as divisions by negative powers of two, i.e. they scale up
        Self {
            par_t1: nvm.nvm_par_t1 as f32 * 256.0, // / 2^-8
            par_t2: nvm.nvm_par_t2 as f32 / 1073741824.0, // 2^30
            par_t3: nvm.nvm_par_t3 as f32 / 281474976710656.0, // 2^48
            par_p1: (nvm.nvm_par_p1 as f32 - 16384.0) / 1048576.0, // 2^14, 2^20
            par_p2: (nvm.nvm_par_p2 as f32 - 16384.0) / 536870912.0, // 2^14, 2^29
            par_p3: nvm.nvm_par_p3 as f32 / 4294967296.0, // 2^32
            par_p4: nvm.nvm_par_p4 as f32 / 137438953472.0, // 2^37
            par_p5: nvm.nvm_par_p5 as f32 * 8.0, // / 2^-3
            par_p6: nvm.nvm_par_p6 as f32 / 64.0, // 2^6
            par_p7: nvm.nvm_par_p7 as f32 / 256.0, // 2^8
            par_p8: nvm.nvm_par_p8 as f32 / 32768.0, // 2^15
            par_p9: nvm.nvm_par_p9 as f32 / 281474976710656.0, // 2^48
            par_p10: nvm.nvm_par_p10 as f32 / 281474976710656.0, // 2^48
            par_p11: nvm.nvm_par_p11 as f32 / 36893488147419103232.0, // 2^65
        }
    }
}
