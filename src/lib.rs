mod bmp390;
mod calibration;
mod compensation;
pub mod config;
pub mod controller;
mod delay;
mod error;
mod i2c_impl;
mod protocol;
pub mod register;
mod register_bus;

pub use bmp390::*;
pub use calibration::*;
pub use compensation::*;
pub use config::{Configuration, DeviceAddress};
pub use controller::Controller;
pub use delay::StdDelay;
pub use error::*;
pub use protocol::*;
pub use register_bus::RegisterBus;

pub use embedded_hal;
pub use i2c;
