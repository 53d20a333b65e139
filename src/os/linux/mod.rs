pub mod block;
pub mod enumerate;
mod ioctl;

pub use block::SysfsBlock;
pub use enumerate::SysfsUsb;
