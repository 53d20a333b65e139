pub mod config;
pub mod descriptors;
pub mod device;
pub mod error;
pub mod format;
pub mod host;
pub mod os;
pub mod property;
pub mod registry;
pub mod usbids;

pub use config::Config;
pub use device::{DeviceRecord, RecordBuilder};
pub use error::{Error, Result};
pub use host::{BlockDevice, BlockSubsystem, PhysicalDevice, Speed, UsbBus};
#[cfg(target_os = "linux")]
pub use os::linux::{SysfsBlock, SysfsUsb};
pub use property::{parse_property_list, PropertyKey, PropertyStore, UNSET};
pub use registry::Registry;
pub use usbids::UsbIds;
