//! The two views of the host a scan reconciles: block devices with their
//! udev properties, and physical devices on the USB bus.
use crate::error::Result;
use std::collections::HashMap;
use std::fmt;
use std::io;

/// One block device as seen by the block subsystem.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BlockDevice {
    /// Device node, e.g. `/dev/sda`.
    pub node: String,
    /// udev property bag (`ID_BUS`, `DEVTYPE`, `ID_VENDOR_ID`, ...).
    pub properties: HashMap<String, String>,
}

impl BlockDevice {
    pub fn new<S: Into<String>>(node: S) -> Self {
        BlockDevice {
            node: node.into(),
            properties: HashMap::new(),
        }
    }

    pub fn with<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn property(&self, name: &str) -> Option<&str> {
        self.properties.get(name).map(String::as_str)
    }

    pub fn is_usb_disk(&self) -> bool {
        self.property("ID_BUS") == Some("usb") && self.property("DEVTYPE") == Some("disk")
    }
}

/// Negotiated bus speed, numbered as libusb numbers them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Speed {
    Unknown = 0,
    Low = 1,
    Full = 2,
    High = 3,
    Super = 4,
    SuperPlus = 5,
}

impl Speed {
    /// From the Mbit/s figure the kernel reports in sysfs.
    pub fn from_mbps(mbps: &str) -> Self {
        match mbps.trim() {
            "1.5" => Speed::Low,
            "12" => Speed::Full,
            "480" => Speed::High,
            "5000" => Speed::Super,
            "10000" | "20000" => Speed::SuperPlus,
            _ => Speed::Unknown,
        }
    }
}

impl Default for Speed {
    fn default() -> Self {
        Speed::Unknown
    }
}

impl fmt::Display for Speed {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", *self as u8)
    }
}

/// A device on the USB bus.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PhysicalDevice {
    pub vendor_id: u16,
    pub product_id: u16,
    pub serial: Option<String>,
    pub bus: u8,
    pub address: u8,
    pub bcd_usb: u16,
    pub speed: Speed,
}

impl PhysicalDevice {
    /// `None` when the device has no serial, or it could not be read.
    pub fn serial_number(&self) -> Option<&str> {
        self.serial.as_deref()
    }

    /// `"USB <major>.<minor>"` from bcdUSB, e.g. 0x0210 => `"USB 2.1"`.
    pub fn usb_version(&self) -> String {
        let major = (self.bcd_usb & 0xff00) >> 8;
        let minor = (self.bcd_usb & 0x00f0) >> 4;
        format!("USB {}.{}", major, minor)
    }

    pub fn bus_address(&self) -> String {
        format!("{:03}:{:03}", self.bus, self.address)
    }
}

/// Lists block devices and reads their size.
pub trait BlockSubsystem {
    /// Every block device known to the host. Failing to list at all is an
    /// error; a device with missing properties is not.
    fn devices(&self) -> Result<Vec<BlockDevice>>;

    /// Size of the device in bytes.
    fn raw_size(&self, node: &str) -> io::Result<u64>;
}

/// Finds physical devices on the USB bus.
pub trait UsbBus {
    fn find(&self, vendor_id: u16, product_id: u16) -> Vec<PhysicalDevice>;
}
