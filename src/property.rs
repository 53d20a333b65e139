//! Fixed schema of device properties.
//!
//! Every device record carries exactly the keys of [`PropertyKey`]. A key
//! outside the schema cannot be expressed in code; names arriving as text
//! (property filters) go through [`PropertyKey::from_str`] and are rejected
//! there.
use crate::error::{Error, Result};
use std::fmt;
use std::str::FromStr;

/// Value of a property nobody has filled in.
pub const UNSET: &str = "?";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum PropertyKey {
    Device,
    Bus,
    DevType,
    Type,
    Driver,
    UsbVer,
    Speed,
    DriveThumb,
    Vendor,
    VendorEnc,
    VendorStr,
    Model,
    ModelEnc,
    ModelStr,
    Revision,
    Size,
    Vid,
    Pid,
    Id,
    Serial,
    SerialLong,
    Interfaces,
    InterfaceNum,
    Label,
    Fs,
    DevBus,
    DevAddr,
    BusAddr,
    Major,
    Minor,
    Usec,
    Chksum,
}

impl PropertyKey {
    pub const COUNT: usize = 32;

    /// All keys in schema order.
    pub const ALL: [PropertyKey; PropertyKey::COUNT] = [
        PropertyKey::Device,
        PropertyKey::Bus,
        PropertyKey::DevType,
        PropertyKey::Type,
        PropertyKey::Driver,
        PropertyKey::UsbVer,
        PropertyKey::Speed,
        PropertyKey::DriveThumb,
        PropertyKey::Vendor,
        PropertyKey::VendorEnc,
        PropertyKey::VendorStr,
        PropertyKey::Model,
        PropertyKey::ModelEnc,
        PropertyKey::ModelStr,
        PropertyKey::Revision,
        PropertyKey::Size,
        PropertyKey::Vid,
        PropertyKey::Pid,
        PropertyKey::Id,
        PropertyKey::Serial,
        PropertyKey::SerialLong,
        PropertyKey::Interfaces,
        PropertyKey::InterfaceNum,
        PropertyKey::Label,
        PropertyKey::Fs,
        PropertyKey::DevBus,
        PropertyKey::DevAddr,
        PropertyKey::BusAddr,
        PropertyKey::Major,
        PropertyKey::Minor,
        PropertyKey::Usec,
        PropertyKey::Chksum,
    ];

    pub fn name(self) -> &'static str {
        match self {
            PropertyKey::Device => "device",
            PropertyKey::Bus => "bus",
            PropertyKey::DevType => "devtype",
            PropertyKey::Type => "type",
            PropertyKey::Driver => "driver",
            PropertyKey::UsbVer => "usbver",
            PropertyKey::Speed => "speed",
            PropertyKey::DriveThumb => "drive_thumb",
            PropertyKey::Vendor => "vendor",
            PropertyKey::VendorEnc => "vendor_enc",
            PropertyKey::VendorStr => "vendor_str",
            PropertyKey::Model => "model",
            PropertyKey::ModelEnc => "model_enc",
            PropertyKey::ModelStr => "model_str",
            PropertyKey::Revision => "revision",
            PropertyKey::Size => "size",
            PropertyKey::Vid => "vid",
            PropertyKey::Pid => "pid",
            PropertyKey::Id => "id",
            PropertyKey::Serial => "serial",
            PropertyKey::SerialLong => "serial_long",
            PropertyKey::Interfaces => "interfaces",
            PropertyKey::InterfaceNum => "interface_num",
            PropertyKey::Label => "label",
            PropertyKey::Fs => "fs",
            PropertyKey::DevBus => "devbus",
            PropertyKey::DevAddr => "devaddr",
            PropertyKey::BusAddr => "busaddr",
            PropertyKey::Major => "major",
            PropertyKey::Minor => "minor",
            PropertyKey::Usec => "usec",
            PropertyKey::Chksum => "chksum",
        }
    }

    /// Name of the block subsystem (udev) property this key is copied from,
    /// or `None` when the value is derived later.
    pub fn udev_name(self) -> Option<&'static str> {
        let name = match self {
            PropertyKey::Device => "DEVNAME",
            PropertyKey::Bus => "ID_BUS",
            PropertyKey::DevType => "DEVTYPE",
            PropertyKey::Type => "ID_TYPE",
            PropertyKey::Driver => "ID_USB_DRIVER",
            PropertyKey::DriveThumb => "ID_DRIVE_THUMB",
            PropertyKey::Vendor => "ID_VENDOR",
            PropertyKey::VendorEnc => "ID_VENDOR_ENC",
            PropertyKey::Model => "ID_MODEL",
            PropertyKey::ModelEnc => "ID_MODEL_ENC",
            PropertyKey::Revision => "ID_REVISION",
            PropertyKey::Vid => "ID_VENDOR_ID",
            PropertyKey::Pid => "ID_MODEL_ID",
            PropertyKey::Serial => "ID_SERIAL_SHORT",
            PropertyKey::SerialLong => "ID_SERIAL",
            PropertyKey::Interfaces => "ID_USB_INTERFACES",
            PropertyKey::InterfaceNum => "ID_USB_INTERFACE_NUM",
            PropertyKey::Label => "ID_FS_LABEL",
            PropertyKey::Fs => "ID_FS_TYPE",
            PropertyKey::Major => "MAJOR",
            PropertyKey::Minor => "MINOR",
            PropertyKey::Usec => "USEC_INITIALIZED",
            PropertyKey::UsbVer
            | PropertyKey::Speed
            | PropertyKey::VendorStr
            | PropertyKey::ModelStr
            | PropertyKey::Size
            | PropertyKey::Id
            | PropertyKey::DevBus
            | PropertyKey::DevAddr
            | PropertyKey::BusAddr
            | PropertyKey::Chksum => return None,
        };
        Some(name)
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PropertyKey {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PropertyKey::ALL
            .iter()
            .copied()
            .find(|key| key.name() == s)
            .ok_or_else(|| Error::UnknownProperty(s.to_string()))
    }
}

/// Parse a comma separated property filter such as `"vid,pid"`.
///
/// Surrounding whitespace and empty items are ignored, order is kept.
pub fn parse_property_list(list: &str) -> Result<Vec<PropertyKey>> {
    list.split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::parse)
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyStore {
    values: Vec<String>,
}

impl Default for PropertyStore {
    fn default() -> Self {
        PropertyStore::new()
    }
}

impl PropertyStore {
    pub fn new() -> Self {
        PropertyStore {
            values: vec![UNSET.to_string(); PropertyKey::COUNT],
        }
    }

    pub fn set<S: Into<String>>(&mut self, key: PropertyKey, value: S) {
        self.values[key.index()] = value.into();
    }

    pub fn get(&self, key: PropertyKey) -> &str {
        &self.values[key.index()]
    }

    /// Lookup by free-form name.
    pub fn get_named(&self, name: &str) -> Result<&str> {
        Ok(self.get(name.parse()?))
    }

    /// Every key with its value, in schema order. The result is a copy.
    pub fn get_all(&self) -> Vec<(PropertyKey, String)> {
        PropertyKey::ALL
            .iter()
            .map(|&key| (key, self.get(key).to_string()))
            .collect()
    }

    pub fn is_populated(&self) -> bool {
        self.values.iter().all(|value| value != UNSET)
    }
}
