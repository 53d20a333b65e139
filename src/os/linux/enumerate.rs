use crate::descriptors::device::Device;
use crate::host::{PhysicalDevice, Speed, UsbBus};
use std::fs;
use std::io::{self, Error, ErrorKind};
use std::path::{Path, PathBuf};

/// USB devices as listed in `<sysfs>/bus/usb/devices`.
pub struct SysfsUsb {
    devices_dir: PathBuf,
}

fn attribute(dir: &Path, name: &str) -> io::Result<String> {
    Ok(fs::read_to_string(dir.join(name))?.trim().to_string())
}

fn numeric_attribute(dir: &Path, name: &str) -> io::Result<u8> {
    attribute(dir, name)?.parse::<u8>().map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("{:?}: {} is not a number: {}", dir, name, e),
        )
    })
}

impl SysfsUsb {
    pub fn new<P: AsRef<Path>>(sysfs_root: P) -> Self {
        SysfsUsb {
            devices_dir: sysfs_root.as_ref().join("bus/usb/devices"),
        }
    }

    /// Every device on every bus. Interfaces (`1-1:1.0`) are not devices and
    /// are skipped, so is any device that cannot be read.
    pub fn enumerate(&self) -> io::Result<Vec<PhysicalDevice>> {
        let mut devices = Vec::new();
        for entry in fs::read_dir(&self.devices_dir)? {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("{:?}: {}", self.devices_dir, e);
                    continue;
                }
            };
            if entry.file_name().to_string_lossy().contains(':') {
                continue;
            }
            let path = entry.path();
            match self.read_device(&path) {
                Ok(device) => devices.push(device),
                Err(e) => log::warn!("Could not read USB device {:?}: {}", path, e),
            }
        }
        Ok(devices)
    }

    fn read_device(&self, dir: &Path) -> io::Result<PhysicalDevice> {
        let bytes = fs::read(dir.join("descriptors"))?;
        let device = Device::from_bytes(&bytes).ok_or_else(|| {
            Error::new(
                ErrorKind::InvalidData,
                format!("No device descriptor found. {:02X?}", bytes),
            )
        })?;

        let serial = match attribute(dir, "serial") {
            Ok(serial) => Some(serial),
            Err(e) => {
                log::debug!("{:?}: no serial: {}", dir, e);
                None
            }
        };
        let speed = attribute(dir, "speed")
            .map(|mbps| Speed::from_mbps(&mbps))
            .unwrap_or_default();

        Ok(PhysicalDevice {
            vendor_id: device.id_vendor,
            product_id: device.id_product,
            serial,
            bus: numeric_attribute(dir, "busnum")?,
            address: numeric_attribute(dir, "devnum")?,
            bcd_usb: device.bcd_usb,
            speed,
        })
    }
}

impl UsbBus for SysfsUsb {
    fn find(&self, vendor_id: u16, product_id: u16) -> Vec<PhysicalDevice> {
        match self.enumerate() {
            Ok(devices) => devices
                .into_iter()
                .filter(|d| d.vendor_id == vendor_id && d.product_id == product_id)
                .collect(),
            Err(e) => {
                log::warn!("Could not enumerate {:?}: {}", self.devices_dir, e);
                Vec::new()
            }
        }
    }
}
