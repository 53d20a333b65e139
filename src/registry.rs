//! All USB mass storage devices found by one scan.
#[cfg(target_os = "linux")]
use crate::config::Config;
use crate::device::{DeviceRecord, RecordBuilder, RecordView};
use crate::error::{Error, Result};
use crate::host::{BlockSubsystem, UsbBus};
#[cfg(target_os = "linux")]
use crate::os::linux::{SysfsBlock, SysfsUsb};
use crate::property::PropertyKey;
use crate::usbids::UsbIds;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;

/// Snapshot of the devices present when [`Registry::scan`] ran, keyed and
/// ordered by device node path.
#[derive(Debug, Default)]
pub struct Registry {
    devices: BTreeMap<String, DeviceRecord>,
}

impl Registry {
    /// Scan the host described by `config`.
    #[cfg(target_os = "linux")]
    pub fn scan(config: &Config, human_readable: bool) -> Result<Self> {
        let ids = UsbIds::load(&config.usb_ids_local, &config.usb_ids_distro);
        let blocks = SysfsBlock::new(&config.sysfs_root, &config.udev_data);
        let bus = SysfsUsb::new(&config.sysfs_root);
        Registry::scan_with(&blocks, &bus, &ids, human_readable)
    }

    pub fn scan_with(
        blocks: &dyn BlockSubsystem,
        bus: &dyn UsbBus,
        ids: &UsbIds,
        human_readable: bool,
    ) -> Result<Self> {
        let builder = RecordBuilder::new(blocks, bus, ids, human_readable);
        let devices = blocks
            .devices()?
            .into_iter()
            .filter(|dev| dev.is_usb_disk())
            .map(|dev| {
                log::debug!("Building record for {}", dev.node);
                (dev.node.clone(), builder.build(&dev))
            })
            .collect();
        Ok(Registry { devices })
    }

    pub fn get(&self, device: &str) -> Option<&DeviceRecord> {
        self.devices.get(device)
    }

    /// Device node paths, sorted.
    pub fn device_paths(&self) -> Vec<&str> {
        self.devices.keys().map(String::as_str).collect()
    }

    /// Records in device path order.
    pub fn records(&self) -> Vec<&DeviceRecord> {
        self.devices.values().collect()
    }

    pub fn properties(&self) -> &'static [PropertyKey] {
        &PropertyKey::ALL
    }

    pub fn count(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    /// Column width for `key`: the longest of its name and every value.
    pub fn max_label_width(&self, key: PropertyKey) -> usize {
        self.devices
            .values()
            .map(|rec| rec.width(key))
            .fold(key.name().len(), usize::max)
    }

    /// Compact JSON object keyed by device path. `only` restricts the
    /// output to that one device, `properties` to those keys in that order.
    pub fn serialize(&self, properties: Option<&[PropertyKey]>, only: Option<&str>) -> Result<String> {
        let selected: Vec<(&str, &DeviceRecord)> = match only {
            Some(path) => {
                let rec = self
                    .devices
                    .get(path)
                    .ok_or_else(|| Error::DeviceNotFound(path.to_string()))?;
                vec![(path, rec)]
            }
            None => self
                .devices
                .iter()
                .map(|(path, rec)| (path.as_str(), rec))
                .collect(),
        };
        let view = RegistryView {
            selected,
            properties,
        };
        Ok(serde_json::to_string(&view)?)
    }
}

struct RegistryView<'a> {
    selected: Vec<(&'a str, &'a DeviceRecord)>,
    properties: Option<&'a [PropertyKey]>,
}

impl<'a> Serialize for RegistryView<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.selected.len()))?;
        for (path, rec) in &self.selected {
            let view: RecordView = rec.view(self.properties);
            map.serialize_entry(path, &view)?;
        }
        map.end()
    }
}
