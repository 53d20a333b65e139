//! One record per USB mass storage device.
//!
//! A record merges the udev properties of a block device with the physical
//! device found on the USB bus, names from `usb.ids`, the device size and a
//! fingerprint over the static properties.
use crate::error::Result;
use crate::format::human_size;
use crate::host::{BlockDevice, BlockSubsystem, PhysicalDevice, UsbBus};
use crate::property::{PropertyKey, PropertyStore, UNSET};
use crate::usbids::UsbIds;
use serde::ser::{Serialize, SerializeMap, Serializer};
use sha2::{Digest, Sha256};
use std::fmt;

/// Properties the fingerprint is computed over, in hashing order. Changing
/// the order changes every fingerprint.
pub const CHKSUM_PROPERTIES: [PropertyKey; 17] = [
    PropertyKey::Bus,
    PropertyKey::DevType,
    PropertyKey::Type,
    PropertyKey::Driver,
    PropertyKey::DriveThumb,
    PropertyKey::Vendor,
    PropertyKey::VendorEnc,
    PropertyKey::Model,
    PropertyKey::ModelEnc,
    PropertyKey::Revision,
    PropertyKey::Size,
    PropertyKey::Vid,
    PropertyKey::Pid,
    PropertyKey::Serial,
    PropertyKey::SerialLong,
    PropertyKey::Interfaces,
    PropertyKey::InterfaceNum,
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceRecord {
    store: PropertyStore,
    widths: Vec<usize>,
}

impl fmt::Display for DeviceRecord {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(self.device())
    }
}

impl DeviceRecord {
    fn new(store: PropertyStore) -> Self {
        let widths = PropertyKey::ALL
            .iter()
            .map(|&key| store.get(key).chars().count())
            .collect();
        DeviceRecord { store, widths }
    }

    /// Device node path.
    pub fn device(&self) -> &str {
        self.store.get(PropertyKey::Device)
    }

    pub fn get(&self, key: PropertyKey) -> &str {
        self.store.get(key)
    }

    pub fn properties(&self) -> &PropertyStore {
        &self.store
    }

    /// Display length of the value of `key`.
    pub fn width(&self, key: PropertyKey) -> usize {
        self.widths[key as usize]
    }

    /// Compact JSON object of all properties, or of `keys` in the given
    /// order.
    pub fn serialize(&self, keys: Option<&[PropertyKey]>) -> Result<String> {
        Ok(serde_json::to_string(&self.view(keys))?)
    }

    pub(crate) fn view<'a>(&'a self, keys: Option<&'a [PropertyKey]>) -> RecordView<'a> {
        RecordView { record: self, keys }
    }
}

/// Serializes a record, optionally restricted to some keys.
pub(crate) struct RecordView<'a> {
    record: &'a DeviceRecord,
    keys: Option<&'a [PropertyKey]>,
}

impl<'a> Serialize for RecordView<'a> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let keys = self.keys.unwrap_or(&PropertyKey::ALL);
        let mut map = serializer.serialize_map(Some(keys.len()))?;
        for key in keys {
            map.serialize_entry(key.name(), self.record.get(*key))?;
        }
        map.end()
    }
}

/// SHA-256 over the concatenated fingerprint properties, as lowercase hex.
pub fn fingerprint(store: &PropertyStore) -> String {
    let mut hasher = Sha256::new();
    for key in CHKSUM_PROPERTIES.iter() {
        hasher.update(store.get(*key).as_bytes());
    }
    format!("{:x}", hasher.finalize())
}

/// Builds [`DeviceRecord`]s against one view of the host.
pub struct RecordBuilder<'a> {
    blocks: &'a dyn BlockSubsystem,
    bus: &'a dyn UsbBus,
    ids: &'a UsbIds,
    human_readable: bool,
}

impl<'a> RecordBuilder<'a> {
    pub fn new(
        blocks: &'a dyn BlockSubsystem,
        bus: &'a dyn UsbBus,
        ids: &'a UsbIds,
        human_readable: bool,
    ) -> Self {
        RecordBuilder {
            blocks,
            bus,
            ids,
            human_readable,
        }
    }

    pub fn build(&self, device: &BlockDevice) -> DeviceRecord {
        let mut store = PropertyStore::new();

        for key in PropertyKey::ALL.iter() {
            if let Some(value) = key.udev_name().and_then(|name| device.property(name)) {
                store.set(*key, value);
            }
        }

        let size = match self.blocks.raw_size(&device.node) {
            Ok(size) => size,
            Err(e) => {
                log::debug!("{}: size unavailable: {}", device.node, e);
                0
            }
        };
        store.set(PropertyKey::Size, size.to_string());

        let id = format!(
            "{}:{}",
            store.get(PropertyKey::Vid),
            store.get(PropertyKey::Pid)
        );
        store.set(PropertyKey::Id, id);

        let matched = self.match_physical(&store);
        if let [physical] = matched.as_slice() {
            store.set(PropertyKey::DevBus, physical.bus.to_string());
            store.set(PropertyKey::DevAddr, physical.address.to_string());
            store.set(PropertyKey::BusAddr, physical.bus_address());
            store.set(PropertyKey::UsbVer, physical.usb_version());
            store.set(PropertyKey::Speed, physical.speed.to_string());
        } else {
            log::debug!(
                "{}: {} physical devices match {}, bus fields left unset",
                device.node,
                matched.len(),
                store.get(PropertyKey::Id)
            );
        }

        let (vendor, model) = self
            .ids
            .lookup(store.get(PropertyKey::Vid), store.get(PropertyKey::Pid));
        store.set(PropertyKey::VendorStr, vendor);
        store.set(PropertyKey::ModelStr, model);

        let chksum = fingerprint(&store);
        store.set(PropertyKey::Chksum, chksum);

        if self.human_readable {
            store.set(PropertyKey::Size, human_size(size));
        }

        DeviceRecord::new(store)
    }

    /// Physical devices with the record's vid and pid. More than one is
    /// narrowed down by serial number, devices without a readable serial
    /// never match then.
    fn match_physical(&self, store: &PropertyStore) -> Vec<PhysicalDevice> {
        let (vid, pid) = match (
            parse_hex_id(store.get(PropertyKey::Vid)),
            parse_hex_id(store.get(PropertyKey::Pid)),
        ) {
            (Some(vid), Some(pid)) => (vid, pid),
            _ => return Vec::new(),
        };

        let devices = self.bus.find(vid, pid);
        if devices.len() <= 1 {
            return devices;
        }

        let serial = store.get(PropertyKey::Serial);
        self.bus
            .find(vid, pid)
            .into_iter()
            .filter(|dev| match dev.serial_number() {
                Some(s) => s == serial,
                None => {
                    log::debug!("{}: no serial, skipped", dev.bus_address());
                    false
                }
            })
            .collect()
    }
}

fn parse_hex_id(id: &str) -> Option<u16> {
    if id == UNSET {
        return None;
    }
    u16::from_str_radix(id, 16).ok()
}
