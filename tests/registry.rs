use std::io;
use usbblk::{
    BlockDevice, BlockSubsystem, Error, PhysicalDevice, PropertyKey, Registry, Speed, UsbBus,
    UsbIds, UNSET,
};

struct FakeBlocks {
    devices: Vec<BlockDevice>,
}

impl BlockSubsystem for FakeBlocks {
    fn devices(&self) -> usbblk::Result<Vec<BlockDevice>> {
        Ok(self.devices.clone())
    }

    fn raw_size(&self, node: &str) -> io::Result<u64> {
        match node {
            "/dev/sda" => Ok(1024),
            "/dev/sdb" => Ok(16_008_609_792),
            _ => Err(io::Error::from(io::ErrorKind::PermissionDenied)),
        }
    }
}

struct Unlistable;

impl BlockSubsystem for Unlistable {
    fn devices(&self) -> usbblk::Result<Vec<BlockDevice>> {
        Err(Error::Enumeration {
            path: "/sys/class/block".into(),
            source: io::Error::from(io::ErrorKind::NotFound),
        })
    }

    fn raw_size(&self, _node: &str) -> io::Result<u64> {
        Ok(0)
    }
}

struct FakeBus {
    devices: Vec<PhysicalDevice>,
}

impl UsbBus for FakeBus {
    fn find(&self, vendor_id: u16, product_id: u16) -> Vec<PhysicalDevice> {
        self.devices
            .iter()
            .filter(|d| d.vendor_id == vendor_id && d.product_id == product_id)
            .cloned()
            .collect()
    }
}

fn block(node: &str, bus: &str, devtype: &str, vid: &str, pid: &str, serial: &str) -> BlockDevice {
    BlockDevice::new(node)
        .with("DEVNAME", node)
        .with("ID_BUS", bus)
        .with("DEVTYPE", devtype)
        .with("ID_VENDOR_ID", vid)
        .with("ID_MODEL_ID", pid)
        .with("ID_SERIAL_SHORT", serial)
}

fn physical(vid: u16, pid: u16, serial: &str, bus: u8, address: u8) -> PhysicalDevice {
    PhysicalDevice {
        vendor_id: vid,
        product_id: pid,
        serial: Some(serial.to_string()),
        bus,
        address,
        bcd_usb: 0x0300,
        speed: Speed::Super,
    }
}

fn ids() -> UsbIds {
    UsbIds::from_bytes(
        b"0781  SanDisk Corp.\n\t5567  Cruzer Blade\n\t5583  Ultra Fit\n090c  Silicon Motion\n",
    )
}

fn scan(human: bool) -> Registry {
    let blocks = FakeBlocks {
        devices: vec![
            block("/dev/sdb", "usb", "disk", "0781", "5583", "FIT01"),
            block("/dev/sdb1", "usb", "partition", "0781", "5583", "FIT01"),
            block("/dev/sda", "usb", "disk", "0781", "5567", "BLADE01"),
            block("/dev/nvme0n1", "nvme", "disk", "144d", "a808", "S4EWNX0"),
            block("/dev/sdc", "usb", "disk", "090c", "1000", "SAME"),
        ],
    };
    let bus = FakeBus {
        devices: vec![
            physical(0x0781, 0x5567, "BLADE01", 1, 4),
            physical(0x0781, 0x5583, "FIT01", 2, 9),
            physical(0x090c, 0x1000, "OTHER1", 3, 2),
            physical(0x090c, 0x1000, "OTHER2", 3, 5),
        ],
    };
    Registry::scan_with(&blocks, &bus, &ids(), human).unwrap()
}

#[test]
fn keeps_only_usb_disks_in_path_order() {
    let registry = scan(true);
    assert_eq!(registry.count(), 3);
    assert!(!registry.is_empty());
    assert_eq!(registry.device_paths(), vec!["/dev/sda", "/dev/sdb", "/dev/sdc"]);
    let records: Vec<String> = registry.records().iter().map(|r| r.to_string()).collect();
    assert_eq!(records, vec!["/dev/sda", "/dev/sdb", "/dev/sdc"]);
    assert!(registry.get("/dev/sdb1").is_none());
    assert!(registry.get("/dev/nvme0n1").is_none());
}

#[test]
fn records_are_complete_and_resolved() {
    let registry = scan(true);
    let sda = registry.get("/dev/sda").unwrap();
    assert_eq!(sda.get(PropertyKey::Size), "1.0K");
    assert_eq!(sda.get(PropertyKey::ModelStr), "Cruzer Blade");
    assert_eq!(sda.get(PropertyKey::BusAddr), "001:004");
    assert_eq!(sda.get(PropertyKey::UsbVer), "USB 3.0");
    assert_eq!(sda.get(PropertyKey::Speed), "4");

    let sdc = registry.get("/dev/sdc").unwrap();
    assert_eq!(sdc.get(PropertyKey::Id), "090c:1000");
    assert_eq!(sdc.get(PropertyKey::VendorStr), "Silicon Motion");
    assert_eq!(sdc.get(PropertyKey::ModelStr), "None");
    assert_eq!(sdc.get(PropertyKey::DevBus), UNSET);
    assert_eq!(sdc.get(PropertyKey::BusAddr), UNSET);
    assert_eq!(sdc.get(PropertyKey::Size), "0B");

    for rec in registry.records() {
        assert_eq!(rec.properties().get_all().len(), PropertyKey::COUNT);
        assert_eq!(rec.get(PropertyKey::Chksum).len(), 64);
    }
}

#[test]
fn raw_sizes() {
    let registry = scan(false);
    assert_eq!(registry.get("/dev/sda").unwrap().get(PropertyKey::Size), "1024");
    assert_eq!(
        registry.get("/dev/sdb").unwrap().get(PropertyKey::Size),
        "16008609792"
    );
}

#[test]
fn rescans_are_independent_and_deterministic() {
    let a = scan(false);
    let b = scan(true);
    for path in a.device_paths() {
        assert_eq!(
            a.get(path).unwrap().get(PropertyKey::Chksum),
            b.get(path).unwrap().get(PropertyKey::Chksum)
        );
    }
}

#[test]
fn label_width() {
    let registry = scan(true);
    assert_eq!(registry.max_label_width(PropertyKey::Chksum), 64);
    // "model_str" is longer than "Ultra Fit" but not "Cruzer Blade"
    assert_eq!(registry.max_label_width(PropertyKey::ModelStr), 12);
    assert_eq!(registry.max_label_width(PropertyKey::Label), "label".len());
    assert_eq!(Registry::default().max_label_width(PropertyKey::Id), 2);
}

#[test]
fn serialize_all_devices() {
    let registry = scan(true);
    let json = registry.serialize(Some(&[PropertyKey::Vid, PropertyKey::Pid]), None).unwrap();
    assert_eq!(
        json,
        r#"{"/dev/sda":{"vid":"0781","pid":"5567"},"/dev/sdb":{"vid":"0781","pid":"5583"},"/dev/sdc":{"vid":"090c","pid":"1000"}}"#
    );

    let full: serde_json::Value = serde_json::from_str(&registry.serialize(None, None).unwrap()).unwrap();
    let full = full.as_object().unwrap();
    assert_eq!(full.len(), 3);
    for record in full.values() {
        let record = record.as_object().unwrap();
        assert_eq!(record.len(), PropertyKey::COUNT);
        assert!(record.values().all(|v| v.is_string()));
    }
}

#[test]
fn serialize_one_device() {
    let registry = scan(true);
    let json = registry
        .serialize(Some(&[PropertyKey::BusAddr, PropertyKey::Device]), Some("/dev/sdb"))
        .unwrap();
    assert_eq!(json, r#"{"/dev/sdb":{"busaddr":"002:009","device":"/dev/sdb"}}"#);

    match registry.serialize(None, Some("/dev/sdz")) {
        Err(Error::DeviceNotFound(path)) => assert_eq!(path, "/dev/sdz"),
        other => panic!("unexpected {:?}", other),
    }
}

#[test]
fn empty_registry() {
    let blocks = FakeBlocks { devices: vec![] };
    let bus = FakeBus { devices: vec![] };
    let registry = Registry::scan_with(&blocks, &bus, &UsbIds::empty(), true).unwrap();
    assert!(registry.is_empty());
    assert_eq!(registry.serialize(None, None).unwrap(), "{}");
}

#[test]
fn failing_enumeration_aborts_scan() {
    let bus = FakeBus { devices: vec![] };
    let res = Registry::scan_with(&Unlistable, &bus, &UsbIds::empty(), true);
    assert!(matches!(res, Err(Error::Enumeration { .. })));
}
