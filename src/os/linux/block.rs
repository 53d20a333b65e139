use super::ioctl;
use crate::error::{Error, Result};
use crate::host::{BlockDevice, BlockSubsystem};
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// Block devices from `<sysfs>/class/block`, with the properties udev
/// recorded for them in its database.
pub struct SysfsBlock {
    class_dir: PathBuf,
    udev_data: PathBuf,
}

/// `KEY=VALUE` lines of a sysfs `uevent` file.
fn parse_uevent(text: &str, properties: &mut HashMap<String, String>) {
    for line in text.lines() {
        if let Some((key, value)) = line.split_once('=') {
            properties.insert(key.to_string(), value.to_string());
        }
    }
}

/// A udev database record. `E:KEY=VALUE` lines are properties, `I:` holds
/// the initialisation time in microseconds.
fn parse_udev_record(text: &str, properties: &mut HashMap<String, String>) {
    for line in text.lines() {
        if let Some(property) = line.strip_prefix("E:") {
            if let Some((key, value)) = property.split_once('=') {
                properties.insert(key.to_string(), value.to_string());
            }
        } else if let Some(usec) = line.strip_prefix("I:") {
            properties
                .entry("USEC_INITIALIZED".to_string())
                .or_insert_with(|| usec.to_string());
        }
    }
}

impl SysfsBlock {
    pub fn new<P: AsRef<Path>, Q: AsRef<Path>>(sysfs_root: P, udev_data: Q) -> Self {
        SysfsBlock {
            class_dir: sysfs_root.as_ref().join("class/block"),
            udev_data: udev_data.as_ref().to_path_buf(),
        }
    }

    fn read_device(&self, name: &str) -> io::Result<BlockDevice> {
        let mut properties = HashMap::new();
        parse_uevent(
            &fs::read_to_string(self.class_dir.join(name).join("uevent"))?,
            &mut properties,
        );

        let devname = properties
            .get("DEVNAME")
            .map(String::as_str)
            .unwrap_or(name);
        let node = format!("/dev/{}", devname.trim_start_matches("/dev/"));
        properties.insert("DEVNAME".to_string(), node.clone());

        if let (Some(major), Some(minor)) = (properties.get("MAJOR"), properties.get("MINOR")) {
            let record = self.udev_data.join(format!("b{}:{}", major, minor));
            match fs::read_to_string(&record) {
                Ok(text) => parse_udev_record(&text, &mut properties),
                Err(e) => log::debug!("{}: no udev record {:?}: {}", node, record, e),
            }
        }

        Ok(BlockDevice { node, properties })
    }
}

impl BlockSubsystem for SysfsBlock {
    fn devices(&self) -> Result<Vec<BlockDevice>> {
        let entries = fs::read_dir(&self.class_dir).map_err(|source| Error::Enumeration {
            path: self.class_dir.clone(),
            source,
        })?;

        let mut devices = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("{:?}: {}", self.class_dir, e);
                    continue;
                }
            };
            let name = entry.file_name().to_string_lossy().into_owned();
            match self.read_device(&name) {
                Ok(device) => devices.push(device),
                Err(e) => log::warn!("Could not read block device {}: {}", name, e),
            }
        }
        Ok(devices)
    }

    fn raw_size(&self, node: &str) -> io::Result<u64> {
        ioctl::device_size(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn add_block(sysfs: &Path, udev: &Path, name: &str, minor: u32, devtype: &str, record: &str) {
        let dir = sysfs.join("class/block").join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(
            dir.join("uevent"),
            format!("MAJOR=8\nMINOR={}\nDEVNAME={}\nDEVTYPE={}\n", minor, name, devtype),
        )
        .unwrap();
        fs::create_dir_all(udev).unwrap();
        fs::write(udev.join(format!("b8:{}", minor)), record).unwrap();
    }

    #[test]
    fn merges_uevent_and_udev_record() {
        let root = tempfile::tempdir().unwrap();
        let sysfs = root.path().join("sys");
        let udev = root.path().join("udev");
        add_block(
            &sysfs,
            &udev,
            "sdb",
            16,
            "disk",
            "S:disk/by-id/usb-SanDisk\nI:123456789\nE:ID_BUS=usb\nE:ID_VENDOR_ID=0781\nG:systemd\n",
        );

        let blocks = SysfsBlock::new(&sysfs, &udev);
        let devices = blocks.devices().unwrap();
        assert_eq!(devices.len(), 1);
        let dev = &devices[0];
        assert_eq!(dev.node, "/dev/sdb");
        assert_eq!(dev.property("DEVNAME"), Some("/dev/sdb"));
        assert_eq!(dev.property("ID_BUS"), Some("usb"));
        assert_eq!(dev.property("ID_VENDOR_ID"), Some("0781"));
        assert_eq!(dev.property("USEC_INITIALIZED"), Some("123456789"));
        assert_eq!(dev.property("MINOR"), Some("16"));
        assert!(dev.is_usb_disk());
        assert_eq!(dev.property("S"), None);
    }

    #[test]
    fn missing_udev_record_is_not_an_error() {
        let root = tempfile::tempdir().unwrap();
        let sysfs = root.path().join("sys");
        let dir = sysfs.join("class/block/loop0");
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join("uevent"), "MAJOR=7\nMINOR=0\nDEVNAME=loop0\nDEVTYPE=disk\n").unwrap();

        let blocks = SysfsBlock::new(&sysfs, root.path().join("none"));
        let devices = blocks.devices().unwrap();
        assert_eq!(devices[0].node, "/dev/loop0");
        assert_eq!(devices[0].property("ID_BUS"), None);
    }

    #[test]
    fn unlistable_class_dir_fails_the_scan() {
        let root = tempfile::tempdir().unwrap();
        let blocks = SysfsBlock::new(root.path(), root.path());
        match blocks.devices() {
            Err(Error::Enumeration { path, .. }) => assert!(path.ends_with("class/block")),
            other => panic!("unexpected {:?}", other.map(|d| d.len())),
        }
    }

    #[test]
    fn size_of_missing_node_fails() {
        let root = tempfile::tempdir().unwrap();
        let blocks = SysfsBlock::new(root.path(), root.path());
        let node = root.path().join("nope");
        assert!(blocks.raw_size(&node.to_string_lossy()).is_err());
    }
}
