use std::path::PathBuf;

/// Where a scan looks for things on the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// `usb.ids` override, preferred when present.
    pub usb_ids_local: PathBuf,
    /// `usb.ids` shipped by the distribution.
    pub usb_ids_distro: PathBuf,
    pub sysfs_root: PathBuf,
    /// udev database, one `b<major>:<minor>` file per block device.
    pub udev_data: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            usb_ids_local: PathBuf::from("./usb.ids"),
            usb_ids_distro: PathBuf::from("/usr/share/hwdata/usb.ids"),
            sysfs_root: PathBuf::from("/sys"),
            udev_data: PathBuf::from("/run/udev/data"),
        }
    }
}
