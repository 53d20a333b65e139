//! Vendor and product names from the `usb.ids` list.
//!
//! Format, as published on <http://www.linux-usb.org/usb.ids>:
//!
//! ```text
//! # comment
//! 1d6b  Linux Foundation
//! <TAB>0002  2.0 root hub
//! ```
//!
//! Only the vendor section is read, parsing stops at the device class
//! section header.
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Returned by [`UsbIds::lookup`] for an id that is not listed.
pub const NOT_FOUND: &str = "None";

const CLASS_SECTION: &str = "# List of known device classes, subclasses and protocols";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vendor {
    pub name: String,
    pub devices: HashMap<String, String>,
}

#[derive(Debug, Default)]
pub struct UsbIds {
    vendors: HashMap<String, Vendor>,
    file: Option<PathBuf>,
    downloaded: bool,
}

#[derive(Default)]
struct ParseState {
    vendors: HashMap<String, Vendor>,
    current: Option<String>,
}

impl ParseState {
    fn feed(mut self, lineno: usize, line: &str) -> Self {
        let line = line.trim_end();
        if line.trim_start().is_empty() || line.starts_with('#') {
            return self;
        }

        match line.strip_prefix('\t') {
            None => match split_entry(line) {
                Some((vid, name)) => {
                    self.vendors.insert(
                        vid.to_string(),
                        Vendor {
                            name: name.to_string(),
                            devices: HashMap::new(),
                        },
                    );
                    self.current = Some(vid.to_string());
                }
                None => log::warn!("usb.ids:{}: malformed vendor line skipped", lineno),
            },
            Some(rest) => {
                let vendor = match &self.current {
                    Some(vid) => self.vendors.get_mut(vid),
                    None => None,
                };
                match (vendor, split_entry(rest)) {
                    (Some(vendor), Some((pid, desc))) => {
                        vendor.devices.insert(pid.to_string(), desc.to_string());
                    }
                    (None, _) => log::warn!("usb.ids:{}: device line without vendor", lineno),
                    (_, None) => log::warn!("usb.ids:{}: malformed device line skipped", lineno),
                }
            }
        }
        self
    }
}

/// Split `"<id> <description>"`, both parts must be non-empty.
fn split_entry(line: &str) -> Option<(&str, &str)> {
    let line = line.trim_start();
    let split = line.find(char::is_whitespace)?;
    let (id, rest) = line.split_at(split);
    let rest = rest.trim();
    if rest.is_empty() {
        return None;
    }
    Some((id, rest))
}

fn latin1(bytes: &[u8]) -> String {
    bytes.iter().map(|&b| char::from(b)).collect()
}

impl UsbIds {
    /// An empty list, every lookup misses.
    pub fn empty() -> Self {
        UsbIds::default()
    }

    /// Load `local` if it exists, otherwise `distro`. Neither existing, or
    /// the chosen file not being readable, gives an empty list.
    pub fn load<P: AsRef<Path>, Q: AsRef<Path>>(local: P, distro: Q) -> Self {
        let (file, downloaded) = if local.as_ref().is_file() {
            (local.as_ref(), true)
        } else if distro.as_ref().is_file() {
            (distro.as_ref(), false)
        } else {
            log::debug!(
                "No usb.ids found at {:?} or {:?}",
                local.as_ref(),
                distro.as_ref()
            );
            return UsbIds::empty();
        };

        match fs::read(file) {
            Ok(bytes) => {
                let mut ids = UsbIds::from_bytes(&bytes);
                log::info!("Loaded {} vendors from {:?}", ids.vendors.len(), file);
                ids.file = Some(file.to_path_buf());
                ids.downloaded = downloaded;
                ids
            }
            Err(e) => {
                log::warn!("Could not read {:?}: {}", file, e);
                UsbIds::empty()
            }
        }
    }

    /// Parse Latin-1 encoded list contents.
    pub fn from_bytes(bytes: &[u8]) -> Self {
        let text = latin1(bytes);
        let state = text
            .lines()
            .enumerate()
            .take_while(|(_, line)| !line.starts_with(CLASS_SECTION))
            .fold(ParseState::default(), |state, (n, line)| state.feed(n + 1, line));
        UsbIds {
            vendors: state.vendors,
            file: None,
            downloaded: false,
        }
    }

    /// True if a list file was found.
    pub fn is_loaded(&self) -> bool {
        self.file.is_some()
    }

    /// True if the list was loaded from the local override path.
    pub fn is_override(&self) -> bool {
        self.file.is_some() && self.downloaded
    }

    pub fn file(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    pub fn vendor(&self, vid: &str) -> Option<&Vendor> {
        self.vendors.get(vid)
    }

    /// Vendor and product name, `"None"` for whichever is not listed.
    pub fn lookup(&self, vid: &str, pid: &str) -> (String, String) {
        match self.vendors.get(vid) {
            Some(vendor) => (
                vendor.name.clone(),
                vendor
                    .devices
                    .get(pid)
                    .cloned()
                    .unwrap_or_else(|| NOT_FOUND.to_string()),
            ),
            None => (NOT_FOUND.to_string(), NOT_FOUND.to_string()),
        }
    }
}
