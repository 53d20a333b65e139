use std::fmt;
use std::slice::Iter;

pub const DEVICE_DESCRIPTOR_TYPE: u8 = 1;

/// Standard USB device descriptor, the first 18 bytes of a device's
/// `descriptors` blob in sysfs. All multi-byte fields are little endian.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Device {
    pub length: u8,
    pub kind: u8,
    pub bcd_usb: u16,
    pub device_class: u8,
    pub device_sub_class: u8,
    pub device_protocol: u8,
    pub max_packet_size0: u8,
    pub id_vendor: u16,
    pub id_product: u16,
    pub bcd_device: u16,
    pub imanufacturer: u8,
    pub iproduct: u8,
    pub iserial: u8,
    pub num_configurations: u8,
}

impl fmt::Display for Device {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(
            f,
            "{:04x}:{:04x} bcdUSB 0x{:04x} class {}",
            self.id_vendor, self.id_product, self.bcd_usb, self.device_class
        )
    }
}

fn le16(iter: &mut Iter<u8>) -> Option<u16> {
    Some(*iter.next()? as u16 | (*iter.next()? as u16) << 8)
}

impl Device {
    pub fn new(iter: &mut Iter<u8>) -> Option<Self> {
        Some(Device {
            length: *iter.next()?,
            kind: *iter.next()?,
            bcd_usb: le16(iter)?,
            device_class: *iter.next()?,
            device_sub_class: *iter.next()?,
            device_protocol: *iter.next()?,
            max_packet_size0: *iter.next()?,
            id_vendor: le16(iter)?,
            id_product: le16(iter)?,
            bcd_device: le16(iter)?,
            imanufacturer: *iter.next()?,
            iproduct: *iter.next()?,
            iserial: *iter.next()?,
            num_configurations: *iter.next()?,
        })
    }

    /// Parse the device descriptor at the start of `bytes`. Configuration
    /// descriptors that follow are ignored.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let device = Device::new(&mut bytes.iter())?;
        if device.kind != DEVICE_DESCRIPTOR_TYPE {
            log::debug!("Wrong descriptor type {} expected device", device.kind);
            return None;
        }
        Some(device)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SANDISK: [u8; 18] = [
        0x12, 0x01, 0x10, 0x02, 0x00, 0x00, 0x00, 0x40, 0x81, 0x07, 0x67, 0x55, 0x00, 0x01,
        0x01, 0x02, 0x03, 0x01,
    ];

    #[test]
    fn parse_device_descriptor() {
        let mut bytes = SANDISK.to_vec();
        // trailing configuration descriptor
        bytes.extend_from_slice(&[0x09, 0x02, 0x20, 0x00, 0x01, 0x01, 0x00, 0x80, 0x32]);
        let dev = Device::from_bytes(&bytes).unwrap();
        assert_eq!(dev.id_vendor, 0x0781);
        assert_eq!(dev.id_product, 0x5567);
        assert_eq!(dev.bcd_usb, 0x0210);
        assert_eq!(dev.iserial, 3);
        assert_eq!(dev.to_string(), "0781:5567 bcdUSB 0x0210 class 0");
    }

    #[test]
    fn short_or_wrong_type_is_rejected() {
        assert!(Device::from_bytes(&SANDISK[..10]).is_none());
        let mut bytes = SANDISK;
        bytes[1] = 0x02;
        assert!(Device::from_bytes(&bytes).is_none());
    }
}
