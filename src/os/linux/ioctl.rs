use nix::ioctl_read;
use std::fs::File;
use std::io;
use std::os::unix::io::AsRawFd;

// BLKGETSIZE64, _IOR(0x12, 114, size_t)
ioctl_read!(blkgetsize64, 0x12, 114, u64);

/// Size in bytes of the block device at `node`.
pub fn device_size(node: &str) -> io::Result<u64> {
    let file = File::open(node)?;
    let mut size: u64 = 0;
    unsafe { blkgetsize64(file.as_raw_fd(), &mut size) }
        .map_err(|errno| io::Error::from_raw_os_error(errno as i32))?;
    Ok(size)
}
