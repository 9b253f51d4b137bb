//! Per-node subnetwork tags
//!
//! One byte per node, `0` meaning "no subnetwork assigned". Routing code uses
//! the tags to reject queries between different subnetworks before searching.
//!
//! File format (`subnetworks.bin`, little-endian):
//!
//! Header (16 bytes):
//!   magic:     u32 = 0x5355424E  // "SUBN"
//!   version:   u16 = 1
//!   reserved:  u16 = 0
//!   count:     u64 = n_nodes
//!
//! Body (count bytes):
//!   subnetwork[count]  // 0..=127
//!
//! Footer (16 bytes):
//!   body_crc64:  u64
//!   file_crc64:  u64

use std::fs::File;
use std::io::{BufWriter, Read, Write};
use std::path::Path;

use butterfly_common::{Error, Result};
use crc::{Crc, CRC_64_GO_ISO};

const MAGIC: u32 = 0x5355424E; // "SUBN"
const VERSION: u16 = 1;
const HEADER_SIZE: usize = 16;
const FOOTER_SIZE: usize = 16;

static CRC64: Crc<u64> = Crc::<u64>::new(&CRC_64_GO_ISO);

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SubnetworkStorage {
    subnetworks: Vec<u8>,
}

impl SubnetworkStorage {
    pub const UNASSIGNED: u8 = 0;
    pub const MAX_SUBNETWORK: u8 = 127;

    /// Storage for `nodes` nodes, all unassigned
    pub fn create(nodes: usize) -> Self {
        Self {
            subnetworks: vec![Self::UNASSIGNED; nodes],
        }
    }

    pub fn set_subnetwork(&mut self, node: u32, subnetwork: u32) -> Result<()> {
        if subnetwork > Self::MAX_SUBNETWORK as u32 {
            return Err(Error::InvalidSubnetwork {
                node,
                value: subnetwork,
            });
        }
        let nodes = self.subnetworks.len();
        let slot = self
            .subnetworks
            .get_mut(node as usize)
            .ok_or(Error::NodeOutOfRange { node, nodes })?;
        *slot = subnetwork as u8;
        Ok(())
    }

    /// # Panics
    ///
    /// If `node` is out of range.
    pub fn subnetwork(&self, node: u32) -> u8 {
        self.subnetworks[node as usize]
    }

    /// `None` if either node has no subnetwork
    pub fn same_subnetwork(&self, a: u32, b: u32) -> Option<bool> {
        let (a, b) = (self.subnetwork(a), self.subnetwork(b));
        if a == Self::UNASSIGNED || b == Self::UNASSIGNED {
            None
        } else {
            Some(a == b)
        }
    }

    pub fn len(&self) -> usize {
        self.subnetworks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.subnetworks.is_empty()
    }

    /// Number of nodes per tag, indexed by tag
    pub fn tag_counts(&self) -> [usize; 128] {
        let mut counts = [0usize; 128];
        for &tag in &self.subnetworks {
            counts[tag as usize] += 1;
        }
        counts
    }

    pub fn write<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let file = File::create(path.as_ref())?;
        let mut writer = BufWriter::new(file);

        let mut header = Vec::with_capacity(HEADER_SIZE);
        header.extend_from_slice(&MAGIC.to_le_bytes());
        header.extend_from_slice(&VERSION.to_le_bytes());
        header.extend_from_slice(&0u16.to_le_bytes());
        header.extend_from_slice(&(self.subnetworks.len() as u64).to_le_bytes());
        debug_assert_eq!(header.len(), HEADER_SIZE);

        writer.write_all(&header)?;
        writer.write_all(&self.subnetworks)?;

        let body_crc64 = CRC64.checksum(&self.subnetworks);
        let mut file_digest = CRC64.digest();
        file_digest.update(&header);
        file_digest.update(&self.subnetworks);
        let file_crc64 = file_digest.finalize();

        writer.write_all(&body_crc64.to_le_bytes())?;
        writer.write_all(&file_crc64.to_le_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Read and verify a file written by [`write`](Self::write)
    pub fn read<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let mut data = Vec::new();
        File::open(path)?.read_to_end(&mut data)?;

        if data.len() < HEADER_SIZE + FOOTER_SIZE {
            return Err(invalid(path, format!("file too short ({} bytes)", data.len())));
        }

        let magic = u32::from_le_bytes([data[0], data[1], data[2], data[3]]);
        if magic != MAGIC {
            return Err(invalid(
                path,
                format!("expected magic 0x{:08x}, got 0x{:08x}", MAGIC, magic),
            ));
        }
        let version = u16::from_le_bytes([data[4], data[5]]);
        if version != VERSION {
            return Err(invalid(path, format!("unsupported version {}", version)));
        }
        let mut count = [0u8; 8];
        count.copy_from_slice(&data[8..16]);
        let count = u64::from_le_bytes(count);

        let expected_size = HEADER_SIZE as u64 + count + FOOTER_SIZE as u64;
        if data.len() as u64 != expected_size {
            return Err(invalid(
                path,
                format!(
                    "size mismatch: expected {} bytes, got {} bytes",
                    expected_size,
                    data.len()
                ),
            ));
        }

        let body_end = HEADER_SIZE + count as usize;
        let body = &data[HEADER_SIZE..body_end];
        let mut footer = [0u8; 8];
        footer.copy_from_slice(&data[body_end..body_end + 8]);
        let body_crc64 = u64::from_le_bytes(footer);
        footer.copy_from_slice(&data[body_end + 8..]);
        let file_crc64 = u64::from_le_bytes(footer);

        if CRC64.checksum(body) != body_crc64 || CRC64.checksum(&data[..body_end]) != file_crc64 {
            return Err(invalid(path, "checksum mismatch".to_string()));
        }

        if let Some(node) = body.iter().position(|&v| v > Self::MAX_SUBNETWORK) {
            return Err(Error::InvalidSubnetwork {
                node: node as u32,
                value: body[node] as u32,
            });
        }

        Ok(Self {
            subnetworks: body.to_vec(),
        })
    }
}

fn invalid(path: &Path, message: String) -> Error {
    Error::InvalidFormat(format!("{}: {}", path.display(), message))
}
