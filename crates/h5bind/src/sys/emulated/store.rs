//! File images and their on-disk encoding.
//!
//! An image is an arena of objects addressed by `index + 1`; address 1 is the
//! root group. Variable-length strings live in a per-file heap and are stored
//! in element slots as `heap index + 1` so that zeroed storage reads as NULL.

use std::collections::BTreeMap;
use std::fs;
use std::io::{self, Read, Seek, SeekFrom};
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::dtype::NativeType;
use super::plist::DatasetCreate;
use super::space::Extent;

pub(crate) type FileKey = u64;

pub(crate) const ROOT_ADDR: u64 = 1;
const MAGIC: &[u8; 8] = b"\x89H5BIND\n";
const FORMAT_VERSION: u32 = 1;
const HDF5_SIGNATURE: [u8; 8] = *b"\x89HDF\r\n\x1a\n";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredAttr {
    pub name: String,
    pub dtype: NativeType,
    pub extent: Extent,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredDataset {
    pub dtype: NativeType,
    pub extent: Extent,
    pub dcpl: DatasetCreate,
    pub data: Vec<u8>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) enum ObjectBody {
    Group { links: BTreeMap<String, u64> },
    Dataset(StoredDataset),
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct StoredObject {
    pub body: ObjectBody,
    pub attrs: Vec<StoredAttr>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub(crate) struct FileImage {
    pub userblock: u64,
    pub objects: Vec<StoredObject>,
    pub heap: Vec<Vec<u8>>,
}

impl FileImage {
    pub fn new(userblock: u64) -> Self {
        let root = StoredObject {
            body: ObjectBody::Group { links: BTreeMap::new() },
            attrs: Vec::new(),
        };
        Self { userblock, objects: vec![root], heap: Vec::new() }
    }

    pub fn object(&self, addr: u64) -> Option<&StoredObject> {
        addr.checked_sub(1).and_then(|i| self.objects.get(i as usize))
    }

    pub fn object_mut(&mut self, addr: u64) -> Option<&mut StoredObject> {
        addr.checked_sub(1).and_then(move |i| self.objects.get_mut(i as usize))
    }

    pub fn push(&mut self, object: StoredObject) -> u64 {
        self.objects.push(object);
        self.objects.len() as u64
    }

    /// First path (in name order) under which `addr` is reachable from the root.
    pub fn path_of(&self, addr: u64) -> Option<String> {
        if addr == ROOT_ADDR {
            return Some("/".to_owned());
        }
        let mut queue = vec![(ROOT_ADDR, String::new())];
        let mut seen = vec![false; self.objects.len() + 1];
        while !queue.is_empty() {
            let (current, prefix) = queue.remove(0);
            if std::mem::replace(&mut seen[current as usize], true) {
                continue;
            }
            if let Some(StoredObject { body: ObjectBody::Group { links }, .. }) = self.object(current) {
                for (name, &child) in links {
                    let path = format!("{prefix}/{name}");
                    if child == addr {
                        return Some(path);
                    }
                    queue.push((child, path));
                }
            }
        }
        None
    }

    pub fn save(&self, path: &Path) -> io::Result<()> {
        let body = postcard::to_stdvec(self)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))?;
        let mut bytes = Vec::with_capacity(MAGIC.len() + 4 + body.len());
        bytes.extend_from_slice(MAGIC);
        bytes.extend_from_slice(&FORMAT_VERSION.to_le_bytes());
        bytes.extend_from_slice(&body);
        fs::write(path, bytes)
    }

    pub fn load(path: &Path) -> io::Result<Self> {
        let bytes = fs::read(path)?;
        if !has_signature(&bytes) {
            return Err(io::Error::new(io::ErrorKind::InvalidData, "file signature not found"));
        }
        let version = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]);
        if version != FORMAT_VERSION {
            return Err(io::Error::new(
                io::ErrorKind::InvalidData,
                format!("unsupported format version {version}"),
            ));
        }
        postcard::from_bytes(&bytes[12..])
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
    }
}

fn has_signature(bytes: &[u8]) -> bool {
    bytes.len() >= MAGIC.len() + 4 && &bytes[..MAGIC.len()] == MAGIC
}

/// Whether the file at `path` starts with the image signature.
pub(crate) fn is_image(path: &Path) -> io::Result<bool> {
    let mut head = [0u8; 12];
    let mut file = fs::File::open(path)?;
    let mut read = 0;
    while read < head.len() {
        let n = file.read(&mut head[read..])?;
        if n == 0 {
            break;
        }
        read += n;
    }
    Ok(has_signature(&head[..read]))
}

/// Whether an HDF5 superblock signature sits at offset 0 or at a power of two
/// from 512 on, where a userblock would push it.
pub(crate) fn has_hdf5_signature(path: &Path) -> io::Result<bool> {
    let mut file = fs::File::open(path)?;
    let len = file.metadata()?.len();
    let mut offset = 0_u64;
    while offset + HDF5_SIGNATURE.len() as u64 <= len {
        let mut head = [0u8; 8];
        file.seek(SeekFrom::Start(offset))?;
        file.read_exact(&mut head)?;
        if head == HDF5_SIGNATURE {
            return Ok(true);
        }
        offset = if offset == 0 { 512 } else { offset * 2 };
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.h5");
        let mut image = FileImage::new(512);
        let addr = image.push(StoredObject {
            body: ObjectBody::Group { links: BTreeMap::new() },
            attrs: Vec::new(),
        });
        if let Some(StoredObject { body: ObjectBody::Group { links }, .. }) = image.object_mut(ROOT_ADDR) {
            links.insert("child".into(), addr);
        }
        image.save(&path).unwrap();
        assert!(is_image(&path).unwrap());

        let loaded = FileImage::load(&path).unwrap();
        assert_eq!(loaded.userblock, 512);
        assert_eq!(loaded.objects.len(), 2);
        assert_eq!(loaded.path_of(addr).as_deref(), Some("/child"));
    }

    #[test]
    fn test_foreign_file_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("plain.txt");
        fs::write(&path, b"not an image at all").unwrap();
        assert!(!is_image(&path).unwrap());
        assert!(FileImage::load(&path).is_err());
    }

    #[test]
    fn test_hdf5_signature_search() {
        let dir = tempfile::tempdir().unwrap();
        let image = dir.path().join("image.h5");
        FileImage::new(0).save(&image).unwrap();
        assert!(!has_hdf5_signature(&image).unwrap());

        let plain = dir.path().join("plain.h5");
        let mut bytes = HDF5_SIGNATURE.to_vec();
        bytes.resize(64, 0);
        fs::write(&plain, &bytes).unwrap();
        assert!(has_hdf5_signature(&plain).unwrap());

        let with_userblock = dir.path().join("userblock.h5");
        let mut bytes = vec![0u8; 1024];
        bytes.extend_from_slice(&HDF5_SIGNATURE);
        fs::write(&with_userblock, &bytes).unwrap();
        assert!(has_hdf5_signature(&with_userblock).unwrap());

        let misplaced = dir.path().join("misplaced.h5");
        let mut bytes = vec![0u8; 700];
        bytes.extend_from_slice(&HDF5_SIGNATURE);
        fs::write(&misplaced, &bytes).unwrap();
        assert!(!has_hdf5_signature(&misplaced).unwrap());
    }
}
