use std::fmt;
use std::fs::File;
use std::ops::Deref;
use std::path::Path;

use memmap2::Mmap;

use crate::transducer::TransducerError;

/// The bytes of a transducer image, either mapped from a file or owned.
pub enum ByteSource {
    /// A read-only file mapping.
    Mapped(Mmap),
    /// Bytes held on the heap.
    Owned(Vec<u8>),
}

impl ByteSource {
    /// Maps `path` read-only.
    pub fn map_file<P: AsRef<Path>>(path: P) -> Result<ByteSource, TransducerError> {
        let file = File::open(path).map_err(TransducerError::Io)?;
        // The mapping is read-only; the file must not be truncated while in use.
        let mmap = unsafe { Mmap::map(&file) }.map_err(TransducerError::Memmap)?;
        Ok(ByteSource::Mapped(mmap))
    }
}

impl Deref for ByteSource {
    type Target = [u8];

    #[inline(always)]
    fn deref(&self) -> &[u8] {
        match self {
            ByteSource::Mapped(mmap) => mmap,
            ByteSource::Owned(vec) => vec,
        }
    }
}

impl fmt::Debug for ByteSource {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ByteSource::Mapped(m) => write!(f, "Mapped({} bytes)", m.len()),
            ByteSource::Owned(v) => write!(f, "Owned({} bytes)", v.len()),
        }
    }
}
