use crate::SnowflakeId;
use modular_bitfield::prelude::*;
use std::fmt;

/// Typed view of an id minted with the classic 41/5/5/12 layout.
///
/// Fields are listed least significant first; the bytes are little-endian,
/// so the view maps onto the `u64` value bit for bit.
#[bitfield]
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClassicId {
    /// 12 bits for sequence number (resets every millisecond).
    pub sequence: B12,
    /// 5 bits for worker ID (allows up to 32 workers per datacenter).
    pub worker_id: B5,
    /// 5 bits for datacenter ID (allows up to 32 datacenters).
    pub datacenter_id: B5,
    /// 41 bits for timestamp (milliseconds since a custom epoch, ~69 years).
    pub timestamp: B41,
    #[skip]
    __: B1,
}

impl From<SnowflakeId> for ClassicId {
    fn from(id: SnowflakeId) -> Self {
        ClassicId::from_bytes(id.as_u64().to_le_bytes())
    }
}

impl From<ClassicId> for SnowflakeId {
    fn from(id: ClassicId) -> Self {
        SnowflakeId::from_raw(u64::from_le_bytes(id.into_bytes()))
    }
}

impl fmt::Debug for ClassicId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassicId")
            .field("timestamp", &self.timestamp())
            .field("datacenter_id", &self.datacenter_id())
            .field("worker_id", &self.worker_id())
            .field("sequence", &self.sequence())
            .finish()
    }
}
