use crate::{error::ConfigError, IdParts, SnowflakeId};
use typed_builder::TypedBuilder;

/// Number of bits available to the fields; the top bit of an id stays zero.
pub const AVAILABLE_BITS: u32 = 63;

/// Field widths of a snowflake id.
///
/// Fields are packed from most to least significant: timestamp, datacenter
/// id, worker id, sequence. The layout is right-aligned, so any bits left
/// unused above the timestamp are zero along with the reserved sign bit.
///
/// ```text
/// | 0 | timestamp (T) | datacenter (D) | worker (W) | sequence (S) |
/// ```
///
/// The default is the classic 41/5/5/12 split, which spends all 63 bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TypedBuilder)]
pub struct BitLayout {
    /// Width of the millisecond timestamp field.
    #[builder(default = 41)]
    pub timestamp_bits: u8,
    #[builder(default = 5)]
    pub datacenter_bits: u8,
    #[builder(default = 5)]
    pub worker_bits: u8,
    /// Width of the per-millisecond sequence; caps throughput at `2^S` ids/ms.
    #[builder(default = 12)]
    pub sequence_bits: u8,
}

impl Default for BitLayout {
    fn default() -> Self {
        Self::CLASSIC
    }
}

const fn field_mask(bits: u8) -> u64 {
    if bits == 0 {
        0
    } else if bits >= 64 {
        u64::MAX
    } else {
        u64::MAX >> (64 - bits as u32)
    }
}

impl BitLayout {
    /// The 41/5/5/12 layout used by Twitter's original scheme.
    pub const CLASSIC: Self = Self {
        timestamp_bits: 41,
        datacenter_bits: 5,
        worker_bits: 5,
        sequence_bits: 12,
    };

    pub fn total_bits(&self) -> u32 {
        self.timestamp_bits as u32
            + self.datacenter_bits as u32
            + self.worker_bits as u32
            + self.sequence_bits as u32
    }

    /// Checks that the fields fit into 63 bits and the timestamp field exists.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.timestamp_bits == 0 {
            return Err(ConfigError::EmptyTimestampField);
        }

        let total = self.total_bits();
        if total > AVAILABLE_BITS {
            return Err(ConfigError::LayoutTooWide { total });
        }

        Ok(())
    }

    pub fn max_timestamp(&self) -> u64 {
        field_mask(self.timestamp_bits)
    }

    pub fn max_datacenter_id(&self) -> u64 {
        field_mask(self.datacenter_bits)
    }

    pub fn max_worker_id(&self) -> u64 {
        field_mask(self.worker_bits)
    }

    pub fn max_sequence(&self) -> u64 {
        field_mask(self.sequence_bits)
    }

    fn worker_shift(&self) -> u32 {
        self.sequence_bits as u32
    }

    fn datacenter_shift(&self) -> u32 {
        self.worker_shift() + self.worker_bits as u32
    }

    fn timestamp_shift(&self) -> u32 {
        self.datacenter_shift() + self.datacenter_bits as u32
    }

    /// Packs the parts into an id.
    ///
    /// Each part is truncated to its field width, so packing never spills
    /// one field into its neighbour. Callers producing ids keep the parts in
    /// range; the generator checks this before it packs.
    pub fn pack(&self, parts: IdParts) -> SnowflakeId {
        let raw = (parts.timestamp & self.max_timestamp()) << self.timestamp_shift()
            | (parts.datacenter_id & self.max_datacenter_id()) << self.datacenter_shift()
            | (parts.worker_id & self.max_worker_id()) << self.worker_shift()
            | (parts.sequence & self.max_sequence());
        SnowflakeId::from_raw(raw)
    }

    /// Splits an id back into its fields.
    pub fn unpack(&self, id: SnowflakeId) -> IdParts {
        let raw = id.as_u64();
        IdParts {
            timestamp: (raw >> self.timestamp_shift()) & self.max_timestamp(),
            datacenter_id: (raw >> self.datacenter_shift()) & self.max_datacenter_id(),
            worker_id: (raw >> self.worker_shift()) & self.max_worker_id(),
            sequence: raw & self.max_sequence(),
        }
    }
}
