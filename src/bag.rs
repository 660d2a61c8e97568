//! The item-bag record layout (the `BagSave` block's payload).
//!
//! A fixed 48128-byte region: 3000 slots of 16 bytes each, one slot per
//! item id, followed by a 4-byte pocket-release bitfield and a 124-byte
//! reserved tail.  Slot `i` describes item `i`; empty slots have a
//! quantity of zero.  Reserved regions are carried through verbatim so an
//! edit round-trips byte-for-byte.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use thiserror::Error;

/// Byte length of the whole bag record.
pub const BAG_SIZE: usize = 48_128;

/// Number of item slots.
pub const BAG_SLOTS: usize = 3000;

const ENTRY_SIZE: usize = 16;
const RELEASE_OFFSET: usize = BAG_SLOTS * ENTRY_SIZE;
const POCKET_COUNT: u8 = 16;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum BagError {
    #[error("bag record must be {BAG_SIZE} bytes, got {0}")]
    WrongSize(usize),
    #[error("bag entry must be {ENTRY_SIZE} bytes, got {0}")]
    WrongEntrySize(usize),
}

// ── Per-item entry ───────────────────────────────────────────────────────────

/// Per-item status bits within a [`BagEntry`]'s flag byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BagFlag {
    New,
    Favorite,
    Obtained,
    ShopNew,
    MegaStone,
}

impl BagFlag {
    fn bit(self) -> u8 {
        match self {
            BagFlag::New       => 0,
            BagFlag::Favorite  => 1,
            BagFlag::Obtained  => 2,
            BagFlag::ShopNew   => 3,
            BagFlag::MegaStone => 4,
        }
    }
}

/// One 16-byte item slot: category, quantity, a status flag byte, and a
/// reserved tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagEntry {
    pub category: i32,
    pub quantity: u32,
    flags:        u8,
    reserve:      [u8; 7],
}

impl BagEntry {
    pub fn from_bytes(data: &[u8]) -> Result<Self, BagError> {
        if data.len() != ENTRY_SIZE {
            return Err(BagError::WrongEntrySize(data.len()));
        }
        let mut reserve = [0u8; 7];
        reserve.copy_from_slice(&data[9..16]);
        Ok(Self {
            category: LittleEndian::read_i32(&data[0..4]),
            quantity: LittleEndian::read_u32(&data[4..8]),
            flags:    data[8],
            reserve,
        })
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut out = [0u8; ENTRY_SIZE];
        LittleEndian::write_i32(&mut out[0..4], self.category);
        LittleEndian::write_u32(&mut out[4..8], self.quantity);
        out[8] = self.flags;
        out[9..16].copy_from_slice(&self.reserve);
        out
    }

    pub fn flag(&self, flag: BagFlag) -> bool {
        self.flags & (1 << flag.bit()) != 0
    }

    pub fn set_flag(&mut self, flag: BagFlag, value: bool) {
        if value {
            self.flags |= 1 << flag.bit();
        } else {
            self.flags &= !(1 << flag.bit());
        }
    }

    /// A slot holding no items.
    pub fn is_empty(&self) -> bool {
        self.quantity == 0
    }
}

impl fmt::Display for BagEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "category {} x{}", self.category, self.quantity)?;
        let names = [
            (BagFlag::New, "new"),
            (BagFlag::Favorite, "favorite"),
            (BagFlag::Obtained, "obtained"),
            (BagFlag::ShopNew, "shop-new"),
            (BagFlag::MegaStone, "mega-stone"),
        ];
        for (flag, name) in names {
            if self.flag(flag) {
                write!(f, " [{name}]")?;
            }
        }
        Ok(())
    }
}

// ── Whole-bag record ─────────────────────────────────────────────────────────

/// The complete bag record: every slot, the pocket-release bitfield, and
/// the reserved tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BagSave {
    entries:         Vec<BagEntry>,
    release_pockets: u16,
    release_padding: [u8; 2],
    reserve:         [u8; 124],
}

impl BagSave {
    pub fn from_bytes(data: &[u8]) -> Result<Self, BagError> {
        if data.len() != BAG_SIZE {
            return Err(BagError::WrongSize(data.len()));
        }

        let mut entries = Vec::with_capacity(BAG_SLOTS);
        for chunk in data[..RELEASE_OFFSET].chunks_exact(ENTRY_SIZE) {
            entries.push(BagEntry::from_bytes(chunk)?);
        }

        let mut release_padding = [0u8; 2];
        release_padding.copy_from_slice(&data[RELEASE_OFFSET + 2..RELEASE_OFFSET + 4]);
        let mut reserve = [0u8; 124];
        reserve.copy_from_slice(&data[RELEASE_OFFSET + 4..]);

        Ok(Self {
            entries,
            release_pockets: LittleEndian::read_u16(&data[RELEASE_OFFSET..RELEASE_OFFSET + 2]),
            release_padding,
            reserve,
        })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(BAG_SIZE);
        for entry in &self.entries {
            out.extend_from_slice(&entry.to_bytes());
        }
        let mut release = [0u8; 2];
        LittleEndian::write_u16(&mut release, self.release_pockets);
        out.extend_from_slice(&release);
        out.extend_from_slice(&self.release_padding);
        out.extend_from_slice(&self.reserve);
        out
    }

    /// The slot for `item_id`, when it is in range.
    pub fn entry(&self, item_id: usize) -> Option<&BagEntry> {
        self.entries.get(item_id)
    }

    pub fn entry_mut(&mut self, item_id: usize) -> Option<&mut BagEntry> {
        self.entries.get_mut(item_id)
    }

    /// Number of slots holding at least one item.
    pub fn occupied_slots(&self) -> usize {
        self.entries.iter().filter(|e| !e.is_empty()).count()
    }

    /// Whether pocket `pocket` (0..16) has been unlocked.
    pub fn pocket_released(&self, pocket: u8) -> bool {
        pocket < POCKET_COUNT && self.release_pockets & (1 << pocket) != 0
    }

    pub fn set_pocket_released(&mut self, pocket: u8, released: bool) {
        if pocket >= POCKET_COUNT {
            return;
        }
        if released {
            self.release_pockets |= 1 << pocket;
        } else {
            self.release_pockets &= !(1 << pocket);
        }
    }
}

impl fmt::Display for BagSave {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let released = (0..POCKET_COUNT).filter(|&p| self.pocket_released(p)).count();
        write!(
            f,
            "{} of {} slots filled, {} pocket(s) released",
            self.occupied_slots(),
            BAG_SLOTS,
            released,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bag_round_trips_bytes() {
        let data: Vec<u8> = (0..BAG_SIZE).map(|i| (i * 11 + 5) as u8).collect();
        let bag = BagSave::from_bytes(&data).unwrap();
        assert_eq!(bag.to_bytes(), data);
    }

    #[test]
    fn wrong_size_is_rejected() {
        assert_eq!(BagSave::from_bytes(&[0u8; 16]), Err(BagError::WrongSize(16)));
        assert_eq!(BagEntry::from_bytes(&[0u8; 15]), Err(BagError::WrongEntrySize(15)));
    }

    #[test]
    fn entry_flags_are_independent_bits() {
        let mut entry = BagEntry::from_bytes(&[0u8; 16]).unwrap();
        entry.set_flag(BagFlag::Favorite, true);
        entry.set_flag(BagFlag::MegaStone, true);
        assert!(entry.flag(BagFlag::Favorite));
        assert!(entry.flag(BagFlag::MegaStone));
        assert!(!entry.flag(BagFlag::New));
        entry.set_flag(BagFlag::Favorite, false);
        assert!(!entry.flag(BagFlag::Favorite));
        assert!(entry.flag(BagFlag::MegaStone));
        assert_eq!(entry.to_bytes()[8], 1 << 4);
    }

    #[test]
    fn occupancy_counts_nonzero_quantities() {
        let mut data = vec![0u8; BAG_SIZE];
        data[4] = 3; // slot 0: quantity 3
        data[16 + 4] = 1; // slot 1: quantity 1
        let bag = BagSave::from_bytes(&data).unwrap();
        assert_eq!(bag.occupied_slots(), 2);
        assert!(bag.entry(2).unwrap().is_empty());
        assert!(bag.entry(BAG_SLOTS).is_none());
    }

    #[test]
    fn pocket_release_bitfield() {
        let mut bag = BagSave::from_bytes(&vec![0u8; BAG_SIZE]).unwrap();
        assert!(!bag.pocket_released(0));
        bag.set_pocket_released(0, true);
        bag.set_pocket_released(15, true);
        assert!(bag.pocket_released(0));
        assert!(bag.pocket_released(15));
        // Out-of-range pockets are never released and never stored.
        bag.set_pocket_released(16, true);
        assert!(!bag.pocket_released(16));
        let wire = bag.to_bytes();
        assert_eq!(wire[RELEASE_OFFSET], 0x01);
        assert_eq!(wire[RELEASE_OFFSET + 1], 0x80);
    }
}
