//! Well-known record keys and the player-profile record layout.
//!
//! Record layouts sit outside the container codec proper: they interpret a
//! looked-up block's opaque payload as a fixed C-style struct.  The codec
//! guarantees nothing about them beyond the payload's length.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use thiserror::Error;

use crate::index::fnv1a_32;

// ── Well-known keys ──────────────────────────────────────────────────────────

/// Pre-defined keys of the records this tool edits.  Block keys are the
/// FNV-1a hashes of the record names, so symbolic and by-name lookup are
/// interchangeable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KnownKey {
    CoreData,
    BagSave,
    Pokedex,
}

impl KnownKey {
    pub fn key(self) -> u32 {
        match self {
            KnownKey::CoreData => 0xEE73_F55E,
            KnownKey::BagSave  => 0x0CEB_A944,
            KnownKey::Pokedex  => 0xDC98_3C1D,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            KnownKey::CoreData => "CoreData",
            KnownKey::BagSave  => "BagSave",
            KnownKey::Pokedex  => "Pokedex",
        }
    }
}

// ── Profile record ───────────────────────────────────────────────────────────

/// Byte length of the profile record.
pub const PROFILE_SIZE: usize = 120;

/// Display-name capacity: 12 UTF-16 units plus a terminator.
const NAME_UNITS: usize = 13;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ProfileError {
    #[error("profile record must be {PROFILE_SIZE} bytes, got {0}")]
    WrongSize(usize),
    #[error("display name is longer than 12 UTF-16 units")]
    NameTooLong,
}

/// The player-profile record (the `CoreData` block's payload).
///
/// Fixed 120-byte little-endian struct.  Reserved/padding regions are
/// carried through verbatim so an edit round-trips byte-for-byte.
#[derive(Debug, Clone, PartialEq)]
pub struct Profile {
    pub id:                u32,
    pub rom_code:          u8,
    pub gender:            u8,
    padding1:              u8,
    pub language_id:       u8,
    pub nex_unique_id:     u64,
    name:                  [u16; NAME_UNITS],
    pub icon_id:           u32,
    pub principal_rom_id:  u64,
    pub rank:              u8,
    pub rank_exp:          u32, // 24 bits on the wire, packed beside `rank`
    pub network_user_id:   [u8; 29],
    pub network_id_valid:  u8,
    pub birthday_month:    u8,
    pub birthday_day:      u8,
    pub partner_walk_count: u16,
    padding2:              [u8; 5],
    pub egg_check_flag:    u8,
    pub egg_hatch_count:   u32,
    pub mega_power:        f32,
    pub mega_evo_timer:    f32,
    pub player_hp:         u32,
    pub birthday_set:      u8,
    pub birthday_event_view: u8,
    pub birthday_event_view_year: u16,
    padding3:              [u8; 2],
}

impl Profile {
    /// Parse the record from a block payload of exactly [`PROFILE_SIZE`] bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, ProfileError> {
        if data.len() != PROFILE_SIZE {
            return Err(ProfileError::WrongSize(data.len()));
        }

        let mut name = [0u16; NAME_UNITS];
        for (i, unit) in name.iter_mut().enumerate() {
            *unit = LittleEndian::read_u16(&data[16 + i * 2..]);
        }

        let packed_rank = LittleEndian::read_u32(&data[54..58]);

        let mut network_user_id = [0u8; 29];
        network_user_id.copy_from_slice(&data[58..87]);
        let mut padding2 = [0u8; 5];
        padding2.copy_from_slice(&data[92..97]);

        Ok(Self {
            id:                LittleEndian::read_u32(&data[0..4]),
            rom_code:          data[4],
            gender:            data[5],
            padding1:          data[6],
            language_id:       data[7],
            nex_unique_id:     LittleEndian::read_u64(&data[8..16]),
            name,
            icon_id:           LittleEndian::read_u32(&data[42..46]),
            principal_rom_id:  LittleEndian::read_u64(&data[46..54]),
            rank:              (packed_rank & 0xFF) as u8,
            rank_exp:          (packed_rank >> 8) & 0x00FF_FFFF,
            network_user_id,
            network_id_valid:  data[87],
            birthday_month:    data[88],
            birthday_day:      data[89],
            partner_walk_count: LittleEndian::read_u16(&data[90..92]),
            padding2,
            egg_check_flag:    data[97],
            egg_hatch_count:   LittleEndian::read_u32(&data[98..102]),
            mega_power:        LittleEndian::read_f32(&data[102..106]),
            mega_evo_timer:    LittleEndian::read_f32(&data[106..110]),
            player_hp:         LittleEndian::read_u32(&data[110..114]),
            birthday_set:      data[114],
            birthday_event_view: data[115],
            birthday_event_view_year: LittleEndian::read_u16(&data[116..118]),
            padding3:          [data[118], data[119]],
        })
    }

    /// Serialize the record back to its wire form.
    pub fn to_bytes(&self) -> [u8; PROFILE_SIZE] {
        let mut out = [0u8; PROFILE_SIZE];
        LittleEndian::write_u32(&mut out[0..4], self.id);
        out[4] = self.rom_code;
        out[5] = self.gender;
        out[6] = self.padding1;
        out[7] = self.language_id;
        LittleEndian::write_u64(&mut out[8..16], self.nex_unique_id);
        for (i, unit) in self.name.iter().enumerate() {
            LittleEndian::write_u16(&mut out[16 + i * 2..18 + i * 2], *unit);
        }
        LittleEndian::write_u32(&mut out[42..46], self.icon_id);
        LittleEndian::write_u64(&mut out[46..54], self.principal_rom_id);
        let packed_rank = u32::from(self.rank) | (self.rank_exp & 0x00FF_FFFF) << 8;
        LittleEndian::write_u32(&mut out[54..58], packed_rank);
        out[58..87].copy_from_slice(&self.network_user_id);
        out[87] = self.network_id_valid;
        out[88] = self.birthday_month;
        out[89] = self.birthday_day;
        LittleEndian::write_u16(&mut out[90..92], self.partner_walk_count);
        out[92..97].copy_from_slice(&self.padding2);
        out[97] = self.egg_check_flag;
        LittleEndian::write_u32(&mut out[98..102], self.egg_hatch_count);
        LittleEndian::write_f32(&mut out[102..106], self.mega_power);
        LittleEndian::write_f32(&mut out[106..110], self.mega_evo_timer);
        LittleEndian::write_u32(&mut out[110..114], self.player_hp);
        out[114] = self.birthday_set;
        out[115] = self.birthday_event_view;
        LittleEndian::write_u16(&mut out[116..118], self.birthday_event_view_year);
        out[118] = self.padding3[0];
        out[119] = self.padding3[1];
        out
    }

    /// Display name, decoded from UTF-16 up to the first terminator.
    pub fn name_string(&self) -> String {
        let end = self.name.iter().position(|&u| u == 0).unwrap_or(NAME_UNITS);
        String::from_utf16_lossy(&self.name[..end])
    }

    /// Set the display name.  At most 12 UTF-16 units; the rest of the
    /// field is zero-filled.
    pub fn set_name(&mut self, name: &str) -> Result<(), ProfileError> {
        let units: Vec<u16> = name.encode_utf16().collect();
        if units.len() >= NAME_UNITS {
            return Err(ProfileError::NameTooLong);
        }
        self.name = [0u16; NAME_UNITS];
        self.name[..units.len()].copy_from_slice(&units);
        Ok(())
    }
}

impl fmt::Display for Profile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} (id {:010}, rank {} / {} exp)",
            self.name_string(),
            self.id,
            self.rank,
            self.rank_exp,
        )
    }
}
