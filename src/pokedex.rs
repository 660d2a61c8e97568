//! The dex record layout (the `Pokedex` block's payload).
//!
//! A fixed 159848-byte region: 1210 per-species entries of 132 bytes each,
//! indexed by species number, followed by a 128-byte reserved tail.  Each
//! entry packs per-form capture/battle/shiny bitfields (one bit per form,
//! 32 forms), per-form capture and defeat counters (8 forms), and the
//! display sub-record picked when the species is shown.  Reserved regions
//! are carried through verbatim so an edit round-trips byte-for-byte.

use byteorder::{ByteOrder, LittleEndian};
use std::fmt;
use thiserror::Error;

/// Byte length of the whole dex record.
pub const POKEDEX_SIZE: usize = 159_848;

/// Number of per-species entries.
pub const SPECIES_SLOTS: usize = 1210;

const ENTRY_SIZE: usize = 132;
const DRAW_SIZE: usize = 8;
const FLAG_FORMS: u8 = 32;
const COUNTER_FORMS: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum PokedexError {
    #[error("dex record must be {POKEDEX_SIZE} bytes, got {0}")]
    WrongSize(usize),
}

// ── Display sub-record ───────────────────────────────────────────────────────

/// Which rendition of a species the dex screen shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawData {
    pub form:  u8,
    pub sex:   u8,
    pub rare:  u8,
    pub mega:  u8,
    pub other: u8,
    reserve:   [u8; 3],
}

impl DrawData {
    fn from_bytes(data: &[u8]) -> Self {
        Self {
            form:    data[0],
            sex:     data[1],
            rare:    data[2],
            mega:    data[3],
            other:   data[4],
            reserve: [data[5], data[6], data[7]],
        }
    }

    fn write_to(self, out: &mut [u8]) {
        out[0] = self.form;
        out[1] = self.sex;
        out[2] = self.rare;
        out[3] = self.mega;
        out[4] = self.other;
        out[5..8].copy_from_slice(&self.reserve);
    }
}

// ── Per-species entry ────────────────────────────────────────────────────────

/// One 132-byte species entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PokedexEntry {
    pub capture_flags:  u32,
    pub battle_flags:   u32,
    pub language_flags: u16,
    pub new_flag:       u8,
    pub sex_flag:       u8,
    pub shiny_flags:    u32,
    pub mega_flag:      u8,
    pub alpha_flag:     u8,
    padding1:           [u8; 2],
    status_reserve:     u8,
    capture_counts:     [u8; COUNTER_FORMS],
    defeat_counts:      [u8; COUNTER_FORMS],
    dlc_reserve:        [u8; 7],
    pub draw_main:      DrawData,
    draw_reserve:       [u8; 32],
    padding2:           [u8; 48],
}

impl PokedexEntry {
    fn from_bytes(data: &[u8]) -> Self {
        let mut capture_counts = [0u8; COUNTER_FORMS];
        capture_counts.copy_from_slice(&data[21..29]);
        let mut defeat_counts = [0u8; COUNTER_FORMS];
        defeat_counts.copy_from_slice(&data[29..37]);
        let mut dlc_reserve = [0u8; 7];
        dlc_reserve.copy_from_slice(&data[37..44]);
        let mut draw_reserve = [0u8; 32];
        draw_reserve.copy_from_slice(&data[52..84]);
        let mut padding2 = [0u8; 48];
        padding2.copy_from_slice(&data[84..132]);

        Self {
            capture_flags:  LittleEndian::read_u32(&data[0..4]),
            battle_flags:   LittleEndian::read_u32(&data[4..8]),
            language_flags: LittleEndian::read_u16(&data[8..10]),
            new_flag:       data[10],
            sex_flag:       data[11],
            shiny_flags:    LittleEndian::read_u32(&data[12..16]),
            mega_flag:      data[16],
            alpha_flag:     data[17],
            padding1:       [data[18], data[19]],
            status_reserve: data[20],
            capture_counts,
            defeat_counts,
            dlc_reserve,
            draw_main:      DrawData::from_bytes(&data[44..44 + DRAW_SIZE]),
            draw_reserve,
            padding2,
        }
    }

    fn write_to(&self, out: &mut [u8]) {
        LittleEndian::write_u32(&mut out[0..4], self.capture_flags);
        LittleEndian::write_u32(&mut out[4..8], self.battle_flags);
        LittleEndian::write_u16(&mut out[8..10], self.language_flags);
        out[10] = self.new_flag;
        out[11] = self.sex_flag;
        LittleEndian::write_u32(&mut out[12..16], self.shiny_flags);
        out[16] = self.mega_flag;
        out[17] = self.alpha_flag;
        out[18..20].copy_from_slice(&self.padding1);
        out[20] = self.status_reserve;
        out[21..29].copy_from_slice(&self.capture_counts);
        out[29..37].copy_from_slice(&self.defeat_counts);
        out[37..44].copy_from_slice(&self.dlc_reserve);
        self.draw_main.write_to(&mut out[44..44 + DRAW_SIZE]);
        out[52..84].copy_from_slice(&self.draw_reserve);
        out[84..132].copy_from_slice(&self.padding2);
    }

    pub fn is_captured(&self, form: u8) -> bool {
        form < FLAG_FORMS && self.capture_flags & (1 << form) != 0
    }

    pub fn set_captured(&mut self, form: u8, captured: bool) {
        set_form_bit(&mut self.capture_flags, form, captured);
    }

    pub fn is_battled(&self, form: u8) -> bool {
        form < FLAG_FORMS && self.battle_flags & (1 << form) != 0
    }

    pub fn set_battled(&mut self, form: u8, battled: bool) {
        set_form_bit(&mut self.battle_flags, form, battled);
    }

    pub fn is_shiny(&self, form: u8) -> bool {
        form < FLAG_FORMS && self.shiny_flags & (1 << form) != 0
    }

    pub fn set_shiny(&mut self, form: u8, shiny: bool) {
        set_form_bit(&mut self.shiny_flags, form, shiny);
    }

    /// Capture counter for a form.  Only the first eight forms have
    /// counters; anything else reads zero.
    pub fn capture_count(&self, form: usize) -> u8 {
        self.capture_counts.get(form).copied().unwrap_or(0)
    }

    pub fn set_capture_count(&mut self, form: usize, count: u8) {
        if let Some(slot) = self.capture_counts.get_mut(form) {
            *slot = count;
        }
    }

    pub fn defeat_count(&self, form: usize) -> u8 {
        self.defeat_counts.get(form).copied().unwrap_or(0)
    }

    pub fn set_defeat_count(&mut self, form: usize, count: u8) {
        if let Some(slot) = self.defeat_counts.get_mut(form) {
            *slot = count;
        }
    }
}

fn set_form_bit(flags: &mut u32, form: u8, value: bool) {
    if form >= FLAG_FORMS {
        return;
    }
    if value {
        *flags |= 1 << form;
    } else {
        *flags &= !(1 << form);
    }
}

// ── Whole-dex record ─────────────────────────────────────────────────────────

/// The complete dex record: one entry per species plus the reserved tail.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pokedex {
    entries: Vec<PokedexEntry>,
    reserve: [u8; 128],
}

impl Pokedex {
    pub fn from_bytes(data: &[u8]) -> Result<Self, PokedexError> {
        if data.len() != POKEDEX_SIZE {
            return Err(PokedexError::WrongSize(data.len()));
        }

        let entry_region = SPECIES_SLOTS * ENTRY_SIZE;
        let mut entries = Vec::with_capacity(SPECIES_SLOTS);
        for chunk in data[..entry_region].chunks_exact(ENTRY_SIZE) {
            entries.push(PokedexEntry::from_bytes(chunk));
        }
        let mut reserve = [0u8; 128];
        reserve.copy_from_slice(&data[entry_region..]);

        Ok(Self { entries, reserve })
    }

    pub fn to_bytes(&self) -> Vec<u8> {
        let mut out = vec![0u8; POKEDEX_SIZE];
        for (entry, chunk) in self.entries.iter().zip(out.chunks_exact_mut(ENTRY_SIZE)) {
            entry.write_to(chunk);
        }
        out[SPECIES_SLOTS * ENTRY_SIZE..].copy_from_slice(&self.reserve);
        out
    }

    /// The entry for a species number, when it is in range.
    pub fn entry(&self, species: usize) -> Option<&PokedexEntry> {
        self.entries.get(species)
    }

    pub fn entry_mut(&mut self, species: usize) -> Option<&mut PokedexEntry> {
        self.entries.get_mut(species)
    }

    /// Species with any form captured.
    pub fn captured_species(&self) -> usize {
        self.entries.iter().filter(|e| e.capture_flags != 0).count()
    }

    /// Species with any shiny form registered.
    pub fn shiny_species(&self) -> usize {
        self.entries.iter().filter(|e| e.shiny_flags != 0).count()
    }

    /// Completion as a fraction of all species slots, in percent.
    pub fn completion_percent(&self) -> f64 {
        self.captured_species() as f64 * 100.0 / SPECIES_SLOTS as f64
    }
}

impl fmt::Display for Pokedex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} of {} species captured ({:.1}%), {} shiny",
            self.captured_species(),
            SPECIES_SLOTS,
            self.completion_percent(),
            self.shiny_species(),
        )
    }
}
