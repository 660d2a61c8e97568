//! Codec for the swish block-storage save container.
//!
//! A save file is a sequence of individually-keyed typed blocks, each
//! XOR-scrambled with a key-derived keystream, wrapped in a file-wide
//! static XOR pad and sealed with a framed SHA-256 hash.
//!
//! # Modules
//! - `keystream`: per-block xorshift keystream
//! - `typecode`: the closed tag set and scalar value layouts
//! - `block`: single-block decode/encode and mutation rules
//! - `swish`: static pad, integrity hash, whole-container decode/encode
//! - `index`: FNV-1a keyed lookup over a decoded sequence
//! - `profile`: well-known keys and the player-profile record layout
//! - `bag`: the item-bag record layout
//! - `pokedex`: the dex record layout

pub mod bag;
pub mod block;
pub mod index;
pub mod keystream;
pub mod pokedex;
pub mod profile;
pub mod swish;
pub mod typecode;

pub use bag::{BagEntry, BagError, BagFlag, BagSave, BAG_SIZE, BAG_SLOTS};
pub use block::{read_block, write_block, Block, BlockError, Body, BoolKind};
pub use pokedex::{DrawData, Pokedex, PokedexEntry, PokedexError, POKEDEX_SIZE, SPECIES_SLOTS};
pub use index::{fnv1a_32, fnv1a_64, render_key, BlockKey, IndexError, KeyedIndex};
pub use keystream::XorShift32;
pub use profile::{KnownKey, Profile, ProfileError, PROFILE_SIZE};
pub use swish::{compute_hash, decrypt, encrypt, is_hash_valid, verify, SwishError, SIZE_HASH};
pub use typecode::{ScalarValue, TypeCode};
