use clap::{Parser, Subcommand};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, EnvFilter};
use swsave::{
    decrypt, encrypt, is_hash_valid, BagSave, Block, BlockKey, KeyedIndex, KnownKey, Pokedex,
    Profile, ScalarValue,
};

#[derive(Parser)]
#[command(name = "swsave", about = "The swish save container CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Verify a save file's integrity hash
    Check {
        input: PathBuf,
    },
    /// Decode a save and list every block
    List {
        input: PathBuf,
        /// Emit the block list as JSON
        #[arg(long)]
        json: bool,
    },
    /// Decode and re-encode a save, regenerating its trailing hash
    Repair {
        input: PathBuf,
        output: Option<PathBuf>,
    },
    /// Show the player profile record
    Profile {
        input: PathBuf,
    },
    /// Summarize the item-bag record
    Bag {
        input: PathBuf,
    },
    /// Summarize the dex record
    Dex {
        input: PathBuf,
    },
    /// Edit the player profile and write a modified save
    Edit {
        input: PathBuf,
        /// New display name (up to 12 characters)
        #[arg(long)]
        name: Option<String>,
        /// New player id
        #[arg(long)]
        id: Option<u32>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print a scalar block's value (key: 8 hex digits or a record name)
    Get {
        input: PathBuf,
        key: String,
    },
    /// Overwrite a scalar block's value and write a modified save
    Set {
        input: PathBuf,
        key: String,
        value: String,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Serialize)]
struct BlockSummary {
    key: String,
    r#type: String,
    sub_type: Option<String>,
    size: usize,
}

impl From<&Block> for BlockSummary {
    fn from(block: &Block) -> Self {
        BlockSummary {
            key: swsave::render_key(block.key()),
            r#type: block.type_code().to_string(),
            sub_type: block.sub_type().map(|t| t.to_string()),
            size: block.payload().len(),
        }
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // RUST_LOG controls the log level, e.g. RUST_LOG=swsave=warn.
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match Cli::parse().command {
        // ── Check ────────────────────────────────────────────────────────────
        Commands::Check { input } => {
            let data = std::fs::read(&input)?;
            if is_hash_valid(&data) {
                let digest = swsave::compute_hash(&data[..data.len() - swsave::SIZE_HASH]);
                println!("OK: {} ({})", input.display(), hex::encode(digest));
            } else {
                eprintln!("FAILED: hash mismatch in {}", input.display());
                std::process::exit(1);
            }
        }

        // ── List ─────────────────────────────────────────────────────────────
        Commands::List { input, json } => {
            let blocks = load(&input)?;
            if json {
                let summaries: Vec<BlockSummary> = blocks.iter().map(BlockSummary::from).collect();
                println!("{}", serde_json::to_string_pretty(&summaries)?);
            } else {
                println!("{:<10} {:<12} {:<8} {:>8}", "Key", "Type", "Element", "Bytes");
                for block in &blocks {
                    println!(
                        "{:<10} {:<12} {:<8} {:>8}",
                        swsave::render_key(block.key()),
                        block.type_code().to_string(),
                        block.sub_type().map(|t| t.name()).unwrap_or("—"),
                        block.payload().len(),
                    );
                }
                println!("{} block(s)", blocks.len());
            }
        }

        // ── Repair ───────────────────────────────────────────────────────────
        Commands::Repair { input, output } => {
            let blocks = load(&input)?;
            println!("decoded {} block(s)", blocks.len());
            let repaired = encrypt(&blocks);
            let output = output.unwrap_or_else(|| default_output(&input, "_repaired"));
            std::fs::write(&output, repaired)?;
            println!("repaired save written to {}", output.display());
        }

        // ── Profile ──────────────────────────────────────────────────────────
        Commands::Profile { input } => {
            let index = KeyedIndex::new(load(&input)?);
            let block = index.get(KnownKey::CoreData)?;
            let profile = Profile::from_bytes(block.payload())?;
            println!("Name              {}", profile.name_string());
            println!("Id                {:010}", profile.id);
            println!("Gender            {}", if profile.gender == 0 { "male" } else { "female" });
            println!("Rank              {} ({} exp)", profile.rank, profile.rank_exp);
            println!("Birthday          {}/{}", profile.birthday_month, profile.birthday_day);
            println!("Eggs hatched      {}", profile.egg_hatch_count);
            println!("Partner walks     {}", profile.partner_walk_count);
        }

        // ── Bag ──────────────────────────────────────────────────────────────
        Commands::Bag { input } => {
            let index = KeyedIndex::new(load(&input)?);
            let bag = BagSave::from_bytes(index.get(KnownKey::BagSave)?.payload())?;
            println!("{bag}");
        }

        // ── Dex ──────────────────────────────────────────────────────────────
        Commands::Dex { input } => {
            let index = KeyedIndex::new(load(&input)?);
            let dex = Pokedex::from_bytes(index.get(KnownKey::Pokedex)?.payload())?;
            println!("{dex}");
        }

        // ── Edit ─────────────────────────────────────────────────────────────
        Commands::Edit { input, name, id, output } => {
            if name.is_none() && id.is_none() {
                return Err("nothing to edit: pass --name and/or --id".into());
            }
            let mut index = KeyedIndex::new(load(&input)?);
            let block = index.get(KnownKey::CoreData)?;
            let mut profile = Profile::from_bytes(block.payload())?;

            if let Some(name) = name {
                let old = profile.name_string();
                profile.set_name(&name)?;
                println!("name: {old} -> {name}");
            }
            if let Some(id) = id {
                println!("id:   {:010} -> {id:010}", profile.id);
                profile.id = id;
            }

            index.replace_payload(KnownKey::CoreData, &profile.to_bytes())?;
            let output = output.unwrap_or_else(|| default_output(&input, "_modified"));
            std::fs::write(&output, encrypt(index.blocks()))?;
            println!("modified save written to {}", output.display());
        }

        // ── Get ──────────────────────────────────────────────────────────────
        Commands::Get { input, key } => {
            let index = KeyedIndex::new(load(&input)?);
            let block = lookup(&index, &key)?;
            println!("{}", block.value()?);
        }

        // ── Set ──────────────────────────────────────────────────────────────
        Commands::Set { input, key, value, output } => {
            let mut index = KeyedIndex::new(load(&input)?);
            let code = lookup(&index, &key)?.type_code();
            let parsed = ScalarValue::parse(code, &value)
                .ok_or_else(|| format!("cannot parse {value:?} as {code}"))?;
            lookup_mut(&mut index, &key)?.set_value(parsed)?;
            let output = output.unwrap_or_else(|| default_output(&input, "_modified"));
            std::fs::write(&output, encrypt(index.blocks()))?;
            println!("modified save written to {}", output.display());
        }
    }

    Ok(())
}

// ── helpers ──────────────────────────────────────────────────────────────────

/// Read a save file, verify its hash, and decode the block sequence.
fn load(path: &Path) -> Result<Vec<Block>, Box<dyn std::error::Error>> {
    let data = std::fs::read(path)?;
    swsave::verify(&data)?;
    Ok(decrypt(&data)?)
}

/// Resolve a CLI key argument: 8 hex digits are a raw key, anything else is
/// hashed as a name.
fn lookup<'i>(index: &'i KeyedIndex, key: &str) -> Result<&'i Block, swsave::IndexError> {
    if key.len() == 8 && key.bytes().all(|b| b.is_ascii_hexdigit()) {
        index.get_hex(key)
    } else {
        index.get(BlockKey::Name(key))
    }
}

fn lookup_mut<'i>(
    index: &'i mut KeyedIndex,
    key: &str,
) -> Result<&'i mut Block, swsave::IndexError> {
    if key.len() == 8 && key.bytes().all(|b| b.is_ascii_hexdigit()) {
        let raw = u32::from_str_radix(key, 16)
            .map_err(|_| swsave::IndexError::InvalidKey(key.to_owned()))?;
        index.get_mut(raw)
    } else {
        index.get_mut(BlockKey::Name(key))
    }
}

fn default_output(input: &Path, suffix: &str) -> PathBuf {
    let stem = input.file_stem().and_then(|s| s.to_str()).unwrap_or("save");
    let name = match input.extension().and_then(|e| e.to_str()) {
        Some(ext) => format!("{stem}{suffix}.{ext}"),
        None      => format!("{stem}{suffix}"),
    };
    input.with_file_name(name)
}
