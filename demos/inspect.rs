//! List the directory of a `.pak` archive or dump a particle effect.
//!
//! ```text
//! cargo run --example inspect -- main.pak
//! cargo run --example inspect -- particles/PeaSplat.xml
//! ```
//!
//! Set `RUST_LOG=popkit=trace` to see per-entry parser events.

use std::env;
use std::fs::File;
use std::io::BufReader;

use popkit::{Error, Result};
use popkit::formats::pak::{Pak, PakReader};
use popkit::formats::particles::Effect;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: inspect <file.pak | effect.xml>");
        return Ok(());
    };

    if path.ends_with(".xml") {
        let effect = Effect::from_reader(File::open(&path)?)?;
        for emitter in &effect.emitters {
            println!("{:#?}", emitter);
        }
        return Ok(());
    }

    // Retail archives are obfuscated; fall back to a plain read.
    let pak = match PakReader::open_obfuscated(BufReader::new(File::open(&path)?)) {
        Ok(reader) => reader.pak,
        Err(Error::BadMagic) => Pak::parse(&mut BufReader::new(File::open(&path)?))?,
        Err(e) => return Err(e),
    };
    print_directory(&pak);

    Ok(())
}

fn print_directory(pak: &Pak) {
    for entry in &pak.entries {
        println!(
            "{:>10}  {}  {}",
            entry.size,
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.name
        );
    }
    println!(
        "{} entries, {} bytes of data starting at {:#x}",
        pak.entries.len(),
        pak.data_size(),
        pak.data_offset()
    );
}
