#![deny(unsafe_code, unsafe_op_in_unsafe_fn)]
#![warn(
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::todo,
    clippy::unimplemented,
    clippy::str_to_string,
    clippy::string_to_string
)]

use std::{error::Error, path::PathBuf};

use chromapick::{loader::FileLoader, ColorExtractor, ExtractOptions};
use clap::Parser;

#[derive(Parser)]
#[command(about = "Extract a ranked color palette from an image")]
struct Options {
    /// The image to extract colors from.
    input: PathBuf,

    /// The number of clusters per k-means run.
    #[arg(short, long, default_value_t = i64::from(ExtractOptions::DEFAULT_K), allow_negative_numbers = true)]
    k: i64,

    /// The proportion of pixels to sample, in (0, 1].
    #[arg(long, default_value_t = ExtractOptions::DEFAULT_SAMPLE_RATE)]
    sample_rate: f64,

    /// Merge perceptually similar colors and rank by cluster size.
    #[arg(long)]
    filter_similar: bool,

    /// Print colors as #rrggbb instead of rgb(r, g, b).
    #[arg(long)]
    hex: bool,

    /// Cluster on multiple threads.
    #[arg(long)]
    par: bool,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::init();

    let Options {
        input,
        k,
        sample_rate,
        filter_similar,
        hex,
        par,
    } = Options::parse();

    // negative k is out of range, same as zero
    let k = u32::try_from(k).unwrap_or(0);

    let options = ExtractOptions::new()
        .k(k)
        .sample_rate(sample_rate)
        .filter_similar_colors(filter_similar)
        .use_hex(hex);

    let extractor = ColorExtractor::new(FileLoader);

    let time = std::time::Instant::now();
    let palette = if par {
        extractor.extract_from_par(&input, &options)?
    } else {
        extractor.extract_from(&input, &options)?
    };
    log::info!("extraction took {}ms", time.elapsed().as_millis());

    println!("dominant: {}", palette.dominant_color);
    for color in &palette.colors {
        println!("{color}");
    }

    Ok(())
}
