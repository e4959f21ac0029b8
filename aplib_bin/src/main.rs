//! Command-line front-end for the `aplib` compressor/decompressor.
//!
//! Thin collaborator over the library crate: argument parsing, file I/O,
//! timing/stats reporting, and a self-test harness all live here, never in
//! `aplib` itself (the library never touches a filesystem or a clock).

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{bail, Context, Result};
use argh::FromArgs;
use log::{debug, info, warn};

use aplib::{compress, decompress, CompressError, EncoderConfig, Flags};

#[derive(FromArgs, Debug)]
/// Compress or decompress a file in the aPLib-compatible bit-packed format.
struct Options {
    /// force compression (default unless -d is given)
    #[argh(switch)]
    z: bool,

    /// force decompression
    #[argh(switch, short = 'd')]
    d: bool,

    /// write output to stdout instead of outfile
    #[argh(switch, short = 'c')]
    c: bool,

    /// use the enhanced (byte-swapped gamma2) format variant
    #[argh(switch, short = 'e')]
    e: bool,

    /// maximum match window size in bytes (16..=2097152)
    #[argh(option, short = 'w')]
    w: Option<usize>,

    /// verbose logging
    #[argh(switch, short = 'v')]
    v: bool,

    /// print encode statistics after compressing
    #[argh(switch)]
    stats: bool,

    /// repeat compression and report timing
    #[argh(switch)]
    cbench: bool,

    /// repeat decompression and report timing
    #[argh(switch)]
    dbench: bool,

    /// compress then decompress in memory and verify equality; no outfile written
    #[argh(switch)]
    test: bool,

    /// like --test, but only over the first 4 KiB of the input
    #[argh(switch)]
    quicktest: bool,

    /// dictionary file; accepted for interface compatibility, ignored
    #[argh(option, short = 'D')]
    dict: Option<PathBuf>,

    #[argh(positional)]
    infile: PathBuf,

    #[argh(positional)]
    outfile: Option<PathBuf>,
}

const BENCH_ITERATIONS: u32 = 10;
const QUICKTEST_BYTES: usize = 4096;

fn main() {
    let opts: Options = argh::from_env();
    let level = if opts.v { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    match run(opts) {
        Ok(()) => std::process::exit(0),
        Err(e) => {
            eprintln!("error: {e:#}");
            std::process::exit(100);
        }
    }
}

fn run(opts: Options) -> Result<()> {
    if let Some(dict) = &opts.dict {
        warn!(
            "dictionary preload ({}) is accepted for compatibility but ignored",
            dict.display()
        );
    }

    let flags = Flags { enhanced: opts.e };
    let mut config = EncoderConfig {
        enhanced: opts.e,
        ..EncoderConfig::default()
    };
    if let Some(w) = opts.w {
        config.max_window_size = w;
    }

    debug!("reading {}", opts.infile.display());
    let input = fs::read(&opts.infile)
        .with_context(|| format!("failed to read {}", opts.infile.display()))?;

    if opts.test || opts.quicktest {
        let slice = if opts.quicktest {
            &input[..input.len().min(QUICKTEST_BYTES)]
        } else {
            &input[..]
        };
        return run_self_test(slice, &config, flags);
    }

    if opts.cbench {
        return run_compress_bench(&input, &config);
    }
    if opts.dbench {
        let (compressed, _stats) = compress(&input, &config).map_err(compress_err)?;
        return run_decompress_bench(&compressed, flags);
    }

    let decompressing = opts.d && !opts.z;
    if decompressing {
        let output = decompress(&input, flags).with_context(|| "decompression failed")?;
        write_output(&opts, &output)
    } else {
        let (output, stats) = compress(&input, &config).map_err(compress_err)?;
        if opts.stats {
            print_stats(&stats, input.len(), output.len());
        }
        write_output(&opts, &output)
    }
}

fn write_output(opts: &Options, data: &[u8]) -> Result<()> {
    if opts.c || opts.outfile.is_none() {
        use std::io::Write;
        std::io::stdout()
            .write_all(data)
            .with_context(|| "failed to write to stdout")?;
        Ok(())
    } else {
        let outfile = opts.outfile.as_ref().unwrap();
        fs::write(outfile, data)
            .with_context(|| format!("failed to write {}", outfile.display()))?;
        info!("wrote {}", outfile.display());
        Ok(())
    }
}

fn run_self_test(input: &[u8], config: &EncoderConfig, flags: Flags) -> Result<()> {
    let (compressed, _stats) = compress(input, config).map_err(compress_err)?;
    let decompressed = decompress(&compressed, flags).with_context(|| "decompression failed")?;
    if decompressed != input {
        bail!(
            "round-trip mismatch: {} bytes in, {} bytes out",
            input.len(),
            decompressed.len()
        );
    }
    println!(
        "OK: {} bytes -> {} bytes -> {} bytes (verified)",
        input.len(),
        compressed.len(),
        decompressed.len()
    );
    Ok(())
}

fn run_compress_bench(input: &[u8], config: &EncoderConfig) -> Result<()> {
    let start = Instant::now();
    let mut last_len = 0;
    for _ in 0..BENCH_ITERATIONS {
        let (output, _stats) = compress(input, config).map_err(compress_err)?;
        last_len = output.len();
    }
    let elapsed = start.elapsed();
    println!(
        "compressed {} bytes -> {} bytes, {} iterations in {:.3}s ({:.2} MB/s)",
        input.len(),
        last_len,
        BENCH_ITERATIONS,
        elapsed.as_secs_f64(),
        mb_per_sec(input.len(), BENCH_ITERATIONS, elapsed)
    );
    Ok(())
}

fn run_decompress_bench(compressed: &[u8], flags: Flags) -> Result<()> {
    let start = Instant::now();
    let mut last_len = 0;
    for _ in 0..BENCH_ITERATIONS {
        let output = decompress(compressed, flags).with_context(|| "decompression failed")?;
        last_len = output.len();
    }
    let elapsed = start.elapsed();
    println!(
        "decompressed {} bytes -> {} bytes, {} iterations in {:.3}s ({:.2} MB/s)",
        compressed.len(),
        last_len,
        BENCH_ITERATIONS,
        elapsed.as_secs_f64(),
        mb_per_sec(last_len, BENCH_ITERATIONS, elapsed)
    );
    Ok(())
}

fn mb_per_sec(bytes: usize, iterations: u32, elapsed: std::time::Duration) -> f64 {
    let total_bytes = bytes as f64 * iterations as f64;
    let secs = elapsed.as_secs_f64();
    if secs == 0.0 {
        0.0
    } else {
        total_bytes / secs / 1_000_000.0
    }
}

fn print_stats(stats: &aplib::block::EncodeStats, input_len: usize, output_len: usize) {
    println!(
        "{} bytes -> {} bytes ({:.2}%)",
        input_len,
        output_len,
        output_len as f64 * 100.0 / input_len.max(1) as f64
    );
    println!(
        "literals: {}  nibble: {}  short: {}  long: {}  rep: {}",
        stats.num_literals,
        stats.num_nibble_matches,
        stats.num_short_matches,
        stats.num_long_matches,
        stats.num_rep_matches
    );
    println!(
        "offsets: min {} avg {:.1} max {}",
        stats.min_offset,
        stats.avg_offset(),
        stats.max_offset
    );
    println!(
        "match lengths: min {} avg {:.1} max {}",
        stats.min_match_len,
        stats.avg_match_len(),
        stats.max_match_len
    );
}

fn compress_err(e: CompressError) -> anyhow::Error {
    anyhow::anyhow!(e.to_string())
}
