mod binary_reader;
mod binary_writer;
use avs2q::common::*;
use avs2q::verify::compare_codecs;
use avs2q::*;
use binary_reader::BinaryReader;
use binary_writer::BinaryWriter;
use clap::Parser;
use colored::*;
use debug_print::*;
use rand::{prelude::StdRng, SeedableRng};
use std::collections::HashMap;
use std::fmt::Display;
use std::io::{self, Write};
use std::process;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// Path to input coefficients (16-bit little endian, - for stdin)
    #[clap(short, long, default_value = "-")]
    input: String,
    /// Path to output coefficients (- for stdout)
    #[clap(short, long, default_value = "-")]
    output: String,
    /// Block width in coefficients
    #[clap(long, default_value_t = 8)]
    width: usize,
    /// Block height in coefficients
    #[clap(long, default_value_t = 8)]
    height: usize,
    /// Quantization scale
    #[clap(long, default_value_t = 16384)]
    scale: i32,
    /// Quantization shift
    #[clap(long, default_value_t = 14)]
    shift: i32,
    /// Rounding offset (defaults to half a step)
    #[clap(long)]
    add: Option<i32>,
    /// Scan order of the coefficient groups (xy or yx)
    #[clap(long)]
    scan: Option<String>,
    /// Dequantize levels instead of quantizing coefficients
    #[clap(short, long)]
    reconstruct: bool,
    /// Implementation tier (reference or avx2, detected when omitted)
    #[clap(long)]
    tier: Option<String>,
    /// Compare every available tier with the reference for N random blocks
    #[clap(long)]
    verify: Option<usize>,
    /// Extra parameters (PARAM1=VAL1[,PARAM2=VAL2,...])
    #[clap(long)]
    extra_params: Option<String>,
}

struct RunConfig {
    width: usize,
    height: usize,
    params: QuantParams,
    scan: Option<ScanOrder>,
    reconstruct: bool,
    codec: &'static dyn CoefficientCodec,
    extra_params: HashMap<String, String>,
}

fn fail(msg: impl Display) -> ! {
    eprintln!("{}: {}", "error".red(), msg);
    process::exit(1);
}

fn check_block_size(name: &str, size: usize) {
    let valid = size.is_power_of_two()
        && (1 << MIN_BLOCK_LOG2_SIZE..=1 << MAX_BLOCK_LOG2_SIZE).contains(&size);
    if !valid {
        fail(format!("Invalid {}: {}", name, size));
    }
}

fn parse_extra_params(extra_params: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for param in extra_params.split(',') {
        let param = param.split('=').collect::<Vec<&str>>();
        if let [key, val] = &param[..] {
            map.insert(key.to_string(), val.to_string());
        } else {
            fail(format!("Invalid extra-params: {}", extra_params));
        }
    }
    map
}

impl RunConfig {
    fn from_args(args: &Args) -> RunConfig {
        check_block_size("width", args.width);
        check_block_size("height", args.height);

        let params = match args.add {
            Some(add) => QuantParams::new(args.scale, args.shift, add),
            None => QuantParams::half_step(args.scale, args.shift),
        }
        .and_then(|p| match args.reconstruct {
            true => QuantParams::for_dequant(p.scale, p.shift, p.add),
            false => Ok(p),
        })
        .unwrap_or_else(|e| fail(e));

        let scan = args
            .scan
            .as_ref()
            .map(|s| s.parse::<ScanOrder>().unwrap_or_else(|e| fail(e)));

        let codec = match &args.tier {
            Some(tier) => tier
                .parse::<CodecTier>()
                .and_then(select)
                .unwrap_or_else(|e| fail(e)),
            None => detect(),
        };
        debug_eprintln!("using {} codec", codec.tier());

        let extra_params = args
            .extra_params
            .as_ref()
            .map(|p| parse_extra_params(p))
            .unwrap_or_default();

        RunConfig {
            width: args.width,
            height: args.height,
            params,
            scan,
            reconstruct: args.reconstruct,
            codec,
            extra_params,
        }
    }

    fn seed(&self) -> u64 {
        match self.extra_params.get("seed") {
            Some(seed) => seed
                .parse()
                .unwrap_or_else(|_| fail(format!("Invalid seed: {}", seed))),
            None => 0,
        }
    }
}

fn verify(cfg: &RunConfig, iterations: usize) {
    let reference = ReferenceCodec;
    let mut rng: StdRng = SeedableRng::seed_from_u64(cfg.seed());
    let mut failed = false;
    for tier in available_tiers() {
        let codec = select(tier).unwrap_or_else(|e| fail(e));
        match compare_codecs(codec, &reference, &mut rng, iterations) {
            Ok(()) => eprintln!("{}: {}", tier, "ok".green()),
            Err(e) => {
                eprintln!("{}: {}", tier, e.to_string().red());
                failed = true;
            }
        }
    }
    if failed {
        process::exit(1);
    }
}

fn process_block(cfg: &RunConfig, raster: &[i16], out: &mut Vec<i16>) -> usize {
    out.clear();
    if cfg.reconstruct {
        let mut block = match cfg.scan {
            Some(order) => {
                let mut block = CoeffBlock::new(cfg.width, cfg.height);
                unscan_groups(cfg.codec, raster, order, &mut block);
                block
            }
            None => CoeffBlock::from_raster(cfg.width, cfg.height, raster),
        };
        dequantize_block(cfg.codec, &mut block, &cfg.params);
        out.extend_from_slice(&block.to_raster());
        count_nonzero(out)
    } else {
        let mut block = CoeffBlock::from_raster(cfg.width, cfg.height, raster);
        let num_non_zero = quantize_block(cfg.codec, &mut block, &cfg.params);
        match cfg.scan {
            Some(order) => scan_groups(cfg.codec, &block, order, out),
            None => out.extend_from_slice(&block.to_raster()),
        }
        num_non_zero
    }
}

fn main() {
    let args = Args::parse();
    let cfg = RunConfig::from_args(&args);

    if let Some(iterations) = args.verify {
        verify(&cfg, iterations);
        return;
    }

    // initialize binary reader
    let stdin = io::stdin();
    let mut reader = if args.input == *"-" {
        BinaryReader::standard(&stdin)
    } else {
        match BinaryReader::file(args.input) {
            Ok(f) => f,
            Err(e) => fail(format!("failed to open input file: {}", e)),
        }
    };

    // initialize binary writer
    let stdout = io::stdout();
    let mut writer = if args.output == *"-" {
        BinaryWriter::standard(&stdout)
    } else {
        match BinaryWriter::file(args.output) {
            Ok(f) => f,
            Err(e) => fail(format!("failed to open output file: {}", e)),
        }
    };

    let mut raster = vec![0i16; cfg.width * cfg.height];
    let mut out = Vec::with_capacity(raster.len());
    let mut num_blocks = 0;
    let mut num_non_zero = 0;
    loop {
        match reader.read_coeffs(&mut raster) {
            Ok(0) => break,
            Ok(_) => {}
            Err(e) => fail(e),
        }
        num_non_zero += process_block(&cfg, &raster, &mut out);
        if let Err(e) = writer.write_coeffs(&out) {
            fail(e);
        }
        num_blocks += 1;
    }
    if let Err(e) = writer.flush() {
        fail(e);
    }
    debug_eprintln!(
        "{} blocks, {} non-zero coefficients",
        num_blocks,
        num_non_zero
    );
}
