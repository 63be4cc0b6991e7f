use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, Write},
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context};
use clap::{Parser, Subcommand};
use env_logger::Env;
use huffman_compression::{
    compress_to_files, decompress_to_file, generate_codes, CodecConfig, FrequencyTable,
    MergePolicy, PrefixTree, SidecarFormat,
};
use log::error;

const SIDECAR_SUFFIX: &str = "Helper.helper";

#[derive(Parser, Debug)]
#[command(version, about = "Prefix-code file compressor", long_about = None)]
struct Args {
    /// Merge order used to build the prefix tree
    #[arg(long, value_enum, env = "HUFFMAN_MERGE_POLICY", default_value_t = MergePolicy::Legacy, global = true)]
    merge_policy: MergePolicy,

    /// Codebook encoding inside the sidecar file
    #[arg(long, value_enum, env = "HUFFMAN_SIDECAR_FORMAT", default_value_t = SidecarFormat::Escaped, global = true)]
    sidecar_format: SidecarFormat,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compress INPUT into PAYLOAD and a sidecar file
    Compress {
        input: PathBuf,
        payload: PathBuf,
        /// Defaults to `<payload stem>Helper.helper` next to the payload
        #[arg(long)]
        sidecar: Option<PathBuf>,
    },
    /// Restore the original bytes of PAYLOAD into OUTPUT
    Decompress {
        payload: PathBuf,
        output: PathBuf,
        #[arg(long)]
        sidecar: Option<PathBuf>,
    },
    /// Print the frequency table, prefix tree and codebook of INPUT
    Inspect { input: PathBuf },
    /// Prompt for operations on stdin until `x` is entered
    Interactive,
}

fn main() -> anyhow::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let args = Args::parse();
    let config = CodecConfig::new(args.merge_policy, args.sidecar_format);

    match args.command {
        Command::Compress {
            input,
            payload,
            sidecar,
        } => {
            let sidecar = sidecar.unwrap_or_else(|| default_sidecar_path(&payload));
            compress_file(&input, &payload, &sidecar, &config)
        }
        Command::Decompress {
            payload,
            output,
            sidecar,
        } => {
            let sidecar = sidecar.unwrap_or_else(|| default_sidecar_path(&payload));
            decompress_file(&payload, &sidecar, &output, &config)
        }
        Command::Inspect { input } => inspect(&input, &config),
        Command::Interactive => {
            let stdin = io::stdin().lock();
            let stdout = io::stdout().lock();
            run_interactive(stdin, stdout, &config)
        }
    }
}

/// `dir/archive.huff` -> `dir/archiveHelper.helper`
fn default_sidecar_path(payload: &Path) -> PathBuf {
    let stem = payload
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();
    payload.with_file_name(format!("{stem}{SIDECAR_SUFFIX}"))
}

fn compress_file(
    input: &Path,
    payload: &Path,
    sidecar: &Path,
    config: &CodecConfig,
) -> anyhow::Result<()> {
    let source = File::open(input).with_context(|| format!("failed to open {}", input.display()))?;
    let summary = compress_to_files(BufReader::new(source), payload, sidecar, config)
        .with_context(|| format!("failed to compress {}", input.display()))?;

    println!("The file has been compressed and coded successfully!");
    println!(
        "{} -> {} bytes ({:.1}%), sidecar: {}",
        summary.original_bytes,
        summary.payload_bytes,
        summary.ratio() * 100.0,
        sidecar.display()
    );
    Ok(())
}

fn decompress_file(
    payload: &Path,
    sidecar: &Path,
    output: &Path,
    config: &CodecConfig,
) -> anyhow::Result<()> {
    decompress_to_file(payload, sidecar, output, config)
        .with_context(|| format!("failed to decompress {}", payload.display()))?;

    println!("The file has been decompressed and decoded successfully!");
    Ok(())
}

fn inspect(input: &Path, config: &CodecConfig) -> anyhow::Result<()> {
    let content = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let table = FrequencyTable::from_bytes(&content);

    println!("frequencies ({} symbols, {} bytes):", table.len(), table.total());
    for (symbol, count) in table.iter() {
        println!("  {symbol:#04x} {:?} {count}", char::from(symbol));
    }

    println!("tree ({:?}):", config.merge_policy);
    print!("{}", PrefixTree::new(&table, config.merge_policy).render());

    let codebook = generate_codes(&table, config.merge_policy);
    println!("codebook:");
    for (symbol, code) in codebook.iter() {
        println!("  {symbol:#04x} {:?} {code}", char::from(symbol));
    }
    println!("encoded size: {} bits", codebook.encoded_len(&table));
    Ok(())
}

fn read_answer<R: BufRead>(input: &mut R) -> anyhow::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_owned()))
}

fn read_two<R: BufRead>(input: &mut R) -> anyhow::Result<(String, String)> {
    let first = read_answer(input)?.ok_or_else(|| anyhow!("unexpected end of input"))?;
    let second = read_answer(input)?.ok_or_else(|| anyhow!("unexpected end of input"))?;
    Ok((first, second))
}

fn run_interactive<R: BufRead, W: Write>(
    mut input: R,
    mut output: W,
    config: &CodecConfig,
) -> anyhow::Result<()> {
    loop {
        writeln!(output, "----- Hello! -------")?;
        writeln!(
            output,
            "Please enter your choice (e to compress a file, d to decompress a file, x to exit):"
        )?;

        let Some(choice) = read_answer(&mut input)? else {
            return Ok(());
        };

        let result = match choice.as_str() {
            "e" => {
                writeln!(output, "Enter the file to compress, then the compressed file name:")?;
                let (source, payload) = read_two(&mut input)?;
                let payload = PathBuf::from(payload);
                compress_file(
                    Path::new(&source),
                    &payload,
                    &default_sidecar_path(&payload),
                    config,
                )
            }
            "d" => {
                writeln!(output, "Enter the compressed file name, then the output file:")?;
                let (payload, destination) = read_two(&mut input)?;
                let payload = PathBuf::from(payload);
                decompress_file(
                    &payload,
                    &default_sidecar_path(&payload),
                    Path::new(&destination),
                    config,
                )
            }
            "x" => {
                writeln!(output, "Exiting...")?;
                return Ok(());
            }
            other => {
                writeln!(output, "Unknown choice {other:?}")?;
                Ok(())
            }
        };

        if let Err(err) = result {
            error!("{err:#}");
            writeln!(output, "{err:#}")?;
        }
        writeln!(output)?;
    }
}
