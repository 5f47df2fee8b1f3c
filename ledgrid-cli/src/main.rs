use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;

use ledgrid::config::LedGridConfig;
use ledgrid::geometry::{CellResolver, GapPolicy, GridGeometry};
use ledgrid::pack::{pack, ByteMatrix};
use ledgrid::text::{parse_c_array, CArray};

mod input;
mod render_png;

/// LED grid frame tool: pack drawings into shift-register bytes and back
#[derive(Parser)]
#[command(name = "ledgrid", version)]
struct Cli {
    /// Grid configuration file (.toml); defaults to the 18x54 panel
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Override the configured gap policy (gap-aware or gap-exclusive)
    #[arg(long, global = true)]
    policy: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Show grid dimensions, canvas size and register layout
    Info,
    /// Print the default configuration as TOML
    DefaultConfig,
    /// Resolve a pointer position to a grid cell
    Resolve {
        /// Horizontal pointer position in pixels
        #[arg(allow_hyphen_values = true)]
        x: f64,
        /// Vertical pointer position in pixels
        #[arg(allow_hyphen_values = true)]
        y: f64,
    },
    /// Pack a grid (text grid, array literal or PNG/JPEG image) into register bytes
    Pack {
        /// Input file
        input: PathBuf,
        /// Luminance threshold for image input
        #[arg(long, default_value = "128")]
        threshold: u8,
        /// Element type of the emitted array
        #[arg(long = "type", default_value = "uint8_t")]
        ty: String,
        /// Name of the emitted array
        #[arg(long, default_value = "frame")]
        name: String,
        /// Emit JSON instead of an array literal
        #[arg(long)]
        json: bool,
        /// Pretty-print JSON output
        #[arg(long)]
        pretty: bool,
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Decode an array literal back into a `#`/`.` text grid
    Unpack {
        /// File containing the array literal
        input: PathBuf,
    },
    /// Render a grid as a PNG preview
    Render {
        /// Input file (text grid, array literal or image)
        input: PathBuf,
        /// Luminance threshold for image input
        #[arg(long, default_value = "128")]
        threshold: u8,
        /// Output PNG path
        #[arg(short, long, default_value = "frame.png")]
        output: PathBuf,
    },
}

#[derive(Serialize)]
struct OutputFrame {
    rows: usize,
    registers: usize,
    bytes: Vec<Vec<u8>>,
}

impl From<&ByteMatrix> for OutputFrame {
    fn from(matrix: &ByteMatrix) -> Self {
        OutputFrame {
            rows: matrix.rows(),
            registers: matrix.registers(),
            bytes: matrix.iter_rows().map(|row| row.to_vec()).collect(),
        }
    }
}

#[derive(Serialize)]
struct OutputCell {
    row: usize,
    col: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let config = load_config(cli.config.as_deref(), cli.policy.as_deref())?;
    let geometry = config.geometry()?;
    let policy = config.policy()?;
    log::debug!("using {}x{} grid, {}", geometry.rows, geometry.cols, policy);

    match cli.command {
        Command::Info => cmd_info(&geometry, policy),
        Command::DefaultConfig => {
            print!("{}", LedGridConfig::default().to_toml()?);
            Ok(())
        }
        Command::Resolve { x, y } => cmd_resolve(&geometry, policy, x, y),
        Command::Pack {
            input,
            threshold,
            ty,
            name,
            json,
            pretty,
            output,
        } => {
            let grid = input::load_grid(&input, &geometry, threshold)?;
            let bytes = pack(&grid);
            log::info!(
                "packed {} ({} LEDs on) into {}x{} registers",
                input.display(),
                grid.count_on(),
                bytes.rows(),
                bytes.registers()
            );
            let text = if json {
                let frame = OutputFrame::from(&bytes);
                let mut s = if pretty {
                    serde_json::to_string_pretty(&frame)?
                } else {
                    serde_json::to_string(&frame)?
                };
                s.push('\n');
                s
            } else {
                CArray::new(ty, name).format(&bytes)
            };
            write_output(output.as_deref(), &text)
        }
        Command::Unpack { input } => {
            let text = std::fs::read_to_string(&input)
                .with_context(|| format!("reading {}", input.display()))?;
            let bytes =
                parse_c_array(&text).with_context(|| format!("parsing {}", input.display()))?;
            let grid = bytes.unpack(geometry.cols).with_context(|| {
                format!("{} does not match the configured grid", input.display())
            })?;
            print!("{}", grid.to_ascii());
            Ok(())
        }
        Command::Render {
            input,
            threshold,
            output,
        } => {
            let grid = input::load_grid(&input, &geometry, threshold)?;
            render_png::write_grid_png(&grid, &geometry, &output)?;
            println!("wrote {}", output.display());
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>, policy: Option<&str>) -> Result<LedGridConfig> {
    let mut config = match path {
        Some(path) => {
            let toml_str = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            LedGridConfig::from_toml(&toml_str)
                .with_context(|| format!("parsing config from {}", path.display()))?
        }
        None => LedGridConfig::default(),
    };
    if let Some(policy) = policy {
        config.gap_policy = policy.to_string();
        config.validate()?;
    }
    Ok(config)
}

fn write_output(path: Option<&Path>, text: &str) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, text).with_context(|| format!("writing {}", path.display()))?;
            eprintln!("wrote {}", path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn cmd_info(geometry: &GridGeometry, policy: GapPolicy) -> Result<()> {
    println!("Grid:          {}x{}", geometry.rows, geometry.cols);
    println!("Cell size:     {}", geometry.cell_size);
    println!("Cell gap:      {}", geometry.cell_gap);
    println!("Border width:  {}", geometry.border_width);
    println!("Canvas:        {}x{}", geometry.width(), geometry.height());
    println!("Gap policy:    {}", policy);
    println!(
        "Registers:     {} per row, {} total",
        geometry.register_count(),
        geometry.register_count() * geometry.rows
    );
    Ok(())
}

fn cmd_resolve(geometry: &GridGeometry, policy: GapPolicy, x: f64, y: f64) -> Result<()> {
    let resolver = CellResolver::new(*geometry, policy);
    let cell = resolver
        .resolve(x, y)
        .map(|c| OutputCell { row: c.row, col: c.col });
    println!("{}", serde_json::to_string(&cell)?);
    Ok(())
}
