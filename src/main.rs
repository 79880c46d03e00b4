use std::path::PathBuf;

use clap::{Parser, Subcommand};
use log::{info, warn};
use rf_stack::{
    clamp_selection, format_viz_entry, init_logging, normalize_layer_spec, print_layer_table,
    save_grid_png, AppConfig, InputShape, LayerStack, RawLayerFields, Result, RfStackError,
};

/// Build a stack of Conv2D / MaxPool2D layers and inspect receptive fields and shapes.
#[derive(Debug, Parser)]
#[command(author, version, about)]
struct Args {
    /// Session file holding the layer list and input shape.
    #[arg(long, default_value = "rf_session.json")]
    session: PathBuf,

    /// Optional settings JSON.
    #[arg(long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Append a layer. Non-numeric values fall back to defaults.
    Add {
        /// Conv2D or MaxPool2D.
        #[arg(long = "type", default_value = "Conv2D")]
        layer_type: String,

        #[arg(long, default_value = "3", allow_hyphen_values = true)]
        kernel: String,

        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        stride: String,

        #[arg(long, default_value = "0", allow_hyphen_values = true)]
        padding: String,

        /// Ignored for MaxPool2D.
        #[arg(long, default_value = "1", allow_hyphen_values = true)]
        dilation: String,

        /// Output channels, omit to keep the incoming count. Ignored for MaxPool2D.
        #[arg(long, allow_hyphen_values = true)]
        out_channels: Option<String>,
    },

    /// Remove the last layer.
    Pop,

    /// Remove every layer, keeping the input shape.
    Reset,

    /// Replace the input shape.
    Input {
        #[arg(long)]
        h: usize,
        #[arg(long)]
        w: usize,
        #[arg(long)]
        c: usize,
    },

    /// Print receptive field, jump and output shape per layer.
    Show {
        /// Print JSON instead of a table.
        #[arg(long)]
        json: bool,
    },

    /// Trace an output cell of one of the first visualized layers back to its inputs.
    Viz {
        /// 1-based layer, clamped into range.
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        layer: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        oy: i64,

        #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
        ox: i64,

        /// Also write the layer's input grid, with contributing cells marked, as a PNG.
        #[arg(long)]
        png: Option<PathBuf>,
    },
}

fn load_stack(args: &Args, config: &AppConfig) -> Result<LayerStack> {
    if args.session.exists() {
        LayerStack::load(&args.session)
    } else {
        Ok(LayerStack::new(config.default_input))
    }
}

fn run(args: Args, config: AppConfig) -> Result<()> {
    let mut stack = load_stack(&args, &config)?;

    match args.command {
        Command::Add {
            layer_type,
            kernel,
            stride,
            padding,
            dilation,
            out_channels,
        } => {
            let raw = RawLayerFields {
                layer_type: Some(layer_type),
                kernel: Some(kernel),
                stride: Some(stride),
                padding: Some(padding),
                dilation: Some(dilation),
                out_channels,
            };
            let layer = normalize_layer_spec(&raw);
            info!("adding {}", layer);
            stack.push(layer);
            stack.save(&args.session)?;
            print_layer_table(&stack.input, &stack.results());
        }
        Command::Pop => {
            if stack.pop().is_none() {
                warn!("stack is already empty");
            }
            stack.save(&args.session)?;
            print_layer_table(&stack.input, &stack.results());
        }
        Command::Reset => {
            stack.clear();
            stack.save(&args.session)?;
            print_layer_table(&stack.input, &stack.results());
        }
        Command::Input { h, w, c } => {
            stack.set_input(InputShape::new(h, w, c)?);
            stack.save(&args.session)?;
            print_layer_table(&stack.input, &stack.results());
        }
        Command::Show { json } => {
            let results = stack.results();
            if json {
                println!("{}", serde_json::to_string_pretty(&results)?);
            } else {
                print_layer_table(&stack.input, &results);
            }
        }
        Command::Viz { layer, oy, ox, png } => {
            let entries = stack.viz(&config.viz);
            let Some(selection) = clamp_selection(&entries, layer, oy, ox) else {
                if png.is_some() {
                    return Err(RfStackError::EmptyStack);
                }
                println!("(no layers)");
                return Ok(());
            };
            let Some(entry) = selection.entry(&entries) else {
                return Err(RfStackError::EmptyStack);
            };

            print!("{}", format_viz_entry(entry, &selection));

            if let Some(path) = png {
                let cells = entry.contributing_cells(selection.oy, selection.ox);
                save_grid_png(path, &entry.input, &cells, config.cell_px)?;
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = match &args.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };
    init_logging(config.level_filter()?);

    run(args, config)
}
