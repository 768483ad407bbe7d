//! Command-line front end for the PLC ⇄ Modbus address translator.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use plc_modbus_addr::{
    console_logger, load_address_map,
    utils::{format, logging},
    AddressMapConfig, AddressResult, Conversion, Translator, DEFAULT_CONFIG_FILE,
};

/// Convert between PLC memory addresses and Modbus register addresses.
#[derive(Parser, Debug)]
#[command(name = "plc-modbus")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Action to perform.
    #[command(subcommand)]
    command: Command,

    /// JSON address table (memoryOffsets / memoryPrefixes). When omitted,
    /// `address_map.json` in the working directory is used if present,
    /// otherwise the built-in table.
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print a timestamped trace line for every conversion.
    #[arg(long, global = true)]
    trace: bool,

    /// Print conversion results as JSON.
    #[arg(long, global = true)]
    json: bool,

    /// Verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Command {
    /// List memory types in table order.
    List,
    /// Show the active address table.
    Table,
    /// Print the active table as a configuration document.
    Template,
    /// Convert a PLC address, e.g. `to-modbus V 400`.
    ToModbus {
        /// Memory type (M, V, X, Y, T, C, ...).
        tag: String,
        /// PLC offset.
        #[arg(allow_hyphen_values = true)]
        offset: String,
    },
    /// Convert a Modbus address, e.g. `to-plc 4x 912` or `to-plc "4x 912"`.
    ToPlc {
        /// Prefix and value, as one or two arguments.
        #[arg(required = true, num_args = 1..=2, allow_hyphen_values = true)]
        address: Vec<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    logging::init_cli_logger(args.verbose);

    let outcome = load_address_map(config_path(&args).as_deref());
    if let Some(warning) = &outcome.warning {
        eprintln!("warning: {} (using built-in table)", warning);
    }

    let translator = if args.trace {
        Translator::with_logger(&outcome.map, console_logger!())
    } else {
        Translator::new(&outcome.map)
    };
    match run(&args, &translator) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn config_path(args: &Args) -> Option<PathBuf> {
    if let Some(path) = &args.config {
        return Some(path.clone());
    }
    let default = Path::new(DEFAULT_CONFIG_FILE);
    default.is_file().then(|| default.to_path_buf())
}

fn run(args: &Args, translator: &Translator<'_>) -> AddressResult<()> {
    match &args.command {
        Command::List => {
            for tag in translator.list_memory_types() {
                println!("{}", tag);
            }
        }
        Command::Table => {
            println!("{}", format::format_table(translator.address_map()));
        }
        Command::Template => {
            let config = AddressMapConfig::from_map(translator.address_map());
            println!("{}", config.to_json_pretty()?);
        }
        Command::ToModbus { tag, offset } => {
            let address = translator.plc_to_modbus_str(tag, offset)?;
            print_conversion(args.json, Conversion::Modbus(address))?;
        }
        Command::ToPlc { address } => {
            let address = translator.modbus_to_plc_str(&address.join(" "))?;
            print_conversion(args.json, Conversion::Plc(address))?;
        }
    }
    Ok(())
}

fn print_conversion(json: bool, conversion: Conversion) -> AddressResult<()> {
    if json {
        println!("{}", serde_json::to_string(&conversion)?);
        return Ok(());
    }
    match conversion {
        Conversion::Modbus(address) => println!("{}", address),
        Conversion::Plc(address) => println!("{}", address),
    }
    Ok(())
}
