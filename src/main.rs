use clap::Parser;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use std::path::PathBuf;
use usbblk::{parse_property_list, Config, DeviceRecord, Error, PropertyKey, Registry};

const SHORT_COLUMNS: [PropertyKey; 5] = [
    PropertyKey::Device,
    PropertyKey::Id,
    PropertyKey::VendorStr,
    PropertyKey::ModelStr,
    PropertyKey::Size,
];

#[derive(Debug, Parser)]
#[command(name = "usbblk")]
#[command(about = "List USB mass storage devices")]
struct Cli {
    /// Lists available properties
    #[arg(short = 'L', long)]
    list: bool,
    /// Number of devices
    #[arg(short = 'N', long)]
    nodevices: bool,
    /// Long output
    #[arg(short, long)]
    long: bool,
    /// Sizes in bytes
    #[arg(short, long)]
    scientific: bool,
    /// Display output in JSON
    #[arg(short = 'J', long)]
    json: bool,
    /// Display device
    #[arg(short = 'D', long)]
    device: Option<String>,
    /// Comma separated list of properties to display
    #[arg(short, long)]
    properties: Option<String>,
    /// usb.ids file to use instead of ./usb.ids
    #[arg(long)]
    usb_ids: Option<PathBuf>,
    #[arg(short, long)]
    debug: bool,
}

fn print_long(records: &[&DeviceRecord], keys: &[PropertyKey]) {
    let width = keys.iter().map(|k| k.name().len()).max().unwrap_or(0);
    for rec in records {
        println!("{}", rec);
        for key in keys {
            println!(
                "  {:<width$} : {}",
                key.name().to_uppercase(),
                rec.get(*key),
                width = width
            );
        }
    }
}

fn print_short(registry: &Registry, records: &[&DeviceRecord], keys: &[PropertyKey]) {
    let widths: Vec<usize> = keys.iter().map(|k| registry.max_label_width(*k)).collect();
    let header: Vec<String> = keys
        .iter()
        .zip(&widths)
        .map(|(k, w)| format!("{:<w$}", k.name().to_uppercase(), w = *w))
        .collect();
    println!("{}", header.join("  ").trim_end());
    for rec in records {
        let line: Vec<String> = keys
            .iter()
            .zip(&widths)
            .map(|(k, w)| format!("{:<w$}", rec.get(*k), w = *w))
            .collect();
        println!("{}", line.join("  ").trim_end());
    }
}

fn main() -> usbblk::Result<()> {
    let cli = Cli::parse();

    let level = if cli.debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    };
    if let Err(e) = SimpleLogger::new().with_level(level).init() {
        eprintln!("Could not initialise logging: {}", e);
    }

    if cli.list {
        for key in PropertyKey::ALL.iter() {
            println!("{}", key);
        }
        return Ok(());
    }

    let properties = cli
        .properties
        .as_deref()
        .map(parse_property_list)
        .transpose()?;

    let mut config = Config::default();
    if let Some(path) = cli.usb_ids {
        config.usb_ids_local = path;
    }

    let registry = Registry::scan(&config, !cli.scientific)?;

    if cli.nodevices {
        println!("{}", registry.count());
        return Ok(());
    }

    if cli.json {
        println!(
            "{}",
            registry.serialize(properties.as_deref(), cli.device.as_deref())?
        );
        return Ok(());
    }

    let records = match &cli.device {
        Some(device) => vec![registry
            .get(device)
            .ok_or_else(|| Error::DeviceNotFound(device.clone()))?],
        None => registry.records(),
    };

    if cli.long {
        let keys = properties.as_deref().unwrap_or(&PropertyKey::ALL);
        print_long(&records, keys);
    } else {
        let keys = properties.as_deref().unwrap_or(&SHORT_COLUMNS);
        print_short(&registry, &records, keys);
    }
    Ok(())
}
