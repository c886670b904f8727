use clap::{Parser, Subcommand};
use log::error;
use pagefile::{FileResult, PAGE_SIZE, PageId, StorageConfig, StorageManager};
use prettytable::{Table, row};
use std::path::PathBuf;
use std::process::ExitCode;

/// Inspect and manipulate fixed-size page files
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Page file to operate on
    file: PathBuf,

    /// Sync file data after every write
    #[arg(long)]
    sync: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create the file with one empty page, replacing any existing file
    Create,
    /// Show page count and file size
    Info {
        #[arg(long)]
        json: bool,
    },
    /// Hex dump a page
    Read { page: PageId },
    /// Fill an existing page with a byte value
    Fill { page: PageId, byte: u8 },
    /// Append empty pages
    Append {
        #[arg(default_value = "1")]
        count: usize,
    },
    /// Grow the file to at least the given number of pages
    Ensure { pages: usize },
    /// Delete the file
    Destroy,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let log_level = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let manager = StorageManager::init(StorageConfig {
        sync_on_write: args.sync,
        ..StorageConfig::default()
    });

    match run(&manager, &args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(manager: &StorageManager, args: &Args) -> FileResult<()> {
    match &args.command {
        Command::Create => manager.create_page_file(&args.file),
        Command::Destroy => manager.destroy_page_file(&args.file),
        Command::Info { json } => {
            let handle = manager.open_page_file(&args.file)?;
            let info = handle.info()?;
            if *json {
                let out = serde_json::to_string_pretty(&info)
                    .map_err(|e| std::io::Error::other(e.to_string()))?;
                println!("{}", out);
            } else {
                let mut table = Table::new();
                table.add_row(row!["name", info.name]);
                table.add_row(row!["pages", info.total_pages]);
                table.add_row(row!["page size", PAGE_SIZE]);
                table.add_row(row!["bytes", info.file_len]);
                table.printstd();
            }
            Ok(())
        }
        Command::Read { page } => {
            let mut handle = manager.open_page_file(&args.file)?;
            let mut buffer = vec![0u8; PAGE_SIZE];
            handle.read_block(*page, &mut buffer)?;
            print_hex(*page, &buffer);
            handle.close()
        }
        Command::Fill { page, byte } => {
            let mut handle = manager.open_page_file(&args.file)?;
            handle.write_block(*page, &vec![*byte; PAGE_SIZE])?;
            handle.close()
        }
        Command::Append { count } => {
            let mut handle = manager.open_page_file(&args.file)?;
            for _ in 0..*count {
                handle.append_empty_block()?;
            }
            println!("{} pages", handle.total_pages());
            handle.close()
        }
        Command::Ensure { pages } => {
            let mut handle = manager.open_page_file(&args.file)?;
            handle.ensure_capacity(*pages)?;
            println!("{} pages", handle.total_pages());
            handle.close()
        }
    }
}

/// Print a page 16 bytes per line, collapsing runs of identical lines
fn print_hex(page: PageId, buffer: &[u8]) {
    let base = page * PAGE_SIZE;
    let mut prev: Option<&[u8]> = None;
    let mut skipping = false;

    for (i, line) in buffer.chunks(16).enumerate() {
        if prev == Some(line) {
            if !skipping {
                println!("*");
                skipping = true;
            }
            continue;
        }
        skipping = false;
        prev = Some(line);

        let hex: Vec<String> = line.iter().map(|b| format!("{:02x}", b)).collect();
        let ascii: String = line
            .iter()
            .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
            .collect();
        println!("{:08x}  {}  |{}|", base + i * 16, hex.join(" "), ascii);
    }
    println!("{:08x}", base + buffer.len());
}
