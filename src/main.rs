use clap::{Parser, Subcommand};
use entrymap::build_config::BuildConfig;
use entrymap::naming::{AssetInfo, ChunkInfo};
use entrymap::{config, output};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser)]
#[command(name = "entrymap")]
#[command(about = "Entry points and output names for bundler-built static sites")]
#[command(long_about = "\
Entry points and output names for bundler-built static sites

Discovers templates, stylesheets, scripts and images under the source root,
maps them to bundler entry keys, and names every emitted file.

Project structure:

  project/
  ├── entrymap.toml             # Optional settings (see gen-config)
  └── src/
      ├── index.pug             # → index.html
      ├── _layout.pug           # Partial (leading _), not an entry
      ├── styles/home.scss      # → styles/home.css → assets/css/styles/index.css
      ├── js/index.js           # → js/index.js → assets/js/js/index.js
      └── logo.svg              # → assets/images/logo.svg

Run 'entrymap gen-config' to print a documented entrymap.toml.")]
#[command(version)]
struct Cli {
    /// Project directory (where entrymap.toml lives)
    #[arg(long, default_value = ".", global = true)]
    project: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List discovered sources by category
    Scan,
    /// List the entry map (key ← source)
    Entries {
        /// Print as JSON (key → absolute source path)
        #[arg(long)]
        json: bool,
    },
    /// Write the full build configuration as JSON
    Plan {
        /// Write to this file instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,
    },
    /// Evaluate a naming rule for one artifact
    #[command(subcommand)]
    Name(NameCommand),
    /// Validate sources and report entry key collisions and name clashes
    Check,
    /// Print a stock entrymap.toml with all options documented
    GenConfig,
}

#[derive(Subcommand)]
enum NameCommand {
    /// Name an entry chunk
    Entry {
        /// Facade module id; omit for synthetic chunks
        #[arg(long)]
        facade: Option<String>,
        /// Internal chunk name
        #[arg(long, default_value = "")]
        name: String,
    },
    /// Name a code-split chunk
    Chunk {
        /// Facade module id
        #[arg(long)]
        facade: Option<String>,
    },
    /// Name a stylesheet, image, or other asset
    Asset {
        /// Emitted asset name, e.g. styles/home.css
        #[arg(long)]
        name: String,
        /// Source path the asset came from
        #[arg(long)]
        original: Option<String>,
    },
}

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    match cli.command {
        Command::Scan => {
            let build = BuildConfig::load(&cli.project)?;
            println!("==> Scanning {}", build.root().display());
            output::print_scan_output(build.discovered());
        }
        Command::Entries { json } => {
            let build = BuildConfig::load(&cli.project)?;
            if json {
                let json = serde_json::to_string_pretty(&build.entries().input_map())?;
                println!("{json}");
            } else {
                output::print_entries_output(build.entries());
            }
        }
        Command::Plan { out } => {
            let build = BuildConfig::load(&cli.project)?;
            let json = serde_json::to_string_pretty(&build.plan())?;
            match out {
                Some(path) => {
                    if let Some(parent) = path.parent() {
                        std::fs::create_dir_all(parent)?;
                    }
                    std::fs::write(&path, json)?;
                    eprintln!("==> Plan written to {}", path.display());
                }
                None => println!("{json}"),
            }
        }
        Command::Name(name) => {
            let build = BuildConfig::load(&cli.project)?;
            let file_name = match name {
                NameCommand::Entry { facade, name } => build.entry_file_name(&ChunkInfo {
                    name,
                    facade_module_id: facade,
                }),
                NameCommand::Chunk { facade } => build.chunk_file_name(&ChunkInfo {
                    name: String::new(),
                    facade_module_id: facade,
                }),
                NameCommand::Asset { name, original } => {
                    build.asset_file_name(&AssetInfo::new(name, original.as_deref()))
                }
            };
            println!("{file_name}");
        }
        Command::Check => {
            let build = BuildConfig::load(&cli.project)?;
            println!("==> Checking {}", build.root().display());
            output::print_scan_output(build.discovered());
            if build.is_ambiguous() {
                println!();
                output::print_collisions(build.collisions());
                output::print_name_clashes(build.name_clashes());
                println!(
                    "==> {} entry key collision(s), {} output name clash(es)",
                    build.collisions().len(),
                    build.name_clashes().len()
                );
                return Ok(ExitCode::FAILURE);
            }
            println!("==> {} entries, no collisions", build.entries().len());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(ExitCode::SUCCESS)
}
