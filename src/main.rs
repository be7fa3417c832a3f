use archive_content::types::Lang;
use archive_content::{config, load, markdown, output};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

fn version_string() -> &'static str {
    let on_tag = env!("ON_RELEASE_TAG");
    if on_tag == "true" {
        env!("CARGO_PKG_VERSION")
    } else {
        let hash = env!("GIT_HASH");
        if hash.is_empty() {
            "dev@unknown"
        } else {
            // Leaked once at startup — trivial, called exactly once
            Box::leak(format!("dev@{hash}").into_boxed_str())
        }
    }
}

#[derive(Parser)]
#[command(name = "archive-content")]
#[command(about = "Parse and inspect a Kirby-style archival content directory")]
#[command(long_about = "\
Parse and inspect a Kirby-style archival content directory

Each page directory holds one content file per language and optional image
metadata sidecars. Fields are separated by '----' lines; structured fields
hold YAML lists of records.

Content structure:

  content/
  ├── config.toml                  # Loader config (optional)
  ├── site.de.txt                  # Site-wide fields
  ├── site.en.txt
  ├── 4-1979/                      # Page (number prefix = sort order)
  │   ├── colloquia.de.txt         # <template>.<lang>.txt, German mandatory
  │   ├── colloquia.en.txt         # English, same template
  │   ├── BHK_02_150.jpg
  │   └── BHK_02_150.jpg.de.txt    # Image caption, copyright, alt
  ├── archiv/                      # No number prefix = sorts last
  └── error/                       # Excluded by default

Diagnostics (malformed blocks, unknown templates, pages without German
content) never stop a load. Set RUST_LOG=debug for per-page logging.

Run 'archive-content gen-config' to generate a documented config.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Load the content directory and write it as JSON
    Load {
        /// Output file (stdout when omitted)
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Load the content directory and list pages and diagnostics
    Check,
    /// Render one text field of a page to HTML
    Render {
        /// Page directory name, e.g. 4-1979
        slug: String,
        /// Field name, e.g. text or Text-intro
        field: String,
        /// Content language (de or en)
        #[arg(long, default_value = "de")]
        lang: Lang,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Load { output } => {
            let site = load::load(&cli.source)?;
            let json = serde_json::to_string_pretty(&site)?;
            match output {
                Some(path) => {
                    std::fs::write(&path, json)?;
                    eprintln!(
                        "Wrote {} pages to {}",
                        site.pages.len(),
                        path.display()
                    );
                }
                None => println!("{json}"),
            }
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let site = load::load(&cli.source)?;
            output::print_load_output(&site);
        }
        Command::Render { slug, field, lang } => {
            let site = load::load(&cli.source)?;
            let page = site
                .page(&slug)
                .ok_or_else(|| format!("no page {slug:?} in {}", cli.source.display()))?;
            let field = archive_content::fields::normalize_field_name(&field);
            let text = page
                .localized(&field, lang)
                .ok_or_else(|| format!("page {slug:?} has no text field {field:?}"))?;
            print!("{}", markdown::render_markdown(text));
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Log to stderr so stdout stays clean for JSON. `RUST_LOG` overrides the
/// default `warn` level.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
