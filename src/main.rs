use clap::{Parser, Subcommand};
use sitepack::options::{self, RawOptions};
use sitepack::pipeline::{self, FinalizeError};
use sitepack::settings::Settings;
use sitepack::{archive, scan};
use std::path::PathBuf;

/// Shared flags for commands that operate on an export directory.
#[derive(clap::Args, Clone)]
struct ExportArgs {
    /// Directory containing the exported site
    #[arg(long)]
    export_dir: PathBuf,

    /// Deployment domain, e.g. example.com — omit to finish later: every
    /// generated URL then starts with the {{BASE_URL}} placeholder
    #[arg(long, default_value = "")]
    domain: String,

    /// Generate plain http:// URLs — no HSTS, no HTTPS upgrade rules
    #[arg(long)]
    no_https: bool,

    /// www handling for the resolved host: keep | www | non-www
    #[arg(long, default_value = "keep")]
    www_mode: String,

    /// Emit redirects from any other host to the resolved host
    #[arg(long)]
    force_host: bool,

    /// Language assumed for files without a language suffix
    #[arg(long, default_value = "ru")]
    primary_lang: String,

    /// Archive file name (default: site-<timestamp>.zip)
    #[arg(long)]
    zip_name: Option<String>,

    /// TOML file with shared SEO settings (site name, default image, ...)
    #[arg(long)]
    settings: Option<PathBuf>,
}

impl ExportArgs {
    fn raw_options(&self) -> RawOptions {
        RawOptions {
            export_dir: self.export_dir.to_string_lossy().to_string(),
            domain: self.domain.clone(),
            https: !self.no_https,
            www_mode: self.www_mode.clone(),
            force_host: self.force_host,
            primary_lang: self.primary_lang.clone(),
            zip_name: self.zip_name.clone(),
        }
    }
}

#[derive(Parser)]
#[command(name = "sitepack")]
#[command(about = "Finalize a static multi-language HTML export for deployment")]
#[command(long_about = "\
Finalize a static multi-language HTML export for deployment

The export's filenames are the data source. Pages are discovered by
convention, rewritten in place, and packed into one deployable zip:

  export/
  ├── index.html              # Home, primary language
  ├── index-en.html           # Home, English
  ├── about.html              # Page \"about\", primary language
  ├── about-en.html           # Page \"about\", English
  └── assets/...              # Everything else is archived untouched

Each page's head gets a canonical link, reciprocal hreflang alternates,
an x-default entry, and matching og:url/twitter:url tags — idempotently,
so re-running never duplicates anything. Next to the pages, sitepack
writes sitemap.xml (with xhtml:link alternates), robots.txt, .htaccess
and nginx.conf redirect configs, and a diagnostics.txt report.

Without --domain the export is finalized in placeholder mode: every
absolute URL starts with {{BASE_URL}}, to be substituted at deploy time.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the export and print the page/language manifest as JSON
    Scan(ExportArgs),
    /// Validate options and export content without writing anything
    Check(ExportArgs),
    /// Run the full pipeline: scan → rewrite heads → sitemap/robots/configs → zip
    Finalize {
        #[command(flatten)]
        args: ExportArgs,

        /// Stream the archive to stdout (and delete the temp file) instead
        /// of printing its path
        #[arg(long)]
        stdout: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    if let Err(err) = run(cli.command) {
        eprintln!("[sitepack] ERROR: {err}");
        std::process::exit(err.exit_code());
    }
}

fn run(command: Command) -> Result<(), FinalizeError> {
    match command {
        Command::Scan(args) => {
            let cfg = options::resolve(args.raw_options())?;
            let manifest = scan::scan(&cfg.export_dir, &cfg.primary_lang)?;
            let json = serde_json::to_string_pretty(&manifest)
                .map_err(|e| std::io::Error::other(e.to_string()))?;
            println!("{json}");
        }
        Command::Check(args) => {
            let cfg = options::resolve(args.raw_options())?;
            Settings::load(args.settings.as_deref())?;
            let manifest = scan::scan(&cfg.export_dir, &cfg.primary_lang)?;
            println!(
                "==> {}: {} HTML files, {} pages, languages: {}",
                cfg.export_dir.display(),
                manifest.variant_count(),
                manifest.pages.len(),
                manifest.languages.join(", ")
            );
            if cfg.placeholder_domain() {
                println!("==> No domain set: URLs will carry {{{{BASE_URL}}}}");
            } else {
                println!("==> Domain: {}", cfg.domain);
            }
            println!("==> Export is valid");
        }
        Command::Finalize { args, stdout } => {
            let cfg = options::resolve(args.raw_options())?;
            let settings = Settings::load(args.settings.as_deref())?;

            if !stdout {
                println!("==> Finalizing {}", cfg.export_dir.display());
            }
            let outcome = pipeline::finalize(&cfg, &settings)?;

            if stdout {
                // Progress goes to stderr; stdout carries the zip bytes.
                let out = std::io::stdout();
                archive::stream_and_remove(&outcome.zip_path, &mut out.lock())?;
                eprintln!(
                    "[sitepack] streamed archive ({} pages rewritten)",
                    outcome.rewritten
                );
            } else {
                println!(
                    "==> {} HTML files in {} languages, {} heads rewritten",
                    outcome.manifest.variant_count(),
                    outcome.manifest.languages.len(),
                    outcome.rewritten
                );
                println!("==> Generated sitemap.xml, robots.txt, .htaccess, nginx.conf, diagnostics.txt");
                println!("{}", outcome.zip_path.display());
            }
        }
    }
    Ok(())
}
