use clap::{Parser, Subcommand};
use ogstamp::{batch, config, output, provider, routes};
use std::path::PathBuf;

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
#[command(name = "ogstamp")]
#[command(about = "Stamp Open Graph preview-image tags into generated HTML")]
#[command(long_about = "\
Stamp Open Graph preview-image tags into generated HTML

Run after your static site generator has emitted its output. ogstamp reads
the generator's routes manifest, locates each page's HTML file, computes a
signed preview-image URL for it, and rewrites the page's metadata tags:

  <meta property=\"og:image\"     content=\"<url>\" data-rh=\"true\">
  <meta name=\"twitter:image\"    content=\"<url>\" data-rh=\"true\">
  <meta name=\"image\"            content=\"<url>\" data-rh=\"true\">

Stale managed tags are removed first, so re-running converges to the same
output. A failing page is reported and skipped — one bad route never aborts
the batch.

Routes manifest (JSON, emitted by the host build pipeline):

  [
    { \"name\": \"docusaurus-plugin-content-blog\",
      \"routes\": [ { \"path\": \"/blog/post-1\" } ] }
  ]

Run 'ogstamp gen-config' to generate a documented ogstamp.toml.")]
#[command(version = version_string())]
struct Cli {
    /// Generator output directory
    #[arg(long, default_value = "build", global = true)]
    out_dir: PathBuf,

    /// Routes manifest from the host build pipeline
    #[arg(long, default_value = "routes.json", global = true)]
    routes: PathBuf,

    /// Config file with provider credentials and options
    #[arg(long, default_value = "ogstamp.toml", global = true)]
    config: PathBuf,

    /// Verbose diagnostics (overrides the config file)
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite preview-image tags across all eligible routes
    Stamp {
        /// Site base URL, prepended to route paths to form page URLs
        #[arg(long)]
        base_url: String,
    },
    /// Dry run: report which routes resolve to files, without writing
    Check,
    /// Print a stock ogstamp.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Command::Stamp { base_url } => {
            let cfg = config::StampConfig::load(&cli.config)?;
            cfg.validate()?;

            let plugins = routes::load_manifest(&cli.routes)?;
            let enabled = routes::effective_enabled(cfg.enabled_plugins.as_deref());
            let eligible = routes::eligible_routes(plugins, &enabled);

            let threads = config::effective_threads(&cfg.processing);
            if threads > 1 {
                init_thread_pool(threads);
            }

            let provider = provider::SignedUrlProvider::new(
                &cfg.provider.endpoint,
                &cfg.provider.publishable_key,
                &cfg.provider.signature_secret,
            )?;

            let ctx = batch::RunContext {
                out_dir: cli.out_dir,
                base_url,
                image_options: cfg.image_options_json(),
                debug: cli.debug || cfg.debug,
                threads,
            };
            batch::run(&ctx, &eligible, &provider);
        }
        Command::Check => {
            // Check needs no credentials: fall back to defaults when the
            // config file isn't there yet.
            let cfg = if cli.config.is_file() {
                config::StampConfig::load(&cli.config)?
            } else {
                config::StampConfig::default()
            };

            let plugins = routes::load_manifest(&cli.routes)?;
            let enabled = routes::effective_enabled(cfg.enabled_plugins.as_deref());
            let eligible = routes::eligible_routes(plugins, &enabled);

            println!("==> Checking {}", cli.out_dir.display());
            let report = batch::resolve_only(&cli.out_dir, &eligible);
            output::print_check_report(&report);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Initialize the rayon thread pool for parallel route processing.
fn init_thread_pool(threads: usize) {
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
