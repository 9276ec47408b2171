use clap::{Parser, Subcommand};
use java_cheatsheet::environment::{self, BuildEnv};
use java_cheatsheet::{config, generate, navigation, output, scan, serve};
use std::path::{Path, PathBuf};

const VERSION: &str = env!("BUILD_VERSION");

/// Shared flags for commands that render the site.
#[derive(clap::Args, Clone)]
struct BuildArgs {
    /// Disable the render cache: re-render every page
    #[arg(long)]
    no_cache: bool,

    /// Published host for canonical links and the sitemap (overrides SITE_BASE_URL)
    #[arg(long, value_name = "HOST")]
    base_url: Option<String>,
}

#[derive(Parser)]
#[command(name = "java-cheatsheet")]
#[command(about = "Static site generator for the Java Cheatsheet")]
#[command(long_about = "\
Static site generator for the Java Cheatsheet

Markdown files become pages, routed by the content directory they live in.

Content structure:

  content/
  ├── config.toml                  # Site config (optional, see gen-config)
  ├── .env                         # SITE_BASE_URL, NEWSLETTER_ENDPOINT (optional)
  ├── public/                      # Static assets → copied to output root
  ├── pages/index.md               # → /
  └── docs/
      ├── cheatsheet/basics.md     # → /cheatsheet/basics
      ├── oops/class.md            # → /oops/class
      ├── collection/list.md       # → /collection/list
      ├── multithread/basics.md    # → /multithread/basics
      └── blog/2024/records.md     # → /blog/2024/records

Page title (first available wins):
  front matter `title` → first `# heading` → file name

Run 'java-cheatsheet gen-config' to generate a documented config.toml.")]
#[command(version = VERSION)]
struct Cli {
    /// Content directory
    #[arg(long, default_value = "content", global = true)]
    source: PathBuf,

    /// Output directory
    #[arg(long, default_value = "dist", global = true)]
    output: PathBuf,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Scan the content directory and list the pages found
    Scan {
        /// Print the scan manifest as JSON
        #[arg(long)]
        json: bool,
    },
    /// Render the site into the output directory
    Build(BuildArgs),
    /// Verify every navigation entry points at a page
    Check,
    /// Build, then serve the output directory locally
    Serve {
        /// Port to listen on (next free port is used if taken)
        #[arg(long)]
        port: Option<u16>,

        /// Serve the existing output without building first
        #[arg(long)]
        no_build: bool,

        #[command(flatten)]
        build: BuildArgs,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    java_cheatsheet::init_tracing(cli.verbose);

    match cli.command {
        Command::Scan { json } => {
            let manifest = scan::scan(&cli.source)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&manifest)?);
            } else {
                output::print_scan_output(&manifest, &cli.source);
            }
        }
        Command::Build(args) => {
            build(&cli.source, &cli.output, &args)?;
        }
        Command::Check => {
            println!("==> Checking {}", cli.source.display());
            let manifest = scan::scan(&cli.source)?;
            let routes = manifest.routes();
            let issues = navigation::check(&routes);
            output::print_check_output(navigation::collections(), routes.len(), &issues);
            if !issues.is_empty() {
                return Err(format!("navigation has {} problem(s)", issues.len()).into());
            }
            println!("==> Content is valid");
        }
        Command::Serve {
            port,
            no_build,
            build: args,
        } => {
            if !no_build {
                build(&cli.source, &cli.output, &args)?;
            }
            let site_config = config::load_config(&cli.source)?;
            let env = BuildEnv::load(&cli.source)?;
            let options = serve::ServeOptions {
                host: site_config.serve.host.clone(),
                port: port.unwrap_or(site_config.serve.port),
                newsletter_path: site_config.serve.newsletter_path.clone(),
                newsletter_endpoint: env.newsletter_endpoint.clone(),
            };
            let server = serve::PreviewServer::bind(&cli.output, &options)?;
            output::print_serve_banner(
                server.addr(),
                &cli.output,
                &options.newsletter_path,
                options.newsletter_endpoint.as_deref(),
            );
            server.run();
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Scan and generate.
fn build(source: &Path, output_dir: &Path, args: &BuildArgs) -> Result<(), Box<dyn std::error::Error>> {
    println!("==> Scanning {}", source.display());
    let manifest = scan::scan(source)?;
    let env = BuildEnv::load(source)?;
    let base_url = environment::resolve_base_url(args.base_url.as_deref(), &env, &manifest.config);

    init_thread_pool(&manifest.config.processing);

    println!("==> Generating https://{} → {}", base_url, output_dir.display());
    let options = generate::BuildOptions {
        base_url,
        use_cache: !args.no_cache,
        version: VERSION.to_string(),
    };
    let report = generate::generate(&manifest, source, output_dir, &options)?;
    output::print_generate_output(&report);

    println!("==> Build complete: {}", output_dir.display());
    Ok(())
}

/// Initialize the rayon thread pool based on processing config.
///
/// Caps at the number of available CPU cores: user can constrain down, not up.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
