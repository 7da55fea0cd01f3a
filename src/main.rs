use clap::{Parser, Subcommand};
use commit_gal::config::{self, BuildConfig, Layout};
use commit_gal::output;
use commit_gal::pipeline::{self, BuildError, BuildEvent};
use std::path::PathBuf;
use std::sync::LazyLock;
use std::sync::mpsc::Sender;

/// Release version when built from its own tag (`v0.3.0` or `0.3.0`),
/// otherwise a dev label carrying the commit.
fn version_label(package: &str, tag: &str, commit: &str) -> String {
    if tag.strip_prefix('v').unwrap_or(tag) == package {
        package.to_string()
    } else if commit.is_empty() {
        format!("{package}-dev")
    } else {
        format!("{package}-dev+{commit}")
    }
}

static VERSION: LazyLock<String> = LazyLock::new(|| {
    version_label(
        env!("CARGO_PKG_VERSION"),
        env!("COMMIT_GAL_BUILD_TAG"),
        env!("COMMIT_GAL_BUILD_COMMIT"),
    )
});

#[derive(Parser)]
#[command(name = "commit-gal")]
#[command(about = "Turn a repository's image commits into a photo blog")]
#[command(long_about = "\
Turn a repository's image commits into a photo blog

Your history is the data source. Every commit that adds or changes an image
becomes a post: the title is the headline, the body is the text, the images
are the photos. The result is a single index.html plus copies of the images.

  git commit -m \"Pier at dawn\" -m \"Fog rolled in around six.\"  # a post
  git commit -m \"[skip-gallery] fix typo in notes\"            # left out

Captions:
  Embedded:  IPTC Caption-Abstract (JPEG), Description or Title text chunk (PNG)
  Fallback:  commit title as alt text

Layouts:
  blog       one post per commit (default)
  gallery    grid of every image
  profile    gallery under an avatar header with counts

Run 'commit-gal gen-config' to print a stock commit-gal.json.")]
#[command(version = VERSION.as_str())]
struct Cli {
    /// Any directory inside the repository
    #[arg(long, default_value = ".", global = true)]
    repo: PathBuf,

    /// Output directory
    #[arg(
        long,
        env = "COMMIT_GAL_OUTPUT",
        default_value = config::DEFAULT_OUTPUT_DIR,
        global = true
    )]
    output: PathBuf,

    /// Config file [default: <repo>/commit-gal.json]
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Branch to read history from (falls back to HEAD)
    #[arg(long, env = "COMMIT_GAL_BRANCH", default_value = config::DEFAULT_BRANCH, global = true)]
    branch: String,

    /// Maximum number of commits to read
    #[arg(
        long,
        env = "COMMIT_GAL_MAX_POSTS",
        default_value_t = config::DEFAULT_MAX_POSTS,
        global = true
    )]
    max_posts: usize,

    /// Layout, overriding the config file
    #[arg(long, value_enum, global = true)]
    layout: Option<Layout>,

    /// Worker threads [default: all cores]
    #[arg(long, global = true)]
    jobs: Option<usize>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Read history, render the page and copy images
    Build,
    /// List what a build would produce without writing anything
    Check,
    /// Print a stock commit-gal.json
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match &cli.command {
        Command::Build => {
            init_thread_pool(cli.jobs);
            println!("==> Building {} → {}", cli.repo.display(), cli.output.display());
            let report = with_printer(false, |events| {
                let config = build_config(&cli, events)?;
                pipeline::run(&config, Some(events))
            })?;
            println!();
            output::print_build_summary(&report);
            println!("==> Build complete: {}", cli.output.display());
        }
        Command::Check => {
            init_thread_pool(cli.jobs);
            println!("==> Checking {}", cli.repo.display());
            let snapshot = with_printer(true, |events| {
                let config = build_config(&cli, events)?;
                pipeline::collect(&config, Some(events))
            })?;
            output::print_check_output(&snapshot);
            println!("==> Nothing written");
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_json());
        }
    }

    Ok(())
}

/// Assemble the run's settings: config file first, then CLI overrides.
fn build_config(cli: &Cli, events: &Sender<BuildEvent>) -> Result<BuildConfig, BuildError> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.repo.join(config::DEFAULT_CONFIG_FILE));
    let mut site = pipeline::load_site_config(&config_path, Some(events))?;
    if let Some(layout) = cli.layout {
        site.layout = layout;
    }

    Ok(BuildConfig {
        repo: cli.repo.clone(),
        output: cli.output.clone(),
        branch: cli.branch.clone(),
        max_posts: cli.max_posts,
        site,
    })
}

/// Run `f` with an event channel drained by a printer thread.
///
/// With `warnings_only`, progress events are dropped and only warnings shown.
fn with_printer<T>(
    warnings_only: bool,
    f: impl FnOnce(&Sender<BuildEvent>) -> Result<T, BuildError>,
) -> Result<T, BuildError> {
    let (tx, rx) = std::sync::mpsc::channel::<BuildEvent>();
    let printer = std::thread::spawn(move || {
        for event in rx {
            if !warnings_only || event.is_warning() {
                output::print_event(&event);
            }
        }
    });
    let result = f(&tx);
    drop(tx);
    printer.join().ok();
    result
}

/// Initialize the rayon thread pool.
///
/// Caps at the number of available CPU cores; `--jobs` can constrain down,
/// not up.
fn init_thread_pool(jobs: Option<usize>) {
    let threads = config::effective_threads(jobs);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
