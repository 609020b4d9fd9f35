use std::path::{Path, PathBuf};

use anyhow::Context as _;
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "rendition", version)]
struct Cli {
    #[command(flatten)]
    service: ServiceArgs,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace). `RUST_LOG` takes precedence.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Args, Debug)]
struct ServiceArgs {
    /// JSON service configuration. Root flags given alongside it override its values.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Directory holding `<project>/<identifier>/file` sources.
    #[arg(long, env = "RENDITION_UPLOAD_ROOT", global = true)]
    upload_root: Option<PathBuf>,

    /// Directory for derived artifacts.
    #[arg(long, env = "RENDITION_CACHE_ROOT", global = true)]
    cache_root: Option<PathBuf>,

    /// Worker threads for decode/transform/encode.
    #[arg(long, global = true)]
    threads: Option<usize>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Produce (or fetch from cache) a rendition and write it to a file.
    Get(GetArgs),
    /// Print source metadata as JSON.
    Info(SourceArgs),
    /// Print the parsed and planned operation stack as JSON.
    Parse(ParseArgs),
    /// Print the cache key of a request.
    Key(KeyArgs),
}

#[derive(Args, Debug)]
struct SourceArgs {
    /// Project namespace.
    #[arg(long)]
    project: String,

    /// Source identifier.
    #[arg(long)]
    id: String,
}

#[derive(Args, Debug)]
struct GetArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Operation stack, e.g. `resize@width:800;rotate@angle:90`.
    #[arg(long, default_value = "")]
    ops: String,

    /// Output format token.
    #[arg(long, default_value = "jpg")]
    format: String,

    /// Output file.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Args, Debug)]
struct ParseArgs {
    /// Operation stack to parse.
    ops: String,
}

#[derive(Args, Debug)]
struct KeyArgs {
    #[command(flatten)]
    source: SourceArgs,

    /// Operation stack.
    #[arg(long, default_value = "")]
    ops: String,

    /// Output format token.
    #[arg(long, default_value = "jpg")]
    format: String,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.cmd {
        Command::Get(args) => cmd_get(&cli.service, args),
        Command::Info(args) => cmd_info(&cli.service, args),
        Command::Parse(args) => cmd_parse(args),
        Command::Key(args) => cmd_key(args),
    }
}

fn init_tracing(verbose: u8) {
    let fallback = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn load_config(args: &ServiceArgs) -> anyhow::Result<rendition::ServiceConfig> {
    let mut cfg = match &args.config {
        Some(path) => rendition::ServiceConfig::from_json_file(path)?,
        None => {
            let upload_root = args
                .upload_root
                .clone()
                .context("--upload-root (or RENDITION_UPLOAD_ROOT) is required without --config")?;
            let cache_root = args
                .cache_root
                .clone()
                .context("--cache-root (or RENDITION_CACHE_ROOT) is required without --config")?;
            rendition::ServiceConfig::new(upload_root, cache_root)
        }
    };
    if args.config.is_some() {
        if let Some(root) = &args.upload_root {
            cfg.upload_root = root.clone();
        }
        if let Some(root) = &args.cache_root {
            cfg.cache_root = root.clone();
        }
    }
    if let Some(n) = args.threads {
        cfg = cfg.with_threads(n);
    }
    Ok(cfg)
}

fn cmd_get(service: &ServiceArgs, args: GetArgs) -> anyhow::Result<()> {
    let svc = rendition::RenditionService::new(load_config(service)?)?;
    let out = svc.get_processed(&args.source.project, &args.source.id, &args.ops, &args.format)?;

    write_output(&args.out, &out.bytes)?;
    eprintln!(
        "wrote {} ({}, {} bytes, {:?})",
        args.out.display(),
        out.mime_type(),
        out.bytes.len(),
        out.origin
    );
    Ok(())
}

fn cmd_info(service: &ServiceArgs, args: SourceArgs) -> anyhow::Result<()> {
    let svc = rendition::RenditionService::new(load_config(service)?)?;
    let info = svc.get_info(&args.project, &args.id)?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}

fn cmd_parse(args: ParseArgs) -> anyhow::Result<()> {
    let operations = rendition::parse_stack(&args.ops)?;
    let steps = rendition::plan_steps(&operations)?;
    let doc = serde_json::json!({
        "operations": operations,
        "steps": steps,
    });
    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}

fn cmd_key(args: KeyArgs) -> anyhow::Result<()> {
    let operations = rendition::parse_stack(&args.ops)?;
    rendition::plan_steps(&operations)?;
    rendition::OutputFormat::from_token(&args.format)?;
    let key = rendition::CacheKey::compute(
        &args.source.project,
        &args.source.id,
        &operations,
        &args.format,
    );
    println!("{key}");
    Ok(())
}

fn write_output(path: &Path, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write '{}'", path.display()))
}
