use std::{
    fs::File,
    io::{BufWriter, Write as _},
    path::{Path, PathBuf},
    sync::Arc,
};

use anyhow::Context as _;
use clap::{ArgAction, Parser, Subcommand};
use imgraph::{
    BindingOpts, FetchRequest, FetchResponse, Fetcher, ImagesBinding, ImagesError, ImagesResult,
    Recipe,
};

#[derive(Parser, Debug)]
#[command(name = "imgraph", version)]
struct Cli {
    /// Binding config JSON (endpoint URLs).
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the flattened instruction list and attachment order of a recipe.
    Plan(PlanArgs),
    /// Write the multipart request body for a recipe without sending it.
    Encode(EncodeArgs),
    /// Send a recipe to the backend and write the resulting image.
    #[cfg(feature = "http")]
    Transform(TransformArgs),
    /// Print format and dimensions of an image.
    #[cfg(feature = "http")]
    Info(InfoArgs),
}

#[derive(Parser, Debug)]
struct PlanArgs {
    /// Recipe JSON.
    recipe: PathBuf,
}

#[derive(Parser, Debug)]
struct EncodeArgs {
    /// Recipe JSON.
    recipe: PathBuf,

    /// Output path for the request body.
    #[arg(long)]
    out: PathBuf,
}

#[cfg(feature = "http")]
#[derive(Parser, Debug)]
struct TransformArgs {
    /// Recipe JSON.
    recipe: PathBuf,

    /// Output image path.
    #[arg(long)]
    out: PathBuf,
}

#[cfg(feature = "http")]
#[derive(Parser, Debug)]
struct InfoArgs {
    /// Input image.
    #[arg(long = "in")]
    in_path: PathBuf,
}

/// Used where nothing may leave the machine.
struct Offline;

impl Fetcher for Offline {
    fn fetch(&self, request: FetchRequest) -> ImagesResult<FetchResponse> {
        Err(ImagesError::unsupported(format!(
            "network access is disabled; refusing to POST '{}'",
            request.url
        )))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let opts = match &cli.config {
        Some(path) => BindingOpts::from_json_file(path)?,
        None => BindingOpts::default(),
    };

    match cli.cmd {
        Command::Plan(args) => cmd_plan(args, opts),
        Command::Encode(args) => cmd_encode(args, opts),
        #[cfg(feature = "http")]
        Command::Transform(args) => cmd_transform(args, opts),
        #[cfg(feature = "http")]
        Command::Info(args) => cmd_info(args, opts),
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(format!("imgraph={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn read_recipe(path: &Path) -> anyhow::Result<(Recipe, PathBuf)> {
    let recipe = Recipe::from_json_file(path)?;
    let root = path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    Ok((recipe, root))
}

fn offline_binding(opts: BindingOpts) -> ImagesBinding {
    ImagesBinding::with_opts(Arc::new(Offline), opts)
}

fn cmd_plan(args: PlanArgs, opts: BindingOpts) -> anyhow::Result<()> {
    let (recipe, root) = read_recipe(&args.recipe)?;
    let binding = offline_binding(opts);
    let flat = recipe.build(&binding, &root)?.flatten()?;

    let plan = serde_json::json!({
        "image": root.join(&recipe.input),
        "draw_images": recipe.draw_image_paths(&root),
        "transforms": flat.instructions,
    });
    println!("{}", serde_json::to_string_pretty(&plan)?);
    Ok(())
}

fn cmd_encode(args: EncodeArgs, opts: BindingOpts) -> anyhow::Result<()> {
    let (recipe, root) = read_recipe(&args.recipe)?;
    let output = recipe
        .output
        .clone()
        .context("recipe has no \"output\" section")?;
    let binding = offline_binding(opts);
    let mut body = recipe.build(&binding, &root)?.encode(&output)?;

    let f = File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    let n = std::io::copy(&mut body.stream, &mut w).with_context(|| "stream request body")?;
    w.flush()?;

    println!("{}", body.content_type);
    eprintln!("wrote {} bytes to {}", n, args.out.display());
    Ok(())
}

#[cfg(feature = "http")]
fn http_binding(opts: BindingOpts) -> ImagesBinding {
    ImagesBinding::with_opts(Arc::new(imgraph::ReqwestFetcher::new()), opts)
}

#[cfg(feature = "http")]
fn cmd_transform(args: TransformArgs, opts: BindingOpts) -> anyhow::Result<()> {
    let (recipe, root) = read_recipe(&args.recipe)?;
    let output = recipe
        .output
        .clone()
        .context("recipe has no \"output\" section")?;
    let binding = http_binding(opts);
    let result = recipe.build(&binding, &root)?.output(output)?;
    let content_type = result.content_type()?.to_string();

    if let Some(parent) = args.out.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    let f = File::create(&args.out)
        .with_context(|| format!("create '{}'", args.out.display()))?;
    let mut w = BufWriter::new(f);
    std::io::copy(&mut result.image(), &mut w).with_context(|| "stream result image")?;
    w.flush()?;

    eprintln!("wrote {} ({content_type})", args.out.display());
    Ok(())
}

#[cfg(feature = "http")]
fn cmd_info(args: InfoArgs, opts: BindingOpts) -> anyhow::Result<()> {
    let f = File::open(&args.in_path)
        .with_context(|| format!("open image '{}'", args.in_path.display()))?;
    let binding = http_binding(opts);
    let info = binding.info(Box::new(std::io::BufReader::new(f)))?;
    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(())
}
