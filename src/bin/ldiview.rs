use std::{
    fs::File,
    io::BufReader,
    path::{Path, PathBuf},
};

use anyhow::Context as _;
use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "ldiview", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the field directory and resolved scene of a container as JSON.
    Inspect(InspectArgs),
    /// Write every field's bytes to its own file.
    Extract(ExtractArgs),
    /// Load a container, smooth viewer samples, and print the frame's synthesis parameters.
    Params(ParamsArgs),
}

#[derive(Parser, Debug)]
struct InspectArgs {
    /// Input LDI file.
    #[arg(long = "in")]
    in_path: PathBuf,
}

#[derive(Parser, Debug)]
struct ExtractArgs {
    /// Input LDI file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Directory receiving `field_<index>_type_<type>.bin` files.
    #[arg(long)]
    out_dir: PathBuf,
}

#[derive(Parser, Debug)]
struct ParamsArgs {
    /// Input LDI file.
    #[arg(long = "in")]
    in_path: PathBuf,

    /// Session options JSON (any subset of fields).
    #[arg(long)]
    config: Option<PathBuf>,

    /// Raw viewer sample `x,y,z` in millimeters; repeat to feed several.
    #[arg(long = "viewer", value_parser = parse_viewer, allow_hyphen_values = true)]
    viewers: Vec<ldiview::Position3D>,

    /// Output width in pixels.
    #[arg(long)]
    width: f64,

    /// Output height in pixels.
    #[arg(long)]
    height: f64,

    /// Use the mobile rest distance.
    #[arg(long)]
    mobile: bool,
}

fn parse_viewer(s: &str) -> Result<ldiview::Position3D, String> {
    ldiview::Position3D::parse_csv(s).map_err(|e| e.to_string())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Inspect(args) => cmd_inspect(args),
        Command::Extract(args) => cmd_extract(args),
        Command::Params(args) => cmd_params(args),
    }
}

fn read_bytes(path: &Path) -> anyhow::Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("read '{}'", path.display()))
}

fn read_opts_json(path: &Path) -> anyhow::Result<ldiview::SessionOpts> {
    let f = File::open(path).with_context(|| format!("open config '{}'", path.display()))?;
    let r = BufReader::new(f);
    let opts: ldiview::SessionOpts =
        serde_json::from_reader(r).with_context(|| "parse config JSON")?;
    Ok(opts)
}

fn cmd_inspect(args: InspectArgs) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.in_path)?;
    let container = ldiview::Container::decode(bytes)
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;
    let document = ldiview::resolve_scene(&container)?;

    let fields: Vec<_> = container
        .fields()
        .map(|f| {
            serde_json::json!({
                "index": f.index,
                "type": f.field_type,
                "size": f.data.len(),
            })
        })
        .collect();
    let summary = serde_json::json!({
        "full_size": container.full_size(),
        "region_offset": container.region_offset(),
        "scene_field_type": document.scene_field_type(),
        "fields": fields,
        "views": document.views(),
    });

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}

fn cmd_extract(args: ExtractArgs) -> anyhow::Result<()> {
    let bytes = read_bytes(&args.in_path)?;
    let container = ldiview::Container::decode(bytes)
        .with_context(|| format!("decode '{}'", args.in_path.display()))?;

    std::fs::create_dir_all(&args.out_dir)
        .with_context(|| format!("create output dir '{}'", args.out_dir.display()))?;

    for field in container.fields() {
        let path = args
            .out_dir
            .join(format!("field_{}_type_{}.bin", field.index, field.field_type));
        std::fs::write(&path, field.data)
            .with_context(|| format!("write '{}'", path.display()))?;
    }

    eprintln!(
        "wrote {} fields to {}",
        container.len(),
        args.out_dir.display()
    );
    Ok(())
}

fn cmd_params(args: ParamsArgs) -> anyhow::Result<()> {
    let mut opts = match &args.config {
        Some(path) => read_opts_json(path)?,
        None => ldiview::SessionOpts::default(),
    };
    if args.mobile {
        opts.is_mobile = true;
    }

    let session = ldiview::ViewerSession::new(opts)?;
    let bytes = read_bytes(&args.in_path)?;
    session
        .load(bytes)
        .with_context(|| format!("load '{}'", args.in_path.display()))?;

    for v in &args.viewers {
        session.push_viewpoint(*v);
    }

    let params = session
        .frame_params(ldiview::Size::new(args.width, args.height))
        .context("no asset loaded")?;
    println!("{}", serde_json::to_string_pretty(&params)?);
    Ok(())
}
