use std::path::PathBuf;

use anyhow::Context as _;
use clap::{Parser, Subcommand};
use rand::Rng;

use artgen::{Primitive, Recipe, start_session};

#[derive(Parser, Debug)]
#[command(name = "artgen", version)]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Render one artwork from a composition recipe and write it as a JPEG.
    Generate(GenerateArgs),
    /// Scripted drawing session: commit random steps, undo the last one.
    Draw(DrawArgs),
}

#[derive(Parser, Debug)]
struct GenerateArgs {
    /// Recipe name: chaotic or geometric.
    #[arg(long, default_value = "geometric")]
    recipe: String,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 600)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 400)]
    height: u32,

    /// Output JPEG path.
    #[arg(long)]
    out: PathBuf,
}

#[derive(Parser, Debug)]
struct DrawArgs {
    /// Number of random primitives to commit.
    #[arg(long, default_value_t = 4)]
    steps: u32,

    /// Canvas width in pixels.
    #[arg(long, default_value_t = 540)]
    width: u32,

    /// Canvas height in pixels.
    #[arg(long, default_value_t = 960)]
    height: u32,

    /// Directory for persisted step snapshots.
    #[arg(long, default_value = "artgen-steps")]
    store: PathBuf,

    /// Output JPEG path for the final canvas.
    #[arg(long)]
    out: PathBuf,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match cli.cmd {
        Command::Generate(args) => cmd_generate(args),
        Command::Draw(args) => cmd_draw(args),
    }
}

fn cmd_generate(args: GenerateArgs) -> anyhow::Result<()> {
    let recipe: Recipe = args.recipe.parse()?;
    let canvas = artgen::recipe::run(recipe, args.width, args.height)?;
    write_jpeg(&args.out, &canvas.to_jpeg()?)?;
    eprintln!("wrote {}", args.out.display());
    Ok(())
}

fn cmd_draw(args: DrawArgs) -> anyhow::Result<()> {
    let mut rng = rand::rng();
    let mut history = start_session(args.width, args.height, &args.store)?;

    for _ in 0..args.steps {
        let primitive = random_primitive(&mut rng);
        let index = history.apply_and_commit(&primitive)?;
        eprintln!("step {index}: {}", primitive.label());
    }

    let index = history.undo()?;
    eprintln!("undo -> step {index}");

    write_jpeg(&args.out, &history.canvas().to_jpeg()?)?;
    eprintln!("wrote {}", args.out.display());

    history.end()?;
    Ok(())
}

fn random_primitive<R: Rng>(rng: &mut R) -> Primitive {
    match rng.random_range(0..9) {
        0 => Primitive::Background,
        1 => Primitive::VerticalLines,
        2 => Primitive::HorizontalLines,
        3 => Primitive::DiagonalLines,
        4 => Primitive::RegularPolygon,
        5 => Primitive::ArtisticPolygon,
        6 => Primitive::Arc {
            filled: rng.random_bool(0.5),
        },
        7 => Primitive::Ellipse,
        _ => Primitive::Line {
            width: rng.random_range(1..4) as f64,
            continuous: rng.random_bool(0.5),
        },
    }
}

fn write_jpeg(path: &PathBuf, bytes: &[u8]) -> anyhow::Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("create output dir '{}'", parent.display()))?;
    }
    std::fs::write(path, bytes).with_context(|| format!("write jpeg '{}'", path.display()))
}
