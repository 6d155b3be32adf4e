use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use prism_renderer::{render, RenderConfig, World};

/// Parsed command line.
#[derive(Debug)]
struct Options {
    scene: PathBuf,
    output: Option<PathBuf>,
    accelerate: bool,
    threads: Option<usize>,
    config: RenderConfig,
}

fn command() -> Command {
    Command::new("prism")
        .about("Whitted-style ray tracer")
        .arg(
            Arg::new("scene")
                .required(true)
                .value_parser(value_parser!(PathBuf))
                .help("Scene description file"),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_parser(value_parser!(PathBuf))
                .help("Output image; the extension picks the format [default: scene's output_image]"),
        )
        .arg(
            Arg::new("accelerate")
                .short('a')
                .long("accelerate")
                .action(ArgAction::SetTrue)
                .help("Intersect triangles through a BVH"),
        )
        .arg(
            Arg::new("samples")
                .short('s')
                .long("samples")
                .value_parser(value_parser!(u32).range(1..))
                .help("Samples per pixel [default: 1, the pixel center]"),
        )
        .arg(
            Arg::new("seed")
                .long("seed")
                .value_parser(value_parser!(u64))
                .help("Seed for sub-pixel jitter [default: 0]"),
        )
        .arg(
            Arg::new("bucket-size")
                .long("bucket-size")
                .value_parser(value_parser!(u32).range(1..))
                .help("Bucket edge length in pixels [default: 64]"),
        )
        .arg(
            Arg::new("threads")
                .short('j')
                .long("threads")
                .value_parser(value_parser!(usize))
                .help("Worker threads [default: one per core]"),
        )
}

fn parse_options(matches: &ArgMatches) -> Result<Options> {
    let defaults = RenderConfig::default();

    Ok(Options {
        scene: matches
            .get_one::<PathBuf>("scene")
            .cloned()
            .context("missing scene file")?,
        output: matches.get_one::<PathBuf>("output").cloned(),
        accelerate: matches.get_flag("accelerate"),
        threads: matches.get_one::<usize>("threads").copied(),
        config: RenderConfig {
            samples_per_pixel: matches
                .get_one::<u32>("samples")
                .copied()
                .unwrap_or(defaults.samples_per_pixel),
            bucket_size: matches
                .get_one::<u32>("bucket-size")
                .copied()
                .unwrap_or(defaults.bucket_size),
            seed: matches.get_one::<u64>("seed").copied().unwrap_or(defaults.seed),
        },
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    let options = parse_options(&command().get_matches())?;
    log::info!("Starting Prism");

    if let Some(threads) = options.threads {
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to configure the render thread pool")?;
    }

    let mut scene = prism_core::load_scene(&options.scene)
        .with_context(|| format!("failed to load scene {}", options.scene.display()))?;
    scene.accelerate = options.accelerate;
    let output = options.output.unwrap_or_else(|| scene.output_image.clone());

    let world = World::new(scene);
    let image = render(&world, &options.config);

    image
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use prism_renderer::DEFAULT_BUCKET_SIZE;

    fn parse(args: &[&str]) -> Options {
        let matches = command().try_get_matches_from(args.iter().copied()).unwrap();
        parse_options(&matches).unwrap()
    }

    #[test]
    fn test_defaults() {
        let options = parse(&["prism", "scene.txt"]);

        assert_eq!(options.scene, PathBuf::from("scene.txt"));
        assert!(options.output.is_none());
        assert!(!options.accelerate);
        assert!(options.threads.is_none());
        assert_eq!(options.config.samples_per_pixel, 1);
        assert_eq!(options.config.bucket_size, DEFAULT_BUCKET_SIZE);
        assert_eq!(options.config.seed, 0);
    }

    #[test]
    fn test_all_flags() {
        let options = parse(&[
            "prism", "scene.txt", "-a", "-o", "out.png", "-s", "8", "--seed", "3", "--bucket-size",
            "16", "-j", "2",
        ]);

        assert!(options.accelerate);
        assert_eq!(options.output, Some(PathBuf::from("out.png")));
        assert_eq!(options.config.samples_per_pixel, 8);
        assert_eq!(options.config.seed, 3);
        assert_eq!(options.config.bucket_size, 16);
        assert_eq!(options.threads, Some(2));
    }

    #[test]
    fn test_rejects_bad_arguments() {
        assert!(command().try_get_matches_from(["prism"]).is_err());
        assert!(command().try_get_matches_from(["prism", "s.txt", "-s", "0"]).is_err());
        assert!(command().try_get_matches_from(["prism", "s.txt", "--bucket-size", "x"]).is_err());
    }

    #[test]
    fn test_command_is_valid() {
        command().debug_assert();
    }
}
