use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use vignoise_engine::bindings::ResourceBindings;
use vignoise_engine::device::{Gpu, GpuInit};
use vignoise_engine::logging::{init_logging, LoggingConfig};
use vignoise_engine::offscreen::render_offscreen;
use vignoise_engine::raster::{render_overlay, OverlayMask, RasterConfig};
use vignoise_engine::texture::{AddressMode, FilterMode, Sampler, Texture2D};

/// Apply the vignette/grain overlay to an image.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Source image (any format the `image` crate decodes)
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Destination image; format follows the extension
    #[arg(value_name = "OUTPUT")]
    output: PathBuf,

    /// Where the fragment function runs
    #[arg(long, value_enum, default_value_t = Backend::Cpu)]
    backend: Backend,

    /// Texture filtering
    #[arg(long, value_enum, default_value_t = Filter::Linear)]
    filter: Filter,

    /// Addressing for UVs outside [0, 1]
    #[arg(long, value_enum, default_value_t = Address::Clamp)]
    address: Address,

    /// Output width in pixels (defaults to the input width)
    #[arg(long)]
    width: Option<u32>,

    /// Output height in pixels (defaults to the input height)
    #[arg(long)]
    height: Option<u32>,

    /// Overlay only alternating bands of this many rows (CPU backend only)
    #[arg(long, value_name = "ROWS")]
    bands: Option<u32>,

    /// Log filter in env_logger syntax; falls back to RUST_LOG
    #[arg(long, value_name = "FILTER")]
    log: Option<String>,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Backend {
    Cpu,
    Gpu,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Filter {
    Nearest,
    Linear,
}

impl From<Filter> for FilterMode {
    fn from(f: Filter) -> Self {
        match f {
            Filter::Nearest => FilterMode::Nearest,
            Filter::Linear => FilterMode::Linear,
        }
    }
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum, Debug)]
enum Address {
    Clamp,
    Repeat,
    Mirror,
}

impl From<Address> for AddressMode {
    fn from(a: Address) -> Self {
        match a {
            Address::Clamp => AddressMode::ClampToEdge,
            Address::Repeat => AddressMode::Repeat,
            Address::Mirror => AddressMode::MirrorRepeat,
        }
    }
}

impl Cli {
    fn sampler(&self) -> Sampler {
        Sampler::default()
            .with_filter(self.filter.into())
            .with_address_mode(self.address.into())
    }

    fn mask(&self) -> OverlayMask {
        match self.bands {
            Some(band_height) => OverlayMask::AlternateBands { band_height },
            None => OverlayMask::Full,
        }
    }

    fn validate(&self) -> Result<()> {
        anyhow::ensure!(
            !(self.backend == Backend::Gpu && self.bands.is_some()),
            "--bands is only supported by the cpu backend"
        );
        anyhow::ensure!(self.width != Some(0), "--width must be at least 1");
        anyhow::ensure!(self.height != Some(0), "--height must be at least 1");
        Ok(())
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let mut logging = LoggingConfig::default();
    logging.env_filter = cli.log.clone();
    init_logging(logging);

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    cli.validate()?;

    let img = image::open(&cli.input)
        .with_context(|| format!("could not open `{}`", cli.input.display()))?;
    let source = Texture2D::from_image(&img)
        .with_context(|| format!("`{}` has no pixels", cli.input.display()))?;

    let width = cli.width.unwrap_or(source.width());
    let height = cli.height.unwrap_or(source.height());
    let sampler = cli.sampler();

    log::info!(
        "{} ({}x{}) -> {width}x{height} on {:?}",
        cli.input.display(),
        source.width(),
        source.height(),
        cli.backend
    );

    let started = Instant::now();
    let out = match cli.backend {
        Backend::Cpu => {
            let config = RasterConfig { width, height, mask: cli.mask() };
            render_overlay(&ResourceBindings::new(&source, &sampler), &config)?
        }
        Backend::Gpu => {
            let gpu = Gpu::blocking(GpuInit::default()).context("GPU backend unavailable")?;
            let info = gpu.adapter_info();
            log::debug!(
                "adapter {} ({:?}, {:?}, driver {})",
                info.name,
                info.device_type,
                info.backend,
                info.driver
            );
            render_offscreen(&gpu, &source, &sampler, width, height)?
        }
    };
    log::info!("overlay rendered in {:.1?}", started.elapsed());

    out.to_rgba8()
        .save(&cli.output)
        .with_context(|| format!("could not write `{}`", cli.output.display()))?;
    log::info!("wrote {}", cli.output.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("vignoise").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn defaults_are_cpu_linear_clamp_full() {
        let cli = parse(&["in.png", "out.png"]);
        assert_eq!(cli.backend, Backend::Cpu);
        assert_eq!(cli.sampler(), Sampler::linear_clamp());
        assert_eq!(cli.mask(), OverlayMask::Full);
        assert!(cli.validate().is_ok());
    }

    #[test]
    fn sampler_flags_map_to_engine_types() {
        let cli = parse(&["in.png", "out.png", "--filter", "nearest", "--address", "mirror"]);
        let s = cli.sampler();
        assert_eq!(s.mag_filter, FilterMode::Nearest);
        assert_eq!(s.min_filter, FilterMode::Nearest);
        assert_eq!(s.address_mode_u, AddressMode::MirrorRepeat);
        assert_eq!(s.address_mode_v, AddressMode::MirrorRepeat);
    }

    #[test]
    fn bands_become_alternating_mask() {
        let cli = parse(&["in.png", "out.png", "--bands", "32"]);
        assert_eq!(cli.mask(), OverlayMask::AlternateBands { band_height: 32 });
    }

    #[test]
    fn gpu_with_bands_is_rejected() {
        let cli = parse(&["in.png", "out.png", "--backend", "gpu", "--bands", "4"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn zero_output_size_is_rejected() {
        let cli = parse(&["in.png", "out.png", "--width", "0"]);
        assert!(cli.validate().is_err());
    }

    #[test]
    fn cpu_run_writes_an_image() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("in.png");
        let output = dir.path().join("out.png");
        image::RgbaImage::from_pixel(5, 4, image::Rgba([255, 255, 255, 255]))
            .save(&input)
            .unwrap();

        let cli = parse(&[
            input.to_str().unwrap(),
            output.to_str().unwrap(),
            "--filter",
            "nearest",
            "--width",
            "3",
            "--height",
            "3",
        ]);
        run(&cli).unwrap();

        let written = image::open(&output).unwrap().to_rgba8();
        assert_eq!(written.dimensions(), (3, 3));
        let [r, g, b, a] = written.get_pixel(1, 1).0;
        assert!(r >= 127);
        assert_eq!(r, g);
        assert!(b <= r);
        assert_eq!(a, 255);
    }

    #[test]
    fn unreadable_input_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("missing.png");
        let output = dir.path().join("out.png");
        let cli = parse(&[input.to_str().unwrap(), output.to_str().unwrap()]);
        assert!(run(&cli).is_err());
        assert!(!output.exists());
    }
}
