use clap::*;

use livetrace::core::prelude::*;
use livetrace::displays::*;
use livetrace::engines::raytracer::RayTracer;

use log::*;
use std::env;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;
use std::thread::available_parallelism;
use std::time::Duration;

const SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(3600);
const PROGRESS_POLL: Duration = Duration::from_millis(50);

#[derive(Debug, Parser)]
#[clap(author, about, version, disable_help_flag = true)]
struct CommandOptions {
    /// Print this help text.
    #[arg(short, long, action = clap::ArgAction::HelpLong)]
    pub help: Option<bool>,

    /// Resolution and sampling preset.
    #[arg(short, long, value_enum, value_name = "preset")]
    pub quality: Option<Quality>,

    /// Load the render config from a JSON file. Other options override it.
    #[arg(short, long, value_name = "filename")]
    pub config: Option<PathBuf>,

    #[arg(long, value_name = "pixels")]
    pub width: Option<usize>,

    #[arg(long, value_name = "pixels")]
    pub height: Option<usize>,

    /// Samples per subpixel.
    #[arg(short = 's', long = "samples", value_name = "num")]
    pub samples: Option<usize>,

    /// Subpixels along each pixel edge.
    #[arg(long, value_name = "num")]
    pub subpixels: Option<usize>,

    /// Maximum number of rays followed per camera ray.
    #[arg(long = "max-iter", value_name = "num")]
    pub max_iter: Option<usize>,

    /// Output channel.
    #[arg(short, long, value_enum, value_name = "mode")]
    pub mode: Option<RenderMode>,

    /// Orbit angle of the eye around the scene, in degrees.
    #[arg(long, value_name = "degrees", allow_negative_numbers = true)]
    pub angle: Option<Float>,

    /// Height of the orbiting eye.
    #[arg(long = "height-y", value_name = "y", allow_negative_numbers = true)]
    pub height_y: Option<Float>,

    #[arg(long, value_name = "factor")]
    pub zoom: Option<Float>,

    #[arg(long = "focal-length", value_name = "distance")]
    pub focal_length: Option<Float>,

    /// Write the final image to the given filename.
    #[arg(short, long, value_name = "filename", default_value = DEFAULT_OUTPUT_PATH)]
    pub outfile: PathBuf,

    /// Also write every composited frame into this directory.
    #[arg(long = "frames-dir", value_name = "dir")]
    pub frames_dir: Option<PathBuf>,

    /// Display-server ex. localhost:14158
    #[arg(long = "display-server", value_name = "url")]
    pub display_server: Option<String>,

    /// Compositor interval in milliseconds.
    #[arg(long = "cadence-ms", value_name = "ms", default_value = "8")]
    pub cadence_ms: u64,

    /// Read commands from standard input instead of rendering once.
    #[arg(short, long, default_value = "false")]
    pub interactive: bool,

    /// Suppress all text output other than error messages.
    #[clap(long, default_value = "false")]
    pub quiet: bool,

    /// Log messages at or above this level (0 -> INFO,
    /// 1 -> WARNING, 2 -> ERROR, 3-> FATAL).
    #[arg(long, value_name = "num")]
    pub minloglevel: Option<i32>,

    /// Use specified number of threads for rendering.
    #[arg(short = 'j', long = "nthreads", value_name = "num")]
    pub nthreads: Option<usize>,
}

fn init_logger(opts: &CommandOptions) {
    if let Some(minloglevel) = opts.minloglevel {
        const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];
        let log_level = LOG_LEVELS[(minloglevel + 2).clamp(0, 4) as usize];
        env::set_var("RUST_LOG", log_level);
    } else {
        //default log level : warn
        let log_level = env::var("RUST_LOG").unwrap_or_else(|_| "warn".to_owned());
        env::set_var("RUST_LOG", log_level);
    }

    env_logger::Builder::from_default_env()
        .format_target(false)
        .format_module_path(false)
        .init();
}

fn init_threads(opts: &CommandOptions) {
    if let Some(n) = opts.nthreads {
        let n = usize::max(1, n);
        if let Err(e) = rayon::ThreadPoolBuilder::new()
            .num_threads(n)
            .build_global()
        {
            warn!("{}", e);
        }
    }
}

/// Eye placement on the orbit around the scene.
#[derive(Debug, Clone, Copy)]
struct Orbit {
    angle: Float,
    height: Float,
}

impl Orbit {
    fn position(&self) -> Point3f {
        CameraConfig::orbit(radians(self.angle), self.height, DEFAULT_ORBIT_RADIUS)
    }
}

fn build_config(opts: &CommandOptions) -> Result<(RenderConfig, Orbit), PreviewError> {
    let mut config = match opts.config.as_ref() {
        Some(path) => {
            let config = RenderConfig::from_json_file(path)?;
            match opts.quality {
                Some(q) => config.with_quality(q),
                None => config,
            }
        }
        None => RenderConfig::from_quality(opts.quality.unwrap_or_default()),
    };

    if opts.width.is_some() || opts.height.is_some() {
        config = config.with_resolution(
            opts.width.unwrap_or(config.horizontal_resolution),
            opts.height.unwrap_or(config.vertical_resolution),
        );
    }
    if let Some(samples) = opts.samples {
        config = config.with_samples(samples);
    }
    if let Some(subpixels) = opts.subpixels {
        config = config.with_subpixels(subpixels);
    }
    if let Some(max_iter) = opts.max_iter {
        config = config.with_max_iterations(max_iter);
    }
    if let Some(mode) = opts.mode {
        config = config.with_mode(mode);
    }

    let p = config.camera.position;
    let mut orbit = Orbit {
        angle: degrees(Float::atan2(p.x, p.z)),
        height: p.y,
    };
    if opts.angle.is_some() || opts.height_y.is_some() {
        orbit.angle = opts.angle.unwrap_or(orbit.angle);
        orbit.height = opts.height_y.unwrap_or(orbit.height);
        config = config.with_position(orbit.position());
    }
    if let Some(zoom) = opts.zoom {
        config = config.with_zoom(zoom);
    }
    if let Some(focal_length) = opts.focal_length {
        config = config.with_focal_length(focal_length);
    }
    config.validate()?;
    Ok((config, orbit))
}

fn build_options(opts: &CommandOptions) -> PreviewOptions {
    PreviewOptions {
        output_path: opts.outfile.clone(),
        frames_dir: opts.frames_dir.clone(),
        display_server: opts.display_server.clone(),
        quiet: opts.quiet,
        ..PreviewOptions::new()
    }
    .with_cadence_ms(opts.cadence_ms)
}

fn create_sinks(
    options: &PreviewOptions,
    latest: &Arc<LatestImage>,
) -> Result<Arc<dyn DisplaySink>, PreviewError> {
    let mut displays = MultipleDisplay::new();
    let latest: Arc<dyn DisplaySink> = latest.clone();
    displays.add_display(&latest);
    if let Some(dir) = options.frames_dir.as_ref() {
        let sequential: Arc<dyn DisplaySink> = Arc::new(SequentialDisplay::new(dir)?);
        displays.add_display(&sequential);
    }
    if let Some(hostname) = options.display_server.as_ref() {
        match TevDisplay::connect(hostname, "livetrace") {
            Ok(tev) => {
                let tev: Arc<dyn DisplaySink> = Arc::new(tev);
                displays.add_display(&tev);
            }
            Err(e) => {
                warn!("{}", e);
            }
        }
    }
    Ok(Arc::new(displays))
}

/// Writes whatever image the display sinks last received.
fn save_latest(latest: &LatestImage, path: &Path) -> Result<(), PreviewError> {
    let image = latest
        .latest()
        .ok_or_else(|| PreviewError::error("nothing rendered yet"))?;
    write_image(path, &image)
}

struct Session {
    coordinator: RequestCoordinator,
    latest: Arc<LatestImage>,
    options: PreviewOptions,
    config: RenderConfig,
    orbit: Orbit,
}

impl Session {
    fn request(&mut self, config: RenderConfig) -> Result<RequestOutcome, PreviewError> {
        let outcome = self.coordinator.request_render(config)?;
        self.config = config;
        Ok(outcome)
    }

    fn render_once(&mut self) -> Result<(), PreviewError> {
        self.request(self.config)?;
        let mut reporter = if self.options.quiet {
            ProgressReporter::hidden()
        } else {
            ProgressReporter::new("Rendering")
        };
        let progress = self.coordinator.progress();
        while !self.coordinator.wait_idle(PROGRESS_POLL) {
            reporter.update(progress.get());
        }
        reporter.done();
        match self.coordinator.last_outcome() {
            Some(Ok(stats)) => {
                if !self.options.quiet {
                    println!(
                        "rendered {} pixel samples in {:.3}s",
                        stats.pixel_samples,
                        stats.elapsed.as_secs_f64()
                    );
                }
            }
            Some(Err(e)) => return Err(e),
            None => {}
        }
        save_final_image(
            &self.coordinator,
            self.latest.as_ref(),
            &self.options.output_path,
        )?;
        Ok(())
    }

    fn print_status(&self) {
        let snapshot = self.coordinator.snapshot();
        println!(
            "state: {}  generation: {}  completed: {}  progress: {:.1}%",
            snapshot.state,
            snapshot.generation,
            snapshot.completed,
            self.coordinator.progress().get() * 100.0
        );
        if let Some(pending) = self.coordinator.pending_config() {
            println!(
                "pending: {}x{} {}",
                pending.horizontal_resolution, pending.vertical_resolution, pending.mode
            );
        }
        match self.coordinator.last_outcome() {
            Some(Ok(stats)) => println!("last render: ok in {:?}", stats.elapsed),
            Some(Err(e)) => println!("last render: {}", e),
            None => {}
        }
        println!("frames published: {}", self.latest.publications());
    }

    /// Returns false when the session should end.
    fn execute(&mut self, line: &str) -> Result<bool, PreviewError> {
        let mut words = line.split_whitespace();
        let command = match words.next() {
            Some(c) => c,
            None => return Ok(true),
        };
        let arg = words.next();
        let config = self.config;
        let next = match command {
            "quit" | "exit" => return Ok(false),
            "help" => {
                println!("commands: render, angle <deg>, height <y>, zoom <f>, mode <name>,");
                println!("          samples <n>, quality <low|medium|high>, status, save [path], quit");
                return Ok(true);
            }
            "status" => {
                self.print_status();
                return Ok(true);
            }
            "save" => {
                let path = arg
                    .map(PathBuf::from)
                    .unwrap_or_else(|| self.options.output_path.clone());
                save_latest(&self.latest, &path)?;
                return Ok(true);
            }
            "render" => config,
            "angle" => {
                self.orbit.angle = parse_arg(command, arg)?;
                config.with_position(self.orbit.position())
            }
            "height" => {
                self.orbit.height = parse_arg(command, arg)?;
                config.with_position(self.orbit.position())
            }
            "zoom" => config.with_zoom(parse_arg(command, arg)?),
            "samples" => config.with_samples(parse_arg(command, arg)?),
            "mode" => config.with_mode(parse_arg(command, arg)?),
            "quality" => {
                let name = arg.ok_or_else(|| missing_arg(command))?;
                let quality = <Quality as ValueEnum>::from_str(name, true)
                    .map_err(|e| PreviewError::config(&e))?;
                config.with_quality(quality)
            }
            _ => {
                let msg = format!("unknown command \"{}\" (try help)", command);
                return Err(PreviewError::config(&msg));
            }
        };
        let outcome = self.request(next)?;
        println!("{:?}", outcome);
        Ok(true)
    }

    fn interactive(&mut self) -> Result<(), PreviewError> {
        let sink: Arc<dyn DisplaySink> = self.latest.clone();
        let saver = IdleSaver::spawn(
            self.coordinator.clone(),
            sink,
            self.options.output_path.clone(),
        )?;
        let result = self.command_loop();
        // Let the last render finish so its image is saved too.
        if !self.coordinator.wait_idle(SHUTDOWN_TIMEOUT) {
            warn!("render still running, final image not saved");
        }
        saver.stop();
        result
    }

    fn command_loop(&mut self) -> Result<(), PreviewError> {
        self.request(self.config)?;
        let stdin = io::stdin();
        let mut lines = stdin.lock().lines();
        loop {
            print!("> ");
            io::stdout().flush()?;
            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            match self.execute(line.trim()) {
                Ok(true) => {}
                Ok(false) => break,
                Err(e) => println!("{}", e),
            }
        }
        Ok(())
    }
}

fn missing_arg(command: &str) -> PreviewError {
    let msg = format!("{} needs an argument", command);
    PreviewError::config(&msg)
}

fn parse_arg<T: std::str::FromStr>(command: &str, arg: Option<&str>) -> Result<T, PreviewError> {
    let arg = arg.ok_or_else(|| missing_arg(command))?;
    arg.parse::<T>().map_err(|_| {
        let msg = format!("invalid argument \"{}\" for {}", arg, command);
        PreviewError::config(&msg)
    })
}

fn run(opts: &CommandOptions) -> Result<(), PreviewError> {
    let (config, orbit) = build_config(opts)?;
    let options = build_options(opts);

    if !opts.quiet {
        let nthreads = available_parallelism().map(|n| n.get()).unwrap_or(1);
        let version = env!("CARGO_PKG_VERSION");
        println!("livetrace version {} [Detected {} cores]", version, nthreads);
        println!();
    }

    let engine: Arc<dyn RenderEngine> = Arc::new(RayTracer::new());
    let coordinator = RequestCoordinator::new(engine);
    let latest = Arc::new(LatestImage::new());
    let sinks = create_sinks(&options, &latest)?;
    let compositor = Compositor::spawn(coordinator.clone(), sinks, options.cadence)?;

    let mut session = Session {
        coordinator: coordinator.clone(),
        latest,
        options,
        config,
        orbit,
    };
    let result = if opts.interactive {
        session.interactive()
    } else {
        session.render_once()
    };

    coordinator.shutdown(SHUTDOWN_TIMEOUT)?;
    compositor.stop();
    result
}

pub fn main() {
    let opts = CommandOptions::parse();
    init_logger(&opts);
    init_threads(&opts);
    if let Err(e) = run(&opts) {
        error!("{}", e);
        process::exit(-1);
    }
}
