use std::fs;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::rc::Rc;

use clap::Parser;
use glam::UVec2;
use tracing::{debug, error, info};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*};

use lupine_core::audio::NullAudioManager;
use lupine_core::config::{parse_canvas_size, RuntimeConfig};
use lupine_core::formats::scene::load_scene_file;
use lupine_core::render::{self, DrawRecorder};
use lupine_core::resources::{FsResourceManager, Services};
use lupine_core::{initialize_component_registry, registry, Scene};

#[derive(Parser, Debug)]
#[command(author, version, about = "Runs a Lupine scene headless and reports what it draws", long_about = None)]
struct Cli {
	#[arg(short, long, help = "Start without a project and log at debug level")]
	debug: bool,
	#[arg(long, value_name = "WxH", value_parser = parse_canvas_size, help = "Canvas size of the web runtime")]
	canvas_size: Option<UVec2>,
	#[arg(long, default_value_t = 60, help = "Number of frames to simulate")]
	frames: u32,
	#[arg(help = "A .lupine project file or a .scene file")]
	project_path: Option<PathBuf>,
}

fn main() -> ExitCode {
	let cli = Cli::parse();

	let level = if cli.debug { LevelFilter::DEBUG } else { LevelFilter::INFO };
	tracing_subscriber::registry().with(fmt::layer()).with(level).init();

	match run(cli) {
		Ok(()) => ExitCode::SUCCESS,
		Err(e) => {
			error!("{}", e);
			ExitCode::FAILURE
		}
	}
}

fn run(cli: Cli) -> Result<(), String> {
	initialize_component_registry().map_err(|e| e.to_string())?;
	debug!("{} component types registered", registry().component_types().count());

	let Some(project_path) = cli.project_path.clone() else {
		if cli.debug {
			info!("No project given, nothing to run");
			return Ok(());
		}
		return Err("No project path given (pass --debug to start without one)".to_owned());
	};

	let scene_path = main_scene(&project_path)?;
	let root = scene_path.parent().map(Path::to_path_buf).unwrap_or_default();
	let services = Services::new(Rc::new(FsResourceManager::new(root)), Rc::new(NullAudioManager));
	let config = RuntimeConfig {
		debug: cli.debug,
		canvas_size: cli.canvas_size,
		project_path: Some(project_path),
		..RuntimeConfig::default()
	};

	info!("Loading scene {}", scene_path.display());
	let mut scene = load_scene_file(&scene_path, services, config).map_err(|e| e.to_string())?;
	info!("Loaded scene {:?} with {} nodes", scene.name, scene.all_nodes().len());
	if let Some(tree) = scene.root() {
		debug!("\n{}", tree);
	}

	simulate(&mut scene, cli.frames);
	Ok(())
}

/// A `.lupine` project names its main scene relative to the project file.
fn main_scene(path: &Path) -> Result<PathBuf, String> {
	if path.extension().and_then(|e| e.to_str()) != Some("lupine") {
		return Ok(path.to_owned());
	}

	let text = fs::read_to_string(path).map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
	let project = json::parse(&text).map_err(|e| format!("Malformed project {}: {}", path.display(), e))?;
	let main = project["project"]["main_scene"]
		.as_str()
		.filter(|s| !s.is_empty())
		.ok_or_else(|| format!("Project {} has no main scene", path.display()))?;

	let main = main.strip_prefix("res://").unwrap_or(main);
	let dir = path.parent().unwrap_or(Path::new("."));
	Ok(dir.join(main))
}

fn simulate(scene: &mut Scene, frames: u32) {
	const DT: f32 = 1.0 / 60.0;

	scene.on_enter();
	let mut recorder = DrawRecorder::default();
	for frame in 0..frames {
		scene.on_update(DT);
		scene.on_physics_process(DT);

		recorder.clear();
		render::draw(&mut recorder, scene);
		debug!(
			"frame {}: {} quads, {} texts",
			frame,
			recorder.quads().count(),
			recorder.texts().count()
		);
	}

	info!(
		"Ran {} frames; last frame drew {} quads and {} texts",
		frames,
		recorder.quads().count(),
		recorder.texts().count()
	);
}
