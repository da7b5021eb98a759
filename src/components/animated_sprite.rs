use glam::{vec3, IVec2, Mat4, Quat, UVec2, Vec2, Vec4};
use tracing::{debug, error, warn};

use crate::animation::sprite::SpriteAnimationResource;
use crate::animation::PlaybackState;
use crate::component::{impl_component_base, Component, ComponentBase, DrawCtx, NodeCtx};
use crate::formats::sprite_anim::parse_sprite_animation;
use crate::render::{DrawSpace, Quad, Renderer, FULL_UV};
use crate::resources::Services;
use crate::value::{ExportType, PropertyValue};

use super::resolve_texture;

/// Frame time of sheets played without a `.spriteanim` resource.
const SHEET_FRAME_DURATION: f32 = 0.1;

/// Name of the single animation of a sheet played without a resource.
const SHEET_ANIMATION: &str = "default";

/// Playback position of an [`AnimatedSprite2D`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpriteAnimationState {
	pub animation: String,
	pub frame: i32,
	/// Time spent on the current frame.
	pub frame_time: f32,
	pub playback: PlaybackState,
}

/// Sprite cycling through frames, either of a `.spriteanim` resource or of a plain sheet
/// laid out in a grid.
#[derive(Debug)]
pub struct AnimatedSprite2D {
	base: ComponentBase,
	pub sprite_animation_resource: String,
	pub texture_path: String,
	/// Pixel size of one sheet cell.
	pub sprite_size: IVec2,
	pub frame_count: i32,
	pub frames_per_row: i32,
	pub auto_play: bool,
	pub default_animation: String,
	pub speed_scale: f32,
	pub color: Vec4,
	pub modulate: Vec4,
	pub size: Vec2,
	pub flip_h: bool,
	pub flip_v: bool,
	pub centered: bool,
	pub offset: Vec2,

	resource: Option<SpriteAnimationResource>,
	/// Path `resource` was read from.
	loaded_path: String,
	state: SpriteAnimationState,
}

impl Default for AnimatedSprite2D {
	fn default() -> Self {
		let mut sprite = Self {
			base: ComponentBase::new("AnimatedSprite2D"),
			sprite_animation_resource: String::new(),
			texture_path: String::new(),
			sprite_size: IVec2::splat(32),
			frame_count: 1,
			frames_per_row: 1,
			auto_play: true,
			default_animation: String::new(),
			speed_scale: 1.0,
			color: Vec4::ONE,
			modulate: Vec4::ONE,
			size: Vec2::splat(100.0),
			flip_h: false,
			flip_v: false,
			centered: true,
			offset: Vec2::ZERO,
			resource: None,
			loaded_path: String::new(),
			state: SpriteAnimationState::default(),
		};
		sprite.register_exports();
		sprite
	}
}

impl AnimatedSprite2D {
	fn register_exports(&mut self) {
		self.base
			.exports
			.add(
				"sprite_animation_resource",
				PropertyValue::FilePath(String::new()),
				"Path to .spriteanim resource file",
				ExportType::FilePath,
			)
			.add("texture_path", PropertyValue::FilePath(String::new()), "Direct sprite sheet texture path", ExportType::FilePath)
			.add("sprite_size", self.sprite_size.as_vec2(), "Size of each sprite frame in pixels", ExportType::Vec2)
			.add("frame_count", self.frame_count, "Total number of frames in sprite sheet", ExportType::Int)
			.add("frames_per_row", self.frames_per_row, "Number of frames per row in sprite sheet", ExportType::Int)
			.add("auto_play", self.auto_play, "Automatically play animation on ready", ExportType::Bool)
			.add("default_animation", "", "Default animation to play", ExportType::String)
			.add("speed_scale", self.speed_scale, "Animation speed multiplier", ExportType::Float)
			.add("color", PropertyValue::Color(self.color), "Sprite color tint", ExportType::Color)
			.add("modulate", PropertyValue::Color(self.modulate), "Sprite color modulation", ExportType::Color)
			.add("size", self.size, "Sprite size for rendering", ExportType::Vec2)
			.add("flip_h", self.flip_h, "Flip sprite horizontally", ExportType::Bool)
			.add("flip_v", self.flip_v, "Flip sprite vertically", ExportType::Bool)
			.add("centered", self.centered, "Center sprite on node position", ExportType::Bool)
			.add("offset", self.offset, "Sprite offset from node position", ExportType::Vec2);
	}

	pub fn set_sprite_animation_resource(&mut self, path: &str) {
		self.sprite_animation_resource = path.to_owned();
		self.base
			.sync("sprite_animation_resource", PropertyValue::FilePath(path.to_owned()));
	}

	pub fn set_texture_path(&mut self, path: &str) {
		self.texture_path = path.to_owned();
		self.base.sync("texture_path", PropertyValue::FilePath(path.to_owned()));
	}

	/// Plays a grid sheet without a resource.
	pub fn set_sheet(&mut self, sprite_size: IVec2, frame_count: i32, frames_per_row: i32) {
		self.sprite_size = sprite_size;
		self.frame_count = frame_count;
		self.frames_per_row = frames_per_row;
		self.base.sync("sprite_size", sprite_size.as_vec2());
		self.base.sync("frame_count", frame_count);
		self.base.sync("frames_per_row", frames_per_row);
	}

	pub fn set_speed_scale(&mut self, speed_scale: f32) {
		self.speed_scale = speed_scale;
		self.base.sync("speed_scale", speed_scale);
	}

	pub fn set_auto_play(&mut self, auto_play: bool, default_animation: &str) {
		self.auto_play = auto_play;
		self.default_animation = default_animation.to_owned();
		self.base.sync("auto_play", auto_play);
		self.base.sync("default_animation", default_animation);
	}

	/// Installs an already parsed resource, bypassing the resource manager.
	pub fn set_resource(&mut self, resource: Option<SpriteAnimationResource>) {
		self.resource = resource;
		self.loaded_path = self.sprite_animation_resource.clone();
		self.state = SpriteAnimationState::default();
	}

	pub fn resource(&self) -> Option<&SpriteAnimationResource> {
		self.resource.as_ref()
	}

	fn uses_resource(&self) -> bool {
		!self.sprite_animation_resource.is_empty() || self.resource.is_some()
	}

	fn uses_sheet(&self) -> bool {
		!self.texture_path.is_empty() && self.frame_count > 0
	}

	/// Re-reads the `.spriteanim` file when its path changed.
	fn refresh_resource(&mut self, services: &Services) {
		if self.sprite_animation_resource == self.loaded_path {
			return;
		}
		self.loaded_path = self.sprite_animation_resource.clone();
		self.state = SpriteAnimationState::default();
		self.resource = None;
		if self.loaded_path.is_empty() {
			return;
		}

		let parsed = services
			.resources
			.read_text(&self.loaded_path)
			.map_err(|e| e.to_string())
			.and_then(|text| parse_sprite_animation(&text).map_err(|e| e.to_string()));
		match parsed {
			Ok(res) => {
				debug!("Loaded sprite animation {:?}", self.loaded_path);
				self.resource = Some(res);
			}
			Err(e) => error!("Cannot load sprite animation {:?}: {}", self.loaded_path, e),
		}
	}

	/// Starts an animation from its first frame.
	///
	/// An empty name picks the default animation, then the first one. Sheets without a
	/// resource always play their single animation.
	pub fn play(&mut self, animation: &str) -> bool {
		let name = if self.uses_resource() {
			let Some(res) = &self.resource else {
				warn!("No sprite animation resource loaded");
				return false;
			};
			let name = match animation {
				"" if !self.default_animation.is_empty() => self.default_animation.clone(),
				"" if !res.default_animation.is_empty() => res.default_animation.clone(),
				"" => match res.animation_names().next() {
					Some(first) => first.to_owned(),
					None => {
						warn!("Sprite animation resource has no animations");
						return false;
					}
				},
				name => name.to_owned(),
			};
			if res.animation(&name).is_none() {
				warn!("Sprite animation {:?} not found", name);
				return false;
			}
			name
		} else if self.uses_sheet() {
			SHEET_ANIMATION.to_owned()
		} else {
			warn!("No sprite animation resource or texture configured");
			return false;
		};

		self.state = SpriteAnimationState {
			animation: name,
			frame: 0,
			frame_time: 0.0,
			playback: PlaybackState::Playing,
		};
		true
	}

	pub fn stop(&mut self) {
		self.state.playback = PlaybackState::Stopped;
		self.state.frame = 0;
		self.state.frame_time = 0.0;
	}

	pub fn pause(&mut self) {
		if self.state.playback == PlaybackState::Playing {
			self.state.playback = PlaybackState::Paused;
		}
	}

	pub fn resume(&mut self) {
		if self.state.playback == PlaybackState::Paused {
			self.state.playback = PlaybackState::Playing;
		}
	}

	pub fn is_playing(&self) -> bool {
		self.state.playback == PlaybackState::Playing
	}

	pub fn state(&self) -> &SpriteAnimationState {
		&self.state
	}

	pub fn current_animation(&self) -> &str {
		&self.state.animation
	}

	pub fn current_frame(&self) -> i32 {
		self.state.frame
	}

	/// Number of frames of the current animation.
	pub fn frame_total(&self) -> i32 {
		if self.uses_resource() {
			self.resource
				.as_ref()
				.and_then(|res| res.animation(&self.state.animation))
				.map(|anim| anim.frames.len() as i32)
				.unwrap_or(0)
		} else if self.uses_sheet() {
			self.frame_count
		} else {
			0
		}
	}

	/// Jumps to a frame, clamped to the current animation, and restarts its timer.
	pub fn set_frame(&mut self, frame: i32) {
		let total = self.frame_total();
		if total > 0 {
			self.state.frame = frame.clamp(0, total - 1);
		}
		self.state.frame_time = 0.0;
	}

	pub fn available_animations(&self) -> Vec<&str> {
		match &self.resource {
			Some(res) if self.uses_resource() => res.animation_names().collect(),
			_ => vec![SHEET_ANIMATION],
		}
	}

	/// Advances the frame timer of a playing animation.
	///
	/// At most one frame is stepped per call. Non-looping animations stop on their last
	/// frame; sheets always loop.
	pub fn advance(&mut self, dt: f32) {
		if self.state.playback != PlaybackState::Playing {
			return;
		}

		let (duration, looping) = if self.uses_resource() {
			let Some(anim) = self.resource.as_ref().and_then(|r| r.animation(&self.state.animation)) else {
				return;
			};
			if anim.frames.is_empty() {
				return;
			}
			if !(0..anim.frames.len() as i32).contains(&self.state.frame) {
				self.state.frame = 0;
			}
			self.state.frame_time += dt * self.speed_scale * anim.speed_scale;
			(anim.frames[self.state.frame as usize].duration, anim.looping)
		} else if self.uses_sheet() {
			self.state.frame_time += dt * self.speed_scale;
			(SHEET_FRAME_DURATION, true)
		} else {
			return;
		};

		if self.state.frame_time >= duration {
			self.state.frame_time = 0.0;
			let total = self.frame_total();
			self.state.frame += 1;
			if self.state.frame >= total {
				if looping {
					self.state.frame = 0;
				} else {
					self.state.frame = total - 1;
					self.state.playback = PlaybackState::Stopped;
				}
			}
		}
	}

	/// Normalized region of the current frame. Sheet cells are measured against the
	/// texture when its size is known, against the grid otherwise.
	pub fn frame_region(&self, texture_size: Option<UVec2>) -> Vec4 {
		if self.uses_resource() {
			return self
				.resource
				.as_ref()
				.and_then(|res| res.animation(&self.state.animation))
				.and_then(|anim| anim.frames.get(usize::try_from(self.state.frame).ok()?))
				.map(|frame| frame.texture_region)
				.unwrap_or(FULL_UV);
		}
		if !self.uses_sheet() || self.frames_per_row <= 0 || self.sprite_size.cmple(IVec2::ZERO).any() {
			return FULL_UV;
		}

		let frame = self.state.frame.max(0);
		let cell = IVec2::new(frame % self.frames_per_row, frame / self.frames_per_row);
		let sheet = match texture_size {
			Some(size) if size.x > 0 && size.y > 0 => size.as_vec2(),
			_ => Vec2::new(
				(self.frames_per_row * self.sprite_size.x) as f32,
				((self.frame_count / self.frames_per_row + 1) * self.sprite_size.y) as f32,
			),
		};
		let pos = (cell * self.sprite_size).as_vec2() / sheet;
		let size = self.sprite_size.as_vec2() / sheet;
		Vec4::new(pos.x, pos.y, size.x, size.y)
	}

	fn sheet_texture(&self) -> &str {
		match &self.resource {
			Some(res) if self.uses_resource() => &res.texture_path,
			_ => &self.texture_path,
		}
	}
}

impl Component for AnimatedSprite2D {
	impl_component_base!();

	fn type_name(&self) -> &str {
		"AnimatedSprite2D"
	}

	fn category(&self) -> &str {
		"2D"
	}

	fn update_from_export_variables(&mut self) {
		let e = &self.base.exports;
		self.sprite_animation_resource =
			e.get_or("sprite_animation_resource", std::mem::take(&mut self.sprite_animation_resource));
		self.texture_path = e.get_or("texture_path", std::mem::take(&mut self.texture_path));
		self.sprite_size = e.get_or("sprite_size", self.sprite_size.as_vec2()).as_ivec2();
		self.frame_count = e.get_or("frame_count", self.frame_count);
		self.frames_per_row = e.get_or("frames_per_row", self.frames_per_row);
		self.auto_play = e.get_or("auto_play", self.auto_play);
		self.default_animation = e.get_or("default_animation", std::mem::take(&mut self.default_animation));
		self.speed_scale = e.get_or("speed_scale", self.speed_scale);
		self.color = e.get_or("color", self.color);
		self.modulate = e.get_or("modulate", self.modulate);
		self.size = e.get_or("size", self.size);
		self.flip_h = e.get_or("flip_h", self.flip_h);
		self.flip_v = e.get_or("flip_v", self.flip_v);
		self.centered = e.get_or("centered", self.centered);
		self.offset = e.get_or("offset", self.offset);
	}

	fn on_ready(&mut self, ctx: &mut NodeCtx) {
		self.update_from_export_variables();
		self.refresh_resource(ctx.services);
		if self.auto_play {
			let default = self.default_animation.clone();
			self.play(&default);
		}
	}

	fn on_update(&mut self, ctx: &mut NodeCtx, dt: f32) {
		self.refresh_resource(ctx.services);
		self.advance(dt);
	}

	fn draw(&self, ctx: &DrawCtx, renderer: &mut dyn Renderer) {
		let color = self.color * self.modulate;
		if self.size.cmple(Vec2::ZERO).any() || color.w <= 0.0 {
			return;
		}

		let (texture, texture_size) = resolve_texture(ctx, self.sheet_texture());
		let global = ctx.tree.global_transform_2d(ctx.owner);
		let mut transform = Mat4::from_scale_rotation_translation(
			(global.scale * self.size).extend(1.0),
			Quat::from_rotation_z(global.rotation),
			(global.translation + self.offset).extend(0.0),
		);
		if !self.centered {
			transform *= Mat4::from_translation(vec3(0.5, 0.5, 0.0));
		}

		renderer.draw_quad(&Quad {
			transform,
			color,
			texture,
			uv: self.frame_region(texture_size),
			flip_h: self.flip_h,
			flip_v: self.flip_v,
			space: DrawSpace::World,
		});
	}
}
