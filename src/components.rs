//! Built-in component catalog.

mod animated_sprite;
mod animator;
mod audio_source;
mod camera;
mod label;
mod nine_patch;
mod panel;
mod placeholder;
mod progress_bar;
mod sprite;
mod state_animator;
mod texture_rect;
mod tilemap;

use glam::{Mat4, UVec2, Vec2, Vec4};

use crate::component::DrawCtx;
use crate::math::rect::Rect;
use crate::math::transform::Transform2D;
use crate::node::NodeUuid;
use crate::render::{DrawSpace, Quad, Renderer};
use crate::scene::tree::NodeTree;

pub use animated_sprite::{AnimatedSprite2D, SpriteAnimationState};
pub use animator::Animator;
pub use audio_source::AudioSource;
pub use camera::{Camera2D, CameraBounds};
pub use label::Label;
pub use nine_patch::NinePatchPanel;
pub use panel::{ColorRectangle, Panel};
pub use placeholder::PlaceholderComponent;
pub use progress_bar::{FillDirection, ProgressBar, UnknownFillDirectionError};
pub use sprite::Sprite2D;
pub use state_animator::StateAnimator;
pub use texture_rect::{StretchMode, TextureRectangle, UnknownStretchModeError};
pub use tilemap::{MapSizeError, TileGrid, Tilemap2D, EMPTY_TILE, MAX_MAP_CELLS};

/// World matrix of a node's Node2D chain, lifted to 3D.
fn world_matrix(tree: &NodeTree, owner: NodeUuid) -> Mat4 {
	Transform2D::from_mat3(tree.global_matrix_2d(owner)).to_mat4()
}

/// Rectangle of the Control a UI component sits on, and the space it draws in.
fn control_area(ctx: &DrawCtx) -> Option<(Rect, DrawSpace)> {
	let node = ctx.tree.get_node(ctx.owner)?;
	let control = node.as_control()?;
	let rect = ctx
		.tree
		.control_global_rect(ctx.owner, ctx.config.effective_screen_size())?;
	let space = if control.world_space {
		DrawSpace::World
	} else {
		DrawSpace::Screen
	};
	Some((rect, space))
}

/// Texture path to hand the renderer and its pixel size, both `None` when unresolved.
fn resolve_texture(ctx: &DrawCtx, path: &str) -> (Option<String>, Option<UVec2>) {
	if path.is_empty() {
		return (None, None);
	}
	match ctx.services.resources.texture(path) {
		Some(info) => (Some(path.to_owned()), Some(info.size)),
		None => (None, None),
	}
}

/// Four quads lining the inside of `rect`: top, bottom, left, right.
fn draw_border(renderer: &mut dyn Renderer, rect: Rect, width: f32, color: Vec4, space: DrawSpace) {
	let width = width.min(rect.size.x * 0.5).min(rect.size.y * 0.5);
	if width <= 0.0 {
		return;
	}
	let inner_h = rect.size.y - 2.0 * width;
	let edges = [
		Rect::new(rect.position, Vec2::new(rect.size.x, width)),
		Rect::new(rect.position + Vec2::new(0.0, rect.size.y - width), Vec2::new(rect.size.x, width)),
		Rect::new(rect.position + Vec2::new(0.0, width), Vec2::new(width, inner_h)),
		Rect::new(rect.position + Vec2::new(rect.size.x - width, width), Vec2::new(width, inner_h)),
	];
	for edge in edges {
		renderer.draw_quad(&Quad::rect(edge, color, space));
	}
}

#[cfg(test)]
pub(crate) mod testing {
	use std::rc::Rc;

	use crate::audio::NullAudioManager;
	use crate::component::{Component, DrawCtx, NodeCtx};
	use crate::config::RuntimeConfig;
	use crate::node::{Node, NodeUuid};
	use crate::render::DrawRecorder;
	use crate::resources::{MemoryResourceManager, Services};
	use crate::scene::tree::NodeTree;

	pub fn services(resources: MemoryResourceManager) -> Services {
		Services::new(Rc::new(resources), Rc::new(NullAudioManager))
	}

	/// Screen of 800x600.
	pub fn config() -> RuntimeConfig {
		RuntimeConfig {
			screen_size: glam::vec2(800.0, 600.0),
			..RuntimeConfig::default()
		}
	}

	/// Records what `component` draws when it sits on `owner` of `tree`.
	pub fn record(tree: &NodeTree, owner: NodeUuid, component: &dyn Component, services: &Services) -> DrawRecorder {
		let config = config();
		let ctx = DrawCtx {
			tree,
			owner,
			services,
			config: &config,
		};
		let mut rec = DrawRecorder::default();
		component.draw(&ctx, &mut rec);
		rec
	}

	/// Runs `on_ready` then one `on_update` of `dt`, the way the scene sweep does.
	pub fn run(tree: &mut NodeTree, owner: NodeUuid, component: &mut dyn Component, services: &Services, dt: f32) {
		let config = config();
		let mut ctx = NodeCtx {
			tree,
			owner,
			services,
			config: &config,
		};
		if !component.base().ready {
			component.base_mut().ready = true;
			component.on_ready(&mut ctx);
		}
		component.update_from_export_variables();
		component.on_update(&mut ctx, dt);
	}

	pub fn single_node(node: Node) -> (NodeTree, NodeUuid) {
		let tree = NodeTree::new(node);
		let root = tree.root_uuid();
		(tree, root)
	}
}
