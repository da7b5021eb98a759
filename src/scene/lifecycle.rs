use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::error;

use crate::component::{ComponentUuid, InputEvent, NodeCtx};
use crate::config::RuntimeConfig;
use crate::node::NodeUuid;
use crate::resources::Services;

use super::tree::NodeTree;

#[derive(Debug, Clone, Copy)]
enum Phase<'e> {
	Ready,
	Update(f32),
	Physics(f32),
	Input(&'e InputEvent),
}

impl Phase<'_> {
	fn name(&self) -> &'static str {
		match self {
			Phase::Ready => "on_ready",
			Phase::Update(_) => "on_update",
			Phase::Physics(_) => "on_physics_process",
			Phase::Input(_) => "on_input",
		}
	}
}

/// Per-frame sweeps. Components of a node run before its children, both in insertion order.
/// A node that is inactive skips itself and its subtree. An invisible subtree skips updates
/// but still gets `on_ready` for components added to it.
impl NodeTree {
	/// Runs `on_ready` on every component that has not seen it yet.
	pub fn propagate_ready(&mut self, services: &Services, config: &RuntimeConfig) {
		let root = self.root_uuid();
		visit(self, root, Phase::Ready, services, config);
	}

	pub fn propagate_update(&mut self, services: &Services, config: &RuntimeConfig, dt: f32) {
		let root = self.root_uuid();
		visit(self, root, Phase::Update(dt), services, config);
	}

	pub fn propagate_physics(&mut self, services: &Services, config: &RuntimeConfig, dt: f32) {
		let root = self.root_uuid();
		visit(self, root, Phase::Physics(dt), services, config);
	}

	pub fn propagate_input(&mut self, services: &Services, config: &RuntimeConfig, event: &InputEvent) {
		let root = self.root_uuid();
		visit(self, root, Phase::Input(event), services, config);
	}
}

fn visit(tree: &mut NodeTree, uuid: NodeUuid, phase: Phase, services: &Services, config: &RuntimeConfig) {
	let Some(node) = tree.get_node(uuid) else {
		return;
	};
	if !node.active {
		return;
	}
	if matches!(phase, Phase::Update(_)) && !node.visible {
		visit(tree, uuid, Phase::Ready, services, config);
		return;
	}

	let components: Vec<ComponentUuid> = node.components().iter().map(|c| c.uuid()).collect();
	for component in components {
		run_component(tree, uuid, component, phase, services, config);
	}

	for child in tree.children_uuids(uuid) {
		visit(tree, child, phase, services, config);
	}
}

/// Takes the component out of its node for the call, so it can borrow the whole tree, then
/// puts it back at the same index.
fn run_component(
	tree: &mut NodeTree,
	owner: NodeUuid,
	uuid: ComponentUuid,
	phase: Phase,
	services: &Services,
	config: &RuntimeConfig,
) {
	let Some(node) = tree.get_node_mut(owner) else {
		return;
	};
	let Some(index) = node.component_index(uuid) else {
		return;
	};
	if !node.components[index].is_active() {
		return;
	}
	let mut component = node.components.remove(index);

	let res = catch_unwind(AssertUnwindSafe(|| {
		let mut ctx = NodeCtx {
			tree: &mut *tree,
			owner,
			services,
			config,
		};

		if !component.base().ready {
			component.base_mut().ready = true;
			component.on_ready(&mut ctx);
		}

		match phase {
			Phase::Ready => {}
			Phase::Update(dt) => {
				component.update_from_export_variables();
				component.on_update(&mut ctx, dt);
			}
			Phase::Physics(dt) => component.on_physics_process(&mut ctx, dt),
			Phase::Input(event) => component.on_input(&mut ctx, event),
		}
	}));

	if res.is_err() {
		error!(
			"{} component {:?} panicked in {}",
			component.type_name(),
			component.name(),
			phase.name()
		);
	}

	match tree.get_node_mut(owner) {
		Some(node) => {
			let index = index.min(node.components.len());
			node.components.insert(index, component);
		}
		None => {
			// the owner was removed while the callback ran
			let _ = catch_unwind(AssertUnwindSafe(|| component.on_destroy()));
			component.base_mut().owner = None;
		}
	}
}

#[cfg(test)]
mod tests {
	use std::cell::RefCell;
	use std::rc::Rc;

	use super::*;
	use crate::component::testing::Probe;
	use crate::node::Node;

	fn ctx() -> (Services, RuntimeConfig) {
		(Services::default(), RuntimeConfig::default())
	}

	#[test]
	fn components_before_children_in_order() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (services, config) = ctx();

		let mut tree = NodeTree::new(Node::new("Root"));
		let root = tree.root_uuid();
		tree.root_mut().add_component(Box::new(Probe::new("r1", &log)));
		tree.root_mut().add_component(Box::new(Probe::new("r2", &log)));
		let a = tree.add_node(root, Node::new("A")).unwrap();
		tree.get_node_mut(a).unwrap().add_component(Box::new(Probe::new("a", &log)));
		let b = tree.add_node(root, Node::new("B")).unwrap();
		tree.get_node_mut(b).unwrap().add_component(Box::new(Probe::new("b", &log)));
		log.borrow_mut().clear();

		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(
			*log.borrow(),
			["r1:ready", "r1:update", "r2:ready", "r2:update", "a:ready", "a:update", "b:ready", "b:update"]
		);

		log.borrow_mut().clear();
		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(*log.borrow(), ["r1:update", "r2:update", "a:update", "b:update"]);
	}

	#[test]
	fn inactive_and_invisible_subtrees() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (services, config) = ctx();

		let mut tree = NodeTree::new(Node::new("Root"));
		let root = tree.root_uuid();
		let hidden = tree.add_node(root, Node::new("Hidden")).unwrap();
		let below = tree.add_node(hidden, Node::new("Below")).unwrap();
		tree.get_node_mut(below).unwrap().add_component(Box::new(Probe::new("below", &log)));
		tree.get_node_mut(hidden).unwrap().visible = false;
		log.borrow_mut().clear();

		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(*log.borrow(), ["below:ready"]);

		log.borrow_mut().clear();
		tree.propagate_update(&services, &config, 0.016);
		assert!(log.borrow().is_empty());

		tree.propagate_physics(&services, &config, 0.02);
		assert_eq!(*log.borrow(), ["below:physics"]);

		log.borrow_mut().clear();
		tree.get_node_mut(hidden).unwrap().active = false;
		tree.propagate_physics(&services, &config, 0.02);
		assert!(log.borrow().is_empty());
	}

	#[test]
	fn component_added_under_hidden_node_gets_ready() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (services, config) = ctx();

		let mut tree = NodeTree::new(Node::new("Root"));
		let root = tree.root_uuid();
		let hidden = tree.add_node(root, Node::new("Hidden")).unwrap();
		tree.get_node_mut(hidden).unwrap().visible = false;
		tree.propagate_update(&services, &config, 0.016);

		let late = tree.add_node(hidden, Node::new("Late")).unwrap();
		tree.get_node_mut(late).unwrap().add_component(Box::new(Probe::new("late", &log)));
		log.borrow_mut().clear();

		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(*log.borrow(), ["late:ready"]);

		tree.get_node_mut(hidden).unwrap().visible = true;
		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(*log.borrow(), ["late:ready", "late:update"]);
	}

	#[test]
	fn panicking_callback_spares_siblings() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (services, config) = ctx();

		let mut tree = NodeTree::new(Node::new("Root"));
		let mut bad = Probe::new("bad", &log);
		bad.panic_on_update = true;
		let bad_uuid = tree.root_mut().add_component(Box::new(bad));
		tree.root_mut().add_component(Box::new(Probe::new("good", &log)));
		log.borrow_mut().clear();

		tree.propagate_update(&services, &config, 0.016);
		assert_eq!(*log.borrow(), ["bad:ready", "good:ready", "good:update"]);

		// the failing component stays in place
		assert_eq!(tree.root().components()[0].uuid(), bad_uuid);
	}

	#[test]
	fn ready_runs_once() {
		let log = Rc::new(RefCell::new(Vec::new()));
		let (services, config) = ctx();

		let mut tree = NodeTree::new(Node::new("Root"));
		tree.root_mut().add_component(Box::new(Probe::new("p", &log)));
		log.borrow_mut().clear();

		tree.propagate_ready(&services, &config);
		tree.propagate_ready(&services, &config);
		tree.propagate_update(&services, &config, 0.1);
		assert_eq!(*log.borrow(), ["p:ready", "p:update"]);
	}
}
