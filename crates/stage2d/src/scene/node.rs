//! # Scene Nodes
//!
//! A node is plain data (transform, bounds, color, flags) plus two small
//! strategy tags: [`NodeKind`] decides what it draws and [`Behavior`] how it
//! updates. Nodes live in a [`NodeTree`] arena keyed by [`NodeId`]; parents
//! hold child ids, never references.
//!
//! Positions are where the node's anchor sits, in the parent's space. Bounds
//! are axis-aligned: rotation affects sprites (through the draw call) and
//! children, not the rectangle used for fills and hit tests.

use std::sync::Arc;

use bitflags::bitflags;
use slotmap::{new_key_type, SlotMap};

use crate::assets::{FontAtlas, Texture};
use crate::foundation::math::{affine, Color, Mat3, Rect, Size, Vec2};
use crate::render::{RenderCommand, SpriteCommand};

new_key_type! {
    /// Handle to a node in a [`NodeTree`]
    pub struct NodeId;
}

bitflags! {
    /// Node flags
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct NodeFlags: u8 {
        /// Drawn and hit-tested (children included)
        const VISIBLE = 1;
        /// Receives pointer hover/press/click events
        const INTERACTIVE = 1 << 1;
    }
}

/// Local transform relative to the parent
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeTransform {
    /// Anchor position
    pub position: Vec2,
    /// Rotation in degrees
    pub rotation: f32,
    /// Scale factors
    pub scale: Vec2,
}

impl Default for NodeTransform {
    fn default() -> Self {
        Self {
            position: Vec2::zeros(),
            rotation: 0.0,
            scale: Vec2::new(1.0, 1.0),
        }
    }
}

impl NodeTransform {
    /// Local affine matrix
    pub fn matrix(&self) -> Mat3 {
        affine::trs(self.position, self.rotation, self.scale)
    }
}

/// Button appearance
#[derive(Debug, Clone)]
pub struct ButtonStyle {
    /// Label
    pub text: String,
    /// Label font; no font draws no label
    pub font: Option<Arc<FontAtlas>>,
    /// Label color
    pub text_color: Color,
    /// Background when idle
    pub normal: Color,
    /// Background while hovered
    pub hover: Color,
    /// Background while pressed
    pub pressed: Color,
    /// Border color
    pub border_color: Color,
    /// Border width (0 = none)
    pub border_width: f32,
    /// Space between label and edge
    pub padding: Vec2,
}

impl Default for ButtonStyle {
    fn default() -> Self {
        Self {
            text: String::new(),
            font: None,
            text_color: Color::WHITE,
            normal: Color::rgb(0.25, 0.25, 0.3),
            hover: Color::rgb(0.35, 0.35, 0.45),
            pressed: Color::rgb(0.15, 0.15, 0.2),
            border_color: Color::WHITE,
            border_width: 0.0,
            padding: Vec2::new(10.0, 5.0),
        }
    }
}

/// What a node draws
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Nothing; a grouping node
    Empty,
    /// Rectangle covering the node bounds
    Rect {
        /// Fill with the node color
        filled: bool,
        /// Outline width (0 = none)
        stroke_width: f32,
    },
    /// Segment from the node position to `to` (local space)
    Line {
        /// End point
        to: Vec2,
        /// Line width
        width: f32,
    },
    /// Textured quad
    Sprite {
        /// Texture; a missing texture draws nothing
        texture: Option<Arc<Texture>>,
        /// Source rectangle, whole texture when `None`
        source: Option<Rect>,
        /// Mirror horizontally
        flip_x: bool,
        /// Mirror vertically
        flip_y: bool,
    },
    /// Text run
    Label {
        /// Text
        text: String,
        /// Font; no font draws nothing
        font: Option<Arc<FontAtlas>>,
    },
    /// Clickable button
    Button(ButtonStyle),
}

/// Per-frame update strategy
pub enum Behavior {
    /// No per-frame change
    Static,
    /// Constant rotation
    Spin {
        /// Degrees per second
        degrees_per_second: f32,
    },
    /// Constant velocity
    Drift {
        /// Units per second
        velocity: Vec2,
    },
    /// Arbitrary update
    Custom(Box<dyn FnMut(&mut NodeTransform, f32)>),
}

impl std::fmt::Debug for Behavior {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Static => f.write_str("Static"),
            Self::Spin { degrees_per_second } => f.debug_struct("Spin").field("degrees_per_second", degrees_per_second).finish(),
            Self::Drift { velocity } => f.debug_struct("Drift").field("velocity", velocity).finish(),
            Self::Custom(_) => f.write_str("Custom(..)"),
        }
    }
}

impl Behavior {
    fn apply(&mut self, transform: &mut NodeTransform, dt: f32) {
        match self {
            Self::Static => {}
            Self::Spin { degrees_per_second } => {
                transform.rotation = (transform.rotation + *degrees_per_second * dt).rem_euclid(360.0);
            }
            Self::Drift { velocity } => transform.position += *velocity * dt,
            Self::Custom(update) => update(transform, dt),
        }
    }
}

/// Pointer state of an interactive node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UiState {
    /// Cursor is over the node
    pub hovered: bool,
    /// A press started on the node and has not been released
    pub pressed: bool,
}

/// Scene graph node
#[derive(Debug)]
pub struct Node {
    /// Name used by [`NodeTree::find_by_name`]
    pub name: String,
    /// Local transform
    pub transform: NodeTransform,
    /// Normalized pivot inside the bounds (0,0 = top-left)
    pub anchor: Vec2,
    /// Unscaled size
    pub size: Size,
    /// Draw order among siblings (lower first)
    pub z_order: i32,
    /// Main color
    pub color: Color,
    /// Flags
    pub flags: NodeFlags,
    /// Draw strategy
    pub kind: NodeKind,
    /// Update strategy
    pub behavior: Behavior,
    ui: UiState,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

impl Node {
    /// Create a visible node of the given kind
    pub fn new(kind: NodeKind) -> Self {
        Self {
            name: String::new(),
            transform: NodeTransform::default(),
            anchor: Vec2::new(0.5, 0.5),
            size: Size::default(),
            z_order: 0,
            color: Color::WHITE,
            flags: NodeFlags::VISIBLE,
            kind,
            behavior: Behavior::Static,
            ui: UiState::default(),
            parent: None,
            children: Vec::new(),
        }
    }

    /// Grouping node
    pub fn empty() -> Self {
        Self::new(NodeKind::Empty)
    }

    /// Filled rectangle
    pub fn rect(width: f32, height: f32, color: Color) -> Self {
        Self::new(NodeKind::Rect {
            filled: true,
            stroke_width: 0.0,
        })
        .with_size(width, height)
        .with_color(color)
    }

    /// Line from the node position to `to`
    pub fn line(to: Vec2, width: f32, color: Color) -> Self {
        Self::new(NodeKind::Line { to, width }).with_color(color)
    }

    /// Sprite drawing the whole texture
    pub fn sprite(texture: Option<Arc<Texture>>) -> Self {
        Self::new(NodeKind::Sprite {
            texture,
            source: None,
            flip_x: false,
            flip_y: false,
        })
    }

    /// Text label
    pub fn label(text: impl Into<String>, font: Option<Arc<FontAtlas>>) -> Self {
        Self::new(NodeKind::Label {
            text: text.into(),
            font,
        })
    }

    /// Interactive button, sized to its label when it has a font
    pub fn button(style: ButtonStyle) -> Self {
        let size = style
            .font
            .as_ref()
            .filter(|_| !style.text.is_empty())
            .map(|font| {
                let text = font.measure_text(&style.text);
                Size::new(text.x + style.padding.x * 2.0, text.y + style.padding.y * 2.0)
            })
            .unwrap_or_default();
        let mut node = Self::new(NodeKind::Button(style));
        node.size = size;
        node.flags |= NodeFlags::INTERACTIVE;
        node
    }

    /// Set the name
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Set the position
    #[must_use]
    pub fn at(mut self, x: f32, y: f32) -> Self {
        self.transform.position = Vec2::new(x, y);
        self
    }

    /// Set the size
    #[must_use]
    pub fn with_size(mut self, width: f32, height: f32) -> Self {
        self.size = Size::new(width, height);
        self
    }

    /// Set the color
    #[must_use]
    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    /// Set the sibling draw order
    #[must_use]
    pub fn with_z_order(mut self, z_order: i32) -> Self {
        self.z_order = z_order;
        self
    }

    /// Set the rotation in degrees
    #[must_use]
    pub fn with_rotation(mut self, degrees: f32) -> Self {
        self.transform.rotation = degrees;
        self
    }

    /// Set the scale
    #[must_use]
    pub fn with_scale(mut self, x: f32, y: f32) -> Self {
        self.transform.scale = Vec2::new(x, y);
        self
    }

    /// Set the anchor
    #[must_use]
    pub fn with_anchor(mut self, x: f32, y: f32) -> Self {
        self.anchor = Vec2::new(x, y);
        self
    }

    /// Set the update behavior
    #[must_use]
    pub fn with_behavior(mut self, behavior: Behavior) -> Self {
        self.behavior = behavior;
        self
    }

    /// Mark as interactive
    #[must_use]
    pub fn interactive(mut self) -> Self {
        self.flags |= NodeFlags::INTERACTIVE;
        self
    }

    /// Whether the node (not its ancestors) is visible
    pub fn is_visible(&self) -> bool {
        self.flags.contains(NodeFlags::VISIBLE)
    }

    /// Show or hide the node and its subtree
    pub fn set_visible(&mut self, visible: bool) {
        self.flags.set(NodeFlags::VISIBLE, visible);
    }

    /// Whether the node takes pointer events
    pub fn is_interactive(&self) -> bool {
        self.flags.contains(NodeFlags::INTERACTIVE)
    }

    /// Pointer state
    pub fn ui_state(&self) -> UiState {
        self.ui
    }

    pub(crate) fn ui_state_mut(&mut self) -> &mut UiState {
        &mut self.ui
    }

    /// Parent node
    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    /// Child nodes in insertion order
    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    fn content_size(&self) -> Size {
        if !self.size.is_empty() {
            return self.size;
        }
        match &self.kind {
            NodeKind::Sprite { texture: Some(texture), source, .. } => source
                .map(|rect| Size::new(rect.width.abs(), rect.height.abs()))
                .unwrap_or_else(|| Size::new(texture.width() as f32, texture.height() as f32)),
            NodeKind::Label { text, font: Some(font) } => {
                let measured = font.measure_text(text);
                Size::new(measured.x, measured.y)
            }
            _ => self.size,
        }
    }

    fn world_bounds(&self, world: &Mat3) -> Rect {
        let origin = affine::transform_point(world, Vec2::zeros());
        let scale = affine::extract_scale(world);
        let size = self.content_size();
        let width = size.width * scale.x;
        let height = size.height * scale.y;
        Rect::new(origin.x - width * self.anchor.x, origin.y - height * self.anchor.y, width, height)
    }

    fn emit_commands(&self, world: &Mat3, out: &mut Vec<RenderCommand>, opacity: f32) {
        let bounds = self.world_bounds(world);
        let mut push = |command: RenderCommand| out.push(command.with_opacity(opacity));

        match &self.kind {
            NodeKind::Empty => {}
            NodeKind::Rect { filled, stroke_width } => {
                if *filled {
                    push(RenderCommand::fill_rect(bounds, self.color));
                }
                if *stroke_width > 0.0 {
                    push(RenderCommand::stroke_rect(bounds, self.color, *stroke_width));
                }
            }
            NodeKind::Line { to, width } => {
                let from = affine::transform_point(world, Vec2::zeros());
                let to = affine::transform_point(world, *to);
                push(RenderCommand::line(from, to, self.color, *width));
            }
            NodeKind::Sprite {
                texture,
                source,
                flip_x,
                flip_y,
            } => {
                let Some(texture) = texture.as_ref().filter(|texture| texture.is_valid()) else {
                    return;
                };
                let mut source = source
                    .unwrap_or_else(|| Rect::new(0.0, 0.0, texture.width() as f32, texture.height() as f32));
                if *flip_x {
                    source.x = source.right();
                    source.width = -source.width;
                }
                if *flip_y {
                    source.y = source.bottom();
                    source.height = -source.height;
                }
                push(RenderCommand::Sprite(SpriteCommand {
                    texture: Arc::clone(texture),
                    dest: bounds,
                    source,
                    color: self.color,
                    rotation: affine::extract_rotation(world),
                    anchor: self.anchor,
                }));
            }
            NodeKind::Label { text, font } => {
                if let Some(font) = font.as_ref().filter(|_| !text.is_empty()) {
                    push(RenderCommand::text(
                        Arc::clone(font),
                        text.clone(),
                        Vec2::new(bounds.x, bounds.y),
                        self.color,
                    ));
                }
            }
            NodeKind::Button(style) => {
                if bounds.is_empty() {
                    return;
                }
                let background = if self.ui.pressed {
                    style.pressed
                } else if self.ui.hovered {
                    style.hover
                } else {
                    style.normal
                };
                push(RenderCommand::fill_rect(bounds, background));
                if style.border_width > 0.0 {
                    push(RenderCommand::stroke_rect(bounds, style.border_color, style.border_width));
                }
                if let Some(font) = style.font.as_ref().filter(|_| !style.text.is_empty()) {
                    let text = font.measure_text(&style.text);
                    let center = bounds.center();
                    let position = Vec2::new(
                        (center.x - text.x * 0.5).max(bounds.left() + style.padding.x),
                        (center.y - text.y * 0.5).max(bounds.top() + style.padding.y),
                    );
                    push(RenderCommand::text(Arc::clone(font), style.text.clone(), position, style.text_color));
                }
            }
        }
    }
}

/// Arena-backed node hierarchy with a permanent root
#[derive(Debug)]
pub struct NodeTree {
    nodes: SlotMap<NodeId, Node>,
    root: NodeId,
}

impl Default for NodeTree {
    fn default() -> Self {
        Self::new()
    }
}

impl NodeTree {
    /// Create a tree holding only an empty root
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::empty().with_name("root").with_anchor(0.0, 0.0));
        Self { nodes, root }
    }

    /// Root node id
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether only the root exists
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    /// Whether `id` names a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(id)
    }

    /// Add a node under the root
    pub fn add(&mut self, node: Node) -> NodeId {
        let root = self.root;
        self.insert_under(root, node)
    }

    /// Add a node under `parent`; `None` if the parent does not exist
    pub fn add_child(&mut self, parent: NodeId, node: Node) -> Option<NodeId> {
        self.nodes.contains_key(parent).then(|| self.insert_under(parent, node))
    }

    fn insert_under(&mut self, parent: NodeId, mut node: Node) -> NodeId {
        node.parent = Some(parent);
        let id = self.nodes.insert(node);
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.push(id);
        }
        id
    }

    /// Remove a node and its subtree, returning every removed id. The root
    /// cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> Vec<NodeId> {
        if id == self.root || !self.nodes.contains_key(id) {
            return Vec::new();
        }
        if let Some(parent) = self.nodes.get(id).and_then(|node| node.parent) {
            if let Some(parent) = self.nodes.get_mut(parent) {
                parent.children.retain(|child| *child != id);
            }
        }

        let mut removed = Vec::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if let Some(node) = self.nodes.remove(next) {
                pending.extend(node.children);
                removed.push(next);
            }
        }
        removed
    }

    /// Borrow a node
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id)
    }

    /// Mutably borrow a node
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(id)
    }

    /// First node (depth-first from the root) with the given name
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        let mut pending = vec![self.root];
        while let Some(id) = pending.pop() {
            let node = self.nodes.get(id)?;
            if node.name == name {
                return Some(id);
            }
            pending.extend(node.children.iter().rev());
        }
        None
    }

    /// Run every node's behavior
    pub fn update(&mut self, dt: f32) {
        for node in self.nodes.values_mut() {
            let Node { behavior, transform, .. } = node;
            behavior.apply(transform, dt);
        }
    }

    /// World matrix of a node (parent chain composed)
    pub fn world_transform(&self, id: NodeId) -> Option<Mat3> {
        let mut node = self.nodes.get(id)?;
        let mut world = node.transform.matrix();
        while let Some(parent) = node.parent.and_then(|parent| self.nodes.get(parent)) {
            world = parent.transform.matrix() * world;
            node = parent;
        }
        Some(world)
    }

    /// World-space bounds of a node
    pub fn world_bounds(&self, id: NodeId) -> Option<Rect> {
        let world = self.world_transform(id)?;
        self.nodes.get(id).map(|node| node.world_bounds(&world))
    }

    /// Visit visible nodes in draw order: parent first, children by z-order
    /// (stable), hidden subtrees skipped
    fn visit(&self, mut visitor: impl FnMut(NodeId, &Node, &Mat3)) {
        let mut pending = vec![(self.root, Mat3::identity())];
        let mut children = Vec::new();

        while let Some((id, parent_world)) = pending.pop() {
            let Some(node) = self.nodes.get(id) else {
                continue;
            };
            if !node.is_visible() {
                continue;
            }
            let world = parent_world * node.transform.matrix();
            visitor(id, node, &world);

            children.clear();
            children.extend(node.children.iter().copied());
            children.sort_by_key(|child| self.nodes.get(*child).map_or(0, |child| child.z_order));
            pending.extend(children.iter().rev().map(|child| (*child, world)));
        }
    }

    /// Append the draw commands of every visible node, alpha scaled by `opacity`
    pub fn collect_render_commands(&self, out: &mut Vec<RenderCommand>, opacity: f32) {
        self.visit(|_, node, world| node.emit_commands(world, out, opacity));
    }

    /// Topmost visible interactive node containing `point`
    pub fn hit_test(&self, point: Vec2) -> Option<NodeId> {
        let mut hit = None;
        self.visit(|id, node, world| {
            if node.is_interactive() && node.world_bounds(world).contains(point) {
                hit = Some(id);
            }
        });
        hit
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn fill_colors(commands: &[RenderCommand]) -> Vec<Color> {
        commands
            .iter()
            .filter_map(|command| match command {
                RenderCommand::FillRect { color, .. } => Some(*color),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_children_drawn_in_stable_z_order() {
        let mut tree = NodeTree::new();
        tree.add(Node::rect(1.0, 1.0, Color::RED).with_z_order(2));
        tree.add(Node::rect(1.0, 1.0, Color::GREEN).with_z_order(1));
        tree.add(Node::rect(1.0, 1.0, Color::BLUE).with_z_order(1));

        let mut out = Vec::new();
        tree.collect_render_commands(&mut out, 1.0);
        assert_eq!(fill_colors(&out), vec![Color::GREEN, Color::BLUE, Color::RED]);
    }

    #[test]
    fn test_hidden_subtree_skipped() {
        let mut tree = NodeTree::new();
        let group = tree.add(Node::empty());
        tree.add_child(group, Node::rect(1.0, 1.0, Color::RED)).unwrap();
        tree.get_mut(group).unwrap().set_visible(false);

        let mut out = Vec::new();
        tree.collect_render_commands(&mut out, 1.0);
        assert!(out.is_empty());
    }

    #[test]
    fn test_world_bounds_follow_parent() {
        let mut tree = NodeTree::new();
        let parent = tree.add(Node::empty().at(100.0, 50.0).with_scale(2.0, 2.0));
        let child = tree.add_child(parent, Node::rect(10.0, 10.0, Color::RED).at(5.0, 0.0)).unwrap();

        let bounds = tree.world_bounds(child).unwrap();
        assert_relative_eq!(bounds.x, 100.0);
        assert_relative_eq!(bounds.y, 40.0);
        assert_relative_eq!(bounds.width, 20.0);
    }

    #[test]
    fn test_remove_is_recursive_and_keeps_root() {
        let mut tree = NodeTree::new();
        let parent = tree.add(Node::empty().with_name("parent"));
        let child = tree.add_child(parent, Node::empty()).unwrap();
        tree.add_child(child, Node::empty().with_name("grandchild")).unwrap();

        assert_eq!(tree.remove(parent).len(), 3);
        assert!(tree.is_empty());
        assert!(tree.find_by_name("grandchild").is_none());
        assert!(tree.remove(tree.root()).is_empty());
        assert!(tree.add_child(parent, Node::empty()).is_none());
    }

    #[test]
    fn test_behaviors() {
        let mut tree = NodeTree::new();
        let spinner = tree.add(Node::empty().with_behavior(Behavior::Spin { degrees_per_second: 90.0 }));
        let drifter = tree.add(Node::empty().with_behavior(Behavior::Drift {
            velocity: Vec2::new(10.0, 0.0),
        }));
        let custom = tree.add(Node::empty().with_behavior(Behavior::Custom(Box::new(|transform, dt| {
            transform.scale *= 1.0 + dt;
        }))));

        tree.update(0.5);
        assert_relative_eq!(tree.get(spinner).unwrap().transform.rotation, 45.0);
        assert_relative_eq!(tree.get(drifter).unwrap().transform.position.x, 5.0);
        assert_relative_eq!(tree.get(custom).unwrap().transform.scale.x, 1.5);
    }

    #[test]
    fn test_missing_texture_is_skipped() {
        let mut tree = NodeTree::new();
        tree.add(Node::sprite(None));
        tree.add(Node::sprite(Some(Arc::new(Texture::new("t", 8, 4)))).at(4.0, 2.0));

        let mut out = Vec::new();
        tree.collect_render_commands(&mut out, 1.0);
        assert_eq!(out.len(), 1);
        match &out[0] {
            RenderCommand::Sprite(sprite) => assert_eq!(sprite.dest, Rect::new(0.0, 0.0, 8.0, 4.0)),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_hit_test_prefers_topmost_interactive() {
        let mut tree = NodeTree::new();
        let below = tree.add(Node::rect(100.0, 100.0, Color::RED).at(50.0, 50.0).interactive());
        let above = tree.add(Node::rect(20.0, 20.0, Color::GREEN).at(50.0, 50.0).interactive().with_z_order(1));
        tree.add(Node::rect(200.0, 200.0, Color::BLUE).at(50.0, 50.0).with_z_order(5));

        assert_eq!(tree.hit_test(Vec2::new(50.0, 50.0)), Some(above));
        assert_eq!(tree.hit_test(Vec2::new(10.0, 10.0)), Some(below));
        assert_eq!(tree.hit_test(Vec2::new(500.0, 500.0)), None);
    }

    #[test]
    fn test_button_sizes_to_label_and_uses_state_color() {
        let font = Arc::new(FontAtlas::new("mono", 10));
        let style = ButtonStyle {
            text: "OK".to_string(),
            font: Some(font),
            ..ButtonStyle::default()
        };
        let hover = style.hover;
        let mut button = Node::button(style);
        assert_relative_eq!(button.size.width, 2.0 * 6.0 + 20.0);
        assert!(button.is_interactive());

        button.ui_state_mut().hovered = true;
        let mut out = Vec::new();
        button.emit_commands(&Mat3::identity(), &mut out, 1.0);
        assert_eq!(fill_colors(&out), vec![hover]);
        assert!(matches!(out.last(), Some(RenderCommand::Text(_))));
    }

    #[test]
    fn test_opacity_applies_to_commands() {
        let mut tree = NodeTree::new();
        tree.add(Node::rect(1.0, 1.0, Color::RED));
        let mut out = Vec::new();
        tree.collect_render_commands(&mut out, 0.25);
        assert_relative_eq!(fill_colors(&out)[0].a, 0.25);
    }
}
