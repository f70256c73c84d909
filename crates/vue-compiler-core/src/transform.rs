//! Template transformations.
//!
//! [`transform`] walks the AST depth-first, running every registered node
//! transform on entry and the exit callbacks they return in reverse order
//! once the node's children are done. Plugins see the tree through a
//! [`NodeCursor`], which is also how they replace or remove the node they
//! are visiting, and record cross-cutting state (runtime helpers, hoists,
//! cache slots, scopes) on the [`TransformContext`].

use crate::ast::*;
use crate::error::CompilerError;
use crate::options::TransformOptions;
use crate::runtime_helpers::{PatchFlags, RuntimeHelper};
use indexmap::IndexSet;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use source_map::SourceLocation;
use std::mem;
use tracing::{debug, trace};

/// Callback run when traversal leaves a node.
pub type ExitFn = Box<dyn FnOnce(&mut NodeCursor<'_>, &mut TransformContext<'_>)>;

/// A node transform, applied to every node on entry.
pub type NodeTransform =
    Box<dyn Fn(&mut NodeCursor<'_>, &mut TransformContext<'_>) -> TransformExit>;

/// Post-processes a directive transform's result before it is merged.
pub type PropsAugmentor = dyn Fn(DirectiveTransformResult) -> DirectiveTransformResult;

/// Turns one directive into props. Invoked by element transforms, not by the engine.
pub type DirectiveTransform = Box<
    dyn Fn(
        &DirectiveNode,
        &mut ElementNode,
        &mut TransformContext<'_>,
        Option<&PropsAugmentor>,
    ) -> DirectiveTransformResult,
>;

/// Static hoisting analysis run after traversal.
pub type HoistPass = Box<dyn Fn(&mut RootNode, &mut TransformContext<'_>)>;

/// Box a closure as an [`ExitFn`].
pub fn exit_fn(
    f: impl FnOnce(&mut NodeCursor<'_>, &mut TransformContext<'_>) + 'static,
) -> ExitFn {
    Box::new(f)
}

/// What a node transform leaves behind for the exit phase.
#[derive(Default)]
pub enum TransformExit {
    #[default]
    None,
    Exit(ExitFn),
    ExitMany(Vec<ExitFn>),
}

impl From<Option<ExitFn>> for TransformExit {
    fn from(exit: Option<ExitFn>) -> Self {
        exit.map_or(Self::None, Self::Exit)
    }
}

/// Output of a [`DirectiveTransform`].
#[derive(Debug, Clone, Default)]
pub struct DirectiveTransformResult {
    pub props: Vec<Property>,
    pub need_runtime: NeedRuntime,
    /// Raw template fragment for server rendering.
    pub ssr_tag_parts: Option<Vec<JsExpression>>,
}

/// Whether a directive must be resolved and applied at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum NeedRuntime {
    #[default]
    No,
    Yes,
    /// Applied through a specific runtime helper (e.g. `vModelText`-style built-ins).
    Helper(RuntimeHelper),
}

/// Nesting depth of scope-introducing constructs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Scopes {
    pub v_for: u32,
    pub v_slot: u32,
    pub v_pre: u32,
    pub v_once: u32,
}

enum Slot<'a> {
    Root(&'a mut RootNode),
    Branch(&'a mut IfBranchNode),
    Child {
        siblings: &'a mut Vec<TemplateNode>,
        index: usize,
    },
}

/// Shared view of the node under a cursor.
pub enum NodeRef<'n> {
    Root(&'n RootNode),
    IfBranch(&'n IfBranchNode),
    Node(&'n TemplateNode),
}

/// Mutable view of the node under a cursor.
pub enum NodeMut<'n> {
    Root(&'n mut RootNode),
    IfBranch(&'n mut IfBranchNode),
    Node(&'n mut TemplateNode),
}

/// Position of the node being visited: the root, an if-branch, or a child
/// slot in its parent's children.
///
/// Removing the current node leaves the cursor pointing at the slot it
/// occupied, so the next sibling (now at the same index) is visited next.
/// Removing an earlier sibling shifts the cursor back by one.
pub struct NodeCursor<'a> {
    slot: Slot<'a>,
    removed: bool,
}

impl<'a> NodeCursor<'a> {
    pub fn root(root: &'a mut RootNode) -> Self {
        Self {
            slot: Slot::Root(root),
            removed: false,
        }
    }

    pub fn branch(branch: &'a mut IfBranchNode) -> Self {
        Self {
            slot: Slot::Branch(branch),
            removed: false,
        }
    }

    /// # Panics
    ///
    /// If `index` is out of bounds.
    pub fn child(siblings: &'a mut Vec<TemplateNode>, index: usize) -> Self {
        assert!(
            index < siblings.len(),
            "child index {index} out of bounds ({} siblings)",
            siblings.len()
        );
        Self {
            slot: Slot::Child { siblings, index },
            removed: false,
        }
    }

    /// The current node.
    ///
    /// # Panics
    ///
    /// If the node has been removed.
    pub fn node(&self) -> NodeRef<'_> {
        assert!(!self.removed, "current node was removed");
        match &self.slot {
            Slot::Root(root) => NodeRef::Root(root),
            Slot::Branch(branch) => NodeRef::IfBranch(branch),
            Slot::Child { siblings, index } => NodeRef::Node(&siblings[*index]),
        }
    }

    /// The current node, mutably.
    ///
    /// # Panics
    ///
    /// If the node has been removed.
    pub fn node_mut(&mut self) -> NodeMut<'_> {
        assert!(!self.removed, "current node was removed");
        match &mut self.slot {
            Slot::Root(root) => NodeMut::Root(&mut **root),
            Slot::Branch(branch) => NodeMut::IfBranch(&mut **branch),
            Slot::Child { siblings, index } => NodeMut::Node(&mut siblings[*index]),
        }
    }

    /// The current node if it is a live element.
    pub fn element(&self) -> Option<&ElementNode> {
        match &self.slot {
            Slot::Child { siblings, index } if !self.removed => siblings[*index].as_element(),
            _ => None,
        }
    }

    pub fn element_mut(&mut self) -> Option<&mut ElementNode> {
        match &mut self.slot {
            Slot::Child { siblings, index } if !self.removed => siblings[*index].as_element_mut(),
            _ => None,
        }
    }

    /// Index of the current slot in its parent's children.
    pub fn child_index(&self) -> Option<usize> {
        match &self.slot {
            Slot::Child { index, .. } => Some(*index),
            _ => None,
        }
    }

    /// The parent's children, including the current node unless removed.
    pub fn siblings(&self) -> &[TemplateNode] {
        match &self.slot {
            Slot::Child { siblings, .. } => siblings,
            _ => &[],
        }
    }

    pub fn sibling_mut(&mut self, index: usize) -> Option<&mut TemplateNode> {
        match &mut self.slot {
            Slot::Child { siblings, .. } => siblings.get_mut(index),
            _ => None,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.removed
    }

    /// Replace the current node, returning the old one.
    ///
    /// # Panics
    ///
    /// On the root or an if-branch, or after the node was removed.
    pub fn replace(&mut self, node: TemplateNode) -> TemplateNode {
        assert!(!self.removed, "cannot replace a removed node");
        match &mut self.slot {
            Slot::Child { siblings, index } => {
                trace!(index = *index, "replacing node");
                mem::replace(&mut siblings[*index], node)
            }
            Slot::Root(_) => panic!("cannot replace the root node"),
            Slot::Branch(_) => panic!("cannot replace an if-branch"),
        }
    }

    /// Replace the current node with a node built from it.
    pub fn replace_with(&mut self, f: impl FnOnce(TemplateNode) -> TemplateNode) {
        let old = self.replace(placeholder());
        self.replace(f(old));
    }

    /// Remove the current node from its parent.
    ///
    /// # Panics
    ///
    /// On the root or an if-branch, or if already removed.
    pub fn remove(&mut self) -> TemplateNode {
        assert!(!self.removed, "node already removed");
        match &mut self.slot {
            Slot::Child { siblings, index } => {
                trace!(index = *index, "removing current node");
                self.removed = true;
                siblings.remove(*index)
            }
            Slot::Root(_) => panic!("cannot remove the root node"),
            Slot::Branch(_) => panic!("cannot remove an if-branch"),
        }
    }

    /// Remove the sibling at `target`, which may be the current node.
    ///
    /// # Panics
    ///
    /// On the root or an if-branch, or if `target` is out of bounds.
    pub fn remove_sibling(&mut self, target: usize) -> TemplateNode {
        if self.child_index() == Some(target) && !self.removed {
            return self.remove();
        }
        match &mut self.slot {
            Slot::Child { siblings, index } => {
                assert!(
                    target < siblings.len(),
                    "sibling {target} out of bounds ({} siblings)",
                    siblings.len()
                );
                trace!(index = target, "removing sibling");
                if target < *index {
                    *index -= 1;
                }
                siblings.remove(target)
            }
            Slot::Root(_) => panic!("the root node has no siblings"),
            Slot::Branch(_) => panic!("an if-branch has no siblings"),
        }
    }

    /// Index the children loop should visit next.
    fn next_index(&self) -> usize {
        match &self.slot {
            Slot::Child { index, .. } if self.removed => *index,
            Slot::Child { index, .. } => *index + 1,
            _ => 0,
        }
    }
}

fn placeholder() -> TemplateNode {
    TemplateNode::Comment(CommentNode {
        content: String::new(),
        loc: SourceLocation::STUB,
    })
}

/// Mutable compilation state for one [`transform`] call.
pub struct TransformContext<'o> {
    pub options: &'o TransformOptions,
    pub helpers: IndexSet<RuntimeHelper>,
    pub components: IndexSet<SmolStr>,
    pub directives: IndexSet<SmolStr>,
    pub hoists: Vec<JsExpression>,
    /// Identifiers currently in scope, with their nesting count.
    pub identifiers: FxHashMap<SmolStr, u32>,
    pub scopes: Scopes,
    pub temps: u32,
    pub cached: u32,
    errors: Vec<CompilerError>,
}

impl<'o> TransformContext<'o> {
    pub fn new(options: &'o TransformOptions) -> Self {
        Self {
            options,
            helpers: IndexSet::new(),
            components: IndexSet::new(),
            directives: IndexSet::new(),
            hoists: Vec::new(),
            identifiers: FxHashMap::default(),
            scopes: Scopes::default(),
            temps: 0,
            cached: 0,
            errors: Vec::new(),
        }
    }

    #[inline]
    pub fn ssr(&self) -> bool {
        self.options.ssr
    }

    /// Record that the generated code needs `helper`.
    pub fn helper(&mut self, helper: RuntimeHelper) -> RuntimeHelper {
        self.helpers.insert(helper);
        helper
    }

    /// Record `helper` and return the local name generated code uses for it.
    pub fn helper_string(&mut self, helper: RuntimeHelper) -> String {
        format!("_{}", self.helper(helper).name())
    }

    /// Lift `exp` out of the render function, returning its placeholder.
    pub fn hoist(&mut self, exp: JsExpression) -> SimpleExpressionNode {
        let loc = exp.loc().clone();
        self.hoists.push(exp);
        let index = self.hoists.len();
        trace!(index, "hoisted expression");
        SimpleExpressionNode {
            content: format!("_hoisted_{index}"),
            is_static: false,
            is_constant: true,
            hoisted: Some(index - 1),
            loc,
            ..Default::default()
        }
    }

    /// Wrap `exp` in a new cache slot. Slots are numbered from 1.
    pub fn cache(&mut self, exp: JsExpression, is_vnode: bool) -> CacheExpression {
        self.cached += 1;
        trace!(index = self.cached, is_vnode, "allocated cache slot");
        CacheExpression {
            index: self.cached,
            value: Box::new(exp),
            is_vnode,
        }
    }

    /// Bring the identifiers of `exp` into scope. Without an identifier list
    /// the whole content is treated as one identifier.
    pub fn add_identifiers(&mut self, exp: &SimpleExpressionNode) {
        match &exp.identifiers {
            Some(ids) => {
                for id in ids {
                    self.add_identifier(id);
                }
            }
            None => self.add_identifier(&exp.content),
        }
    }

    pub fn remove_identifiers(&mut self, exp: &SimpleExpressionNode) {
        match &exp.identifiers {
            Some(ids) => {
                for id in ids {
                    self.remove_identifier(id);
                }
            }
            None => self.remove_identifier(&exp.content),
        }
    }

    pub fn add_identifier(&mut self, id: &str) {
        *self.identifiers.entry(SmolStr::new(id)).or_insert(0) += 1;
    }

    pub fn remove_identifier(&mut self, id: &str) {
        if let Some(count) = self.identifiers.get_mut(id) {
            *count -= 1;
            if *count == 0 {
                self.identifiers.remove(id);
            }
        }
    }

    pub fn is_in_scope(&self, id: &str) -> bool {
        self.identifiers.get(id).is_some_and(|&count| count > 0)
    }

    /// Look up the directive transform registered for `name`.
    pub fn directive_transform(&self, name: &str) -> Option<&'o DirectiveTransform> {
        let options = self.options;
        options.directive_transforms.get(name)
    }

    pub fn is_built_in_component(&self, tag: &str) -> Option<RuntimeHelper> {
        (self.options.is_built_in_component)(tag)
    }

    /// Register the helpers `call` needs and hand it back.
    pub fn create_vnode_call(&mut self, call: VNodeCall) -> VNodeCall {
        if call.is_block {
            self.helper(RuntimeHelper::OpenBlock);
            self.helper(RuntimeHelper::CreateBlock);
        } else {
            self.helper(RuntimeHelper::CreateVNode);
        }
        if call.directives.is_some() {
            self.helper(RuntimeHelper::WithDirectives);
        }
        call
    }

    /// Report a diagnostic from a plugin.
    pub fn on_error(&mut self, err: CompilerError) {
        trace!(code = %err.code, "transform error");
        if let Some(on_error) = &self.options.on_error {
            on_error(&err);
        }
        self.errors.push(err);
    }
}

/// Transform `root` in place. Returns diagnostics reported by plugins.
pub fn transform(root: &mut RootNode, options: &TransformOptions) -> Vec<CompilerError> {
    debug!(
        children = root.children.len(),
        node_transforms = options.node_transforms.len(),
        "transforming template"
    );
    let mut ctx = TransformContext::new(options);
    traverse_node(&mut NodeCursor::root(root), &mut ctx);
    if options.hoist_static {
        if let Some(hoist_pass) = &options.hoist_pass {
            hoist_pass(root, &mut ctx);
        }
    }
    if !options.ssr {
        create_root_codegen(root, &mut ctx);
    }

    let TransformContext {
        helpers,
        components,
        directives,
        hoists,
        temps,
        cached,
        errors,
        ..
    } = ctx;
    root.helpers = helpers;
    root.components = components;
    root.directives = directives;
    root.hoists = hoists;
    root.temps = temps;
    root.cached = cached;
    debug!(
        helpers = root.helpers.len(),
        hoists = root.hoists.len(),
        cached = root.cached,
        errors = errors.len(),
        "transformed template"
    );
    errors
}

/// Visit the node under `cursor` and, recursively, its children.
pub fn traverse_node(cursor: &mut NodeCursor<'_>, ctx: &mut TransformContext<'_>) {
    let options = ctx.options;
    let mut exits: Vec<ExitFn> = Vec::new();
    for node_transform in &options.node_transforms {
        match node_transform(cursor, ctx) {
            TransformExit::None => {}
            TransformExit::Exit(exit) => exits.push(exit),
            TransformExit::ExitMany(many) => exits.extend(many),
        }
        if cursor.is_removed() {
            return;
        }
    }

    match cursor.node_mut() {
        NodeMut::Node(TemplateNode::Comment(_)) => {
            if !ctx.ssr() {
                ctx.helper(RuntimeHelper::CreateComment);
            }
        }
        NodeMut::Node(TemplateNode::Interpolation(_)) => {
            if !ctx.ssr() {
                ctx.helper(RuntimeHelper::ToDisplayString);
            }
        }
        NodeMut::Node(TemplateNode::If(if_node)) => {
            let mut i = 0;
            while i < if_node.branches.len() {
                traverse_node(&mut NodeCursor::branch(&mut if_node.branches[i]), ctx);
                i += 1;
            }
        }
        NodeMut::Node(TemplateNode::Element(el)) => traverse_children(&mut el.children, ctx),
        NodeMut::Node(TemplateNode::For(for_node)) => {
            traverse_children(&mut for_node.children, ctx)
        }
        NodeMut::IfBranch(branch) => traverse_children(&mut branch.children, ctx),
        NodeMut::Root(root) => traverse_children(&mut root.children, ctx),
        NodeMut::Node(TemplateNode::Text(_)) => {}
    }

    while let Some(exit) = exits.pop() {
        exit(cursor, ctx);
    }
}

/// Visit `children` in order, tolerating removals made by plugins.
pub fn traverse_children(children: &mut Vec<TemplateNode>, ctx: &mut TransformContext<'_>) {
    let mut i = 0;
    while i < children.len() {
        let mut cursor = NodeCursor::child(children, i);
        traverse_node(&mut cursor, ctx);
        i = cursor.next_index();
    }
}

/// Which directives a structural transform claims.
pub enum DirectiveMatcher {
    Exact(SmolStr),
    Predicate(Box<dyn Fn(&str) -> bool>),
}

impl DirectiveMatcher {
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Exact(exact) => exact == name,
            Self::Predicate(predicate) => predicate(name),
        }
    }
}

impl From<&str> for DirectiveMatcher {
    fn from(name: &str) -> Self {
        Self::Exact(name.into())
    }
}

/// Build a node transform for structural directives such as `v-if` and `v-for`.
///
/// Each matching directive is taken off the element before `handler` runs,
/// so re-visiting the element (e.g. after moving it into a branch) never
/// matches it again. `<template v-slot>` is left to the slot transform.
pub fn create_structural_directive_transform<F>(
    matcher: impl Into<DirectiveMatcher>,
    handler: F,
) -> NodeTransform
where
    F: Fn(&mut NodeCursor<'_>, DirectiveNode, &mut TransformContext<'_>) -> Option<ExitFn>
        + 'static,
{
    let matcher = matcher.into();
    Box::new(
        move |cursor: &mut NodeCursor<'_>, ctx: &mut TransformContext<'_>| {
            let Some(el) = cursor.element() else {
                return TransformExit::None;
            };
            if el.tag_type == ElementType::Template && el.has_directive("slot") {
                return TransformExit::None;
            }

            let mut exits = Vec::new();
            let mut i = 0;
            // The handler may replace or remove the element; stop once it is gone.
            while let Some(el) = cursor.element_mut() {
                match el.props.get(i) {
                    None => break,
                    Some(ElementProp::Directive(dir)) if matcher.matches(&dir.name) => {}
                    Some(_) => {
                        i += 1;
                        continue;
                    }
                }
                if let ElementProp::Directive(dir) = el.props.remove(i) {
                    exits.extend(handler(cursor, dir, ctx));
                }
            }

            if exits.is_empty() {
                TransformExit::None
            } else {
                TransformExit::ExitMany(exits)
            }
        },
    )
}

/// Decide what the code generator emits for the whole template.
fn create_root_codegen(root: &mut RootNode, ctx: &mut TransformContext<'_>) {
    root.codegen_node = match root.children.as_mut_slice() {
        [] => None,
        [TemplateNode::Element(el)] if !el.is_slot_outlet() && el.codegen_node.is_some() => {
            if let Some(JsExpression::VNodeCall(call)) = &mut el.codegen_node {
                call.is_block = true;
                ctx.helper(RuntimeHelper::OpenBlock);
                ctx.helper(RuntimeHelper::CreateBlock);
            }
            Some(RootCodegen::Element)
        }
        [_] => Some(RootCodegen::Child),
        _ => {
            let mut fragment = VNodeCall::new(
                VNodeTag::Helper(ctx.helper(RuntimeHelper::Fragment)),
                SourceLocation::STUB,
            );
            fragment.children = Some(VNodeChildren::Owner);
            fragment.patch_flag = Some(PatchFlags::STABLE_FRAGMENT);
            fragment.is_block = true;
            Some(RootCodegen::Fragment(ctx.create_vnode_call(fragment)))
        }
    };
}
