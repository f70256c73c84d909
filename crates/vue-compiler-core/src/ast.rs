//! AST types for Vue templates.
//!
//! The parser produces [`RootNode`] trees of [`TemplateNode`]s. The transform
//! engine mutates them in place and attaches [`JsExpression`] output nodes
//! that a code generator consumes.

use crate::runtime_helpers::{PatchFlags, RuntimeHelper};
use indexmap::IndexSet;
use smol_str::SmolStr;
use source_map::SourceLocation;

/// The root of a parsed template.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct RootNode {
    /// Child nodes of the template.
    pub children: Vec<TemplateNode>,
    /// Runtime helpers the generated code needs.
    pub helpers: IndexSet<RuntimeHelper>,
    /// Components resolved by name at runtime.
    pub components: IndexSet<SmolStr>,
    /// Custom directives resolved by name at runtime.
    pub directives: IndexSet<SmolStr>,
    /// Expressions hoisted out of the render function.
    pub hoists: Vec<JsExpression>,
    /// Number of temporary variables the generated code declares.
    pub temps: u32,
    /// Number of cache slots allocated.
    pub cached: u32,
    /// What the code generator should emit for the whole template.
    pub codegen_node: Option<RootCodegen>,
    /// Source location of the entire template.
    pub loc: SourceLocation,
}

impl RootNode {
    /// Create a root with children, before any transform has run.
    pub fn new(children: Vec<TemplateNode>, loc: SourceLocation) -> Self {
        Self {
            children,
            loc,
            ..Default::default()
        }
    }
}

/// The synthesized output of the root node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RootCodegen {
    /// The single element child's own codegen node, promoted to a block
    /// when it is a vnode call.
    Element,
    /// The single child describes its own output (if, for, slot outlet, text, ...).
    Child,
    /// Several children wrapped in a stable fragment.
    Fragment(VNodeCall),
}

/// A node in the template AST.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum TemplateNode {
    /// An element (HTML element, component, slot outlet or template).
    Element(ElementNode),
    /// A text node.
    Text(TextNode),
    /// A comment.
    Comment(CommentNode),
    /// An interpolation ({{ expr }}).
    Interpolation(InterpolationNode),
    /// A conditional block built by a v-if transform.
    If(IfNode),
    /// A loop block built by a v-for transform.
    For(ForNode),
}

impl TemplateNode {
    /// Get the location of this node.
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Element(n) => &n.loc,
            Self::Text(n) => &n.loc,
            Self::Comment(n) => &n.loc,
            Self::Interpolation(n) => &n.loc,
            Self::If(n) => &n.loc,
            Self::For(n) => &n.loc,
        }
    }

    /// The element, if this is one.
    pub fn as_element(&self) -> Option<&ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The element, if this is one.
    pub fn as_element_mut(&mut self) -> Option<&mut ElementNode> {
        match self {
            Self::Element(el) => Some(el),
            _ => None,
        }
    }

    /// The text node, if this is one.
    pub fn as_text(&self) -> Option<&TextNode> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self, Self::Element(_))
    }

    pub fn is_comment(&self) -> bool {
        matches!(self, Self::Comment(_))
    }
}

/// Element namespace, as resolved by the parser's namespace callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
}

/// How an element is compiled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementType {
    /// Native element.
    #[default]
    Plain,
    /// Component resolved at runtime.
    Component,
    /// `<slot>` outlet.
    Slot,
    /// `<template>` carrying a structural directive.
    Template,
}

/// An element node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ElementNode {
    /// Namespace of the element.
    pub ns: Namespace,
    /// The tag name, as written.
    pub tag: SmolStr,
    /// Classification of the tag.
    pub tag_type: ElementType,
    /// Attributes and directives, in source order.
    pub props: Vec<ElementProp>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Self-closing tag (`<foo/>`).
    pub is_self_closing: bool,
    /// Output node assigned by element transforms.
    pub codegen_node: Option<JsExpression>,
    /// Source location, from the start tag through the end tag.
    pub loc: SourceLocation,
}

impl ElementNode {
    /// Check if this element has a specific directive.
    pub fn has_directive(&self, name: &str) -> bool {
        self.find_directive(name).is_some()
    }

    /// Get a directive by name.
    pub fn find_directive(&self, name: &str) -> Option<&DirectiveNode> {
        self.props.iter().find_map(|p| match p {
            ElementProp::Directive(dir) if dir.name == name => Some(dir),
            _ => None,
        })
    }

    /// Get a static attribute by name.
    pub fn find_attribute(&self, name: &str) -> Option<&AttributeNode> {
        self.props.iter().find_map(|p| match p {
            ElementProp::Attribute(attr) if attr.name == name => Some(attr),
            _ => None,
        })
    }

    /// `<slot>` outlets are never turned into blocks by their parent.
    pub fn is_slot_outlet(&self) -> bool {
        self.tag_type == ElementType::Slot
    }
}

/// An attribute or directive on an element.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ElementProp {
    Attribute(AttributeNode),
    Directive(DirectiveNode),
}

impl ElementProp {
    /// The attribute name, or the (expanded) directive name.
    pub fn name(&self) -> &str {
        match self {
            Self::Attribute(attr) => &attr.name,
            Self::Directive(dir) => &dir.name,
        }
    }

    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Attribute(attr) => &attr.loc,
            Self::Directive(dir) => &dir.loc,
        }
    }

    pub fn as_directive(&self) -> Option<&DirectiveNode> {
        match self {
            Self::Directive(dir) => Some(dir),
            Self::Attribute(_) => None,
        }
    }
}

/// A static attribute.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AttributeNode {
    /// Attribute name.
    pub name: SmolStr,
    /// Attribute value; its location includes the quotes.
    pub value: Option<TextNode>,
    /// Source location.
    pub loc: SourceLocation,
}

/// A directive (`v-name:arg.mod="exp"` or one of the `:`, `@`, `#` shorthands).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DirectiveNode {
    /// Directive name without the `v-` prefix (`bind`, `on`, `slot`, ...).
    pub name: SmolStr,
    /// Bound expression, carried as opaque text.
    pub exp: Option<SimpleExpressionNode>,
    /// Directive argument; dynamic arguments (`[foo]`) are not static.
    pub arg: Option<SimpleExpressionNode>,
    /// Modifiers (e.g., `.prevent`, `.stop`).
    pub modifiers: Vec<SmolStr>,
    /// Source location of the whole attribute.
    pub loc: SourceLocation,
}

impl DirectiveNode {
    /// The argument as a static string, if it is one.
    pub fn static_arg(&self) -> Option<&str> {
        self.arg
            .as_ref()
            .filter(|arg| arg.is_static)
            .map(|arg| arg.content.as_str())
    }
}

/// A text node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextNode {
    /// The text content, entity-decoded.
    pub content: String,
    /// Source location.
    pub loc: SourceLocation,
}

/// A comment node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CommentNode {
    /// The raw comment content.
    pub content: String,
    /// Source location.
    pub loc: SourceLocation,
}

/// An interpolation node ({{ expr }}).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InterpolationNode {
    /// The expression between the delimiters, trimmed.
    pub content: SimpleExpressionNode,
    /// Source location, including delimiters.
    pub loc: SourceLocation,
}

/// A conditional node (v-if/v-else-if/v-else).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IfNode {
    /// Branches of the conditional.
    pub branches: Vec<IfBranchNode>,
    /// Output node assigned by the v-if transform.
    pub codegen_node: Option<JsExpression>,
    /// Source location.
    pub loc: SourceLocation,
}

/// A branch in a conditional.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IfBranchNode {
    /// The condition (None for v-else).
    pub condition: Option<SimpleExpressionNode>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Source location.
    pub loc: SourceLocation,
}

/// A for loop node (v-for).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ForNode {
    /// The source expression (iterable).
    pub source: SimpleExpressionNode,
    /// The value alias.
    pub value_alias: Option<SimpleExpressionNode>,
    /// The key alias.
    pub key_alias: Option<SimpleExpressionNode>,
    /// The index alias.
    pub object_index_alias: Option<SimpleExpressionNode>,
    /// Child nodes.
    pub children: Vec<TemplateNode>,
    /// Output node assigned by the v-for transform.
    pub codegen_node: Option<JsExpression>,
    /// Source location.
    pub loc: SourceLocation,
}

/// An expression carried as opaque text.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SimpleExpressionNode {
    /// The raw expression text.
    pub content: String,
    /// Whether the content is a literal string rather than code.
    pub is_static: bool,
    /// Whether the value never changes between renders.
    pub is_constant: bool,
    /// Identifiers found by an expression-prefixing pass; `None` until one has run.
    pub identifiers: Option<Vec<SmolStr>>,
    /// Index into [`RootNode::hoists`] when this is a hoist placeholder.
    pub hoisted: Option<usize>,
    /// Source location.
    pub loc: SourceLocation,
}

impl SimpleExpressionNode {
    /// Create a new expression.
    pub fn new(content: impl Into<String>, is_static: bool, loc: SourceLocation) -> Self {
        Self {
            content: content.into(),
            is_static,
            is_constant: is_static,
            loc,
            ..Default::default()
        }
    }
}

/// A code generation node.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JsExpression {
    Simple(SimpleExpressionNode),
    Object(ObjectExpression),
    Array(ArrayExpression),
    Cache(CacheExpression),
    VNodeCall(Box<VNodeCall>),
}

impl JsExpression {
    pub fn loc(&self) -> &SourceLocation {
        match self {
            Self::Simple(exp) => &exp.loc,
            Self::Object(obj) => &obj.loc,
            Self::Array(arr) => &arr.loc,
            Self::Cache(cache) => cache.value.loc(),
            Self::VNodeCall(call) => &call.loc,
        }
    }
}

/// An object literal.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ObjectExpression {
    pub properties: Vec<Property>,
    pub loc: SourceLocation,
}

/// A `key: value` pair produced by directive transforms.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Property {
    pub key: SimpleExpressionNode,
    pub value: JsExpression,
}

/// An array literal.
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ArrayExpression {
    pub elements: Vec<JsExpression>,
    pub loc: SourceLocation,
}

/// A memoized sub-expression (`_cache[index] || (_cache[index] = value)`).
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CacheExpression {
    /// 1-based cache slot.
    pub index: u32,
    /// The cached value.
    pub value: Box<JsExpression>,
    /// Whether the cached value is a vnode (needs block tracking disabled).
    pub is_vnode: bool,
}

/// The tag argument of a vnode call.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VNodeTag {
    /// A runtime symbol such as `Fragment`.
    Helper(RuntimeHelper),
    /// A string tag or a resolved component variable.
    Name(String),
}

/// Children of a vnode call.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum VNodeChildren {
    /// The children of the node that owns the call, in order.
    Owner,
    /// A single expression (text content or a slots object).
    Expression(Box<JsExpression>),
}

/// A `createVNode`/`createBlock` call.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct VNodeCall {
    pub tag: VNodeTag,
    pub props: Option<Box<JsExpression>>,
    pub children: Option<VNodeChildren>,
    pub patch_flag: Option<PatchFlags>,
    pub dynamic_props: Option<String>,
    pub directives: Option<ArrayExpression>,
    /// Opened with `openBlock()` and created with `createBlock()`.
    pub is_block: bool,
    pub disable_tracking: bool,
    pub loc: SourceLocation,
}

impl VNodeCall {
    /// A plain (non-block) call with no props, children or flags.
    pub fn new(tag: VNodeTag, loc: SourceLocation) -> Self {
        Self {
            tag,
            props: None,
            children: None,
            patch_flag: None,
            dynamic_props: None,
            directives: None,
            is_block: false,
            disable_tracking: false,
            loc,
        }
    }
}
