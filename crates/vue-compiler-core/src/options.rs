//! Parser and transform configuration.
//!
//! Every option has a default, so `ParserOptions::default()` parses plain
//! HTML-ish templates and `TransformOptions::default()` runs a traversal
//! with no plugins.

use crate::ast::{ElementNode, Namespace};
use crate::error::CompilerError;
use crate::runtime_helpers::RuntimeHelper;
use crate::transform::{DirectiveTransform, HoistPass, NodeTransform};
use crate::utils;
use rustc_hash::FxHashMap;
use smol_str::SmolStr;
use std::fmt;

/// Lexical sub-grammar in effect while scanning an element's content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TextMode {
    /// Tags, entities and interpolations are recognized.
    #[default]
    Data,
    /// Entities and interpolations, no tags (`<textarea>`, `<title>`).
    RcData,
    /// Verbatim text up to the parent's end tag (`<script>`, `<style>`).
    RawText,
    /// Verbatim text up to `]]>`.
    CData,
    /// Inside an attribute value; entities decode in attribute flavor.
    AttributeValue,
}

pub type TagPredicate = Box<dyn Fn(&str) -> bool>;
pub type BuiltInComponentResolver = Box<dyn Fn(&str) -> Option<RuntimeHelper>>;
pub type NamespaceResolver = Box<dyn Fn(&str, Option<&ElementNode>) -> Namespace>;
pub type TextModeResolver = Box<dyn Fn(&ElementNode, Option<&ElementNode>) -> TextMode>;
pub type EntityDecoder = Box<dyn Fn(&str, bool) -> String>;
pub type ErrorHandler = Box<dyn Fn(&CompilerError)>;

/// Options for [`base_parse`](crate::parser::base_parse).
pub struct ParserOptions {
    /// Interpolation open and close markers.
    pub delimiters: (String, String),
    /// Elements that never have content (`<br>`, `<img>`).
    pub is_void_tag: TagPredicate,
    /// Elements whose whitespace is preserved (`<pre>`).
    pub is_pre_tag: TagPredicate,
    /// Tags left alone by component classification.
    pub is_custom_element: TagPredicate,
    /// Platform-native tags. When set, every other tag is a component.
    pub is_native_tag: Option<TagPredicate>,
    /// Platform built-ins such as `Transition`.
    pub is_built_in_component: BuiltInComponentResolver,
    /// Resolve an element's namespace from its tag and parent.
    pub get_namespace: NamespaceResolver,
    /// Resolve the text mode of an element's content.
    pub get_text_mode: TextModeResolver,
    /// Decode character references in text (second argument: inside an attribute).
    pub decode_entities: EntityDecoder,
    /// Keep comment nodes in the tree.
    pub comments: bool,
    /// Called for every diagnostic, in source order.
    pub on_error: Option<ErrorHandler>,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            delimiters: ("{{".to_string(), "}}".to_string()),
            is_void_tag: Box::new(|_| false),
            is_pre_tag: Box::new(|_| false),
            is_custom_element: Box::new(|_| false),
            is_native_tag: None,
            is_built_in_component: Box::new(|_| None),
            get_namespace: Box::new(|_, _| Namespace::Html),
            get_text_mode: Box::new(|_, _| TextMode::Data),
            decode_entities: Box::new(utils::decode_entities),
            comments: cfg!(debug_assertions),
            on_error: None,
        }
    }
}

impl fmt::Debug for ParserOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ParserOptions")
            .field("delimiters", &self.delimiters)
            .field("is_native_tag", &self.is_native_tag.is_some())
            .field("comments", &self.comments)
            .field("on_error", &self.on_error.is_some())
            .finish_non_exhaustive()
    }
}

/// Options for [`transform`](crate::transform::transform).
pub struct TransformOptions {
    /// Node transforms, applied in order on entry.
    pub node_transforms: Vec<NodeTransform>,
    /// Directive transforms keyed by directive name, consulted by element plugins.
    pub directive_transforms: FxHashMap<SmolStr, DirectiveTransform>,
    /// Rewrite identifiers in expressions to `_ctx.` accesses.
    pub prefix_identifiers: bool,
    /// Run `hoist_pass` after traversal.
    pub hoist_static: bool,
    /// Static hoisting analysis run when `hoist_static` is set.
    pub hoist_pass: Option<HoistPass>,
    /// Cache inline event handlers.
    pub cache_handlers: bool,
    /// Compile for server rendering. Skips root codegen.
    pub ssr: bool,
    /// Platform built-in components.
    pub is_built_in_component: BuiltInComponentResolver,
    /// Extra expression syntax plugins, passed through to expression passes.
    pub expression_plugins: Vec<String>,
    /// Scope id for scoped styles.
    pub scope_id: Option<String>,
    /// Called for every diagnostic reported through the context.
    pub on_error: Option<ErrorHandler>,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            node_transforms: Vec::new(),
            directive_transforms: FxHashMap::default(),
            prefix_identifiers: false,
            hoist_static: false,
            hoist_pass: None,
            cache_handlers: false,
            ssr: false,
            is_built_in_component: Box::new(|_| None),
            expression_plugins: Vec::new(),
            scope_id: None,
            on_error: None,
        }
    }
}

impl fmt::Debug for TransformOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut directives: Vec<&str> = self
            .directive_transforms
            .keys()
            .map(SmolStr::as_str)
            .collect();
        directives.sort_unstable();
        f.debug_struct("TransformOptions")
            .field("node_transforms", &self.node_transforms.len())
            .field("directive_transforms", &directives)
            .field("prefix_identifiers", &self.prefix_identifiers)
            .field("hoist_static", &self.hoist_static)
            .field("cache_handlers", &self.cache_handlers)
            .field("ssr", &self.ssr)
            .field("expression_plugins", &self.expression_plugins)
            .field("scope_id", &self.scope_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_defaults() {
        let options = ParserOptions::default();
        assert_eq!(options.delimiters, ("{{".to_string(), "}}".to_string()));
        assert!(!(options.is_void_tag)("br"));
        assert!(options.is_native_tag.is_none());
        assert_eq!((options.decode_entities)("&lt;p&gt;", false), "<p>");
        assert_eq!(options.comments, cfg!(debug_assertions));
    }

    #[test]
    fn test_debug_lists_directive_names() {
        let mut options = TransformOptions::default();
        options
            .directive_transforms
            .insert("on".into(), Box::new(|_, _, _, _| Default::default()));
        options
            .directive_transforms
            .insert("bind".into(), Box::new(|_, _, _, _| Default::default()));
        let debug = format!("{options:?}");
        assert!(debug.contains(r#"directive_transforms: ["bind", "on"]"#));
    }
}
