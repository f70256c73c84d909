//! Vue template compiler core.
//!
//! Parses Vue template syntax into an AST with exact source locations and
//! runs it through a pluggable transform pipeline that prepares it for
//! code generation.

pub mod ast;
pub mod error;
pub mod options;
pub mod parser;
pub mod runtime_helpers;
pub mod transform;
pub mod utils;

pub use ast::*;
pub use error::{CompileResult, CompilerError, ErrorCode};
pub use options::{ParserOptions, TextMode, TransformOptions};
pub use parser::{base_parse, ParseOutput};
pub use runtime_helpers::{PatchFlags, RuntimeHelper};
pub use transform::{
    create_structural_directive_transform, transform, DirectiveTransform,
    DirectiveTransformResult, NodeCursor, NodeTransform, TransformContext, TransformExit,
};

/// A transformed template and every diagnostic produced along the way.
#[derive(Debug)]
pub struct CompileOutput {
    pub root: RootNode,
    /// Parse diagnostics followed by transform diagnostics.
    pub errors: Vec<CompilerError>,
}

impl CompileOutput {
    /// Fail on the first diagnostic.
    pub fn into_result(self) -> CompileResult<RootNode> {
        match self.errors.into_iter().next() {
            Some(err) => Err(err),
            None => Ok(self.root),
        }
    }
}

/// Parse `source` and transform the result.
pub fn base_compile(
    source: &str,
    parser_options: &ParserOptions,
    transform_options: &TransformOptions,
) -> CompileOutput {
    let ParseOutput { mut root, mut errors } = base_parse(source, parser_options);
    errors.extend(transform(&mut root, transform_options));
    CompileOutput { root, errors }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::exit_fn;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_compile_simple_template() {
        let output = base_compile(
            "<div>Hello {{ name }}</div>",
            &ParserOptions::default(),
            &TransformOptions::default(),
        );
        assert!(output.errors.is_empty());
        assert_eq!(output.root.children.len(), 1);
        assert!(output.root.helpers.contains(&RuntimeHelper::ToDisplayString));
        assert!(matches!(output.root.codegen_node, Some(RootCodegen::Child)));
    }

    #[test]
    fn test_compile_collects_parse_then_transform_errors() {
        let report: NodeTransform = Box::new(|cursor, ctx| {
            if let Some(el) = cursor.element() {
                if el.has_directive("model") {
                    let loc = el.loc.clone();
                    ctx.on_error(CompilerError::new(ErrorCode::VModelNoExpression, Some(loc)));
                }
            }
            TransformExit::None
        });
        let transform_options = TransformOptions {
            node_transforms: vec![report],
            ..Default::default()
        };
        let output = base_compile(
            "<input v-model/><div>",
            &ParserOptions::default(),
            &transform_options,
        );
        let codes: Vec<_> = output.errors.iter().map(|e| e.code).collect();
        assert_eq!(codes, vec![ErrorCode::MissingEndTag, ErrorCode::VModelNoExpression]);

        let err = output.into_result().unwrap_err();
        assert_eq!(err.code, ErrorCode::MissingEndTag);
    }

    #[test]
    fn test_compile_slots() {
        let source = r#"<MyComponent>
            <template #default="{ item }">
                {{ item.name }}
            </template>
        </MyComponent>"#;
        let wrap: NodeTransform = Box::new(|cursor, _| {
            if cursor.element().is_some_and(|el| el.tag_type == ElementType::Component) {
                TransformExit::Exit(exit_fn(|cursor, ctx| {
                    if let Some(el) = cursor.element_mut() {
                        let tag = VNodeTag::Name("_component_MyComponent".into());
                        let call = ctx.create_vnode_call(VNodeCall::new(tag, el.loc.clone()));
                        el.codegen_node = Some(JsExpression::VNodeCall(Box::new(call)));
                    }
                }))
            } else {
                TransformExit::None
            }
        });
        let transform_options = TransformOptions {
            node_transforms: vec![wrap],
            ..Default::default()
        };
        let root = base_compile(source, &ParserOptions::default(), &transform_options)
            .into_result()
            .unwrap();
        let component = root.children[0].as_element().unwrap();
        assert_eq!(component.tag_type, ElementType::Component);
        let template = component.children[0].as_element().unwrap();
        assert_eq!(template.tag_type, ElementType::Template);
        assert!(matches!(root.codegen_node, Some(RootCodegen::Element)));
        assert!(root.helpers.contains(&RuntimeHelper::CreateBlock));
    }
}
