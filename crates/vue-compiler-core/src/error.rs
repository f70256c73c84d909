//! Diagnostics reported while parsing and transforming templates.

use source_map::{Position, SourceLocation};
use std::fmt;

/// Result type for compilation operations.
pub type CompileResult<T> = Result<T, CompilerError>;

/// A diagnostic produced during template compilation.
///
/// Parse diagnostics are never fatal: the parser records them and keeps
/// going, so a complete tree is always produced.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct CompilerError {
    /// The error code.
    pub code: ErrorCode,
    /// Where the error occurred, if known.
    pub loc: Option<SourceLocation>,
    /// The error message.
    pub message: String,
}

impl CompilerError {
    /// Create an error with the default message for `code`.
    pub fn new(code: ErrorCode, loc: Option<SourceLocation>) -> Self {
        Self {
            code,
            loc,
            message: code.message().to_string(),
        }
    }

    /// Create an error at a single position.
    pub fn at(code: ErrorCode, pos: Position) -> Self {
        Self::new(code, Some(SourceLocation::point(pos)))
    }

    /// Append extra detail to the default message.
    pub fn with_detail(mut self, detail: impl fmt::Display) -> Self {
        self.message = format!("{}{}", self.message, detail);
        self
    }

    /// The byte offset the error points at, if located.
    pub fn offset(&self) -> Option<u32> {
        self.loc.as_ref().map(|loc| loc.start.offset)
    }
}

/// Error codes for template compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorCode {
    // HTML parse errors
    AbruptClosingOfEmptyComment,
    CdataInHtmlContent,
    DuplicateAttribute,
    EndTagWithAttributes,
    EndTagWithTrailingSolidus,
    EofBeforeTagName,
    EofInCdata,
    EofInComment,
    EofInScriptHtmlCommentLikeText,
    EofInTag,
    IncorrectlyClosedComment,
    IncorrectlyOpenedComment,
    InvalidFirstCharacterOfTagName,
    MissingAttributeValue,
    MissingEndTagName,
    MissingWhitespaceBetweenAttributes,
    NestedComment,
    UnexpectedCharacterInAttributeName,
    UnexpectedCharacterInUnquotedAttributeValue,
    UnexpectedEqualsSignBeforeAttributeName,
    UnexpectedQuestionMarkInsteadOfTagName,
    UnexpectedSolidusInTag,

    // Template-specific parse errors
    InvalidEndTag,
    MissingEndTag,
    MissingInterpolationEnd,
    MissingDynamicDirectiveArgumentEnd,

    // Transform errors reported by directive plugins
    VIfNoExpression,
    VElseNoAdjacentIf,
    VForNoExpression,
    VForMalformedExpression,
    VBindNoExpression,
    VOnNoExpression,
    VSlotMisplaced,
    VModelNoExpression,
    InvalidExpression,
}

impl ErrorCode {
    /// Get the error code as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AbruptClosingOfEmptyComment => "abrupt-closing-of-empty-comment",
            Self::CdataInHtmlContent => "cdata-in-html-content",
            Self::DuplicateAttribute => "duplicate-attribute",
            Self::EndTagWithAttributes => "end-tag-with-attributes",
            Self::EndTagWithTrailingSolidus => "end-tag-with-trailing-solidus",
            Self::EofBeforeTagName => "eof-before-tag-name",
            Self::EofInCdata => "eof-in-cdata",
            Self::EofInComment => "eof-in-comment",
            Self::EofInScriptHtmlCommentLikeText => "eof-in-script-html-comment-like-text",
            Self::EofInTag => "eof-in-tag",
            Self::IncorrectlyClosedComment => "incorrectly-closed-comment",
            Self::IncorrectlyOpenedComment => "incorrectly-opened-comment",
            Self::InvalidFirstCharacterOfTagName => "invalid-first-character-of-tag-name",
            Self::MissingAttributeValue => "missing-attribute-value",
            Self::MissingEndTagName => "missing-end-tag-name",
            Self::MissingWhitespaceBetweenAttributes => "missing-whitespace-between-attributes",
            Self::NestedComment => "nested-comment",
            Self::UnexpectedCharacterInAttributeName => "unexpected-character-in-attribute-name",
            Self::UnexpectedCharacterInUnquotedAttributeValue => {
                "unexpected-character-in-unquoted-attribute-value"
            }
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "unexpected-equals-sign-before-attribute-name"
            }
            Self::UnexpectedQuestionMarkInsteadOfTagName => {
                "unexpected-question-mark-instead-of-tag-name"
            }
            Self::UnexpectedSolidusInTag => "unexpected-solidus-in-tag",
            Self::InvalidEndTag => "x-invalid-end-tag",
            Self::MissingEndTag => "x-missing-end-tag",
            Self::MissingInterpolationEnd => "x-missing-interpolation-end",
            Self::MissingDynamicDirectiveArgumentEnd => "x-missing-dynamic-directive-argument-end",
            Self::VIfNoExpression => "x-v-if-no-expression",
            Self::VElseNoAdjacentIf => "x-v-else-no-adjacent-if",
            Self::VForNoExpression => "x-v-for-no-expression",
            Self::VForMalformedExpression => "x-v-for-malformed-expression",
            Self::VBindNoExpression => "x-v-bind-no-expression",
            Self::VOnNoExpression => "x-v-on-no-expression",
            Self::VSlotMisplaced => "x-v-slot-misplaced",
            Self::VModelNoExpression => "x-v-model-no-expression",
            Self::InvalidExpression => "x-invalid-expression",
        }
    }

    /// The default human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::AbruptClosingOfEmptyComment => "Illegal comment.",
            Self::CdataInHtmlContent => "CDATA section is allowed only in XML context.",
            Self::DuplicateAttribute => "Duplicate attribute.",
            Self::EndTagWithAttributes => "End tag cannot have attributes.",
            Self::EndTagWithTrailingSolidus => "Illegal '/' in tags.",
            Self::EofBeforeTagName => "Unexpected EOF in tag.",
            Self::EofInCdata => "Unexpected EOF in CDATA section.",
            Self::EofInComment => "Unexpected EOF in comment.",
            Self::EofInScriptHtmlCommentLikeText => "Unexpected EOF in script.",
            Self::EofInTag => "Unexpected EOF in tag.",
            Self::IncorrectlyClosedComment => "Incorrectly closed comment.",
            Self::IncorrectlyOpenedComment => "Incorrectly opened comment.",
            Self::InvalidFirstCharacterOfTagName => "Illegal tag name. Use '&lt;' to print '<'.",
            Self::MissingAttributeValue => "Attribute value was expected.",
            Self::MissingEndTagName => "End tag name was expected.",
            Self::MissingWhitespaceBetweenAttributes => "Whitespace was expected.",
            Self::NestedComment => "Unexpected '<!--' in comment.",
            Self::UnexpectedCharacterInAttributeName => {
                "Attribute name cannot contain U+0022 (\"), U+0027 ('), and U+003C (<)."
            }
            Self::UnexpectedCharacterInUnquotedAttributeValue => {
                "Unquoted attribute value cannot contain U+0022 (\"), U+0027 ('), U+003C (<), U+003D (=), and U+0060 (`)."
            }
            Self::UnexpectedEqualsSignBeforeAttributeName => {
                "Attribute name cannot start with '='."
            }
            Self::UnexpectedQuestionMarkInsteadOfTagName => "'<?' is allowed only in XML context.",
            Self::UnexpectedSolidusInTag => "Illegal '/' in tags.",
            Self::InvalidEndTag => "Invalid end tag.",
            Self::MissingEndTag => "Element is missing end tag.",
            Self::MissingInterpolationEnd => "Interpolation end sign was not found.",
            Self::MissingDynamicDirectiveArgumentEnd => {
                "End bracket for dynamic directive argument was not found. Note that dynamic directive argument cannot contain spaces."
            }
            Self::VIfNoExpression => "v-if/v-else-if is missing expression.",
            Self::VElseNoAdjacentIf => "v-else/v-else-if has no adjacent v-if.",
            Self::VForNoExpression => "v-for is missing expression.",
            Self::VForMalformedExpression => "v-for has invalid expression.",
            Self::VBindNoExpression => "v-bind is missing expression.",
            Self::VOnNoExpression => "v-on is missing expression.",
            Self::VSlotMisplaced => "v-slot can only be used on components or <template> tags.",
            Self::VModelNoExpression => "v-model is missing expression.",
            Self::InvalidExpression => "Error parsing JavaScript expression: ",
        }
    }

    /// Whether this code is produced by the parser (as opposed to a transform plugin).
    pub fn is_parse_error(&self) -> bool {
        (*self as u8) <= (Self::MissingDynamicDirectiveArgumentEnd as u8)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_message() {
        let err = CompilerError::at(ErrorCode::DuplicateAttribute, Position::START);
        insta::assert_snapshot!(err.to_string(), @"Duplicate attribute.");
        assert_eq!(err.offset(), Some(0));
    }

    #[test]
    fn test_with_detail() {
        let err = CompilerError::new(ErrorCode::InvalidExpression, None).with_detail("foo(");
        insta::assert_snapshot!(err.to_string(), @"Error parsing JavaScript expression: foo(");
        assert_eq!(err.offset(), None);
    }

    #[test]
    fn test_code_strings() {
        assert_eq!(ErrorCode::MissingEndTag.as_str(), "x-missing-end-tag");
        assert_eq!(ErrorCode::EofInTag.to_string(), "eof-in-tag");
    }

    #[test]
    fn test_parse_error_classification() {
        assert!(ErrorCode::AbruptClosingOfEmptyComment.is_parse_error());
        assert!(ErrorCode::MissingDynamicDirectiveArgumentEnd.is_parse_error());
        assert!(!ErrorCode::VIfNoExpression.is_parse_error());
    }
}
