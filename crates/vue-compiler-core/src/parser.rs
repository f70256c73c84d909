//! Parser for Vue templates.
//!
//! A recursive-descent parser driven by [`TextMode`]: the children loop
//! decides what the remaining source starts with (interpolation, tag,
//! comment or text) and stops at a mode-specific end condition. Malformed
//! input never aborts the parse; every problem is reported as a diagnostic
//! and the parser falls back to a safe construct.

use crate::ast::*;
use crate::error::{CompilerError, ErrorCode};
use crate::options::{ParserOptions, TextMode};
use crate::utils::{
    condense_whitespace, is_all_whitespace, is_core_component, is_special_template_directive,
    is_tag_terminator, is_whitespace,
};
use rustc_hash::FxHashSet;
use smol_str::SmolStr;
use source_map::{Position, SourceLocation};
use tracing::{debug, trace};

/// Result of parsing a template.
#[derive(Debug)]
pub struct ParseOutput {
    /// The parsed tree. Always complete, even for invalid input.
    pub root: RootNode,
    /// Diagnostics in source order.
    pub errors: Vec<CompilerError>,
}

/// Parse a template into an AST.
pub fn base_parse(source: &str, options: &ParserOptions) -> ParseOutput {
    debug!(len = source.len(), "parsing template");
    let mut parser = Parser::new(source, options);
    let start = parser.cursor();
    let children = parser.parse_children(TextMode::Data, &mut Vec::new());
    let root = RootNode::new(children, parser.selection(start));
    debug!(
        children = root.children.len(),
        errors = parser.errors.len(),
        "parsed template"
    );
    ParseOutput {
        root,
        errors: parser.errors,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum TagType {
    Start,
    End,
}

/// A parsed attribute value.
struct AttributeValue {
    content: String,
    /// Location including quotes.
    loc: SourceLocation,
    /// Location of the text between the quotes.
    inner: SourceLocation,
}

/// Parser state for one `base_parse` call.
struct Parser<'a> {
    options: &'a ParserOptions,
    original: &'a str,
    /// Unconsumed source.
    source: &'a str,
    pos: Position,
    in_pre: bool,
    in_v_pre: bool,
    errors: Vec<CompilerError>,
    /// Diagnostics already forwarded to `on_error`.
    notified: usize,
    /// Hold `on_error` notifications while an attribute list may still be reparsed.
    buffering: bool,
}

impl<'a> Parser<'a> {
    fn new(source: &'a str, options: &'a ParserOptions) -> Self {
        Self {
            options,
            original: source,
            source,
            pos: Position::START,
            in_pre: false,
            in_v_pre: false,
            errors: Vec::new(),
            notified: 0,
            buffering: false,
        }
    }

    #[inline]
    fn cursor(&self) -> Position {
        self.pos
    }

    fn selection(&self, start: Position) -> SourceLocation {
        SourceLocation::new(self.original, start, self.pos)
    }

    fn advance_by(&mut self, len: usize) {
        self.pos.advance(self.source, len);
        self.source = &self.source[len..];
    }

    fn advance_spaces(&mut self) {
        let len = self
            .source
            .bytes()
            .take_while(|&b| is_whitespace(b))
            .count();
        if len > 0 {
            self.advance_by(len);
        }
    }

    /// Report `code` at `offset` bytes past the cursor.
    fn emit_error(&mut self, code: ErrorCode, offset: usize) {
        let pos = self.pos.advanced(self.source, offset);
        self.emit_error_at(code, pos);
    }

    fn emit_error_at(&mut self, code: ErrorCode, pos: Position) {
        trace!(code = %code, offset = pos.offset, "parse error");
        self.errors.push(CompilerError::at(code, pos));
        if !self.buffering {
            self.flush_errors();
        }
    }

    fn flush_errors(&mut self) {
        if let Some(on_error) = &self.options.on_error {
            for err in &self.errors[self.notified..] {
                on_error(err);
            }
        }
        self.notified = self.errors.len();
    }

    fn is_end(&self, mode: TextMode, ancestors: &[ElementNode]) -> bool {
        let s = self.source;
        match mode {
            TextMode::Data => {
                if s.starts_with("</")
                    && ancestors
                        .iter()
                        .rev()
                        .any(|a| starts_with_end_tag_open(s, &a.tag))
                {
                    return true;
                }
            }
            TextMode::RcData | TextMode::RawText => {
                if let Some(parent) = ancestors.last() {
                    if starts_with_end_tag_open(s, &parent.tag) {
                        return true;
                    }
                }
            }
            TextMode::CData => {
                if s.starts_with("]]>") {
                    return true;
                }
            }
            TextMode::AttributeValue => {}
        }
        s.is_empty()
    }

    fn parse_children(
        &mut self,
        mode: TextMode,
        ancestors: &mut Vec<ElementNode>,
    ) -> Vec<TemplateNode> {
        let ns = ancestors.last().map_or(Namespace::Html, |p| p.ns);
        let mut nodes: Vec<TemplateNode> = Vec::new();

        while !self.is_end(mode, ancestors) {
            let s = self.source;
            let bytes = s.as_bytes();
            let mut parsed: Vec<TemplateNode> = Vec::new();

            if matches!(mode, TextMode::Data | TextMode::RcData) {
                if !self.in_v_pre && s.starts_with(self.options.delimiters.0.as_str()) {
                    if let Some(node) = self.parse_interpolation(mode) {
                        parsed.push(TemplateNode::Interpolation(node));
                    }
                } else if mode == TextMode::Data && bytes[0] == b'<' {
                    match bytes.get(1) {
                        None => self.emit_error(ErrorCode::EofBeforeTagName, 1),
                        Some(b'!') => {
                            if s.starts_with("<!--") {
                                parsed.push(TemplateNode::Comment(self.parse_comment()));
                            } else if s.starts_with("<!DOCTYPE") {
                                parsed.push(TemplateNode::Comment(self.parse_bogus_comment()));
                            } else if s.starts_with("<![CDATA[") {
                                if ns != Namespace::Html {
                                    parsed = self.parse_cdata(ancestors);
                                } else {
                                    self.emit_error(ErrorCode::CdataInHtmlContent, 0);
                                    parsed.push(TemplateNode::Comment(self.parse_bogus_comment()));
                                }
                            } else {
                                self.emit_error(ErrorCode::IncorrectlyOpenedComment, 0);
                                parsed.push(TemplateNode::Comment(self.parse_bogus_comment()));
                            }
                        }
                        Some(b'/') => match bytes.get(2) {
                            None => self.emit_error(ErrorCode::EofBeforeTagName, 2),
                            Some(b'>') => {
                                self.emit_error(ErrorCode::MissingEndTagName, 2);
                                self.advance_by(3);
                                continue;
                            }
                            Some(b) if b.is_ascii_alphabetic() => {
                                self.emit_error(ErrorCode::InvalidEndTag, 0);
                                self.parse_tag(TagType::End, ancestors.last());
                                continue;
                            }
                            Some(_) => {
                                self.emit_error(ErrorCode::InvalidFirstCharacterOfTagName, 2);
                                parsed.push(TemplateNode::Comment(self.parse_bogus_comment()));
                            }
                        },
                        Some(b) if b.is_ascii_alphabetic() => {
                            let element = self.parse_element(ancestors);
                            parsed.push(TemplateNode::Element(element));
                        }
                        Some(b'?') => {
                            self.emit_error(ErrorCode::UnexpectedQuestionMarkInsteadOfTagName, 1);
                            parsed.push(TemplateNode::Comment(self.parse_bogus_comment()));
                        }
                        Some(_) => self.emit_error(ErrorCode::InvalidFirstCharacterOfTagName, 1),
                    }
                }
            }

            // A recognized construct may still have produced nothing
            // (unterminated interpolation, stray `<`); treat it as text.
            if parsed.is_empty() && self.source.len() == s.len() {
                parsed.push(TemplateNode::Text(self.parse_text(mode)));
            }
            for node in parsed {
                push_node(&mut nodes, node);
            }
        }

        if mode != TextMode::RawText {
            if !self.in_pre {
                nodes = self.condense(nodes);
            } else if let Some(parent) = ancestors.last() {
                if (self.options.is_pre_tag)(&parent.tag) {
                    if let Some(TemplateNode::Text(first)) = nodes.first_mut() {
                        strip_leading_newline(&mut first.content);
                    }
                }
            }
        }
        nodes
    }

    /// Whitespace condensation for one children list.
    fn condense(&self, mut nodes: Vec<TemplateNode>) -> Vec<TemplateNode> {
        let mut keep = vec![true; nodes.len()];
        for i in 0..nodes.len() {
            match &nodes[i] {
                TemplateNode::Text(text) if is_all_whitespace(&text.content) => {
                    let prev = i.checked_sub(1).filter(|&p| keep[p]).map(|p| &nodes[p]);
                    let next = nodes.get(i + 1);
                    let drop = match (prev, next) {
                        (Some(prev), Some(next)) => {
                            prev.is_comment()
                                || next.is_comment()
                                || (prev.is_element()
                                    && next.is_element()
                                    && text.content.contains(['\r', '\n']))
                        }
                        _ => true,
                    };
                    if drop {
                        keep[i] = false;
                    } else if let TemplateNode::Text(text) = &mut nodes[i] {
                        text.content = " ".to_string();
                    }
                }
                TemplateNode::Text(_) => {
                    if let TemplateNode::Text(text) = &mut nodes[i] {
                        text.content = condense_whitespace(&text.content);
                    }
                }
                TemplateNode::Comment(_) if !self.options.comments => keep[i] = false,
                _ => {}
            }
        }
        nodes
            .into_iter()
            .zip(keep)
            .filter_map(|(node, keep)| keep.then_some(node))
            .collect()
    }

    fn parse_comment(&mut self) -> CommentNode {
        let start = self.cursor();
        let s = self.source;
        let content = match find_comment_close(s) {
            None => {
                let content = s.get(4..).unwrap_or_default().to_string();
                self.advance_by(s.len());
                self.emit_error(ErrorCode::EofInComment, 0);
                content
            }
            Some((close, incorrectly_closed)) => {
                if close <= 3 {
                    self.emit_error(ErrorCode::AbruptClosingOfEmptyComment, 0);
                }
                if incorrectly_closed {
                    self.emit_error(ErrorCode::IncorrectlyClosedComment, 0);
                }
                let content = s.get(4..close).unwrap_or_default().to_string();

                // Walk to every nested `<!--` so each diagnostic points at it.
                let body = &s[..close];
                let mut prev = 1;
                while let Some(found) = body[prev..].find("<!--") {
                    let nested = prev + found;
                    self.advance_by(nested - prev + 1);
                    if nested + 4 < body.len() {
                        self.emit_error(ErrorCode::NestedComment, 0);
                    }
                    prev = nested + 1;
                }
                let close_len = if incorrectly_closed { 4 } else { 3 };
                self.advance_by(close + close_len - prev + 1);
                content
            }
        };
        CommentNode {
            content,
            loc: self.selection(start),
        }
    }

    fn parse_bogus_comment(&mut self) -> CommentNode {
        let start = self.cursor();
        let s = self.source;
        let content_start = if s.as_bytes().get(1) == Some(&b'?') { 1 } else { 2 };
        let content = match s.find('>') {
            None => {
                let content = s.get(content_start..).unwrap_or_default().to_string();
                self.advance_by(s.len());
                content
            }
            Some(close) => {
                let content = s.get(content_start..close).unwrap_or_default().to_string();
                self.advance_by(close + 1);
                content
            }
        };
        CommentNode {
            content,
            loc: self.selection(start),
        }
    }

    /// `<![CDATA[ ... ]]>`; its text nodes land in the enclosing list.
    fn parse_cdata(&mut self, ancestors: &mut Vec<ElementNode>) -> Vec<TemplateNode> {
        self.advance_by("<![CDATA[".len());
        let nodes = self.parse_children(TextMode::CData, ancestors);
        if self.source.is_empty() {
            self.emit_error(ErrorCode::EofInCdata, 0);
        } else {
            self.advance_by("]]>".len());
        }
        nodes
    }

    fn parse_element(&mut self, ancestors: &mut Vec<ElementNode>) -> ElementNode {
        let was_in_pre = self.in_pre;
        let was_in_v_pre = self.in_v_pre;
        let element = self.parse_tag(TagType::Start, ancestors.last());
        let is_pre_boundary = self.in_pre && !was_in_pre;
        let is_v_pre_boundary = self.in_v_pre && !was_in_v_pre;

        if element.is_self_closing || (self.options.is_void_tag)(&element.tag) {
            if is_pre_boundary {
                self.in_pre = false;
            }
            if is_v_pre_boundary {
                self.in_v_pre = false;
            }
            return element;
        }

        let mode = (self.options.get_text_mode)(&element, ancestors.last());
        ancestors.push(element);
        let children = self.parse_children(mode, ancestors);
        let Some(mut element) = ancestors.pop() else {
            unreachable!("element pushed before parsing its children");
        };
        element.children = children;

        if starts_with_end_tag_open(self.source, &element.tag) {
            self.parse_tag(TagType::End, ancestors.last());
        } else {
            self.emit_error_at(ErrorCode::MissingEndTag, element.loc.start);
            if self.source.is_empty() && element.tag.eq_ignore_ascii_case("script") {
                let comment_like = element
                    .children
                    .first()
                    .is_some_and(|first| first.loc().source.starts_with("<!--"));
                if comment_like {
                    self.emit_error(ErrorCode::EofInScriptHtmlCommentLikeText, 0);
                }
            }
        }

        element.loc = self.selection(element.loc.start);
        if is_pre_boundary {
            self.in_pre = false;
        }
        if is_v_pre_boundary {
            self.in_v_pre = false;
        }
        element
    }

    /// Parse a start or end tag. End tags are consumed and their result ignored.
    fn parse_tag(&mut self, tag_type: TagType, parent: Option<&ElementNode>) -> ElementNode {
        let start = self.cursor();
        let prefix = if tag_type == TagType::End { 2 } else { 1 };
        let s = self.source;
        let name_len = s.as_bytes()[prefix..]
            .iter()
            .skip(1)
            .take_while(|&&b| !is_tag_terminator(b))
            .count()
            + 1;
        let tag = SmolStr::new(&s[prefix..prefix + name_len]);
        let ns = (self.options.get_namespace)(&tag, parent);

        self.advance_by(prefix + name_len);
        self.advance_spaces();

        // Snapshot for the single v-pre reparse.
        let snapshot = (self.pos, self.source);
        let mark = self.errors.len();
        self.buffering = true;
        let mut props = self.parse_attributes(tag_type);
        if tag_type == TagType::Start {
            if (self.options.is_pre_tag)(&tag) {
                self.in_pre = true;
            }
            let has_v_pre = props
                .iter()
                .any(|p| matches!(p, ElementProp::Directive(dir) if dir.name == "pre"));
            if !self.in_v_pre && has_v_pre {
                self.in_v_pre = true;
                (self.pos, self.source) = snapshot;
                self.errors.truncate(mark);
                props = self.parse_attributes(tag_type);
                props.retain(|p| p.name() != "v-pre");
            }
        }
        self.buffering = false;
        self.flush_errors();

        let mut is_self_closing = false;
        if self.source.is_empty() {
            self.emit_error(ErrorCode::EofInTag, 0);
        } else {
            is_self_closing = self.source.starts_with("/>");
            if tag_type == TagType::End && is_self_closing {
                self.emit_error(ErrorCode::EndTagWithTrailingSolidus, 0);
            }
            self.advance_by(if is_self_closing { 2 } else { 1 });
        }

        let element_type = self.classify(&tag, &props);
        ElementNode {
            ns,
            tag,
            tag_type: element_type,
            props,
            children: Vec::new(),
            is_self_closing,
            codegen_node: None,
            loc: self.selection(start),
        }
    }

    fn classify(&self, tag: &str, props: &[ElementProp]) -> ElementType {
        let options = self.options;
        if self.in_v_pre || (options.is_custom_element)(tag) {
            return ElementType::Plain;
        }
        if tag == "slot" {
            return ElementType::Slot;
        }
        let is_structural_template = tag == "template"
            && props.iter().any(|p| {
                matches!(p, ElementProp::Directive(dir) if is_special_template_directive(&dir.name))
            });
        if is_structural_template {
            return ElementType::Template;
        }
        let has_v_is = props
            .iter()
            .any(|p| matches!(p, ElementProp::Directive(dir) if dir.name == "is"));
        let is_component = has_v_is
            || is_core_component(tag).is_some()
            || (options.is_built_in_component)(tag).is_some()
            || tag.starts_with(|c: char| c.is_ascii_uppercase())
            || tag == "component"
            || options
                .is_native_tag
                .as_ref()
                .is_some_and(|is_native| !is_native(tag));
        if is_component {
            ElementType::Component
        } else {
            ElementType::Plain
        }
    }

    fn parse_attributes(&mut self, tag_type: TagType) -> Vec<ElementProp> {
        let mut props = Vec::new();
        let mut names = FxHashSet::default();
        while !self.source.is_empty()
            && !self.source.starts_with('>')
            && !self.source.starts_with("/>")
        {
            if self.source.starts_with('/') {
                self.emit_error(ErrorCode::UnexpectedSolidusInTag, 0);
                self.advance_by(1);
                self.advance_spaces();
                continue;
            }
            if tag_type == TagType::End {
                self.emit_error(ErrorCode::EndTagWithAttributes, 0);
            }

            let attr = self.parse_attribute(&mut names);
            if tag_type == TagType::Start {
                props.push(attr);
            }

            if self
                .source
                .bytes()
                .next()
                .is_some_and(|b| !is_tag_terminator(b))
            {
                self.emit_error(ErrorCode::MissingWhitespaceBetweenAttributes, 0);
            }
            self.advance_spaces();
        }
        props
    }

    fn parse_attribute(&mut self, names: &mut FxHashSet<&'a str>) -> ElementProp {
        let start = self.cursor();
        let s = self.source;
        // The first character may be `=`; later ones may not.
        let first_len = s.chars().next().map_or(0, char::len_utf8);
        let name_len = first_len
            + s.as_bytes()[first_len..]
                .iter()
                .take_while(|&&b| !is_tag_terminator(b) && b != b'=')
                .count();
        let name: &'a str = &s[..name_len];

        if !names.insert(name) {
            self.emit_error(ErrorCode::DuplicateAttribute, 0);
        }
        if name.starts_with('=') {
            self.emit_error(ErrorCode::UnexpectedEqualsSignBeforeAttributeName, 0);
        }
        for (i, b) in name.bytes().enumerate() {
            if matches!(b, b'"' | b'\'' | b'<') {
                self.emit_error(ErrorCode::UnexpectedCharacterInAttributeName, i);
            }
        }
        self.advance_by(name_len);

        let mut value = None;
        let ws = self
            .source
            .bytes()
            .take_while(|&b| is_whitespace(b))
            .count();
        if self.source.as_bytes().get(ws) == Some(&b'=') {
            self.advance_spaces();
            self.advance_by(1);
            self.advance_spaces();
            value = self.parse_attribute_value();
            if value.is_none() {
                self.emit_error(ErrorCode::MissingAttributeValue, 0);
            }
        }
        let loc = self.selection(start);

        if !self.in_v_pre && starts_with_directive_marker(name) {
            let parts = split_directive_name(name);
            let dir_name = parts.name.unwrap_or(match name.as_bytes()[0] {
                b':' => "bind",
                b'@' => "on",
                _ => "slot",
            });
            let is_slot = dir_name == "slot";

            let arg = parts.arg.map(|(offset, raw)| {
                let mut len = raw.len();
                if is_slot {
                    len += parts.rest.map_or(0, str::len);
                }
                let arg_start = start.advanced(name, offset);
                let arg_end = start.advanced(name, offset + len);
                let (content, is_static) = if raw.starts_with('[') {
                    if !raw.ends_with(']') {
                        self.emit_error(ErrorCode::MissingDynamicDirectiveArgumentEnd, 0);
                    }
                    (dynamic_arg_content(raw).to_string(), false)
                } else if is_slot {
                    (format!("{raw}{}", parts.rest.unwrap_or_default()), true)
                } else {
                    (raw.to_string(), true)
                };
                SimpleExpressionNode::new(
                    content,
                    is_static,
                    SourceLocation::new(self.original, arg_start, arg_end),
                )
            });

            let modifiers = parts
                .rest
                .map(|rest| {
                    rest.get(1..)
                        .unwrap_or_default()
                        .split('.')
                        .map(SmolStr::new)
                        .collect()
                })
                .unwrap_or_default();

            return ElementProp::Directive(DirectiveNode {
                name: dir_name.into(),
                exp: value.map(|v| SimpleExpressionNode::new(v.content, false, v.inner)),
                arg,
                modifiers,
                loc,
            });
        }

        ElementProp::Attribute(AttributeNode {
            name: name.into(),
            value: value.map(|v| TextNode {
                content: v.content,
                loc: v.loc,
            }),
            loc,
        })
    }

    fn parse_attribute_value(&mut self) -> Option<AttributeValue> {
        let start = self.cursor();
        let quote = self.source.bytes().next()?;
        let (content, inner) = if quote == b'"' || quote == b'\'' {
            self.advance_by(1);
            let inner_start = self.cursor();
            match self.source.find(quote as char) {
                None => {
                    let content = self.parse_text_data(self.source.len(), TextMode::AttributeValue);
                    (content, self.selection(inner_start))
                }
                Some(close) => {
                    let content = self.parse_text_data(close, TextMode::AttributeValue);
                    let inner = self.selection(inner_start);
                    self.advance_by(1);
                    (content, inner)
                }
            }
        } else {
            let source = self.source;
            let len = source
                .bytes()
                .take_while(|&b| !is_whitespace(b) && b != b'>')
                .count();
            if len == 0 {
                return None;
            }
            for (i, b) in source.as_bytes()[..len].iter().enumerate() {
                if matches!(b, b'"' | b'\'' | b'<' | b'=' | b'`') {
                    self.emit_error(ErrorCode::UnexpectedCharacterInUnquotedAttributeValue, i);
                }
            }
            let content = self.parse_text_data(len, TextMode::AttributeValue);
            (content, self.selection(start))
        };
        Some(AttributeValue {
            content,
            loc: self.selection(start),
            inner,
        })
    }

    /// `{{ exp }}`. Returns `None` (after a diagnostic) when the close marker is missing.
    fn parse_interpolation(&mut self, mode: TextMode) -> Option<InterpolationNode> {
        let (open, close) = {
            let options = self.options;
            (options.delimiters.0.as_str(), options.delimiters.1.as_str())
        };
        let Some(close_index) = self.source[open.len()..]
            .find(close)
            .map(|i| i + open.len())
        else {
            self.emit_error(ErrorCode::MissingInterpolationEnd, 0);
            return None;
        };

        let start = self.cursor();
        self.advance_by(open.len());
        let raw_len = close_index - open.len();
        let raw = &self.source[..raw_len];
        let leading = raw.len() - raw.trim_start().len();
        let trailing = raw.len() - raw.trim_end().len();
        let inner_start = self.pos.advanced(raw, leading);
        let inner_end = self.pos.advanced(raw, raw_len.saturating_sub(trailing).max(leading));

        let pre_trim = self.parse_text_data(raw_len, mode);
        let content = pre_trim.trim().to_string();
        self.advance_by(close.len());

        Some(InterpolationNode {
            content: SimpleExpressionNode::new(
                content,
                false,
                SourceLocation::new(self.original, inner_start, inner_end),
            ),
            loc: self.selection(start),
        })
    }

    fn parse_text(&mut self, mode: TextMode) -> TextNode {
        let s = self.source;
        let from = s.chars().next().map_or(0, char::len_utf8);
        let open = self.options.delimiters.0.as_str();
        let mut end = s.len();
        let mut tokens = vec!["<", open];
        if mode == TextMode::CData {
            tokens.push("]]>");
        }
        for token in tokens.into_iter().filter(|t| !t.is_empty()) {
            if let Some(i) = s[from..].find(token) {
                end = end.min(from + i);
            }
        }

        let start = self.cursor();
        let content = self.parse_text_data(end, mode);
        TextNode {
            content,
            loc: self.selection(start),
        }
    }

    /// Consume `len` bytes of text, decoding entities where the mode allows.
    fn parse_text_data(&mut self, len: usize, mode: TextMode) -> String {
        let source = self.source;
        let raw = &source[..len];
        self.advance_by(len);
        if matches!(mode, TextMode::RawText | TextMode::CData) || !raw.contains('&') {
            raw.to_string()
        } else {
            (self.options.decode_entities)(raw, mode == TextMode::AttributeValue)
        }
    }
}

/// Append `node`, merging it into a preceding text node it directly follows.
fn push_node(nodes: &mut Vec<TemplateNode>, node: TemplateNode) {
    if let TemplateNode::Text(text) = &node {
        if let Some(TemplateNode::Text(prev)) = nodes.last_mut() {
            if prev.loc.end.offset == text.loc.start.offset {
                prev.content.push_str(&text.content);
                prev.loc.end = text.loc.end;
                prev.loc.source.push_str(&text.loc.source);
                return;
            }
        }
    }
    nodes.push(node);
}

fn strip_leading_newline(content: &mut String) {
    if content.starts_with("\r\n") {
        content.drain(..2);
    } else if content.starts_with('\n') {
        content.remove(0);
    }
}

/// `</tag` followed by whitespace, `/`, `>` or end of input.
fn starts_with_end_tag_open(source: &str, tag: &str) -> bool {
    let bytes = source.as_bytes();
    let end = 2 + tag.len();
    source.starts_with("</")
        && bytes.len() >= end
        && bytes[2..end].eq_ignore_ascii_case(tag.as_bytes())
        && bytes.get(end).map_or(true, |&b| is_tag_terminator(b))
}

/// Offset of the first `-->` or `--!>`, and whether it was the `--!>` form.
fn find_comment_close(s: &str) -> Option<(usize, bool)> {
    let mut from = 0;
    while let Some(found) = s[from..].find("--") {
        let at = from + found;
        let after = &s.as_bytes()[at + 2..];
        if after.starts_with(b">") {
            return Some((at, false));
        }
        if after.starts_with(b"!>") {
            return Some((at, true));
        }
        from = at + 1;
    }
    None
}

fn starts_with_directive_marker(name: &str) -> bool {
    name.starts_with("v-") || name.starts_with([':', '@', '#'])
}

/// Pieces of a directive attribute name.
#[derive(Debug, Default, PartialEq, Eq)]
struct DirectiveNameParts<'s> {
    /// Name after `v-`, when spelled out.
    name: Option<&'s str>,
    /// Byte offset within the attribute name, and the raw argument.
    arg: Option<(usize, &'s str)>,
    /// Everything after the argument (`.mod1.mod2`).
    rest: Option<&'s str>,
}

/// Split `v-name:arg.mods`, `:arg`, `@arg` or `#arg`.
///
/// `name` is `[A-Za-z0-9-]+` after `v-`. The argument follows `:` (or a
/// leading `@`/`#`) and is either a bracketed dynamic argument or a run
/// without `.`. Whatever remains is the modifier list.
fn split_directive_name(attr: &str) -> DirectiveNameParts<'_> {
    let mut parts = DirectiveNameParts::default();
    let mut i = 0;

    if let Some(after) = attr.strip_prefix("v-") {
        let len = after
            .bytes()
            .take_while(|b| b.is_ascii_alphanumeric() || *b == b'-')
            .count();
        if len > 0 {
            parts.name = Some(&after[..len]);
            i = 2 + len;
        }
    }

    let rest = &attr[i..];
    let has_sigil = rest.starts_with(':') || (i == 0 && rest.starts_with(['@', '#']));
    if has_sigil {
        let body = &rest[1..];
        let bracketed = body
            .strip_prefix('[')
            .and_then(|inner| inner.find(']'))
            .filter(|&close| close > 0)
            .map(|close| close + 2);
        let len = bracketed.unwrap_or_else(|| body.find('.').unwrap_or(body.len()));
        if len > 0 {
            parts.arg = Some((i + 1, &body[..len]));
            i += 1 + len;
        }
    }

    if i < attr.len() {
        parts.rest = Some(&attr[i..]);
    }
    parts
}

/// Strip the first and last characters of a `[dynamic]` argument.
fn dynamic_arg_content(raw: &str) -> &str {
    let mut chars = raw.chars();
    chars.next();
    if raw.chars().count() > 1 {
        chars.next_back();
    }
    chars.as_str()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn parse(source: &str) -> ParseOutput {
        base_parse(source, &ParserOptions::default())
    }

    fn codes(output: &ParseOutput) -> Vec<ErrorCode> {
        output.errors.iter().map(|e| e.code).collect()
    }

    fn element(node: &TemplateNode) -> &ElementNode {
        node.as_element().expect("expected element")
    }

    fn directive(prop: &ElementProp) -> &DirectiveNode {
        prop.as_directive().expect("expected directive")
    }

    fn assert_spans(original: &str, nodes: &[TemplateNode]) {
        for node in nodes {
            let loc = node.loc();
            assert_eq!(loc.source, &original[loc.span().range()]);
            if let TemplateNode::Element(el) = node {
                for prop in &el.props {
                    let loc = prop.loc();
                    assert_eq!(loc.source, &original[loc.span().range()]);
                }
                assert_spans(original, &el.children);
            }
        }
    }

    #[test]
    fn test_parse_interpolation_in_element() {
        let output = parse("<div>{{ a }}</div>");
        assert!(output.errors.is_empty());
        let root = &output.root;
        assert_eq!(root.children.len(), 1);
        let div = element(&root.children[0]);
        assert_eq!(div.tag, "div");
        assert_eq!(div.tag_type, ElementType::Plain);
        assert_eq!(div.children.len(), 1);
        let TemplateNode::Interpolation(interp) = &div.children[0] else {
            panic!("expected interpolation");
        };
        assert_eq!(interp.content.content, "a");
        assert!(!interp.content.is_static);
        assert_eq!(interp.loc.source, "{{ a }}");
        assert_eq!(interp.content.loc.source, "a");
        assert_eq!(interp.content.loc.start.offset, 8);
    }

    #[test]
    fn test_duplicate_attribute_kept() {
        let output = parse(r#"<div id="a" id="b"></div>"#);
        assert_eq!(codes(&output), vec![ErrorCode::DuplicateAttribute]);
        assert_eq!(output.errors[0].offset(), Some(12));
        let div = element(&output.root.children[0]);
        let values: Vec<_> = div
            .props
            .iter()
            .map(|p| match p {
                ElementProp::Attribute(attr) => {
                    (attr.name.as_str(), attr.value.as_ref().map(|v| v.content.as_str()))
                }
                ElementProp::Directive(_) => panic!("unexpected directive"),
            })
            .collect();
        assert_eq!(values, vec![("id", Some("a")), ("id", Some("b"))]);
    }

    #[test]
    fn test_v_pre_suppresses_interpolation() {
        let output = parse("<div v-pre>{{ x }}</div>");
        assert!(output.errors.is_empty());
        let div = element(&output.root.children[0]);
        assert!(div.props.is_empty());
        assert_eq!(div.children.len(), 1);
        assert_eq!(div.children[0].as_text().map(|t| t.content.as_str()), Some("{{ x }}"));
    }

    #[test]
    fn test_v_pre_keeps_directives_as_attributes() {
        let output = parse(r#"<div v-pre :id="foo"><span @click="go"/></div><p :a="b"></p>"#);
        assert!(output.errors.is_empty());
        let div = element(&output.root.children[0]);
        assert_eq!(div.props.len(), 1);
        assert!(matches!(&div.props[0], ElementProp::Attribute(attr) if attr.name == ":id"));
        let span = element(&div.children[0]);
        assert!(matches!(&span.props[0], ElementProp::Attribute(attr) if attr.name == "@click"));
        // v-pre ends with its element
        let p = element(&output.root.children[1]);
        assert_eq!(directive(&p.props[0]).name, "bind");
    }

    #[test]
    fn test_v_pre_reparse_reports_once() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let options = ParserOptions {
            on_error: Some(Box::new(move |err| sink.borrow_mut().push(err.code))),
            ..Default::default()
        };
        let output = base_parse(r#"<div v-pre a a></div>"#, &options);
        assert_eq!(codes(&output), vec![ErrorCode::DuplicateAttribute]);
        assert_eq!(*seen.borrow(), vec![ErrorCode::DuplicateAttribute]);
    }

    #[test]
    fn test_component_classification() {
        let output = parse(r#"<MyWidget is="foo"/>"#);
        let widget = element(&output.root.children[0]);
        assert_eq!(widget.tag_type, ElementType::Component);
        assert!(widget.is_self_closing);

        let output = parse(
            "<component/><keep-alive/><div v-is=\"'x'\"/><slot/><template v-if=\"ok\"/><template/>",
        );
        let kinds: Vec<_> = output
            .root
            .children
            .iter()
            .map(|n| element(n).tag_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ElementType::Component,
                ElementType::Component,
                ElementType::Component,
                ElementType::Slot,
                ElementType::Template,
                ElementType::Plain,
            ]
        );
    }

    #[test]
    fn test_native_and_custom_tags() {
        let options = ParserOptions {
            is_native_tag: Some(Box::new(|tag| matches!(tag, "div" | "span"))),
            is_custom_element: Box::new(|tag| tag.starts_with("x-")),
            ..Default::default()
        };
        let output = base_parse("<div/><foo/><x-foo/><slot/>", &options);
        let kinds: Vec<_> = output
            .root
            .children
            .iter()
            .map(|n| element(n).tag_type)
            .collect();
        assert_eq!(
            kinds,
            vec![
                ElementType::Plain,
                ElementType::Component,
                ElementType::Plain,
                ElementType::Slot,
            ]
        );
    }

    #[test]
    fn test_directive_decomposition() {
        let output = parse(
            r#"<div v-on:click.stop.prevent="go" :[key]="v" @keyup.enter="k" #item.name="p" v-custom></div>"#,
        );
        assert!(output.errors.is_empty());
        let div = element(&output.root.children[0]);

        let on = directive(&div.props[0]);
        assert_eq!(on.name, "on");
        assert_eq!(on.static_arg(), Some("click"));
        assert_eq!(on.arg.as_ref().map(|a| a.loc.source.as_str()), Some("click"));
        assert_eq!(on.modifiers, vec![SmolStr::new("stop"), SmolStr::new("prevent")]);
        let exp = on.exp.as_ref().expect("expression");
        assert_eq!(exp.content, "go");
        assert_eq!(exp.loc.source, "go");

        let bind = directive(&div.props[1]);
        assert_eq!(bind.name, "bind");
        let arg = bind.arg.as_ref().expect("argument");
        assert_eq!(arg.content, "key");
        assert!(!arg.is_static);
        assert_eq!(arg.loc.source, "[key]");

        let keyup = directive(&div.props[2]);
        assert_eq!(keyup.name, "on");
        assert_eq!(keyup.static_arg(), Some("keyup"));
        assert_eq!(keyup.modifiers, vec![SmolStr::new("enter")]);

        let slot = directive(&div.props[3]);
        assert_eq!(slot.name, "slot");
        assert_eq!(slot.static_arg(), Some("item.name"));
        assert_eq!(slot.arg.as_ref().map(|a| a.loc.source.as_str()), Some("item.name"));

        let custom = directive(&div.props[4]);
        assert_eq!(custom.name, "custom");
        assert!(custom.arg.is_none());
        assert!(custom.exp.is_none());
        assert!(custom.modifiers.is_empty());
    }

    #[test]
    fn test_missing_dynamic_argument_end() {
        let output = parse(r#"<div v-bind:[foo="x"></div>"#);
        assert_eq!(codes(&output), vec![ErrorCode::MissingDynamicDirectiveArgumentEnd]);
        let bind = directive(&element(&output.root.children[0]).props[0]);
        let arg = bind.arg.as_ref().expect("argument");
        assert_eq!(arg.content, "fo");
        assert!(!arg.is_static);
    }

    #[test]
    fn test_split_directive_name() {
        assert_eq!(
            split_directive_name("v-bind:[a.b].c"),
            DirectiveNameParts {
                name: Some("bind"),
                arg: Some((7, "[a.b]")),
                rest: Some(".c"),
            }
        );
        assert_eq!(
            split_directive_name("@click"),
            DirectiveNameParts {
                name: None,
                arg: Some((1, "click")),
                rest: None,
            }
        );
        assert_eq!(
            split_directive_name("v-model.trim"),
            DirectiveNameParts {
                name: Some("model"),
                arg: None,
                rest: Some(".trim"),
            }
        );
    }

    #[test]
    fn test_quoted_value_span_excludes_quotes() {
        let source = r#"<div :title="a &amp; b"></div>"#;
        let output = parse(source);
        let bind = directive(&element(&output.root.children[0]).props[0]);
        let exp = bind.exp.as_ref().expect("expression");
        assert_eq!(exp.content, "a & b");
        assert_eq!(exp.loc.source, "a &amp; b");
        assert_eq!(&source[exp.loc.span().range()], "a &amp; b");
    }

    #[test]
    fn test_attribute_value_forms() {
        let output = parse(r#"<input value=a'b disabled x= >"#);
        assert_eq!(
            codes(&output),
            vec![
                ErrorCode::UnexpectedCharacterInUnquotedAttributeValue,
                ErrorCode::MissingAttributeValue,
                ErrorCode::MissingEndTag,
            ]
        );
        let input = element(&output.root.children[0]);
        let ElementProp::Attribute(value) = &input.props[0] else {
            panic!("expected attribute");
        };
        assert_eq!(value.value.as_ref().map(|v| v.content.as_str()), Some("a'b"));
        assert_eq!(input.props[1].name(), "disabled");
        assert_eq!(input.props[2].name(), "x");
    }

    #[test]
    fn test_void_tags() {
        let options = ParserOptions {
            is_void_tag: Box::new(|tag| tag == "br"),
            ..Default::default()
        };
        let output = base_parse("<p>a<br>b</p>", &options);
        assert!(output.errors.is_empty());
        let p = element(&output.root.children[0]);
        assert_eq!(p.children.len(), 3);
        assert_eq!(element(&p.children[1]).tag, "br");
    }

    #[test]
    fn test_text_merge_and_entities() {
        let output = parse("a &lt; b < c");
        assert_eq!(codes(&output), vec![ErrorCode::InvalidFirstCharacterOfTagName]);
        assert_eq!(output.root.children.len(), 1);
        let text = output.root.children[0].as_text().expect("text");
        assert_eq!(text.content, "a < b < c");
        assert_eq!(text.loc.source, "a &lt; b < c");
    }

    #[test]
    fn test_missing_interpolation_end_falls_back_to_text() {
        let output = parse("{{ a");
        assert_eq!(codes(&output), vec![ErrorCode::MissingInterpolationEnd]);
        let text = output.root.children[0].as_text().expect("text");
        assert_eq!(text.content, "{{ a");
    }

    #[test]
    fn test_custom_delimiters() {
        let options = ParserOptions {
            delimiters: ("${".to_string(), "}".to_string()),
            ..Default::default()
        };
        let output = base_parse("<p>${ msg } {{ raw }}</p>", &options);
        let p = element(&output.root.children[0]);
        let TemplateNode::Interpolation(interp) = &p.children[0] else {
            panic!("expected interpolation");
        };
        assert_eq!(interp.content.content, "msg");
        assert_eq!(p.children[1].as_text().map(|t| t.content.as_str()), Some(" {{ raw }}"));
    }

    #[test]
    fn test_comments() {
        let options = ParserOptions {
            comments: true,
            ..Default::default()
        };
        let output = base_parse("<!-- hi --><!---->", &options);
        assert!(output.errors.is_empty());
        let contents: Vec<_> = output
            .root
            .children
            .iter()
            .map(|n| match n {
                TemplateNode::Comment(c) => c.content.as_str(),
                _ => panic!("expected comment"),
            })
            .collect();
        assert_eq!(contents, vec![" hi ", ""]);

        let output = base_parse("<!-->", &options);
        assert_eq!(codes(&output), vec![ErrorCode::AbruptClosingOfEmptyComment]);

        let output = base_parse("<!-- a <!-- b --!>", &options);
        assert_eq!(
            codes(&output),
            vec![ErrorCode::IncorrectlyClosedComment, ErrorCode::NestedComment]
        );
        assert_eq!(output.errors[1].offset(), Some(7));

        let output = base_parse("<!-- open", &options);
        assert_eq!(codes(&output), vec![ErrorCode::EofInComment]);
        assert_eq!(output.root.children[0].loc().source, "<!-- open");
    }

    #[test]
    fn test_comments_removed_when_disabled() {
        let options = ParserOptions {
            comments: false,
            ..Default::default()
        };
        let output = base_parse("<div/> <!-- c --> <p/>", &options);
        let tags: Vec<_> = output
            .root
            .children
            .iter()
            .map(|n| element(n).tag.as_str())
            .collect();
        assert_eq!(tags, vec!["div", "p"]);
    }

    #[test]
    fn test_bogus_comments() {
        let options = ParserOptions {
            comments: true,
            ..Default::default()
        };
        let output = base_parse("<!DOCTYPE html><?xml?><!x>", &options);
        assert_eq!(
            codes(&output),
            vec![
                ErrorCode::UnexpectedQuestionMarkInsteadOfTagName,
                ErrorCode::IncorrectlyOpenedComment,
            ]
        );
        let contents: Vec<_> = output
            .root
            .children
            .iter()
            .map(|n| match n {
                TemplateNode::Comment(c) => c.content.as_str(),
                _ => panic!("expected comment"),
            })
            .collect();
        assert_eq!(contents, vec!["DOCTYPE html", "?xml?", "x"]);
    }

    #[test]
    fn test_cdata() {
        let options = ParserOptions {
            get_namespace: Box::new(|tag, parent| {
                if tag == "svg" {
                    Namespace::Svg
                } else {
                    parent.map_or(Namespace::Html, |p| p.ns)
                }
            }),
            ..Default::default()
        };
        let output = base_parse("<svg><![CDATA[a<b]]></svg>", &options);
        assert!(output.errors.is_empty());
        let svg = element(&output.root.children[0]);
        assert_eq!(svg.ns, Namespace::Svg);
        assert_eq!(svg.children.len(), 1);
        assert_eq!(svg.children[0].as_text().map(|t| t.content.as_str()), Some("a<b"));

        let output = base_parse("<div><![CDATA[x]]></div>", &options);
        assert_eq!(codes(&output), vec![ErrorCode::CdataInHtmlContent]);

        let output = base_parse("<svg><![CDATA[abc", &options);
        assert_eq!(
            codes(&output),
            vec![ErrorCode::EofInCdata, ErrorCode::MissingEndTag]
        );
        let svg = element(&output.root.children[0]);
        assert_eq!(svg.children.len(), 1);
        assert_eq!(svg.children[0].as_text().map(|t| t.content.as_str()), Some("abc"));
    }

    #[test]
    fn test_end_tag_errors() {
        let output = parse("<div></div/></span></>");
        assert_eq!(
            codes(&output),
            vec![
                ErrorCode::EndTagWithTrailingSolidus,
                ErrorCode::InvalidEndTag,
                ErrorCode::MissingEndTagName,
            ]
        );
        assert_eq!(output.root.children.len(), 1);

        let output = parse("<div></div id=\"x\">");
        assert_eq!(codes(&output), vec![ErrorCode::EndTagWithAttributes]);
    }

    #[test]
    fn test_attribute_name_errors() {
        let output = parse(r#"<div =a a"b c/d e="1"f></div>"#);
        assert_eq!(
            codes(&output),
            vec![
                ErrorCode::UnexpectedEqualsSignBeforeAttributeName,
                ErrorCode::UnexpectedCharacterInAttributeName,
                ErrorCode::UnexpectedSolidusInTag,
                ErrorCode::MissingWhitespaceBetweenAttributes,
            ]
        );
        let names: Vec<_> = element(&output.root.children[0])
            .props
            .iter()
            .map(ElementProp::name)
            .collect();
        assert_eq!(names, vec!["=a", "a\"b", "c", "d", "e", "f"]);
    }

    #[test]
    fn test_missing_end_tag_recovers_at_ancestor() {
        let output = parse("<div><span>text</div>");
        assert_eq!(codes(&output), vec![ErrorCode::MissingEndTag]);
        assert_eq!(output.errors[0].offset(), Some(5));
        let div = element(&output.root.children[0]);
        let span = element(&div.children[0]);
        assert_eq!(span.loc.source, "<span>text");
        assert_eq!(div.loc.source, "<div><span>text</div>");
    }

    #[test]
    fn test_eof_in_tag() {
        let output = parse("<div id=\"a\"");
        assert_eq!(codes(&output), vec![ErrorCode::EofInTag, ErrorCode::MissingEndTag]);
        let output = parse("<");
        assert_eq!(codes(&output), vec![ErrorCode::EofBeforeTagName]);
        assert_eq!(output.root.children[0].as_text().map(|t| t.content.as_str()), Some("<"));
    }

    #[test]
    fn test_raw_text_and_rcdata() {
        let options = ParserOptions {
            get_text_mode: Box::new(|el, _| match el.tag.as_str() {
                "script" => TextMode::RawText,
                "textarea" => TextMode::RcData,
                _ => TextMode::Data,
            }),
            ..Default::default()
        };
        let output = base_parse(
            "<script>if (a < b &amp;&amp; c) {}</script><textarea>{{ v }} &lt;div&gt;</textarea>",
            &options,
        );
        assert!(output.errors.is_empty());
        let script = element(&output.root.children[0]);
        assert_eq!(
            script.children[0].as_text().map(|t| t.content.as_str()),
            Some("if (a < b &amp;&amp; c) {}")
        );
        let textarea = element(&output.root.children[1]);
        assert!(matches!(textarea.children[0], TemplateNode::Interpolation(_)));
        assert_eq!(
            textarea.children[1].as_text().map(|t| t.content.as_str()),
            Some(" <div>")
        );

        let output = base_parse("<script><!-- x", &options);
        assert_eq!(
            codes(&output),
            vec![ErrorCode::MissingEndTag, ErrorCode::EofInScriptHtmlCommentLikeText]
        );
    }

    #[test]
    fn test_raw_text_ends_only_at_parent_end_tag() {
        let options = ParserOptions {
            get_text_mode: Box::new(|el, _| match el.tag.as_str() {
                "script" => TextMode::RawText,
                "textarea" => TextMode::RcData,
                _ => TextMode::Data,
            }),
            ..Default::default()
        };
        for tag in ["textarea", "script"] {
            let source = format!("<div><{tag}></div></{tag}></div>");
            let output = base_parse(&source, &options);
            assert!(output.errors.is_empty(), "{tag}: {:?}", output.errors);
            let div = element(&output.root.children[0]);
            assert_eq!(div.children.len(), 1);
            let inner = element(&div.children[0]);
            assert_eq!(inner.tag, tag);
            assert_eq!(inner.children.len(), 1);
            assert_eq!(inner.children[0].as_text().map(|t| t.content.as_str()), Some("</div>"));
        }
    }

    #[test]
    fn test_whitespace_condensation() {
        let output = parse("  <div>\n  <span/>\n  <span/> <b/>  a \n b  </div>\n");
        assert_eq!(output.root.children.len(), 1);
        let div = element(&output.root.children[0]);
        let kinds: Vec<_> = div
            .children
            .iter()
            .map(|n| match n {
                TemplateNode::Element(el) => el.tag.to_string(),
                TemplateNode::Text(t) => format!("{:?}", t.content),
                _ => panic!("unexpected node"),
            })
            .collect();
        assert_eq!(kinds, vec!["span", "span", "\" \"", "b", "\" a b \""]);
    }

    #[test]
    fn test_whitespace_condensation_is_idempotent() {
        let output = parse("<p> a  <i>b</i>\n\n c </p>");
        let p = element(&output.root.children[0]);
        let parser_options = ParserOptions::default();
        let parser = Parser::new("", &parser_options);
        let again = parser.condense(p.children.clone());
        let before: Vec<_> = p.children.iter().map(|n| n.loc().source.clone()).collect();
        let after: Vec<_> = again.iter().map(|n| n.loc().source.clone()).collect();
        assert_eq!(before, after);
        let texts: Vec<_> = again
            .iter()
            .filter_map(|n| n.as_text())
            .map(|t| t.content.clone())
            .collect();
        assert_eq!(texts, vec![" a ", " c "]);
    }

    #[test]
    fn test_pre_keeps_whitespace() {
        let options = ParserOptions {
            is_pre_tag: Box::new(|tag| tag == "pre"),
            ..Default::default()
        };
        let output = base_parse("<pre>\n  a  <b> x </b>\n</pre><p>  a  </p>", &options);
        let pre = element(&output.root.children[0]);
        assert_eq!(pre.children[0].as_text().map(|t| t.content.as_str()), Some("  a  "));
        let b = element(&pre.children[1]);
        assert_eq!(b.children[0].as_text().map(|t| t.content.as_str()), Some(" x "));
        let p = element(&output.root.children[1]);
        assert_eq!(p.children[0].as_text().map(|t| t.content.as_str()), Some(" a "));
    }

    #[test]
    fn test_self_closing_pre_restores_mode() {
        let options = ParserOptions {
            is_pre_tag: Box::new(|tag| tag == "pre"),
            ..Default::default()
        };
        let output = base_parse("<pre/><p>  a  </p>", &options);
        let p = element(&output.root.children[1]);
        assert_eq!(p.children[0].as_text().map(|t| t.content.as_str()), Some(" a "));
    }

    #[test]
    fn test_positions_track_lines_and_columns() {
        let output = parse("<div>\n  <span>é</span>\n</div>");
        let div = element(&output.root.children[0]);
        let span = element(&div.children[0]);
        assert_eq!(span.loc.start, Position::new(8, 2, 3));
        assert_eq!(span.loc.end, Position::new(23, 2, 17));
    }

    #[test]
    fn test_spans_are_substrings_of_source() {
        let source = r#"<div id="app" :class="{ a: b }">
  <my-comp v-for="item in items" :key="item.id" @click.native="go(item)">
    {{ item.name }} &amp; more
  </my-comp>
  <p>héllo <b>wörld</b></p>
</div>"#;
        let output = parse(source);
        assert!(output.errors.is_empty());
        assert_eq!(output.root.loc.source, source);
        assert_spans(source, &output.root.children);
    }
}
