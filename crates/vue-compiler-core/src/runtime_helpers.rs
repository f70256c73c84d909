//! Runtime helper symbols and patch flags.
//!
//! The transform engine records which runtime helpers the generated render
//! function will need; the code generator turns them into imports.

use std::fmt;

/// A runtime helper the generated code may call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum RuntimeHelper {
    Fragment,
    Teleport,
    Suspense,
    KeepAlive,
    BaseTransition,
    OpenBlock,
    CreateBlock,
    CreateVNode,
    CreateComment,
    CreateText,
    CreateStatic,
    ResolveComponent,
    ResolveDynamicComponent,
    ResolveDirective,
    WithDirectives,
    RenderList,
    RenderSlot,
    CreateSlots,
    ToDisplayString,
    MergeProps,
    ToHandlers,
    Camelize,
    SetBlockTracking,
    PushScopeId,
    PopScopeId,
    WithScopeId,
    WithCtx,
}

impl RuntimeHelper {
    /// The exported runtime name of this helper.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Fragment => "Fragment",
            Self::Teleport => "Teleport",
            Self::Suspense => "Suspense",
            Self::KeepAlive => "KeepAlive",
            Self::BaseTransition => "BaseTransition",
            Self::OpenBlock => "openBlock",
            Self::CreateBlock => "createBlock",
            Self::CreateVNode => "createVNode",
            Self::CreateComment => "createCommentVNode",
            Self::CreateText => "createTextVNode",
            Self::CreateStatic => "createStaticVNode",
            Self::ResolveComponent => "resolveComponent",
            Self::ResolveDynamicComponent => "resolveDynamicComponent",
            Self::ResolveDirective => "resolveDirective",
            Self::WithDirectives => "withDirectives",
            Self::RenderList => "renderList",
            Self::RenderSlot => "renderSlot",
            Self::CreateSlots => "createSlots",
            Self::ToDisplayString => "toDisplayString",
            Self::MergeProps => "mergeProps",
            Self::ToHandlers => "toHandlers",
            Self::Camelize => "camelize",
            Self::SetBlockTracking => "setBlockTracking",
            Self::PushScopeId => "pushScopeId",
            Self::PopScopeId => "popScopeId",
            Self::WithScopeId => "withScopeId",
            Self::WithCtx => "withCtx",
        }
    }
}

impl fmt::Display for RuntimeHelper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Optimization hints attached to vnode calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PatchFlags(pub i32);

impl PatchFlags {
    pub const TEXT: PatchFlags = PatchFlags(1);
    pub const CLASS: PatchFlags = PatchFlags(1 << 1);
    pub const STYLE: PatchFlags = PatchFlags(1 << 2);
    pub const PROPS: PatchFlags = PatchFlags(1 << 3);
    pub const FULL_PROPS: PatchFlags = PatchFlags(1 << 4);
    pub const HYDRATE_EVENTS: PatchFlags = PatchFlags(1 << 5);
    /// Children order and count never change.
    pub const STABLE_FRAGMENT: PatchFlags = PatchFlags(1 << 6);
    pub const KEYED_FRAGMENT: PatchFlags = PatchFlags(1 << 7);
    pub const UNKEYED_FRAGMENT: PatchFlags = PatchFlags(1 << 8);
    pub const NEED_PATCH: PatchFlags = PatchFlags(1 << 9);
    pub const DYNAMIC_SLOTS: PatchFlags = PatchFlags(1 << 10);
    pub const HOISTED: PatchFlags = PatchFlags(-1);
    pub const BAIL: PatchFlags = PatchFlags(-2);

    const NAMES: [(PatchFlags, &'static str); 13] = [
        (Self::TEXT, "TEXT"),
        (Self::CLASS, "CLASS"),
        (Self::STYLE, "STYLE"),
        (Self::PROPS, "PROPS"),
        (Self::FULL_PROPS, "FULL_PROPS"),
        (Self::HYDRATE_EVENTS, "HYDRATE_EVENTS"),
        (Self::STABLE_FRAGMENT, "STABLE_FRAGMENT"),
        (Self::KEYED_FRAGMENT, "KEYED_FRAGMENT"),
        (Self::UNKEYED_FRAGMENT, "UNKEYED_FRAGMENT"),
        (Self::NEED_PATCH, "NEED_PATCH"),
        (Self::DYNAMIC_SLOTS, "DYNAMIC_SLOTS"),
        (Self::HOISTED, "HOISTED"),
        (Self::BAIL, "BAIL"),
    ];

    /// Combine two flag sets.
    #[inline]
    pub const fn union(self, other: PatchFlags) -> PatchFlags {
        PatchFlags(self.0 | other.0)
    }

    /// Names of the flags set, in declaration order.
    pub fn names(&self) -> Vec<&'static str> {
        if self.0 < 0 {
            return Self::NAMES
                .iter()
                .filter(|(flag, _)| flag.0 == self.0)
                .map(|(_, name)| *name)
                .collect();
        }
        Self::NAMES
            .iter()
            .filter(|(flag, _)| flag.0 > 0 && self.0 & flag.0 != 0)
            .map(|(_, name)| *name)
            .collect()
    }
}

impl fmt::Display for PatchFlags {
    /// Renders the flag as the annotated literal the generated code carries.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} /* {} */", self.0, self.names().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_helper_names() {
        assert_eq!(RuntimeHelper::OpenBlock.name(), "openBlock");
        assert_eq!(RuntimeHelper::CreateComment.to_string(), "createCommentVNode");
    }

    #[test]
    fn test_patch_flag_display() {
        assert_eq!(PatchFlags::STABLE_FRAGMENT.to_string(), "64 /* STABLE_FRAGMENT */");
        assert_eq!(
            PatchFlags::TEXT.union(PatchFlags::PROPS).to_string(),
            "9 /* TEXT, PROPS */"
        );
        assert_eq!(PatchFlags::HOISTED.to_string(), "-1 /* HOISTED */");
    }
}
