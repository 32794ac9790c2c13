//! Naming convention utilities for the C++ output.
//!
//! Schema names are kept as written wherever C++ allows it, so generated
//! classes are easy to find from the schema.
//!
//! | Input | Function | Output |
//! |-------|----------|--------|
//! | `default` | [`escape_identifier`] | `default_` |
//! | `storage.FileType` | [`family_identifier`] | `storage_FileType` |
//! | `71` | [`layer_namespace`] | `layer71` |
//! | `0x7abe77ec` | [`hex_literal`] | `0x7abe77ec` |

use crate::model::AbstractType;

/// C++ keywords and alternative tokens that cannot be used as identifiers.
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "and_eq", "asm", "auto", "bitand", "bitor", "bool", "break",
    "case", "catch", "char", "char8_t", "char16_t", "char32_t", "class", "compl", "concept",
    "const", "consteval", "constexpr", "constinit", "const_cast", "continue", "co_await",
    "co_return", "co_yield", "decltype", "default", "delete", "do", "double", "dynamic_cast",
    "else", "enum", "explicit", "export", "extern", "false", "float", "for", "friend", "goto",
    "if", "inline", "int", "long", "mutable", "namespace", "new", "noexcept", "not", "not_eq",
    "nullptr", "operator", "or", "or_eq", "private", "protected", "public", "register",
    "reinterpret_cast", "requires", "return", "short", "signed", "sizeof", "static",
    "static_assert", "static_cast", "struct", "switch", "template", "this", "thread_local",
    "throw", "true", "try", "typedef", "typeid", "typename", "union", "unsigned", "using",
    "virtual", "void", "volatile", "wchar_t", "while", "xor", "xor_eq",
];

/// Names that would shadow members of every generated class.
const RESERVED_MEMBERS: &[&str] = &[
    "CONSTRUCTOR",
    "read",
    "write",
    "write_bare",
    "read_boxed",
    "read_any",
    "stream",
];

/// Whether `name` is a C++ keyword.
pub fn is_keyword(name: &str) -> bool {
    CPP_KEYWORDS.contains(&name)
}

/// Append `_` to names C++ would not accept as identifiers.
pub fn escape_identifier(name: &str) -> String {
    if is_keyword(name) || RESERVED_MEMBERS.contains(&name) {
        format!("{name}_")
    } else {
        name.to_string()
    }
}

/// Identifier of an abstract family marker; dots become underscores.
pub fn family_identifier(family: &AbstractType) -> String {
    escape_identifier(&family.name().replace('.', "_"))
}

/// Name of the namespace block holding one layer's declarations.
pub fn layer_namespace(layer: u32) -> String {
    format!("layer{layer}")
}

/// An unsigned 32-bit hex literal with all eight digits.
pub fn hex_literal(id: u32) -> String {
    format!("{id:#010x}")
}
