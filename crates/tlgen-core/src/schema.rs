//! Schema loading: TL text and TL JSON into [`Definition`]s.
//!
//! # Supported input
//!
//! - **TL text** (`.tl`): `---functions---` / `---types---` sections, `//`
//!   comments, statements terminated by `;` that may span lines.
//! - **TL JSON** (`.json`): `{"constructors": [...], "methods": [...]}` where
//!   each entry has a signed decimal `id`, a `predicate` (or `method`), `params`
//!   and a `type`.
//!
//! Builtin declarations such as `int ? = Int;` and
//! `vector {t:Type} # [ t ] = Vector t;` describe the language itself and are
//! skipped. With `ignore_core`, the core constructors listed in
//! [`identity::CORE_TYPES`](crate::identity::CORE_TYPES) are skipped too.

use crate::error::{GenResult, GenerateError};
use crate::identity;
use crate::model::{Argument, Definition, FlagBit, Primitive, QualifiedName, TypeRef};
use serde::Deserialize;
use std::path::{Path, PathBuf};

/// One schema file and the layer its definitions belong to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaSource {
    pub layer: u32,
    pub path: PathBuf,
}

impl SchemaSource {
    pub fn new(layer: u32, path: impl Into<PathBuf>) -> Self {
        Self {
            layer,
            path: path.into(),
        }
    }

    /// Parse a `LAYER=PATH` command-line pair.
    pub fn parse_pair(text: &str) -> GenResult<Self> {
        let (layer, path) = text
            .split_once('=')
            .ok_or_else(|| GenerateError::Config(format!("expected LAYER=PATH, got `{text}`")))?;
        let layer = layer
            .trim()
            .parse::<u32>()
            .map_err(|_| GenerateError::Config(format!("invalid layer number `{layer}`")))?;
        if path.trim().is_empty() {
            return Err(GenerateError::Config(format!(
                "empty schema path for layer {layer}"
            )));
        }
        Ok(Self::new(layer, path.trim()))
    }
}

/// Input notation of a schema file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchemaFormat {
    Text,
    Json,
}

impl SchemaFormat {
    /// `.json` files are TL JSON, everything else is TL text.
    pub fn detect(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => SchemaFormat::Json,
            _ => SchemaFormat::Text,
        }
    }
}

/// Load every source, in ascending layer order.
pub fn parse_files(sources: &[SchemaSource], ignore_core: bool) -> GenResult<Vec<Definition>> {
    let mut ordered: Vec<&SchemaSource> = sources.iter().collect();
    ordered.sort_by_key(|s| s.layer);

    let mut definitions = Vec::new();
    for source in ordered {
        let text = std::fs::read_to_string(&source.path)
            .map_err(|e| GenerateError::io(&source.path, e))?;
        let name = source.path.display().to_string();
        let format = SchemaFormat::detect(&source.path);

        let parsed = parse_source(&text, &name, format, source.layer, ignore_core)?;
        tracing::info!(
            source = %name,
            layer = source.layer,
            definitions = parsed.len(),
            "loaded schema"
        );
        definitions.extend(parsed);
    }
    Ok(definitions)
}

/// Parse schema text in the given notation.
pub fn parse_source(
    text: &str,
    source_name: &str,
    format: SchemaFormat,
    layer: u32,
    ignore_core: bool,
) -> GenResult<Vec<Definition>> {
    match format {
        SchemaFormat::Text => parse_tl(text, source_name, layer, ignore_core),
        SchemaFormat::Json => parse_json(text, source_name, layer, ignore_core),
    }
}

/// Parse TL text notation.
pub fn parse_tl(
    text: &str,
    source_name: &str,
    layer: u32,
    ignore_core: bool,
) -> GenResult<Vec<Definition>> {
    let mut definitions = Vec::new();
    let mut is_function = false;
    let mut pending = String::new();
    let mut start_line = 0;

    for (index, raw) in text.lines().enumerate() {
        let line_no = index + 1;
        let line = match raw.find("//") {
            Some(at) => &raw[..at],
            None => raw,
        }
        .trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("---") {
            if !pending.trim().is_empty() {
                return Err(malformed(source_name, start_line, "unterminated statement"));
            }
            is_function = match line {
                "---functions---" => true,
                "---types---" => false,
                other => {
                    return Err(malformed(
                        source_name,
                        line_no,
                        format!("unknown section marker `{other}`"),
                    ));
                }
            };
            continue;
        }

        if pending.is_empty() {
            start_line = line_no;
        } else {
            pending.push(' ');
        }
        pending.push_str(line);

        while let Some(end) = pending.find(';') {
            let statement = pending[..end].trim().to_string();
            pending = pending[end + 1..].trim_start().to_string();

            let location = Location {
                source_name,
                line: start_line,
            };
            if let Some(def) = parse_statement(&statement, is_function, layer, &location)? {
                accept(&mut definitions, def, ignore_core);
            }
            start_line = line_no;
        }
    }

    if !pending.trim().is_empty() {
        return Err(malformed(source_name, start_line, "unterminated statement"));
    }
    Ok(definitions)
}

#[derive(Debug, Deserialize)]
struct JsonSchema {
    #[serde(default)]
    constructors: Vec<JsonEntry>,
    #[serde(default)]
    methods: Vec<JsonEntry>,
}

#[derive(Debug, Deserialize)]
struct JsonEntry {
    id: JsonId,
    #[serde(alias = "method")]
    predicate: String,
    #[serde(default)]
    params: Vec<JsonParam>,
    #[serde(rename = "type")]
    ty: String,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct JsonParam {
    name: String,
    #[serde(rename = "type")]
    ty: String,
}

/// Parse TL JSON notation.
///
/// Error locations report the 1-based entry index within its section.
pub fn parse_json(
    text: &str,
    source_name: &str,
    layer: u32,
    ignore_core: bool,
) -> GenResult<Vec<Definition>> {
    let schema: JsonSchema = serde_json::from_str(text)
        .map_err(|e| malformed(source_name, e.line(), e.to_string()))?;

    let mut definitions = Vec::new();
    let sections = [(&schema.constructors, false), (&schema.methods, true)];
    for (entries, is_function) in sections {
        for (index, entry) in entries.iter().enumerate() {
            let location = Location {
                source_name,
                line: index + 1,
            };
            let id = entry.id.to_u32().ok_or_else(|| {
                location.malformed(format!("invalid constructor id for `{}`", entry.predicate))
            })?;
            let mut statement = format!("{}#{:08x}", entry.predicate, id);
            for param in &entry.params {
                statement.push_str(&format!(" {}:{}", param.name, param.ty));
            }
            statement.push_str(" = ");
            statement.push_str(&entry.ty);

            if let Some(def) = parse_statement(&statement, is_function, layer, &location)? {
                accept(&mut definitions, def, ignore_core);
            }
        }
    }
    Ok(definitions)
}

impl JsonId {
    fn to_u32(&self) -> Option<u32> {
        let value = match self {
            JsonId::Number(n) => *n,
            JsonId::Text(text) => text.trim().parse::<i64>().ok()?,
        };
        if value < i64::from(i32::MIN) || value > i64::from(u32::MAX) {
            return None;
        }
        // Negative ids are the signed spelling of the same 32 bits.
        Some(value as u32)
    }
}

/// Where a statement came from, for diagnostics.
#[derive(Debug, Clone, Copy)]
pub struct Location<'a> {
    pub source_name: &'a str,
    pub line: usize,
}

impl Location<'_> {
    fn malformed(&self, reason: impl Into<String>) -> GenerateError {
        malformed(self.source_name, self.line, reason)
    }
}

/// Parse one `;`-free statement.
///
/// Returns `Ok(None)` for builtin declarations that describe the language
/// itself rather than a constructor.
pub fn parse_statement(
    statement: &str,
    is_function: bool,
    layer: u32,
    location: &Location<'_>,
) -> GenResult<Option<Definition>> {
    let (lhs, rhs) = statement
        .split_once('=')
        .ok_or_else(|| location.malformed(format!("missing `=` in `{statement}`")))?;
    let rhs = rhs.trim();
    if rhs.is_empty() {
        return Err(location.malformed(format!("missing result type in `{statement}`")));
    }

    let mut tokens = lhs.split_whitespace();
    let head = tokens
        .next()
        .ok_or_else(|| location.malformed("missing definition name"))?;
    let rest: Vec<&str> = tokens.collect();

    if rhs.contains(char::is_whitespace)
        || rest
            .iter()
            .any(|t| *t == "?" || *t == "#" || t.starts_with('['))
    {
        tracing::trace!(statement, "skipping builtin declaration");
        return Ok(None);
    }

    let (full_name, declared_id) = match head.split_once('#') {
        Some((name, hex)) => {
            let id = u32::from_str_radix(hex, 16)
                .map_err(|_| location.malformed(format!("invalid constructor id `#{hex}`")))?;
            (name, Some(id))
        }
        None => (head, None),
    };
    if !is_identifier(full_name) {
        return Err(location.malformed(format!("invalid definition name `{full_name}`")));
    }

    let generics: Vec<&str> = rest
        .iter()
        .filter_map(|t| t.strip_prefix('{')?.strip_suffix('}'))
        .filter_map(|inner| inner.split_once(':').map(|(name, _)| name))
        .collect();

    let mut definition = Definition::new(
        full_name,
        TypeRef::Primitive(Primitive::True),
        is_function,
        layer,
    );
    definition.declared_id = declared_id;

    for token in rest {
        let arg = if let Some(inner) = token.strip_prefix('{') {
            let inner = inner
                .strip_suffix('}')
                .ok_or_else(|| location.malformed(format!("unclosed `{{` in `{token}`")))?;
            let (name, kind) = inner
                .split_once(':')
                .ok_or_else(|| location.malformed(format!("expected `{{name:Type}}`, found `{token}`")))?;
            if kind != "Type" {
                return Err(GenerateError::Unsupported {
                    definition: full_name.to_string(),
                    detail: format!("type parameter `{name}` of kind `{kind}`"),
                });
            }
            Argument::generic_definition(name)
        } else {
            let (name, ty) = token
                .split_once(':')
                .ok_or_else(|| location.malformed(format!("expected `name:type`, found `{token}`")))?;
            parse_argument(full_name, name, ty, &generics, location)?
        };
        definition.args.push(arg);
    }

    let (result, returns_vector) = match vector_element(rhs) {
        Some((inner, _)) => (classify(full_name, inner, &generics, false, location)?, true),
        None => (classify(full_name, rhs, &generics, false, location)?, false),
    };
    definition.result = result;
    definition.returns_vector = returns_vector;

    Ok(Some(definition))
}

fn parse_argument(
    definition: &str,
    name: &str,
    text: &str,
    generics: &[&str],
    location: &Location<'_>,
) -> GenResult<Argument> {
    if !is_identifier(name) {
        return Err(location.malformed(format!("invalid argument name `{name}`")));
    }
    if text == "#" {
        return Ok(Argument::indicator(name));
    }

    let mut rest = text;
    let mut flag = None;
    if let Some((condition, inner)) = rest.split_once('?') {
        let (indicator, index) = condition
            .split_once('.')
            .ok_or_else(|| location.malformed(format!("invalid flag condition `{condition}`")))?;
        let index = index
            .parse::<u32>()
            .map_err(|_| location.malformed(format!("invalid flag index in `{condition}`")))?;
        flag = Some(FlagBit {
            indicator: indicator.to_string(),
            index,
        });
        rest = inner;
    }

    if rest == "#" {
        return Err(GenerateError::Unsupported {
            definition: definition.to_string(),
            detail: format!("flag indicator `{name}` is itself flagged"),
        });
    }

    let generic_ref = match rest.strip_prefix('!') {
        Some(stripped) => {
            rest = stripped;
            true
        }
        None => false,
    };

    let mut vector = None;
    if let Some((inner, boxed)) = vector_element(rest) {
        if vector_element(inner).is_some() {
            return Err(GenerateError::Unsupported {
                definition: definition.to_string(),
                detail: format!("nested vector `{text}`"),
            });
        }
        vector = Some(boxed);
        rest = inner;
    }

    let ty = classify(definition, rest, generics, generic_ref, location)?;
    let mut arg = Argument::new(name, ty);
    arg.flag = flag;
    arg.generic_ref = generic_ref;
    if let Some(boxed) = vector {
        arg = arg.into_vector(boxed);
    }
    Ok(arg)
}

/// `Vector<T>` / `vector<T>` → `(T, boxed)`.
fn vector_element(text: &str) -> Option<(&str, bool)> {
    let (inner, boxed) = if let Some(inner) = text.strip_prefix("Vector<") {
        (inner, true)
    } else {
        (text.strip_prefix("vector<")?, false)
    };
    Some((inner.strip_suffix('>')?, boxed))
}

fn classify(
    definition: &str,
    text: &str,
    generics: &[&str],
    generic_ref: bool,
    location: &Location<'_>,
) -> GenResult<TypeRef> {
    if let Some(primitive) = Primitive::from_schema_name(text) {
        return Ok(TypeRef::Primitive(primitive));
    }
    if generic_ref || generics.contains(&text) {
        return Ok(TypeRef::Generic(text.to_string()));
    }
    if let Some(bare) = text.strip_prefix('%') {
        if !is_identifier(bare) {
            return Err(location.malformed(format!("invalid type `{text}` in `{definition}`")));
        }
        return Ok(TypeRef::Bare(QualifiedName::parse(bare)));
    }
    if !is_identifier(text) {
        return Err(location.malformed(format!("invalid type `{text}` in `{definition}`")));
    }

    let name = QualifiedName::parse(text);
    match name.name.chars().next() {
        Some(c) if c.is_ascii_uppercase() => Ok(TypeRef::Boxed(name)),
        Some(c) if c.is_ascii_lowercase() => Ok(TypeRef::Bare(name)),
        _ => Err(location.malformed(format!("invalid type `{text}` in `{definition}`"))),
    }
}

fn is_identifier(text: &str) -> bool {
    !text.is_empty()
        && !text.starts_with('.')
        && !text.ends_with('.')
        && text
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
}

fn accept(definitions: &mut Vec<Definition>, definition: Definition, ignore_core: bool) {
    let id = definition.id();
    if ignore_core && identity::is_core_type(id) {
        tracing::trace!(name = %definition.full_name(), "skipping core type");
        return;
    }
    if let Some(declared) = definition.declared_id {
        let inferred = identity::infer_id(&definition);
        if declared != inferred {
            tracing::warn!(
                name = %definition.full_name(),
                declared = format_args!("{declared:#010x}"),
                inferred = format_args!("{inferred:#010x}"),
                "declared constructor id differs from signature checksum"
            );
        }
    }
    definitions.push(definition);
}

fn malformed(source_name: &str, line: usize, reason: impl Into<String>) -> GenerateError {
    GenerateError::MalformedSchema {
        source_name: source_name.to_string(),
        line,
        reason: reason.into(),
    }
}
