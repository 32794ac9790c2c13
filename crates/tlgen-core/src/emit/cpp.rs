//! C++ renderer.
//!
//! Drives the sequencer, the declaration emitter and the wire plans for one
//! category and writes a self-contained header:
//!
//! 1. banner and includes
//! 2. abstract family markers with their `read_boxed` declarations
//! 3. forward declarations, then class definitions, in layer/namespace blocks
//! 4. out-of-line `write`, `write_bare` and `read` bodies
//! 5. `read_boxed` dispatchers and the category-wide `read_any`
//!
//! Bodies are emitted after all classes so every class is complete before a
//! body refers to it.

use super::declaration;
use super::sequencer::{self, SequenceItem};
use super::serialization::{self, Encoding, WireStep};
use super::source::SourceWriter;
use crate::config::GeneratorConfig;
use crate::error::{GenResult, GenerateError};
use crate::graph::{Partition, TypeGraph};
use crate::identity::VECTOR_CONSTRUCTOR;
use crate::model::{AbstractType, Argument, Definition, FlagBit, Primitive, TypeRef};
use crate::naming;
use std::collections::BTreeSet;

/// Which half of the schema a header holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Functions,
    Types,
}

impl Category {
    /// Namespace under the root namespace (`TL::Function`, `TL::Type`).
    pub fn namespace(self) -> &'static str {
        match self {
            Category::Functions => "Function",
            Category::Types => "Type",
        }
    }

    fn partition<'r, 'd>(self, graph: &'r TypeGraph<'d>) -> &'r Partition<'d> {
        match self {
            Category::Functions => &graph.functions,
            Category::Types => &graph.types,
        }
    }
}

/// Type mapping from TL to C++
struct TypeMapping {
    tl_type: Primitive,
    cpp_type: &'static str,
}

const TYPE_MAPPINGS: &[TypeMapping] = &[
    TypeMapping {
        tl_type: Primitive::Int,
        cpp_type: "int32_t",
    },
    TypeMapping {
        tl_type: Primitive::Long,
        cpp_type: "int64_t",
    },
    TypeMapping {
        tl_type: Primitive::Int128,
        cpp_type: "std::array<uint8_t, 16>",
    },
    TypeMapping {
        tl_type: Primitive::Int256,
        cpp_type: "std::array<uint8_t, 32>",
    },
    TypeMapping {
        tl_type: Primitive::Double,
        cpp_type: "double",
    },
    TypeMapping {
        tl_type: Primitive::String,
        cpp_type: "std::string",
    },
    TypeMapping {
        tl_type: Primitive::Bytes,
        cpp_type: "std::string",
    },
    TypeMapping {
        tl_type: Primitive::Bool,
        cpp_type: "bool",
    },
    TypeMapping {
        tl_type: Primitive::True,
        cpp_type: "bool",
    },
];

/// The C++ spelling of a TL primitive.
pub fn cpp_primitive(primitive: Primitive) -> Option<&'static str> {
    TYPE_MAPPINGS
        .iter()
        .find(|m| m.tl_type == primitive)
        .map(|m| m.cpp_type)
}

/// The two generated headers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedSources {
    pub functions: String,
    pub types: String,
}

/// Render both headers.
pub fn render(graph: &TypeGraph<'_>, config: &GeneratorConfig) -> GenResult<GeneratedSources> {
    let renderer = CppRenderer::new(graph, config);
    Ok(GeneratedSources {
        functions: renderer.render(Category::Functions)?,
        types: renderer.render(Category::Types)?,
    })
}

/// How a value is held in C++ and moved across the wire.
#[derive(Debug, Clone, PartialEq, Eq)]
enum ValueKind {
    Primitive(Primitive),
    /// Abstract family marker; read through its dispatcher.
    Boxed(String),
    /// Concrete class; written without its tag.
    Bare(String),
    /// Any object of a category; read through `read_any`.
    Any(Category),
}

impl ValueKind {
    fn is_object(&self) -> bool {
        !matches!(self, ValueKind::Primitive(_))
    }
}

/// A resolved member of a generated class.
struct Field {
    name: String,
    kind: ValueKind,
    /// Type of one value (the element type for vectors).
    element: String,
    /// Type of the member.
    storage: String,
    /// Held in `std::optional`.
    optional: bool,
}

impl Field {
    /// Expression for the (present) value.
    fn access(&self) -> String {
        if self.optional {
            format!("(*{})", self.name)
        } else {
            self.name.clone()
        }
    }
}

pub struct CppRenderer<'r, 'd> {
    graph: &'r TypeGraph<'d>,
    config: &'r GeneratorConfig,
}

impl<'r, 'd> CppRenderer<'r, 'd> {
    pub fn new(graph: &'r TypeGraph<'d>, config: &'r GeneratorConfig) -> Self {
        Self { graph, config }
    }

    fn root(&self) -> &str {
        &self.config.root_namespace
    }

    /// Render the header for one category.
    pub fn render(&self, category: Category) -> GenResult<String> {
        let partition = category.partition(self.graph);
        let items = sequencer::sequence(partition);
        let root = self.root();
        let mut w = SourceWriter::new();

        self.write_prelude(&mut w, category, partition);

        w.open(format!("namespace {root}"));
        w.open(format!("namespace {}", category.namespace()));
        self.write_markers(&mut w, partition)?;

        if !items.is_empty() {
            w.blank();
            self.write_blocks(&mut w, &items, |w, definition| {
                w.line(format!("class {};", naming::escape_identifier(&definition.name)));
                Ok(())
            })?;
            w.blank();
            self.write_blocks(&mut w, &items, |w, definition| {
                self.write_class(w, category, partition, definition)
            })?;
        }

        w.close_with(&format!("  // namespace {}", category.namespace()))?;
        w.close_with(&format!("  // namespace {root}"))?;

        for definition in partition.iter() {
            w.blank();
            self.write_methods(&mut w, category, definition)?;
        }
        for family in partition.abstracts() {
            w.blank();
            self.write_read_boxed(&mut w, category, partition, family)?;
        }
        w.blank();
        self.write_read_any(&mut w, category, partition)?;

        let text = w.finish()?;
        tracing::debug!(
            category = category.namespace(),
            definitions = partition.len(),
            families = partition.abstracts().len(),
            bytes = text.len(),
            "rendered header"
        );
        Ok(text)
    }

    fn write_prelude(&self, w: &mut SourceWriter, category: Category, partition: &Partition<'_>) {
        let layers: BTreeSet<u32> = partition.iter().map(|d| d.layer).collect();
        let layers: Vec<String> = layers.iter().map(u32::to_string).collect();

        w.line("// Autogenerated by tlgen. Do not edit: this file is overwritten on every run.");
        if !layers.is_empty() {
            w.line(format!("// Layers: {}", layers.join(", ")));
        }
        w.line("#pragma once");
        w.blank();
        w.lines([
            "#include <array>",
            "#include <cstdint>",
            "#include <memory>",
            "#include <optional>",
            "#include <string>",
            "#include <utility>",
            "#include <vector>",
        ]);
        w.blank();
        w.line(format!("#include \"{}\"", self.config.runtime_header));
        if category == Category::Functions {
            w.line(format!("#include \"{}\"", self.config.types_file));
        }
        w.blank();
    }

    fn write_markers(&self, w: &mut SourceWriter, partition: &Partition<'_>) -> GenResult<()> {
        let root = self.root();
        for family in partition.abstracts() {
            let ident = naming::family_identifier(family);
            w.open(format!("class {ident} : public {root}::Serializable"));
            w.line("public:");
            w.line(format!(
                "static std::shared_ptr<{ident}> read_boxed({root}::Stream &stream);"
            ));
            w.close_with(";")?;
            w.blank();
        }
        w.line(format!(
            "std::shared_ptr<{root}::Serializable> read_any({root}::Stream &stream);"
        ));
        Ok(())
    }

    fn write_blocks<F>(
        &self,
        w: &mut SourceWriter,
        items: &[SequenceItem<'_>],
        mut declare: F,
    ) -> GenResult<()>
    where
        F: FnMut(&mut SourceWriter, &Definition) -> GenResult<()>,
    {
        for item in items {
            match item {
                SequenceItem::OpenLayer(layer) => {
                    w.open(format!("namespace {}", naming::layer_namespace(*layer)));
                }
                SequenceItem::OpenNamespace(namespace) => {
                    w.open(format!("namespace {}", naming::escape_identifier(namespace)));
                }
                SequenceItem::Declare(definition) => declare(w, definition)?,
                SequenceItem::CloseNamespace(namespace) => {
                    w.close_with(&format!(
                        "  // namespace {}",
                        naming::escape_identifier(namespace)
                    ))?;
                }
                SequenceItem::CloseLayer(layer) => {
                    w.close_with(&format!("  // namespace {}", naming::layer_namespace(*layer)))?;
                }
            }
        }
        Ok(())
    }

    fn write_class(
        &self,
        w: &mut SourceWriter,
        category: Category,
        partition: &Partition<'_>,
        definition: &Definition,
    ) -> GenResult<()> {
        let root = self.root();
        let decl = declaration::declare(definition, partition.abstracts())?;
        let fields = decl
            .fields
            .iter()
            .map(|arg| self.field(category, definition, arg))
            .collect::<GenResult<Vec<_>>>()?;

        w.open(format!(
            "class {} : public {root}::{}::{}",
            decl.class_name,
            category.namespace(),
            naming::family_identifier(&decl.family)
        ));
        w.line("public:");
        w.line(format!(
            "static constexpr uint32_t CONSTRUCTOR = {};",
            naming::hex_literal(definition.id())
        ));

        if !fields.is_empty() {
            w.blank();
            for field in &fields {
                w.line(format!("{} {}{{}};", field.storage, field.name));
            }
        }

        w.blank();
        if fields.is_empty() || !decl.all_params_defaulted() {
            w.line(format!("{}() = default;", decl.class_name));
        }
        if !fields.is_empty() {
            let params: Vec<String> = decl
                .params
                .iter()
                .zip(&fields)
                .map(|(param, field)| {
                    if param.defaulted {
                        format!("{} {} = {{}}", field.storage, field.name)
                    } else {
                        format!("{} {}", field.storage, field.name)
                    }
                })
                .collect();
            let inits: Vec<String> = fields
                .iter()
                .map(|f| format!("{0}(std::move({0}))", f.name))
                .collect();
            let explicit = if fields.len() == 1 { "explicit " } else { "" };
            w.line(format!(
                "{explicit}{}({}) : {} {{}}",
                decl.class_name,
                params.join(", "),
                inits.join(", ")
            ));
        }

        w.blank();
        w.line(format!("void write({root}::Stream &stream) override;"));
        w.line(format!("void write_bare({root}::Stream &stream);"));
        w.line(format!("void read({root}::Stream &stream) override;"));
        w.close_with(";")?;
        Ok(())
    }

    fn write_methods(
        &self,
        w: &mut SourceWriter,
        category: Category,
        definition: &Definition,
    ) -> GenResult<()> {
        let root = self.root();
        let path = self.class_path(category, definition);

        let bodies = [
            ("write", serialization::write_plan(definition)),
            ("write_bare", serialization::body_plan(definition)),
            ("read", serialization::read_plan(definition)),
        ];
        for (index, (method, steps)) in bodies.iter().enumerate() {
            if index > 0 {
                w.blank();
            }
            w.open(format!("inline void {path}::{method}({root}::Stream &stream)"));
            if !steps.iter().any(WireStep::is_on_wire) {
                w.line("(void)stream;");
            }
            for step in steps {
                if *method == "read" {
                    self.read_step(w, category, definition, step)?;
                } else {
                    self.write_step(w, category, definition, step)?;
                }
            }
            w.close()?;
        }
        Ok(())
    }

    fn write_step(
        &self,
        w: &mut SourceWriter,
        category: Category,
        definition: &Definition,
        step: &WireStep<'_>,
    ) -> GenResult<()> {
        match step {
            WireStep::Tag(_) => w.line("stream << CONSTRUCTOR;"),
            WireStep::FlagMask { members, .. } => {
                w.line("uint32_t _flags = 0;");
                for member in members {
                    let Some(flag) = &member.flag else { continue };
                    w.line(format!(
                        "if ({}) _flags |= {};",
                        field_name(definition, member),
                        mask(flag)
                    ));
                }
                w.line("stream << _flags;");
            }
            WireStep::Field {
                arg,
                encoding,
                presence,
            } => {
                let field = self.field(category, definition, arg)?;
                let guarded = presence.is_some() && *encoding != Encoding::PresenceOnly;
                if guarded {
                    w.open(format!("if ({})", field.name));
                }
                match encoding {
                    Encoding::PresenceOnly => {}
                    Encoding::Scalar => {
                        if let Some(line) = self.write_value(&field.kind, &field.access()) {
                            w.line(line);
                        }
                    }
                    Encoding::Vector { boxed } => {
                        let access = field.access();
                        if *boxed {
                            w.line(format!(
                                "stream << static_cast<uint32_t>({});",
                                naming::hex_literal(VECTOR_CONSTRUCTOR)
                            ));
                        }
                        w.line(format!("stream << static_cast<uint32_t>({access}.size());"));
                        w.open(format!("for (const auto &_item : {access})"));
                        if let Some(line) = self.write_value(&field.kind, "_item") {
                            w.line(line);
                        }
                        w.close()?;
                    }
                }
                if guarded {
                    w.close()?;
                }
            }
        }
        Ok(())
    }

    fn read_step(
        &self,
        w: &mut SourceWriter,
        category: Category,
        definition: &Definition,
        step: &WireStep<'_>,
    ) -> GenResult<()> {
        match step {
            WireStep::Tag(_) => {}
            WireStep::FlagMask { .. } => {
                w.line("uint32_t _flags = 0;");
                w.line("stream >> _flags;");
            }
            WireStep::Field {
                arg,
                encoding: Encoding::PresenceOnly,
                presence,
            } => {
                let flag = presence.ok_or_else(|| {
                    GenerateError::Internal(format!("presence-only `{}` has no flag", arg.name))
                })?;
                w.line(format!(
                    "{} = (_flags & {}) != 0;",
                    field_name(definition, arg),
                    mask(flag)
                ));
            }
            WireStep::Field {
                arg,
                encoding: Encoding::Scalar,
                presence,
            } => {
                let field = self.field(category, definition, arg)?;
                if let Some(flag) = presence {
                    w.open(format!("if (_flags & {})", mask(flag)));
                }
                if field.optional {
                    w.line(format!("{} _value{{}};", field.element));
                    w.lines(self.read_value(&field.kind, "_value"));
                    w.line(format!("{} = std::move(_value);", field.name));
                } else {
                    w.lines(self.read_value(&field.kind, &field.name));
                }
                if presence.is_some() {
                    w.reopen("else")?;
                    w.line(format!("{} = {{}};", field.name));
                    w.close()?;
                }
            }
            WireStep::Field {
                arg,
                encoding: Encoding::Vector { boxed },
                presence,
            } => {
                let field = self.field(category, definition, arg)?;
                match presence {
                    Some(flag) => w.open(format!("if (_flags & {})", mask(flag))),
                    None => w.open(""),
                }
                if *boxed {
                    w.line("uint32_t _vector_tag = 0;");
                    w.line("stream >> _vector_tag;");
                }
                w.line("uint32_t _len = 0;");
                w.line("stream >> _len;");
                w.line(format!("std::vector<{}> _items;", field.element));
                w.open("for (uint32_t _i = 0; _i != _len; ++_i)");
                w.line(format!("{} _item{{}};", field.element));
                w.lines(self.read_value(&field.kind, "_item"));
                w.line("_items.push_back(std::move(_item));");
                w.close()?;
                w.line(format!("{} = std::move(_items);", field.name));
                if presence.is_some() {
                    w.reopen("else")?;
                    w.line(format!("{} = {{}};", field.name));
                }
                w.close()?;
            }
        }
        Ok(())
    }

    fn write_read_boxed(
        &self,
        w: &mut SourceWriter,
        category: Category,
        partition: &Partition<'_>,
        family: &AbstractType,
    ) -> GenResult<()> {
        let root = self.root();
        let marker = format!(
            "{root}::{}::{}",
            category.namespace(),
            naming::family_identifier(family)
        );
        w.open(format!(
            "inline std::shared_ptr<{marker}> {marker}::read_boxed({root}::Stream &stream)"
        ));
        w.line(format!("std::shared_ptr<{marker}> result;"));
        self.write_dispatch(w, category, &partition.variants(family))?;
        w.close()
    }

    fn write_read_any(
        &self,
        w: &mut SourceWriter,
        category: Category,
        partition: &Partition<'_>,
    ) -> GenResult<()> {
        let root = self.root();
        w.open(format!(
            "inline std::shared_ptr<{root}::Serializable> {root}::{}::read_any({root}::Stream &stream)",
            category.namespace()
        ));
        w.line(format!("std::shared_ptr<{root}::Serializable> result;"));
        let variants: Vec<&Definition> = partition.iter().collect();
        self.write_dispatch(w, category, &variants)?;
        w.close()
    }

    /// Read a tag, construct the matching variant, then read its body.
    fn write_dispatch(
        &self,
        w: &mut SourceWriter,
        category: Category,
        variants: &[&Definition],
    ) -> GenResult<()> {
        let root = self.root();
        w.line("uint32_t tag = 0;");
        w.line("stream >> tag;");
        w.open("switch (tag)");
        for definition in variants {
            let path = self.class_path(category, definition);
            w.open(format!("case {path}::CONSTRUCTOR:"));
            w.line(format!("result = std::make_shared<{path}>();"));
            w.line("break;");
            w.close()?;
        }
        w.open("default:");
        w.line(format!("throw {root}::UnknownConstructor(tag);"));
        w.close()?;
        w.close()?;
        w.line("result->read(stream);");
        w.line("return result;");
        Ok(())
    }

    /// Fully qualified name of the class generated for `definition`.
    fn class_path(&self, category: Category, definition: &Definition) -> String {
        let mut path = format!(
            "{}::{}::{}::",
            self.root(),
            category.namespace(),
            naming::layer_namespace(definition.layer)
        );
        if let Some(namespace) = &definition.namespace {
            path.push_str(&naming::escape_identifier(namespace));
            path.push_str("::");
        }
        path.push_str(&naming::escape_identifier(&definition.name));
        path
    }

    fn value_kind(
        &self,
        category: Category,
        definition: &Definition,
        arg: &Argument,
    ) -> GenResult<ValueKind> {
        Ok(match &arg.ty {
            TypeRef::Primitive(primitive) => ValueKind::Primitive(*primitive),
            TypeRef::Boxed(name) => {
                let family = AbstractType::named(name.to_string());
                if self.graph.types.abstracts().contains(&family) {
                    ValueKind::Boxed(format!(
                        "{}::{}::{}",
                        self.root(),
                        Category::Types.namespace(),
                        naming::family_identifier(&family)
                    ))
                } else {
                    tracing::trace!(
                        definition = %definition.full_name(),
                        family = %family,
                        "no constructors produce this family; reading it as any type"
                    );
                    ValueKind::Any(Category::Types)
                }
            }
            TypeRef::Bare(name) => match self.graph.constructor(name) {
                Some(target) => ValueKind::Bare(self.class_path(Category::Types, target)),
                None => {
                    return Err(GenerateError::UnknownBareType {
                        definition: definition.full_name(),
                        name: name.to_string(),
                    });
                }
            },
            TypeRef::Generic(_) => ValueKind::Any(category),
        })
    }

    fn field(&self, category: Category, definition: &Definition, arg: &Argument) -> GenResult<Field> {
        let kind = self.value_kind(category, definition, arg)?;
        let element = match &kind {
            ValueKind::Primitive(primitive) => cpp_primitive(*primitive)
                .ok_or_else(|| GenerateError::Internal(format!("no C++ type for {primitive:?}")))?
                .to_string(),
            ValueKind::Boxed(path) | ValueKind::Bare(path) => format!("std::shared_ptr<{path}>"),
            ValueKind::Any(_) => format!("std::shared_ptr<{}::Serializable>", self.root()),
        };

        let presence_only = arg.is_presence_only();
        let optional = arg.is_flag() && !presence_only && (arg.is_vector || !kind.is_object());
        let storage = if presence_only {
            "bool".to_string()
        } else {
            let held = if arg.is_vector {
                format!("std::vector<{element}>")
            } else {
                element.clone()
            };
            if optional {
                format!("std::optional<{held}>")
            } else {
                held
            }
        };

        Ok(Field {
            name: field_name(definition, arg),
            kind,
            element,
            storage,
            optional,
        })
    }

    fn write_value(&self, kind: &ValueKind, expr: &str) -> Option<String> {
        match kind {
            ValueKind::Primitive(Primitive::True) => None,
            ValueKind::Primitive(_) => Some(format!("stream << {expr};")),
            ValueKind::Boxed(_) | ValueKind::Any(_) => Some(format!("{expr}->write(stream);")),
            ValueKind::Bare(_) => Some(format!("{expr}->write_bare(stream);")),
        }
    }

    fn read_value(&self, kind: &ValueKind, target: &str) -> Vec<String> {
        match kind {
            ValueKind::Primitive(Primitive::True) => vec![format!("{target} = true;")],
            ValueKind::Primitive(_) => vec![format!("stream >> {target};")],
            ValueKind::Boxed(path) => vec![format!("{target} = {path}::read_boxed(stream);")],
            ValueKind::Bare(path) => vec![
                format!("{target} = std::make_shared<{path}>();"),
                format!("{target}->read(stream);"),
            ],
            ValueKind::Any(category) => vec![format!(
                "{target} = {}::{}::read_any(stream);",
                self.root(),
                category.namespace()
            )],
        }
    }
}

/// Member name for `arg`, escaped and distinct from the class name.
fn field_name(definition: &Definition, arg: &Argument) -> String {
    let mut name = naming::escape_identifier(&arg.name);
    if name == naming::escape_identifier(&definition.name) {
        name.push('_');
    }
    name
}

fn mask(flag: &FlagBit) -> String {
    format!("(1u << {})", flag.index)
}
