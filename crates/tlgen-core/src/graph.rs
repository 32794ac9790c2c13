//! Type graph: definitions partitioned into functions and types.
//!
//! Each [`Partition`] groups its definitions by namespace (in discovery order,
//! `""` for unqualified names) and collects the abstract families they
//! produce. Definitions inside a namespace are ordered by `(layer, name)` so
//! regenerating from the same input is byte-identical.

use crate::model::{AbstractType, Definition, QualifiedName};
use std::collections::{BTreeSet, HashMap, HashSet};

/// Functions or types, with their namespaces and abstract families.
#[derive(Debug, Default)]
pub struct Partition<'a> {
    namespaces: Vec<String>,
    definitions: HashMap<String, Vec<&'a Definition>>,
    abstracts: BTreeSet<AbstractType>,
}

impl<'a> Partition<'a> {
    fn insert(&mut self, definition: &'a Definition) {
        let namespace = definition.namespace.clone().unwrap_or_default();
        if !self.definitions.contains_key(&namespace) {
            self.namespaces.push(namespace.clone());
        }
        self.definitions
            .entry(namespace)
            .or_default()
            .push(definition);
        self.abstracts.insert(definition.family());
    }

    fn sort(&mut self) {
        for definitions in self.definitions.values_mut() {
            definitions.sort_by(|a, b| (a.layer, &a.name).cmp(&(b.layer, &b.name)));
        }
    }

    /// Namespaces in the order they were first seen.
    pub fn namespaces(&self) -> &[String] {
        &self.namespaces
    }

    /// Sorted definitions of one namespace.
    pub fn definitions(&self, namespace: &str) -> &[&'a Definition] {
        self.definitions
            .get(namespace)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Every definition, namespace by namespace.
    pub fn iter(&self) -> impl Iterator<Item = &'a Definition> + '_ {
        self.namespaces
            .iter()
            .flat_map(|namespace| self.definitions(namespace).iter().copied())
    }

    /// Abstract families, sorted by full name.
    pub fn abstracts(&self) -> &BTreeSet<AbstractType> {
        &self.abstracts
    }

    /// Definitions producing `family`, in emission order.
    pub fn variants(&self, family: &AbstractType) -> Vec<&'a Definition> {
        self.iter().filter(|d| &d.family() == family).collect()
    }

    pub fn len(&self) -> usize {
        self.definitions.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// The whole loaded schema, ready for emission.
#[derive(Debug, Default)]
pub struct TypeGraph<'a> {
    pub functions: Partition<'a>,
    pub types: Partition<'a>,
    constructors: HashMap<QualifiedName, &'a Definition>,
}

impl<'a> TypeGraph<'a> {
    /// The type constructor named `name`, from the latest layer defining it.
    ///
    /// A family with exactly one constructor (`%Message`) resolves to that
    /// constructor.
    pub fn constructor(&self, name: &QualifiedName) -> Option<&'a Definition> {
        self.constructors.get(name).copied()
    }

    fn alias_single_constructor_families(&mut self) {
        let mut aliases = Vec::new();
        for family in self.types.abstracts() {
            let alias = QualifiedName::parse(family.name());
            if self.constructors.contains_key(&alias) {
                continue;
            }
            let names: HashSet<QualifiedName> = self
                .types
                .variants(family)
                .iter()
                .map(|d| d.qualified_name())
                .collect();
            let mut names = names.into_iter();
            if let (Some(only), None) = (names.next(), names.next())
                && let Some(&target) = self.constructors.get(&only)
            {
                aliases.push((alias, target));
            }
        }
        self.constructors.extend(aliases);
    }
}

/// Partition `definitions` and collect their abstract families.
pub fn build(definitions: &[Definition]) -> TypeGraph<'_> {
    let mut graph = TypeGraph::default();

    for definition in definitions {
        if definition.is_function {
            graph.functions.insert(definition);
        } else {
            graph.types.insert(definition);
            graph
                .constructors
                .entry(definition.qualified_name())
                .and_modify(|existing| {
                    if definition.layer >= existing.layer {
                        *existing = definition;
                    }
                })
                .or_insert(definition);
        }
    }

    graph.functions.sort();
    graph.types.sort();
    graph.alias_single_constructor_families();

    tracing::debug!(
        functions = graph.functions.len(),
        function_families = graph.functions.abstracts().len(),
        types = graph.types.len(),
        type_families = graph.types.abstracts().len(),
        "built type graph"
    );
    graph
}
