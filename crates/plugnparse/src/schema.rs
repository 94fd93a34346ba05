//! Per-instance attribute declarations.
//!
//! An [`AttributeSchema`] holds six ordered name lists, one per
//! [`Category`]. Each level of an entity's composition chain appends its own
//! names after those of the level it extends, so collection order is always
//! "category first, then declaration order".

use std::fmt;

use crate::error::{Error, Result};

/// Encoding strategy of one attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Copied by value through serde.
    Plain,
    /// A [`WireEnum`](crate::WireEnum), emitted as its canonical name.
    Enumerated,
    /// One nested entity, emitted with tags.
    Entity,
    /// Custom encode/decode pair.
    Specialized,
    /// String key to nested entity.
    EntityMap,
    /// Ordered nested entities.
    EntityList,
}

impl Category {
    /// Collection order. Wire key order and the default decode order follow it.
    pub const ORDER: [Category; 6] = [
        Category::Plain,
        Category::Enumerated,
        Category::Entity,
        Category::Specialized,
        Category::EntityMap,
        Category::EntityList,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Plain => "plain",
            Category::Enumerated => "enumerated",
            Category::Entity => "nested-entity",
            Category::Specialized => "specialized",
            Category::EntityMap => "nested-entity-map",
            Category::EntityList => "nested-entity-list",
        }
    }

    fn index(self) -> usize {
        match self {
            Category::Plain => 0,
            Category::Enumerated => 1,
            Category::Entity => 2,
            Category::Specialized => 3,
            Category::EntityMap => 4,
            Category::EntityList => 5,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeSchema {
    lists: [Vec<&'static str>; 6],
    desired_order: Vec<&'static str>,
}

impl AttributeSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `name` to the list of `category`. Redeclaring a name is a no-op.
    pub fn declare(&mut self, category: Category, name: &'static str) -> &mut Self {
        if self.category_of(name).is_none() {
            self.lists[category.index()].push(name);
        }
        self
    }

    pub fn plain(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::Plain, name)
    }

    pub fn enumerated(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::Enumerated, name)
    }

    pub fn entity(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::Entity, name)
    }

    pub fn specialized(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::Specialized, name)
    }

    pub fn entity_map(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::EntityMap, name)
    }

    pub fn entity_list(&mut self, name: &'static str) -> &mut Self {
        self.declare(Category::EntityList, name)
    }

    /// Appends names that must be decoded before every other attribute.
    pub fn desire_first(&mut self, names: &[&'static str]) -> &mut Self {
        for name in names {
            if !self.desired_order.contains(name) {
                self.desired_order.push(name);
            }
        }
        self
    }

    pub fn desired_order(&self) -> &[&'static str] {
        &self.desired_order
    }

    /// Names declared under `category`, in declaration order.
    pub fn names(&self, category: Category) -> &[&'static str] {
        &self.lists[category.index()]
    }

    pub fn category_of(&self, name: &str) -> Option<Category> {
        Category::ORDER
            .into_iter()
            .find(|category| self.names(*category).contains(&name))
    }

    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn collect_all_attributes(&self) -> Vec<&'static str> {
        Category::ORDER
            .into_iter()
            .flat_map(|category| self.names(category).iter().copied())
            .collect()
    }

    pub fn collect_categorized(&self) -> Vec<(&'static str, Category)> {
        Category::ORDER
            .into_iter()
            .flat_map(|category| self.names(category).iter().map(move |name| (*name, category)))
            .collect()
    }

    /// Partitions the collected names around the desired order.
    pub fn split_ordered_and_unordered(&self) -> Result<(Vec<&'static str>, Vec<&'static str>)> {
        split_ordered_and_unordered(&self.desired_order, &self.collect_all_attributes())
    }
}

/// Returns `(desired, rest)` where `rest` keeps the relative order of
/// `collected`. Every desired name must be part of `collected`.
pub fn split_ordered_and_unordered<'a>(
    desired: &[&'a str],
    collected: &[&'a str],
) -> Result<(Vec<&'a str>, Vec<&'a str>)> {
    let unknown: Vec<String> = desired
        .iter()
        .filter(|name| !collected.contains(*name))
        .map(|name| name.to_string())
        .collect();
    if !unknown.is_empty() {
        return Err(Error::ordering(unknown));
    }
    let unordered = collected
        .iter()
        .copied()
        .filter(|name| !desired.contains(name))
        .collect();
    Ok((desired.to_vec(), unordered))
}
