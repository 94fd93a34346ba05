#![allow(dead_code)]

use std::collections::HashMap;

use indexmap::IndexMap;
use plugnparse::{
    describe, register_entity, register_parsable_plugin, register_plugin, required_arg,
    AttributeSchema, Capability, Codec, Constructible, Error, Kind, Namespace, NamespaceLoader,
    Parsable, ParsableBase, PluginParameters, PluginType, Property, PropertyNames, Registration,
    Result, Slot, SlotMut, SpecializedProperty, WireDict,
};
use serde_json::{json, Value};

pub const NAMESPACE: &str = "fixtures";

pub fn dict(value: Value) -> WireDict {
    match value {
        Value::Object(map) => map,
        other => panic!("expected a JSON object, got {other}"),
    }
}

plugnparse::wire_enum! {
    pub enum EnumClass {
        Foo = 1,
        Bar = 2,
        Baz = 3,
    }
}

// ---------------------------------------------------------------------------
// ClassA: plain, enumerated and specialized attributes
// ---------------------------------------------------------------------------

fn baz_encode(value: &f64) -> Result<Value> {
    Ok(json!({ "baz_keyword": value }))
}

fn baz_decode(value: &Value) -> Result<f64> {
    value
        .get("baz_keyword")
        .and_then(Value::as_f64)
        .ok_or_else(|| Error::type_mismatch("baz", "{baz_keyword: number}", describe(value)))
}

pub const BAZ_CODEC: Codec<f64> = Codec::new(baz_encode, baz_decode);

#[derive(Debug, Clone, PartialEq)]
pub struct ClassA {
    base: ParsableBase,
    pub foo: Property<i64>,
    pub bar: Property<EnumClass>,
    pub baz: SpecializedProperty<f64>,
}

impl Default for ClassA {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassA {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut()
            .plain("foo")
            .enumerated("bar")
            .specialized("baz");
        Self {
            base,
            foo: Property::new("foo"),
            bar: Property::new("bar"),
            baz: SpecializedProperty::new("baz", BAZ_CODEC),
        }
    }

    pub fn with(foo: i64, bar: EnumClass, baz: f64) -> Self {
        let mut a = Self::new();
        a.foo.set(foo);
        a.bar.set(bar);
        a.baz.set(baz);
        a
    }
}

impl Parsable for ClassA {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "foo" => Some(Slot::Plain(&self.foo)),
            "bar" => Some(Slot::Enumerated(&self.bar)),
            "baz" => Some(Slot::Specialized(&self.baz)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "foo" => Some(SlotMut::Plain(&mut self.foo)),
            "bar" => Some(SlotMut::Enumerated(&mut self.bar)),
            "baz" => Some(SlotMut::Specialized(&mut self.baz)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for ClassA {
    const KIND: Kind = Kind::new("ClassA", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

// ---------------------------------------------------------------------------
// ClassB: the three nested categories over a static target
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ClassB {
    base: ParsableBase,
    pub bingo: Property<ClassA>,
    pub bingo_dictionary: Property<IndexMap<String, ClassA>>,
    pub bango_list: Property<Vec<ClassA>>,
}

impl Default for ClassB {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassB {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut()
            .entity("bingo")
            .entity_map("bingo_dictionary")
            .entity_list("bango_list");
        Self {
            base,
            bingo: Property::new("bingo"),
            bingo_dictionary: Property::new("bingo_dictionary"),
            bango_list: Property::new("bango_list"),
        }
    }
}

impl Parsable for ClassB {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "bingo" => Some(Slot::Entity(&self.bingo)),
            "bingo_dictionary" => Some(Slot::EntityMap(&self.bingo_dictionary)),
            "bango_list" => Some(Slot::EntityList(&self.bango_list)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "bingo" => Some(SlotMut::Entity(&mut self.bingo)),
            "bingo_dictionary" => Some(SlotMut::EntityMap(&mut self.bingo_dictionary)),
            "bango_list" => Some(SlotMut::EntityList(&mut self.bango_list)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for ClassB {
    const KIND: Kind = Kind::new("ClassB", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

// ---------------------------------------------------------------------------
// ClassC extends ClassA with a required `label`; ClassD extends ClassC
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct ClassC {
    parent: ClassA,
    pub label: Property<String>,
}

impl ClassC {
    pub fn new(label: impl Into<String>) -> Self {
        let mut parent = ClassA::new();
        parent.base_mut().schema_mut().plain("label");
        Self {
            parent,
            label: Property::with_value("label", label.into()),
        }
    }

    pub fn parent(&self) -> &ClassA {
        &self.parent
    }

    pub fn parent_mut(&mut self) -> &mut ClassA {
        &mut self.parent
    }
}

impl Parsable for ClassC {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        self.parent.base()
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        self.parent.base_mut()
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "label" => Some(Slot::Plain(&self.label)),
            _ => self.parent.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "label" => Some(SlotMut::Plain(&mut self.label)),
            _ => self.parent.slot_mut(name),
        }
    }
}

impl Constructible for ClassC {
    const KIND: Kind = Kind::new("ClassC", NAMESPACE);

    fn required_parameters() -> Vec<&'static str> {
        let mut required = ClassA::required_parameters();
        required.push("label");
        required
    }

    fn construct(args: &WireDict) -> Result<Self> {
        Ok(Self::new(required_arg::<String>(args, "label")?))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClassD {
    parent: ClassC,
    pub rank: Property<i64>,
}

impl ClassD {
    pub fn new(label: impl Into<String>, rank: i64) -> Self {
        let mut parent = ClassC::new(label);
        parent.base_mut().schema_mut().plain("rank");
        Self {
            parent,
            rank: Property::with_value("rank", rank),
        }
    }

    pub fn parent(&self) -> &ClassC {
        &self.parent
    }
}

impl Parsable for ClassD {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        self.parent.base()
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        self.parent.base_mut()
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "rank" => Some(Slot::Plain(&self.rank)),
            _ => self.parent.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "rank" => Some(SlotMut::Plain(&mut self.rank)),
            _ => self.parent.slot_mut(name),
        }
    }
}

impl Constructible for ClassD {
    const KIND: Kind = Kind::new("ClassD", NAMESPACE);

    fn required_parameters() -> Vec<&'static str> {
        let mut required = ClassC::required_parameters();
        required.push("rank");
        required
    }

    fn construct(args: &WireDict) -> Result<Self> {
        Ok(Self::new(
            required_arg::<String>(args, "label")?,
            required_arg::<i64>(args, "rank")?,
        ))
    }
}

// ---------------------------------------------------------------------------
// Holder: polymorphic nested values
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Holder {
    base: ParsableBase,
    pub anchor: Property<Box<dyn Parsable>>,
    pub members: Property<IndexMap<String, Box<dyn Parsable>>>,
    pub sequence: Property<Vec<Box<dyn Parsable>>>,
}

impl Default for Holder {
    fn default() -> Self {
        Self::new()
    }
}

impl Holder {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut()
            .entity("anchor")
            .entity_map("members")
            .entity_list("sequence");
        Self {
            base,
            anchor: Property::new("anchor"),
            members: Property::new("members"),
            sequence: Property::new("sequence"),
        }
    }
}

impl Parsable for Holder {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "anchor" => Some(Slot::Entity(&self.anchor)),
            "members" => Some(Slot::EntityMap(&self.members)),
            "sequence" => Some(Slot::EntityList(&self.sequence)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "anchor" => Some(SlotMut::Entity(&mut self.anchor)),
            "members" => Some(SlotMut::EntityMap(&mut self.members)),
            "sequence" => Some(SlotMut::EntityList(&mut self.sequence)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for Holder {
    const KIND: Kind = Kind::new("Holder", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

// ---------------------------------------------------------------------------
// Desired parse order
// ---------------------------------------------------------------------------

/// `mode` decides how `reading` is interpreted, so it is decoded first.
#[derive(Debug, Clone, PartialEq)]
pub struct Gauge {
    base: ParsableBase,
    pub reading: Property<f64>,
    pub mode: Property<EnumClass>,
}

impl Gauge {
    pub fn new(order: &[&'static str]) -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut()
            .plain("reading")
            .enumerated("mode")
            .desire_first(order);
        Self {
            base,
            reading: Property::new("reading"),
            mode: Property::new("mode"),
        }
    }
}

impl Parsable for Gauge {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "reading" => Some(Slot::Plain(&self.reading)),
            "mode" => Some(Slot::Enumerated(&self.mode)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "reading" => Some(SlotMut::Plain(&mut self.reading)),
            "mode" => Some(SlotMut::Enumerated(&mut self.mode)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for Gauge {
    const KIND: Kind = Kind::new("Gauge", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new(&["mode"]))
    }
}

// ---------------------------------------------------------------------------
// Plugins
// ---------------------------------------------------------------------------

pub trait Strategy {
    fn execute(&self) -> String;
}

impl Capability for dyn Strategy {
    const NAME: &'static str = "Strategy";

    fn property_names() -> PropertyNames {
        ExampleParameters::property_names()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExampleParameters {
    base: ParsableBase,
    pub plugin_type: Property<String>,
    pub plugin_module: Property<String>,
}

impl Default for ExampleParameters {
    fn default() -> Self {
        Self::new()
    }
}

impl ExampleParameters {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut().plain("plugin_type").plain("plugin_module");
        Self {
            base,
            plugin_type: Property::new("plugin_type"),
            plugin_module: Property::new("plugin_module"),
        }
    }

    pub fn naming(plugin_type: &str, plugin_module: &str) -> Self {
        let mut parameters = Self::new();
        parameters.plugin_type.set(plugin_type.to_string());
        parameters.plugin_module.set(plugin_module.to_string());
        parameters
    }
}

impl Parsable for ExampleParameters {
    fn kind(&self) -> Kind {
        Self::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "plugin_type" => Some(Slot::Plain(&self.plugin_type)),
            "plugin_module" => Some(Slot::Plain(&self.plugin_module)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "plugin_type" => Some(SlotMut::Plain(&mut self.plugin_type)),
            "plugin_module" => Some(SlotMut::Plain(&mut self.plugin_module)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for ExampleParameters {
    const KIND: Kind = Kind::new("ExampleParameters", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

impl PluginParameters for ExampleParameters {
    const PLUGIN_PROPERTY: &'static str = "plugin_type";
    const MODULE_PROPERTY: Option<&'static str> = Some("plugin_module");
}

pub struct PluginExampleA;

impl Strategy for PluginExampleA {
    fn execute(&self) -> String {
        "PluginExampleA: Foo!".to_string()
    }
}

impl PluginType<dyn Strategy> for PluginExampleA {
    const KIND: Kind = Kind::new("PluginExampleA", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(PluginExampleA)
    }

    fn upcast(self: Box<Self>) -> Box<dyn Strategy> {
        self
    }
}

pub struct PluginExampleB {
    greeting: String,
}

impl Strategy for PluginExampleB {
    fn execute(&self) -> String {
        format!("PluginExampleB: {}!", self.greeting)
    }
}

impl PluginType<dyn Strategy> for PluginExampleB {
    const KIND: Kind = Kind::new("PluginExampleB", NAMESPACE);

    fn construct(args: &WireDict) -> Result<Self> {
        let greeting = match args.get("greeting") {
            Some(_) => required_arg::<String>(args, "greeting")?,
            None => "Bar".to_string(),
        };
        Ok(PluginExampleB { greeting })
    }

    fn upcast(self: Box<Self>) -> Box<dyn Strategy> {
        self
    }
}

/// A plugin that is also an entity, so it can be completed from values.
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledStrategy {
    base: ParsableBase,
    pub factor: Property<f64>,
}

impl ScaledStrategy {
    pub fn new() -> Self {
        let mut base = ParsableBase::new();
        base.schema_mut().plain("factor");
        Self {
            base,
            factor: Property::new("factor"),
        }
    }
}

impl Default for ScaledStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for ScaledStrategy {
    fn execute(&self) -> String {
        match self.factor.value() {
            Some(factor) => format!("scaled by {factor}"),
            None => "unscaled".to_string(),
        }
    }
}

impl Parsable for ScaledStrategy {
    fn kind(&self) -> Kind {
        <Self as Constructible>::KIND
    }

    fn base(&self) -> &ParsableBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut ParsableBase {
        &mut self.base
    }

    fn slot(&self, name: &str) -> Option<Slot<'_>> {
        match name {
            "factor" => Some(Slot::Plain(&self.factor)),
            _ => self.base.slot(name),
        }
    }

    fn slot_mut(&mut self, name: &str) -> Option<SlotMut<'_>> {
        match name {
            "factor" => Some(SlotMut::Plain(&mut self.factor)),
            _ => self.base.slot_mut(name),
        }
    }
}

impl Constructible for ScaledStrategy {
    const KIND: Kind = Kind::new("ScaledStrategy", NAMESPACE);

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }
}

impl PluginType<dyn Strategy> for ScaledStrategy {
    const KIND: Kind = <Self as Constructible>::KIND;

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(Self::new())
    }

    fn upcast(self: Box<Self>) -> Box<dyn Strategy> {
        self
    }
}

/// Deliberately left out of the compile-time table; tests register it.
pub struct LatePlugin;

impl Strategy for LatePlugin {
    fn execute(&self) -> String {
        "late".to_string()
    }
}

impl PluginType<dyn Strategy> for LatePlugin {
    const KIND: Kind = Kind::new("LatePlugin", "late-fixtures");

    fn construct(_args: &WireDict) -> Result<Self> {
        Ok(LatePlugin)
    }

    fn upcast(self: Box<Self>) -> Box<dyn Strategy> {
        self
    }
}

register_entity!(ClassA, ClassB, ClassC, ClassD, Holder, Gauge, ExampleParameters);
register_plugin!(dyn Strategy => PluginExampleA, PluginExampleB);
register_parsable_plugin!(dyn Strategy => ScaledStrategy);

// ---------------------------------------------------------------------------
// A loader backed by an in-memory table
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct MapLoader {
    namespaces: HashMap<String, Vec<Registration>>,
}

impl MapLoader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, registration: Registration) -> Self {
        self.namespaces
            .entry(registration.namespace.to_string())
            .or_default()
            .push(registration);
        self
    }
}

impl NamespaceLoader for MapLoader {
    fn load(&self, namespace: &str) -> Result<Namespace> {
        let registrations = self.namespaces.get(namespace).ok_or_else(|| {
            Error::resolution(namespace, None, "not present in the map loader")
        })?;
        Ok(registrations
            .iter()
            .fold(Namespace::new(namespace), |loaded, registration| {
                loaded.with(*registration)
            }))
    }
}

/// Schema with every category, declared out of collection order.
pub fn every_category_schema() -> AttributeSchema {
    let mut schema = ParsableBase::new().schema().clone();
    schema
        .entity_list("foo-foo")
        .entity_map("foo-baz")
        .specialized("foo-bar")
        .entity("baz")
        .enumerated("bar")
        .plain("foo");
    schema
}
