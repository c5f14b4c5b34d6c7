// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Federation object model.
//!
//! [`ObjectModel`] is the serde-friendly description a federation execution
//! is created from. [`Catalog`] is its resolved form: every class, attribute,
//! parameter and dimension has a handle, inherited attributes and parameters
//! are flattened, and the `HLAobjectRoot` / `HLAinteractionRoot` classes are
//! implicit.
//!
//! # Examples
//!
//! ```
//! use hrti::fom::{AttributeDef, InteractionClassDef, ObjectClassDef, ObjectModel};
//! use hrti::OrderType;
//!
//! let model = ObjectModel::new("Traffic")
//!     .with_dimension("Lane", 4)
//!     .with_object_class(
//!         ObjectClassDef::new("Vehicle")
//!             .with_attribute(AttributeDef::new("Position").with_order(OrderType::Timestamp)),
//!     )
//!     .with_object_class(ObjectClassDef::new("Car").with_parent("Vehicle"))
//!     .with_interaction_class(InteractionClassDef::new("Horn").with_parameter("Volume"));
//!
//! let catalog = model.resolve().unwrap();
//! let car = catalog.object_class_handle("Car").unwrap();
//! // Inherited from Vehicle:
//! assert!(catalog.attribute_handle(car, "Position").is_ok());
//! ```

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::{Result, RtiError};
use crate::handle::{
    AttributeHandle, AttributeHandleSet, AttributeKind, DimensionHandle, DimensionHandleSet,
    DimensionKind, HandleAllocator, InteractionClassHandle, InteractionClassKind,
    ObjectClassHandle, ObjectClassKind, ParameterHandle, ParameterKind,
};
use crate::types::{OrderType, TransportationType};

/// Name of the implicit root object class.
pub const OBJECT_ROOT: &str = "HLAobjectRoot";
/// Name of the implicit root interaction class.
pub const INTERACTION_ROOT: &str = "HLAinteractionRoot";
/// Attribute every object class inherits from the root.
pub const PRIVILEGE_TO_DELETE: &str = "HLAprivilegeToDeleteObject";

/// Federation object model as supplied by the creator of a federation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObjectModel {
    pub name: String,
    #[serde(default)]
    pub dimensions: Vec<DimensionDef>,
    #[serde(default)]
    pub object_classes: Vec<ObjectClassDef>,
    #[serde(default)]
    pub interaction_classes: Vec<InteractionClassDef>,
}

/// Routing-space dimension with values in `[0, upper_bound)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionDef {
    pub name: String,
    pub upper_bound: u64,
}

/// Object class declaration. `parent` defaults to `HLAobjectRoot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectClassDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub attributes: Vec<AttributeDef>,
}

/// Attribute declaration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    pub name: String,
    #[serde(default)]
    pub order: OrderType,
    #[serde(default)]
    pub transportation: TransportationType,
    /// Dimension names available for region association.
    #[serde(default)]
    pub dimensions: Vec<String>,
}

/// Interaction class declaration. `parent` defaults to `HLAinteractionRoot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InteractionClassDef {
    pub name: String,
    #[serde(default)]
    pub parent: Option<String>,
    #[serde(default)]
    pub parameters: Vec<String>,
    #[serde(default)]
    pub order: OrderType,
    #[serde(default)]
    pub transportation: TransportationType,
    #[serde(default)]
    pub dimensions: Vec<String>,
}

impl ObjectModel {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>, upper_bound: u64) -> Self {
        self.dimensions.push(DimensionDef {
            name: name.into(),
            upper_bound,
        });
        self
    }

    pub fn with_object_class(mut self, class: ObjectClassDef) -> Self {
        self.object_classes.push(class);
        self
    }

    pub fn with_interaction_class(mut self, class: InteractionClassDef) -> Self {
        self.interaction_classes.push(class);
        self
    }

    /// Resolve names into handles.
    ///
    /// # Errors
    ///
    /// `ErrorReadingFdd` for duplicate names, unknown parents or dimensions,
    /// inheritance cycles, and zero-sized dimensions.
    pub fn resolve(&self) -> Result<Catalog> {
        Catalog::build(self)
    }
}

impl ObjectClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            attributes: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_attribute(mut self, attribute: AttributeDef) -> Self {
        self.attributes.push(attribute);
        self
    }
}

impl AttributeDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            order: OrderType::Receive,
            transportation: TransportationType::Reliable,
            dimensions: Vec::new(),
        }
    }

    pub fn with_order(mut self, order: OrderType) -> Self {
        self.order = order;
        self
    }

    pub fn with_transportation(mut self, transportation: TransportationType) -> Self {
        self.transportation = transportation;
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }
}

impl InteractionClassDef {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parent: None,
            parameters: Vec::new(),
            order: OrderType::Receive,
            transportation: TransportationType::Reliable,
            dimensions: Vec::new(),
        }
    }

    pub fn with_parent(mut self, parent: impl Into<String>) -> Self {
        self.parent = Some(parent.into());
        self
    }

    pub fn with_parameter(mut self, parameter: impl Into<String>) -> Self {
        self.parameters.push(parameter.into());
        self
    }

    pub fn with_order(mut self, order: OrderType) -> Self {
        self.order = order;
        self
    }

    pub fn with_transportation(mut self, transportation: TransportationType) -> Self {
        self.transportation = transportation;
        self
    }

    pub fn with_dimension(mut self, dimension: impl Into<String>) -> Self {
        self.dimensions.push(dimension.into());
        self
    }
}

// ============================================================================
// Resolved catalog
// ============================================================================

#[derive(Debug, Clone)]
pub struct ObjectClassInfo {
    pub handle: ObjectClassHandle,
    pub name: String,
    pub parent: Option<ObjectClassHandle>,
    /// Declared plus inherited attributes.
    pub attributes: AttributeHandleSet,
}

#[derive(Debug, Clone)]
pub struct AttributeInfo {
    pub handle: AttributeHandle,
    pub name: String,
    pub declared_in: ObjectClassHandle,
    pub order: OrderType,
    pub transportation: TransportationType,
    pub dimensions: DimensionHandleSet,
}

#[derive(Debug, Clone)]
pub struct InteractionClassInfo {
    pub handle: InteractionClassHandle,
    pub name: String,
    pub parent: Option<InteractionClassHandle>,
    /// Declared plus inherited parameters.
    pub parameters: BTreeSet<ParameterHandle>,
    pub order: OrderType,
    pub transportation: TransportationType,
    pub dimensions: DimensionHandleSet,
}

#[derive(Debug, Clone)]
pub struct ParameterInfo {
    pub handle: ParameterHandle,
    pub name: String,
    pub declared_in: InteractionClassHandle,
}

#[derive(Debug, Clone)]
pub struct DimensionInfo {
    pub handle: DimensionHandle,
    pub name: String,
    pub upper_bound: u64,
}

/// Resolved, immutable object model shared by a federation execution.
#[derive(Debug, Clone)]
pub struct Catalog {
    name: String,
    object_classes: BTreeMap<ObjectClassHandle, ObjectClassInfo>,
    object_class_names: HashMap<String, ObjectClassHandle>,
    attributes: BTreeMap<AttributeHandle, AttributeInfo>,
    interaction_classes: BTreeMap<InteractionClassHandle, InteractionClassInfo>,
    interaction_class_names: HashMap<String, InteractionClassHandle>,
    parameters: BTreeMap<ParameterHandle, ParameterInfo>,
    dimensions: BTreeMap<DimensionHandle, DimensionInfo>,
    dimension_names: HashMap<String, DimensionHandle>,
    privilege_to_delete: AttributeHandle,
}

fn fdd_error(message: impl Into<String>) -> RtiError {
    RtiError::ErrorReadingFdd(message.into())
}

/// Order declarations so that every parent precedes its children.
fn parent_first<'a, D>(
    defs: &'a [D],
    root: &str,
    kind: &str,
    name_of: impl Fn(&D) -> &str,
    parent_of: impl Fn(&D) -> Option<&str>,
) -> Result<Vec<&'a D>> {
    let mut seen: HashMap<&str, ()> = HashMap::new();
    for def in defs {
        let name = name_of(def);
        if name.is_empty() || name == root || seen.insert(name, ()).is_some() {
            return Err(fdd_error(format!("duplicate or reserved {} name '{}'", kind, name)));
        }
    }
    for def in defs {
        if let Some(parent) = parent_of(def) {
            if parent != root && !seen.contains_key(parent) {
                return Err(fdd_error(format!(
                    "{} '{}' has unknown parent '{}'",
                    kind,
                    name_of(def),
                    parent
                )));
            }
        }
    }

    let mut placed: BTreeSet<&str> = BTreeSet::new();
    let mut ordered = Vec::with_capacity(defs.len());
    while ordered.len() < defs.len() {
        let before = ordered.len();
        for def in defs {
            let name = name_of(def);
            if placed.contains(name) {
                continue;
            }
            let ready = match parent_of(def) {
                None => true,
                Some(p) if p == root => true,
                Some(p) => placed.contains(p),
            };
            if ready {
                placed.insert(name);
                ordered.push(def);
            }
        }
        if ordered.len() == before {
            return Err(fdd_error(format!("inheritance cycle among {} classes", kind)));
        }
    }
    Ok(ordered)
}

impl Catalog {
    fn build(model: &ObjectModel) -> Result<Self> {
        let mut catalog = Catalog {
            name: model.name.clone(),
            object_classes: BTreeMap::new(),
            object_class_names: HashMap::new(),
            attributes: BTreeMap::new(),
            interaction_classes: BTreeMap::new(),
            interaction_class_names: HashMap::new(),
            parameters: BTreeMap::new(),
            dimensions: BTreeMap::new(),
            dimension_names: HashMap::new(),
            privilege_to_delete: AttributeHandle::new(0),
        };

        let mut dimension_ids = HandleAllocator::<DimensionKind>::default();
        for def in &model.dimensions {
            if def.upper_bound == 0 {
                return Err(fdd_error(format!("dimension '{}' has upper bound 0", def.name)));
            }
            if catalog.dimension_names.contains_key(&def.name) {
                return Err(fdd_error(format!("duplicate dimension '{}'", def.name)));
            }
            let handle = dimension_ids.allocate();
            catalog.dimension_names.insert(def.name.clone(), handle);
            catalog.dimensions.insert(
                handle,
                DimensionInfo {
                    handle,
                    name: def.name.clone(),
                    upper_bound: def.upper_bound,
                },
            );
        }

        let mut class_ids = HandleAllocator::<ObjectClassKind>::default();
        let mut attribute_ids = HandleAllocator::<AttributeKind>::default();

        let root = class_ids.allocate();
        let privilege = attribute_ids.allocate();
        catalog.privilege_to_delete = privilege;
        catalog.attributes.insert(
            privilege,
            AttributeInfo {
                handle: privilege,
                name: PRIVILEGE_TO_DELETE.to_string(),
                declared_in: root,
                order: OrderType::Receive,
                transportation: TransportationType::Reliable,
                dimensions: DimensionHandleSet::new(),
            },
        );
        catalog.insert_object_class(ObjectClassInfo {
            handle: root,
            name: OBJECT_ROOT.to_string(),
            parent: None,
            attributes: [privilege].into_iter().collect(),
        });

        let ordered = parent_first(
            &model.object_classes,
            OBJECT_ROOT,
            "object",
            |d| d.name.as_str(),
            |d| d.parent.as_deref(),
        )?;
        for def in ordered {
            let parent = match def.parent.as_deref() {
                None => root,
                Some(p) => catalog.object_class_handle(p)?,
            };
            let handle = class_ids.allocate();
            let mut attributes = catalog.object_classes[&parent].attributes.clone();
            for attr in &def.attributes {
                if attributes
                    .iter()
                    .any(|a| catalog.attributes[a].name == attr.name)
                {
                    return Err(fdd_error(format!(
                        "attribute '{}' declared twice in hierarchy of '{}'",
                        attr.name, def.name
                    )));
                }
                let dimensions = catalog.dimension_set(&attr.dimensions)?;
                let attr_handle = attribute_ids.allocate();
                catalog.attributes.insert(
                    attr_handle,
                    AttributeInfo {
                        handle: attr_handle,
                        name: attr.name.clone(),
                        declared_in: handle,
                        order: attr.order,
                        transportation: attr.transportation,
                        dimensions,
                    },
                );
                attributes.insert(attr_handle);
            }
            catalog.insert_object_class(ObjectClassInfo {
                handle,
                name: def.name.clone(),
                parent: Some(parent),
                attributes,
            });
        }

        let mut interaction_ids = HandleAllocator::<InteractionClassKind>::default();
        let mut parameter_ids = HandleAllocator::<ParameterKind>::default();
        let interaction_root = interaction_ids.allocate();
        catalog.insert_interaction_class(InteractionClassInfo {
            handle: interaction_root,
            name: INTERACTION_ROOT.to_string(),
            parent: None,
            parameters: BTreeSet::new(),
            order: OrderType::Receive,
            transportation: TransportationType::Reliable,
            dimensions: DimensionHandleSet::new(),
        });

        let ordered = parent_first(
            &model.interaction_classes,
            INTERACTION_ROOT,
            "interaction",
            |d| d.name.as_str(),
            |d| d.parent.as_deref(),
        )?;
        for def in ordered {
            let parent = match def.parent.as_deref() {
                None => interaction_root,
                Some(p) => catalog.interaction_class_handle(p)?,
            };
            let handle = interaction_ids.allocate();
            let mut parameters = catalog.interaction_classes[&parent].parameters.clone();
            for name in &def.parameters {
                if parameters.iter().any(|p| catalog.parameters[p].name == *name) {
                    return Err(fdd_error(format!(
                        "parameter '{}' declared twice in hierarchy of '{}'",
                        name, def.name
                    )));
                }
                let param = parameter_ids.allocate();
                catalog.parameters.insert(
                    param,
                    ParameterInfo {
                        handle: param,
                        name: name.clone(),
                        declared_in: handle,
                    },
                );
                parameters.insert(param);
            }
            let dimensions = catalog.dimension_set(&def.dimensions)?;
            catalog.insert_interaction_class(InteractionClassInfo {
                handle,
                name: def.name.clone(),
                parent: Some(parent),
                parameters,
                order: def.order,
                transportation: def.transportation,
                dimensions,
            });
        }

        log::debug!(
            "[fom] resolved '{}': {} object classes, {} interaction classes, {} dimensions",
            catalog.name,
            catalog.object_classes.len(),
            catalog.interaction_classes.len(),
            catalog.dimensions.len()
        );
        Ok(catalog)
    }

    fn insert_object_class(&mut self, info: ObjectClassInfo) {
        self.object_class_names.insert(info.name.clone(), info.handle);
        self.object_classes.insert(info.handle, info);
    }

    fn insert_interaction_class(&mut self, info: InteractionClassInfo) {
        self.interaction_class_names
            .insert(info.name.clone(), info.handle);
        self.interaction_classes.insert(info.handle, info);
    }

    fn dimension_set(&self, names: &[String]) -> Result<DimensionHandleSet> {
        names
            .iter()
            .map(|n| {
                self.dimension_names
                    .get(n)
                    .copied()
                    .ok_or_else(|| fdd_error(format!("unknown dimension '{}'", n)))
            })
            .collect()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// The shared `HLAprivilegeToDeleteObject` attribute.
    pub fn privilege_to_delete(&self) -> AttributeHandle {
        self.privilege_to_delete
    }

    // ---- object classes -------------------------------------------------

    pub fn object_class(&self, class: ObjectClassHandle) -> Result<&ObjectClassInfo> {
        self.object_classes
            .get(&class)
            .ok_or(RtiError::ObjectClassNotDefined(class))
    }

    pub fn object_class_handle(&self, name: &str) -> Result<ObjectClassHandle> {
        self.object_class_names
            .get(name)
            .copied()
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    /// `true` when `class` equals `ancestor` or inherits from it.
    pub fn is_subclass_of(&self, class: ObjectClassHandle, ancestor: ObjectClassHandle) -> bool {
        let mut current = Some(class);
        while let Some(c) = current {
            if c == ancestor {
                return true;
            }
            current = self.object_classes.get(&c).and_then(|info| info.parent);
        }
        false
    }

    /// `class` followed by its ancestors up to the root.
    pub fn object_class_lineage(&self, class: ObjectClassHandle) -> Vec<ObjectClassHandle> {
        let mut lineage = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            lineage.push(c);
            current = self.object_classes.get(&c).and_then(|info| info.parent);
        }
        lineage
    }

    /// Fail with `AttributeNotDefined` unless every attribute belongs to `class`.
    pub fn check_attributes(
        &self,
        class: ObjectClassHandle,
        attributes: &AttributeHandleSet,
    ) -> Result<()> {
        let info = self.object_class(class)?;
        match attributes.iter().find(|a| !info.attributes.contains(a)) {
            Some(missing) => Err(RtiError::AttributeNotDefined(*missing)),
            None => Ok(()),
        }
    }

    pub fn attribute(&self, attribute: AttributeHandle) -> Result<&AttributeInfo> {
        self.attributes
            .get(&attribute)
            .ok_or(RtiError::AttributeNotDefined(attribute))
    }

    pub fn attribute_handle(&self, class: ObjectClassHandle, name: &str) -> Result<AttributeHandle> {
        let info = self.object_class(class)?;
        info.attributes
            .iter()
            .copied()
            .find(|a| self.attributes[a].name == name)
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    pub fn attribute_name(&self, class: ObjectClassHandle, attribute: AttributeHandle) -> Result<&str> {
        self.check_attributes(class, &[attribute].into_iter().collect())?;
        Ok(self.attribute(attribute)?.name.as_str())
    }

    // ---- interaction classes -------------------------------------------

    pub fn interaction_class(&self, class: InteractionClassHandle) -> Result<&InteractionClassInfo> {
        self.interaction_classes
            .get(&class)
            .ok_or(RtiError::InteractionClassNotDefined(class))
    }

    pub fn interaction_class_handle(&self, name: &str) -> Result<InteractionClassHandle> {
        self.interaction_class_names
            .get(name)
            .copied()
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    pub fn interaction_lineage(&self, class: InteractionClassHandle) -> Vec<InteractionClassHandle> {
        let mut lineage = Vec::new();
        let mut current = Some(class);
        while let Some(c) = current {
            lineage.push(c);
            current = self.interaction_classes.get(&c).and_then(|info| info.parent);
        }
        lineage
    }

    pub fn parameter_handle(&self, class: InteractionClassHandle, name: &str) -> Result<ParameterHandle> {
        let info = self.interaction_class(class)?;
        info.parameters
            .iter()
            .copied()
            .find(|p| self.parameters[p].name == name)
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }

    pub fn parameter_name(&self, class: InteractionClassHandle, parameter: ParameterHandle) -> Result<&str> {
        let info = self.interaction_class(class)?;
        if !info.parameters.contains(&parameter) {
            return Err(RtiError::InteractionParameterNotDefined(parameter));
        }
        Ok(self.parameters[&parameter].name.as_str())
    }

    // ---- dimensions ------------------------------------------------------

    pub fn dimension(&self, dimension: DimensionHandle) -> Result<&DimensionInfo> {
        self.dimensions
            .get(&dimension)
            .ok_or(RtiError::InvalidDimensionHandle(dimension))
    }

    pub fn dimension_handle(&self, name: &str) -> Result<DimensionHandle> {
        self.dimension_names
            .get(name)
            .copied()
            .ok_or_else(|| RtiError::NameNotFound(name.to_string()))
    }
}
