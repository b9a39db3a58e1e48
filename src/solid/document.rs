// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Output document: named solids in insertion order

use crate::error::{KernelError, KernelResult};
use crate::geometry::Mesh;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Building-element class an element is exported as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementClass {
    Plate,
    Beam,
    Member,
}

impl ElementClass {
    /// IFC entity keyword
    pub fn ifc_entity(self) -> &'static str {
        match self {
            ElementClass::Plate => "IFCPLATE",
            ElementClass::Beam => "IFCBEAM",
            ElementClass::Member => "IFCMEMBER",
        }
    }
}

impl fmt::Display for ElementClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementClass::Plate => "Plate",
            ElementClass::Beam => "Beam",
            ElementClass::Member => "Member",
        };
        f.write_str(name)
    }
}

/// One named solid of the document
#[derive(Debug, Clone)]
pub struct Element<S> {
    pub name: String,
    pub class: ElementClass,
    /// Spatial container; `None` is the bridge itself
    pub container: Option<String>,
    pub solid: S,
}

/// Single-writer output document
#[derive(Debug, Clone)]
pub struct Document<S = Mesh> {
    pub name: String,
    elements: Vec<Element<S>>,
    names: HashSet<String>,
}

impl<S> Document<S> {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            elements: Vec::new(),
            names: HashSet::new(),
        }
    }

    /// Register `solid` under `name`; names are unique across the document.
    ///
    /// Returns the element's insertion index.
    pub fn attach_named_element(
        &mut self,
        container: Option<&str>,
        solid: S,
        name: &str,
        class: ElementClass,
    ) -> KernelResult<usize> {
        if !self.names.insert(name.to_string()) {
            return Err(KernelError::DuplicateName(name.to_string()));
        }
        self.elements.push(Element {
            name: name.to_string(),
            class,
            container: container.map(str::to_string),
            solid,
        });
        Ok(self.elements.len() - 1)
    }

    pub fn elements(&self) -> &[Element<S>] {
        &self.elements
    }

    pub fn get(&self, name: &str) -> Option<&Element<S>> {
        self.elements.iter().find(|e| e.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Distinct container names in first-use order
    pub fn containers(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.elements
            .iter()
            .filter_map(|e| e.container.as_deref())
            .filter(|c| seen.insert(*c))
            .collect()
    }
}
