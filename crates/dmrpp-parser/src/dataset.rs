//! Dataset assembly: one group's dimensions, variables and attributes.

use indexmap::{IndexMap, IndexSet};
use serde::Serialize;
use tracing::{debug, warn};

use crate::attribute::{parse_attributes, Attributes};
use crate::classify::FileFormat;
use crate::dimension::{resolve_dims, DimensionSizes};
use crate::error::DmrppResult;
use crate::hierarchy::GroupScope;
use crate::variable::{parse_variable, Variable, PARSING_ONLY_ATTRIBUTES};
use crate::xml::{Element, XmlNamespace};

/// The variables of one group, split into coordinates and data variables.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    /// Normalized group path, `""` for the root.
    pub group: String,
    pub format: FileFormat,
    /// Dimensions declared by the group.
    pub dims: DimensionSizes,
    pub coords: IndexMap<String, Variable>,
    pub data_vars: IndexMap<String, Variable>,
    pub attrs: Attributes,
}

impl Dataset {
    /// Look up a variable by name, coordinates first.
    pub fn variable(&self, name: &str) -> Option<&Variable> {
        self.coords.get(name).or_else(|| self.data_vars.get(name))
    }

    /// All variables, coordinates first, each in document order.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        self.coords.values().chain(self.data_vars.values())
    }

    pub fn is_coord(&self, name: &str) -> bool {
        self.coords.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.coords.len() + self.data_vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sum of the chunk lengths of every chunked variable.
    pub fn total_chunk_bytes(&self) -> u64 {
        self.variables()
            .filter_map(|v| v.manifest.as_ref())
            .map(|m| m.total_bytes())
            .sum()
    }

    /// Rename variables, keeping their position. Unlisted names are kept.
    pub(crate) fn rename_variables(&mut self, renames: &IndexMap<String, String>) {
        if renames.is_empty() {
            return;
        }
        self.coords = rename_in(std::mem::take(&mut self.coords), renames);
        self.data_vars = rename_in(std::mem::take(&mut self.data_vars), renames);
    }
}

fn rename_in(
    variables: IndexMap<String, Variable>,
    renames: &IndexMap<String, String>,
) -> IndexMap<String, Variable> {
    let mut renamed = IndexMap::with_capacity(variables.len());
    for (name, mut variable) in variables {
        let new_name = renames.get(&name).cloned().unwrap_or(name);
        variable.name = new_name.clone();
        if renamed.insert(new_name.clone(), variable).is_some() {
            warn!(variable = %new_name, "Renamed variable collides with another, keeping the later one");
        }
    }
    renamed
}

/// Names of the variables acting as coordinates in a scope.
///
/// Collected from each variable's `coordinates` attribute and `<Map>`
/// children, and from a group-level `coordinates` attribute.
pub(crate) fn coordinate_names(scope: &GroupScope<'_>) -> DmrppResult<IndexSet<String>> {
    let mut names = IndexSet::new();
    for (variable, _) in &scope.variables {
        if let Some(coords) = variable.dap_attribute_text("coordinates") {
            names.extend(coords.split_whitespace().map(str::to_string));
        }
        for map in variable.children_named(XmlNamespace::Dap, "Map") {
            let name = map.require_attr("name")?;
            names.insert(name.strip_prefix('/').unwrap_or(name).to_string());
        }
    }
    let group_coords = scope
        .attributes
        .iter()
        .find(|a| a.attr("name") == Some("coordinates"))
        .and_then(|a| a.child(XmlNamespace::Dap, "Value"))
        .and_then(Element::text);
    if let Some(coords) = group_coords {
        names.extend(coords.split_whitespace().map(str::to_string));
    }
    Ok(names)
}

/// Build the dataset for one group scope.
///
/// When no coordinate names are declared, or fewer than the group has
/// dimensions, the group's dimension names are used as coordinate names.
pub(crate) fn build_dataset(
    document: &Element,
    scope: &GroupScope<'_>,
    format: FileFormat,
    data_path: &str,
) -> DmrppResult<Dataset> {
    let empty = DimensionSizes::new();
    let dims = resolve_dims(scope.dimensions.iter().copied(), &empty)?;
    let mut dims_table = resolve_dims(scope.inherited_dimensions.iter().copied(), &empty)?;
    dims_table.extend(dims.iter().map(|(k, v)| (k.clone(), *v)));

    let mut coord_names = coordinate_names(scope)?;
    if coord_names.is_empty() || coord_names.len() < dims.len() {
        coord_names = dims.keys().cloned().collect();
    }

    let mut coords = IndexMap::new();
    let mut data_vars = IndexMap::new();
    for (element, dap_type) in &scope.variables {
        let variable = parse_variable(element, *dap_type, &dims_table, data_path)?;
        let target = if coord_names.contains(&variable.name) {
            &mut coords
        } else {
            &mut data_vars
        };
        target.insert(variable.name.clone(), variable);
    }

    let mut attrs = parse_attributes(
        document
            .children_named(XmlNamespace::Dap, "Attribute")
            .filter(|a| a.attr("type") != Some("Container")),
    )?;
    attrs.extend(parse_attributes(scope.attributes.iter().copied())?);
    for key in PARSING_ONLY_ATTRIBUTES {
        attrs.shift_remove(key);
    }

    debug!(
        group = %scope.path,
        coords = coords.len(),
        data_vars = data_vars.len(),
        dims = dims.len(),
        "Built dataset"
    );

    Ok(Dataset {
        group: scope.path.clone(),
        format,
        dims,
        coords,
        data_vars,
        attrs,
    })
}
