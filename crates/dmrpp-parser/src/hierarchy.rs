//! Group discovery for HDF5 and netCDF4 documents.
//!
//! HDF5-based DMR++ documents are flat: every variable sits under the root
//! and its real location is recorded in a `fullnamepath` attribute. Those
//! documents are reorganized here into per-group scopes. netCDF4 documents
//! already nest `<Group>` elements and only need to be walked.
//!
//! Scopes borrow the elements of the parsed document; nothing is copied.

use std::collections::{HashMap, HashSet};

use indexmap::IndexMap;
use tracing::debug;

use crate::dimension::resolve_dims;
use crate::dtype::DapType;
use crate::error::{DmrppError, DmrppResult};
use crate::xml::{Element, XmlNamespace};

/// DAP element names that never declare a variable.
const STRUCTURAL_ELEMENTS: [&str; 7] = [
    "Dimension",
    "Dim",
    "Attribute",
    "Group",
    "Map",
    "Enumeration",
    "Value",
];

/// Elements that make up one group.
#[derive(Debug, Clone, Default)]
pub(crate) struct GroupScope<'a> {
    /// Normalized group path, `""` for the root.
    pub path: String,
    /// `<Dimension>` declarations owned by the group.
    pub dimensions: Vec<&'a Element>,
    /// `<Dimension>` declarations visible from enclosing groups.
    pub inherited_dimensions: Vec<&'a Element>,
    pub variables: Vec<(&'a Element, DapType)>,
    /// `<Attribute>` elements describing the group itself.
    pub attributes: Vec<&'a Element>,
    referenced_dims: HashSet<String>,
}

impl<'a> GroupScope<'a> {
    fn empty(path: &str) -> Self {
        Self {
            path: path.to_string(),
            ..Self::default()
        }
    }

    /// Scope made of a container element's direct children.
    fn from_element(path: &str, element: &'a Element) -> DmrppResult<Self> {
        Ok(Self {
            path: path.to_string(),
            dimensions: element
                .children_named(XmlNamespace::Dap, "Dimension")
                .collect(),
            inherited_dimensions: Vec::new(),
            variables: variable_elements(element)?,
            attributes: element
                .children_named(XmlNamespace::Dap, "Attribute")
                .collect(),
            referenced_dims: HashSet::new(),
        })
    }
}

/// Groups in discovery order, addressable by path.
#[derive(Debug, Default)]
pub(crate) struct GroupTable<'a> {
    groups: Vec<GroupScope<'a>>,
    index: HashMap<String, usize>,
}

impl<'a> GroupTable<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the scope for `path`, creating an empty one on first use.
    pub fn entry(&mut self, path: &str) -> &mut GroupScope<'a> {
        let idx = match self.index.get(path) {
            Some(&idx) => idx,
            None => {
                self.groups.push(GroupScope::empty(path));
                let idx = self.groups.len() - 1;
                self.index.insert(path.to_string(), idx);
                idx
            }
        };
        &mut self.groups[idx]
    }

    fn push(&mut self, scope: GroupScope<'a>) {
        self.index.insert(scope.path.clone(), self.groups.len());
        self.groups.push(scope);
    }

    pub fn get(&self, path: &str) -> Option<&GroupScope<'a>> {
        self.index.get(path).map(|&idx| &self.groups[idx])
    }

    fn get_mut(&mut self, path: &str) -> Option<&mut GroupScope<'a>> {
        self.index.get(path).map(|&idx| &mut self.groups[idx])
    }

    pub fn first(&self) -> Option<&GroupScope<'a>> {
        self.groups.first()
    }

    fn first_mut(&mut self) -> Option<&mut GroupScope<'a>> {
        self.groups.first_mut()
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.groups.iter().map(|g| g.path.as_str())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Variable-declaring children of a container element, in document order.
///
/// Any DAP element outside the structural set must name a known DAP type.
pub(crate) fn variable_elements(element: &Element) -> DmrppResult<Vec<(&Element, DapType)>> {
    let mut variables = Vec::new();
    for child in &element.children {
        if child.ns != XmlNamespace::Dap || STRUCTURAL_ELEMENTS.contains(&child.name.as_str()) {
            continue;
        }
        let dap_type = DapType::from_name(&child.name)
            .ok_or_else(|| DmrppError::UnknownDapType(child.name.clone()))?;
        variables.push((child, dap_type));
    }
    Ok(variables)
}

/// Normalize a group path: collapse `//`, `.` and `..`, drop slashes at both ends.
///
/// The root group is `""`, so `"/"` and `""` select the same group.
pub fn normalize_group_path(path: &str) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop();
            }
            s => parts.push(s),
        }
    }
    parts.join("/")
}

/// Group of an HDF5 object, from its `fullnamepath`.
fn group_of(fullnamepath: &str) -> String {
    let parent = match fullnamepath.rfind('/') {
        Some(idx) => &fullnamepath[..idx],
        None => "",
    };
    normalize_group_path(parent)
}

/// Reorganize a flat HDF5-based document into groups.
///
/// Variables are placed by the directory part of their `fullnamepath`;
/// variables without one are not part of any group. Each root dimension is
/// copied into every group with a variable referencing it by name.
/// Group attributes come from the `HDF5_GLOBAL` container when present.
/// Otherwise an attribute container's `fullnamepath` names the group it
/// describes; containers naming no group holding variables, and leaf
/// attributes, belong to the first group. No group is created for
/// attributes alone.
pub(crate) fn split_hdf5(root: &Element) -> DmrppResult<GroupTable<'_>> {
    let mut table = GroupTable::new();

    for (variable, dap_type) in variable_elements(root)? {
        let Some(fullnamepath) = variable.dap_attribute_text("fullnamepath") else {
            continue;
        };
        let scope = table.entry(&group_of(fullnamepath));
        scope.variables.push((variable, dap_type));
        let dims = resolve_dims(
            variable.children_named(XmlNamespace::Dap, "Dim"),
            &Default::default(),
        )?;
        scope.referenced_dims.extend(dims.into_keys());
    }

    for dimension in root.children_named(XmlNamespace::Dap, "Dimension") {
        let name = crate::dimension::basename(dimension.require_attr("name")?);
        for scope in table.groups.iter_mut() {
            if scope.referenced_dims.contains(name) {
                scope.dimensions.push(dimension);
            }
        }
    }

    if let Some(global) = root.dap_attribute("HDF5_GLOBAL") {
        if let Some(first) = table.first_mut() {
            first
                .attributes
                .extend(global.children_named(XmlNamespace::Dap, "Attribute"));
        }
    } else {
        for attribute in root.children_named(XmlNamespace::Dap, "Attribute") {
            let members: Vec<&Element> = attribute
                .children_named(XmlNamespace::Dap, "Attribute")
                .collect();
            let owner = attribute
                .dap_attribute_text("fullnamepath")
                .map(normalize_group_path)
                .filter(|path| table.get(path).is_some());
            let scope = match owner {
                Some(path) => table.get_mut(&path),
                None => table.first_mut(),
            };
            let Some(scope) = scope else {
                continue;
            };
            if members.is_empty() {
                scope.attributes.push(attribute);
            } else {
                scope.attributes.extend(members);
            }
        }
    }

    debug!(groups = table.len(), "Split HDF5 document into groups");
    Ok(table)
}

/// Collect the `<Group>` elements of a netCDF4 document, nested groups
/// included, keyed by their full path (`"a/b"`).
///
/// Dimensions declared by enclosing groups (and the root) are visible to
/// nested groups through [`GroupScope::inherited_dimensions`].
pub(crate) fn split_netcdf4(root: &Element) -> DmrppResult<GroupTable<'_>> {
    let mut table = GroupTable::new();
    let inherited: Vec<&Element> = root
        .children_named(XmlNamespace::Dap, "Dimension")
        .collect();
    collect_groups(root, "", &inherited, &mut table)?;
    debug!(groups = table.len(), "Collected netCDF4 groups");
    Ok(table)
}

fn collect_groups<'a>(
    parent: &'a Element,
    prefix: &str,
    inherited: &[&'a Element],
    table: &mut GroupTable<'a>,
) -> DmrppResult<()> {
    for group in parent.children_named(XmlNamespace::Dap, "Group") {
        let name = group.require_attr("name")?;
        let path = normalize_group_path(&format!("{}/{}", prefix, name));
        let mut scope = GroupScope::from_element(&path, group)?;
        scope.inherited_dimensions = inherited.to_vec();

        let mut visible = inherited.to_vec();
        visible.extend(scope.dimensions.iter().copied());
        table.push(scope);
        collect_groups(group, &path, &visible, table)?;
    }
    Ok(())
}

/// Root scope of a netCDF4 document.
pub(crate) fn root_scope(root: &Element) -> DmrppResult<GroupScope<'_>> {
    GroupScope::from_element("", root)
}

/// Variable renames declared through `origname`, in document order.
pub(crate) fn original_names(scope: &GroupScope<'_>) -> DmrppResult<IndexMap<String, String>> {
    let mut names = IndexMap::new();
    for (variable, _) in &scope.variables {
        if let Some(origname) = variable.dap_attribute_text("origname") {
            names.insert(
                variable.require_attr("name")?.to_string(),
                origname.to_string(),
            );
        }
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::xml::parse_document;

    fn names(scope: &GroupScope<'_>) -> Vec<String> {
        scope
            .variables
            .iter()
            .map(|(v, _)| v.attr("name").unwrap().to_string())
            .collect()
    }

    const ICESAT: &str = r#"<Dataset name="ATL03.h5">
        <Dimension name="delta_time" size="4"/>
        <Dimension name="ds_surf_type" size="5"/>
        <Float64 name="gt1r_heights_h_ph">
            <Dim name="/delta_time"/>
            <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights/h_ph</Value></Attribute>
            <Attribute name="origname" type="String"><Value>h_ph</Value></Attribute>
        </Float64>
        <Float64 name="gt1r_heights_delta_time">
            <Dim name="/delta_time"/>
            <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights/delta_time</Value></Attribute>
            <Attribute name="origname" type="String"><Value>delta_time</Value></Attribute>
        </Float64>
        <Int8 name="orbit_info_sc_orient">
            <Dim size="1"/>
            <Attribute name="fullnamepath" type="String"><Value>/orbit_info/sc_orient</Value></Attribute>
        </Int8>
        <Float32 name="loose"><Dim size="2"/></Float32>
        <Attribute name="gt1r_heights" type="Container">
            <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights</Value></Attribute>
            <Attribute name="description" type="String"><Value>photon heights</Value></Attribute>
        </Attribute>
        <Attribute name="short_name" type="String"><Value>ATL03</Value></Attribute>
    </Dataset>"#;

    #[test]
    fn test_normalize_group_path() {
        assert_eq!(normalize_group_path("/gt1r/heights"), "gt1r/heights");
        assert_eq!(normalize_group_path("gt1r//heights/"), "gt1r/heights");
        assert_eq!(normalize_group_path("/a/./b/../c"), "a/c");
        assert_eq!(normalize_group_path("/"), "");
        assert_eq!(normalize_group_path(""), "");
    }

    #[test]
    fn test_group_of() {
        assert_eq!(group_of("/gt1r/heights/h_ph"), "gt1r/heights");
        assert_eq!(group_of("/h_ph"), "");
        assert_eq!(group_of("h_ph"), "");
    }

    #[test]
    fn test_split_hdf5_groups_in_document_order() {
        let root = parse_document(ICESAT).unwrap();
        let table = split_hdf5(&root).unwrap();
        let paths: Vec<&str> = table.paths().collect();
        assert_eq!(paths, vec!["gt1r/heights", "orbit_info"]);

        let heights = table.get("gt1r/heights").unwrap();
        assert_eq!(
            names(heights),
            vec!["gt1r_heights_h_ph", "gt1r_heights_delta_time"]
        );
    }

    #[test]
    fn test_split_hdf5_dims_copied_to_referencing_groups() {
        let root = parse_document(ICESAT).unwrap();
        let table = split_hdf5(&root).unwrap();

        let heights = table.get("gt1r/heights").unwrap();
        let dims: Vec<&str> = heights
            .dimensions
            .iter()
            .map(|d| d.attr("name").unwrap())
            .collect();
        assert_eq!(dims, vec!["delta_time"]);
        assert!(table.get("orbit_info").unwrap().dimensions.is_empty());
    }

    #[test]
    fn test_split_hdf5_attributes_by_fullnamepath() {
        let root = parse_document(ICESAT).unwrap();
        let table = split_hdf5(&root).unwrap();

        let heights = table.get("gt1r/heights").unwrap();
        let attrs: Vec<&str> = heights
            .attributes
            .iter()
            .map(|a| a.attr("name").unwrap())
            .collect();
        // short_name has no fullnamepath and lands in the first group
        assert_eq!(attrs, vec!["fullnamepath", "description", "short_name"]);
    }

    fn attribute_names(scope: &GroupScope<'_>) -> Vec<String> {
        scope
            .attributes
            .iter()
            .map(|a| a.attr("name").unwrap().to_string())
            .collect()
    }

    #[test]
    fn test_split_hdf5_container_owned_by_named_group() {
        let xml = r#"<Dataset name="ATL03.h5">
            <Float32 name="gt1r_heights_h_ph">
                <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights/h_ph</Value></Attribute>
            </Float32>
            <Int8 name="orbit_info_sc_orient">
                <Attribute name="fullnamepath" type="String"><Value>/orbit_info/sc_orient</Value></Attribute>
            </Int8>
            <Attribute name="orbit_info" type="Container">
                <Attribute name="Description" type="String"><Value>orbit</Value></Attribute>
                <Attribute name="fullnamepath" type="String"><Value>/orbit_info</Value></Attribute>
            </Attribute>
            <Attribute name="gt1r_heights" type="Container">
                <Attribute name="data_rate" type="String"><Value>photon rate</Value></Attribute>
                <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights/</Value></Attribute>
            </Attribute>
        </Dataset>"#;
        let root = parse_document(xml).unwrap();
        let table = split_hdf5(&root).unwrap();
        assert_eq!(table.paths().collect::<Vec<_>>(), vec!["gt1r/heights", "orbit_info"]);
        assert_eq!(
            attribute_names(table.get("gt1r/heights").unwrap()),
            vec!["data_rate", "fullnamepath"]
        );
        assert_eq!(
            attribute_names(table.get("orbit_info").unwrap()),
            vec!["Description", "fullnamepath"]
        );
    }

    #[test]
    fn test_split_hdf5_container_without_variables_goes_to_first_group() {
        let xml = r#"<Dataset name="ATL03.h5">
            <Float32 name="gt1r_heights_h_ph">
                <Attribute name="fullnamepath" type="String"><Value>/gt1r/heights/h_ph</Value></Attribute>
            </Float32>
            <Int8 name="orbit_info_sc_orient">
                <Attribute name="fullnamepath" type="String"><Value>/orbit_info/sc_orient</Value></Attribute>
            </Int8>
            <Attribute name="gt1r" type="Container">
                <Attribute name="atlas_pce" type="String"><Value>pce1</Value></Attribute>
                <Attribute name="fullnamepath" type="String"><Value>/gt1r</Value></Attribute>
            </Attribute>
            <Attribute name="ancillary_data" type="Container">
                <Attribute name="release" type="String"><Value>006</Value></Attribute>
                <Attribute name="fullnamepath" type="String"><Value>/ancillary_data</Value></Attribute>
            </Attribute>
        </Dataset>"#;
        let root = parse_document(xml).unwrap();
        let table = split_hdf5(&root).unwrap();
        assert_eq!(table.len(), 2);
        assert!(table.get("gt1r").is_none());
        assert!(table.get("ancillary_data").is_none());
        assert!(table.get("").is_none());
        assert_eq!(
            attribute_names(table.first().unwrap()),
            vec!["atlas_pce", "fullnamepath", "release", "fullnamepath"]
        );
        assert!(table.get("orbit_info").unwrap().attributes.is_empty());
    }

    #[test]
    fn test_split_hdf5_global_container() {
        let xml = r#"<Dataset name="f.h5">
            <Float32 name="v">
                <Dim size="2"/>
                <Attribute name="fullnamepath" type="String"><Value>/v</Value></Attribute>
            </Float32>
            <Attribute name="HDF5_GLOBAL" type="Container">
                <Attribute name="title" type="String"><Value>t</Value></Attribute>
            </Attribute>
        </Dataset>"#;
        let root = parse_document(xml).unwrap();
        let table = split_hdf5(&root).unwrap();
        let scope = table.get("").unwrap();
        assert_eq!(scope.attributes.len(), 1);
        assert_eq!(scope.attributes[0].attr("name"), Some("title"));
    }

    #[test]
    fn test_original_names() {
        let root = parse_document(ICESAT).unwrap();
        let table = split_hdf5(&root).unwrap();
        let renames = original_names(table.get("gt1r/heights").unwrap()).unwrap();
        assert_eq!(renames.get("gt1r_heights_h_ph").map(String::as_str), Some("h_ph"));
        assert!(original_names(table.get("orbit_info").unwrap())
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_split_netcdf4_nested_groups() {
        let xml = r#"<Dataset name="s.nc">
            <Dimension name="time" size="3"/>
            <Group name="science">
                <Dimension name="x" size="10"/>
                <Float32 name="a"><Dim name="/time"/><Dim name="x"/></Float32>
                <Group name="grids">
                    <Float32 name="b"><Dim name="x"/></Float32>
                </Group>
            </Group>
            <Group name="meta"/>
        </Dataset>"#;
        let root = parse_document(xml).unwrap();
        let table = split_netcdf4(&root).unwrap();
        let paths: Vec<&str> = table.paths().collect();
        assert_eq!(paths, vec!["science", "science/grids", "meta"]);

        let grids = table.get("science/grids").unwrap();
        assert_eq!(names(grids), vec!["b"]);
        assert!(grids.dimensions.is_empty());
        assert_eq!(grids.inherited_dimensions.len(), 2);
    }

    #[test]
    fn test_flat_netcdf4_has_no_groups() {
        let root = parse_document(r#"<Dataset name="s.nc"><Float32 name="a"/></Dataset>"#).unwrap();
        assert!(split_netcdf4(&root).unwrap().is_empty());
        assert_eq!(names(&root_scope(&root).unwrap()), vec!["a"]);
    }

    #[test]
    fn test_unknown_variable_element() {
        let root =
            parse_document(r#"<Dataset name="s.nc"><Float128 name="a"/></Dataset>"#).unwrap();
        let err = root_scope(&root).unwrap_err();
        assert!(matches!(err, DmrppError::UnknownDapType(t) if t == "Float128"));
    }

    #[test]
    fn test_group_table_entry_reuses_scope() {
        let mut table = GroupTable::new();
        table.entry("a");
        table.entry("b");
        table.entry("a");
        assert_eq!(table.len(), 2);
        assert_eq!(table.first().map(|g| g.path.as_str()), Some("a"));
    }
}
