//! API Router
//!
//! Builds the fixed collection/item route tree of the front door. Every
//! method is integrated with the same compute unit; requests reach it
//! unmodified.

use crate::error::WiringError;
use crate::provider::{ProvisionedResource, ResourceRef};
use crate::resource::ResourceType;
use crate::variant::RouteShape;
use serde::Serialize;
use std::fmt;

/// HTTP method, ordered the way routes are listed
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MethodBinding {
    pub method: HttpMethod,
    pub integration: ResourceRef,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteNode {
    pub path_part: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodBinding>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<RouteNode>,
}

impl RouteNode {
    fn new(path_part: &str) -> Self {
        Self {
            path_part: path_part.to_string(),
            methods: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add a child resource and return it
    pub fn add_resource(&mut self, path_part: &str) -> &mut RouteNode {
        let index = match self.children.iter().position(|c| c.path_part == path_part) {
            Some(index) => index,
            None => {
                self.children.push(RouteNode::new(path_part));
                self.children.len() - 1
            }
        };
        &mut self.children[index]
    }

    /// Bind a method. Binding the same method twice keeps one binding.
    pub fn add_method(&mut self, method: HttpMethod, integration: &ResourceRef) {
        if let Err(index) = self.methods.binary_search_by(|b| b.method.cmp(&method)) {
            self.methods.insert(
                index,
                MethodBinding {
                    method,
                    integration: integration.clone(),
                },
            );
        }
    }
}

/// One flattened route
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub path: String,
    pub methods: Vec<HttpMethod>,
}

impl fmt::Display for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let methods: Vec<&str> = self.methods.iter().map(HttpMethod::as_str).collect();
        write!(f, "{} {{{}}}", self.path, methods.join(","))
    }
}

/// Route tree of one front door
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteTree {
    pub api: ResourceRef,
    pub root: RouteNode,
}

impl RouteTree {
    /// Routes with at least one method, depth first
    pub fn routes(&self) -> Vec<Route> {
        let mut routes = Vec::new();
        for child in &self.root.children {
            collect_routes(child, "", &mut routes);
        }
        routes
    }

    /// Names of every compute unit the tree integrates with
    pub fn integrations(&self) -> Vec<&str> {
        let mut names = Vec::new();
        collect_integrations(&self.root, &mut names);
        names.sort_unstable();
        names.dedup();
        names
    }
}

fn collect_routes(node: &RouteNode, prefix: &str, routes: &mut Vec<Route>) {
    let path = format!("{}/{}", prefix, node.path_part);
    if !node.methods.is_empty() {
        routes.push(Route {
            path: path.clone(),
            methods: node.methods.iter().map(|b| b.method).collect(),
        });
    }
    for child in &node.children {
        collect_routes(child, &path, routes);
    }
}

fn collect_integrations<'t>(node: &'t RouteNode, names: &mut Vec<&'t str>) {
    names.extend(node.methods.iter().map(|b| b.integration.name.as_str()));
    for child in &node.children {
        collect_integrations(child, names);
    }
}

pub struct ApiRouter;

impl ApiRouter {
    /// Build the collection and item nodes for `shape`
    pub fn build(
        api: &ProvisionedResource,
        unit: &ProvisionedResource,
        shape: &RouteShape,
    ) -> Result<RouteTree, WiringError> {
        if unit.kind != ResourceType::Lambda {
            return Err(WiringError::NotComputeUnit {
                name: unit.name.clone(),
                kind: unit.kind,
            });
        }

        let integration = ResourceRef::from(unit);
        let mut root = RouteNode::new("");

        let collection = root.add_resource(shape.collection);
        collection.add_method(HttpMethod::Get, &integration);
        collection.add_method(HttpMethod::Post, &integration);

        let item = collection.add_resource(shape.item_segment);
        item.add_method(HttpMethod::Get, &integration);
        item.add_method(HttpMethod::Put, &integration);
        if shape.partial_update {
            item.add_method(HttpMethod::Patch, &integration);
        }
        item.add_method(HttpMethod::Delete, &integration);

        tracing::debug!(
            "Built /{} route tree for '{}' backed by '{}'",
            shape.collection,
            api.name,
            unit.name
        );

        Ok(RouteTree {
            api: api.into(),
            root,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::ResourceId;
    use crate::variant::Variant;

    fn handle(id: usize, kind: ResourceType, name: &str) -> ProvisionedResource {
        ProvisionedResource {
            id: ResourceId(id),
            kind,
            logical_id: name.to_string(),
            name: name.to_string(),
        }
    }

    fn tree(variant: Variant) -> RouteTree {
        ApiRouter::build(
            &handle(4, ResourceType::Api, "api"),
            &handle(2, ResourceType::Lambda, "crud"),
            &variant.blueprint().routes,
        )
        .unwrap()
    }

    fn rendered(variant: Variant) -> Vec<String> {
        tree(variant).routes().iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_images_routes() {
        assert_eq!(
            rendered(Variant::Images),
            vec!["/images {GET,POST}", "/images/{id} {GET,PUT,PATCH,DELETE}"]
        );
    }

    #[test]
    fn test_memeages_routes_have_no_patch() {
        assert_eq!(
            rendered(Variant::Memeages),
            vec!["/memes {GET,POST}", "/memes/{name} {GET,PUT,DELETE}"]
        );
    }

    #[test]
    fn test_image_drive_routes() {
        assert_eq!(
            rendered(Variant::ImageDrive),
            vec!["/images {GET,POST}", "/images/{image-id} {GET,PUT,PATCH,DELETE}"]
        );
    }

    #[test]
    fn test_single_integration() {
        assert_eq!(tree(Variant::Images).integrations(), vec!["crud"]);
    }

    #[test]
    fn test_add_method_is_idempotent_and_ordered() {
        let integration = ResourceRef::from(&handle(0, ResourceType::Lambda, "crud"));
        let mut node = RouteNode::new("x");
        node.add_method(HttpMethod::Delete, &integration);
        node.add_method(HttpMethod::Get, &integration);
        node.add_method(HttpMethod::Delete, &integration);
        let methods: Vec<_> = node.methods.iter().map(|b| b.method).collect();
        assert_eq!(methods, vec![HttpMethod::Get, HttpMethod::Delete]);
    }

    #[test]
    fn test_router_requires_a_compute_unit() {
        let err = ApiRouter::build(
            &handle(1, ResourceType::Api, "api"),
            &handle(0, ResourceType::Table, "info"),
            &Variant::Images.blueprint().routes,
        )
        .unwrap_err();
        assert!(matches!(err, WiringError::NotComputeUnit { .. }));
    }
}
