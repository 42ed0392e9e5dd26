//! Utilities for loading meshes generated with [`gmsh`](https://www.gmsh.info/).
//!
//! Only version 4.1 of the MSH format is supported,
//! as per the [`mshio`] library.

use crate::error::GdError;
use crate::mesh::SegmentMesh;

/// Error in loading a mesh from a Gmsh .msh file.
#[derive(thiserror::Error, Debug)]
pub enum GmshError {
    /// Error parsing the .msh file.
    ///
    /// (Implementation note: parser error converted to string
    /// to avoid lifetime issues with the byte slices it contains)
    #[error("Parsing the .msh data failed: {0}")]
    ParseError(String),
    /// The given .msh file contains no nodes.
    #[error("Invalid .msh data: no nodes")]
    MissingNodes,
    /// The given .msh file contains no elements of the supported type.
    #[error("Invalid .msh data: no elements of the correct type")]
    MissingElements,
    /// An element refers to a node that doesn't exist.
    #[error("Invalid .msh data: element refers to unknown node {0}")]
    InvalidNodeTag(u64),
    /// The elements don't form a valid segment mesh.
    #[error("Invalid .msh data: {0}")]
    InvalidMesh(#[from] GdError),
}

/// Load a 1D segment mesh from a `.msh` file.
///
/// First-order line elements in the file are interpreted as the segments of the mesh.
/// These must be of type `Lin2` (see [`ElementType`][mshio::ElementType]).
/// Only the `x` coordinate of vertices is used.
pub fn load_segment_mesh(bytes: &[u8]) -> Result<SegmentMesh, GmshError> {
    let msh = mshio::parse_msh_bytes(bytes).map_err(|e| GmshError::ParseError(format!("{}", e)))?;
    let nodes = msh.data.nodes.ok_or(GmshError::MissingNodes)?;
    let elements = msh.data.elements.ok_or(GmshError::MissingElements)?;

    let vertices: Vec<f64> = nodes
        .node_blocks
        .iter()
        .flat_map(|block| block.nodes.iter())
        .map(|node| node.x)
        .collect();
    if vertices.is_empty() {
        return Err(GmshError::MissingNodes);
    }

    let indices: Vec<usize> = elements
        .element_blocks
        .iter()
        .filter(|block| block.element_type == mshio::ElementType::Lin2)
        .flat_map(|block| block.elements.iter())
        .flat_map(|el| el.nodes.iter())
        // gmsh tags start at 1 and are assumed to be sequential,
        // so subtracting 1 gives the position in the vertex array
        .map(|&node_tag| match (node_tag as usize).checked_sub(1) {
            Some(idx) if idx < vertices.len() => Ok(idx),
            _ => Err(GmshError::InvalidNodeTag(node_tag)),
        })
        .collect::<Result<_, _>>()?;
    if indices.is_empty() {
        return Err(GmshError::MissingElements);
    }

    log::info!(
        "loaded segment mesh with {} vertices and {} elements",
        vertices.len(),
        indices.len() / 2
    );
    Ok(SegmentMesh::new(vertices, indices)?)
}

//
// tests
//
