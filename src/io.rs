//! Plain text output of matrices and fields.

use std::io::Write;

use nalgebra_sparse as nas;

use crate::error::Result;
use crate::field::GridFunction;
use crate::space::DgSpace;

/// Write a sparse matrix as 1-based `row col value` triplets, one per line,
/// preceded by `%`-comment lines giving its size and nonzero count.
///
/// This is the format Matlab's `spconvert` reads.
pub fn write_triplets(mut out: impl Write, mat: &nas::CsrMatrix<f64>) -> Result<()> {
    writeln!(out, "% size {} {}", mat.nrows(), mat.ncols())?;
    writeln!(out, "% Non Zeros {}", mat.nnz())?;
    for (row, col, val) in mat.triplet_iter() {
        writeln!(out, "{} {} {:.16e}", row + 1, col + 1, val)?;
    }
    Ok(())
}

/// Write the space's mesh, and optionally a field on it,
/// as a legacy ASCII VTK unstructured grid.
///
/// Every element gets its own pair of points so that the field
/// can be discontinuous between elements.
/// Point data is the first component of the field evaluated at the element ends,
/// and the cell data `measure` is the length each element represents,
/// which differs from its geometric length for cut cells.
pub fn write_vtk(
    mut out: impl Write,
    space: &DgSpace,
    field: Option<(&GridFunction, &str)>,
) -> Result<()> {
    let mesh = space.mesh();
    let element_count = mesh.element_count();

    writeln!(out, "# vtk DataFile Version 3.0")?;
    writeln!(out, "gdspace output")?;
    writeln!(out, "ASCII")?;
    writeln!(out, "DATASET UNSTRUCTURED_GRID")?;

    writeln!(out, "POINTS {} double", 2 * element_count)?;
    for elem in 0..element_count {
        for x in mesh.element_vertices(elem) {
            writeln!(out, "{x} 0 0")?;
        }
    }
    writeln!(out, "CELLS {} {}", element_count, 3 * element_count)?;
    for elem in 0..element_count {
        writeln!(out, "2 {} {}", 2 * elem, 2 * elem + 1)?;
    }
    writeln!(out, "CELL_TYPES {element_count}")?;
    for _ in 0..element_count {
        // VTK_LINE
        writeln!(out, "3")?;
    }

    writeln!(out, "CELL_DATA {element_count}")?;
    writeln!(out, "SCALARS measure double 1")?;
    writeln!(out, "LOOKUP_TABLE default")?;
    for elem in 0..element_count {
        writeln!(out, "{}", mesh.measure(elem))?;
    }

    if let Some((field, name)) = field {
        let fe = space.fe();
        writeln!(out, "POINT_DATA {}", 2 * element_count)?;
        writeln!(out, "SCALARS {name} double 1")?;
        writeln!(out, "LOOKUP_TABLE default")?;
        for elem in 0..element_count {
            let dofs = space.element_dofs(elem, 0);
            for end in [0., 1.] {
                let shape = fe.shape(end);
                let value: f64 = dofs
                    .iter()
                    .zip(shape.iter())
                    .map(|(&dof, s)| field.values[dof] * s)
                    .sum();
                writeln!(out, "{value}")?;
            }
        }
    }

    Ok(())
}

//
// tests
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{FiniteElement, SegmentMesh};

    #[test]
    fn triplets_are_one_based() {
        let mut coo = nas::CooMatrix::new(2, 3);
        coo.push(0, 2, 1.5);
        coo.push(1, 0, -2.);
        let mat = nas::CsrMatrix::from(&coo);

        let mut buf = Vec::new();
        write_triplets(&mut buf, &mat).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(
            lines,
            vec![
                "% size 2 3",
                "% Non Zeros 2",
                "1 3 1.5000000000000000e0",
                "2 1 -2.0000000000000000e0",
            ]
        );
    }

    #[test]
    fn vtk_has_discontinuous_points() {
        let mut mesh = SegmentMesh::uniform(2, 1.0).unwrap();
        mesh.set_cut(1, 0.25).unwrap();
        let space = DgSpace::new(mesh, FiniteElement::new(0), 1).unwrap();
        let mut field = GridFunction::zeros(&space);
        field.values[0] = 1.;
        field.values[1] = 3.;

        let mut buf = Vec::new();
        write_vtk(&mut buf, &space, Some((&field, "u"))).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let expected = "\
# vtk DataFile Version 3.0
gdspace output
ASCII
DATASET UNSTRUCTURED_GRID
POINTS 4 double
0 0 0
0.5 0 0
0.5 0 0
1 0 0
CELLS 2 6
2 0 1
2 2 3
CELL_TYPES 2
3
3
CELL_DATA 2
SCALARS measure double 1
LOOKUP_TABLE default
0.5
0.25
POINT_DATA 4
SCALARS u double 1
LOOKUP_TABLE default
1
1
3
3
";
        assert_eq!(text, expected);

        // mesh only
        let mut buf = Vec::new();
        write_vtk(&mut buf, &space, None).unwrap();
        let text = String::from_utf8(buf).unwrap();
        assert!(!text.contains("POINT_DATA"));
    }
}
