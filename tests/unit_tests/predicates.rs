use coolfluid::entities::ElementType;
use coolfluid::predicates::*;
use coolfluid::shape_function::GeoShape;

const QUAD_IS_CELL: bool = IsCellType::apply::<Quad2D>();

#[test]
fn cells_fill_their_space() {
    assert!(QUAD_IS_CELL);
    assert!(IsCellType::apply::<Triangle2D>());
    assert!(IsCellType::apply::<Line1D>());
    assert!(!IsCellType::apply::<Line2D>());
    assert!(!IsCellType::apply::<Triangle3D>());
}

/// Faces and edges are classified with the cell test, so a boundary line of a 2D mesh is
/// neither a face nor an edge while a 2D quad is both.
#[test]
fn face_and_edge_predicates_use_the_cell_test() {
    assert!(!IsFaceType::apply::<Line2D>());
    assert!(!IsEdgeType::apply::<Line2D>());
    assert!(!IsFaceType::apply::<Quad3D>());
    assert!(IsFaceType::apply::<Quad2D>());
    assert!(IsEdgeType::apply::<Line1D>());

    let boundary = ElementType::<f64>::lagrange_p1(GeoShape::Line, 2);
    assert!(!boundary.is_cell());
    assert!(!boundary.is_face());
    assert!(!boundary.is_edge());

    let cell = ElementType::<f64>::lagrange_p1(GeoShape::Quad, 2);
    assert!(cell.is_cell() && cell.is_face() && cell.is_edge());
}

#[test]
fn compatibility_requires_dimension_and_shape() {
    assert!(IsCompatibleWith::apply::<Quad2D, Quad2D>());
    assert!(!IsCompatibleWith::apply::<Quad2D, Quad3D>());
    assert!(!IsCompatibleWith::apply::<Quad2D, Triangle2D>());
    assert!(!IsCompatibleWith::apply::<Line1D, Line2D>());

    let quad = ElementType::<f64>::lagrange_p1(GeoShape::Quad, 2);
    assert!(quad.is_compatible_with(&ElementType::lagrange_p1(GeoShape::Quad, 2)));
    assert!(!quad.is_compatible_with(&ElementType::lagrange_p1(GeoShape::Quad, 3)));
    assert_eq!(quad.name(), "LagrangeP1.Quad2D");
}
