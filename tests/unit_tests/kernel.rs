use crate::square_mesh;
use coolfluid::connectivity::Connectivity;
use coolfluid::dictionary::COORDINATES;
use coolfluid::entities::ElementType;
use coolfluid::mesh::procedural::CellShape;
use coolfluid::mesh::Mesh;
use coolfluid::physics::{LinearAdv2D, RotationAdv2D};
use coolfluid::quadrature::QuadratureRule;
use coolfluid::scheme::{CentralScheme, ElementScheme, LdaScheme, SchemeBase};
use coolfluid::shape_function::{lagrange, GeoShape};
use coolfluid::nalgebra::DMatrix;
use coolfluid::proptest::{convex_quad_coordinates, triangle_coordinates};
use coolfluid::MeshError;
use matrixcompare::assert_scalar_eq;
use proptest::prelude::*;

/// Square mesh with a dictionary `solution_space` holding the field `solution = f(x, y)`.
fn mesh_with_solution(family: &str, cell_shape: CellShape, f: impl Fn(f64, f64) -> f64) -> Mesh<f64> {
    let mut mesh = square_mesh(2.0, 2, cell_shape);
    let dict = mesh
        .create_continuous_space("solution_space", family)
        .unwrap();
    let coordinates = dict.coordinates().clone();
    let solution = dict.create_field("solution", "U[s]").unwrap();
    for (dof, x) in coordinates.rows().enumerate() {
        solution.row_mut(dof)[0] = f(x[0], x[1]);
    }
    mesh
}

#[test]
fn integration_weights_add_up_to_element_volume() {
    let physics = LinearAdv2D::new([1.0, 0.0]);
    for family in ["LagrangeP1", "LagrangeP2"] {
        for cell_shape in [CellShape::Quad, CellShape::Triangle] {
            let mesh = mesh_with_solution(family, cell_shape, |_, _| 0.0);
            let geometry = mesh.geometry_fields().coordinates();
            let dict = mesh.dictionary("solution_space").unwrap();
            let space = &dict.spaces()[0];
            let mut kernel = SchemeBase::with_default_quadrature(space.shape_function().clone(), physics.clone()).unwrap();
            for (e, dofs) in space.connectivity().rows().enumerate() {
                kernel
                    .interpolate(e, dofs, dict.coordinates(), dict.field("solution").unwrap())
                    .unwrap();
                let volume = space.entities().element_volume(e, geometry).unwrap();
                assert_scalar_eq!(kernel.wj().sum(), volume, comp = abs, tol = 1e-12);
                assert!(kernel.jacobian_determinants().iter().all(|&det| det > 0.0));
                assert_eq!(kernel.element(), Some(e));
            }
        }
    }
}

/// Mesh made of the single element with node coordinates given by the rows of `nodes`.
fn single_element_mesh(shape: GeoShape, nodes: &DMatrix<f64>) -> Mesh<f64> {
    let coordinates = nodes.row_iter().flat_map(|x| [x[0], x[1]]).collect();
    let mut mesh = Mesh::from_nodes(2, coordinates).unwrap();
    let cell: Vec<usize> = (0..nodes.nrows()).collect();
    mesh.add_entities(
        "interior",
        ElementType::lagrange_p1(shape, 2),
        Connectivity::from_rows([cell]),
    )
    .unwrap();
    mesh
}

fn assert_weights_match_volume(shape: GeoShape, nodes: &DMatrix<f64>) {
    for family in ["LagrangeP1", "LagrangeP2"] {
        let mut mesh = single_element_mesh(shape, nodes);
        let volume = mesh.entities()[0]
            .element_volume(0, mesh.geometry_fields().coordinates())
            .unwrap();
        let dict = mesh.create_continuous_space("solution_space", family).unwrap();
        dict.create_field("solution", "U[s]").unwrap();
        let space = &dict.spaces()[0];
        let mut kernel =
            SchemeBase::with_default_quadrature(space.shape_function().clone(), LinearAdv2D::new([1.0, 0.0])).unwrap();
        kernel
            .interpolate(0, space.connectivity().row(0), dict.coordinates(), dict.field("solution").unwrap())
            .unwrap();
        assert!(volume > 0.0);
        assert_scalar_eq!(kernel.wj().sum(), volume, comp = abs, tol = 1e-10 * volume.max(1.0));
    }
}

proptest! {
    #[test]
    fn integration_weights_add_up_to_triangle_area(nodes in triangle_coordinates()) {
        assert_weights_match_volume(GeoShape::Triangle, &nodes);
    }

    #[test]
    fn integration_weights_add_up_to_quad_area(nodes in convex_quad_coordinates()) {
        assert_weights_match_volume(GeoShape::Quad, &nodes);
    }
}

#[test]
fn interpolation_of_linear_solution_is_exact() {
    let u = |x: f64, y: f64| 3.0 * x - 2.0 * y + 1.0;
    for family in ["LagrangeP1", "LagrangeP2"] {
        let mesh = mesh_with_solution(family, CellShape::Quad, u);
        let dict = mesh.dictionary("solution_space").unwrap();
        let space = &dict.spaces()[0];
        let mut kernel =
            SchemeBase::with_default_quadrature(space.shape_function().clone(), LinearAdv2D::new([1.0, 0.0])).unwrap();
        let dofs = space.connectivity().row(3);
        kernel
            .interpolate(3, dofs, dict.coordinates(), dict.field("solution").unwrap())
            .unwrap();

        for q in 0..kernel.nb_qdpts() {
            let (x, y) = (kernel.X_q()[(q, 0)], kernel.X_q()[(q, 1)]);
            assert!((1.0..=2.0).contains(&x) && (1.0..=2.0).contains(&y));
            assert_scalar_eq!(kernel.U_q()[(q, 0)], u(x, y), comp = abs, tol = 1e-12);
            assert_scalar_eq!(kernel.dUdX(0)[(q, 0)], 3.0, comp = abs, tol = 1e-12);
            assert_scalar_eq!(kernel.dUdX(1)[(q, 0)], -2.0, comp = abs, tol = 1e-12);

            let gradient_sum: f64 = kernel.dNdX(0).row(q).sum();
            assert_scalar_eq!(gradient_sum, 0.0, comp = abs, tol = 1e-12);
        }

        kernel.compute_physics(0);
        assert_eq!(kernel.dUdXq()[(0, 0)], kernel.dUdX(0)[(0, 0)]);
        assert_scalar_eq!(kernel.LU()[0], 3.0, comp = abs, tol = 1e-12);
        assert_eq!(kernel.dFdU()[0][(0, 0)], 1.0);
    }
}

#[test]
fn lda_residual_vanishes_for_solution_constant_along_velocity() {
    let physics = LinearAdv2D::new([2.0, 1.0]);
    let mesh = mesh_with_solution("LagrangeP1", CellShape::Triangle, |x, y| x - 2.0 * y);
    let dict = mesh.dictionary("solution_space").unwrap();
    let space = &dict.spaces()[0];
    let mut kernel = SchemeBase::with_default_quadrature(space.shape_function().clone(), physics).unwrap();
    let mut scheme = LdaScheme::default();
    ElementScheme::<f64, LinearAdv2D<f64>>::prepare(&mut scheme, &kernel).unwrap();

    for (e, dofs) in space.connectivity().rows().enumerate() {
        kernel
            .interpolate(e, dofs, dict.coordinates(), dict.field("solution").unwrap())
            .unwrap();
        scheme.execute(&mut kernel);
        assert!(kernel.Phi_n().iter().all(|phi| phi.abs() < 1e-12));
        assert!(kernel.wave_speed_n().iter().all(|&ws| ws > 0.0));
    }
}

#[test]
fn lda_distributes_the_whole_residual_downstream() {
    let physics = LinearAdv2D::new([1.0, 0.0]);
    let mesh = mesh_with_solution("LagrangeP1", CellShape::Triangle, |x, _| x * x);
    let dict = mesh.dictionary("solution_space").unwrap();
    let space = &dict.spaces()[0];
    let mut kernel = SchemeBase::with_default_quadrature(space.shape_function().clone(), physics).unwrap();
    let mut central = kernel.clone();
    let mut lda = LdaScheme::default();

    for (e, dofs) in space.connectivity().rows().enumerate() {
        let solution = dict.field("solution").unwrap();
        kernel
            .interpolate(e, dofs, dict.coordinates(), solution)
            .unwrap();
        lda.execute(&mut kernel);
        central
            .interpolate(e, dofs, dict.coordinates(), solution)
            .unwrap();
        CentralScheme::default().execute(&mut central);

        // Both schemes distribute the same total residual, LDA only to nodes with k_i > 0
        assert_scalar_eq!(kernel.Phi_n().sum(), central.Phi_n().sum(), comp = abs, tol = 1e-12);
        assert!(kernel.Phi_n().iter().all(|&phi| phi >= -1e-14));
    }
}

#[test]
fn central_residual_is_integral_of_advection_term() {
    let physics = LinearAdv2D::new([1.0, 0.5]);
    let mesh = mesh_with_solution("LagrangeP2", CellShape::Quad, |x, y| x + 4.0 * y);
    let dict = mesh.dictionary("solution_space").unwrap();
    let space = &dict.spaces()[0];
    let mut kernel = SchemeBase::with_default_quadrature(space.shape_function().clone(), physics).unwrap();
    let mut scheme = CentralScheme::default();
    kernel
        .interpolate(0, space.connectivity().row(0), dict.coordinates(), dict.field("solution").unwrap())
        .unwrap();
    scheme.execute(&mut kernel);
    // a . grad(u) = 3 over a unit cell
    assert_scalar_eq!(kernel.Phi_n().sum(), 3.0, comp = abs, tol = 1e-12);
    assert!(kernel.wave_speed_n().iter().all(|&ws| ws >= 0.0));
}

#[test]
fn rotation_velocity_is_evaluated_at_quadrature_points() {
    let mesh = mesh_with_solution("LagrangeP1", CellShape::Quad, |_, _| 1.0);
    let dict = mesh.dictionary("solution_space").unwrap();
    let space = &dict.spaces()[0];
    let mut kernel = SchemeBase::with_default_quadrature(space.shape_function().clone(), RotationAdv2D).unwrap();
    kernel
        .interpolate(1, space.connectivity().row(1), dict.coordinates(), dict.field("solution").unwrap())
        .unwrap();
    kernel.compute_physics(2);
    let (x, y) = (kernel.X_q()[(2, 0)], kernel.X_q()[(2, 1)]);
    assert_eq!(kernel.props().velocity, [y, -x]);
    assert!(kernel.LU()[0].abs() < 1e-12);
}

#[test]
fn degenerate_elements_are_reported() {
    #[rustfmt::skip]
    let nodes = vec![
        0.0, 0.0,
        1.0, 0.0,
        1.0, 1.0,
        0.0, 1.0,
    ];
    let mut mesh = Mesh::from_nodes(2, nodes).unwrap();
    // Clockwise and collapsed quads
    mesh.add_entities(
        "cells",
        ElementType::lagrange_p1(GeoShape::Quad, 2),
        Connectivity::from_rows([[0, 3, 2, 1], [0, 1, 1, 0]]),
    )
    .unwrap();
    let dict = mesh.geometry_fields_mut();
    dict.create_field("solution", "U[s]").unwrap();
    let dict = mesh.geometry_fields();
    let space = &dict.spaces()[0];
    let mut kernel =
        SchemeBase::with_default_quadrature(space.shape_function().clone(), LinearAdv2D::new([1.0, 0.0])).unwrap();

    for e in 0..2 {
        let result = kernel.interpolate(
            e,
            space.connectivity().row(e),
            dict.field(COORDINATES).unwrap(),
            dict.field("solution").unwrap(),
        );
        match result {
            Err(MeshError::DegenerateElement {
                element,
                quadrature_point,
                determinant,
            }) => {
                assert_eq!(element, e);
                assert_eq!(quadrature_point, 0);
                assert!(determinant <= 0.0);
            }
            other => panic!("expected a degenerate element, got {other:?}"),
        }
    }
}

#[test]
fn unsupported_configurations() {
    let physics = LinearAdv2D::new([1.0, 0.0]);
    let line = lagrange::<f64>("LagrangeP1", GeoShape::Line).unwrap();
    assert!(matches!(
        SchemeBase::with_default_quadrature(line, physics.clone()),
        Err(MeshError::UnsupportedShapeFunction { .. })
    ));

    let p0 = lagrange::<f64>("LagrangeP0", GeoShape::Quad).unwrap();
    assert!(matches!(
        SchemeBase::with_default_quadrature(p0, physics.clone()),
        Err(MeshError::UnsupportedShapeFunction { .. })
    ));

    let quad = lagrange::<f64>("LagrangeP1", GeoShape::Quad).unwrap();
    assert!(matches!(
        SchemeBase::new(quad.clone(), QuadratureRule::gauss_line(2), physics.clone()),
        Err(MeshError::UnsupportedShapeFunction { .. })
    ));

    let kernel = SchemeBase::new(quad, QuadratureRule::gauss_quad(3), physics).unwrap();
    assert_eq!(kernel.nb_qdpts(), 9);
    assert_eq!(kernel.nb_nodes(), 4);
    assert_eq!(kernel.Ni().shape(), (9, 4));
    assert_eq!(kernel.element(), None);
}

#[test]
fn interpolate_checks_element_and_field_shapes() {
    let mut mesh = mesh_with_solution("LagrangeP1", CellShape::Quad, |_, _| 0.0);
    let dict = mesh.dictionary_mut("solution_space").unwrap();
    dict.create_field("state", "rho[s],V[v]").unwrap();
    let space = &dict.spaces()[0];
    let mut kernel =
        SchemeBase::with_default_quadrature(space.shape_function().clone(), LinearAdv2D::new([1.0, 0.0])).unwrap();
    let (coordinates, solution) = (dict.coordinates(), dict.field("solution").unwrap());

    assert!(matches!(
        kernel.interpolate(0, &[0, 1, 2], coordinates, solution),
        Err(MeshError::InconsistentState(_))
    ));
    assert!(matches!(
        kernel.interpolate(0, &[0, 1, 2, 100], coordinates, solution),
        Err(MeshError::OutOfRange { index: 100, .. })
    ));
    assert!(matches!(
        kernel.interpolate(0, space.connectivity().row(0), coordinates, dict.field("state").unwrap()),
        Err(MeshError::ShapeMismatch { .. })
    ));
}
