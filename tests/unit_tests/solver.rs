use crate::square_mesh;
use coolfluid::mesh::procedural::CellShape;
use coolfluid::mesh::Mesh;
use coolfluid::physics::{LinearAdv2D, RotationAdv2D};
use coolfluid::scheme::{CentralScheme, LdaScheme};
use coolfluid::solver::{BcDirichlet, DomainTerm, FieldNames, IterationReport, IterationSettings, SteadyExplicit};
use coolfluid::MeshError;
use util::assert_approx_slice_eq;

const TAG: &str = "solution_space";

fn prepared_mesh(family: &str, cell_shape: CellShape, n: usize, u: impl Fn(f64, f64) -> f64) -> Mesh<f64> {
    let mut mesh = square_mesh(1.0, n, cell_shape);
    let dict = mesh.create_continuous_space(TAG, family).unwrap();
    let coordinates = dict.coordinates().clone();
    let solution = dict.create_field("solution", "U[s]").unwrap();
    for (dof, x) in coordinates.rows().enumerate() {
        solution.row_mut(dof)[0] = u(x[0], x[1]);
    }
    dict.create_field("residual", "U[s]").unwrap();
    dict.create_field("wave_speed", "").unwrap();
    mesh
}

fn residual_and_wave_speed(mesh: &Mesh<f64>) -> (Vec<f64>, Vec<f64>) {
    let dict = mesh.dictionary(TAG).unwrap();
    (
        dict.field("residual").unwrap().as_slice().to_vec(),
        dict.field("wave_speed").unwrap().as_slice().to_vec(),
    )
}

#[test]
fn parallel_assembly_matches_serial_assembly() {
    let u = |x: f64, y: f64| (3.0 * x).sin() * (2.0 * y).cos();
    for (family, cell_shape) in [("LagrangeP2", CellShape::Quad), ("LagrangeP1", CellShape::Triangle)] {
        let mut serial_mesh = prepared_mesh(family, cell_shape, 6, u);
        let mut parallel_mesh = prepared_mesh(family, cell_shape, 6, u);

        let mut central = DomainTerm::new(RotationAdv2D, CentralScheme::default());
        central
            .execute(serial_mesh.dictionary_mut(TAG).unwrap())
            .unwrap();
        central
            .execute_par(parallel_mesh.dictionary_mut(TAG).unwrap())
            .unwrap();

        let (r_serial, ws_serial) = residual_and_wave_speed(&serial_mesh);
        let (r_parallel, ws_parallel) = residual_and_wave_speed(&parallel_mesh);
        assert!(r_serial.iter().any(|r| r.abs() > 1e-3));
        assert_approx_slice_eq!(r_serial, r_parallel, abstol = 1e-12);
        assert_approx_slice_eq!(ws_serial, ws_parallel, abstol = 1e-12);
    }
}

#[test]
fn domain_term_rebinds_only_on_shape_function_change() {
    let mut mesh = prepared_mesh("LagrangeP1", CellShape::Quad, 2, |_, _| 0.0);
    let mut term = DomainTerm::new(LinearAdv2D::new([1.0, 0.0]), LdaScheme::default());
    assert!(term.kernel().is_none());

    let dict = mesh.dictionary_mut(TAG).unwrap();
    term.execute(dict).unwrap();
    let kernel = term.kernel().unwrap();
    assert_eq!(kernel.shape_function().name(), "LagrangeP1.Quad");

    // Boundary groups are not cells and are skipped
    let boundary = dict
        .spaces()
        .iter()
        .find(|space| space.entities().name() == "left")
        .unwrap();
    assert!(matches!(
        term.rebind(boundary),
        Err(MeshError::UnsupportedShapeFunction { .. })
    ));
}

#[test]
fn domain_term_follows_shape_function_across_dictionaries() {
    let mut mesh = square_mesh(1.0, 2, CellShape::Quad);
    for (tag, family) in [("p1", "LagrangeP1"), ("p2", "LagrangeP2")] {
        let dict = mesh.create_continuous_space(tag, family).unwrap();
        let coordinates = dict.coordinates().clone();
        let solution = dict.create_field("solution", "U[s]").unwrap();
        for (dof, x) in coordinates.rows().enumerate() {
            solution.row_mut(dof)[0] = x[0];
        }
        dict.create_field("residual", "U[s]").unwrap();
        dict.create_field("wave_speed", "").unwrap();
    }

    let mut term = DomainTerm::new(LinearAdv2D::new([1.0, 0.0]), CentralScheme::default());
    for (tag, expected) in [("p1", "LagrangeP1.Quad"), ("p2", "LagrangeP2.Quad"), ("p1", "LagrangeP1.Quad")] {
        let dict = mesh.dictionary_mut(tag).unwrap();
        dict.field_mut("residual").unwrap().fill(0.0);
        term.execute(dict).unwrap();
        assert_eq!(term.kernel().unwrap().shape_function().name(), expected);

        // u = x advected along x gives a residual integrating to the area of the square
        let residual = dict.field("residual").unwrap();
        assert!((residual.as_slice().iter().sum::<f64>() - 1.0).abs() < 1e-12);
    }
}

#[test]
fn region_selection() {
    let u = |x: f64, _: f64| x * x;
    let mut mesh = prepared_mesh("LagrangeP1", CellShape::Quad, 3, u);
    let mut term = DomainTerm::new(LinearAdv2D::new([1.0, 0.0]), LdaScheme::default()).with_regions(&["elsewhere"]);
    term.execute(mesh.dictionary_mut(TAG).unwrap()).unwrap();
    let (residual, _) = residual_and_wave_speed(&mesh);
    assert!(residual.iter().all(|&r| r == 0.0));

    let mut term = DomainTerm::new(LinearAdv2D::new([1.0, 0.0]), LdaScheme::default()).with_regions(&["interior"]);
    term.execute(mesh.dictionary_mut(TAG).unwrap()).unwrap();
    let (residual, _) = residual_and_wave_speed(&mesh);
    // The residual sums to the integral of du/dx = 2x over the unit square
    assert!((residual.iter().sum::<f64>() - 1.0).abs() < 1e-12);
}

#[test]
fn domain_term_requires_solver_fields() {
    let mut mesh = square_mesh(1.0, 2, CellShape::Quad);
    let dict = mesh.create_continuous_space(TAG, "LagrangeP1").unwrap();
    dict.create_field("solution", "U[s]").unwrap();
    let mut term = DomainTerm::new(LinearAdv2D::new([1.0, 0.0]), LdaScheme::default());
    assert!(term.execute(dict).is_err());

    dict.create_field("residual", "rho[s],V[v]").unwrap();
    dict.create_field("wave_speed", "").unwrap();
    assert!(term.execute(dict).is_err());
}

#[test]
fn dirichlet_condition_sets_boundary_values() {
    let mut mesh = prepared_mesh("LagrangeP2", CellShape::Quad, 3, |_, _| 0.0);
    let dict = mesh.dictionary_mut(TAG).unwrap();
    dict.field_mut("residual").unwrap().fill(1.0);

    let bc = BcDirichlet::new(&["left", "bottom"], |x: &[f64]| vec![x[0] + x[1] + 1.0]);
    let constrained = bc.constrained_dofs(dict).unwrap();
    // 7 P2 nodes per side, sharing the corner
    assert_eq!(constrained.len(), 13);
    bc.apply(dict, &FieldNames::default()).unwrap();

    let coordinates = dict.coordinates().clone();
    let solution = dict.field("solution").unwrap();
    let residual = dict.field("residual").unwrap();
    for dof in 0..dict.size() {
        let x = coordinates.row(dof);
        if constrained.contains(&dof) {
            assert!(x[0].abs() < 1e-12 || x[1].abs() < 1e-12);
            assert_eq!(solution.row(dof), &[x[0] + x[1] + 1.0]);
            assert_eq!(residual.row(dof), &[0.0]);
        } else {
            assert_eq!(solution.row(dof), &[0.0]);
            assert_eq!(residual.row(dof), &[1.0]);
        }
    }

    let unknown = BcDirichlet::new(&["inlet"], |_: &[f64]| vec![0.0]);
    assert!(unknown.apply(dict, &FieldNames::default()).is_err());
    let wrong_size = BcDirichlet::new(&["left"], |_: &[f64]| vec![0.0, 1.0]);
    assert!(wrong_size.apply(dict, &FieldNames::default()).is_err());
}

fn solve_linear_advection(parallel: bool) -> (Mesh<f64>, IterationReport) {
    // a . grad(u) = 0 for the exact solution
    let exact = |x: &[f64]| vec![x[1] - 0.5 * x[0]];
    let mut mesh = square_mesh(1.0, 8, CellShape::Triangle);
    mesh.create_continuous_space(TAG, "LagrangeP1").unwrap();

    let settings = IterationSettings {
        cfl: 0.9,
        max_iter: 5000,
        tolerance: 1e-10,
        parallel,
    };
    let mut solver = SteadyExplicit::new(settings);
    solver
        .add_domain_term(DomainTerm::new(LinearAdv2D::new([1.0, 0.5]), LdaScheme::default()))
        .add_boundary_condition(BcDirichlet::new(&["left", "bottom"], exact));
    let report = solver.solve(&mut mesh, TAG).unwrap();

    let dict = mesh.dictionary(TAG).unwrap();
    let solution = dict.field("solution").unwrap();
    for (x, u) in dict.coordinates().rows().zip(solution.rows()) {
        assert!((u[0] - exact(x)[0]).abs() < 1e-8, "u({x:?}) = {}", u[0]);
    }
    (mesh, report)
}

#[test]
fn steady_lda_recovers_linear_solution() {
    let (_, report) = solve_linear_advection(false);
    assert!(report.converged);
    assert!(report.residual_norm <= 1e-10);
    assert!(report.iterations > 1 && report.iterations < 5000);
}

#[test]
fn steady_lda_recovers_linear_solution_in_parallel() {
    let (_, report) = solve_linear_advection(true);
    assert!(report.converged);
}

#[test]
fn unconverged_iteration_is_reported() {
    let mut mesh = square_mesh(1.0, 4, CellShape::Quad);
    mesh.create_continuous_space(TAG, "LagrangeP1").unwrap();
    let settings = IterationSettings {
        max_iter: 3,
        ..Default::default()
    };
    let mut solver = SteadyExplicit::new(settings);
    solver
        .add_domain_term(DomainTerm::new(RotationAdv2D, CentralScheme::default()))
        .add_boundary_condition(BcDirichlet::new(&["bottom"], |x: &[f64]| vec![x[0]]));
    let report = solver.solve(&mut mesh, TAG).unwrap();
    assert_eq!(report.iterations, 3);
    assert!(!report.converged);
    assert!(report.residual_norm > 0.0);
}

#[test]
fn solve_without_domain_terms_fails() {
    let mut mesh = square_mesh(1.0, 2, CellShape::Quad);
    mesh.create_continuous_space(TAG, "LagrangeP1").unwrap();
    let mut solver: SteadyExplicit<f64, LinearAdv2D<f64>, LdaScheme<f64>> = SteadyExplicit::new(Default::default());
    assert!(solver.solve(&mut mesh, TAG).is_err());
    assert!(solver.solve(&mut mesh, "missing").is_err());
}

#[test]
fn settings_from_json() {
    let settings: IterationSettings = serde_json::from_str(r#"{ "cfl": 0.5, "parallel": true }"#).unwrap();
    assert_eq!(settings.cfl, 0.5);
    assert!(settings.parallel);
    assert_eq!(settings.max_iter, IterationSettings::default().max_iter);

    let names: FieldNames = serde_json::from_str(r#"{ "solution": "q" }"#).unwrap();
    assert_eq!(names.solution, "q");
    assert_eq!(names.residual, "residual");
}
