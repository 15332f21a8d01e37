use crate::field::Field;
use crate::physics::PhysicsModel;
use crate::quadrature::QuadratureRule;
use crate::shape_function::ShapeFunction;
use crate::{MeshError, Real};
use nalgebra::{DMatrix, DVector};
use std::sync::Arc;

/// Per-element interpolation state shared by all residual distribution schemes.
///
/// All buffers are sized once from the shape function, the quadrature rule and the physics
/// when the kernel is created. In every matrix, rows run over element nodes or quadrature
/// points and columns over spatial dimensions or solution variables.
///
/// A kernel is owned by a single thread. Parallel drivers give each worker its own clone.
#[allow(non_snake_case)]
#[derive(Debug, Clone)]
pub struct SchemeBase<T: Real, P: PhysicsModel<T>> {
    shape_function: Arc<dyn ShapeFunction<T>>,
    quadrature: QuadratureRule<T>,
    physics: P,
    element: Option<usize>,

    /// Shape function values, `nb_qdpts x nb_nodes`.
    pub(crate) Ni: DMatrix<T>,
    /// Reference gradients per quadrature point, each `dimensionality x nb_nodes`.
    pub(crate) dNdKSI: Vec<DMatrix<T>>,
    pub(crate) X_n: DMatrix<T>,
    pub(crate) U_n: DMatrix<T>,
    pub(crate) X_q: DMatrix<T>,
    pub(crate) U_q: DMatrix<T>,
    /// Physical gradients per dimension, each `nb_qdpts x nb_nodes`.
    pub(crate) dNdX: Vec<DMatrix<T>>,
    /// Solution gradients per dimension, each `nb_qdpts x neqs`.
    pub(crate) dUdX: Vec<DMatrix<T>>,
    /// Jacobian determinant per quadrature point.
    pub(crate) jacob: DVector<T>,
    /// Integration weights `det(J) * w_q`.
    pub(crate) wj: DVector<T>,
    /// Element residual distributed to the nodes, `nb_nodes x neqs`.
    pub(crate) Phi_n: DMatrix<T>,
    pub(crate) wave_speed_n: DVector<T>,

    /// Solution gradient at the current quadrature point, `neqs x ndim`.
    pub(crate) dUdXq: DMatrix<T>,
    pub(crate) LU: DVector<T>,
    pub(crate) dFdU: Vec<DMatrix<T>>,
    pub(crate) props: P::Properties,

    jm: DMatrix<T>,
    dNdX_q: DMatrix<T>,
    X_qp: DVector<T>,
    U_qp: DVector<T>,
}

#[allow(non_snake_case)]
impl<T: Real, P: PhysicsModel<T>> SchemeBase<T, P> {
    pub fn new(
        shape_function: Arc<dyn ShapeFunction<T>>,
        quadrature: QuadratureRule<T>,
        physics: P,
    ) -> Result<Self, MeshError> {
        let ndim = P::NDIM;
        let neqs = P::NEQS;
        let dimensionality = shape_function.dimensionality();
        if dimensionality != ndim {
            return Err(MeshError::unsupported(
                shape_function.name(),
                format!("elements of dimensionality {dimensionality} can not be integrated in {ndim}D"),
            ));
        }
        if shape_function.order() == 0 {
            return Err(MeshError::unsupported(
                shape_function.name(),
                "piecewise constant shape functions have no gradients",
            ));
        }
        if quadrature.dim() != dimensionality {
            return Err(MeshError::unsupported(
                shape_function.name(),
                format!("quadrature rule is defined in {}D", quadrature.dim()),
            ));
        }

        let nb_nodes = shape_function.nb_nodes();
        let nb_qdpts = quadrature.num_points();

        let mut Ni = DMatrix::zeros(nb_qdpts, nb_nodes);
        let mut values = vec![T::zero(); nb_nodes];
        let mut dNdKSI = Vec::with_capacity(nb_qdpts);
        for q in 0..nb_qdpts {
            let xi = quadrature.point(q);
            shape_function.evaluate_value(xi, &mut values);
            for (i, &value) in values.iter().enumerate() {
                Ni[(q, i)] = value;
            }
            let mut gradient = DMatrix::zeros(dimensionality, nb_nodes);
            shape_function.evaluate_gradient(xi, &mut gradient);
            dNdKSI.push(gradient);
        }

        let props = physics.default_properties();
        Ok(Self {
            shape_function,
            quadrature,
            physics,
            element: None,
            Ni,
            dNdKSI,
            X_n: DMatrix::zeros(nb_nodes, ndim),
            U_n: DMatrix::zeros(nb_nodes, neqs),
            X_q: DMatrix::zeros(nb_qdpts, ndim),
            U_q: DMatrix::zeros(nb_qdpts, neqs),
            dNdX: vec![DMatrix::zeros(nb_qdpts, nb_nodes); ndim],
            dUdX: vec![DMatrix::zeros(nb_qdpts, neqs); ndim],
            jacob: DVector::zeros(nb_qdpts),
            wj: DVector::zeros(nb_qdpts),
            Phi_n: DMatrix::zeros(nb_nodes, neqs),
            wave_speed_n: DVector::zeros(nb_nodes),
            dUdXq: DMatrix::zeros(neqs, ndim),
            LU: DVector::zeros(neqs),
            dFdU: vec![DMatrix::zeros(neqs, neqs); ndim],
            props,
            jm: DMatrix::zeros(ndim, ndim),
            dNdX_q: DMatrix::zeros(ndim, nb_nodes),
            X_qp: DVector::zeros(ndim),
            U_qp: DVector::zeros(neqs),
        })
    }

    /// Creates a kernel with the default quadrature rule for the shape function, exact for
    /// polynomials of twice its order.
    pub fn with_default_quadrature(shape_function: Arc<dyn ShapeFunction<T>>, physics: P) -> Result<Self, MeshError> {
        let quadrature = QuadratureRule::for_shape(shape_function.shape(), 2 * shape_function.order())?;
        Self::new(shape_function, quadrature, physics)
    }

    /// Gathers the element data through `dofs` and computes everything the schemes need at the
    /// quadrature points.
    ///
    /// `coordinates` and `solution` must be fields of the dictionary `dofs` refers to. On
    /// success, `Phi_n` and `wave_speed_n` are zero.
    pub fn interpolate(
        &mut self,
        element: usize,
        dofs: &[usize],
        coordinates: &Field<T>,
        solution: &Field<T>,
    ) -> Result<(), MeshError> {
        let ndim = P::NDIM;
        let neqs = P::NEQS;
        if dofs.len() != self.nb_nodes() {
            return Err(MeshError::inconsistent(format!(
                "element {element} has {} DOFs but {} expects {}",
                dofs.len(),
                self.shape_function.name(),
                self.nb_nodes()
            )));
        }
        if coordinates.row_size() < ndim {
            return Err(MeshError::ShapeMismatch {
                expected: (coordinates.size(), ndim),
                actual: coordinates.shape(),
            });
        }
        if solution.row_size() != neqs {
            return Err(MeshError::ShapeMismatch {
                expected: (solution.size(), neqs),
                actual: solution.shape(),
            });
        }

        self.element = Some(element);
        for (i, &dof) in dofs.iter().enumerate() {
            let x = coordinates.try_row(dof)?;
            for d in 0..ndim {
                self.X_n[(i, d)] = x[d];
            }
            let u = solution.try_row(dof)?;
            for v in 0..neqs {
                self.U_n[(i, v)] = u[v];
            }
        }

        self.X_q.gemm(T::one(), &self.Ni, &self.X_n, T::zero());
        self.U_q.gemm(T::one(), &self.Ni, &self.U_n, T::zero());

        for q in 0..self.nb_qdpts() {
            self.jm.gemm(T::one(), &self.dNdKSI[q], &self.X_n, T::zero());
            let det = self.jm.determinant();
            self.jacob[q] = det;
            if !(det > T::zero()) || !self.jm.try_inverse_mut() {
                return Err(MeshError::DegenerateElement {
                    element,
                    quadrature_point: q,
                    determinant: det.to_subset().unwrap_or(f64::NAN),
                });
            }
            self.wj[q] = det * self.quadrature.weights()[q];

            // The inverse Jacobian maps reference gradients to physical ones
            self.dNdX_q.gemm(T::one(), &self.jm, &self.dNdKSI[q], T::zero());
            for d in 0..ndim {
                self.dNdX[d].row_mut(q).copy_from(&self.dNdX_q.row(d));
            }
        }

        for d in 0..ndim {
            self.dUdX[d].gemm(T::one(), &self.dNdX[d], &self.U_n, T::zero());
        }

        self.Phi_n.fill(T::zero());
        self.wave_speed_n.fill(T::zero());
        Ok(())
    }

    /// Fills `dUdXq` with the solution gradient at quadrature point `q`.
    pub fn sol_gradients_at_qdpoint(&mut self, q: usize) {
        for d in 0..P::NDIM {
            for v in 0..P::NEQS {
                self.dUdXq[(v, d)] = self.dUdX[d][(q, v)];
            }
        }
    }

    /// Evaluates the physics at quadrature point `q`, filling `props`, `dFdU` and `LU`.
    pub fn compute_physics(&mut self, q: usize) {
        self.sol_gradients_at_qdpoint(q);
        self.X_qp.copy_from(&self.X_q.row(q).transpose());
        self.U_qp.copy_from(&self.U_q.row(q).transpose());
        self.physics
            .compute_properties(&self.X_qp, &self.U_qp, &self.dUdXq, &mut self.props);
        self.physics.flux_jacobians(&self.props, &mut self.dFdU);
        self.physics
            .lu(&self.props, &self.dFdU, &self.dUdXq, &mut self.LU);
    }

    pub fn shape_function(&self) -> &Arc<dyn ShapeFunction<T>> {
        &self.shape_function
    }

    pub fn quadrature(&self) -> &QuadratureRule<T> {
        &self.quadrature
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// The element last passed to [`interpolate`](Self::interpolate).
    pub fn element(&self) -> Option<usize> {
        self.element
    }

    pub fn nb_nodes(&self) -> usize {
        self.Ni.ncols()
    }

    pub fn nb_qdpts(&self) -> usize {
        self.Ni.nrows()
    }

    pub fn Ni(&self) -> &DMatrix<T> {
        &self.Ni
    }

    pub fn X_q(&self) -> &DMatrix<T> {
        &self.X_q
    }

    pub fn U_q(&self) -> &DMatrix<T> {
        &self.U_q
    }

    pub fn X_n(&self) -> &DMatrix<T> {
        &self.X_n
    }

    pub fn U_n(&self) -> &DMatrix<T> {
        &self.U_n
    }

    pub fn dNdX(&self, d: usize) -> &DMatrix<T> {
        &self.dNdX[d]
    }

    pub fn dUdX(&self, d: usize) -> &DMatrix<T> {
        &self.dUdX[d]
    }

    pub fn dUdXq(&self) -> &DMatrix<T> {
        &self.dUdXq
    }

    pub fn jacobian_determinants(&self) -> &DVector<T> {
        &self.jacob
    }

    pub fn wj(&self) -> &DVector<T> {
        &self.wj
    }

    pub fn LU(&self) -> &DVector<T> {
        &self.LU
    }

    pub fn dFdU(&self) -> &[DMatrix<T>] {
        &self.dFdU
    }

    pub fn props(&self) -> &P::Properties {
        &self.props
    }

    pub fn Phi_n(&self) -> &DMatrix<T> {
        &self.Phi_n
    }

    pub fn wave_speed_n(&self) -> &DVector<T> {
        &self.wave_speed_n
    }
}
