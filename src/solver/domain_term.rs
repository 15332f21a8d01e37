use crate::dictionary::{Dictionary, COORDINATES};
use crate::entities::EntitiesId;
use crate::field::Field;
use crate::physics::PhysicsModel;
use crate::scheme::{ElementScheme, SchemeBase};
use crate::solver::coloring::sequential_greedy_coloring;
use crate::solver::FieldNames;
use crate::space::Space;
use crate::{MeshError, Real};
use eyre::{eyre, WrapErr};
use rayon::prelude::*;
use std::cell::RefCell;
use std::marker::PhantomData;
use thread_local::ThreadLocal;

/// Adds the residual of a distribution scheme over the cell groups of a dictionary.
///
/// For every element the kernel is interpolated, the scheme distributes the element residual
/// to the element nodes, and the nodal contributions are added into the residual and wave
/// speed fields.
#[derive(Debug)]
pub struct DomainTerm<T: Real, P: PhysicsModel<T>, S: ElementScheme<T, P>> {
    physics: P,
    scheme: S,
    kernel: Option<SchemeBase<T, P>>,
    bound: Option<(EntitiesId, String)>,
    regions: Vec<String>,
    fields: FieldNames,
    marker: PhantomData<T>,
}

impl<T, P, S> DomainTerm<T, P, S>
where
    T: Real,
    P: PhysicsModel<T>,
    S: ElementScheme<T, P>,
{
    pub fn new(physics: P, scheme: S) -> Self {
        Self {
            physics,
            scheme,
            kernel: None,
            bound: None,
            regions: Vec::new(),
            fields: FieldNames::default(),
            marker: PhantomData,
        }
    }

    /// Restricts the term to the named cell groups. By default all cell groups are used.
    pub fn with_regions(mut self, regions: &[&str]) -> Self {
        self.regions = regions.iter().map(|name| name.to_string()).collect();
        self
    }

    pub fn with_fields(mut self, fields: FieldNames) -> Self {
        self.fields = fields;
        self
    }

    pub fn fields(&self) -> &FieldNames {
        &self.fields
    }

    pub fn physics(&self) -> &P {
        &self.physics
    }

    /// The kernel of the entity group the term is currently bound to.
    pub fn kernel(&self) -> Option<&SchemeBase<T, P>> {
        self.kernel.as_ref()
    }

    fn selects(&self, space: &Space<T>) -> bool {
        let entities = space.entities();
        entities.element_type().is_cell()
            && (self.regions.is_empty() || self.regions.iter().any(|name| name == entities.name()))
    }

    /// Binds the term to the entity group of `space`.
    ///
    /// The kernel is rebuilt only when the shape function of the new group differs from the
    /// current one. The same entity group seen through another dictionary may carry another
    /// shape function, so the binding is keyed on both.
    pub fn rebind(&mut self, space: &Space<T>) -> Result<(), MeshError> {
        let id = space.entities().id();
        let shape_function = space.shape_function();
        let name = shape_function.name();
        if let Some((bound_id, bound_name)) = &self.bound {
            if *bound_id == id && *bound_name == name {
                return Ok(());
            }
        }
        let rebuild = match &self.kernel {
            Some(kernel) => kernel.shape_function().name() != name,
            None => true,
        };
        if rebuild {
            let kernel = SchemeBase::with_default_quadrature(shape_function.clone(), self.physics.clone())?;
            self.scheme.prepare(&kernel)?;
            log::debug!(
                "{} kernel for \"{}\" built with {} ({} quadrature points)",
                self.scheme.name(),
                space.entities().name(),
                name,
                kernel.nb_qdpts()
            );
            self.kernel = Some(kernel);
        }
        self.bound = Some((id, name));
        Ok(())
    }

    fn bound_kernel(&mut self, space: &Space<T>) -> Result<(&mut SchemeBase<T, P>, &mut S), MeshError> {
        self.rebind(space)?;
        let kernel = self
            .kernel
            .as_mut()
            .ok_or_else(|| MeshError::inconsistent("domain term has no kernel"))?;
        Ok((kernel, &mut self.scheme))
    }

    /// Assembles the residual and wave speed of all selected elements, one element at a time.
    pub fn execute(&mut self, dict: &mut Dictionary<T>) -> eyre::Result<()> {
        let names = self.fields.clone();
        let tag = dict.tag().to_string();
        let view = dict
            .split_fields_mut(
                &[COORDINATES, &names.solution],
                &[&names.residual, &names.wave_speed],
            )
            .wrap_err_with(|| format!("domain term can not access the fields of \"{tag}\""))?;
        let (coordinates, solution) = (view.inputs[0], view.inputs[1]);
        let mut outputs = view.outputs.into_iter();
        let (residual, wave_speed) = match (outputs.next(), outputs.next()) {
            (Some(residual), Some(wave_speed)) => (residual, wave_speed),
            _ => return Err(eyre!("missing residual or wave speed field")),
        };
        check_output_fields::<T, P>(residual, wave_speed)?;

        let spaces: Vec<&Space<T>> = view.spaces.iter().filter(|space| self.selects(space)).collect();
        for space in spaces {
            let (kernel, scheme) = self.bound_kernel(space)?;
            for (e, dofs) in space.connectivity().rows().enumerate() {
                kernel
                    .interpolate(e, dofs, coordinates, solution)
                    .wrap_err_with(|| format!("failed to integrate \"{}\"", space.entities().name()))?;
                scheme.execute(kernel);
                for (i, &dof) in dofs.iter().enumerate() {
                    let r = residual.row_mut(dof);
                    for v in 0..P::NEQS {
                        r[v] += kernel.Phi_n[(i, v)];
                    }
                    wave_speed.row_mut(dof)[0] += kernel.wave_speed_n[i];
                }
            }
        }
        Ok(())
    }

    /// Parallel version of [`execute`](Self::execute).
    ///
    /// Elements are colored so that the elements of one color share no DOF. Colors are
    /// processed one after the other, the elements of a color in parallel, each worker thread
    /// using its own clone of the kernel.
    pub fn execute_par(&mut self, dict: &mut Dictionary<T>) -> eyre::Result<()> {
        let names = self.fields.clone();
        let tag = dict.tag().to_string();
        let view = dict
            .split_fields_mut(
                &[COORDINATES, &names.solution],
                &[&names.residual, &names.wave_speed],
            )
            .wrap_err_with(|| format!("domain term can not access the fields of \"{tag}\""))?;
        let (coordinates, solution) = (view.inputs[0], view.inputs[1]);
        let mut outputs = view.outputs.into_iter();
        let (residual, wave_speed) = match (outputs.next(), outputs.next()) {
            (Some(residual), Some(wave_speed)) => (residual, wave_speed),
            _ => return Err(eyre!("missing residual or wave speed field")),
        };
        check_output_fields::<T, P>(residual, wave_speed)?;

        let spaces: Vec<&Space<T>> = view.spaces.iter().filter(|space| self.selects(space)).collect();
        for space in spaces {
            let (kernel, scheme) = self.bound_kernel(space)?;
            let (kernel, scheme) = (&*kernel, &*scheme);
            let workspace: ThreadLocal<RefCell<(SchemeBase<T, P>, S)>> = ThreadLocal::new();
            let colors = sequential_greedy_coloring(space.connectivity());

            for color in &colors {
                let mut residual_rows: Vec<Option<&mut [T]>> = residual.rows_mut().into_iter().map(Some).collect();
                let mut wave_speed_rows: Vec<Option<&mut [T]>> = wave_speed.rows_mut().into_iter().map(Some).collect();

                let mut tasks = Vec::with_capacity(color.len());
                for &e in color {
                    let dofs = space.connectivity().row(e);
                    let r = take_rows(&mut residual_rows, dofs)?;
                    let w = take_rows(&mut wave_speed_rows, dofs)?;
                    tasks.push((e, dofs, r, w));
                }

                tasks
                    .into_par_iter()
                    .try_for_each(|(e, dofs, mut r, mut w)| -> Result<(), MeshError> {
                        let cell = workspace.get_or(|| RefCell::new((kernel.clone(), scheme.clone())));
                        let mut guard = cell.borrow_mut();
                        let (kernel, scheme) = &mut *guard;
                        kernel.interpolate(e, dofs, coordinates, solution)?;
                        scheme.execute(kernel);
                        for i in 0..dofs.len() {
                            for v in 0..P::NEQS {
                                r[i][v] += kernel.Phi_n[(i, v)];
                            }
                            w[i][0] += kernel.wave_speed_n[i];
                        }
                        Ok(())
                    })
                    .wrap_err_with(|| format!("failed to integrate \"{}\"", space.entities().name()))?;
            }
        }
        Ok(())
    }
}

fn check_output_fields<T: Real, P: PhysicsModel<T>>(residual: &Field<T>, wave_speed: &Field<T>) -> eyre::Result<()> {
    if residual.row_size() != P::NEQS {
        return Err(eyre!(
            "residual field \"{}\" has {} components per DOF, expected {}",
            residual.name(),
            residual.row_size(),
            P::NEQS
        ));
    }
    if wave_speed.row_size() != 1 {
        return Err(eyre!("wave speed field \"{}\" must be scalar", wave_speed.name()));
    }
    Ok(())
}

/// Moves the rows of `dofs` out of `rows`. Fails if a row was already taken, which means two
/// elements processed together share a DOF.
fn take_rows<'a, T>(rows: &mut [Option<&'a mut [T]>], dofs: &[usize]) -> Result<Vec<&'a mut [T]>, MeshError> {
    dofs.iter()
        .map(|&dof| {
            rows.get_mut(dof)
                .and_then(Option::take)
                .ok_or_else(|| MeshError::inconsistent(format!("DOF {dof} is shared within one element color")))
        })
        .collect()
}
