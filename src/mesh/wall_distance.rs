//! Distance of every DOF of a dictionary to the nearest wall.
use crate::dictionary::COORDINATES;
use crate::mesh::Mesh;
use crate::shape_function::GeoShape;
use crate::Real;
use eyre::{eyre, WrapErr};
use nalgebra::DVector;
use rayon::prelude::*;

/// Name of the field receiving the distances.
pub const WALL_DISTANCE: &str = "wall_distance";

/// Straight segment between the first two vertices of a wall element.
#[derive(Debug, Clone)]
struct Segment<T: Real> {
    a: DVector<T>,
    b: DVector<T>,
}

impl<T: Real> Segment<T> {
    fn distance(&self, p: &DVector<T>) -> T {
        let ab = &self.b - &self.a;
        let len2 = ab.norm_squared();
        let t = if len2 > T::zero() {
            ((p - &self.a).dot(&ab) / len2).max(T::zero()).min(T::one())
        } else {
            T::zero()
        };
        (p - (&self.a + ab * t)).norm()
    }
}

/// Stores in the `wall_distance` field of dictionary `dict_tag` the distance from every DOF to
/// the nearest element of the line groups named in `wall_groups`.
///
/// The field is created if the dictionary does not have it yet.
pub fn compute_wall_distance<T: Real>(mesh: &mut Mesh<T>, dict_tag: &str, wall_groups: &[&str]) -> eyre::Result<()> {
    let coordinates = mesh.geometry_fields().coordinates();
    let mut segments = Vec::new();
    for &name in wall_groups {
        let entities = mesh.entities_by_name(name)?;
        if entities.element_type().shape() != GeoShape::Line {
            return Err(eyre!("wall group \"{name}\" does not consist of line elements"));
        }
        for e in 0..entities.size() {
            let x = entities.get_coordinates(e, coordinates)?;
            segments.push(Segment {
                a: x.row(0).transpose(),
                b: x.row(1).transpose(),
            });
        }
    }
    if segments.is_empty() {
        return Err(eyre!("no wall elements found in {wall_groups:?}"));
    }

    let dict = mesh.dictionary_mut(dict_tag)?;
    if dict.field(WALL_DISTANCE).is_err() {
        dict.create_field(WALL_DISTANCE, "")?;
    }
    let mut view = dict
        .split_fields_mut(&[COORDINATES], &[WALL_DISTANCE])
        .wrap_err_with(|| format!("failed to access fields of dictionary \"{dict_tag}\""))?;
    let points = view.inputs[0];
    let distances = &mut view.outputs[0];

    distances
        .rows_mut()
        .into_par_iter()
        .enumerate()
        .for_each(|(dof, distance)| {
            let p = DVector::from_column_slice(points.row(dof));
            distance[0] = segments
                .iter()
                .map(|segment| segment.distance(&p))
                .reduce(|a, b| a.min(b))
                .unwrap_or_else(T::zero);
        });

    log::info!(
        "computed wall distance of {} DOFs in \"{dict_tag}\" from {} wall elements",
        points.size(),
        segments.len()
    );
    Ok(())
}
