//! Dense tables of variables stored per degree of freedom of a dictionary.
use crate::descriptor::VariablesDescriptor;
use crate::{MeshError, Real};
use itertools::izip;
use nalgebra::{DMatrix, Scalar};
use std::ops::{AddAssign, DivAssign, Index, IndexMut, MulAssign, SubAssign};

/// A table of shape `(size, row_size)` bound to the DOF numbering of one dictionary.
///
/// Each row holds the variables declared by the field's descriptor for one DOF. Storage is
/// row-major, so `field[dof]` is a contiguous slice of `row_size` components.
#[derive(Debug, Clone, PartialEq)]
pub struct Field<T: Scalar> {
    name: String,
    dict_tag: String,
    descriptor: VariablesDescriptor,
    row_size: usize,
    data: Vec<T>,
}

impl<T: Real> Field<T> {
    pub(crate) fn zeros(name: &str, dict_tag: &str, descriptor: VariablesDescriptor, size: usize) -> Self {
        let row_size = descriptor.size();
        Self {
            name: name.to_string(),
            dict_tag: dict_tag.to_string(),
            descriptor,
            row_size,
            data: vec![T::zero(); size * row_size],
        }
    }

    /// Grows or shrinks the field to `size` rows. New rows are zero.
    pub(crate) fn resize(&mut self, size: usize) {
        self.data.resize(size * self.row_size, T::zero());
    }

    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    /// Applies `f` to every stored component.
    pub fn apply(&mut self, mut f: impl FnMut(T) -> T) {
        for value in &mut self.data {
            *value = f(*value);
        }
    }

    pub fn norm_l2(&self) -> T {
        self.data
            .iter()
            .fold(T::zero(), |acc, &value| acc + value * value)
            .sqrt()
    }

    /// Copies all values of `other` into this field. The descriptor is left unchanged.
    pub fn copy_values_from(&mut self, other: &Field<T>) -> Result<(), MeshError> {
        self.check_same_shape(other)?;
        self.data.copy_from_slice(&other.data);
        Ok(())
    }

    pub fn try_add_assign(&mut self, other: &Field<T>) -> Result<(), MeshError> {
        self.zip_apply(other, |a, b| a + b)
    }

    pub fn try_sub_assign(&mut self, other: &Field<T>) -> Result<(), MeshError> {
        self.zip_apply(other, |a, b| a - b)
    }

    pub fn try_mul_assign(&mut self, other: &Field<T>) -> Result<(), MeshError> {
        self.zip_apply(other, |a, b| a * b)
    }

    pub fn try_div_assign(&mut self, other: &Field<T>) -> Result<(), MeshError> {
        self.zip_apply(other, |a, b| a / b)
    }

    fn zip_apply(&mut self, other: &Field<T>, f: impl Fn(T, T) -> T) -> Result<(), MeshError> {
        self.check_same_shape(other)?;
        for (a, &b) in izip!(&mut self.data, &other.data) {
            *a = f(*a, b);
        }
        Ok(())
    }

    /// A dense copy of the field with one matrix row per DOF.
    pub fn to_matrix(&self) -> DMatrix<T> {
        DMatrix::from_row_slice(self.size(), self.row_size, &self.data)
    }
}

impl<T: Scalar> Field<T> {
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag of the dictionary the field is bound to.
    pub fn dict_tag(&self) -> &str {
        &self.dict_tag
    }

    /// Number of rows, which always equals the size of the owning dictionary.
    pub fn size(&self) -> usize {
        if self.row_size == 0 {
            0
        } else {
            self.data.len() / self.row_size
        }
    }

    pub fn row_size(&self) -> usize {
        self.row_size
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.size(), self.row_size)
    }

    pub fn descriptor(&self) -> &VariablesDescriptor {
        &self.descriptor
    }

    /// Mutable access to the descriptor, e.g. for renaming variables.
    ///
    /// Only the names should be changed; the row layout is fixed when the field is created.
    pub fn descriptor_mut(&mut self) -> &mut VariablesDescriptor {
        &mut self.descriptor
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    pub fn row(&self, dof: usize) -> &[T] {
        match self.try_row(dof) {
            Ok(row) => row,
            Err(err) => panic!("{err}"),
        }
    }

    pub fn row_mut(&mut self, dof: usize) -> &mut [T] {
        let size = self.size();
        assert!(dof < size, "{}", MeshError::OutOfRange { index: dof, size });
        let begin = dof * self.row_size;
        &mut self.data[begin..begin + self.row_size]
    }

    pub fn try_row(&self, dof: usize) -> Result<&[T], MeshError> {
        let size = self.size();
        if dof >= size {
            return Err(MeshError::OutOfRange { index: dof, size });
        }
        let begin = dof * self.row_size;
        Ok(&self.data[begin..begin + self.row_size])
    }

    pub fn rows(&self) -> impl '_ + Iterator<Item = &[T]> {
        (0..self.size()).map(move |dof| self.row(dof))
    }

    /// One mutable slice per row, in DOF order.
    pub fn rows_mut(&mut self) -> Vec<&mut [T]> {
        if self.row_size == 0 {
            return Vec::new();
        }
        self.data.chunks_mut(self.row_size).collect()
    }

    /// The components of variable `name` in row `dof`.
    pub fn var(&self, dof: usize, name: &str) -> Result<&[T], MeshError> {
        let var = self.descriptor.variable(name)?;
        let (offset, len) = (var.offset(), var.size());
        Ok(&self.try_row(dof)?[offset..offset + len])
    }

    pub fn var_mut(&mut self, dof: usize, name: &str) -> Result<&mut [T], MeshError> {
        let var = self.descriptor.variable(name)?;
        let (offset, len) = (var.offset(), var.size());
        let size = self.size();
        if dof >= size {
            return Err(MeshError::OutOfRange { index: dof, size });
        }
        Ok(&mut self.row_mut(dof)[offset..offset + len])
    }

    fn check_same_shape(&self, other: &Field<T>) -> Result<(), MeshError> {
        if self.shape() == other.shape() {
            Ok(())
        } else {
            Err(MeshError::ShapeMismatch {
                expected: self.shape(),
                actual: other.shape(),
            })
        }
    }
}

impl<T: Scalar> Index<usize> for Field<T> {
    type Output = [T];

    fn index(&self, dof: usize) -> &[T] {
        self.row(dof)
    }
}

impl<T: Scalar> IndexMut<usize> for Field<T> {
    fn index_mut(&mut self, dof: usize) -> &mut [T] {
        self.row_mut(dof)
    }
}

macro_rules! impl_field_compound_assign {
    ($trait:ident, $method:ident, $checked:ident) => {
        /// # Panics
        ///
        /// Panics if the two fields do not have the same shape.
        impl<'a, T: Real> $trait<&'a Field<T>> for Field<T> {
            fn $method(&mut self, rhs: &'a Field<T>) {
                if let Err(err) = self.$checked(rhs) {
                    panic!("{err}");
                }
            }
        }
    };
}

impl_field_compound_assign!(AddAssign, add_assign, try_add_assign);
impl_field_compound_assign!(SubAssign, sub_assign, try_sub_assign);
impl_field_compound_assign!(MulAssign, mul_assign, try_mul_assign);
impl_field_compound_assign!(DivAssign, div_assign, try_div_assign);

impl<T: Real> MulAssign<T> for Field<T> {
    fn mul_assign(&mut self, rhs: T) {
        self.apply(|value| value * rhs);
    }
}

impl<T: Real> DivAssign<T> for Field<T> {
    fn div_assign(&mut self, rhs: T) {
        self.apply(|value| value / rhs);
    }
}
