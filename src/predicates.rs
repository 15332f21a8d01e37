//! Compile-time classification of element types.
//!
//! Element types are described statically by their embedding dimension, the dimension of
//! their reference element and their shape. The predicates are `const fn` so they can be
//! evaluated in constant contexts, e.g. to select kernel instantiations.
use crate::shape_function::GeoShape;

/// Static description of an element type.
pub trait StaticElementType {
    /// Dimension of the space the element is embedded in.
    const DIMENSION: usize;
    /// Dimension of the reference element.
    const DIMENSIONALITY: usize;
    const SHAPE: GeoShape;
}

/// True for elements that fill the space they are embedded in.
pub struct IsCellType;

impl IsCellType {
    pub const fn apply<E: StaticElementType>() -> bool {
        E::DIMENSION == E::DIMENSIONALITY
    }
}

/// Face classification.
///
/// Uses the same test as [`IsCellType`], so a boundary line in a 2D mesh is not reported as a
/// face.
pub struct IsFaceType;

impl IsFaceType {
    pub const fn apply<E: StaticElementType>() -> bool {
        E::DIMENSION == E::DIMENSIONALITY
    }
}

/// Edge classification. Uses the same test as [`IsCellType`].
pub struct IsEdgeType;

impl IsEdgeType {
    pub const fn apply<E: StaticElementType>() -> bool {
        E::DIMENSION == E::DIMENSIONALITY
    }
}

/// True if two element types have the same embedding dimension and shape.
pub struct IsCompatibleWith;

impl IsCompatibleWith {
    pub const fn apply<E: StaticElementType, U: StaticElementType>() -> bool {
        E::DIMENSION == U::DIMENSION && E::SHAPE as u8 == U::SHAPE as u8
    }
}

macro_rules! declare_element_types {
    ($($(#[$attr:meta])* $name:ident => ($dim:expr, $shape:ident)),* $(,)?) => {
        $(
            $(#[$attr])*
            #[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
            pub struct $name;

            impl StaticElementType for $name {
                const DIMENSION: usize = $dim;
                const DIMENSIONALITY: usize = GeoShape::$shape.dimensionality();
                const SHAPE: GeoShape = GeoShape::$shape;
            }
        )*
    };
}

declare_element_types! {
    Line1D => (1, Line),
    /// A line embedded in the plane, e.g. a boundary edge of a 2D mesh.
    Line2D => (2, Line),
    Triangle2D => (2, Triangle),
    Quad2D => (2, Quad),
    Triangle3D => (3, Triangle),
    Quad3D => (3, Quad),
}
