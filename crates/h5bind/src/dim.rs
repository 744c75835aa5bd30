//! Shapes accepted by dataspace and dataset constructors.

pub type Ix = usize;

/// A value that describes an N-dimensional extent.
///
/// `()` is the scalar (rank 0) shape.
pub trait Dimension {
    fn ndim(&self) -> usize;

    fn dims(&self) -> Vec<Ix>;

    fn size(&self) -> Ix {
        self.dims().iter().product()
    }
}

impl<T: Dimension + ?Sized> Dimension for &T {
    fn ndim(&self) -> usize {
        Dimension::ndim(*self)
    }

    fn dims(&self) -> Vec<Ix> {
        Dimension::dims(*self)
    }
}

impl Dimension for Vec<Ix> {
    fn ndim(&self) -> usize {
        self.len()
    }

    fn dims(&self) -> Vec<Ix> {
        self.clone()
    }
}

impl Dimension for [Ix] {
    fn ndim(&self) -> usize {
        self.len()
    }

    fn dims(&self) -> Vec<Ix> {
        self.to_vec()
    }
}

impl<const N: usize> Dimension for [Ix; N] {
    fn ndim(&self) -> usize {
        N
    }

    fn dims(&self) -> Vec<Ix> {
        self.to_vec()
    }
}

impl Dimension for () {
    fn ndim(&self) -> usize {
        0
    }

    fn dims(&self) -> Vec<Ix> {
        vec![]
    }
}

impl Dimension for Ix {
    fn ndim(&self) -> usize {
        1
    }

    fn dims(&self) -> Vec<Ix> {
        vec![*self]
    }
}

macro_rules! ix {
    ($_d:ident) => {
        Ix
    };
}

macro_rules! impl_tuple {
    ($($d:ident),+) => {
        impl Dimension for ($(ix!($d),)+) {
            #[inline]
            fn ndim(&self) -> usize {
                [$(stringify!($d)),+].len()
            }

            #[inline]
            fn dims(&self) -> Vec<Ix> {
                let ($($d,)+) = *self;
                vec![$($d),+]
            }
        }
    };
}

impl_tuple!(d0);
impl_tuple!(d0, d1);
impl_tuple!(d0, d1, d2);
impl_tuple!(d0, d1, d2, d3);
impl_tuple!(d0, d1, d2, d3, d4);
impl_tuple!(d0, d1, d2, d3, d4, d5);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dimension() {
        fn f<D: Dimension>(d: D) -> (usize, Vec<Ix>, Ix) {
            (d.ndim(), d.dims(), d.size())
        }

        assert_eq!(f(()), (0, vec![], 1));
        assert_eq!(f(&()), (0, vec![], 1));
        assert_eq!(f(2_usize), (1, vec![2], 2));
        assert_eq!(f((3_usize, 4_usize)), (2, vec![3, 4], 12));
        assert_eq!(f([1_usize, 2, 3]), (3, vec![1, 2, 3], 6));
        assert_eq!(f(vec![4_usize, 5]), (2, vec![4, 5], 20));
        assert_eq!(f(&[2_usize, 0][..]), (2, vec![2, 0], 0));
    }
}
