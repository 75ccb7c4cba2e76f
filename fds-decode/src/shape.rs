use std::fmt;

/// An ordered sequence of dimension sizes, each either known or unknown.
///
/// Unknown dimensions are written as any negative value in [`PartialShape::new`],
/// conventionally `-1`. Rank is the number of dimensions; a rank-0 shape is a
/// scalar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PartialShape(Vec<Option<usize>>);

impl PartialShape {
    pub fn new(dims: impl IntoIterator<Item = i64>) -> PartialShape {
        PartialShape(
            dims.into_iter()
                .map(|d| usize::try_from(d).ok())
                .collect(),
        )
    }

    pub fn scalar() -> PartialShape {
        PartialShape(Vec::new())
    }

    pub fn rank(&self) -> usize {
        self.0.len()
    }

    pub fn dims(&self) -> &[Option<usize>] {
        &self.0
    }

    /// The total element count, when every dimension is known.
    /// A scalar shape yields 1.
    pub fn known_element_count(&self) -> Option<usize> {
        self.0
            .iter()
            .try_fold(1usize, |acc, dim| Some(acc * (*dim)?))
    }
}

impl fmt::Display for PartialShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "(")?;
        for (i, dim) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            match dim {
                Some(d) => write!(f, "{d}")?,
                None => write!(f, "-1")?,
            }
        }
        write!(f, ")")
    }
}
