// Copyright 2023 Xayn AG
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as
// published by the Free Software Foundation, version 3.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program.  If not, see <https://www.gnu.org/licenses/>.

use std::collections::BTreeMap;

use float_cmp::ApproxEq;
use ndarray::{ArrayBase, Data, Dimension, IntoDimension};

/// Asserts that two float containers are approximately equal.
///
/// Both sides are flattened into their leaf values in logical order and compared pairwise with
/// [`float_cmp`]. `NaN` on both sides at the same position counts as equal.
#[macro_export]
macro_rules! assert_approx_eq {
    ($t:ty, $left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, ulps = $ulps:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = 0., ulps = $ulps)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr $(,)?) => {
        $crate::assert_approx_eq!($t, $left, $right, epsilon = $epsilon, ulps = 2)
    };
    ($t:ty, $left:expr, $right:expr, epsilon = $epsilon:expr, ulps = $ulps:expr $(,)?) => {{
        let left = $crate::Leaves::<$t>::leaves(&$left);
        let right = $crate::Leaves::<$t>::leaves(&$right);
        for position in 0..left.len().max(right.len()) {
            match (left.get(position), right.get(position)) {
                (Some((lidx, lv)), Some((ridx, rv))) => {
                    std::assert_eq!(
                        lidx, ridx,
                        "Shape mismatch in logical order: {:?} != {:?}",
                        lidx, ridx,
                    );
                    if !(lv.is_nan() && rv.is_nan()) {
                        std::assert!(
                            $crate::approx_eq!($t, *lv, *rv, epsilon = $epsilon, ulps = $ulps),
                            "Approximated equal assertion failed (ulps={:?}, epsilon={:?}) at index {:?}: {:?} != {:?}",
                            $ulps, $epsilon, lidx, lv, rv,
                        );
                    }
                }
                (Some((idx, _)), None) => std::panic!("Left input is longer starting from index {:?}", idx),
                (None, Some((idx, _))) => std::panic!("Right input is longer starting from index {:?}", idx),
                (None, None) => unreachable!(),
            }
        }
    }};
}

/// Flattens a (possibly nested) container of floats into indexed leaves.
pub trait Leaves<T>
where
    T: ApproxEq + Copy,
{
    /// Pushes all leaves with their index path below `prefix` onto `out`.
    fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, T)>);

    /// Collects all leaves in logical order.
    fn leaves(&self) -> Vec<(Vec<usize>, T)> {
        let mut out = Vec::new();
        self.push_leaves(&mut Vec::new(), &mut out);
        out
    }
}

fn push_indexed<'a, T, L>(
    items: impl Iterator<Item = &'a L>,
    prefix: &mut Vec<usize>,
    out: &mut Vec<(Vec<usize>, T)>,
) where
    T: ApproxEq + Copy,
    L: 'a + Leaves<T> + ?Sized,
{
    for (idx, item) in items.enumerate() {
        prefix.push(idx);
        item.push_leaves(prefix, out);
        prefix.pop();
    }
}

macro_rules! impl_leaves {
    ($($t:ty),+ $(,)?) => {
        $(
            impl Leaves<$t> for $t {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    out.push((prefix.clone(), *self));
                }
            }

            impl<L> Leaves<$t> for &L
            where
                L: Leaves<$t> + ?Sized,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    (*self).push_leaves(prefix, out);
                }
            }

            impl<L> Leaves<$t> for Option<L>
            where
                L: Leaves<$t>,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    push_indexed(self.iter(), prefix, out);
                }
            }

            impl<L> Leaves<$t> for [L]
            where
                L: Leaves<$t>,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    push_indexed(self.iter(), prefix, out);
                }
            }

            impl<L, const N: usize> Leaves<$t> for [L; N]
            where
                L: Leaves<$t>,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    push_indexed(self.iter(), prefix, out);
                }
            }

            impl<L> Leaves<$t> for Vec<L>
            where
                L: Leaves<$t>,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    push_indexed(self.iter(), prefix, out);
                }
            }

            // maps are compared by their values in key order
            impl<K, L> Leaves<$t> for BTreeMap<K, L>
            where
                L: Leaves<$t>,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    push_indexed(self.values(), prefix, out);
                }
            }

            impl<S, D> Leaves<$t> for ArrayBase<S, D>
            where
                S: Data<Elem = $t>,
                D: Dimension,
            {
                fn push_leaves(&self, prefix: &mut Vec<usize>, out: &mut Vec<(Vec<usize>, $t)>) {
                    for (idx, value) in self.indexed_iter() {
                        let mut index = prefix.clone();
                        index.extend(idx.into_dimension().as_array_view().iter());
                        out.push((index, *value));
                    }
                }
            }
        )+
    };
}

impl_leaves! { f32, f64 }

#[cfg(test)]
mod tests {
    use std::panic::catch_unwind;

    use ndarray::{arr1, arr2};

    #[test]
    fn test_scalars_with_ulps() {
        assert_approx_eq!(f32, 0.150_391_55, 0.150_391_6, ulps = 3);
        catch_unwind(|| assert_approx_eq!(f32, 0.150_391_55, 0.150_391_6, ulps = 2)).unwrap_err();
    }

    #[test]
    fn test_slice_against_array() {
        assert_approx_eq!(f32, &[0.25, 1.25], arr1(&[0.25, 1.25]));
        assert_approx_eq!(f64, vec![0.5, 0.75], [0.5, 0.75]);
    }

    #[test]
    fn test_nested_against_matrix() {
        assert_approx_eq!(
            f32,
            [[1., 0.5], [0.5, 1.]],
            arr2(&[[1., 0.5], [0.5, 1.]]),
        );
    }

    #[test]
    #[should_panic(expected = "at index [1, 0]")]
    fn test_reports_failing_index() {
        assert_approx_eq!(f32, [[1., 0.5], [0.4, 1.]], arr2(&[[1., 0.5], [0.5, 1.]]));
    }

    #[test]
    fn test_nan_on_both_sides() {
        assert_approx_eq!(f32, [3.1, f32::NAN], [3.1, f32::NAN]);
    }

    #[test]
    #[should_panic(expected = "Left input is longer")]
    fn test_different_lengths() {
        assert_approx_eq!(f32, [1., 2., 3.], [1., 2.]);
    }

    #[test]
    fn test_epsilon() {
        assert_approx_eq!(f64, 0.125, 0.625, epsilon = 0.5);
    }
}
