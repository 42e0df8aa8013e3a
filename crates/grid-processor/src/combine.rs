//! Element-wise combination of a raster with a second field.

use seaice_common::{Cell, Raster, ScalarField};

/// Add `multiplier * secondary` to every non-zero value cell of `primary`.
///
/// Land, hidden and exact-zero cells are left untouched. With the default
/// multiplier of `-0.001` this turns a thickness raster in metres and a
/// historical average in millimetres into an anomaly in metres.
///
/// # Panics
///
/// Panics if the two grids differ in size. Both come from the same
/// reference data, so a mismatch is a programming error.
pub fn combine(primary: &mut Raster, secondary: &ScalarField, multiplier: f64) {
    assert_eq!(
        primary.size(),
        secondary.size(),
        "combined grids must have the same shape"
    );

    let size = primary.size();
    for x in 0..size {
        for y in 0..size {
            if let Cell::Value(v) = primary.get(x, y) {
                if v != 0.0 {
                    primary.set(x, y, Cell::Value(v + multiplier * secondary.get(x, y)));
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use seaice_common::Cell::{Hidden, Land, Value};
    use test_utils::raster_from_rows;

    #[test]
    fn test_combines_value_cells_only() {
        let mut raster = raster_from_rows(&[
            vec![Land, Value(1.0), Hidden],
            vec![Value(0.0), Value(2.5), Value(-0.5)],
            vec![Hidden, Land, Value(0.3)],
        ]);
        let historical = ScalarField::filled(3, 500.0);
        combine(&mut raster, &historical, -0.001);

        assert_eq!(raster.get(0, 0), Land);
        assert_eq!(raster.get(0, 2), Hidden);
        assert_eq!(raster.get(1, 0), Value(0.0));
        assert_eq!(raster.get(0, 1), Value(1.0 - 0.5));
        assert_eq!(raster.get(1, 1), Value(2.5 - 0.5));
        assert_eq!(raster.get(1, 2), Value(-0.5 - 0.5));
    }

    #[test]
    fn test_uses_matching_cell() {
        let mut raster = raster_from_rows(&[
            vec![Value(1.0), Value(1.0), Value(1.0)],
            vec![Value(1.0), Value(1.0), Value(1.0)],
            vec![Value(1.0), Value(1.0), Value(1.0)],
        ]);
        let mut field = ScalarField::filled(3, 0.0);
        field.set(2, 1, 4.0);
        combine(&mut raster, &field, 0.5);

        assert_eq!(raster.get(2, 1), Value(3.0));
        assert_eq!(raster.get(1, 2), Value(1.0));
    }

    #[test]
    #[should_panic(expected = "same shape")]
    fn test_shape_mismatch_panics() {
        let mut raster = raster_from_rows(&[
            vec![Hidden, Hidden, Hidden],
            vec![Hidden, Hidden, Hidden],
            vec![Hidden, Hidden, Hidden],
        ]);
        combine(&mut raster, &ScalarField::filled(5, 1.0), -0.001);
    }
}
