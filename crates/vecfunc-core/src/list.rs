//! Distance functions over list columns
//!
//! `list_distance(l1, l2, 'algorithm')` pairs up the elements of two lists
//! row by row and folds them through a [`DistanceState`]. The fixed-algorithm
//! shorthands (`list_l2distance`, `list_dot_product`, ...) and the unary
//! `list_l2norm` share the same implementation.
//!
//! Arguments may be `List`, `LargeList` or `FixedSizeList` of any numeric type;
//! DataFusion casts the elements to `Float64` before the kernel runs.

use arrow::array::{
    Array, ArrayRef, FixedSizeListArray, Float64Array, LargeListArray, ListArray,
};
use arrow::datatypes::{DataType, Field, FieldRef};
use datafusion::common::cast::{
    as_fixed_size_list_array, as_float64_array, as_large_list_array, as_list_array,
};
use datafusion::common::ScalarValue;
use datafusion::error::{DataFusionError, Result as DFResult};
use datafusion::logical_expr::{ColumnarValue, ScalarUDFImpl, Signature, Volatility};
use rayon::prelude::*;
use std::any::Any;
use std::sync::Arc;

use crate::distance::{DistanceAlgorithm, DistanceState};
use crate::Error;

/// SQL name of the generic list distance function
pub const LIST_DISTANCE_FUNCTION: &str = "list_distance";

/// Scalar UDF computing a distance between list values
#[derive(Debug)]
pub struct ListDistanceUdf {
    name: String,
    aliases: Vec<String>,
    /// `None` for `list_distance`, which reads the algorithm from its third argument
    algorithm: Option<DistanceAlgorithm>,
    parallel_threshold: usize,
    signature: Signature,
}

impl ListDistanceUdf {
    /// `list_distance(l1, l2, algorithm)`
    pub fn generic(parallel_threshold: usize) -> Self {
        Self {
            name: LIST_DISTANCE_FUNCTION.to_string(),
            aliases: Vec::new(),
            algorithm: None,
            parallel_threshold,
            signature: Signature::user_defined(Volatility::Immutable),
        }
    }

    /// `list_<algorithm>(l1, l2)`, or `list_l2norm(l)`
    pub fn fixed(algorithm: DistanceAlgorithm, parallel_threshold: usize) -> Self {
        Self {
            name: format!("list_{}", algorithm.name()),
            aliases: algorithm
                .aliases()
                .iter()
                .map(|alias| format!("list_{alias}"))
                .collect(),
            algorithm: Some(algorithm),
            parallel_threshold,
            signature: Signature::user_defined(Volatility::Immutable),
        }
    }

    /// Every list function: the generic one followed by one per algorithm
    pub fn all(parallel_threshold: usize) -> Vec<Self> {
        std::iter::once(Self::generic(parallel_threshold))
            .chain(
                DistanceAlgorithm::ALL
                    .into_iter()
                    .map(|algorithm| Self::fixed(algorithm, parallel_threshold)),
            )
            .collect()
    }

    /// Number of list arguments
    fn list_arity(&self) -> usize {
        match self.algorithm {
            Some(algorithm) if algorithm.is_unary() => 1,
            _ => 2,
        }
    }

    fn arity(&self) -> usize {
        match self.algorithm {
            None => 3,
            Some(_) => self.list_arity(),
        }
    }

    // Resolved while the batch runs, so every failure is an execution error.
    fn algorithm_argument(&self, arg: &ColumnarValue) -> DFResult<DistanceAlgorithm> {
        self.resolve_algorithm(arg)
            .map_err(|err| DataFusionError::Execution(err.to_string()))
    }

    fn resolve_algorithm(&self, arg: &ColumnarValue) -> crate::Result<DistanceAlgorithm> {
        let name = match arg {
            ColumnarValue::Scalar(
                ScalarValue::Utf8(Some(name))
                | ScalarValue::LargeUtf8(Some(name))
                | ScalarValue::Utf8View(Some(name)),
            ) => name,
            ColumnarValue::Scalar(_) => {
                return Err(Error::argument(&self.name, "distance algorithm name must not be NULL"));
            }
            ColumnarValue::Array(_) => {
                return Err(Error::argument(&self.name, "distance algorithm name must be a constant"));
            }
        };

        let algorithm = DistanceAlgorithm::from_name(name)?;
        if algorithm.is_unary() {
            return Err(Error::argument(
                &self.name,
                format!("{algorithm} takes a single list, use list_{algorithm}"),
            ));
        }
        Ok(algorithm)
    }
}

impl ScalarUDFImpl for ListDistanceUdf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn aliases(&self) -> &[String] {
        &self.aliases
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, _arg_types: &[DataType]) -> DFResult<DataType> {
        Ok(DataType::Float64)
    }

    fn coerce_types(&self, arg_types: &[DataType]) -> DFResult<Vec<DataType>> {
        if arg_types.len() != self.arity() {
            return Err(Error::argument(
                &self.name,
                format!(
                    "expected {} arguments, got {}",
                    self.arity(),
                    arg_types.len()
                ),
            )
            .into());
        }

        arg_types
            .iter()
            .enumerate()
            .map(|(idx, data_type)| {
                if idx == self.list_arity() {
                    coerce_algorithm_name(&self.name, data_type)
                } else {
                    coerce_list_type(&self.name, data_type)
                }
            })
            .collect()
    }

    fn invoke(&self, args: &[ColumnarValue]) -> DFResult<ColumnarValue> {
        if args.len() != self.arity() {
            return Err(Error::argument(
                &self.name,
                format!("expected {} arguments, got {}", self.arity(), args.len()),
            )
            .into());
        }

        let algorithm = match self.algorithm {
            Some(algorithm) => algorithm,
            None => self.algorithm_argument(&args[2])?,
        };

        let lists = &args[..self.list_arity()];
        let all_scalar = lists
            .iter()
            .all(|arg| matches!(arg, ColumnarValue::Scalar(_)));
        let arrays = ColumnarValue::values_to_arrays(lists)?;

        let result = if algorithm.is_unary() {
            list_l2_norm(&arrays[0])?
        } else {
            list_distance(&arrays[0], &arrays[1], algorithm, self.parallel_threshold)?
        };

        if all_scalar {
            Ok(ColumnarValue::Scalar(ScalarValue::try_from_array(
                &result, 0,
            )?))
        } else {
            Ok(ColumnarValue::Array(Arc::new(result)))
        }
    }
}

fn float_field(field: &FieldRef) -> FieldRef {
    Arc::new(Field::new(field.name(), DataType::Float64, true))
}

fn is_numeric_element(data_type: &DataType) -> bool {
    data_type.is_numeric() || data_type == &DataType::Null
}

/// Keep the list container, cast the elements to `Float64`
fn coerce_list_type(function: &str, data_type: &DataType) -> DFResult<DataType> {
    match data_type {
        DataType::Null => Ok(DataType::List(Arc::new(Field::new(
            "item",
            DataType::Float64,
            true,
        )))),
        DataType::List(field) if is_numeric_element(field.data_type()) => {
            Ok(DataType::List(float_field(field)))
        }
        DataType::LargeList(field) if is_numeric_element(field.data_type()) => {
            Ok(DataType::LargeList(float_field(field)))
        }
        DataType::FixedSizeList(field, size) if is_numeric_element(field.data_type()) => {
            Ok(DataType::FixedSizeList(float_field(field), *size))
        }
        other => Err(Error::argument(
            function,
            format!("expected a list of numbers, got {other}"),
        )
        .into()),
    }
}

fn coerce_algorithm_name(function: &str, data_type: &DataType) -> DFResult<DataType> {
    match data_type {
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null => {
            Ok(DataType::Utf8)
        }
        other => Err(Error::argument(
            function,
            format!("distance algorithm name must be text, got {other}"),
        )
        .into()),
    }
}

/// Row access over the three list layouts
enum ListRows<'a> {
    List(&'a ListArray),
    LargeList(&'a LargeListArray),
    FixedSize(&'a FixedSizeListArray),
}

impl<'a> ListRows<'a> {
    fn try_new(array: &'a ArrayRef) -> DFResult<Self> {
        match array.data_type() {
            DataType::List(_) => Ok(Self::List(as_list_array(array)?)),
            DataType::LargeList(_) => Ok(Self::LargeList(as_large_list_array(array)?)),
            DataType::FixedSizeList(_, _) => Ok(Self::FixedSize(as_fixed_size_list_array(array)?)),
            other => Err(Error::argument(
                LIST_DISTANCE_FUNCTION,
                format!("expected a list of numbers, got {other}"),
            )
            .into()),
        }
    }

    fn len(&self) -> usize {
        match self {
            Self::List(array) => array.len(),
            Self::LargeList(array) => array.len(),
            Self::FixedSize(array) => array.len(),
        }
    }

    /// Elements of row `idx`, `None` for a NULL list
    fn row(&self, idx: usize) -> Option<ArrayRef> {
        match self {
            Self::List(array) => array.is_valid(idx).then(|| array.value(idx)),
            Self::LargeList(array) => array.is_valid(idx).then(|| array.value(idx)),
            Self::FixedSize(array) => array.is_valid(idx).then(|| array.value(idx)),
        }
    }
}

fn row_distance(
    left: &ListRows<'_>,
    right: &ListRows<'_>,
    idx: usize,
    algorithm: DistanceAlgorithm,
) -> DFResult<Option<f64>> {
    let (Some(a), Some(b)) = (left.row(idx), right.row(idx)) else {
        return Ok(None);
    };
    let a = as_float64_array(&a)?;
    let b = as_float64_array(&b)?;
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        }
        .into());
    }

    let mut state = DistanceState::default();
    for (x, y) in a.iter().zip(b.iter()) {
        if let (Some(x), Some(y)) = (x, y) {
            state.update(x, y);
        }
    }
    Ok(state.finish(algorithm))
}

/// Row-wise distance between two equally long list arrays
pub fn list_distance(
    left: &ArrayRef,
    right: &ArrayRef,
    algorithm: DistanceAlgorithm,
    parallel_threshold: usize,
) -> DFResult<Float64Array> {
    let left = ListRows::try_new(left)?;
    let right = ListRows::try_new(right)?;
    if left.len() != right.len() {
        return Err(Error::DimensionMismatch {
            expected: left.len(),
            actual: right.len(),
        }
        .into());
    }

    let rows = left.len();
    let values: Vec<Option<f64>> = if rows >= parallel_threshold {
        tracing::trace!(rows, algorithm = %algorithm, "evaluating list rows in parallel");
        (0..rows)
            .into_par_iter()
            .map(|idx| row_distance(&left, &right, idx, algorithm))
            .collect::<DFResult<_>>()?
    } else {
        (0..rows)
            .map(|idx| row_distance(&left, &right, idx, algorithm))
            .collect::<DFResult<_>>()?
    };

    Ok(Float64Array::from(values))
}

/// Row-wise Euclidean norm of a list array, skipping NULL elements
pub fn list_l2_norm(array: &ArrayRef) -> DFResult<Float64Array> {
    let lists = ListRows::try_new(array)?;
    (0..lists.len())
        .map(|idx| {
            let Some(values) = lists.row(idx) else {
                return Ok(None);
            };
            let mut state = DistanceState::default();
            for x in as_float64_array(&values)?.iter().flatten() {
                state.update_unary(x);
            }
            Ok(state.finish(DistanceAlgorithm::L2Norm))
        })
        .collect()
}
