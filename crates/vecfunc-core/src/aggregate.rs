//! Distance aggregates
//!
//! `dot_product(x, y)` and friends fold the rows of two numeric columns as if
//! each column were one long vector. `l2norm(x)` takes a single column.
//! Rows where any input is NULL are skipped; an aggregate that saw no rows
//! returns NULL.

use arrow::array::ArrayRef;
use arrow::datatypes::{DataType, Field};
use datafusion::common::cast::{as_float64_array, as_uint64_array};
use datafusion::common::ScalarValue;
use datafusion::error::Result as DFResult;
use datafusion::logical_expr::function::{AccumulatorArgs, StateFieldsArgs};
use datafusion::logical_expr::{
    Accumulator, AggregateUDFImpl, Signature, Volatility,
};
use std::any::Any;

use crate::distance::{DistanceAlgorithm, DistanceState};
use crate::Error;

/// Aggregate UDF for one [`DistanceAlgorithm`]
#[derive(Debug)]
pub struct DistanceAggregate {
    algorithm: DistanceAlgorithm,
    aliases: Vec<String>,
    signature: Signature,
}

impl DistanceAggregate {
    pub fn new(algorithm: DistanceAlgorithm) -> Self {
        let arity = if algorithm.is_unary() { 1 } else { 2 };
        Self {
            algorithm,
            aliases: algorithm.aliases().iter().map(|s| s.to_string()).collect(),
            signature: Signature::exact(vec![DataType::Float64; arity], Volatility::Immutable),
        }
    }

    /// One aggregate per algorithm
    pub fn all() -> Vec<Self> {
        DistanceAlgorithm::ALL.into_iter().map(Self::new).collect()
    }

    pub fn algorithm(&self) -> DistanceAlgorithm {
        self.algorithm
    }
}

impl AggregateUDFImpl for DistanceAggregate {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        self.algorithm.name()
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

    fn accumulator(&self, _acc_args: AccumulatorArgs) -> DFResult<Box<dyn Accumulator>> {
        Ok(Box::new(DistanceAccumulator::new(self.algorithm)))
    }

    fn state_fields(&self, args: StateFieldsArgs) -> DFResult<Vec<Field>> {
        let field = |suffix: &str, data_type: DataType| {
            Field::new(format!("{}[{suffix}]", args.name), data_type, true)
        };
        Ok(vec![
            field("dot", DataType::Float64),
            field("a_magnitude", DataType::Float64),
            field("b_magnitude", DataType::Float64),
            field("squared_diff", DataType::Float64),
            field("count", DataType::UInt64),
        ])
    }
}

/// Per-group state of a [`DistanceAggregate`]
#[derive(Debug)]
pub struct DistanceAccumulator {
    algorithm: DistanceAlgorithm,
    state: DistanceState,
}

impl DistanceAccumulator {
    pub fn new(algorithm: DistanceAlgorithm) -> Self {
        Self {
            algorithm,
            state: DistanceState::default(),
        }
    }
}

impl Accumulator for DistanceAccumulator {
    fn update_batch(&mut self, values: &[ArrayRef]) -> DFResult<()> {
        if self.algorithm.is_unary() {
            let [xs] = values else {
                return Err(Error::argument(self.algorithm.name(), "expected one column").into());
            };
            for x in as_float64_array(xs)?.iter().flatten() {
                self.state.update_unary(x);
            }
            return Ok(());
        }

        let [xs, ys] = values else {
            return Err(Error::argument(self.algorithm.name(), "expected two columns").into());
        };
        let xs = as_float64_array(xs)?;
        let ys = as_float64_array(ys)?;
        for (x, y) in xs.iter().zip(ys.iter()) {
            if let (Some(x), Some(y)) = (x, y) {
                self.state.update(x, y);
            }
        }
        Ok(())
    }

    fn evaluate(&mut self) -> DFResult<ScalarValue> {
        if self.state.count == 0 {
            return Ok(ScalarValue::Float64(None));
        }
        Ok(ScalarValue::Float64(self.state.finish(self.algorithm)))
    }

    fn size(&self) -> usize {
        std::mem::size_of_val(self)
    }

    fn state(&mut self) -> DFResult<Vec<ScalarValue>> {
        Ok(vec![
            ScalarValue::Float64(Some(self.state.dot)),
            ScalarValue::Float64(Some(self.state.a_magnitude)),
            ScalarValue::Float64(Some(self.state.b_magnitude)),
            ScalarValue::Float64(Some(self.state.squared_diff)),
            ScalarValue::UInt64(Some(self.state.count)),
        ])
    }

    fn merge_batch(&mut self, states: &[ArrayRef]) -> DFResult<()> {
        let [dot, a_magnitude, b_magnitude, squared_diff, count] = states else {
            return Err(Error::argument(self.algorithm.name(), "malformed partial state").into());
        };
        let dot = as_float64_array(dot)?;
        let a_magnitude = as_float64_array(a_magnitude)?;
        let b_magnitude = as_float64_array(b_magnitude)?;
        let squared_diff = as_float64_array(squared_diff)?;
        let count = as_uint64_array(count)?;

        for idx in 0..dot.len() {
            self.state.merge(&DistanceState {
                dot: dot.value(idx),
                a_magnitude: a_magnitude.value(idx),
                b_magnitude: b_magnitude.value(idx),
                squared_diff: squared_diff.value(idx),
                count: count.value(idx),
            });
        }
        Ok(())
    }
}
