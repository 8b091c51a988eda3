//! The `vector` greeting function
//!
//! `SELECT vector('Sam')` returns `Vector Sam 🐥`. The function takes exactly
//! one text argument; anything else is rejected while DataFusion coerces the
//! call's argument types, so a malformed call never reaches [`GreetingUdf::invoke`].

use arrow::array::StringArray;
use arrow::datatypes::DataType;
use datafusion::common::cast::as_string_array;
use datafusion::common::ScalarValue;
use datafusion::error::Result as DFResult;
use datafusion::logical_expr::{ColumnarValue, ScalarUDFImpl, Signature, Volatility};
use std::any::Any;
use std::sync::Arc;

use crate::Error;

/// SQL name of the greeting function
pub const GREETING_FUNCTION: &str = "vector";

const GREETING_PREFIX: &str = "Vector ";
const GREETING_SUFFIX: &str = " 🐥";

/// Build the greeting for `name`
pub fn greet(name: &str) -> String {
    let mut out = String::with_capacity(GREETING_PREFIX.len() + name.len() + GREETING_SUFFIX.len());
    out.push_str(GREETING_PREFIX);
    out.push_str(name);
    out.push_str(GREETING_SUFFIX);
    out
}

/// Scalar UDF wrapping [`greet`]
#[derive(Debug)]
pub struct GreetingUdf {
    signature: Signature,
}

impl GreetingUdf {
    pub fn new() -> Self {
        Self {
            signature: Signature::user_defined(Volatility::Immutable),
        }
    }
}

impl Default for GreetingUdf {
    fn default() -> Self {
        Self::new()
    }
}

fn is_text(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View
    )
}

impl ScalarUDFImpl for GreetingUdf {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn name(&self) -> &str {
        GREETING_FUNCTION
    }

    fn signature(&self) -> &Signature {
        &self.signature
    }

    fn return_type(&self, _arg_types: &[DataType]) -> DFResult<DataType> {
        Ok(DataType::Utf8)
    }

    // No implicit coercion from numbers: `vector(42)` is an error.
    fn coerce_types(&self, arg_types: &[DataType]) -> DFResult<Vec<DataType>> {
        match arg_types {
            [DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Null] => {
                Ok(vec![DataType::Utf8])
            }
            [DataType::Dictionary(_, value)] if is_text(value) => Ok(vec![DataType::Utf8]),
            [other] => Err(Error::argument(
                GREETING_FUNCTION,
                format!("expected a text argument, got {other}"),
            )
            .into()),
            _ => Err(Error::argument(
                GREETING_FUNCTION,
                format!("expected exactly one argument, got {}", arg_types.len()),
            )
            .into()),
        }
    }

    fn invoke(&self, args: &[ColumnarValue]) -> DFResult<ColumnarValue> {
        let [arg] = args else {
            return Err(Error::argument(
                GREETING_FUNCTION,
                format!("expected exactly one argument, got {}", args.len()),
            )
            .into());
        };

        match arg {
            ColumnarValue::Scalar(ScalarValue::Utf8(value)) => Ok(ColumnarValue::Scalar(
                ScalarValue::Utf8(value.as_deref().map(greet)),
            )),
            ColumnarValue::Scalar(ScalarValue::Null) => {
                Ok(ColumnarValue::Scalar(ScalarValue::Utf8(None)))
            }
            ColumnarValue::Scalar(other) => Err(Error::argument(
                GREETING_FUNCTION,
                format!("expected a text argument, got {}", other.data_type()),
            )
            .into()),
            ColumnarValue::Array(array) => {
                let names = as_string_array(array)?;
                let greetings: StringArray = names.iter().map(|name| name.map(greet)).collect();
                Ok(ColumnarValue::Array(Arc::new(greetings)))
            }
        }
    }
}
