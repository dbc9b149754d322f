//! Runtime helpers called from generated connector code.

mod arguments;
mod decode;
mod encode;
mod selection;

pub use arguments::{
    decode_arguments, function_row_set, resolve_argument_variables, variable_sets, UnboundVariable,
};
pub use decode::{
    parse_duration, Decoder, EnumValueError, FloatValue, FromValue, IntValue, UintValue, ValueError,
};
pub use encode::{
    check_result, encode_duration, encode_map, encode_maps, encode_nullable_duration,
    encode_nullable_map, encode_nullable_maps, encode_value, ScalarName, ToMap,
};
pub use selection::{
    array_selection, check_scalar_selection, encode_object_with_column_selection, encode_objects_with_column_selection,
    eval_nested_column_array, eval_nested_column_object, eval_nested_field, function_selection,
    object_selection, FUNCTION_VALUE_FIELD,
};
